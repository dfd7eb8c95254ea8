//! Rendering of types for messages and hovers.

use std::fmt::{self, Write};

use super::{FunctionType, Signature, Type};

/// How class names are printed. The registry swaps in simple names.
pub(crate) type ClassNamer<'a> = &'a dyn Fn(&str) -> String;

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_type(f, self, &|name: &str| name.to_owned())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_signature(f, self, &|name: &str| name.to_owned())
    }
}

/// Render with a custom class namer.
pub(crate) fn render(ty: &Type, namer: ClassNamer<'_>) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_type(&mut out, ty, namer);
    out
}

fn write_type(out: &mut impl Write, ty: &Type, namer: ClassNamer<'_>) -> fmt::Result {
    match ty {
        Type::Unknown => out.write_str("any"),
        Type::Nil => out.write_str("nil"),
        Type::Primitive(name) | Type::Generic(name) => out.write_str(name),
        Type::Class(name) => out.write_str(&namer(name)),
        Type::Array(element) => {
            if matches!(**element, Type::Union(_) | Type::Function(_)) {
                out.write_char('(')?;
                write_type(out, element, namer)?;
                out.write_str(")[]")
            } else {
                write_type(out, element, namer)?;
                out.write_str("[]")
            }
        }
        Type::Tuple(items) => {
            out.write_char('[')?;
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.write_str(", ")?;
                }
                write_type(out, item, namer)?;
            }
            out.write_char(']')
        }
        Type::Union(union) => {
            for (i, member) in union.iter().enumerate() {
                if i > 0 {
                    out.write_str(" | ")?;
                }
                write_type(out, member, namer)?;
            }
            Ok(())
        }
        Type::Function(func) => write_function(out, func, namer),
    }
}

fn write_function(out: &mut impl Write, func: &FunctionType, namer: ClassNamer<'_>) -> fmt::Result {
    write_signature(out, func.main(), namer)
}

fn write_signature(out: &mut impl Write, sig: &Signature, namer: ClassNamer<'_>) -> fmt::Result {
    out.write_str("fun(")?;
    let mut first = true;
    for param in &sig.params {
        if !first {
            out.write_str(", ")?;
        }
        first = false;
        out.write_str(&param.name)?;
        if param.optional {
            out.write_char('?')?;
        }
        out.write_str(": ")?;
        write_type(out, &param.ty, namer)?;
    }
    if let Some(varargs) = &sig.varargs {
        if !first {
            out.write_str(", ")?;
        }
        out.write_str("...: ")?;
        write_type(out, varargs, namer)?;
    }
    out.write_char(')')?;
    if !sig.return_type.is_nil() {
        out.write_str(": ")?;
        write_type(out, &sig.return_type, namer)?;
    }
    Ok(())
}
