//! Lowering of annotation type expressions to [`Type`] values.
//!
//! Names stay unresolved: anything that is not a primitive, `nil`, `any` or
//! an in-scope generic parameter becomes `Type::Class(name)`, and the
//! registry decides later whether that name is a class, an alias, or
//! nothing at all.

use luna_ir::{FunctionTypeExpr, TypeExpr};
use luna_types::{primitive, FunctionType, Param, Signature, Type};

/// Lower `expr` with `generics` naming the generic parameters in scope.
pub fn lower_type(expr: &TypeExpr, generics: &[String]) -> Type {
    match expr {
        TypeExpr::Name(name) => lower_name(name, generics),
        TypeExpr::Array(element) => Type::array(lower_type(element, generics)),
        TypeExpr::Tuple(items) => {
            Type::Tuple(items.iter().map(|item| lower_type(item, generics)).collect())
        }
        TypeExpr::Union(members) if members.is_empty() => Type::Unknown,
        TypeExpr::Union(members) => {
            Type::union(members.iter().map(|member| lower_type(member, generics)))
        }
        TypeExpr::Function(func) => {
            Type::Function(FunctionType::new(lower_signature(func, generics)))
        }
        // `table<K, V>` is a plain table; other applied names keep their base.
        TypeExpr::Applied { base, .. } => lower_name(base, generics),
    }
}

/// Lower a `fun(...)` type. Only the first declared return type is kept.
pub fn lower_signature(func: &FunctionTypeExpr, generics: &[String]) -> Signature {
    let params = func
        .params
        .iter()
        .map(|param| Param {
            name: param.name.clone(),
            ty: lower_type(&param.ty, generics),
            optional: param.optional,
        })
        .collect();
    let return_type = func
        .returns
        .first()
        .map_or(Type::Nil, |ty| lower_type(ty, generics));
    Signature {
        params,
        return_type,
        varargs: func.vararg.as_deref().map(|ty| lower_type(ty, generics)),
        generic_params: (!generics.is_empty()).then(|| generics.to_vec()),
        ..Signature::default()
    }
}

fn lower_name(name: &str, generics: &[String]) -> Type {
    match name {
        "nil" | "void" => Type::Nil,
        "any" | "unknown" => Type::Unknown,
        _ if generics.iter().any(|g| g == name) => Type::Generic(name.to_owned()),
        _ if primitive::is_primitive(name) => Type::primitive(name),
        _ => Type::class(name),
    }
}
