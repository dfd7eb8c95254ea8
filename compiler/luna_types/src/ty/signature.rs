//! Function signatures and overload selection.

use super::Type;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Param {
    pub name: String,
    pub ty: Type,
    pub optional: bool,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Param {
            name: name.into(),
            ty,
            optional: false,
        }
    }

    pub fn optional(name: impl Into<String>, ty: Type) -> Self {
        Param {
            name: name.into(),
            ty,
            optional: true,
        }
    }
}

/// One callable shape.
///
/// `params` never include the implicit receiver of a colon-declared
/// function; `is_method_call` records that the receiver exists.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Signature {
    pub is_method_call: bool,
    pub return_type: Type,
    pub params: Vec<Param>,
    pub generic_params: Option<Vec<String>>,
    /// Element type of a trailing `...`, if the function is variadic.
    pub varargs: Option<Type>,
}

impl Default for Signature {
    fn default() -> Self {
        Signature {
            is_method_call: false,
            return_type: Type::Nil,
            params: Vec::new(),
            generic_params: None,
            varargs: None,
        }
    }
}

impl Signature {
    pub fn new(params: Vec<Param>, return_type: Type) -> Self {
        Signature {
            params,
            return_type,
            ..Signature::default()
        }
    }

    /// Parameters a call must supply. Counted up to the last required one,
    /// so a misplaced optional parameter before a required one still counts.
    pub fn required_count(&self) -> usize {
        self.params
            .iter()
            .rposition(|p| !p.optional)
            .map_or(0, |last| last + 1)
    }

    /// Upper bound on accepted arguments; unbounded for variadic functions.
    pub fn max_count(&self) -> usize {
        if self.varargs.is_some() {
            usize::MAX
        } else {
            self.params.len()
        }
    }

    pub fn accepts(&self, arg_count: usize) -> bool {
        self.required_count() <= arg_count && arg_count <= self.max_count()
    }

    pub fn is_generic(&self, name: &str) -> bool {
        self.generic_params
            .as_ref()
            .is_some_and(|names| names.iter().any(|n| n == name))
    }
}

/// A non-empty list of signatures. The first is the main one, the rest
/// are overloads in declaration order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionType {
    signatures: Vec<Signature>,
}

impl FunctionType {
    pub fn new(main: Signature) -> Self {
        FunctionType {
            signatures: vec![main],
        }
    }

    pub fn with_overloads(main: Signature, overloads: impl IntoIterator<Item = Signature>) -> Self {
        let mut signatures = vec![main];
        signatures.extend(overloads);
        FunctionType { signatures }
    }

    /// `None` when `signatures` is empty.
    pub fn from_signatures(signatures: Vec<Signature>) -> Option<Self> {
        (!signatures.is_empty()).then_some(FunctionType { signatures })
    }

    pub fn main(&self) -> &Signature {
        &self.signatures[0]
    }

    pub fn signatures(&self) -> &[Signature] {
        &self.signatures
    }

    /// Pick the overload for a call with `arg_count` argument slots.
    ///
    /// 1. The first signature, in declaration order, that accepts exactly
    ///    this many arguments (between its required and total counts).
    /// 2. Otherwise the signature with the most parameters not exceeding
    ///    `arg_count`; the earliest wins a tie.
    /// 3. Otherwise the first declared signature.
    ///
    /// A poor match is never an error; it degrades to rule 3.
    pub fn find_perfect_signature(&self, arg_count: usize) -> &Signature {
        if let Some(exact) = self.signatures.iter().find(|sig| sig.accepts(arg_count)) {
            return exact;
        }
        let mut best: Option<&Signature> = None;
        for sig in &self.signatures {
            if sig.params.len() > arg_count {
                continue;
            }
            if best.map_or(true, |b| sig.params.len() > b.params.len()) {
                best = Some(sig);
            }
        }
        best.unwrap_or_else(|| self.main())
    }
}
