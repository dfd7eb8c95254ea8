//! Type values.
//!
//! Types are immutable values compared structurally. Classes are referenced
//! by qualified name only; what a name means is decided by a
//! [`TypeResolver`](crate::TypeResolver) at the point of use, so a type never
//! holds a stale link to a removed declaration.

mod display;
mod signature;

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;

pub(crate) use display::render;
pub use signature::{FunctionType, Param, Signature};

/// Well-known primitive names.
pub mod primitive {
    pub const BOOLEAN: &str = "boolean";
    pub const NUMBER: &str = "number";
    pub const INTEGER: &str = "integer";
    pub const STRING: &str = "string";
    pub const TABLE: &str = "table";
    pub const FUNCTION: &str = "function";
    pub const USERDATA: &str = "userdata";
    pub const THREAD: &str = "thread";

    pub const ALL: [&str; 8] = [
        BOOLEAN, NUMBER, INTEGER, STRING, TABLE, FUNCTION, USERDATA, THREAD,
    ];

    pub fn is_primitive(name: &str) -> bool {
        ALL.contains(&name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    /// Not statically known. Written `any` in annotations.
    Unknown,
    Nil,
    /// `number`, `string`, `boolean`, ...
    Primitive(String),
    /// A class or alias, by qualified name.
    Class(String),
    /// A generic parameter such as `T`, bound per signature.
    Generic(String),
    Array(Box<Type>),
    Tuple(Vec<Type>),
    Union(UnionType),
    Function(FunctionType),
}

impl Type {
    pub fn primitive(name: &str) -> Type {
        Type::Primitive(name.to_owned())
    }

    pub fn class(name: &str) -> Type {
        Type::Class(name.to_owned())
    }

    pub fn number() -> Type {
        Type::primitive(primitive::NUMBER)
    }

    pub fn string() -> Type {
        Type::primitive(primitive::STRING)
    }

    pub fn boolean() -> Type {
        Type::primitive(primitive::BOOLEAN)
    }

    pub fn table() -> Type {
        Type::primitive(primitive::TABLE)
    }

    pub fn array(element: Type) -> Type {
        Type::Array(Box::new(element))
    }

    /// Build a union. Nested unions are flattened and duplicates dropped;
    /// a single distinct member is returned as itself.
    ///
    /// # Panics
    ///
    /// On zero members. An empty union has no meaning and is a caller bug.
    pub fn union(members: impl IntoIterator<Item = Type>) -> Type {
        let mut flat: Vec<Type> = Vec::new();
        for member in members {
            match member {
                Type::Union(inner) => {
                    for ty in inner.0 {
                        push_unique(&mut flat, ty);
                    }
                }
                other => push_unique(&mut flat, other),
            }
        }
        assert!(!flat.is_empty(), "union of zero types");
        if flat.len() == 1 {
            flat.swap_remove(0)
        } else {
            Type::Union(UnionType(flat))
        }
    }

    /// `self | nil`.
    pub fn optional(self) -> Type {
        Type::union([self, Type::Nil])
    }

    /// The type with `nil` removed from a union. `nil` alone stays `nil`.
    pub fn without_nil(&self) -> Type {
        match self {
            Type::Union(union) => {
                let rest: Vec<Type> = union.iter().filter(|t| **t != Type::Nil).cloned().collect();
                if rest.is_empty() {
                    Type::Nil
                } else {
                    Type::union(rest)
                }
            }
            other => other.clone(),
        }
    }

    #[inline]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Unknown)
    }

    #[inline]
    pub fn is_nil(&self) -> bool {
        matches!(self, Type::Nil)
    }

    /// Function-shaped: a signature set or the `function` primitive.
    pub fn is_function_like(&self) -> bool {
        match self {
            Type::Function(_) => true,
            Type::Primitive(name) => name == primitive::FUNCTION,
            _ => false,
        }
    }

    /// Members of a union, or the type itself.
    pub fn members(&self) -> &[Type] {
        match self {
            Type::Union(union) => &union.0,
            other => std::slice::from_ref(other),
        }
    }

    pub fn as_function(&self) -> Option<&FunctionType> {
        match self {
            Type::Function(func) => Some(func),
            _ => None,
        }
    }

    /// Replace generic parameters using `bind`; unbound ones are kept.
    #[must_use]
    pub fn substitute(&self, bind: &dyn Fn(&str) -> Option<Type>) -> Type {
        match self {
            Type::Generic(name) => bind(name).unwrap_or_else(|| self.clone()),
            Type::Array(element) => Type::array(element.substitute(bind)),
            Type::Tuple(items) => Type::Tuple(items.iter().map(|t| t.substitute(bind)).collect()),
            Type::Union(union) => Type::union(union.iter().map(|t| t.substitute(bind))),
            _ => self.clone(),
        }
    }
}

fn push_unique(members: &mut Vec<Type>, ty: Type) {
    if !members.contains(&ty) {
        members.push(ty);
    }
}

/// Members of a union: at least two, distinct, none of them a union.
///
/// Equality and hashing ignore member order; display keeps insertion order.
#[derive(Clone, Debug)]
pub struct UnionType(Vec<Type>);

impl UnionType {
    pub fn iter(&self) -> std::slice::Iter<'_, Type> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, ty: &Type) -> bool {
        self.0.contains(ty)
    }
}

impl PartialEq for UnionType {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len() && self.0.iter().all(|ty| other.0.contains(ty))
    }
}

impl Eq for UnionType {}

impl Hash for UnionType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut combined = 0u64;
        for ty in &self.0 {
            let mut hasher = FxHasher::default();
            ty.hash(&mut hasher);
            combined = combined.wrapping_add(hasher.finish());
        }
        state.write_usize(self.0.len());
        state.write_u64(combined);
    }
}

impl<'a> IntoIterator for &'a UnionType {
    type Item = &'a Type;
    type IntoIter = std::slice::Iter<'a, Type>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
