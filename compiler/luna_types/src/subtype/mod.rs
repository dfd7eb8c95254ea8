//! The subtype relation.
//!
//! `subtype_of` is policy-free: whether `Unknown` coerces and whether `nil`
//! is accepted everywhere are chosen by the caller through [`SubtypeRules`].
//! Class relationships are looked up by name through a [`TypeResolver`] on
//! every call; a missing link ends the walk as "not a subtype".

use rustc_hash::FxHashSet;

use crate::ty::{primitive, Type};

/// Alias expansion and superclass chains deeper than this are treated as cycles.
const MAX_DEPTH: u32 = 64;

/// Caller-chosen policy for one subtype query.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SubtypeRules {
    /// `Unknown` is a subtype and a supertype of everything.
    pub allow_coercion: bool,
    /// `nil` is a subtype of everything.
    pub accept_nil: bool,
}

impl SubtypeRules {
    pub const STRICT: SubtypeRules = SubtypeRules {
        allow_coercion: false,
        accept_nil: false,
    };

    pub const fn coercing(accept_nil: bool) -> Self {
        SubtypeRules {
            allow_coercion: true,
            accept_nil,
        }
    }
}

/// Name lookups the subtype relation needs.
pub trait TypeResolver {
    /// Declared superclass name of `class`, if the class is known and has one.
    fn super_class<'a>(&'a self, class: &str) -> Option<&'a str>;

    /// Target of an alias named `name`.
    fn alias_target<'a>(&'a self, name: &str) -> Option<&'a Type>;

    /// Whether two class names denote the same class.
    fn same_class(&self, a: &str, b: &str) -> bool {
        a == b
    }
}

/// Resolver that knows no classes or aliases.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoDeclarations;

impl TypeResolver for NoDeclarations {
    fn super_class<'a>(&'a self, _class: &str) -> Option<&'a str> {
        None
    }

    fn alias_target<'a>(&'a self, _name: &str) -> Option<&'a Type> {
        None
    }
}

/// Whether a value of type `sub` may be used where `sup` is expected.
pub fn subtype_of(sub: &Type, sup: &Type, rules: SubtypeRules, resolver: &impl TypeResolver) -> bool {
    Checker { rules, resolver }.check(sub, sup, 0)
}

struct Checker<'r, R> {
    rules: SubtypeRules,
    resolver: &'r R,
}

impl<R: TypeResolver> Checker<'_, R> {
    fn check(&self, sub: &Type, sup: &Type, depth: u32) -> bool {
        if sub == sup {
            return true;
        }
        if depth > MAX_DEPTH {
            tracing::debug!(%sub, %sup, "subtype check hit depth limit");
            return false;
        }
        if self.rules.allow_coercion && (sub.is_unknown() || sup.is_unknown()) {
            return true;
        }
        if matches!(sub, Type::Generic(_)) || matches!(sup, Type::Generic(_)) {
            return true;
        }
        if sub.is_nil() && self.rules.accept_nil {
            return true;
        }
        // Every member of a union must fit; checked before the union
        // supertype case so `A | B` fits `A | B | C`.
        if let Type::Union(members) = sub {
            return members.iter().all(|m| self.check(m, sup, depth + 1));
        }
        if let Type::Union(members) = sup {
            return members.iter().any(|m| self.check(sub, m, depth + 1));
        }
        if let Some(expanded) = self.expand_alias(sub) {
            return self.check(expanded, sup, depth + 1);
        }
        if let Some(expanded) = self.expand_alias(sup) {
            return self.check(sub, expanded, depth + 1);
        }

        match (sub, sup) {
            (Type::Class(from), Type::Class(to)) => {
                self.resolver.same_class(from, to) || self.inherits(from, to)
            }
            (Type::Class(_) | Type::Array(_) | Type::Tuple(_), Type::Primitive(name)) => {
                name == primitive::TABLE
            }
            (Type::Primitive(from), Type::Primitive(to)) => {
                from == primitive::INTEGER && to == primitive::NUMBER
            }
            (Type::Function(_), Type::Primitive(name)) | (Type::Primitive(name), Type::Function(_)) => {
                name == primitive::FUNCTION
            }
            (Type::Array(from), Type::Array(to)) => self.check(from, to, depth + 1),
            (Type::Tuple(from), Type::Tuple(to)) => {
                from.len() == to.len()
                    && from
                        .iter()
                        .zip(to)
                        .all(|(a, b)| self.check(a, b, depth + 1))
            }
            (Type::Tuple(items), Type::Array(element)) => {
                items.iter().all(|item| self.check(item, element, depth + 1))
            }
            // Any two function shapes are compatible.
            (Type::Function(_), Type::Function(_)) => true,
            _ => false,
        }
    }

    fn expand_alias(&self, ty: &Type) -> Option<&Type> {
        match ty {
            Type::Class(name) => self.resolver.alias_target(name),
            _ => None,
        }
    }

    /// Walk `from`'s superclass chain looking for `to`.
    fn inherits(&self, from: &str, to: &str) -> bool {
        let mut visited: FxHashSet<&str> = FxHashSet::default();
        let mut current = from;
        while visited.insert(current) {
            let Some(parent) = self.resolver.super_class(current) else {
                return false;
            };
            if self.resolver.same_class(parent, to) {
                return true;
            }
            current = parent;
        }
        tracing::debug!(class = from, "cyclic superclass chain");
        false
    }
}
