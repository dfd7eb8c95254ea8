//! Assignability policy.
//!
//! `subtype_of` is the strict relation. This layer adds the escape hatches a
//! table-based object model needs: unknown values, table literals passed as
//! class instances, closures passed as callbacks. Each hatch is a switch in
//! [`CheckOptions`].

use luna_ir::{NodeId, NodeKind};
use luna_types::{subtype_of, SubtypeRules, Type, TypeResolver};

use crate::infer::InferCtx;

const MAX_ALIAS_DEPTH: usize = 16;

/// Process-wide switches for argument checking.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CheckOptions {
    /// Validate call arguments against the callee's signature.
    pub parameter_validation: bool,
    /// A value of unknown type passes any declared type.
    pub unknown_assignable_to_any: bool,
    /// A parameter declared `any` accepts every value.
    pub any_assignable_to_unknown: bool,
    /// A table literal passes a class, array or tuple declared type.
    pub table_literal_escape: bool,
    /// A closure literal passes any function-shaped declared type.
    pub closure_escape: bool,
    /// A `nil` value passes any declared type.
    pub nil_assignable_to_any: bool,
}

impl Default for CheckOptions {
    fn default() -> Self {
        CheckOptions {
            parameter_validation: true,
            unknown_assignable_to_any: true,
            any_assignable_to_unknown: true,
            table_literal_escape: true,
            closure_escape: true,
            nil_assignable_to_any: false,
        }
    }
}

/// Whether the value written at `value` may be passed where `declared` is
/// expected.
///
/// Rules apply in order; the first that passes wins:
/// 1. unknown value, when allowed
/// 2. `any` declared type, when allowed
/// 3. table literal against a class, array or tuple
/// 4. closure literal against a function type
/// 5. `nil` value, when allowed
/// 6. a union declared type passes if any member passes rules 1 to 7
/// 7. the subtype relation, with coercion of `Unknown`
pub fn type_check(declared: &Type, value: NodeId, ctx: &mut InferCtx<'_>, options: &CheckOptions) -> bool {
    let value_ty = ctx.infer(value);
    check_value(declared, value, &value_ty, ctx, options)
}

fn check_value(
    declared: &Type,
    value: NodeId,
    value_ty: &Type,
    ctx: &InferCtx<'_>,
    options: &CheckOptions,
) -> bool {
    let registry = ctx.registry();
    let declared = expand_alias(declared, registry);

    if options.unknown_assignable_to_any && value_ty.is_unknown() {
        return true;
    }
    if options.any_assignable_to_unknown && declared.is_unknown() {
        return true;
    }
    let value_kind = ctx.tree().kind(value);
    if options.table_literal_escape
        && matches!(value_kind, NodeKind::Table { .. })
        && matches!(declared, Type::Class(_) | Type::Array(_) | Type::Tuple(_))
    {
        return true;
    }
    if options.closure_escape && matches!(value_kind, NodeKind::Closure(_)) && declared.is_function_like() {
        return true;
    }
    if options.nil_assignable_to_any && value_ty.is_nil() {
        return true;
    }
    if let Type::Union(members) = &declared {
        if members
            .iter()
            .any(|member| check_value(member, value, value_ty, ctx, options))
        {
            return true;
        }
    }
    subtype_of(
        value_ty,
        &declared,
        SubtypeRules::coercing(options.nil_assignable_to_any),
        registry,
    )
}

/// Replace a declared alias name by its target, so a union alias gets
/// member-wise treatment.
fn expand_alias(declared: &Type, resolver: &impl TypeResolver) -> Type {
    let mut current = declared;
    for _ in 0..MAX_ALIAS_DEPTH {
        match current {
            Type::Class(name) => match resolver.alias_target(name) {
                Some(target) => current = target,
                None => break,
            },
            _ => break,
        }
    }
    current.clone()
}
