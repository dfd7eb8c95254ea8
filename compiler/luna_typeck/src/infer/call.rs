//! Call expressions.

use luna_ir::{CallExpr, NodeId};
use luna_types::{Param, Signature, Type};
use rustc_hash::FxHashMap;

use super::InferCtx;

/// Pair each fixed parameter of `sig` with the argument written for it.
///
/// The receiver slot is skipped when call style and declaration style
/// disagree: `obj.m(obj, x)` against `function C:m(x)` drops argument 0,
/// and `obj:m(x)` against `function C.m(self, x)` drops parameter 0.
/// Arguments past the last fixed parameter are not paired.
pub(crate) fn aligned_arguments<'s>(sig: &'s Signature, call: &CallExpr) -> Vec<(&'s Param, NodeId)> {
    let (skip_args, skip_params) = match (sig.is_method_call, call.is_colon) {
        (true, false) => (1, 0),
        (false, true) => (0, 1),
        _ => (0, 0),
    };
    sig.params
        .iter()
        .skip(skip_params)
        .zip(call.args.iter().skip(skip_args).copied())
        .collect()
}

impl InferCtx<'_> {
    /// Signature a call resolves to, if its callee is function-typed.
    pub(crate) fn call_signature(&mut self, call: &CallExpr) -> Option<Signature> {
        self.call_signatures(call).into_iter().next()
    }

    /// The best signature of every function member of the callee's type,
    /// in union order.
    pub(crate) fn call_signatures(&mut self, call: &CallExpr) -> Vec<Signature> {
        let callee = self.infer(call.callee);
        callee
            .members()
            .iter()
            .filter_map(Type::as_function)
            .map(|func| func.find_perfect_signature(call.args.len()).clone())
            .collect()
    }

    pub(super) fn infer_call(&mut self, call: &CallExpr) -> Type {
        match self.call_signature(call) {
            Some(sig) => self.bind_return(&sig, call),
            None => Type::Unknown,
        }
    }

    /// The return type with generic parameters bound from the arguments.
    ///
    /// `T` binds to the first argument declared `T` or `T[]`; parameters
    /// that stay unbound become `Unknown`.
    fn bind_return(&mut self, sig: &Signature, call: &CallExpr) -> Type {
        let Some(generics) = &sig.generic_params else {
            return sig.return_type.clone();
        };
        let mut bound: FxHashMap<&str, Type> = FxHashMap::default();
        for (param, arg) in aligned_arguments(sig, call) {
            match &param.ty {
                Type::Generic(name) if !bound.contains_key(name.as_str()) => {
                    let ty = self.infer(arg);
                    bound.insert(name, ty);
                }
                Type::Array(element) => {
                    if let Type::Generic(name) = &**element {
                        if bound.contains_key(name.as_str()) {
                            continue;
                        }
                        if let Type::Array(arg_element) = self.infer(arg) {
                            bound.insert(name, *arg_element);
                        }
                    }
                }
                _ => {}
            }
        }
        sig.return_type.substitute(&|name| {
            bound
                .get(name)
                .cloned()
                .or_else(|| generics.iter().any(|g| g == name).then_some(Type::Unknown))
        })
    }
}
