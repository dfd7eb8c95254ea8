//! The per-file diagnostics pass.
//!
//! One pre-order walk over the tree produces, in source order:
//! - a diagnostic per syntax error (a warning when it sits inside an
//!   annotation comment)
//! - "non-complete statement" for expression statements that are not calls
//! - argument type mismatches, when parameter validation is on
//!
//! Every pass starts from scratch with a fresh [`InferCtx`]; the caller
//! replaces the file's previous diagnostics with the result.

use luna_diagnostic::{Diagnostic, ErrorCode, Severity};
use luna_ir::{CallExpr, LineIndex, NodeId, NodeKind, SyntaxTree};
use luna_types::{ClassRegistry, Signature};

use crate::check::{type_check, CheckOptions};
use crate::infer::{aligned_arguments, InferCtx};

/// Diagnose one parsed file against the current registry.
#[tracing::instrument(level = "debug", skip_all, fields(nodes = tree.len()))]
pub fn diagnose_file(
    tree: &SyntaxTree,
    text: &str,
    registry: &ClassRegistry,
    options: &CheckOptions,
) -> Vec<Diagnostic> {
    let mut pass = DiagnosticPass {
        ctx: InferCtx::new(tree, registry),
        text,
        lines: LineIndex::new(text),
        options,
        out: Vec::new(),
    };
    for id in tree.preorder() {
        pass.visit(id);
    }
    tracing::debug!(count = pass.out.len(), "diagnosed");
    pass.out
}

struct DiagnosticPass<'a> {
    ctx: InferCtx<'a>,
    text: &'a str,
    lines: LineIndex,
    options: &'a CheckOptions,
    out: Vec<Diagnostic>,
}

impl DiagnosticPass<'_> {
    fn visit(&mut self, id: NodeId) {
        let tree = self.ctx.tree();
        match tree.kind(id) {
            NodeKind::Error { message } => {
                let (code, severity) = if tree.is_inside_doc(id) {
                    (ErrorCode::E1003, Severity::Warning)
                } else {
                    (ErrorCode::E1001, Severity::Error)
                };
                self.report(code, severity, message.clone(), id);
            }
            NodeKind::ExprStat { expr } => {
                if !tree.kind(*expr).is_call() && !tree.has_error_below(id) {
                    self.report(
                        ErrorCode::E1002,
                        Severity::Error,
                        "non-complete statement".to_owned(),
                        id,
                    );
                }
            }
            NodeKind::Call(call) if self.options.parameter_validation => self.validate_call(call),
            _ => {}
        }
    }

    /// Check the arguments against every function the callee may be.
    fn validate_call(&mut self, call: &CallExpr) {
        for sig in self.ctx.call_signatures(call) {
            self.validate_signature(&sig, call);
        }
    }

    fn validate_signature(&mut self, sig: &Signature, call: &CallExpr) {
        for (param, arg) in aligned_arguments(sig, call) {
            if type_check(&param.ty, arg, &mut self.ctx, self.options) {
                continue;
            }
            let registry = self.ctx.registry();
            let arg_ty = self.ctx.infer(arg);
            let message = format!(
                "argument type `{}` does not match parameter `{}` of type `{}`",
                registry.display_name(&arg_ty),
                param.name,
                registry.display_name(&param.ty),
            );
            self.report(ErrorCode::E2001, Severity::Warning, message, arg);
        }
    }

    fn report(&mut self, code: ErrorCode, severity: Severity, message: String, node: NodeId) {
        let span = self.ctx.tree().span(node);
        self.out.push(Diagnostic::at_span(
            code,
            severity,
            message,
            self.text,
            &self.lines,
            span,
        ));
    }
}
