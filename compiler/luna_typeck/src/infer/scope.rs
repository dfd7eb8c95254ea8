//! Lexical name resolution.
//!
//! A name resolves to the nearest declaration visible from the use site:
//! earlier `local` statements in enclosing blocks, parameters of enclosing
//! functions, loop variables, and `self` inside colon methods. Anything else
//! is a global and is looked up in the registry.

use luna_ir::{NodeId, NodeKind};
use luna_types::Type;

use super::InferCtx;
use crate::annotations::{self, doc_of};

/// Where a local name was declared.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Declaration {
    /// Name `index` of a `local` statement.
    Local { stmt: NodeId, index: usize },
    LocalFunction(NodeId),
    /// Parameter `index` of a function declaration or closure.
    Param { function: NodeId, index: usize },
    /// Implicit receiver of a colon method.
    SelfParam(NodeId),
    NumericFor,
    GenericFor,
}

impl InferCtx<'_> {
    /// Find the declaration `name` refers to at `use_site`.
    pub(crate) fn lookup(&self, use_site: NodeId, name: &str) -> Option<Declaration> {
        let tree = self.tree;
        let mut child = use_site;
        for scope in tree.ancestors(use_site) {
            match tree.kind(scope) {
                NodeKind::Block { stmts } => {
                    let position = stmts.iter().position(|&stmt| stmt == child);
                    // A local function sees itself.
                    if let Some(stmt) = position.map(|at| stmts[at]) {
                        if self.local_function_named(stmt, name) {
                            return Some(Declaration::LocalFunction(stmt));
                        }
                    }
                    let visible = &stmts[..position.unwrap_or(stmts.len())];
                    for &stmt in visible.iter().rev() {
                        match tree.kind(stmt) {
                            NodeKind::Local(local) => {
                                if let Some(index) = local.names.iter().rposition(|b| b.name == name) {
                                    return Some(Declaration::Local { stmt, index });
                                }
                            }
                            NodeKind::Function(_) if self.local_function_named(stmt, name) => {
                                return Some(Declaration::LocalFunction(stmt));
                            }
                            _ => {}
                        }
                    }
                }
                NodeKind::Function(decl) if decl.body.block == child => {
                    if let Some(index) = decl.body.params.iter().position(|b| b.name == name) {
                        return Some(Declaration::Param {
                            function: scope,
                            index,
                        });
                    }
                    if decl.is_method && name == "self" {
                        return Some(Declaration::SelfParam(scope));
                    }
                }
                NodeKind::Closure(body) if body.block == child => {
                    if let Some(index) = body.params.iter().position(|b| b.name == name) {
                        return Some(Declaration::Param {
                            function: scope,
                            index,
                        });
                    }
                }
                NodeKind::NumericFor { var, block, .. } if *block == child && var.name == name => {
                    return Some(Declaration::NumericFor);
                }
                NodeKind::GenericFor { vars, block, .. }
                    if *block == child && vars.iter().any(|b| b.name == name) =>
                {
                    return Some(Declaration::GenericFor);
                }
                _ => {}
            }
            child = scope;
        }
        None
    }

    fn local_function_named(&self, stmt: NodeId, name: &str) -> bool {
        let tree = self.tree;
        match tree.kind(stmt) {
            NodeKind::Function(decl) if decl.is_local => {
                matches!(tree.kind(decl.name), NodeKind::Name(n) if n == name)
            }
            _ => false,
        }
    }

    pub(crate) fn resolve_name(&mut self, use_site: NodeId, name: &str) -> Type {
        match self.lookup(use_site, name) {
            Some(declaration) => self.declaration_type(declaration),
            None => self.global_type(name),
        }
    }

    fn declaration_type(&mut self, declaration: Declaration) -> Type {
        let tree = self.tree;
        match declaration {
            Declaration::Local { stmt, index } => {
                let NodeKind::Local(local) = tree.kind(stmt) else {
                    return Type::Unknown;
                };
                let value = local.values.get(index).copied();
                if index == 0 {
                    if let Some(doc) = doc_of(tree, stmt) {
                        if let Some(value) = value.filter(|&v| matches!(tree.kind(v), NodeKind::Closure(_))) {
                            if annotations::has_signature_tags(doc) {
                                return Type::Function(self.function_of(value));
                            }
                        }
                        if let Some(declared) = annotations::declared_variable_type(doc) {
                            return declared;
                        }
                    }
                }
                match value {
                    Some(value) => self.infer(value),
                    None if local.values.is_empty() => Type::Nil,
                    // Extra names after a multi-value call.
                    None => Type::Unknown,
                }
            }
            Declaration::LocalFunction(stmt) => Type::Function(self.function_of(stmt)),
            Declaration::Param { function, index } => self
                .function_of(function)
                .main()
                .params
                .get(index)
                .map_or(Type::Unknown, |param| param.ty.clone()),
            Declaration::SelfParam(function) => match tree.kind(function) {
                NodeKind::Function(decl) => match tree.kind(decl.name) {
                    NodeKind::Field { object, .. } => self.infer(*object),
                    _ => Type::Unknown,
                },
                _ => Type::Unknown,
            },
            Declaration::NumericFor => Type::number(),
            Declaration::GenericFor => Type::Unknown,
        }
    }

    /// A name with no local declaration.
    ///
    /// A class declared under exactly this name wins over a global variable,
    /// so global tables used as classes resolve to their class.
    fn global_type(&self, name: &str) -> Type {
        if let Some(decl) = self
            .registry
            .resolve(name)
            .filter(|decl| decl.qualified_name == name)
        {
            return Type::class(&decl.qualified_name);
        }
        self.registry
            .global(name)
            .map_or(Type::Unknown, |global| global.ty.clone())
    }
}
