//! Expression type inference.
//!
//! [`InferCtx`] answers "what is the static type of this node?" for one
//! syntax tree against one registry snapshot. Results are cached for the
//! lifetime of the context, which is one diagnostic pass; a fresh context
//! must be created after any file or registry change.
//!
//! Inference never fails. Anything it cannot resolve is `Unknown`.
//!
//! # Module Organization
//!
//! - `scope`: lexical name resolution
//! - `call`: calls, argument alignment and generic return binding

mod call;
mod scope;

use luna_ir::{ensure_sufficient_stack, BinaryOp, NodeId, NodeKind, SyntaxTree, UnaryOp};
use luna_types::{ClassRegistry, FunctionType, Signature, Type, TypeResolver};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::annotations::{self, doc_of};

pub(crate) use call::aligned_arguments;

/// Alias chains longer than this are treated as unresolvable.
const MAX_ALIAS_DEPTH: usize = 16;

/// Per-pass inference state.
pub struct InferCtx<'a> {
    tree: &'a SyntaxTree,
    registry: &'a ClassRegistry,
    cache: FxHashMap<NodeId, Type>,
    functions: FxHashMap<NodeId, FunctionType>,
    /// Nodes whose inference is on the current call stack.
    in_progress: FxHashSet<NodeId>,
    /// Functions whose return type is being inferred.
    functions_in_progress: FxHashSet<NodeId>,
}

impl<'a> InferCtx<'a> {
    pub fn new(tree: &'a SyntaxTree, registry: &'a ClassRegistry) -> Self {
        InferCtx {
            tree,
            registry,
            cache: FxHashMap::default(),
            functions: FxHashMap::default(),
            in_progress: FxHashSet::default(),
            functions_in_progress: FxHashSet::default(),
        }
    }

    pub fn tree(&self) -> &'a SyntaxTree {
        self.tree
    }

    pub fn registry(&self) -> &'a ClassRegistry {
        self.registry
    }

    /// Infer the type of `node`.
    ///
    /// Re-entering a node whose inference is still running yields `Unknown`.
    pub fn infer(&mut self, node: NodeId) -> Type {
        if let Some(ty) = self.cache.get(&node) {
            return ty.clone();
        }
        if !self.in_progress.insert(node) {
            tracing::trace!(node = node.raw(), "recursive inference");
            return Type::Unknown;
        }
        let ty = ensure_sufficient_stack(|| self.infer_node(node));
        self.in_progress.remove(&node);
        tracing::trace!(node = node.raw(), %ty, "inferred");
        self.cache.insert(node, ty.clone());
        ty
    }

    fn infer_node(&mut self, node: NodeId) -> Type {
        let tree = self.tree;
        match tree.kind(node) {
            NodeKind::Nil => Type::Nil,
            NodeKind::Bool(_) => Type::boolean(),
            NodeKind::Number(_) => Type::number(),
            NodeKind::Str(_) => Type::string(),
            NodeKind::Table { .. } => Type::table(),
            NodeKind::Vararg => self.vararg_type(node),
            NodeKind::Closure(_) => Type::Function(self.function_of(node)),
            NodeKind::Name(name) => self.resolve_name(node, name),
            NodeKind::Field { object, name } => {
                let object = self.infer(*object);
                self.member_type(&object, name)
            }
            NodeKind::Index { object, key } => self.index_type(*object, *key),
            NodeKind::Call(call) => self.infer_call(call),
            NodeKind::Binary { op, lhs, rhs } => self.binary_type(*op, *lhs, *rhs),
            NodeKind::Unary { op, .. } => match op {
                UnaryOp::Not => Type::boolean(),
                UnaryOp::Neg | UnaryOp::Len | UnaryOp::BitNot => Type::number(),
            },
            NodeKind::Paren { inner } => self.infer(*inner),
            _ => Type::Unknown,
        }
    }

    /// Signature set of a `function` declaration or closure node.
    pub fn function_of(&mut self, node: NodeId) -> FunctionType {
        if let Some(func) = self.functions.get(&node) {
            return func.clone();
        }
        let tree = self.tree;
        let (body, is_method, doc) = match tree.kind(node) {
            NodeKind::Function(decl) => (&decl.body, decl.is_method, doc_of(tree, node)),
            NodeKind::Closure(body) => (body, false, self.closure_doc(node)),
            _ => return FunctionType::new(Signature::default()),
        };
        if !self.functions_in_progress.insert(node) {
            return annotations::function_type(body, is_method, doc, || Type::Unknown);
        }
        let func = annotations::function_type(body, is_method, doc, || {
            self.infer_returns(body.block)
        });
        self.functions_in_progress.remove(&node);
        self.functions.insert(node, func.clone());
        func
    }

    /// The annotation of `local f = function() end` style declarations.
    fn closure_doc(&self, closure: NodeId) -> Option<&'a luna_ir::DocComment> {
        let tree = self.tree;
        let parent = tree.parent(closure)?;
        doc_of(tree, parent).filter(|doc| annotations::has_signature_tags(doc))
    }

    /// Union of what the function body returns; `nil` when nothing is.
    fn infer_returns(&mut self, block: NodeId) -> Type {
        let tree = self.tree;
        let returns: Vec<Type> = return_statements(tree, block)
            .into_iter()
            .map(|ret| match tree.kind(ret) {
                NodeKind::Return { values } => match values.first() {
                    Some(&value) => self.infer(value),
                    None => Type::Nil,
                },
                _ => Type::Nil,
            })
            .collect();
        if returns.is_empty() {
            Type::Nil
        } else {
            Type::union(returns)
        }
    }

    fn vararg_type(&mut self, node: NodeId) -> Type {
        let tree = self.tree;
        let function = tree
            .ancestors(node)
            .find(|&id| matches!(tree.kind(id), NodeKind::Function(_) | NodeKind::Closure(_)));
        match function {
            Some(function) => self
                .function_of(function)
                .main()
                .varargs
                .clone()
                .unwrap_or(Type::Unknown),
            None => Type::Unknown,
        }
    }

    /// Type of `object.name` for an object of type `object`.
    pub fn member_type(&self, object: &Type, name: &str) -> Type {
        self.member_type_at(object, name, 0)
    }

    fn member_type_at(&self, object: &Type, name: &str, depth: usize) -> Type {
        let found: Vec<Type> = object
            .members()
            .iter()
            .filter_map(|member| match member {
                Type::Class(class) => self.class_member(class, name, depth),
                _ => None,
            })
            .collect();
        if found.is_empty() {
            Type::Unknown
        } else {
            Type::union(found)
        }
    }

    fn class_member(&self, class: &str, name: &str, depth: usize) -> Option<Type> {
        if let Some(member) = self.registry.find_member(class, name) {
            return Some(member.ty());
        }
        if let Some(target) = self.registry.alias_target(class) {
            if depth >= MAX_ALIAS_DEPTH {
                return None;
            }
            return match target {
                Type::Class(inner) => self.class_member(inner, name, depth + 1),
                other => Some(self.member_type_at(other, name, depth + 1))
                    .filter(|ty| !ty.is_unknown()),
            };
        }
        // `ns.Class` reached through a namespace table.
        let nested = format!("{class}.{name}");
        self.registry
            .resolve(&nested)
            .filter(|decl| decl.qualified_name == nested)
            .map(|decl| Type::class(&decl.qualified_name))
    }

    fn index_type(&mut self, object: NodeId, key: NodeId) -> Type {
        let object = self.infer(object);
        match (&object, self.tree.kind(key)) {
            (Type::Array(element), _) => (**element).clone(),
            (Type::Tuple(items), NodeKind::Number(text)) => text
                .parse::<usize>()
                .ok()
                .and_then(|index| index.checked_sub(1))
                .and_then(|index| items.get(index).cloned())
                .unwrap_or(Type::Unknown),
            (Type::Class(_) | Type::Union(_), NodeKind::Str(name)) => self.member_type(&object, name),
            _ => Type::Unknown,
        }
    }

    fn binary_type(&mut self, op: BinaryOp, lhs: NodeId, rhs: NodeId) -> Type {
        match op {
            BinaryOp::Concat => Type::string(),
            op if op.is_comparison() => Type::boolean(),
            BinaryOp::And => self.infer(rhs),
            BinaryOp::Or => {
                let left = self.infer(lhs);
                let right = self.infer(rhs);
                if left.is_nil() {
                    return right;
                }
                let left = left.without_nil();
                if left.is_unknown() || right.is_unknown() {
                    Type::Unknown
                } else {
                    Type::union([left, right])
                }
            }
            _ => Type::number(),
        }
    }
}

/// `return` statements belonging to the function whose body is `block`,
/// skipping nested functions.
pub(crate) fn return_statements(tree: &SyntaxTree, block: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack = vec![block];
    while let Some(id) = stack.pop() {
        match tree.kind(id) {
            NodeKind::Return { .. } => out.push(id),
            NodeKind::Function(_) | NodeKind::Closure(_) => continue,
            _ => {}
        }
        let children = tree.children(id);
        stack.extend(children.into_iter().rev());
    }
    out
}

/// Type of a value that can be read off its syntax alone.
///
/// Used while indexing, before the registry is complete.
pub(crate) fn literal_type(tree: &SyntaxTree, node: NodeId) -> Type {
    match tree.kind(node) {
        NodeKind::Nil => Type::Nil,
        NodeKind::Bool(_) => Type::boolean(),
        NodeKind::Number(_) => Type::number(),
        NodeKind::Str(_) => Type::string(),
        NodeKind::Table { .. } => Type::table(),
        NodeKind::Closure(body) => Type::Function(annotations::function_type(body, false, None, || {
            literal_return(tree, body.block)
        })),
        NodeKind::Paren { inner } => literal_type(tree, *inner),
        NodeKind::Binary { op, .. } => match op {
            BinaryOp::Concat => Type::string(),
            op if op.is_comparison() => Type::boolean(),
            BinaryOp::And | BinaryOp::Or => Type::Unknown,
            _ => Type::number(),
        },
        NodeKind::Unary { op, .. } => match op {
            UnaryOp::Not => Type::boolean(),
            _ => Type::number(),
        },
        _ => Type::Unknown,
    }
}

/// [`literal_type`] over a function's `return` statements.
pub(crate) fn literal_return(tree: &SyntaxTree, block: NodeId) -> Type {
    let returns: Vec<Type> = return_statements(tree, block)
        .into_iter()
        .map(|ret| match tree.kind(ret) {
            NodeKind::Return { values } => values
                .first()
                .map_or(Type::Nil, |&value| literal_type(tree, value)),
            _ => Type::Nil,
        })
        .collect();
    if returns.is_empty() {
        Type::Nil
    } else {
        Type::union(returns)
    }
}
