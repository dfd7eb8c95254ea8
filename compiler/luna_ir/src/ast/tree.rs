//! The node arena and its traversal helpers.

use smallvec::SmallVec;

use super::{Node, NodeId, NodeKind, TableField};
use crate::Span;

/// Children of one node, in source order.
pub type Children = SmallVec<[NodeId; 4]>;

/// A parsed file: a flat arena of nodes plus the root chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl SyntaxTree {
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    #[inline]
    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, id: NodeId) -> Children {
        child_ids(self.kind(id))
    }

    /// Parent chain of `id`, nearest first, excluding `id` itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&current| self.parent(current))
    }

    /// Pre-order walk of the subtree rooted at `id`, `id` first.
    pub fn descendants(&self, id: NodeId) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: vec![id],
        }
    }

    /// Pre-order walk of the whole file.
    pub fn preorder(&self) -> Preorder<'_> {
        self.descendants(self.root)
    }

    /// Whether any node strictly below `id` is a syntax error.
    pub fn has_error_below(&self, id: NodeId) -> bool {
        self.descendants(id)
            .skip(1)
            .any(|node| self.kind(node).is_error())
    }

    /// Whether `id` sits inside an annotation comment.
    pub fn is_inside_doc(&self, id: NodeId) -> bool {
        self.ancestors(id)
            .any(|node| matches!(self.kind(node), NodeKind::DocComment(_)))
    }

    /// Every syntax error node in the file, in source order.
    pub fn errors(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.preorder().filter(|&id| self.kind(id).is_error())
    }
}

/// Explicit-stack pre-order iterator, safe on arbitrarily deep trees.
pub struct Preorder<'a> {
    tree: &'a SyntaxTree,
    stack: Vec<NodeId>,
}

impl Iterator for Preorder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        let children = self.tree.children(id);
        self.stack.extend(children.into_iter().rev());
        Some(id)
    }
}

/// Allocates nodes while parsing and links parents when done.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId::from_raw(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(Node {
            kind,
            span,
            parent: None,
        });
        id
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn kind_mut(&mut self, id: NodeId) -> &mut NodeKind {
        &mut self.nodes[id.index()].kind
    }

    pub fn set_span(&mut self, id: NodeId, span: Span) {
        self.nodes[id.index()].span = span;
    }

    /// Freeze the arena, filling every child's parent link.
    pub fn finish(mut self, root: NodeId) -> SyntaxTree {
        for index in 0..self.nodes.len() {
            let parent = NodeId::from_raw(u32::try_from(index).unwrap_or(u32::MAX));
            for child in child_ids(&self.nodes[index].kind) {
                self.nodes[child.index()].parent = Some(parent);
            }
        }
        SyntaxTree {
            nodes: self.nodes,
            root,
        }
    }
}

fn child_ids(kind: &NodeKind) -> Children {
    let mut out = Children::new();
    match kind {
        NodeKind::Chunk { block } | NodeKind::Do { block } => out.push(*block),
        NodeKind::Block { stmts } => out.extend(stmts.iter().copied()),
        NodeKind::Local(local) => out.extend(local.values.iter().copied()),
        NodeKind::Assign(assign) => {
            out.extend(assign.targets.iter().copied());
            out.extend(assign.values.iter().copied());
        }
        NodeKind::ExprStat { expr } => out.push(*expr),
        NodeKind::Function(decl) => {
            out.push(decl.name);
            out.push(decl.body.block);
        }
        NodeKind::Return { values } => out.extend(values.iter().copied()),
        NodeKind::If {
            clauses,
            else_block,
        } => {
            for clause in clauses {
                out.push(clause.cond);
                out.push(clause.block);
            }
            out.extend(*else_block);
        }
        NodeKind::While { cond, block } => {
            out.push(*cond);
            out.push(*block);
        }
        NodeKind::Repeat { block, cond } => {
            out.push(*block);
            out.push(*cond);
        }
        NodeKind::NumericFor {
            start,
            limit,
            step,
            block,
            ..
        } => {
            out.push(*start);
            out.push(*limit);
            out.extend(*step);
            out.push(*block);
        }
        NodeKind::GenericFor { exprs, block, .. } => {
            out.extend(exprs.iter().copied());
            out.push(*block);
        }
        NodeKind::DocComment(doc) => out.extend(doc.errors.iter().copied()),
        NodeKind::Field { object, .. } => out.push(*object),
        NodeKind::Index { object, key } => {
            out.push(*object);
            out.push(*key);
        }
        NodeKind::Call(call) => {
            out.push(call.callee);
            out.extend(call.args.iter().copied());
        }
        NodeKind::Table { fields } => {
            for field in fields {
                match field {
                    TableField::Positional(value) | TableField::Named { value, .. } => {
                        out.push(*value);
                    }
                    TableField::Keyed { key, value } => {
                        out.push(*key);
                        out.push(*value);
                    }
                }
            }
        }
        NodeKind::Closure(body) => out.push(body.block),
        NodeKind::Binary { lhs, rhs, .. } => {
            out.push(*lhs);
            out.push(*rhs);
        }
        NodeKind::Unary { operand, .. } => out.push(*operand),
        NodeKind::Paren { inner } => out.push(*inner),
        NodeKind::Break
        | NodeKind::Goto { .. }
        | NodeKind::Label { .. }
        | NodeKind::Nil
        | NodeKind::Bool(_)
        | NodeKind::Number(_)
        | NodeKind::Str(_)
        | NodeKind::Vararg
        | NodeKind::Name(_)
        | NodeKind::Error { .. } => {}
    }
    out
}
