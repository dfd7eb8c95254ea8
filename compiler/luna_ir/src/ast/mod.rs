//! Syntax tree node definitions.
//!
//! One [`Node`] per statement, expression, block, annotation comment or
//! syntax error. Children are referenced by [`NodeId`]; every node except
//! the root records its parent so analyses can walk outwards (scope lookup,
//! "is this error inside an annotation?").
//!
//! Annotation comments are data-heavy but not expression-like, so their tags
//! are stored inline in [`DocComment`] rather than as separate nodes. Only
//! malformed annotations produce child nodes (`Error` nodes whose parent is
//! the `DocComment`).

mod tree;

pub use tree::{Children, Preorder, SyntaxTree, TreeBuilder};

use crate::Span;

/// Index of a node inside its [`SyntaxTree`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        NodeId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub parent: Option<NodeId>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// Root of a file.
    Chunk { block: NodeId },
    Block { stmts: Vec<NodeId> },

    // ===== Statements =====
    Local(LocalStmt),
    Assign(AssignStmt),
    /// An expression used as a statement. Only calls are complete statements.
    ExprStat { expr: NodeId },
    Function(FunctionDecl),
    Return { values: Vec<NodeId> },
    If {
        clauses: Vec<IfClause>,
        else_block: Option<NodeId>,
    },
    While { cond: NodeId, block: NodeId },
    Repeat { block: NodeId, cond: NodeId },
    NumericFor {
        var: Binding,
        start: NodeId,
        limit: NodeId,
        step: Option<NodeId>,
        block: NodeId,
    },
    GenericFor {
        vars: Vec<Binding>,
        exprs: Vec<NodeId>,
        block: NodeId,
    },
    Do { block: NodeId },
    Break,
    Goto { label: String },
    Label { name: String },
    DocComment(DocComment),

    // ===== Expressions =====
    Nil,
    Bool(bool),
    /// Numeric literal, kept as written.
    Number(String),
    /// String literal contents without quotes.
    Str(String),
    Vararg,
    Name(String),
    Field { object: NodeId, name: String },
    Index { object: NodeId, key: NodeId },
    Call(CallExpr),
    Table { fields: Vec<TableField> },
    Closure(FunctionBody),
    Binary {
        op: BinaryOp,
        lhs: NodeId,
        rhs: NodeId,
    },
    Unary { op: UnaryOp, operand: NodeId },
    Paren { inner: NodeId },

    /// A syntax error. Parsing continues after it.
    Error { message: String },
}

impl NodeKind {
    pub fn is_error(&self) -> bool {
        matches!(self, NodeKind::Error { .. })
    }

    pub fn is_call(&self) -> bool {
        matches!(self, NodeKind::Call(_))
    }

    /// Annotation comment attached to a declaration statement, if any.
    pub fn doc(&self) -> Option<NodeId> {
        match self {
            NodeKind::Local(local) => local.doc,
            NodeKind::Assign(assign) => assign.doc,
            NodeKind::Function(decl) => decl.doc,
            _ => None,
        }
    }
}

/// A declared name together with where it was written.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Binding {
    pub name: String,
    pub span: Span,
}

impl Binding {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Binding {
            name: name.into(),
            span,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LocalStmt {
    pub names: Vec<Binding>,
    pub values: Vec<NodeId>,
    pub doc: Option<NodeId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AssignStmt {
    pub targets: Vec<NodeId>,
    pub values: Vec<NodeId>,
    pub doc: Option<NodeId>,
}

/// `function a.b:c(...) end` or `local function f(...) end`.
///
/// `name` is a `Name` node, or a `Field` chain for dotted names. For colon
/// declarations the last `Field` holds the method name and `is_method` is set.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDecl {
    pub name: NodeId,
    pub is_local: bool,
    pub is_method: bool,
    pub body: FunctionBody,
    pub doc: Option<NodeId>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionBody {
    pub params: Vec<Binding>,
    pub is_vararg: bool,
    pub block: NodeId,
}

/// A call. For `obj:m(...)` the callee is the `Field` node `obj.m` and
/// `is_colon` is set; the receiver is not part of `args`.
#[derive(Clone, Debug, PartialEq)]
pub struct CallExpr {
    pub callee: NodeId,
    pub args: Vec<NodeId>,
    pub is_colon: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TableField {
    Positional(NodeId),
    Named { name: String, value: NodeId },
    Keyed { key: NodeId, value: NodeId },
}

#[derive(Clone, Debug, PartialEq)]
pub struct IfClause {
    pub cond: NodeId,
    pub block: NodeId,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Or,
    And,
    Lt,
    Gt,
    Le,
    Ge,
    Ne,
    Eq,
    BitOr,
    BitXor,
    BitAnd,
    Shl,
    Shr,
    Concat,
    Add,
    Sub,
    Mul,
    Div,
    IDiv,
    Mod,
    Pow,
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge | BinaryOp::Ne | BinaryOp::Eq
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Neg,
    Len,
    BitNot,
}

// ===== Annotation comments =====

/// A run of `---` comment lines directly above a statement.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct DocComment {
    pub tags: Vec<DocTag>,
    /// Free text lines (without the leading dashes), joined by newlines.
    pub description: String,
    /// `Error` child nodes for malformed tags.
    pub errors: Vec<NodeId>,
}

impl DocComment {
    pub fn tags(&self) -> impl Iterator<Item = &DocTagKind> {
        self.tags.iter().map(|tag| &tag.kind)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DocTag {
    pub kind: DocTagKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DocTagKind {
    Class {
        name: String,
        super_name: Option<String>,
    },
    Field {
        visibility: Visibility,
        name: String,
        optional: bool,
        ty: TypeExpr,
    },
    Param {
        name: String,
        optional: bool,
        ty: TypeExpr,
    },
    Return { types: Vec<TypeExpr> },
    Type { ty: TypeExpr },
    Overload { ty: FunctionTypeExpr },
    Alias { name: String, ty: TypeExpr },
    Generic { names: Vec<String> },
    Vararg { ty: TypeExpr },
}

/// Member visibility written in `@field` annotations.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

/// A type as written in an annotation, before name resolution.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    /// `number`, `nil`, `any`, `Ns.Class`, a generic parameter...
    Name(String),
    /// `T[]`
    Array(Box<TypeExpr>),
    /// `[A, B]`
    Tuple(Vec<TypeExpr>),
    /// `A | B`
    Union(Vec<TypeExpr>),
    Function(FunctionTypeExpr),
    /// `table<K, V>` and other parameterized names.
    Applied { base: String, args: Vec<TypeExpr> },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct FunctionTypeExpr {
    pub params: Vec<ParamTypeExpr>,
    pub returns: Vec<TypeExpr>,
    pub vararg: Option<Box<TypeExpr>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParamTypeExpr {
    pub name: String,
    pub optional: bool,
    pub ty: TypeExpr,
}
