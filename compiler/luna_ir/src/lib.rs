//! Luna IR - shared data structures for the Luna language tools.
//!
//! This crate holds everything the analysis crates agree on before any
//! type information exists:
//! - Spans and the line index used to turn byte offsets into editor positions
//! - `FileId`, the normalized identity of a tracked source file
//! - The syntax tree arena produced by the parser collaborator
//! - The [`SourceParser`] trait, the seam between the core and any concrete parser
//!
//! The tree is flat: nodes live in one `Vec` and refer to each other through
//! [`NodeId`] indices, so a whole file's tree can be dropped in one go when
//! the file changes.

/// Compile-time assertion that a type has a specific size.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

pub mod ast;
mod file_id;
mod line_index;
mod parser;
mod span;
mod stack;

pub use ast::{
    AssignStmt, BinaryOp, Binding, CallExpr, DocComment, DocTag, DocTagKind, FunctionBody,
    FunctionDecl, FunctionTypeExpr, IfClause, LocalStmt, Node, NodeId, NodeKind, ParamTypeExpr,
    SyntaxTree, TableField, TreeBuilder, TypeExpr, UnaryOp, Visibility,
};
pub use file_id::FileId;
pub use line_index::{LineIndex, Position, Range};
pub use parser::SourceParser;
pub use span::Span;
pub use stack::ensure_sufficient_stack;
