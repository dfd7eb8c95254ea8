use crate::SyntaxTree;

/// The parsing collaborator.
///
/// The analysis core never tokenizes or parses on its own; it asks an
/// implementation of this trait for a tree every time a file's text changes.
/// Implementations must never fail: syntax errors become `Error` nodes.
pub trait SourceParser: Send + Sync {
    fn parse(&self, text: &str) -> SyntaxTree;
}
