//! Recursive descent parser for Luna sources.
//!
//! Produces a flat [`SyntaxTree`]. Syntax errors never abort the parse:
//! each one becomes an `Error` node and the parser resynchronises at the
//! next statement boundary. `---` annotation blocks are parsed by the
//! [`doc`] module and attached to the declaration directly below them.

mod cursor;
pub mod doc;
mod grammar;
mod recovery;

use luna_ir::{NodeId, NodeKind, SourceParser, Span, SyntaxTree, TreeBuilder};
use luna_lexer::{doc_blocks, lex, DocBlock, TokenKind};

use cursor::Cursor;

/// The parser collaborator handed to the workspace.
#[derive(Copy, Clone, Debug, Default)]
pub struct LuaParser;

impl SourceParser for LuaParser {
    fn parse(&self, text: &str) -> SyntaxTree {
        parse(text)
    }
}

/// Parse a whole file.
#[tracing::instrument(level = "trace", skip_all, fields(len = source.len()))]
pub fn parse(source: &str) -> SyntaxTree {
    let lexed = lex(source);
    let docs = doc_blocks(source, &lexed.comments);
    let parser = Parser::new(&lexed.tokens, source, docs);
    parser.parse_chunk()
}

/// Parser state.
pub(crate) struct Parser<'a> {
    cursor: Cursor<'a>,
    builder: TreeBuilder,
    docs: Vec<DocBlock<'a>>,
    next_doc: usize,
    /// Errors not owned by any expression, flushed into the enclosing block.
    pending_errors: Vec<NodeId>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [luna_lexer::Token], source: &'a str, docs: Vec<DocBlock<'a>>) -> Self {
        Parser {
            cursor: Cursor::new(tokens, source),
            builder: TreeBuilder::new(),
            docs,
            next_doc: 0,
            pending_errors: Vec::new(),
        }
    }

    fn parse_chunk(mut self) -> SyntaxTree {
        let block = self.parse_block_inner(true);
        let end = u32::try_from(self.cursor.source().len()).unwrap_or(u32::MAX);
        self.builder.set_span(block, Span::new(0, end));
        let chunk = self.builder.alloc(NodeKind::Chunk { block }, Span::new(0, end));
        self.builder.finish(chunk)
    }

    /// Allocate an `Error` node.
    fn error_node(&mut self, message: impl Into<String>, span: Span) -> NodeId {
        let message = message.into();
        tracing::trace!(%span, %message, "syntax error");
        self.builder.alloc(NodeKind::Error { message }, span)
    }

    /// Record an error that has no expression slot to live in.
    fn report(&mut self, message: impl Into<String>, span: Span) {
        let error = self.error_node(message, span);
        self.pending_errors.push(error);
    }

    /// Consume `kind` or report what was expected.
    fn expect(&mut self, kind: TokenKind, context: &str) -> bool {
        if self.cursor.eat(kind) {
            return true;
        }
        let found = self.cursor.current_kind().describe();
        let span = self.cursor.current_span();
        self.report(
            format!("expected {} {context}, found {found}", kind.describe()),
            span,
        );
        false
    }

    /// Span from `start` to the end of the last consumed token.
    fn span_from(&self, start: Span) -> Span {
        let end = self.cursor.previous_span();
        if end.end < start.start {
            start
        } else {
            Span::new(start.start, end.end)
        }
    }

    fn alloc(&mut self, kind: NodeKind, span: Span) -> NodeId {
        self.builder.alloc(kind, span)
    }
}

#[cfg(test)]
mod tests;
