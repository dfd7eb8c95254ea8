//! Grammar productions.
//!
//! - `block`: statement lists and annotation attachment
//! - `stmt`: statements
//! - `expr`: expressions, calls and table constructors

mod expr;
mod stmt;

use luna_ir::{ensure_sufficient_stack, NodeId, NodeKind, Span};
use luna_lexer::TokenKind;

use crate::doc::parse_doc_block;
use crate::recovery::BLOCK_END;
use crate::Parser;

impl Parser<'_> {
    pub(crate) fn parse_block(&mut self) -> NodeId {
        self.parse_block_inner(false)
    }

    /// Parse statements until a block closer. At top level a stray closer is
    /// reported and skipped instead of ending the block.
    pub(crate) fn parse_block_inner(&mut self, top_level: bool) -> NodeId {
        ensure_sufficient_stack(|| {
            let start = self.cursor.current_span();
            let mut stmts = Vec::new();
            loop {
                let next = self.cursor.current_span().start;
                let attached = self.flush_docs(next, &mut stmts);
                let kind = self.cursor.current_kind();
                if BLOCK_END.contains(kind) {
                    if top_level && kind != TokenKind::Eof {
                        let message = format!("unexpected {}", kind.describe());
                        let error = self.error_node(message, self.cursor.current_span());
                        self.cursor.advance();
                        stmts.push(error);
                        continue;
                    }
                    break;
                }
                if self.cursor.eat(TokenKind::Semi) {
                    continue;
                }
                let before = self.cursor.position();
                let stmt = self.parse_statement();
                if let Some(doc) = attached {
                    self.attach_doc(stmt, doc);
                }
                stmts.push(stmt);
                stmts.append(&mut self.pending_errors);
                if self.cursor.position() == before {
                    let message = format!("unexpected {}", kind.describe());
                    let error = self.error_node(message, self.cursor.current_span());
                    self.cursor.advance();
                    stmts.push(error);
                }
            }
            let span = self.span_from(Span::point(start.start));
            self.alloc(NodeKind::Block { stmts }, span)
        })
    }

    /// Emit every annotation block that starts before `before` as a
    /// statement. Returns the last one if it sits on the line directly
    /// above `before`.
    fn flush_docs(&mut self, before: u32, stmts: &mut Vec<NodeId>) -> Option<NodeId> {
        let mut attached = None;
        while let Some(block) = self.docs.get(self.next_doc) {
            if block.span.start >= before {
                break;
            }
            let adjacent = directly_above(self.cursor.source(), block.span.end, before);
            let node = parse_doc_block(&mut self.builder, block);
            self.next_doc += 1;
            stmts.push(node);
            attached = adjacent.then_some(node);
        }
        attached
    }

    fn attach_doc(&mut self, stmt: NodeId, doc: NodeId) {
        match self.builder.kind_mut(stmt) {
            NodeKind::Local(local) => local.doc = Some(doc),
            NodeKind::Assign(assign) => assign.doc = Some(doc),
            NodeKind::Function(decl) => decl.doc = Some(doc),
            _ => {}
        }
    }

    /// Whether a line break separates the two spans.
    pub(crate) fn on_new_line(&self, earlier: Span, later: Span) -> bool {
        self.cursor
            .source()
            .get(earlier.end as usize..later.start as usize)
            .is_some_and(|gap| gap.contains('\n'))
    }
}

fn directly_above(source: &str, doc_end: u32, stmt_start: u32) -> bool {
    source
        .get(doc_end as usize..stmt_start as usize)
        .is_some_and(|gap| gap.chars().all(char::is_whitespace) && gap.matches('\n').count() == 1)
}
