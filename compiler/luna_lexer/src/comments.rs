//! Grouping of `---` comment lines into annotation blocks.

use luna_ir::Span;

use crate::{Comment, CommentKind};

/// One `---` line with its leading dashes stripped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocLine<'src> {
    /// Text after `---`.
    pub text: &'src str,
    /// Byte offset of `text` in the source.
    pub offset: u32,
}

/// Consecutive `---` lines with nothing but whitespace between them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DocBlock<'src> {
    pub span: Span,
    pub lines: Vec<DocLine<'src>>,
}

/// Collect the annotation blocks of a file in source order.
///
/// Two doc lines belong to the same block when exactly one line break
/// separates them; a blank line or any code in between starts a new block.
pub fn doc_blocks<'src>(source: &'src str, comments: &[Comment]) -> Vec<DocBlock<'src>> {
    let mut blocks: Vec<DocBlock<'src>> = Vec::new();
    for comment in comments.iter().filter(|c| c.kind == CommentKind::Doc) {
        let start = comment.span.start as usize;
        let end = comment.span.end as usize;
        let Some(raw) = source.get(start..end) else {
            continue;
        };
        let text = raw.trim_start_matches('-');
        let skipped = raw.len() - text.len();
        let line = DocLine {
            text: text.trim_end_matches('\r'),
            offset: comment.span.start + u32::try_from(skipped).unwrap_or(0),
        };

        let joins_previous = blocks.last().is_some_and(|block| {
            source
                .get(block.span.end as usize..start)
                .is_some_and(|gap| is_single_line_break(gap))
        });
        match blocks.last_mut() {
            Some(block) if joins_previous => {
                block.span = block.span.merge(comment.span);
                block.lines.push(line);
            }
            _ => blocks.push(DocBlock {
                span: comment.span,
                lines: vec![line],
            }),
        }
    }
    blocks
}

fn is_single_line_break(gap: &str) -> bool {
    gap.chars().all(char::is_whitespace) && gap.matches('\n').count() == 1
}
