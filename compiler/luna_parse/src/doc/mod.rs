//! Annotation comment parsing.
//!
//! A [`DocBlock`] is a run of `---` lines. Lines starting with `@` are tags;
//! the rest form the free-text description. Unknown tags are ignored so
//! annotations written for other tools do not produce noise. Malformed known
//! tags become `Error` children of the resulting `DocComment` node.

mod ty;

use luna_ir::{
    DocComment, DocTag, DocTagKind, NodeId, NodeKind, Span, TreeBuilder, TypeExpr, Visibility,
};
use luna_lexer::{DocBlock, DocLine};

use ty::{Scanner, Tok, TypeError, TypeParser};

pub use ty::parse_type_expr;

/// Parse one annotation block into a `DocComment` node.
pub fn parse_doc_block(builder: &mut TreeBuilder, block: &DocBlock<'_>) -> NodeId {
    let mut doc = DocComment::default();
    let mut description: Vec<&str> = Vec::new();
    for line in &block.lines {
        let trimmed = line.text.trim_start();
        if trimmed.starts_with('@') {
            let at = line.text.len() - trimmed.len();
            match parse_tag(line, at) {
                Ok(Some(tag)) => doc.tags.push(tag),
                Ok(None) => {}
                Err(error) => {
                    let node = builder.alloc(
                        NodeKind::Error {
                            message: error.message,
                        },
                        error.span,
                    );
                    doc.errors.push(node);
                }
            }
        } else {
            description.push(line.text.strip_prefix(' ').unwrap_or(line.text).trim_end());
        }
    }
    doc.description = description.join("\n").trim().to_owned();
    builder.alloc(NodeKind::DocComment(doc), block.span)
}

struct TagError {
    message: String,
    span: Span,
}

/// `at` is the byte position of `@` within the line.
fn parse_tag(line: &DocLine<'_>, at: usize) -> Result<Option<DocTag>, TagError> {
    let mut scanner = Scanner::new(line.text, at + 1);
    let Some(tag) = scanner.ident() else {
        return Ok(None);
    };
    let to_error = |error: TypeError, context: &str| tag_error(line, error.at, &error.message, context);
    let kind = match tag {
        "class" => {
            skip_attributes(&mut scanner);
            let Some(name) = scanner.ident() else {
                return Err(tag_error(line, scanner.pos(), "expected class name", tag));
            };
            let super_name = if scanner.eat(Tok::Colon) {
                match scanner.ident() {
                    Some(super_name) => Some(super_name.to_owned()),
                    None => {
                        return Err(tag_error(line, scanner.pos(), "expected super class name", tag))
                    }
                }
            } else {
                None
            };
            DocTagKind::Class {
                name: name.to_owned(),
                super_name,
            }
        }
        "field" => {
            let visibility = match scanner.peek() {
                Tok::Ident("public" | "package") => Some(Visibility::Public),
                Tok::Ident("protected") => Some(Visibility::Protected),
                Tok::Ident("private") => Some(Visibility::Private),
                _ => None,
            };
            // `@field private number` names a field called "private".
            if visibility.is_some() && matches!(scanner.peek2(), Tok::Ident(_)) {
                scanner.bump();
            }
            if scanner.peek() == Tok::LBracket {
                // Index signatures such as `[string] number` are not modelled.
                return Ok(None);
            }
            let Some(name) = scanner.ident() else {
                return Err(tag_error(line, scanner.pos(), "expected field name", tag));
            };
            let optional = scanner.eat(Tok::Question);
            let ty = TypeParser::new(&mut scanner)
                .parse_type()
                .map_err(|e| to_error(e, tag))?;
            DocTagKind::Field {
                visibility: visibility.unwrap_or_default(),
                name: name.to_owned(),
                optional,
                ty,
            }
        }
        "param" => {
            if scanner.eat(Tok::Ellipsis) {
                let ty = TypeParser::new(&mut scanner)
                    .parse_type()
                    .map_err(|e| to_error(e, tag))?;
                DocTagKind::Vararg { ty }
            } else {
                let Some(name) = scanner.ident() else {
                    return Err(tag_error(line, scanner.pos(), "expected parameter name", tag));
                };
                let optional = scanner.eat(Tok::Question);
                let ty = TypeParser::new(&mut scanner)
                    .parse_type()
                    .map_err(|e| to_error(e, tag))?;
                DocTagKind::Param {
                    name: name.to_owned(),
                    optional,
                    ty,
                }
            }
        }
        "return" => {
            let types = TypeParser::new(&mut scanner)
                .parse_type_list()
                .map_err(|e| to_error(e, tag))?;
            DocTagKind::Return { types }
        }
        "type" => {
            let ty = TypeParser::new(&mut scanner)
                .parse_type()
                .map_err(|e| to_error(e, tag))?;
            DocTagKind::Type { ty }
        }
        "overload" => {
            let start = scanner.pos();
            match TypeParser::new(&mut scanner).parse_type() {
                Ok(TypeExpr::Function(ty)) => DocTagKind::Overload { ty },
                Ok(_) => return Err(tag_error(line, start, "expected function type", tag)),
                Err(e) => return Err(to_error(e, tag)),
            }
        }
        "alias" => {
            let Some(name) = scanner.ident() else {
                return Err(tag_error(line, scanner.pos(), "expected alias name", tag));
            };
            let ty = TypeParser::new(&mut scanner)
                .parse_type()
                .map_err(|e| to_error(e, tag))?;
            DocTagKind::Alias {
                name: name.to_owned(),
                ty,
            }
        }
        "generic" => {
            let mut names = Vec::new();
            loop {
                let Some(name) = scanner.ident() else {
                    return Err(tag_error(line, scanner.pos(), "expected generic name", tag));
                };
                names.push(name.to_owned());
                if scanner.eat(Tok::Colon) {
                    // Constraints are accepted but not enforced.
                    TypeParser::new(&mut scanner)
                        .parse_type()
                        .map_err(|e| to_error(e, tag))?;
                }
                if !scanner.eat(Tok::Comma) {
                    break;
                }
            }
            DocTagKind::Generic { names }
        }
        "vararg" => {
            let ty = TypeParser::new(&mut scanner)
                .parse_type()
                .map_err(|e| to_error(e, tag))?;
            DocTagKind::Vararg { ty }
        }
        _ => return Ok(None),
    };
    Ok(Some(DocTag {
        kind,
        span: line_span(line, at, line.text.len()),
    }))
}

/// `@class (exact) Name` and similar attribute lists.
fn skip_attributes(scanner: &mut Scanner<'_>) {
    if scanner.peek() == Tok::LParen {
        while !matches!(scanner.bump(), Tok::RParen | Tok::End) {}
    }
}

fn tag_error(line: &DocLine<'_>, at: usize, message: &str, tag: &str) -> TagError {
    let end = line.text.trim_end().len().max(at);
    let span = if at < end {
        line_span(line, at, end)
    } else {
        // Nothing left on the line: point at the whole tag.
        let start = line.text.len() - line.text.trim_start().len();
        line_span(line, start, end)
    };
    TagError {
        message: format!("{message} in @{tag} annotation"),
        span,
    }
}

fn line_span(line: &DocLine<'_>, start: usize, end: usize) -> Span {
    let start = u32::try_from(start).unwrap_or(0);
    let end = u32::try_from(end).unwrap_or(0);
    Span::new(line.offset + start, line.offset + end)
}

#[cfg(test)]
mod tests;
