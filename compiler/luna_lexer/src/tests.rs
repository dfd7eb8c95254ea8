use super::*;
use pretty_assertions::assert_eq;

fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source).tokens.into_iter().map(|t| t.kind).collect()
}

#[test]
fn keywords_names_and_eof() {
    assert_eq!(
        kinds("local x = nil"),
        vec![
            TokenKind::Local,
            TokenKind::Name,
            TokenKind::Assign,
            TokenKind::Nil,
            TokenKind::Eof
        ]
    );
}

#[test]
fn keyword_prefix_is_a_name() {
    assert_eq!(kinds("locals"), vec![TokenKind::Name, TokenKind::Eof]);
}

#[test]
fn dots_are_longest_match() {
    assert_eq!(
        kinds("a.b .. c ..."),
        vec![
            TokenKind::Name,
            TokenKind::Dot,
            TokenKind::Name,
            TokenKind::Concat,
            TokenKind::Name,
            TokenKind::Ellipsis,
            TokenKind::Eof
        ]
    );
}

#[test]
fn numbers() {
    assert_eq!(
        kinds("1 3.5 .5 1e10 0xFF"),
        vec![
            TokenKind::Number,
            TokenKind::Number,
            TokenKind::Number,
            TokenKind::Number,
            TokenKind::Number,
            TokenKind::Eof
        ]
    );
}

#[test]
fn strings_short_and_long() {
    let out = lex(r#"a = "x\"y" .. 'z' .. [==[ ]] ]==]"#);
    let strings: Vec<TokenKind> = out
        .tokens
        .iter()
        .map(|t| t.kind)
        .filter(|k| matches!(k, TokenKind::Str | TokenKind::LongStr))
        .collect();
    assert_eq!(
        strings,
        vec![TokenKind::Str, TokenKind::Str, TokenKind::LongStr]
    );
}

#[test]
fn comments_are_side_channel() {
    let source = "-- plain\n--- doc\n--[[ long\n]] x";
    let out = lex(source);
    assert_eq!(kinds(source), vec![TokenKind::Name, TokenKind::Eof]);
    let comment_kinds: Vec<CommentKind> = out.comments.iter().map(|c| c.kind).collect();
    assert_eq!(
        comment_kinds,
        vec![CommentKind::Line, CommentKind::Doc, CommentKind::Long]
    );
    assert_eq!(&source[out.comments[1].span.to_range()], "--- doc");
}

#[test]
fn unknown_character_is_error_token() {
    assert_eq!(
        kinds("a $ b"),
        vec![
            TokenKind::Name,
            TokenKind::Error,
            TokenKind::Name,
            TokenKind::Eof
        ]
    );
}

#[test]
fn eof_span_is_at_end() {
    let out = lex("x  ");
    let eof = out.tokens.last().copied();
    assert_eq!(eof.map(|t| t.span), Some(Span::point(3)));
}

#[test]
fn doc_blocks_group_adjacent_lines() {
    let source = "---@class A\n---@field x number\nlocal A = {}\n\n---@type A\n\n---@type B\nlocal b";
    let out = lex(source);
    let blocks = doc_blocks(source, &out.comments);
    assert_eq!(blocks.len(), 3);
    let texts: Vec<&str> = blocks[0].lines.iter().map(|l| l.text).collect();
    assert_eq!(texts, vec!["@class A", "@field x number"]);
    assert_eq!(blocks[1].lines[0].text, "@type A");
    assert_eq!(blocks[2].lines[0].text, "@type B");
}

#[test]
fn doc_line_offset_points_past_dashes() {
    let source = "  ---@type number";
    let out = lex(source);
    let blocks = doc_blocks(source, &out.comments);
    let line = &blocks[0].lines[0];
    assert_eq!(line.offset, 5);
    assert_eq!(&source[line.offset as usize..], "@type number");
}
