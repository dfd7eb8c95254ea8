//! Raw Token Definition
//!
//! The logos-derived tokenizer output. Comments and long brackets need
//! level matching (`[==[ ... ]==]`), which regexes cannot express, so they
//! are finished by callbacks that scan the remainder by hand.

use logos::{Lexer, Logos};

/// What a `--` introduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RawComment {
    Line,
    Doc,
    Long,
}

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub(crate) enum RawToken {
    #[token("--", lex_comment)]
    Comment(RawComment),

    #[token("and")]
    And,
    #[token("break")]
    Break,
    #[token("do")]
    Do,
    #[token("else")]
    Else,
    #[token("elseif")]
    Elseif,
    #[token("end")]
    End,
    #[token("false")]
    False,
    #[token("for")]
    For,
    #[token("function")]
    Function,
    #[token("goto")]
    Goto,
    #[token("if")]
    If,
    #[token("in")]
    In,
    #[token("local")]
    Local,
    #[token("nil")]
    Nil,
    #[token("not")]
    Not,
    #[token("or")]
    Or,
    #[token("repeat")]
    Repeat,
    #[token("return")]
    Return,
    #[token("then")]
    Then,
    #[token("true")]
    True,
    #[token("until")]
    Until,
    #[token("while")]
    While,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Name,

    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?")]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?")]
    #[regex(r"0[xX][0-9a-fA-F]*(\.[0-9a-fA-F]*)?([pP][+-]?[0-9]+)?")]
    Number,

    #[regex(r#""([^"\\\n]|\\(.|\n))*""#)]
    #[regex(r"'([^'\\\n]|\\(.|\n))*'")]
    Str,

    #[regex(r"\[=*\[", lex_long_bracket)]
    LongStr,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("//")]
    DoubleSlash,
    #[token("%")]
    Percent,
    #[token("^")]
    Caret,
    #[token("#")]
    Hash,
    #[token("&")]
    Amp,
    #[token("~")]
    Tilde,
    #[token("|")]
    Pipe,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("==")]
    EqEq,
    #[token("~=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("=")]
    Assign,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("::")]
    DoubleColon,
    #[token(";")]
    Semi,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("..")]
    Concat,
    #[token("...")]
    Ellipsis,
}

fn lex_comment(lex: &mut Lexer<RawToken>) -> RawComment {
    let rest = lex.remainder();
    if let Some(level) = long_bracket_level(rest) {
        let open_len = level + 2;
        let consumed = close_long_bracket(&rest[open_len..], level)
            .map_or(rest.len(), |close_end| open_len + close_end);
        lex.bump(consumed);
        return RawComment::Long;
    }
    let line_len = rest.find('\n').unwrap_or(rest.len());
    lex.bump(line_len);
    if rest.starts_with('-') {
        RawComment::Doc
    } else {
        RawComment::Line
    }
}

/// Called after `[` `=`* `[` has matched; finds the matching close.
/// An unterminated long string is a lexer error.
fn lex_long_bracket(lex: &mut Lexer<RawToken>) -> bool {
    let level = lex.slice().len() - 2;
    match close_long_bracket(lex.remainder(), level) {
        Some(close_end) => {
            lex.bump(close_end);
            true
        }
        None => false,
    }
}

/// `[==[` at the start of `text` → `Some(2)`.
fn long_bracket_level(text: &str) -> Option<usize> {
    let rest = text.strip_prefix('[')?;
    let level = rest.bytes().take_while(|&b| b == b'=').count();
    rest[level..].starts_with('[').then_some(level)
}

/// Byte offset just past `]` `=`{level} `]` in `text`.
fn close_long_bracket(text: &str, level: usize) -> Option<usize> {
    let mut close = String::with_capacity(level + 2);
    close.push(']');
    close.extend(std::iter::repeat('=').take(level));
    close.push(']');
    text.find(&close).map(|at| at + close.len())
}
