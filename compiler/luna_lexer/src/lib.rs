//! Lexer for the Luna language tools.
//!
//! Produces a flat token list plus a side list of comments. Comments never
//! reach the parser's token stream; the parser consults [`doc_blocks`] to
//! attach `---` annotation runs to the statements that follow them.

mod comments;
mod raw_token;

use logos::Logos;
use luna_ir::Span;

use raw_token::{RawComment, RawToken};

pub use comments::{doc_blocks, DocBlock, DocLine};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Keywords
    And,
    Break,
    Do,
    Else,
    Elseif,
    End,
    False,
    For,
    Function,
    Goto,
    If,
    In,
    Local,
    Nil,
    Not,
    Or,
    Repeat,
    Return,
    Then,
    True,
    Until,
    While,

    // Literals and names
    Name,
    Number,
    /// Quoted string, quotes included in the span.
    Str,
    /// `[[...]]` string, brackets included in the span.
    LongStr,

    // Operators and punctuation
    Plus,
    Minus,
    Star,
    Slash,
    DoubleSlash,
    Percent,
    Caret,
    Hash,
    Amp,
    Tilde,
    Pipe,
    Shl,
    Shr,
    EqEq,
    NotEq,
    LtEq,
    GtEq,
    Lt,
    Gt,
    Assign,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    DoubleColon,
    Semi,
    Colon,
    Comma,
    Dot,
    Concat,
    Ellipsis,

    /// Unrecognized input or an unterminated literal.
    Error,
    Eof,
}

impl TokenKind {
    /// Human-readable form for "expected X" messages.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::And => "`and`",
            TokenKind::Break => "`break`",
            TokenKind::Do => "`do`",
            TokenKind::Else => "`else`",
            TokenKind::Elseif => "`elseif`",
            TokenKind::End => "`end`",
            TokenKind::False => "`false`",
            TokenKind::For => "`for`",
            TokenKind::Function => "`function`",
            TokenKind::Goto => "`goto`",
            TokenKind::If => "`if`",
            TokenKind::In => "`in`",
            TokenKind::Local => "`local`",
            TokenKind::Nil => "`nil`",
            TokenKind::Not => "`not`",
            TokenKind::Or => "`or`",
            TokenKind::Repeat => "`repeat`",
            TokenKind::Return => "`return`",
            TokenKind::Then => "`then`",
            TokenKind::True => "`true`",
            TokenKind::Until => "`until`",
            TokenKind::While => "`while`",
            TokenKind::Name => "name",
            TokenKind::Number => "number",
            TokenKind::Str | TokenKind::LongStr => "string",
            TokenKind::Plus => "`+`",
            TokenKind::Minus => "`-`",
            TokenKind::Star => "`*`",
            TokenKind::Slash => "`/`",
            TokenKind::DoubleSlash => "`//`",
            TokenKind::Percent => "`%`",
            TokenKind::Caret => "`^`",
            TokenKind::Hash => "`#`",
            TokenKind::Amp => "`&`",
            TokenKind::Tilde => "`~`",
            TokenKind::Pipe => "`|`",
            TokenKind::Shl => "`<<`",
            TokenKind::Shr => "`>>`",
            TokenKind::EqEq => "`==`",
            TokenKind::NotEq => "`~=`",
            TokenKind::LtEq => "`<=`",
            TokenKind::GtEq => "`>=`",
            TokenKind::Lt => "`<`",
            TokenKind::Gt => "`>`",
            TokenKind::Assign => "`=`",
            TokenKind::LParen => "`(`",
            TokenKind::RParen => "`)`",
            TokenKind::LBrace => "`{`",
            TokenKind::RBrace => "`}`",
            TokenKind::LBracket => "`[`",
            TokenKind::RBracket => "`]`",
            TokenKind::DoubleColon => "`::`",
            TokenKind::Semi => "`;`",
            TokenKind::Colon => "`:`",
            TokenKind::Comma => "`,`",
            TokenKind::Dot => "`.`",
            TokenKind::Concat => "`..`",
            TokenKind::Ellipsis => "`...`",
            TokenKind::Error => "invalid token",
            TokenKind::Eof => "end of file",
        }
    }

    /// Tokens that can only start a statement; used for error recovery.
    pub fn starts_statement(self) -> bool {
        matches!(
            self,
            TokenKind::Local
                | TokenKind::Function
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Repeat
                | TokenKind::Return
                | TokenKind::Do
                | TokenKind::Break
                | TokenKind::Goto
                | TokenKind::DoubleColon
        )
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CommentKind {
    /// `-- text`
    Line,
    /// `--- text`, the carrier of annotations.
    Doc,
    /// `--[[ text ]]`
    Long,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Comment {
    pub kind: CommentKind,
    pub span: Span,
}

/// Lexer output. `tokens` always ends with a single `Eof`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LexOutput {
    pub tokens: Vec<Token>,
    pub comments: Vec<Comment>,
}

/// Tokenize a whole source file.
pub fn lex(source: &str) -> LexOutput {
    let mut out = LexOutput::default();
    let mut lexer = RawToken::lexer(source);
    while let Some(result) = lexer.next() {
        let span = Span::from_range(lexer.span());
        let kind = match result {
            Ok(RawToken::Comment(kind)) => {
                out.comments.push(Comment {
                    kind: match kind {
                        RawComment::Line => CommentKind::Line,
                        RawComment::Doc => CommentKind::Doc,
                        RawComment::Long => CommentKind::Long,
                    },
                    span,
                });
                continue;
            }
            Ok(raw) => convert(raw),
            Err(()) => TokenKind::Error,
        };
        out.tokens.push(Token { kind, span });
    }
    let end = u32::try_from(source.len()).unwrap_or(u32::MAX);
    out.tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span::point(end),
    });
    out
}

fn convert(raw: RawToken) -> TokenKind {
    match raw {
        RawToken::And => TokenKind::And,
        RawToken::Break => TokenKind::Break,
        RawToken::Do => TokenKind::Do,
        RawToken::Else => TokenKind::Else,
        RawToken::Elseif => TokenKind::Elseif,
        RawToken::End => TokenKind::End,
        RawToken::False => TokenKind::False,
        RawToken::For => TokenKind::For,
        RawToken::Function => TokenKind::Function,
        RawToken::Goto => TokenKind::Goto,
        RawToken::If => TokenKind::If,
        RawToken::In => TokenKind::In,
        RawToken::Local => TokenKind::Local,
        RawToken::Nil => TokenKind::Nil,
        RawToken::Not => TokenKind::Not,
        RawToken::Or => TokenKind::Or,
        RawToken::Repeat => TokenKind::Repeat,
        RawToken::Return => TokenKind::Return,
        RawToken::Then => TokenKind::Then,
        RawToken::True => TokenKind::True,
        RawToken::Until => TokenKind::Until,
        RawToken::While => TokenKind::While,
        RawToken::Name => TokenKind::Name,
        RawToken::Number => TokenKind::Number,
        RawToken::Str => TokenKind::Str,
        RawToken::LongStr => TokenKind::LongStr,
        RawToken::Plus => TokenKind::Plus,
        RawToken::Minus => TokenKind::Minus,
        RawToken::Star => TokenKind::Star,
        RawToken::Slash => TokenKind::Slash,
        RawToken::DoubleSlash => TokenKind::DoubleSlash,
        RawToken::Percent => TokenKind::Percent,
        RawToken::Caret => TokenKind::Caret,
        RawToken::Hash => TokenKind::Hash,
        RawToken::Amp => TokenKind::Amp,
        RawToken::Tilde => TokenKind::Tilde,
        RawToken::Pipe => TokenKind::Pipe,
        RawToken::Shl => TokenKind::Shl,
        RawToken::Shr => TokenKind::Shr,
        RawToken::EqEq => TokenKind::EqEq,
        RawToken::NotEq => TokenKind::NotEq,
        RawToken::LtEq => TokenKind::LtEq,
        RawToken::GtEq => TokenKind::GtEq,
        RawToken::Lt => TokenKind::Lt,
        RawToken::Gt => TokenKind::Gt,
        RawToken::Assign => TokenKind::Assign,
        RawToken::LParen => TokenKind::LParen,
        RawToken::RParen => TokenKind::RParen,
        RawToken::LBrace => TokenKind::LBrace,
        RawToken::RBrace => TokenKind::RBrace,
        RawToken::LBracket => TokenKind::LBracket,
        RawToken::RBracket => TokenKind::RBracket,
        RawToken::DoubleColon => TokenKind::DoubleColon,
        RawToken::Semi => TokenKind::Semi,
        RawToken::Colon => TokenKind::Colon,
        RawToken::Comma => TokenKind::Comma,
        RawToken::Dot => TokenKind::Dot,
        RawToken::Concat => TokenKind::Concat,
        RawToken::Ellipsis => TokenKind::Ellipsis,
        // Comments are diverted before conversion.
        RawToken::Comment(_) => TokenKind::Error,
    }
}

#[cfg(test)]
mod tests;
