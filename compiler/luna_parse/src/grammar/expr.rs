//! Expression parsing.
//!
//! Binary operators use precedence climbing with the usual (left, right)
//! priority pairs; right-associative operators have a lower right priority.

use luna_ir::{ensure_sufficient_stack, BinaryOp, CallExpr, NodeId, NodeKind, TableField, UnaryOp};
use luna_lexer::TokenKind;

use crate::recovery::STMT_BOUNDARY;
use crate::Parser;

const UNARY_PRIORITY: u8 = 12;

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::Or => BinaryOp::Or,
        TokenKind::And => BinaryOp::And,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::LtEq => BinaryOp::Le,
        TokenKind::GtEq => BinaryOp::Ge,
        TokenKind::NotEq => BinaryOp::Ne,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::Pipe => BinaryOp::BitOr,
        TokenKind::Tilde => BinaryOp::BitXor,
        TokenKind::Amp => BinaryOp::BitAnd,
        TokenKind::Shl => BinaryOp::Shl,
        TokenKind::Shr => BinaryOp::Shr,
        TokenKind::Concat => BinaryOp::Concat,
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::DoubleSlash => BinaryOp::IDiv,
        TokenKind::Percent => BinaryOp::Mod,
        TokenKind::Caret => BinaryOp::Pow,
        _ => return None,
    })
}

/// (left, right) binding priorities.
fn priority(op: BinaryOp) -> (u8, u8) {
    match op {
        BinaryOp::Or => (1, 1),
        BinaryOp::And => (2, 2),
        BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge | BinaryOp::Ne | BinaryOp::Eq => {
            (3, 3)
        }
        BinaryOp::BitOr => (4, 4),
        BinaryOp::BitXor => (5, 5),
        BinaryOp::BitAnd => (6, 6),
        BinaryOp::Shl | BinaryOp::Shr => (7, 7),
        BinaryOp::Concat => (9, 8),
        BinaryOp::Add | BinaryOp::Sub => (10, 10),
        BinaryOp::Mul | BinaryOp::Div | BinaryOp::IDiv | BinaryOp::Mod => (11, 11),
        BinaryOp::Pow => (14, 13),
    }
}

fn unary_op(kind: TokenKind) -> Option<UnaryOp> {
    match kind {
        TokenKind::Not => Some(UnaryOp::Not),
        TokenKind::Minus => Some(UnaryOp::Neg),
        TokenKind::Hash => Some(UnaryOp::Len),
        TokenKind::Tilde => Some(UnaryOp::BitNot),
        _ => None,
    }
}

impl Parser<'_> {
    pub(crate) fn parse_expr(&mut self) -> NodeId {
        ensure_sufficient_stack(|| self.parse_subexpr(0))
    }

    pub(crate) fn parse_expr_list(&mut self) -> Vec<NodeId> {
        let mut exprs = vec![self.parse_expr()];
        while self.cursor.eat(TokenKind::Comma) {
            exprs.push(self.parse_expr());
        }
        exprs
    }

    fn parse_subexpr(&mut self, limit: u8) -> NodeId {
        let start = self.cursor.current_span();
        let mut lhs = if let Some(op) = unary_op(self.cursor.current_kind()) {
            self.cursor.advance();
            let operand = ensure_sufficient_stack(|| self.parse_subexpr(UNARY_PRIORITY));
            self.alloc(NodeKind::Unary { op, operand }, self.span_from(start))
        } else {
            self.parse_simple_expr()
        };
        while let Some(op) = binary_op(self.cursor.current_kind()) {
            let (left, right) = priority(op);
            if left <= limit {
                break;
            }
            self.cursor.advance();
            let rhs = ensure_sufficient_stack(|| self.parse_subexpr(right));
            let span = self.builder.span(lhs).merge(self.builder.span(rhs));
            lhs = self.alloc(NodeKind::Binary { op, lhs, rhs }, span);
        }
        lhs
    }

    fn parse_simple_expr(&mut self) -> NodeId {
        let token = self.cursor.current();
        let kind = match token.kind {
            TokenKind::Nil => NodeKind::Nil,
            TokenKind::True => NodeKind::Bool(true),
            TokenKind::False => NodeKind::Bool(false),
            TokenKind::Number => NodeKind::Number(self.cursor.current_text().to_owned()),
            TokenKind::Str | TokenKind::LongStr => {
                NodeKind::Str(string_value(self.cursor.current_text(), token.kind))
            }
            TokenKind::Ellipsis => NodeKind::Vararg,
            TokenKind::LBrace => return self.parse_table(),
            TokenKind::Function => {
                self.cursor.advance();
                let body = self.parse_function_body();
                return self.alloc(NodeKind::Closure(body), self.span_from(token.span));
            }
            _ => return self.parse_suffixed_expr(),
        };
        self.cursor.advance();
        self.alloc(kind, token.span)
    }

    /// Primary expression followed by field, index and call suffixes.
    pub(crate) fn parse_suffixed_expr(&mut self) -> NodeId {
        let start = self.cursor.current_span();
        let mut expr = self.parse_primary_expr();
        loop {
            match self.cursor.current_kind() {
                TokenKind::Dot => {
                    self.cursor.advance();
                    let Some(field) = self.expect_name("after `.`") else {
                        return expr;
                    };
                    expr = self.alloc(
                        NodeKind::Field {
                            object: expr,
                            name: field.name,
                        },
                        self.span_from(start),
                    );
                }
                TokenKind::LBracket => {
                    self.cursor.advance();
                    let key = self.parse_expr();
                    self.expect(TokenKind::RBracket, "to close index");
                    expr = self.alloc(
                        NodeKind::Index { object: expr, key },
                        self.span_from(start),
                    );
                }
                TokenKind::Colon => {
                    self.cursor.advance();
                    let Some(method) = self.expect_name("after `:`") else {
                        return expr;
                    };
                    let callee = self.alloc(
                        NodeKind::Field {
                            object: expr,
                            name: method.name,
                        },
                        self.span_from(start),
                    );
                    let args = self.parse_call_args();
                    expr = self.alloc(
                        NodeKind::Call(CallExpr {
                            callee,
                            args,
                            is_colon: true,
                        }),
                        self.span_from(start),
                    );
                }
                TokenKind::LParen | TokenKind::LBrace | TokenKind::Str | TokenKind::LongStr => {
                    let args = self.parse_call_args();
                    expr = self.alloc(
                        NodeKind::Call(CallExpr {
                            callee: expr,
                            args,
                            is_colon: false,
                        }),
                        self.span_from(start),
                    );
                }
                _ => return expr,
            }
        }
    }

    fn parse_primary_expr(&mut self) -> NodeId {
        let token = self.cursor.current();
        match token.kind {
            TokenKind::Name => {
                self.cursor.advance();
                let name = self.cursor.text(token.span).to_owned();
                self.alloc(NodeKind::Name(name), token.span)
            }
            TokenKind::LParen => {
                self.cursor.advance();
                let inner = self.parse_expr();
                self.expect(TokenKind::RParen, "to close parenthesis");
                self.alloc(NodeKind::Paren { inner }, self.span_from(token.span))
            }
            other => {
                let message = format!("unexpected {}, expected expression", other.describe());
                if !STMT_BOUNDARY.contains(other) && !is_closer(other) {
                    self.cursor.advance();
                }
                self.error_node(message, token.span)
            }
        }
    }

    /// `(a, b)`, `{...}` or a single string literal.
    fn parse_call_args(&mut self) -> Vec<NodeId> {
        match self.cursor.current_kind() {
            TokenKind::LBrace => vec![self.parse_table()],
            TokenKind::Str | TokenKind::LongStr => vec![self.parse_simple_expr()],
            _ => {
                if !self.expect(TokenKind::LParen, "before call arguments") {
                    return Vec::new();
                }
                if self.cursor.eat(TokenKind::RParen) {
                    return Vec::new();
                }
                let args = self.parse_expr_list();
                self.expect(TokenKind::RParen, "to close call arguments");
                args
            }
        }
    }

    fn parse_table(&mut self) -> NodeId {
        let start = self.cursor.advance().span;
        let mut fields = Vec::new();
        while !self.cursor.check(TokenKind::RBrace) && !self.cursor.is_at_end() {
            let before = self.cursor.position();
            let field = match self.cursor.current_kind() {
                TokenKind::LBracket => {
                    self.cursor.advance();
                    let key = self.parse_expr();
                    self.expect(TokenKind::RBracket, "to close table key");
                    self.expect(TokenKind::Assign, "after table key");
                    let value = self.parse_expr();
                    TableField::Keyed { key, value }
                }
                TokenKind::Name if self.cursor.peek_kind() == TokenKind::Assign => {
                    let name = self.cursor.current_text().to_owned();
                    self.cursor.advance();
                    self.cursor.advance();
                    let value = self.parse_expr();
                    TableField::Named { name, value }
                }
                _ => TableField::Positional(self.parse_expr()),
            };
            fields.push(field);
            if !self.cursor.eat(TokenKind::Comma) && !self.cursor.eat(TokenKind::Semi) {
                break;
            }
            if self.cursor.position() == before {
                break;
            }
        }
        self.expect(TokenKind::RBrace, "to close table");
        self.alloc(NodeKind::Table { fields }, self.span_from(start))
    }
}

fn is_closer(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::RParen
            | TokenKind::RBrace
            | TokenKind::RBracket
            | TokenKind::Comma
            | TokenKind::Semi
            | TokenKind::Then
            | TokenKind::Do
            | TokenKind::In
    )
}

/// Contents of a string token, with common escapes decoded.
fn string_value(text: &str, kind: TokenKind) -> String {
    if kind == TokenKind::LongStr {
        let level = text[1..].bytes().take_while(|&b| b == b'=').count();
        let open = level + 2;
        let inner = text.get(open..text.len().saturating_sub(open)).unwrap_or("");
        let inner = inner
            .strip_prefix("\r\n")
            .or_else(|| inner.strip_prefix('\n'))
            .unwrap_or(inner);
        return inner.to_owned();
    }
    let inner = text.get(1..text.len().saturating_sub(1)).unwrap_or("");
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}
