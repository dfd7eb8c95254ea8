//! Type expressions inside annotations.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! type    := postfix ('|' postfix)*
//! postfix := primary ('[' ']' | '?')*
//! primary := NAME ('<' type (',' type)* '>')?
//!          | 'fun' '(' params? ')' (':' returns)?
//!          | '[' type (',' type)* ']'
//!          | '(' type ')'
//!          | STRING | '{' ... '}'
//! ```

use luna_ir::{FunctionTypeExpr, ParamTypeExpr, TypeExpr};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Tok<'s> {
    Ident(&'s str),
    Str,
    Pipe,
    Comma,
    Colon,
    Question,
    LBracket,
    RBracket,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Lt,
    Gt,
    Ellipsis,
    Other,
    End,
}

/// A malformed type, with the byte position (within the line) it was found at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TypeError {
    pub message: String,
    pub at: usize,
}

/// Cursor over one annotation line. `Copy` so lookahead is a cheap clone.
#[derive(Copy, Clone)]
pub(crate) struct Scanner<'s> {
    text: &'s str,
    pos: usize,
}

impl<'s> Scanner<'s> {
    pub(crate) fn new(text: &'s str, pos: usize) -> Self {
        Scanner { text, pos }
    }

    /// Byte position of the next token.
    pub(crate) fn pos(&self) -> usize {
        let rest = &self.text[self.pos..];
        self.pos + (rest.len() - rest.trim_start().len())
    }

    pub(crate) fn peek(&self) -> Tok<'s> {
        let mut ahead = *self;
        ahead.bump()
    }

    pub(crate) fn peek2(&self) -> Tok<'s> {
        let mut ahead = *self;
        ahead.bump();
        ahead.bump()
    }

    pub(crate) fn eat(&mut self, tok: Tok<'_>) -> bool {
        if std::mem::discriminant(&self.peek()) == std::mem::discriminant(&tok) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn bump(&mut self) -> Tok<'s> {
        self.pos = self.pos();
        let rest = &self.text[self.pos..];
        let Some(first) = rest.chars().next() else {
            return Tok::End;
        };
        let (tok, len) = match first {
            c if c.is_ascii_alphanumeric() || c == '_' => {
                let len = rest
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '.'))
                    .unwrap_or(rest.len());
                (Tok::Ident(&rest[..len]), len)
            }
            '"' | '\'' | '`' => {
                let len = rest[1..].find(first).map_or(rest.len(), |end| end + 2);
                (Tok::Str, len)
            }
            '.' if rest.starts_with("...") => (Tok::Ellipsis, 3),
            '|' => (Tok::Pipe, 1),
            ',' => (Tok::Comma, 1),
            ':' => (Tok::Colon, 1),
            '?' => (Tok::Question, 1),
            '[' => (Tok::LBracket, 1),
            ']' => (Tok::RBracket, 1),
            '(' => (Tok::LParen, 1),
            ')' => (Tok::RParen, 1),
            '{' => (Tok::LBrace, 1),
            '}' => (Tok::RBrace, 1),
            '<' => (Tok::Lt, 1),
            '>' => (Tok::Gt, 1),
            other => (Tok::Other, other.len_utf8()),
        };
        self.pos += len;
        tok
    }

    pub(crate) fn ident(&mut self) -> Option<&'s str> {
        match self.peek() {
            Tok::Ident(name) => {
                self.bump();
                Some(name)
            }
            _ => None,
        }
    }

    fn error<T>(&self, message: impl Into<String>) -> Result<T, TypeError> {
        Err(TypeError {
            message: message.into(),
            at: self.pos(),
        })
    }

    fn expect(&mut self, tok: Tok<'_>, what: &str) -> Result<(), TypeError> {
        if self.eat(tok) {
            Ok(())
        } else {
            self.error(format!("expected `{what}` in type"))
        }
    }
}

/// Parses type expressions. `nested` counts enclosing parameter lists, where
/// a comma ends a function type's return list instead of extending it.
pub(crate) struct TypeParser<'s, 'c> {
    scanner: &'c mut Scanner<'s>,
    nested: u32,
}

impl<'s, 'c> TypeParser<'s, 'c> {
    pub(crate) fn new(scanner: &'c mut Scanner<'s>) -> Self {
        TypeParser { scanner, nested: 0 }
    }

    pub(crate) fn parse_type(&mut self) -> Result<TypeExpr, TypeError> {
        let mut members = vec![self.parse_postfix()?];
        while self.scanner.eat(Tok::Pipe) {
            members.push(self.parse_postfix()?);
        }
        Ok(if members.len() == 1 {
            members.swap_remove(0)
        } else {
            TypeExpr::Union(members)
        })
    }

    /// `A, B, C` as written after `@return` or a function type's `:`.
    pub(crate) fn parse_type_list(&mut self) -> Result<Vec<TypeExpr>, TypeError> {
        let mut types = vec![self.parse_type()?];
        while self.scanner.peek() == Tok::Comma && starts_type(self.scanner.peek2()) {
            self.scanner.bump();
            types.push(self.parse_type()?);
        }
        Ok(types)
    }

    fn parse_postfix(&mut self) -> Result<TypeExpr, TypeError> {
        let mut ty = self.parse_primary()?;
        loop {
            if self.scanner.peek() == Tok::LBracket && self.scanner.peek2() == Tok::RBracket {
                self.scanner.bump();
                self.scanner.bump();
                ty = TypeExpr::Array(Box::new(ty));
            } else if self.scanner.eat(Tok::Question) {
                ty = TypeExpr::Union(vec![ty, TypeExpr::Name("nil".to_owned())]);
            } else {
                return Ok(ty);
            }
        }
    }

    fn parse_primary(&mut self) -> Result<TypeExpr, TypeError> {
        match self.scanner.peek() {
            Tok::Ident("fun") if self.scanner.peek2() == Tok::LParen => {
                self.scanner.bump();
                self.parse_function().map(TypeExpr::Function)
            }
            Tok::Ident(name) => {
                self.scanner.bump();
                if self.scanner.eat(Tok::Lt) {
                    let args = self.parse_list(Tok::Gt, ">")?;
                    return Ok(TypeExpr::Applied {
                        base: name.to_owned(),
                        args,
                    });
                }
                Ok(TypeExpr::Name(name.to_owned()))
            }
            Tok::Str => {
                self.scanner.bump();
                Ok(TypeExpr::Name("string".to_owned()))
            }
            Tok::LBracket => {
                self.scanner.bump();
                self.parse_list(Tok::RBracket, "]").map(TypeExpr::Tuple)
            }
            Tok::LParen => {
                self.scanner.bump();
                self.nested += 1;
                let inner = self.parse_type();
                self.nested -= 1;
                let inner = inner?;
                self.scanner.expect(Tok::RParen, ")")?;
                Ok(inner)
            }
            Tok::LBrace => {
                self.skip_braces()?;
                Ok(TypeExpr::Name("table".to_owned()))
            }
            _ => self.scanner.error("expected type"),
        }
    }

    /// Comma separated types up to and including `close`.
    fn parse_list(&mut self, close: Tok<'_>, what: &str) -> Result<Vec<TypeExpr>, TypeError> {
        self.nested += 1;
        let result = self.parse_list_inner(close, what);
        self.nested -= 1;
        result
    }

    fn parse_list_inner(&mut self, close: Tok<'_>, what: &str) -> Result<Vec<TypeExpr>, TypeError> {
        let mut items = Vec::new();
        if self.scanner.eat(close) {
            return Ok(items);
        }
        loop {
            items.push(self.parse_type()?);
            if self.scanner.eat(Tok::Comma) {
                continue;
            }
            self.scanner.expect(close, what)?;
            return Ok(items);
        }
    }

    fn parse_function(&mut self) -> Result<FunctionTypeExpr, TypeError> {
        self.scanner.expect(Tok::LParen, "(")?;
        self.nested += 1;
        let params = self.parse_params();
        self.nested -= 1;
        let mut func = params?;
        if self.scanner.eat(Tok::Colon) {
            func.returns = if self.nested == 0 {
                self.parse_type_list()?
            } else {
                vec![self.parse_type()?]
            };
        }
        Ok(func)
    }

    fn parse_params(&mut self) -> Result<FunctionTypeExpr, TypeError> {
        let mut func = FunctionTypeExpr::default();
        if self.scanner.eat(Tok::RParen) {
            return Ok(func);
        }
        loop {
            if self.scanner.eat(Tok::Ellipsis) {
                let ty = if self.scanner.eat(Tok::Colon) {
                    self.parse_type()?
                } else {
                    TypeExpr::Name("any".to_owned())
                };
                func.vararg = Some(Box::new(ty));
            } else {
                let Some(name) = self.scanner.ident() else {
                    return self.scanner.error("expected parameter name");
                };
                let optional = self.scanner.eat(Tok::Question);
                let ty = if self.scanner.eat(Tok::Colon) {
                    self.parse_type()?
                } else {
                    TypeExpr::Name("any".to_owned())
                };
                func.params.push(ParamTypeExpr {
                    name: name.to_owned(),
                    optional,
                    ty,
                });
            }
            if self.scanner.eat(Tok::Comma) {
                continue;
            }
            self.scanner.expect(Tok::RParen, ")")?;
            return Ok(func);
        }
    }

    /// `{ x: number, y: { ... } }` is accepted but not modelled.
    fn skip_braces(&mut self) -> Result<(), TypeError> {
        let mut depth = 0u32;
        loop {
            match self.scanner.bump() {
                Tok::LBrace => depth += 1,
                Tok::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Tok::End => return self.scanner.error("unclosed `{` in type"),
                _ => {}
            }
        }
    }
}

fn starts_type(tok: Tok<'_>) -> bool {
    matches!(
        tok,
        Tok::Ident(_) | Tok::Str | Tok::LBracket | Tok::LParen | Tok::LBrace
    )
}

/// Parse a standalone type expression, requiring the whole text to be consumed.
pub fn parse_type_expr(text: &str) -> Option<TypeExpr> {
    let mut scanner = Scanner::new(text, 0);
    let ty = TypeParser::new(&mut scanner).parse_type().ok()?;
    (scanner.peek() == Tok::End).then_some(ty)
}
