//! Statement parsing.

use luna_ir::{
    AssignStmt, Binding, FunctionBody, FunctionDecl, IfClause, LocalStmt, NodeId, NodeKind, Span,
};
use luna_lexer::TokenKind;

use crate::recovery::STMT_BOUNDARY;
use crate::Parser;

impl Parser<'_> {
    pub(crate) fn parse_statement(&mut self) -> NodeId {
        let start = self.cursor.current_span();
        match self.cursor.current_kind() {
            TokenKind::Local => {
                self.cursor.advance();
                if self.cursor.eat(TokenKind::Function) {
                    self.parse_local_function(start)
                } else {
                    self.parse_local(start)
                }
            }
            TokenKind::Function => {
                self.cursor.advance();
                self.parse_function_decl(start)
            }
            TokenKind::If => self.parse_if(start),
            TokenKind::While => {
                self.cursor.advance();
                let cond = self.parse_expr();
                self.expect(TokenKind::Do, "after `while` condition");
                let block = self.parse_block();
                self.expect(TokenKind::End, "to close `while`");
                self.alloc(NodeKind::While { cond, block }, self.span_from(start))
            }
            TokenKind::Do => {
                self.cursor.advance();
                let block = self.parse_block();
                self.expect(TokenKind::End, "to close `do`");
                self.alloc(NodeKind::Do { block }, self.span_from(start))
            }
            TokenKind::For => self.parse_for(start),
            TokenKind::Repeat => {
                self.cursor.advance();
                let block = self.parse_block();
                self.expect(TokenKind::Until, "to close `repeat`");
                let cond = self.parse_expr();
                self.alloc(NodeKind::Repeat { block, cond }, self.span_from(start))
            }
            TokenKind::Return => {
                self.cursor.advance();
                let values = if STMT_BOUNDARY.contains(self.cursor.current_kind())
                    || self.cursor.check(TokenKind::Semi)
                {
                    Vec::new()
                } else {
                    self.parse_expr_list()
                };
                self.cursor.eat(TokenKind::Semi);
                self.alloc(NodeKind::Return { values }, self.span_from(start))
            }
            TokenKind::Break => {
                self.cursor.advance();
                self.alloc(NodeKind::Break, start)
            }
            TokenKind::Goto => {
                self.cursor.advance();
                let label = self.expect_name("after `goto`").map(|b| b.name);
                self.alloc(
                    NodeKind::Goto {
                        label: label.unwrap_or_default(),
                    },
                    self.span_from(start),
                )
            }
            TokenKind::DoubleColon => {
                self.cursor.advance();
                let name = self.expect_name("in label").map(|b| b.name);
                self.expect(TokenKind::DoubleColon, "to close label");
                self.alloc(
                    NodeKind::Label {
                        name: name.unwrap_or_default(),
                    },
                    self.span_from(start),
                )
            }
            TokenKind::Name | TokenKind::LParen => self.parse_expr_statement(start),
            other => {
                let message = format!("unexpected {}, expected statement", other.describe());
                let error = self.error_node(message, start);
                self.cursor.advance();
                self.skip_rest_of_line(start);
                error
            }
        }
    }

    /// Skip tokens on the line of `error` until a statement boundary.
    fn skip_rest_of_line(&mut self, error: Span) {
        while !STMT_BOUNDARY.contains(self.cursor.current_kind())
            && !self.on_new_line(error, self.cursor.current_span())
        {
            self.cursor.advance();
        }
    }

    fn parse_local(&mut self, start: Span) -> NodeId {
        let mut names = Vec::new();
        loop {
            match self.expect_name("after `local`") {
                Some(binding) => names.push(binding),
                None => break,
            }
            // Attributes such as `<const>` and `<close>`.
            if self.cursor.eat(TokenKind::Lt) {
                self.expect_name("in attribute");
                self.expect(TokenKind::Gt, "to close attribute");
            }
            if !self.cursor.eat(TokenKind::Comma) {
                break;
            }
        }
        let values = if self.cursor.eat(TokenKind::Assign) {
            self.parse_expr_list()
        } else {
            Vec::new()
        };
        self.alloc(
            NodeKind::Local(LocalStmt {
                names,
                values,
                doc: None,
            }),
            self.span_from(start),
        )
    }

    fn parse_local_function(&mut self, start: Span) -> NodeId {
        let name = self.parse_name_node("after `local function`");
        let body = self.parse_function_body();
        self.alloc(
            NodeKind::Function(FunctionDecl {
                name,
                is_local: true,
                is_method: false,
                body,
                doc: None,
            }),
            self.span_from(start),
        )
    }

    /// `function a.b.c:m(...) ... end`
    fn parse_function_decl(&mut self, start: Span) -> NodeId {
        let mut name = self.parse_name_node("after `function`");
        let mut is_method = false;
        loop {
            let is_colon = self.cursor.check(TokenKind::Colon);
            if !is_colon && !self.cursor.check(TokenKind::Dot) {
                break;
            }
            self.cursor.advance();
            let Some(field) = self.expect_name("in function name") else {
                break;
            };
            let span = self.builder.span(name).merge(field.span);
            name = self.alloc(
                NodeKind::Field {
                    object: name,
                    name: field.name,
                },
                span,
            );
            if is_colon {
                is_method = true;
                break;
            }
        }
        let body = self.parse_function_body();
        self.alloc(
            NodeKind::Function(FunctionDecl {
                name,
                is_local: false,
                is_method,
                body,
                doc: None,
            }),
            self.span_from(start),
        )
    }

    /// `(params) block end`, shared by declarations and closures.
    pub(crate) fn parse_function_body(&mut self) -> FunctionBody {
        let mut params = Vec::new();
        let mut is_vararg = false;
        if self.expect(TokenKind::LParen, "before parameters") {
            if !self.cursor.check(TokenKind::RParen) {
                loop {
                    if self.cursor.eat(TokenKind::Ellipsis) {
                        is_vararg = true;
                        break;
                    }
                    match self.expect_name("in parameter list") {
                        Some(param) => params.push(param),
                        None => break,
                    }
                    if !self.cursor.eat(TokenKind::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenKind::RParen, "after parameters");
        }
        let block = self.parse_block();
        self.expect(TokenKind::End, "to close function");
        FunctionBody {
            params,
            is_vararg,
            block,
        }
    }

    fn parse_if(&mut self, start: Span) -> NodeId {
        let mut clauses = Vec::new();
        let mut else_block = None;
        // Consumes `if` on the first pass and `elseif` afterwards.
        loop {
            self.cursor.advance();
            let cond = self.parse_expr();
            self.expect(TokenKind::Then, "after condition");
            let block = self.parse_block();
            clauses.push(IfClause { cond, block });
            if !self.cursor.check(TokenKind::Elseif) {
                break;
            }
        }
        if self.cursor.eat(TokenKind::Else) {
            else_block = Some(self.parse_block());
        }
        self.expect(TokenKind::End, "to close `if`");
        self.alloc(
            NodeKind::If {
                clauses,
                else_block,
            },
            self.span_from(start),
        )
    }

    fn parse_for(&mut self, start: Span) -> NodeId {
        self.cursor.advance();
        let first = self
            .expect_name("after `for`")
            .unwrap_or_else(|| Binding::new("", self.cursor.current_span()));
        if self.cursor.eat(TokenKind::Assign) {
            let from = self.parse_expr();
            self.expect(TokenKind::Comma, "in numeric `for`");
            let limit = self.parse_expr();
            let step = self
                .cursor
                .eat(TokenKind::Comma)
                .then(|| self.parse_expr());
            self.expect(TokenKind::Do, "in `for`");
            let block = self.parse_block();
            self.expect(TokenKind::End, "to close `for`");
            return self.alloc(
                NodeKind::NumericFor {
                    var: first,
                    start: from,
                    limit,
                    step,
                    block,
                },
                self.span_from(start),
            );
        }
        let mut vars = vec![first];
        while self.cursor.eat(TokenKind::Comma) {
            match self.expect_name("in `for` variables") {
                Some(var) => vars.push(var),
                None => break,
            }
        }
        self.expect(TokenKind::In, "in generic `for`");
        let exprs = self.parse_expr_list();
        self.expect(TokenKind::Do, "in `for`");
        let block = self.parse_block();
        self.expect(TokenKind::End, "to close `for`");
        self.alloc(
            NodeKind::GenericFor { vars, exprs, block },
            self.span_from(start),
        )
    }

    /// Expression statement or assignment; both start with a suffixed expression.
    fn parse_expr_statement(&mut self, start: Span) -> NodeId {
        let first = self.parse_suffixed_expr();
        if !self.cursor.check(TokenKind::Assign) && !self.cursor.check(TokenKind::Comma) {
            return self.alloc(NodeKind::ExprStat { expr: first }, self.span_from(start));
        }
        let mut targets = vec![first];
        while self.cursor.eat(TokenKind::Comma) {
            targets.push(self.parse_suffixed_expr());
        }
        let values = if self.expect(TokenKind::Assign, "in assignment") {
            self.parse_expr_list()
        } else {
            Vec::new()
        };
        self.alloc(
            NodeKind::Assign(AssignStmt {
                targets,
                values,
                doc: None,
            }),
            self.span_from(start),
        )
    }

    pub(crate) fn expect_name(&mut self, context: &str) -> Option<Binding> {
        if self.cursor.check(TokenKind::Name) {
            let token = self.cursor.advance();
            return Some(Binding::new(self.cursor.text(token.span), token.span));
        }
        self.expect(TokenKind::Name, context);
        None
    }

    /// A `Name` node, or an `Error` node in its place.
    fn parse_name_node(&mut self, context: &str) -> NodeId {
        if self.cursor.check(TokenKind::Name) {
            let token = self.cursor.advance();
            let name = self.cursor.text(token.span).to_owned();
            return self.alloc(NodeKind::Name(name), token.span);
        }
        let found = self.cursor.current_kind().describe();
        let span = self.cursor.current_span();
        self.error_node(format!("expected name {context}, found {found}"), span)
    }
}
