//! Statement parsing
//!
//! Blocks recover statement by statement: a syntax error is recorded, the
//! parser skips to the next statement boundary and the block carries on.

use super::error::{ParseError, ParseResult};
use super::expressions::compound_operator;
use super::parser::Parser;
use crate::ast::*;
use crate::lexer::{Position, TokenType};

impl Parser {
    /// Parse a `{ ... }` block. A missing closing brace is recorded and the
    /// statements parsed so far are kept.
    pub fn parse_block(&mut self) -> ParseResult<Block> {
        let start = self.expect(TokenType::LeftBrace, "{")?.position;
        let stmts = self.parse_statement_list();

        if !self.match_token(TokenType::RightBrace) {
            let err = self.error_here("}");
            self.add_error(err);
        }

        Ok(Block {
            stmts,
            span: self.span_from(start),
        })
    }

    /// Statements up to a closing brace, `case`, `default` or end of input
    fn parse_statement_list(&mut self) -> Vec<Stmt> {
        let mut stmts = Vec::new();

        loop {
            while self.match_token(TokenType::Semicolon) {}

            match self.current_token().token_type {
                TokenType::RightBrace | TokenType::Case | TokenType::Default | TokenType::Eof => break,
                // Only valid at top level: the block is missing its `}`
                TokenType::Func | TokenType::Type | TokenType::Import | TokenType::Package => break,
                _ => {}
            }

            match self.parse_statement() {
                Ok(stmt) => {
                    stmts.push(stmt);
                    if let Err(err) = self.expect_terminator("newline or ; at end of statement") {
                        self.add_error(err);
                        self.synchronize();
                    }
                }
                Err(err) => {
                    self.add_error(err);
                    self.synchronize();
                }
            }
        }

        stmts
    }

    /// Parse a single statement
    pub fn parse_statement(&mut self) -> ParseResult<Stmt> {
        let token = self.current_token().clone();
        let span = Span::new(token.position, token.end());

        match token.token_type {
            TokenType::Var => Ok(Stmt::Var(self.parse_var_decl()?)),
            TokenType::Const => Ok(Stmt::Const(self.parse_const_decl()?)),
            TokenType::If => Ok(Stmt::If(self.parse_if_statement()?)),
            TokenType::For => self.parse_for_statement(),
            TokenType::Switch => Ok(Stmt::Switch(self.parse_switch_statement()?)),
            TokenType::Return => self.parse_return_statement(),
            TokenType::Break => {
                self.advance();
                Ok(Stmt::Break { span })
            }
            TokenType::Continue => {
                self.advance();
                Ok(Stmt::Continue { span })
            }
            TokenType::Fallthrough => {
                self.advance();
                Ok(Stmt::Fallthrough { span })
            }
            TokenType::LeftBrace => Ok(Stmt::Block(self.parse_block()?)),
            _ => self.parse_simple_statement(),
        }
    }

    /// Expression, assignment, short variable declaration, compound
    /// assignment or increment/decrement
    pub fn parse_simple_statement(&mut self) -> ParseResult<Stmt> {
        let start = self.current_position();
        let lhs = self.parse_expression_list()?;
        self.finish_simple_statement(lhs, start)
    }

    /// Complete a simple statement whose left-hand expressions are parsed
    fn finish_simple_statement(&mut self, lhs: Vec<Expr>, start: Position) -> ParseResult<Stmt> {
        let token_type = self.current_token().token_type;

        match token_type {
            TokenType::Define => {
                self.advance();
                let names = lhs
                    .into_iter()
                    .map(|expr| match expr {
                        Expr::Ident(ident) => Ok(ident),
                        other => Err(ParseError::invalid(
                            format!("non-name {} on left side of :=", other),
                            other.position(),
                        )),
                    })
                    .collect::<ParseResult<Vec<_>>>()?;
                let values = self.parse_expression_list()?;
                Ok(Stmt::ShortAssign {
                    names,
                    values,
                    span: self.span_from(start),
                })
            }
            TokenType::Assign => {
                self.advance();
                let values = self.parse_expression_list()?;
                Ok(Stmt::Assign {
                    targets: lhs,
                    values,
                    span: self.span_from(start),
                })
            }
            TokenType::Increment | TokenType::Decrement => {
                let target = self.single_target(lhs)?;
                self.advance();
                Ok(Stmt::IncDec {
                    target,
                    increment: token_type == TokenType::Increment,
                    span: self.span_from(start),
                })
            }
            _ => {
                if let Some(op) = compound_operator(token_type) {
                    let target = self.single_target(lhs)?;
                    self.advance();
                    let value = self.parse_expression()?;
                    return Ok(Stmt::CompoundAssign {
                        target,
                        op,
                        value,
                        span: self.span_from(start),
                    });
                }

                let target = self.single_target(lhs)?;
                Ok(Stmt::Expr {
                    expr: target,
                    span: self.span_from(start),
                })
            }
        }
    }

    /// The only expression of a list, or a syntax error at the current token
    fn single_target(&self, mut lhs: Vec<Expr>) -> ParseResult<Expr> {
        match lhs.len() {
            1 => lhs.pop().ok_or_else(|| self.error_here("expression")),
            _ => Err(self.error_here(":= or = or comma")),
        }
    }

    /// The condition form of a header statement: it must be a bare expression
    fn statement_as_condition(stmt: Stmt) -> ParseResult<Expr> {
        match stmt {
            Stmt::Expr { expr, .. } => Ok(expr),
            other => Err(ParseError::invalid(
                "cannot use assignment or declaration as value",
                other.span().start,
            )),
        }
    }

    /// Run `f` with composite literals of named types disabled, as inside
    /// `if`, `for` and `switch` headers
    fn in_control_header<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        let saved = self.expr_level;
        self.expr_level = -1;
        let result = f(self);
        self.expr_level = saved;
        result
    }

    /// `if [init;] cond { } [else if ... | else { }]`
    fn parse_if_statement(&mut self) -> ParseResult<IfStmt> {
        let start = self.expect(TokenType::If, "if")?.position;

        let (init, cond) = self.in_control_header(|p| {
            if p.check(TokenType::LeftBrace) {
                return Err(ParseError::invalid("missing condition in if statement", p.current_position()));
            }
            if p.match_token(TokenType::Semicolon) {
                return Ok((None, p.parse_expression()?));
            }
            let first = p.parse_simple_statement()?;
            if p.match_token(TokenType::Semicolon) {
                if p.check(TokenType::LeftBrace) {
                    return Err(ParseError::invalid(
                        "missing condition in if statement",
                        p.current_position(),
                    ));
                }
                let cond = p.parse_expression()?;
                Ok((Some(Box::new(first)), cond))
            } else {
                Ok((None, Self::statement_as_condition(first)?))
            }
        })?;

        let then_block = self.parse_block()?;

        let else_branch = if self.match_token(TokenType::Else) {
            match self.current_token().token_type {
                TokenType::If => Some(Box::new(Stmt::If(self.parse_if_statement()?))),
                TokenType::LeftBrace => Some(Box::new(Stmt::Block(self.parse_block()?))),
                _ => return Err(self.error_here("if statement or block after else")),
            }
        } else {
            None
        };

        Ok(IfStmt {
            init,
            cond,
            then_block,
            else_branch,
            span: self.span_from(start),
        })
    }

    /// `for { }`, `for cond { }`, `for init; cond; post { }` or
    /// `for [k[, v] (:= | =)] range x { }`
    fn parse_for_statement(&mut self) -> ParseResult<Stmt> {
        let start = self.expect(TokenType::For, "for")?.position;

        let header = self.in_control_header(|p| p.parse_for_header())?;
        let body = self.parse_block()?;
        let span = self.span_from(start);

        Ok(match header {
            ForHeader::Range { key, value, define, expr } => Stmt::Range(RangeStmt {
                key,
                value,
                define,
                expr,
                body,
                span,
            }),
            ForHeader::Loop { init, cond, post } => Stmt::For(ForStmt {
                init,
                cond,
                post,
                body,
                span,
            }),
        })
    }

    fn parse_for_header(&mut self) -> ParseResult<ForHeader> {
        if self.check(TokenType::LeftBrace) {
            return Ok(ForHeader::Loop {
                init: None,
                cond: None,
                post: None,
            });
        }

        if self.match_token(TokenType::Range) {
            let expr = self.parse_expression()?;
            return Ok(ForHeader::Range {
                key: None,
                value: None,
                define: false,
                expr,
            });
        }

        let init = if self.check(TokenType::Semicolon) {
            None
        } else {
            let start = self.current_position();
            let lhs = self.parse_expression_list()?;

            let is_range = matches!(
                self.current_token().token_type,
                TokenType::Define | TokenType::Assign
            ) && self.peek_type(1) == TokenType::Range;
            if is_range {
                return self.finish_range_header(lhs);
            }

            Some(self.finish_simple_statement(lhs, start)?)
        };

        if !self.match_token(TokenType::Semicolon) {
            // Condition-only loop
            let cond = match init {
                Some(stmt) => Some(Self::statement_as_condition(stmt)?),
                None => None,
            };
            return Ok(ForHeader::Loop {
                init: None,
                cond,
                post: None,
            });
        }

        let cond = if self.check(TokenType::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenType::Semicolon, "; after for loop condition")?;

        let post = if self.check(TokenType::LeftBrace) {
            None
        } else {
            let post = self.parse_simple_statement()?;
            if let Stmt::ShortAssign { span, .. } = post {
                return Err(ParseError::invalid("cannot declare in post statement of for loop", span.start));
            }
            Some(Box::new(post))
        };

        Ok(ForHeader::Loop {
            init: init.map(Box::new),
            cond,
            post,
        })
    }

    /// `k, v := range x` with the `:=` or `=` as the current token
    fn finish_range_header(&mut self, lhs: Vec<Expr>) -> ParseResult<ForHeader> {
        let define = self.advance().token_type == TokenType::Define;
        self.expect(TokenType::Range, "range")?;
        let expr = self.parse_expression()?;

        if lhs.len() > 2 {
            return Err(ParseError::invalid(
                "range clause permits at most two iteration variables",
                lhs[2].position(),
            ));
        }
        if define {
            if let Some(bad) = lhs.iter().find(|e| e.as_ident().is_none()) {
                return Err(ParseError::invalid(
                    format!("non-name {} on left side of :=", bad),
                    bad.position(),
                ));
            }
        }

        let mut vars = lhs.into_iter();
        Ok(ForHeader::Range {
            key: vars.next(),
            value: vars.next(),
            define,
            expr,
        })
    }

    /// `switch [init;] [tag] { case a, b: ... default: ... }`
    fn parse_switch_statement(&mut self) -> ParseResult<SwitchStmt> {
        let start = self.expect(TokenType::Switch, "switch")?.position;

        let (init, tag) = self.in_control_header(|p| {
            if p.check(TokenType::LeftBrace) {
                return Ok((None, None));
            }
            if p.match_token(TokenType::Semicolon) {
                let tag = if p.check(TokenType::LeftBrace) {
                    None
                } else {
                    Some(p.parse_expression()?)
                };
                return Ok((None, tag));
            }

            let first = p.parse_simple_statement()?;
            if p.match_token(TokenType::Semicolon) {
                let tag = if p.check(TokenType::LeftBrace) {
                    None
                } else {
                    Some(p.parse_expression()?)
                };
                Ok((Some(Box::new(first)), tag))
            } else {
                Ok((None, Some(Self::statement_as_condition(first)?)))
            }
        })?;

        self.expect(TokenType::LeftBrace, "{ after switch clause")?;

        let mut cases = Vec::new();
        loop {
            while self.match_token(TokenType::Semicolon) {}

            match self.current_token().token_type {
                TokenType::RightBrace => break,
                TokenType::Case | TokenType::Default => match self.parse_case_clause() {
                    Ok(clause) => cases.push(clause),
                    Err(err) => {
                        self.add_error(err);
                        self.synchronize();
                    }
                },
                TokenType::Eof | TokenType::Func | TokenType::Type | TokenType::Import | TokenType::Package => {
                    break
                }
                _ => {
                    let err = self.error_here("case or default or }");
                    self.add_error(err);
                    self.advance();
                    self.synchronize();
                }
            }
        }

        if !self.match_token(TokenType::RightBrace) {
            let err = self.error_here("}");
            self.add_error(err);
        }

        Ok(SwitchStmt {
            init,
            tag,
            cases,
            span: self.span_from(start),
        })
    }

    fn parse_case_clause(&mut self) -> ParseResult<CaseClause> {
        let start = self.current_position();
        let is_default = self.match_token(TokenType::Default);
        let exprs = if is_default {
            Vec::new()
        } else {
            self.expect(TokenType::Case, "case")?;
            self.parse_expression_list()?
        };
        self.expect(TokenType::Colon, ": after case")?;
        let body = self.parse_statement_list();

        Ok(CaseClause {
            exprs,
            is_default,
            body,
            span: self.span_from(start),
        })
    }

    /// `return [e1, e2, ...]`
    fn parse_return_statement(&mut self) -> ParseResult<Stmt> {
        let start = self.expect(TokenType::Return, "return")?.position;

        let values = match self.current_token().token_type {
            TokenType::Semicolon
            | TokenType::RightBrace
            | TokenType::Case
            | TokenType::Default
            | TokenType::Eof => Vec::new(),
            _ => self.parse_expression_list()?,
        };

        Ok(Stmt::Return {
            values,
            span: self.span_from(start),
        })
    }
}

/// Parsed `for` clause before the body is attached
enum ForHeader {
    Loop {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        post: Option<Box<Stmt>>,
    },
    Range {
        key: Option<Expr>,
        value: Option<Expr>,
        define: bool,
        expr: Expr,
    },
}
