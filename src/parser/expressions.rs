//! Expression parsing with operator precedence
//!
//! Binary precedence, lowest to highest:
//! `||`, `&&`, comparisons, `+ - | ^`, `* / % << >> & &^`.
//! All binary operators are left-associative; unary operators bind tighter
//! and postfix selectors, indexes and calls tightest.

use super::error::ParseResult;
use super::parser::Parser;
use crate::ast::*;
use crate::lexer::{LiteralValue, TokenType};

/// Binding power and operator for a binary operator token
fn binary_operator(token_type: TokenType) -> Option<(u8, BinaryOp)> {
    let entry = match token_type {
        TokenType::LogicalOr => (1, BinaryOp::LogicalOr),
        TokenType::LogicalAnd => (2, BinaryOp::LogicalAnd),

        TokenType::Eq => (3, BinaryOp::Equal),
        TokenType::NotEq => (3, BinaryOp::NotEqual),
        TokenType::Less => (3, BinaryOp::Less),
        TokenType::LessEq => (3, BinaryOp::LessEqual),
        TokenType::Greater => (3, BinaryOp::Greater),
        TokenType::GreaterEq => (3, BinaryOp::GreaterEqual),

        TokenType::Plus => (4, BinaryOp::Add),
        TokenType::Minus => (4, BinaryOp::Subtract),
        TokenType::Or => (4, BinaryOp::BitwiseOr),
        TokenType::Caret => (4, BinaryOp::BitwiseXor),

        TokenType::Star => (5, BinaryOp::Multiply),
        TokenType::Slash => (5, BinaryOp::Divide),
        TokenType::Percent => (5, BinaryOp::Modulo),
        TokenType::LeftShift => (5, BinaryOp::LeftShift),
        TokenType::RightShift => (5, BinaryOp::RightShift),
        TokenType::And => (5, BinaryOp::BitwiseAnd),
        TokenType::AndNot => (5, BinaryOp::AndNot),

        _ => return None,
    };
    Some(entry)
}

/// Operator applied by a compound assignment token (`+=` applies `+`)
pub(super) fn compound_operator(token_type: TokenType) -> Option<BinaryOp> {
    let op = match token_type {
        TokenType::PlusEq => BinaryOp::Add,
        TokenType::MinusEq => BinaryOp::Subtract,
        TokenType::StarEq => BinaryOp::Multiply,
        TokenType::SlashEq => BinaryOp::Divide,
        TokenType::PercentEq => BinaryOp::Modulo,
        TokenType::AndEq => BinaryOp::BitwiseAnd,
        TokenType::OrEq => BinaryOp::BitwiseOr,
        TokenType::CaretEq => BinaryOp::BitwiseXor,
        TokenType::AndNotEq => BinaryOp::AndNot,
        TokenType::LeftShiftEq => BinaryOp::LeftShift,
        TokenType::RightShiftEq => BinaryOp::RightShift,
        _ => return None,
    };
    Some(op)
}

impl Parser {
    /// Parse an expression (entry point for expression parsing)
    pub fn parse_expression(&mut self) -> ParseResult<Expr> {
        self.parse_binary_expression(1)
    }

    /// `e1, e2, ...`
    pub fn parse_expression_list(&mut self) -> ParseResult<Vec<Expr>> {
        let mut exprs = vec![self.parse_expression()?];
        while self.match_token(TokenType::Comma) {
            exprs.push(self.parse_expression()?);
        }
        Ok(exprs)
    }

    /// Precedence climbing over binary operators at or above `min_precedence`
    fn parse_binary_expression(&mut self, min_precedence: u8) -> ParseResult<Expr> {
        let mut left = self.parse_unary_expression()?;

        while let Some((precedence, op)) = binary_operator(self.current_token().token_type) {
            if precedence < min_precedence {
                break;
            }
            self.advance();
            let right = self.parse_binary_expression(precedence + 1)?;
            let span = left.span().merge(right.span());
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }

        Ok(left)
    }

    /// Parse unary expressions
    fn parse_unary_expression(&mut self) -> ParseResult<Expr> {
        let op = match self.current_token().token_type {
            TokenType::Not => UnaryOp::Not,
            TokenType::Minus => UnaryOp::Negate,
            TokenType::Plus => UnaryOp::Plus,
            TokenType::Caret => UnaryOp::BitwiseNot,
            TokenType::And => UnaryOp::AddressOf,
            TokenType::Star => UnaryOp::Dereference,
            _ => return self.parse_postfix_expression(),
        };

        let start = self.advance().position;
        let operand = self.parse_unary_expression()?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
            span: self.span_from(start),
        })
    }

    /// Selectors, index expressions and calls on top of an operand
    fn parse_postfix_expression(&mut self) -> ParseResult<Expr> {
        let mut expr = self.parse_operand()?;
        let start = expr.position();

        loop {
            match self.current_token().token_type {
                TokenType::Dot => {
                    self.advance();
                    let field = self.expect_ident("name after .")?;
                    expr = Expr::FieldAccess {
                        target: Box::new(expr),
                        field,
                        span: self.span_from(start),
                    };
                }
                TokenType::LeftBracket => {
                    self.advance();
                    self.expr_level += 1;
                    let index = self.parse_expression();
                    self.expr_level -= 1;
                    let index = index?;
                    self.expect(TokenType::RightBracket, "] after index")?;
                    expr = Expr::Index {
                        target: Box::new(expr),
                        index: Box::new(index),
                        span: self.span_from(start),
                    };
                }
                TokenType::LeftParen => {
                    self.advance();
                    self.expr_level += 1;
                    let args = self.parse_call_arguments();
                    self.expr_level -= 1;
                    let (args, spread) = args?;
                    self.expect(TokenType::RightParen, ", or ) in argument list")?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                        spread,
                        span: self.span_from(start),
                    };
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    /// Arguments up to (not including) the closing paren; a trailing `...`
    /// spreads the last argument
    fn parse_call_arguments(&mut self) -> ParseResult<(Vec<Expr>, bool)> {
        let mut args = Vec::new();
        let mut spread = false;

        while !self.check(TokenType::RightParen) {
            args.push(self.parse_expression()?);
            if self.match_token(TokenType::Ellipsis) {
                spread = true;
                self.match_token(TokenType::Comma);
                break;
            }
            if !self.match_token(TokenType::Comma) {
                break;
            }
        }

        Ok((args, spread))
    }

    /// Literals, identifiers, parenthesized expressions and composite literals
    fn parse_operand(&mut self) -> ParseResult<Expr> {
        let token = self.current_token().clone();
        let span = Span::new(token.position, token.end());

        match token.token_type {
            TokenType::Int => {
                self.advance();
                let value = match token.value {
                    Some(LiteralValue::Int(value)) => Some(value),
                    _ => None,
                };
                Ok(Expr::IntLit {
                    value,
                    raw: token.lexeme,
                    span,
                })
            }
            TokenType::Float => {
                self.advance();
                let value = match token.value {
                    Some(LiteralValue::Float(value)) => value,
                    _ => 0.0,
                };
                Ok(Expr::FloatLit {
                    value,
                    raw: token.lexeme,
                    span,
                })
            }
            TokenType::String => {
                self.advance();
                let value = match token.value {
                    Some(LiteralValue::String(value)) => value,
                    _ => String::new(),
                };
                Ok(Expr::StringLit { value, span })
            }
            TokenType::True | TokenType::False => {
                self.advance();
                Ok(Expr::BoolLit {
                    value: token.token_type == TokenType::True,
                    span,
                })
            }
            TokenType::Ident => {
                let ident = self.expect_ident("name")?;
                if self.check(TokenType::LeftBrace) && self.expr_level >= 0 {
                    return self.parse_composite_literal(Some(TypeExpr::Named(ident)), token.position);
                }
                Ok(Expr::Ident(ident))
            }
            TokenType::LeftParen => {
                self.advance();
                self.expr_level += 1;
                let inner = self.parse_expression();
                self.expr_level -= 1;
                let inner = inner?;
                self.expect(TokenType::RightParen, ")")?;
                Ok(Expr::Paren {
                    inner: Box::new(inner),
                    span: self.span_from(token.position),
                })
            }
            // []T{...}, [N]T{...}, map[K]V{...}
            TokenType::LeftBracket | TokenType::Map => {
                let ty = self.parse_type()?;
                if !self.check(TokenType::LeftBrace) {
                    return Err(self.error_here(&format!("{{ after composite literal type {}", ty)));
                }
                self.parse_composite_literal(Some(ty), token.position)
            }
            _ => Err(self.error_here("expression")),
        }
    }

    /// `{ elem, key: elem, ... }` following a literal type
    fn parse_composite_literal(
        &mut self,
        ty: Option<TypeExpr>,
        start: crate::lexer::Position,
    ) -> ParseResult<Expr> {
        self.expect(TokenType::LeftBrace, "{")?;

        let saved_level = self.expr_level;
        self.expr_level = self.expr_level.max(0) + 1;
        let elements = self.parse_elements();
        self.expr_level = saved_level;
        let elements = elements?;

        self.expect(TokenType::RightBrace, "comma or } in composite literal")?;
        Ok(Expr::CompositeLit {
            ty,
            elements,
            span: self.span_from(start),
        })
    }

    fn parse_elements(&mut self) -> ParseResult<Vec<Element>> {
        let mut elements = Vec::new();

        while !self.check(TokenType::RightBrace) {
            let first = self.parse_element_value()?;
            let element = if self.match_token(TokenType::Colon) {
                Element {
                    key: Some(first),
                    value: self.parse_element_value()?,
                }
            } else {
                Element {
                    key: None,
                    value: first,
                }
            };
            elements.push(element);

            if !self.match_token(TokenType::Comma) {
                break;
            }
        }

        Ok(elements)
    }

    /// An element value; a bare `{...}` is a literal of the implied element type
    fn parse_element_value(&mut self) -> ParseResult<Expr> {
        if self.check(TokenType::LeftBrace) {
            let start = self.current_position();
            self.parse_composite_literal(None, start)
        } else {
            self.parse_expression()
        }
    }
}
