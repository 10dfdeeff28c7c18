//! Type parsing for the Go subset
//!
//! Type ::= Name | '[' ']' Type | '[' Expr ']' Type | 'map' '[' Type ']' Type
//!        | '*' Type | 'func' Signature | 'interface' '{' MethodSpec* '}'
//!        | '(' Type ')'
//!
//! `...T` is accepted only as the last parameter type and is handled by the
//! parameter list parser.

use super::error::{ParseError, ParseResult};
use super::parser::Parser;
use crate::ast::{Span, TypeExpr};
use crate::lexer::TokenType;

impl Parser {
    /// Parse a type expression
    pub fn parse_type(&mut self) -> ParseResult<TypeExpr> {
        let start = self.current_position();

        match self.current_token().token_type {
            TokenType::Ident => Ok(TypeExpr::Named(self.expect_ident("type")?)),

            // Slice and array types: []T, [N]T
            TokenType::LeftBracket => {
                self.advance();
                if self.match_token(TokenType::RightBracket) {
                    let elem = self.parse_type()?;
                    return Ok(TypeExpr::Slice {
                        elem: Box::new(elem),
                        span: self.span_from(start),
                    });
                }

                self.expr_level += 1;
                let len = self.parse_expression();
                self.expr_level -= 1;
                let len = len?;
                self.expect(TokenType::RightBracket, "] in array type")?;
                let elem = self.parse_type()?;
                Ok(TypeExpr::Array {
                    len: Box::new(len),
                    elem: Box::new(elem),
                    span: self.span_from(start),
                })
            }

            // Map types: map[K]V
            TokenType::Map => {
                self.advance();
                self.expect(TokenType::LeftBracket, "[ after map")?;
                let key = self.parse_type()?;
                self.expect(TokenType::RightBracket, "] in map type")?;
                let value = self.parse_type()?;
                Ok(TypeExpr::Map {
                    key: Box::new(key),
                    value: Box::new(value),
                    span: self.span_from(start),
                })
            }

            // Pointer types: *T
            TokenType::Star => {
                self.advance();
                let elem = self.parse_type()?;
                Ok(TypeExpr::Pointer {
                    elem: Box::new(elem),
                    span: self.span_from(start),
                })
            }

            // Function types: func(params) results
            TokenType::Func => {
                self.advance();
                let sig = self.parse_signature()?;
                Ok(TypeExpr::Func {
                    sig: Box::new(sig),
                    span: self.span_from(start),
                })
            }

            // Interface literals: interface{} or interface{ M() }
            TokenType::Interface => {
                self.advance();
                let methods = self.parse_interface_methods()?;
                Ok(TypeExpr::Interface {
                    methods,
                    span: Span::new(start, self.previous_end()),
                })
            }

            TokenType::LeftParen => {
                self.advance();
                let inner = self.parse_type()?;
                self.expect(TokenType::RightParen, ") after type")?;
                Ok(inner)
            }

            TokenType::Ellipsis => Err(ParseError::invalid(
                "can only use ... with final parameter in list",
                start,
            )),

            _ => Err(self.error_here("type")),
        }
    }
}
