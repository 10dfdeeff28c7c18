//! Syntax errors
//!
//! Every error records where the parser stood, what it expected and what it
//! found; the parser collects them and keeps going.

use crate::lexer::{Position, Token};
use serde::Serialize;
use thiserror::Error;

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseError {
    /// A token that does not fit the production being parsed
    #[error("syntax error: unexpected {found}, expected {expected}")]
    UnexpectedToken {
        expected: String,
        found: String,
        position: Position,
    },

    /// Input ended in the middle of a production
    #[error("syntax error: unexpected EOF, expected {expected}")]
    UnexpectedEof { expected: String, position: Position },

    /// Well-formed tokens in an invalid arrangement
    #[error("syntax error: {message}")]
    InvalidSyntax { message: String, position: Position },
}

impl ParseError {
    /// Error for `token` not matching what the caller expected
    pub fn unexpected(token: &Token, expected: impl Into<String>) -> Self {
        let expected = expected.into();
        if token.token_type == crate::lexer::TokenType::Eof {
            ParseError::UnexpectedEof {
                expected,
                position: token.position,
            }
        } else {
            ParseError::UnexpectedToken {
                expected,
                found: token.describe(),
                position: token.position,
            }
        }
    }

    pub fn invalid(message: impl Into<String>, position: Position) -> Self {
        ParseError::InvalidSyntax {
            message: message.into(),
            position,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            ParseError::UnexpectedToken { position, .. }
            | ParseError::UnexpectedEof { position, .. }
            | ParseError::InvalidSyntax { position, .. } => *position,
        }
    }

    pub fn line(&self) -> usize {
        self.position().line
    }

    pub fn column(&self) -> usize {
        self.position().column
    }

    /// What the parser was looking for, if it was looking for something specific
    pub fn expected(&self) -> Option<&str> {
        match self {
            ParseError::UnexpectedToken { expected, .. } | ParseError::UnexpectedEof { expected, .. } => {
                Some(expected)
            }
            ParseError::InvalidSyntax { .. } => None,
        }
    }

    /// Description of the offending token
    pub fn got(&self) -> Option<&str> {
        match self {
            ParseError::UnexpectedToken { found, .. } => Some(found),
            ParseError::UnexpectedEof { .. } => Some("EOF"),
            ParseError::InvalidSyntax { .. } => None,
        }
    }
}
