use crate::lexer::position::Position;
use serde::Serialize;
use thiserror::Error;

/// Kinds of lexical errors; the `Display` text is the diagnostic message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LexErrorKind {
    /// Character that cannot begin any token
    #[error("unexpected character")]
    UnexpectedCharacter,
    /// String literal reaching a newline or end of input before its closing quote
    #[error("unterminated string literal")]
    UnterminatedString,
    /// Block comment without `*/`
    #[error("unterminated block comment")]
    UnterminatedBlockComment,
    /// Backslash followed by a character outside `n t r " \`
    #[error("unknown escape sequence")]
    UnknownEscape,
    /// Integer literal that does not fit in 64 signed bits
    #[error("integer literal out of range")]
    IntegerOutOfRange,
}

/// A lexical error with its location and offending text
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{}", render(.kind, .lexeme))]
pub struct LexerError {
    pub kind: LexErrorKind,
    pub lexeme: String,
    pub position: Position,
}

impl LexerError {
    pub fn new(kind: LexErrorKind, lexeme: impl Into<String>, position: Position) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            position,
        }
    }

    pub fn line(&self) -> usize {
        self.position.line
    }

    pub fn column(&self) -> usize {
        self.position.column
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}

/// Escapes and overflowing literals name the offending text
fn render(kind: &LexErrorKind, lexeme: &str) -> String {
    match kind {
        LexErrorKind::UnknownEscape | LexErrorKind::IntegerOutOfRange => {
            format!("{}: {}", kind, lexeme)
        }
        _ => kind.to_string(),
    }
}
