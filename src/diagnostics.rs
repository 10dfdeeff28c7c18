//! Phase-neutral diagnostics
//!
//! Each phase keeps its own typed error enum; for reporting they are
//! flattened into `Diagnostic` records tagged with the phase that found them.

use crate::lexer::LexerError;
use crate::parser::ParseError;
use crate::semantic::SemanticError;
use serde::Serialize;
use std::fmt;

/// The phase a diagnostic came from; also the report order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Lex,
    Syntax,
    Semantic,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Phase::Lex => "lex",
            Phase::Syntax => "syntax",
            Phase::Semantic => "semantic",
        })
    }
}

/// One reported error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub phase: Phase,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn new(phase: Phase, line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            phase,
            line,
            column,
            message: message.into(),
        }
    }
}

/// `<phase>:<line>:<col>: <message>`
impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}: {}", self.phase, self.line, self.column, self.message)
    }
}

impl From<&LexerError> for Diagnostic {
    fn from(error: &LexerError) -> Self {
        Diagnostic::new(Phase::Lex, error.line(), error.column(), error.to_string())
    }
}

impl From<&ParseError> for Diagnostic {
    fn from(error: &ParseError) -> Self {
        Diagnostic::new(Phase::Syntax, error.line(), error.column(), error.to_string())
    }
}

impl From<&SemanticError> for Diagnostic {
    fn from(error: &SemanticError) -> Self {
        Diagnostic::new(Phase::Semantic, error.line(), error.column(), error.to_string())
    }
}

/// An ordered collection of diagnostics across phases
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one phase's errors, stably ordered by position.
    /// Phases must be added in report order.
    pub fn extend_phase<'a, E>(&mut self, errors: impl IntoIterator<Item = &'a E>)
    where
        E: 'a,
        Diagnostic: From<&'a E>,
    {
        let mut batch: Vec<Diagnostic> = errors.into_iter().map(Diagnostic::from).collect();
        batch.sort_by_key(|d| (d.line, d.column));
        self.items.extend(batch);
    }

    pub fn has_errors(&self, phase: Phase) -> bool {
        self.items.iter().any(|d| d.phase == phase)
    }

    pub fn count(&self, phase: Phase) -> usize {
        self.items.iter().filter(|d| d.phase == phase).count()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.items
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{LexErrorKind, Position};

    #[test]
    fn test_display_format() {
        let diagnostic = Diagnostic::new(Phase::Semantic, 3, 1, "redeclared in this scope: x");
        assert_eq!(diagnostic.to_string(), "semantic:3:1: redeclared in this scope: x");
    }

    #[test]
    fn test_from_phase_errors() {
        let lex = LexerError::new(LexErrorKind::UnexpectedCharacter, "@", Position::new(2, 5, 14));
        let diagnostic = Diagnostic::from(&lex);
        assert_eq!(diagnostic.phase, Phase::Lex);
        assert_eq!((diagnostic.line, diagnostic.column), (2, 5));
        assert_eq!(diagnostic.message, "unexpected character");

        let syntax = ParseError::invalid("bad thing", Position::new(4, 2, 30));
        assert_eq!(Diagnostic::from(&syntax).to_string(), "syntax:4:2: syntax error: bad thing");
    }

    #[test]
    fn test_phase_order_and_stable_sort() {
        let late = ParseError::invalid("late", Position::new(5, 1, 40));
        let early = ParseError::invalid("early", Position::new(1, 9, 8));
        let same_a = ParseError::invalid("same a", Position::new(3, 2, 20));
        let same_b = ParseError::invalid("same b", Position::new(3, 2, 20));
        let lex = LexerError::new(LexErrorKind::UnexpectedCharacter, "$", Position::new(9, 1, 90));

        let mut diagnostics = Diagnostics::new();
        diagnostics.extend_phase(&[lex]);
        diagnostics.extend_phase(&[late, same_a, early, same_b]);

        let messages: Vec<_> = diagnostics.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "unexpected character",
                "syntax error: early",
                "syntax error: same a",
                "syntax error: same b",
                "syntax error: late",
            ]
        );
        assert!(diagnostics.has_errors(Phase::Lex));
        assert!(!diagnostics.has_errors(Phase::Semantic));
        assert_eq!(diagnostics.count(Phase::Syntax), 4);
    }

    #[test]
    fn test_phase_serializes_lowercase() {
        let json = serde_json::to_string(&Diagnostic::new(Phase::Syntax, 1, 2, "m")).expect("json");
        assert_eq!(json, r#"{"phase":"syntax","line":1,"column":2,"message":"m"}"#);
    }
}
