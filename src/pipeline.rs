//! The three analysis entry points
//!
//! Each runs every phase up to the one requested on a source string and
//! returns the artifacts together with every phase's errors. Later phases
//! always run on whatever the earlier ones recovered.

use crate::ast::Program;
use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::lexer::{Lexer, LexerError, Token};
use crate::parser::{ParseError, Parser};
use crate::semantic::{AnalyzerConfig, SemanticAnalyzer, SemanticError, Symbol};
use crate::visitor::{collect_constructs, Construct};
use log::debug;
use serde::Serialize;

/// Output of lexical analysis
#[derive(Debug, Clone, Serialize)]
pub struct LexOutput {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexerError>,
}

impl LexOutput {
    pub fn diagnostics(&self) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        diagnostics.extend_phase(&self.errors);
        diagnostics
    }
}

/// Output of lexing and parsing
#[derive(Debug, Clone, Serialize)]
pub struct ParseOutput {
    pub tree: Program,
    pub tokens: Vec<Token>,
    pub lex_errors: Vec<LexerError>,
    pub syntax_errors: Vec<ParseError>,
    /// Grammar constructs the tree uses
    pub constructs: Vec<Construct>,
}

impl ParseOutput {
    pub fn diagnostics(&self) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        diagnostics.extend_phase(&self.lex_errors);
        diagnostics.extend_phase(&self.syntax_errors);
        diagnostics
    }
}

/// Output of the full pipeline
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisOutput {
    pub tree: Program,
    pub symbol_table: Vec<Symbol>,
    pub lex_errors: Vec<LexerError>,
    pub syntax_errors: Vec<ParseError>,
    pub semantic_errors: Vec<SemanticError>,
    pub constructs: Vec<Construct>,
}

impl AnalysisOutput {
    /// All errors in phase order, each phase ordered by position
    pub fn diagnostics(&self) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        diagnostics.extend_phase(&self.lex_errors);
        diagnostics.extend_phase(&self.syntax_errors);
        diagnostics.extend_phase(&self.semantic_errors);
        diagnostics
    }
}

pub fn tokenize(source: &str) -> LexOutput {
    tokenize_with_config(source, &Config::default().analyzer)
}

pub fn parse(source: &str) -> ParseOutput {
    parse_with_config(source, &Config::default().analyzer)
}

pub fn analyze(source: &str) -> AnalysisOutput {
    analyze_with_config(source, &Config::default().analyzer)
}

pub fn tokenize_with_config(source: &str, config: &AnalyzerConfig) -> LexOutput {
    let (tokens, mut errors) = Lexer::new(source).tokenize();
    truncate(&mut errors, config.max_errors);
    debug!("lexed {} tokens, {} lex errors", tokens.len(), errors.len());
    LexOutput { tokens, errors }
}

pub fn parse_with_config(source: &str, config: &AnalyzerConfig) -> ParseOutput {
    let LexOutput { tokens, errors: lex_errors } = tokenize_with_config(source, config);

    let mut parser = Parser::from_tokens(&tokens);
    let tree = parser.parse_program();
    // Already in source order
    let mut syntax_errors = parser.take_errors();
    truncate(&mut syntax_errors, config.max_errors);
    let constructs = collect_constructs(&tree);
    debug!(
        "parsed {} declarations, {} syntax errors",
        tree.decls.len(),
        syntax_errors.len()
    );

    ParseOutput {
        tree,
        tokens,
        lex_errors,
        syntax_errors,
        constructs,
    }
}

pub fn analyze_with_config(source: &str, config: &AnalyzerConfig) -> AnalysisOutput {
    let ParseOutput {
        tree,
        lex_errors,
        syntax_errors,
        constructs,
        ..
    } = parse_with_config(source, config);

    let mut analyzer = SemanticAnalyzer::with_config(config.clone());
    let result = analyzer.analyze(&tree);
    debug!(
        "analyzed {} symbols, {} semantic errors",
        result.symbol_table.len(),
        result.errors.len()
    );

    AnalysisOutput {
        tree,
        symbol_table: result.symbol_table,
        lex_errors,
        syntax_errors,
        semantic_errors: result.errors,
        constructs,
    }
}

fn truncate<T>(errors: &mut Vec<T>, max_errors: Option<usize>) {
    if let Some(max) = max_errors {
        errors.truncate(max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Phase;

    #[test]
    fn test_clean_program_has_no_diagnostics() {
        let output = analyze("package main\n\nfunc main() {\n\tx := 1\n\tx++\n}\n");
        assert!(output.diagnostics().is_empty());
        assert!(output.symbol_table.iter().any(|s| s.name == "main"));
        assert!(output.constructs.contains(&Construct::IncrementDecrement));
    }

    #[test]
    fn test_phases_concatenate_in_order() {
        let output = analyze("package main\nfunc main() {\n\tx := @\n\ty = 1\n}\n");
        let phases: Vec<_> = output.diagnostics().iter().map(|d| d.phase).collect();
        assert_eq!(phases.first(), Some(&Phase::Lex));
        assert!(phases.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_later_phases_run_after_errors() {
        let output = analyze("package main\nfunc main() {\n\tvar a int = \n\tb = 2\n}\n");
        assert!(!output.syntax_errors.is_empty());
        assert!(output
            .semantic_errors
            .iter()
            .any(|e| e.to_string() == "undeclared identifier: b"));
    }

    #[test]
    fn test_error_cap_applies_per_phase() {
        let source = "package main\nfunc main() {\n\ta = 1\n\tb = 2\n\tc = 3\n}\n";
        let config = AnalyzerConfig {
            max_errors: Some(2),
            ..AnalyzerConfig::default()
        };
        let output = analyze_with_config(source, &config);
        assert_eq!(output.semantic_errors.len(), 2);
        assert_eq!(analyze(source).semantic_errors.len(), 3);
    }

    #[test]
    fn test_tokenize_reports_lex_errors() {
        let output = tokenize("package main\nvar s = \"abc\n");
        assert_eq!(output.errors.len(), 1);
        assert!(output.diagnostics().has_errors(Phase::Lex));
        assert_eq!(output.tokens.last().map(|t| t.lexeme.as_str()), Some(""));
    }
}
