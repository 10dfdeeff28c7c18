//! Text and JSON rendering of analysis outputs

use crate::diagnostics::{Diagnostics, Phase};
use crate::lexer::{Token, TokenType};
use crate::pipeline::{AnalysisOutput, LexOutput, ParseOutput};
use crate::semantic::Symbol;
use crate::visitor::Construct;
use serde::Serialize;
use std::fmt::Write;

/// Error counts and constructs shown at the end of a report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_errors: usize,
    /// Phases that reported at least one error
    pub error_types: Vec<Phase>,
    pub lex_errors: usize,
    pub syntax_errors: usize,
    pub semantic_errors: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub constructs: Vec<Construct>,
}

impl Summary {
    pub fn new(diagnostics: &Diagnostics, constructs: &[Construct]) -> Self {
        let error_types = [Phase::Lex, Phase::Syntax, Phase::Semantic]
            .into_iter()
            .filter(|phase| diagnostics.has_errors(*phase))
            .collect();
        Self {
            total_errors: diagnostics.len(),
            error_types,
            lex_errors: diagnostics.count(Phase::Lex),
            syntax_errors: diagnostics.count(Phase::Syntax),
            semantic_errors: diagnostics.count(Phase::Semantic),
            constructs: constructs.to_vec(),
        }
    }
}

/// Token listing, then errors and summary
pub fn lex_report(output: &LexOutput) -> String {
    let mut out = String::new();
    write_tokens(&mut out, &output.tokens);
    let diagnostics = output.diagnostics();
    write_diagnostics(&mut out, &diagnostics);
    write_summary(&mut out, &Summary::new(&diagnostics, &[]));
    out
}

pub fn parse_report(output: &ParseOutput) -> String {
    let mut out = String::new();
    let diagnostics = output.diagnostics();
    write_diagnostics(&mut out, &diagnostics);
    write_summary(&mut out, &Summary::new(&diagnostics, &output.constructs));
    out
}

pub fn analysis_report(output: &AnalysisOutput) -> String {
    let mut out = String::new();
    let diagnostics = output.diagnostics();
    write_diagnostics(&mut out, &diagnostics);
    write_symbol_table(&mut out, &output.symbol_table);
    write_summary(&mut out, &Summary::new(&diagnostics, &output.constructs));
    out
}

/// One `<phase>:<line>:<col>: <message>` line per error
pub fn diagnostic_lines(diagnostics: &Diagnostics) -> String {
    diagnostics.iter().fold(String::new(), |mut out, d| {
        let _ = writeln!(out, "{}", d);
        out
    })
}

/// Pretty JSON of any output record
pub fn to_json<T: Serialize>(output: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(output)
}

fn write_header(out: &mut String, title: &str) {
    if !out.is_empty() {
        out.push('\n');
    }
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", "=".repeat(title.len()));
}

fn write_tokens(out: &mut String, tokens: &[Token]) {
    write_header(out, "Tokens");
    for token in tokens.iter().filter(|t| t.token_type != TokenType::Eof) {
        let _ = writeln!(out, "{}", token);
    }
}

fn write_diagnostics(out: &mut String, diagnostics: &Diagnostics) {
    write_header(out, "Errors");
    if diagnostics.is_empty() {
        out.push_str("none\n");
    } else {
        out.push_str(&diagnostic_lines(diagnostics));
    }
}

fn write_symbol_table(out: &mut String, symbols: &[Symbol]) {
    write_header(out, "Symbol table");
    let rows: Vec<[String; 5]> = symbols
        .iter()
        .map(|s| {
            [
                s.name.clone(),
                s.kind.to_string(),
                s.declared_type.to_string(),
                s.scope_depth.to_string(),
                s.decl_line.to_string(),
            ]
        })
        .collect();
    let headers = ["name", "kind", "type", "depth", "line"];

    let mut widths = headers.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    write_row(out, &headers.map(String::from), &widths);
    for row in &rows {
        write_row(out, row, &widths);
    }
}

fn write_row(out: &mut String, cells: &[String; 5], widths: &[usize; 5]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect::<Vec<_>>()
        .join("  ");
    let _ = writeln!(out, "{}", line.trim_end());
}

fn write_summary(out: &mut String, summary: &Summary) {
    write_header(out, "Summary");
    let _ = writeln!(out, "lex errors: {}", summary.lex_errors);
    let _ = writeln!(out, "syntax errors: {}", summary.syntax_errors);
    let _ = writeln!(out, "semantic errors: {}", summary.semantic_errors);
    let _ = writeln!(out, "total errors: {}", summary.total_errors);
    if !summary.constructs.is_empty() {
        out.push_str("constructs:\n");
        for construct in &summary.constructs {
            let _ = writeln!(out, "  {}", construct);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{analyze, parse, tokenize};

    #[test]
    fn test_lex_report_lists_tokens() {
        let report = lex_report(&tokenize("package main\n"));
        assert!(report.contains("PACKAGE(package) at line 1"));
        assert!(report.contains("IDENT(main) at line 1"));
        assert!(report.contains("total errors: 0"));
    }

    #[test]
    fn test_analysis_report_sections() {
        let report = analysis_report(&analyze("package main\nvar x int = 10\nvar x int = 20\n"));
        assert!(report.contains("semantic:3:5: redeclared in this scope: x"));
        assert!(report.contains("Symbol table"));
        assert!(report.contains("semantic errors: 1"));
        assert!(report.contains("Variable declarations"));
    }

    #[test]
    fn test_symbol_table_is_aligned() {
        let report = analysis_report(&analyze("package main\nvar counter int\nfunc main() {}\n"));
        let table: Vec<&str> = report
            .lines()
            .skip_while(|l| *l != "Symbol table")
            .skip(2)
            .take_while(|l| !l.is_empty())
            .collect();
        assert!(table[0].starts_with("name"));
        let kind_column = table[0].find("kind").expect("kind header");
        for row in &table[1..] {
            assert_eq!(&row[kind_column - 2..kind_column], "  ");
        }
    }

    #[test]
    fn test_summary_error_types() {
        let output = parse("package main\nfunc main() { x := @ }\n");
        let summary = Summary::new(&output.diagnostics(), &output.constructs);
        assert_eq!(summary.error_types.first(), Some(&Phase::Lex));
        assert_eq!(summary.total_errors, summary.lex_errors + summary.syntax_errors);
    }

    #[test]
    fn test_json_output() {
        let json = to_json(&analyze("package main\nfunc main() { break }\n")).expect("json");
        let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
        assert_eq!(value["semantic_errors"][0]["kind"], "misplaced_control");
        assert!(value["symbol_table"].as_array().map_or(false, |s| !s.is_empty()));
    }
}
