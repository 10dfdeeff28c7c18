//! Lexer integration tests
//!
//! These tests tokenize complete programs through the public `tokenize`
//! entry point and check the properties the rest of the pipeline relies on.

use go_analyzer::lexer::{LiteralValue, TokenType};
use go_analyzer::{tokenize, Phase};

const PROGRAM: &str = r#"package main

import "fmt"

// Point is a 2D point
type Point struct {
	X, Y float64
}

/* block
   comment */
func (p *Point) Scale(k float64) {
	p.X *= k
	p.Y *= k
}

func main() {
	nums := []int{1, 2, 3}
	total := 0
	for _, n := range nums {
		total += n
	}
	flags := 255 &^ 15
	fmt.Println("total:\t", total, flags, 1.5e3)
}
"#;

/// Test lexing a complete program without errors
#[test]
fn test_lex_complete_program() {
    let output = tokenize(PROGRAM);
    assert!(output.errors.is_empty(), "unexpected errors: {:?}", output.errors);
    assert_eq!(output.tokens.last().map(|t| t.token_type), Some(TokenType::Eof));

    let kinds: Vec<_> = output.tokens.iter().map(|t| t.token_type).collect();
    for expected in [
        TokenType::Package,
        TokenType::Import,
        TokenType::Struct,
        TokenType::Func,
        TokenType::StarEq,
        TokenType::Define,
        TokenType::Range,
        TokenType::PlusEq,
        TokenType::AndNot,
        TokenType::Float,
        TokenType::String,
    ] {
        assert!(kinds.contains(&expected), "missing {:?}", expected);
    }
}

/// Lexemes laid back at their offsets reproduce the source outside whitespace and comments
#[test]
fn test_lexemes_match_source_offsets() {
    let output = tokenize(PROGRAM);
    for token in &output.tokens {
        let end = token.position.offset + token.lexeme.len();
        assert_eq!(&PROGRAM[token.position.offset..end], token.lexeme);
    }
}

/// Test that comments produce no tokens
#[test]
fn test_comments_are_skipped() {
    let output = tokenize("// only a comment\n/* and another */\n");
    assert_eq!(output.tokens.len(), 1);
    assert_eq!(output.tokens[0].token_type, TokenType::Eof);
}

/// Test literal values
#[test]
fn test_literal_values() {
    let output = tokenize(r#"42 7 3.25 "a\nb""#);
    let values: Vec<_> = output.tokens.iter().filter_map(|t| t.value.clone()).collect();
    assert_eq!(
        values,
        vec![
            LiteralValue::Int(42),
            LiteralValue::Int(7),
            LiteralValue::Float(3.25),
            LiteralValue::String("a\nb".to_string()),
        ]
    );
}

/// Test that lexing continues past errors and reports each one
#[test]
fn test_lex_error_recovery() {
    let output = tokenize("package main\nvar a = 1 @ 2\nvar s = \"open\nvar b = 99999999999999999999\n");
    let lines: Vec<_> = output.errors.iter().map(|e| e.line()).collect();
    assert_eq!(lines, vec![2, 3, 4]);
    assert!(output.diagnostics().iter().all(|d| d.phase == Phase::Lex));
    assert!(output.tokens.iter().any(|t| t.lexeme == "b"));
}

/// Test positions are 1-based lines and columns
#[test]
fn test_token_positions() {
    let output = tokenize("package main\n\nfunc  main() {}\n");
    let func = output
        .tokens
        .iter()
        .find(|t| t.token_type == TokenType::Func)
        .expect("func token");
    assert_eq!((func.line(), func.column()), (3, 1));
    let name = output.tokens.iter().filter(|t| t.lexeme == "main").nth(1).expect("main");
    assert_eq!((name.line(), name.column()), (3, 7));
}

/// Test token listing format
#[test]
fn test_token_display() {
    let output = tokenize("x := 5");
    let listing: Vec<_> = output.tokens.iter().map(|t| t.to_string()).collect();
    assert_eq!(listing[..3], ["IDENT(x) at line 1", "DEFINE(:=) at line 1", "INT(5) at line 1"]);
}
