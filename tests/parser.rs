//! Parser integration tests
//!
//! These tests parse complete programs through the public `parse` entry
//! point and check tree shape, error recovery and construct detection.

use go_analyzer::ast::*;
use go_analyzer::{parse, Construct, Phase};

const PROGRAM: &str = r#"package main

import (
	"fmt"
	"strings"
)

const Limit int = 3

type Shape interface {
	Area() float64
}

type Rect struct {
	W, H float64
}

func (r Rect) Area() float64 {
	return r.W * r.H
}

func sum(nums ...int) (int, bool) {
	total := 0
	for i := 0; i < len(nums); i++ {
		if nums[i] < 0 {
			continue
		} else if total > 100 {
			break
		}
		total += nums[i]
	}
	return total, total > 0
}

func main() {
	counts := map[string]int{"a": 1}
	var shapes []Shape
	shapes = append(shapes, Rect{W: 2, H: 3})
	switch n, ok := sum(1, 2); {
	case ok && n > Limit:
		fmt.Println(strings.ToUpper("big"))
		fallthrough
	default:
		counts["b"]++
	}
}
"#;

/// Test parsing a complete program
#[test]
fn test_parse_complete_program() {
    let output = parse(PROGRAM);
    assert!(output.lex_errors.is_empty());
    assert!(output.syntax_errors.is_empty(), "unexpected errors: {:?}", output.syntax_errors);

    let tree = &output.tree;
    assert_eq!(tree.package.name, "main");
    let imports: Vec<_> = tree.imports.iter().map(|i| i.path.as_str()).collect();
    assert_eq!(imports, vec!["fmt", "strings"]);
    assert_eq!(tree.decls.len(), 6);

    let kinds: Vec<_> = tree
        .decls
        .iter()
        .map(|d| match d {
            Decl::Var(_) => "var",
            Decl::Const(_) => "const",
            Decl::Type(_) => "type",
            Decl::Func(_) => "func",
            Decl::Method(_) => "method",
        })
        .collect();
    assert_eq!(kinds, vec!["const", "type", "type", "method", "func", "func"]);
}

/// Test the variadic signature with multiple results
#[test]
fn test_parse_signature() {
    let output = parse(PROGRAM);
    let sum = output
        .tree
        .decls
        .iter()
        .find_map(|d| match d {
            Decl::Func(f) if f.name.name == "sum" => Some(f),
            _ => None,
        })
        .expect("sum");
    assert!(sum.sig.is_variadic());
    assert_eq!(sum.sig.results.len(), 2);
    assert!(matches!(sum.body.stmts[1], Stmt::For(_)));
}

/// Test the constructs recorded for the program
#[test]
fn test_constructs() {
    let output = parse(PROGRAM);
    for expected in [
        Construct::PackageDeclaration,
        Construct::ImportStatements,
        Construct::ConstantDeclarations,
        Construct::InterfaceTypes,
        Construct::StructTypes,
        Construct::MethodDeclarations,
        Construct::VariadicParameters,
        Construct::MultipleReturnValues,
        Construct::ForLoops,
        Construct::ElseClauses,
        Construct::BreakStatements,
        Construct::ContinueStatements,
        Construct::SwitchStatements,
        Construct::FallthroughStatements,
        Construct::MapTypes,
        Construct::CompositeLiterals,
        Construct::LogicalOperators,
    ] {
        assert!(output.constructs.contains(&expected), "missing {}", expected);
    }
    assert!(!output.constructs.contains(&Construct::RangeLoops));
}

/// Mixing `var` with `:=` is rejected
#[test]
fn test_var_with_define_is_syntax_error() {
    let output = parse("package main\nfunc main() {\n\tvar isActive bool := true\n}\n");
    assert_eq!(output.syntax_errors.len(), 1);
    assert_eq!(output.syntax_errors[0].line(), 3);
}

/// Test recovery keeps later declarations
#[test]
fn test_recovery_keeps_later_declarations() {
    let output = parse("package main\nfunc broken( {\n}\nfunc fine() {}\n");
    assert!(!output.syntax_errors.is_empty());
    assert!(output.tree.decls.iter().any(|d| matches!(d, Decl::Func(f) if f.name.name == "fine")));
    assert!(output.diagnostics().iter().all(|d| d.phase == Phase::Syntax));
}

/// Lex errors are reported before syntax errors
#[test]
fn test_lex_and_syntax_errors_together() {
    let output = parse("package main\nfunc main() {\n\tx := 1 +\n\ty := #\n}\n");
    let diagnostics = output.diagnostics();
    assert!(diagnostics.has_errors(Phase::Lex));
    assert!(diagnostics.has_errors(Phase::Syntax));
    assert_eq!(diagnostics.iter().next().map(|d| d.phase), Some(Phase::Lex));
}

/// Test syntax error message format
#[test]
fn test_syntax_error_message() {
    let output = parse("package main\nfunc main() {\n\tif x {\n}\n");
    let message = output.syntax_errors[0].to_string();
    assert!(message.starts_with("syntax error: unexpected EOF"), "{}", message);
}
