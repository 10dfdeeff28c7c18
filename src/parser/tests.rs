//! Parser tests for the Go subset

#[cfg(test)]
mod tests {
    use super::super::{insert_semicolons, ParseError, ParseResult, Parser};
    use crate::ast::*;
    use crate::lexer::{Lexer, TokenType};

    /// Helper function to parse a program and collect its errors
    fn parse_program(input: &str) -> (Program, Vec<ParseError>) {
        let mut parser = Parser::new(input);
        let program = parser.parse_program();
        let errors = parser.take_errors();
        (program, errors)
    }

    /// Parse a program that must be free of syntax errors
    fn parse_ok(input: &str) -> Program {
        let (program, errors) = parse_program(input);
        assert!(errors.is_empty(), "unexpected syntax errors: {:?}", errors);
        program
    }

    /// Helper function to parse a standalone expression
    fn parse_expression(input: &str) -> ParseResult<Expr> {
        let mut parser = Parser::new(input);
        parser.parse_expression()
    }

    /// Statements of the body of the first function
    fn body_of(program: &Program) -> &[Stmt] {
        program
            .decls
            .iter()
            .find_map(|d| match d {
                Decl::Func(f) => Some(f.body.stmts.as_slice()),
                _ => None,
            })
            .expect("program has a function")
    }

    fn in_main(body: &str) -> String {
        format!("package main\n\nfunc main() {{\n{}\n}}\n", body)
    }

    #[test]
    fn test_semicolon_insertion() {
        let (tokens, _) = Lexer::new("x := 1\ny++\nreturn\n}").tokenize();
        let kinds: Vec<_> = insert_semicolons(&tokens).iter().map(|t| t.token_type).collect();
        assert_eq!(kinds, vec![
            TokenType::Ident,
            TokenType::Define,
            TokenType::Int,
            TokenType::Semicolon,
            TokenType::Ident,
            TokenType::Increment,
            TokenType::Semicolon,
            TokenType::Return,
            TokenType::Semicolon,
            TokenType::RightBrace,
            TokenType::Semicolon,
            TokenType::Eof,
        ]);
    }

    #[test]
    fn test_no_semicolon_after_operator_or_open_brace() {
        let (tokens, _) = Lexer::new("x := 1 +\n2\nif x {\n}").tokenize();
        let semis = insert_semicolons(&tokens)
            .iter()
            .filter(|t| t.is_implicit_semicolon())
            .count();
        // after `2` and after the final `}`
        assert_eq!(semis, 2);
    }

    #[test]
    fn test_package_and_imports() {
        let program = parse_ok("package main\n\nimport \"fmt\"\nimport (\n\t\"os\"\n\t\"strings\"\n)\n");
        assert_eq!(program.package.name, "main");
        let paths: Vec<_> = program.imports.iter().map(|i| i.path.as_str()).collect();
        assert_eq!(paths, vec!["fmt", "os", "strings"]);
        assert!(program.decls.is_empty());
    }

    #[test]
    fn test_missing_package_clause() {
        let (program, errors) = parse_program("func main() {}\n");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].expected(), Some("package clause"));
        assert_eq!(program.package.name, "");
        assert_eq!(program.decls.len(), 1);
    }

    #[test]
    fn test_var_and_const_declarations() {
        let program = parse_ok(
            "package main\nvar a int\nvar b = 2\nvar c, d float64 = 1.5, 2.5\nconst PI = 3.14\nconst N int = 10\n",
        );
        assert_eq!(program.decls.len(), 5);
        match &program.decls[2] {
            Decl::Var(decl) => {
                assert_eq!(decl.names.len(), 2);
                assert!(matches!(decl.ty, Some(TypeExpr::Named(ref t)) if t.name == "float64"));
                assert_eq!(decl.values.len(), 2);
            }
            other => panic!("Expected var declaration, got {:?}", other),
        }
        match &program.decls[3] {
            Decl::Const(decl) => {
                assert!(decl.ty.is_none());
                assert!(matches!(decl.values[0], Expr::FloatLit { .. }));
            }
            other => panic!("Expected const declaration, got {:?}", other),
        }
    }

    #[test]
    fn test_struct_and_interface_declarations() {
        let program = parse_ok(
            "package main\n\
             type Person struct {\n\tName string\n\tAge, Height int\n}\n\
             type Shape interface {\n\tArea() float64\n\tScale(f float64)\n}\n\
             type IDs []int\n",
        );
        match &program.decls[0] {
            Decl::Type(TypeDecl { def: TypeDef::Struct { fields }, .. }) => {
                let names: Vec<_> = fields.iter().map(|f| f.name.name.as_str()).collect();
                assert_eq!(names, vec!["Name", "Age", "Height"]);
            }
            other => panic!("Expected struct, got {:?}", other),
        }
        match &program.decls[1] {
            Decl::Type(TypeDecl { def: TypeDef::Interface { methods }, .. }) => {
                assert_eq!(methods.len(), 2);
                assert_eq!(methods[0].sig.results.len(), 1);
                assert_eq!(methods[1].sig.params.len(), 1);
            }
            other => panic!("Expected interface, got {:?}", other),
        }
        assert!(matches!(
            &program.decls[2],
            Decl::Type(TypeDecl { def: TypeDef::Alias { target: TypeExpr::Slice { .. } }, .. })
        ));
    }

    #[test]
    fn test_function_signatures() {
        let program = parse_ok(
            "package main\n\
             func add(a, b int) int { return a + b }\n\
             func divmod(a int, b int) (int, int) { return a / b, a % b }\n\
             func sum(nums ...int) int { return 0 }\n\
             func apply(int, string) {}\n",
        );
        let funcs: Vec<_> = program
            .decls
            .iter()
            .filter_map(|d| match d {
                Decl::Func(f) => Some(f),
                _ => None,
            })
            .collect();

        let add = &funcs[0].sig;
        assert_eq!(add.params.len(), 2);
        assert_eq!(add.params[0].name.as_ref().map(|n| n.name.as_str()), Some("a"));
        assert!(matches!(add.params[0].ty, TypeExpr::Named(ref t) if t.name == "int"));

        assert_eq!(funcs[1].sig.results.len(), 2);
        assert!(funcs[2].sig.is_variadic());
        assert!(funcs[3].sig.params.iter().all(|p| p.name.is_none()));
    }

    #[test]
    fn test_mixed_named_and_unnamed_parameters() {
        let (_, errors) = parse_program("package main\nfunc f(a int, string) {}\n");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("mixed named and unnamed parameters"));
    }

    #[test]
    fn test_method_declaration() {
        let program = parse_ok(
            "package main\ntype P struct { X int }\nfunc (p *P) Move(dx int) { p.X += dx }\n",
        );
        match &program.decls[1] {
            Decl::Method(method) => {
                let receiver = method.receiver.as_ref().expect("receiver");
                assert!(receiver.is_pointer());
                assert_eq!(receiver.base_type().map(|t| t.name.as_str()), Some("P"));
                assert_eq!(method.name.name, "Move");
            }
            other => panic!("Expected method, got {:?}", other),
        }
    }

    #[test]
    fn test_binary_precedence() {
        let expr = parse_expression("1 + 2 * 3").expect("expression");
        match expr {
            Expr::Binary { op: BinaryOp::Add, right, .. } => {
                assert!(matches!(*right, Expr::Binary { op: BinaryOp::Multiply, .. }));
            }
            other => panic!("Expected addition at the root, got {:?}", other),
        }

        let expr = parse_expression("a || b && c == d").expect("expression");
        assert!(matches!(expr, Expr::Binary { op: BinaryOp::LogicalOr, .. }));

        let expr = parse_expression("a | b << 2").expect("expression");
        match expr {
            Expr::Binary { op: BinaryOp::BitwiseOr, right, .. } => {
                assert!(matches!(*right, Expr::Binary { op: BinaryOp::LeftShift, .. }));
            }
            other => panic!("Expected | at the root, got {:?}", other),
        }
    }

    #[test]
    fn test_left_associativity() {
        let expr = parse_expression("a - b - c").expect("expression");
        match expr {
            Expr::Binary { op: BinaryOp::Subtract, left, right, .. } => {
                assert!(matches!(*left, Expr::Binary { op: BinaryOp::Subtract, .. }));
                assert!(matches!(*right, Expr::Ident(ref i) if i.name == "c"));
            }
            other => panic!("Expected subtraction, got {:?}", other),
        }
    }

    #[test]
    fn test_unary_and_postfix() {
        let expr = parse_expression("-x.items[i](1, 2)").expect("expression");
        match expr {
            Expr::Unary { op: UnaryOp::Negate, operand, .. } => match *operand {
                Expr::Call { callee, args, .. } => {
                    assert_eq!(args.len(), 2);
                    assert!(matches!(*callee, Expr::Index { .. }));
                }
                other => panic!("Expected call, got {:?}", other),
            },
            other => panic!("Expected negation, got {:?}", other),
        }

        let expr = parse_expression("&Point{1, 2}").expect("expression");
        assert!(matches!(expr, Expr::Unary { op: UnaryOp::AddressOf, .. }));
    }

    #[test]
    fn test_composite_literals() {
        let expr = parse_expression("[]int{1, 2, 3}").expect("slice literal");
        match expr {
            Expr::CompositeLit { ty: Some(TypeExpr::Slice { .. }), elements, .. } => {
                assert_eq!(elements.len(), 3)
            }
            other => panic!("Expected slice literal, got {:?}", other),
        }

        let expr = parse_expression("map[string]Point{\"a\": {1, 2}}").expect("map literal");
        match expr {
            Expr::CompositeLit { elements, .. } => {
                assert!(elements[0].key.is_some());
                assert!(matches!(elements[0].value, Expr::CompositeLit { ty: None, .. }));
            }
            other => panic!("Expected map literal, got {:?}", other),
        }

        let expr = parse_expression("Person{Name: \"Alice\", Age: 30}").expect("struct literal");
        assert!(matches!(expr, Expr::CompositeLit { ty: Some(TypeExpr::Named(_)), .. }));
    }

    #[test]
    fn test_brace_after_condition_opens_block() {
        let program = parse_ok(&in_main("x, y := 1, 2\nif x == y {\n\tx = 2\n}"));
        match &body_of(&program)[1] {
            Stmt::If(stmt) => assert_eq!(stmt.then_block.stmts.len(), 1),
            other => panic!("Expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_simple_statements() {
        let program = parse_ok(&in_main("a, b := 1, 2\na, b = b, a\na += 3\nb--\nprintln(a)"));
        let body = body_of(&program);
        assert!(matches!(&body[0], Stmt::ShortAssign { names, .. } if names.len() == 2));
        assert!(matches!(&body[1], Stmt::Assign { targets, .. } if targets.len() == 2));
        assert!(matches!(&body[2], Stmt::CompoundAssign { op: BinaryOp::Add, .. }));
        assert!(matches!(&body[3], Stmt::IncDec { increment: false, .. }));
        assert!(matches!(&body[4], Stmt::Expr { expr: Expr::Call { .. }, .. }));
    }

    #[test]
    fn test_if_else_chain() {
        let program = parse_ok(&in_main(
            "if v := f(); v > 0 {\n} else if v < 0 {\n} else {\n}",
        ));
        match &body_of(&program)[0] {
            Stmt::If(stmt) => {
                assert!(stmt.init.is_some());
                match stmt.else_branch.as_deref() {
                    Some(Stmt::If(inner)) => {
                        assert!(matches!(inner.else_branch.as_deref(), Some(Stmt::Block(_))))
                    }
                    other => panic!("Expected else if, got {:?}", other),
                }
            }
            other => panic!("Expected if, got {:?}", other),
        }
    }

    #[test]
    fn test_for_forms() {
        let program = parse_ok(&in_main(
            "for {\n\tbreak\n}\nfor i < 10 {\n}\nfor i := 0; i < 10; i++ {\n}\nfor k, v := range m {\n}\nfor range xs {\n}",
        ));
        let body = body_of(&program);
        assert!(matches!(&body[0], Stmt::For(ForStmt { cond: None, init: None, .. })));
        assert!(matches!(&body[1], Stmt::For(ForStmt { cond: Some(_), init: None, .. })));
        assert!(matches!(
            &body[2],
            Stmt::For(ForStmt { init: Some(_), cond: Some(_), post: Some(_), .. })
        ));
        assert!(matches!(
            &body[3],
            Stmt::Range(RangeStmt { key: Some(_), value: Some(_), define: true, .. })
        ));
        assert!(matches!(&body[4], Stmt::Range(RangeStmt { key: None, value: None, .. })));
    }

    #[test]
    fn test_switch_statement() {
        let program = parse_ok(&in_main(
            "switch x := 2; x {\ncase 1, 2:\n\tfallthrough\ncase 3:\ndefault:\n\tbreak\n}\nswitch {\ncase x > 1:\n}",
        ));
        let body = body_of(&program);
        match &body[0] {
            Stmt::Switch(stmt) => {
                assert!(stmt.init.is_some());
                assert!(stmt.tag.is_some());
                assert_eq!(stmt.cases.len(), 3);
                assert_eq!(stmt.cases[0].exprs.len(), 2);
                assert!(stmt.cases[2].is_default);
            }
            other => panic!("Expected switch, got {:?}", other),
        }
        assert!(matches!(&body[1], Stmt::Switch(SwitchStmt { tag: None, .. })));
    }

    #[test]
    fn test_var_with_short_assign_is_syntax_error() {
        let (_, errors) = parse_program(&in_main("var isActive bool := true"));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].line(), 4);
        assert_eq!(errors[0].got(), Some("':='"));
    }

    #[test]
    fn test_recovery_reports_each_bad_statement() {
        let (program, errors) = parse_program(&in_main("x := 1 + / 2\ny := 2\nz := )\nw := 4"));
        assert_eq!(errors.len(), 2);
        assert!(errors[0].line() < errors[1].line());
        // `y := 2` and `w := 4` survive
        let names: Vec<_> = body_of(&program)
            .iter()
            .filter_map(|s| match s {
                Stmt::ShortAssign { names, .. } => Some(names[0].name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["y", "w"]);
    }

    #[test]
    fn test_missing_closing_brace() {
        let (program, errors) = parse_program("package main\nfunc a() {\n\tx := 1\nfunc b() {}\n");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].expected(), Some("}"));
        assert_eq!(program.decls.len(), 2);
    }

    #[test]
    fn test_unexpected_eof() {
        let (_, errors) = parse_program("package main\nfunc main() {\n\tx := 1 +");
        assert!(matches!(errors[0], ParseError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_error_positions_are_sorted() {
        let (_, errors) = parse_program("package main\nvar = 1\nfunc f( {}\n");
        assert!(errors.len() >= 2);
        assert!(errors.windows(2).all(|w| (w[0].line(), w[0].column()) <= (w[1].line(), w[1].column())));
    }
}
