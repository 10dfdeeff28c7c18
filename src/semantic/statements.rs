//! Statement checking

use super::analyzer::{describe, Breakable, SemanticAnalyzer};
use super::error::SemanticError;
use super::symbols::{ScopeKind, Symbol, SymbolKind};
use super::types::Type;
use crate::ast::{Block, CaseClause, Expr, ForStmt, Ident, IfStmt, RangeStmt, Stmt, SwitchStmt, TypeExpr, UnaryOp};
use crate::lexer::Position;

/// What an assignment target accepts
enum Target {
    /// `_` accepts any value
    Blank,
    Typed(Type),
    /// Already reported, or a constant
    Skip,
}

impl SemanticAnalyzer {
    pub(super) fn check_block(&mut self, block: &Block) {
        self.symbols.enter_scope(ScopeKind::Block);
        self.check_statements(&block.stmts);
        self.symbols.exit_scope();
    }

    pub(super) fn check_statements(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            self.check_statement(stmt);
        }
    }

    pub(super) fn check_statement(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Var(decl) => {
                self.check_value_spec(&decl.names, decl.ty.as_ref(), &decl.values, SymbolKind::Var, false)
            }
            Stmt::Const(decl) => {
                self.check_value_spec(&decl.names, decl.ty.as_ref(), &decl.values, SymbolKind::Const, false)
            }
            Stmt::Assign { targets, values, span } => self.check_assign(targets, values, span.start),
            Stmt::ShortAssign { names, values, span } => self.check_short_assign(names, values, span.start),
            Stmt::CompoundAssign { target, op, value, span } => {
                let target_type = self.check_target(target);
                let value_type = self.check_expr(value);
                if let Target::Typed(target_type) = target_type {
                    if value_type.is_error() {
                        return;
                    }
                    let result = self.binary_result(*op, target, value, &target_type, &value_type, span.start);
                    if !self.assignable(&result, &target_type) {
                        self.add_error(SemanticError::CannotUse {
                            value: format!("{} (value of type {})", value, result),
                            target: format!("{} value", target_type),
                            context: "assignment".to_string(),
                            position: value.position(),
                        });
                    }
                }
            }
            Stmt::IncDec { target, increment, span } => {
                if let Target::Typed(ty) = self.check_target(target) {
                    if !self.underlying(&ty).is_numeric() {
                        self.add_error(SemanticError::OperatorNotDefined {
                            op: if *increment { "++" } else { "--" }.to_string(),
                            operand: describe(target, &ty),
                            position: span.start,
                        });
                    }
                }
            }
            Stmt::Expr { expr, .. } => {
                let ty = self.check_expr_multi(expr);
                if !matches!(expr.unparen(), Expr::Call { .. }) && !ty.is_error() {
                    self.add_error(SemanticError::invalid(
                        format!("{} is not used", describe(expr, &ty)),
                        expr.position(),
                    ));
                }
            }
            Stmt::Block(block) => self.check_block(block),
            Stmt::If(stmt) => self.check_if(stmt),
            Stmt::For(stmt) => self.check_for(stmt),
            Stmt::Range(stmt) => self.check_range(stmt),
            Stmt::Switch(stmt) => self.check_switch(stmt),
            Stmt::Return { values, span } => self.check_return(values, span.start),
            Stmt::Break { span } => {
                if self.breakables.is_empty() {
                    self.misplaced("break", span.start);
                }
            }
            Stmt::Continue { span } => {
                if !self.breakables.contains(&Breakable::Loop) {
                    self.misplaced("continue", span.start);
                }
            }
            Stmt::Fallthrough { span } => {
                // Valid placements are consumed by `check_case_clause`
                if self.breakables.contains(&Breakable::Switch) {
                    self.add_error(SemanticError::invalid("fallthrough statement out of place", span.start));
                } else {
                    self.misplaced("fallthrough", span.start);
                }
            }
        }
    }

    fn misplaced(&mut self, keyword: &str, position: Position) {
        self.add_error(SemanticError::MisplacedControl {
            keyword: keyword.to_string(),
            position,
        });
    }

    /// `var`/`const` specs. Package-level names were bound while hoisting
    /// and only get their final type here.
    pub(super) fn check_value_spec(
        &mut self,
        names: &[Ident],
        ty: Option<&TypeExpr>,
        values: &[Expr],
        kind: SymbolKind,
        hoisted: bool,
    ) {
        let declared = ty.map(|ty| self.resolve_type(ty));
        let position = names.first().map_or_else(|| Position::new(0, 0, 0), |n| n.span.start);
        let value_types = if values.is_empty() {
            Vec::new()
        } else {
            self.value_types(values, names.len(), position)
        };

        for (i, name) in names.iter().enumerate() {
            let value_type = value_types.get(i).cloned();
            let ty = match (&declared, value_type) {
                (Some(declared), Some(value_type)) => {
                    if !self.assignable(&value_type, declared) {
                        let value = values.get(i).unwrap_or(&values[0]);
                        self.add_error(SemanticError::CannotUse {
                            value: describe(value, &value_type),
                            target: format!("{} value", declared),
                            context: "variable declaration".to_string(),
                            position: value.position(),
                        });
                    }
                    declared.clone()
                }
                (Some(declared), None) => declared.clone(),
                (None, Some(Type::UntypedNil)) => {
                    self.add_error(SemanticError::invalid("use of untyped nil in variable declaration", name.span.start));
                    Type::Error
                }
                // Constants keep their untyped type
                (None, Some(value_type)) if kind == SymbolKind::Const => value_type,
                (None, Some(value_type)) => value_type.default_type(),
                (None, None) => Type::Error,
            };

            if kind == SymbolKind::Const && !ty.is_error() && !self.is_basic(&ty) {
                if let Some(value) = values.get(i) {
                    self.add_error(SemanticError::invalid(
                        format!("{} is not constant", describe(value, &ty)),
                        value.position(),
                    ));
                }
            }

            if hoisted {
                self.symbols.set_type(&name.name, name.span.start, ty);
            } else {
                let symbol = Symbol::new(name.name.clone(), kind, ty, name.span.start);
                self.declare(symbol, name.span.start);
            }
        }

        if kind == SymbolKind::Const && !hoisted {
            self.record_const_values(names, values);
        }
    }

    fn is_basic(&self, ty: &Type) -> bool {
        matches!(
            self.underlying(ty),
            Type::Int | Type::Float64 | Type::String | Type::Bool | Type::UntypedInt | Type::UntypedFloat
        )
    }

    /// Types of the right-hand side of an assignment to `wanted` locations.
    /// Always returns `wanted` types; count mismatches are reported.
    pub(super) fn value_types(&mut self, values: &[Expr], wanted: usize, position: Position) -> Vec<Type> {
        if values.len() == wanted {
            return values.iter().map(|v| self.check_expr(v)).collect();
        }

        if values.len() == 1 {
            let value = &values[0];
            // `v, ok := m[k]`
            if wanted == 2 {
                if let Expr::Index { target, index, .. } = value.unparen() {
                    let (ty, container) = self.check_index_access(target, index);
                    if matches!(container, Type::Map { .. }) || ty.is_error() {
                        return vec![ty, Type::Bool];
                    }
                    self.mismatch(wanted, 1, position);
                    return vec![Type::Error; wanted];
                }
            }
            return match self.check_expr_multi(value) {
                Type::Tuple(types) if types.len() == wanted => types,
                Type::Tuple(types) => {
                    self.mismatch(wanted, types.len(), position);
                    vec![Type::Error; wanted]
                }
                Type::Error => vec![Type::Error; wanted],
                _ => {
                    self.mismatch(wanted, 1, position);
                    vec![Type::Error; wanted]
                }
            };
        }

        for value in values {
            self.check_expr(value);
        }
        self.mismatch(wanted, values.len(), position);
        vec![Type::Error; wanted]
    }

    fn mismatch(&mut self, variables: usize, values: usize, position: Position) {
        self.add_error(SemanticError::AssignmentMismatch {
            variables,
            values,
            position,
        });
    }

    /// Resolve the location an assignment writes to
    fn check_target(&mut self, target: &Expr) -> Target {
        match target {
            Expr::Ident(ident) if ident.is_blank() => Target::Blank,
            Expr::Ident(ident) => {
                let (kind, ty) = match self.symbols.lookup(&ident.name) {
                    Some(symbol) => (symbol.kind, symbol.declared_type.clone()),
                    None => {
                        self.add_error(SemanticError::Undeclared {
                            name: ident.name.clone(),
                            position: ident.span.start,
                        });
                        return Target::Skip;
                    }
                };
                match kind {
                    SymbolKind::Var | SymbolKind::Param => match ty {
                        Type::Error => Target::Skip,
                        ty => Target::Typed(ty),
                    },
                    SymbolKind::Const => {
                        self.add_error(SemanticError::AssignToConstant {
                            name: ident.name.clone(),
                            position: ident.span.start,
                        });
                        Target::Skip
                    }
                    _ => {
                        self.not_assignable(target);
                        Target::Skip
                    }
                }
            }
            Expr::Paren { inner, .. } => self.check_target(inner),
            Expr::Index { target: indexed, index, .. } => {
                let (ty, container) = self.check_index_access(indexed, index);
                if ty.is_error() {
                    return Target::Skip;
                }
                if container == Type::String {
                    self.not_assignable(target);
                    return Target::Skip;
                }
                Target::Typed(ty)
            }
            Expr::FieldAccess { .. } | Expr::Unary { op: UnaryOp::Dereference, .. } => {
                match self.check_expr(target) {
                    Type::Error => Target::Skip,
                    ty => Target::Typed(ty),
                }
            }
            _ => {
                if !self.check_expr_multi(target).is_error() {
                    self.not_assignable(target);
                }
                Target::Skip
            }
        }
    }

    fn not_assignable(&mut self, target: &Expr) {
        self.add_error(SemanticError::invalid(
            format!("cannot assign to {} (neither addressable nor a map index expression)", target),
            target.position(),
        ));
    }

    fn check_assign(&mut self, targets: &[Expr], values: &[Expr], position: Position) {
        let locations: Vec<Target> = targets.iter().map(|t| self.check_target(t)).collect();
        let value_types = self.value_types(values, targets.len(), position);

        for (i, (location, value_type)) in locations.iter().zip(&value_types).enumerate() {
            let value = values.get(i).unwrap_or(&values[0]);
            match location {
                Target::Typed(ty) => {
                    if !self.assignable(value_type, ty) {
                        self.add_error(SemanticError::CannotUse {
                            value: describe(value, value_type),
                            target: format!("{} value", ty),
                            context: "assignment".to_string(),
                            position: value.position(),
                        });
                    }
                }
                Target::Blank if *value_type == Type::UntypedNil => {
                    self.add_error(SemanticError::invalid("use of untyped nil in assignment", value.position()));
                }
                Target::Blank | Target::Skip => {}
            }
        }
    }

    fn check_short_assign(&mut self, names: &[Ident], values: &[Expr], position: Position) {
        let value_types = self.value_types(values, names.len(), position);

        let mut any_new = false;
        for (i, (name, value_type)) in names.iter().zip(value_types).enumerate() {
            if names[..i].iter().any(|n| n.name == name.name && !n.is_blank()) {
                self.add_error(SemanticError::invalid(
                    format!("{} repeated on left side of :=", name.name),
                    name.span.start,
                ));
                continue;
            }
            if name.is_blank() {
                continue;
            }
            let value = values.get(i).unwrap_or(&values[0]);

            // An existing binding in this scope is assigned, not redeclared
            let existing = self
                .symbols
                .lookup_local(&name.name)
                .map(|s| (s.kind, s.declared_type.clone()));
            if let Some((kind, target)) = existing {
                match kind {
                    SymbolKind::Const => self.add_error(SemanticError::AssignToConstant {
                        name: name.name.clone(),
                        position: name.span.start,
                    }),
                    _ => {
                        if !self.assignable(&value_type, &target) {
                            self.add_error(SemanticError::CannotUse {
                                value: describe(value, &value_type),
                                target: format!("{} value", target),
                                context: "assignment".to_string(),
                                position: value.position(),
                            });
                        }
                    }
                }
                continue;
            }

            any_new = true;
            let ty = if value_type == Type::UntypedNil {
                self.add_error(SemanticError::invalid("use of untyped nil in assignment", value.position()));
                Type::Error
            } else {
                value_type.default_type()
            };
            self.declare(Symbol::new(name.name.clone(), SymbolKind::Var, ty, name.span.start), name.span.start);
        }

        if !any_new {
            self.add_error(SemanticError::NoNewVariables { position });
        }
    }

    fn check_condition(&mut self, cond: &Expr, construct: &str) {
        let ty = self.check_expr(cond);
        if !ty.is_error() && self.underlying(&ty) != Type::Bool {
            self.add_error(SemanticError::NonBooleanCondition {
                construct: construct.to_string(),
                position: cond.position(),
            });
        }
    }

    fn check_if(&mut self, stmt: &IfStmt) {
        self.symbols.enter_scope(ScopeKind::Block);
        if let Some(init) = &stmt.init {
            self.check_statement(init);
        }
        self.check_condition(&stmt.cond, "if");
        self.check_block(&stmt.then_block);
        if let Some(else_branch) = &stmt.else_branch {
            self.check_statement(else_branch);
        }
        self.symbols.exit_scope();
    }

    fn check_for(&mut self, stmt: &ForStmt) {
        self.symbols.enter_scope(ScopeKind::Block);
        if let Some(init) = &stmt.init {
            self.check_statement(init);
        }
        if let Some(cond) = &stmt.cond {
            self.check_condition(cond, "for");
        }
        if let Some(post) = &stmt.post {
            self.check_statement(post);
        }
        self.breakables.push(Breakable::Loop);
        self.check_block(&stmt.body);
        self.breakables.pop();
        self.symbols.exit_scope();
    }

    fn check_range(&mut self, stmt: &RangeStmt) {
        self.symbols.enter_scope(ScopeKind::Block);

        let ty = self.check_expr(&stmt.expr);
        let (key_type, value_type) = match self.underlying(&ty) {
            Type::Slice(elem) => (Type::Int, Some(*elem)),
            Type::Array { elem, .. } => (Type::Int, Some(*elem)),
            Type::String => (Type::Int, Some(Type::Int)),
            Type::Map { key, value } => (*key, Some(*value)),
            Type::Int | Type::UntypedInt => (Type::Int, None),
            Type::Error => (Type::Error, Some(Type::Error)),
            _ => {
                self.add_error(SemanticError::CannotRange {
                    ty: describe(&stmt.expr, &ty),
                    position: stmt.expr.position(),
                });
                (Type::Error, Some(Type::Error))
            }
        };

        let value_type = match (&stmt.value, value_type) {
            (Some(value), None) => {
                self.add_error(SemanticError::invalid(
                    format!("range over {} permits only one iteration variable", describe(&stmt.expr, &ty)),
                    value.position(),
                ));
                Type::Error
            }
            (_, value_type) => value_type.unwrap_or(Type::Error),
        };

        let vars: Vec<(&Expr, Type)> = stmt
            .key
            .iter()
            .map(|k| (k, key_type.clone()))
            .chain(stmt.value.iter().map(|v| (v, value_type.clone())))
            .collect();

        if stmt.define {
            let mut any_new = false;
            let mut seen: Vec<&str> = Vec::new();
            for (var, ty) in vars {
                let ident = match var {
                    Expr::Ident(ident) => ident,
                    other => {
                        self.add_error(SemanticError::invalid(
                            format!("non-name {} on left side of :=", other),
                            other.position(),
                        ));
                        continue;
                    }
                };
                if ident.is_blank() {
                    continue;
                }
                if seen.contains(&ident.name.as_str()) {
                    self.add_error(SemanticError::invalid(
                        format!("{} repeated on left side of :=", ident.name),
                        ident.span.start,
                    ));
                    continue;
                }
                seen.push(ident.name.as_str());
                any_new = true;
                let symbol = Symbol::new(ident.name.clone(), SymbolKind::Var, ty, ident.span.start);
                self.declare(symbol, ident.span.start);
            }
            if !any_new && stmt.key.is_some() {
                self.add_error(SemanticError::NoNewVariables { position: stmt.span.start });
            }
        } else {
            for (var, ty) in vars {
                if let Target::Typed(target) = self.check_target(var) {
                    if !self.assignable(&ty, &target) {
                        self.add_error(SemanticError::CannotUse {
                            value: format!("{} (value of type {})", var, ty),
                            target: format!("{} value", target),
                            context: "range".to_string(),
                            position: var.position(),
                        });
                    }
                }
            }
        }

        self.breakables.push(Breakable::Loop);
        self.check_block(&stmt.body);
        self.breakables.pop();
        self.symbols.exit_scope();
    }

    fn check_switch(&mut self, stmt: &SwitchStmt) {
        self.symbols.enter_scope(ScopeKind::Block);
        if let Some(init) = &stmt.init {
            self.check_statement(init);
        }
        let tag = stmt.tag.as_ref().map(|tag| (tag, self.check_expr(tag).default_type()));

        let mut default_seen = false;
        self.breakables.push(Breakable::Switch);
        for (i, clause) in stmt.cases.iter().enumerate() {
            if clause.is_default {
                if default_seen {
                    self.add_error(SemanticError::invalid("multiple defaults in switch", clause.span.start));
                }
                default_seen = true;
            }
            for expr in &clause.exprs {
                let ty = self.check_expr(expr);
                if ty.is_error() {
                    continue;
                }
                match &tag {
                    Some((tag_expr, tag_type)) => {
                        if tag_type.is_error() {
                            continue;
                        }
                        if self.unify(&ty, tag_type).is_none() {
                            self.add_error(SemanticError::invalid(
                                format!(
                                    "invalid case {} in switch on {} (mismatched types {} and {})",
                                    expr, tag_expr, ty, tag_type
                                ),
                                expr.position(),
                            ));
                        }
                    }
                    None => {
                        if self.underlying(&ty) != Type::Bool {
                            self.add_error(SemanticError::invalid(
                                format!("invalid case {} in switch (mismatched types {} and bool)", expr, ty),
                                expr.position(),
                            ));
                        }
                    }
                }
            }
            self.check_case_clause(clause, i + 1 == stmt.cases.len());
        }
        self.breakables.pop();
        self.symbols.exit_scope();
    }

    fn check_case_clause(&mut self, clause: &CaseClause, is_final: bool) {
        self.symbols.enter_scope(ScopeKind::Block);
        let last = clause.body.len().saturating_sub(1);
        for (i, stmt) in clause.body.iter().enumerate() {
            match stmt {
                Stmt::Fallthrough { span } if i == last => {
                    if is_final {
                        self.add_error(SemanticError::invalid("cannot fallthrough final case in switch", span.start));
                    }
                }
                other => self.check_statement(other),
            }
        }
        self.symbols.exit_scope();
    }

    fn check_return(&mut self, values: &[Expr], position: Position) {
        let expected = self.current_results.clone().unwrap_or_default();

        let actual: Vec<(Type, &Expr)> = if values.len() == 1 && expected.len() > 1 {
            match self.check_expr_multi(&values[0]) {
                Type::Tuple(types) => types.into_iter().map(|t| (t, &values[0])).collect(),
                Type::Error => return,
                Type::Void => {
                    self.add_error(SemanticError::NoValueUsedAsValue {
                        call: values[0].to_string(),
                        position: values[0].position(),
                    });
                    return;
                }
                ty => vec![(ty, &values[0])],
            }
        } else {
            values.iter().map(|v| (self.check_expr(v), v)).collect()
        };

        if actual.len() < expected.len() {
            self.add_error(SemanticError::NotEnoughReturnValues { position });
            return;
        }
        if actual.len() > expected.len() {
            self.add_error(SemanticError::TooManyReturnValues { position });
            return;
        }
        for ((ty, value), result) in actual.iter().zip(&expected) {
            if !self.assignable(ty, result) {
                self.add_error(SemanticError::CannotUse {
                    value: describe(value, ty),
                    target: format!("{} value", result),
                    context: "return statement".to_string(),
                    position: value.position(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::parser::Parser;
    use crate::semantic::{SemanticAnalyzer, SemanticError};

    fn check(source: &str) -> Vec<SemanticError> {
        let mut parser = Parser::new(source);
        let program = parser.parse_program();
        assert!(parser.errors().is_empty(), "syntax errors: {:?}", parser.errors());
        SemanticAnalyzer::new().analyze(&program).errors
    }

    fn messages_in_main(body: &str) -> Vec<String> {
        check(&format!("package main\nfunc main() {{\n{}\n}}\n", body))
            .iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn test_redeclared_variable() {
        let errors = check("package main\nvar x int = 10\nvar x int = 20\n");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "redeclared in this scope: x");
        assert_eq!(errors[0].line(), 3);
    }

    #[test]
    fn test_assign_to_constant() {
        let errors = check("package main\nconst PI float64 = 3.14\nfunc main() { PI = 3 }\n");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "cannot assign to constant PI");
        assert_eq!(errors[0].line(), 3);
    }

    #[test]
    fn test_constant_assignment_still_checks_value() {
        let errors = messages_in_main("const limit = 10\nlimit = missing\nlimit++");
        assert_eq!(
            errors,
            vec![
                "cannot assign to constant limit",
                "undeclared identifier: missing",
                "cannot assign to constant limit"
            ]
        );
    }

    #[test]
    fn test_break_outside_loop() {
        let errors = check("package main\nfunc main() { break }\n");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "break outside loop/switch");
        assert_eq!(errors[0].line(), 2);
    }

    #[test]
    fn test_control_flow_context() {
        let errors = messages_in_main(
            "for i := 0; i < 3; i++ { if i == 1 { continue }; break }\n\
             switch { case true: break }\n\
             switch { case true: continue }",
        );
        assert_eq!(errors, vec!["continue outside loop/switch"]);
    }

    #[test]
    fn test_fallthrough_placement() {
        let errors = messages_in_main(
            "x := 1\n\
             switch x {\n\
             case 1:\n fallthrough\n\
             case 2:\n fallthrough\n x++\n\
             default:\n fallthrough\n\
             }\n\
             fallthrough",
        );
        assert_eq!(
            errors,
            vec![
                "fallthrough statement out of place",
                "cannot fallthrough final case in switch",
                "fallthrough outside loop/switch"
            ]
        );
    }

    #[test]
    fn test_mixed_arithmetic() {
        let errors = check("package main\nfunc main() { var a int = 1; var b float64 = 2.0; c := a + b }\n");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "type mismatch in +: int and float64");
    }

    #[test]
    fn test_shadowing_is_legal() {
        assert!(check("package main\nfunc main() { var z int = 1; if true { var z int = 2 } }\n").is_empty());
    }

    #[test]
    fn test_short_assign_rules() {
        let errors = messages_in_main("a := 1\na := 2\nb, a := 3, 4\nc, c := 5, 6\nd := nil");
        assert_eq!(
            errors,
            vec![
                "no new variables on left side of :=",
                "c repeated on left side of :=",
                "use of untyped nil in assignment"
            ]
        );
    }

    #[test]
    fn test_parameter_redeclared_in_body() {
        let errors = check("package main\nfunc f(x int) { x := 2 }\n");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "no new variables on left side of :=");
        let errors = check("package main\nfunc f(x int) { var x int }\n");
        assert_eq!(errors[0].to_string(), "redeclared in this scope: x");
    }

    #[test]
    fn test_assignment_mismatch() {
        let errors = messages_in_main("a, b := 1\nvar c, d int = 1, 2, 3");
        assert_eq!(
            errors,
            vec![
                "assignment mismatch: 2 variables but 1 value",
                "assignment mismatch: 2 variables but 3 values"
            ]
        );
    }

    #[test]
    fn test_multi_value_assignment() {
        let source = "package main\n\
             func pair() (int, string) { return 1, \"a\" }\n\
             func main() {\n\
             n, s := pair()\n\
             var m map[string]int\n\
             v, ok := m[s]\n\
             n = v\n\
             var flag bool = ok\n\
             x := pair()\n\
             }\n";
        let errors: Vec<String> = check(source).iter().map(|e| e.to_string()).collect();
        assert_eq!(errors, vec!["multiple-value pair() in single-value context"]);
    }

    #[test]
    fn test_assignment_types() {
        let errors = messages_in_main("var n int\nn = \"text\"\nn = 2.5\nvar f float64 = 1\nf += n");
        assert_eq!(
            errors,
            vec![
                "cannot use \"text\" (value of type string) as int value in assignment",
                "cannot use 2.5 (untyped float constant) as int value in assignment",
                "type mismatch in +: float64 and int"
            ]
        );
    }

    #[test]
    fn test_inc_dec_requires_numeric() {
        let errors = messages_in_main("s := \"a\"\ns++");
        assert_eq!(errors, vec!["operator ++ not defined on s (value of type string)"]);
    }

    #[test]
    fn test_conditions_must_be_bool() {
        let errors = messages_in_main("x := 1\nif x { }\nfor x { }");
        assert_eq!(
            errors,
            vec![
                "non-boolean condition in if statement",
                "non-boolean condition in for statement"
            ]
        );
    }

    #[test]
    fn test_if_init_scope() {
        let errors = messages_in_main("if v := 3; v > 2 { v++ } else { v-- }\nv = 1");
        assert_eq!(errors, vec!["undeclared identifier: v"]);
    }

    #[test]
    fn test_range_forms() {
        let errors = messages_in_main(
            "nums := []int{1, 2}\n\
             for i, n := range nums { i = n }\n\
             ages := map[string]int{\"a\": 1}\n\
             for name, age := range ages { name = \"b\"; age++ }\n\
             for i, r := range \"go\" { i = r }\n\
             for i := range 10 { i++ }\n\
             for i, v := range 10 { }\n\
             for _, x := range true { }",
        );
        assert_eq!(
            errors,
            vec![
                "range over 10 (untyped int constant) permits only one iteration variable",
                "cannot range over true (value of type bool)"
            ]
        );
    }

    #[test]
    fn test_switch_cases() {
        let errors = messages_in_main(
            "x := 1\n\
             switch x { case 1, 2: x++; case \"a\": x-- }\n\
             switch { case x > 1: x++; case x: x-- }\n\
             switch { default: x++; default: x-- }",
        );
        assert_eq!(
            errors,
            vec![
                "invalid case \"a\" in switch on x (mismatched types string and int)",
                "invalid case x in switch (mismatched types int and bool)",
                "multiple defaults in switch"
            ]
        );
    }

    #[test]
    fn test_return_checks() {
        let source = "package main\n\
             func one() int { return \"a\" }\n\
             func two() (int, bool) { return 1 }\n\
             func none() { return 1 }\n\
             func fwd() (int, bool) { return two() }\n";
        let errors: Vec<String> = check(source).iter().map(|e| e.to_string()).collect();
        assert_eq!(
            errors,
            vec![
                "cannot use \"a\" (value of type string) as int value in return statement",
                "not enough return values",
                "too many return values"
            ]
        );
    }

    #[test]
    fn test_unused_expression() {
        let errors = messages_in_main("x := 1\nx + 1");
        assert_eq!(errors, vec!["x + 1 (value of type int) is not used"]);
    }

    #[test]
    fn test_invalid_assignment_targets() {
        let errors = messages_in_main("s := \"abc\"\ns[0] = 1\nlen = 2");
        assert_eq!(
            errors,
            vec![
                "cannot assign to s[0] (neither addressable nor a map index expression)",
                "cannot assign to len (neither addressable nor a map index expression)"
            ]
        );
    }
}
