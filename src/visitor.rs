//! AST visitor infrastructure
//!
//! `AstWalker` drives a `ContextVisitor` over a `Program` in pre-order,
//! tracking block depth in a `VisitorContext`. The construct collector built
//! on it lists the grammar constructs a program uses.

use crate::ast::*;
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

/// Context for AST traversal
#[derive(Debug, Clone, Default)]
pub struct VisitorContext {
    /// Current block depth; function bodies start at 1
    pub scope_depth: usize,
}

impl VisitorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter_scope(&mut self) {
        self.scope_depth += 1;
    }

    pub fn exit_scope(&mut self) {
        self.scope_depth = self.scope_depth.saturating_sub(1);
    }
}

/// Visitor with context; each hook may contribute one result
pub trait ContextVisitor<T> {
    fn visit_program(&mut self, _program: &Program, _ctx: &mut VisitorContext) -> Option<T> {
        None
    }
    fn visit_decl(&mut self, _decl: &Decl, _ctx: &mut VisitorContext) -> Option<T> {
        None
    }
    fn visit_stmt(&mut self, _stmt: &Stmt, _ctx: &mut VisitorContext) -> Option<T> {
        None
    }
    fn visit_expr(&mut self, _expr: &Expr, _ctx: &mut VisitorContext) -> Option<T> {
        None
    }
    fn visit_type(&mut self, _ty: &TypeExpr, _ctx: &mut VisitorContext) -> Option<T> {
        None
    }
}

/// Pre-order AST walker; each node is visited before its children
pub struct AstWalker<V, T> {
    visitor: V,
    results: Vec<T>,
}

impl<V, T> AstWalker<V, T>
where
    V: ContextVisitor<T>,
{
    pub fn new(visitor: V) -> Self {
        Self {
            visitor,
            results: Vec::new(),
        }
    }

    /// Walk a complete program, returning the results collected in order
    pub fn walk_program(&mut self, program: &Program, ctx: &mut VisitorContext) -> Vec<T> {
        let result = self.visitor.visit_program(program, ctx);
        self.results.extend(result);
        for decl in &program.decls {
            self.walk_decl(decl, ctx);
        }
        std::mem::take(&mut self.results)
    }

    /// Walk a top-level declaration
    pub fn walk_decl(&mut self, decl: &Decl, ctx: &mut VisitorContext) {
        let result = self.visitor.visit_decl(decl, ctx);
        self.results.extend(result);

        match decl {
            Decl::Var(VarDecl { ty, values, .. }) | Decl::Const(ConstDecl { ty, values, .. }) => {
                if let Some(ty) = ty {
                    self.walk_type(ty, ctx);
                }
                for value in values {
                    self.walk_expr(value, ctx);
                }
            }
            Decl::Type(decl) => match &decl.def {
                TypeDef::Struct { fields } => {
                    for field in fields {
                        self.walk_type(&field.ty, ctx);
                    }
                }
                TypeDef::Interface { methods } => {
                    for method in methods {
                        self.walk_signature(&method.sig, ctx);
                    }
                }
                TypeDef::Alias { target } => self.walk_type(target, ctx),
            },
            Decl::Func(func) | Decl::Method(func) => {
                if let Some(receiver) = &func.receiver {
                    self.walk_type(&receiver.ty, ctx);
                }
                self.walk_signature(&func.sig, ctx);
                self.walk_block(&func.body, ctx);
            }
        }
    }

    fn walk_signature(&mut self, sig: &FuncSig, ctx: &mut VisitorContext) {
        for param in &sig.params {
            self.walk_type(&param.ty, ctx);
        }
        for result in &sig.results {
            self.walk_type(result, ctx);
        }
    }

    fn walk_block(&mut self, block: &Block, ctx: &mut VisitorContext) {
        ctx.enter_scope();
        for stmt in &block.stmts {
            self.walk_stmt(stmt, ctx);
        }
        ctx.exit_scope();
    }

    /// Walk a statement
    pub fn walk_stmt(&mut self, stmt: &Stmt, ctx: &mut VisitorContext) {
        let result = self.visitor.visit_stmt(stmt, ctx);
        self.results.extend(result);

        match stmt {
            Stmt::Var(VarDecl { ty, values, .. }) | Stmt::Const(ConstDecl { ty, values, .. }) => {
                if let Some(ty) = ty {
                    self.walk_type(ty, ctx);
                }
                for value in values {
                    self.walk_expr(value, ctx);
                }
            }
            Stmt::Assign { targets, values, .. } => {
                for expr in targets.iter().chain(values) {
                    self.walk_expr(expr, ctx);
                }
            }
            Stmt::ShortAssign { values, .. } | Stmt::Return { values, .. } => {
                for value in values {
                    self.walk_expr(value, ctx);
                }
            }
            Stmt::CompoundAssign { target, value, .. } => {
                self.walk_expr(target, ctx);
                self.walk_expr(value, ctx);
            }
            Stmt::IncDec { target: expr, .. } | Stmt::Expr { expr, .. } => self.walk_expr(expr, ctx),
            Stmt::Block(block) => self.walk_block(block, ctx),
            Stmt::If(stmt) => {
                ctx.enter_scope();
                self.walk_if(stmt, ctx);
                ctx.exit_scope();
            }
            Stmt::For(stmt) => {
                ctx.enter_scope();
                self.walk_for(stmt, ctx);
                ctx.exit_scope();
            }
            Stmt::Range(stmt) => {
                for expr in stmt.key.iter().chain(&stmt.value) {
                    self.walk_expr(expr, ctx);
                }
                self.walk_expr(&stmt.expr, ctx);
                self.walk_block(&stmt.body, ctx);
            }
            Stmt::Switch(stmt) => {
                ctx.enter_scope();
                self.walk_switch(stmt, ctx);
                ctx.exit_scope();
            }
            Stmt::Break { .. } | Stmt::Continue { .. } | Stmt::Fallthrough { .. } => {}
        }
    }

    fn walk_if(&mut self, stmt: &IfStmt, ctx: &mut VisitorContext) {
        if let Some(init) = &stmt.init {
            self.walk_stmt(init, ctx);
        }
        self.walk_expr(&stmt.cond, ctx);
        self.walk_block(&stmt.then_block, ctx);
        if let Some(else_branch) = &stmt.else_branch {
            self.walk_stmt(else_branch, ctx);
        }
    }

    fn walk_for(&mut self, stmt: &ForStmt, ctx: &mut VisitorContext) {
        if let Some(init) = &stmt.init {
            self.walk_stmt(init, ctx);
        }
        if let Some(cond) = &stmt.cond {
            self.walk_expr(cond, ctx);
        }
        if let Some(post) = &stmt.post {
            self.walk_stmt(post, ctx);
        }
        self.walk_block(&stmt.body, ctx);
    }

    fn walk_switch(&mut self, stmt: &SwitchStmt, ctx: &mut VisitorContext) {
        if let Some(init) = &stmt.init {
            self.walk_stmt(init, ctx);
        }
        if let Some(tag) = &stmt.tag {
            self.walk_expr(tag, ctx);
        }
        for clause in &stmt.cases {
            for expr in &clause.exprs {
                self.walk_expr(expr, ctx);
            }
            ctx.enter_scope();
            for stmt in &clause.body {
                self.walk_stmt(stmt, ctx);
            }
            ctx.exit_scope();
        }
    }

    /// Walk an expression
    pub fn walk_expr(&mut self, expr: &Expr, ctx: &mut VisitorContext) {
        let result = self.visitor.visit_expr(expr, ctx);
        self.results.extend(result);

        match expr {
            Expr::Binary { left, right, .. } => {
                self.walk_expr(left, ctx);
                self.walk_expr(right, ctx);
            }
            Expr::Unary { operand: inner, .. } | Expr::Paren { inner, .. } => self.walk_expr(inner, ctx),
            Expr::Call { callee, args, .. } => {
                self.walk_expr(callee, ctx);
                for arg in args {
                    self.walk_expr(arg, ctx);
                }
            }
            Expr::Index { target, index, .. } => {
                self.walk_expr(target, ctx);
                self.walk_expr(index, ctx);
            }
            Expr::FieldAccess { target, .. } => self.walk_expr(target, ctx),
            Expr::CompositeLit { ty, elements, .. } => {
                if let Some(ty) = ty {
                    self.walk_type(ty, ctx);
                }
                for element in elements {
                    if let Some(key) = &element.key {
                        self.walk_expr(key, ctx);
                    }
                    self.walk_expr(&element.value, ctx);
                }
            }
            Expr::Ident(_)
            | Expr::IntLit { .. }
            | Expr::FloatLit { .. }
            | Expr::StringLit { .. }
            | Expr::BoolLit { .. } => {}
        }
    }

    /// Walk a type expression
    pub fn walk_type(&mut self, ty: &TypeExpr, ctx: &mut VisitorContext) {
        let result = self.visitor.visit_type(ty, ctx);
        self.results.extend(result);

        match ty {
            TypeExpr::Named(_) => {}
            TypeExpr::Slice { elem, .. } | TypeExpr::Pointer { elem, .. } => self.walk_type(elem, ctx),
            TypeExpr::Array { len, elem, .. } => {
                self.walk_expr(len, ctx);
                self.walk_type(elem, ctx);
            }
            TypeExpr::Map { key, value, .. } => {
                self.walk_type(key, ctx);
                self.walk_type(value, ctx);
            }
            TypeExpr::Func { sig, .. } => self.walk_signature(sig, ctx),
            TypeExpr::Interface { methods, .. } => {
                for method in methods {
                    self.walk_signature(&method.sig, ctx);
                }
            }
        }
    }
}

/// Grammar constructs a program was recognized to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Construct {
    PackageDeclaration,
    ImportStatements,
    FunctionDeclarations,
    MethodDeclarations,
    VariadicParameters,
    MultipleReturnValues,
    VariableDeclarations,
    ConstantDeclarations,
    ShortVariableDeclarations,
    StructTypes,
    InterfaceTypes,
    TypeDefinitions,
    IfStatements,
    ElseClauses,
    ForLoops,
    RangeLoops,
    SwitchStatements,
    FallthroughStatements,
    BreakStatements,
    ContinueStatements,
    ReturnStatements,
    Assignments,
    CompoundAssignments,
    IncrementDecrement,
    FunctionCalls,
    CompositeLiterals,
    IndexExpressions,
    SelectorExpressions,
    SliceTypes,
    ArrayTypes,
    MapTypes,
    PointerTypes,
    ArithmeticExpressions,
    RelationalOperators,
    LogicalOperators,
    BitwiseOperators,
    AddressOperators,
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Construct::PackageDeclaration => "Package declaration",
            Construct::ImportStatements => "Import statements",
            Construct::FunctionDeclarations => "Function declarations",
            Construct::MethodDeclarations => "Method declarations",
            Construct::VariadicParameters => "Variadic parameters",
            Construct::MultipleReturnValues => "Multiple return values",
            Construct::VariableDeclarations => "Variable declarations",
            Construct::ConstantDeclarations => "Constant declarations",
            Construct::ShortVariableDeclarations => "Short variable declarations",
            Construct::StructTypes => "Struct type declarations",
            Construct::InterfaceTypes => "Interface type declarations",
            Construct::TypeDefinitions => "Type definitions",
            Construct::IfStatements => "If statements",
            Construct::ElseClauses => "Else clauses",
            Construct::ForLoops => "For loops",
            Construct::RangeLoops => "Range loops",
            Construct::SwitchStatements => "Switch statements",
            Construct::FallthroughStatements => "Fallthrough statements",
            Construct::BreakStatements => "Break statements",
            Construct::ContinueStatements => "Continue statements",
            Construct::ReturnStatements => "Return statements",
            Construct::Assignments => "Assignments",
            Construct::CompoundAssignments => "Compound assignments",
            Construct::IncrementDecrement => "Post-increment/decrement",
            Construct::FunctionCalls => "Function calls",
            Construct::CompositeLiterals => "Composite literals",
            Construct::IndexExpressions => "Index expressions",
            Construct::SelectorExpressions => "Selector expressions",
            Construct::SliceTypes => "Slice types",
            Construct::ArrayTypes => "Array types",
            Construct::MapTypes => "Map types",
            Construct::PointerTypes => "Pointer types",
            Construct::ArithmeticExpressions => "Arithmetic expressions",
            Construct::RelationalOperators => "Relational operators",
            Construct::LogicalOperators => "Logical operators",
            Construct::BitwiseOperators => "Bitwise operators",
            Construct::AddressOperators => "Address and dereference operators",
        };
        f.write_str(text)
    }
}

impl Serialize for Construct {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Visitor mapping nodes to the constructs they exhibit
struct ConstructCollector;

impl ContextVisitor<Vec<Construct>> for ConstructCollector {
    fn visit_program(&mut self, program: &Program, _: &mut VisitorContext) -> Option<Vec<Construct>> {
        let mut found = Vec::new();
        if !program.package.name.is_empty() {
            found.push(Construct::PackageDeclaration);
        }
        if !program.imports.is_empty() {
            found.push(Construct::ImportStatements);
        }
        Some(found)
    }

    fn visit_decl(&mut self, decl: &Decl, _: &mut VisitorContext) -> Option<Vec<Construct>> {
        let mut found = Vec::new();
        match decl {
            Decl::Var(_) => found.push(Construct::VariableDeclarations),
            Decl::Const(_) => found.push(Construct::ConstantDeclarations),
            Decl::Type(decl) => found.push(match decl.def {
                TypeDef::Struct { .. } => Construct::StructTypes,
                TypeDef::Interface { .. } => Construct::InterfaceTypes,
                TypeDef::Alias { .. } => Construct::TypeDefinitions,
            }),
            Decl::Func(func) | Decl::Method(func) => {
                found.push(if func.receiver.is_some() {
                    Construct::MethodDeclarations
                } else {
                    Construct::FunctionDeclarations
                });
                if func.sig.is_variadic() {
                    found.push(Construct::VariadicParameters);
                }
                if func.sig.results.len() > 1 {
                    found.push(Construct::MultipleReturnValues);
                }
            }
        }
        Some(found)
    }

    fn visit_stmt(&mut self, stmt: &Stmt, _: &mut VisitorContext) -> Option<Vec<Construct>> {
        let construct = match stmt {
            Stmt::Var(_) => Construct::VariableDeclarations,
            Stmt::Const(_) => Construct::ConstantDeclarations,
            Stmt::Assign { .. } => Construct::Assignments,
            Stmt::ShortAssign { .. } => Construct::ShortVariableDeclarations,
            Stmt::CompoundAssign { .. } => Construct::CompoundAssignments,
            Stmt::IncDec { .. } => Construct::IncrementDecrement,
            Stmt::If(stmt) if stmt.else_branch.is_some() => {
                return Some(vec![Construct::IfStatements, Construct::ElseClauses])
            }
            Stmt::If(_) => Construct::IfStatements,
            Stmt::For(_) => Construct::ForLoops,
            Stmt::Range(_) => Construct::RangeLoops,
            Stmt::Switch(_) => Construct::SwitchStatements,
            Stmt::Return { .. } => Construct::ReturnStatements,
            Stmt::Break { .. } => Construct::BreakStatements,
            Stmt::Continue { .. } => Construct::ContinueStatements,
            Stmt::Fallthrough { .. } => Construct::FallthroughStatements,
            Stmt::Expr { .. } | Stmt::Block(_) => return None,
        };
        Some(vec![construct])
    }

    fn visit_expr(&mut self, expr: &Expr, _: &mut VisitorContext) -> Option<Vec<Construct>> {
        let construct = match expr {
            Expr::Binary { op, .. } if op.is_arithmetic() => Construct::ArithmeticExpressions,
            Expr::Binary { op, .. } if op.is_equality() || op.is_ordering() => Construct::RelationalOperators,
            Expr::Binary { op, .. } if op.is_logical() => Construct::LogicalOperators,
            Expr::Binary { .. } => Construct::BitwiseOperators,
            Expr::Unary { op: UnaryOp::Not, .. } => Construct::LogicalOperators,
            Expr::Unary { op: UnaryOp::AddressOf | UnaryOp::Dereference, .. } => Construct::AddressOperators,
            Expr::Unary { op: UnaryOp::BitwiseNot, .. } => Construct::BitwiseOperators,
            Expr::Unary { .. } => Construct::ArithmeticExpressions,
            Expr::Call { .. } => Construct::FunctionCalls,
            Expr::Index { .. } => Construct::IndexExpressions,
            Expr::FieldAccess { .. } => Construct::SelectorExpressions,
            Expr::CompositeLit { .. } => Construct::CompositeLiterals,
            _ => return None,
        };
        Some(vec![construct])
    }

    fn visit_type(&mut self, ty: &TypeExpr, _: &mut VisitorContext) -> Option<Vec<Construct>> {
        let construct = match ty {
            TypeExpr::Slice { .. } => Construct::SliceTypes,
            TypeExpr::Array { .. } => Construct::ArrayTypes,
            TypeExpr::Map { .. } => Construct::MapTypes,
            TypeExpr::Pointer { .. } => Construct::PointerTypes,
            TypeExpr::Interface { .. } => Construct::InterfaceTypes,
            TypeExpr::Named(_) | TypeExpr::Func { .. } => return None,
        };
        Some(vec![construct])
    }
}

/// The distinct constructs used by a program, in a fixed order
pub fn collect_constructs(program: &Program) -> Vec<Construct> {
    let mut walker = AstWalker::new(ConstructCollector);
    let found: BTreeSet<Construct> = walker
        .walk_program(program, &mut VisitorContext::new())
        .into_iter()
        .flatten()
        .collect();
    found.into_iter().collect()
}
