//! Abstract Syntax Tree (AST) definitions for the supported Go subset
//!
//! Nodes are plain tagged enums; traversals dispatch by matching on the
//! variant. Every node carries a `Span` whose start is the position of its
//! first token.

use crate::lexer::Position;
use serde::Serialize;
use std::fmt;

/// Source span for error reporting and debugging
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn single(pos: Position) -> Self {
        Self { start: pos, end: pos }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: if self.start.offset <= other.start.offset { self.start } else { other.start },
            end: if self.end.offset >= other.end.offset { self.end } else { other.end },
        }
    }

    pub fn line(&self) -> usize {
        self.start.line
    }
}

/// An identifier occurrence
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self { name: name.into(), span }
    }

    /// The blank identifier `_`
    pub fn is_blank(&self) -> bool {
        self.name == "_"
    }
}

/// Root of a source file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Program {
    pub package: Ident,
    pub imports: Vec<Import>,
    pub decls: Vec<Decl>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Import {
    pub path: String,
    pub span: Span,
}

impl Import {
    /// Name the package is referred to by: the last path segment
    pub fn package_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

/// Top-level declarations
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Decl {
    Var(VarDecl),
    Const(ConstDecl),
    Type(TypeDecl),
    Func(FuncDecl),
    Method(FuncDecl),
}

impl Decl {
    pub fn span(&self) -> Span {
        match self {
            Decl::Var(decl) => decl.span,
            Decl::Const(decl) => decl.span,
            Decl::Type(decl) => decl.span,
            Decl::Func(decl) | Decl::Method(decl) => decl.span,
        }
    }
}

/// `var a, b T = x, y`; type and values are each optional but not both
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VarDecl {
    pub names: Vec<Ident>,
    pub ty: Option<TypeExpr>,
    pub values: Vec<Expr>,
    pub span: Span,
}

/// `const a T = x`; values are mandatory
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstDecl {
    pub names: Vec<Ident>,
    pub ty: Option<TypeExpr>,
    pub values: Vec<Expr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDecl {
    pub name: Ident,
    pub def: TypeDef,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum TypeDef {
    Struct { fields: Vec<FieldDecl> },
    Interface { methods: Vec<MethodSpec> },
    Alias { target: TypeExpr },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDecl {
    pub name: Ident,
    pub ty: TypeExpr,
    pub span: Span,
}

/// A method signature inside an interface
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodSpec {
    pub name: Ident,
    pub sig: FuncSig,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuncSig {
    pub params: Vec<Param>,
    pub results: Vec<TypeExpr>,
}

impl FuncSig {
    pub fn is_variadic(&self) -> bool {
        self.params.last().map_or(false, |p| p.variadic)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub name: Option<Ident>,
    pub ty: TypeExpr,
    /// `...T` tail parameter
    pub variadic: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Receiver {
    pub name: Ident,
    /// `T` or `*T`
    pub ty: TypeExpr,
    pub span: Span,
}

impl Receiver {
    /// Name of the receiver's base type, looking through `*`
    pub fn base_type(&self) -> Option<&Ident> {
        match &self.ty {
            TypeExpr::Named(ident) => Some(ident),
            TypeExpr::Pointer { elem, .. } => match elem.as_ref() {
                TypeExpr::Named(ident) => Some(ident),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self.ty, TypeExpr::Pointer { .. })
    }
}

/// Function or method declaration; methods have a receiver
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FuncDecl {
    pub receiver: Option<Receiver>,
    pub name: Ident,
    pub sig: FuncSig,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// Statements
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Stmt {
    Var(VarDecl),
    Const(ConstDecl),
    /// `a, b = x, y`
    Assign { targets: Vec<Expr>, values: Vec<Expr>, span: Span },
    /// `a, b := x, y`
    ShortAssign { names: Vec<Ident>, values: Vec<Expr>, span: Span },
    /// `a op= x`
    CompoundAssign { target: Expr, op: BinaryOp, value: Expr, span: Span },
    /// `a++` / `a--`
    IncDec { target: Expr, increment: bool, span: Span },
    Expr { expr: Expr, span: Span },
    Block(Block),
    If(IfStmt),
    For(ForStmt),
    Range(RangeStmt),
    Switch(SwitchStmt),
    Return { values: Vec<Expr>, span: Span },
    Break { span: Span },
    Continue { span: Span },
    Fallthrough { span: Span },
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Var(decl) => decl.span,
            Stmt::Const(decl) => decl.span,
            Stmt::Assign { span, .. }
            | Stmt::ShortAssign { span, .. }
            | Stmt::CompoundAssign { span, .. }
            | Stmt::IncDec { span, .. }
            | Stmt::Expr { span, .. }
            | Stmt::Return { span, .. }
            | Stmt::Break { span }
            | Stmt::Continue { span }
            | Stmt::Fallthrough { span } => *span,
            Stmt::Block(block) => block.span,
            Stmt::If(stmt) => stmt.span,
            Stmt::For(stmt) => stmt.span,
            Stmt::Range(stmt) => stmt.span,
            Stmt::Switch(stmt) => stmt.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IfStmt {
    pub init: Option<Box<Stmt>>,
    pub cond: Expr,
    pub then_block: Block,
    /// Either another `If` or a `Block`
    pub else_branch: Option<Box<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForStmt {
    pub init: Option<Box<Stmt>>,
    pub cond: Option<Expr>,
    pub post: Option<Box<Stmt>>,
    pub body: Block,
    pub span: Span,
}

/// `for k, v := range x { }`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeStmt {
    pub key: Option<Expr>,
    pub value: Option<Expr>,
    /// `:=` form declares key and value
    pub define: bool,
    pub expr: Expr,
    pub body: Block,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwitchStmt {
    pub init: Option<Box<Stmt>>,
    pub tag: Option<Expr>,
    pub cases: Vec<CaseClause>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaseClause {
    /// Empty for `default`
    pub exprs: Vec<Expr>,
    pub is_default: bool,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BinaryOp {
    // Arithmetic
    Add,        // +
    Subtract,   // -
    Multiply,   // *
    Divide,     // /
    Modulo,     // %

    // Bitwise
    BitwiseAnd, // &
    BitwiseOr,  // |
    BitwiseXor, // ^
    AndNot,     // &^
    LeftShift,  // <<
    RightShift, // >>

    // Logical
    LogicalAnd, // &&
    LogicalOr,  // ||

    // Comparison
    Equal,        // ==
    NotEqual,     // !=
    Less,         // <
    LessEqual,    // <=
    Greater,      // >
    GreaterEqual, // >=
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::BitwiseAnd => "&",
            BinaryOp::BitwiseOr => "|",
            BinaryOp::BitwiseXor => "^",
            BinaryOp::AndNot => "&^",
            BinaryOp::LeftShift => "<<",
            BinaryOp::RightShift => ">>",
            BinaryOp::LogicalAnd => "&&",
            BinaryOp::LogicalOr => "||",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::LessEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterEqual => ">=",
        }
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Subtract | BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Modulo
        )
    }

    pub fn is_bitwise(self) -> bool {
        matches!(
            self,
            BinaryOp::BitwiseAnd
                | BinaryOp::BitwiseOr
                | BinaryOp::BitwiseXor
                | BinaryOp::AndNot
                | BinaryOp::LeftShift
                | BinaryOp::RightShift
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::LogicalAnd | BinaryOp::LogicalOr)
    }

    pub fn is_equality(self) -> bool {
        matches!(self, BinaryOp::Equal | BinaryOp::NotEqual)
    }

    pub fn is_ordering(self) -> bool {
        matches!(
            self,
            BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnaryOp {
    Not,         // !
    Negate,      // -
    Plus,        // +
    BitwiseNot,  // ^
    AddressOf,   // &
    Dereference, // *
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Negate => "-",
            UnaryOp::Plus => "+",
            UnaryOp::BitwiseNot => "^",
            UnaryOp::AddressOf => "&",
            UnaryOp::Dereference => "*",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// An element of a composite literal: `value` or `key: value`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Element {
    pub key: Option<Expr>,
    pub value: Expr,
}

/// Expressions
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Expr {
    Ident(Ident),
    /// `None` when the literal overflowed during lexing
    IntLit { value: Option<i64>, raw: String, span: Span },
    FloatLit { value: f64, raw: String, span: Span },
    StringLit { value: String, span: Span },
    BoolLit { value: bool, span: Span },
    Binary { op: BinaryOp, left: Box<Expr>, right: Box<Expr>, span: Span },
    Unary { op: UnaryOp, operand: Box<Expr>, span: Span },
    /// `f(a, b)`; `spread` marks a trailing `xs...`
    Call { callee: Box<Expr>, args: Vec<Expr>, spread: bool, span: Span },
    Index { target: Box<Expr>, index: Box<Expr>, span: Span },
    /// `x.field` or `pkg.Member`
    FieldAccess { target: Box<Expr>, field: Ident, span: Span },
    /// `T{...}`; `ty` is `None` for literals nested in another literal whose
    /// element type is implied (`map[int]P{1: {...}}`)
    CompositeLit { ty: Option<TypeExpr>, elements: Vec<Element>, span: Span },
    Paren { inner: Box<Expr>, span: Span },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Ident(ident) => ident.span,
            Expr::IntLit { span, .. }
            | Expr::FloatLit { span, .. }
            | Expr::StringLit { span, .. }
            | Expr::BoolLit { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Call { span, .. }
            | Expr::Index { span, .. }
            | Expr::FieldAccess { span, .. }
            | Expr::CompositeLit { span, .. }
            | Expr::Paren { span, .. } => *span,
        }
    }

    pub fn position(&self) -> Position {
        self.span().start
    }

    /// Identifier name when the expression is a bare identifier
    pub fn as_ident(&self) -> Option<&Ident> {
        match self {
            Expr::Ident(ident) => Some(ident),
            _ => None,
        }
    }

    /// Strip redundant parentheses
    pub fn unparen(&self) -> &Expr {
        match self {
            Expr::Paren { inner, .. } => inner.unparen(),
            other => other,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Ident(ident) => write!(f, "{}", ident.name),
            Expr::IntLit { raw, .. } | Expr::FloatLit { raw, .. } => write!(f, "{}", raw),
            Expr::StringLit { value, .. } => write!(f, "{:?}", value),
            Expr::BoolLit { value, .. } => write!(f, "{}", value),
            Expr::Binary { op, left, right, .. } => write!(f, "{} {} {}", left, op, right),
            Expr::Unary { op, operand, .. } => write!(f, "{}{}", op, operand),
            Expr::Call { callee, args, spread, .. } => {
                write!(f, "{}(", callee)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                if *spread {
                    write!(f, "...")?;
                }
                write!(f, ")")
            }
            Expr::Index { target, index, .. } => write!(f, "{}[{}]", target, index),
            Expr::FieldAccess { target, field, .. } => write!(f, "{}.{}", target, field.name),
            Expr::CompositeLit { ty: Some(ty), .. } => write!(f, "{}{{...}}", ty),
            Expr::CompositeLit { ty: None, .. } => write!(f, "{{...}}"),
            Expr::Paren { inner, .. } => write!(f, "({})", inner),
        }
    }
}

/// Type expressions as written in source
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum TypeExpr {
    Named(Ident),
    Slice { elem: Box<TypeExpr>, span: Span },
    Array { len: Box<Expr>, elem: Box<TypeExpr>, span: Span },
    Map { key: Box<TypeExpr>, value: Box<TypeExpr>, span: Span },
    Pointer { elem: Box<TypeExpr>, span: Span },
    Func { sig: Box<FuncSig>, span: Span },
    Interface { methods: Vec<MethodSpec>, span: Span },
}

impl TypeExpr {
    pub fn span(&self) -> Span {
        match self {
            TypeExpr::Named(ident) => ident.span,
            TypeExpr::Slice { span, .. }
            | TypeExpr::Array { span, .. }
            | TypeExpr::Map { span, .. }
            | TypeExpr::Pointer { span, .. }
            | TypeExpr::Func { span, .. }
            | TypeExpr::Interface { span, .. } => *span,
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named(ident) => write!(f, "{}", ident.name),
            TypeExpr::Slice { elem, .. } => write!(f, "[]{}", elem),
            TypeExpr::Array { len, elem, .. } => write!(f, "[{}]{}", len, elem),
            TypeExpr::Map { key, value, .. } => write!(f, "map[{}]{}", key, value),
            TypeExpr::Pointer { elem, .. } => write!(f, "*{}", elem),
            TypeExpr::Func { .. } => write!(f, "func(...)"),
            TypeExpr::Interface { methods, .. } if methods.is_empty() => write!(f, "interface{{}}"),
            TypeExpr::Interface { .. } => write!(f, "interface{{...}}"),
        }
    }
}
