//! Semantic errors
//!
//! The `Display` text of each variant is the diagnostic message; type
//! operands are carried pre-rendered so errors stay cheap to clone.

use crate::lexer::Position;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SemanticError {
    #[error("redeclared in this scope: {name}")]
    Redeclared { name: String, position: Position },

    #[error("undeclared identifier: {name}")]
    Undeclared { name: String, position: Position },

    #[error("undefined type: {name}")]
    UndefinedType { name: String, position: Position },

    /// Selector naming nothing in a known package
    #[error("undefined: {package}.{name}")]
    UndefinedMember {
        package: String,
        name: String,
        position: Position,
    },

    #[error("cannot assign to constant {name}")]
    AssignToConstant { name: String, position: Position },

    /// `break`, `continue` or `fallthrough` with no enclosing construct
    #[error("{keyword} outside loop/switch")]
    MisplacedControl { keyword: String, position: Position },

    #[error("type mismatch in {op}: {left} and {right}")]
    TypeMismatch {
        op: String,
        left: String,
        right: String,
        position: Position,
    },

    #[error("operator {op} not defined on {operand}")]
    OperatorNotDefined {
        op: String,
        operand: String,
        position: Position,
    },

    /// `context` names where the value is used: "assignment",
    /// "argument to f", "return statement", ...
    #[error("cannot use {value} as {target} in {context}")]
    CannotUse {
        value: String,
        target: String,
        context: String,
        position: Position,
    },

    #[error("cannot convert {from} to {to}")]
    CannotConvert {
        from: String,
        to: String,
        position: Position,
    },

    #[error("not enough arguments in call to {callee}")]
    NotEnoughArguments { callee: String, position: Position },

    #[error("too many arguments in call to {callee}")]
    TooManyArguments { callee: String, position: Position },

    #[error("not enough return values")]
    NotEnoughReturnValues { position: Position },

    #[error("too many return values")]
    TooManyReturnValues { position: Position },

    #[error(
        "assignment mismatch: {variables} variable{} but {values} value{}",
        plural(*.variables),
        plural(*.values)
    )]
    AssignmentMismatch {
        variables: usize,
        values: usize,
        position: Position,
    },

    #[error("no new variables on left side of :=")]
    NoNewVariables { position: Position },

    #[error("cannot call non-function {expr}")]
    NotAFunction { expr: String, position: Position },

    #[error("{ty} has no field or method {name}")]
    NoFieldOrMethod {
        ty: String,
        name: String,
        position: Position,
    },

    #[error("cannot index {ty}")]
    CannotIndex { ty: String, position: Position },

    #[error("invalid index type {ty}")]
    InvalidIndexType { ty: String, position: Position },

    #[error("cannot range over {ty}")]
    CannotRange { ty: String, position: Position },

    #[error("multiple-value {call} in single-value context")]
    MultipleValueInSingleValueContext { call: String, position: Position },

    #[error("{call} (no value) used as value")]
    NoValueUsedAsValue { call: String, position: Position },

    #[error("non-boolean condition in {construct} statement")]
    NonBooleanCondition { construct: String, position: Position },

    /// Rule violations without a dedicated variant
    #[error("{message}")]
    Invalid { message: String, position: Position },
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

impl SemanticError {
    pub fn invalid(message: impl Into<String>, position: Position) -> Self {
        SemanticError::Invalid {
            message: message.into(),
            position,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            SemanticError::Redeclared { position, .. }
            | SemanticError::Undeclared { position, .. }
            | SemanticError::UndefinedType { position, .. }
            | SemanticError::UndefinedMember { position, .. }
            | SemanticError::AssignToConstant { position, .. }
            | SemanticError::MisplacedControl { position, .. }
            | SemanticError::TypeMismatch { position, .. }
            | SemanticError::OperatorNotDefined { position, .. }
            | SemanticError::CannotUse { position, .. }
            | SemanticError::CannotConvert { position, .. }
            | SemanticError::NotEnoughArguments { position, .. }
            | SemanticError::TooManyArguments { position, .. }
            | SemanticError::NotEnoughReturnValues { position }
            | SemanticError::TooManyReturnValues { position }
            | SemanticError::AssignmentMismatch { position, .. }
            | SemanticError::NoNewVariables { position }
            | SemanticError::NotAFunction { position, .. }
            | SemanticError::NoFieldOrMethod { position, .. }
            | SemanticError::CannotIndex { position, .. }
            | SemanticError::InvalidIndexType { position, .. }
            | SemanticError::CannotRange { position, .. }
            | SemanticError::MultipleValueInSingleValueContext { position, .. }
            | SemanticError::NoValueUsedAsValue { position, .. }
            | SemanticError::NonBooleanCondition { position, .. }
            | SemanticError::Invalid { position, .. } => *position,
        }
    }

    pub fn line(&self) -> usize {
        self.position().line
    }

    pub fn column(&self) -> usize {
        self.position().column
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let position = Position::new(3, 5, 0);
        let err = SemanticError::TypeMismatch {
            op: "+".into(),
            left: "int".into(),
            right: "float64".into(),
            position,
        };
        assert_eq!(err.to_string(), "type mismatch in +: int and float64");

        let err = SemanticError::AssignmentMismatch {
            variables: 2,
            values: 1,
            position,
        };
        assert_eq!(err.to_string(), "assignment mismatch: 2 variables but 1 value");

        let err = SemanticError::MisplacedControl {
            keyword: "break".into(),
            position,
        };
        assert_eq!(err.to_string(), "break outside loop/switch");
        assert_eq!((err.line(), err.column()), (3, 5));
    }
}
