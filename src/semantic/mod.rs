//! Semantic Analysis Module
//!
//! This module provides semantic analysis of a parsed program:
//! - Symbol table management and scope resolution
//! - Type checking with untyped constants and named types
//! - Declaration, assignment and control-flow rules
//! - Semantic error reporting

pub mod analyzer;
pub mod builtins;
pub mod error;
mod expressions;
mod statements;
pub mod symbols;
pub mod types;

pub use analyzer::{AnalysisResult, AnalyzerConfig, SemanticAnalyzer};
pub use error::SemanticError;
pub use symbols::{ScopeKind, Symbol, SymbolKind, SymbolTable};
pub use types::{FuncType, Type};
