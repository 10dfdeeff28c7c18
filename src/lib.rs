pub mod ast;
pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod semantic;
pub mod visitor;

pub use lexer::{Lexer, Token, TokenType, Position, LexerError};
pub use ast::{Program, Decl, Expr, Stmt, TypeExpr, Span};
pub use parser::{Parser, ParseError, ParseResult};
pub use semantic::{AnalyzerConfig, SemanticAnalyzer, SemanticError, Symbol, SymbolKind, Type};
pub use diagnostics::{Diagnostic, Diagnostics, Phase};
pub use config::{Config, OutputFormat};
pub use pipeline::{
    analyze, analyze_with_config, parse, parse_with_config, tokenize, tokenize_with_config, AnalysisOutput,
    LexOutput, ParseOutput,
};
pub use visitor::Construct;
