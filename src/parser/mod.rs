pub mod error;
pub mod expressions;
pub mod parser;
pub mod statements;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::{ParseError, ParseResult};
pub use parser::{insert_semicolons, Parser};
