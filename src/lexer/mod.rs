pub mod token;
pub mod error;
pub mod position;
pub mod lexer;

pub use self::lexer::Lexer;
pub use self::token::{LiteralValue, Token, TokenType};
pub use self::position::Position;
pub use self::error::{LexErrorKind, LexerError};
