use crate::lexer::position::Position;
use serde::Serialize;
use std::fmt;

/// Token kinds of the supported Go subset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    // End of input
    Eof,

    // Literals
    Ident,
    Int,
    Float,
    String,
    True,
    False,

    // Keywords
    Package,
    Import,
    Var,
    Const,
    Type,
    Struct,
    Interface,
    Func,
    Return,
    If,
    Else,
    For,
    Range,
    Switch,
    Case,
    Default,
    Break,
    Continue,
    Fallthrough,
    Map,

    // Operators
    Plus,           // +
    Minus,          // -
    Star,           // *
    Slash,          // /
    Percent,        // %
    And,            // &
    Or,             // |
    Caret,          // ^
    AndNot,         // &^
    LeftShift,      // <<
    RightShift,     // >>
    LogicalAnd,     // &&
    LogicalOr,      // ||
    Not,            // !
    Eq,             // ==
    NotEq,          // !=
    Less,           // <
    LessEq,         // <=
    Greater,        // >
    GreaterEq,      // >=
    Assign,         // =
    Define,         // :=
    Increment,      // ++
    Decrement,      // --
    Ellipsis,       // ...

    // Assignment operators
    PlusEq,         // +=
    MinusEq,        // -=
    StarEq,         // *=
    SlashEq,        // /=
    PercentEq,      // %=
    AndEq,          // &=
    OrEq,           // |=
    CaretEq,        // ^=
    AndNotEq,       // &^=
    LeftShiftEq,    // <<=
    RightShiftEq,   // >>=

    // Punctuation
    LeftParen,      // (
    RightParen,     // )
    LeftBrace,      // {
    RightBrace,     // }
    LeftBracket,    // [
    RightBracket,   // ]
    Comma,          // ,
    Semicolon,      // ;
    Colon,          // :
    Dot,            // .
}

impl TokenType {
    /// Map an identifier-shaped lexeme to its keyword, if it is one
    pub fn keyword(word: &str) -> Option<TokenType> {
        let token_type = match word {
            "package" => TokenType::Package,
            "import" => TokenType::Import,
            "var" => TokenType::Var,
            "const" => TokenType::Const,
            "type" => TokenType::Type,
            "struct" => TokenType::Struct,
            "interface" => TokenType::Interface,
            "func" => TokenType::Func,
            "return" => TokenType::Return,
            "if" => TokenType::If,
            "else" => TokenType::Else,
            "for" => TokenType::For,
            "range" => TokenType::Range,
            "switch" => TokenType::Switch,
            "case" => TokenType::Case,
            "default" => TokenType::Default,
            "break" => TokenType::Break,
            "continue" => TokenType::Continue,
            "fallthrough" => TokenType::Fallthrough,
            "map" => TokenType::Map,
            "true" => TokenType::True,
            "false" => TokenType::False,
            _ => return None,
        };
        Some(token_type)
    }

    /// Returns true if the token type is a keyword
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenType::Package
                | TokenType::Import
                | TokenType::Var
                | TokenType::Const
                | TokenType::Type
                | TokenType::Struct
                | TokenType::Interface
                | TokenType::Func
                | TokenType::Return
                | TokenType::If
                | TokenType::Else
                | TokenType::For
                | TokenType::Range
                | TokenType::Switch
                | TokenType::Case
                | TokenType::Default
                | TokenType::Break
                | TokenType::Continue
                | TokenType::Fallthrough
                | TokenType::Map
                | TokenType::True
                | TokenType::False
        )
    }

    /// Returns true for literal token types
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenType::Int | TokenType::Float | TokenType::String | TokenType::True | TokenType::False
        )
    }

    /// A newline after one of these token types terminates the statement
    pub fn ends_statement(self) -> bool {
        self == TokenType::Ident
            || self.is_literal()
            || matches!(
                self,
                TokenType::Increment
                    | TokenType::Decrement
                    | TokenType::RightParen
                    | TokenType::RightBracket
                    | TokenType::RightBrace
                    | TokenType::Return
                    | TokenType::Break
                    | TokenType::Continue
                    | TokenType::Fallthrough
            )
    }

    /// Upper-case kind name used in token listings (`IDENT`, `PLUS_EQ`, ...)
    pub fn name(self) -> String {
        serde_json::to_value(self)
            .ok()
            .and_then(|value| value.as_str().map(str::to_owned))
            .unwrap_or_else(|| format!("{:?}", self).to_uppercase())
    }
}

/// Parsed value of a literal token
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LiteralValue {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
}

/// A token of the Go subset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Token {
    /// The type of token
    #[serde(rename = "kind")]
    pub token_type: TokenType,
    /// Exact source text of the token
    pub lexeme: String,
    /// Parsed literal value, absent for non-literals
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<LiteralValue>,
    /// Position of the first character
    pub position: Position,
}

impl Token {
    /// Create a new token
    pub fn new(token_type: TokenType, lexeme: impl Into<String>, position: Position) -> Self {
        Self {
            token_type,
            lexeme: lexeme.into(),
            value: None,
            position,
        }
    }

    pub fn with_value(mut self, value: LiteralValue) -> Self {
        self.value = Some(value);
        self
    }

    pub fn line(&self) -> usize {
        self.position.line
    }

    pub fn column(&self) -> usize {
        self.position.column
    }

    /// Position just past the last character of the lexeme.
    /// Tokens never span lines, so only the column and offset move.
    pub fn end(&self) -> Position {
        Position::new(
            self.position.line,
            self.position.column + self.lexeme.chars().count(),
            self.position.offset + self.lexeme.len(),
        )
    }

    /// Semicolons inserted at line ends carry a newline as their lexeme
    pub fn is_implicit_semicolon(&self) -> bool {
        self.token_type == TokenType::Semicolon && self.lexeme == "\n"
    }

    /// How the token reads in a syntax error message
    pub fn describe(&self) -> String {
        match self.token_type {
            TokenType::Eof => "EOF".to_string(),
            TokenType::Semicolon if self.is_implicit_semicolon() => "newline".to_string(),
            TokenType::Ident => format!("name {}", self.lexeme),
            TokenType::Int | TokenType::Float | TokenType::String => {
                format!("literal {}", self.lexeme)
            }
            t if t.is_keyword() => format!("keyword {}", self.lexeme),
            _ => format!("'{}'", self.lexeme),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}) at line {}", self.token_type.name(), self.lexeme, self.position.line)
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenType::Eof => "EOF",
            TokenType::Ident => "identifier",
            TokenType::Int => "integer literal",
            TokenType::Float => "float literal",
            TokenType::String => "string literal",
            TokenType::True => "true",
            TokenType::False => "false",

            // Keywords
            TokenType::Package => "package",
            TokenType::Import => "import",
            TokenType::Var => "var",
            TokenType::Const => "const",
            TokenType::Type => "type",
            TokenType::Struct => "struct",
            TokenType::Interface => "interface",
            TokenType::Func => "func",
            TokenType::Return => "return",
            TokenType::If => "if",
            TokenType::Else => "else",
            TokenType::For => "for",
            TokenType::Range => "range",
            TokenType::Switch => "switch",
            TokenType::Case => "case",
            TokenType::Default => "default",
            TokenType::Break => "break",
            TokenType::Continue => "continue",
            TokenType::Fallthrough => "fallthrough",
            TokenType::Map => "map",

            // Operators
            TokenType::Plus => "+",
            TokenType::Minus => "-",
            TokenType::Star => "*",
            TokenType::Slash => "/",
            TokenType::Percent => "%",
            TokenType::And => "&",
            TokenType::Or => "|",
            TokenType::Caret => "^",
            TokenType::AndNot => "&^",
            TokenType::LeftShift => "<<",
            TokenType::RightShift => ">>",
            TokenType::LogicalAnd => "&&",
            TokenType::LogicalOr => "||",
            TokenType::Not => "!",
            TokenType::Eq => "==",
            TokenType::NotEq => "!=",
            TokenType::Less => "<",
            TokenType::LessEq => "<=",
            TokenType::Greater => ">",
            TokenType::GreaterEq => ">=",
            TokenType::Assign => "=",
            TokenType::Define => ":=",
            TokenType::Increment => "++",
            TokenType::Decrement => "--",
            TokenType::Ellipsis => "...",
            TokenType::PlusEq => "+=",
            TokenType::MinusEq => "-=",
            TokenType::StarEq => "*=",
            TokenType::SlashEq => "/=",
            TokenType::PercentEq => "%=",
            TokenType::AndEq => "&=",
            TokenType::OrEq => "|=",
            TokenType::CaretEq => "^=",
            TokenType::AndNotEq => "&^=",
            TokenType::LeftShiftEq => "<<=",
            TokenType::RightShiftEq => ">>=",

            // Punctuation
            TokenType::LeftParen => "(",
            TokenType::RightParen => ")",
            TokenType::LeftBrace => "{",
            TokenType::RightBrace => "}",
            TokenType::LeftBracket => "[",
            TokenType::RightBracket => "]",
            TokenType::Comma => ",",
            TokenType::Semicolon => ";",
            TokenType::Colon => ":",
            TokenType::Dot => ".",
        };
        f.write_str(text)
    }
}
