use crate::lexer::error::{LexErrorKind, LexerError};
use crate::lexer::position::Position;
use crate::lexer::token::{LiteralValue, Token, TokenType};
use log::trace;

/// The Lexer is responsible for converting source code into tokens
pub struct Lexer<'a> {
    /// The input source code
    input: &'a str,
    /// The characters of the input after the current one
    chars: std::str::Chars<'a>,
    /// The current character
    current_char: Option<char>,
    /// Position of the current character
    position: Position,
    /// Errors that still let a token be produced (bad escapes, overflow)
    errors: Vec<LexerError>,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer from input source code
    pub fn new(input: &'a str) -> Self {
        let mut chars = input.chars();
        let current_char = chars.next();

        Self {
            input,
            chars,
            current_char,
            position: Position::start(),
            errors: Vec::new(),
        }
    }

    /// Advance to the next character
    pub fn advance(&mut self) {
        if let Some(ch) = self.current_char {
            self.position.advance(ch);
            self.current_char = self.chars.next();
        }
    }

    /// Look at the next character without advancing
    pub fn peek(&self) -> Option<char> {
        self.peek_nth(0)
    }

    /// Look `n + 1` characters ahead without advancing
    fn peek_nth(&self, n: usize) -> Option<char> {
        self.chars.clone().nth(n)
    }

    /// Get the current character
    pub fn current_char(&self) -> Option<char> {
        self.current_char
    }

    /// Check if we've reached the end of input
    pub fn is_at_end(&self) -> bool {
        self.current_char.is_none()
    }

    /// Get the current position
    pub fn get_position(&self) -> Position {
        self.position
    }

    /// Run the lexer to the end of input, collecting every token (ending with
    /// `Eof`) and every lexical error in source order
    pub fn tokenize(mut self) -> (Vec<Token>, Vec<LexerError>) {
        let mut tokens = Vec::new();
        let mut errors = Vec::new();

        loop {
            let result = self.next_token();
            errors.append(&mut self.errors);
            match result {
                Ok(token) => {
                    let is_eof = token.token_type == TokenType::Eof;
                    tokens.push(token);
                    if is_eof {
                        break;
                    }
                }
                Err(err) => {
                    trace!("lex error at {}: {}", err.position, err);
                    errors.push(err);
                }
            }
        }

        errors.sort_by_key(|err| (err.line(), err.column()));
        (tokens, errors)
    }

    /// Get the next token from the input
    pub fn next_token(&mut self) -> Result<Token, LexerError> {
        self.skip_trivia()?;

        let start = self.position;
        let ch = match self.current_char {
            Some(ch) => ch,
            None => return Ok(Token::new(TokenType::Eof, "", start)),
        };

        if ch.is_ascii_alphabetic() || ch == '_' {
            return Ok(self.scan_identifier(start));
        }

        let starts_fraction = ch == '.' && self.peek().map_or(false, |c| c.is_ascii_digit());
        if ch.is_ascii_digit() || starts_fraction {
            return Ok(self.scan_number(start));
        }

        if ch == '"' {
            return self.scan_string(start);
        }

        if let Some(token_type) = self.scan_operator() {
            return Ok(Token::new(token_type, self.slice_from(start), start));
        }

        // Unknown character
        self.advance();
        Err(LexerError::new(LexErrorKind::UnexpectedCharacter, ch.to_string(), start))
    }

    /// Skip whitespace and comments
    fn skip_trivia(&mut self) -> Result<(), LexerError> {
        loop {
            match self.current_char {
                Some(' ') | Some('\t') | Some('\r') | Some('\n') => self.advance(),
                Some('/') if self.peek() == Some('/') => {
                    while let Some(ch) = self.current_char {
                        if ch == '\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                Some('/') if self.peek() == Some('*') => {
                    let start = self.position;
                    self.advance();
                    self.advance();
                    loop {
                        match self.current_char {
                            None => {
                                return Err(LexerError::new(
                                    LexErrorKind::UnterminatedBlockComment,
                                    "/*",
                                    start,
                                ));
                            }
                            Some('*') if self.peek() == Some('/') => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            Some(_) => self.advance(),
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn slice_from(&self, start: Position) -> &'a str {
        &self.input[start.offset..self.position.offset]
    }

    fn scan_identifier(&mut self, start: Position) -> Token {
        while let Some(ch) = self.current_char {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.advance();
            } else {
                break;
            }
        }

        let lexeme = self.slice_from(start);
        match TokenType::keyword(lexeme) {
            Some(TokenType::True) => {
                Token::new(TokenType::True, lexeme, start).with_value(LiteralValue::Bool(true))
            }
            Some(TokenType::False) => {
                Token::new(TokenType::False, lexeme, start).with_value(LiteralValue::Bool(false))
            }
            Some(keyword) => Token::new(keyword, lexeme, start),
            None => Token::new(TokenType::Ident, lexeme, start),
        }
    }

    /// Integers are `d+`; floats need a fraction (`d+.d*`, `.d+`) or an
    /// exponent (`e[+-]?d+`)
    fn scan_number(&mut self, start: Position) -> Token {
        let mut is_float = false;
        self.skip_digits();

        if self.current_char == Some('.') {
            is_float = true;
            self.advance();
            self.skip_digits();
        }

        if matches!(self.current_char, Some('e') | Some('E')) {
            let has_exponent = match self.peek() {
                Some(c) if c.is_ascii_digit() => true,
                Some('+') | Some('-') => self.peek_nth(1).map_or(false, |c| c.is_ascii_digit()),
                _ => false,
            };
            if has_exponent {
                is_float = true;
                self.advance();
                if matches!(self.current_char, Some('+') | Some('-')) {
                    self.advance();
                }
                self.skip_digits();
            }
        }

        let lexeme = self.slice_from(start);
        if is_float {
            let token = Token::new(TokenType::Float, lexeme, start);
            match lexeme.parse::<f64>() {
                Ok(value) => token.with_value(LiteralValue::Float(value)),
                Err(_) => token,
            }
        } else {
            let token = Token::new(TokenType::Int, lexeme, start);
            match lexeme.parse::<i64>() {
                Ok(value) => token.with_value(LiteralValue::Int(value)),
                Err(_) => {
                    self.errors.push(LexerError::new(
                        LexErrorKind::IntegerOutOfRange,
                        lexeme,
                        start,
                    ));
                    token
                }
            }
        }
    }

    fn skip_digits(&mut self) {
        while let Some(ch) = self.current_char {
            if ch.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Scan a double-quoted string. An unterminated string stops before the
    /// newline so scanning resumes on the next line.
    fn scan_string(&mut self, start: Position) -> Result<Token, LexerError> {
        let mut value = String::new();
        self.advance(); // opening quote

        loop {
            match self.current_char {
                None | Some('\n') => {
                    return Err(LexerError::new(
                        LexErrorKind::UnterminatedString,
                        self.slice_from(start),
                        start,
                    ));
                }
                Some('"') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    let escape_start = self.position;
                    self.advance();
                    let escaped = match self.current_char {
                        Some('n') => '\n',
                        Some('t') => '\t',
                        Some('r') => '\r',
                        Some('"') => '"',
                        Some('\\') => '\\',
                        None | Some('\n') => continue,
                        Some(other) => {
                            self.errors.push(LexerError::new(
                                LexErrorKind::UnknownEscape,
                                format!("\\{}", other),
                                escape_start,
                            ));
                            other
                        }
                    };
                    value.push(escaped);
                    self.advance();
                }
                Some(ch) => {
                    value.push(ch);
                    self.advance();
                }
            }
        }

        Ok(Token::new(TokenType::String, self.slice_from(start), start)
            .with_value(LiteralValue::String(value)))
    }

    /// Longest-match operator and punctuation scanning
    fn scan_operator(&mut self) -> Option<TokenType> {
        let first = self.current_char?;
        let second = self.peek();
        let third = self.peek_nth(1);

        let (token_type, len) = match (first, second, third) {
            ('<', Some('<'), Some('=')) => (TokenType::LeftShiftEq, 3),
            ('>', Some('>'), Some('=')) => (TokenType::RightShiftEq, 3),
            ('&', Some('^'), Some('=')) => (TokenType::AndNotEq, 3),
            ('.', Some('.'), Some('.')) => (TokenType::Ellipsis, 3),

            ('=', Some('='), _) => (TokenType::Eq, 2),
            ('!', Some('='), _) => (TokenType::NotEq, 2),
            ('<', Some('='), _) => (TokenType::LessEq, 2),
            ('>', Some('='), _) => (TokenType::GreaterEq, 2),
            ('&', Some('&'), _) => (TokenType::LogicalAnd, 2),
            ('|', Some('|'), _) => (TokenType::LogicalOr, 2),
            ('<', Some('<'), _) => (TokenType::LeftShift, 2),
            ('>', Some('>'), _) => (TokenType::RightShift, 2),
            ('&', Some('^'), _) => (TokenType::AndNot, 2),
            (':', Some('='), _) => (TokenType::Define, 2),
            ('+', Some('='), _) => (TokenType::PlusEq, 2),
            ('-', Some('='), _) => (TokenType::MinusEq, 2),
            ('*', Some('='), _) => (TokenType::StarEq, 2),
            ('/', Some('='), _) => (TokenType::SlashEq, 2),
            ('%', Some('='), _) => (TokenType::PercentEq, 2),
            ('&', Some('='), _) => (TokenType::AndEq, 2),
            ('|', Some('='), _) => (TokenType::OrEq, 2),
            ('^', Some('='), _) => (TokenType::CaretEq, 2),
            ('+', Some('+'), _) => (TokenType::Increment, 2),
            ('-', Some('-'), _) => (TokenType::Decrement, 2),

            ('+', _, _) => (TokenType::Plus, 1),
            ('-', _, _) => (TokenType::Minus, 1),
            ('*', _, _) => (TokenType::Star, 1),
            ('/', _, _) => (TokenType::Slash, 1),
            ('%', _, _) => (TokenType::Percent, 1),
            ('=', _, _) => (TokenType::Assign, 1),
            ('<', _, _) => (TokenType::Less, 1),
            ('>', _, _) => (TokenType::Greater, 1),
            ('!', _, _) => (TokenType::Not, 1),
            ('&', _, _) => (TokenType::And, 1),
            ('|', _, _) => (TokenType::Or, 1),
            ('^', _, _) => (TokenType::Caret, 1),
            ('(', _, _) => (TokenType::LeftParen, 1),
            (')', _, _) => (TokenType::RightParen, 1),
            ('{', _, _) => (TokenType::LeftBrace, 1),
            ('}', _, _) => (TokenType::RightBrace, 1),
            ('[', _, _) => (TokenType::LeftBracket, 1),
            (']', _, _) => (TokenType::RightBracket, 1),
            (',', _, _) => (TokenType::Comma, 1),
            (';', _, _) => (TokenType::Semicolon, 1),
            (':', _, _) => (TokenType::Colon, 1),
            ('.', _, _) => (TokenType::Dot, 1),
            _ => return None,
        };

        for _ in 0..len {
            self.advance();
        }
        Some(token_type)
    }
}
