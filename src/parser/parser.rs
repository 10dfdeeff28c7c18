//! Main parser implementation for the Go subset
//!
//! The parser works on the lexer's token vector after newline semicolons have
//! been inserted. Declarations are parsed here; statements, expressions and
//! type expressions live in their own modules as further `impl Parser` blocks.

use super::error::{ParseError, ParseResult};
use crate::ast::*;
use crate::lexer::{Lexer, Position, Token, TokenType};
use log::trace;

/// Insert the statement terminators Go leaves implicit.
///
/// A semicolon (lexeme `"\n"`) follows every token that can end a statement
/// when the next token starts on a later line, and before end of input.
pub fn insert_semicolons(tokens: &[Token]) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len() + tokens.len() / 4);

    for (i, token) in tokens.iter().enumerate() {
        if token.token_type == TokenType::Eof {
            if let Some(last) = out.last() {
                if last.token_type.ends_statement() {
                    let semicolon = implicit_semicolon(last);
                    out.push(semicolon);
                }
            }
            out.push(token.clone());
            break;
        }

        out.push(token.clone());

        if let Some(next) = tokens.get(i + 1) {
            if next.token_type != TokenType::Eof
                && next.line() > token.line()
                && token.token_type.ends_statement()
            {
                out.push(implicit_semicolon(token));
            }
        }
    }

    if out.last().map_or(true, |t| t.token_type != TokenType::Eof) {
        let position = out.last().map_or_else(Position::start, Token::end);
        out.push(Token::new(TokenType::Eof, "", position));
    }
    out
}

fn implicit_semicolon(after: &Token) -> Token {
    Token::new(TokenType::Semicolon, "\n", after.end())
}

/// The main parser struct that converts tokens to AST
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    errors: Vec<ParseError>,
    /// Negative inside control clause headers, where `Name {` opens the body
    /// rather than a composite literal
    pub(super) expr_level: i32,
}

impl Parser {
    /// Create a parser over raw lexer output
    pub fn from_tokens(tokens: &[Token]) -> Self {
        Self {
            tokens: insert_semicolons(tokens),
            current: 0,
            errors: Vec::new(),
            expr_level: 0,
        }
    }

    /// Lex `input` and create a parser over the result, dropping lex errors
    pub fn new(input: &str) -> Self {
        let (tokens, _) = Lexer::new(input).tokenize();
        Self::from_tokens(&tokens)
    }

    /// Get the current token without consuming it
    pub fn current_token(&self) -> &Token {
        let index = self.current.min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    /// Token type `n` tokens past the current one
    pub fn peek_type(&self, n: usize) -> TokenType {
        self.tokens
            .get(self.current + n)
            .map_or(TokenType::Eof, |t| t.token_type)
    }

    /// Consume the current token and return it; the trailing `Eof` is never consumed
    pub fn advance(&mut self) -> Token {
        let token = self.current_token().clone();
        if token.token_type != TokenType::Eof {
            self.current += 1;
        }
        token
    }

    /// Check if current token matches the expected type
    pub fn check(&self, token_type: TokenType) -> bool {
        self.current_token().token_type == token_type
    }

    /// Check if we've reached the end of input
    pub fn is_at_end(&self) -> bool {
        self.check(TokenType::Eof)
    }

    /// Consume a token if it matches the expected type
    pub fn match_token(&mut self, token_type: TokenType) -> bool {
        if self.check(token_type) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expect a specific token type and consume it, or return an error
    /// naming `context` as what was expected
    pub fn expect(&mut self, expected: TokenType, context: &str) -> ParseResult<Token> {
        if self.check(expected) {
            Ok(self.advance())
        } else {
            Err(self.error_here(context))
        }
    }

    /// Error describing the current token as unexpected
    pub fn error_here(&self, expected: &str) -> ParseError {
        ParseError::unexpected(self.current_token(), expected)
    }

    /// Get current position for error reporting
    pub fn current_position(&self) -> Position {
        self.current_token().position
    }

    /// End of the most recently consumed token
    pub fn previous_end(&self) -> Position {
        match self.current.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) if token.is_implicit_semicolon() => token.position,
            Some(token) => token.end(),
            None => self.current_position(),
        }
    }

    /// Span from `start` to the end of the last consumed token
    pub fn span_from(&self, start: Position) -> Span {
        Span::new(start, self.previous_end())
    }

    /// Add an error to the error list but continue parsing
    pub fn add_error(&mut self, error: ParseError) {
        trace!("parse error: {}", error);
        self.errors.push(error);
    }

    /// Get all accumulated errors
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Take the accumulated errors in source order
    pub fn take_errors(&mut self) -> Vec<ParseError> {
        let mut errors = std::mem::take(&mut self.errors);
        errors.sort_by_key(|e| (e.line(), e.column()));
        errors
    }

    /// Skip an identifier token and return it as an AST identifier
    pub fn expect_ident(&mut self, context: &str) -> ParseResult<Ident> {
        let token = self.expect(TokenType::Ident, context)?;
        Ok(Ident::new(token.lexeme.clone(), Span::new(token.position, token.end())))
    }

    /// `a, b, c`
    pub fn parse_ident_list(&mut self, context: &str) -> ParseResult<Vec<Ident>> {
        let mut names = vec![self.expect_ident(context)?];
        while self.match_token(TokenType::Comma) {
            names.push(self.expect_ident(context)?);
        }
        Ok(names)
    }

    /// Consume a statement terminator. A closing brace or paren, `case`,
    /// `default` and end of input terminate without being consumed.
    pub fn expect_terminator(&mut self, context: &str) -> ParseResult<()> {
        if self.match_token(TokenType::Semicolon) {
            return Ok(());
        }
        match self.current_token().token_type {
            TokenType::RightBrace
            | TokenType::RightParen
            | TokenType::Case
            | TokenType::Default
            | TokenType::Eof => Ok(()),
            _ => Err(self.error_here(context)),
        }
    }

    /// Statement-level error recovery: skip to the next `;` at the current
    /// nesting depth (consumed) or to a `}` closing the enclosing block
    pub fn synchronize(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.current_token().token_type {
                TokenType::Eof => return,
                TokenType::Semicolon if depth == 0 => {
                    self.advance();
                    return;
                }
                TokenType::RightBrace if depth == 0 => return,
                TokenType::Func | TokenType::Type | TokenType::Import | TokenType::Package
                    if depth == 0 =>
                {
                    return
                }
                TokenType::LeftBrace | TokenType::LeftParen | TokenType::LeftBracket => {
                    depth += 1;
                    self.advance();
                }
                TokenType::RightBrace | TokenType::RightParen | TokenType::RightBracket => {
                    depth = depth.saturating_sub(1);
                    self.advance();
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    /// Top-level error recovery: skip to the next declaration keyword outside
    /// any braces
    pub fn synchronize_top_level(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.current_token().token_type {
                TokenType::Eof => return,
                TokenType::Func
                | TokenType::Type
                | TokenType::Var
                | TokenType::Const
                | TokenType::Import
                    if depth == 0 =>
                {
                    return
                }
                TokenType::LeftBrace => {
                    depth += 1;
                    self.advance();
                }
                TokenType::RightBrace => {
                    depth = depth.saturating_sub(1);
                    self.advance();
                }
                _ => {
                    self.advance();
                }
            }
        }
    }

    fn skip_semicolons(&mut self) {
        while self.match_token(TokenType::Semicolon) {}
    }

    /// Parse a complete source file. Never fails: syntax errors are collected
    /// and the returned tree holds everything that parsed.
    pub fn parse_program(&mut self) -> Program {
        self.skip_semicolons();
        let start = self.current_position();

        let package = match self.parse_package_clause() {
            Ok(name) => name,
            Err(err) => {
                self.add_error(err);
                self.synchronize_top_level();
                Ident::new("", Span::single(start))
            }
        };

        let mut imports = Vec::new();
        loop {
            self.skip_semicolons();
            if !self.check(TokenType::Import) {
                break;
            }
            if let Err(err) = self.parse_import(&mut imports) {
                self.add_error(err);
                self.synchronize_top_level();
            }
        }

        let mut decls = Vec::new();
        loop {
            self.skip_semicolons();
            if self.is_at_end() {
                break;
            }

            if self.check(TokenType::Import) {
                let position = self.current_position();
                self.add_error(ParseError::invalid(
                    "imports must appear before other declarations",
                    position,
                ));
                if let Err(err) = self.parse_import(&mut imports) {
                    self.add_error(err);
                    self.synchronize_top_level();
                }
                continue;
            }

            match self.parse_decl() {
                Ok(decl) => {
                    decls.push(decl);
                    // A declaration cut short by an already reported error may
                    // be followed directly by the next line's tokens
                    let on_new_line = self.current_position().line > self.previous_end().line;
                    if !on_new_line {
                        if let Err(err) = self.expect_terminator("newline or ; after top level declaration") {
                            self.add_error(err);
                            self.synchronize_top_level();
                        }
                    }
                }
                Err(err) => {
                    self.add_error(err);
                    self.synchronize_top_level();
                }
            }
        }

        Program {
            package,
            imports,
            decls,
            span: self.span_from(start),
        }
    }

    fn parse_package_clause(&mut self) -> ParseResult<Ident> {
        self.expect(TokenType::Package, "package clause")?;
        let name = self.expect_ident("package name")?;
        self.expect_terminator("newline or ; after package clause")?;
        Ok(name)
    }

    /// `import "path"` or `import ( "a"; "b" )`
    fn parse_import(&mut self, imports: &mut Vec<Import>) -> ParseResult<()> {
        self.expect(TokenType::Import, "import")?;

        if self.match_token(TokenType::LeftParen) {
            loop {
                self.skip_semicolons();
                if self.match_token(TokenType::RightParen) {
                    break;
                }
                imports.push(self.parse_import_spec()?);
                self.expect_terminator("newline or ; in import list")?;
            }
        } else {
            imports.push(self.parse_import_spec()?);
        }

        self.expect_terminator("newline or ; after import")
    }

    fn parse_import_spec(&mut self) -> ParseResult<Import> {
        let token = self.expect(TokenType::String, "import path")?;
        let path = match token.value {
            Some(crate::lexer::LiteralValue::String(ref path)) => path.clone(),
            _ => token.lexeme.trim_matches('"').to_string(),
        };
        Ok(Import {
            path,
            span: Span::new(token.position, token.end()),
        })
    }

    /// Parse a top-level declaration
    pub fn parse_decl(&mut self) -> ParseResult<Decl> {
        match self.current_token().token_type {
            TokenType::Var => Ok(Decl::Var(self.parse_var_decl()?)),
            TokenType::Const => Ok(Decl::Const(self.parse_const_decl()?)),
            TokenType::Type => Ok(Decl::Type(self.parse_type_decl()?)),
            TokenType::Func => {
                let func = self.parse_func_decl()?;
                if func.receiver.is_some() {
                    Ok(Decl::Method(func))
                } else {
                    Ok(Decl::Func(func))
                }
            }
            _ => {
                let err = self.error_here("declaration");
                // Guarantee progress before resynchronizing
                self.advance();
                Err(err)
            }
        }
    }

    /// `var names [Type] [= values]`
    pub fn parse_var_decl(&mut self) -> ParseResult<VarDecl> {
        let start = self.expect(TokenType::Var, "var")?.position;
        let names = self.parse_ident_list("variable name")?;

        let ty = if self.check(TokenType::Assign) {
            None
        } else {
            Some(self.parse_type()?)
        };

        let values = if self.match_token(TokenType::Assign) {
            self.parse_expression_list()?
        } else {
            Vec::new()
        };

        Ok(VarDecl {
            names,
            ty,
            values,
            span: self.span_from(start),
        })
    }

    /// `const names [Type] = values`
    pub fn parse_const_decl(&mut self) -> ParseResult<ConstDecl> {
        let start = self.expect(TokenType::Const, "const")?.position;
        let names = self.parse_ident_list("constant name")?;

        let ty = if self.check(TokenType::Assign) {
            None
        } else {
            Some(self.parse_type()?)
        };

        self.expect(TokenType::Assign, "= in constant declaration")?;
        let values = self.parse_expression_list()?;

        Ok(ConstDecl {
            names,
            ty,
            values,
            span: self.span_from(start),
        })
    }

    /// `type Name struct {...}`, `type Name interface {...}` or `type Name T`
    fn parse_type_decl(&mut self) -> ParseResult<TypeDecl> {
        let start = self.expect(TokenType::Type, "type")?.position;
        let name = self.expect_ident("type name")?;

        let def = match self.current_token().token_type {
            TokenType::Struct => {
                self.advance();
                TypeDef::Struct {
                    fields: self.parse_struct_fields()?,
                }
            }
            TokenType::Interface => {
                self.advance();
                TypeDef::Interface {
                    methods: self.parse_interface_methods()?,
                }
            }
            _ => TypeDef::Alias {
                target: self.parse_type()?,
            },
        };

        Ok(TypeDecl {
            name,
            def,
            span: self.span_from(start),
        })
    }

    /// `{ a, b T; c U }`; a field list declares one `FieldDecl` per name
    fn parse_struct_fields(&mut self) -> ParseResult<Vec<FieldDecl>> {
        self.expect(TokenType::LeftBrace, "{ after struct")?;
        let mut fields = Vec::new();

        loop {
            self.skip_semicolons();
            if self.match_token(TokenType::RightBrace) {
                break;
            }

            let start = self.current_position();
            let names = self.parse_ident_list("field name or }")?;
            let ty = self.parse_type()?;
            let span = self.span_from(start);
            for name in names {
                fields.push(FieldDecl {
                    name,
                    ty: ty.clone(),
                    span,
                });
            }
            self.expect_terminator("newline, ; or } after struct field")?;
        }

        Ok(fields)
    }

    /// `{ Name(params) results; ... }`
    pub fn parse_interface_methods(&mut self) -> ParseResult<Vec<MethodSpec>> {
        self.expect(TokenType::LeftBrace, "{ after interface")?;
        let mut methods = Vec::new();

        loop {
            self.skip_semicolons();
            if self.match_token(TokenType::RightBrace) {
                break;
            }

            let start = self.current_position();
            let name = self.expect_ident("method name or }")?;
            let sig = self.parse_signature()?;
            methods.push(MethodSpec {
                name,
                sig,
                span: self.span_from(start),
            });
            self.expect_terminator("newline, ; or } after interface method")?;
        }

        Ok(methods)
    }

    /// `func [(recv T)] Name(params) [results] { body }`
    fn parse_func_decl(&mut self) -> ParseResult<FuncDecl> {
        let start = self.expect(TokenType::Func, "func")?.position;

        let receiver = if self.check(TokenType::LeftParen) {
            Some(self.parse_receiver()?)
        } else {
            None
        };

        let name = self.expect_ident("function name")?;
        let sig = self.parse_signature()?;
        if !self.check(TokenType::LeftBrace) {
            return Err(self.error_here("{ after function signature"));
        }
        let body = self.parse_block()?;

        Ok(FuncDecl {
            receiver,
            name,
            sig,
            body,
            span: self.span_from(start),
        })
    }

    /// `(name T)` or `(name *T)`
    fn parse_receiver(&mut self) -> ParseResult<Receiver> {
        let start = self.expect(TokenType::LeftParen, "(")?.position;
        let name = self.expect_ident("receiver name")?;
        let ty = self.parse_type()?;
        self.expect(TokenType::RightParen, ") after receiver")?;

        let receiver = Receiver {
            name,
            ty,
            span: self.span_from(start),
        };
        if receiver.base_type().is_none() {
            return Err(ParseError::invalid(
                format!("invalid receiver type {}", receiver.ty),
                receiver.ty.span().start,
            ));
        }
        Ok(receiver)
    }

    /// `(params) results` where results are a single type or a parenthesized list
    pub fn parse_signature(&mut self) -> ParseResult<FuncSig> {
        let params = self.parse_parameters()?;

        let results = if self.check(TokenType::LeftParen) {
            self.parse_parameters()?.into_iter().map(|p| p.ty).collect()
        } else if self.starts_type() {
            vec![self.parse_type()?]
        } else {
            Vec::new()
        };

        Ok(FuncSig { params, results })
    }

    /// `(a, b int, c ...string)`; `a, b` takes the type written after `b`.
    /// Either every entry is named or none is.
    pub fn parse_parameters(&mut self) -> ParseResult<Vec<Param>> {
        self.expect(TokenType::LeftParen, "(")?;
        let mut entries = Vec::new();

        while !self.check(TokenType::RightParen) {
            let start = self.current_position();
            let named = self.check(TokenType::Ident) && starts_type(self.peek_type(1));
            let name = if named {
                Some(self.expect_ident("parameter name")?)
            } else {
                None
            };
            let variadic = self.match_token(TokenType::Ellipsis);
            let ty = self.parse_type()?;
            entries.push(Param {
                name,
                ty,
                variadic,
                span: self.span_from(start),
            });

            if !self.match_token(TokenType::Comma) {
                break;
            }
        }
        self.expect(TokenType::RightParen, ", or ) in parameter list")?;

        let params = group_parameters(entries)?;
        if let Some(param) = params.iter().rev().skip(1).find(|p| p.variadic) {
            return Err(ParseError::invalid(
                "can only use ... with final parameter in list",
                param.span.start,
            ));
        }
        Ok(params)
    }

    /// Whether the current token can begin a type
    pub fn starts_type(&self) -> bool {
        starts_type(self.current_token().token_type)
    }
}

pub(super) fn starts_type(token_type: TokenType) -> bool {
    matches!(
        token_type,
        TokenType::Ident
            | TokenType::LeftBracket
            | TokenType::Map
            | TokenType::Star
            | TokenType::Func
            | TokenType::Interface
            | TokenType::Ellipsis
            | TokenType::LeftParen
    )
}

/// Resolve `a, b int` style grouping: once any entry is named, bare entries
/// are names waiting for the next written type.
fn group_parameters(entries: Vec<Param>) -> ParseResult<Vec<Param>> {
    if entries.iter().all(|p| p.name.is_none()) {
        return Ok(entries);
    }

    let mut params = Vec::with_capacity(entries.len());
    let mut pending: Vec<(Ident, Span)> = Vec::new();

    for entry in entries {
        match entry.name {
            Some(name) => {
                for (pending_name, span) in pending.drain(..) {
                    params.push(Param {
                        name: Some(pending_name),
                        ty: entry.ty.clone(),
                        variadic: false,
                        span,
                    });
                }
                params.push(Param {
                    name: Some(name),
                    ..entry
                });
            }
            None => match entry.ty {
                TypeExpr::Named(ident) if !entry.variadic => pending.push((ident, entry.span)),
                _ => {
                    return Err(ParseError::invalid(
                        "mixed named and unnamed parameters",
                        entry.span.start,
                    ))
                }
            },
        }
    }

    if let Some((_, span)) = pending.first() {
        return Err(ParseError::invalid("mixed named and unnamed parameters", span.start));
    }
    Ok(params)
}
