//! Token definitions.

use mcc_util::Symbol;

/// The closed set of token kinds the lexer can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// End of input. Returned for every request past the last real token.
    Eof,
    Ident,
    Number,
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Semicolon,
    Assign,
    /// The `int` type keyword.
    Int,
    LBrace,
    RBrace,
    Comma,
    EqEq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    While,
    If,
    Else,
    Return,
}

impl TokenKind {
    /// The dump name used by the token listing, matching the historical
    /// phase output.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Eof => "EOF",
            TokenKind::Ident => "IDENTIFIER",
            TokenKind::Number => "NUMBER",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Star => "MULTIPLY",
            TokenKind::Slash => "DIVIDE",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Assign => "ASSIGN",
            TokenKind::Int => "KEYWORD",
            TokenKind::LBrace => "LBRACE",
            TokenKind::RBrace => "RBRACE",
            TokenKind::Comma => "COMMA",
            TokenKind::EqEq => "EQUALS",
            TokenKind::NotEq => "NOT_EQUALS",
            TokenKind::Lt => "LESS",
            TokenKind::Gt => "GREATER",
            TokenKind::LtEq => "LESS_EQUALS",
            TokenKind::GtEq => "GREATER_EQUALS",
            TokenKind::While => "WHILE",
            TokenKind::If => "IF",
            TokenKind::Else => "ELSE",
            TokenKind::Return => "RETURN",
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A lexical unit: its kind plus the originating source lexeme.
///
/// Every token except [`TokenKind::Eof`] carries the exact text it was
/// scanned from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: Option<Symbol>,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: Symbol) -> Self {
        Self {
            kind,
            lexeme: Some(lexeme),
        }
    }

    pub fn eof() -> Self {
        Self {
            kind: TokenKind::Eof,
            lexeme: None,
        }
    }

    /// The lexeme text, or `"null"` for EOF (dump convention).
    pub fn lexeme_str(&self) -> &'static str {
        self.lexeme.map_or("null", |s| s.as_str())
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:<15} | Value: '{}'",
            self.kind.name(),
            self.lexeme_str()
        )
    }
}
