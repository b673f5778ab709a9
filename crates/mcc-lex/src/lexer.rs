//! The lexer proper and the peekable token stream built on top of it.

use mcc_util::Symbol;

use crate::cursor::Cursor;
use crate::token::{Token, TokenKind};
use crate::LexError;

/// Pull-model lexer over a source string.
pub struct Lexer<'src> {
    cursor: Cursor<'src>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            cursor: Cursor::new(source),
        }
    }

    /// Scan and return the next token.
    ///
    /// Skips leading whitespace, then dispatches on the first byte. At end
    /// of input this returns [`Token::eof`], and keeps returning it on
    /// every subsequent call.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.cursor.eat_while(|b| b.is_ascii_whitespace());

        let Some(byte) = self.cursor.peek() else {
            return Ok(Token::eof());
        };

        if byte.is_ascii_alphabetic() {
            return Ok(self.lex_word());
        }
        if byte.is_ascii_digit() {
            return Ok(self.lex_number());
        }

        // Two-character operators take priority over their one-character
        // prefixes.
        if self.cursor.peek_second() == Some(b'=') {
            let kind = match byte {
                b'=' => Some(TokenKind::EqEq),
                b'!' => Some(TokenKind::NotEq),
                b'<' => Some(TokenKind::LtEq),
                b'>' => Some(TokenKind::GtEq),
                _ => None,
            };
            if let Some(kind) = kind {
                let start = self.cursor.position();
                self.cursor.advance();
                self.cursor.advance();
                let lexeme = Symbol::intern(self.cursor.slice_from(start));
                return Ok(Token::new(kind, lexeme));
            }
        }

        let kind = match byte {
            b'+' => TokenKind::Plus,
            b'-' => TokenKind::Minus,
            b'*' => TokenKind::Star,
            b'/' => TokenKind::Slash,
            b'(' => TokenKind::LParen,
            b')' => TokenKind::RParen,
            b';' => TokenKind::Semicolon,
            b'=' => TokenKind::Assign,
            b'{' => TokenKind::LBrace,
            b'}' => TokenKind::RBrace,
            b',' => TokenKind::Comma,
            b'<' => TokenKind::Lt,
            b'>' => TokenKind::Gt,
            _ => return Err(LexError::UnexpectedByte { byte }),
        };

        let start = self.cursor.position();
        self.cursor.advance();
        Ok(Token::new(kind, Symbol::intern(self.cursor.slice_from(start))))
    }

    /// An alphabetic prefix followed by alphanumerics: keyword or identifier.
    fn lex_word(&mut self) -> Token {
        let start = self.cursor.position();
        self.cursor.eat_while(|b| b.is_ascii_alphanumeric());
        let text = self.cursor.slice_from(start);

        let kind = match text {
            "int" => TokenKind::Int,
            "return" => TokenKind::Return,
            "if" => TokenKind::If,
            "else" => TokenKind::Else,
            "while" => TokenKind::While,
            _ => TokenKind::Ident,
        };
        Token::new(kind, Symbol::intern(text))
    }

    /// A run of decimal digits. Negative literals do not exist; `-` is
    /// always a separate token.
    fn lex_number(&mut self) -> Token {
        let start = self.cursor.position();
        self.cursor.eat_while(|b| b.is_ascii_digit());
        Token::new(TokenKind::Number, Symbol::intern(self.cursor.slice_from(start)))
    }
}

/// A lexer wrapper with one token of buffered lookahead.
///
/// `peek` never advances the lexer past the peeked token, which is what the
/// parser's statement-position disambiguation (`IDENT` then `=`?) relies on.
pub struct TokenStream<'src> {
    lexer: Lexer<'src>,
    peeked: Option<Token>,
}

impl<'src> TokenStream<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            lexer: Lexer::new(source),
            peeked: None,
        }
    }

    /// Look at the next token without consuming it.
    pub fn peek(&mut self) -> Result<Token, LexError> {
        if let Some(token) = self.peeked {
            return Ok(token);
        }
        let token = self.lexer.next_token()?;
        self.peeked = Some(token);
        Ok(token)
    }

    /// Consume and return the next token.
    pub fn next(&mut self) -> Result<Token, LexError> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.lexer.next_token(),
        }
    }
}

/// Collect every token of `source` up to and including EOF.
///
/// Used by the driver's token dump; the parser pulls tokens lazily instead.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token.kind == TokenKind::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_a_minimal_function() {
        assert_eq!(
            kinds("int main() { return 42; }"),
            vec![
                TokenKind::Int,
                TokenKind::Ident,
                TokenKind::LParen,
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::Return,
                TokenKind::Number,
                TokenKind::Semicolon,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn keywords_are_distinguished_from_identifiers() {
        let tokens = tokenize("int intx while whiley if iff else return").unwrap();
        let expected = [
            TokenKind::Int,
            TokenKind::Ident,
            TokenKind::While,
            TokenKind::Ident,
            TokenKind::If,
            TokenKind::Ident,
            TokenKind::Else,
            TokenKind::Return,
            TokenKind::Eof,
        ];
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            expected
        );
        assert_eq!(tokens[1].lexeme_str(), "intx");
    }

    #[test]
    fn two_char_operators_win_over_prefixes() {
        assert_eq!(
            kinds("== = != < <= > >="),
            vec![
                TokenKind::EqEq,
                TokenKind::Assign,
                TokenKind::NotEq,
                TokenKind::Lt,
                TokenKind::LtEq,
                TokenKind::Gt,
                TokenKind::GtEq,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn number_lexeme_preserves_digits() {
        let tokens = tokenize("007").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].lexeme_str(), "007");
    }

    #[test]
    fn eof_is_sticky() {
        let mut lexer = Lexer::new("x");
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Ident);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn rejects_bytes_outside_the_alphabet() {
        let mut lexer = Lexer::new("int x @ 1;");
        for _ in 0..2 {
            lexer.next_token().unwrap();
        }
        assert_eq!(
            lexer.next_token(),
            Err(LexError::UnexpectedByte { byte: b'@' })
        );
    }

    #[test]
    fn bang_without_equals_is_rejected() {
        let mut lexer = Lexer::new("!x");
        assert_eq!(
            lexer.next_token(),
            Err(LexError::UnexpectedByte { byte: b'!' })
        );
    }

    #[test]
    fn token_stream_peek_is_not_destructive() {
        let mut stream = TokenStream::new("x = 1;");
        assert_eq!(stream.peek().unwrap().kind, TokenKind::Ident);
        assert_eq!(stream.peek().unwrap().kind, TokenKind::Ident);
        assert_eq!(stream.next().unwrap().kind, TokenKind::Ident);
        assert_eq!(stream.peek().unwrap().kind, TokenKind::Assign);
        assert_eq!(stream.next().unwrap().kind, TokenKind::Assign);
        assert_eq!(stream.next().unwrap().kind, TokenKind::Number);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Totality: every input either tokenizes or fails with a
            /// `LexError`; success always ends in exactly one EOF.
            #[test]
            fn lexing_is_total(source in ".*") {
                match tokenize(&source) {
                    Ok(tokens) => {
                        prop_assert!(!tokens.is_empty());
                        prop_assert_eq!(tokens.last().unwrap().kind, TokenKind::Eof);
                        prop_assert!(tokens[..tokens.len() - 1]
                            .iter()
                            .all(|t| t.kind != TokenKind::Eof));
                    }
                    Err(LexError::UnexpectedByte { .. }) => {}
                }
            }

            /// Joining lexemes with spaces yields a tokenization-equivalent
            /// source.
            #[test]
            fn lexeme_concatenation_round_trips(source in "[a-z0-9+*/(){};,=<>! -]{0,64}") {
                if let Ok(tokens) = tokenize(&source) {
                    let rejoined = tokens[..tokens.len() - 1]
                        .iter()
                        .map(Token::lexeme_str)
                        .collect::<Vec<_>>()
                        .join(" ");
                    let again = tokenize(&rejoined).unwrap();
                    prop_assert_eq!(tokens, again);
                }
            }
        }
    }
}
