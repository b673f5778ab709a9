//! mcc-lex - Lexical analyzer.
//!
//! Transforms Mini-C source text into a stream of [`Token`]s on demand.
//! The lexer is a single left-to-right pass over the source bytes with one
//! byte of lookahead; it skips whitespace, recognizes the two-character
//! comparison operators before their one-character prefixes, and keeps
//! returning [`TokenKind::Eof`] once the input is exhausted.
//!
//! Parsers should consume tokens through [`TokenStream`], which adds the
//! single token of lookahead the grammar needs without ever advancing the
//! underlying lexer destructively.

mod cursor;
mod lexer;
mod token;

pub use lexer::{tokenize, Lexer, TokenStream};
pub use token::{Token, TokenKind};

use thiserror::Error;

/// Error produced when the source contains a byte no token rule covers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// A byte outside the language's alphabet.
    #[error("unexpected byte 0x{byte:02x}")]
    UnexpectedByte {
        /// The offending byte.
        byte: u8,
    },
}
