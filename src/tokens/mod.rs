//! Lexical tokens and the validated token stream.

pub mod stream;
pub mod token;

pub use stream::TokenStream;
pub use token::{RawToken, Token, TokenKind};
