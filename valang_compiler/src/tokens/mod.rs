//! Token system for Valang rule text
//!
//! The lexer produces [`SpannedToken`]s; the parser consumes them through a
//! [`TokenStream`] that hides whitespace while keeping source spans intact.

pub mod token;
pub mod token_stream;

pub use token::{classify_symbol, classify_word, Token, TokenClass};
pub use token_stream::{SpannedToken, TokenStream, TokenStreamError};

pub use crate::utils::{Position, Span, Spanned};
