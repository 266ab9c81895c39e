//! Shared primitives for the Valang lexer, parser and evaluator

pub mod span;

pub use span::{Position, SourceMap, Span, Spanned};
