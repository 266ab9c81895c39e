//! Errors raised while building AST nodes from well-formed syntax

use crate::logging::{codes, Code};
use crate::utils::Span;

pub type ConstructionResult<T> = Result<T, ConstructionError>;

/// Syntax was valid but the node it describes cannot exist
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConstructionError {
    #[error("Unknown function '{name}' at {}", .span.start)]
    UnknownFunction { name: String, span: Span },

    #[error("Function '{name}' expects {expected} argument(s), found {found} at {}", .span.start)]
    WrongArity {
        name: String,
        expected: String,
        found: usize,
        span: Span,
    },

    #[error("Invalid enum literal ['{text}'] at {}", .span.start)]
    InvalidEnumLiteral { text: String, span: Span },

    #[error("Invalid date literal [{text}]: {reason}")]
    InvalidDateLiteral {
        text: String,
        reason: String,
        span: Span,
    },

    #[error("Invalid property path '{text}' at {}", .span.start)]
    InvalidPath { text: String, span: Span },

    #[error("Invalid number literal '{text}' at {}", .span.start)]
    InvalidNumber { text: String, span: Span },

    #[error("Invalid regular expression '{pattern}': {reason}")]
    InvalidRegex {
        pattern: String,
        reason: String,
        span: Span,
    },

    #[error("Function '{name}' is already registered")]
    DuplicateFunction { name: String },
}

impl ConstructionError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::UnknownFunction { .. } => codes::construction::UNKNOWN_FUNCTION,
            Self::WrongArity { .. } => codes::construction::WRONG_ARITY,
            Self::InvalidEnumLiteral { .. } => codes::construction::INVALID_ENUM_LITERAL,
            Self::InvalidDateLiteral { .. } => codes::construction::INVALID_DATE_LITERAL,
            Self::InvalidPath { .. } => codes::construction::INVALID_PATH,
            Self::InvalidNumber { .. } => codes::lexical::INVALID_NUMBER,
            Self::InvalidRegex { .. } => codes::construction::INVALID_REGEX,
            Self::DuplicateFunction { .. } => codes::construction::DUPLICATE_FUNCTION,
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::UnknownFunction { span, .. }
            | Self::WrongArity { span, .. }
            | Self::InvalidEnumLiteral { span, .. }
            | Self::InvalidDateLiteral { span, .. }
            | Self::InvalidPath { span, .. }
            | Self::InvalidNumber { span, .. }
            | Self::InvalidRegex { span, .. } => Some(*span),
            Self::DuplicateFunction { .. } => None,
        }
    }
}
