//! Date expression errors

use crate::config::compile_time::dates::*;
use crate::logging::{codes, Code};

pub type DateResult<T> = Result<T, DateParseError>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DateParseError {
    #[error("Date expression is empty")]
    EmptyExpression,

    #[error("Date expression too long: {length} characters (max {MAX_EXPRESSION_LENGTH})")]
    ExpressionTooLong { length: usize },

    #[error("Could not parse date string [{text}]")]
    NoPatternMatched { text: String },

    #[error("Could not parse date string [{text}]: '{remainder}' was not understood")]
    UnconsumedInput { text: String, remainder: String },

    #[error("Date [{text}] is outside the supported calendar range")]
    OutOfRange { text: String },

    #[error("Date expression [{text}] has more than {MAX_MODIFIER_STEPS} modifier steps")]
    TooManySteps { text: String },

    #[error("Date pattern '{pattern}' is already registered")]
    DuplicatePattern { pattern: String },

    #[error("Invalid date pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

impl DateParseError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::EmptyExpression => codes::dates::EMPTY_EXPRESSION,
            Self::ExpressionTooLong { .. } | Self::TooManySteps { .. } => {
                codes::dates::EXPRESSION_TOO_LONG
            }
            Self::NoPatternMatched { .. } => codes::dates::NO_PATTERN_MATCHED,
            Self::UnconsumedInput { .. } => codes::dates::UNCONSUMED_INPUT,
            Self::OutOfRange { .. } => codes::dates::OUT_OF_RANGE,
            Self::DuplicatePattern { .. } => codes::dates::DUPLICATE_PATTERN,
            Self::InvalidPattern { .. } => codes::construction::INVALID_REGEX,
        }
    }
}
