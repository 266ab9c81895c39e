//! Errors raised while emitting client-side validators

use crate::dates::DateParseError;
use crate::logging::{codes, Code};
use std::fmt;

pub type TranslationResult<T> = Result<T, TranslationError>;

#[derive(Debug, thiserror::Error)]
pub enum TranslationError {
    #[error("Failed to write JavaScript output: {0}")]
    Write(#[from] fmt::Error),

    #[error("Cannot resolve date literal [{text}]: {source}")]
    Date {
        text: String,
        #[source]
        source: DateParseError,
    },

    #[error("Failed to load messages from {origin}: {reason}")]
    Messages { origin: String, reason: String },
}

impl TranslationError {
    pub fn error_code(&self) -> Code {
        match self {
            Self::Write(_) => codes::translation::WRITE_FAILED,
            Self::Date { source, .. } => source.error_code(),
            Self::Messages { .. } => codes::system::IO_ERROR,
        }
    }
}
