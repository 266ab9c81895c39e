//! Lexical analysis for Valang rule text
//!
//! Turns a rule source string into a [`TokenStream`]. Limits come from the
//! compile-time configuration; everything else is a runtime preference.

pub mod analyzer;

use crate::config::runtime::LexicalPreferences;
use crate::tokens::TokenStream;

pub use analyzer::{LexerError, LexerResult, LexicalAnalyzer, LexicalMetrics};

/// Tokenize with default preferences
pub fn tokenize(source: &str) -> LexerResult<TokenStream> {
    LexicalAnalyzer::new().tokenize(source)
}

/// Tokenize with custom runtime preferences (limits remain compile-time)
pub fn tokenize_with_preferences(
    source: &str,
    preferences: LexicalPreferences,
) -> LexerResult<TokenStream> {
    LexicalAnalyzer::with_preferences(preferences).tokenize(source)
}

/// Check that every lexical error code is registered with metadata
pub fn init_lexical_analysis_logging() -> Result<(), String> {
    let lexical_codes = [
        crate::logging::codes::lexical::INVALID_CHARACTER,
        crate::logging::codes::lexical::UNTERMINATED_STRING,
        crate::logging::codes::lexical::INVALID_NUMBER,
        crate::logging::codes::lexical::IDENTIFIER_TOO_LONG,
        crate::logging::codes::lexical::STRING_TOO_LARGE,
        crate::logging::codes::lexical::UNTERMINATED_BRACKET,
        crate::logging::codes::lexical::TOKEN_LIMIT_EXCEEDED,
        crate::logging::codes::lexical::SOURCE_TOO_LARGE,
    ];

    for code in &lexical_codes {
        if crate::logging::codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Lexical error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::service::create_test_logger;
    use crate::tokens::Token;

    #[test]
    fn test_lexical_codes_registered() {
        assert!(init_lexical_analysis_logging().is_ok());
    }

    #[test]
    fn test_tokenize_ends_with_eof() {
        let stream = tokenize("{a : a is null : 'x'}").unwrap();
        assert!(stream.has_eof());
        assert_eq!(stream.iter_significant().last().map(|t| &t.value), Some(&Token::Eof));
    }

    #[test]
    fn test_failure_is_logged_to_service() {
        let (service, memory) = create_test_logger();
        let error = tokenize("{a : a = ~}").unwrap_err();
        service.log_error(error.error_code(), &error.to_string());
        assert!(memory.has_error_with_code(crate::logging::codes::lexical::INVALID_CHARACTER));
    }
}
