//! Date expressions used in `[...]` literals
//!
//! Rule text carries the raw expression; it is checked here when rules are
//! compiled and resolved again at evaluation time so relative dates follow
//! the clock.

pub mod error;
pub mod modifiers;
pub mod parser;

use std::sync::OnceLock;

pub use error::{DateParseError, DateResult};
pub use modifiers::TimeUnit;
pub use parser::{DateModifier, DateParser};

/// Process-wide parser with the default pattern table
pub fn shared() -> &'static DateParser {
    static PARSER: OnceLock<DateParser> = OnceLock::new();
    PARSER.get_or_init(DateParser::with_default_patterns)
}

/// Check that every date error code is registered with metadata
pub fn init_date_logging() -> Result<(), String> {
    let date_codes = [
        crate::logging::codes::dates::EMPTY_EXPRESSION,
        crate::logging::codes::dates::NO_PATTERN_MATCHED,
        crate::logging::codes::dates::UNCONSUMED_INPUT,
        crate::logging::codes::dates::OUT_OF_RANGE,
        crate::logging::codes::dates::DUPLICATE_PATTERN,
        crate::logging::codes::dates::EXPRESSION_TOO_LONG,
    ];

    for code in &date_codes {
        if crate::logging::codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Date error code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_parser_has_defaults() {
        assert_eq!(shared().pattern_count(), DateParser::default().pattern_count());
        assert!(shared().parse("2008-01-01").is_ok());
    }

    #[test]
    fn test_date_codes_registered() {
        assert!(init_date_logging().is_ok());
    }
}
