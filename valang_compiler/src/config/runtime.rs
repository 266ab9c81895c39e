// RUNTIME PREFERENCES
//
// Compile-time limits live in the generated `compile_time` module. Everything
// here is a user preference that can be changed per process through VALANG_*
// environment variables.

use serde::{Deserialize, Serialize};
use std::env;

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexicalPreferences {
    /// Whether to collect per-kind token counts during tokenization
    pub collect_detailed_metrics: bool,

    /// Whether to attach line/column context to lexer log events
    pub include_position_in_errors: bool,
}

impl Default for LexicalPreferences {
    fn default() -> Self {
        Self {
            collect_detailed_metrics: env_parse(env_vars::LEXICAL_DETAILED_METRICS)
                .unwrap_or(true),
            include_position_in_errors: env_parse(env_vars::LEXICAL_INCLUDE_POSITIONS)
                .unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserPreferences {
    /// Whether to emit a debug event for every constructed rule
    pub log_rule_details: bool,

    /// Whether an empty rule source is accepted (yields no rules)
    pub allow_empty_source: bool,
}

impl Default for ParserPreferences {
    fn default() -> Self {
        Self {
            log_rule_details: env_parse(env_vars::PARSER_LOG_RULES).unwrap_or(false),
            allow_empty_source: env_parse(env_vars::PARSER_ALLOW_EMPTY).unwrap_or(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationPreferences {
    /// Name given to the generated client-side validator
    pub validator_name: String,

    /// Whether the generated validator installs itself on the form
    pub install_self_with_form: bool,
}

impl Default for TranslationPreferences {
    fn default() -> Self {
        Self {
            validator_name: env::var(env_vars::TRANSLATION_VALIDATOR_NAME)
                .unwrap_or_else(|_| "validator".to_string()),
            install_self_with_form: env_parse(env_vars::TRANSLATION_INSTALL_WITH_FORM)
                .unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationPreferences {
    /// Whether a string operand is parsed as a date when ordered against a date
    pub coerce_strings_to_dates: bool,

    /// Whether the validator logs each rejected rule
    pub log_rejections: bool,
}

impl Default for EvaluationPreferences {
    fn default() -> Self {
        Self {
            coerce_strings_to_dates: env_parse(env_vars::EVALUATION_COERCE_DATES)
                .unwrap_or(true),
            log_rejections: env_parse(env_vars::EVALUATION_LOG_REJECTIONS).unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingPreferences {
    /// Whether to write JSON lines instead of plain text
    pub use_structured_logging: bool,

    /// Whether events are written to stderr at all
    pub enable_console_logging: bool,

    /// Events below this level are dropped
    pub min_log_level: LogLevel,
}

impl Default for LoggingPreferences {
    fn default() -> Self {
        Self {
            use_structured_logging: env_parse(env_vars::LOGGING_USE_STRUCTURED).unwrap_or(false),
            enable_console_logging: env_parse(env_vars::LOGGING_ENABLE_CONSOLE).unwrap_or(true),
            min_log_level: env::var(env_vars::LOGGING_MIN_LEVEL)
                .ok()
                .and_then(|v| parse_log_level(&v))
                .unwrap_or(LogLevel::Warning),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Error = 0,
    Warning = 1,
    Info = 2,
    Debug = 3,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warning => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    pub fn to_events_log_level(self) -> crate::logging::events::LogLevel {
        match self {
            LogLevel::Error => crate::logging::events::LogLevel::Error,
            LogLevel::Warning => crate::logging::events::LogLevel::Warning,
            LogLevel::Info => crate::logging::events::LogLevel::Info,
            LogLevel::Debug => crate::logging::events::LogLevel::Debug,
        }
    }
}

fn parse_log_level(level: &str) -> Option<LogLevel> {
    match level.trim().to_lowercase().as_str() {
        "error" | "0" => Some(LogLevel::Error),
        "warning" | "warn" | "1" => Some(LogLevel::Warning),
        "info" | "2" => Some(LogLevel::Info),
        "debug" | "3" => Some(LogLevel::Debug),
        _ => None,
    }
}

/// All runtime preferences in one place
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub lexical: LexicalPreferences,
    pub parser: ParserPreferences,
    pub translation: TranslationPreferences,
    pub evaluation: EvaluationPreferences,
    pub logging: LoggingPreferences,
}

/// Environment variable names for configuration
pub mod env_vars {
    // Lexical
    pub const LEXICAL_DETAILED_METRICS: &str = "VALANG_LEXICAL_DETAILED_METRICS";
    pub const LEXICAL_INCLUDE_POSITIONS: &str = "VALANG_LEXICAL_INCLUDE_POSITIONS";

    // Parser
    pub const PARSER_LOG_RULES: &str = "VALANG_PARSER_LOG_RULES";
    pub const PARSER_ALLOW_EMPTY: &str = "VALANG_PARSER_ALLOW_EMPTY";

    // Translation
    pub const TRANSLATION_VALIDATOR_NAME: &str = "VALANG_TRANSLATION_VALIDATOR_NAME";
    pub const TRANSLATION_INSTALL_WITH_FORM: &str = "VALANG_TRANSLATION_INSTALL_WITH_FORM";

    // Evaluation
    pub const EVALUATION_COERCE_DATES: &str = "VALANG_EVALUATION_COERCE_DATES";
    pub const EVALUATION_LOG_REJECTIONS: &str = "VALANG_EVALUATION_LOG_REJECTIONS";

    // Logging
    pub const LOGGING_USE_STRUCTURED: &str = "VALANG_LOGGING_USE_STRUCTURED";
    pub const LOGGING_ENABLE_CONSOLE: &str = "VALANG_LOGGING_ENABLE_CONSOLE";
    pub const LOGGING_MIN_LEVEL: &str = "VALANG_LOGGING_MIN_LEVEL";
}
