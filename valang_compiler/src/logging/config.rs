//! Logging configuration: compile-time limits plus runtime preferences
//!
//! The compile-time `SECURITY_MIN_LOG_LEVEL` is a floor: a user preference can
//! make logging more verbose but never quieter than that level.

use crate::config::compile_time::logging::{
    LOG_BUFFER_SIZE, MAX_LOG_MESSAGE_LENGTH, SECURITY_MIN_LOG_LEVEL,
};
use crate::config::runtime::LoggingPreferences;
use crate::logging::events::LogLevel;
use std::sync::OnceLock;

static RUNTIME_PREFERENCES: OnceLock<LoggingPreferences> = OnceLock::new();

/// Install logging preferences for the process. Only the first call wins.
pub fn init_runtime_preferences(preferences: LoggingPreferences) -> Result<(), String> {
    RUNTIME_PREFERENCES
        .set(preferences)
        .map_err(|_| "Runtime preferences already initialized".to_string())
}

fn get_runtime_preferences() -> LoggingPreferences {
    RUNTIME_PREFERENCES.get().cloned().unwrap_or_default()
}

fn floor_level() -> LogLevel {
    match SECURITY_MIN_LOG_LEVEL {
        0 => LogLevel::Error,
        1 => LogLevel::Warning,
        _ => LogLevel::Info,
    }
}

/// Effective minimum level: the user preference, raised to the compile-time floor
pub fn get_min_log_level() -> LogLevel {
    let user_level = get_runtime_preferences().min_log_level.to_events_log_level();
    user_level.max(floor_level())
}

pub fn use_structured_logging() -> bool {
    get_runtime_preferences().use_structured_logging
}

pub fn console_logging_enabled() -> bool {
    get_runtime_preferences().enable_console_logging
}

pub fn get_log_buffer_size() -> usize {
    LOG_BUFFER_SIZE
}

pub fn validate_config() -> Result<(), String> {
    if LOG_BUFFER_SIZE == 0 {
        return Err("LOG_BUFFER_SIZE must be greater than zero".to_string());
    }
    if MAX_LOG_MESSAGE_LENGTH < 16 {
        return Err(format!(
            "MAX_LOG_MESSAGE_LENGTH of {} is too small to be useful",
            MAX_LOG_MESSAGE_LENGTH
        ));
    }
    Ok(())
}

pub fn get_config_summary() -> String {
    let preferences = get_runtime_preferences();
    format!(
        "=== Logging Configuration ===\n\
         Profile: {}\n\
         Min level: {} (floor {})\n\
         Structured: {}\n\
         Console: {}\n\
         Buffer size: {}\n\
         Max message length: {}\n",
        crate::config::build_info::profile(),
        get_min_log_level().as_str(),
        floor_level().as_str(),
        preferences.use_structured_logging,
        preferences.enable_console_logging,
        LOG_BUFFER_SIZE,
        MAX_LOG_MESSAGE_LENGTH,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_level_respects_floor() {
        assert!(get_min_log_level() >= floor_level());
    }

    #[test]
    fn test_config_is_valid() {
        assert!(validate_config().is_ok());
    }

    #[test]
    fn test_summary_mentions_limits() {
        let summary = get_config_summary();
        assert!(summary.contains("Buffer size"));
        assert!(summary.contains("Min level"));
    }
}
