//! Global logging for the Valang compiler and runtime
//!
//! A single `LoggingService` is installed per process. Until then every
//! logging macro is a silent no-op, so library callers that never initialise
//! logging pay nothing for it.

pub mod codes;
pub mod config;
pub mod events;
pub mod macros;
pub mod service;

use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

pub use codes::Code;
pub use events::{LogEvent, LogLevel};
pub use service::{
    ConsoleLogger, EventSummary, Logger, LoggingService, MemoryLogger, MultiLogger,
    StructuredLogger,
};

static GLOBAL_LOGGER: OnceLock<Arc<LoggingService>> = OnceLock::new();

thread_local! {
    static SOURCE_CONTEXT: RefCell<Option<String>> = const { RefCell::new(None) };
}

// ============================================================================
// INITIALIZATION
// ============================================================================

/// Install the configured logging service
pub fn init_global_logging() -> Result<(), String> {
    config::validate_config().map_err(|e| format!("Configuration validation failed: {}", e))?;

    let service = Arc::new(service::create_configured_service());
    GLOBAL_LOGGER
        .set(service.clone())
        .map_err(|_| "Global logger already initialized".to_string())?;

    service.log_event(LogEvent::success(
        codes::success::SYSTEM_INITIALIZATION_COMPLETED,
        "Global logging system initialized",
    ));

    Ok(())
}

/// Install a caller-built service (tests, embedding hosts)
pub fn init_global_logging_with_service(service: Arc<LoggingService>) -> Result<(), String> {
    GLOBAL_LOGGER
        .set(service)
        .map_err(|_| "Global logger already initialized".to_string())
}

pub fn is_initialized() -> bool {
    GLOBAL_LOGGER.get().is_some()
}

pub fn try_get_global_logger() -> Option<&'static LoggingService> {
    GLOBAL_LOGGER.get().map(|service| service.as_ref())
}

// ============================================================================
// SOURCE CONTEXT
// ============================================================================

/// Name the rule source being processed on this thread; attached to every event
pub fn set_source_context(name: impl Into<String>) {
    SOURCE_CONTEXT.with(|ctx| *ctx.borrow_mut() = Some(name.into()));
}

pub fn clear_source_context() {
    SOURCE_CONTEXT.with(|ctx| *ctx.borrow_mut() = None);
}

pub fn current_source_context() -> Option<String> {
    SOURCE_CONTEXT.with(|ctx| ctx.borrow().clone())
}

/// Run `f` with `name` as the source context
pub fn with_source_context<R>(name: impl Into<String>, f: impl FnOnce() -> R) -> R {
    let previous = current_source_context();
    set_source_context(name);
    let result = f();
    match previous {
        Some(name) => set_source_context(name),
        None => clear_source_context(),
    }
    result
}

// ============================================================================
// MACRO SUPPORT
// ============================================================================

/// Attach source context and hand the event to the global logger
pub fn dispatch(event: LogEvent) {
    if let Some(logger) = try_get_global_logger() {
        let event = match current_source_context() {
            Some(source) => event.with_context("source", &source),
            None => event,
        };
        logger.log_event(event);
    }
}

pub fn debug_enabled() -> bool {
    try_get_global_logger()
        .map(|logger| logger.should_log(LogLevel::Debug))
        .unwrap_or(false)
}

fn with_pairs(mut event: LogEvent, context: Vec<(&str, String)>) -> LogEvent {
    for (key, value) in context {
        event = event.with_context(key, &value);
    }
    event
}

pub fn log_error_with_context(
    code: Code,
    message: &str,
    span: Option<crate::utils::Span>,
    context: Vec<(&str, String)>,
) {
    let mut event = with_pairs(LogEvent::error(code, message), context);
    if let Some(span) = span {
        event = event.with_span(span);
    }
    dispatch(event);
}

pub fn log_warning_with_context(code: Code, message: &str, context: Vec<(&str, String)>) {
    dispatch(with_pairs(LogEvent::warning_with_code(code, message), context));
}

pub fn log_success_with_context(code: Code, message: &str, context: Vec<(&str, String)>) {
    dispatch(with_pairs(LogEvent::success(code, message), context));
}

pub fn log_info_with_context(message: &str, context: Vec<(&str, String)>) {
    dispatch(with_pairs(LogEvent::info(message), context));
}

/// Error logging that falls back to stderr when no logger is installed
pub fn safe_log_error(code: Code, message: &str) {
    match try_get_global_logger() {
        Some(logger) => logger.log_event(LogEvent::error(code, message)),
        None => eprintln!("[ERROR] {} - {}", code, message),
    }
}
