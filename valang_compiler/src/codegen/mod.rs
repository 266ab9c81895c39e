//! Client-side code generation
//!
//! Translates compiled rules into a JavaScript validator expression so the
//! same checks can run in the browser before a form is submitted.

pub mod error;
pub mod javascript;
pub mod messages;

pub use error::{TranslationError, TranslationResult};
pub use javascript::{js_string, operator_function, JavaScriptTranslator};
pub use messages::{MessageSource, NoMessages, StaticMessageSource};

use crate::config::runtime::TranslationPreferences;
use crate::functions::FunctionRegistry;
use crate::grammar::ast::nodes::ValidationRule;
use crate::logging::codes;

/// Translate with default preferences
pub fn translate(
    rules: &[ValidationRule],
    functions: &FunctionRegistry,
    messages: &dyn MessageSource,
) -> TranslationResult<String> {
    JavaScriptTranslator::new(functions).translate(rules, messages)
}

pub fn translate_with_preferences(
    rules: &[ValidationRule],
    functions: &FunctionRegistry,
    messages: &dyn MessageSource,
    preferences: TranslationPreferences,
) -> TranslationResult<String> {
    JavaScriptTranslator::new(functions)
        .with_preferences(preferences)
        .translate(rules, messages)
}

/// Check that every translation code is registered with metadata
pub fn init_translation_logging() -> Result<(), String> {
    let translation_codes = [
        codes::translation::WRITE_FAILED,
        codes::translation::UNSUPPORTED_FUNCTION,
        codes::translation::UNTRANSLATED_ARGUMENTS,
    ];

    for code in &translation_codes {
        if codes::get_error_metadata(code.as_str()).is_none() {
            return Err(format!(
                "Translation code {} not found in metadata registry",
                code.as_str()
            ));
        }
    }
    Ok(())
}
