//! Error message lookup for translated rules
//!
//! Messages are resolved once, when the validator is generated. The client
//! never sees message keys.

use crate::codegen::error::{TranslationError, TranslationResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub trait MessageSource {
    fn message(&self, key: &str) -> Option<String>;

    fn message_or(&self, key: &str, default: &str) -> String {
        self.message(key).unwrap_or_else(|| default.to_string())
    }
}

/// Source that knows no keys; every rule keeps its default message
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMessages;

impl MessageSource for NoMessages {
    fn message(&self, _key: &str) -> Option<String> {
        None
    }
}

/// Fixed key to message map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticMessageSource {
    messages: BTreeMap<String, String>,
}

impl StaticMessageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, message: impl Into<String>) -> Self {
        self.insert(key, message);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, message: impl Into<String>) {
        self.messages.insert(key.into(), message.into());
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Load from TOML; nested tables become dotted keys
    ///
    /// ```toml
    /// required = "This field is required"
    ///
    /// [age]
    /// range = "Age must be between 0 and 120"
    /// ```
    pub fn from_toml(text: &str) -> TranslationResult<Self> {
        Self::parse_toml(text, "inline TOML")
    }

    pub fn from_file(path: &Path) -> TranslationResult<Self> {
        let origin = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|e| TranslationError::Messages {
            origin: origin.clone(),
            reason: e.to_string(),
        })?;
        Self::parse_toml(&text, &origin)
    }

    fn parse_toml(text: &str, origin: &str) -> TranslationResult<Self> {
        let failed = |reason: String| TranslationError::Messages {
            origin: origin.to_string(),
            reason,
        };

        let table: toml::Table = text.parse().map_err(|e: toml::de::Error| failed(e.to_string()))?;
        let mut source = Self::new();
        flatten("", &table, &mut source.messages).map_err(failed)?;
        Ok(source)
    }
}

fn flatten(
    prefix: &str,
    table: &toml::Table,
    out: &mut BTreeMap<String, String>,
) -> Result<(), String> {
    for (key, value) in table {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match value {
            toml::Value::String(message) => {
                out.insert(full_key, message.clone());
            }
            toml::Value::Table(nested) => flatten(&full_key, nested, out)?,
            other => {
                return Err(format!(
                    "message '{}' must be a string, found {}",
                    full_key,
                    other.type_str()
                ))
            }
        }
    }
    Ok(())
}

impl MessageSource for StaticMessageSource {
    fn message(&self, key: &str) -> Option<String> {
        self.messages.get(key).cloned()
    }
}
