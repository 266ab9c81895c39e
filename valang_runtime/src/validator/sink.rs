//! Error sinks
//!
//! The host framework receives failed rules through [`ErrorSink`]. Hosts
//! without a binding framework of their own can collect into
//! [`BindingErrors`].

use serde::Serialize;

/// Receiver of validation failures, called once per failing rule
pub trait ErrorSink {
    /// A rule bound to `field` failed
    fn reject_field(&mut self, field: &str, message: &str, code: &str);

    /// A rule keyed on the target itself failed
    fn reject_global(&mut self, message: &str, code: &str);
}

/// One reported failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// `None` for global errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub code: String,
    pub message: String,
}

impl FieldError {
    pub fn is_global(&self) -> bool {
        self.field.is_none()
    }
}

/// Errors collected in reporting order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BindingErrors {
    errors: Vec<FieldError>,
}

impl BindingErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn field_errors<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldError> {
        self.errors
            .iter()
            .filter(move |error| error.field.as_deref() == Some(field))
    }

    pub fn global_errors(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter().filter(|error| error.is_global())
    }

    pub fn has_field_error(&self, field: &str) -> bool {
        self.field_errors(field).next().is_some()
    }
}

impl ErrorSink for BindingErrors {
    fn reject_field(&mut self, field: &str, message: &str, code: &str) {
        self.errors.push(FieldError {
            field: Some(field.to_string()),
            code: code.to_string(),
            message: message.to_string(),
        });
    }

    fn reject_global(&mut self, message: &str, code: &str) {
        self.errors.push(FieldError {
            field: None,
            code: code.to_string(),
            message: message.to_string(),
        });
    }
}

impl IntoIterator for BindingErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_and_global_errors() {
        let mut errors = BindingErrors::new();
        assert!(!errors.has_errors());

        errors.reject_field("age", "too old", "age");
        errors.reject_global("names must differ", "names.differ");

        assert_eq!(errors.len(), 2);
        assert!(errors.has_field_error("age"));
        assert!(!errors.has_field_error("name"));
        assert_eq!(errors.global_errors().count(), 1);
    }

    #[test]
    fn test_serializes_without_global_field() {
        let mut errors = BindingErrors::new();
        errors.reject_global("bad", "bad.code");

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "errors": [{ "code": "bad.code", "message": "bad" }] })
        );
    }
}
