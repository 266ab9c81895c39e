use valang_compiler::dates::DateParseError;
use valang_compiler::logging::{codes, Code};

pub type EvaluationResult<T> = Result<T, EvaluationError>;

/// Failures while evaluating a rule against a target
///
/// These indicate a mismatch between the rule and the target, not a failed
/// validation, and are propagated to the caller of the validator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvaluationError {
    #[error("Division by zero in '{expression}'")]
    DivisionByZero { expression: String },

    #[error("Property '{path}' not found: no field '{segment}'")]
    PropertyNotFound { path: String, segment: String },

    #[error("Property '{path}' has a null value before '{segment}'")]
    NullIntermediate { path: String, segment: String },

    #[error("Index {index} out of range for '{path}' with {len} elements")]
    IndexOutOfRange {
        path: String,
        index: usize,
        len: usize,
    },

    #[error("Property '{path}' uses the default index but none was supplied")]
    NoDefaultIndex { path: String },

    #[error("Enum type '{type_name}' is not registered")]
    UnknownEnumType { type_name: String },

    #[error("'{member}' is not a member of enum type '{type_name}'")]
    UnknownEnumMember { type_name: String, member: String },

    #[error("The {operator} operator cannot compare {left} with {right}")]
    IncomparableOperands {
        operator: String,
        left: String,
        right: String,
    },

    #[error("Invalid operand for {context}: {reason}")]
    InvalidOperand { context: String, reason: String },

    #[error("Custom function '{name}' failed: {reason}")]
    CustomFunctionFailed { name: String, reason: String },

    #[error("Invalid date expression '{expression}': {source}")]
    Date {
        expression: String,
        #[source]
        source: DateParseError,
    },

    #[error("{limit} exceeded: {actual} (max {max})")]
    LimitExceeded {
        limit: String,
        actual: usize,
        max: usize,
    },
}

impl EvaluationError {
    pub fn invalid_operand(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOperand {
            context: context.into(),
            reason: reason.into(),
        }
    }

    pub fn error_code(&self) -> Code {
        match self {
            Self::DivisionByZero { .. } => codes::evaluation::DIVISION_BY_ZERO,
            Self::PropertyNotFound { .. } => codes::evaluation::PROPERTY_NOT_FOUND,
            Self::NullIntermediate { .. } => codes::evaluation::NULL_INTERMEDIATE,
            Self::IndexOutOfRange { .. } => codes::evaluation::INDEX_OUT_OF_RANGE,
            Self::NoDefaultIndex { .. } => codes::evaluation::NO_DEFAULT_INDEX,
            Self::UnknownEnumType { .. } => codes::evaluation::UNKNOWN_ENUM_TYPE,
            Self::UnknownEnumMember { .. } => codes::evaluation::UNKNOWN_ENUM_MEMBER,
            Self::IncomparableOperands { .. } => codes::evaluation::INCOMPARABLE_OPERANDS,
            Self::InvalidOperand { .. } => codes::evaluation::INVALID_OPERAND,
            Self::CustomFunctionFailed { .. } => codes::evaluation::CUSTOM_FUNCTION_FAILED,
            Self::Date { source, .. } => source.error_code(),
            Self::LimitExceeded { .. } => codes::evaluation::LIMIT_EXCEEDED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_registered() {
        let errors = [
            EvaluationError::DivisionByZero {
                expression: "(a / 0)".into(),
            },
            EvaluationError::NoDefaultIndex {
                path: "rows[].qty".into(),
            },
            EvaluationError::invalid_operand("length", "null value"),
        ];

        for error in &errors {
            let code = error.error_code();
            assert!(codes::get_error_metadata(code.as_str()).is_some());
        }
        assert_eq!(errors[0].error_code(), codes::evaluation::DIVISION_BY_ZERO);
        assert!(errors[2].to_string().contains("null value"));
    }
}
