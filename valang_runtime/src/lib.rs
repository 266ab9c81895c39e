//! # Valang runtime
//!
//! Evaluates rules compiled by `valang_compiler` against runtime targets and
//! reports failures through an error sink.
//!
//! ```ignore
//! use valang_runtime::prelude::*;
//!
//! let validator = ValangValidator::from_source("{ age : age <= 120 : 'too old' }")?;
//! let errors = validator.collect(&Value::map([("age", Value::from(150))]))?;
//! assert!(errors.has_field_error("age"));
//! ```

pub mod execution;
pub mod resolution;
pub mod types;
pub mod validator;

pub use execution::{EvaluationContext, EvaluationError, EvaluationResult};
pub use types::{EnumRegistry, EnumValue, Value};
pub use validator::{BindingErrors, ErrorSink, FieldError, ValangValidator};

pub mod prelude {
    pub use crate::execution::{
        evaluate, evaluate_predicate, CustomFunction, EvaluationContext, EvaluationError,
        EvaluationResult,
    };
    pub use crate::types::{EnumRegistry, EnumValue, Value};
    pub use crate::validator::{
        check_rule, format_message, BindingErrors, ErrorSink, FieldError, RuleOutcome,
        ValangValidator,
    };
}
