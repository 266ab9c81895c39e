//! # Validator adapter
//!
//! Applies a compiled rule set to one target and reports every failing rule
//! to an [`ErrorSink`]. A rule is reported at most once, however many of its
//! sub-conditions fail. Rules whose `where` guard is false are skipped.
//!
//! Evaluation errors are not validation failures: they mean the rules and the
//! target disagree about shape, and they stop the validation call.

pub mod messages;
pub mod sink;

pub use messages::format_message;
pub use sink::{BindingErrors, ErrorSink, FieldError};

use crate::execution::context::EvaluationContext;
use crate::execution::error::EvaluationResult;
use crate::execution::functions::evaluate;
use crate::execution::predicates::evaluate_predicate;
use crate::types::Value;
use valang_compiler::logging::codes;
use valang_compiler::{compile_with, CompileError, FunctionRegistry, ValidationRule};

/// Outcome of checking one rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    Passed,
    /// The `where` guard was false
    Skipped,
    Failed { message: String },
}

/// A compiled rule set with the context it is evaluated in
#[derive(Debug, Clone)]
pub struct ValangValidator {
    rules: Vec<ValidationRule>,
    context: EvaluationContext,
}

impl ValangValidator {
    pub fn new(rules: Vec<ValidationRule>) -> Self {
        Self {
            rules,
            context: EvaluationContext::new(),
        }
    }

    /// Compile rule source with the built-in functions only
    pub fn from_source(source: &str) -> Result<Self, CompileError> {
        Self::from_source_with(source, &FunctionRegistry::new())
    }

    pub fn from_source_with(
        source: &str,
        functions: &FunctionRegistry,
    ) -> Result<Self, CompileError> {
        compile_with(source, functions).map(Self::new)
    }

    pub fn with_context(mut self, context: EvaluationContext) -> Self {
        self.context = context;
        self
    }

    pub fn rules(&self) -> &[ValidationRule] {
        &self.rules
    }

    pub fn context(&self) -> &EvaluationContext {
        &self.context
    }

    /// Validate with this validator's own context
    pub fn validate(&self, target: &Value, sink: &mut dyn ErrorSink) -> EvaluationResult<()> {
        self.validate_with(target, &self.context, sink)
    }

    /// Validate with a per-call context, e.g. the current caller's roles
    pub fn validate_with(
        &self,
        target: &Value,
        context: &EvaluationContext,
        sink: &mut dyn ErrorSink,
    ) -> EvaluationResult<()> {
        let mut failed = 0usize;

        for rule in &self.rules {
            let outcome = check_rule(rule, target, context).inspect_err(|error| {
                valang_compiler::log_error!(error.error_code(), &error.to_string(),
                    span = rule.span,
                    "rule" => rule.key
                );
            })?;

            if let RuleOutcome::Failed { message } = outcome {
                failed += 1;
                if context.preferences().log_rejections {
                    valang_compiler::log_info!("Rule rejected target",
                        "rule" => rule.key,
                        "code" => rule.error_code(),
                        "message" => message
                    );
                }
                if rule.is_global() {
                    sink.reject_global(&message, rule.error_code());
                } else {
                    sink.reject_field(&rule.key, &message, rule.error_code());
                }
            }
        }

        valang_compiler::log_success!(codes::success::VALIDATION_COMPLETE,
            "Target validated",
            "rules" => self.rules.len(),
            "failed" => failed
        );
        Ok(())
    }

    /// Validate into a fresh [`BindingErrors`]
    pub fn collect(&self, target: &Value) -> EvaluationResult<BindingErrors> {
        let mut errors = BindingErrors::new();
        self.validate(target, &mut errors)?;
        Ok(errors)
    }
}

/// Evaluate one rule: guard first, then the predicate, then the message
pub fn check_rule(
    rule: &ValidationRule,
    target: &Value,
    context: &EvaluationContext,
) -> EvaluationResult<RuleOutcome> {
    if let Some(guard) = &rule.where_clause {
        if !evaluate_predicate(guard, target, context)? {
            return Ok(RuleOutcome::Skipped);
        }
    }

    if evaluate_predicate(&rule.predicate, target, context)? {
        return Ok(RuleOutcome::Passed);
    }

    let args = rule
        .error_args
        .iter()
        .map(|arg| {
            evaluate(arg, target, context)
                .map(|value| value.display_text().unwrap_or_else(|| "null".to_string()))
        })
        .collect::<EvaluationResult<Vec<_>>>()?;

    Ok(RuleOutcome::Failed {
        message: format_message(&rule.message, &args),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::error::EvaluationError;
    use assert_matches::assert_matches;
    use chrono::NaiveDate;
    use valang_compiler::codegen::{translate, NoMessages};
    use valang_compiler::logging::service::create_test_logger;

    fn validator(source: &str) -> ValangValidator {
        ValangValidator::from_source(source).unwrap()
    }

    fn date(year: i32, month: u32, day: u32) -> Value {
        Value::Date(
            NaiveDate::from_ymd_opt(year, month, day)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        )
    }

    #[test]
    fn test_upper_age_limit() {
        let validator = validator("{age : age <= 120 : 'too old'}");

        let passed = validator.collect(&Value::map([("age", Value::from(30))])).unwrap();
        assert!(!passed.has_errors());

        let failed = validator.collect(&Value::map([("age", Value::from(150))])).unwrap();
        assert_eq!(
            failed.errors(),
            &[FieldError {
                field: Some("age".to_string()),
                code: "age".to_string(),
                message: "too old".to_string(),
            }]
        );
    }

    #[test]
    fn test_length_range() {
        let validator = validator("{firstName : length(firstName) between 0 and 6 : 'too long'}");

        let steven = Value::object([("firstName", Value::from("Steven"))]);
        assert!(!validator.collect(&steven).unwrap().has_errors());

        let marie = Value::object([("firstName", Value::from("Marie-Claire"))]);
        assert!(validator.collect(&marie).unwrap().has_field_error("firstName"));
    }

    #[test]
    fn test_message_arguments_and_error_key() {
        let validator = validator(
            "{age : age >= minAge : 'must be older than {0}' : 'not_old_enough' : minAge}",
        );
        let target = Value::map([("age", Value::from(7)), ("minAge", Value::from(18))]);

        let errors = validator.collect(&target).unwrap();
        let error = &errors.errors()[0];
        assert_eq!(error.message, "must be older than 18");
        assert_eq!(error.code, "not_old_enough");
        assert_eq!(error.field.as_deref(), Some("age"));
    }

    #[test]
    fn test_date_lower_bound() {
        let validator = validator("{dob : dob >= [1970-01-01] : 'too old'}");

        let recent = Value::map([("dob", date(1974, 11, 24))]);
        assert!(!validator.collect(&recent).unwrap().has_errors());
        let early = Value::map([("dob", date(1950, 7, 14))]);
        assert!(validator.collect(&early).unwrap().has_errors());

        // dates posted as text are compared as dates
        let posted = Value::from_json(serde_json::json!({ "dob": "1950-07-14" }));
        assert!(validator.collect(&posted).unwrap().has_errors());
        let posted = Value::from_json(serde_json::json!({ "dob": "1974-11-24" }));
        assert!(!validator.collect(&posted).unwrap().has_errors());
    }

    #[test]
    fn test_equality_spellings_agree() {
        let is = validator("{age: age is 10 : 'x'}");
        let equals = validator("{age: age equals 10 : 'x'}");
        assert_eq!(is.rules()[0].predicate, equals.rules()[0].predicate);

        for age in [Value::from(10), Value::from(11), Value::Null] {
            let target = Value::map([("age", age)]);
            assert_eq!(
                is.collect(&target).unwrap(),
                equals.collect(&target).unwrap()
            );
        }
    }

    #[test]
    fn test_client_translation_uses_same_check() {
        let validator = validator("{firstName : firstName has text : 'required'}");
        let script = translate(validator.rules(), &FunctionRegistry::new(), &NoMessages).unwrap();
        assert!(script.contains("this.hasText("), "{}", script);

        let filled = Value::map([("firstName", Value::from("Steven"))]);
        let blank = Value::map([("firstName", Value::from("  "))]);
        assert!(!validator.collect(&filled).unwrap().has_errors());
        assert!(validator.collect(&blank).unwrap().has_errors());
    }

    #[test]
    fn test_one_report_per_failing_rule() {
        let validator = validator(
            "{ name : name has text and length(name) > 3 and name is uppercase : 'bad name' }
             { this : name != nick : 'name and nick must differ' : 'names.same' }",
        );
        let target = Value::map([("name", Value::from("ab")), ("nick", Value::from("ab"))]);

        let errors = validator.collect(&target).unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.field_errors("name").count(), 1);
        let global: Vec<_> = errors.global_errors().collect();
        assert_eq!(global.len(), 1);
        assert_eq!(global[0].code, "names.same");
    }

    #[test]
    fn test_where_guard_skips_rule() {
        let rule = validator("{ vat : vat has text where country = 'BE' : 'VAT required' }");
        let foreign = Value::map([("country", Value::from("NL")), ("vat", Value::Null)]);
        let local = Value::map([("country", Value::from("BE")), ("vat", Value::Null)]);

        assert_eq!(
            check_rule(&rule.rules()[0], &foreign, rule.context()).unwrap(),
            RuleOutcome::Skipped
        );
        assert!(!rule.collect(&foreign).unwrap().has_errors());
        assert!(rule.collect(&local).unwrap().has_field_error("vat"));
    }

    #[test]
    fn test_caller_roles_per_call() {
        let validator = validator("{ salary : inRole('ROLE_HR') = true or salary is null : 'not allowed' }");
        let target = Value::map([("salary", Value::from(5000))]);

        let mut errors = BindingErrors::new();
        validator
            .validate_with(&target, &EvaluationContext::new().with_roles(["ROLE_HR"]), &mut errors)
            .unwrap();
        assert!(!errors.has_errors());

        assert!(validator.collect(&target).unwrap().has_errors());
    }

    #[test]
    fn test_evaluation_errors_propagate() {
        let validator = validator("{ ratio : total / items > 1 : 'x' }");
        let target = Value::map([("total", Value::from(10)), ("items", Value::from(0))]);

        let error = validator.collect(&target).unwrap_err();
        assert_matches!(error, EvaluationError::DivisionByZero { .. });

        let (service, memory) = create_test_logger();
        service.log_error(error.error_code(), &error.to_string());
        assert!(memory.has_error_with_code(codes::evaluation::DIVISION_BY_ZERO));
    }

    #[test]
    fn test_bean_targets_reject_unknown_properties() {
        let validator = validator("{ age : age > 0 : 'x' }");
        let bean = Value::object([("name", Value::from("Steven"))]);
        assert_matches!(
            validator.collect(&bean),
            Err(EvaluationError::PropertyNotFound { .. })
        );

        // maps read a missing key as null, which fails the comparison
        let map = Value::map([("name", Value::from("Steven"))]);
        assert!(validator.collect(&map).unwrap().has_field_error("age"));
    }

    #[test]
    fn test_repeated_validation_is_stable() {
        let validator = validator(
            "{ age : age between 18 and 65 : 'out of range' }
             { contact : email(contact) = true : 'invalid email' }",
        );
        let target = Value::map([
            ("age", Value::from(70)),
            ("contact", Value::from("steven@example.com")),
        ]);
        let first = validator.collect(&target).unwrap();
        let second = validator.collect(&target).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
    }
}
