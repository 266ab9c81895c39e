use super::{load_rules, CommandError, CommandResult};
use std::path::Path;
use valang_runtime::{BindingErrors, EvaluationContext, ValangValidator, Value};

#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    /// Authorities granted to the caller for `inRole`
    pub roles: Vec<String>,
    /// Index used by `[]` path segments
    pub default_index: Option<usize>,
}

/// Validate a JSON target against a rules file
pub fn validate(
    rules: &Path,
    target: &Path,
    options: &ValidateOptions,
) -> CommandResult<BindingErrors> {
    let output = load_rules(rules)?;
    let target = read_target(target)?;

    let mut context = EvaluationContext::new().with_roles(options.roles.iter().cloned());
    if let Some(index) = options.default_index {
        context = context.with_default_index(index);
    }

    let validator = ValangValidator::new(output.rules).with_context(context);
    let errors = validator.collect(&target)?;
    log::info!(
        "{} of {} rule(s) rejected the target",
        errors.len(),
        validator.rules().len()
    );
    Ok(errors)
}

fn read_target(path: &Path) -> CommandResult<Value> {
    let input_error = |reason: String| CommandError::Input {
        path: path.display().to_string(),
        reason,
    };
    let text = std::fs::read_to_string(path).map_err(|e| input_error(e.to_string()))?;
    let json: serde_json::Value =
        serde_json::from_str(&text).map_err(|e| input_error(e.to_string()))?;
    Ok(Value::from_json(json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn file_with(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    const RULES: &str = "
        { age : age >= minAge : 'must be older than {0}' : 'not_old_enough' : minAge }
        { salary : inRole('ROLE_HR') = true or salary is null : 'hidden field' }
        { lines[].qty : ? > 0 : 'quantity required' }";

    #[test]
    fn test_collects_binding_errors() {
        let rules = file_with(RULES);
        let target = file_with(
            r#"{ "age": 7, "minAge": 18, "salary": 5000, "lines": [{ "qty": 0 }] }"#,
        );
        let options = ValidateOptions {
            roles: Vec::new(),
            default_index: Some(0),
        };

        let errors = validate(rules.path(), target.path(), &options).unwrap();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.errors()[0].message, "must be older than 18");

        let json = serde_json::to_string(&errors).unwrap();
        assert!(json.contains("not_old_enough"));
    }

    #[test]
    fn test_roles_and_index_from_options() {
        let rules = file_with(RULES);
        let target = file_with(
            r#"{ "age": 30, "minAge": 18, "salary": 5000, "lines": [{ "qty": 0 }, { "qty": 2 }] }"#,
        );
        let options = ValidateOptions {
            roles: vec!["ROLE_HR".to_string()],
            default_index: Some(1),
        };

        let errors = validate(rules.path(), target.path(), &options).unwrap();
        assert!(!errors.has_errors(), "{:?}", errors);
    }

    #[test]
    fn test_rejects_malformed_json() {
        let rules = file_with(RULES);
        let target = file_with("{ age: ");
        assert!(matches!(
            validate(rules.path(), target.path(), &ValidateOptions::default()),
            Err(CommandError::Input { .. })
        ));
    }

    #[test]
    fn test_evaluation_errors_surface() {
        let rules = file_with(RULES);
        let target = file_with(r#"{ "age": 30, "minAge": 18, "lines": [{ "qty": 1 }] }"#);
        assert!(matches!(
            validate(rules.path(), target.path(), &ValidateOptions::default()),
            Err(CommandError::Evaluation(_))
        ));
    }
}
