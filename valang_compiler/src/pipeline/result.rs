use crate::grammar::ast::nodes::ValidationRule;
use std::time::Duration;

/// Rules compiled from one named source
#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub source_name: String,
    pub rules: Vec<ValidationRule>,
    pub token_count: usize,
    pub duration: Duration,
}

impl CompileOutput {
    pub fn log_success(&self) {
        crate::log_success!(
            crate::logging::codes::success::COMPILATION_COMPLETE,
            "Rule source compiled",
            "source" => self.source_name.as_str(),
            "rules" => self.rules.len(),
            "tokens" => self.token_count,
            "duration_ms" => format!("{:.2}", self.duration.as_secs_f64() * 1000.0)
        );
    }

    /// Keys of every compiled rule, in source order
    pub fn rule_keys(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.key.as_str()).collect()
    }
}
