use super::{load_rules, CommandResult};
use serde::Serialize;
use std::fmt;
use std::path::Path;

/// One line of `valang check` output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSummary {
    pub key: String,
    pub predicate: String,
    pub guarded: bool,
    pub message: String,
    pub code: String,
}

impl fmt::Display for RuleSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<20} {}", self.key, self.predicate)?;
        if self.guarded {
            f.write_str(" [where]")?;
        }
        write!(f, " => '{}' ({})", self.message, self.code)
    }
}

/// Compile a rules file and summarise each rule
pub fn check(rules: &Path) -> CommandResult<Vec<RuleSummary>> {
    let output = load_rules(rules)?;
    Ok(output
        .rules
        .iter()
        .map(|rule| RuleSummary {
            key: rule.key.clone(),
            predicate: rule.predicate.to_string(),
            guarded: rule.has_where_clause(),
            message: rule.message.clone(),
            code: rule.error_code().to_string(),
        })
        .collect())
}
