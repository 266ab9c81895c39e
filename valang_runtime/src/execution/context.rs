//! # Evaluation context
//!
//! Everything a rule may read besides the target: the caller's roles, the
//! default index for repeating form sections, registered enum types, custom
//! function implementations and the clock used by relative dates.
//!
//! The context is passed explicitly through every evaluation call, so
//! concurrent validations with different callers never share state.

use crate::execution::error::{EvaluationError, EvaluationResult};
use crate::types::{EnumRegistry, Value};
use chrono::{Local, NaiveDateTime};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use valang_compiler::config::runtime::EvaluationPreferences;
use valang_compiler::dates::{self, DateParser};

/// Implementation of a host-registered function
///
/// Arguments arrive already evaluated. Implementations must be pure with
/// respect to the target: they may read it but never change it.
pub trait CustomFunction: Send + Sync {
    fn call(&self, args: &[Value], target: &Value) -> Result<Value, String>;
}

impl<F> CustomFunction for F
where
    F: Fn(&[Value], &Value) -> Result<Value, String> + Send + Sync,
{
    fn call(&self, args: &[Value], target: &Value) -> Result<Value, String> {
        self(args, target)
    }
}

#[derive(Clone)]
pub struct EvaluationContext {
    roles: BTreeSet<String>,
    default_index: Option<usize>,
    enums: EnumRegistry,
    functions: HashMap<String, Arc<dyn CustomFunction>>,
    dates: Option<Arc<DateParser>>,
    now: Option<NaiveDateTime>,
    preferences: EvaluationPreferences,
}

impl Default for EvaluationContext {
    fn default() -> Self {
        Self::new()
    }
}

impl EvaluationContext {
    /// Anonymous caller, no default index, no enums or custom functions
    pub fn new() -> Self {
        Self {
            roles: BTreeSet::new(),
            default_index: None,
            enums: EnumRegistry::new(),
            functions: HashMap::new(),
            dates: None,
            now: None,
            preferences: EvaluationPreferences::default(),
        }
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_default_index(mut self, index: usize) -> Self {
        self.default_index = Some(index);
        self
    }

    pub fn with_enums(mut self, enums: EnumRegistry) -> Self {
        self.enums = enums;
        self
    }

    pub fn with_function(
        mut self,
        name: impl Into<String>,
        function: impl CustomFunction + 'static,
    ) -> Self {
        self.register_function(name, function);
        self
    }

    pub fn register_function(
        &mut self,
        name: impl Into<String>,
        function: impl CustomFunction + 'static,
    ) {
        self.functions.insert(name.into(), Arc::new(function));
    }

    /// Use a custom date pattern table instead of the shared default one
    pub fn with_date_parser(mut self, parser: DateParser) -> Self {
        self.dates = Some(Arc::new(parser));
        self
    }

    /// Fix "now" for relative date literals
    pub fn at(mut self, now: NaiveDateTime) -> Self {
        self.now = Some(now);
        self
    }

    pub fn with_preferences(mut self, preferences: EvaluationPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    /// Exact authority-name match; an anonymous caller has no roles
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(String::as_str)
    }

    pub fn default_index(&self) -> Option<usize> {
        self.default_index
    }

    pub fn enums(&self) -> &EnumRegistry {
        &self.enums
    }

    pub fn preferences(&self) -> &EvaluationPreferences {
        &self.preferences
    }

    pub fn function(&self, name: &str) -> Option<&dyn CustomFunction> {
        self.functions.get(name).map(|f| f.as_ref())
    }

    pub fn date_parser(&self) -> &DateParser {
        match &self.dates {
            Some(parser) => parser.as_ref(),
            None => dates::shared(),
        }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now.unwrap_or_else(|| Local::now().naive_local())
    }

    /// Resolve a date expression against this context's clock
    pub fn parse_date(&self, expression: &str) -> EvaluationResult<NaiveDateTime> {
        self.date_parser()
            .parse_at(expression, self.now())
            .map_err(|source| EvaluationError::Date {
                expression: expression.to_string(),
                source,
            })
    }
}

impl fmt::Debug for EvaluationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut function_names: Vec<&String> = self.functions.keys().collect();
        function_names.sort();
        f.debug_struct("EvaluationContext")
            .field("roles", &self.roles)
            .field("default_index", &self.default_index)
            .field("enums", &self.enums)
            .field("functions", &function_names)
            .field("now", &self.now)
            .field("preferences", &self.preferences)
            .finish()
    }
}
