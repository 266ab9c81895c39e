//! Function name resolution
//!
//! Built-in functions are fixed. Host applications add custom functions by
//! name and arity; the implementation itself is supplied to the evaluator, and
//! an optional client name lets the JavaScript backend call a client-side
//! counterpart.

use crate::grammar::ast::{Function, Literal};
use crate::grammar::error::{ConstructionError, ConstructionResult};
use crate::utils::Span;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Arity {
    Exactly(usize),
    AtLeast(usize),
    Range(usize, usize),
}

impl Arity {
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Arity::Exactly(n) => count == n,
            Arity::AtLeast(min) => count >= min,
            Arity::Range(min, max) => (min..=max).contains(&count),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "{}", n),
            Arity::AtLeast(min) => write!(f, "at least {}", min),
            Arity::Range(min, max) => write!(f, "{} to {}", min, max),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Length,
    UpperCase,
    LowerCase,
    Not,
    Email,
    InRole,
    RegEx,
}

impl Builtin {
    /// Case-insensitive lookup over every accepted spelling
    pub fn from_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        let builtin = match lower.as_str() {
            "length" | "len" | "size" | "count" => Builtin::Length,
            "upper" => Builtin::UpperCase,
            "lower" => Builtin::LowerCase,
            "not" => Builtin::Not,
            "email" => Builtin::Email,
            "inrole" => Builtin::InRole,
            "match" | "matches" => Builtin::RegEx,
            _ => return None,
        };
        Some(builtin)
    }

    pub const fn arity(self) -> Arity {
        match self {
            Builtin::RegEx => Arity::Exactly(2),
            _ => Arity::Exactly(1),
        }
    }

    fn build(self, mut args: Vec<Function>) -> Function {
        // Arity is checked before building
        let first = if args.is_empty() {
            Function::Literal(Literal::Null)
        } else {
            args.remove(0)
        };
        let boxed = Box::new(first);
        match self {
            Builtin::Length => Function::Length(boxed),
            Builtin::UpperCase => Function::UpperCase(boxed),
            Builtin::LowerCase => Function::LowerCase(boxed),
            Builtin::Not => Function::Not(boxed),
            Builtin::Email => Function::Email(boxed),
            Builtin::InRole => Function::InRole(boxed),
            Builtin::RegEx => Function::RegEx {
                pattern: boxed,
                value: Box::new(args.pop().unwrap_or(Function::Literal(Literal::Null))),
            },
        }
    }
}

/// Declaration of a host-supplied function
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub arity: Arity,
    /// Name of the client-side helper (`this.<client_name>(..)`)
    pub client_name: Option<String>,
}

impl FunctionDefinition {
    pub fn new(name: impl Into<String>, arity: Arity) -> Self {
        Self {
            name: name.into(),
            arity,
            client_name: None,
        }
    }

    pub fn with_client_name(mut self, client_name: impl Into<String>) -> Self {
        self.client_name = Some(client_name.into());
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    custom: BTreeMap<String, FunctionDefinition>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a custom function; names may not repeat or shadow a built-in
    pub fn register(&mut self, definition: FunctionDefinition) -> ConstructionResult<()> {
        if Builtin::from_name(&definition.name).is_some()
            || self.custom.contains_key(&definition.name)
        {
            return Err(ConstructionError::DuplicateFunction {
                name: definition.name,
            });
        }
        self.custom.insert(definition.name.clone(), definition);
        Ok(())
    }

    /// Builder form of [`register`](Self::register)
    pub fn with(mut self, definition: FunctionDefinition) -> ConstructionResult<Self> {
        self.register(definition)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&FunctionDefinition> {
        self.custom.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        Builtin::from_name(name).is_some() || self.custom.contains_key(name)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &FunctionDefinition> {
        self.custom.values()
    }

    pub fn client_name(&self, name: &str) -> Option<&str> {
        self.custom.get(name).and_then(|d| d.client_name.as_deref())
    }

    /// Resolve `name(args)` to a function node, checking arity
    pub fn build_call(
        &self,
        name: &str,
        args: Vec<Function>,
        span: Span,
    ) -> ConstructionResult<Function> {
        let wrong_arity = |arity: Arity, found: usize| ConstructionError::WrongArity {
            name: name.to_string(),
            expected: arity.to_string(),
            found,
            span,
        };

        if let Some(builtin) = Builtin::from_name(name) {
            if !builtin.arity().accepts(args.len()) {
                return Err(wrong_arity(builtin.arity(), args.len()));
            }
            if builtin == Builtin::RegEx {
                check_literal_pattern(&args[0], span)?;
            }
            return Ok(builtin.build(args));
        }

        match self.custom.get(name) {
            Some(definition) if definition.arity.accepts(args.len()) => Ok(Function::Custom {
                name: definition.name.clone(),
                args,
            }),
            Some(definition) => Err(wrong_arity(definition.arity, args.len())),
            None => Err(ConstructionError::UnknownFunction {
                name: name.to_string(),
                span,
            }),
        }
    }
}

/// A literal pattern is compiled once here so bad patterns fail at parse time
fn check_literal_pattern(pattern: &Function, span: Span) -> ConstructionResult<()> {
    if let Function::Literal(Literal::String(text)) = pattern {
        regex::Regex::new(text).map_err(|e| ConstructionError::InvalidRegex {
            pattern: text.clone(),
            reason: e.to_string(),
            span,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::ast::PropertyPath;
    use assert_matches::assert_matches;

    fn prop(name: &str) -> Function {
        Function::property(PropertyPath::field(name))
    }

    #[test]
    fn test_builtin_aliases() {
        let registry = FunctionRegistry::new();
        for name in ["length", "len", "size", "count", "LENGTH"] {
            let built = registry
                .build_call(name, vec![prop("tags")], Span::dummy())
                .unwrap();
            assert_matches!(built, Function::Length(_));
        }
        let regex = registry
            .build_call(
                "matches",
                vec![Function::string("(a|b)"), prop("name")],
                Span::dummy(),
            )
            .unwrap();
        assert_matches!(regex, Function::RegEx { .. });
    }

    #[test]
    fn test_arity_is_checked() {
        let registry = FunctionRegistry::new();
        assert_matches!(
            registry.build_call("email", vec![], Span::dummy()),
            Err(ConstructionError::WrongArity { found: 0, .. })
        );
        assert_matches!(
            registry.build_call("upper", vec![prop("a"), prop("b")], Span::dummy()),
            Err(ConstructionError::WrongArity { found: 2, .. })
        );
    }

    #[test]
    fn test_unknown_function() {
        let registry = FunctionRegistry::new();
        assert_matches!(
            registry.build_call("tupper", vec![prop("a")], Span::dummy()),
            Err(ConstructionError::UnknownFunction { name, .. }) if name == "tupper"
        );
    }

    #[test]
    fn test_custom_registration() {
        let registry = FunctionRegistry::new()
            .with(
                FunctionDefinition::new("validLastName", Arity::Exactly(1))
                    .with_client_name("validLastName"),
            )
            .unwrap();
        let built = registry
            .build_call("validLastName", vec![prop("lastName")], Span::dummy())
            .unwrap();
        assert_matches!(built, Function::Custom { ref name, ref args } if name == "validLastName" && args.len() == 1);
        assert_eq!(registry.client_name("validLastName"), Some("validLastName"));
    }

    #[test]
    fn test_duplicate_and_shadowing_rejected() {
        let mut registry = FunctionRegistry::new();
        registry
            .register(FunctionDefinition::new("approve", Arity::AtLeast(1)))
            .unwrap();
        assert_matches!(
            registry.register(FunctionDefinition::new("approve", Arity::Exactly(1))),
            Err(ConstructionError::DuplicateFunction { .. })
        );
        assert_matches!(
            registry.register(FunctionDefinition::new("email", Arity::Exactly(1))),
            Err(ConstructionError::DuplicateFunction { .. })
        );
    }

    #[test]
    fn test_invalid_literal_pattern() {
        let registry = FunctionRegistry::new();
        assert_matches!(
            registry.build_call("match", vec![Function::string("(open"), prop("a")], Span::dummy()),
            Err(ConstructionError::InvalidRegex { .. })
        );
    }
}
