//! Host-registered enum types
//!
//! Enum literals in rule text (`['PENDING']`, `['CreditStatus.PENDING']`) are
//! resolved against this registry when a rule is evaluated.

use crate::types::value::EnumValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumRegistry {
    /// Type name to members in declaration order
    types: BTreeMap<String, Vec<String>>,
}

impl EnumRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an enum type; a later declaration replaces the earlier one
    pub fn register<I, S>(&mut self, type_name: impl Into<String>, members: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types
            .insert(type_name.into(), members.into_iter().map(Into::into).collect());
    }

    pub fn with<I, S>(mut self, type_name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.register(type_name, members);
        self
    }

    pub fn contains_type(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    pub fn members(&self, type_name: &str) -> Option<&[String]> {
        self.types.get(type_name).map(Vec::as_slice)
    }

    /// Declaration position of a member, used for ordering comparisons
    pub fn ordinal(&self, value: &EnumValue) -> Option<usize> {
        self.members(&value.type_name)?
            .iter()
            .position(|member| *member == value.member)
    }

    /// Exact, case-sensitive member lookup
    pub fn lookup(&self, type_name: &str, member: &str) -> Option<EnumValue> {
        self.members(type_name)?
            .iter()
            .any(|m| m == member)
            .then(|| EnumValue::new(type_name, member))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_sensitive() {
        let registry = EnumRegistry::new().with("CreditStatus", ["PENDING", "APPROVED"]);

        assert_eq!(
            registry.lookup("CreditStatus", "APPROVED"),
            Some(EnumValue::new("CreditStatus", "APPROVED"))
        );
        assert_eq!(registry.lookup("CreditStatus", "approved"), None);
        assert_eq!(registry.lookup("Color", "RED"), None);
    }

    #[test]
    fn test_ordinals_follow_declaration_order() {
        let registry = EnumRegistry::new().with("Size", ["SMALL", "MEDIUM", "LARGE"]);
        assert_eq!(registry.ordinal(&EnumValue::new("Size", "LARGE")), Some(2));
        assert_eq!(registry.ordinal(&EnumValue::new("Size", "HUGE")), None);
    }
}
