//! # Runtime values
//!
//! Targets, property values and function results all share one [`Value`]
//! type. Numbers are always [`BigDecimal`] so equality is exact regardless of
//! how the number was written or stored.

use bigdecimal::BigDecimal;
use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Runtime representation of targets and operand values
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Number(BigDecimal),
    String(String),
    Date(NaiveDateTime),
    Enum(EnumValue),
    List(Vec<Value>),
    /// Bean-like target: reading an unknown property is an error
    Object(BTreeMap<String, Value>),
    /// Map-like target: reading an unknown key yields `Null`
    Map(BTreeMap<String, Value>),
}

/// Member of a host-registered enum type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnumValue {
    pub type_name: String,
    pub member: String,
}

impl EnumValue {
    pub fn new(type_name: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            member: member.into(),
        }
    }
}

impl Value {
    pub fn string(text: impl Into<String>) -> Self {
        Value::String(text.into())
    }

    pub fn number(value: impl Into<BigDecimal>) -> Self {
        Value::Number(value.into())
    }

    pub fn enum_member(type_name: impl Into<String>, member: impl Into<String>) -> Self {
        Value::Enum(EnumValue::new(type_name, member))
    }

    /// Bean-like object from field pairs
    pub fn object<K: Into<String>>(fields: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Map-like target from key pairs
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    pub fn is_date(&self) -> bool {
        matches!(self, Value::Date(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&BigDecimal> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Fields of an object or entries of a map
    pub fn as_fields(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(fields) | Value::Map(fields) => Some(fields),
            _ => None,
        }
    }

    /// Short type name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::Enum(_) => "enum",
            Value::List(_) => "list",
            Value::Object(_) => "object",
            Value::Map(_) => "map",
        }
    }

    /// Text used by the string-shape operators and message arguments;
    /// `None` for null
    pub fn display_text(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Convert parsed JSON; objects become map-like targets
    pub fn from_json(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => BigDecimal::from_str(&n.to_string())
                .map(Value::Number)
                .unwrap_or_else(|_| Value::String(n.to_string())),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(fields) => Value::Map(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(BigDecimal::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Number(BigDecimal::from(value))
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Number(BigDecimal::from(value as u64))
    }
}

impl From<BigDecimal> for Value {
    fn from(value: BigDecimal) -> Self {
        Value::Number(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Value::Date(value)
    }
}

impl From<EnumValue> for Value {
    fn from(value: EnumValue) -> Self {
        Value::Enum(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::Date(date) if date.time().num_seconds_from_midnight() == 0
                && date.time().nanosecond() == 0 =>
            {
                write!(f, "{}", date.format("%Y-%m-%d"))
            }
            Value::Date(date) => write!(f, "{}", date.format("%Y-%m-%d %H:%M:%S")),
            Value::Enum(value) => f.write_str(&value.member),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Object(fields) | Value::Map(fields) => {
                write!(f, "{{")?;
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}={}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_json_conversion() {
        let json = serde_json::json!({
            "age": 30,
            "price": 19.95,
            "name": "Steven",
            "tags": ["a", "b"],
            "spouse": null
        });

        let value = Value::from_json(json);
        let fields = value.as_fields().unwrap();
        assert!(matches!(value, Value::Map(_)));
        assert_eq!(fields["age"], Value::from(30));
        assert_eq!(
            fields["price"],
            Value::Number(BigDecimal::from_str("19.95").unwrap())
        );
        assert_eq!(fields["tags"].as_list().map(|t| t.len()), Some(2));
        assert!(fields["spouse"].is_null());
    }

    #[test]
    fn test_display_forms() {
        let midnight = NaiveDate::from_ymd_opt(1974, 11, 24)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(Value::Date(midnight).to_string(), "1974-11-24");
        assert_eq!(
            Value::Date(midnight.with_hour(13).unwrap()).to_string(),
            "1974-11-24 13:00:00"
        );
        assert_eq!(Value::from(18).to_string(), "18");
        assert_eq!(Value::enum_member("Color", "RED").to_string(), "RED");
        assert_eq!(
            Value::List(vec![Value::from(1), Value::from("x")]).to_string(),
            "[1, x]"
        );
        assert_eq!(Value::Null.display_text(), None);
    }
}
