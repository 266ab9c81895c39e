//! # Comparison Operations
//!
//! Equality, ordering and string-shape checks over runtime values.
//!
//! Numbers compare as exact decimals, dates as instants, enum members by
//! identity within their type. Enum literals from rule text are resolved
//! against the other operand first, see [`resolve_operands`].

use crate::execution::context::EvaluationContext;
use crate::execution::error::{EvaluationError, EvaluationResult};
use crate::types::{EnumValue, Value};
use chrono::NaiveDateTime;
use std::cmp::Ordering;
use valang_compiler::grammar::ast::nodes::{EnumLiteral, Operator};

/// An evaluated operand; enum literals stay unresolved until the other side is known
#[derive(Debug, Clone, PartialEq)]
pub enum Operand<'f> {
    Value(Value),
    EnumLiteral(&'f EnumLiteral),
}

impl<'f> Operand<'f> {
    /// Plain value view; an unresolved enum literal reads as its member name
    pub fn into_value(self) -> Value {
        match self {
            Operand::Value(value) => value,
            Operand::EnumLiteral(literal) => Value::String(literal.member.clone()),
        }
    }
}

impl From<Value> for Operand<'_> {
    fn from(value: Value) -> Self {
        Operand::Value(value)
    }
}

/// Resolve any enum literal against the other operand
pub fn resolve_operands(
    left: Operand<'_>,
    right: Operand<'_>,
    context: &EvaluationContext,
) -> EvaluationResult<(Value, Value)> {
    match (left, right) {
        (Operand::Value(left), Operand::Value(right)) => Ok((left, right)),
        (Operand::EnumLiteral(literal), Operand::Value(other)) => {
            let resolved = enums::resolve(literal, &other, context)?;
            Ok((resolved, other))
        }
        (Operand::Value(other), Operand::EnumLiteral(literal)) => {
            let resolved = enums::resolve(literal, &other, context)?;
            Ok((other, resolved))
        }
        (Operand::EnumLiteral(left), Operand::EnumLiteral(right)) => Ok((
            enums::resolve(left, &Value::Null, context)?,
            enums::resolve(right, &Value::Null, context)?,
        )),
    }
}

/// EQUAL over operands that may contain enum literals
pub fn operands_equal(
    left: Operand<'_>,
    right: Operand<'_>,
    context: &EvaluationContext,
) -> EvaluationResult<bool> {
    let (left, right) = resolve_operands(left, right, context)?;
    Ok(values_equal(&left, &right, context))
}

/// Ordering operators over operands that may contain enum literals
pub fn operands_ordered(
    operator: Operator,
    left: Operand<'_>,
    right: Operand<'_>,
    context: &EvaluationContext,
) -> EvaluationResult<bool> {
    let (left, right) = resolve_operands(left, right, context)?;
    compare_ordering(operator, &left, &right, context)
}

/// Equality in priority order: decimals, instants, enum identity, native equality.
/// Null equals only null.
pub fn values_equal(left: &Value, right: &Value, context: &EvaluationContext) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::Date(a), Value::Date(b)) => a == b,
        (Value::Date(date), Value::String(text)) | (Value::String(text), Value::Date(date)) => {
            date::coerce(text, context).is_some_and(|parsed| parsed == *date)
        }
        (Value::Enum(a), Value::Enum(b)) => a == b,
        (Value::Enum(value), Value::String(text)) | (Value::String(text), Value::Enum(value)) => {
            value.member == *text
        }
        (Value::List(a), Value::List(b)) => {
            a.len() == b.len()
                && a.iter()
                    .zip(b.iter())
                    .all(|(x, y)| values_equal(x, y, context))
        }
        (a, b) => a == b,
    }
}

/// `<`, `<=`, `>`, `>=`; false when either side is null
pub fn compare_ordering(
    operator: Operator,
    left: &Value,
    right: &Value,
    context: &EvaluationContext,
) -> EvaluationResult<bool> {
    if left.is_null() || right.is_null() {
        return Ok(false);
    }

    let ordering = match (left, right) {
        (Value::Number(a), Value::Number(b)) => Some(a.cmp(b)),
        (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
        (Value::Date(a), Value::String(text)) => date::coerce(text, context).map(|b| a.cmp(&b)),
        (Value::String(text), Value::Date(b)) => date::coerce(text, context).map(|a| a.cmp(b)),
        (Value::Enum(a), Value::Enum(b)) => enums::ordinal_order(a, b, context),
        _ => None,
    };

    let ordering = ordering.ok_or_else(|| EvaluationError::IncomparableOperands {
        operator: operator.name().to_string(),
        left: describe(left),
        right: describe(right),
    })?;

    Ok(match operator {
        Operator::LessThan => ordering == Ordering::Less,
        Operator::LessThanOrEqual => ordering != Ordering::Greater,
        Operator::GreaterThan => ordering == Ordering::Greater,
        Operator::GreaterThanOrEqual => ordering != Ordering::Less,
        other => {
            return Err(EvaluationError::invalid_operand(
                other.name(),
                "not an ordering operator",
            ))
        }
    })
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(text) => format!("string '{}'", text),
        Value::Number(n) => format!("number {}", n),
        other => other.type_name().to_string(),
    }
}

/// String-shape operators, applied to the display text of the left operand
pub mod text {
    /// Non-null and non-empty
    pub fn has_length(text: Option<&str>) -> bool {
        text.is_some_and(|t| !t.is_empty())
    }

    /// Non-null with at least one non-whitespace character
    pub fn has_text(text: Option<&str>) -> bool {
        text.is_some_and(|t| t.chars().any(|c| !c.is_whitespace()))
    }

    pub fn is_blank(text: Option<&str>) -> bool {
        !has_text(text)
    }

    /// Non-empty and free of whitespace
    pub fn is_word(text: Option<&str>) -> bool {
        text.is_some_and(|t| !t.is_empty() && !t.chars().any(char::is_whitespace))
    }

    pub fn is_uppercase(text: Option<&str>) -> bool {
        text.is_some_and(|t| !t.is_empty() && t.to_uppercase() == t)
    }

    pub fn is_lowercase(text: Option<&str>) -> bool {
        text.is_some_and(|t| !t.is_empty() && t.to_lowercase() == t)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_text_and_blank_are_complements() {
            for sample in [None, Some(""), Some("   "), Some("\t\n"), Some(" a "), Some("x")] {
                assert_eq!(has_text(sample), !is_blank(sample), "{:?}", sample);
            }
            assert!(has_text(Some(" a ")));
            assert!(!has_text(Some("  ")));
        }

        #[test]
        fn test_length_counts_whitespace() {
            assert!(has_length(Some(" ")));
            assert!(!has_length(Some("")));
            assert!(!has_length(None));
        }

        #[test]
        fn test_words_and_case() {
            assert!(is_word(Some("Steven")));
            assert!(!is_word(Some("Steven Devijver")));
            assert!(!is_word(None));

            assert!(is_uppercase(Some("ABC-1")));
            assert!(!is_uppercase(Some("AbC")));
            assert!(is_lowercase(Some("abc")));
            assert!(!is_lowercase(Some("")));
        }
    }
}

/// String to date coercion for date comparisons
pub mod date {
    use super::*;

    /// Parse `text` as a date when coercion is enabled
    pub fn coerce(text: &str, context: &EvaluationContext) -> Option<NaiveDateTime> {
        if !context.preferences().coerce_strings_to_dates {
            return None;
        }
        context.date_parser().parse_at(text, context.now()).ok()
    }
}

/// Enum literal resolution
pub mod enums {
    use super::*;

    /// Resolve `literal` using its own type name or the type of `other`
    ///
    /// A qualified literal must name a registered type and member. A bare
    /// literal takes the type of an enum-valued `other`; against strings and
    /// nulls it stays a plain member name.
    pub fn resolve(
        literal: &EnumLiteral,
        other: &Value,
        context: &EvaluationContext,
    ) -> EvaluationResult<Value> {
        let type_name = match (&literal.type_name, other) {
            (Some(type_name), _) => type_name.as_str(),
            (None, Value::Enum(value)) => value.type_name.as_str(),
            (None, Value::Null | Value::String(_)) => {
                return Ok(Value::String(literal.member.clone()))
            }
            (None, other) => {
                return Err(EvaluationError::IncomparableOperands {
                    operator: "enum literal".to_string(),
                    left: format!("['{}']", literal.raw),
                    right: describe(other),
                })
            }
        };

        let registry = context.enums();
        if !registry.contains_type(type_name) {
            return Err(EvaluationError::UnknownEnumType {
                type_name: type_name.to_string(),
            });
        }
        registry
            .lookup(type_name, &literal.member)
            .map(Value::Enum)
            .ok_or_else(|| EvaluationError::UnknownEnumMember {
                type_name: type_name.to_string(),
                member: literal.member.clone(),
            })
    }

    /// Declaration order within one registered type
    pub fn ordinal_order(
        left: &EnumValue,
        right: &EnumValue,
        context: &EvaluationContext,
    ) -> Option<Ordering> {
        if left.type_name != right.type_name {
            return None;
        }
        let registry = context.enums();
        Some(registry.ordinal(left)?.cmp(&registry.ordinal(right)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EnumRegistry;
    use assert_matches::assert_matches;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn decimal(text: &str) -> Value {
        Value::Number(BigDecimal::from_str(text).unwrap())
    }

    fn day(y: i32, m: u32, d: u32) -> Value {
        Value::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap())
    }

    fn enum_context() -> EvaluationContext {
        EvaluationContext::new().with_enums(
            EnumRegistry::new()
                .with("CreditStatus", ["PENDING", "APPROVED", "REJECTED"])
                .with("Color", ["RED", "GREEN"]),
        )
    }

    #[test]
    fn test_decimal_equality_ignores_representation() {
        let context = EvaluationContext::new();
        assert!(values_equal(&decimal("19.95"), &decimal("19.9500"), &context));
        assert!(values_equal(&decimal("10"), &Value::from(10), &context));
        assert!(!values_equal(&decimal("19.95"), &decimal("19.951"), &context));
    }

    #[test]
    fn test_null_equality() {
        let context = EvaluationContext::new();
        assert!(values_equal(&Value::Null, &Value::Null, &context));
        assert!(!values_equal(&Value::Null, &Value::from("x"), &context));
        assert!(!values_equal(&Value::from(0), &Value::Null, &context));
    }

    #[test]
    fn test_dates_compare_as_instants() {
        let context = EvaluationContext::new();
        let with_time = Value::Date(
            NaiveDate::from_ymd_opt(1974, 11, 24)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        );
        assert!(values_equal(&day(1974, 11, 24), &with_time, &context));
        assert!(
            compare_ordering(Operator::GreaterThan, &day(1974, 11, 24), &day(1970, 1, 1), &context)
                .unwrap()
        );
        assert!(values_equal(&Value::from("1974-11-24"), &day(1974, 11, 24), &context));
    }

    #[test]
    fn test_ordering_rules() {
        let context = EvaluationContext::new();
        assert!(compare_ordering(Operator::LessThanOrEqual, &decimal("1.0"), &decimal("1"), &context).unwrap());
        assert!(!compare_ordering(Operator::LessThan, &Value::Null, &decimal("1"), &context).unwrap());
        assert_matches!(
            compare_ordering(Operator::LessThan, &Value::from("a"), &Value::from("b"), &context),
            Err(EvaluationError::IncomparableOperands { .. })
        );
        assert_matches!(
            compare_ordering(Operator::GreaterThan, &Value::from(3), &day(2000, 1, 1), &context),
            Err(EvaluationError::IncomparableOperands { .. })
        );
    }

    #[test]
    fn test_enum_literals_resolve_against_other_operand() {
        let context = enum_context();
        let status = Value::enum_member("CreditStatus", "APPROVED");
        let approved = EnumLiteral::parse("APPROVED").unwrap();
        let pending = EnumLiteral::parse("CreditStatus.PENDING").unwrap();

        assert!(operands_equal(
            Operand::Value(status.clone()),
            Operand::EnumLiteral(&approved),
            &context
        )
        .unwrap());
        assert!(!operands_equal(
            Operand::EnumLiteral(&pending),
            Operand::Value(status.clone()),
            &context
        )
        .unwrap());
        assert!(operands_ordered(
            Operator::GreaterThan,
            Operand::Value(status),
            Operand::EnumLiteral(&pending),
            &context
        )
        .unwrap());
    }

    #[test]
    fn test_unknown_enum_names_fail_loudly() {
        let context = enum_context();
        let status = Value::enum_member("CreditStatus", "PENDING");

        let misspelled = EnumLiteral::parse("approved").unwrap();
        assert_matches!(
            operands_equal(Operand::Value(status.clone()), Operand::EnumLiteral(&misspelled), &context),
            Err(EvaluationError::UnknownEnumMember { member, .. }) if member == "approved"
        );

        let unknown_type = EnumLiteral::parse("Shape.CIRCLE").unwrap();
        assert_matches!(
            operands_equal(Operand::Value(status), Operand::EnumLiteral(&unknown_type), &context),
            Err(EvaluationError::UnknownEnumType { type_name }) if type_name == "Shape"
        );

        let bare = EnumLiteral::parse("RED").unwrap();
        assert_matches!(
            operands_equal(Operand::Value(Value::from(3)), Operand::EnumLiteral(&bare), &context),
            Err(EvaluationError::IncomparableOperands { .. })
        );
    }

    #[test]
    fn test_bare_enum_literal_against_string() {
        let context = enum_context();
        let red = EnumLiteral::parse("RED").unwrap();
        assert!(operands_equal(Operand::Value(Value::from("RED")), Operand::EnumLiteral(&red), &context).unwrap());
        assert!(!operands_equal(Operand::Value(Value::Null), Operand::EnumLiteral(&red), &context).unwrap());
    }
}
