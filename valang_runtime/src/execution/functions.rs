//! Function evaluation
//!
//! Every [`Function`] node evaluates to a [`Value`] for a given target and
//! context. Evaluation never mutates the target.

use crate::execution::comparisons::Operand;
use crate::execution::context::EvaluationContext;
use crate::execution::error::{EvaluationError, EvaluationResult};
use crate::resolution::{lookup_entry, resolve_path};
use crate::types::Value;
use bigdecimal::BigDecimal;
use regex::Regex;
use std::str::FromStr;
use std::sync::OnceLock;
use valang_compiler::grammar::ast::nodes::{Function, Literal, MathOperator};

const EMAIL_PATTERN: &str = r"^(([A-Za-z0-9]+_+)|([A-Za-z0-9]+\-+)|([A-Za-z0-9]+\.+)|([A-Za-z0-9]+\++))*[A-Za-z0-9]+@((\w+\-+)|(\w+\.))*\w{1,63}\.[a-zA-Z]{2,6}$";

/// Evaluate, keeping enum literals unresolved for the comparison layer
pub fn evaluate_operand<'f>(
    function: &'f Function,
    target: &Value,
    context: &EvaluationContext,
) -> EvaluationResult<Operand<'f>> {
    match function {
        Function::EnumLiteral(literal) => Ok(Operand::EnumLiteral(literal)),
        other => evaluate(other, target, context).map(Operand::Value),
    }
}

pub fn evaluate(
    function: &Function,
    target: &Value,
    context: &EvaluationContext,
) -> EvaluationResult<Value> {
    match function {
        Function::Literal(literal) => Ok(literal_value(literal)),
        Function::Property(path) => resolve_path(target, path, context),
        Function::Target => Ok(target.clone()),
        Function::MapEntry { map, key } => {
            let container = resolve_path(target, map, context)?;
            match evaluate(key, target, context)?.display_text() {
                Some(key) => lookup_entry(&container, &key, map),
                None => Ok(Value::Null),
            }
        }
        Function::Collection(path) => resolve_path(target, path, context),
        Function::DateLiteral(date) => context.parse_date(&date.raw).map(Value::Date),
        Function::EnumLiteral(literal) => Ok(Value::String(literal.member.clone())),
        Function::List(items) => items
            .iter()
            .map(|item| evaluate(item, target, context))
            .collect::<EvaluationResult<Vec<_>>>()
            .map(Value::List),
        Function::Math { op, left, right } => {
            let left = decimal_operand(evaluate(left, target, context)?, *op)?;
            let right = decimal_operand(evaluate(right, target, context)?, *op)?;
            arithmetic(*op, &left, &right, function)
        }
        Function::Length(arg) => length_of(evaluate(arg, target, context)?),
        Function::UpperCase(arg) => Ok(evaluate(arg, target, context)?
            .display_text()
            .map(|text| Value::String(text.to_uppercase()))
            .unwrap_or(Value::Null)),
        Function::LowerCase(arg) => Ok(evaluate(arg, target, context)?
            .display_text()
            .map(|text| Value::String(text.to_lowercase()))
            .unwrap_or(Value::Null)),
        Function::Not(arg) => match evaluate(arg, target, context)? {
            Value::Boolean(value) => Ok(Value::Boolean(!value)),
            other => Err(EvaluationError::invalid_operand(
                "not",
                format!("expected a boolean, found {}", other.type_name()),
            )),
        },
        Function::Email(arg) => {
            let matched = match evaluate(arg, target, context)?.display_text() {
                Some(text) => email_pattern()?.is_match(&text),
                None => false,
            };
            Ok(Value::Boolean(matched))
        }
        Function::InRole(arg) => {
            let role = evaluate(arg, target, context)?.display_text();
            Ok(Value::Boolean(
                role.is_some_and(|role| context.has_role(&role)),
            ))
        }
        Function::RegEx { pattern, value } => {
            let pattern = evaluate(pattern, target, context)?
                .display_text()
                .ok_or_else(|| EvaluationError::invalid_operand("matches", "null pattern"))?;
            let regex = Regex::new(&format!("^(?:{})$", pattern)).map_err(|e| {
                EvaluationError::invalid_operand("matches", format!("invalid pattern: {}", e))
            })?;
            let matched = evaluate(value, target, context)?
                .display_text()
                .is_some_and(|text| regex.is_match(&text));
            Ok(Value::Boolean(matched))
        }
        Function::Custom { name, args } => {
            let implementation =
                context
                    .function(name)
                    .ok_or_else(|| EvaluationError::CustomFunctionFailed {
                        name: name.clone(),
                        reason: "no implementation registered".to_string(),
                    })?;
            let values = args
                .iter()
                .map(|arg| evaluate(arg, target, context))
                .collect::<EvaluationResult<Vec<_>>>()?;
            implementation
                .call(&values, target)
                .map_err(|reason| EvaluationError::CustomFunctionFailed {
                    name: name.clone(),
                    reason,
                })
        }
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::String(text) => Value::String(text.clone()),
        Literal::Number(value) => Value::Number(value.clone()),
        Literal::Boolean(value) => Value::Boolean(*value),
        Literal::Null => Value::Null,
    }
}

fn decimal_operand(value: Value, op: MathOperator) -> EvaluationResult<BigDecimal> {
    match value {
        Value::Number(n) => Ok(n),
        Value::String(text) => BigDecimal::from_str(text.trim()).map_err(|_| {
            EvaluationError::invalid_operand(
                format!("'{}'", op.symbol()),
                format!("'{}' is not a number", text),
            )
        }),
        other => Err(EvaluationError::invalid_operand(
            format!("'{}'", op.symbol()),
            format!("expected a number, found {}", other.type_name()),
        )),
    }
}

fn arithmetic(
    op: MathOperator,
    left: &BigDecimal,
    right: &BigDecimal,
    expression: &Function,
) -> EvaluationResult<Value> {
    let divides = matches!(op, MathOperator::Divide | MathOperator::Modulo);
    if divides && *right == BigDecimal::from(0) {
        return Err(EvaluationError::DivisionByZero {
            expression: expression.to_string(),
        });
    }

    let result = match op {
        MathOperator::Add => left + right,
        MathOperator::Subtract => left - right,
        MathOperator::Multiply => left * right,
        MathOperator::Divide => left / right,
        MathOperator::Modulo => left % right,
    };
    Ok(Value::Number(result))
}

/// Element count for lists and maps, character count for everything else
fn length_of(value: Value) -> EvaluationResult<Value> {
    let length = match &value {
        Value::Null => {
            return Err(EvaluationError::invalid_operand(
                "length",
                "cannot take the length of a null value",
            ))
        }
        Value::List(items) => items.len(),
        Value::Object(fields) | Value::Map(fields) => fields.len(),
        Value::String(text) => text.chars().count(),
        other => other.to_string().chars().count(),
    };
    Ok(Value::from(length))
}

fn email_pattern() -> EvaluationResult<&'static Regex> {
    static EMAIL: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(EMAIL_PATTERN))
        .as_ref()
        .map_err(|e| EvaluationError::invalid_operand("email", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use valang_compiler::compile;

    /// Evaluate the left operand of the first test in `{ x : <expr> = 0 : '' }`
    fn eval(expression: &str, target: &Value, context: &EvaluationContext) -> EvaluationResult<Value> {
        let rules = compile(&format!("{{ x : {} = 0 : 'x' }}", expression)).unwrap();
        let tests = rules[0].predicate.tests();
        evaluate(&tests[0].left, target, context)
    }

    fn person() -> Value {
        Value::object([
            ("firstName", Value::from("Marie-Claire")),
            ("email", Value::from("steven.devijver@example.com")),
            ("tags", Value::List(vec![Value::from("a"), Value::from("b")])),
            ("price", Value::from(10)),
            ("discount", Value::from(4)),
            ("nickname", Value::Null),
            ("codes", Value::map([("home", Value::from("BE"))])),
            ("country", Value::from("home")),
        ])
    }

    #[test]
    fn test_length() {
        let context = EvaluationContext::new();
        let target = person();
        assert_eq!(eval("length(firstName)", &target, &context).unwrap(), Value::from(12));
        assert_eq!(eval("size(tags)", &target, &context).unwrap(), Value::from(2));
        assert_eq!(eval("len(price)", &target, &context).unwrap(), Value::from(2));
        assert_matches!(
            eval("length(nickname)", &target, &context),
            Err(EvaluationError::InvalidOperand { .. })
        );
    }

    #[test]
    fn test_arithmetic() {
        let context = EvaluationContext::new();
        let target = person();
        assert_eq!(eval("price - discount * 2", &target, &context).unwrap(), Value::from(2));
        assert_eq!(eval("price % 3", &target, &context).unwrap(), Value::from(1));
        assert_eq!(
            eval("price / 4", &target, &context).unwrap(),
            Value::Number(BigDecimal::from_str("2.5").unwrap())
        );
        assert_matches!(
            eval("price / (discount - 4)", &target, &context),
            Err(EvaluationError::DivisionByZero { .. })
        );
        assert_matches!(
            eval("price mod 0", &target, &context),
            Err(EvaluationError::DivisionByZero { .. })
        );
        assert_matches!(
            eval("price + nickname", &target, &context),
            Err(EvaluationError::InvalidOperand { .. })
        );
    }

    #[test]
    fn test_string_functions() {
        let context = EvaluationContext::new();
        let target = person();
        assert_eq!(eval("upper(firstName)", &target, &context).unwrap(), Value::from("MARIE-CLAIRE"));
        assert_eq!(eval("lower(firstName)", &target, &context).unwrap(), Value::from("marie-claire"));
        assert!(eval("upper(nickname)", &target, &context).unwrap().is_null());
    }

    #[test]
    fn test_email() {
        let context = EvaluationContext::new();
        let target = person();
        assert_eq!(eval("email(email)", &target, &context).unwrap(), Value::from(true));
        assert_eq!(eval("email(firstName)", &target, &context).unwrap(), Value::from(false));
        assert_eq!(eval("email(nickname)", &target, &context).unwrap(), Value::from(false));
    }

    #[test]
    fn test_in_role_reads_the_context() {
        let target = person();
        let admin = EvaluationContext::new().with_roles(["ROLE_ADMIN"]);
        assert_eq!(eval("inRole('ROLE_ADMIN')", &target, &admin).unwrap(), Value::from(true));
        assert_eq!(eval("inRole('ROLE_USER')", &target, &admin).unwrap(), Value::from(false));
        assert_eq!(
            eval("inRole('ROLE_ADMIN')", &target, &EvaluationContext::new()).unwrap(),
            Value::from(false)
        );
    }

    #[test]
    fn test_regex_matches_whole_value() {
        let context = EvaluationContext::new();
        let target = person();
        assert_eq!(eval("matches('[A-Za-z-]+', firstName)", &target, &context).unwrap(), Value::from(true));
        assert_eq!(eval("matches('Marie', firstName)", &target, &context).unwrap(), Value::from(false));
    }

    #[test]
    fn test_map_entry_and_target() {
        let context = EvaluationContext::new();
        let target = person();
        assert_eq!(eval("@codes[country]", &target, &context).unwrap(), Value::from("BE"));
        assert_eq!(eval("@codes['work']", &target, &context).unwrap(), Value::Null);
        assert_eq!(eval("this", &target, &context).unwrap(), target);
    }

    #[test]
    fn test_not_requires_boolean() {
        let context = EvaluationContext::new();
        let target = Value::object([("active", Value::from(true)), ("name", Value::from("x"))]);
        assert_eq!(eval("!(active)", &target, &context).unwrap(), Value::from(false));
        assert_matches!(
            eval("!(name)", &target, &context),
            Err(EvaluationError::InvalidOperand { .. })
        );
    }

    #[test]
    fn test_custom_function() {
        let registry = valang_compiler::FunctionRegistry::new()
            .with(valang_compiler::FunctionDefinition::new(
                "initials",
                valang_compiler::Arity::Exactly(1),
            ))
            .unwrap();
        let rules =
            valang_compiler::compile_with("{ x : initials(firstName) = 'M' : 'x' }", &registry)
                .unwrap();
        let call = &rules[0].predicate.tests()[0].left;

        let context = EvaluationContext::new().with_function(
            "initials",
            |args: &[Value], _target: &Value| {
                Ok(args[0]
                    .as_str()
                    .and_then(|s| s.chars().next())
                    .map(|c| Value::String(c.to_string()))
                    .unwrap_or(Value::Null))
            },
        );
        assert_eq!(evaluate(call, &person(), &context).unwrap(), Value::from("M"));
        assert_matches!(
            evaluate(call, &person(), &EvaluationContext::new()),
            Err(EvaluationError::CustomFunctionFailed { .. })
        );
    }
}
