//! Predicate evaluation
//!
//! Negated operators are evaluated as the complement of their positive form,
//! so `NOT_BETWEEN(x, a, b)` is always exactly `!BETWEEN(x, a, b)`.

use crate::execution::comparisons::{self, text, Operand};
use crate::execution::context::EvaluationContext;
use crate::execution::error::{EvaluationError, EvaluationResult};
use crate::execution::functions::{evaluate, evaluate_operand};
use crate::types::Value;
use valang_compiler::config::compile_time::evaluation::MAX_COLLECTION_SIZE;
use valang_compiler::grammar::ast::nodes::{Function, Operator, Predicate, TestPredicate};

/// Evaluate a predicate tree; `and`/`or` short-circuit left to right
pub fn evaluate_predicate(
    predicate: &Predicate,
    target: &Value,
    context: &EvaluationContext,
) -> EvaluationResult<bool> {
    match predicate {
        Predicate::Test(test) => evaluate_test(test, target, context),
        Predicate::And(left, right) => Ok(evaluate_predicate(left, target, context)?
            && evaluate_predicate(right, target, context)?),
        Predicate::Or(left, right) => Ok(evaluate_predicate(left, target, context)?
            || evaluate_predicate(right, target, context)?),
        Predicate::Not(inner) => Ok(!evaluate_predicate(inner, target, context)?),
    }
}

pub fn evaluate_test(
    test: &TestPredicate,
    target: &Value,
    context: &EvaluationContext,
) -> EvaluationResult<bool> {
    let positive = evaluate_positive(test.operator.positive(), test, target, context)?;
    Ok(if test.operator.is_negated() {
        !positive
    } else {
        positive
    })
}

fn evaluate_positive(
    operator: Operator,
    test: &TestPredicate,
    target: &Value,
    context: &EvaluationContext,
) -> EvaluationResult<bool> {
    if operator.is_unary() {
        let left = evaluate(&test.left, target, context)?;
        return Ok(shape_check(operator, &left));
    }

    let right = test.right.as_ref().ok_or_else(|| {
        EvaluationError::invalid_operand(operator.name(), "missing right operand")
    })?;

    match operator {
        Operator::Equal => {
            let left = evaluate_operand(&test.left, target, context)?;
            let right = evaluate_operand(right, target, context)?;
            comparisons::operands_equal(left, right, context)
        }
        Operator::In => membership(&test.left, right, target, context),
        Operator::Between => between(&test.left, right, target, context),
        ordering if ordering.is_ordering() => {
            let left = evaluate_operand(&test.left, target, context)?;
            let right = evaluate_operand(right, target, context)?;
            comparisons::operands_ordered(ordering, left, right, context)
        }
        other => Err(EvaluationError::invalid_operand(
            other.name(),
            "operator has no positive evaluation",
        )),
    }
}

fn shape_check(operator: Operator, value: &Value) -> bool {
    let display = value.display_text();
    let text = display.as_deref();
    match operator {
        Operator::Null => value.is_null(),
        Operator::HasText => text::has_text(text),
        Operator::HasLength => text::has_length(text),
        Operator::IsBlank => text::is_blank(text),
        Operator::IsWord => text::is_word(text),
        Operator::IsUppercase => text::is_uppercase(text),
        Operator::IsLowercase => text::is_lowercase(text),
        _ => false,
    }
}

/// `left in (a, b, c)` compares element by element so enum literals and
/// property references resolve per element; `left in @path` tests membership
/// in the collection found at `path`.
fn membership(
    left: &Function,
    right: &Function,
    target: &Value,
    context: &EvaluationContext,
) -> EvaluationResult<bool> {
    if let Function::List(items) = right {
        if items.is_empty() {
            return Err(EvaluationError::invalid_operand("IN", "empty value list"));
        }
        let value = evaluate(left, target, context)?;
        for item in items {
            let candidate = evaluate_operand(item, target, context)?;
            if comparisons::operands_equal(Operand::Value(value.clone()), candidate, context)? {
                return Ok(true);
            }
        }
        return Ok(false);
    }

    let collection = match evaluate(right, target, context)? {
        Value::List(items) => items,
        other => {
            return Err(EvaluationError::invalid_operand(
                "IN",
                format!("expected a collection, found {}", other.type_name()),
            ))
        }
    };
    if collection.len() > MAX_COLLECTION_SIZE {
        return Err(EvaluationError::LimitExceeded {
            limit: "Collection size for IN".to_string(),
            actual: collection.len(),
            max: MAX_COLLECTION_SIZE,
        });
    }

    let left = evaluate_operand(left, target, context)?;
    for element in collection {
        if comparisons::operands_equal(left.clone(), Operand::Value(element), context)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn between(
    left: &Function,
    right: &Function,
    target: &Value,
    context: &EvaluationContext,
) -> EvaluationResult<bool> {
    let (low, high) = match right {
        Function::List(bounds) if bounds.len() == 2 => (&bounds[0], &bounds[1]),
        Function::List(bounds) => {
            return Err(EvaluationError::invalid_operand(
                "BETWEEN",
                format!("expected exactly two bounds, found {}", bounds.len()),
            ))
        }
        _ => {
            return Err(EvaluationError::invalid_operand(
                "BETWEEN",
                "bounds must be a pair of values",
            ))
        }
    };

    let value = evaluate_operand(left, target, context)?;
    let above = comparisons::operands_ordered(
        Operator::GreaterThanOrEqual,
        value.clone(),
        evaluate_operand(low, target, context)?,
        context,
    )?;
    if !above {
        return Ok(false);
    }
    comparisons::operands_ordered(
        Operator::LessThanOrEqual,
        value,
        evaluate_operand(high, target, context)?,
        context,
    )
}
