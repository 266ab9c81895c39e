//! Property path resolution against targets
//!
//! Objects are bean-like: reading a property they do not have is an error.
//! Maps are looked up directly and a missing key reads as `Null`. Lists are
//! indexed either by an explicit index or by the context's default index.

use crate::execution::context::EvaluationContext;
use crate::execution::error::{EvaluationError, EvaluationResult};
use crate::types::Value;
use valang_compiler::config::compile_time::evaluation::MAX_PROPERTY_DEPTH;
use valang_compiler::grammar::ast::nodes::{PathSegment, PropertyPath};

/// Read the value at `path`; a null final value is returned as `Null`
pub fn resolve_path(
    target: &Value,
    path: &PropertyPath,
    context: &EvaluationContext,
) -> EvaluationResult<Value> {
    if path.depth() > MAX_PROPERTY_DEPTH {
        return Err(EvaluationError::LimitExceeded {
            limit: format!("Property depth of '{}'", path),
            actual: path.depth(),
            max: MAX_PROPERTY_DEPTH,
        });
    }

    let mut current = target;
    for (position, segment) in path.segments.iter().enumerate() {
        if current.is_null() {
            return Err(EvaluationError::NullIntermediate {
                path: path.to_string(),
                segment: segment_text(segment),
            });
        }

        current = match segment {
            PathSegment::Field(name) => read_field(current, name, path)?,
            PathSegment::Key(key) => read_key(current, key, path)?,
            PathSegment::Index(index) => read_index(current, *index, path)?,
            PathSegment::DefaultIndex => {
                let index = context
                    .default_index()
                    .ok_or_else(|| EvaluationError::NoDefaultIndex {
                        path: path.to_string(),
                    })?;
                read_index(current, index, path)?
            }
        };

        valang_compiler::log_debug!("Resolved path segment",
            "path" => path,
            "position" => position,
            "type" => current.type_name()
        );
    }

    Ok(current.clone())
}

/// Look up one entry of a map or object by its textual key
pub fn lookup_entry(container: &Value, key: &str, path: &PropertyPath) -> EvaluationResult<Value> {
    match container {
        Value::Null => Ok(Value::Null),
        Value::List(_) => match key.trim().parse::<usize>() {
            Ok(index) => read_index(container, index, path).cloned(),
            Err(_) => Err(EvaluationError::invalid_operand(
                format!("entry of '{}'", path),
                format!("'{}' is not a list index", key),
            )),
        },
        _ => read_key(container, key, path).cloned(),
    }
}

static NULL: Value = Value::Null;

fn read_field<'v>(current: &'v Value, name: &str, path: &PropertyPath) -> EvaluationResult<&'v Value> {
    match current {
        Value::Object(fields) => fields
            .get(name)
            .ok_or_else(|| EvaluationError::PropertyNotFound {
                path: path.to_string(),
                segment: name.to_string(),
            }),
        Value::Map(entries) => Ok(entries.get(name).unwrap_or(&NULL)),
        _ => Err(EvaluationError::PropertyNotFound {
            path: path.to_string(),
            segment: name.to_string(),
        }),
    }
}

fn read_key<'v>(current: &'v Value, key: &str, path: &PropertyPath) -> EvaluationResult<&'v Value> {
    match current {
        Value::Map(entries) | Value::Object(entries) => Ok(entries.get(key).unwrap_or(&NULL)),
        other => Err(EvaluationError::invalid_operand(
            format!("key [{}] of '{}'", key, path),
            format!("cannot look up a key in a {}", other.type_name()),
        )),
    }
}

fn read_index<'v>(current: &'v Value, index: usize, path: &PropertyPath) -> EvaluationResult<&'v Value> {
    match current {
        Value::List(items) => items.get(index).ok_or(EvaluationError::IndexOutOfRange {
            path: path.to_string(),
            index,
            len: items.len(),
        }),
        // Maps keyed by number, as in `Map<Integer, ?>` form backing objects
        Value::Map(entries) | Value::Object(entries) => {
            Ok(entries.get(&index.to_string()).unwrap_or(&NULL))
        }
        other => Err(EvaluationError::invalid_operand(
            format!("index [{}] of '{}'", index, path),
            format!("cannot index into a {}", other.type_name()),
        )),
    }
}

fn segment_text(segment: &PathSegment) -> String {
    match segment {
        PathSegment::Field(name) => name.clone(),
        PathSegment::Key(key) => format!("[{}]", key),
        PathSegment::Index(index) => format!("[{}]", index),
        PathSegment::DefaultIndex => "[]".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn path(text: &str) -> PropertyPath {
        PropertyPath::parse(text).unwrap()
    }

    fn customer() -> Value {
        Value::object([
            ("name", Value::from("Steven")),
            (
                "address",
                Value::object([("city", Value::from("Leuven")), ("zip", Value::Null)]),
            ),
            (
                "orders",
                Value::List(vec![
                    Value::object([("qty", Value::from(2))]),
                    Value::object([("qty", Value::from(5))]),
                ]),
            ),
            (
                "attributes",
                Value::map([("Test Key", Value::from("found"))]),
            ),
            ("spouse", Value::Null),
        ])
    }

    #[test]
    fn test_nested_and_indexed_paths() {
        let context = EvaluationContext::new();
        let target = customer();

        assert_eq!(
            resolve_path(&target, &path("address.city"), &context).unwrap(),
            Value::from("Leuven")
        );
        assert_eq!(
            resolve_path(&target, &path("orders[1].qty"), &context).unwrap(),
            Value::from(5)
        );
        assert_eq!(
            resolve_path(&target, &path("attributes[Test Key]"), &context).unwrap(),
            Value::from("found")
        );
        assert!(resolve_path(&target, &path("address.zip"), &context)
            .unwrap()
            .is_null());
    }

    #[test]
    fn test_default_index() {
        let target = customer();

        assert_eq!(
            resolve_path(
                &target,
                &path("orders[].qty"),
                &EvaluationContext::new().with_default_index(0)
            )
            .unwrap(),
            Value::from(2)
        );
        assert_matches!(
            resolve_path(&target, &path("orders[].qty"), &EvaluationContext::new()),
            Err(EvaluationError::NoDefaultIndex { .. })
        );
    }

    #[test]
    fn test_object_and_map_shapes() {
        let context = EvaluationContext::new();
        let target = customer();

        assert_matches!(
            resolve_path(&target, &path("nickname"), &context),
            Err(EvaluationError::PropertyNotFound { segment, .. }) if segment == "nickname"
        );
        assert!(resolve_path(&target, &path("attributes[Missing]"), &context)
            .unwrap()
            .is_null());

        let map_target = Value::map([("age", Value::from(30))]);
        assert!(resolve_path(&map_target, &path("nickname"), &context)
            .unwrap()
            .is_null());
    }

    #[test]
    fn test_path_failures() {
        let context = EvaluationContext::new();
        let target = customer();

        assert_matches!(
            resolve_path(&target, &path("spouse.name"), &context),
            Err(EvaluationError::NullIntermediate { segment, .. }) if segment == "name"
        );
        assert_matches!(
            resolve_path(&target, &path("orders[7].qty"), &context),
            Err(EvaluationError::IndexOutOfRange { index: 7, len: 2, .. })
        );
        assert_matches!(
            resolve_path(&target, &path("name[0]"), &context),
            Err(EvaluationError::InvalidOperand { .. })
        );
    }

    #[test]
    fn test_entry_lookup() {
        let target = customer();
        let attributes = resolve_path(&target, &path("attributes"), &EvaluationContext::new())
            .unwrap();

        assert_eq!(
            lookup_entry(&attributes, "Test Key", &path("attributes")).unwrap(),
            Value::from("found")
        );
        let orders = Value::List(vec![Value::from("a"), Value::from("b")]);
        assert_eq!(
            lookup_entry(&orders, "1", &path("orders")).unwrap(),
            Value::from("b")
        );
    }
}
