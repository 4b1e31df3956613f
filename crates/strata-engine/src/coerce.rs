//! Cleaning and type coercion for submitted form values.
//!
//! Pruning runs first so coercion never sees empty strings or keys the schema
//! does not declare; coercion then converts what remains to the declared
//! types, string-to-number and friends, the way lenient HTML inputs need.

use serde_json::{Map, Number, Value};

use strata_schema::{FieldDescriptor, FieldKind, ScalarKind};

use crate::error::ValidationError;

/// Empty for submission purposes: null, `""`, `[]`, `{}`. Zero and `false`
/// are real values.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(entries) => entries.is_empty(),
        _ => false,
    }
}

/// Drop keys the descriptor list does not declare and keys holding empty
/// values. Idempotent: pruning pruned output changes nothing.
pub fn prune(values: &Map<String, Value>, fields: &[FieldDescriptor]) -> Map<String, Value> {
    values
        .iter()
        .filter(|(key, value)| {
            fields.iter().any(|f| &f.key == *key) && !is_empty_value(value)
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Coerce each declared value to its descriptor's type. Keys without a
/// descriptor pass through untouched. The first uncoercible value aborts with
/// an error naming the field.
pub fn coerce(
    values: Map<String, Value>,
    fields: &[FieldDescriptor],
) -> Result<Map<String, Value>, ValidationError> {
    let mut out = Map::with_capacity(values.len());
    for (key, value) in values {
        let coerced = match fields.iter().find(|f| f.key == key) {
            Some(field) => coerce_value(&key, value, &field.kind)?,
            None => value,
        };
        out.insert(key, coerced);
    }
    Ok(out)
}

fn coerce_value(field: &str, value: Value, kind: &FieldKind) -> Result<Value, ValidationError> {
    match kind {
        FieldKind::Scalar(ScalarKind::Integer) => coerce_integer(field, value),
        FieldKind::Scalar(ScalarKind::Number) => coerce_number(field, value),
        FieldKind::Scalar(ScalarKind::Boolean) => Ok(Value::Bool(truthy(&value))),
        // Dates travel as strings; plain strings need no conversion.
        FieldKind::Scalar(ScalarKind::Str) | FieldKind::Scalar(ScalarKind::Date) => Ok(value),
        FieldKind::Object { .. } => coerce_object(field, value),
        FieldKind::Enum { .. } => Ok(coerce_list(value)),
    }
}

fn coerce_integer(field: &str, value: Value) -> Result<Value, ValidationError> {
    match &value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value),
        // Fractional input truncates rather than rounds.
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.is_finite() => Ok(Value::from(f.trunc() as i64)),
            _ => Err(ValidationError::new(field, "must be an integer")),
        },
        Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                return Ok(Value::from(i));
            }
            match trimmed.parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(Value::from(f.trunc() as i64)),
                _ => Err(ValidationError::new(field, "must be an integer")),
            }
        }
        _ => Err(ValidationError::new(field, "must be an integer")),
    }
}

fn coerce_number(field: &str, value: Value) -> Result<Value, ValidationError> {
    match &value {
        Value::Number(_) => Ok(value),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(f) if f.is_finite() => Number::from_f64(f)
                .map(Value::Number)
                .ok_or_else(|| ValidationError::new(field, "must be a number")),
            _ => Err(ValidationError::new(field, "must be a number")),
        },
        _ => Err(ValidationError::new(field, "must be a number")),
    }
}

/// Boolean coercion never fails; anything non-empty and non-zero is true.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Object-typed fields arriving as strings must be valid JSON.
fn coerce_object(field: &str, value: Value) -> Result<Value, ValidationError> {
    match value {
        Value::String(s) => serde_json::from_str(&s)
            .map_err(|_| ValidationError::new(field, "must be a valid JSON object")),
        other => Ok(other),
    }
}

/// List fields arriving as strings are decoded as JSON when possible,
/// otherwise split on commas. Never fails, so a lone selection like
/// `"Soltero"` becomes `["Soltero"]`.
fn coerce_list(value: Value) -> Value {
    match value {
        Value::String(s) => {
            if let Ok(parsed) = serde_json::from_str::<Value>(&s) {
                return parsed;
            }
            Value::Array(
                s.split(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(|part| Value::String(part.to_string()))
                    .collect(),
            )
        }
        other => other,
    }
}
