//! # Decoded Value Algebra
//!
//! Structural equality and shape helpers over `serde_json::Value`.
//!
//! Equality is defined per variant rather than by delegating to
//! `PartialEq` so the rules are visible in one place:
//!
//! - null equals null;
//! - booleans and strings compare by value;
//! - numbers compare by their decoded representation, so `1` and `1.0`
//!   are different values (an integer and a float);
//! - lists compare element by element, in order;
//! - maps compare by key set and per-key value, independent of key order;
//! - any two values of different kinds are unequal.

use serde_json::Value;

/// Deep structural equality over the decoded value algebra.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| deep_equal(l, r))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(k, l)| y.get(k).is_some_and(|r| deep_equal(l, r)))
        }
        _ => false,
    }
}

/// Short name of a value's kind, for log fields and messages.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
