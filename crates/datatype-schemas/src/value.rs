//! Helpers over decoded data values
//!
//! Copyright (c) 2025 Datatype Team
//! Licensed under the Apache-2.0 license

use serde_json::{Number, Value};

/// Returns the kind name of a data value for error messages.
///
/// Numbers with no fractional part report as `integer`.
pub fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) => {
            if is_integral(n) {
                "integer"
            } else {
                "number"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Whether a number has no fractional part
pub fn is_integral(number: &Number) -> bool {
    if number.is_i64() || number.is_u64() {
        return true;
    }
    number
        .as_f64()
        .map(|f| f.is_finite() && f.fract() == 0.0)
        .unwrap_or(false)
}

/// Deep structural equality where numbers compare by value (`1 == 1.0`)
pub fn structural_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => numbers_eq(a, b),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| structural_eq(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(key, x)| b.get(key).map(|y| structural_eq(x, y)).unwrap_or(false))
        }
        _ => left == right,
    }
}

fn numbers_eq(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

/// Render a value compactly for messages, truncating long output
pub fn preview(value: &Value) -> String {
    const MAX: usize = 64;
    let rendered = value.to_string();
    if rendered.chars().count() > MAX {
        let truncated: String = rendered.chars().take(MAX).collect();
        format!("{}...", truncated)
    } else {
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_name() {
        assert_eq!(kind_name(&json!(null)), "null");
        assert_eq!(kind_name(&json!(3)), "integer");
        assert_eq!(kind_name(&json!(3.0)), "integer");
        assert_eq!(kind_name(&json!(3.5)), "number");
        assert_eq!(kind_name(&json!("x")), "string");
        assert_eq!(kind_name(&json!([])), "array");
        assert_eq!(kind_name(&json!({})), "object");
    }

    #[test]
    fn test_structural_eq_numbers() {
        assert!(structural_eq(&json!(1), &json!(1.0)));
        assert!(!structural_eq(&json!(1), &json!(1.5)));
        assert!(structural_eq(&json!({"a": [1, 2]}), &json!({"a": [1.0, 2]})));
        assert!(!structural_eq(&json!({"a": 1}), &json!({"a": 1, "b": 2})));
        assert!(!structural_eq(&json!("1"), &json!(1)));
    }

    #[test]
    fn test_preview_truncates() {
        let long = json!("x".repeat(200));
        assert!(preview(&long).ends_with("..."));
        assert_eq!(preview(&json!(42)), "42");
    }
}
