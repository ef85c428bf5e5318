//! Constraint checks for primitive and array nodes
//!
//! Each check is independent and appends at most one error per violated
//! constraint, so a single value may collect several errors.
//!
//! Copyright (c) 2025 Datatype Team
//! Licensed under the Apache-2.0 license

use crate::model::{ArraySchema, Bound, NumberConstraints, StringConstraints};
use crate::validation::error::{DataPath, ErrorKind, ValidationError, ValidationErrors};
use crate::value;
use serde_json::{Number, Value};

pub(crate) fn check_string(
    text: &str,
    constraints: &StringConstraints,
    path: &DataPath,
    errors: &mut ValidationErrors,
) {
    let length = text.chars().count();

    if let Some(min) = constraints.min_length {
        if length < min {
            errors.add(ValidationError::new(
                path.clone(),
                ErrorKind::TooShort,
                format!("String length {} is less than minLength {}", length, min),
            ));
        }
    }

    if let Some(max) = constraints.max_length {
        if length > max {
            errors.add(ValidationError::new(
                path.clone(),
                ErrorKind::TooLong,
                format!("String length {} exceeds maxLength {}", length, max),
            ));
        }
    }

    if let Some(pattern) = &constraints.pattern {
        if !pattern.is_match(text) {
            errors.add(ValidationError::new(
                path.clone(),
                ErrorKind::PatternMismatch,
                format!("String {:?} does not match pattern {}", text, pattern),
            ));
        }
    }
}

pub(crate) fn check_number(
    number: &Number,
    constraints: &NumberConstraints,
    epsilon: f64,
    path: &DataPath,
    errors: &mut ValidationErrors,
) {
    let Some(actual) = number.as_f64() else {
        return;
    };

    if let Some(minimum) = constraints.minimum {
        if below(actual, minimum) {
            errors.add(ValidationError::new(
                path.clone(),
                ErrorKind::BelowMinimum,
                format!(
                    "Value {} is less than {}minimum {}",
                    number,
                    if minimum.exclusive { "or equal to exclusive " } else { "" },
                    minimum.value
                ),
            ));
        }
    }

    if let Some(maximum) = constraints.maximum {
        if above(actual, maximum) {
            errors.add(ValidationError::new(
                path.clone(),
                ErrorKind::AboveMaximum,
                format!(
                    "Value {} is greater than {}maximum {}",
                    number,
                    if maximum.exclusive { "or equal to exclusive " } else { "" },
                    maximum.value
                ),
            ));
        }
    }

    if let Some(divisor) = constraints.multiple_of {
        if !is_multiple_of(number, divisor, epsilon) {
            errors.add(ValidationError::new(
                path.clone(),
                ErrorKind::NotMultipleOf,
                format!("Value {} is not a multiple of {}", number, divisor),
            ));
        }
    }
}

fn below(actual: f64, bound: Bound) -> bool {
    if bound.exclusive {
        actual <= bound.value
    } else {
        actual < bound.value
    }
}

fn above(actual: f64, bound: Bound) -> bool {
    if bound.exclusive {
        actual >= bound.value
    } else {
        actual > bound.value
    }
}

/// Exact for integer data with an integral divisor, epsilon-tolerant otherwise
pub(crate) fn is_multiple_of(number: &Number, divisor: f64, epsilon: f64) -> bool {
    if divisor.fract() == 0.0 && divisor >= 1.0 && divisor <= i64::MAX as f64 {
        let divisor = divisor as i128;
        if let Some(v) = number.as_i64() {
            return i128::from(v) % divisor == 0;
        }
        if let Some(v) = number.as_u64() {
            return i128::from(v) % divisor == 0;
        }
    }

    let Some(v) = number.as_f64() else {
        return false;
    };
    let quotient = v / divisor;
    if !quotient.is_finite() {
        return false;
    }
    (quotient - quotient.round()).abs() <= epsilon * quotient.abs().max(1.0)
}

pub(crate) fn check_enum(
    data: &Value,
    allowed: Option<&[Value]>,
    path: &DataPath,
    errors: &mut ValidationErrors,
) {
    let Some(allowed) = allowed else {
        return;
    };
    if !allowed.iter().any(|candidate| value::structural_eq(candidate, data)) {
        let listed = allowed
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        errors.add(ValidationError::new(
            path.clone(),
            ErrorKind::NotInEnum,
            format!("Value {} is not one of: {}", value::preview(data), listed),
        ));
    }
}

pub(crate) fn check_array_bounds(
    items: &[Value],
    array: &ArraySchema,
    path: &DataPath,
    errors: &mut ValidationErrors,
) {
    if let Some(min) = array.min_items {
        if items.len() < min {
            errors.add(ValidationError::new(
                path.clone(),
                ErrorKind::TooFewItems,
                format!("Array has {} item(s), fewer than minItems {}", items.len(), min),
            ));
        }
    }

    if let Some(max) = array.max_items {
        if items.len() > max {
            errors.add(ValidationError::new(
                path.clone(),
                ErrorKind::TooManyItems,
                format!("Array has {} item(s), more than maxItems {}", items.len(), max),
            ));
        }
    }
}

/// One error per element that repeats an earlier element
pub(crate) fn check_unique(items: &[Value], path: &DataPath, errors: &mut ValidationErrors) {
    for (index, item) in items.iter().enumerate() {
        if let Some(first) = items[..index]
            .iter()
            .position(|earlier| value::structural_eq(earlier, item))
        {
            errors.add(ValidationError::new(
                path.child(index),
                ErrorKind::DuplicateItem,
                format!("Item at index {} duplicates the item at index {}", index, first),
            ));
        }
    }
}
