//! Type constraints

use super::names::{IS_ARRAY, IS_BOOLEAN, IS_INT, IS_NUMBER, IS_OBJECT, IS_STRING};
use crate::constraint::{FnConstraint, ValidationArguments};
use crate::record::ConstraintRecord;
use crate::value::Value;

/// Value is a string.
pub fn is_string() -> ConstraintRecord {
    ConstraintRecord::new(FnConstraint::new(
        IS_STRING,
        "$property must be a string",
        |value: &Value, _: &ValidationArguments| value.is_string(),
    ))
}

/// Value is a finite number.
pub fn is_number() -> ConstraintRecord {
    ConstraintRecord::new(FnConstraint::new(
        IS_NUMBER,
        "$property must be a number conforming to the specified constraints",
        |value: &Value, _: &ValidationArguments| value.as_f64().is_some_and(f64::is_finite),
    ))
}

/// Value is an integer number.
pub fn is_int() -> ConstraintRecord {
    ConstraintRecord::new(FnConstraint::new(
        IS_INT,
        "$property must be an integer number",
        |value: &Value, _: &ValidationArguments| match value {
            Value::Int(_) => true,
            Value::Float(n) => n.is_finite() && n.fract() == 0.0,
            _ => false,
        },
    ))
}

/// Value is a boolean.
pub fn is_boolean() -> ConstraintRecord {
    ConstraintRecord::new(FnConstraint::new(
        IS_BOOLEAN,
        "$property must be a boolean value",
        |value: &Value, _: &ValidationArguments| matches!(value, Value::Bool(_)),
    ))
}

/// Value is a sequence.
pub fn is_array() -> ConstraintRecord {
    ConstraintRecord::new(FnConstraint::new(
        IS_ARRAY,
        "$property must be an array",
        |value: &Value, _: &ValidationArguments| value.is_list(),
    ))
}

/// Value is a structure instance.
pub fn is_object() -> ConstraintRecord {
    ConstraintRecord::new(FnConstraint::new(
        IS_OBJECT,
        "$property must be an object",
        |value: &Value, _: &ValidationArguments| value.is_object(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testing::check;

    #[test]
    fn test_is_string() {
        assert!(check(&is_string(), Value::from("")));
        assert!(!check(&is_string(), Value::from(80)));
    }

    #[test]
    fn test_is_number_and_int() {
        assert!(check(&is_number(), Value::from(1.5)));
        assert!(!check(&is_number(), Value::from(f64::NAN)));
        assert!(check(&is_int(), Value::from(2.0)));
        assert!(!check(&is_int(), Value::from(2.5)));
    }

    #[test]
    fn test_is_boolean_and_array() {
        assert!(check(&is_boolean(), Value::from(false)));
        assert!(check(&is_array(), Value::from(vec![1])));
        assert!(!check(&is_array(), Value::from("x")));
        assert!(!check(&is_object(), Value::Null));
    }
}
