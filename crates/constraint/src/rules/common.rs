//! Presence and comparison constraints

use super::names::{EQUALS, IS_DEFINED, IS_EMPTY, IS_IN, IS_NOT_EMPTY, IS_NOT_IN, NOT_EQUALS};
use super::parameter;
use crate::constraint::{FnConstraint, ValidationArguments};
use crate::record::ConstraintRecord;
use crate::value::Value;

/// Value is neither absent nor null.
///
/// Runs even when the skip-missing family of options would skip the field.
pub fn is_defined() -> ConstraintRecord {
    ConstraintRecord::new(FnConstraint::new(
        IS_DEFINED,
        "$property should not be null or undefined",
        |value: &Value, _: &ValidationArguments| !value.is_empty(),
    ))
    .presence()
}

/// Value is not an empty string, null or absent.
pub fn is_not_empty() -> ConstraintRecord {
    ConstraintRecord::new(FnConstraint::new(
        IS_NOT_EMPTY,
        "$property should not be empty",
        |value: &Value, _: &ValidationArguments| !is_blank(value),
    ))
}

/// Value is an empty string, null or absent.
pub fn is_empty() -> ConstraintRecord {
    ConstraintRecord::new(FnConstraint::new(
        IS_EMPTY,
        "$property must be empty",
        |value: &Value, _: &ValidationArguments| is_blank(value),
    ))
}

/// Value strictly equals `comparison`.
pub fn equals(comparison: impl Into<serde_json::Value>) -> ConstraintRecord {
    ConstraintRecord::new(FnConstraint::new(
        EQUALS,
        "$property must be equal to $constraint1",
        |value: &Value, args: &ValidationArguments| value.strict_eq(parameter(args, 0)),
    ))
    .param(comparison)
}

/// Value does not strictly equal `comparison`.
pub fn not_equals(comparison: impl Into<serde_json::Value>) -> ConstraintRecord {
    ConstraintRecord::new(FnConstraint::new(
        NOT_EQUALS,
        "$property should not be equal to $constraint1",
        |value: &Value, args: &ValidationArguments| !value.strict_eq(parameter(args, 0)),
    ))
    .param(comparison)
}

/// Value is one of `allowed`.
pub fn is_in<I, V>(allowed: I) -> ConstraintRecord
where
    I: IntoIterator<Item = V>,
    V: Into<serde_json::Value>,
{
    ConstraintRecord::new(FnConstraint::new(
        IS_IN,
        "$property must be one of the following values: $constraint1",
        |value: &Value, args: &ValidationArguments| one_of(value, parameter(args, 0)),
    ))
    .param(collect(allowed))
}

/// Value is none of `disallowed`.
pub fn is_not_in<I, V>(disallowed: I) -> ConstraintRecord
where
    I: IntoIterator<Item = V>,
    V: Into<serde_json::Value>,
{
    ConstraintRecord::new(FnConstraint::new(
        IS_NOT_IN,
        "$property should not be one of the following values: $constraint1",
        |value: &Value, args: &ValidationArguments| !one_of(value, parameter(args, 0)),
    ))
    .param(collect(disallowed))
}

fn is_blank(value: &Value) -> bool {
    value.is_empty() || value.as_str() == Some("")
}

fn collect<I, V>(values: I) -> serde_json::Value
where
    I: IntoIterator<Item = V>,
    V: Into<serde_json::Value>,
{
    serde_json::Value::Array(values.into_iter().map(Into::into).collect())
}

fn one_of(value: &Value, candidates: &serde_json::Value) -> bool {
    candidates
        .as_array()
        .is_some_and(|items| items.iter().any(|item| value.strict_eq(item)))
}
