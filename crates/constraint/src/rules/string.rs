//! String constraints

use regex::Regex;

use super::names::{CONTAINS, LENGTH, MATCHES, MAX_LENGTH, MIN_LENGTH};
use super::parameter;
use crate::constraint::{FnConstraint, ValidationArguments};
use crate::record::ConstraintRecord;
use crate::value::Value;

fn char_count(value: &Value) -> Option<usize> {
    value.as_str().map(|s| s.chars().count())
}

fn bound(args: &ValidationArguments, index: usize) -> Option<usize> {
    parameter(args, index).as_u64().map(|n| n as usize)
}

/// String has at least `min` characters.
pub fn min_length(min: usize) -> ConstraintRecord {
    ConstraintRecord::new(FnConstraint::new(
        MIN_LENGTH,
        "$property must be longer than or equal to $constraint1 characters",
        |value: &Value, args: &ValidationArguments| {
            char_count(value).zip(bound(args, 0)).is_some_and(|(len, min)| len >= min)
        },
    ))
    .param(min)
}

/// String has at most `max` characters.
pub fn max_length(max: usize) -> ConstraintRecord {
    ConstraintRecord::new(FnConstraint::new(
        MAX_LENGTH,
        "$property must be shorter than or equal to $constraint1 characters",
        |value: &Value, args: &ValidationArguments| {
            char_count(value).zip(bound(args, 0)).is_some_and(|(len, max)| len <= max)
        },
    ))
    .param(max)
}

/// String length lies within `min..=max`.
pub fn length(min: usize, max: usize) -> ConstraintRecord {
    ConstraintRecord::new(FnConstraint::new(
        LENGTH,
        "$property must be longer than or equal to $constraint1 and shorter than or equal to $constraint2 characters",
        |value: &Value, args: &ValidationArguments| {
            match (char_count(value), bound(args, 0), bound(args, 1)) {
                (Some(len), Some(min), Some(max)) => (min..=max).contains(&len),
                _ => false,
            }
        },
    ))
    .param(min)
    .param(max)
}

/// String contains `seed`.
pub fn contains(seed: &str) -> ConstraintRecord {
    ConstraintRecord::new(FnConstraint::new(
        CONTAINS,
        "$property must contain a $constraint1 string",
        |value: &Value, args: &ValidationArguments| {
            value
                .as_str()
                .zip(parameter(args, 0).as_str())
                .is_some_and(|(s, seed)| s.contains(seed))
        },
    ))
    .param(seed)
}

/// String matches `pattern`.
pub fn matches(pattern: Regex) -> ConstraintRecord {
    let source = pattern.as_str().to_owned();
    ConstraintRecord::new(FnConstraint::new(
        MATCHES,
        "$property must match $constraint1 regular expression",
        move |value: &Value, _: &ValidationArguments| {
            value.as_str().is_some_and(|s| pattern.is_match(s))
        },
    ))
    .param(source)
}
