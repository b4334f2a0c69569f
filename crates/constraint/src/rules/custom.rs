//! Closure-backed constraints

use std::future::Future;

use crate::constraint::{AsyncFnConstraint, FnConstraint, TryFnConstraint, ValidationArguments};
use crate::error::BoxError;
use crate::record::ConstraintRecord;
use crate::value::Value;

/// A synchronous constraint from a closure.
pub fn custom<F>(name: &str, message: &str, predicate: F) -> ConstraintRecord
where
    F: Fn(&Value, &ValidationArguments) -> bool + Send + Sync + 'static,
{
    ConstraintRecord::new(FnConstraint::new(name, message, predicate))
}

/// A synchronous constraint whose closure may fault.
pub fn try_custom<F>(name: &str, message: &str, predicate: F) -> ConstraintRecord
where
    F: Fn(&Value, &ValidationArguments) -> Result<bool, BoxError> + Send + Sync + 'static,
{
    ConstraintRecord::new(TryFnConstraint::new(name, message, predicate))
}

/// An asynchronous constraint from a closure returning a future.
pub fn custom_async<F, Fut>(name: &str, message: &str, predicate: F) -> ConstraintRecord
where
    F: Fn(Value, ValidationArguments) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<bool, BoxError>> + Send + 'static,
{
    ConstraintRecord::new(AsyncFnConstraint::new(name, message, predicate))
}
