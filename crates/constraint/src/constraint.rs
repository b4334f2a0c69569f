//! Constraint predicates
//!
//! A [`Constraint`] is the pure predicate behind a record: it receives the
//! field value plus the [`ValidationArguments`] describing where the value came
//! from and answers pass or fail, either immediately or through a deferred
//! future. Returning an `Err` is a fault, not a failure, and aborts the whole
//! validation call.
//!
//! # Examples
//!
//! ```rust,ignore
//! use nebula_constraint::constraint::{Constraint, Evaluation, ValidationArguments};
//! use nebula_constraint::Value;
//!
//! struct IsPositive;
//!
//! impl Constraint for IsPositive {
//!     fn name(&self) -> &str {
//!         "isPositive"
//!     }
//!
//!     fn evaluate<'a>(&'a self, value: &'a Value, _args: &'a ValidationArguments) -> Evaluation<'a> {
//!         Evaluation::from(value.as_f64().is_some_and(|n| n > 0.0))
//!     }
//!
//!     fn default_message(&self, _args: &ValidationArguments) -> String {
//!         "$property must be a positive number".into()
//!     }
//! }
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};

use crate::error::BoxError;
use crate::value::{Validatable, Value};

// ============================================================================
// VALIDATION ARGUMENTS
// ============================================================================

/// Context handed to every predicate and message template.
#[derive(Clone)]
pub struct ValidationArguments {
    /// Short type name of the owning instance.
    pub target_name: Arc<str>,
    /// Property being validated.
    pub property: String,
    /// The owning instance.
    pub object: Arc<dyn Validatable>,
    /// The property's value as read at validation time.
    pub value: Value,
    /// Record parameters, in declaration order.
    pub constraints: Vec<serde_json::Value>,
}

impl fmt::Debug for ValidationArguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationArguments")
            .field("target_name", &self.target_name)
            .field("property", &self.property)
            .field("value", &self.value)
            .field("constraints", &self.constraints)
            .finish()
    }
}

// ============================================================================
// EVALUATION
// ============================================================================

/// Outcome of invoking a predicate.
pub enum Evaluation<'a> {
    /// The outcome is known immediately.
    Ready(Result<bool, BoxError>),
    /// The outcome arrives later.
    Deferred(BoxFuture<'a, Result<bool, BoxError>>),
}

impl<'a> Evaluation<'a> {
    /// Immediate pass.
    pub fn pass() -> Self {
        Self::Ready(Ok(true))
    }

    /// Immediate failure.
    pub fn fail() -> Self {
        Self::Ready(Ok(false))
    }

    /// Immediate fault.
    pub fn fault(error: impl Into<BoxError>) -> Self {
        Self::Ready(Err(error.into()))
    }

    /// Wraps a future producing the outcome.
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = Result<bool, BoxError>> + Send + 'a,
    {
        Self::Deferred(future.boxed())
    }

    /// Returns `true` if the outcome is not yet known.
    pub fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred(_))
    }

    /// Waits for the outcome.
    pub async fn resolve(self) -> Result<bool, BoxError> {
        match self {
            Self::Ready(outcome) => outcome,
            Self::Deferred(future) => future.await,
        }
    }
}

impl From<bool> for Evaluation<'_> {
    fn from(valid: bool) -> Self {
        Self::Ready(Ok(valid))
    }
}

impl fmt::Debug for Evaluation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(outcome) => f.debug_tuple("Ready").field(outcome).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

// ============================================================================
// CONSTRAINT TRAIT
// ============================================================================

/// A named predicate over a field value.
pub trait Constraint: Send + Sync {
    /// Name used as the key in an outcome's constraint map.
    fn name(&self) -> &str;

    /// Evaluates the predicate.
    fn evaluate<'a>(&'a self, value: &'a Value, args: &'a ValidationArguments) -> Evaluation<'a>;

    /// Message template used when a record carries no explicit message.
    fn default_message(&self, _args: &ValidationArguments) -> String {
        String::new()
    }

    /// Whether the predicate is asynchronous.
    ///
    /// Asynchronous constraints are skipped by
    /// [`Validator::validate_sync`](crate::Validator::validate_sync).
    fn is_async(&self) -> bool {
        false
    }
}

// ============================================================================
// CLOSURE ADAPTERS
// ============================================================================

/// A synchronous constraint built from a closure.
pub struct FnConstraint<F> {
    name: String,
    message: String,
    predicate: F,
}

impl<F> FnConstraint<F>
where
    F: Fn(&Value, &ValidationArguments) -> bool + Send + Sync,
{
    /// Creates a constraint with a name and a default message template.
    pub fn new(name: impl Into<String>, message: impl Into<String>, predicate: F) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            predicate,
        }
    }
}

impl<F> Constraint for FnConstraint<F>
where
    F: Fn(&Value, &ValidationArguments) -> bool + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate<'a>(&'a self, value: &'a Value, args: &'a ValidationArguments) -> Evaluation<'a> {
        Evaluation::from((self.predicate)(value, args))
    }

    fn default_message(&self, _args: &ValidationArguments) -> String {
        self.message.clone()
    }
}

/// A synchronous constraint whose closure may fault.
pub struct TryFnConstraint<F> {
    name: String,
    message: String,
    predicate: F,
}

impl<F> TryFnConstraint<F>
where
    F: Fn(&Value, &ValidationArguments) -> Result<bool, BoxError> + Send + Sync,
{
    /// Creates a fallible constraint.
    pub fn new(name: impl Into<String>, message: impl Into<String>, predicate: F) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            predicate,
        }
    }
}

impl<F> Constraint for TryFnConstraint<F>
where
    F: Fn(&Value, &ValidationArguments) -> Result<bool, BoxError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate<'a>(&'a self, value: &'a Value, args: &'a ValidationArguments) -> Evaluation<'a> {
        Evaluation::Ready((self.predicate)(value, args))
    }

    fn default_message(&self, _args: &ValidationArguments) -> String {
        self.message.clone()
    }
}

/// An asynchronous constraint built from a closure returning a future.
///
/// The closure receives owned copies of the value and arguments so the future
/// does not borrow from the engine.
pub struct AsyncFnConstraint<F> {
    name: String,
    message: String,
    predicate: F,
}

impl<F, Fut> AsyncFnConstraint<F>
where
    F: Fn(Value, ValidationArguments) -> Fut + Send + Sync,
    Fut: Future<Output = Result<bool, BoxError>> + Send + 'static,
{
    /// Creates an asynchronous constraint.
    pub fn new(name: impl Into<String>, message: impl Into<String>, predicate: F) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            predicate,
        }
    }
}

impl<F, Fut> Constraint for AsyncFnConstraint<F>
where
    F: Fn(Value, ValidationArguments) -> Fut + Send + Sync,
    Fut: Future<Output = Result<bool, BoxError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn evaluate<'a>(&'a self, value: &'a Value, args: &'a ValidationArguments) -> Evaluation<'a> {
        Evaluation::deferred((self.predicate)(value.clone(), args.clone()))
    }

    fn default_message(&self, _args: &ValidationArguments) -> String {
        self.message.clone()
    }

    fn is_async(&self) -> bool {
        true
    }
}

// ============================================================================
// TESTS
// ============================================================================
