//! Fatal faults raised by the validation engine
//!
//! An ordinary constraint failure is never an error here: it is recorded in
//! the outcome tree. The types in this module describe the cases where the
//! validation attempt itself could not complete.
use thiserror::Error;

use crate::outcome::FieldOutcome;

/// Boxed error returned by constraint predicates that fault.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Result type for validation calls.
pub type Result<T> = std::result::Result<T, ValidationFault>;

/// A fault that aborts a whole `validate` call.
#[derive(Error, Debug)]
pub enum ValidationFault {
    /// A constraint predicate faulted instead of returning an outcome.
    #[error("Constraint '{constraint}' faulted on {target}.{property}: {source}")]
    Constraint {
        /// Name of the faulting constraint
        constraint: String,
        /// Type name of the owning instance
        target: String,
        /// Property being validated
        property: String,
        /// The underlying fault
        #[source]
        source: BoxError,
    },

    /// Registry metadata for a type is inconsistent.
    #[error("Malformed constraint metadata for {target}.{property}: {reason}")]
    MalformedMetadata {
        /// Type name of the schema
        target: String,
        /// Offending property (empty when the schema as a whole is at fault)
        property: String,
        /// What is wrong with the metadata
        reason: String,
    },

    /// Nested traversal re-entered an instance already on the recursion path.
    #[error("Cycle detected while validating {target} at '{path}'")]
    Cycle {
        /// Type name of the re-entered instance
        target: String,
        /// Property path from the root to the re-entry point
        path: String,
    },
}

impl ValidationFault {
    /// Creates a malformed-metadata fault.
    pub fn malformed(
        target: impl Into<String>,
        property: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedMetadata {
            target: target.into(),
            property: property.into(),
            reason: reason.into(),
        }
    }

    /// Returns the name of the faulting constraint, if any.
    pub fn constraint_name(&self) -> Option<&str> {
        match self {
            Self::Constraint { constraint, .. } => Some(constraint),
            _ => None,
        }
    }
}

/// Error returned by [`Validator::validate_or_reject`](crate::Validator::validate_or_reject).
#[derive(Error, Debug)]
pub enum RejectError {
    /// The instance is invalid.
    #[error("Validation failed with {} error(s)", .0.len())]
    Invalid(Vec<FieldOutcome>),

    /// The validation attempt itself could not complete.
    #[error(transparent)]
    Fault(#[from] ValidationFault),
}

impl RejectError {
    /// Returns the outcome tree when the instance was invalid.
    pub fn outcomes(&self) -> Option<&[FieldOutcome]> {
        match self {
            Self::Invalid(outcomes) => Some(outcomes),
            Self::Fault(_) => None,
        }
    }

    /// Returns `true` if the rejection is a fatal fault.
    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Fault(_))
    }
}
