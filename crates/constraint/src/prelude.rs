//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use nebula_constraint::prelude::*;
//! ```

// ============================================================================
// ENGINE
// ============================================================================

pub use crate::error::{RejectError, ValidationFault};
pub use crate::options::ValidatorOptions;
pub use crate::outcome::FieldOutcome;
pub use crate::validator::Validator;

// ============================================================================
// METADATA
// ============================================================================

pub use crate::constraint::{Constraint, Evaluation, ValidationArguments};
pub use crate::record::ConstraintRecord;
pub use crate::registry::{ClassSchema, ConstraintRegistry};
pub use crate::value::{Validatable, Value};

// ============================================================================
// BUILT-IN CONSTRAINTS
// ============================================================================

pub use crate::rules::{
    contains, custom, custom_async, equals, is_array, is_boolean, is_defined, is_empty, is_in,
    is_int, is_not_empty, is_not_in, is_number, is_object, is_string, length, matches, max_length,
    min_length, not_equals, try_custom,
};

pub use crate::impl_validatable;
