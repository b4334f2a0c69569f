//! # nebula-constraint
//!
//! A declarative object-validation engine. Structures register ordered
//! constraint records per field in an immutable [`ConstraintRegistry`]; a
//! [`Validator`] walks an instance, evaluates the records that apply, recurses
//! into nested structures and sequences, and returns a tree of
//! [`FieldOutcome`]s describing every failure.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use nebula_constraint::prelude::*;
//!
//! #[derive(Debug)]
//! struct Post {
//!     title: String,
//!     draft: bool,
//! }
//!
//! impl_validatable!(Post { title, draft });
//!
//! let registry = ConstraintRegistry::builder()
//!     .class(
//!         ClassSchema::builder::<Post>()
//!             .property("title", |p| {
//!                 p.validate_if(|post: &Post| !post.draft)
//!                     .rule(is_not_empty())
//!                     .rule(max_length(80))
//!             })
//!             .build(),
//!     )
//!     .build();
//!
//! let outcomes = Validator::new(registry)
//!     .validate(Arc::new(Post { title: String::new(), draft: false }))
//!     .await?;
//! assert_eq!(outcomes[0].constraints["isNotEmpty"], "title should not be empty");
//! ```
//!
//! ## Pipeline
//!
//! For every field of every instance:
//!
//! 1. `condition`: groups, the field gate, skip-if-empty and per-record
//!    conditions decide what runs.
//! 2. `executor`: selected checks run concurrently and are rejoined in
//!    declaration order.
//! 3. `nested`: nested-marked values are validated recursively.
//! 4. [`aggregate`]: passing outcomes are pruned from the tree.
//!
//! A failing constraint is data, not an error. Only faults (a predicate
//! erroring, malformed metadata, a cycle in the object graph) reject the call
//! with a [`ValidationFault`].

pub mod aggregate;
pub(crate) mod condition;
pub mod constraint;
pub mod error;
pub(crate) mod executor;
mod macros;
pub mod message;
pub(crate) mod nested;
pub mod options;
pub mod outcome;
pub mod prelude;
pub mod record;
pub mod registry;
pub mod rules;
pub mod validator;
pub mod value;
pub mod whitelist;

pub use constraint::{Constraint, Evaluation, ValidationArguments};
pub use error::{BoxError, RejectError, Result, ValidationFault};
pub use options::{ValidationErrorOptions, ValidatorOptions};
pub use outcome::FieldOutcome;
pub use record::{ConstraintRecord, Scope};
pub use registry::{ClassSchema, ConstraintRegistry};
pub use validator::Validator;
pub use value::{Validatable, Value};
