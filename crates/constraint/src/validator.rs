//! Validation orchestrator
//!
//! [`Validator`] drives one validation call: it checks the integrity of every
//! registered schema before any field work, looks up the target's schema,
//! plans every field, runs constraint checks and nested traversal
//! concurrently, and prunes the result into the outcome tree.
//!
//! A call resolves to `Ok(outcomes)` in both the valid (empty) and the invalid
//! case. `Err` means the attempt itself could not complete.
//!
//! # Examples
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use nebula_constraint::{rules, ClassSchema, ConstraintRegistry, Validator};
//!
//! let registry = ConstraintRegistry::builder()
//!     .class(
//!         ClassSchema::builder::<Post>()
//!             .property("title", |p| p.rule(rules::is_not_empty()))
//!             .build(),
//!     )
//!     .build();
//!
//! let validator = Validator::new(registry);
//! let outcomes = validator.validate(Arc::new(post)).await?;
//! assert!(outcomes.is_empty());
//! ```

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, try_join, try_join_all};

use crate::aggregate;
use crate::condition;
use crate::error::{RejectError, Result, ValidationFault};
use crate::executor::{FieldContext, run_checks};
use crate::nested::{Nested, Site, traverse};
use crate::options::ValidatorOptions;
use crate::outcome::FieldOutcome;
use crate::record::NESTED_VALIDATION;
use crate::registry::{ClassSchema, ConstraintRegistry, PropertySchema};
use crate::value::{Validatable, Value, instance_id, type_key};
use crate::whitelist;

/// Constraint name of the failure reported for targets without metadata.
pub const UNKNOWN_VALUE: &str = "unknownValue";

const UNKNOWN_VALUE_MESSAGE: &str = "an unknown value was passed to the validate function";

// ============================================================================
// VALIDATOR
// ============================================================================

/// Validates instances against a shared, immutable registry.
///
/// Cloning is cheap; clones share the registry. Concurrent calls on the same
/// or different validators never contend.
#[derive(Debug, Clone)]
pub struct Validator {
    registry: Arc<ConstraintRegistry>,
    options: ValidatorOptions,
}

impl Validator {
    /// Creates a validator with default options.
    pub fn new(registry: impl Into<Arc<ConstraintRegistry>>) -> Self {
        Self {
            registry: registry.into(),
            options: ValidatorOptions::default(),
        }
    }

    /// Replaces the default options used by calls without explicit options.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_options(mut self, options: ValidatorOptions) -> Self {
        self.options = options;
        self
    }

    /// The registry.
    pub fn registry(&self) -> &ConstraintRegistry {
        &self.registry
    }

    /// The default options.
    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    /// Validates `target` with the default options.
    pub async fn validate<T: Validatable>(&self, target: Arc<T>) -> Result<Vec<FieldOutcome>> {
        self.run(target, &self.options, false).await
    }

    /// Validates `target` with explicit options.
    pub async fn validate_with<T: Validatable>(
        &self,
        target: Arc<T>,
        options: &ValidatorOptions,
    ) -> Result<Vec<FieldOutcome>> {
        self.run(target, options, false).await
    }

    /// Validates a type-erased target.
    pub async fn validate_dyn(
        &self,
        target: Arc<dyn Validatable>,
        options: &ValidatorOptions,
    ) -> Result<Vec<FieldOutcome>> {
        self.run(target, options, false).await
    }

    /// Validates `target` on the current thread.
    ///
    /// Constraints flagged asynchronous are ignored, as are deferred outcomes
    /// of synchronous ones.
    pub fn validate_sync<T: Validatable>(&self, target: Arc<T>) -> Result<Vec<FieldOutcome>> {
        self.validate_sync_with(target, &self.options)
    }

    /// Like [`validate_sync`](Self::validate_sync), with explicit options.
    pub fn validate_sync_with<T: Validatable>(
        &self,
        target: Arc<T>,
        options: &ValidatorOptions,
    ) -> Result<Vec<FieldOutcome>> {
        futures::executor::block_on(self.run(target, options, true))
    }

    /// Validates `target` and rejects unless it is valid.
    pub async fn validate_or_reject<T: Validatable>(
        &self,
        target: Arc<T>,
    ) -> std::result::Result<(), RejectError> {
        let outcomes = self.validate(target).await?;
        if outcomes.is_empty() {
            Ok(())
        } else {
            Err(RejectError::Invalid(outcomes))
        }
    }

    async fn run(
        &self,
        target: Arc<dyn Validatable>,
        options: &ValidatorOptions,
        sync: bool,
    ) -> Result<Vec<FieldOutcome>> {
        let target_type = target.type_name();
        tracing::debug!(target_type, sync, groups = ?options.groups, "validation started");

        if let Err(fault) = self.registry.check() {
            tracing::warn!(target_type, error = %fault, "validation aborted");
            return Err(fault);
        }

        let walk = Walk {
            registry: &self.registry,
            options,
            sync,
        };
        match walk.object(target, String::new(), Vec::new()).await {
            Ok(outcomes) => {
                tracing::debug!(target_type, failures = outcomes.len(), "validation finished");
                Ok(outcomes)
            }
            Err(fault) => {
                tracing::warn!(target_type, error = %fault, "validation aborted");
                Err(fault)
            }
        }
    }
}

// ============================================================================
// WALK
// ============================================================================

/// State shared by every step of one validation call.
pub(crate) struct Walk<'a> {
    pub(crate) registry: &'a ConstraintRegistry,
    pub(crate) options: &'a ValidatorOptions,
    pub(crate) sync: bool,
}

impl Walk<'_> {
    /// Validates one instance and returns its pruned outcomes.
    pub(crate) fn object(
        &self,
        target: Arc<dyn Validatable>,
        path: String,
        mut ancestry: Vec<usize>,
    ) -> BoxFuture<'_, Result<Vec<FieldOutcome>>> {
        async move {
            let schema = self.registry.schema(type_key(target.as_ref()));
            let target_name: Arc<str> = match schema {
                Some(schema) => Arc::clone(&schema.name),
                None => Arc::from(target.type_name()),
            };

            let id = instance_id(&target);
            if ancestry.contains(&id) {
                return Err(ValidationFault::Cycle {
                    target: target_name.to_string(),
                    path,
                });
            }
            ancestry.push(id);

            let Some(schema) = schema.filter(|schema| self.has_applicable(schema)) else {
                return Ok(self.unknown(&target, &target_name));
            };

            let mut outcomes = Vec::new();
            if self.options.whitelist && self.options.forbid_non_whitelisted {
                outcomes.extend(whitelist::violations(self, &target, &target_name, schema));
            }

            let fields = try_join_all(
                schema
                    .properties()
                    .iter()
                    .map(|property| self.field(&target, &target_name, property, &path, &ancestry)),
            )
            .await?;
            outcomes.extend(fields.into_iter().flatten());

            Ok(aggregate::prune(outcomes))
        }
        .boxed()
    }

    async fn field(
        &self,
        target: &Arc<dyn Validatable>,
        target_name: &Arc<str>,
        property: &PropertySchema,
        path: &str,
        ancestry: &[usize],
    ) -> Result<Option<FieldOutcome>> {
        let value = target.property(property.name());
        let plan = condition::plan(property, &value, target.as_ref(), self.options);
        if plan.is_empty() {
            tracing::trace!(target_type = %target_name, property = property.name(), "field skipped");
            return Ok(None);
        }

        let ctx = FieldContext {
            registry: self.registry,
            options: self.options,
            sync: self.sync,
            target,
            target_name,
            property: property.name(),
            value: &value,
        };
        let field_path = if path.is_empty() {
            property.name().to_owned()
        } else {
            format!("{path}.{}", property.name())
        };
        let site = Site {
            owner: target,
            owner_name: target_name,
            path: &field_path,
            ancestry,
        };
        let nested = async {
            match plan.nested {
                Some(record) => traverse(self, site, record, property.name(), &value).await,
                None => Ok(Nested::default()),
            }
        };

        let (failures, nested) = try_join(run_checks(&ctx, &plan.checks), nested).await?;

        let mut outcome = self.outcome(target, target_name, property.name(), &value);
        for failure in failures {
            outcome.fail(&failure.name, failure.message, failure.context.as_ref());
        }
        if let Some(message) = nested.failure {
            let context = plan.nested.and_then(|record| record.context.as_ref());
            outcome.fail(NESTED_VALIDATION, message, context);
        }
        outcome.children = nested.children;
        Ok(Some(outcome))
    }

    /// Creates an outcome shaped by the call's population options.
    pub(crate) fn outcome(
        &self,
        target: &Arc<dyn Validatable>,
        target_name: &Arc<str>,
        property: &str,
        value: &Value,
    ) -> FieldOutcome {
        let shape = self.options.validation_error;
        FieldOutcome::new(
            shape.target.then(|| Arc::clone(target)),
            Arc::clone(target_name),
            property,
            shape.value.then(|| value.clone()),
        )
    }

    fn has_applicable(&self, schema: &ClassSchema) -> bool {
        let options = self.options;
        schema.properties().iter().any(|property| {
            property
                .records()
                .iter()
                .any(|record| record.scope().applies(&options.groups, options.always, options.strict_groups))
        })
    }

    fn unknown(&self, target: &Arc<dyn Validatable>, target_name: &Arc<str>) -> Vec<FieldOutcome> {
        if !self.options.forbid_unknown_values {
            return Vec::new();
        }
        tracing::debug!(target_type = %target_name, "no applicable constraints for target");
        let mut outcome = FieldOutcome::new(
            self.options
                .validation_error
                .target
                .then(|| Arc::clone(target)),
            Arc::clone(target_name),
            "",
            None,
        );
        outcome.fail(UNKNOWN_VALUE, UNKNOWN_VALUE_MESSAGE.to_owned(), None);
        vec![outcome]
    }
}
