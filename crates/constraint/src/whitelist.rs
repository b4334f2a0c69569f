//! Whitelist collaborator
//!
//! Targets are read-only, so undeclared properties cannot be stripped. With
//! `forbid_non_whitelisted` each one becomes a `whitelistValidation` failure;
//! callers that want to strip instead can use [`undeclared`] themselves.

use std::sync::Arc;

use crate::outcome::FieldOutcome;
use crate::registry::ClassSchema;
use crate::validator::Walk;
use crate::value::Validatable;

/// Constraint name of undeclared-property failures.
pub const WHITELIST_VALIDATION: &str = "whitelistValidation";

/// Instance properties the schema declares nothing for, in instance order.
pub fn undeclared(target: &dyn Validatable, schema: &ClassSchema) -> Vec<&'static str> {
    target
        .property_names()
        .into_iter()
        .filter(|name| schema.property(name).is_none())
        .collect()
}

/// One failing outcome per undeclared property.
pub(crate) fn violations(
    walk: &Walk<'_>,
    target: &Arc<dyn Validatable>,
    target_name: &Arc<str>,
    schema: &ClassSchema,
) -> Vec<FieldOutcome> {
    undeclared(target.as_ref(), schema)
        .into_iter()
        .map(|name| {
            let value = target.property(name);
            let mut outcome = walk.outcome(target, target_name, name, &value);
            outcome.fail(
                WHITELIST_VALIDATION,
                format!("property {name} should not exist"),
                None,
            );
            outcome
        })
        .collect()
}
