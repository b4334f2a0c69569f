//! Deciding which records of a field run
//!
//! For one property of one instance, [`plan`] filters the declared records
//! down to the ones that apply to the current call:
//!
//! 1. records outside the requested groups are dropped,
//! 2. a closed gate suppresses the whole field,
//! 3. an empty value on an optional field drops every non-nested record,
//! 4. the skip-missing family drops every non-presence record,
//! 5. each remaining record's own condition is evaluated.

use crate::options::ValidatorOptions;
use crate::record::{ConstraintRecord, Scope};
use crate::registry::PropertySchema;
use crate::value::{Validatable, Value};

/// The records of one field that will actually run.
#[derive(Debug, Default)]
pub(crate) struct FieldPlan<'s> {
    /// Constraint checks, in declaration order.
    pub(crate) checks: Vec<&'s ConstraintRecord>,
    /// The nested marker that opened traversal, if any.
    pub(crate) nested: Option<&'s ConstraintRecord>,
}

impl FieldPlan<'_> {
    pub(crate) fn is_empty(&self) -> bool {
        self.checks.is_empty() && self.nested.is_none()
    }
}

fn in_scope(scope: &Scope, options: &ValidatorOptions) -> bool {
    scope.applies(&options.groups, options.always, options.strict_groups)
}

/// Whether the gates of a field let it through.
pub(crate) fn gate_open(
    property: &PropertySchema,
    target: &dyn Validatable,
    options: &ValidatorOptions,
) -> bool {
    property
        .gates
        .iter()
        .filter(|gate| in_scope(&gate.scope, options))
        .all(|gate| gate.is_open(target))
}

/// Whether the field is optional for this call.
pub(crate) fn is_optional(property: &PropertySchema, options: &ValidatorOptions) -> bool {
    property
        .optional
        .as_ref()
        .is_some_and(|scope| in_scope(scope, options))
}

/// Whether a record's own condition holds.
pub(crate) fn should_run(record: &ConstraintRecord, value: &Value, target: &dyn Validatable) -> bool {
    record
        .condition
        .as_ref()
        .is_none_or(|condition| condition(value, target))
}

/// Decides which records of `property` run against `value`.
pub(crate) fn plan<'s>(
    property: &'s PropertySchema,
    value: &Value,
    target: &dyn Validatable,
    options: &ValidatorOptions,
) -> FieldPlan<'s> {
    let mut plan = FieldPlan::default();

    let applicable = property
        .records
        .iter()
        .filter(|record| in_scope(&record.scope, options));

    if !gate_open(property, target, options) {
        return plan;
    }

    let optional_empty = value.is_empty() && is_optional(property, options);
    let skipped = options.skips(value);

    for record in applicable {
        if record.is_nested() {
            if skipped || !should_run(record, value, target) {
                continue;
            }
            plan.nested.get_or_insert(record);
            continue;
        }
        if optional_empty || (skipped && !record.is_presence()) {
            continue;
        }
        if should_run(record, value, target) {
            plan.checks.push(record);
        }
    }

    plan
}
