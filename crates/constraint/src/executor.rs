//! Running constraint checks
//!
//! Every selected record of a field is turned into one unit of work. Units are
//! dispatched together and joined with [`try_join_all`], which keeps the
//! results in declaration order no matter which deferred predicate resolves
//! first, and aborts the field on the first fault.

use std::sync::Arc;

use futures::future::try_join_all;

use crate::constraint::{Constraint, ValidationArguments};
use crate::error::{BoxError, Result, ValidationFault};
use crate::message::render;
use crate::options::ValidatorOptions;
use crate::record::{ConstraintRecord, RecordKind};
use crate::registry::ConstraintRegistry;
use crate::value::{Validatable, Value};

/// Prefix of default messages for records applied to every element.
pub(crate) const EACH_PREFIX: &str = "each value in ";

/// Everything a check needs to know about the field it runs on.
pub(crate) struct FieldContext<'a> {
    pub(crate) registry: &'a ConstraintRegistry,
    pub(crate) options: &'a ValidatorOptions,
    pub(crate) sync: bool,
    pub(crate) target: &'a Arc<dyn Validatable>,
    pub(crate) target_name: &'a Arc<str>,
    pub(crate) property: &'a str,
    pub(crate) value: &'a Value,
}

impl FieldContext<'_> {
    pub(crate) fn arguments(&self, record: &ConstraintRecord) -> ValidationArguments {
        ValidationArguments {
            target_name: Arc::clone(self.target_name),
            property: self.property.to_owned(),
            object: Arc::clone(self.target),
            value: self.value.clone(),
            constraints: record.parameters.clone(),
        }
    }

    fn fault(&self, record: &ConstraintRecord, source: BoxError) -> ValidationFault {
        ValidationFault::Constraint {
            constraint: record.name.clone(),
            target: self.target_name.to_string(),
            property: self.property.to_owned(),
            source,
        }
    }
}

/// A failed check, ready to be recorded in an outcome.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Failure {
    pub(crate) name: String,
    pub(crate) message: String,
    pub(crate) context: Option<serde_json::Value>,
}

/// Runs `checks` against the field and returns the failures in declaration
/// order.
///
/// With `stop_at_first_error` the checks run one after another and stop at
/// the first failure.
pub(crate) async fn run_checks(
    ctx: &FieldContext<'_>,
    checks: &[&ConstraintRecord],
) -> Result<Vec<Failure>> {
    if ctx.options.stop_at_first_error {
        for record in checks {
            if let Some(failure) = run_check(ctx, record).await? {
                return Ok(vec![failure]);
            }
        }
        return Ok(Vec::new());
    }

    let results = try_join_all(checks.iter().map(|record| run_check(ctx, record))).await?;
    Ok(results.into_iter().flatten().collect())
}

/// Runs one check. `Ok(None)` means the check passed or did not apply.
pub(crate) async fn run_check(
    ctx: &FieldContext<'_>,
    record: &ConstraintRecord,
) -> Result<Option<Failure>> {
    let RecordKind::Check { evaluator, .. } = &record.kind else {
        return Ok(None);
    };
    let constraint = ctx.registry.resolve(evaluator).ok_or_else(|| {
        ValidationFault::malformed(
            ctx.target_name.as_ref(),
            ctx.property,
            format!("no constraint named '{}' is registered", record.name),
        )
    })?;

    if ctx.sync && constraint.is_async() {
        tracing::trace!(
            constraint = %record.name,
            property = ctx.property,
            "skipping asynchronous constraint in synchronous validation"
        );
        return Ok(None);
    }

    let args = ctx.arguments(record);
    let valid = match (record.each, ctx.value.as_list()) {
        (true, Some(items)) => {
            let outcomes = try_join_all(
                items
                    .iter()
                    .map(|item| evaluate(constraint.as_ref(), item, &args, ctx.sync)),
            )
            .await;
            outcomes
                .map_err(|source| ctx.fault(record, source))?
                .into_iter()
                .all(|valid| valid)
        }
        _ => evaluate(constraint.as_ref(), ctx.value, &args, ctx.sync)
            .await
            .map_err(|source| ctx.fault(record, source))?,
    };

    if valid {
        return Ok(None);
    }

    let template = match &record.message {
        Some(message) => message.template(&args),
        None if ctx.options.dismiss_default_messages => String::new(),
        None => {
            let template = constraint.default_message(&args);
            if record.each && !template.is_empty() {
                format!("{EACH_PREFIX}{template}")
            } else {
                template
            }
        }
    };

    Ok(Some(Failure {
        name: record.name.clone(),
        message: render(&template, &args),
        context: record.context.clone(),
    }))
}

async fn evaluate(
    constraint: &dyn Constraint,
    value: &Value,
    args: &ValidationArguments,
    sync: bool,
) -> std::result::Result<bool, BoxError> {
    let evaluation = constraint.evaluate(value, args);
    // A synchronous call cannot wait; a deferred outcome counts as a pass.
    if sync && evaluation.is_deferred() {
        return Ok(true);
    }
    evaluation.resolve().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{custom, custom_async, equals, is_string, try_custom};
    use pretty_assertions::assert_eq;

    #[derive(Debug)]
    struct Post;

    impl Validatable for Post {
        fn property(&self, _name: &str) -> Value {
            Value::Absent
        }
    }

    struct Fixture {
        registry: ConstraintRegistry,
        options: ValidatorOptions,
        target: Arc<dyn Validatable>,
        target_name: Arc<str>,
    }

    impl Fixture {
        fn new(options: ValidatorOptions) -> Self {
            Self {
                registry: ConstraintRegistry::builder().build(),
                options,
                target: Arc::new(Post),
                target_name: Arc::from("Post"),
            }
        }

        fn ctx<'a>(&'a self, value: &'a Value, sync: bool) -> FieldContext<'a> {
            FieldContext {
                registry: &self.registry,
                options: &self.options,
                sync,
                target: &self.target,
                target_name: &self.target_name,
                property: "title",
                value,
            }
        }
    }

    fn run(ctx: &FieldContext<'_>, checks: &[&ConstraintRecord]) -> Result<Vec<Failure>> {
        futures::executor::block_on(run_checks(ctx, checks))
    }

    #[test]
    fn test_failures_in_declaration_order() {
        let fixture = Fixture::new(ValidatorOptions::default());
        let value = Value::from(5);
        let (a, b) = (is_string(), equals("x"));
        let failures = run(&fixture.ctx(&value, false), &[&a, &b]).unwrap();
        let names: Vec<_> = failures.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["isString", "equals"]);
        assert_eq!(failures[1].message, "title must be equal to x");
    }

    #[test]
    fn test_stop_at_first_error() {
        let fixture = Fixture::new(ValidatorOptions::new().stop_at_first_error(true));
        let value = Value::from(5);
        let (a, b) = (is_string(), equals("x"));
        let failures = run(&fixture.ctx(&value, false), &[&a, &b]).unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].name, "isString");
    }

    #[test]
    fn test_each_applies_to_elements() {
        let fixture = Fixture::new(ValidatorOptions::default());
        let value = Value::from(vec!["a", "b"]);
        let record = is_string().each();
        assert!(run(&fixture.ctx(&value, false), &[&record]).unwrap().is_empty());

        let value = Value::List(vec![Value::from("a"), Value::from(1)]);
        let failures = run(&fixture.ctx(&value, false), &[&record]).unwrap();
        assert_eq!(failures[0].message, "each value in title must be a string");
    }

    #[test]
    fn test_explicit_message_and_dismiss() {
        let fixture = Fixture::new(ValidatorOptions::new().dismiss_default_messages(true));
        let value = Value::from(1);
        let silent = is_string();
        let loud = equals("x").message("$property is $value, expected $constraint1");
        let failures = run(&fixture.ctx(&value, false), &[&silent, &loud]).unwrap();
        assert_eq!(failures[0].message, "");
        assert_eq!(failures[1].message, "title is 1, expected x");
    }

    #[test]
    fn test_context_is_carried() {
        let fixture = Fixture::new(ValidatorOptions::default());
        let value = Value::Null;
        let record = is_string().context(serde_json::json!({ "severity": "high" }));
        let failures = run(&fixture.ctx(&value, false), &[&record]).unwrap();
        assert_eq!(failures[0].context, Some(serde_json::json!({ "severity": "high" })));
    }

    #[test]
    fn test_fault_aborts() {
        let fixture = Fixture::new(ValidatorOptions::default());
        let value = Value::Null;
        let ok = custom("ok", "", |_, _| true);
        let broken = try_custom("lookup", "", |_, _| Err(BoxError::from("unreachable backend")));
        let fault = run(&fixture.ctx(&value, false), &[&ok, &broken]).unwrap_err();
        assert_eq!(fault.constraint_name(), Some("lookup"));
    }

    #[test]
    fn test_sync_skips_async_constraints() {
        let fixture = Fixture::new(ValidatorOptions::default());
        let value = Value::Null;
        let record = custom_async("remote", "$property rejected", |_, _| async {
            Ok::<_, BoxError>(false)
        });
        assert!(run(&fixture.ctx(&value, true), &[&record]).unwrap().is_empty());
        assert_eq!(run(&fixture.ctx(&value, false), &[&record]).unwrap().len(), 1);
    }

    #[test]
    fn test_unresolved_named_constraint_is_malformed() {
        let fixture = Fixture::new(ValidatorOptions::default());
        let value = Value::Null;
        let record = ConstraintRecord::named("isMissing");
        let fault = run(&fixture.ctx(&value, false), &[&record]).unwrap_err();
        assert!(matches!(fault, ValidationFault::MalformedMetadata { .. }));
    }
}
