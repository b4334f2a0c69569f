//! Nested traversal
//!
//! A nested-marked field is validated by running the whole pipeline again on
//! its value. Structures recurse into their own schema; sequences produce one
//! child outcome per element, named by index; anything else is a
//! `nestedValidation` failure. Elements are traversed concurrently and
//! reassembled in sequence order.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, try_join_all};

use crate::constraint::ValidationArguments;
use crate::error::Result;
use crate::message::render;
use crate::outcome::FieldOutcome;
use crate::record::{ConstraintRecord, NESTED_VALIDATION};
use crate::validator::Walk;
use crate::value::{Validatable, Value};

/// Default template for nested-marked fields holding neither a structure nor
/// a sequence.
pub(crate) const NESTED_MESSAGE: &str = "nested property $property must be either object or array";

/// What nested traversal contributed to one outcome.
#[derive(Debug, Default)]
pub(crate) struct Nested {
    pub(crate) children: Vec<FieldOutcome>,
    pub(crate) failure: Option<String>,
}

/// Where the traversal currently is.
#[derive(Clone, Copy)]
pub(crate) struct Site<'a> {
    /// The instance owning the traversed value.
    pub(crate) owner: &'a Arc<dyn Validatable>,
    pub(crate) owner_name: &'a Arc<str>,
    /// Dotted path of the traversed value, used in cycle faults.
    pub(crate) path: &'a str,
    /// Identities of the instances on the current recursion path.
    pub(crate) ancestry: &'a [usize],
}

/// Traverses a field-level value.
///
/// Absent and null values contribute nothing.
pub(crate) async fn traverse(
    walk: &Walk<'_>,
    site: Site<'_>,
    record: &ConstraintRecord,
    property: &str,
    value: &Value,
) -> Result<Nested> {
    if value.is_empty() {
        return Ok(Nested::default());
    }
    descend(walk, site, record, property, value).await
}

fn descend<'w>(
    walk: &'w Walk<'_>,
    site: Site<'w>,
    record: &'w ConstraintRecord,
    property: &'w str,
    value: &'w Value,
) -> BoxFuture<'w, Result<Nested>> {
    async move {
        match value {
            Value::Object(child) => {
                let children = walk
                    .object(Arc::clone(child), site.path.to_owned(), site.ancestry.to_vec())
                    .await?;
                Ok(Nested {
                    children,
                    failure: None,
                })
            }
            Value::List(items) => {
                let children = try_join_all(
                    items
                        .iter()
                        .enumerate()
                        .map(|(index, item)| element(walk, site, record, index, item)),
                )
                .await?;
                Ok(Nested {
                    children: children.into_iter().flatten().collect(),
                    failure: None,
                })
            }
            scalar => Ok(Nested {
                children: Vec::new(),
                failure: Some(scalar_message(walk, site, record, property, scalar)),
            }),
        }
    }
    .boxed()
}

async fn element(
    walk: &Walk<'_>,
    site: Site<'_>,
    record: &ConstraintRecord,
    index: usize,
    item: &Value,
) -> Result<Option<FieldOutcome>> {
    if item.is_absent() {
        return Ok(None);
    }

    let property = index.to_string();
    let path = format!("{}[{index}]", site.path);
    let nested = descend(walk, Site { path: &path, ..site }, record, &property, item).await?;

    let mut outcome = walk.outcome(site.owner, site.owner_name, &property, item);
    outcome.children = nested.children;
    if let Some(message) = nested.failure {
        outcome.fail(NESTED_VALIDATION, message, record.context.as_ref());
    }
    Ok(Some(outcome))
}

fn scalar_message(
    walk: &Walk<'_>,
    site: Site<'_>,
    record: &ConstraintRecord,
    property: &str,
    value: &Value,
) -> String {
    let args = ValidationArguments {
        target_name: Arc::clone(site.owner_name),
        property: property.to_owned(),
        object: Arc::clone(site.owner),
        value: value.clone(),
        constraints: record.parameters.clone(),
    };
    let template = match &record.message {
        Some(message) => message.template(&args),
        None if walk.options.dismiss_default_messages => String::new(),
        None => NESTED_MESSAGE.to_owned(),
    };
    render(&template, &args)
}
