//! Built-in constraints
//!
//! A small library of ready-made records. Each function returns a
//! [`ConstraintRecord`](crate::ConstraintRecord) that can be customised
//! further (`.when(..)`, `.message(..)`, `.groups(..)`, `.each()`) before
//! being attached to a property.
//!
//! - **Presence**: [`is_defined`], [`is_not_empty`], [`is_empty`]
//! - **Comparison**: [`equals`], [`not_equals`], [`is_in`], [`is_not_in`]
//! - **Type**: [`is_string`], [`is_number`], [`is_int`], [`is_boolean`], [`is_array`], [`is_object`]
//! - **String**: [`min_length`], [`max_length`], [`length`], [`contains`], [`matches`]
//! - **Custom**: [`custom`], [`try_custom`], [`custom_async`]

mod common;
mod custom;
mod string;
mod types;

pub use common::{equals, is_defined, is_empty, is_in, is_not_empty, is_not_in, not_equals};
pub use custom::{custom, custom_async, try_custom};
pub use string::{contains, length, matches, max_length, min_length};
pub use types::{is_array, is_boolean, is_int, is_number, is_object, is_string};

/// Constraint names used by the built-ins.
pub mod names {
    pub const IS_DEFINED: &str = "isDefined";
    pub const IS_NOT_EMPTY: &str = "isNotEmpty";
    pub const IS_EMPTY: &str = "isEmpty";
    pub const EQUALS: &str = "equals";
    pub const NOT_EQUALS: &str = "notEquals";
    pub const IS_IN: &str = "isIn";
    pub const IS_NOT_IN: &str = "isNotIn";
    pub const IS_STRING: &str = "isString";
    pub const IS_NUMBER: &str = "isNumber";
    pub const IS_INT: &str = "isInt";
    pub const IS_BOOLEAN: &str = "isBoolean";
    pub const IS_ARRAY: &str = "isArray";
    pub const IS_OBJECT: &str = "isObject";
    pub const MIN_LENGTH: &str = "minLength";
    pub const MAX_LENGTH: &str = "maxLength";
    pub const LENGTH: &str = "isLength";
    pub const CONTAINS: &str = "contains";
    pub const MATCHES: &str = "matches";
}

/// Reads the `index`-th record parameter.
fn parameter(args: &crate::ValidationArguments, index: usize) -> &serde_json::Value {
    args.constraints.get(index).unwrap_or(&serde_json::Value::Null)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use crate::constraint::ValidationArguments;
    use crate::record::{ConstraintRecord, Evaluator, RecordKind};
    use crate::value::{Validatable, Value};

    #[derive(Debug)]
    struct Owner;

    impl Validatable for Owner {
        fn property(&self, _name: &str) -> Value {
            Value::Absent
        }
    }

    /// Runs an inline record's predicate against `value`.
    pub(crate) fn check(record: &ConstraintRecord, value: Value) -> bool {
        let RecordKind::Check {
            evaluator: Evaluator::Inline(constraint),
            ..
        } = &record.kind
        else {
            panic!("record {} has no inline predicate", record.name());
        };
        let args = ValidationArguments {
            target_name: Arc::from("Owner"),
            property: "field".into(),
            object: Arc::new(Owner),
            value: value.clone(),
            constraints: record.parameters().to_vec(),
        };
        futures::executor::block_on(constraint.evaluate(&value, &args).resolve())
            .expect("built-in constraints never fault")
    }
}
