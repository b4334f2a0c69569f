//! Per-call validator options
//!
//! Options are plain data and deserialize from configuration with every field
//! defaulted, so a partial document is enough:
//!
//! ```rust,ignore
//! let options: ValidatorOptions = serde_json::from_str(r#"{ "groups": ["admin"], "whitelist": true }"#)?;
//! ```

use serde::{Deserialize, Serialize};

/// Controls which fields of an outcome are populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationErrorOptions {
    /// Attach the validated instance to every outcome.
    pub target: bool,
    /// Attach the offending value to every outcome.
    pub value: bool,
}

impl Default for ValidationErrorOptions {
    fn default() -> Self {
        Self {
            target: true,
            value: true,
        }
    }
}

/// Options for a single validation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidatorOptions {
    /// Skip every non-presence constraint on absent fields.
    pub skip_undefined_properties: bool,
    /// Skip every non-presence constraint on null fields.
    pub skip_null_properties: bool,
    /// Skip every non-presence constraint on absent or null fields.
    pub skip_missing_properties: bool,
    /// Report properties the type declares no constraints for.
    pub whitelist: bool,
    /// With `whitelist`, turn undeclared properties into failures.
    pub forbid_non_whitelisted: bool,
    /// Only records in one of these groups run.
    pub groups: Vec<String>,
    /// Ungrouped records run even when groups are requested.
    pub always: bool,
    /// Grouped records are ignored when no group is requested.
    pub strict_groups: bool,
    /// Render every message as the empty string unless explicitly set.
    pub dismiss_default_messages: bool,
    /// Outcome population.
    pub validation_error: ValidationErrorOptions,
    /// Report instances whose type has no applicable constraints.
    pub forbid_unknown_values: bool,
    /// Stop at the first failing constraint of each field.
    pub stop_at_first_error: bool,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            skip_undefined_properties: false,
            skip_null_properties: false,
            skip_missing_properties: false,
            whitelist: false,
            forbid_non_whitelisted: false,
            groups: Vec::new(),
            always: false,
            strict_groups: false,
            dismiss_default_messages: false,
            validation_error: ValidationErrorOptions::default(),
            forbid_unknown_values: true,
            stop_at_first_error: false,
        }
    }
}

impl ValidatorOptions {
    /// Creates options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests validation groups.
    #[must_use = "builder methods must be chained or built"]
    pub fn groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Sets [`always`](Self::always).
    #[must_use = "builder methods must be chained or built"]
    pub fn with_always(mut self, always: bool) -> Self {
        self.always = always;
        self
    }

    /// Sets [`strict_groups`](Self::strict_groups).
    #[must_use = "builder methods must be chained or built"]
    pub fn with_strict_groups(mut self, strict: bool) -> Self {
        self.strict_groups = strict;
        self
    }

    /// Sets [`skip_missing_properties`](Self::skip_missing_properties).
    #[must_use = "builder methods must be chained or built"]
    pub fn skip_missing(mut self, skip: bool) -> Self {
        self.skip_missing_properties = skip;
        self
    }

    /// Sets [`skip_null_properties`](Self::skip_null_properties).
    #[must_use = "builder methods must be chained or built"]
    pub fn skip_null(mut self, skip: bool) -> Self {
        self.skip_null_properties = skip;
        self
    }

    /// Sets [`skip_undefined_properties`](Self::skip_undefined_properties).
    #[must_use = "builder methods must be chained or built"]
    pub fn skip_undefined(mut self, skip: bool) -> Self {
        self.skip_undefined_properties = skip;
        self
    }

    /// Enables whitelisting, optionally forbidding undeclared properties.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_whitelist(mut self, forbid_non_whitelisted: bool) -> Self {
        self.whitelist = true;
        self.forbid_non_whitelisted = forbid_non_whitelisted;
        self
    }

    /// Sets [`dismiss_default_messages`](Self::dismiss_default_messages).
    #[must_use = "builder methods must be chained or built"]
    pub fn dismiss_default_messages(mut self, dismiss: bool) -> Self {
        self.dismiss_default_messages = dismiss;
        self
    }

    /// Sets [`forbid_unknown_values`](Self::forbid_unknown_values).
    #[must_use = "builder methods must be chained or built"]
    pub fn forbid_unknown_values(mut self, forbid: bool) -> Self {
        self.forbid_unknown_values = forbid;
        self
    }

    /// Sets [`stop_at_first_error`](Self::stop_at_first_error).
    #[must_use = "builder methods must be chained or built"]
    pub fn stop_at_first_error(mut self, stop: bool) -> Self {
        self.stop_at_first_error = stop;
        self
    }

    /// Controls whether outcomes carry the target and the value.
    #[must_use = "builder methods must be chained or built"]
    pub fn validation_error(mut self, target: bool, value: bool) -> Self {
        self.validation_error = ValidationErrorOptions { target, value };
        self
    }

    /// Whether a field value should skip its non-presence records.
    pub(crate) fn skips(&self, value: &crate::Value) -> bool {
        (value.is_absent() && (self.skip_undefined_properties || self.skip_missing_properties))
            || (value.is_null() && (self.skip_null_properties || self.skip_missing_properties))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let options = ValidatorOptions::default();
        assert!(options.forbid_unknown_values);
        assert!(options.validation_error.target);
        assert!(options.validation_error.value);
        assert!(options.groups.is_empty());
    }

    #[test]
    fn test_deserialize_partial() {
        let options: ValidatorOptions = serde_json::from_str(
            r#"{ "groups": ["admin"], "stopAtFirstError": true, "validationError": { "target": false } }"#,
        )
        .unwrap();
        assert_eq!(options.groups, vec!["admin".to_owned()]);
        assert!(options.stop_at_first_error);
        assert!(!options.validation_error.target);
        assert!(options.validation_error.value);
        assert!(options.forbid_unknown_values);
    }

    #[test]
    fn test_skips() {
        let options = ValidatorOptions::new().skip_null(true);
        assert!(options.skips(&Value::Null));
        assert!(!options.skips(&Value::Absent));

        let options = ValidatorOptions::new().skip_missing(true);
        assert!(options.skips(&Value::Null));
        assert!(options.skips(&Value::Absent));
        assert!(!options.skips(&Value::from("")));
    }
}
