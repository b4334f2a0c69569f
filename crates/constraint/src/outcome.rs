//! Validation outcomes
//!
//! A [`FieldOutcome`] is one node of the tree returned by a validation call:
//! the failed constraints of one property, keyed by constraint name in
//! declaration order, plus child outcomes produced by nested traversal.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;

use crate::value::{Validatable, Value};

/// The result node for one property of one instance.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOutcome {
    /// The validated instance, when outcome population keeps it.
    #[serde(skip)]
    pub target: Option<Arc<dyn Validatable>>,
    /// Short type name of the validated instance.
    pub target_name: Arc<str>,
    /// Property name, or the element index for sequence children.
    pub property: String,
    /// Value of the property, when outcome population keeps it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Failed constraint names mapped to rendered messages.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub constraints: IndexMap<String, String>,
    /// Context payloads of failed constraints that declared one.
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub contexts: IndexMap<String, serde_json::Value>,
    /// Outcomes of nested instances or sequence elements.
    pub children: Vec<FieldOutcome>,
}

impl FieldOutcome {
    /// Creates an empty outcome for `property`.
    pub fn new(
        target: Option<Arc<dyn Validatable>>,
        target_name: Arc<str>,
        property: impl Into<String>,
        value: Option<Value>,
    ) -> Self {
        Self {
            target,
            target_name,
            property: property.into(),
            value,
            constraints: IndexMap::new(),
            contexts: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Returns `true` if this node or any descendant records a failure.
    pub fn has_failures(&self) -> bool {
        !self.constraints.is_empty() || self.children.iter().any(Self::has_failures)
    }

    /// Records a failure. The first message recorded for a name wins.
    pub(crate) fn fail(&mut self, name: &str, message: String, context: Option<&serde_json::Value>) {
        if self.constraints.contains_key(name) {
            return;
        }
        self.constraints.insert(name.to_owned(), message);
        if let Some(context) = context {
            self.contexts.insert(name.to_owned(), context.clone());
        }
    }

    /// Renders the outcome tree as a human-readable report.
    ///
    /// With `show_messages` the rendered messages are listed, otherwise only
    /// constraint names are.
    pub fn report(&self, show_messages: bool) -> String {
        let mut out = format!(
            "An instance of {} has failed the validation:\n",
            self.target_name
        );
        self.write_lines(&mut out, show_messages, "");
        out
    }

    fn write_lines(&self, out: &mut String, show_messages: bool, parent_path: &str) {
        let path = format_path(parent_path, &self.property);

        if !self.constraints.is_empty() {
            let listed: Vec<&str> = if show_messages {
                self.constraints.values().map(String::as_str).collect()
            } else {
                self.constraints.keys().map(String::as_str).collect()
            };
            out.push_str(&format!(
                " - property {path} has failed the following constraints: {} \n",
                listed.join(", ")
            ));
        }

        for child in &self.children {
            child.write_lines(out, show_messages, &path);
        }
    }
}

fn format_path(parent: &str, property: &str) -> String {
    if parent.is_empty() {
        return property.to_owned();
    }
    if !property.is_empty() && property.bytes().all(|b| b.is_ascii_digit()) {
        format!("{parent}[{property}]")
    } else {
        format!("{parent}.{property}")
    }
}

impl fmt::Display for FieldOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.report(false))
    }
}

impl fmt::Debug for FieldOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldOutcome")
            .field("target_name", &self.target_name)
            .field("property", &self.property)
            .field("value", &self.value)
            .field("constraints", &self.constraints)
            .field("contexts", &self.contexts)
            .field("children", &self.children)
            .finish()
    }
}

impl PartialEq for FieldOutcome {
    fn eq(&self, other: &Self) -> bool {
        let same_target = match (&self.target, &other.target) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_target
            && self.target_name == other.target_name
            && self.property == other.property
            && self.value == other.value
            && self.constraints == other.constraints
            && self.contexts == other.contexts
            && self.children == other.children
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn outcome(property: &str) -> FieldOutcome {
        FieldOutcome::new(None, Arc::from("Post"), property, None)
    }

    #[test]
    fn test_fail_keeps_first_message() {
        let mut o = outcome("title");
        o.fail("isNotEmpty", "first".into(), None);
        o.fail("isNotEmpty", "second".into(), None);
        assert_eq!(o.constraints["isNotEmpty"], "first");
        assert!(o.has_failures());
    }

    #[test]
    fn test_has_failures_through_children() {
        let mut parent = outcome("author");
        assert!(!parent.has_failures());
        let mut child = outcome("name");
        child.fail("isString", "name must be a string".into(), None);
        parent.children.push(child);
        assert!(parent.has_failures());
    }

    #[test]
    fn test_report() {
        let mut parent = outcome("tags");
        let mut element = outcome("1");
        element.fail("isString", "tags.1 must be a string".into(), None);
        parent.children.push(element);

        let mut title = outcome("title");
        title.fail("isNotEmpty", "title should not be empty".into(), None);
        title.fail("minLength", "title is too short".into(), None);

        assert_eq!(
            title.to_string(),
            "An instance of Post has failed the validation:\n - property title has failed the following constraints: isNotEmpty, minLength \n"
        );
        assert_eq!(
            parent.report(true),
            "An instance of Post has failed the validation:\n - property tags[1] has failed the following constraints: tags.1 must be a string \n"
        );
    }

    #[test]
    fn test_serialize_skips_target_and_empty_maps() {
        let mut o = outcome("title");
        o.value = Some(Value::from(""));
        o.fail("isNotEmpty", "title should not be empty".into(), Some(&serde_json::json!({"code": 7})));
        let json = serde_json::to_value(&o).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "targetName": "Post",
                "property": "title",
                "value": "",
                "constraints": { "isNotEmpty": "title should not be empty" },
                "contexts": { "isNotEmpty": { "code": 7 } },
                "children": []
            })
        );
    }
}
