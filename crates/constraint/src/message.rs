//! Failure message templates
//!
//! Templates carry placeholder tokens that are substituted from the
//! [`ValidationArguments`] of the failing constraint:
//!
//! | Token          | Replaced with                                         |
//! |----------------|-------------------------------------------------------|
//! | `$constraintN` | N-th record parameter (1-based, arrays joined by `, `) |
//! | `$value`       | the field value, for strings, numbers and booleans    |
//! | `$property`    | the property name                                     |
//! | `$target`      | the owning type's name                                |

use std::fmt;
use std::sync::Arc;

use crate::constraint::ValidationArguments;

/// Builds a message from the failing constraint's arguments.
pub type MessageFn = Arc<dyn Fn(&ValidationArguments) -> String + Send + Sync>;

/// An explicit message attached to a record.
#[derive(Clone)]
pub enum Message {
    /// A template with placeholder tokens.
    Template(String),
    /// A function producing the template.
    Dynamic(MessageFn),
}

impl Message {
    /// Produces the raw template for a failure.
    pub fn template(&self, args: &ValidationArguments) -> String {
        match self {
            Self::Template(template) => template.clone(),
            Self::Dynamic(build) => build(args),
        }
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template(template) => f.debug_tuple("Template").field(template).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(<function>)"),
        }
    }
}

impl From<&str> for Message {
    fn from(template: &str) -> Self {
        Self::Template(template.to_owned())
    }
}

impl From<String> for Message {
    fn from(template: String) -> Self {
        Self::Template(template)
    }
}

/// Renders a parameter the way it appears inside a message.
pub fn constraint_to_string(parameter: &serde_json::Value) -> String {
    match parameter {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Array(items) => items
            .iter()
            .map(constraint_to_string)
            .collect::<Vec<_>>()
            .join(", "),
        serde_json::Value::Null => "null".to_owned(),
        other => other.to_string(),
    }
}

/// Substitutes the placeholder tokens of `template`.
pub fn render(template: &str, args: &ValidationArguments) -> String {
    if template.is_empty() {
        return String::new();
    }

    let mut message = template.to_owned();

    // Highest index first so `$constraint1` does not eat `$constraint10`.
    for (index, parameter) in args.constraints.iter().enumerate().rev() {
        let token = format!("$constraint{}", index + 1);
        if message.contains(&token) {
            message = message.replace(&token, &constraint_to_string(parameter));
        }
    }

    if args.value.is_primitive() {
        message = message.replace("$value", &args.value.to_string());
    }

    message
        .replace("$property", &args.property)
        .replace("$target", &args.target_name)
}
