//! Constraint records
//!
//! A [`ConstraintRecord`] is one declared rule on one field: its name,
//! parameters, the predicate that decides it, and the options that shape
//! when it runs and how its failure is reported. Records are immutable once
//! registered and owned by the [`ConstraintRegistry`](crate::ConstraintRegistry).
//!
//! # Examples
//!
//! ```rust,ignore
//! use nebula_constraint::{rules, ConstraintRecord};
//!
//! // Only check string-ness when the value actually is a string.
//! let record = rules::is_string().when(|value, _| value.is_string());
//!
//! // Recurse into the value unless it is a string.
//! let nested = ConstraintRecord::nested().when(|value, _| !value.is_string());
//! ```

use std::fmt;
use std::sync::Arc;

use crate::constraint::Constraint;
use crate::message::{Message, MessageFn};
use crate::value::{Validatable, Value};

/// Per-constraint condition over the field value and its owning instance.
pub type Condition = Arc<dyn Fn(&Value, &dyn Validatable) -> bool + Send + Sync>;

/// Field-level gate over the owning instance.
pub type GateFn = Arc<dyn Fn(&dyn Validatable) -> bool + Send + Sync>;

/// Name used for failures of nested-marked fields holding scalars.
pub const NESTED_VALIDATION: &str = "nestedValidation";

// ============================================================================
// SCOPE
// ============================================================================

/// Group membership of a record, gate or optional marker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    /// Groups the metadata belongs to.
    pub groups: Vec<String>,
    /// Overrides group filtering when set.
    pub always: Option<bool>,
}

impl Scope {
    /// Decides whether metadata with this scope applies to a call.
    pub fn applies(&self, requested: &[String], always: bool, strict_groups: bool) -> bool {
        let include_always = match self.always {
            Some(flag) => flag,
            None if !self.groups.is_empty() => false,
            None => always,
        };
        if include_always {
            return true;
        }
        if strict_groups && requested.is_empty() && !self.groups.is_empty() {
            return false;
        }
        if !requested.is_empty() {
            return self.groups.iter().any(|group| requested.contains(group));
        }
        true
    }
}

// ============================================================================
// EVALUATOR
// ============================================================================

/// Where a record's predicate comes from.
#[derive(Clone)]
pub enum Evaluator {
    /// The predicate is attached directly.
    Inline(Arc<dyn Constraint>),
    /// The predicate is looked up by name in the registry's constraint library.
    Named(String),
}

impl fmt::Debug for Evaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inline(constraint) => f.debug_tuple("Inline").field(&constraint.name()).finish(),
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
        }
    }
}

/// What a record does when it runs.
#[derive(Debug, Clone)]
pub enum RecordKind {
    /// An ordinary constraint.
    Check {
        /// The predicate.
        evaluator: Evaluator,
        /// Presence checks ignore the skip-missing family of options.
        presence: bool,
    },
    /// Marks the field for recursive validation.
    Nested,
}

// ============================================================================
// CONSTRAINT RECORD
// ============================================================================

/// One declared rule on one field.
#[derive(Clone)]
pub struct ConstraintRecord {
    pub(crate) name: String,
    pub(crate) kind: RecordKind,
    pub(crate) parameters: Vec<serde_json::Value>,
    pub(crate) condition: Option<Condition>,
    pub(crate) message: Option<Message>,
    pub(crate) scope: Scope,
    pub(crate) each: bool,
    pub(crate) context: Option<serde_json::Value>,
}

impl ConstraintRecord {
    fn with_kind(name: impl Into<String>, kind: RecordKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parameters: Vec::new(),
            condition: None,
            message: None,
            scope: Scope::default(),
            each: false,
            context: None,
        }
    }

    /// Creates a record around a constraint, named after it.
    pub fn new(constraint: impl Constraint + 'static) -> Self {
        Self::from_arc(Arc::new(constraint))
    }

    /// Creates a record around a shared constraint.
    pub fn from_arc(constraint: Arc<dyn Constraint>) -> Self {
        let name = constraint.name().to_owned();
        Self::with_kind(
            name,
            RecordKind::Check {
                evaluator: Evaluator::Inline(constraint),
                presence: false,
            },
        )
    }

    /// Creates a record whose constraint is resolved by name at validation
    /// time.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::with_kind(
            name.clone(),
            RecordKind::Check {
                evaluator: Evaluator::Named(name),
                presence: false,
            },
        )
    }

    /// Creates a nested-validation marker.
    pub fn nested() -> Self {
        Self::with_kind(NESTED_VALIDATION, RecordKind::Nested)
    }

    /// Marks the record as a presence check.
    pub(crate) fn presence(mut self) -> Self {
        if let RecordKind::Check { presence, .. } = &mut self.kind {
            *presence = true;
        }
        self
    }

    /// Appends a parameter.
    #[must_use = "builder methods must be chained or built"]
    pub fn param(mut self, parameter: impl Into<serde_json::Value>) -> Self {
        self.parameters.push(parameter.into());
        self
    }

    /// Replaces the parameter list.
    #[must_use = "builder methods must be chained or built"]
    pub fn params(mut self, parameters: Vec<serde_json::Value>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Runs the record only when `condition` holds for the field value.
    #[must_use = "builder methods must be chained or built"]
    pub fn when<C>(mut self, condition: C) -> Self
    where
        C: Fn(&Value, &dyn Validatable) -> bool + Send + Sync + 'static,
    {
        self.condition = Some(Arc::new(condition));
        self
    }

    /// Overrides the failure message template.
    #[must_use = "builder methods must be chained or built"]
    pub fn message(mut self, message: impl Into<Message>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Builds the failure message from the arguments.
    #[must_use = "builder methods must be chained or built"]
    pub fn message_with<F>(mut self, build: F) -> Self
    where
        F: Fn(&crate::ValidationArguments) -> String + Send + Sync + 'static,
    {
        let build: MessageFn = Arc::new(build);
        self.message = Some(Message::Dynamic(build));
        self
    }

    /// Places the record in validation groups.
    #[must_use = "builder methods must be chained or built"]
    pub fn groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Forces the record on or off regardless of requested groups.
    #[must_use = "builder methods must be chained or built"]
    pub fn always(mut self, always: bool) -> Self {
        self.scope.always = Some(always);
        self
    }

    /// Applies the predicate to every element of a sequence value.
    #[must_use = "builder methods must be chained or built"]
    pub fn each(mut self) -> Self {
        self.each = true;
        self
    }

    /// Attaches a payload reported alongside failures.
    #[must_use = "builder methods must be chained or built"]
    pub fn context(mut self, context: serde_json::Value) -> Self {
        self.context = Some(context);
        self
    }

    /// Record name, used as the key in the outcome's constraint map.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record parameters.
    pub fn parameters(&self) -> &[serde_json::Value] {
        &self.parameters
    }

    /// Returns `true` for nested-validation markers.
    pub fn is_nested(&self) -> bool {
        matches!(self.kind, RecordKind::Nested)
    }

    /// Returns `true` for presence checks.
    pub fn is_presence(&self) -> bool {
        matches!(self.kind, RecordKind::Check { presence: true, .. })
    }

    /// Returns `true` if the record carries a condition.
    pub fn has_condition(&self) -> bool {
        self.condition.is_some()
    }

    /// Record scope.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }
}

impl fmt::Debug for ConstraintRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintRecord")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("parameters", &self.parameters)
            .field("condition", &self.condition.as_ref().map(|_| "<function>"))
            .field("message", &self.message)
            .field("scope", &self.scope)
            .field("each", &self.each)
            .finish()
    }
}

// ============================================================================
// GATE
// ============================================================================

/// A field-level gate: when it returns `false`, nothing on the field runs.
#[derive(Clone)]
pub struct Gate {
    pub(crate) predicate: GateFn,
    pub(crate) scope: Scope,
}

impl Gate {
    /// Creates a gate from a predicate over the owning instance.
    pub fn new(predicate: GateFn) -> Self {
        Self {
            predicate,
            scope: Scope::default(),
        }
    }

    /// Evaluates the gate.
    pub fn is_open(&self, target: &dyn Validatable) -> bool {
        (self.predicate)(target)
    }
}

impl fmt::Debug for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gate")
            .field("predicate", &"<function>")
            .field("scope", &self.scope)
            .finish()
    }
}
