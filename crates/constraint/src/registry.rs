//! Constraint registry
//!
//! The registry replaces runtime decoration with explicit, immutable metadata
//! built once per structure type: a map from type identity to a
//! [`ClassSchema`], whose properties carry their gates, optional marker and
//! ordered [`ConstraintRecord`]s. It also owns a library of named constraints
//! that records may reference instead of embedding a predicate.
//!
//! # Examples
//!
//! ```rust,ignore
//! use nebula_constraint::{rules, ClassSchema, ConstraintRegistry};
//!
//! let registry = ConstraintRegistry::builder()
//!     .class(
//!         ClassSchema::builder::<Post>()
//!             .property("title", |p| {
//!                 p.validate_if(|post: &Post| post.published)
//!                     .rule(rules::is_not_empty())
//!             })
//!             .build(),
//!     )
//!     .build();
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::constraint::Constraint;
use crate::error::{Result, ValidationFault};
use crate::record::{ConstraintRecord, Evaluator, Gate, GateFn, RecordKind, Scope};
use crate::value::{Validatable, short_type_name};

// ============================================================================
// PROPERTY SCHEMA
// ============================================================================

/// Metadata declared on one property.
#[derive(Debug, Clone)]
pub struct PropertySchema {
    pub(crate) name: String,
    pub(crate) gates: Vec<Gate>,
    pub(crate) optional: Option<Scope>,
    pub(crate) records: Vec<ConstraintRecord>,
}

impl PropertySchema {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gates: Vec::new(),
            optional: None,
            records: Vec::new(),
        }
    }

    /// Property name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared records, in declaration order.
    pub fn records(&self) -> &[ConstraintRecord] {
        &self.records
    }

    /// Returns `true` if the property is marked skip-if-empty.
    pub fn is_optional(&self) -> bool {
        self.optional.is_some()
    }

    fn merge(&mut self, other: Self) {
        self.gates.extend(other.gates);
        if self.optional.is_none() {
            self.optional = other.optional;
        }
        self.records.extend(other.records);
    }
}

/// Builder for one property of `T`.
pub struct PropertyBuilder<T> {
    schema: PropertySchema,
    _target: PhantomData<fn(&T)>,
}

impl<T: Validatable> PropertyBuilder<T> {
    fn new(name: &str) -> Self {
        Self {
            schema: PropertySchema::new(name),
            _target: PhantomData,
        }
    }

    /// Gates every record on the property behind a predicate over the
    /// owning instance.
    #[must_use = "builder methods must be chained or built"]
    pub fn validate_if<F>(self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.validate_if_in(predicate, Scope::default())
    }

    /// Like [`validate_if`](Self::validate_if), limited to a scope.
    #[must_use = "builder methods must be chained or built"]
    pub fn validate_if_in<F>(mut self, predicate: F, scope: Scope) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        let predicate: GateFn = Arc::new(move |target: &dyn Validatable| {
            let any: &dyn Any = target;
            any.downcast_ref::<T>().is_some_and(&predicate)
        });
        self.schema.gates.push(Gate { predicate, scope });
        self
    }

    /// Skips ordinary constraints while the value is absent or null.
    #[must_use = "builder methods must be chained or built"]
    pub fn optional(self) -> Self {
        self.optional_in(Scope::default())
    }

    /// Like [`optional`](Self::optional), limited to a scope.
    #[must_use = "builder methods must be chained or built"]
    pub fn optional_in(mut self, scope: Scope) -> Self {
        self.schema.optional = Some(scope);
        self
    }

    /// Appends a constraint record.
    #[must_use = "builder methods must be chained or built"]
    pub fn rule(mut self, record: ConstraintRecord) -> Self {
        self.schema.records.push(record);
        self
    }

    /// Marks the property for nested validation.
    #[must_use = "builder methods must be chained or built"]
    pub fn nested(self) -> Self {
        self.rule(ConstraintRecord::nested())
    }

    /// Marks the property for nested validation with a customised marker.
    #[must_use = "builder methods must be chained or built"]
    pub fn nested_with(self, record: ConstraintRecord) -> Self {
        self.rule(record)
    }
}

// ============================================================================
// CLASS SCHEMA
// ============================================================================

/// All metadata declared for one structure type.
#[derive(Debug, Clone)]
pub struct ClassSchema {
    pub(crate) type_id: TypeId,
    pub(crate) name: Arc<str>,
    pub(crate) properties: Vec<PropertySchema>,
}

impl ClassSchema {
    /// Starts a schema for `T`.
    pub fn builder<T: Validatable>() -> ClassSchemaBuilder<T> {
        ClassSchemaBuilder {
            schema: Self {
                type_id: TypeId::of::<T>(),
                name: Arc::from(short_type_name::<T>()),
                properties: Vec::new(),
            },
            _target: PhantomData,
        }
    }

    /// Short type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared properties, in declaration order.
    pub fn properties(&self) -> &[PropertySchema] {
        &self.properties
    }

    /// Looks up a property by name.
    pub fn property(&self, name: &str) -> Option<&PropertySchema> {
        self.properties.iter().find(|p| p.name == name)
    }

    fn add_property(&mut self, property: PropertySchema) {
        match self.properties.iter_mut().find(|p| p.name == property.name) {
            Some(existing) => existing.merge(property),
            None => self.properties.push(property),
        }
    }

    fn merge(&mut self, other: Self) {
        for property in other.properties {
            self.add_property(property);
        }
    }

    /// Checks the schema's integrity against a constraint library.
    pub(crate) fn check(&self, library: &ConstraintLibrary) -> Result<()> {
        for property in &self.properties {
            if property.name.is_empty() {
                return Err(ValidationFault::malformed(
                    self.name.as_ref(),
                    "",
                    "property name must not be empty",
                ));
            }

            for record in &property.records {
                if let RecordKind::Check {
                    evaluator: Evaluator::Named(name),
                    ..
                } = &record.kind
                {
                    if !library.contains(name) {
                        return Err(ValidationFault::malformed(
                            self.name.as_ref(),
                            property.name.as_str(),
                            format!("no constraint named '{name}' is registered"),
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Builder for a [`ClassSchema`] of `T`.
pub struct ClassSchemaBuilder<T> {
    schema: ClassSchema,
    _target: PhantomData<fn(&T)>,
}

impl<T: Validatable> ClassSchemaBuilder<T> {
    /// Declares metadata on a property.
    ///
    /// Declaring the same property twice appends to it.
    #[must_use = "builder methods must be chained or built"]
    pub fn property<F>(mut self, name: &str, declare: F) -> Self
    where
        F: FnOnce(PropertyBuilder<T>) -> PropertyBuilder<T>,
    {
        let property = declare(PropertyBuilder::new(name)).schema;
        self.schema.add_property(property);
        self
    }

    /// Overrides the type name used in messages and reports.
    #[must_use = "builder methods must be chained or built"]
    pub fn named(mut self, name: &str) -> Self {
        self.schema.name = Arc::from(name);
        self
    }

    /// Finishes the schema.
    pub fn build(self) -> ClassSchema {
        self.schema
    }
}

// ============================================================================
// CONSTRAINT LIBRARY
// ============================================================================

/// Named constraints that records can reference.
#[derive(Clone, Default)]
pub struct ConstraintLibrary {
    constraints: HashMap<String, Arc<dyn Constraint>>,
}

impl ConstraintLibrary {
    /// Returns `true` if a constraint is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.constraints.contains_key(name)
    }

    /// Looks up a constraint.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Constraint>> {
        self.constraints.get(name)
    }

    /// Number of registered constraints.
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Returns `true` if no constraint is registered.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}

impl std::fmt::Debug for ConstraintLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.constraints.keys().collect();
        names.sort();
        f.debug_struct("ConstraintLibrary").field("constraints", &names).finish()
    }
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Immutable map from structure type to its constraint metadata.
///
/// Safe to share between concurrent validation calls.
#[derive(Debug, Clone, Default)]
pub struct ConstraintRegistry {
    classes: HashMap<TypeId, Arc<ClassSchema>>,
    library: ConstraintLibrary,
}

impl ConstraintRegistry {
    /// Starts building a registry.
    pub fn builder() -> ConstraintRegistryBuilder {
        ConstraintRegistryBuilder::default()
    }

    /// Looks up the schema for a type.
    pub fn schema(&self, type_id: TypeId) -> Option<&Arc<ClassSchema>> {
        self.classes.get(&type_id)
    }

    /// Looks up the schema for `T`.
    pub fn schema_of<T: Validatable>(&self) -> Option<&Arc<ClassSchema>> {
        self.schema(TypeId::of::<T>())
    }

    /// The named-constraint library.
    pub fn library(&self) -> &ConstraintLibrary {
        &self.library
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns `true` if no type is registered.
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Checks every registered schema against the library.
    ///
    /// Schemas are visited by name so the reported fault does not depend on
    /// hash order.
    pub fn check(&self) -> Result<()> {
        let mut schemas: Vec<&Arc<ClassSchema>> = self.classes.values().collect();
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        schemas
            .into_iter()
            .try_for_each(|schema| schema.check(&self.library))
    }

    /// Resolves a record's predicate.
    pub(crate) fn resolve<'r>(&'r self, evaluator: &'r Evaluator) -> Option<&'r Arc<dyn Constraint>> {
        match evaluator {
            Evaluator::Inline(constraint) => Some(constraint),
            Evaluator::Named(name) => self.library.get(name),
        }
    }
}

/// Builder for [`ConstraintRegistry`].
#[derive(Default)]
pub struct ConstraintRegistryBuilder {
    classes: HashMap<TypeId, ClassSchema>,
    library: ConstraintLibrary,
}

impl ConstraintRegistryBuilder {
    /// Registers a class schema, merging with any earlier schema for the
    /// same type.
    #[must_use = "builder methods must be chained or built"]
    pub fn class(mut self, schema: ClassSchema) -> Self {
        match self.classes.get_mut(&schema.type_id) {
            Some(existing) => existing.merge(schema),
            None => {
                self.classes.insert(schema.type_id, schema);
            }
        }
        self
    }

    /// Registers a named constraint in the library.
    #[must_use = "builder methods must be chained or built"]
    pub fn constraint(self, constraint: impl Constraint + 'static) -> Self {
        self.constraint_arc(Arc::new(constraint))
    }

    /// Registers a shared named constraint in the library.
    #[must_use = "builder methods must be chained or built"]
    pub fn constraint_arc(mut self, constraint: Arc<dyn Constraint>) -> Self {
        let name = constraint.name().to_owned();
        self.library.constraints.insert(name, constraint);
        self
    }

    /// Freezes the registry.
    pub fn build(self) -> ConstraintRegistry {
        let classes = self
            .classes
            .into_iter()
            .map(|(type_id, schema)| (type_id, Arc::new(schema)))
            .collect::<HashMap<_, _>>();

        tracing::debug!(
            classes = classes.len(),
            named_constraints = self.library.len(),
            "built constraint registry"
        );

        ConstraintRegistry {
            classes,
            library: self.library,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
