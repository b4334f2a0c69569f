//! Dynamic field values and the [`Validatable`] trait
//!
//! The engine never sees concrete struct fields. Every structure that can be
//! validated implements [`Validatable`] and hands out its fields as [`Value`]s,
//! a small dynamic model that distinguishes an absent field from an explicit
//! "no value" marker and keeps nested structures as shared references so the
//! engine can recurse into them.
//!
//! # Examples
//!
//! ```rust,ignore
//! use nebula_constraint::{Validatable, Value};
//!
//! #[derive(Debug)]
//! struct Post {
//!     title: String,
//! }
//!
//! impl Validatable for Post {
//!     fn property(&self, name: &str) -> Value {
//!         match name {
//!             "title" => Value::from(self.title.as_str()),
//!             _ => Value::Absent,
//!         }
//!     }
//! }
//! ```

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

// ============================================================================
// VALIDATABLE
// ============================================================================

/// A structure instance the engine can validate.
///
/// Implementations are read-only views: the engine only reads properties and
/// never mutates the target.
pub trait Validatable: Any + Send + Sync + fmt::Debug {
    /// Reads a property by name.
    ///
    /// Unknown names must return [`Value::Absent`].
    fn property(&self, name: &str) -> Value;

    /// Lists the instance's own property names.
    ///
    /// Only consulted when whitelisting is enabled. The default reports no
    /// properties, which makes every instance trivially whitelisted.
    fn property_names(&self) -> Vec<&'static str> {
        Vec::new()
    }

    /// Short name of the implementing type, used for unregistered targets.
    fn type_name(&self) -> &'static str {
        short_type_name::<Self>()
    }
}

/// Returns the registry key for a type-erased target.
pub(crate) fn type_key(target: &dyn Validatable) -> TypeId {
    let any: &dyn Any = target;
    any.type_id()
}

/// Identity of an instance along a recursion path.
pub(crate) fn instance_id(target: &Arc<dyn Validatable>) -> usize {
    Arc::as_ptr(target).cast::<()>() as usize
}

/// Short, human-readable name of a type (last path segment, generics kept).
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let head = full.split('<').next().unwrap_or(full);
    match head.rfind("::") {
        Some(idx) => &full[idx + 2..],
        None => full,
    }
}

// ============================================================================
// VALUE
// ============================================================================

/// A field value as read at validation time.
#[derive(Clone, Default)]
pub enum Value {
    /// The property does not exist on the instance (undefined).
    #[default]
    Absent,
    /// The property exists but holds no value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// String value.
    String(String),
    /// Sequence of values.
    List(Vec<Value>),
    /// Nested structure instance.
    Object(Arc<dyn Validatable>),
}

impl Value {
    /// Wraps a structure instance.
    pub fn object<T: Validatable>(target: Arc<T>) -> Self {
        Self::Object(target)
    }

    /// Returns `true` for [`Value::Absent`] and [`Value::Null`].
    ///
    /// Empty strings, zero and empty lists are values, not emptiness.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Absent | Self::Null)
    }

    /// Returns `true` if the property is absent.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Returns `true` if the value is the explicit no-value marker.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for string values.
    pub fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    /// Returns `true` for integer and float values.
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    /// Returns `true` for nested structure instances.
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Returns `true` for sequences.
    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    /// Returns the string slice for string values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the numeric value for integer and float values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the elements of a sequence.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the nested instance.
    pub fn as_object(&self) -> Option<&Arc<dyn Validatable>> {
        match self {
            Self::Object(target) => Some(target),
            _ => None,
        }
    }

    /// Name of the value's kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Absent => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Int(_) | Self::Float(_) => "number",
            Self::String(_) => "string",
            Self::List(_) => "array",
            Self::Object(_) => "object",
        }
    }

    /// Returns `true` for values that may be substituted into a `$value`
    /// message token.
    pub(crate) fn is_primitive(&self) -> bool {
        matches!(
            self,
            Self::Bool(_) | Self::Int(_) | Self::Float(_) | Self::String(_)
        )
    }

    /// Strict equality against a JSON parameter.
    ///
    /// Numbers compare by numeric value, objects never equal a parameter.
    pub fn strict_eq(&self, other: &serde_json::Value) -> bool {
        use serde_json::Value as Json;
        match (self, other) {
            (Self::Null, Json::Null) => true,
            (Self::Bool(a), Json::Bool(b)) => a == b,
            (Self::Int(_) | Self::Float(_), Json::Number(b)) => {
                self.as_f64().zip(b.as_f64()).is_some_and(|(a, b)| a == b)
            }
            (Self::String(a), Json::String(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Absent, Self::Absent) | (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
            (Self::Int(_) | Self::Float(_), Self::Int(_) | Self::Float(_)) => {
                self.as_f64() == other.as_f64()
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("Absent"),
            Self::Null => f.write_str("Null"),
            Self::Bool(b) => write!(f, "Bool({b})"),
            Self::Int(n) => write!(f, "Int({n})"),
            Self::Float(n) => write!(f, "Float({n})"),
            Self::String(s) => write!(f, "String({s:?})"),
            Self::List(items) => f.debug_list().entries(items).finish(),
            Self::Object(target) => write!(f, "Object({target:?})"),
        }
    }
}

/// Renders the value the way it is substituted into messages.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("undefined"),
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
            Self::Object(_) => f.write_str("[object Object]"),
        }
    }
}

/// Nested objects serialize as the map of their declared properties.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Absent | Self::Null => serializer.serialize_none(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(n) => serializer.serialize_i64(*n),
            Self::Float(n) => serializer.serialize_f64(*n),
            Self::String(s) => serializer.serialize_str(s),
            Self::List(items) => items.serialize(serializer),
            Self::Object(target) => {
                let names = target.property_names();
                let mut map = serializer.serialize_map(Some(names.len()))?;
                for name in names {
                    map.serialize_entry(name, &target.property(name))?;
                }
                map.end()
            }
        }
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

macro_rules! int_conversions {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Self::Int(i64::from(value))
                }
            }
        )*
    };
}

int_conversions!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Float(f64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(value: Vec<T>) -> Self {
        Self::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Validatable> From<Arc<T>> for Value {
    fn from(value: Arc<T>) -> Self {
        Self::Object(value)
    }
}

impl From<Arc<dyn Validatable>> for Value {
    fn from(value: Arc<dyn Validatable>) -> Self {
        Self::Object(value)
    }
}

// ============================================================================
// TESTS
// ============================================================================
