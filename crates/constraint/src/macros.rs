//! Macros for making structures validatable with minimal boilerplate.
//!
//! # Examples
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use nebula_constraint::impl_validatable;
//!
//! #[derive(Debug)]
//! struct Author {
//!     name: String,
//! }
//!
//! #[derive(Debug)]
//! struct Post {
//!     title: String,
//!     rating: Option<i64>,
//!     author: Arc<Author>,
//! }
//!
//! impl_validatable!(Author { name });
//! impl_validatable!(Post { title, rating, author });
//! ```

// ============================================================================
// IMPL VALIDATABLE
// ============================================================================

/// Implements [`Validatable`](crate::Validatable) by reading the listed fields.
///
/// Each field is cloned and converted with `Value::from`, so every listed
/// field type needs a `From` conversion into [`Value`](crate::Value): scalars,
/// strings, `Option<T>`, `Vec<T>` and `Arc<T: Validatable>`.
#[macro_export]
macro_rules! impl_validatable {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $crate::Validatable for $ty {
            fn property(&self, name: &str) -> $crate::Value {
                match name {
                    $(
                        stringify!($field) => {
                            $crate::Value::from(::std::clone::Clone::clone(&self.$field))
                        }
                    )*
                    _ => $crate::Value::Absent,
                }
            }

            fn property_names(&self) -> ::std::vec::Vec<&'static str> {
                ::std::vec![$(stringify!($field)),*]
            }
        }
    };
}
