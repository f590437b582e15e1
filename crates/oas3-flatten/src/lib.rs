//! Flattening of nested OpenAPI object schemas.
//!
//! A schema parser produces one [`ObjectNode`] per named schema, with inline
//! objects nested arbitrarily deep inside properties and array items. Code
//! generators want the opposite: one independent definition per type, linked
//! by name. [`flatten`] bridges the two by lifting every nested object into a
//! flat [`SchemaTable`] and leaving [`ReferenceNode`]s behind.
//!
//! ```
//! use oas3_flatten::{IdAllocator, ObjectNode, Property, flatten};
//!
//! let mut ids = IdAllocator::new();
//! let user_id = ids.next_id();
//! let address = ObjectNode::new(ids.next_id()).with_property("city", Property::string());
//! let address_id = address.id;
//! let user = ObjectNode::new(user_id)
//!   .with_property("name", Property::string())
//!   .with_property("address", Property::Object(address));
//!
//! let table = flatten([("User".to_string(), user)].into_iter().collect())?;
//!
//! assert_eq!(table["User"].properties["address"], Property::reference(address_id));
//! assert!(table["UserAddress"].properties.contains_key("city"));
//! # Ok::<(), oas3_flatten::FlattenError>(())
//! ```

#![allow(clippy::doc_markdown)]

pub mod error;
pub mod flatten;
pub mod ids;
pub mod naming;
pub mod property;
pub mod raw;

#[cfg(test)]
mod tests;

pub use error::{FlattenError, PropertyPath, Result};
pub use flatten::{BackReference, Flattened, Flattener, flatten, identity_index};
pub use ids::IdAllocator;
pub use property::{
  ArrayProperty, BooleanProperty, IntegerFormat, IntegerProperty, NumberFormat, NumberProperty, ObjectNode, Property,
  PropertyId, PropertyKind, ReferenceNode, SchemaTable, StringProperty,
};
