use std::{fmt, num::NonZeroU64};

use indexmap::IndexMap;
use strum::{Display, EnumString};

/// Table of named object schemas. Used both as the input roots and the flattened output.
pub type SchemaTable = IndexMap<String, ObjectNode>;

/// Identity of an object node, unique across a whole document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PropertyId(NonZeroU64);

impl PropertyId {
  /// Returns `None` for zero, which is never a valid identity.
  #[must_use]
  pub const fn new(value: u64) -> Option<Self> {
    match NonZeroU64::new(value) {
      Some(id) => Some(Self(id)),
      None => None,
    }
  }

  #[must_use]
  pub const fn get(self) -> u64 {
    self.0.get()
  }
}

impl From<NonZeroU64> for PropertyId {
  fn from(value: NonZeroU64) -> Self {
    Self(value)
  }
}

impl fmt::Display for PropertyId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Discriminant of a [`Property`], spelled the way OpenAPI spells `type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum PropertyKind {
  String,
  Number,
  Integer,
  Boolean,
  Array,
  Object,
  Reference,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum IntegerFormat {
  #[strum(serialize = "int32")]
  Int32,
  #[strum(serialize = "int64")]
  Int64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum NumberFormat {
  #[strum(serialize = "float")]
  Float,
  #[strum(serialize = "double")]
  Double,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringProperty {
  /// Open-ended format annotation (`date-time`, `uuid`, `email`, ...).
  pub format: Option<String>,
  /// Allowed literal values, empty when the string is unconstrained.
  pub enum_values: Vec<String>,
  pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IntegerProperty {
  pub format: Option<IntegerFormat>,
  pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumberProperty {
  pub format: Option<NumberFormat>,
  pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BooleanProperty {
  pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayProperty {
  pub items: Box<Property>,
  pub description: Option<String>,
}

impl ArrayProperty {
  #[must_use]
  pub fn of(items: Property) -> Self {
    Self {
      items: Box::new(items),
      description: None,
    }
  }

  /// The element type after unwrapping every nested array layer.
  #[must_use]
  pub fn innermost_items(&self) -> &Property {
    let mut items = self.items.as_ref();
    while let Property::Array(inner) = items {
      items = inner.items.as_ref();
    }
    items
  }
}

/// A structured record type with named properties and a stable identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectNode {
  pub id: PropertyId,
  pub description: Option<String>,
  pub properties: IndexMap<String, Property>,
}

impl ObjectNode {
  #[must_use]
  pub fn new(id: PropertyId) -> Self {
    Self {
      id,
      description: None,
      properties: IndexMap::new(),
    }
  }

  #[must_use]
  pub fn with_property(mut self, name: impl Into<String>, property: Property) -> Self {
    self.properties.insert(name.into(), property);
    self
  }

  #[must_use]
  pub fn with_description(mut self, description: impl Into<String>) -> Self {
    self.description = Some(description.into());
    self
  }

  /// Identities of every reference reachable from this object's properties,
  /// including those wrapped in arrays. Identity-less references are skipped.
  pub fn references(&self) -> impl Iterator<Item = (&str, PropertyId)> + '_ {
    self.properties.iter().filter_map(|(name, property)| match property.leaf() {
      Property::Reference(ReferenceNode { target: Some(id) }) => Some((name.as_str(), *id)),
      _ => None,
    })
  }

  /// True if any property, at any depth, still holds an inline object.
  #[must_use]
  pub fn contains_nested_object(&self) -> bool {
    self.properties.values().any(Property::contains_object)
  }
}

/// Stand-in for an object that lives elsewhere in the table.
///
/// A reference without a target marks a name that is itself an alias of a
/// top-level schema; the flattener passes it through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReferenceNode {
  pub target: Option<PropertyId>,
}

impl ReferenceNode {
  #[must_use]
  pub const fn to(id: PropertyId) -> Self {
    Self { target: Some(id) }
  }

  #[must_use]
  pub const fn alias() -> Self {
    Self { target: None }
  }
}

/// One schema node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Property {
  String(StringProperty),
  Number(NumberProperty),
  Integer(IntegerProperty),
  Boolean(BooleanProperty),
  Array(ArrayProperty),
  Object(ObjectNode),
  Reference(ReferenceNode),
}

impl Property {
  #[must_use]
  pub fn string() -> Self {
    Self::String(StringProperty::default())
  }

  #[must_use]
  pub fn integer() -> Self {
    Self::Integer(IntegerProperty::default())
  }

  #[must_use]
  pub fn number() -> Self {
    Self::Number(NumberProperty::default())
  }

  #[must_use]
  pub fn boolean() -> Self {
    Self::Boolean(BooleanProperty::default())
  }

  #[must_use]
  pub fn array_of(items: Property) -> Self {
    Self::Array(ArrayProperty::of(items))
  }

  #[must_use]
  pub const fn reference(id: PropertyId) -> Self {
    Self::Reference(ReferenceNode::to(id))
  }

  #[must_use]
  pub const fn kind(&self) -> PropertyKind {
    match self {
      Self::String(_) => PropertyKind::String,
      Self::Number(_) => PropertyKind::Number,
      Self::Integer(_) => PropertyKind::Integer,
      Self::Boolean(_) => PropertyKind::Boolean,
      Self::Array(_) => PropertyKind::Array,
      Self::Object(_) => PropertyKind::Object,
      Self::Reference(_) => PropertyKind::Reference,
    }
  }

  #[must_use]
  pub const fn as_object(&self) -> Option<&ObjectNode> {
    match self {
      Self::Object(node) => Some(node),
      _ => None,
    }
  }

  #[must_use]
  pub fn description(&self) -> Option<&str> {
    match self {
      Self::String(p) => p.description.as_deref(),
      Self::Number(p) => p.description.as_deref(),
      Self::Integer(p) => p.description.as_deref(),
      Self::Boolean(p) => p.description.as_deref(),
      Self::Array(p) => p.description.as_deref(),
      Self::Object(p) => p.description.as_deref(),
      Self::Reference(_) => None,
    }
  }

  /// The node itself, or the innermost element type when this is an array.
  #[must_use]
  pub fn leaf(&self) -> &Property {
    match self {
      Self::Array(array) => array.innermost_items(),
      other => other,
    }
  }

  fn contains_object(&self) -> bool {
    matches!(self.leaf(), Self::Object(_))
  }
}
