//! JSON wire shape of a property tree.
//!
//! ```json
//! { "type": "object", "propertyID": 1, "properties": {
//!     "tags": { "type": "array", "items": { "type": "reference", "refID": 2 } } } }
//! ```
//!
//! The raw form is deliberately loose so that malformed input can be reported
//! with the path of the offending node instead of a generic serde error.

use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
  error::{FlattenError, PropertyPath, Result},
  property::{
    ArrayProperty, BooleanProperty, IntegerProperty, NumberProperty, ObjectNode, Property, PropertyId, PropertyKind,
    ReferenceNode, SchemaTable, StringProperty,
  },
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawProperty {
  #[serde(rename = "type", default)]
  pub kind: String,
  #[serde(rename = "propertyID", default, skip_serializing_if = "Option::is_none")]
  pub property_id: Option<u64>,
  #[serde(rename = "refID", default, skip_serializing_if = "Option::is_none")]
  pub ref_id: Option<u64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub format: Option<String>,
  #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
  pub enum_values: Option<Vec<String>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub items: Option<Box<RawProperty>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub properties: Option<IndexMap<String, RawProperty>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description: Option<String>,
}

pub type RawTable = IndexMap<String, RawProperty>;

/// A root given as a reference without identity; carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
  pub name: String,
  /// The object root that followed the alias in the input, `None` when it came last.
  pub before: Option<String>,
}

/// A decoded raw table: object roots plus the names that were bare aliases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedTable {
  pub roots: SchemaTable,
  pub aliases: Vec<Alias>,
}

/// Converts a raw table into typed roots.
///
/// # Errors
///
/// Fails on the first malformed node: an object without a positive identity,
/// an array without `items`, an unknown `type`, an unknown numeric format, or a
/// root that is neither an object nor an identity-less reference.
pub fn decode_table(raw: RawTable) -> Result<DecodedTable> {
  let mut decoded = DecodedTable::default();
  let mut pending = Vec::new();

  for (name, raw_root) in raw {
    let path = PropertyPath::root(name.as_str());
    match decode_property(raw_root, &path)? {
      Property::Object(node) => {
        decoded.aliases.extend(pending.drain(..).map(|alias| Alias {
          name: alias,
          before: Some(name.clone()),
        }));
        decoded.roots.insert(name, node);
      }
      Property::Reference(ReferenceNode { target: None }) => pending.push(name),
      other => {
        return Err(FlattenError::RootNotObject {
          path,
          kind: other.kind(),
        });
      }
    }
  }

  decoded
    .aliases
    .extend(pending.into_iter().map(|name| Alias { name, before: None }));
  Ok(decoded)
}

/// Decodes one node and everything below it.
///
/// # Errors
///
/// See [`decode_table`].
pub fn decode_property(raw: RawProperty, path: &PropertyPath) -> Result<Property> {
  let RawProperty {
    kind,
    property_id,
    ref_id,
    format,
    enum_values,
    items,
    properties,
    description,
  } = raw;

  let Ok(kind) = PropertyKind::from_str(&kind) else {
    let kind = if kind.is_empty() { "<missing>".to_string() } else { kind };
    return Err(FlattenError::UnsupportedKind {
      path: path.clone(),
      kind,
    });
  };

  let property = match kind {
    PropertyKind::String => Property::String(StringProperty {
      format,
      enum_values: enum_values.unwrap_or_default(),
      description,
    }),
    PropertyKind::Integer => Property::Integer(IntegerProperty {
      format: parse_format(format, kind, path)?,
      description,
    }),
    PropertyKind::Number => Property::Number(NumberProperty {
      format: parse_format(format, kind, path)?,
      description,
    }),
    PropertyKind::Boolean => Property::Boolean(BooleanProperty { description }),
    PropertyKind::Array => {
      let Some(items) = items else {
        return Err(FlattenError::MissingArrayItems { path: path.clone() });
      };
      Property::Array(ArrayProperty {
        items: Box::new(decode_property(*items, &path.items())?),
        description,
      })
    }
    PropertyKind::Object => {
      let Some(value) = property_id else {
        return Err(FlattenError::MissingIdentity { path: path.clone() });
      };
      let mut node = ObjectNode::new(decode_identity(value, path)?);
      node.description = description;
      for (name, child) in properties.unwrap_or_default() {
        let child = decode_property(child, &path.child(name.as_str()))?;
        node.properties.insert(name, child);
      }
      Property::Object(node)
    }
    PropertyKind::Reference => Property::Reference(ReferenceNode {
      target: ref_id.map(|value| decode_identity(value, path)).transpose()?,
    }),
  };

  Ok(property)
}

fn decode_identity(value: u64, path: &PropertyPath) -> Result<PropertyId> {
  PropertyId::new(value).ok_or_else(|| FlattenError::InvalidIdentity {
    path: path.clone(),
    value,
  })
}

fn parse_format<F: FromStr>(format: Option<String>, kind: PropertyKind, path: &PropertyPath) -> Result<Option<F>> {
  format
    .map(|format| {
      F::from_str(&format).map_err(|_| FlattenError::UnsupportedFormat {
        path: path.clone(),
        kind,
        format,
      })
    })
    .transpose()
}

/// Writes a table back into its raw shape.
///
/// Each alias goes right before the root it preceded in the input, so it lands
/// after the entries extracted from the previous root.
#[must_use]
pub fn encode_table(table: &SchemaTable, aliases: &[Alias]) -> RawTable {
  let mut raw = RawTable::with_capacity(table.len() + aliases.len());
  for (name, node) in table {
    raw.extend(aliases_before(aliases, Some(name.as_str())));
    raw.insert(name.clone(), encode_object(node));
  }
  raw.extend(aliases_before(aliases, None));
  raw
}

fn aliases_before<'a>(
  aliases: &'a [Alias],
  entry: Option<&'a str>,
) -> impl Iterator<Item = (String, RawProperty)> + 'a {
  aliases
    .iter()
    .filter(move |alias| alias.before.as_deref() == entry)
    .map(|alias| {
      let raw = RawProperty {
        kind: PropertyKind::Reference.to_string(),
        ..RawProperty::default()
      };
      (alias.name.clone(), raw)
    })
}

#[must_use]
pub fn encode_property(property: &Property) -> RawProperty {
  let kind = property.kind().to_string();
  match property {
    Property::String(p) => RawProperty {
      kind,
      format: p.format.clone(),
      enum_values: (!p.enum_values.is_empty()).then(|| p.enum_values.clone()),
      description: p.description.clone(),
      ..RawProperty::default()
    },
    Property::Integer(p) => RawProperty {
      kind,
      format: p.format.map(|f| f.to_string()),
      description: p.description.clone(),
      ..RawProperty::default()
    },
    Property::Number(p) => RawProperty {
      kind,
      format: p.format.map(|f| f.to_string()),
      description: p.description.clone(),
      ..RawProperty::default()
    },
    Property::Boolean(p) => RawProperty {
      kind,
      description: p.description.clone(),
      ..RawProperty::default()
    },
    Property::Array(p) => RawProperty {
      kind,
      items: Some(Box::new(encode_property(&p.items))),
      description: p.description.clone(),
      ..RawProperty::default()
    },
    Property::Object(node) => encode_object(node),
    Property::Reference(reference) => RawProperty {
      kind,
      ref_id: reference.target.map(PropertyId::get),
      ..RawProperty::default()
    },
  }
}

fn encode_object(node: &ObjectNode) -> RawProperty {
  RawProperty {
    kind: PropertyKind::Object.to_string(),
    property_id: Some(node.id.get()),
    properties: Some(
      node
        .properties
        .iter()
        .map(|(name, property)| (name.clone(), encode_property(property)))
        .collect(),
    ),
    description: node.description.clone(),
    ..RawProperty::default()
  }
}
