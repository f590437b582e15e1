use std::collections::HashMap;

use crate::{ObjectNode, PropertyId, SchemaTable};

pub(super) fn id(value: u64) -> PropertyId {
  PropertyId::new(value).expect("test identities are positive")
}

pub(super) fn object(value: u64) -> ObjectNode {
  ObjectNode::new(id(value))
}

pub(super) fn table(entries: Vec<(&str, ObjectNode)>) -> SchemaTable {
  entries.into_iter().map(|(name, node)| (name.to_string(), node)).collect()
}

/// Panics if any entry still holds an inline object, at any depth.
pub(super) fn assert_flat(table: &SchemaTable) {
  for (name, node) in table {
    assert!(!node.contains_nested_object(), "{name} still contains an inline object");
  }
}

/// Panics unless every reference resolves to exactly one entry.
pub(super) fn assert_references_resolve(table: &SchemaTable) {
  let mut owners: HashMap<PropertyId, Vec<&str>> = HashMap::new();
  for (name, node) in table {
    owners.entry(node.id).or_default().push(name);
  }

  for (name, node) in table {
    for (prop_name, target) in node.references() {
      let matches = owners.get(&target).map_or(0, Vec::len);
      assert_eq!(
        matches, 1,
        "{name}.{prop_name} references identity {target}, found {matches} entries"
      );
    }
  }
}

pub(super) fn name_of(table: &SchemaTable, target: PropertyId) -> Option<&str> {
  table
    .iter()
    .find_map(|(name, node)| (node.id == target).then_some(name.as_str()))
}
