//! Schema flattening.
//!
//! Every object nested inside a root, whether directly under a property or
//! as the element type of an array, is lifted into the output table under a
//! derived name and replaced in place by a reference carrying its identity.
//! After a run no entry of the table contains an inline object anywhere in
//! its property tree.
//!
//! Identities decide everything: a root's identity always resolves to the
//! root's own name, a non-root identity is extracted the first time it is met
//! and only referenced afterwards, and an identity that is already being
//! flattened further up the current descent is cut into a back reference.

use std::collections::{BTreeSet, HashMap, HashSet};

use indexmap::IndexMap;

use crate::{
  error::{FlattenError, PropertyPath, Result},
  naming::{array_item_name, ensure_unique, nested_object_name},
  property::{ArrayProperty, ObjectNode, Property, PropertyId, SchemaTable},
};

/// Flattens `roots` into a table in which no object is nested inside another.
///
/// # Errors
///
/// Fails if two roots share an identity or if a reference in the input points
/// at an identity that does not end up in the output.
pub fn flatten(roots: SchemaTable) -> Result<SchemaTable> {
  Flattener::new(roots)?.run().map(|flattened| flattened.table)
}

/// Maps every object identity in `table` to the name it is stored under.
#[must_use]
pub fn identity_index(table: &SchemaTable) -> HashMap<PropertyId, &str> {
  table.iter().map(|(name, node)| (node.id, name.as_str())).collect()
}

/// A property that pointed back at an object still being flattened and was
/// turned into a reference to break the cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackReference {
  pub path: PropertyPath,
  pub target: PropertyId,
}

/// Result of a flattening run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flattened {
  /// Roots under their own names, each followed by the objects first extracted from it.
  pub table: SchemaTable,
  /// Extracted entries and the location they were lifted from.
  pub extracted: IndexMap<String, PropertyPath>,
  pub back_references: Vec<BackReference>,
}

impl Flattened {
  #[must_use]
  pub fn is_extracted(&self, name: &str) -> bool {
    self.extracted.contains_key(name)
  }

  #[must_use]
  pub fn root_count(&self) -> usize {
    self.table.len() - self.extracted.len()
  }
}

#[derive(Debug)]
struct FlatObject {
  node: ObjectNode,
  back_references: Vec<BackReference>,
}

#[derive(Debug)]
struct Extraction {
  name: String,
  path: PropertyPath,
  object: FlatObject,
}

/// Extracted objects keyed by identity, in discovery order.
type Extractions = IndexMap<PropertyId, Extraction>;

fn merge_extractions(into: &mut Extractions, from: Extractions) {
  for (id, extraction) in from {
    into.entry(id).or_insert(extraction);
  }
}

/// Naming and location context of the object currently being flattened.
struct Scope<'a> {
  type_name: &'a str,
  path: &'a PropertyPath,
}

/// What flattening one object's direct properties contributes.
#[derive(Default)]
struct ObjectWalk {
  back_references: Vec<BackReference>,
  extractions: Extractions,
}

pub struct Flattener {
  roots: SchemaTable,
  root_ids: HashSet<PropertyId>,
}

impl Flattener {
  /// Registers the root identities.
  ///
  /// # Errors
  ///
  /// Returns [`FlattenError::DuplicateRootIdentity`] if two roots carry the same identity.
  pub fn new(roots: SchemaTable) -> Result<Self> {
    let mut owners: HashMap<PropertyId, &str> = HashMap::with_capacity(roots.len());
    for (name, node) in &roots {
      if let Some(first) = owners.insert(node.id, name) {
        return Err(FlattenError::DuplicateRootIdentity {
          id: node.id,
          first: first.to_string(),
          second: name.clone(),
        });
      }
    }

    let root_ids = owners.into_keys().collect();
    Ok(Self { roots, root_ids })
  }

  /// Flattens every root and assembles the output table.
  ///
  /// # Errors
  ///
  /// Returns [`FlattenError::DanglingReference`] if a reference in the result
  /// names an identity that has no entry.
  pub fn run(mut self) -> Result<Flattened> {
    let roots = std::mem::take(&mut self.roots);
    let mut used_names: BTreeSet<String> = roots.keys().cloned().collect();
    let mut seen: Extractions = IndexMap::new();
    let mut flat_roots = Vec::with_capacity(roots.len());

    for (name, node) in roots {
      let path = PropertyPath::root(name.as_str());
      let scope = Scope {
        type_name: name.as_str(),
        path: &path,
      };
      let mut visiting = HashSet::new();
      let (flat, extractions) = self.flatten_object(node, &scope, &mut visiting);

      let first_seen: Vec<PropertyId> = extractions.keys().filter(|id| !seen.contains_key(*id)).copied().collect();
      merge_extractions(&mut seen, extractions);
      flat_roots.push((name, flat, first_seen));
    }

    let mut table = SchemaTable::with_capacity(flat_roots.len() + seen.len());
    let mut extracted = IndexMap::with_capacity(seen.len());
    let mut back_references = Vec::new();

    for (name, flat, first_seen) in flat_roots {
      back_references.extend(flat.back_references);
      table.insert(name, flat.node);

      for id in first_seen {
        let Some(extraction) = seen.swap_remove(&id) else {
          continue;
        };
        let unique = ensure_unique(&extraction.name, &used_names);
        used_names.insert(unique.clone());
        back_references.extend(extraction.object.back_references);
        extracted.insert(unique.clone(), extraction.path);
        table.insert(unique, extraction.object.node);
      }
    }

    verify_references(&table)?;

    Ok(Flattened {
      table,
      extracted,
      back_references,
    })
  }

  fn flatten_object(
    &self,
    mut node: ObjectNode,
    scope: &Scope<'_>,
    visiting: &mut HashSet<PropertyId>,
  ) -> (FlatObject, Extractions) {
    visiting.insert(node.id);

    let sibling_names: Vec<String> = node.properties.keys().cloned().collect();
    let properties = std::mem::take(&mut node.properties);
    let mut walk = ObjectWalk::default();

    for (prop_name, property) in properties {
      let path = scope.path.child(prop_name.as_str());
      let rewritten = match property {
        Property::Object(child) => {
          let name = nested_object_name(scope.type_name, &prop_name);
          self.extract(child, name, path, visiting, &mut walk)
        }
        Property::Array(array) if matches!(array.innermost_items(), Property::Object(_)) => {
          let name = array_item_name(scope.type_name, &prop_name, sibling_names.iter().map(String::as_str));
          Property::Array(self.flatten_array(array, &name, &path, visiting, &mut walk))
        }
        other => other,
      };
      node.properties.insert(prop_name, rewritten);
    }

    visiting.remove(&node.id);

    let flat = FlatObject {
      node,
      back_references: walk.back_references,
    };
    (flat, walk.extractions)
  }

  /// Rewrites the element type of `array`, descending through nested array layers.
  fn flatten_array(
    &self,
    array: ArrayProperty,
    item_name: &str,
    path: &PropertyPath,
    visiting: &mut HashSet<PropertyId>,
    walk: &mut ObjectWalk,
  ) -> ArrayProperty {
    let ArrayProperty { items, description } = array;
    let items_path = path.items();

    let items = match *items {
      Property::Object(child) => self.extract(child, item_name.to_string(), items_path, visiting, walk),
      Property::Array(inner) => Property::Array(self.flatten_array(inner, item_name, &items_path, visiting, walk)),
      other => other,
    };

    ArrayProperty {
      items: Box::new(items),
      description,
    }
  }

  /// Lifts `child` out of its parent and returns the reference that replaces it.
  fn extract(
    &self,
    child: ObjectNode,
    name: String,
    path: PropertyPath,
    visiting: &mut HashSet<PropertyId>,
    walk: &mut ObjectWalk,
  ) -> Property {
    let id = child.id;

    if visiting.contains(&id) {
      walk.back_references.push(BackReference { path, target: id });
      return Property::reference(id);
    }

    if self.root_ids.contains(&id) || walk.extractions.contains_key(&id) {
      return Property::reference(id);
    }

    let scope = Scope {
      type_name: &name,
      path: &path,
    };
    let (object, nested) = self.flatten_object(child, &scope, visiting);

    walk.extractions.insert(id, Extraction { name, path, object });
    merge_extractions(&mut walk.extractions, nested);

    Property::reference(id)
  }
}

fn verify_references(table: &SchemaTable) -> Result<()> {
  let known = identity_index(table);

  for (name, node) in table {
    if let Some((prop_name, id)) = node.references().find(|(_, id)| !known.contains_key(id)) {
      return Err(FlattenError::DanglingReference {
        path: PropertyPath::root(name.as_str()).child(prop_name),
        id,
      });
    }
  }

  Ok(())
}
