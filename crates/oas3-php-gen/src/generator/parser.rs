//! OpenAPI 3.0 documents to property trees.
//!
//! Every object component schema becomes a root under its own name, followed by
//! the JSON request and response bodies of every operation. Component objects
//! receive their identity before anything else is visited, and every `$ref` to
//! one becomes a reference to that identity rather than a copy of the schema.
//! Properties follow the declaration order of the raw document.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use oas3::{
  Spec,
  spec::{MediaType, ObjectOrReference, ObjectSchema, Operation, Schema, SchemaType, SchemaTypeSet},
};
use oas3_flatten::{
  ArrayProperty, BooleanProperty, IdAllocator, IntegerProperty, NumberProperty, ObjectNode, Property, PropertyId,
  PropertyPath, ReferenceNode, SchemaTable, StringProperty,
  naming::{ensure_unique, type_name},
};
use serde_json::Value;
use thiserror::Error;

use crate::{
  generator::metrics::GenerationWarning,
  utils::{parse_schema_ref_path, spec::OpenApiDocument},
};

const JSON_MEDIA_TYPE: &str = "application/json";
const ARRAY_WRAPPER_PROPERTY: &str = "items";
const MAX_REF_HOPS: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
  #[error("unsupported schema at '{path}': {reason}")]
  UnsupportedSchema { path: PropertyPath, reason: String },
  #[error("cannot resolve '{reference}' at '{path}': {message}")]
  UnresolvedReference {
    path: PropertyPath,
    reference: String,
    message: String,
  },
  #[error("'{path}' references skipped schema '{schema}'")]
  SkippedDependency { path: PropertyPath, schema: String },
}

impl ParseError {
  fn unsupported(path: &PropertyPath, reason: impl Into<String>) -> Self {
    Self::UnsupportedSchema {
      path: path.clone(),
      reason: reason.into(),
    }
  }

  fn unresolved(path: &PropertyPath, reference: &str, message: impl ToString) -> Self {
    Self::UnresolvedReference {
      path: path.clone(),
      reference: reference.to_string(),
      message: message.to_string(),
    }
  }
}

type Result<T> = std::result::Result<T, ParseError>;

/// Roots ready for flattening plus everything that had to be left out.
#[derive(Debug, Default)]
pub struct ParsedRoots {
  pub roots: SchemaTable,
  pub warnings: Vec<GenerationWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
  Object,
  Array,
  Scalar,
}

/// Operation a body root was taken from.
#[derive(Debug, Clone)]
struct BodyOrigin {
  role: &'static str,
  method: String,
  path: String,
}

pub struct SchemaParser<'a> {
  spec: &'a Spec,
  raw: &'a Value,
  ids: IdAllocator,
  component_ids: BTreeMap<String, PropertyId>,
  in_progress: HashSet<String>,
  used_names: BTreeSet<String>,
  body_origins: HashMap<String, BodyOrigin>,
  parsed: ParsedRoots,
}

impl<'a> SchemaParser<'a> {
  pub fn new(document: &'a OpenApiDocument) -> Self {
    let spec = &document.spec;
    let mut ids = IdAllocator::new();
    let mut component_ids = BTreeMap::new();

    for (name, schema_ref) in component_schemas(spec) {
      let Ok(schema) = schema_ref.resolve(spec) else {
        continue;
      };
      if shape_of(&schema) == Shape::Object {
        component_ids.insert(name.clone(), ids.next_id());
      }
    }

    Self {
      spec,
      raw: &document.raw,
      ids,
      component_ids,
      in_progress: HashSet::new(),
      used_names: BTreeSet::new(),
      body_origins: HashMap::new(),
      parsed: ParsedRoots::default(),
    }
  }

  pub fn parse(mut self) -> ParsedRoots {
    let spec = self.spec;

    for (name, schema_ref) in component_schemas(spec) {
      self.parse_component(name, schema_ref);
    }

    for (path, method, operation) in spec.operations() {
      self.parse_operation(&path, method.as_str(), operation);
    }

    self.drop_dangling_roots();
    self.parsed
  }

  fn parse_component(&mut self, name: &str, schema_ref: &ObjectOrReference<ObjectSchema>) {
    let root_name = type_name(name);
    let path = PropertyPath::root(root_name.as_str());

    let schema = match schema_ref.resolve(self.spec) {
      Ok(schema) => schema,
      Err(err) => {
        let error = ParseError::unresolved(&path, name, err);
        self.skip_schema(root_name, &error);
        return;
      }
    };

    if shape_of(&schema) == Shape::Scalar {
      return;
    }

    let id = self.component_ids.get(name).copied();
    let raw = self.raw_component(name);
    match self.convert_root(&schema, id, raw, &path) {
      Ok(node) => {
        self.insert_root(root_name, node);
      }
      Err(error) => self.skip_schema(root_name, &error),
    }
  }

  fn parse_operation(&mut self, path: &str, method: &str, operation: &Operation) {
    let base = operation_base_name(operation.operation_id.as_deref(), path, method);
    let raw_operation = self.raw_operation(path, method);
    let origin = |role: &'static str| BodyOrigin {
      role,
      method: method.to_string(),
      path: path.to_string(),
    };

    if let Some(body_ref) = &operation.request_body {
      match body_ref.resolve(self.spec) {
        Ok(body) => {
          if let Some((media_type, schema_ref)) = json_schema(&body.content) {
            let raw_body = self.follow(child(raw_operation, "requestBody"));
            let raw = media_schema(raw_body, media_type);
            self.parse_body(format!("{base}Request"), schema_ref, raw, origin("request"));
          }
        }
        Err(err) => self.skip_body(&origin("request"), &err.to_string()),
      }
    }

    let Some(responses) = &operation.responses else {
      return;
    };

    let raw_responses = child(raw_operation, "responses");
    let mut bodies = Vec::new();
    for (status, response_ref) in responses {
      match response_ref.resolve(self.spec) {
        Ok(response) => {
          if let Some((media_type, schema_ref)) = json_schema(&response.content) {
            let raw_response = self.follow(child(raw_responses, status));
            bodies.push((status.as_str(), schema_ref.clone(), media_schema(raw_response, media_type)));
          }
        }
        Err(err) => self.skip_body(&origin("response"), &err.to_string()),
      }
    }

    let primary = bodies.iter().position(|(status, ..)| status.starts_with('2'));
    for (index, (status, schema_ref, raw)) in bodies.iter().enumerate() {
      let name = if Some(index) == primary {
        format!("{base}Response")
      } else {
        format!("{base}{}Response", status_suffix(status))
      };
      self.parse_body(name, schema_ref, *raw, origin("response"));
    }
  }

  fn parse_body(
    &mut self,
    name: String,
    schema_ref: &ObjectOrReference<ObjectSchema>,
    raw: Option<&'a Value>,
    origin: BodyOrigin,
  ) {
    let path = PropertyPath::root(name.as_str());

    let result = match schema_ref {
      ObjectOrReference::Ref { ref_path, .. } => self.convert_body_ref(ref_path, &path),
      ObjectOrReference::Object(schema) => self.convert_root(schema, None, raw, &path),
    };

    match result {
      Ok(node) => {
        let name = self.insert_root(name, node);
        self.body_origins.insert(name, origin);
      }
      Err(error) => self.skip_body(&origin, &error.to_string()),
    }
  }

  /// A body that points at a component gets its own identity and a copy of the component's properties.
  fn convert_body_ref(&mut self, ref_path: &str, path: &PropertyPath) -> Result<ObjectNode> {
    let component = parse_schema_ref_path(ref_path)
      .ok_or_else(|| ParseError::unresolved(path, ref_path, "not a local component reference"))?;
    let schema = self.component_schema(&component, path)?;
    let raw = self.raw_component(&component);
    self.convert_root(&schema, None, raw, path)
  }

  fn convert_root(
    &mut self,
    schema: &ObjectSchema,
    id: Option<PropertyId>,
    raw: Option<&'a Value>,
    path: &PropertyPath,
  ) -> Result<ObjectNode> {
    match shape_of(schema) {
      Shape::Object => {
        let id = id.unwrap_or_else(|| self.ids.next_id());
        self.object_node(id, schema, raw, path)
      }
      Shape::Array => {
        let items = self.convert_array(schema, raw, &path.child(ARRAY_WRAPPER_PROPERTY))?;
        let mut node = ObjectNode::new(self.ids.next_id()).with_property(ARRAY_WRAPPER_PROPERTY, Property::Array(items));
        node.description.clone_from(&schema.description);
        Ok(node)
      }
      Shape::Scalar => Err(ParseError::unsupported(path, "body schema must be an object or an array")),
    }
  }

  fn convert(
    &mut self,
    schema_ref: &ObjectOrReference<ObjectSchema>,
    raw: Option<&'a Value>,
    path: &PropertyPath,
  ) -> Result<Property> {
    match schema_ref {
      ObjectOrReference::Ref { ref_path, .. } => self.convert_ref(ref_path, path),
      ObjectOrReference::Object(schema) => self.convert_inline(schema, raw, path),
    }
  }

  /// Object components are roots of their own, so a `$ref` to one is only a reference.
  /// Anything else is inlined.
  fn convert_ref(&mut self, ref_path: &str, path: &PropertyPath) -> Result<Property> {
    let component = parse_schema_ref_path(ref_path)
      .ok_or_else(|| ParseError::unresolved(path, ref_path, "not a local component reference"))?;

    if let Some(id) = self.component_ids.get(&component) {
      return Ok(Property::reference(*id));
    }
    if self.in_progress.contains(&component) {
      return Err(ParseError::unsupported(
        path,
        format!("recursive non-object schema '{component}'"),
      ));
    }

    let schema = self.component_schema(&component, path)?;
    let raw = self.raw_component(&component);
    self.in_progress.insert(component.clone());
    let result = self.convert_inline(&schema, raw, path);
    self.in_progress.remove(&component);
    result
  }

  fn convert_inline(&mut self, schema: &ObjectSchema, raw: Option<&'a Value>, path: &PropertyPath) -> Result<Property> {
    reject_composition(schema, path)?;

    let property = match primary_type(schema, path)? {
      Some(SchemaType::String) => Property::String(StringProperty {
        format: schema.format.clone(),
        enum_values: schema
          .enum_values
          .iter()
          .filter_map(|value| value.as_str().map(str::to_string))
          .collect(),
        description: schema.description.clone(),
      }),
      Some(SchemaType::Integer) => Property::Integer(IntegerProperty {
        format: schema.format.as_deref().and_then(|format| format.parse().ok()),
        description: schema.description.clone(),
      }),
      Some(SchemaType::Number) => Property::Number(NumberProperty {
        format: schema.format.as_deref().and_then(|format| format.parse().ok()),
        description: schema.description.clone(),
      }),
      Some(SchemaType::Boolean) => Property::Boolean(BooleanProperty {
        description: schema.description.clone(),
      }),
      Some(SchemaType::Array) => Property::Array(self.convert_array(schema, raw, path)?),
      Some(SchemaType::Object) | None if !schema.properties.is_empty() => {
        let id = self.ids.next_id();
        Property::Object(self.object_node(id, schema, raw, path)?)
      }
      Some(SchemaType::Object) => return Err(ParseError::unsupported(path, "free-form object without properties")),
      Some(SchemaType::Null) => return Err(ParseError::unsupported(path, "null type")),
      None => return Err(ParseError::unsupported(path, "schema has no type")),
    };

    Ok(property)
  }

  fn convert_array(&mut self, schema: &ObjectSchema, raw: Option<&'a Value>, path: &PropertyPath) -> Result<ArrayProperty> {
    let Some(items) = schema.items.as_deref() else {
      return Err(ParseError::unsupported(path, "array without items"));
    };
    let Schema::Object(items) = items else {
      return Err(ParseError::unsupported(path, "boolean items schema"));
    };

    let items = self.convert(items, child(raw, "items"), &path.items())?;
    Ok(ArrayProperty {
      items: Box::new(items),
      description: schema.description.clone(),
    })
  }

  fn object_node(
    &mut self,
    id: PropertyId,
    schema: &ObjectSchema,
    raw: Option<&'a Value>,
    path: &PropertyPath,
  ) -> Result<ObjectNode> {
    reject_composition(schema, path)?;
    if is_free_form(schema) {
      return Err(ParseError::unsupported(path, "free-form object without properties"));
    }

    let raw_properties = child(raw, "properties");
    let mut node = ObjectNode::new(id);
    node.description.clone_from(&schema.description);
    for (name, property) in declared_properties(schema, raw_properties) {
      let converted = self.convert(property, child(raw_properties, name), &path.child(name.as_str()))?;
      node.properties.insert(name.clone(), converted);
    }
    Ok(node)
  }

  fn component_schema(&self, name: &str, path: &PropertyPath) -> Result<ObjectSchema> {
    let schema_ref = self
      .spec
      .components
      .as_ref()
      .and_then(|components| components.schemas.get(name))
      .ok_or_else(|| ParseError::unresolved(path, name, "no such schema component"))?;

    schema_ref
      .resolve(self.spec)
      .map_err(|err| ParseError::unresolved(path, name, err))
  }

  fn raw_component(&self, name: &str) -> Option<&'a Value> {
    let raw = self.raw.get("components")?.get("schemas")?.get(name);
    self.follow(raw)
  }

  fn raw_operation(&self, path: &str, method: &str) -> Option<&'a Value> {
    let item = self.follow(self.raw.get("paths")?.get(path));
    child(item, &method.to_ascii_lowercase())
  }

  /// Follows local `$ref` pointers in the raw document.
  fn follow(&self, node: Option<&'a Value>) -> Option<&'a Value> {
    let raw: &'a Value = self.raw;
    let mut node = node?;
    for _ in 0..MAX_REF_HOPS {
      let Some(pointer) = node
        .get("$ref")
        .and_then(Value::as_str)
        .and_then(|reference| reference.strip_prefix('#'))
      else {
        break;
      };
      node = raw.pointer(pointer)?;
    }
    Some(node)
  }

  fn insert_root(&mut self, name: String, node: ObjectNode) -> String {
    let name = ensure_unique(&name, &self.used_names);
    self.used_names.insert(name.clone());
    self.parsed.roots.insert(name.clone(), node);
    name
  }

  /// Removes roots that reference a skipped component, repeating until every
  /// remaining reference has a root to land on.
  fn drop_dangling_roots(&mut self) {
    let kept: HashSet<PropertyId> = self.parsed.roots.values().map(|node| node.id).collect();
    let mut skipped: HashSet<PropertyId> = self
      .component_ids
      .values()
      .filter(|id| !kept.contains(id))
      .copied()
      .collect();

    loop {
      let dangling = self.parsed.roots.iter().find_map(|(name, node)| {
        first_reference_to(node, &skipped, &PropertyPath::root(name.as_str())).map(|found| (name.clone(), found))
      });
      let Some((name, (path, target))) = dangling else {
        break;
      };

      let schema = self
        .component_ids
        .iter()
        .find_map(|(component, id)| (*id == target).then(|| component.clone()))
        .unwrap_or_default();
      let error = ParseError::SkippedDependency { path, schema };

      if let Some(node) = self.parsed.roots.shift_remove(&name) {
        skipped.insert(node.id);
      }
      match self.body_origins.remove(&name) {
        Some(origin) => self.skip_body(&origin, &error.to_string()),
        None => self.skip_schema(name, &error),
      }
    }
  }

  fn skip_schema(&mut self, schema_name: String, error: &ParseError) {
    self.parsed.warnings.push(GenerationWarning::SchemaSkipped {
      schema_name,
      error: error.to_string(),
    });
  }

  fn skip_body(&mut self, origin: &BodyOrigin, error: &str) {
    self.parsed.warnings.push(GenerationWarning::BodySkipped {
      role: origin.role.to_string(),
      method: origin.method.clone(),
      path: origin.path.clone(),
      error: error.to_string(),
    });
  }
}

fn child<'v>(node: Option<&'v Value>, key: &str) -> Option<&'v Value> {
  node.and_then(|node| node.get(key))
}

fn media_schema<'v>(body: Option<&'v Value>, media_type: &str) -> Option<&'v Value> {
  child(child(child(body, "content"), media_type), "schema")
}

/// `ObjectSchema::properties` is sorted by name; `raw_properties` restores declaration order.
fn declared_properties<'s>(
  schema: &'s ObjectSchema,
  raw_properties: Option<&Value>,
) -> Vec<(&'s String, &'s ObjectOrReference<ObjectSchema>)> {
  let Some(declared) = raw_properties.and_then(Value::as_object) else {
    return schema.properties.iter().collect();
  };

  let mut ordered: Vec<_> = declared
    .keys()
    .filter_map(|name| schema.properties.get_key_value(name))
    .collect();
  ordered.extend(
    schema
      .properties
      .iter()
      .filter(|(name, _)| !declared.contains_key(name.as_str())),
  );
  ordered
}

fn first_reference_to(
  node: &ObjectNode,
  targets: &HashSet<PropertyId>,
  path: &PropertyPath,
) -> Option<(PropertyPath, PropertyId)> {
  node
    .properties
    .iter()
    .find_map(|(name, property)| reference_in(property, targets, path.child(name.as_str())))
}

fn reference_in(
  property: &Property,
  targets: &HashSet<PropertyId>,
  path: PropertyPath,
) -> Option<(PropertyPath, PropertyId)> {
  match property {
    Property::Reference(ReferenceNode { target: Some(id) }) if targets.contains(id) => Some((path, *id)),
    Property::Array(array) => reference_in(&array.items, targets, path.items()),
    Property::Object(node) => first_reference_to(node, targets, &path),
    _ => None,
  }
}

fn component_schemas(spec: &Spec) -> impl Iterator<Item = (&String, &ObjectOrReference<ObjectSchema>)> {
  spec
    .components
    .iter()
    .flat_map(|components| components.schemas.iter())
}

/// The schema of the `application/json` entry, else of the first `+json` one, with its media type.
fn json_schema<'m>(
  content: impl IntoIterator<Item = (&'m String, &'m MediaType)>,
) -> Option<(&'m str, &'m ObjectOrReference<ObjectSchema>)> {
  let mut fallback = None;
  for (media_type, media) in content {
    if media_type == JSON_MEDIA_TYPE {
      return media.schema.as_ref().map(|schema| (media_type.as_str(), schema));
    }
    if fallback.is_none() && media_type.ends_with("+json") {
      fallback = media.schema.as_ref().map(|schema| (media_type.as_str(), schema));
    }
  }
  fallback
}

/// `getTags` → `GetTags`; without an operation id `/tags` + `get` → `TagsGet`.
pub(crate) fn operation_base_name(operation_id: Option<&str>, path: &str, method: &str) -> String {
  match operation_id {
    Some(id) => type_name(id),
    None => type_name(&format!("{path} {}", method.to_ascii_lowercase())),
  }
}

/// `404` stays `404`, `default` becomes `Default`.
fn status_suffix(status: &str) -> String {
  let mut chars = status.chars().filter(char::is_ascii_alphanumeric);
  match chars.next() {
    Some(first) => first.to_ascii_uppercase().to_string() + &chars.collect::<String>(),
    None => String::new(),
  }
}

/// Declared type with `null` ignored.
#[derive(Debug, Clone, Copy, PartialEq)]
enum DeclaredType {
  Untyped,
  Single(SchemaType),
  Ambiguous,
}

fn declared_type(schema: &ObjectSchema) -> DeclaredType {
  match &schema.schema_type {
    None => DeclaredType::Untyped,
    Some(SchemaTypeSet::Single(schema_type)) => DeclaredType::Single(*schema_type),
    Some(SchemaTypeSet::Multiple(types)) => {
      let mut non_null = types.iter().filter(|schema_type| **schema_type != SchemaType::Null);
      match (non_null.next(), non_null.next()) {
        (Some(schema_type), None) => DeclaredType::Single(*schema_type),
        (None, _) => DeclaredType::Single(SchemaType::Null),
        _ => DeclaredType::Ambiguous,
      }
    }
  }
}

fn primary_type(schema: &ObjectSchema, path: &PropertyPath) -> Result<Option<SchemaType>> {
  match declared_type(schema) {
    DeclaredType::Untyped => Ok(None),
    DeclaredType::Single(schema_type) => Ok(Some(schema_type)),
    DeclaredType::Ambiguous => Err(ParseError::unsupported(path, "multiple types")),
  }
}

fn shape_of(schema: &ObjectSchema) -> Shape {
  match declared_type(schema) {
    DeclaredType::Single(SchemaType::Array) => Shape::Array,
    DeclaredType::Single(SchemaType::Object) => Shape::Object,
    DeclaredType::Untyped if !schema.properties.is_empty() || has_composition(schema) => Shape::Object,
    _ => Shape::Scalar,
  }
}

fn has_composition(schema: &ObjectSchema) -> bool {
  !schema.all_of.is_empty() || !schema.one_of.is_empty() || !schema.any_of.is_empty()
}

fn reject_composition(schema: &ObjectSchema, path: &PropertyPath) -> Result<()> {
  if has_composition(schema) {
    return Err(ParseError::unsupported(path, "allOf/oneOf/anyOf composition"));
  }
  Ok(())
}

fn is_free_form(schema: &ObjectSchema) -> bool {
  schema.properties.is_empty() && !matches!(&schema.additional_properties, Some(Schema::Boolean(b)) if !b.0)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_operation_base_name() {
    assert_eq!(operation_base_name(Some("getTags"), "/tags", "GET"), "GetTags");
    assert_eq!(operation_base_name(Some("list-users"), "/users", "GET"), "ListUsers");
    assert_eq!(operation_base_name(None, "/tags", "GET"), "TagsGet");
    assert_eq!(operation_base_name(None, "/users/{id}", "POST"), "UsersIdPost");
  }

  #[test]
  fn test_status_suffix() {
    assert_eq!(status_suffix("404"), "404");
    assert_eq!(status_suffix("default"), "Default");
    assert_eq!(status_suffix("2XX"), "2XX");
  }
}
