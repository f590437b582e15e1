use oas3_flatten::{ObjectNode, PropertyId, SchemaTable};
use serde_json::Value;

use crate::{
  generator::{render::PhpRenderer, template::Template},
  utils::spec::OpenApiDocument,
};

pub(super) fn parse_spec(value: Value) -> OpenApiDocument {
  OpenApiDocument::from_value(value).expect("fixture is a valid OpenAPI document")
}

/// Wraps `schemas` in a minimal 3.0 document with the given paths.
pub(super) fn spec_with(schemas: Value, paths: Value) -> OpenApiDocument {
  parse_spec(serde_json::json!({
    "openapi": "3.0.3",
    "info": { "title": "Fixture", "version": "1.0.0" },
    "paths": paths,
    "components": { "schemas": schemas }
  }))
}

pub(super) fn renderer(namespace: &str) -> PhpRenderer {
  PhpRenderer::new(namespace, Template::default()).expect("fixture namespace is valid")
}

pub(super) fn id(value: u64) -> PropertyId {
  PropertyId::new(value).expect("test identities are positive")
}

pub(super) fn object(value: u64) -> ObjectNode {
  ObjectNode::new(id(value))
}

pub(super) fn table(entries: Vec<(&str, ObjectNode)>) -> SchemaTable {
  entries.into_iter().map(|(name, node)| (name.to_string(), node)).collect()
}
