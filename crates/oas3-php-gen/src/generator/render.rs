//! PHP value classes from a flattened schema table.
//!
//! Every entry becomes one `{ClassName}.php` file. References are resolved by
//! identity, so the class a property points at is whatever name the entry ended
//! up with after flattening.

use std::{
  collections::{BTreeSet, HashMap},
  sync::LazyLock,
};

use itertools::Itertools;
use oas3_flatten::{
  ObjectNode, Property, PropertyId, ReferenceNode, SchemaTable, identity_index,
  naming::{ensure_unique, type_name},
};
use regex::Regex;
use thiserror::Error;

use crate::generator::template::{Template, TemplateValues};

const PROPERTY_INDENT: &str = "        ";

static NAMESPACE_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(\\[A-Za-z_][A-Za-z0-9_]*)*$").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
  #[error("unknown template placeholder '{{{{{name}}}}}'")]
  UnknownPlaceholder { name: String },
  #[error("invalid PHP namespace '{0}'")]
  InvalidNamespace(String),
  #[error("'{class_name}.{property}' references identity {id}, which has no class")]
  UnresolvedReference {
    class_name: String,
    property: String,
    id: PropertyId,
  },
  #[error("'{class_name}.{property}' holds an inline object; flatten the table first")]
  NestedObject { class_name: String, property: String },
}

pub fn is_valid_namespace(namespace: &str) -> bool {
  NAMESPACE_RE.is_match(namespace)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
  /// Table entry the class was rendered from.
  pub entry_name: String,
  pub class_name: String,
  pub file_name: String,
  pub contents: String,
}

/// One constructor-promoted property.
#[derive(Debug, Clone, PartialEq, Eq, bon::Builder)]
struct PhpProperty {
  name: String,
  php_type: String,
  element_type: Option<String>,
  description: Option<String>,
}

impl PhpProperty {
  fn render(&self, last: bool) -> String {
    let mut doc_lines: Vec<String> = self
      .description
      .as_deref()
      .map(doc_comment_lines)
      .unwrap_or_default();
    if let Some(element_type) = &self.element_type {
      if !doc_lines.is_empty() {
        doc_lines.push(String::new());
      }
      doc_lines.push(format!("@var {element_type}"));
    }

    let mut out = String::new();
    if !doc_lines.is_empty() {
      out.push_str(&docblock(&doc_lines, PROPERTY_INDENT));
    }
    let separator = if last { "" } else { "," };
    out.push_str(&format!("{PROPERTY_INDENT}public {} ${}{separator}\n", self.php_type, self.name));
    out
  }
}

#[derive(Debug, Clone)]
pub struct PhpRenderer {
  namespace: String,
  template: Template,
}

impl PhpRenderer {
  pub fn new(namespace: impl Into<String>, template: Template) -> Result<Self, RenderError> {
    let namespace = namespace.into();
    if !is_valid_namespace(&namespace) {
      return Err(RenderError::InvalidNamespace(namespace));
    }
    Ok(Self { namespace, template })
  }

  pub fn render(&self, table: &SchemaTable) -> Result<Vec<RenderedFile>, RenderError> {
    let class_names = class_names(table);
    let entries = identity_index(table);
    let classes_by_id: HashMap<PropertyId, &str> = entries
      .into_iter()
      .filter_map(|(id, entry)| class_names.get(entry).map(|class| (id, class.as_str())))
      .collect();

    table
      .iter()
      .map(|(entry_name, node)| {
        let class_name = &class_names[entry_name.as_str()];
        let contents = self.render_class(class_name, node, &classes_by_id)?;
        Ok(RenderedFile {
          entry_name: entry_name.clone(),
          class_name: class_name.clone(),
          file_name: format!("{class_name}.php"),
          contents,
        })
      })
      .collect()
  }

  fn render_class(
    &self,
    class_name: &str,
    node: &ObjectNode,
    classes_by_id: &HashMap<PropertyId, &str>,
  ) -> Result<String, RenderError> {
    let resolver = TypeResolver { class_name, classes_by_id };
    let mut imports = BTreeSet::new();
    let mut used_names = BTreeSet::new();
    let mut properties = Vec::with_capacity(node.properties.len());

    for (prop_name, property) in &node.properties {
      let name = ensure_unique(&php_property_name(prop_name), &used_names);
      used_names.insert(name.clone());

      let (php_type, element_type) = resolver.resolve(prop_name, property, &mut imports)?;
      properties.push(
        PhpProperty::builder()
          .name(name)
          .php_type(php_type)
          .maybe_element_type(element_type)
          .maybe_description(property.description().map(str::to_string))
          .build(),
      );
    }

    imports.remove(class_name);
    let values = TemplateValues {
      namespace: self.namespace.clone(),
      imports: self.render_imports(&imports),
      class_name: class_name.to_string(),
      description: node
        .description
        .as_deref()
        .map(|text| docblock(&doc_comment_lines(text), ""))
        .unwrap_or_default(),
      properties: properties
        .iter()
        .enumerate()
        .map(|(index, property)| property.render(index + 1 == properties.len()))
        .collect(),
    };

    Ok(self.template.render(&values))
  }

  fn render_imports(&self, imports: &BTreeSet<String>) -> String {
    if imports.is_empty() {
      return String::new();
    }
    let lines = imports
      .iter()
      .map(|class| format!("use {}\\{class};\n", self.namespace))
      .join("");
    format!("\n{lines}")
  }
}

struct TypeResolver<'a> {
  class_name: &'a str,
  classes_by_id: &'a HashMap<PropertyId, &'a str>,
}

impl TypeResolver<'_> {
  /// PHP declaration type plus the `@var` element type for arrays.
  fn resolve(
    &self,
    prop_name: &str,
    property: &Property,
    imports: &mut BTreeSet<String>,
  ) -> Result<(String, Option<String>), RenderError> {
    match property {
      Property::Array(array) => {
        let element = self.element_type(prop_name, &array.items, imports)?;
        Ok(("array".to_string(), Some(format!("{element}[]"))))
      }
      other => Ok((self.element_type(prop_name, other, imports)?, None)),
    }
  }

  fn element_type(
    &self,
    prop_name: &str,
    property: &Property,
    imports: &mut BTreeSet<String>,
  ) -> Result<String, RenderError> {
    let php_type = match property {
      Property::String(_) => "string".to_string(),
      Property::Integer(_) => "int".to_string(),
      Property::Number(_) => "float".to_string(),
      Property::Boolean(_) => "bool".to_string(),
      Property::Array(array) => format!("{}[]", self.element_type(prop_name, &array.items, imports)?),
      Property::Reference(ReferenceNode { target: None }) => "mixed".to_string(),
      Property::Reference(ReferenceNode { target: Some(id) }) => {
        let class = self
          .classes_by_id
          .get(id)
          .ok_or_else(|| RenderError::UnresolvedReference {
            class_name: self.class_name.to_string(),
            property: prop_name.to_string(),
            id: *id,
          })?;
        imports.insert((*class).to_string());
        (*class).to_string()
      }
      Property::Object(_) => {
        return Err(RenderError::NestedObject {
          class_name: self.class_name.to_string(),
          property: prop_name.to_string(),
        });
      }
    };
    Ok(php_type)
  }
}

/// Entry name to PHP class name, unique across the table.
fn class_names(table: &SchemaTable) -> HashMap<&str, String> {
  let mut used = BTreeSet::new();
  table
    .keys()
    .map(|entry| {
      let class = ensure_unique(&type_name(entry), &used);
      used.insert(class.clone());
      (entry.as_str(), class)
    })
    .collect()
}

/// `first-name` → `first_name`, `2fa` → `_2fa`.
pub(crate) fn php_property_name(raw: &str) -> String {
  let mut name: String = raw
    .chars()
    .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
    .collect();
  if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
    name.insert(0, '_');
  }
  name
}

fn doc_comment_lines(text: &str) -> Vec<String> {
  text
    .trim()
    .lines()
    .map(|line| line.trim_end().replace("*/", "*\\/"))
    .collect()
}

fn docblock(lines: &[String], indent: &str) -> String {
  let mut out = format!("{indent}/**\n");
  for line in lines {
    if line.is_empty() {
      out.push_str(&format!("{indent} *\n"));
    } else {
      out.push_str(&format!("{indent} * {line}\n"));
    }
  }
  out.push_str(&format!("{indent} */\n"));
  out
}
