use std::{str::FromStr, sync::LazyLock};

use regex::{Captures, Regex};
use strum::{Display, EnumString};

use crate::generator::render::RenderError;

/// Readonly value class with promoted constructor properties.
pub const DEFAULT_TEMPLATE: &str = "<?php

declare(strict_types=1);

namespace {{namespace}};
{{imports}}
{{description}}readonly class {{className}}
{
    public function __construct(
{{properties}}    ) {}
}
";

static PLACEHOLDER_RE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "camelCase")]
pub enum Placeholder {
  Namespace,
  Imports,
  ClassName,
  Description,
  Properties,
}

/// Pre-rendered text for every placeholder of one class.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateValues {
  pub namespace: String,
  pub imports: String,
  pub class_name: String,
  pub description: String,
  pub properties: String,
}

impl TemplateValues {
  fn get(&self, placeholder: Placeholder) -> &str {
    match placeholder {
      Placeholder::Namespace => &self.namespace,
      Placeholder::Imports => &self.imports,
      Placeholder::ClassName => &self.class_name,
      Placeholder::Description => &self.description,
      Placeholder::Properties => &self.properties,
    }
  }
}

/// A class template whose placeholders have all been checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
  source: String,
}

impl Template {
  pub fn parse(source: impl Into<String>) -> Result<Self, RenderError> {
    let source = source.into();
    if let Some(unknown) = PLACEHOLDER_RE
      .captures_iter(&source)
      .map(|caps| caps[1].to_string())
      .find(|name| Placeholder::from_str(name).is_err())
    {
      return Err(RenderError::UnknownPlaceholder { name: unknown });
    }
    Ok(Self { source })
  }

  pub fn render(&self, values: &TemplateValues) -> String {
    PLACEHOLDER_RE
      .replace_all(&self.source, |caps: &Captures<'_>| {
        Placeholder::from_str(&caps[1]).map_or_else(|_| caps[0].to_string(), |placeholder| values.get(placeholder).to_string())
      })
      .into_owned()
  }
}

impl Default for Template {
  fn default() -> Self {
    Self {
      source: DEFAULT_TEMPLATE.to_string(),
    }
  }
}
