use std::{ffi::OsStr, path::Path};

use fmmap::tokio::{AsyncMmapFile, AsyncMmapFileExt};
use serde_json::Value;

const SUPPORTED_VERSION_PREFIX: &str = "3.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpecFormat {
  #[default]
  Json,
  Yaml,
}

impl SpecFormat {
  #[must_use]
  pub fn from_extension(ext: &str) -> Self {
    match ext {
      "yaml" | "yml" => Self::Yaml,
      _ => Self::Json,
    }
  }
}

/// A parsed OpenAPI document together with its raw JSON tree.
///
/// `oas3` keeps schema properties in a sorted map; the raw tree still has them
/// in declaration order.
#[derive(Debug, Clone)]
pub struct OpenApiDocument {
  pub spec: oas3::Spec,
  pub raw: Value,
}

impl OpenApiDocument {
  /// Rejects anything that is not OpenAPI 3.0.x.
  pub fn from_value(raw: Value) -> anyhow::Result<Self> {
    let spec: oas3::Spec = serde_json::from_value(raw.clone())?;
    ensure_supported_version(&spec)?;
    Ok(Self { spec, raw })
  }
}

pub struct SpecLoader {
  file: AsyncMmapFile,
  format: SpecFormat,
}

impl SpecLoader {
  pub async fn open(path: &Path) -> anyhow::Result<Self> {
    let format = path
      .extension()
      .and_then(OsStr::to_str)
      .map_or(SpecFormat::default(), SpecFormat::from_extension);

    let file = AsyncMmapFile::open(path).await?;

    Ok(Self { file, format })
  }

  pub fn parse(&self) -> anyhow::Result<OpenApiDocument> {
    let raw: Value = match self.format {
      SpecFormat::Json => serde_json::from_slice(self.file.as_slice())?,
      SpecFormat::Yaml => {
        let content = std::str::from_utf8(self.file.as_slice())?;
        serde_yaml::from_str(content)?
      }
    };
    OpenApiDocument::from_value(raw)
  }
}

pub fn ensure_supported_version(spec: &oas3::Spec) -> anyhow::Result<()> {
  if !spec.openapi.starts_with(SUPPORTED_VERSION_PREFIX) {
    anyhow::bail!("Only OpenAPI 3.0.x is supported, provided version: {}", spec.openapi);
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn test_yaml_document_keeps_declaration_order() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("openapi.yml");
    tokio::fs::write(
      &path,
      "openapi: 3.0.1\ninfo:\n  title: Order\n  version: '1'\npaths: {}\ncomponents:\n  schemas:\n    Person:\n      type: object\n      properties:\n        zip:\n          type: string\n        age:\n          type: integer\n        mail:\n          type: string\n",
    )
    .await?;

    let document = SpecLoader::open(&path).await?.parse()?;

    let declared: Vec<&String> = document.raw["components"]["schemas"]["Person"]["properties"]
      .as_object()
      .unwrap()
      .keys()
      .collect();
    assert_eq!(declared, ["zip", "age", "mail"]);
    assert_eq!(document.spec.info.title, "Order");
    Ok(())
  }

  #[test]
  fn test_from_value_rejects_other_versions() {
    let err = OpenApiDocument::from_value(serde_json::json!({
      "openapi": "2.0.0",
      "info": { "title": "Old", "version": "1" },
      "paths": {}
    }))
    .unwrap_err();
    assert_eq!(err.to_string(), "Only OpenAPI 3.0.x is supported, provided version: 2.0.0");
  }
}
