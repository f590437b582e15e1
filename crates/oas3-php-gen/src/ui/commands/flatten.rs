use anyhow::Context;
use crossterm::style::Stylize;
use oas3_flatten::{
  flatten,
  raw::{RawTable, decode_table, encode_table},
};

use super::format_timestamp;
use crate::ui::{Colors, FlattenCommand};

/// Decodes a raw property tree, flattens it and encodes the result in the same shape.
pub(crate) fn flatten_json(input: &[u8]) -> anyhow::Result<String> {
  let deserializer = &mut serde_json::Deserializer::from_slice(input);
  let raw: RawTable = serde_path_to_error::deserialize(deserializer)
    .map_err(|err| anyhow::anyhow!("Invalid property tree at '{}': {}", err.path(), err.inner()))?;

  let decoded = decode_table(raw)?;
  let flat = flatten(decoded.roots)?;
  let encoded = encode_table(&flat, &decoded.aliases);

  Ok(serde_json::to_string_pretty(&encoded)?)
}

pub async fn flatten_tree(command: FlattenCommand, colors: &Colors) -> anyhow::Result<()> {
  let FlattenCommand { input, output } = command;

  let content = tokio::fs::read(&input)
    .await
    .with_context(|| format!("Failed to read {}", input.display()))?;
  let json = flatten_json(&content)?;

  let Some(output) = output else {
    println!("{json}");
    return Ok(());
  };

  if let Some(parent) = output.parent() {
    tokio::fs::create_dir_all(parent).await?;
  }
  tokio::fs::write(&output, format!("{json}\n")).await?;
  println!(
    "{} {}",
    format_timestamp().with(colors.timestamp()),
    format!("Wrote flattened table to: {}", output.display()).with(colors.success())
  );
  Ok(())
}

#[cfg(test)]
mod tests {
  use serde_json::{Value, json};

  use super::*;

  #[test]
  fn test_flatten_json_lifts_nested_objects() -> anyhow::Result<()> {
    let input = json!({
      "Team": {
        "type": "object",
        "propertyID": 1,
        "properties": {
          "members": {
            "type": "array",
            "items": {
              "type": "object",
              "propertyID": 2,
              "properties": { "name": { "type": "string" } }
            }
          }
        }
      }
    });

    let output: Value = serde_json::from_str(&flatten_json(&serde_json::to_vec(&input)?)?)?;

    assert_eq!(
      output["Team"]["properties"]["members"],
      json!({ "type": "array", "items": { "type": "reference", "refID": 2 } })
    );
    assert_eq!(output["TeamMember"]["propertyID"], json!(2));
    Ok(())
  }

  #[test]
  fn test_flatten_json_reports_json_path_of_type_errors() {
    let input = br#"{ "Team": { "type": "object", "propertyID": "one" } }"#;

    let err = flatten_json(input).unwrap_err();

    assert!(err.to_string().contains("Team.propertyID"), "unexpected error: {err}");
  }

  #[test]
  fn test_flatten_json_reports_property_path_of_malformed_nodes() {
    let input = br#"{ "Team": { "type": "object", "propertyID": 1, "properties": { "tags": { "type": "array" } } } }"#;

    let err = flatten_json(input).unwrap_err();

    assert_eq!(err.to_string(), "array at 'Team.tags' has no element type");
  }

  #[tokio::test]
  async fn test_flatten_tree_writes_output_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let input = dir.path().join("tree.json");
    let output = dir.path().join("nested/flat.json");
    tokio::fs::write(
      &input,
      r#"{ "User": { "type": "object", "propertyID": 1, "properties": {
        "address": { "type": "object", "propertyID": 2, "properties": {} } } } }"#,
    )
    .await?;

    let command = FlattenCommand {
      input,
      output: Some(output.clone()),
    };
    flatten_tree(command, &Colors::new(false, crate::ui::colors::Theme::Dark)).await?;

    let written: serde_json::Value = serde_json::from_str(&tokio::fs::read_to_string(&output).await?)?;
    let names: Vec<&String> = written.as_object().expect("flat table is an object").keys().collect();
    assert_eq!(names, ["User", "UserAddress"]);
    Ok(())
  }
}
