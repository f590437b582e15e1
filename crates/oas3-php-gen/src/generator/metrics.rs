use oas3_flatten::{BackReference, Flattened};
use strum::Display;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenerationStats {
  pub roots_parsed: usize,
  pub types_extracted: usize,
  pub types_rendered: usize,
  pub back_references: Vec<BackReference>,
  pub warnings: Vec<GenerationWarning>,
}

impl GenerationStats {
  pub fn record_roots(&mut self, count: usize) {
    self.roots_parsed += count;
  }

  pub fn record_flattened(&mut self, flattened: &Flattened) {
    self.types_extracted += flattened.extracted.len();
    self.back_references.extend(flattened.back_references.iter().cloned());
  }

  pub fn record_rendered(&mut self, count: usize) {
    self.types_rendered += count;
  }

  pub fn record_warnings(&mut self, warnings: impl IntoIterator<Item = GenerationWarning>) {
    self.warnings.extend(warnings);
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum GenerationWarning {
  #[strum(to_string = "Skipped schema '{schema_name}': {error}")]
  SchemaSkipped { schema_name: String, error: String },
  #[strum(to_string = "Skipped {role} body of '{method} {path}': {error}")]
  BodySkipped {
    role: String,
    method: String,
    path: String,
    error: String,
  },
  #[strum(to_string = "Renamed '{original}' to '{renamed}' to keep class names unique")]
  ClassRenamed { original: String, renamed: String },
}

impl GenerationWarning {
  pub fn is_skipped_item(&self) -> bool {
    matches!(self, Self::SchemaSkipped { .. } | Self::BodySkipped { .. })
  }
}
