use std::fmt;

use thiserror::Error;

use crate::property::{PropertyId, PropertyKind};

pub type Result<T> = std::result::Result<T, FlattenError>;

/// Dotted location of a node inside a schema table, e.g. `Team.members.items.name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PropertyPath {
  segments: Vec<String>,
}

impl PropertyPath {
  #[must_use]
  pub fn root(name: impl Into<String>) -> Self {
    Self {
      segments: vec![name.into()],
    }
  }

  #[must_use]
  pub fn child(&self, segment: impl Into<String>) -> Self {
    let mut segments = self.segments.clone();
    segments.push(segment.into());
    Self { segments }
  }

  #[must_use]
  pub fn items(&self) -> Self {
    self.child("items")
  }

  #[must_use]
  pub fn segments(&self) -> &[String] {
    &self.segments
  }
}

impl fmt::Display for PropertyPath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.segments.join("."))
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlattenError {
  #[error("roots '{first}' and '{second}' share object identity {id}")]
  DuplicateRootIdentity {
    id: PropertyId,
    first: String,
    second: String,
  },
  #[error("reference at '{path}' points to identity {id}, which is not in the flattened table")]
  DanglingReference { path: PropertyPath, id: PropertyId },
  #[error("object at '{path}' has no identity")]
  MissingIdentity { path: PropertyPath },
  #[error("object at '{path}' has invalid identity {value}; identities must be positive integers")]
  InvalidIdentity { path: PropertyPath, value: u64 },
  #[error("array at '{path}' has no element type")]
  MissingArrayItems { path: PropertyPath },
  #[error("unsupported schema kind '{kind}' at '{path}'")]
  UnsupportedKind { path: PropertyPath, kind: String },
  #[error("unsupported format '{format}' for {kind} at '{path}'")]
  UnsupportedFormat {
    path: PropertyPath,
    kind: PropertyKind,
    format: String,
  },
  #[error("root '{path}' must be an object, found {kind}")]
  RootNotObject { path: PropertyPath, kind: PropertyKind },
}

impl FlattenError {
  /// Location of the offending node, when the error is tied to one.
  #[must_use]
  pub fn path(&self) -> Option<&PropertyPath> {
    match self {
      Self::DuplicateRootIdentity { .. } => None,
      Self::DanglingReference { path, .. }
      | Self::MissingIdentity { path }
      | Self::InvalidIdentity { path, .. }
      | Self::MissingArrayItems { path }
      | Self::UnsupportedKind { path, .. }
      | Self::UnsupportedFormat { path, .. }
      | Self::RootNotObject { path, .. } => Some(path),
    }
  }
}
