//! Type names for extracted schemas.
//!
//! A nested object is named after its parent and the property that held it
//! (`User.address` → `UserAddress`). Array elements take the singular form of
//! the property (`Team.members` → `TeamMember`), falling back to an `Item`
//! suffix whenever the singular would be ambiguous.

use std::{collections::BTreeSet, sync::LazyLock};

use any_ascii::any_ascii;
use inflections::Inflect;
use regex::Regex;

pub const ARRAY_ITEM_SUFFIX: &str = "Item";
const UNNAMED: &str = "Unnamed";

static INVALID_CHARS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+").unwrap());

/// Transliterates to ASCII and collapses every run of non-alphanumeric characters into one space.
#[must_use]
pub fn sanitize(input: &str) -> String {
  let ascii = any_ascii(input);
  INVALID_CHARS_RE.replace_all(&ascii, " ").trim().to_string()
}

/// Converts arbitrary text into a `PascalCase` type name.
///
/// Input that is already mixed case without separators keeps its capitalization
/// (`userProfile` → `UserProfile`, `HTTPHeaders` → `HTTPHeaders`). A leading digit
/// gets a `T` prefix and empty input becomes `Unnamed`.
#[must_use]
pub fn type_name(raw: &str) -> String {
  let has_separators = raw.contains(|c: char| !c.is_ascii_alphanumeric());
  let has_upper = raw.chars().any(|c| c.is_ascii_uppercase());
  let has_lower = raw.chars().any(|c| c.is_ascii_lowercase());

  let mut name = if !has_separators && has_upper && has_lower {
    let mut chars = raw.chars();
    match chars.next() {
      Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
      None => String::new(),
    }
  } else {
    sanitize(raw)
      .split(' ')
      .filter(|word| !word.is_empty())
      .map(|word| word.to_lowercase().to_pascal_case())
      .collect()
  };

  if name.is_empty() {
    return UNNAMED.to_string();
  }

  if name.starts_with(|c: char| c.is_ascii_digit()) {
    name.insert(0, 'T');
  }

  name
}

/// Name for an object found directly under `parent.property`.
#[must_use]
pub fn nested_object_name(parent: &str, property: &str) -> String {
  format!("{parent}{}", type_name(property))
}

/// Name for the element object of the array held by `parent.property`.
///
/// Uses the singular of the property name unless singularizing is a no-op or
/// the parent already has a property spelled like the singular; both cases
/// would collide with a scalar sibling, so `Item` is appended instead.
#[must_use]
pub fn array_item_name<'a>(parent: &str, property: &str, mut siblings: impl Iterator<Item = &'a str>) -> String {
  let singular = cruet::to_singular(property);
  let base = nested_object_name(parent, &singular);

  if singular == property || siblings.any(|sibling| sibling == singular) {
    format!("{base}{ARRAY_ITEM_SUFFIX}")
  } else {
    base
  }
}

/// Returns `base` if unused, otherwise `base2`, `base3`, ... whichever is free first.
#[must_use]
pub fn ensure_unique(base: &str, used: &BTreeSet<String>) -> String {
  if !used.contains(base) {
    return base.to_string();
  }
  (2..)
    .map(|i| format!("{base}{i}"))
    .find(|candidate| !used.contains(candidate))
    .unwrap_or_else(|| base.to_string())
}
