use oas3::spec::Ref;

/// Name of the component a local `#/components/...` reference points at.
///
/// External documents and malformed pointers yield `None`.
pub fn parse_schema_ref_path(ref_path: &str) -> Option<String> {
  if !ref_path.starts_with("#/components") {
    return None;
  }

  match ref_path.parse::<Ref>() {
    Ok(component) => Some(component.name),
    Err(_) => None,
  }
}
