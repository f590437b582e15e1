use oas3_flatten::{IntegerProperty, Property, ReferenceNode};

use super::support::{id, object, renderer, table};
use crate::generator::{
  render::{PhpRenderer, RenderError, php_property_name},
  template::Template,
};

#[test]
fn test_render_full_class() {
  let tag = object(1)
    .with_description("A label attached to a post.")
    .with_property(
      "id",
      Property::Integer(IntegerProperty {
        format: None,
        description: Some("Identifier.".to_string()),
      }),
    )
    .with_property("name", Property::string());

  let files = renderer("App\\Models").render(&table(vec![("Tag", tag)])).unwrap();

  assert_eq!(files.len(), 1);
  assert_eq!(files[0].file_name, "Tag.php");
  assert_eq!(
    files[0].contents,
    r"<?php

declare(strict_types=1);

namespace App\Models;

/**
 * A label attached to a post.
 */
readonly class Tag
{
    public function __construct(
        /**
         * Identifier.
         */
        public int $id,
        public string $name
    ) {}
}
"
  );
}

#[test]
fn test_render_imports_referenced_classes() {
  let user = object(1)
    .with_property("address", Property::reference(id(2)))
    .with_property("tags", Property::array_of(Property::reference(id(3))))
    .with_property("manager", Property::reference(id(1)));
  let files = renderer("App")
    .render(&table(vec![
      ("User", user),
      ("UserAddress", object(2).with_property("city", Property::string())),
      ("UserTag", object(3).with_property("label", Property::string())),
    ]))
    .unwrap();

  let user = &files[0].contents;
  assert!(user.contains("namespace App;\n\nuse App\\UserAddress;\nuse App\\UserTag;\n\nreadonly class User\n"));
  assert!(!user.contains("use App\\User;"));
  assert!(user.contains("        public UserAddress $address,\n"));
  assert!(user.contains("        /**\n         * @var UserTag[]\n         */\n        public array $tags,\n"));
  assert!(user.contains("        public User $manager\n"));
}

#[test]
fn test_render_array_types() {
  let matrix = object(1)
    .with_property("rows", Property::array_of(Property::array_of(Property::number())))
    .with_property("flags", Property::array_of(Property::boolean()))
    .with_property("any", Property::Reference(ReferenceNode::alias()));
  let files = renderer("App").render(&table(vec![("Matrix", matrix)])).unwrap();

  let contents = &files[0].contents;
  assert!(contents.contains("* @var float[][]\n         */\n        public array $rows,\n"));
  assert!(contents.contains("* @var bool[]\n         */\n        public array $flags,\n"));
  assert!(contents.contains("        public mixed $any\n"));
}

#[test]
fn test_render_description_and_element_type_share_docblock() {
  let mut tags = oas3_flatten::ArrayProperty::of(Property::string());
  tags.description = Some("Free-form labels.".to_string());
  let post = object(1).with_property("tags", Property::Array(tags));
  let files = renderer("App").render(&table(vec![("Post", post)])).unwrap();

  assert!(files[0].contents.contains(
    "        /**\n         * Free-form labels.\n         *\n         * @var string[]\n         */\n        public array $tags\n"
  ));
}

#[test]
fn test_render_unresolved_reference() {
  let user = object(1).with_property("address", Property::reference(id(9)));
  let err = renderer("App").render(&table(vec![("User", user)])).unwrap_err();

  assert_eq!(
    err,
    RenderError::UnresolvedReference {
      class_name: "User".to_string(),
      property: "address".to_string(),
      id: id(9),
    }
  );
}

#[test]
fn test_render_rejects_nested_object() {
  let user = object(1).with_property("address", Property::Object(object(2)));
  let err = renderer("App").render(&table(vec![("User", user)])).unwrap_err();

  assert!(matches!(err, RenderError::NestedObject { ref property, .. } if property == "address"));
}

#[test]
fn test_render_makes_class_names_unique() {
  let files = renderer("App")
    .render(&table(vec![
      ("user-profile", object(1).with_property("bio", Property::string())),
      ("UserProfile", object(2).with_property("owner", Property::reference(id(1)))),
    ]))
    .unwrap();

  let names: Vec<_> = files.iter().map(|file| file.class_name.as_str()).collect();
  assert_eq!(names, ["UserProfile", "UserProfile2"]);
  assert_eq!(files[1].entry_name, "UserProfile");
  assert_eq!(files[1].file_name, "UserProfile2.php");
  assert!(files[1].contents.contains("public UserProfile $owner\n"));
}

#[test]
fn test_render_sanitizes_property_names() {
  let entry = object(1)
    .with_property("first-name", Property::string())
    .with_property("first_name", Property::string());
  let files = renderer("App").render(&table(vec![("Person", entry)])).unwrap();

  assert!(files[0].contents.contains("public string $first_name,\n"));
  assert!(files[0].contents.contains("public string $first_name2\n"));
}

#[test]
fn test_php_property_name() {
  let cases = [
    ("name", "name"),
    ("first-name", "first_name"),
    ("2fa", "_2fa"),
    ("", "_"),
    ("x.y", "x_y"),
  ];
  for (raw, expected) in cases {
    assert_eq!(php_property_name(raw), expected, "{raw:?}");
  }
}

#[test]
fn test_renderer_rejects_invalid_namespace() {
  for namespace in ["", "App\\", "1App", "App\\\\Models", "App-Models"] {
    let err = PhpRenderer::new(namespace, Template::default()).unwrap_err();
    assert_eq!(err, RenderError::InvalidNamespace(namespace.to_string()));
  }
}
