mod common;

use common::user_schema;
use fieldwise::{create_builder_with_template, record, BuildError, Record, Template, Value};
use serde::Serialize;

#[derive(Serialize)]
struct UserDefaults {
    id: u64,
    age: Option<u32>,
}

#[test]
fn serialized_struct_prefills_non_null_fields() {
    let template = Template::from_serialize(&UserDefaults { id: 5, age: None }).unwrap();
    let b = create_builder_with_template(user_schema(), template).unwrap();
    assert_eq!(b.initialized(), vec!["id"]);
    assert_eq!(
        b.set("email", "x").unwrap().build().unwrap(),
        record! { "email" => "x", "id" => 5 }
    );
}

#[test]
fn template_from_record_and_pairs_agree() {
    let from_record = Template::from(record! { "id" => 5, "age" => 1 });
    let from_pairs: Template = [("id", 5), ("age", 1)].into_iter().collect();
    assert_eq!(from_record, from_pairs);
    assert_eq!(from_pairs.len(), 2);
}

#[test]
fn mistyped_template_value_fails_creation() {
    let err = create_builder_with_template(user_schema(), Template::new().with("id", "five"))
        .unwrap_err();
    assert_eq!(
        err,
        BuildError::TypeMismatch {
            target: "User".into(),
            field: "id".into(),
            expected: "Integer".into(),
            actual: "String".into(),
        }
    );
}

#[test]
fn template_is_copied_into_each_builder() {
    let template = Template::new().with("id", 5);
    let a = create_builder_with_template(user_schema(), template.clone()).unwrap();
    let b = create_builder_with_template(user_schema(), template).unwrap();
    a.set("id", 6).unwrap();
    assert_eq!(b.snapshot().get("id"), Some(&Value::Integer(5)));
    assert!(!a.shares_store_with(&b));
}

#[test]
fn empty_template_behaves_like_plain_creation() {
    let b = create_builder_with_template(user_schema(), Template::new()).unwrap();
    assert_eq!(b.snapshot(), Record::new());
    assert_eq!(b.missing(), vec!["email", "id"]);
}
