use super::*;
use serde_json::json;

fn tree(value: Value) -> StateTree {
    StateTree::from_value(value).expect("object")
}

#[test]
fn from_value_rejects_non_objects() {
    assert!(StateTree::from_value(json!([1, 2])).is_none());
    assert!(StateTree::from_value(json!("x")).is_none());
    assert!(StateTree::from_value(Value::Null).is_none());
}

#[test]
fn overlay_replaces_conflicting_slices_whole() {
    let mut base = tree(json!({"auth": {"token": "t", "user": "bob"}, "info": 1}));
    base.overlay(&tree(json!({"auth": {"user": "alice"}})));
    assert_eq!(base.slice("auth"), Some(&json!({"user": "alice"})));
    assert_eq!(base.slice("info"), Some(&json!(1)));
}

#[test]
fn online_reads_only_boolean_flag() {
    assert_eq!(tree(json!({"online": true})).online(), Some(true));
    assert_eq!(tree(json!({"online": "yes"})).online(), None);
    assert_eq!(StateTree::new().online(), None);
}

#[test]
fn auth_user_ignores_null_user() {
    assert!(tree(json!({"auth": {"user": null}})).auth_user().is_none());
    assert!(tree(json!({"auth": {}})).auth_user().is_none());
    assert_eq!(tree(json!({"auth": {"user": {"name": "a"}}})).auth_user(), Some(&json!({"name": "a"})));
}

#[test]
fn serializes_transparently_as_object() {
    let t = tree(json!({"a": 1}));
    assert_eq!(serde_json::to_string(&t).expect("serialize"), r#"{"a":1}"#);
}

#[test]
fn from_json_accepts_only_objects() {
    assert_eq!(StateTree::from_json(r#"{"user":"alice"}"#), Some(tree(json!({"user": "alice"}))));
    assert!(StateTree::from_json("[1]").is_none());
    assert!(StateTree::from_json("null").is_none());
    assert!(StateTree::from_json("{not json").is_none());
}
