use super::*;
use serde_json::json;

#[test]
fn empty_object_and_array() {
    assert_eq!(canonicalize(&json!({})), "{}");
    assert_eq!(canonicalize(&json!([])), "[]");
}

#[test]
fn keys_sort_regardless_of_input_order() {
    let a = json!({"a": 1, "b": 2});
    let b = json!({"b": 2, "a": 1});
    assert_eq!(canonicalize(&a), canonicalize(&b));
    assert_eq!(canonicalize(&a), r#"{"a":1,"b":2}"#);
}

#[test]
fn nested_objects_are_sorted_too() {
    let value = json!({"z": {"b": 1, "a": 2}, "a": 1});
    assert_eq!(canonicalize(&value), r#"{"a":1,"z":{"a":2,"b":1}}"#);
}

#[test]
fn array_order_is_preserved() {
    let value = json!({"b": [3, 2], "a": 1, "type": "x"});
    assert_eq!(canonicalize(&value), r#"{"a":1,"b":[3,2],"type":"x"}"#);
}

#[test]
fn unicode_key_round_trips() {
    let value = json!({"é": "accent"});
    let canon = canonicalize(&value);
    assert_eq!(canon, "{\"é\":\"accent\"}");
}

#[test]
fn null_value_is_emitted() {
    assert_eq!(canonicalize(&json!({"a": null})), r#"{"a":null}"#);
}

#[test]
fn parse_then_canonicalize_is_idempotent() {
    let value = json!({"type": "x", "a": 1, "b": [3, 2]});
    let canon = canonicalize(&value);
    let reparsed: Value = serde_json::from_str(&canon).unwrap();
    assert_eq!(canonicalize(&reparsed), canon);
}

#[test]
fn signature_removal_is_idempotent_when_absent() {
    let value = json!({"type": "ping"});
    assert_eq!(without_signature(&value), value);
}

#[test]
fn signature_key_is_stripped() {
    let value = json!({"type": "x", "signature": "abc"});
    let stripped = without_signature(&value);
    assert_eq!(stripped, json!({"type": "x"}));
}
