use jsonkit::json_merge::{merge_patch_diff, merge_rfc7386};
use jsonkit::json_patch::{apply_patch, from_json_patch, to_json_patch};
use jsonkit::json_patch_diff::diff;
use jsonkit::JsonValue;
use proptest::prelude::*;
use serde_json::Value;

fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        (-50i64..50).prop_map(Value::from),
        "[a-z]{0,3}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-c0-2~/-]{1,2}", inner, 0..4)
                .prop_map(|members| Value::Object(members.into_iter().collect())),
        ]
    })
}

/// Values whose object members are never null, which RFC 7386 patches
/// cannot carry.
fn null_free(value: &Value) -> bool {
    match value {
        Value::Array(items) => items.iter().all(null_free),
        Value::Object(members) => members.values().all(|v| !v.is_null() && null_free(v)),
        _ => true,
    }
}

proptest! {
    #[test]
    fn applying_a_diff_reproduces_the_target(src in json_value(), dst in json_value()) {
        let patch = diff(&src, &dst);
        let mut doc = src.clone();
        apply_patch(&mut doc, &patch).unwrap();
        prop_assert_eq!(doc, dst);
    }

    #[test]
    fn diffs_survive_the_wire(src in json_value(), dst in json_value()) {
        let wire = to_json_patch(&diff(&src, &dst));
        let decoded = from_json_patch(&wire).unwrap();
        let mut doc = JsonValue::from(src);
        apply_patch(&mut doc, &decoded).unwrap();
        prop_assert_eq!(doc, JsonValue::from(dst));
    }

    #[test]
    fn diff_of_equal_documents_is_empty(doc in json_value()) {
        prop_assert!(diff(&doc, &JsonValue::from(doc.clone())).is_empty());
    }

    #[test]
    fn merge_patch_is_idempotent(target in json_value(), patch in json_value()) {
        let mut once = target.clone();
        merge_rfc7386(&mut once, &patch).unwrap();
        let mut twice = once.clone();
        merge_rfc7386(&mut twice, &patch).unwrap();
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn merge_patch_diff_reproduces_the_target(src in json_value(), dst in json_value()) {
        prop_assume!(null_free(&dst));
        let patch = Value::from(&merge_patch_diff(&src, &dst));
        let mut doc = src.clone();
        merge_rfc7386(&mut doc, &patch).unwrap();
        prop_assert_eq!(doc, dst);
    }
}
