//! JSON codec for patch documents.
//!
//! The document shape is RFC 6902: `[{"op", "path", "value"?, "from"?}]`.
//! `path` and `from` are written as JSON Pointers when the path has one and
//! as JSONPath text otherwise; decoding accepts either. Unknown operation
//! names decode fine and are resolved when the patch is applied.

use jsonkit_json_path::JsonPath;
use jsonkit_node::{JsonError, JsonValue, Result};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::json_patch::types::{op_names, JsonPatch, PatchOp};

// ── Path helpers ──────────────────────────────────────────────────────────

fn encode_path(path: &JsonPath) -> Value {
    Value::String(path.to_pointer().unwrap_or_else(|_| path.to_string()))
}

fn decode_path(v: &Value, field: &str) -> Result<JsonPath> {
    let text = v
        .as_str()
        .ok_or_else(|| JsonError::invalid_argument(format!("'{field}' must be a string")))?;
    JsonPath::compile(text)
}

/// Members the standard operations cannot do without.
fn required_fields(op: &str) -> (bool, bool) {
    match op {
        op_names::ADD | op_names::REPLACE | op_names::TEST | op_names::ENSURE_PUT => (true, false),
        op_names::COPY | op_names::MOVE => (false, true),
        _ => (false, false),
    }
}

// ── Serialization ─────────────────────────────────────────────────────────

/// Serialize a [`PatchOp`] to a `serde_json::Value`.
pub fn to_json(op: &PatchOp) -> Value {
    let mut m = Map::new();
    m.insert("op".into(), Value::String(op.op.clone()));
    m.insert("path".into(), encode_path(&op.path));
    if let Some(value) = &op.value {
        m.insert("value".into(), Value::from(value));
    }
    if let Some(from) = &op.from {
        m.insert("from".into(), encode_path(from));
    }
    Value::Object(m)
}

pub fn to_json_patch(patch: &JsonPatch) -> Value {
    Value::Array(patch.iter().map(to_json).collect())
}

// ── Deserialization ───────────────────────────────────────────────────────

/// Deserialize one operation object.
pub fn from_json(v: &Value) -> Result<PatchOp> {
    let obj = v
        .as_object()
        .ok_or_else(|| JsonError::invalid_argument("operation must be an object"))?;
    let name = obj
        .get("op")
        .and_then(Value::as_str)
        .ok_or_else(|| JsonError::invalid_argument("missing 'op' field"))?;
    let path = obj
        .get("path")
        .ok_or_else(|| JsonError::invalid_argument(format!("'{name}' requires 'path'")))
        .and_then(|p| decode_path(p, "path"))?;

    let mut op = PatchOp::new(name, path);
    op.value = obj.get("value").map(JsonValue::from);
    op.from = obj.get("from").map(|f| decode_path(f, "from")).transpose()?;

    let (needs_value, needs_from) = required_fields(name);
    if needs_value {
        op.require_value()?;
    }
    if needs_from {
        op.require_from()?;
    }
    Ok(op)
}

pub fn from_json_patch(v: &Value) -> Result<JsonPatch> {
    let arr = v
        .as_array()
        .ok_or_else(|| JsonError::invalid_argument("patch must be an array"))?;
    arr.iter()
        .enumerate()
        .map(|(index, op)| from_json(op).map_err(|err| err.within(index)))
        .collect()
}

// ── JsonValue and serde integration ───────────────────────────────────────

impl JsonPatch {
    pub fn from_value(value: &JsonValue) -> Result<Self> {
        from_json_patch(&Value::from(value))
    }

    pub fn to_value(&self) -> JsonValue {
        JsonValue::from(to_json_patch(self))
    }
}

impl Serialize for PatchOp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        to_json(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PatchOp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        from_json(&raw).map_err(D::Error::custom)
    }
}

impl Serialize for JsonPatch {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for JsonPatch {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Vec::<PatchOp>::deserialize(deserializer).map(JsonPatch::from)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use jsonkit_node::ErrorKind;
    use serde_json::json;

    #[test]
    fn decode_rfc6902_patch() {
        let doc = json!([
            {"op": "test", "path": "/a/b/c", "value": "foo"},
            {"op": "remove", "path": "/a/b/c"},
            {"op": "add", "path": "/a/b/c", "value": ["foo", "bar"]},
            {"op": "replace", "path": "/a/b/c", "value": 42},
            {"op": "move", "from": "/a/b/c", "path": "/a/b/d"},
            {"op": "copy", "from": "/a/b/d", "path": "/a/b/e"}
        ]);
        let patch = from_json_patch(&doc).unwrap();
        assert_eq!(patch.len(), 6);
        assert_eq!(patch.ops()[4].from, Some(JsonPath::compile("/a/b/c").unwrap()));
        assert_eq!(to_json_patch(&patch), doc);
    }

    #[test]
    fn null_value_is_kept() {
        let op = from_json(&json!({"op": "add", "path": "/a", "value": null})).unwrap();
        assert_eq!(op.value, Some(JsonValue::Null));
    }

    #[test]
    fn json_path_targets_round_trip() {
        let raw = json!({"op": "ensurePut", "path": "$.a['b c']", "value": 1});
        let op = from_json(&raw).unwrap();
        assert_eq!(to_json(&op), json!({"op": "ensurePut", "path": "/a/b c", "value": 1}));
    }

    #[test]
    fn unknown_ops_decode() {
        let op = from_json(&json!({"op": "custom", "path": ""})).unwrap();
        assert_eq!(op.op, "custom");
        assert!(op.path.is_root());
    }

    #[test]
    fn missing_members_are_rejected() {
        for raw in [
            json!({"path": "/a"}),
            json!({"op": "add", "value": 1}),
            json!({"op": "add", "path": "/a"}),
            json!({"op": "move", "path": "/a"}),
            json!({"op": "add", "path": 3, "value": 1}),
            json!("add"),
        ] {
            let err = from_json(&raw).unwrap_err();
            assert!(matches!(err.kind(), ErrorKind::InvalidArgument(_)), "{raw}");
        }
        let err = from_json(&json!({"op": "add", "path": "a", "value": 1})).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Malformed { .. }));
    }

    #[test]
    fn failing_entry_is_located() {
        let err = from_json_patch(&json!([{"op": "remove", "path": "/a"}, {"op": "copy", "path": "/b"}]))
            .unwrap_err();
        assert_eq!(err.path(), "$[1]");
    }

    #[test]
    fn serde_round_trip() {
        let text = r#"[{"op":"add","path":"/x/-","value":{"k":true}},{"op":"remove","path":"/y"}]"#;
        let patch: JsonPatch = serde_json::from_str(text).unwrap();
        assert_eq!(patch.len(), 2);
        assert_eq!(serde_json::to_string(&patch).unwrap(), text);
        assert_eq!(JsonPatch::from_value(&patch.to_value()).unwrap(), patch);
    }
}
