//! JSON Patch application.

use jsonkit_json_path::{JsonPath, PathToken};
use jsonkit_node::{ErrorKind, JsonError, Node, Result};
use tracing::{debug, trace};

use super::registry::PatchOpRegistry;
use super::target::PatchTarget;
use super::types::{ApplyPatchOptions, JsonPatch, PatchOp};

// ── Public API ────────────────────────────────────────────────────────────

/// Apply a single operation, resolving its name through the registry.
pub fn apply_op<N: Node>(target: &mut N, op: &PatchOp) -> Result<()> {
    let handler = PatchOpRegistry::get(&op.op)
        .ok_or_else(|| JsonError::new(ErrorKind::UnknownOp(op.op.clone())))?;
    trace!(op = %op.op, path = %op.path, "applying patch operation");
    handler.apply(target, op)
}

/// Apply every operation in order. The first failure stops the patch and is
/// reported as `PatchOpFailed`; operations before it stay applied.
pub fn apply_patch<N: Node>(target: &mut N, patch: &JsonPatch) -> Result<()> {
    apply_patch_with(target, patch, &ApplyPatchOptions::default())
}

pub fn apply_patch_with<N: Node>(
    target: &mut N,
    patch: &JsonPatch,
    options: &ApplyPatchOptions,
) -> Result<()> {
    if !options.atomic {
        return apply_ops(target, patch);
    }
    let mut scratch = target.deep_copy();
    apply_ops(&mut scratch, patch)?;
    *target = scratch;
    Ok(())
}

fn apply_ops<N: Node>(target: &mut N, patch: &JsonPatch) -> Result<()> {
    for (index, op) in patch.iter().enumerate() {
        apply_op(target, op).map_err(|source| {
            debug!(index, op = %op.op, error = %source, "patch operation failed");
            JsonError::new(ErrorKind::PatchOpFailed {
                index,
                op: op.op.clone(),
                source: Box::new(source),
            })
        })?;
    }
    Ok(())
}

impl JsonPatch {
    /// Shorthand for [`apply_patch`].
    pub fn apply<N: Node>(&self, target: &mut N) -> Result<()> {
        apply_patch(target, self)
    }
}

// ── Individual operation applicators ──────────────────────────────────────

pub(crate) fn apply_test(target: &mut dyn PatchTarget, op: &PatchOp) -> Result<()> {
    let expected = op.require_value()?;
    if target.equals_at(&op.path, expected)? {
        return Ok(());
    }
    let actual = target.value_at(&op.path)?;
    Err(JsonError::new(ErrorKind::TestFailed {
        expected: expected.clone(),
        actual,
    }))
}

pub(crate) fn apply_add(target: &mut dyn PatchTarget, op: &PatchOp) -> Result<()> {
    target.add_at(&op.path, op.require_value()?.clone())
}

pub(crate) fn apply_remove(target: &mut dyn PatchTarget, op: &PatchOp) -> Result<()> {
    target.remove_at(&op.path).map(drop)
}

pub(crate) fn apply_replace(target: &mut dyn PatchTarget, op: &PatchOp) -> Result<()> {
    let value = op.require_value()?.clone();
    if !target.has_non_null_at(&op.path) {
        return Err(not_found(&op.path, "no value to replace"));
    }
    target.replace_at(&op.path, value).map(drop)
}

pub(crate) fn apply_copy(target: &mut dyn PatchTarget, op: &PatchOp) -> Result<()> {
    let from = op.require_from()?;
    let value = target.value_at(from)?;
    target.add_at(&op.path, value)
}

pub(crate) fn apply_move(target: &mut dyn PatchTarget, op: &PatchOp) -> Result<()> {
    let from = op.require_from()?;
    if op.path.is_descendant_of(from) {
        return Err(JsonError::invalid_argument(format!(
            "cannot move '{from}' into its own child '{}'",
            op.path
        )));
    }
    if op.path == *from {
        return target.value_at(from).map(drop);
    }
    let value = target
        .remove_at(from)?
        .ok_or_else(|| not_found(from, "nothing to move"))?;
    target.add_at(&op.path, value)
}

pub(crate) fn apply_exist(target: &mut dyn PatchTarget, op: &PatchOp) -> Result<()> {
    if target.contains_at(&op.path) {
        Ok(())
    } else {
        Err(not_found(&op.path, "no value"))
    }
}

pub(crate) fn apply_ensure_put(target: &mut dyn PatchTarget, op: &PatchOp) -> Result<()> {
    target.ensure_put_at(&op.path, op.require_value()?.clone())
}

/// `PathNotFound` carrying every step of `path` as its trail.
fn not_found(path: &JsonPath, what: &str) -> JsonError {
    path.tokens()
        .iter()
        .rev()
        .fold(JsonError::path_not_found(what), |err, token| match token {
            PathToken::Name(name) => err.within(name.as_str()),
            PathToken::Index(index) => err.within(*index),
            PathToken::Append => err.within("-"),
            _ => err,
        })
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use jsonkit_node::{FrozenNode, JsonValue};
    use serde_json::{json, Value};

    fn path(expr: &str) -> JsonPath {
        JsonPath::compile(expr).unwrap()
    }

    fn op(name: &str, at: &str) -> PatchOp {
        PatchOp::new(name, path(at))
    }

    fn cause(err: JsonError) -> ErrorKind {
        match err.into_kind() {
            ErrorKind::PatchOpFailed { source, .. } => source.into_kind(),
            other => other,
        }
    }

    #[test]
    fn add_to_object() {
        let mut doc = json!({"a": 1});
        apply_op(&mut doc, &op("add", "/b").with_value(2)).unwrap();
        assert_eq!(doc, json!({"a": 1, "b": 2}));
    }

    #[test]
    fn add_append_array() {
        let mut doc = json!([1, 2]);
        apply_op(&mut doc, &op("add", "/-").with_value(3)).unwrap();
        assert_eq!(doc, json!([1, 2, 3]));
    }

    #[test]
    fn add_inserts_and_replaces_root() {
        let mut doc = json!([1, 3]);
        apply_op(&mut doc, &op("add", "/1").with_value(2)).unwrap();
        assert_eq!(doc, json!([1, 2, 3]));
        apply_op(&mut doc, &op("add", "").with_value("x")).unwrap();
        assert_eq!(doc, json!("x"));
    }

    #[test]
    fn add_without_value_is_rejected() {
        let mut doc = json!({});
        let err = apply_op(&mut doc, &op("add", "/a")).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgument(_)));
    }

    #[test]
    fn remove_is_tolerant() {
        let mut doc = json!([1, 2]);
        apply_op(&mut doc, &op("remove", "/10")).unwrap();
        apply_op(&mut doc, &op("remove", "/x/y")).unwrap();
        assert_eq!(doc, json!([1, 2]));
        apply_op(&mut doc, &op("remove", "/0")).unwrap();
        assert_eq!(doc, json!([2]));
    }

    #[test]
    fn replace_requires_a_non_null_value() {
        let mut doc = json!({"a": 1, "n": null});
        apply_op(&mut doc, &op("replace", "/a").with_value(5)).unwrap();
        assert_eq!(doc["a"], json!(5));

        let err = apply_op(&mut doc, &op("replace", "/n").with_value(1)).unwrap_err();
        assert!(err.is_path_not_found());
        assert_eq!(err.path(), "$.n");
        let err = apply_op(&mut doc, &op("replace", "/missing").with_value(1)).unwrap_err();
        assert!(err.is_path_not_found());
    }

    #[test]
    fn copy_op() {
        let mut doc = json!({"a": {"b": [1]}});
        apply_op(&mut doc, &op("copy", "/c").with_from(path("/a"))).unwrap();
        assert_eq!(doc, json!({"a": {"b": [1]}, "c": {"b": [1]}}));

        let err = apply_op(&mut doc, &op("copy", "/d").with_from(path("/zz"))).unwrap_err();
        assert!(err.is_path_not_found());
    }

    #[test]
    fn move_op() {
        let mut doc = json!({"a": 1, "b": 2});
        apply_op(&mut doc, &op("move", "/c").with_from(path("/a"))).unwrap();
        assert_eq!(doc, json!({"b": 2, "c": 1}));

        let mut doc = json!([1, 2, 3]);
        apply_op(&mut doc, &op("move", "/-").with_from(path("/0"))).unwrap();
        assert_eq!(doc, json!([2, 3, 1]));
    }

    #[test]
    fn move_rejects_missing_source_and_own_child() {
        let mut doc = json!({"a": {"b": 1}});
        let err = apply_op(&mut doc, &op("move", "/c").with_from(path("/x"))).unwrap_err();
        assert!(err.is_path_not_found());
        assert_eq!(err.path(), "$.x");

        let err = apply_op(&mut doc, &op("move", "/a/b/c").with_from(path("/a"))).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgument(_)));
        assert_eq!(doc, json!({"a": {"b": 1}}));

        apply_op(&mut doc, &op("move", "/a").with_from(path("/a"))).unwrap();
        assert_eq!(doc, json!({"a": {"b": 1}}));
    }

    #[test]
    fn test_op() {
        let mut doc = json!({"a": [1, 2.0]});
        apply_op(&mut doc, &op("test", "/a").with_value(json!([1.0, 2]))).unwrap();

        let err = apply_op(&mut doc, &op("test", "/a/0").with_value(2)).unwrap_err();
        assert_eq!(
            err.into_kind(),
            ErrorKind::TestFailed {
                expected: JsonValue::from(2),
                actual: JsonValue::from(1),
            }
        );
        let err = apply_op(&mut doc, &op("test", "/b").with_value(1)).unwrap_err();
        assert!(err.is_path_not_found());
    }

    #[test]
    fn exist_and_ensure_put() {
        let mut doc = json!({"a": null});
        apply_op(&mut doc, &op("exist", "/a")).unwrap();
        assert!(apply_op(&mut doc, &op("exist", "/b")).unwrap_err().is_path_not_found());

        apply_op(&mut doc, &op("ensurePut", "/x/y/0").with_value(true)).unwrap();
        assert_eq!(doc, json!({"a": null, "x": {"y": [true]}}));
    }

    #[test]
    fn unknown_op() {
        let mut doc = json!({});
        let err = apply_op(&mut doc, &op("frobnicate", "/a")).unwrap_err();
        assert_eq!(err.into_kind(), ErrorKind::UnknownOp("frobnicate".into()));
    }

    #[test]
    fn patch_failure_reports_index_and_keeps_earlier_ops() {
        let mut doc = json!({"a": 1});
        let patch = JsonPatch::from(vec![
            op("add", "/b").with_value(2),
            op("test", "/a").with_value(100),
            op("add", "/c").with_value(3),
        ]);
        let err = apply_patch(&mut doc, &patch).unwrap_err();
        match err.kind() {
            ErrorKind::PatchOpFailed { index, op, .. } => {
                assert_eq!(*index, 1);
                assert_eq!(op, "test");
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(cause(err), ErrorKind::TestFailed { .. }));
        assert_eq!(doc, json!({"a": 1, "b": 2}));
    }

    #[test]
    fn atomic_patch_leaves_target_untouched_on_failure() {
        let mut doc = JsonValue::from(json!({"a": 1}));
        let before = doc.clone();
        let patch = JsonPatch::from(vec![
            op("add", "/b").with_value(2),
            op("replace", "/zz").with_value(0),
        ]);
        let atomic = ApplyPatchOptions { atomic: true };
        assert!(apply_patch_with(&mut doc, &patch, &atomic).is_err());
        assert_eq!(doc, before);

        let patch = JsonPatch::from(vec![op("add", "/b").with_value(2)]);
        apply_patch_with(&mut doc, &patch, &atomic).unwrap();
        assert_eq!(doc, JsonValue::from(json!({"a": 1, "b": 2})));
    }

    #[test]
    fn read_only_documents_reject_mutation() {
        let mut doc = FrozenNode::from(JsonValue::from(json!({"a": 1})));
        apply_op(&mut doc, &op("test", "/a").with_value(1)).unwrap();
        apply_op(&mut doc, &op("exist", "/a")).unwrap();
        let err = apply_op(&mut doc, &op("add", "/b").with_value(2)).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::NotInsertable(_)));
    }

    #[test]
    fn works_on_serde_values() {
        let mut doc: Value = json!({"list": []});
        let patch = JsonPatch::from(vec![
            op("add", "/list/-").with_value("x"),
            op("copy", "/first").with_from(path("$.list[0]")),
        ]);
        patch.apply(&mut doc).unwrap();
        assert_eq!(doc, json!({"list": ["x"], "first": "x"}));
    }
}
