//! Merging one document into another.
//!
//! Two flavours:
//!
//! - [`merge`] / [`merge_with`]: structural merge. Objects merge key by key
//!   and arrays index by index; scalars and kind mismatches follow the
//!   `overwrite` rule.
//! - [`merge_rfc7386`]: JSON Merge Patch. `null` deletes, arrays are
//!   replaced whole, and only objects recurse.
//!
//! [`merge_patch_diff`] produces the RFC 7386 patch between two documents.

use jsonkit_node::{node_equals, JsonObject, JsonValue, Node, NodeKind, Result, ResultExt};
use tracing::trace;

// ── Options ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Replace existing non-null target values. When off, only null or
    /// absent slots are filled.
    pub overwrite: bool,
    /// Insert deep copies of patch values instead of shallow clones.
    pub deep_copy: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            overwrite: true,
            deep_copy: true,
        }
    }
}

impl MergeOptions {
    fn take<N: Node>(&self, value: &N) -> N {
        if self.deep_copy {
            value.deep_copy()
        } else {
            value.clone()
        }
    }
}

// ── Structural merge ──────────────────────────────────────────────────────

pub fn merge<N: Node>(target: &mut N, patch: &N, overwrite: bool, deep_copy: bool) -> Result<()> {
    merge_with(target, patch, &MergeOptions { overwrite, deep_copy })
}

/// Merges `patch` into `target` in place.
///
/// A patch index equal to the target array's length appends, so a longer
/// patch array extends the target.
pub fn merge_with<N: Node>(target: &mut N, patch: &N, options: &MergeOptions) -> Result<()> {
    match (target.kind(), patch.kind()) {
        (NodeKind::Object, NodeKind::Object) => merge_objects(target, patch, options),
        (NodeKind::Array, NodeKind::Array) => merge_arrays(target, patch, options),
        _ => {
            if options.overwrite || target.is_null() {
                *target = options.take(patch);
            }
            Ok(())
        }
    }
}

fn merge_objects<N: Node>(target: &mut N, patch: &N, options: &MergeOptions) -> Result<()> {
    for (key, value) in patch.entries() {
        match target.get_in_object_mut(key) {
            Some(slot) => merge_with(slot, value, options).within(key)?,
            None => {
                trace!(key, "merge adds member");
                target.put_in_object(key, options.take(value)).within(key)?;
            }
        }
    }
    Ok(())
}

fn merge_arrays<N: Node>(target: &mut N, patch: &N, options: &MergeOptions) -> Result<()> {
    for (index, value) in patch.elements().enumerate() {
        let size = target.size_in_array();
        match target.get_in_array_mut(index) {
            Some(slot) => merge_with(slot, value, options).within(index)?,
            None if index < size => {
                target.set_in_array(index, options.take(value)).within(index)?;
            }
            None => target.add_in_array(options.take(value)).within(index)?,
        }
    }
    Ok(())
}

// ── RFC 7386 ──────────────────────────────────────────────────────────────

/// Applies a JSON Merge Patch (RFC 7386) to `target` in place.
///
/// A non-object patch replaces the target. Otherwise a non-object target
/// becomes `{}` first, `null` members delete, object members recurse and
/// everything else is set as given.
pub fn merge_rfc7386<N: Node>(target: &mut N, patch: &N) -> Result<()> {
    if !patch.is_object() {
        *target = patch.deep_copy();
        return Ok(());
    }
    if !target.is_object() {
        *target = N::new_object();
    }
    for (key, value) in patch.entries() {
        if value.is_null() {
            if target.contains_in_object(key) {
                target.remove_in_object(key).within(key)?;
            }
            continue;
        }
        if value.is_object() {
            if let Some(slot) = target.get_in_object_mut(key) {
                merge_rfc7386(slot, value).within(key)?;
                continue;
            }
        }
        let mut fresh = N::null();
        merge_rfc7386(&mut fresh, value).within(key)?;
        target.put_in_object(key, fresh).within(key)?;
    }
    Ok(())
}

/// Builds the RFC 7386 patch that turns `src` into `dst`.
///
/// Merge patches cannot express a `null` member value: a key whose target
/// value is `null` comes out as a deletion.
pub fn merge_patch_diff<A: Node, B: Node>(src: &A, dst: &B) -> JsonValue {
    if !(src.is_object() && dst.is_object()) {
        return dst.to_value();
    }
    let mut out = JsonObject::new();
    for (key, src_val) in src.entries() {
        match dst.get_in_object(key) {
            None => {
                out.insert(key, JsonValue::Null);
            }
            Some(dst_val) if !node_equals(src_val, dst_val) => {
                let nested = if dst_val.is_object() {
                    merge_patch_diff(src_val, dst_val)
                } else {
                    dst_val.to_value()
                };
                out.insert(key, nested);
            }
            Some(_) => {}
        }
    }
    for (key, dst_val) in dst.entries() {
        if !src.contains_in_object(key) {
            out.insert(key, dst_val.to_value());
        }
    }
    JsonValue::Object(out)
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use jsonkit_node::{ErrorKind, FrozenNode};
    use serde_json::json;

    #[test]
    fn merge_overwrites_and_recurses() {
        let mut doc = json!({"a": {"x": 1, "y": 2}, "b": [1, 2], "c": "keep"});
        merge(&mut doc, &json!({"a": {"y": 20, "z": 30}, "b": [10], "d": null}), true, false).unwrap();
        assert_eq!(doc, json!({"a": {"x": 1, "y": 20, "z": 30}, "b": [10, 2], "c": "keep", "d": null}));
    }

    #[test]
    fn merge_without_overwrite_fills_gaps_only() {
        let mut doc = json!({"a": 1, "n": null, "list": [null, 2]});
        let patch = json!({"a": 100, "n": "filled", "new": true, "list": [1, 20, 3]});
        merge(&mut doc, &patch, false, true).unwrap();
        assert_eq!(doc, json!({"a": 1, "n": "filled", "new": true, "list": [1, 2, 3]}));
    }

    #[test]
    fn merge_kind_mismatch_follows_overwrite() {
        let mut doc = json!({"a": [1]});
        merge(&mut doc, &json!({"a": {"k": 1}}), false, true).unwrap();
        assert_eq!(doc, json!({"a": [1]}));
        merge_with(&mut doc, &json!({"a": {"k": 1}}), &MergeOptions::default()).unwrap();
        assert_eq!(doc, json!({"a": {"k": 1}}));
    }

    #[test]
    fn merge_into_read_only_fails_at_the_member() {
        let mut doc = FrozenNode::from(JsonValue::from(json!({"a": {"b": 1}})));
        let patch = FrozenNode::from(JsonValue::from(json!({"a": {"c": 2}})));
        let err = merge_with(&mut doc, &patch, &MergeOptions::default()).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::NotInsertable(_)));
        assert_eq!(err.path(), "$.a");
    }

    #[test]
    fn rfc7386_example() {
        let mut doc = json!({
            "title": "Goodbye!",
            "author": {"givenName": "John", "familyName": "Doe"},
            "tags": ["example", "sample"],
            "content": "This will be unchanged"
        });
        let patch = json!({
            "title": "Hello!",
            "phoneNumber": "+01-123-456-7890",
            "author": {"familyName": null},
            "tags": ["example"]
        });
        merge_rfc7386(&mut doc, &patch).unwrap();
        assert_eq!(
            doc,
            json!({
                "title": "Hello!",
                "author": {"givenName": "John"},
                "tags": ["example"],
                "content": "This will be unchanged",
                "phoneNumber": "+01-123-456-7890"
            })
        );
    }

    #[test]
    fn rfc7386_appendix_cases() {
        let cases = [
            (json!({"a": "b"}), json!({"a": "c"}), json!({"a": "c"})),
            (json!({"a": "b"}), json!({"b": "c"}), json!({"a": "b", "b": "c"})),
            (json!({"a": "b"}), json!({"a": null}), json!({})),
            (json!({"a": "b", "b": "c"}), json!({"a": null}), json!({"b": "c"})),
            (json!({"a": ["b"]}), json!({"a": "c"}), json!({"a": "c"})),
            (json!({"a": "c"}), json!({"a": ["b"]}), json!({"a": ["b"]})),
            (json!({"a": {"b": "c"}}), json!({"a": {"b": "d", "c": null}}), json!({"a": {"b": "d"}})),
            (json!({"a": [{"b": "c"}]}), json!({"a": [1]}), json!({"a": [1]})),
            (json!(["a", "b"]), json!(["c", "d"]), json!(["c", "d"])),
            (json!({"a": "b"}), json!(["c"]), json!(["c"])),
            (json!({"a": "foo"}), json!(null), json!(null)),
            (json!({"a": "foo"}), json!("bar"), json!("bar")),
            (json!({"e": null}), json!({"a": 1}), json!({"e": null, "a": 1})),
            (json!([1, 2]), json!({"a": "b", "c": null}), json!({"a": "b"})),
            (json!({}), json!({"a": {"bb": {"ccc": null}}}), json!({"a": {"bb": {}}})),
        ];
        for (target, patch, expected) in cases {
            let mut doc = target.clone();
            merge_rfc7386(&mut doc, &patch).unwrap();
            assert_eq!(doc, expected, "{target} + {patch}");
        }
    }

    #[test]
    fn merge_patch_diff_reproduces_target() {
        let src = json!({"a": 1, "b": {"c": 2, "d": 3}, "gone": true, "list": [1]});
        let dst = json!({"a": 1, "b": {"c": 20, "d": 3}, "list": [1, 2], "new": {"x": 1}});
        let patch = merge_patch_diff(&src, &dst);
        assert_eq!(
            patch,
            JsonValue::from(json!({"b": {"c": 20}, "gone": null, "list": [1, 2], "new": {"x": 1}}))
        );
        let mut doc = src.clone();
        merge_rfc7386(&mut doc, &serde_json::Value::from(&patch)).unwrap();
        assert_eq!(doc, dst);
    }
}
