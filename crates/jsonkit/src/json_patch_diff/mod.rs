//! JSON Patch diff: generate a patch that turns one document into another.
//!
//! The comparison is positional. Array elements are paired by index, never
//! by content, so an insertion near the front shows up as a run of
//! `replace`s followed by an append.

use jsonkit_json_path::JsonPath;
use jsonkit_node::{node_equals, Node, NodeKind};

use crate::json_patch::types::{op_names, JsonPatch, PatchOp};

// ── Public API ────────────────────────────────────────────────────────────

/// Generate a patch that transforms `src` into `dst`.
///
/// Applying the result to a copy of `src` yields a document equal to `dst`.
pub fn diff<A: Node, B: Node>(src: &A, dst: &B) -> JsonPatch {
    let mut patch = JsonPatch::new();
    diff_at_path(&mut patch, &JsonPath::root(), Slot::Root, src, dst);
    patch
}

// ── Core recursive differ ─────────────────────────────────────────────────

/// What kind of container holds the value being compared.
#[derive(Clone, Copy)]
enum Slot {
    Root,
    Member,
    Element,
}

fn diff_at_path<A: Node, B: Node>(
    patch: &mut JsonPatch,
    path: &JsonPath,
    slot: Slot,
    src: &A,
    dst: &B,
) {
    if node_equals(src, dst) {
        return;
    }
    match (src.kind(), dst.kind()) {
        (NodeKind::Object, NodeKind::Object) => diff_obj(patch, path, src, dst),
        (NodeKind::Array, NodeKind::Array) => diff_arr(patch, path, src, dst),
        _ => diff_val(patch, path, slot, src, dst),
    }
}

fn diff_val<A: Node, B: Node>(
    patch: &mut JsonPatch,
    path: &JsonPath,
    slot: Slot,
    src: &A,
    dst: &B,
) {
    let value = dst.to_value();
    if !src.is_null() {
        patch.push(PatchOp::new(op_names::REPLACE, path.clone()).with_value(value));
        return;
    }
    // `replace` refuses null locations.
    match slot {
        Slot::Root | Slot::Member => {
            patch.push(PatchOp::new(op_names::ADD, path.clone()).with_value(value));
        }
        Slot::Element => {
            patch.push(PatchOp::new(op_names::REMOVE, path.clone()));
            patch.push(PatchOp::new(op_names::ADD, path.clone()).with_value(value));
        }
    }
}

fn diff_obj<A: Node, B: Node>(patch: &mut JsonPatch, path: &JsonPath, src: &A, dst: &B) {
    for (key, src_val) in src.entries() {
        let p = path.with_name(key);
        match dst.get_in_object(key) {
            None => patch.push(PatchOp::new(op_names::REMOVE, p)),
            Some(dst_val) => diff_at_path(patch, &p, Slot::Member, src_val, dst_val),
        }
    }
    for (key, dst_val) in dst.entries() {
        if !src.contains_in_object(key) {
            patch.push(PatchOp::new(op_names::ADD, path.with_name(key)).with_value(dst_val.to_value()));
        }
    }
}

fn diff_arr<A: Node, B: Node>(patch: &mut JsonPatch, path: &JsonPath, src: &A, dst: &B) {
    let src_len = src.size_in_array();
    let dst_len = dst.size_in_array();
    for (i, (src_val, dst_val)) in src.elements().zip(dst.elements()).enumerate() {
        diff_at_path(patch, &path.with_index(i), Slot::Element, src_val, dst_val);
    }
    for dst_val in dst.elements().skip(src_len) {
        patch.push(PatchOp::new(op_names::ADD, path.with_append()).with_value(dst_val.to_value()));
    }
    // Highest index first so earlier removals do not shift later ones.
    for i in (dst_len..src_len).rev() {
        patch.push(PatchOp::new(op_names::REMOVE, path.with_index(i)));
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
