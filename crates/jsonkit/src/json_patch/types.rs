//! Core types for the JSON Patch module.

use jsonkit_json_path::JsonPath;
use jsonkit_node::{JsonError, JsonValue, Result};

/// Names of the built-in operations.
pub mod op_names {
    pub const ADD: &str = "add";
    pub const REMOVE: &str = "remove";
    pub const REPLACE: &str = "replace";
    pub const MOVE: &str = "move";
    pub const COPY: &str = "copy";
    pub const TEST: &str = "test";
    pub const EXIST: &str = "exist";
    pub const ENSURE_PUT: &str = "ensurePut";
}

// ── Operation ─────────────────────────────────────────────────────────────

/// One patch operation.
///
/// `op` is an open name looked up in the
/// [`PatchOpRegistry`](super::PatchOpRegistry) when the operation is
/// applied, so a decoded patch may carry operations registered later.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchOp {
    pub op: String,
    pub path: JsonPath,
    pub value: Option<JsonValue>,
    pub from: Option<JsonPath>,
}

impl PatchOp {
    pub fn new(op: impl Into<String>, path: JsonPath) -> Self {
        Self {
            op: op.into(),
            path,
            value: None,
            from: None,
        }
    }

    pub fn with_value(mut self, value: impl Into<JsonValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_from(mut self, from: JsonPath) -> Self {
        self.from = Some(from);
        self
    }

    pub fn op_name(&self) -> &str {
        &self.op
    }

    pub fn path(&self) -> &JsonPath {
        &self.path
    }

    /// The `value` member, required by `add`, `replace`, `test` and `ensurePut`.
    pub fn require_value(&self) -> Result<&JsonValue> {
        self.value
            .as_ref()
            .ok_or_else(|| JsonError::invalid_argument(format!("'{}' requires 'value'", self.op)))
    }

    /// The `from` member, required by `copy` and `move`.
    pub fn require_from(&self) -> Result<&JsonPath> {
        self.from
            .as_ref()
            .ok_or_else(|| JsonError::invalid_argument(format!("'{}' requires 'from'", self.op)))
    }
}

// ── Patch ─────────────────────────────────────────────────────────────────

/// An ordered list of operations, applied strictly in sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsonPatch {
    ops: Vec<PatchOp>,
}

impl JsonPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[PatchOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn push(&mut self, op: PatchOp) {
        self.ops.push(op);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PatchOp> {
        self.ops.iter()
    }

    pub fn into_ops(self) -> Vec<PatchOp> {
        self.ops
    }
}

impl From<Vec<PatchOp>> for JsonPatch {
    fn from(ops: Vec<PatchOp>) -> Self {
        Self { ops }
    }
}

impl FromIterator<PatchOp> for JsonPatch {
    fn from_iter<I: IntoIterator<Item = PatchOp>>(iter: I) -> Self {
        Self {
            ops: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for JsonPatch {
    type Item = PatchOp;
    type IntoIter = std::vec::IntoIter<PatchOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

impl<'a> IntoIterator for &'a JsonPatch {
    type Item = &'a PatchOp;
    type IntoIter = std::slice::Iter<'a, PatchOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

// ── Options ───────────────────────────────────────────────────────────────

/// Options for [`apply_patch_with`](super::apply_patch_with).
#[derive(Debug, Clone, Default)]
pub struct ApplyPatchOptions {
    /// Apply to a deep copy and swap it in only when every operation
    /// succeeds. Without it a failing patch leaves earlier operations applied.
    pub atomic: bool,
}
