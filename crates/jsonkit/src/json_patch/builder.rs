//! Fluent construction of patches.
//!
//! ```
//! use jsonkit::json_patch::JsonPatch;
//! use serde_json::json;
//!
//! # fn main() -> jsonkit::Result<()> {
//! let patch = JsonPatch::new()
//!     .test("/version", 1)?
//!     .replace("/version", 2)?
//!     .add("/tags/-", "stable")?
//!     .move_("/draft", "/published")?;
//!
//! let mut doc = json!({"version": 1, "tags": [], "draft": true});
//! patch.apply(&mut doc)?;
//! assert_eq!(doc, json!({"version": 2, "tags": ["stable"], "published": true}));
//! # Ok(())
//! # }
//! ```
//!
//! Paths may be written as JSON Pointers or single-location JSONPath.

use jsonkit_json_path::JsonPath;
use jsonkit_node::{JsonValue, Result};

use super::types::{op_names, JsonPatch, PatchOp};

impl JsonPatch {
    fn then(mut self, op: PatchOp) -> Self {
        self.push(op);
        self
    }

    pub fn add(self, path: &str, value: impl Into<JsonValue>) -> Result<Self> {
        Ok(self.then(PatchOp::new(op_names::ADD, JsonPath::compile(path)?).with_value(value)))
    }

    pub fn remove(self, path: &str) -> Result<Self> {
        Ok(self.then(PatchOp::new(op_names::REMOVE, JsonPath::compile(path)?)))
    }

    pub fn replace(self, path: &str, value: impl Into<JsonValue>) -> Result<Self> {
        Ok(self.then(PatchOp::new(op_names::REPLACE, JsonPath::compile(path)?).with_value(value)))
    }

    pub fn copy(self, from: &str, path: &str) -> Result<Self> {
        let op = PatchOp::new(op_names::COPY, JsonPath::compile(path)?)
            .with_from(JsonPath::compile(from)?);
        Ok(self.then(op))
    }

    /// Adds a `move` (trailing underscore because `move` is a keyword).
    pub fn move_(self, from: &str, path: &str) -> Result<Self> {
        let op = PatchOp::new(op_names::MOVE, JsonPath::compile(path)?)
            .with_from(JsonPath::compile(from)?);
        Ok(self.then(op))
    }

    pub fn test(self, path: &str, value: impl Into<JsonValue>) -> Result<Self> {
        Ok(self.then(PatchOp::new(op_names::TEST, JsonPath::compile(path)?).with_value(value)))
    }

    pub fn exist(self, path: &str) -> Result<Self> {
        Ok(self.then(PatchOp::new(op_names::EXIST, JsonPath::compile(path)?)))
    }

    pub fn ensure_put(self, path: &str, value: impl Into<JsonValue>) -> Result<Self> {
        Ok(self.then(PatchOp::new(op_names::ENSURE_PUT, JsonPath::compile(path)?).with_value(value)))
    }

    /// Appends an operation by name, for handlers registered at runtime.
    pub fn op(self, op: PatchOp) -> Self {
        self.then(op)
    }
}
