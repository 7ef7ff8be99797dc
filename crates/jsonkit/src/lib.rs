//! jsonkit: JSON Patch, structural diff and merging over any [`Node`] tree.
//!
//! The value model and the Node contract live in `jsonkit-node`, the path
//! compiler and evaluator in `jsonkit-json-path`; the most used items of
//! both are re-exported here.
//!
//! ```
//! use jsonkit::json_patch::JsonPatch;
//! use jsonkit::json_patch_diff::diff;
//! use jsonkit::json_merge::merge_rfc7386;
//! use serde_json::json;
//!
//! # fn main() -> jsonkit::Result<()> {
//! let before = json!({"name": "jsonkit", "tags": ["json"]});
//! let after = json!({"name": "jsonkit", "tags": ["json", "patch"], "stable": true});
//!
//! let patch: JsonPatch = diff(&before, &after);
//! let mut doc = before.clone();
//! patch.apply(&mut doc)?;
//! assert_eq!(doc, after);
//!
//! merge_rfc7386(&mut doc, &json!({"stable": null}))?;
//! assert_eq!(doc, json!({"name": "jsonkit", "tags": ["json", "patch"]}));
//! # Ok(())
//! # }
//! ```

pub mod json_patch;
pub mod json_patch_diff;
pub mod json_merge;

pub use jsonkit_json_path::{JsonPath, JsonPathEval, PathFunctionRegistry, PathToken};
pub use jsonkit_node::{
    node_equals, ErrorKind, FrozenNode, JsonArray, JsonError, JsonObject, JsonValue, Node,
    NodeKind, Result,
};
