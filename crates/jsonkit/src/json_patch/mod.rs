//! JSON Patch (RFC 6902) over any [`Node`](jsonkit_node::Node), plus the
//! `exist` and `ensurePut` extensions.
//!
//! # Operations
//!
//! Standard: `add`, `remove`, `replace`, `copy`, `move`, `test`.
//!
//! Extensions: `exist` (fails unless the path is present) and `ensurePut`
//! (sets a value, creating missing intermediate containers).
//!
//! Operation names are resolved at apply time through the process-wide
//! [`PatchOpRegistry`], so callers can register their own.

pub mod types;
pub mod target;
pub mod registry;
pub mod apply;
pub mod builder;
pub mod codec;

pub use types::{op_names, ApplyPatchOptions, JsonPatch, PatchOp};
pub use target::PatchTarget;
pub use registry::{PatchOpHandler, PatchOpRegistry};
pub use apply::{apply_op, apply_patch, apply_patch_with};
pub use codec::json::{from_json, from_json_patch, to_json, to_json_patch};
