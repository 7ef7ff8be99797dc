//! The document surface operation handlers work against.
//!
//! Handlers live in a runtime table, so they cannot be generic over the
//! tree type. [`PatchTarget`] is the object-safe view of a [`Node`] tree
//! through which they read and write, exchanging values as [`JsonValue`].

use jsonkit_json_path::JsonPath;
use jsonkit_node::{node_equals, JsonValue, Node, Result};

pub trait PatchTarget {
    /// The value at `path`; `PathNotFound` when absent.
    fn value_at(&self, path: &JsonPath) -> Result<JsonValue>;

    fn contains_at(&self, path: &JsonPath) -> bool;

    fn has_non_null_at(&self, path: &JsonPath) -> bool;

    /// Deep equality of the value at `path` with `expected`, without
    /// converting the tree.
    fn equals_at(&self, path: &JsonPath, expected: &JsonValue) -> Result<bool>;

    fn add_at(&mut self, path: &JsonPath, value: JsonValue) -> Result<()>;

    /// Overwrites an existing location, returning the previous value.
    fn replace_at(&mut self, path: &JsonPath, value: JsonValue) -> Result<JsonValue>;

    /// Removes a location; `None` when nothing was there.
    fn remove_at(&mut self, path: &JsonPath) -> Result<Option<JsonValue>>;

    fn ensure_put_at(&mut self, path: &JsonPath, value: JsonValue) -> Result<()>;
}

impl<N: Node> PatchTarget for N {
    fn value_at(&self, path: &JsonPath) -> Result<JsonValue> {
        path.get(self).map(Node::to_value)
    }

    fn contains_at(&self, path: &JsonPath) -> bool {
        path.contains(self)
    }

    fn has_non_null_at(&self, path: &JsonPath) -> bool {
        path.has_non_null(self)
    }

    fn equals_at(&self, path: &JsonPath, expected: &JsonValue) -> Result<bool> {
        path.get(self).map(|node| node_equals(node, expected))
    }

    fn add_at(&mut self, path: &JsonPath, value: JsonValue) -> Result<()> {
        path.add(self, N::from_value(value))
    }

    fn replace_at(&mut self, path: &JsonPath, value: JsonValue) -> Result<JsonValue> {
        path.replace(self, N::from_value(value)).map(|old| old.to_value())
    }

    fn remove_at(&mut self, path: &JsonPath) -> Result<Option<JsonValue>> {
        path.remove(self).map(|old| old.map(|node| node.to_value()))
    }

    fn ensure_put_at(&mut self, path: &JsonPath, value: JsonValue) -> Result<()> {
        path.ensure_put(self, N::from_value(value)).map(drop)
    }
}
