//! Read-only, structure-sharing snapshot trees.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{JsonError, Result};
use crate::kind::NodeKind;
use crate::node::{Elements, Entries, Node};
use crate::number::Number;
use crate::value::JsonValue;

/// An immutable JSON tree whose subtrees are reference counted.
///
/// Cloning is O(1) and clones share structure. Every mutation primitive fails
/// with `NotInsertable`, so a `FrozenNode` can be queried with the same paths
/// as a mutable tree but never patched in place.
#[derive(Debug, Clone)]
pub struct FrozenNode(Arc<Frozen>);

#[derive(Debug)]
enum Frozen {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<FrozenNode>),
    Object(IndexMap<String, FrozenNode>),
}

impl FrozenNode {
    pub fn freeze(value: &JsonValue) -> Self {
        let inner = match value {
            JsonValue::Null => Frozen::Null,
            JsonValue::Bool(b) => Frozen::Bool(*b),
            JsonValue::Number(n) => Frozen::Number(*n),
            JsonValue::String(s) => Frozen::String(s.clone()),
            JsonValue::Array(arr) => Frozen::Array(arr.iter().map(FrozenNode::freeze).collect()),
            JsonValue::Object(obj) => Frozen::Object(
                obj.iter()
                    .map(|(k, v)| (k.clone(), FrozenNode::freeze(v)))
                    .collect(),
            ),
        };
        FrozenNode(Arc::new(inner))
    }

    /// Whether both handles point at the same shared subtree.
    pub fn ptr_eq(&self, other: &FrozenNode) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    fn read_only(&self) -> JsonError {
        JsonError::not_insertable(self.kind())
    }
}

impl From<JsonValue> for FrozenNode {
    fn from(value: JsonValue) -> Self {
        FrozenNode::freeze(&value)
    }
}

impl PartialEq for FrozenNode {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || crate::equal::node_equals(self, other)
    }
}

impl Node for FrozenNode {
    fn kind(&self) -> NodeKind {
        match &*self.0 {
            Frozen::Null => NodeKind::Null,
            Frozen::Bool(_) => NodeKind::Boolean,
            Frozen::Number(_) => NodeKind::Number,
            Frozen::String(_) => NodeKind::String,
            Frozen::Array(_) => NodeKind::Array,
            Frozen::Object(_) => NodeKind::Object,
        }
    }

    fn is_insertable(&self) -> bool {
        false
    }

    fn null() -> Self {
        FrozenNode(Arc::new(Frozen::Null))
    }

    fn new_object() -> Self {
        FrozenNode(Arc::new(Frozen::Object(IndexMap::new())))
    }

    fn new_array() -> Self {
        FrozenNode(Arc::new(Frozen::Array(Vec::new())))
    }

    fn from_value(value: JsonValue) -> Self {
        FrozenNode::freeze(&value)
    }

    fn to_value(&self) -> JsonValue {
        match &*self.0 {
            Frozen::Null => JsonValue::Null,
            Frozen::Bool(b) => JsonValue::Bool(*b),
            Frozen::Number(n) => JsonValue::Number(*n),
            Frozen::String(s) => JsonValue::String(s.clone()),
            Frozen::Array(arr) => JsonValue::Array(arr.iter().map(Node::to_value).collect()),
            Frozen::Object(map) => {
                JsonValue::Object(map.iter().map(|(k, v)| (k.clone(), v.to_value())).collect())
            }
        }
    }

    fn deep_copy(&self) -> Self {
        FrozenNode::freeze(&self.to_value())
    }

    fn as_str(&self) -> Option<&str> {
        match &*self.0 {
            Frozen::String(s) => Some(s),
            _ => None,
        }
    }

    fn as_number(&self) -> Option<Number> {
        match &*self.0 {
            Frozen::Number(n) => Some(*n),
            _ => None,
        }
    }

    fn as_bool(&self) -> Option<bool> {
        match &*self.0 {
            Frozen::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn size_in_object(&self) -> usize {
        match &*self.0 {
            Frozen::Object(map) => map.len(),
            _ => 0,
        }
    }

    fn get_in_object(&self, key: &str) -> Option<&Self> {
        match &*self.0 {
            Frozen::Object(map) => map.get(key),
            _ => None,
        }
    }

    fn get_in_object_mut(&mut self, _key: &str) -> Option<&mut Self> {
        None
    }

    fn entries(&self) -> Entries<'_, Self> {
        match &*self.0 {
            Frozen::Object(map) => Box::new(map.iter().map(|(k, v)| (k.as_str(), v))),
            _ => Box::new(std::iter::empty()),
        }
    }

    fn put_in_object(&mut self, _key: &str, _value: Self) -> Result<Option<Self>> {
        Err(self.read_only())
    }

    fn remove_in_object(&mut self, _key: &str) -> Result<Option<Self>> {
        Err(self.read_only())
    }

    fn size_in_array(&self) -> usize {
        match &*self.0 {
            Frozen::Array(arr) => arr.len(),
            _ => 0,
        }
    }

    fn get_in_array(&self, index: usize) -> Option<&Self> {
        match &*self.0 {
            Frozen::Array(arr) => arr.get(index),
            _ => None,
        }
    }

    fn get_in_array_mut(&mut self, _index: usize) -> Option<&mut Self> {
        None
    }

    fn elements(&self) -> Elements<'_, Self> {
        match &*self.0 {
            Frozen::Array(arr) => Box::new(arr.iter()),
            _ => Box::new(std::iter::empty()),
        }
    }

    fn set_in_array(&mut self, _index: usize, _value: Self) -> Result<Self> {
        Err(self.read_only())
    }

    fn add_in_array(&mut self, _value: Self) -> Result<()> {
        Err(self.read_only())
    }

    fn insert_in_array(&mut self, _index: usize, _value: Self) -> Result<()> {
        Err(self.read_only())
    }

    fn remove_in_array(&mut self, _index: usize) -> Result<Self> {
        Err(self.read_only())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use serde_json::json;

    fn frozen() -> FrozenNode {
        FrozenNode::from(JsonValue::from(json!({"a": [1, 2], "b": {"c": "x"}})))
    }

    #[test]
    fn reads_like_any_node() {
        let node = frozen();
        assert!(!node.is_insertable());
        assert_eq!(node.size_in_object(), 2);
        let a = node.get_in_object("a").unwrap();
        assert_eq!(a.get_in_array(1).and_then(Node::as_number), Some(Number::Int(2)));
        assert_eq!(node.to_value(), JsonValue::from(json!({"a": [1, 2], "b": {"c": "x"}})));
    }

    #[test]
    fn every_mutator_is_rejected() {
        let mut node = frozen();
        let err = node.put_in_object("z", FrozenNode::null()).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::NotInsertable(NodeKind::Object));
        assert!(node.remove_in_object("a").is_err());
        assert!(node.get_in_object_mut("a").is_none());

        let mut arr = node.get_in_object("a").cloned().unwrap();
        assert!(arr.add_in_array(FrozenNode::null()).is_err());
        assert!(arr.set_in_array(0, FrozenNode::null()).is_err());
        assert!(arr.insert_in_array(0, FrozenNode::null()).is_err());
        assert!(arr.remove_in_array(0).is_err());
    }

    #[test]
    fn clones_share_deep_copies_do_not() {
        let node = frozen();
        assert!(node.clone().ptr_eq(&node));
        let copy = node.deep_copy();
        assert!(!copy.ptr_eq(&node));
        assert_eq!(copy, node);
    }
}
