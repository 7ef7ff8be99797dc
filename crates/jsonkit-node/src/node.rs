//! The Node access contract.
//!
//! Every tree the path, patch and merge engines operate on implements
//! [`Node`]: the canonical [`JsonValue`], a `serde_json::Value` parse tree, or
//! the read-only [`FrozenNode`](crate::FrozenNode). The primitives here never
//! interpret negative indices; "from the end" addressing is resolved by the
//! path layer before calling them.
//!
//! Mutators fail with:
//! - `NotInsertable` when the node is read-only,
//! - `IndexOutOfRange` when an index is outside `[0, size)` (`[0, size]` for
//!   [`Node::insert_in_array`]),
//! - `TypeMismatch` when the node is not a container of the right kind.

use crate::error::{JsonError, Result};
use crate::kind::NodeKind;
use crate::number::Number;
use crate::value::JsonValue;

pub type Entries<'a, N> = Box<dyn Iterator<Item = (&'a str, &'a N)> + 'a>;
pub type Elements<'a, N> = Box<dyn Iterator<Item = &'a N> + 'a>;

pub trait Node: Clone + std::fmt::Debug + Sized {
    fn kind(&self) -> NodeKind;

    /// Whether the mutation primitives are permitted on this node.
    fn is_insertable(&self) -> bool {
        true
    }

    // ── Construction ──────────────────────────────────────────────────────

    fn null() -> Self;
    fn new_object() -> Self;
    fn new_array() -> Self;
    fn from_value(value: JsonValue) -> Self;
    fn to_value(&self) -> JsonValue;

    /// A copy that shares no structure with `self`.
    fn deep_copy(&self) -> Self {
        self.clone()
    }

    // ── Scalars ───────────────────────────────────────────────────────────

    fn as_str(&self) -> Option<&str>;
    fn as_number(&self) -> Option<Number>;
    fn as_bool(&self) -> Option<bool>;

    fn is_null(&self) -> bool {
        self.kind() == NodeKind::Null
    }

    fn is_object(&self) -> bool {
        self.kind() == NodeKind::Object
    }

    fn is_array(&self) -> bool {
        self.kind() == NodeKind::Array
    }

    // ── Objects ───────────────────────────────────────────────────────────

    /// Member count; `0` for non-objects.
    fn size_in_object(&self) -> usize;

    fn contains_in_object(&self, key: &str) -> bool {
        self.get_in_object(key).is_some()
    }

    fn get_in_object(&self, key: &str) -> Option<&Self>;
    fn get_in_object_mut(&mut self, key: &str) -> Option<&mut Self>;

    /// Members in insertion order; empty for non-objects.
    fn entries(&self) -> Entries<'_, Self>;

    /// Sets `key`, returning the previous value.
    fn put_in_object(&mut self, key: &str, value: Self) -> Result<Option<Self>>;

    /// Removes `key`, returning the removed value (`None` when absent).
    fn remove_in_object(&mut self, key: &str) -> Result<Option<Self>>;

    // ── Arrays ────────────────────────────────────────────────────────────

    /// Element count; `0` for non-arrays.
    fn size_in_array(&self) -> usize;

    fn contains_in_array(&self, index: usize) -> bool {
        self.is_array() && index < self.size_in_array()
    }

    fn get_in_array(&self, index: usize) -> Option<&Self>;
    fn get_in_array_mut(&mut self, index: usize) -> Option<&mut Self>;

    /// Elements in index order; empty for non-arrays.
    fn elements(&self) -> Elements<'_, Self>;

    /// Overwrites the element at `index`, returning the previous one.
    fn set_in_array(&mut self, index: usize, value: Self) -> Result<Self>;

    fn add_in_array(&mut self, value: Self) -> Result<()>;

    fn insert_in_array(&mut self, index: usize, value: Self) -> Result<()>;

    fn remove_in_array(&mut self, index: usize) -> Result<Self>;
}

pub(crate) fn expect_object(found: NodeKind) -> JsonError {
    JsonError::type_mismatch(NodeKind::Object.as_str(), found.as_str())
}

pub(crate) fn expect_array(found: NodeKind) -> JsonError {
    JsonError::type_mismatch(NodeKind::Array.as_str(), found.as_str())
}

impl Node for JsonValue {
    fn kind(&self) -> NodeKind {
        JsonValue::kind(self)
    }

    fn null() -> Self {
        JsonValue::Null
    }

    fn new_object() -> Self {
        JsonValue::Object(Default::default())
    }

    fn new_array() -> Self {
        JsonValue::Array(Default::default())
    }

    fn from_value(value: JsonValue) -> Self {
        value
    }

    fn to_value(&self) -> JsonValue {
        self.clone()
    }

    fn as_str(&self) -> Option<&str> {
        JsonValue::as_str(self)
    }

    fn as_number(&self) -> Option<Number> {
        JsonValue::as_number(self)
    }

    fn as_bool(&self) -> Option<bool> {
        JsonValue::as_bool(self)
    }

    fn size_in_object(&self) -> usize {
        self.as_object().map_or(0, |obj| obj.len())
    }

    fn get_in_object(&self, key: &str) -> Option<&Self> {
        self.as_object().and_then(|obj| obj.get(key))
    }

    fn get_in_object_mut(&mut self, key: &str) -> Option<&mut Self> {
        self.as_object_mut().and_then(|obj| obj.get_mut(key))
    }

    fn entries(&self) -> Entries<'_, Self> {
        match self {
            JsonValue::Object(obj) => Box::new(obj.iter().map(|(k, v)| (k.as_str(), v))),
            _ => Box::new(std::iter::empty()),
        }
    }

    fn put_in_object(&mut self, key: &str, value: Self) -> Result<Option<Self>> {
        match self {
            JsonValue::Object(obj) => Ok(obj.insert(key, value)),
            other => Err(expect_object(JsonValue::kind(other))),
        }
    }

    fn remove_in_object(&mut self, key: &str) -> Result<Option<Self>> {
        match self {
            JsonValue::Object(obj) => Ok(obj.remove(key)),
            other => Err(expect_object(JsonValue::kind(other))),
        }
    }

    fn size_in_array(&self) -> usize {
        self.as_array().map_or(0, |arr| arr.len())
    }

    fn get_in_array(&self, index: usize) -> Option<&Self> {
        self.as_array().and_then(|arr| arr.get(index))
    }

    fn get_in_array_mut(&mut self, index: usize) -> Option<&mut Self> {
        self.as_array_mut().and_then(|arr| arr.get_mut(index))
    }

    fn elements(&self) -> Elements<'_, Self> {
        match self {
            JsonValue::Array(arr) => Box::new(arr.iter()),
            _ => Box::new(std::iter::empty()),
        }
    }

    fn set_in_array(&mut self, index: usize, value: Self) -> Result<Self> {
        match self {
            JsonValue::Array(arr) => arr.set(index, value),
            other => Err(expect_array(JsonValue::kind(other))),
        }
    }

    fn add_in_array(&mut self, value: Self) -> Result<()> {
        match self {
            JsonValue::Array(arr) => {
                arr.push(value);
                Ok(())
            }
            other => Err(expect_array(JsonValue::kind(other))),
        }
    }

    fn insert_in_array(&mut self, index: usize, value: Self) -> Result<()> {
        match self {
            JsonValue::Array(arr) => arr.insert(index, value),
            other => Err(expect_array(JsonValue::kind(other))),
        }
    }

    fn remove_in_array(&mut self, index: usize) -> Result<Self> {
        match self {
            JsonValue::Array(arr) => arr.remove(index),
            other => Err(expect_array(JsonValue::kind(other))),
        }
    }
}
