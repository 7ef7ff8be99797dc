//! `serde_json::Value` as a [`Node`].
//!
//! Lets the engines run directly over a tree produced by `serde_json` without
//! converting it to [`JsonValue`] first.

use serde_json::{Map, Value};

use crate::error::Result;
use crate::kind::NodeKind;
use crate::node::{expect_array, expect_object, Elements, Entries, Node};
use crate::number::Number;
use crate::value::JsonValue;
use crate::JsonError;

fn kind_of(value: &Value) -> NodeKind {
    match value {
        Value::Null => NodeKind::Null,
        Value::Bool(_) => NodeKind::Boolean,
        Value::Number(_) => NodeKind::Number,
        Value::String(_) => NodeKind::String,
        Value::Array(_) => NodeKind::Array,
        Value::Object(_) => NodeKind::Object,
    }
}

impl Node for Value {
    fn kind(&self) -> NodeKind {
        kind_of(self)
    }

    fn null() -> Self {
        Value::Null
    }

    fn new_object() -> Self {
        Value::Object(Map::new())
    }

    fn new_array() -> Self {
        Value::Array(Vec::new())
    }

    fn from_value(value: JsonValue) -> Self {
        Value::from(value)
    }

    fn to_value(&self) -> JsonValue {
        JsonValue::from(self)
    }

    fn as_str(&self) -> Option<&str> {
        Value::as_str(self)
    }

    fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(Number::from(n)),
            _ => None,
        }
    }

    fn as_bool(&self) -> Option<bool> {
        Value::as_bool(self)
    }

    fn size_in_object(&self) -> usize {
        self.as_object().map_or(0, Map::len)
    }

    fn get_in_object(&self, key: &str) -> Option<&Self> {
        self.as_object().and_then(|map| map.get(key))
    }

    fn get_in_object_mut(&mut self, key: &str) -> Option<&mut Self> {
        self.as_object_mut().and_then(|map| map.get_mut(key))
    }

    fn entries(&self) -> Entries<'_, Self> {
        match self {
            Value::Object(map) => Box::new(map.iter().map(|(k, v)| (k.as_str(), v))),
            _ => Box::new(std::iter::empty()),
        }
    }

    fn put_in_object(&mut self, key: &str, value: Self) -> Result<Option<Self>> {
        match self {
            Value::Object(map) => Ok(map.insert(key.to_string(), value)),
            other => Err(expect_object(kind_of(other))),
        }
    }

    fn remove_in_object(&mut self, key: &str) -> Result<Option<Self>> {
        match self {
            Value::Object(map) => Ok(map.shift_remove(key)),
            other => Err(expect_object(kind_of(other))),
        }
    }

    fn size_in_array(&self) -> usize {
        self.as_array().map_or(0, Vec::len)
    }

    fn get_in_array(&self, index: usize) -> Option<&Self> {
        self.as_array().and_then(|arr| arr.get(index))
    }

    fn get_in_array_mut(&mut self, index: usize) -> Option<&mut Self> {
        self.as_array_mut().and_then(|arr| arr.get_mut(index))
    }

    fn elements(&self) -> Elements<'_, Self> {
        match self {
            Value::Array(arr) => Box::new(arr.iter()),
            _ => Box::new(std::iter::empty()),
        }
    }

    fn set_in_array(&mut self, index: usize, value: Self) -> Result<Self> {
        match self {
            Value::Array(arr) => {
                let size = arr.len();
                match arr.get_mut(index) {
                    Some(slot) => Ok(std::mem::replace(slot, value)),
                    None => Err(JsonError::index_out_of_range(index, size)),
                }
            }
            other => Err(expect_array(kind_of(other))),
        }
    }

    fn add_in_array(&mut self, value: Self) -> Result<()> {
        match self {
            Value::Array(arr) => {
                arr.push(value);
                Ok(())
            }
            other => Err(expect_array(kind_of(other))),
        }
    }

    fn insert_in_array(&mut self, index: usize, value: Self) -> Result<()> {
        match self {
            Value::Array(arr) if index <= arr.len() => {
                arr.insert(index, value);
                Ok(())
            }
            Value::Array(arr) => Err(JsonError::index_out_of_range(index, arr.len())),
            other => Err(expect_array(kind_of(other))),
        }
    }

    fn remove_in_array(&mut self, index: usize) -> Result<Self> {
        match self {
            Value::Array(arr) if index < arr.len() => Ok(arr.remove(index)),
            Value::Array(arr) => Err(JsonError::index_out_of_range(index, arr.len())),
            other => Err(expect_array(kind_of(other))),
        }
    }
}
