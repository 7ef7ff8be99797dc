//! Process-wide table of value codecs.
//!
//! A codec teaches the toolkit how to turn a host type that is not itself a
//! [`Node`](crate::Node) (a timestamp, a UUID newtype) into a [`JsonValue`]
//! leaf and back. Codecs are keyed by the host type's `TypeId`; registration
//! normally happens once at startup, lookups may happen from any thread.

use std::any::{type_name, Any, TypeId};
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use tracing::debug;

use crate::error::{JsonError, Result};
use crate::value::JsonValue;

pub trait ValueCodec: Send + Sync + 'static {
    type Value: 'static;

    fn encode(&self, value: &Self::Value) -> Result<JsonValue>;
    fn decode(&self, value: &JsonValue) -> Result<Self::Value>;
}

// Each entry holds an `Arc<dyn ValueCodec<Value = T>>` for the key's `T`.
static VALUE_CODECS: Lazy<DashMap<TypeId, Arc<dyn Any + Send + Sync>>> = Lazy::new(DashMap::new);

/// Registers `codec` for its value type, replacing any previous codec.
pub fn register_value_codec<C: ValueCodec>(codec: C) {
    let erased: Arc<dyn ValueCodec<Value = C::Value>> = Arc::new(codec);
    VALUE_CODECS.insert(TypeId::of::<C::Value>(), Arc::new(erased));
    debug!(value_type = type_name::<C::Value>(), "registered value codec");
}

pub fn has_value_codec<T: 'static>() -> bool {
    VALUE_CODECS.contains_key(&TypeId::of::<T>())
}

fn lookup<T: 'static>() -> Result<Arc<dyn ValueCodec<Value = T>>> {
    VALUE_CODECS
        .get(&TypeId::of::<T>())
        .and_then(|entry| {
            entry
                .value()
                .downcast_ref::<Arc<dyn ValueCodec<Value = T>>>()
                .cloned()
        })
        .ok_or_else(|| JsonError::type_mismatch("type with a registered value codec", type_name::<T>()))
}

pub fn encode_value<T: 'static>(value: &T) -> Result<JsonValue> {
    lookup::<T>()?.encode(value)
}

pub fn decode_value<T: 'static>(value: &JsonValue) -> Result<T> {
    lookup::<T>()?.decode(value)
}
