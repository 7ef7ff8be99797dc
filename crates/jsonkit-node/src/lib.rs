//! JSON value model and Node access contract.
//!
//! [`JsonValue`] is the canonical in-memory tree. The [`Node`] trait is the
//! small capability interface the path, patch and merge engines are written
//! against, so they run unchanged over the canonical model, a
//! `serde_json::Value` tree, or a read-only [`FrozenNode`].
//!
//! # Example
//!
//! ```
//! use jsonkit_node::{JsonValue, Node};
//!
//! let mut doc = JsonValue::parse(r#"{"a": [1, 2]}"#).unwrap();
//! let list = doc.get_in_object_mut("a").unwrap();
//! list.add_in_array(JsonValue::from(3)).unwrap();
//! assert_eq!(doc.to_string(), r#"{"a":[1,2,3]}"#);
//! ```

mod error;
pub use error::{ErrorKind, JsonError, Result, ResultExt};

mod kind;
pub use kind::NodeKind;

mod segment;
pub use segment::{is_plain_name, write_name_segment, write_quoted_name, PathSegment};

mod number;
pub use number::Number;

mod value;
pub use value::{JsonArray, JsonObject, JsonValue};

mod node;
pub use node::{Elements, Entries, Node};

mod serde_node;

mod frozen;
pub use frozen::FrozenNode;

mod equal;
pub use equal::node_equals;

pub mod coerce;
pub use coerce::FromNode;

pub mod codec;
pub use codec::{decode_value, encode_value, has_value_codec, register_value_codec, ValueCodec};
