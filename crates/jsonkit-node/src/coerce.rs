//! Scalar coercion.
//!
//! Two families:
//!
//! - strict `to_*` and [`to`]: the node must already hold the requested kind;
//!   numeric widening and narrowing only happen when lossless.
//! - lenient `as_*`: additionally converts across scalar kinds when the
//!   conversion is lossless (`"42"` -> `42`, `true` -> `"true"`).
//!
//! Every failure is `TypeMismatch`; nothing silently truncates.

use crate::error::{JsonError, Result};
use crate::kind::NodeKind;
use crate::node::Node;
use crate::number::Number;
use crate::value::JsonValue;

fn mismatch<N: Node>(expected: &str, node: &N) -> JsonError {
    JsonError::type_mismatch(expected, describe(node))
}

fn describe<N: Node>(node: &N) -> String {
    match node.kind() {
        NodeKind::Number => match node.as_number() {
            Some(n) => format!("number {n}"),
            None => "number".to_string(),
        },
        NodeKind::String => match node.as_str() {
            Some(s) => format!("string {s:?}"),
            None => "string".to_string(),
        },
        kind => kind.to_string(),
    }
}

// ── Strict ────────────────────────────────────────────────────────────────

pub fn to_string<N: Node>(node: &N) -> Result<String> {
    node.as_str()
        .map(str::to_string)
        .ok_or_else(|| mismatch("string", node))
}

pub fn to_bool<N: Node>(node: &N) -> Result<bool> {
    node.as_bool().ok_or_else(|| mismatch("boolean", node))
}

pub fn to_number<N: Node>(node: &N) -> Result<Number> {
    node.as_number().ok_or_else(|| mismatch("number", node))
}

pub fn to_i64<N: Node>(node: &N) -> Result<i64> {
    to_number(node)?.as_i64().ok_or_else(|| mismatch("i64", node))
}

pub fn to_u64<N: Node>(node: &N) -> Result<u64> {
    to_number(node)?.as_u64().ok_or_else(|| mismatch("u64", node))
}

pub fn to_f64<N: Node>(node: &N) -> Result<f64> {
    to_number(node)?.as_f64().ok_or_else(|| mismatch("f64", node))
}

// ── Lenient ───────────────────────────────────────────────────────────────

pub fn as_string<N: Node>(node: &N) -> Result<String> {
    match node.kind() {
        NodeKind::String => to_string(node),
        NodeKind::Number => Ok(to_number(node)?.to_string()),
        NodeKind::Boolean => Ok(to_bool(node)?.to_string()),
        _ => Err(mismatch("string", node)),
    }
}

pub fn as_number<N: Node>(node: &N) -> Result<Number> {
    match node.kind() {
        NodeKind::Number => to_number(node),
        NodeKind::String => parse_number(node.as_str().unwrap_or_default())
            .ok_or_else(|| mismatch("number", node)),
        _ => Err(mismatch("number", node)),
    }
}

pub fn as_bool<N: Node>(node: &N) -> Result<bool> {
    match node.kind() {
        NodeKind::Boolean => to_bool(node),
        NodeKind::String => match node.as_str() {
            Some("true") => Ok(true),
            Some("false") => Ok(false),
            _ => Err(mismatch("boolean", node)),
        },
        _ => Err(mismatch("boolean", node)),
    }
}

fn parse_number(text: &str) -> Option<Number> {
    let text = text.trim();
    if let Ok(v) = text.parse::<i64>() {
        return Some(Number::Int(v));
    }
    if let Ok(v) = text.parse::<u64>() {
        return Some(Number::UInt(v));
    }
    text.parse::<f64>().ok().filter(|f| f.is_finite()).map(Number::Float)
}

// ── Generic ───────────────────────────────────────────────────────────────

/// Types a node can be converted to with [`to`].
pub trait FromNode: Sized {
    fn from_node<N: Node>(node: &N) -> Result<Self>;
}

/// Strict generic conversion.
pub fn to<T: FromNode, N: Node>(node: &N) -> Result<T> {
    T::from_node(node)
}

impl FromNode for String {
    fn from_node<N: Node>(node: &N) -> Result<Self> {
        to_string(node)
    }
}

impl FromNode for bool {
    fn from_node<N: Node>(node: &N) -> Result<Self> {
        to_bool(node)
    }
}

impl FromNode for Number {
    fn from_node<N: Node>(node: &N) -> Result<Self> {
        to_number(node)
    }
}

impl FromNode for i64 {
    fn from_node<N: Node>(node: &N) -> Result<Self> {
        to_i64(node)
    }
}

impl FromNode for u64 {
    fn from_node<N: Node>(node: &N) -> Result<Self> {
        to_u64(node)
    }
}

impl FromNode for f64 {
    fn from_node<N: Node>(node: &N) -> Result<Self> {
        to_f64(node)
    }
}

macro_rules! impl_from_node_narrow {
    ($via:ident: $($t:ty),*) => {
        $(impl FromNode for $t {
            fn from_node<N: Node>(node: &N) -> Result<Self> {
                let wide = $via(node)?;
                <$t>::try_from(wide).map_err(|_| mismatch(stringify!($t), node))
            }
        })*
    };
}

impl_from_node_narrow!(to_i64: i8, i16, i32, isize);
impl_from_node_narrow!(to_u64: u8, u16, u32, usize);

impl FromNode for f32 {
    fn from_node<N: Node>(node: &N) -> Result<Self> {
        let wide = to_f64(node)?;
        let narrow = wide as f32;
        if f64::from(narrow) == wide {
            Ok(narrow)
        } else {
            Err(mismatch("f32", node))
        }
    }
}

impl FromNode for JsonValue {
    fn from_node<N: Node>(node: &N) -> Result<Self> {
        Ok(node.to_value())
    }
}

impl<T: FromNode> FromNode for Option<T> {
    fn from_node<N: Node>(node: &N) -> Result<Self> {
        if node.is_null() {
            Ok(None)
        } else {
            T::from_node(node).map(Some)
        }
    }
}

impl<T: FromNode> FromNode for Vec<T> {
    fn from_node<N: Node>(node: &N) -> Result<Self> {
        if !node.is_array() {
            return Err(mismatch("array", node));
        }
        node.elements()
            .enumerate()
            .map(|(i, item)| T::from_node(item).map_err(|err| err.within(i)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use serde_json::json;

    #[test]
    fn strict_accepts_lossless_only() {
        assert_eq!(to_i64(&json!(3.0)).unwrap(), 3);
        assert!(to_i64(&json!(3.5)).is_err());
        assert!(to_i64(&json!("3")).is_err());
        assert_eq!(to::<u8, _>(&json!(255)).unwrap(), 255);
        assert!(to::<u8, _>(&json!(256)).is_err());
        assert!(to::<i32, _>(&json!(-1)).is_ok());
        assert!(to::<u32, _>(&json!(-1)).is_err());
        assert_eq!(to::<f32, _>(&json!(0.5)).unwrap(), 0.5);
        assert!(to::<f32, _>(&json!(0.1)).is_err());
        assert!(to_f64(&json!(9007199254740993i64)).is_err());
    }

    #[test]
    fn lenient_crosses_scalar_kinds() {
        assert_eq!(as_number(&json!("42")).unwrap(), Number::Int(42));
        assert_eq!(as_number(&json!(" 2.5 ")).unwrap(), Number::Float(2.5));
        assert!(as_number(&json!("4x")).is_err());
        assert_eq!(as_string(&json!(1.5)).unwrap(), "1.5");
        assert_eq!(as_string(&json!(true)).unwrap(), "true");
        assert!(as_bool(&json!("yes")).is_err());
        assert!(as_bool(&json!("false")).is_ok_and(|b| !b));
        assert!(as_string(&json!([1])).is_err());
    }

    #[test]
    fn mismatch_reports_found_value() {
        let err = to_i64(&json!(3.5)).unwrap_err();
        assert_eq!(
            err.kind(),
            &ErrorKind::TypeMismatch {
                expected: "i64".into(),
                found: "number 3.5".into()
            }
        );
    }

    #[test]
    fn collections() {
        assert_eq!(to::<Vec<i64>, _>(&json!([1, 2, 3])).unwrap(), vec![1, 2, 3]);
        assert_eq!(to::<Option<String>, _>(&json!(null)).unwrap(), None);
        let err = to::<Vec<i64>, _>(&json!([1, "x"])).unwrap_err();
        assert_eq!(err.path(), "$[1]");
    }

    #[test]
    fn method_form_on_canonical_values() {
        let value = JsonValue::from(json!({"n": 7}));
        let n = value.as_object().and_then(|o| o.get("n")).unwrap();
        assert_eq!(n.to::<i64>().unwrap(), 7);
    }
}
