use crate::kind::NodeKind;
use crate::node::Node;

/// Deep structural equality across any two [`Node`] implementations.
///
/// Objects compare as unordered maps, arrays element-wise, numbers by value
/// (`1 == 1.0`).
pub fn node_equals<A: Node, B: Node>(a: &A, b: &B) -> bool {
    match (a.kind(), b.kind()) {
        (NodeKind::Null, NodeKind::Null) => true,
        (NodeKind::Boolean, NodeKind::Boolean) => a.as_bool() == b.as_bool(),
        (NodeKind::Number, NodeKind::Number) => a.as_number() == b.as_number(),
        (NodeKind::String, NodeKind::String) => a.as_str() == b.as_str(),
        (NodeKind::Array, NodeKind::Array) => {
            a.size_in_array() == b.size_in_array()
                && a.elements().zip(b.elements()).all(|(x, y)| node_equals(x, y))
        }
        (NodeKind::Object, NodeKind::Object) => {
            a.size_in_object() == b.size_in_object()
                && a.entries().all(|(key, x)| match b.get_in_object(key) {
                    Some(y) => node_equals(x, y),
                    None => false,
                })
        }
        _ => false,
    }
}
