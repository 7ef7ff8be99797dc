//! Single-location access and mutation.
//!
//! These operations accept only paths made of names, indices and a trailing
//! append marker. Failures carry the location they were raised at.
//!
//! Mutators resolve the parent of the addressed location and act on it.
//! On an object parent a non-negative index addresses the member named by
//! its decimal text, so `/a/0` works on `{"a": {"0": 1}}` as well as on
//! `{"a": [1]}`.

use std::mem;

use jsonkit_node::{FromNode, JsonError, Node, NodeKind, Result};

use crate::eval::resolve_index;
use crate::types::PathToken;
use crate::JsonPath;

/// On an object the append marker is the ordinary member `"-"`.
const DASH: &str = "-";

impl JsonPath {
    fn steps(&self) -> Result<&[PathToken]> {
        if !self.is_single_location() {
            return Err(JsonError::invalid_argument(format!(
                "'{self}' does not address a single location"
            )));
        }
        Ok(&self.tokens()[1..])
    }

    /// The node at this location.
    pub fn get<'a, N: Node>(&self, root: &'a N) -> Result<&'a N> {
        walk(root, self.steps()?)
    }

    pub fn get_mut<'a, N: Node>(&self, root: &'a mut N) -> Result<&'a mut N> {
        walk_mut(root, self.steps()?)
    }

    /// The node at this location, converted with [`FromNode`].
    pub fn get_as<T: FromNode, N: Node>(&self, root: &N) -> Result<T> {
        let steps = self.steps()?;
        let node = walk(root, steps)?;
        T::from_node(node).map_err(|err| with_trail(err, steps))
    }

    pub fn contains<N: Node>(&self, root: &N) -> bool {
        let Ok(steps) = self.steps() else {
            return false;
        };
        let Some((last, parents)) = steps.split_last() else {
            return true;
        };
        let Ok(parent) = walk(root, parents) else {
            return false;
        };
        match last {
            PathToken::Name(name) => parent.contains_in_object(name),
            PathToken::Index(index) if parent.is_array() => {
                resolve_index(*index, parent.size_in_array()).is_some()
            }
            PathToken::Index(index) => *index >= 0 && parent.contains_in_object(&index.to_string()),
            PathToken::Append => parent.is_object() && parent.contains_in_object(DASH),
            _ => false,
        }
    }

    pub fn has_non_null<N: Node>(&self, root: &N) -> bool {
        self.get(root).is_ok_and(|node| !node.is_null())
    }

    /// Inserts `value`. Object members are set (replacing any existing
    /// value); array positions shift later elements right, and the append
    /// marker pushes. Addressing the root replaces the whole document.
    pub fn add<N: Node>(&self, root: &mut N, value: N) -> Result<()> {
        let steps = self.steps()?;
        let Some((last, parents)) = steps.split_last() else {
            return replace_root(root, value).map(drop);
        };
        let parent = walk_mut(root, parents)?;
        add_at(parent, last, value).map_err(|err| with_trail(err, steps))
    }

    /// Overwrites an existing location and returns the previous value.
    pub fn replace<N: Node>(&self, root: &mut N, value: N) -> Result<N> {
        let steps = self.steps()?;
        let Some((last, parents)) = steps.split_last() else {
            return replace_root(root, value);
        };
        let parent = walk_mut(root, parents)?;
        replace_at(parent, last, value).map_err(|err| with_trail(err, steps))
    }

    /// Removes the location and returns what was there.
    ///
    /// A location that does not exist, including one whose parent is
    /// missing, is not an error and yields `None`.
    pub fn remove<N: Node>(&self, root: &mut N) -> Result<Option<N>> {
        let steps = self.steps()?;
        let Some((last, parents)) = steps.split_last() else {
            return Err(JsonError::invalid_argument("cannot remove the document root"));
        };
        if walk(&*root, parents).is_err() {
            return Ok(None);
        }
        let parent = walk_mut(root, parents)?;
        remove_at(parent, last).map_err(|err| with_trail(err, steps))
    }

    /// Sets the location, creating missing or null intermediate containers:
    /// an object when the next step is a name, an array otherwise.
    ///
    /// Returns the value that was replaced, if any.
    pub fn ensure_put<N: Node>(&self, root: &mut N, value: N) -> Result<Option<N>> {
        let steps = self.steps()?;
        let Some(last) = steps.last() else {
            return replace_root(root, value).map(Some);
        };
        let parent = ensure_parent(root, steps)?;
        put_at(parent, last, value).map_err(|err| with_trail(err, steps))
    }

    /// [`JsonPath::ensure_put`] unless a non-null value is already present.
    /// Returns whether a value was written.
    pub fn ensure_put_if_absent<N: Node>(&self, root: &mut N, value: N) -> Result<bool> {
        if self.has_non_null(root) {
            return Ok(false);
        }
        self.ensure_put(root, value)?;
        Ok(true)
    }
}

// ── Walking ────────────────────────────────────────────────────────────

fn within(err: JsonError, token: &PathToken) -> JsonError {
    match token.segment() {
        Some(segment) => err.within(segment),
        None => err,
    }
}

fn with_trail(err: JsonError, steps: &[PathToken]) -> JsonError {
    steps.iter().rev().fold(err, within)
}

fn walk<'a, N: Node>(node: &'a N, steps: &[PathToken]) -> Result<&'a N> {
    let Some((token, rest)) = steps.split_first() else {
        return Ok(node);
    };
    let next = child(node, token).map_err(|err| within(err, token))?;
    walk(next, rest).map_err(|err| within(err, token))
}

fn walk_mut<'a, N: Node>(node: &'a mut N, steps: &[PathToken]) -> Result<&'a mut N> {
    let Some((token, rest)) = steps.split_first() else {
        return Ok(node);
    };
    let next = child_mut(node, token).map_err(|err| within(err, token))?;
    walk_mut(next, rest).map_err(|err| within(err, token))
}

fn child<'a, N: Node>(node: &'a N, token: &PathToken) -> Result<&'a N> {
    match token {
        PathToken::Name(name) => {
            if !node.is_object() {
                return Err(JsonError::path_not_found(format!(
                    "expected object, found {}",
                    node.kind()
                )));
            }
            node.get_in_object(name)
                .ok_or_else(|| JsonError::path_not_found(format!("no member '{name}'")))
        }
        PathToken::Index(index) if node.is_array() => {
            let size = node.size_in_array();
            resolve_index(*index, size)
                .and_then(|i| node.get_in_array(i))
                .ok_or_else(|| {
                    JsonError::path_not_found(format!("index {index} outside array of size {size}"))
                })
        }
        PathToken::Index(index) if node.is_object() && *index >= 0 => {
            let key = index.to_string();
            node.get_in_object(&key)
                .ok_or_else(|| JsonError::path_not_found(format!("no member '{key}'")))
        }
        PathToken::Index(_) => Err(JsonError::path_not_found(format!(
            "expected array, found {}",
            node.kind()
        ))),
        PathToken::Append if node.is_object() => node
            .get_in_object(DASH)
            .ok_or_else(|| JsonError::path_not_found(format!("no member '{DASH}'"))),
        PathToken::Append => Err(JsonError::path_not_found(
            "'-' refers to the position after the last element",
        )),
        other => Err(JsonError::invalid_argument(format!(
            "'{other}' is not a single-location step"
        ))),
    }
}

fn child_mut<'a, N: Node>(node: &'a mut N, token: &PathToken) -> Result<&'a mut N> {
    // Resolve through the shared accessor first so a read-only tree reports
    // a missing location as missing rather than as not insertable.
    child(&*node, token)?;
    let kind = node.kind();
    let found = match token {
        PathToken::Name(name) => node.get_in_object_mut(name),
        PathToken::Index(index) if node.is_array() => {
            match resolve_index(*index, node.size_in_array()) {
                Some(i) => node.get_in_array_mut(i),
                None => None,
            }
        }
        PathToken::Index(index) => node.get_in_object_mut(&index.to_string()),
        PathToken::Append => node.get_in_object_mut(DASH),
        _ => None,
    };
    found.ok_or_else(|| JsonError::not_insertable(kind))
}

fn ensure_parent<'a, N: Node>(node: &'a mut N, steps: &[PathToken]) -> Result<&'a mut N> {
    let [token, next, ..] = steps else {
        return Ok(node);
    };
    let child = ensure_child(node, token, next).map_err(|err| within(err, token))?;
    ensure_parent(child, &steps[1..]).map_err(|err| within(err, token))
}

fn ensure_child<'a, N: Node>(
    node: &'a mut N,
    token: &PathToken,
    next: &PathToken,
) -> Result<&'a mut N> {
    let kind = node.kind();
    if !node.is_insertable() {
        return Err(JsonError::not_insertable(kind));
    }
    let container = || match next {
        PathToken::Name(_) => N::new_object(),
        _ => N::new_array(),
    };

    if node.is_array() {
        let size = node.size_in_array();
        let at = match token {
            PathToken::Index(index) => insert_position(*index, size)?,
            _ => return Err(JsonError::type_mismatch("object", kind.as_str())),
        };
        if at == size {
            node.add_in_array(container())?;
        } else if node.get_in_array(at).map_or(true, Node::is_null) {
            node.set_in_array(at, container())?;
        }
        return node
            .get_in_array_mut(at)
            .ok_or_else(|| JsonError::not_insertable(kind));
    }

    let key = object_key(token, kind)?;
    if node.get_in_object(&key).map_or(true, Node::is_null) {
        node.put_in_object(&key, container())?;
    }
    node.get_in_object_mut(&key)
        .ok_or_else(|| JsonError::not_insertable(kind))
}

// ── Final step ─────────────────────────────────────────────────────────

fn replace_root<N: Node>(root: &mut N, value: N) -> Result<N> {
    if !root.is_insertable() {
        return Err(JsonError::not_insertable(root.kind()));
    }
    Ok(mem::replace(root, value))
}

/// Member name for `token` on an object parent, or a type mismatch when the
/// parent cannot hold it.
fn object_key(token: &PathToken, kind: NodeKind) -> Result<String> {
    if kind != NodeKind::Object {
        return Err(JsonError::type_mismatch(
            if matches!(token, PathToken::Name(_)) {
                "object"
            } else {
                "array"
            },
            kind.as_str(),
        ));
    }
    match token {
        PathToken::Name(name) => Ok(name.clone()),
        PathToken::Index(index) if *index >= 0 => Ok(index.to_string()),
        PathToken::Append => Ok(DASH.to_string()),
        _ => Err(JsonError::type_mismatch("array", kind.as_str())),
    }
}

/// Position for inserting at `index` into an array of `size`; `size` itself
/// is allowed and appends.
fn insert_position(index: i64, size: usize) -> Result<usize> {
    if index < 0 {
        return resolve_index(index, size).ok_or_else(|| {
            JsonError::path_not_found(format!("index {index} outside array of size {size}"))
        });
    }
    let at = usize::try_from(index).unwrap_or(usize::MAX);
    if at > size {
        return Err(JsonError::index_out_of_range(at, size));
    }
    Ok(at)
}

fn add_at<N: Node>(parent: &mut N, token: &PathToken, value: N) -> Result<()> {
    if parent.is_array() {
        return match token {
            PathToken::Index(index) => {
                let at = insert_position(*index, parent.size_in_array())?;
                parent.insert_in_array(at, value)
            }
            PathToken::Append => parent.add_in_array(value),
            _ => Err(JsonError::type_mismatch("object", "array")),
        };
    }
    let key = object_key(token, parent.kind())?;
    parent.put_in_object(&key, value).map(drop)
}

fn put_at<N: Node>(parent: &mut N, token: &PathToken, value: N) -> Result<Option<N>> {
    if parent.is_array() {
        let size = parent.size_in_array();
        let at = match token {
            PathToken::Index(index) => insert_position(*index, size)?,
            PathToken::Append => size,
            _ => return Err(JsonError::type_mismatch("object", "array")),
        };
        if at == size {
            return parent.add_in_array(value).map(|_| None);
        }
        return parent.set_in_array(at, value).map(Some);
    }
    let key = object_key(token, parent.kind())?;
    parent.put_in_object(&key, value)
}

fn replace_at<N: Node>(parent: &mut N, token: &PathToken, value: N) -> Result<N> {
    // The location must already exist.
    child(&*parent, token)?;
    match token {
        PathToken::Index(index) if parent.is_array() => {
            match resolve_index(*index, parent.size_in_array()) {
                Some(at) => parent.set_in_array(at, value),
                None => Err(JsonError::path_not_found(format!("index {index}"))),
            }
        }
        _ => {
            let key = object_key(token, parent.kind())?;
            parent
                .put_in_object(&key, value)
                .map(|old| old.unwrap_or_else(N::null))
        }
    }
}

fn remove_at<N: Node>(parent: &mut N, token: &PathToken) -> Result<Option<N>> {
    match token {
        PathToken::Index(index) if parent.is_array() => {
            match resolve_index(*index, parent.size_in_array()) {
                Some(at) => parent.remove_in_array(at).map(Some),
                None => Ok(None),
            }
        }
        PathToken::Name(name) if parent.is_object() => parent.remove_in_object(name),
        PathToken::Index(index) if parent.is_object() && *index >= 0 => {
            parent.remove_in_object(&index.to_string())
        }
        PathToken::Append if parent.is_object() => parent.remove_in_object(DASH),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonkit_node::{ErrorKind, FrozenNode, JsonValue};
    use serde_json::json;

    fn path(expr: &str) -> JsonPath {
        JsonPath::compile(expr).unwrap()
    }

    fn value(v: serde_json::Value) -> JsonValue {
        JsonValue::from(v)
    }

    #[test]
    fn get_reports_the_failing_location() {
        let doc = json!({"a": {"b": [1, {"c": 2}]}});
        assert_eq!(path("$.a.b[1].c").get(&doc).unwrap(), &json!(2));
        assert_eq!(path("/a/b/-1").get(&doc).unwrap_or(&json!(null)), &json!(null));
        assert_eq!(path("$.a.b[-1].c").get(&doc).unwrap(), &json!(2));

        let err = path("$.a.b[1].d").get(&doc).unwrap_err();
        assert!(err.is_path_not_found());
        assert_eq!(err.path(), "$.a.b[1].d");
        assert_eq!(
            err.to_string(),
            "path not found: no member 'd' at $.a.b[1].d"
        );

        let err = path("$.a.b[5]").get(&doc).unwrap_err();
        assert_eq!(err.path(), "$.a.b[5]");
    }

    #[test]
    fn multi_location_paths_are_rejected() {
        let doc = json!({"a": [1]});
        let err = path("$.a[*]").get(&doc).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidArgument(_)));
        assert!(!path("$..a").contains(&doc));
    }

    #[test]
    fn index_on_object_uses_the_decimal_key() {
        let doc = json!({"m": {"0": "zero"}});
        assert_eq!(path("/m/0").get(&doc).unwrap(), &json!("zero"));
        assert!(path("/m/0").contains(&doc));
        assert!(path("$.m[-1]").get(&doc).is_err());
    }

    #[test]
    fn dash_on_object_is_a_member_name() {
        let dash = path("/-");
        let mut doc = value(json!({"-": 1, "k": 0}));
        assert!(dash.contains(&doc));
        assert_eq!(dash.get(&doc).unwrap(), &JsonValue::from(1));
        let old = dash.replace(&mut doc, JsonValue::from(2)).unwrap();
        assert_eq!(old, JsonValue::from(1));
        *dash.get_mut(&mut doc).unwrap() = JsonValue::from(3);
        assert_eq!(dash.remove(&mut doc).unwrap(), Some(JsonValue::from(3)));
        assert!(!dash.contains(&doc));
        assert!(dash.get(&doc).unwrap_err().is_path_not_found());
        assert!(dash.replace(&mut doc, JsonValue::Null).unwrap_err().is_path_not_found());
        assert_eq!(dash.remove(&mut doc).unwrap(), None);
        assert_eq!(doc, value(json!({"k": 0})));

        let frozen = FrozenNode::from(value(json!({"a": {"-": [true]}})));
        assert!(path("/a/-").has_non_null(&frozen));
    }

    #[test]
    fn add_inserts_and_appends() {
        let mut doc = value(json!({"list": [1, 3], "obj": {}}));
        path("/list/1").add(&mut doc, JsonValue::from(2)).unwrap();
        path("/list/-").add(&mut doc, JsonValue::from(4)).unwrap();
        path("/list/4").add(&mut doc, JsonValue::from(5)).unwrap();
        path("$.list[-1]").add(&mut doc, JsonValue::from(4.5)).unwrap();
        path("/obj/k").add(&mut doc, JsonValue::from("v")).unwrap();
        assert_eq!(doc, value(json!({"list": [1, 2, 3, 4, 4.5, 5], "obj": {"k": "v"}})));

        let err = path("/list/9").add(&mut doc, JsonValue::Null).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::IndexOutOfRange { index: 9, size: 6 });
        assert_eq!(err.path(), "$.list[9]");

        let err = path("/nope/x").add(&mut doc, JsonValue::Null).unwrap_err();
        assert!(err.is_path_not_found());

        path("").add(&mut doc, JsonValue::from(1)).unwrap();
        assert_eq!(doc, JsonValue::from(1));
    }

    #[test]
    fn replace_requires_an_existing_location() {
        let mut doc = value(json!({"a": [1, 2], "b": null}));
        let old = path("/a/0").replace(&mut doc, JsonValue::from(9)).unwrap();
        assert_eq!(old, JsonValue::from(1));
        let old = path("/b").replace(&mut doc, JsonValue::from(true)).unwrap();
        assert_eq!(old, JsonValue::Null);
        assert!(path("/c").replace(&mut doc, JsonValue::Null).unwrap_err().is_path_not_found());
        assert!(path("/a/2").replace(&mut doc, JsonValue::Null).unwrap_err().is_path_not_found());
        assert!(path("/a/-").replace(&mut doc, JsonValue::Null).unwrap_err().is_path_not_found());
        assert_eq!(doc, value(json!({"a": [9, 2], "b": true})));
    }

    #[test]
    fn remove_tolerates_missing_locations() {
        let mut doc = value(json!({"a": {"b": 1}, "l": [1, 2, 3]}));
        assert_eq!(path("/a/b").remove(&mut doc).unwrap(), Some(JsonValue::from(1)));
        assert_eq!(path("/a/b").remove(&mut doc).unwrap(), None);
        assert_eq!(path("/x/y/z").remove(&mut doc).unwrap(), None);
        assert_eq!(path("$.l[-1]").remove(&mut doc).unwrap(), Some(JsonValue::from(3)));
        assert_eq!(path("/l/7").remove(&mut doc).unwrap(), None);
        assert_eq!(doc, value(json!({"a": {}, "l": [1, 2]})));
        assert!(path("").remove(&mut doc).is_err());
    }

    #[test]
    fn ensure_put_builds_containers() {
        let mut doc = value(json!({"a": null}));
        path("/a/b/0/c").ensure_put(&mut doc, JsonValue::from(1)).unwrap();
        assert_eq!(doc, value(json!({"a": {"b": [{"c": 1}]}})));

        let old = path("/a/b/0/c").ensure_put(&mut doc, JsonValue::from(2)).unwrap();
        assert_eq!(old, Some(JsonValue::from(1)));
        path("/a/b/1").ensure_put(&mut doc, JsonValue::from("x")).unwrap();
        assert_eq!(doc, value(json!({"a": {"b": [{"c": 2}, "x"]}})));

        let err = path("/a/b/5/c").ensure_put(&mut doc, JsonValue::Null).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::IndexOutOfRange { index: 5, size: 2 });
        assert_eq!(err.path(), "$.a.b[5]");

        let err = path("/a/b/1/c").ensure_put(&mut doc, JsonValue::Null).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::TypeMismatch { .. }));
    }

    #[test]
    fn ensure_put_if_absent_keeps_values() {
        let mut doc = value(json!({"a": 1, "b": null}));
        assert!(!path("/a").ensure_put_if_absent(&mut doc, JsonValue::from(2)).unwrap());
        assert!(path("/b").ensure_put_if_absent(&mut doc, JsonValue::from(2)).unwrap());
        assert!(path("/c/d").ensure_put_if_absent(&mut doc, JsonValue::from(3)).unwrap());
        assert_eq!(doc, value(json!({"a": 1, "b": 2, "c": {"d": 3}})));
    }

    #[test]
    fn presence_checks() {
        let doc = json!({"a": null, "l": [0]});
        assert!(path("/a").contains(&doc));
        assert!(!path("/a").has_non_null(&doc));
        assert!(path("/l/0").has_non_null(&doc));
        assert!(!path("/l/-").contains(&doc));
        assert!(path("").contains(&doc));
        assert!(!path("/b/c").contains(&doc));
    }

    #[test]
    fn typed_get() {
        let doc = json!({"n": 42, "s": "x"});
        assert_eq!(path("/n").get_as::<u8, _>(&doc).unwrap(), 42);
        let err = path("/s").get_as::<i64, _>(&doc).unwrap_err();
        assert_eq!(err.path(), "$.s");
    }

    #[test]
    fn read_only_trees_refuse_writes() {
        let mut doc = FrozenNode::from(value(json!({"a": {"b": 1}})));
        let err = path("/a/b").add(&mut doc, FrozenNode::null()).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::NotInsertable(_)));
        assert_eq!(path("/a/zz/q").remove(&mut doc).unwrap(), None);
        assert!(path("/a/b").remove(&mut doc).is_err());
        assert_eq!(path("/a/b").get(&doc).unwrap().as_number(), Some(1.into()));
    }
}
