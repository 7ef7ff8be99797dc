//! Multi-match evaluation: `find_all`, `find_one` and `eval`.

use jsonkit_node::{ErrorKind, JsonError, JsonValue, Node, Result};
use tracing::debug;

use crate::function::PathFunctionRegistry;
use crate::types::*;
use crate::JsonPath;

/// Stateless evaluator over any [`Node`] tree.
pub struct JsonPathEval;

impl JsonPathEval {
    /// Every node the path selects, in document order.
    ///
    /// A trailing function token is not applied; see [`JsonPathEval::eval`].
    pub fn find_all<'a, N: Node>(path: &JsonPath, root: &'a N) -> Vec<&'a N> {
        Self::find_from(path, root, root)
    }

    /// At most one match; more than one is an [`ErrorKind::AmbiguousMatch`].
    pub fn find_one<'a, N: Node>(path: &JsonPath, root: &'a N) -> Result<Option<&'a N>> {
        let mut matches = Self::find_all(path, root);
        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            n => Err(JsonError::new(ErrorKind::AmbiguousMatch(n))),
        }
    }

    /// Evaluates to a single value.
    ///
    /// With a trailing function, the function is called on the single match
    /// (or on an array of all matches, possibly empty). Without one, no
    /// match gives `None`, one match gives its value and several give an
    /// array of their values.
    pub fn eval<N: Node>(path: &JsonPath, root: &N) -> Result<Option<JsonValue>> {
        Self::eval_from(path, root, root)
    }

    fn eval_from<N: Node>(path: &JsonPath, root: &N, current: &N) -> Result<Option<JsonValue>> {
        let matches = Self::find_from(path, root, current);
        if let Some(PathToken::Function { name, args }) = path.last() {
            let mut call_args = Vec::with_capacity(args.len() + 1);
            call_args.push(collapse(&matches).unwrap_or_else(|| JsonValue::Array(Default::default())));
            call_args.extend(args.iter().cloned());
            return PathFunctionRegistry::invoke(name, &call_args).map(Some);
        }
        Ok(collapse(&matches))
    }

    fn find_from<'a, N: Node>(path: &JsonPath, root: &'a N, current: &'a N) -> Vec<&'a N> {
        let tokens = path.tokens();
        let start = match tokens.first() {
            Some(PathToken::Current) => current,
            _ => root,
        };
        let mut results = vec![start];
        let mut i = 1;

        while i < tokens.len() {
            let mut next = Vec::new();
            match &tokens[i] {
                PathToken::Descendant => {
                    i += 1;
                    let Some(selector) = tokens.get(i) else {
                        break;
                    };
                    for node in &results {
                        Self::select_recursive(*node, selector, root, &mut next);
                    }
                }
                PathToken::Function { .. } => break,
                token => {
                    for node in &results {
                        Self::select(*node, token, root, &mut next);
                    }
                }
            }
            results = next;
            if results.is_empty() {
                break;
            }
            i += 1;
        }

        results
    }

    fn select<'a, N: Node>(node: &'a N, token: &PathToken, root: &'a N, out: &mut Vec<&'a N>) {
        match token {
            PathToken::Name(name) => out.extend(node.get_in_object(name)),
            PathToken::Index(index) => {
                let found = resolve_index(*index, node.size_in_array()).and_then(|i| node.get_in_array(i));
                out.extend(found);
            }
            PathToken::Wildcard => out.extend(children(node)),
            PathToken::Slice(slice) => {
                for i in slice.indices(node.size_in_array()) {
                    out.extend(node.get_in_array(i));
                }
            }
            PathToken::Union(members) => {
                for member in members {
                    Self::select(node, member, root, out);
                }
            }
            PathToken::Filter(expr) => {
                for child in children(node) {
                    if Self::test(expr, root, child) {
                        out.push(child);
                    }
                }
            }
            PathToken::Append => out.extend(node.get_in_object("-")),
            PathToken::Root
            | PathToken::Current
            | PathToken::Descendant
            | PathToken::Function { .. } => {}
        }
    }

    // Pre-order: a node's own matches come before those of its descendants.
    fn select_recursive<'a, N: Node>(
        node: &'a N,
        selector: &PathToken,
        root: &'a N,
        out: &mut Vec<&'a N>,
    ) {
        Self::select(node, selector, root, out);
        for child in children(node) {
            Self::select_recursive(child, selector, root, out);
        }
    }

    // ── Filters ────────────────────────────────────────────────────────

    fn test<N: Node>(expr: &FilterExpr, root: &N, current: &N) -> bool {
        match expr {
            FilterExpr::Or(left, right) => {
                Self::test(left, root, current) || Self::test(right, root, current)
            }
            FilterExpr::And(left, right) => {
                Self::test(left, root, current) && Self::test(right, root, current)
            }
            FilterExpr::Not(inner) => !Self::test(inner, root, current),
            FilterExpr::Group(inner) => Self::test(inner, root, current),
            FilterExpr::Compare { op, left, right } => {
                let left = Self::operand(left, root, current);
                let right = Self::operand(right, root, current);
                compare(*op, left.as_ref(), right.as_ref())
            }
            FilterExpr::Match { left, regex } => Self::operand(left, root, current)
                .as_ref()
                .and_then(JsonValue::as_str)
                .is_some_and(|text| regex.is_match(text)),
            FilterExpr::Truthy(operand) => Self::operand(operand, root, current)
                .as_ref()
                .is_some_and(truthy),
        }
    }

    /// Value of a filter operand; `None` when a path selects nothing or a
    /// function call fails.
    fn operand<N: Node>(operand: &Operand, root: &N, current: &N) -> Option<JsonValue> {
        let result = match operand {
            Operand::Literal(value) => return Some(value.clone()),
            Operand::Path(path) => Self::eval_from(path, root, current),
            Operand::Call { name, args } => {
                let values: Vec<JsonValue> = args
                    .iter()
                    .map(|arg| Self::operand(arg, root, current).unwrap_or_default())
                    .collect();
                PathFunctionRegistry::invoke(name, &values).map(Some)
            }
        };
        result.unwrap_or_else(|err| {
            debug!(%err, "filter operand evaluated as absent");
            None
        })
    }
}

impl JsonPath {
    /// See [`JsonPathEval::find_all`].
    pub fn find_all<'a, N: Node>(&self, root: &'a N) -> Vec<&'a N> {
        JsonPathEval::find_all(self, root)
    }

    /// See [`JsonPathEval::find_one`].
    pub fn find_one<'a, N: Node>(&self, root: &'a N) -> Result<Option<&'a N>> {
        JsonPathEval::find_one(self, root)
    }

    /// See [`JsonPathEval::eval`].
    pub fn eval<N: Node>(&self, root: &N) -> Result<Option<JsonValue>> {
        JsonPathEval::eval(self, root)
    }
}

/// Resolves a possibly negative index against `size`.
pub(crate) fn resolve_index(index: i64, size: usize) -> Option<usize> {
    let resolved = if index < 0 {
        i64::try_from(size).ok()?.checked_add(index)?
    } else {
        index
    };
    usize::try_from(resolved).ok().filter(|&i| i < size)
}

fn children<'a, N: Node>(node: &'a N) -> Box<dyn Iterator<Item = &'a N> + 'a> {
    if node.is_object() {
        Box::new(node.entries().map(|(_, value)| value))
    } else if node.is_array() {
        node.elements()
    } else {
        Box::new(std::iter::empty())
    }
}

fn collapse<N: Node>(matches: &[&N]) -> Option<JsonValue> {
    match matches {
        [] => None,
        [single] => Some(single.to_value()),
        many => Some(JsonValue::Array(many.iter().map(|n| n.to_value()).collect())),
    }
}

fn truthy(value: &JsonValue) -> bool {
    match value {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => !n.is_zero(),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(items) => !items.is_empty(),
        JsonValue::Object(_) => true,
    }
}

fn compare(op: CompareOp, left: Option<&JsonValue>, right: Option<&JsonValue>) -> bool {
    let null = JsonValue::Null;
    let (left, right) = (left.unwrap_or(&null), right.unwrap_or(&null));
    let ordering = match (left, right) {
        (JsonValue::Number(a), JsonValue::Number(b)) => a.partial_cmp(b),
        (JsonValue::String(a), JsonValue::String(b)) => Some(a.cmp(b)),
        _ => None,
    };
    match op {
        CompareOp::Eq => left == right,
        CompareOp::Ne => left != right,
        CompareOp::Lt => ordering.is_some_and(|o| o.is_lt()),
        CompareOp::Le => ordering.is_some_and(|o| o.is_le()),
        CompareOp::Gt => ordering.is_some_and(|o| o.is_gt()),
        CompareOp::Ge => ordering.is_some_and(|o| o.is_ge()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> serde_json::Value {
        json!({
            "store": {
                "book": [
                    {"category": "reference", "author": "Rees", "title": "Sayings", "price": 8.95},
                    {"category": "fiction", "author": "Waugh", "title": "Sword", "price": 12.99},
                    {"category": "fiction", "author": "Melville", "title": "Moby Dick", "isbn": "0-553", "price": 8.99},
                    {"category": "fiction", "author": "Tolkien", "title": "Rings", "isbn": "0-395", "price": 22.99}
                ],
                "bicycle": {"color": "red", "price": 19.95}
            }
        })
    }

    fn find(expr: &str, doc: &serde_json::Value) -> Vec<serde_json::Value> {
        JsonPath::compile(expr)
            .unwrap()
            .find_all(doc)
            .into_iter()
            .cloned()
            .collect()
    }

    #[test]
    fn members_and_indices() {
        let doc = store();
        assert_eq!(find("$.store.book[0].author", &doc), vec![json!("Rees")]);
        assert_eq!(find("$.store.book[-1].author", &doc), vec![json!("Tolkien")]);
        assert_eq!(find("$.store.book[9]", &doc), Vec::<serde_json::Value>::new());
        assert_eq!(find("$.store.missing.x", &doc), Vec::<serde_json::Value>::new());
        assert_eq!(find("/store/bicycle/color", &doc), vec![json!("red")]);
    }

    #[test]
    fn wildcards_slices_unions() {
        let doc = store();
        assert_eq!(find("$.store.book[*].author", &doc).len(), 4);
        assert_eq!(
            find("$.store.book[1:3].author", &doc),
            vec![json!("Waugh"), json!("Melville")]
        );
        assert_eq!(
            find("$.store.book[::-2].author", &doc),
            vec![json!("Tolkien"), json!("Waugh")]
        );
        assert_eq!(
            find("$.store.book[0,-1].author", &doc),
            vec![json!("Rees"), json!("Tolkien")]
        );
        assert_eq!(
            find("$.store.bicycle['color','price']", &doc),
            vec![json!("red"), json!(19.95)]
        );
    }

    #[test]
    fn descendants_are_pre_order() {
        let doc = json!({"name": "a", "kids": [{"name": "b", "kids": [{"name": "c"}]}, {"name": "d"}]});
        assert_eq!(
            find("$..name", &doc),
            vec![json!("a"), json!("b"), json!("c"), json!("d")]
        );
        assert_eq!(find("$.store..price", &store()).len(), 5);
    }

    #[test]
    fn filters() {
        let doc = store();
        assert_eq!(
            find("$.store.book[?(@.price < 10)].title", &doc),
            vec![json!("Sayings"), json!("Moby Dick")]
        );
        assert_eq!(find("$.store.book[?@.isbn].title", &doc).len(), 2);
        assert_eq!(find("$.store.book[?!@.isbn].title", &doc).len(), 2);
        assert_eq!(
            find("$.store.book[?@.author =~ /^m/i].title", &doc),
            vec![json!("Moby Dick")]
        );
        assert_eq!(
            find("$.store.book[?@.category == 'fiction' && @.price > 20].author", &doc),
            vec![json!("Tolkien")]
        );
        assert_eq!(
            find("$.store.book[?@.price > $.store.bicycle.price].author", &doc),
            vec![json!("Tolkien")]
        );
        assert_eq!(
            find("$.store.book[?length(@.title) == 5].title", &doc),
            vec![json!("Sword"), json!("Rings")]
        );
        assert_eq!(find("$.store.book[?nope(@)].title", &doc).len(), 0);
    }

    #[test]
    fn find_one_and_eval() {
        let doc = store();
        let one = JsonPath::compile("$.store.bicycle.color").unwrap();
        assert_eq!(one.find_one(&doc).unwrap(), Some(&json!("red")));
        let many = JsonPath::compile("$.store.book[*]").unwrap();
        assert_eq!(
            many.find_one(&doc).unwrap_err().kind(),
            &ErrorKind::AmbiguousMatch(4)
        );

        let eval = |expr: &str| JsonPath::compile(expr).unwrap().eval(&doc).unwrap();
        assert_eq!(eval("$.store.book.length()"), Some(JsonValue::from(4)));
        assert_eq!(eval("$.store.book[*].price.max()"), Some(JsonValue::from(22.99)));
        assert_eq!(eval("$.store.book[*].author.index(-1)"), Some(JsonValue::from("Tolkien")));
        assert_eq!(eval("$.store.nothing.count()"), Some(JsonValue::from(0)));
        assert_eq!(eval("$.store.nothing"), None);
        assert_eq!(eval("$.store.bicycle.color"), Some(JsonValue::from("red")));
        assert!(JsonPath::compile("$.a.nope()").unwrap().eval(&doc).is_err());
    }

    #[test]
    fn truthiness() {
        assert!(!truthy(&JsonValue::Null));
        assert!(!truthy(&JsonValue::from(0)));
        assert!(!truthy(&JsonValue::from("")));
        assert!(!truthy(&JsonValue::Array(Default::default())));
        assert!(truthy(&JsonValue::Object(Default::default())));
        assert!(truthy(&JsonValue::from(-0.5)));
    }

    #[test]
    fn negative_index_resolution() {
        assert_eq!(resolve_index(-1, 3), Some(2));
        assert_eq!(resolve_index(-3, 3), Some(0));
        assert_eq!(resolve_index(-4, 3), None);
        assert_eq!(resolve_index(3, 3), None);
    }
}
