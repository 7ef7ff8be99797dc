use std::sync::Arc;

use jsonkit_json_pointer::escape_component;
use jsonkit_node::{JsonError, Result};

use crate::cache::PATH_CACHE;
use crate::parser::{compile_pointer, JsonPathParser};
use crate::types::PathToken;

/// An immutable, compiled path expression.
///
/// Always starts with [`PathToken::Root`] or [`PathToken::Current`]. A
/// function token can only be last, and so can [`PathToken::Append`].
#[derive(Debug, Clone, PartialEq)]
pub struct JsonPath {
    tokens: Vec<PathToken>,
}

impl JsonPath {
    /// Compiles either dialect: `$`/`@` starts a JSONPath, anything else
    /// (including the empty string) is read as a JSON Pointer.
    pub fn compile(expr: &str) -> Result<JsonPath> {
        match expr.chars().next() {
            Some('$') | Some('@') => JsonPathParser::parse(expr),
            _ => compile_pointer(expr),
        }
    }

    /// Compiles JSONPath text only.
    pub fn compile_path(expr: &str) -> Result<JsonPath> {
        JsonPathParser::parse(expr)
    }

    /// Compiles JSON Pointer text only.
    pub fn compile_pointer(expr: &str) -> Result<JsonPath> {
        compile_pointer(expr)
    }

    /// [`JsonPath::compile`] through the process-wide cache.
    pub fn cached(expr: &str) -> Result<Arc<JsonPath>> {
        PATH_CACHE.get_or_compile(expr)
    }

    /// The document root, `$`.
    pub fn root() -> JsonPath {
        JsonPath {
            tokens: vec![PathToken::Root],
        }
    }

    /// Builds a path from tokens, enforcing the same placement rules as the
    /// parser.
    pub fn from_tokens(tokens: Vec<PathToken>) -> Result<JsonPath> {
        match tokens.first() {
            Some(PathToken::Root) | Some(PathToken::Current) => {}
            _ => {
                return Err(JsonError::invalid_argument(
                    "a path must start with the root or current token",
                ))
            }
        }
        let last = tokens.len() - 1;
        for (i, token) in tokens.iter().enumerate().skip(1) {
            match token {
                PathToken::Root | PathToken::Current => {
                    return Err(JsonError::invalid_argument(
                        "root and current tokens may only lead a path",
                    ))
                }
                PathToken::Function { .. } | PathToken::Append if i != last => {
                    return Err(JsonError::invalid_argument(format!(
                        "token at position {i} must be the last one"
                    )))
                }
                PathToken::Descendant if i == last => {
                    return Err(JsonError::invalid_argument("a path cannot end with '..'"))
                }
                _ => {}
            }
        }
        Ok(JsonPath { tokens })
    }

    pub(crate) fn from_tokens_unchecked(tokens: Vec<PathToken>) -> JsonPath {
        JsonPath { tokens }
    }

    /// Returns a copy of this path extended by a member name.
    pub fn with_name(&self, name: impl Into<String>) -> JsonPath {
        self.with_token(PathToken::Name(name.into()))
    }

    /// Returns a copy of this path extended by an array position.
    pub fn with_index(&self, index: usize) -> JsonPath {
        self.with_token(PathToken::Index(i64::try_from(index).unwrap_or(i64::MAX)))
    }

    /// Returns a copy of this path extended by the append marker.
    pub fn with_append(&self) -> JsonPath {
        self.with_token(PathToken::Append)
    }

    fn with_token(&self, token: PathToken) -> JsonPath {
        let mut tokens = self.tokens.clone();
        tokens.push(token);
        JsonPath { tokens }
    }

    pub fn tokens(&self) -> &[PathToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Whether this is just `$` (or `@`).
    pub fn is_root(&self) -> bool {
        self.tokens.len() == 1
    }

    pub fn last(&self) -> Option<&PathToken> {
        self.tokens.last()
    }

    /// The path without its last token, or `None` for the root.
    pub fn parent(&self) -> Option<JsonPath> {
        if self.is_root() {
            return None;
        }
        Some(JsonPath {
            tokens: self.tokens[..self.tokens.len() - 1].to_vec(),
        })
    }

    /// Whether `self` addresses a location strictly inside `other`.
    pub fn is_descendant_of(&self, other: &JsonPath) -> bool {
        self.tokens.len() > other.tokens.len()
            && self.tokens[1..other.tokens.len()] == other.tokens[1..]
    }

    /// True when every step after the head is a name, an index, or a
    /// trailing append marker, so the path names at most one location.
    pub fn is_single_location(&self) -> bool {
        self.tokens.iter().skip(1).all(|token| {
            matches!(
                token,
                PathToken::Name(_) | PathToken::Index(_) | PathToken::Append
            )
        })
    }

    /// Renders a single-location path as JSON Pointer text.
    pub fn to_pointer(&self) -> Result<String> {
        let mut out = String::new();
        for token in self.tokens.iter().skip(1) {
            out.push('/');
            match token {
                PathToken::Name(name) => out.push_str(&escape_component(name)),
                PathToken::Index(index) if *index >= 0 => out.push_str(&index.to_string()),
                PathToken::Append => out.push('-'),
                _ => {
                    return Err(JsonError::invalid_argument(format!(
                        "'{self}' has no JSON Pointer form"
                    )))
                }
            }
        }
        Ok(out)
    }
}

impl std::str::FromStr for JsonPath {
    type Err = JsonError;

    fn from_str(expr: &str) -> Result<Self> {
        JsonPath::compile(expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialect_dispatch() {
        let a = JsonPath::compile("$.a[0]").unwrap();
        let b = JsonPath::compile("/a/0").unwrap();
        assert_eq!(a, b);
        assert!(JsonPath::compile("").unwrap().is_root());
        assert!(JsonPath::compile("/").unwrap().is_root());
    }

    #[test]
    fn builders_and_parent() {
        let path = JsonPath::root().with_name("a").with_index(2);
        assert_eq!(path.to_string(), "$.a[2]");
        assert_eq!(path.parent().unwrap().to_string(), "$.a");
        assert!(JsonPath::root().parent().is_none());
        assert!(path.is_descendant_of(&JsonPath::root().with_name("a")));
        assert!(!path.is_descendant_of(&path));
    }

    #[test]
    fn pointer_form() {
        let path = JsonPath::compile("$['a/b'][3][-]").unwrap();
        assert_eq!(path.to_pointer().unwrap(), "/a~1b/3/-");
        assert!(JsonPath::compile("$.a[-1]").unwrap().to_pointer().is_err());
        assert!(JsonPath::compile("$..a").unwrap().to_pointer().is_err());
    }

    #[test]
    fn token_placement() {
        assert!(JsonPath::from_tokens(vec![]).is_err());
        assert!(JsonPath::from_tokens(vec![PathToken::Name("a".into())]).is_err());
        assert!(JsonPath::from_tokens(vec![
            PathToken::Root,
            PathToken::Append,
            PathToken::Name("a".into()),
        ])
        .is_err());
        assert!(JsonPath::from_tokens(vec![PathToken::Root, PathToken::Descendant]).is_err());
    }
}
