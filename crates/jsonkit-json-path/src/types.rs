//! Compiled path representation.

use std::fmt;

use jsonkit_node::{JsonValue, PathSegment};
use regex::Regex;

/// One step of a compiled path.
#[derive(Debug, Clone, PartialEq)]
pub enum PathToken {
    /// `$`, the document root.
    Root,
    /// `@`, the node under test inside a filter.
    Current,
    Name(String),
    /// Array position; negative values count from the end.
    Index(i64),
    Wildcard,
    /// `..`, applies the next token at every depth.
    Descendant,
    Slice(Slice),
    /// Bracket list of names, indices and slices.
    Union(Vec<PathToken>),
    /// Trailing function call, e.g. `.length()`.
    Function {
        name: String,
        args: Vec<JsonValue>,
    },
    Filter(FilterExpr),
    /// One past the last array element (`-` in pointers, `[-]` in paths).
    Append,
}

impl PathToken {
    /// The error-trail segment for a single-location step.
    pub(crate) fn segment(&self) -> Option<PathSegment> {
        match self {
            PathToken::Name(name) => Some(PathSegment::Key(name.clone())),
            PathToken::Index(index) => Some(PathSegment::Index(*index)),
            PathToken::Append => Some(PathSegment::Key("-".to_string())),
            _ => None,
        }
    }
}

/// Python-style slice bounds. `step` is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub step: i64,
}

impl Slice {
    pub fn new(start: Option<i64>, end: Option<i64>, step: i64) -> Self {
        Self { start, end, step }
    }

    /// Positions selected from an array of `len` elements, in selection order.
    ///
    /// Bounds are clamped the way Python clamps them, so a slice never fails.
    pub fn indices(&self, len: usize) -> Vec<usize> {
        let len = i64::try_from(len).unwrap_or(i64::MAX);
        let normalize = |bound: i64| if bound < 0 { bound + len } else { bound };
        let mut out = Vec::new();
        if self.step > 0 {
            let start = self.start.map_or(0, normalize).clamp(0, len);
            let end = self.end.map_or(len, normalize).clamp(0, len);
            let mut i = start;
            while i < end {
                out.push(i as usize);
                i = i.saturating_add(self.step);
            }
        } else if self.step < 0 {
            let start = self.start.map_or(len - 1, normalize).clamp(-1, len - 1);
            let end = self.end.map_or(-1, normalize).clamp(-1, len - 1);
            let mut i = start;
            while i > end {
                out.push(i as usize);
                i = i.saturating_add(self.step);
            }
        }
        out
    }
}

/// Comparison operators available in filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn as_str(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

/// A `/pattern/flags` literal, compiled once at parse time.
#[derive(Clone)]
pub struct RegexLiteral {
    pattern: String,
    flags: String,
    regex: Regex,
}

impl RegexLiteral {
    pub(crate) fn new(pattern: String, flags: String, regex: Regex) -> Self {
        Self {
            pattern,
            flags,
            regex,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn flags(&self) -> &str {
        &self.flags
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl PartialEq for RegexLiteral {
    fn eq(&self, other: &Self) -> bool {
        self.pattern == other.pattern && self.flags == other.flags
    }
}

impl fmt::Debug for RegexLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}/{}", self.pattern, self.flags)
    }
}

/// Filter predicate tree.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    Or(Box<FilterExpr>, Box<FilterExpr>),
    And(Box<FilterExpr>, Box<FilterExpr>),
    Not(Box<FilterExpr>),
    /// Parenthesized sub-expression, kept so the expression prints back as written.
    Group(Box<FilterExpr>),
    Compare {
        op: CompareOp,
        left: Operand,
        right: Operand,
    },
    Match {
        left: Operand,
        regex: RegexLiteral,
    },
    /// Bare operand, tested for truthiness.
    Truthy(Operand),
}

/// A value inside a filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(JsonValue),
    /// Relative (`@...`) or absolute (`$...`) path.
    Path(crate::JsonPath),
    Call { name: String, args: Vec<Operand> },
}
