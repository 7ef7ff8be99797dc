//! Error type shared by every jsonkit crate.
//!
//! Failures raised while walking a tree record the segment of every level
//! they unwind through (see [`JsonError::within`]), so the rendered message
//! names the full location back to the root, e.g.
//! `path not found: key 'c' at $.a.b[1].c`.

use thiserror::Error;

use crate::kind::NodeKind;
use crate::segment::PathSegment;
use crate::value::JsonValue;

pub type Result<T> = std::result::Result<T, JsonError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ErrorKind {
    #[error("malformed expression at position {position} near '{fragment}': {message}")]
    Malformed {
        message: String,
        fragment: String,
        position: usize,
    },
    #[error("path not found: {0}")]
    PathNotFound(String),
    #[error("cannot mutate read-only {0} node")]
    NotInsertable(NodeKind),
    #[error("index {index} out of range for size {size}")]
    IndexOutOfRange { index: usize, size: usize },
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("test failed: expected {expected}, found {actual}")]
    TestFailed {
        expected: JsonValue,
        actual: JsonValue,
    },
    #[error("unknown patch operation '{0}'")]
    UnknownOp(String),
    #[error("unknown path function '{0}'")]
    UnknownFunction(String),
    #[error("expected at most one match, found {0}")]
    AmbiguousMatch(usize),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("operation #{index} ({op}) failed: {source}")]
    PatchOpFailed {
        index: usize,
        op: String,
        #[source]
        source: Box<JsonError>,
    },
}

/// An [`ErrorKind`] plus the location it was raised at.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{}{}", .kind, trail_suffix(.trail))]
pub struct JsonError {
    kind: ErrorKind,
    // Innermost segment first.
    trail: Vec<PathSegment>,
}

fn trail_suffix(trail: &[PathSegment]) -> String {
    if trail.is_empty() {
        return String::new();
    }
    let mut out = String::from(" at $");
    for segment in trail.iter().rev() {
        out.push_str(&segment.to_string());
    }
    out
}

impl JsonError {
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            trail: Vec::new(),
        }
    }

    pub fn malformed(
        message: impl Into<String>,
        fragment: impl Into<String>,
        position: usize,
    ) -> Self {
        Self::new(ErrorKind::Malformed {
            message: message.into(),
            fragment: fragment.into(),
            position,
        })
    }

    pub fn path_not_found(what: impl Into<String>) -> Self {
        Self::new(ErrorKind::PathNotFound(what.into()))
    }

    pub fn not_insertable(kind: NodeKind) -> Self {
        Self::new(ErrorKind::NotInsertable(kind))
    }

    pub fn index_out_of_range(index: usize, size: usize) -> Self {
        Self::new(ErrorKind::IndexOutOfRange { index, size })
    }

    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::new(ErrorKind::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        })
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument(message.into()))
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }

    /// Records that the error surfaced while inside `segment`.
    ///
    /// Called once per level while unwinding, innermost first.
    pub fn within(mut self, segment: impl Into<PathSegment>) -> Self {
        self.trail.push(segment.into());
        self
    }

    /// The recorded location, outermost segment first.
    pub fn trail(&self) -> impl Iterator<Item = &PathSegment> {
        self.trail.iter().rev()
    }

    /// The recorded location rendered as a JSONPath (`$` when empty).
    pub fn path(&self) -> String {
        let mut out = String::from("$");
        for segment in self.trail() {
            out.push_str(&segment.to_string());
        }
        out
    }

    pub fn is_path_not_found(&self) -> bool {
        matches!(self.kind, ErrorKind::PathNotFound(_))
    }
}

impl From<ErrorKind> for JsonError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Adds [`JsonError::within`] to results.
pub trait ResultExt<T> {
    fn within(self, segment: impl Into<PathSegment>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn within(self, segment: impl Into<PathSegment>) -> Result<T> {
        self.map_err(|err| err.within(segment))
    }
}
