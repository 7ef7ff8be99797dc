//! Path segments carried by runtime errors, and the member-name rendering
//! rules shared with the JSONPath printer.

use std::fmt::{self, Write};

/// One step of the location at which a runtime error was raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(i64),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => write_name_segment(f, key),
            PathSegment::Index(index) => write!(f, "[{index}]"),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(i64::try_from(index).unwrap_or(i64::MAX))
    }
}

impl From<i64> for PathSegment {
    fn from(index: i64) -> Self {
        PathSegment::Index(index)
    }
}

/// Returns `true` if `name` can be written in dot notation (`.name`).
///
/// Anything else (the empty name, punctuation, whitespace) is written as a
/// quoted bracket member.
pub fn is_plain_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// Writes `name` as a single-quoted literal, escaping `\` and `'`.
pub fn write_quoted_name<W: Write + ?Sized>(out: &mut W, name: &str) -> fmt::Result {
    out.write_char('\'')?;
    for c in name.chars() {
        match c {
            '\\' => out.write_str("\\\\")?,
            '\'' => out.write_str("\\'")?,
            c => out.write_char(c)?,
        }
    }
    out.write_char('\'')
}

/// Writes a member access: `.name` when plain, `['name']` otherwise.
pub fn write_name_segment<W: Write + ?Sized>(out: &mut W, name: &str) -> fmt::Result {
    if is_plain_name(name) {
        out.write_char('.')?;
        out.write_str(name)
    } else {
        out.write_char('[')?;
        write_quoted_name(out, name)?;
        out.write_char(']')
    }
}
