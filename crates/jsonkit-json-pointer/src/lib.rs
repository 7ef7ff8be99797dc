//! JSON Pointer (RFC 6901) string utilities.
//!
//! This crate works purely on pointer text and reference-token lists; turning
//! tokens into typed path steps and resolving them against a tree is done by
//! `jsonkit-json-path`.
//!
//! Both `""` and `"/"` denote the whole document.
//!
//! # Example
//!
//! ```
//! use jsonkit_json_pointer::{format_json_pointer, parse_json_pointer};
//!
//! let path = parse_json_pointer("/a~1b/0/-").unwrap();
//! assert_eq!(path, vec!["a/b".to_string(), "0".to_string(), "-".to_string()]);
//! assert_eq!(format_json_pointer(&path), "/a~1b/0/-");
//! ```

use thiserror::Error;

mod util;
pub use util::{
    escape_component, format_json_pointer, is_child, is_valid_index, parent, parse_json_pointer,
    unescape_component,
};

pub mod validate;
pub use validate::{validate_json_pointer, MAX_POINTER_LENGTH};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PointerError {
    #[error("JSON pointer must start with '/'")]
    MissingLeadingSlash,
    #[error("invalid escape sequence at position {position}")]
    InvalidEscape { position: usize },
    #[error("JSON pointer longer than {MAX_POINTER_LENGTH} bytes")]
    TooLong,
    #[error("the root has no parent")]
    NoParent,
}

impl PointerError {
    /// Byte offset into the pointer text the error refers to.
    pub fn position(&self) -> usize {
        match self {
            PointerError::InvalidEscape { position } => *position,
            PointerError::TooLong => MAX_POINTER_LENGTH,
            PointerError::MissingLeadingSlash | PointerError::NoParent => 0,
        }
    }
}
