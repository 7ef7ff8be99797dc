//! Validation of untrusted pointer text.

use crate::util::parse_json_pointer;
use crate::PointerError;

/// Maximum accepted pointer length for documents decoded from outside input.
pub const MAX_POINTER_LENGTH: usize = 1024;

/// Validates pointer text without keeping the parsed tokens.
///
/// Checks the leading `/`, every escape sequence, and the length bound.
///
/// ```
/// use jsonkit_json_pointer::validate_json_pointer;
///
/// validate_json_pointer("").unwrap();
/// validate_json_pointer("/foo/bar").unwrap();
/// validate_json_pointer("foo").unwrap_err();
/// validate_json_pointer("/a~2").unwrap_err();
/// ```
pub fn validate_json_pointer(pointer: &str) -> Result<(), PointerError> {
    if pointer.len() > MAX_POINTER_LENGTH {
        return Err(PointerError::TooLong);
    }
    parse_json_pointer(pointer).map(|_| ())
}
