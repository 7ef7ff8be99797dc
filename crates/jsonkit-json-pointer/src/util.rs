use crate::PointerError;

/// Unescapes a reference token: `~1` becomes `/`, `~0` becomes `~`.
///
/// A `~` followed by anything else is rejected. `offset` is the byte
/// position of `component` inside the full pointer and is only used for
/// error reporting.
pub fn unescape_component(component: &str, offset: usize) -> Result<String, PointerError> {
    if !component.contains('~') {
        return Ok(component.to_string());
    }
    let mut out = String::with_capacity(component.len());
    let mut chars = component.char_indices();
    while let Some((i, c)) = chars.next() {
        if c != '~' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some((_, '0')) => out.push('~'),
            Some((_, '1')) => out.push('/'),
            _ => return Err(PointerError::InvalidEscape { position: offset + i }),
        }
    }
    Ok(out)
}

/// Escapes a reference token: `~` becomes `~0`, `/` becomes `~1`.
pub fn escape_component(component: &str) -> String {
    if !component.contains('/') && !component.contains('~') {
        return component.to_string();
    }
    component.replace('~', "~0").replace('/', "~1")
}

/// Splits a pointer into unescaped reference tokens.
///
/// `""` and `"/"` both yield the empty list (the root).
pub fn parse_json_pointer(pointer: &str) -> Result<Vec<String>, PointerError> {
    if pointer.is_empty() || pointer == "/" {
        return Ok(Vec::new());
    }
    let rest = pointer
        .strip_prefix('/')
        .ok_or(PointerError::MissingLeadingSlash)?;
    let mut offset = 1;
    let mut out = Vec::new();
    for component in rest.split('/') {
        out.push(unescape_component(component, offset)?);
        offset += component.len() + 1;
    }
    Ok(out)
}

/// Joins reference tokens into pointer text.
pub fn format_json_pointer(path: &[String]) -> String {
    let mut out = String::new();
    for component in path {
        out.push('/');
        out.push_str(&escape_component(component));
    }
    out
}

/// Whether `parent` is a strict prefix of `child`.
pub fn is_child(parent: &[String], child: &[String]) -> bool {
    parent.len() < child.len() && child[..parent.len()] == *parent
}

pub fn parent(path: &[String]) -> Result<&[String], PointerError> {
    match path.split_last() {
        Some((_, rest)) => Ok(rest),
        None => Err(PointerError::NoParent),
    }
}

/// Whether a token is a canonical array index: ASCII digits, no leading zero.
pub fn is_valid_index(token: &str) -> bool {
    match token.as_bytes() {
        [] => false,
        [b'0'] => true,
        [b'0', ..] => false,
        bytes => bytes.iter().all(u8::is_ascii_digit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(steps: &[&str]) -> Vec<String> {
        steps.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_unescape_component() {
        assert_eq!(unescape_component("foo", 0).unwrap(), "foo");
        assert_eq!(unescape_component("a~0b", 0).unwrap(), "a~b");
        assert_eq!(unescape_component("c~1d", 0).unwrap(), "c/d");
        assert_eq!(unescape_component("~01", 0).unwrap(), "~1");
        assert_eq!(unescape_component("~1~0", 0).unwrap(), "/~");
    }

    #[test]
    fn test_unescape_rejects_bad_sequences() {
        assert_eq!(
            unescape_component("ab~2", 5),
            Err(PointerError::InvalidEscape { position: 7 })
        );
        assert!(unescape_component("~", 0).is_err());
    }

    #[test]
    fn test_escape_component() {
        assert_eq!(escape_component("foo"), "foo");
        assert_eq!(escape_component("a~b/c"), "a~0b~1c");
        assert_eq!(escape_component("~1"), "~01");
    }

    #[test]
    fn test_parse_json_pointer() {
        assert_eq!(parse_json_pointer("").unwrap(), Vec::<String>::new());
        assert_eq!(parse_json_pointer("/").unwrap(), Vec::<String>::new());
        assert_eq!(parse_json_pointer("/foo/bar").unwrap(), path(&["foo", "bar"]));
        assert_eq!(parse_json_pointer("/a~0b/c~1d/1").unwrap(), path(&["a~b", "c/d", "1"]));
        assert_eq!(parse_json_pointer("/foo//").unwrap(), path(&["foo", "", ""]));
        assert_eq!(parse_json_pointer("foo"), Err(PointerError::MissingLeadingSlash));
        assert_eq!(
            parse_json_pointer("/ok/b~x"),
            Err(PointerError::InvalidEscape { position: 5 })
        );
    }

    #[test]
    fn test_format_json_pointer() {
        assert_eq!(format_json_pointer(&[]), "");
        assert_eq!(format_json_pointer(&path(&["a~b", "c/d"])), "/a~0b/c~1d");
        assert_eq!(format_json_pointer(&path(&["x", ""])), "/x/");
    }

    #[test]
    fn test_relationships() {
        let p = path(&["foo"]);
        let q = path(&["foo", "bar"]);
        assert!(is_child(&p, &q));
        assert!(!is_child(&q, &p));
        assert!(!is_child(&p, &p));
        assert_eq!(parent(&q).unwrap(), p.as_slice());
        assert_eq!(parent(&[]), Err(PointerError::NoParent));
    }

    #[test]
    fn test_is_valid_index() {
        assert!(is_valid_index("0"));
        assert!(is_valid_index("120"));
        assert!(!is_valid_index("01"));
        assert!(!is_valid_index("-1"));
        assert!(!is_valid_index(""));
        assert!(!is_valid_index("1a"));
    }
}
