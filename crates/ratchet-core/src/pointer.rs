//! RFC 6901 JSON Pointer construction for instance paths.
//!
//! The root is the empty string. Each reference token is prefixed with `/`
//! and escapes `~` as `~0` and `/` as `~1`.

/// Append an object property to a pointer.
pub fn push_field(base: &str, field: &str) -> String {
    let mut out = String::with_capacity(base.len() + field.len() + 1);
    out.push_str(base);
    out.push('/');
    for c in field.chars() {
        match c {
            '~' => out.push_str("~0"),
            '/' => out.push_str("~1"),
            other => out.push(other),
        }
    }
    out
}

/// Append a list index to a pointer.
pub fn push_index(base: &str, index: usize) -> String {
    format!("{base}/{index}")
}

/// Join a pointer with a relative pointer produced below it.
///
/// `relative` must itself be a pointer (empty or starting with `/`).
pub fn join(base: &str, relative: &str) -> String {
    let mut out = String::with_capacity(base.len() + relative.len());
    out.push_str(base);
    out.push_str(relative);
    out
}
