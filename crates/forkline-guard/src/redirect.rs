//! Post-authentication redirect validator.
//!
//! `safe_redirect` decides whether a caller-supplied "return to" path may
//! be issued in a same-origin redirect. The check order is load-bearing:
//!
//! 1. authority check — anything that would resolve off-origin is out;
//! 2. CR/LF check on the **raw** candidate — header injection hidden in a
//!    query string must die before the allowlist ever looks at the path;
//! 3. allowlist prefix check on the **path component only** — never on the
//!    raw string, or an absolute URL smuggled into a query parameter of an
//!    allowed path would slip through.
//!
//! Anything rejected falls back to the default landing path.

use forkline_types::constants::{DEFAULT_REDIRECT_PATH, REDIRECT_ALLOWLIST};

/// Validate a candidate redirect target. Returns a path guaranteed safe to
/// issue in a same-origin redirect: either the candidate byte-for-byte
/// unchanged, or the default landing path.
#[must_use]
pub fn safe_redirect(candidate: Option<&str>) -> &str {
    let Some(raw) = candidate else {
        return DEFAULT_REDIRECT_PATH;
    };
    if !is_same_origin_path(raw) {
        return DEFAULT_REDIRECT_PATH;
    }
    if raw.contains(['\r', '\n']) {
        return DEFAULT_REDIRECT_PATH;
    }
    // From here on, only the path component matters — query and fragment
    // were vetted for injection above and are otherwise opaque.
    let path = path_component(raw);
    if REDIRECT_ALLOWLIST
        .iter()
        .any(|allowed| path == *allowed || path.starts_with(&format!("{allowed}/")))
    {
        raw
    } else {
        DEFAULT_REDIRECT_PATH
    }
}

/// Whether the candidate stays on the synthetic origin when resolved as a
/// redirect target.
///
/// Rejects scheme-qualified URLs (`https:…`, `javascript:…`),
/// protocol-relative forms (`//evil`, and the browser-tolerated `/\evil`
/// and `\\evil` spellings), and anything not rooted at `/`.
fn is_same_origin_path(raw: &str) -> bool {
    if has_scheme(raw) {
        return false;
    }
    if raw.starts_with("//") || raw.starts_with("/\\") || raw.starts_with('\\') {
        return false;
    }
    raw.starts_with('/')
}

/// RFC 3986 scheme detection: ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )
/// followed by ":" before any "/", "?" or "#".
fn has_scheme(raw: &str) -> bool {
    let mut chars = raw.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    for (_, c) in chars {
        match c {
            ':' => return true,
            c if c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.') => {}
            _ => return false,
        }
    }
    false
}

/// The path component of the candidate: everything before the first `?` or
/// `#`.
fn path_component(raw: &str) -> &str {
    let end = raw.find(['?', '#']).unwrap_or(raw.len());
    &raw[..end]
}
