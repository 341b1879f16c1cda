//! Deterministic slug derivation.
//!
//! Every entity with a `slug` field stores `slugify(name)` (or title), and the
//! slug is recomputed on every save so it always reflects the latest name.

/// Turn a display title into a URL-safe lowercase hyphenated identifier.
///
/// Whitespace runs become a single `-`, anything outside ASCII alphanumerics,
/// `_` and `-` is dropped, repeated dashes collapse and edge dashes are trimmed.
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_dash = false;

    for ch in text.trim().chars().flat_map(char::to_lowercase) {
        let ch = if ch.is_whitespace() { '-' } else { ch };

        if ch == '-' {
            pending_dash = true;
            continue;
        }

        if !(ch.is_ascii_alphanumeric() || ch == '_') {
            continue;
        }

        if pending_dash && !out.is_empty() {
            out.push('-');
        }
        pending_dash = false;
        out.push(ch);
    }

    out
}
