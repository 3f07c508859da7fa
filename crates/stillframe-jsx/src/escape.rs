//! HTML escaping for text nodes and attribute values.

use regex::Regex;
use std::sync::LazyLock;

// Match: &amp; or &#123; or &#x1F;
static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^&(?:#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[A-Za-z][A-Za-z0-9]{1,31});")
        .expect("Invalid entity regex")
});

/// Escape HTML special characters including single quotes.
///
/// An `&` that already starts a character reference is kept, since JSX text
/// and string attributes may carry entities like `&nbsp;` or `&amp;`.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());

    for (i, c) in s.char_indices() {
        match c {
            '&' if ENTITY_RE.is_match(&s[i..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }

    out
}
