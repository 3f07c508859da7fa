//! JSX attribute translation.
//!
//! Turns the raw text between a tag name and its closing `>` into an HTML
//! attribute string. Event handlers are dropped, React names are mapped to
//! their HTML spelling, and `style={{ ... }}` objects become CSS text.

use regex::Regex;
use std::sync::LazyLock;

use crate::escape::escape_html;
use crate::scan::skip_braces;

/// A single attribute as written in JSX.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute<'a> {
    /// Attribute name (e.g., "className")
    pub name: &'a str,

    /// Attribute value
    pub value: PropValue<'a>,
}

/// A prop value from JSX.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropValue<'a> {
    /// String literal: variant="default"
    String(&'a str),
    /// Boolean (presence): disabled
    Boolean,
    /// Expression: count={items.length}
    Expression(&'a str),
}

// Match: key: 'value' or key: "value"
static STYLE_PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_$][\w$]*)\s*:\s*(?:'([^']*)'|"([^"]*)")"#)
        .expect("Invalid style pair regex")
});

/// Split raw attribute text into attributes, in source order.
///
/// Spread attributes (`{...props}`) and stray characters are skipped.
pub fn parse_attributes(raw: &str) -> Vec<Attribute<'_>> {
    let mut attrs = Vec::new();
    let bytes = raw.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];

        if b.is_ascii_whitespace() {
            i += 1;
            continue;
        }

        if b == b'{' {
            // Spread: {...props}
            i = skip_braces(raw, i).unwrap_or(raw.len());
            continue;
        }

        if !is_name_start(b) {
            i += raw[i..].chars().next().map_or(1, char::len_utf8);
            continue;
        }

        let start = i;
        while i < bytes.len() && is_name_char(bytes[i]) {
            i += 1;
        }
        let name = &raw[start..i];

        let after_name = skip_whitespace(raw, i);
        if bytes.get(after_name) != Some(&b'=') {
            attrs.push(Attribute {
                name,
                value: PropValue::Boolean,
            });
            continue;
        }

        let (value, next) = parse_value(raw, skip_whitespace(raw, after_name + 1));
        attrs.push(Attribute { name, value });
        i = next;
    }

    attrs
}

/// Parse an attribute value starting at `i`, returning it and the offset after it.
fn parse_value(raw: &str, i: usize) -> (PropValue<'_>, usize) {
    match raw.as_bytes().get(i) {
        Some(&quote @ (b'"' | b'\'')) => match raw[i + 1..].find(quote as char) {
            Some(len) => (PropValue::String(&raw[i + 1..i + 1 + len]), i + len + 2),
            None => (PropValue::String(&raw[i + 1..]), raw.len()),
        },
        Some(b'{') => match skip_braces(raw, i) {
            Some(end) => (PropValue::Expression(&raw[i + 1..end - 1]), end),
            None => (PropValue::Expression(&raw[i + 1..]), raw.len()),
        },
        Some(_) => {
            let len = raw[i..]
                .find(char::is_whitespace)
                .unwrap_or(raw.len() - i);
            (PropValue::String(&raw[i..i + len]), i + len)
        }
        None => (PropValue::String(""), raw.len()),
    }
}

fn skip_whitespace(raw: &str, i: usize) -> usize {
    raw[i..]
        .find(|c: char| !c.is_whitespace())
        .map_or(raw.len(), |offset| i + offset)
}

fn is_name_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$'
}

fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'$' | b'-' | b':' | b'.')
}

/// Translate raw JSX attribute text into a space-prefixed HTML attribute string.
pub fn translate_attributes(raw: &str) -> String {
    let mut out = String::new();

    for attr in parse_attributes(raw) {
        if attr.name.starts_with("on") {
            tracing::trace!("Dropping event handler attribute {}", attr.name);
            continue;
        }

        match attr.value {
            PropValue::Boolean => {
                out.push(' ');
                out.push_str(attr.name);
            }
            PropValue::Expression(expr) if attr.name == "style" && is_object_literal(expr) => {
                match translate_style(expr) {
                    Some(css) => {
                        out.push_str(" style=\"");
                        out.push_str(&escape_html(&css));
                        out.push('"');
                    }
                    None => tracing::trace!("No static style pairs in {}", expr.trim()),
                }
            }
            PropValue::String(value) | PropValue::Expression(value) => {
                out.push(' ');
                out.push_str(html_name(attr.name));
                out.push_str("=\"");
                out.push_str(&escape_html(value));
                out.push('"');
            }
        }
    }

    out
}

/// HTML spelling of a React attribute name.
fn html_name(name: &str) -> &str {
    match name {
        "className" => "class",
        "htmlFor" => "for",
        _ => name,
    }
}

fn is_object_literal(expr: &str) -> bool {
    let expr = expr.trim();
    expr.starts_with('{') && expr.ends_with('}')
}

/// Convert a style object literal into CSS declarations.
///
/// Only string-valued pairs survive; numbers and expressions are skipped.
/// Returns `None` when nothing could be recovered.
pub fn translate_style(object: &str) -> Option<String> {
    let declarations: Vec<String> = STYLE_PAIR_RE
        .captures_iter(object)
        .filter_map(|caps| {
            let key = caps.get(1)?.as_str();
            let value = caps.get(2).or_else(|| caps.get(3))?.as_str();
            Some(format!("{}: {}", to_kebab_case(key), value))
        })
        .collect();

    if declarations.is_empty() {
        None
    } else {
        Some(declarations.join("; "))
    }
}

/// Convert a camelCase style key to a CSS property name.
fn to_kebab_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);

    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }

    // msTransform -> -ms-transform
    if out.starts_with("ms-") {
        out.insert(0, '-');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_all_value_forms() {
        let attrs = parse_attributes(r#"id="main" title='hi' count={items.length} disabled"#);

        assert_eq!(
            attrs,
            vec![
                Attribute { name: "id", value: PropValue::String("main") },
                Attribute { name: "title", value: PropValue::String("hi") },
                Attribute { name: "count", value: PropValue::Expression("items.length") },
                Attribute { name: "disabled", value: PropValue::Boolean },
            ]
        );
    }

    #[test]
    fn parses_hyphenated_names() {
        let attrs = parse_attributes(r#"aria-label="Close" data-id="3""#);

        assert_eq!(attrs[0].name, "aria-label");
        assert_eq!(attrs[1].name, "data-id");
    }

    #[test]
    fn skips_spread_attributes() {
        let attrs = parse_attributes(r#"{...props} id="x""#);

        assert_eq!(attrs, vec![Attribute { name: "id", value: PropValue::String("x") }]);
    }

    #[test]
    fn renames_class_name() {
        assert_eq!(
            translate_attributes(r#" className="card shadow""#),
            r#" class="card shadow""#
        );
        assert_eq!(translate_attributes(r#" htmlFor="email""#), r#" for="email""#);
    }

    #[test]
    fn drops_event_handlers() {
        let html = translate_attributes(
            r#" onClick={() => setOpen(!open)} onChange={handle} id="x" onBlur"#,
        );

        assert_eq!(html, r#" id="x""#);
    }

    #[test]
    fn passes_boolean_attributes() {
        assert_eq!(translate_attributes(" disabled checked"), " disabled checked");
    }

    #[test]
    fn passes_expression_text_through_escaped() {
        assert_eq!(
            translate_attributes(r#" title={a < b ? "x" : "y"}"#),
            r#" title="a &lt; b ? &quot;x&quot; : &quot;y&quot;""#
        );
    }

    #[test]
    fn translates_style_objects() {
        assert_eq!(
            translate_attributes(" style={{ fontSize: '16px', backgroundColor: 'red' }}"),
            r#" style="font-size: 16px; background-color: red""#
        );
    }

    #[test]
    fn skips_numeric_style_values() {
        assert_eq!(
            translate_style("{ padding: 8, margin: \"4px\", flex: grow }"),
            Some("margin: 4px".to_string())
        );
    }

    #[test]
    fn omits_style_without_pairs() {
        assert_eq!(translate_attributes(" style={{ padding: 8 }} id=\"a\""), r#" id="a""#);
    }

    #[test]
    fn keeps_plain_string_style() {
        assert_eq!(
            translate_attributes(r#" style="color: red""#),
            r#" style="color: red""#
        );
    }

    #[test]
    fn converts_vendor_prefixes() {
        assert_eq!(to_kebab_case("WebkitTransition"), "-webkit-transition");
        assert_eq!(to_kebab_case("msTransform"), "-ms-transform");
        assert_eq!(to_kebab_case("color"), "color");
    }

    #[test]
    fn escapes_attribute_values() {
        assert_eq!(
            translate_attributes(r#" alt='say "hi"'"#),
            r#" alt="say &quot;hi&quot;""#
        );
    }
}
