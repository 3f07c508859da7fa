//! Structural conversion of a JSX fragment into static HTML.
//!
//! The fragment is read one token at a time into a [`Node`] and each node is
//! emitted as soon as it is recognised. No tree is kept around.

use regex::Regex;
use std::sync::LazyLock;

use crate::attributes::translate_attributes;
use crate::escape::escape_html;
use crate::scan::{closing_tag, find_tag_end, scan_balanced};
use crate::transpiler::ConvertError;

/// Markup substituted for every `{...}` expression container.
pub const PLACEHOLDER_HTML: &str =
    r#"<span class="sf-dynamic" style="color: #9ca3af; font-style: italic">[dynamic]</span>"#;

/// Deepest element nesting accepted before conversion gives up.
pub const MAX_DEPTH: usize = 256;

/// Elements that never take a closing tag in HTML.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

static TAG_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<([A-Za-z][A-Za-z0-9_.:-]*)").expect("Invalid tag name regex")
});

/// One token of a children span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Node<'a> {
    /// `<Tag attrs>children</Tag>` or `<Tag attrs/>`
    Element {
        tag: &'a str,
        attrs: &'a str,
        children: Option<&'a str>,
        self_closing: bool,
    },
    /// `<>children</>`
    Fragment { children: &'a str },
    /// `{expr}`
    Placeholder { expr: &'a str },
    /// Raw text, not yet whitespace-collapsed or escaped
    Text(&'a str),
}

/// Convert a JSX fragment into HTML.
///
/// Malformed markup degrades to empty elements or text; the only error is
/// [`ConvertError::Anomaly`] when nesting exceeds [`MAX_DEPTH`].
pub fn render(fragment: &str) -> Result<String, ConvertError> {
    let mut out = String::with_capacity(fragment.len());
    render_children(fragment, 0, &mut out)?;
    Ok(out)
}

/// Dispatch every token in `span`, appending its HTML to `out`.
fn render_children(span: &str, depth: usize, out: &mut String) -> Result<(), ConvertError> {
    let mut pos = 0;

    while pos < span.len() {
        let (node, end) = next_node(span, pos);
        emit(node, depth, out)?;
        pos = end;
    }

    Ok(())
}

/// Classify the token at `pos` and find where it ends.
fn next_node(span: &str, pos: usize) -> (Node<'_>, usize) {
    let rest = &span[pos..];

    if rest.starts_with("<>") {
        let inner = pos + 2;
        return match scan_balanced(&span[inner..], "") {
            Some(close) => (
                Node::Fragment {
                    children: &span[inner..inner + close],
                },
                inner + close + closing_tag("").len(),
            ),
            None => {
                tracing::debug!("Unterminated fragment, continuing with its contents");
                (Node::Fragment { children: "" }, inner)
            }
        };
    }

    if rest.starts_with('<') {
        return next_element(span, pos);
    }

    if rest.starts_with('{') {
        return match rest.find('}') {
            Some(close) => (
                Node::Placeholder {
                    expr: &span[pos + 1..pos + close],
                },
                pos + close + 1,
            ),
            None => {
                tracing::debug!("Unterminated expression container");
                (
                    Node::Placeholder {
                        expr: &span[pos + 1..],
                    },
                    span.len(),
                )
            }
        };
    }

    next_text(span, pos, pos)
}

/// Read an element starting at `pos`, falling back to text when it is not one.
fn next_element(span: &str, pos: usize) -> (Node<'_>, usize) {
    let Some(tag) = TAG_NAME_RE
        .captures(&span[pos..])
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
    else {
        // Stray `</x>` or a lone `<` in text
        return next_text(span, pos, pos + 1);
    };

    let Some(tag_end) = find_tag_end(span, pos) else {
        tracing::debug!("Opening tag <{}> never ends, treating as text", tag);
        return next_text(span, pos, pos + 1);
    };

    let attrs = &span[pos + 1 + tag.len()..tag_end.attrs_end];

    if tag_end.self_closing {
        let node = Node::Element {
            tag,
            attrs,
            children: None,
            self_closing: true,
        };
        return (node, tag_end.end);
    }

    match scan_balanced(&span[tag_end.end..], tag) {
        Some(close) => {
            let children = &span[tag_end.end..tag_end.end + close];
            let end = tag_end.end + close + closing_tag(tag).len();
            let node = Node::Element {
                tag,
                attrs,
                children: Some(children),
                self_closing: false,
            };
            (node, end)
        }
        None => {
            tracing::debug!("No matching </{}>, emitting it without children", tag);
            let node = Node::Element {
                tag,
                attrs,
                children: None,
                self_closing: false,
            };
            (node, tag_end.end)
        }
    }
}

/// Read a text run from `pos` up to the next `<` or `{` at or after `search_from`.
fn next_text(span: &str, pos: usize, search_from: usize) -> (Node<'_>, usize) {
    let end = span[search_from..]
        .find(['<', '{'])
        .map_or(span.len(), |offset| search_from + offset);

    (Node::Text(&span[pos..end]), end)
}

/// Append the HTML for one node.
fn emit(node: Node<'_>, depth: usize, out: &mut String) -> Result<(), ConvertError> {
    match node {
        Node::Element {
            tag,
            attrs,
            children,
            self_closing,
        } => {
            if depth >= MAX_DEPTH {
                return Err(ConvertError::Anomaly(format!(
                    "elements nested deeper than {MAX_DEPTH} levels at <{tag}>"
                )));
            }

            out.push('<');
            out.push_str(tag);
            out.push_str(&translate_attributes(attrs));
            out.push('>');

            let void = VOID_ELEMENTS.contains(&tag);
            if void && self_closing {
                return Ok(());
            }

            if let Some(children) = children {
                render_children(children, depth + 1, out)?;
            }

            if !void {
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
        Node::Fragment { children } => {
            if depth >= MAX_DEPTH {
                return Err(ConvertError::Anomaly(format!(
                    "fragments nested deeper than {MAX_DEPTH} levels"
                )));
            }
            render_children(children, depth + 1, out)?;
        }
        Node::Placeholder { expr } => {
            if !is_comment(expr) {
                tracing::trace!("Replacing expression {{{}}} with placeholder", expr.trim());
                out.push_str(PLACEHOLDER_HTML);
            }
        }
        Node::Text(raw) => {
            if let Some(text) = collapse_whitespace(raw) {
                out.push_str(&escape_html(&text));
            }
        }
    }

    Ok(())
}

/// `{/* note */}` renders nothing.
fn is_comment(expr: &str) -> bool {
    let expr = expr.trim();
    expr.starts_with("/*") && expr.ends_with("*/")
}

/// Apply JSX whitespace rules to a text run.
///
/// Whitespace touching a line break is removed, blank lines are dropped and
/// the remaining lines are joined with single spaces. Returns `None` when
/// nothing is left.
fn collapse_whitespace(raw: &str) -> Option<String> {
    let lines: Vec<&str> = raw
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();
    let last = lines.len() - 1;
    let last_non_empty = lines
        .iter()
        .rposition(|line| !line.trim().is_empty())
        .unwrap_or(0);

    let mut out = String::with_capacity(raw.len());
    for (i, line) in lines.iter().enumerate() {
        let mut line = *line;
        if i != 0 {
            line = line.trim_start();
        }
        if i != last {
            line = line.trim_end();
        }
        if line.is_empty() {
            continue;
        }

        out.push_str(line);
        if i != last_non_empty {
            out.push(' ');
        }
    }

    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}
