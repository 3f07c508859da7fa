//! Extraction of the JSX fragment returned by a component.
//!
//! Looks for the trailing `return (...)` or `return <...>` of a file that
//! default-exports one function component.

use regex::Regex;
use std::sync::LazyLock;

use crate::scan::scan_balanced;

/// Result of looking for a component's returned fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extraction<'a> {
    /// The JSX markup, trimmed and unwrapped
    pub fragment: &'a str,

    /// Whether a trailing JSX return was found at all
    pub found: bool,
}

impl Extraction<'_> {
    fn missing() -> Self {
        Extraction {
            fragment: "",
            found: false,
        }
    }
}

static RETURN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\breturn\b").expect("Invalid return regex"));

// Match: return ( ... ); } with an optional trailing `export default Name;`
static PAREN_RETURN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^return\s*\((?s:(.*))\)\s*;?\s*\}\s*;?\s*(?:export\s+default\s+[A-Za-z_$][\w$]*\s*;?\s*)?$",
    )
    .expect("Invalid parenthesized return regex")
});

// Match: return <...>; }
static BARE_RETURN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^return\s*(<(?s:.*)>)\s*;?\s*\}\s*;?\s*(?:export\s+default\s+[A-Za-z_$][\w$]*\s*;?\s*)?$",
    )
    .expect("Invalid bare return regex")
});

/// Find the fragment returned by the last `return` that closes its function body.
///
/// Candidates are tried from the last `return` backwards so a helper
/// component earlier in the file does not win. A miss is a normal outcome
/// for components with conditional or early returns.
pub fn extract_fragment(source: &str) -> Extraction<'_> {
    let starts: Vec<usize> = RETURN_RE.find_iter(source).map(|m| m.start()).collect();

    for &start in starts.iter().rev() {
        let tail = &source[start..];

        let captured = PAREN_RETURN_RE
            .captures(tail)
            .or_else(|| BARE_RETURN_RE.captures(tail))
            .and_then(|caps| caps.get(1));

        if let Some(m) = captured {
            let fragment = unwrap_fragment(m.as_str());
            tracing::trace!("Extracted fragment of {} bytes", fragment.len());
            return Extraction {
                fragment,
                found: true,
            };
        }
    }

    Extraction::missing()
}

/// Trim, then strip one pair of wrapping parentheses and a single `<>...</>`.
fn unwrap_fragment(raw: &str) -> &str {
    let fragment = strip_parens(raw.trim());
    strip_fragment_shorthand(fragment)
}

fn strip_parens(fragment: &str) -> &str {
    if !(fragment.starts_with('(') && fragment.ends_with(')')) {
        return fragment;
    }

    // The opening paren must be closed by the final one, not earlier
    let mut depth = 0i32;
    for (i, c) in fragment.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 && i != fragment.len() - 1 {
                    return fragment;
                }
            }
            _ => {}
        }
    }

    fragment[1..fragment.len() - 1].trim()
}

fn strip_fragment_shorthand(fragment: &str) -> &str {
    if !(fragment.starts_with("<>") && fragment.ends_with("</>")) {
        return fragment;
    }

    let inner = &fragment[2..];
    match scan_balanced(inner, "") {
        Some(close) if close == inner.len() - 3 => inner[..close].trim(),
        _ => fragment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_parenthesized_return() {
        let source = r#"
import React from 'react';

export default function App() {
  return (
    <div className="app">
      <h1>Hello</h1>
    </div>
  );
}
"#;

        let extraction = extract_fragment(source);

        assert!(extraction.found);
        assert!(extraction.fragment.starts_with(r#"<div className="app">"#));
        assert!(extraction.fragment.ends_with("</div>"));
    }

    #[test]
    fn extracts_bare_return() {
        let source = "export default function App() {\n  return <p>Hi</p>;\n}\n";

        let extraction = extract_fragment(source);

        assert!(extraction.found);
        assert_eq!(extraction.fragment, "<p>Hi</p>");
    }

    #[test]
    fn allows_trailing_default_export() {
        let source = "const App = () => {\n  return (<main>x</main>);\n};\n\nexport default App;\n";

        assert_eq!(extract_fragment(source).fragment, "<main>x</main>");
    }

    #[test]
    fn prefers_last_return() {
        let source = r#"
function Badge() {
  return <span>badge</span>;
}

export default function App() {
  return (
    <section>app</section>
  );
}
"#;

        assert_eq!(extract_fragment(source).fragment, "<section>app</section>");
    }

    #[test]
    fn skips_returns_inside_callbacks() {
        let source = r#"
export default function List() {
  return (
    <ul>
      {items.map(item => { return <li>{item}</li> })}
    </ul>
  );
}
"#;

        let extraction = extract_fragment(source);

        assert!(extraction.found);
        assert!(extraction.fragment.starts_with("<ul>"));
    }

    #[test]
    fn strips_single_fragment_shorthand() {
        let source = "export default function App() {\n  return (\n    <>\n      <h1>A</h1>\n      <p>B</p>\n    </>\n  );\n}";

        assert_eq!(
            extract_fragment(source).fragment,
            "<h1>A</h1>\n      <p>B</p>"
        );
    }

    #[test]
    fn keeps_sibling_fragments() {
        assert_eq!(unwrap_fragment("<>a</><>b</>"), "<>a</><>b</>");
    }

    #[test]
    fn strips_only_matching_parens() {
        assert_eq!(strip_parens("((<a/>))"), "(<a/>)");
        assert_eq!(strip_parens("(a) (b)"), "(a) (b)");
    }

    #[test]
    fn misses_without_jsx_return() {
        let source = "export function add(a, b) {\n  return a + b;\n}\n";

        assert_eq!(extract_fragment(source), Extraction::missing());
    }

    #[test]
    fn misses_conditional_returns() {
        let source = r#"
export default function App({ ready }) {
  if (!ready) {
    return <p>Loading</p>;
  }
  return data.length ? <List /> : null;
}
"#;

        assert!(!extract_fragment(source).found);
    }

    #[test]
    fn misses_empty_source() {
        assert!(!extract_fragment("").found);
    }
}
