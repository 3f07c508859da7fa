//! Preview document assembly and fallback pages.

use crate::escape::escape_html;

/// Stylesheet used when the embedding environment supplies none.
pub const DEFAULT_STYLESHEET: &str = r#"*, *::before, *::after { box-sizing: border-box; }
body {
  margin: 0;
  font-family: system-ui, -apple-system, "Segoe UI", sans-serif;
  line-height: 1.5;
  color: #111827;
  background: #ffffff;
}
#root { padding: 1rem; }
img { max-width: 100%; }
.sf-dynamic { color: #9ca3af; font-style: italic; }
.sf-notice {
  max-width: 40rem;
  margin: 2rem auto;
  padding: 1.25rem 1.5rem;
  border: 1px solid #e5e7eb;
  border-radius: 0.5rem;
  background: #f9fafb;
}
.sf-notice h1 { margin: 0 0 0.5rem; font-size: 1.125rem; }
.sf-notice p { margin: 0.25rem 0; color: #4b5563; }
.sf-notice code { font-family: ui-monospace, monospace; font-size: 0.875em; }
.sf-error { border-color: #fecaca; background: #fef2f2; }
.sf-error pre { white-space: pre-wrap; color: #991b1b; }
"#;

/// Wrap converted markup in a complete HTML document.
pub fn assemble(body: &str, stylesheet: &str) -> String {
    shell("Preview", body, stylesheet)
}

/// Page shown when no single trailing JSX return could be found.
pub fn extraction_miss_page(file_label: &str, stylesheet: &str) -> String {
    let body = format!(
        r#"<div class="sf-notice">
  <h1>Preview unavailable</h1>
  <p><code>{}</code> has no previewable markup.</p>
  <p>Write the component with a single JSX return at the end of its function, such as <code>return (&lt;div&gt;...&lt;/div&gt;);</code></p>
</div>"#,
        escape_html(file_label)
    );

    shell("Preview unavailable", &body, stylesheet)
}

/// Page shown when conversion hit an internal limit.
pub fn error_page(file_label: &str, message: &str, stylesheet: &str) -> String {
    let body = format!(
        r#"<div class="sf-notice sf-error">
  <h1>Preview failed</h1>
  <p>Could not convert <code>{}</code>.</p>
  <pre>{}</pre>
</div>"#,
        escape_html(file_label),
        escape_html(message)
    );

    shell("Preview failed", &body, stylesheet)
}

fn shell(title: &str, body: &str, stylesheet: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{title}</title>
  <style>{stylesheet}</style>
</head>
<body>
  <div id="root">{body}</div>
</body>
</html>"#,
        title = escape_html(title),
        stylesheet = neutralize_style_close(stylesheet),
        body = body,
    )
}

/// Keep a stylesheet from closing its own `<style>` element.
fn neutralize_style_close(stylesheet: &str) -> String {
    let lower = stylesheet.to_ascii_lowercase();
    if !lower.contains("</style") {
        return stylesheet.to_string();
    }

    let mut out = String::with_capacity(stylesheet.len() + 8);
    let mut last = 0;
    for (i, _) in lower.match_indices("</style") {
        out.push_str(&stylesheet[last..i]);
        out.push_str("<\\/style");
        last = i + "</style".len();
    }
    out.push_str(&stylesheet[last..]);
    out
}
