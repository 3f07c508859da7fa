//! Shell page that frames the preview.

use minijinja::{context, Environment};

/// Context for rendering the shell page.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ShellContext {
    /// Logical path of the rendered file, if any
    pub file: Option<String>,
    /// Complete preview document placed in the frame
    pub html: String,
    pub success: bool,
    pub error: Option<String>,
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a new template engine with the shell template.
    pub fn new() -> Self {
        let mut env = Environment::new();

        // `.html` names get HTML auto-escaping, which encodes the srcdoc value
        env.add_template_owned("shell.html".to_string(), SHELL_TEMPLATE.to_string())
            .expect("Failed to add shell template");

        Self { env }
    }

    /// Render the shell page.
    pub fn render_shell(&self, context: &ShellContext) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template("shell.html")?;

        tmpl.render(context! {
            file => &context.file,
            html => &context.html,
            success => context.success,
            error => &context.error,
        })
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

const SHELL_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ file or "No entry" }} - stillframe</title>
  <style>
    html, body { margin: 0; height: 100%; }
    body { display: flex; flex-direction: column; font-family: system-ui, sans-serif; background: #f3f4f6; }
    .bar { display: flex; align-items: center; justify-content: space-between; gap: 1rem; padding: 0.5rem 1rem; background: #111827; color: #f9fafb; font-size: 0.875rem; }
    .badge { padding: 0.125rem 0.5rem; border-radius: 9999px; max-width: 60%; overflow: hidden; text-overflow: ellipsis; white-space: nowrap; }
    .badge.ok { background: #065f46; }
    .badge.err { background: #991b1b; }
    iframe { flex: 1; width: 100%; border: 0; background: #fff; }
  </style>
</head>
<body>
  <header class="bar">
    <span id="file">{{ file or "No entry file" }}</span>
    <span id="status" class="badge {% if success %}ok{% else %}err{% endif %}">{% if success %}Rendered{% else %}{{ error or "Conversion failed" }}{% endif %}</span>
  </header>
  <iframe id="preview" title="Preview" sandbox="allow-same-origin" srcdoc="{{ html }}"></iframe>
  <script src="/__hmr.js"></script>
</body>
</html>"##;

#[cfg(test)]
mod tests {
    use super::*;

    fn context(html: &str, success: bool, error: Option<&str>) -> ShellContext {
        ShellContext {
            file: Some("App.jsx".to_string()),
            html: html.to_string(),
            success,
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn frames_preview_in_sandbox() {
        let engine = TemplateEngine::new();
        let html = engine
            .render_shell(&context(r#"<p class="x">Tom & Jerry</p>"#, true, None))
            .unwrap();

        assert!(html.contains(r#"sandbox="allow-same-origin""#));
        assert!(html.contains("&lt;p class=&quot;x&quot;&gt;Tom &amp; Jerry&lt;"));
        assert!(!html.contains(r#"<p class="x">"#));
        assert!(html.contains(r#"<script src="/__hmr.js"></script>"#));
    }

    #[test]
    fn shows_status_badge() {
        let engine = TemplateEngine::new();

        let ok = engine.render_shell(&context("", true, None)).unwrap();
        assert!(ok.contains(r#"class="badge ok">Rendered"#));

        let failed = engine
            .render_shell(&context("", false, Some("No single JSX return statement found in App.jsx")))
            .unwrap();
        assert!(failed.contains(r#"class="badge err">No single JSX return statement"#));
    }

    #[test]
    fn handles_missing_entry() {
        let engine = TemplateEngine::new();
        let html = engine
            .render_shell(&ShellContext {
                file: None,
                html: String::new(),
                success: false,
                error: None,
            })
            .unwrap();

        assert!(html.contains("No entry file"));
        assert!(html.contains("Conversion failed"));
    }
}
