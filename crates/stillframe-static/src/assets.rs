//! Stylesheet loading and minification.

use std::fs;
use std::path::Path;

use stillframe_jsx::DEFAULT_STYLESHEET;

use crate::builder::BuildError;

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// Load the preview stylesheet, or the built-in one when `path` is `None`.
    ///
    /// Minification failures are logged and the original text is kept.
    pub fn load_stylesheet(path: Option<&Path>, minify: bool) -> Result<String, BuildError> {
        let css = match path {
            Some(path) => {
                let css = fs::read_to_string(path).map_err(|e| {
                    BuildError::ReadError(format!("Failed to read stylesheet {}: {}", path.display(), e))
                })?;
                tracing::info!("Loaded stylesheet from {}", path.display());
                css
            }
            None => DEFAULT_STYLESHEET.to_string(),
        };

        if !minify {
            return Ok(css);
        }

        match Self::minify_css(&css) {
            Ok(minified) => Ok(minified),
            Err(e) => {
                tracing::warn!("Keeping unminified stylesheet: {}", e);
                Ok(css)
            }
        }
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn uses_default_stylesheet() {
        let css = AssetPipeline::load_stylesheet(None, false).unwrap();

        assert_eq!(css, DEFAULT_STYLESHEET);
        assert!(css.contains(".sf-dynamic"));
    }

    #[test]
    fn loads_and_minifies_stylesheet() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("preview.css");
        fs::write(&path, ".card {\n    padding: 10px;\n    color: red;\n}\n").unwrap();

        let css = AssetPipeline::load_stylesheet(Some(&path), true).unwrap();

        assert!(!css.contains('\n'));
        assert!(css.contains(".card"));
    }

    #[test]
    fn errors_on_missing_stylesheet() {
        let temp = tempdir().unwrap();
        let result = AssetPipeline::load_stylesheet(Some(&temp.path().join("nope.css")), false);

        assert!(matches!(result, Err(BuildError::ReadError(_))));
    }

    #[test]
    fn minifies_css() {
        let css = r#"
.button {
    background-color: blue;
    padding: 10px;
}
        "#;

        let minified = AssetPipeline::minify_css(css).unwrap();

        assert!(!minified.contains('\n'));
        assert!(minified.contains(".button"));
    }
}
