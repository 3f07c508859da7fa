//! Public conversion entry point.

use serde::{Deserialize, Serialize};

use crate::document::{self, DEFAULT_STYLESHEET};
use crate::extract::extract_fragment;
use crate::render::render;

/// Options shared by every conversion a [`Transpiler`] performs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranspileOptions {
    /// CSS interpolated into every emitted document
    pub stylesheet: String,
}

impl Default for TranspileOptions {
    fn default() -> Self {
        Self {
            stylesheet: DEFAULT_STYLESHEET.to_string(),
        }
    }
}

/// Result of converting one source file.
///
/// `html` is always a complete document; when `success` is false it is a
/// diagnostic page and `error` says why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversion {
    pub html: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of the conversion pipeline before it is turned into a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    /// Converted markup for the document body
    Rendered(String),
    /// Why no markup could be produced
    Failed(ConvertError),
}

/// Errors that can occur during conversion.
///
/// Neither escapes [`Transpiler::convert`]; both become diagnostic pages.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvertError {
    #[error("No single JSX return statement found in {file}")]
    ExtractionMiss { file: String },

    #[error("Conversion anomaly: {0}")]
    Anomaly(String),
}

/// Static JSX-to-HTML transpiler.
#[derive(Debug, Clone, Default)]
pub struct Transpiler {
    options: TranspileOptions,
}

impl Transpiler {
    /// Create a transpiler with the given options.
    pub fn new(options: TranspileOptions) -> Self {
        Self { options }
    }

    /// Create a transpiler that embeds `stylesheet` in every document.
    pub fn with_stylesheet(stylesheet: impl Into<String>) -> Self {
        Self::new(TranspileOptions {
            stylesheet: stylesheet.into(),
        })
    }

    /// The stylesheet embedded in emitted documents.
    pub fn stylesheet(&self) -> &str {
        &self.options.stylesheet
    }

    /// Run extraction and conversion, returning the body markup or the failure.
    pub fn outcome(&self, source: &str, file_label: &str) -> ConversionOutcome {
        let extraction = extract_fragment(source);
        if !extraction.found {
            return ConversionOutcome::Failed(ConvertError::ExtractionMiss {
                file: file_label.to_string(),
            });
        }

        match render(extraction.fragment) {
            Ok(html) => ConversionOutcome::Rendered(html),
            Err(e) => ConversionOutcome::Failed(e),
        }
    }

    /// Convert a component source file into a complete preview document.
    ///
    /// Always returns renderable HTML, whatever the input.
    pub fn convert(&self, source: &str, file_label: &str) -> Conversion {
        let stylesheet = self.stylesheet();

        match self.outcome(source, file_label) {
            ConversionOutcome::Rendered(body) => Conversion {
                html: document::assemble(&body, stylesheet),
                success: true,
                error: None,
            },
            ConversionOutcome::Failed(e) => {
                let html = match &e {
                    ConvertError::ExtractionMiss { .. } => {
                        tracing::debug!("{}", e);
                        document::extraction_miss_page(file_label, stylesheet)
                    }
                    ConvertError::Anomaly(message) => {
                        tracing::warn!("Failed to convert {}: {}", file_label, message);
                        document::error_page(file_label, message, stylesheet)
                    }
                };

                Conversion {
                    html,
                    success: false,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

/// Convert `source` with the default stylesheet.
pub fn convert(source: &str, file_label: &str) -> Conversion {
    Transpiler::default().convert(source, file_label)
}
