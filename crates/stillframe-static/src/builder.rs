//! Batch preview builder.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;

use stillframe_jsx::{escape_html, SourceError, SourceSet, Transpiler};

use crate::assets::AssetPipeline;

const INDEX_PAGE: &str = "index.html";

/// Configuration for building static previews.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Directory holding component sources
    pub src_dir: PathBuf,

    /// Output directory
    pub output_dir: PathBuf,

    /// Stylesheet embedded in every preview (built-in when `None`)
    pub stylesheet: Option<PathBuf>,

    /// Minify the stylesheet
    pub minify: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            src_dir: PathBuf::from("src"),
            output_dir: PathBuf::from("dist"),
            stylesheet: None,
            minify: true,
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of preview pages written
    pub pages: usize,

    /// Pages that hold a diagnostic instead of a preview
    pub failed: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// One line of `manifest.json`.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestEntry {
    /// Logical source path
    pub source: String,

    /// Output path relative to the output directory
    pub output: String,

    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read sources: {0}")]
    ReadError(String),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Failed to write output: {0}")]
    WriteError(String),
}

/// Converts every component under a directory into a static preview page.
pub struct StaticBuilder {
    config: BuildConfig,
    transpiler: Transpiler,
}

impl StaticBuilder {
    /// Create a new static builder.
    ///
    /// Fails when the configured stylesheet cannot be read.
    pub fn new(config: BuildConfig) -> Result<Self, BuildError> {
        let stylesheet =
            AssetPipeline::load_stylesheet(config.stylesheet.as_deref(), config.minify)?;

        Ok(Self {
            config,
            transpiler: Transpiler::with_stylesheet(stylesheet),
        })
    }

    /// Build every preview page and the manifest.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        let sources = SourceSet::scan(&self.config.src_dir)?;

        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        let files: Vec<(&str, &str)> = sources.iter().collect();

        let results: Vec<Result<ManifestEntry, BuildError>> = files
            .par_iter()
            .map(|(path, source)| self.build_page(path, source))
            .collect();

        let mut manifest = Vec::with_capacity(results.len());
        for result in results {
            manifest.push(result?);
        }

        self.write_manifest(&manifest)?;
        self.write_index(&manifest)?;

        let failed = manifest.iter().filter(|entry| !entry.success).count();

        Ok(BuildResult {
            pages: manifest.len(),
            failed,
            duration_ms: start.elapsed().as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    /// Convert one source and write its page.
    fn build_page(&self, path: &str, source: &str) -> Result<ManifestEntry, BuildError> {
        let conversion = self.transpiler.convert(source, path);

        if let Some(error) = &conversion.error {
            tracing::warn!("{}: {}", path, error);
        }

        let relative = output_relative_path(path);
        let output_path = self.config.output_dir.join(&relative);

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).map_err(|e| BuildError::WriteError(e.to_string()))?;
        }

        fs::write(&output_path, &conversion.html)
            .map_err(|e| BuildError::WriteError(format!("{}: {}", output_path.display(), e)))?;

        Ok(ManifestEntry {
            source: path.to_string(),
            output: relative.to_string_lossy().replace('\\', "/"),
            success: conversion.success,
            error: conversion.error,
        })
    }

    /// Write `manifest.json`.
    fn write_manifest(&self, manifest: &[ManifestEntry]) -> Result<(), BuildError> {
        let json = serde_json::to_string_pretty(manifest)
            .map_err(|e| BuildError::WriteError(e.to_string()))?;

        fs::write(self.config.output_dir.join("manifest.json"), json)
            .map_err(|e| BuildError::WriteError(e.to_string()))
    }

    /// Write `index.html` linking every preview, unless a page already took that name.
    fn write_index(&self, manifest: &[ManifestEntry]) -> Result<(), BuildError> {
        if manifest.iter().any(|entry| entry.output == INDEX_PAGE) {
            tracing::debug!("Skipping preview index; {} is a component page", INDEX_PAGE);
            return Ok(());
        }

        let html = index_page(manifest, self.transpiler.stylesheet());

        fs::write(self.config.output_dir.join(INDEX_PAGE), html)
            .map_err(|e| BuildError::WriteError(e.to_string()))
    }
}

fn index_page(manifest: &[ManifestEntry], stylesheet: &str) -> String {
    let mut items = String::new();
    for entry in manifest {
        let status = match &entry.error {
            Some(error) => format!(r#" <span class="sf-notice">{}</span>"#, escape_html(error)),
            None => String::new(),
        };
        items.push_str(&format!(
            "<li><a href=\"{}\">{}</a>{}</li>\n",
            escape_html(&entry.output),
            escape_html(&entry.source),
            status
        ));
    }

    let body = format!("<h1>Previews</h1>\n<ul>\n{}</ul>", items);
    stillframe_jsx::document::assemble(&body, stylesheet)
}

/// `components/Button.tsx` -> `components/Button.html`
fn output_relative_path(logical: &str) -> PathBuf {
    Path::new(logical).with_extension("html")
}
