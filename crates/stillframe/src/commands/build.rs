//! Batch preview build command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use stillframe_static::{BuildConfig, StaticBuilder};

use crate::config::Config;

/// Run the build command.
pub async fn run(config: &Config, output: Option<PathBuf>, minify: Option<bool>) -> Result<()> {
    tracing::info!("Building previews...");

    let build_config = BuildConfig {
        src_dir: config.src_dir(),
        output_dir: output.unwrap_or_else(|| config.output_dir()),
        stylesheet: config.stylesheet(),
        minify: minify.unwrap_or(config.preview.minify),
    };

    let result = tokio::task::spawn_blocking(move || StaticBuilder::new(build_config)?.build())
        .await
        .context("Build task panicked")??;

    tracing::info!(
        "Built {} previews ({} failed) in {}ms",
        result.pages,
        result.failed,
        result.duration_ms
    );

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
