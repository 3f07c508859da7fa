//! Single file conversion command.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use stillframe_jsx::{Conversion, Transpiler};
use stillframe_static::AssetPipeline;

use crate::config::Config;

/// Run the convert command.
pub async fn run(
    config: &Config,
    file: PathBuf,
    output: Option<PathBuf>,
    json: bool,
    label: Option<String>,
) -> Result<()> {
    let source = fs::read_to_string(&file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let stylesheet =
        AssetPipeline::load_stylesheet(config.stylesheet().as_deref(), config.preview.minify)?;
    let transpiler = Transpiler::with_stylesheet(stylesheet);

    let label = label.unwrap_or_else(|| file.display().to_string());
    let conversion = transpiler.convert(&source, &label);

    if let Some(error) = &conversion.error {
        tracing::warn!("{}", error);
    }

    let rendered = render_output(&conversion, json)?;

    match output {
        Some(path) => {
            write_file(&path, &rendered)?;
            tracing::info!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .context("Failed to write to stdout")?;
            stdout.flush()?;
        }
    }

    Ok(())
}

/// The text written for a conversion: the document, or the result as JSON.
fn render_output(conversion: &Conversion, json: bool) -> Result<String> {
    if json {
        let mut text = serde_json::to_string_pretty(conversion)?;
        text.push('\n');
        Ok(text)
    } else {
        Ok(conversion.html.clone())
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    fs::write(path, contents).with_context(|| format!("Failed to write {}", path.display()))
}
