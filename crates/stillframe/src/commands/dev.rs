//! Live preview server command.

use anyhow::Result;
use stillframe_server::{DevServer, DevServerConfig};
use stillframe_static::AssetPipeline;

use crate::config::Config;

/// Run the preview server.
pub async fn run(config: &Config, port: u16, open: bool) -> Result<()> {
    tracing::info!("Starting preview server on port {}", port);

    let stylesheet =
        AssetPipeline::load_stylesheet(config.stylesheet().as_deref(), config.preview.minify)?;

    let server_config = DevServerConfig {
        root: config.project.root.clone(),
        src_dir: config.src_dir(),
        entry: config.project.entry.clone(),
        port,
        open,
        stylesheet,
        ..Default::default()
    };

    DevServer::new(server_config).start().await?;

    Ok(())
}
