//! Project configuration (`stillframe.toml`).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Configuration file structure.
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub preview: PreviewConfig,
    #[serde(default)]
    pub build: BuildSettings,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct ProjectConfig {
    #[serde(default = "default_root")]
    pub root: PathBuf,
    #[serde(default = "default_src")]
    pub src: PathBuf,
    /// Entry file override, relative to `src`
    pub entry: Option<String>,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct PreviewConfig {
    /// Stylesheet embedded in previews, relative to `root`
    pub stylesheet: Option<PathBuf>,
    #[serde(default = "default_minify")]
    pub minify: bool,
}

#[derive(Debug, Deserialize, PartialEq)]
pub struct BuildSettings {
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_src() -> PathBuf {
    PathBuf::from("src")
}
fn default_minify() -> bool {
    true
}
fn default_output() -> PathBuf {
    PathBuf::from("dist")
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            src: default_src(),
            entry: None,
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            stylesheet: None,
            minify: default_minify(),
        }
    }
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            output: default_output(),
        }
    }
}

impl Config {
    /// Load configuration from `path` if it exists.
    ///
    /// A missing file yields defaults; a malformed one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("{} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Component source directory.
    pub fn src_dir(&self) -> PathBuf {
        self.project.root.join(&self.project.src)
    }

    /// Stylesheet path, if one is configured.
    pub fn stylesheet(&self) -> Option<PathBuf> {
        self.preview
            .stylesheet
            .as_ref()
            .map(|path| self.project.root.join(path))
    }

    /// Build output directory.
    pub fn output_dir(&self) -> PathBuf {
        self.project.root.join(&self.build.output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn missing_file_uses_defaults() {
        let temp = tempdir().unwrap();
        let config = Config::load(&temp.path().join("stillframe.toml")).unwrap();

        assert_eq!(config, Config::default());
        assert_eq!(config.src_dir(), PathBuf::from("./src"));
        assert_eq!(config.output_dir(), PathBuf::from("./dist"));
        assert!(config.preview.minify);
        assert_eq!(config.stylesheet(), None);
    }

    #[test]
    fn parses_partial_config() {
        let config = Config::parse(
            r#"
[project]
root = "site"
entry = "Landing.jsx"

[preview]
stylesheet = "preview.css"
"#,
        )
        .unwrap();

        assert_eq!(config.project.entry.as_deref(), Some("Landing.jsx"));
        assert_eq!(config.src_dir(), PathBuf::from("site/src"));
        assert_eq!(config.stylesheet(), Some(PathBuf::from("site/preview.css")));
        assert!(config.preview.minify);
        assert_eq!(config.build.output, PathBuf::from("dist"));
    }

    #[test]
    fn rejects_malformed_config() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("stillframe.toml");
        fs::write(&path, "[project\nroot = ").unwrap();

        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn parses_generated_config() {
        let config = Config::parse(crate::commands::init::DEFAULT_CONFIG).unwrap();

        assert_eq!(config.project.entry.as_deref(), Some("App.jsx"));
        assert_eq!(config.build.output, PathBuf::from("dist"));
    }
}
