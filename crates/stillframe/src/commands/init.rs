//! Initialize stillframe in a project.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing stillframe...");

    let root = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    scaffold(root, config_path, yes)?;

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'stillframe dev' to start the preview server.");

    Ok(())
}

/// Write the default config and a sample component, keeping existing files
/// unless `overwrite` is set.
fn scaffold(root: &Path, config_path: &Path, overwrite: bool) -> Result<()> {
    if !config_path.exists() || overwrite {
        fs::write(config_path, DEFAULT_CONFIG)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        tracing::info!("Created {}", config_path.display());
    } else {
        tracing::warn!(
            "{} already exists. Use --yes to overwrite.",
            config_path.display()
        );
    }

    let src_dir = root.join("src");
    fs::create_dir_all(&src_dir).context("Failed to create src directory")?;

    let app_path = src_dir.join("App.jsx");
    if !app_path.exists() || overwrite {
        fs::write(&app_path, DEFAULT_APP).context("Failed to write App.jsx")?;
        tracing::info!("Created {}", app_path.display());
    }

    Ok(())
}

pub(crate) const DEFAULT_CONFIG: &str = r#"# stillframe configuration

[project]
# Project directory
root = "."

# Directory containing your components
src = "src"

# Entry component shown by `stillframe dev`
entry = "App.jsx"

[preview]
# Stylesheet embedded in every preview (built-in when unset)
# stylesheet = "preview.css"

# Minify the stylesheet
minify = true

[build]
# Output directory for `stillframe build`
output = "dist"
"#;

const DEFAULT_APP: &str = r#"export default function App() {
  const [count, setCount] = useState(0);

  return (
    <main className="app" style={{ maxWidth: '40rem', margin: '2rem auto' }}>
      <h1>Hello from stillframe</h1>
      <p>Edit src/App.jsx and the preview refreshes.</p>
      <button onClick={() => setCount(count + 1)}>Clicked {count} times</button>
    </main>
  );
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn scaffolds_project() {
        let temp = tempdir().unwrap();
        let config_path = temp.path().join("stillframe.toml");

        scaffold(temp.path(), &config_path, false).unwrap();

        assert_eq!(fs::read_to_string(&config_path).unwrap(), DEFAULT_CONFIG);
        assert!(temp.path().join("src/App.jsx").exists());
    }

    #[test]
    fn keeps_existing_files() {
        let temp = tempdir().unwrap();
        let config_path = temp.path().join("stillframe.toml");
        fs::write(&config_path, "# mine").unwrap();

        scaffold(temp.path(), &config_path, false).unwrap();
        assert_eq!(fs::read_to_string(&config_path).unwrap(), "# mine");

        scaffold(temp.path(), &config_path, true).unwrap();
        assert_eq!(fs::read_to_string(&config_path).unwrap(), DEFAULT_CONFIG);
    }

    #[test]
    fn sample_component_converts() {
        let result = stillframe_jsx::convert(DEFAULT_APP, "App.jsx");

        assert!(result.success);
        assert!(result.html.contains("<h1>Hello from stillframe</h1>"));
        assert!(!result.html.contains("onClick"));
    }
}
