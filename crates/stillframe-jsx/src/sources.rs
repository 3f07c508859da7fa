//! In-memory set of component sources and entry file lookup.
//!
//! Scans a project directory for component files and keeps their text keyed
//! by a `/`-separated path relative to the scanned root.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use walkdir::{DirEntry, WalkDir};

use crate::transpiler::{Conversion, Transpiler};

/// Conventional entry file names, in lookup order.
pub const ENTRY_CANDIDATES: &[&str] = &[
    "App.jsx",
    "App.tsx",
    "src/App.jsx",
    "src/App.tsx",
    "App.js",
    "src/App.js",
    "index.jsx",
    "index.tsx",
];

/// Extensions of files that may hold a component.
const COMPONENT_EXTENSIONS: &[&str] = &["jsx", "tsx", "js", "ts"];

/// Ordered map of logical path to source text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSet {
    files: BTreeMap<String, String>,
}

impl SourceSet {
    /// Create a new empty source set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every component file under `dir`.
    ///
    /// Files that cannot be read as UTF-8 text are logged and skipped.
    pub fn scan(dir: &Path) -> Result<Self, SourceError> {
        if !dir.exists() {
            return Err(SourceError::DirectoryNotFound(dir.display().to_string()));
        }

        let mut set = Self::new();

        for entry in WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_ignored_dir(e))
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !is_component_file(path) {
                continue;
            }

            let source = match fs::read_to_string(path) {
                Ok(source) => source,
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", path.display(), e);
                    continue;
                }
            };

            set.insert(logical_path(dir, path), source);
        }

        tracing::debug!("Loaded {} source files from {}", set.len(), dir.display());

        Ok(set)
    }

    /// Insert or replace a file, returning the previous text.
    pub fn insert(&mut self, path: impl Into<String>, source: impl Into<String>) -> Option<String> {
        self.files.insert(path.into(), source.into())
    }

    /// Remove a file, returning its text.
    pub fn remove(&mut self, path: &str) -> Option<String> {
        self.files.remove(path)
    }

    /// Look up a file by logical path.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    /// Check if a file exists.
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// All logical paths, sorted.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// All files as `(path, source)` pairs, sorted by path.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(p, s)| (p.as_str(), s.as_str()))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Find the entry file: `preferred` if present, else the first conventional name.
    pub fn entry(&self, preferred: Option<&str>) -> Option<(&str, &str)> {
        preferred
            .into_iter()
            .chain(ENTRY_CANDIDATES.iter().copied())
            .find_map(|name| self.files.get_key_value(name))
            .map(|(p, s)| (p.as_str(), s.as_str()))
    }

    /// Convert the entry file.
    pub fn render_entry(
        &self,
        transpiler: &Transpiler,
        preferred: Option<&str>,
    ) -> Result<Conversion, SourceError> {
        let (path, source) = self.entry(preferred).ok_or(SourceError::EntryNotFound)?;
        Ok(transpiler.convert(source, path))
    }
}

/// Errors that can occur while loading sources.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Source directory not found: {0}")]
    DirectoryNotFound(String),

    #[error("No entry file found (looked for {})", ENTRY_CANDIDATES.join(", "))]
    EntryNotFound,
}

/// Whether `path` names a component file worth previewing.
///
/// Test, spec and story files are skipped.
pub fn is_component_file(path: &Path) -> bool {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if !COMPONENT_EXTENSIONS.contains(&ext) {
        return false;
    }

    let filename = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    !(filename.contains(".test.")
        || filename.contains(".spec.")
        || filename.contains(".stories.")
        || filename.ends_with(".d.ts"))
}

/// `/`-separated path of `path` relative to `root`.
pub fn logical_path(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);

    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn is_ignored_dir(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_str().unwrap_or("");
    entry.file_type().is_dir()
        && (name == "node_modules" || name == "dist" || name.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn scans_component_directory() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("components")).unwrap();
        fs::create_dir_all(temp.path().join("node_modules/react")).unwrap();

        fs::write(temp.path().join("App.jsx"), "export default function App() {}").unwrap();
        fs::write(src.join("components/Button.tsx"), "export function Button() {}").unwrap();
        fs::write(src.join("components/Button.test.tsx"), "test()").unwrap();
        fs::write(src.join("notes.md"), "# notes").unwrap();
        fs::write(temp.path().join("node_modules/react/index.js"), "x").unwrap();

        let set = SourceSet::scan(temp.path()).unwrap();

        assert_eq!(
            set.paths().collect::<Vec<_>>(),
            vec!["App.jsx", "src/components/Button.tsx"]
        );
    }

    #[test]
    fn skips_unreadable_files() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("App.jsx"), "export default function App() {}").unwrap();
        fs::write(temp.path().join("legacy.js"), [0xff, 0xfe, b'x']).unwrap();

        let set = SourceSet::scan(temp.path()).unwrap();

        assert_eq!(set.paths().collect::<Vec<_>>(), vec!["App.jsx"]);
    }

    #[test]
    fn errors_on_missing_directory() {
        let temp = tempdir().unwrap();
        let result = SourceSet::scan(&temp.path().join("missing"));

        assert!(matches!(result, Err(SourceError::DirectoryNotFound(_))));
    }

    #[test]
    fn finds_conventional_entry() {
        let mut set = SourceSet::new();
        set.insert("components/Card.jsx", "card");
        set.insert("src/App.tsx", "app");

        assert_eq!(set.entry(None), Some(("src/App.tsx", "app")));
    }

    #[test]
    fn prefers_configured_entry() {
        let mut set = SourceSet::new();
        set.insert("App.jsx", "app");
        set.insert("Landing.jsx", "landing");

        assert_eq!(set.entry(Some("Landing.jsx")), Some(("Landing.jsx", "landing")));
        assert_eq!(set.entry(Some("Missing.jsx")), Some(("App.jsx", "app")));
    }

    #[test]
    fn renders_entry() {
        let mut set = SourceSet::new();
        set.insert(
            "App.jsx",
            "export default function App() {\n  return <h1>Hi</h1>;\n}\n",
        );

        let result = set.render_entry(&Transpiler::default(), None).unwrap();

        assert!(result.success);
        assert!(result.html.contains("<h1>Hi</h1>"));
    }

    #[test]
    fn reports_missing_entry() {
        let mut set = SourceSet::new();
        set.insert("Card.jsx", "card");

        let result = set.render_entry(&Transpiler::default(), None);

        assert!(matches!(result, Err(SourceError::EntryNotFound)));
    }

    #[test]
    fn tracks_edits() {
        let mut set = SourceSet::new();

        assert_eq!(set.insert("App.jsx", "one"), None);
        assert_eq!(set.insert("App.jsx", "two"), Some("one".to_string()));
        assert_eq!(set.get("App.jsx"), Some("two"));
        assert_eq!(set.remove("App.jsx"), Some("two".to_string()));
        assert!(set.is_empty());
    }
}
