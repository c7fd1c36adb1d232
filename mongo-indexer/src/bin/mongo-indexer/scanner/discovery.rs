//! File discovery for finding Rust files containing IndexedModel.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const DERIVE_NAME: &str = "IndexedModel";

/// Discovered model file with basic metadata
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Absolute path to the file
    pub path: PathBuf,
    /// Path relative to project root
    pub relative_path: String,
}

/// Discover all Rust files under `dirs` that mention `IndexedModel`.
pub fn discover_models(project_root: &Path, dirs: &[PathBuf]) -> Result<Vec<DiscoveredFile>> {
    let mut discovered = Vec::new();

    for search_path in dirs {
        if !search_path.exists() {
            continue;
        }

        for entry in WalkDir::new(search_path)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();

            if path.extension().is_none_or(|ext| ext != "rs") {
                continue;
            }

            // Skip hidden files and directories
            if path
                .strip_prefix(project_root)
                .unwrap_or(path)
                .components()
                .any(|c| c.as_os_str().to_string_lossy().starts_with('.'))
            {
                continue;
            }

            if file_mentions_derive(path)? {
                let relative_path = path
                    .strip_prefix(project_root)
                    .unwrap_or(path)
                    .to_string_lossy()
                    .to_string();

                discovered.push(DiscoveredFile {
                    path: path.to_path_buf(),
                    relative_path,
                });
            }
        }
    }

    // Sort by relative path for consistent ordering
    discovered.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    discovered.dedup_by(|a, b| a.path == b.path);

    Ok(discovered)
}

/// Fast text-based check before doing full parsing.
fn file_mentions_derive(path: &Path) -> Result<bool> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    Ok(content.contains(DERIVE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discovers_only_matching_rust_files() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        std::fs::create_dir_all(src.join("models")).unwrap();
        std::fs::create_dir_all(src.join(".hidden")).unwrap();
        std::fs::write(src.join("models/user.rs"), "#[derive(IndexedModel)] struct User {}").unwrap();
        std::fs::write(src.join("lib.rs"), "pub mod models;").unwrap();
        std::fs::write(src.join("notes.md"), "IndexedModel").unwrap();
        std::fs::write(src.join(".hidden/skip.rs"), "#[derive(IndexedModel)] struct Skip {}").unwrap();

        let found = discover_models(dir.path(), &[src, dir.path().join("missing")]).unwrap();
        let paths: Vec<_> = found.iter().map(|f| f.relative_path.replace('\\', "/")).collect();
        assert_eq!(paths, vec!["src/models/user.rs"]);
    }
}
