//! Model scanning for parsing `IndexedModel` structs from Rust source files.
//!
//! Mirrors the derive macro's attribute rules so the CLI can plan indexes
//! without compiling the project.

mod discovery;
mod parser;
mod schema;

pub use discovery::discover_models;
pub use parser::parse_model_file;
pub use schema::ScannedModel;

use anyhow::Result;
use std::path::PathBuf;

/// Discover and parse every model under `dirs`.
pub fn scan(project_root: &std::path::Path, dirs: &[PathBuf]) -> Result<Vec<ScannedModel>> {
    let mut models = Vec::new();
    for file in discover_models(project_root, dirs)? {
        models.extend(parse_model_file(&file.path, &file.relative_path)?);
    }
    Ok(models)
}
