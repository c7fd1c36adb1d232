#[cfg(feature = "mongodb")]
pub mod apply;
pub mod check;
pub mod plan;

use anyhow::Result;

use crate::context::ProjectContext;
use crate::output::OutputManager;
use crate::scanner::{self, ScannedModel};

/// Scan the project and keep models matching `filter` (struct or collection name).
pub(crate) fn load_models(
    ctx: &ProjectContext,
    filter: Option<&str>,
    output: &OutputManager,
) -> Result<Vec<ScannedModel>> {
    if ctx.config_path.exists() {
        output.verbose(&format!("Using {}", ctx.config_path.display()));
    }
    let dirs = ctx.scan_dirs();
    for dir in &dirs {
        output.verbose(&format!("Scanning {}", dir.display()));
    }

    let mut models = scanner::scan(&ctx.project_root, &dirs)?;
    if let Some(filter) = filter {
        models.retain(|model| model.name() == filter || model.collection == filter);
        if models.is_empty() {
            anyhow::bail!("No IndexedModel named '{filter}' (or using that collection) was found");
        }
    }

    models.sort_by(|a, b| a.collection.cmp(&b.collection).then_with(|| a.name().cmp(b.name())));
    output.verbose(&format!("Found {} model(s)", models.len()));
    Ok(models)
}
