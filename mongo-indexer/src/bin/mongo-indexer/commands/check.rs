use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Color as TableColor, Table};
use serde::Serialize;

use mongo_indexer::{Indexer, IndexerConfig};

use crate::commands::load_models;
use crate::context::ProjectContext;
use crate::examples::ExampleGroup;
use crate::output::{GlobalOptions, OutputManager, TableDisplay, add_table_header, create_table};
use crate::scanner::ScannedModel;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Validation",
    commands: &[
        "mongo-indexer check                # Fail on annotations that cannot be compiled",
        "mongo-indexer check --strict       # Also fail on unknown or conflicting tokens",
    ],
}];

#[derive(Args)]
pub struct CheckArgs {
    /// Model or collection to check (optional, checks all if omitted)
    pub model: Option<String>,

    /// Treat tag warnings as errors
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Serialize)]
pub struct ModelCheck {
    pub model: String,
    pub collection: String,
    pub source: String,
    pub indexes: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ModelCheck {
    pub fn run(model: &ScannedModel, indexer: &Indexer) -> Self {
        let mut warnings = Vec::new();
        let planned = indexer.plan_with(&model.descriptor, |field, warning| {
            warnings.push(format!("field {}: {warning}", field.name));
        });

        let (indexes, error) = match planned {
            Ok(specs) => (specs.len(), None),
            Err(err) => (0, Some(err.to_string())),
        };

        Self {
            model: model.name().to_string(),
            collection: model.collection.clone(),
            source: model.location(),
            indexes,
            warnings,
            error,
        }
    }

    pub fn passed(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub strict: bool,
    pub models: Vec<ModelCheck>,
}

impl CheckReport {
    pub fn failures(&self) -> usize {
        self.models.iter().filter(|check| !check.passed()).count()
    }
}

impl TableDisplay for CheckReport {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = create_table(options);
        add_table_header(&mut table, options, &["Model", "Collection", "Indexes", "Status", "Source"]);
        for check in &self.models {
            let status = match (&check.error, check.warnings.len()) {
                (Some(error), _) => Cell::new(error).fg(TableColor::Red),
                (None, 0) => Cell::new("ok").fg(TableColor::Green),
                (None, n) => Cell::new(format!("ok ({n} warning(s))")).fg(TableColor::Yellow),
            };
            table.add_row(vec![
                Cell::new(&check.model),
                Cell::new(&check.collection),
                Cell::new(check.indexes),
                status,
                Cell::new(&check.source),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        format!(
            "models={} failures={} strict={}",
            self.models.len(),
            self.failures(),
            self.strict
        )
    }
}

pub async fn handle_check(args: CheckArgs, output: &OutputManager) -> Result<()> {
    let ctx = ProjectContext::find()?;
    let models = load_models(&ctx, args.model.as_deref(), output)?;

    output.heading(if args.strict { "Index Check (strict)" } else { "Index Check" });
    if models.is_empty() {
        output.info("No IndexedModel structs found in the configured scan directories.");
        return Ok(());
    }

    let indexer = Indexer::with_config(IndexerConfig { strict: args.strict });
    let report = CheckReport {
        strict: args.strict,
        models: models.iter().map(|model| ModelCheck::run(model, &indexer)).collect(),
    };
    output.display(&report)?;

    if !args.strict {
        for check in &report.models {
            for warning in &check.warnings {
                output.warning(&format!("{}: {warning}", check.model));
            }
        }
    }

    match report.failures() {
        0 => {
            output.success(&format!("{} model(s) checked", report.models.len()));
            Ok(())
        }
        failures => anyhow::bail!("{failures} model(s) failed the index check"),
    }
}
