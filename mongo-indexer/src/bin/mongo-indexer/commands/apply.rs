use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, Table};
use mongodb::Client;
use serde::Serialize;

use mongo_indexer::mongo::MongoCollection;
use mongo_indexer::{Indexer, IndexerConfig};

use crate::commands::load_models;
use crate::context::ProjectContext;
use crate::examples::ExampleGroup;
use crate::output::{GlobalOptions, OutputManager, TableDisplay, add_table_header, create_table};

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Applying",
    commands: &[
        "mongo-indexer apply --database app          # Create all declared indexes",
        "mongo-indexer apply User --database app     # Create indexes for one model",
        "mongo-indexer apply --strict                # Refuse annotations with warnings",
    ],
}];

#[derive(Args)]
pub struct ApplyArgs {
    /// Model or collection to apply (optional, applies all if omitted)
    pub model: Option<String>,

    /// Database name (overrides [mongodb].database in mongo-indexer.toml)
    #[arg(long, env = "MONGODB_DATABASE")]
    pub database: Option<String>,

    /// Treat tag warnings as errors
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Serialize)]
pub struct AppliedModel {
    pub model: String,
    pub collection: String,
    pub indexes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ApplyReport {
    pub database: String,
    pub applied: Vec<AppliedModel>,
}

impl TableDisplay for ApplyReport {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = create_table(options);
        add_table_header(&mut table, options, &["Collection", "Model", "Indexes"]);
        for applied in &self.applied {
            table.add_row(vec![
                Cell::new(&applied.collection),
                Cell::new(&applied.model),
                Cell::new(applied.indexes.join(", ")),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        let total: usize = self.applied.iter().map(|applied| applied.indexes.len()).sum();
        format!("database={} models={} indexes={total}", self.database, self.applied.len())
    }
}

pub async fn handle_apply(args: ApplyArgs, output: &OutputManager) -> Result<()> {
    let ctx = ProjectContext::find()?;
    let models = load_models(&ctx, args.model.as_deref(), output)?;

    output.heading("Apply Indexes");
    if models.is_empty() {
        output.info("No IndexedModel structs found in the configured scan directories.");
        return Ok(());
    }

    let database = args
        .database
        .or_else(|| ctx.config.mongodb.database.clone())
        .context("No database given. Pass --database or set [mongodb].database in mongo-indexer.toml")?;
    let uri = ctx
        .mongodb_uri()
        .context("MONGODB_URI environment variable not set. Set it to connect to MongoDB.")?;

    output.progress("Connecting to MongoDB");
    let client = Client::with_uri_str(&uri).await.context("Failed to connect to MongoDB")?;
    output.clear_line();
    output.success("Connected to MongoDB");

    let db = client.database(&database);
    let indexer = Indexer::with_config(IndexerConfig { strict: args.strict });
    let mut report = ApplyReport {
        database,
        applied: Vec::new(),
    };

    for model in &models {
        output.verbose(&format!("{} -> {}", model.name(), model.collection));
        let collection = MongoCollection::new(db.collection::<bson::Document>(&model.collection));
        let indexes = indexer
            .create_indexes(&collection, &model.descriptor)
            .await
            .with_context(|| format!("Failed to apply indexes for {} ({})", model.name(), model.location()))?;

        if indexes.is_empty() {
            output.verbose(&format!("{} declares no indexes", model.name()));
            continue;
        }
        report.applied.push(AppliedModel {
            model: model.name().to_string(),
            collection: model.collection.clone(),
            indexes,
        });
    }

    output.display(&report)?;
    output.success(&format!("Applied indexes for {} model(s)", report.applied.len()));
    Ok(())
}
