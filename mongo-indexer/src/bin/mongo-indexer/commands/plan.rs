use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Table};
use serde::Serialize;

use mongo_indexer::{IndexSpecification, TagWarning, parse_model_indexes_with};

use crate::commands::load_models;
use crate::context::ProjectContext;
use crate::examples::ExampleGroup;
use crate::output::{GlobalOptions, OutputManager, TableDisplay, add_table_header, create_table};
use crate::scanner::ScannedModel;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Planning",
    commands: &[
        "mongo-indexer plan                 # Show every index declared in the project",
        "mongo-indexer plan User            # Show indexes for one model",
        "mongo-indexer --output json plan   # Machine-readable plan",
    ],
}];

#[derive(Args)]
pub struct PlanArgs {
    /// Model or collection to plan (optional, plans all if omitted)
    pub model: Option<String>,
}

/// One planned index, flattened for display.
#[derive(Debug, Serialize)]
pub struct PlannedIndex {
    pub collection: String,
    pub model: String,
    pub name: String,
    pub spec: IndexSpecification,
}

#[derive(Debug, Default, Serialize)]
pub struct PlanReport {
    pub indexes: Vec<PlannedIndex>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl PlanReport {
    /// Compile every model, collecting failures instead of stopping at the first.
    pub fn build(models: &[ScannedModel]) -> Self {
        let mut report = Self::default();
        for model in models {
            let mut warnings = Vec::new();
            let result = parse_model_indexes_with(&model.descriptor, |field, warning: TagWarning| {
                warnings.push(format!("{} field {}: {warning}", model.name(), field.name));
            });
            report.warnings.extend(warnings);

            match result {
                Ok(specs) => report.indexes.extend(specs.into_iter().map(|spec| PlannedIndex {
                    collection: model.collection.clone(),
                    model: model.name().to_string(),
                    name: spec.index_name(),
                    spec,
                })),
                Err(err) => report.errors.push(format!("{} ({}): {err}", model.name(), model.location())),
            }
        }
        report
    }
}

fn options_summary(spec: &IndexSpecification) -> String {
    let options = &spec.options;
    let mut parts = Vec::new();
    if options.unique {
        parts.push("unique".to_string());
    }
    if options.sparse {
        parts.push("sparse".to_string());
    }
    if let Some(ttl) = options.ttl_seconds {
        parts.push(format!("ttl={ttl}s"));
    }
    if let Some(filter) = &options.partial_filter {
        parts.push(format!("partial={}", serde_json::Value::Object(filter.clone())));
    }
    parts.join(", ")
}

impl TableDisplay for PlanReport {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = create_table(options);
        add_table_header(&mut table, options, &["Collection", "Model", "Key", "Dir", "Name", "Options"]);
        for index in &self.indexes {
            table.add_row(vec![
                Cell::new(&index.collection),
                Cell::new(&index.model),
                Cell::new(&index.spec.key),
                Cell::new(index.spec.direction().to_string()),
                Cell::new(&index.name),
                Cell::new(options_summary(&index.spec)),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.indexes
            .iter()
            .map(|index| format!("{}.{}:{}", index.collection, index.spec.key, index.spec.direction().as_i32()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub async fn handle_plan(args: PlanArgs, output: &OutputManager) -> Result<()> {
    let ctx = ProjectContext::find()?;
    let models = load_models(&ctx, args.model.as_deref(), output)?;

    output.heading("Index Plan");
    if models.is_empty() {
        output.info("No IndexedModel structs found in the configured scan directories.");
        return Ok(());
    }

    let report = PlanReport::build(&models);
    for warning in &report.warnings {
        output.warning(warning);
    }

    if report.indexes.is_empty() && report.errors.is_empty() {
        output.info("Models were found, but none declare indexes.");
    } else {
        output.display(&report)?;
    }

    for error in &report.errors {
        output.error(error);
    }
    if !report.errors.is_empty() {
        anyhow::bail!("{} model(s) have invalid index annotations", report.errors.len());
    }

    log::debug!("planned {} index(es) across {} model(s)", report.indexes.len(), models.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongo_indexer::FieldDescriptor;

    fn model(name: &str, fields: Vec<FieldDescriptor>) -> ScannedModel {
        let mut model = ScannedModel::new(name, "src/models.rs".to_string(), 1);
        for field in fields {
            model.descriptor.push_field(field);
        }
        model
    }

    #[test]
    fn test_report_collects_indexes_warnings_and_errors() {
        let models = vec![
            model(
                "User",
                vec![
                    FieldDescriptor::new("Email").key("email,omitempty").index("unique,asc,desc"),
                    FieldDescriptor::new("Name"),
                ],
            ),
            model("Session", vec![FieldDescriptor::new("Expires").index("ttl=soon")]),
        ];

        let report = PlanReport::build(&models);
        assert_eq!(report.indexes.len(), 1);
        assert_eq!(report.indexes[0].collection, "users");
        assert_eq!(report.indexes[0].name, "email_-1");
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].starts_with("User field Email"));
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("field Expires: invalid ttl value: soon"));
    }

    #[test]
    fn test_compact_and_options_summary() {
        let models = vec![model(
            "Event",
            vec![FieldDescriptor::new("At").key("at").index("desc,sparse,ttl=60")],
        )];
        let report = PlanReport::build(&models);
        assert_eq!(report.to_compact(), "events.at:-1");
        assert_eq!(options_summary(&report.indexes[0].spec), "sparse, ttl=60s");
    }
}
