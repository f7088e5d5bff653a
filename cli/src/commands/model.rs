//! `wren model ...`

use tabled::Tabled;
use wren_shared::{DetailedModel, Field};

use crate::app::{App, Connect};
use crate::cli::ModelAction;
use crate::error::CliError;
use crate::output::{dash, format_sql, indent, truncate};

#[derive(Tabled)]
struct ModelRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Reference")]
    reference: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Fields")]
    fields: String,
    #[tabled(rename = "Description")]
    description: String,
}

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Reference")]
    reference: String,
    #[tabled(rename = "Type")]
    data_type: String,
    #[tabled(rename = "Not Null")]
    not_null: &'static str,
    #[tabled(rename = "Expression")]
    expression: String,
}

impl From<&Field> for FieldRow {
    fn from(field: &Field) -> Self {
        Self {
            id: field.id,
            name: field.display_name.clone(),
            reference: field.reference_name.clone(),
            data_type: dash(field.data_type.as_deref()),
            not_null: if field.not_null { "yes" } else { "" },
            expression: dash(field.expression.as_deref()),
        }
    }
}

fn field_rows(model: &DetailedModel) -> Vec<FieldRow> {
    model
        .fields
        .iter()
        .chain(model.calculated_fields.iter())
        .map(FieldRow::from)
        .collect()
}

pub async fn run<C: Connect>(app: &mut App<'_, C>, action: ModelAction) -> Result<(), CliError> {
    let (session, _) = app.project_session()?;

    match action {
        ModelAction::List => {
            let models = session.client.list_models().await?;
            if app.out.is_json() {
                return app.out.json(&models);
            }
            if models.is_empty() {
                return app.out.line("No models found.");
            }
            let rows = models.into_iter().map(|m| ModelRow {
                id: m.id,
                name: m.display_name,
                reference: m.reference_name,
                source: match (m.source_table_name, m.ref_sql) {
                    (Some(table), _) if !table.is_empty() => table,
                    (_, Some(sql)) if !sql.is_empty() => "(SQL)".to_string(),
                    _ => "-".to_string(),
                },
                fields: format!("{} (+{} calc)", m.fields.len(), m.calculated_fields.len()),
                description: truncate(m.description.as_deref().unwrap_or(""), 50),
            });
            app.out.table(rows)
        }

        ModelAction::Describe { id } => {
            let model = session.client.get_model(id).await?;
            if app.out.is_json() {
                return app.out.json(&model);
            }

            app.out.field("Name", &model.display_name)?;
            app.out.field("Reference", &model.reference_name)?;
            app.out
                .field("Source", dash(model.source_table_name.as_deref()))?;
            app.out
                .field("Primary Key", dash(model.primary_key.as_deref()))?;
            let cache = if model.cached {
                format!("yes (refresh {})", dash(model.refresh_time.as_deref()))
            } else {
                "no".to_string()
            };
            app.out.field("Cached", cache)?;
            if let Some(description) = model.description.as_deref().filter(|d| !d.is_empty()) {
                app.out.field("Description", description)?;
            }
            if let Some(sql) = model.ref_sql.as_deref().filter(|s| !s.is_empty()) {
                app.out.line("SQL:")?;
                app.out.line(indent(&format_sql(sql), "  "))?;
            }

            app.out.line("")?;
            app.out.line(format!(
                "Fields ({} + {} calculated):",
                model.fields.len(),
                model.calculated_fields.len()
            ))?;
            app.out.table(field_rows(&model))?;

            if !model.relations.is_empty() {
                app.out.line("")?;
                app.out.line("Relations:")?;
                for r in &model.relations {
                    app.out.line(format!(
                        "  {}  model {}.{} -> model {}.{}  {}",
                        r.relation_type,
                        r.from_model_id,
                        r.from_column_id,
                        r.to_model_id,
                        r.to_column_id,
                        dash(r.name.as_deref())
                    ))?;
                }
            }
            Ok(())
        }

        ModelAction::Fields { id } => {
            let model = session.client.get_model(id).await?;
            if app.out.is_json() {
                let fields: Vec<&Field> = model
                    .fields
                    .iter()
                    .chain(model.calculated_fields.iter())
                    .collect();
                return app.out.json(&fields);
            }
            let rows = field_rows(&model);
            if rows.is_empty() {
                return app.out.line("No fields found.");
            }
            app.out.table(rows)
        }
    }
}
