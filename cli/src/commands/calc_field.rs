//! `wren calc-field ...`

use serde_json::json;
use tabled::Tabled;
use wren_shared::CalculatedFieldInput;

use crate::app::{App, Connect};
use crate::cli::CalcFieldAction;
use crate::error::CliError;
use crate::output::dash;

#[derive(Tabled)]
struct CalcFieldRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    data_type: String,
    #[tabled(rename = "Expression")]
    expression: String,
}

fn lineage_text(lineage: &[i64]) -> String {
    lineage
        .iter()
        .map(i64::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

pub async fn run<C: Connect>(
    app: &mut App<'_, C>,
    action: CalcFieldAction,
) -> Result<(), CliError> {
    let (session, _) = app.project_session()?;

    match action {
        CalcFieldAction::List { model_id } => {
            let fields = session.client.list_calculated_fields(model_id).await?;
            if app.out.is_json() {
                return app.out.json(&fields);
            }
            if fields.is_empty() {
                return app
                    .out
                    .line(format!("No calculated fields on model {}.", model_id));
            }
            let rows = fields.into_iter().map(|f| CalcFieldRow {
                id: f.id,
                name: f.display_name,
                data_type: dash(f.data_type.as_deref()),
                expression: dash(f.expression.as_deref()),
            });
            app.out.table(rows)
        }

        CalcFieldAction::Create {
            model_id,
            name,
            expression,
            lineage,
        } => {
            let input = CalculatedFieldInput {
                name,
                expression,
                lineage: lineage.0,
            };
            let created = session
                .client
                .create_calculated_field(model_id, &input)
                .await?;
            if app.out.is_json() {
                return app.out.json(&created);
            }
            app.out.success(format!(
                "Created calculated field {} = {}({}) on model {}",
                input.name,
                input.expression,
                lineage_text(&input.lineage),
                model_id
            ))
        }

        CalcFieldAction::Update {
            field_id,
            name,
            expression,
            lineage,
        } => {
            let input = CalculatedFieldInput {
                name,
                expression,
                lineage: lineage.0,
            };
            let updated = session
                .client
                .update_calculated_field(field_id, &input)
                .await?;
            if app.out.is_json() {
                return app.out.json(&updated);
            }
            app.out.success(format!(
                "Updated calculated field {} = {}({})",
                field_id,
                input.expression,
                lineage_text(&input.lineage)
            ))
        }

        CalcFieldAction::Delete { field_id } => {
            session.client.delete_calculated_field(field_id).await?;
            if app.out.is_json() {
                return app.out.json(&json!({ "deleted": field_id }));
            }
            app.out
                .success(format!("Deleted calculated field {}", field_id))
        }

        CalcFieldAction::Validate {
            model_id,
            name,
            column_id,
        } => {
            let verdict = session
                .client
                .validate_calculated_field(model_id, &name, column_id)
                .await?;
            if app.out.is_json() {
                app.out.json(&verdict)?;
            } else if verdict.valid {
                app.out
                    .success(format!("{:?} is a valid calculated field name", name))?;
            }
            if verdict.valid {
                return Ok(());
            }
            let reason = verdict
                .message
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "name is not valid".to_string());
            Err(CliError::invalid(format!("{:?}: {}", name, reason)))
        }
    }
}
