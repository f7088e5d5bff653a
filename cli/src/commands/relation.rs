//! `wren relation ...`

use serde_json::json;
use tabled::Tabled;
use wren_shared::NewRelation;

use crate::app::{App, Connect};
use crate::cli::RelationAction;
use crate::error::CliError;

#[derive(Tabled)]
struct RelationRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Type")]
    relation_type: String,
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
}

pub async fn run<C: Connect>(
    app: &mut App<'_, C>,
    action: RelationAction,
) -> Result<(), CliError> {
    let (session, _) = app.project_session()?;

    match action {
        RelationAction::List => {
            let relations = session.client.list_relations().await?;
            if app.out.is_json() {
                return app.out.json(&relations);
            }
            if relations.is_empty() {
                return app.out.line("No relations found.");
            }
            let rows = relations.into_iter().map(|r| RelationRow {
                id: r.relation_id,
                relation_type: r.relation_type.to_string(),
                from: format!("{}.{}", r.from_model_name, r.from_column_name),
                to: format!("{}.{}", r.to_model_name, r.to_column_name),
            });
            app.out.table(rows)
        }

        RelationAction::Create {
            from_model,
            from_column,
            to_model,
            to_column,
            relation_type,
        } => {
            let relation = NewRelation {
                from_model_id: from_model,
                from_column_id: from_column,
                to_model_id: to_model,
                to_column_id: to_column,
                relation_type,
            };
            let created = session.client.create_relation(&relation).await?;
            if app.out.is_json() {
                return app.out.json(&created);
            }
            app.out.success(format!(
                "Created {} relation: model {}.{} -> model {}.{}",
                relation_type, from_model, from_column, to_model, to_column
            ))?;
            app.out
                .note("Run `wren deploy` to apply the change to queries.")
        }

        RelationAction::Update { id, relation_type } => {
            session.client.update_relation(id, relation_type).await?;
            if app.out.is_json() {
                return app
                    .out
                    .json(&json!({ "id": id, "type": relation_type.as_str() }));
            }
            app.out
                .success(format!("Updated relation {} to {}", id, relation_type))
        }

        RelationAction::Delete { id } => {
            session.client.delete_relation(id).await?;
            if app.out.is_json() {
                return app.out.json(&json!({ "deleted": id }));
            }
            app.out.success(format!("Deleted relation {}", id))
        }
    }
}
