//! `wren view ...`

use serde_json::json;
use tabled::Tabled;

use crate::app::{App, Connect};
use crate::cli::ViewAction;
use crate::error::CliError;
use crate::output::{dash, format_sql, indent, truncate};

#[derive(Tabled)]
struct ViewRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Display Name")]
    display_name: String,
    #[tabled(rename = "Statement")]
    statement: String,
}

pub async fn run<C: Connect>(app: &mut App<'_, C>, action: ViewAction) -> Result<(), CliError> {
    let (session, _) = app.project_session()?;

    match action {
        ViewAction::List => {
            let views = session.client.list_views().await?;
            if app.out.is_json() {
                return app.out.json(&views);
            }
            if views.is_empty() {
                return app.out.line("No views found.");
            }
            let rows = views.into_iter().map(|v| ViewRow {
                id: v.id,
                name: v.name,
                display_name: dash(v.display_name.as_deref()),
                statement: truncate(&v.statement.unwrap_or_default().replace('\n', " "), 60),
            });
            app.out.table(rows)
        }

        ViewAction::Show { id } => {
            let view = session.client.get_view(id).await?;
            if app.out.is_json() {
                return app.out.json(&view);
            }
            app.out.field("ID", view.id)?;
            app.out.field("Name", &view.name)?;
            app.out
                .field("Display Name", dash(view.display_name.as_deref()))?;
            if let Some(statement) = view.statement.as_deref().filter(|s| !s.is_empty()) {
                app.out.line("Statement:")?;
                app.out.line(indent(&format_sql(statement), "  "))?;
            }
            Ok(())
        }

        ViewAction::Create { name, response_id } => {
            let view = session.client.create_view(&name, response_id).await?;
            if app.out.is_json() {
                return app.out.json(&view);
            }
            app.out
                .success(format!("Created view {} ({})", view.id, view.name))
        }

        ViewAction::Delete { id } => {
            session.client.delete_view(id).await?;
            if app.out.is_json() {
                return app.out.json(&json!({ "deleted": id }));
            }
            app.out.success(format!("Deleted view {}", id))
        }
    }
}
