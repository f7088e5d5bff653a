//! `wren thread ...`

use serde_json::json;
use tabled::Tabled;

use crate::app::{App, Connect};
use crate::cli::ThreadAction;
use crate::error::CliError;
use crate::output::{dash, format_sql, indent, truncate};

#[derive(Tabled)]
struct ThreadRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Summary")]
    summary: String,
}

pub async fn run<C: Connect>(app: &mut App<'_, C>, action: ThreadAction) -> Result<(), CliError> {
    let (session, _) = app.project_session()?;

    match action {
        ThreadAction::List => {
            let threads = session.client.list_threads().await?;
            if app.out.is_json() {
                return app.out.json(&threads);
            }
            if threads.is_empty() {
                return app.out.line("No threads found.");
            }
            let rows = threads.into_iter().map(|t| ThreadRow {
                id: t.id,
                summary: truncate(&dash(t.summary.as_deref()), 80),
            });
            app.out.table(rows)
        }

        ThreadAction::Show { id } => {
            let thread = session.client.get_thread(id).await?;
            if app.out.is_json() {
                return app.out.json(&thread);
            }
            app.out.field("Thread", thread.id)?;
            if thread.responses.is_empty() {
                return app.out.line("No responses in this thread.");
            }
            for response in &thread.responses {
                app.out.line("")?;
                app.out
                    .line(format!("[{}] {}", response.id, response.question))?;
                if let Some(sql) = response.sql.as_deref().filter(|s| !s.is_empty()) {
                    app.out.line(indent(&format_sql(sql), "    "))?;
                }
            }
            Ok(())
        }

        ThreadAction::Rename { id, summary } => {
            let thread = session.client.rename_thread(id, &summary).await?;
            if app.out.is_json() {
                return app.out.json(&thread);
            }
            app.out.success(format!("Renamed thread {}", thread.id))
        }

        ThreadAction::Delete { id } => {
            session.client.delete_thread(id).await?;
            if app.out.is_json() {
                return app.out.json(&json!({ "deleted": id }));
            }
            app.out.success(format!("Deleted thread {}", id))
        }
    }
}
