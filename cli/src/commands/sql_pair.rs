//! `wren sql-pair ...`

use serde_json::json;
use tabled::Tabled;
use wren_shared::{ApiError, NewSqlPair, SqlPairUpdate};

use crate::app::{App, Connect};
use crate::cli::SqlPairAction;
use crate::error::CliError;
use crate::output::{format_sql, indent, short_time, truncate};

#[derive(Tabled)]
struct SqlPairRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Question")]
    question: String,
    #[tabled(rename = "SQL")]
    sql: String,
}

pub async fn run<C: Connect>(
    app: &mut App<'_, C>,
    action: SqlPairAction,
) -> Result<(), CliError> {
    match action {
        SqlPairAction::List => {
            let (session, _) = app.project_session()?;
            let pairs = session.client.list_sql_pairs().await?;
            if app.out.is_json() {
                return app.out.json(&pairs);
            }
            if pairs.is_empty() {
                return app.out.line("No SQL pairs found.");
            }
            let rows = pairs.into_iter().map(|p| SqlPairRow {
                id: p.id,
                question: truncate(&p.question, 50),
                sql: truncate(&p.sql.replace('\n', " "), 60),
            });
            app.out.table(rows)
        }

        SqlPairAction::Show { id } => {
            let (session, _) = app.project_session()?;
            let pair = match session.client.get_sql_pair(id).await {
                Ok(pair) => pair,
                Err(ApiError::NotFound(message)) => return Err(CliError::NotFound(message)),
                Err(e) => return Err(e.into()),
            };
            if app.out.is_json() {
                return app.out.json(&pair);
            }
            app.out.field("ID", pair.id)?;
            app.out.field("Question", &pair.question)?;
            app.out.field("Created", short_time(pair.created_at.as_deref()))?;
            app.out.field("Updated", short_time(pair.updated_at.as_deref()))?;
            app.out.line("SQL:")?;
            app.out.line(indent(&format_sql(&pair.sql), "  "))
        }

        SqlPairAction::Create { question, sql } => {
            let (session, _) = app.project_session()?;
            let created = session
                .client
                .create_sql_pair(&NewSqlPair { question, sql })
                .await?;
            if app.out.is_json() {
                return app.out.json(&created);
            }
            app.out.success(format!("Created SQL pair {}", created.id))
        }

        SqlPairAction::Update { id, question, sql } => {
            let update = SqlPairUpdate { question, sql };
            if update.is_empty() {
                return Err(CliError::invalid(
                    "no changes specified; use --question or --sql",
                ));
            }
            let (session, _) = app.project_session()?;
            let updated = session.client.update_sql_pair(id, &update).await?;
            if app.out.is_json() {
                return app.out.json(&updated);
            }
            app.out.success(format!("Updated SQL pair {}", updated.id))
        }

        SqlPairAction::Delete { id } => {
            let (session, _) = app.project_session()?;
            session.client.delete_sql_pair(id).await?;
            if app.out.is_json() {
                return app.out.json(&json!({ "deleted": id }));
            }
            app.out.success(format!("Deleted SQL pair {}", id))
        }
    }
}
