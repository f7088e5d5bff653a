//! `wren api-key ...` and `wren project-key ...`
//!
//! Both manage the same kind of key; project keys are scoped to one
//! project and every call names it.

use serde_json::json;
use tabled::Tabled;
use wren_shared::{ApiKey, CreatedApiKey};

use crate::app::{App, Connect};
use crate::cli::{ApiKeyAction, ProjectKeyArgs};
use crate::error::CliError;
use crate::output::{short_time, Printer};

#[derive(Tabled)]
struct ApiKeyRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Status")]
    status: &'static str,
    #[tabled(rename = "Last Used")]
    last_used: String,
    #[tabled(rename = "Created")]
    created: String,
}

fn render_keys(out: &mut Printer<'_>, keys: Vec<ApiKey>) -> Result<(), CliError> {
    if out.is_json() {
        return out.json(&keys);
    }
    if keys.is_empty() {
        return out.line("No API keys found.");
    }
    let rows = keys.into_iter().map(|k| ApiKeyRow {
        id: k.id,
        status: if k.is_revoked() { "revoked" } else { "active" },
        name: k.name,
        key: k.secret_key_masked,
        last_used: short_time(k.last_used_at.as_deref()),
        created: short_time(k.created_at.as_deref()),
    });
    out.table(rows)
}

fn render_created(out: &mut Printer<'_>, created: &CreatedApiKey) -> Result<(), CliError> {
    if out.is_json() {
        return out.json(created);
    }
    out.success(format!(
        "Created API key {} ({})",
        created.key.id, created.key.name
    ))?;
    out.field("Secret", &created.secret_key)?;
    out.note("Store this secret now; it will not be shown again.")
}

fn render_done(out: &mut Printer<'_>, verb: &str, id: i64) -> Result<(), CliError> {
    if out.is_json() {
        return out.json(&json!({ "id": id, "status": verb }));
    }
    out.success(format!("API key {} {}", id, verb))
}

pub async fn run<C: Connect>(app: &mut App<'_, C>, action: ApiKeyAction) -> Result<(), CliError> {
    let session = app.session()?;

    match action {
        ApiKeyAction::List => {
            let keys = session.client.list_api_keys().await?;
            render_keys(&mut app.out, keys)
        }
        ApiKeyAction::Create { name } => {
            let created = session.client.create_api_key(&name).await?;
            render_created(&mut app.out, &created)
        }
        ApiKeyAction::Revoke { id } => {
            session.client.revoke_api_key(id).await?;
            render_done(&mut app.out, "revoked", id)
        }
        ApiKeyAction::Delete { id } => {
            session.client.delete_api_key(id).await?;
            render_done(&mut app.out, "deleted", id)
        }
    }
}

pub async fn run_project<C: Connect>(
    app: &mut App<'_, C>,
    args: ProjectKeyArgs,
) -> Result<(), CliError> {
    let session = app.session()?;
    let project_id = match args.project_id {
        Some(id) => id,
        None => session.config.project()?.ok_or_else(|| {
            CliError::invalid(
                "no project ID specified; use --project-id or set via 'wren project use <id>'",
            )
        })?,
    };

    match args.action {
        ApiKeyAction::List => {
            let keys = session.client.list_project_api_keys(project_id).await?;
            render_keys(&mut app.out, keys)
        }
        ApiKeyAction::Create { name } => {
            let created = session
                .client
                .create_project_api_key(project_id, &name)
                .await?;
            render_created(&mut app.out, &created)
        }
        ApiKeyAction::Revoke { id } => {
            session
                .client
                .revoke_project_api_key(id, project_id)
                .await?;
            render_done(&mut app.out, "revoked", id)
        }
        ApiKeyAction::Delete { id } => {
            session
                .client
                .delete_project_api_key(id, project_id)
                .await?;
            render_done(&mut app.out, "deleted", id)
        }
    }
}
