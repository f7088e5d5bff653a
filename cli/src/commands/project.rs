//! `wren project ...`

use serde_json::json;
use tabled::Tabled;
use wren_shared::{ApiError, Project, ProjectUpdate};

use crate::app::{App, Connect};
use crate::cli::ProjectAction;
use crate::error::CliError;
use crate::output::{dash, short_time, Printer};

#[derive(Tabled)]
struct ProjectRow {
    #[tabled(rename = "")]
    active: &'static str,
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    data_source: String,
    #[tabled(rename = "Language")]
    language: String,
    #[tabled(rename = "Created")]
    created: String,
}

fn render_project(out: &mut Printer<'_>, project: &Project) -> Result<(), CliError> {
    out.field("ID", project.id)?;
    out.field("Name", &project.display_name)?;
    out.field("Type", dash(project.data_source.as_deref()))?;
    out.field("Language", dash(project.language.as_deref()))?;
    out.field("Timezone", dash(project.timezone.as_deref()))?;
    out.field("Created", short_time(project.created_at.as_deref()))?;
    out.field("Updated", short_time(project.updated_at.as_deref()))?;
    Ok(())
}

/// Map a failed lookup to the user-facing not-found error
fn not_found(id: i64, err: Option<ApiError>) -> CliError {
    match err {
        None => CliError::NotFound(format!("project {} not found", id)),
        Some(ApiError::GraphQl(messages)) => CliError::NotFound(format!(
            "project {} not found: {}",
            id,
            messages.join("; ")
        )),
        Some(other) => CliError::Api(other),
    }
}

pub async fn run<C: Connect>(app: &mut App<'_, C>, action: ProjectAction) -> Result<(), CliError> {
    match action {
        ProjectAction::List => {
            let session = app.session()?;
            let active = session.config.project().ok().flatten();
            let projects = session.client.list_projects().await?;

            if app.out.is_json() {
                return app.out.json(&projects);
            }
            if projects.is_empty() {
                return app.out.line("No projects found.");
            }
            let rows = projects.into_iter().map(|p| ProjectRow {
                active: if Some(p.id) == active { "*" } else { "" },
                id: p.id,
                name: p.display_name,
                data_source: dash(p.data_source.as_deref()),
                language: dash(p.language.as_deref()),
                created: short_time(p.created_at.as_deref()),
            });
            app.out.table(rows)
        }

        ProjectAction::Use { id } => {
            let session = app.session()?;
            let project = match session.client.get_project(id).await {
                Ok(Some(project)) => project,
                Ok(None) => return Err(not_found(id, None)),
                Err(e) => return Err(not_found(id, Some(e))),
            };

            let mut config = session.config;
            config.project_id = Some(id.to_string());
            app.store.save(&config)?;

            if app.out.is_json() {
                return app.out.json(&json!({
                    "projectId": project.id,
                    "displayName": project.display_name,
                }));
            }
            app.out.success(format!(
                "Switched to project {} ({})",
                project.id, project.display_name
            ))
        }

        ProjectAction::Current => {
            let config = app.store.load()?;
            let Some(id) = config.project()? else {
                if app.out.is_json() {
                    return app.out.json(&json!({ "projectId": null }));
                }
                return app
                    .out
                    .line("No project selected. Run: wren project use <id>");
            };

            // Details are a bonus; the stored id is the answer.
            let mut details = None;
            match app.session() {
                Ok(session) => match session.client.get_project(id).await {
                    Ok(project) => details = project,
                    Err(e) => tracing::debug!("project lookup skipped: {}", e),
                },
                Err(e) => tracing::debug!("project lookup skipped: {}", e),
            }

            match (app.out.is_json(), details) {
                (true, Some(project)) => app.out.json(&project),
                (true, None) => app.out.json(&json!({ "projectId": id })),
                (false, Some(project)) => render_project(&mut app.out, &project),
                (false, None) => app.out.field("ID", id),
            }
        }

        ProjectAction::Info { id } => {
            let session = app.session()?;
            let id = match id {
                Some(id) => id,
                None => session.require_project()?,
            };
            let project = match session.client.get_project(id).await {
                Ok(Some(project)) => project,
                Ok(None) => return Err(not_found(id, None)),
                Err(e) => return Err(not_found(id, Some(e))),
            };

            if app.out.is_json() {
                return app.out.json(&project);
            }
            render_project(&mut app.out, &project)
        }

        ProjectAction::Create { name } => {
            let session = app.session()?;
            let project = session.client.create_project(&name).await?;

            if app.out.is_json() {
                return app.out.json(&project);
            }
            app.out.success(format!(
                "Created project {} ({})",
                project.id, project.display_name
            ))?;
            app.out
                .note(format!("Select it with: wren project use {}", project.id))
        }

        ProjectAction::Update {
            id,
            name,
            language,
            timezone,
        } => {
            let update = ProjectUpdate {
                display_name: name,
                language,
                timezone,
            };
            if update.is_empty() {
                return Err(CliError::invalid(
                    "no changes specified; use --name, --language, or --timezone",
                ));
            }

            let session = app.session()?;
            let id = match id {
                Some(id) => id,
                None => session.require_project()?,
            };
            let project = session.client.update_project(id, &update).await?;

            if app.out.is_json() {
                return app.out.json(&project);
            }
            app.out.success(format!("Updated project {}", project.id))
        }

        ProjectAction::Delete { id } => {
            let session = app.session()?;
            session.client.delete_project(id).await?;

            // Do not leave the config pointing at a project that is gone.
            let mut config = session.config;
            if config.project().ok().flatten() == Some(id) {
                config.project_id = None;
                app.store.save(&config)?;
            }

            if app.out.is_json() {
                return app.out.json(&json!({ "deleted": id }));
            }
            app.out.success(format!("Deleted project {}", id))
        }
    }
}
