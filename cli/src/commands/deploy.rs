//! `wren deploy` and `wren deploy status`

use serde::Serialize;

use crate::app::{App, Connect};
use crate::cli::{DeployAction, DeployArgs};
use crate::error::CliError;
use crate::output::dash;
use crate::ui::Progress;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeployView {
    project_id: i64,
    status: String,
}

/// Summary of the deployed semantic model
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeployedView {
    project_id: i64,
    hash: Option<String>,
    models: usize,
    relationships: usize,
    views: usize,
    model_names: Vec<String>,
}

pub async fn run<C: Connect>(app: &mut App<'_, C>, args: DeployArgs) -> Result<(), CliError> {
    let (session, project_id) = app.project_session()?;

    match args.action {
        None => {
            let outcome = {
                let _progress = Progress::start(app.out.err(), "Deploying");
                session.client.deploy(args.force).await
            }?;
            let status = app.settle(outcome)?;
            tracing::info!(project_id, status = %status.status, "deployed");

            let view = DeployView {
                project_id,
                status: status.status,
            };
            if app.out.is_json() {
                return app.out.json(&view);
            }
            app.out.success(format!(
                "Deployed project {} ({})",
                view.project_id, view.status
            ))
        }

        Some(DeployAction::Status) => {
            let mdl = session.client.deployed_mdl().await?;
            let view = DeployedView {
                project_id,
                models: mdl.models.len(),
                relationships: mdl.relationships.len(),
                views: mdl.views.len(),
                model_names: mdl.model_names().into_iter().map(String::from).collect(),
                hash: mdl.hash,
            };
            if app.out.is_json() {
                return app.out.json(&view);
            }
            app.out.field("Project", view.project_id)?;
            app.out.field("Hash", dash(view.hash.as_deref()))?;
            app.out.field("Models", view.models)?;
            app.out.field("Relations", view.relationships)?;
            app.out.field("Views", view.views)?;
            for name in &view.model_names {
                app.out.line(format!("{:14}- {}", "", name))?;
            }
            Ok(())
        }
    }
}
