//! `wren login` and `wren whoami`

use serde::Serialize;
use wren_shared::api::{ApiClientConfig, LOGIN_TIMEOUT};
use wren_shared::{WhoAmI, WrenClient};

use crate::app::{App, Connect};
use crate::cli::LoginArgs;
use crate::error::CliError;
use crate::output::Printer;
use crate::ui::Progress;

pub const DEFAULT_ENDPOINT: &str = "https://localhost:3000";

/// Result of a successful login, as printed in either mode
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginView {
    status: &'static str,
    user: String,
    endpoint: String,
    config: String,
}

/// `whoami` output: the connection plus the identity behind the key
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IdentityView {
    endpoint: String,
    #[serde(flatten)]
    identity: WhoAmI,
}

fn prompt<C>(app: &mut App<'_, C>, message: &str) -> Result<String, CliError> {
    let err = app.out.err();
    write!(err, "{}", message)?;
    err.flush()?;
    let mut line = String::new();
    app.input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validate credentials, then persist them
///
/// Nothing is written unless the server accepts the key.
pub async fn login<C: Connect>(app: &mut App<'_, C>, args: LoginArgs) -> Result<(), CliError> {
    let mut config = app.store.load()?;

    let endpoint = match non_empty(args.endpoint) {
        Some(endpoint) => endpoint,
        None => {
            let default = non_empty(config.endpoint.clone())
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
            let answer = prompt(app, &format!("Wren endpoint [{}]: ", default))?;
            if answer.is_empty() {
                default
            } else {
                answer
            }
        }
    };

    let api_key = match non_empty(args.api_key) {
        Some(key) => key,
        None => prompt(app, "API key: ")?,
    };
    if api_key.is_empty() {
        return Err(CliError::invalid("API key is required"));
    }

    let transport = app
        .connector
        .connect(ApiClientConfig::new(&endpoint, &api_key).with_timeout(LOGIN_TIMEOUT))?;
    let client = WrenClient::new(transport);
    let identity = {
        let _progress = Progress::start(app.out.err(), "Validating credentials");
        client.validate_connection().await
    }?;

    config.endpoint = Some(endpoint.clone());
    config.api_key = Some(api_key);
    app.store.save(&config)?;
    tracing::info!("logged in to {}", endpoint);

    let view = LoginView {
        status: "authenticated",
        user: identity.user_email,
        endpoint,
        config: app.store.path().display().to_string(),
    };
    if app.out.is_json() {
        return app.out.json(&view);
    }
    app.out.success(format!("Logged in as {}", view.user))?;
    app.out.field("Endpoint", &view.endpoint)?;
    app.out.field("Config", &view.config)?;
    Ok(())
}

pub async fn whoami<C: Connect>(app: &mut App<'_, C>) -> Result<(), CliError> {
    let session = app.session()?;
    let identity = session.client.validate_connection().await?;
    let view = IdentityView {
        endpoint: session.config.endpoint.unwrap_or_default(),
        identity,
    };

    if app.out.is_json() {
        return app.out.json(&view);
    }
    render_identity(&mut app.out, &view)
}

fn render_identity(out: &mut Printer<'_>, view: &IdentityView) -> Result<(), CliError> {
    let identity = &view.identity;
    out.field("Endpoint", &view.endpoint)?;
    out.field("User", &identity.user_email)?;
    if let Some(name) = &identity.user_name {
        out.field("Display Name", name)?;
    }
    out.field("Projects", identity.project_count)?;
    for name in &identity.project_names {
        out.line(format!("{:14}- {}", "", name))?;
    }
    Ok(())
}
