//! `wren config get|set|path`

use serde_json::json;

use crate::app::App;
use crate::cli::ConfigAction;
use crate::config::{mask_secret, ConfigKey};
use crate::error::CliError;

fn or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}

pub fn run<C>(app: &mut App<'_, C>, action: ConfigAction) -> Result<(), CliError> {
    match action {
        ConfigAction::Get { key: None } => {
            let shown = app.store.load()?.display();
            if app.out.is_json() {
                return app.out.json(&shown);
            }
            app.out.field("endpoint", or_unset(&shown.endpoint))?;
            app.out.field("api-key", or_unset(&shown.api_key))?;
            app.out.field("project-id", or_unset(&shown.project_id))?;
            Ok(())
        }
        ConfigAction::Get { key: Some(raw) } => {
            let key: ConfigKey = raw.parse()?;
            let mut value = app.store.load()?.get(&raw)?;
            if key == ConfigKey::ApiKey {
                value = mask_secret(&value);
            }
            if app.out.is_json() {
                return app.out.json(&json!({ key.as_str(): value }));
            }
            app.out.line(value)
        }
        ConfigAction::Set { key, value } => {
            let parsed: ConfigKey = key.parse()?;
            let value = value.trim();
            let mut config = app.store.load()?;
            config.set(&key, value)?;
            app.store.save(&config)?;

            let cleared = value.is_empty();
            if app.out.is_json() {
                return app.out.json(&json!({
                    "key": parsed.as_str(),
                    "status": if cleared { "cleared" } else { "updated" },
                }));
            }
            if cleared {
                app.out.success(format!("Cleared {}", parsed))
            } else {
                app.out.success(format!("Set {}", parsed))
            }
        }
        ConfigAction::Path => {
            let path = app.store.path().display().to_string();
            if app.out.is_json() {
                return app.out.json(&json!({ "path": path }));
            }
            app.out.line(path)
        }
    }
}
