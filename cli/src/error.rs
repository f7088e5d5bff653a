use thiserror::Error;
use wren_shared::{ApiError, DomainFailure};

use crate::config::ConfigError;

/// Errors surfaced by CLI commands
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    /// The server processed the request and reported a failure
    #[error(transparent)]
    Domain(#[from] DomainFailure),

    /// Argument failed validation before any request was made
    #[error("{0}")]
    Invalid(String),

    #[error("{0}")]
    NotFound(String),

    #[error("no project selected; run: wren project use <id>")]
    NoProject,

    #[error("writing output: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    pub fn invalid(message: impl Into<String>) -> Self {
        CliError::Invalid(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CliError::NoProject;
        assert_eq!(
            format!("{}", err),
            "no project selected; run: wren project use <id>"
        );

        let err = CliError::from(DomainFailure::new("SQL_ERROR", "bad column"));
        assert_eq!(format!("{}", err), "[SQL_ERROR] bad column");

        let err = CliError::from(ConfigError::NotAuthenticated("API key"));
        assert_eq!(format!("{}", err), "API key not configured; run: wren login");

        let err = CliError::NotFound("project 7 not found".into());
        assert_eq!(format!("{}", err), "project 7 not found");
    }

    #[test]
    fn test_error_debug() {
        let err = CliError::invalid("lineage must contain at least one column ID");
        let debug = format!("{:?}", err);
        assert!(debug.contains("Invalid"));
    }
}
