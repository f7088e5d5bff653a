//! API client types and trait definitions
//!
//! This module defines the transport contract between the domain
//! operations in this crate and whatever HTTP stack carries them. The
//! native CLI implements it with reqwest; tests implement it in memory.

use std::fmt;
use std::time::Duration;

use serde_json::Value;

/// Default timeout for ordinary API calls
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Shorter timeout used while validating credentials at login
pub const LOGIN_TIMEOUT: Duration = Duration::from_secs(15);

/// Per-call timeout for AI-backed operations (ask, SQL generation, summary, chart)
pub const AI_TIMEOUT: Duration = Duration::from_secs(240);

/// API error types
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// Network or connection error
    #[error("network error: {0}")]
    Network(String),
    /// The request did not complete within its timeout
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    /// Server returned a non-success status
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    /// Credentials were rejected
    #[error("authentication failed: invalid API key")]
    Unauthorized,
    /// GraphQL response carried an `errors` array
    #[error("GraphQL errors: {}", .0.join("; "))]
    GraphQl(Vec<String>),
    /// Failed to parse response
    #[error("failed to parse response: {0}")]
    Parse(String),
    /// Resource not found
    #[error("{0}")]
    NotFound(String),
}

/// HTTP verbs used by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single outbound request
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    /// Path relative to the configured endpoint, starting with `/`
    pub path: String,
    pub body: Option<Value>,
    /// Overrides the client timeout for this call only
    pub timeout: Option<Duration>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            timeout: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Post, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::Put, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Status and undecoded body of a completed exchange
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait defining the wire transport
///
/// Implementations attach credentials and project headers, apply
/// timeouts, and return the raw status and body. Status interpretation
/// belongs to [`crate::WrenClient`].
#[allow(async_fn_in_trait)]
pub trait Transport {
    async fn send(&self, request: Request) -> Result<RawResponse, ApiError>;
}

/// Configuration for creating an API client
#[derive(Debug, Clone, PartialEq)]
pub struct ApiClientConfig {
    /// Base URL of the server (e.g., "https://localhost:3000")
    pub base_url: String,
    /// Bearer credential sent with every request
    pub api_key: String,
    /// Active project, sent as `X-Project-Id` when present
    pub project_id: Option<String>,
    pub timeout: Duration,
}

impl ApiClientConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            project_id: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        let project_id = project_id.into();
        self.project_id = (!project_id.is_empty()).then_some(project_id);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }
}

/// API endpoint definitions
pub mod endpoints {
    pub const GRAPHQL: &str = "/api/graphql";
    pub const MODELS: &str = "/api/v1/models";
    pub const ASK: &str = "/api/v1/ask";
    pub const GENERATE_SQL: &str = "/api/v1/generate_sql";
    pub const RUN_SQL: &str = "/api/v1/run_sql";
    pub const GENERATE_SUMMARY: &str = "/api/v1/generate_summary";
    pub const GENERATE_VEGA_CHART: &str = "/api/v1/generate_vega_chart";
    pub const INSTRUCTIONS: &str = "/api/v1/knowledge/instructions";
    pub const SQL_PAIRS: &str = "/api/v1/knowledge/sql_pairs";

    pub fn instruction(id: i64) -> String {
        format!("{}/{}", INSTRUCTIONS, id)
    }

    pub fn sql_pair(id: i64) -> String {
        format!("{}/{}", SQL_PAIRS, id)
    }
}
