//! Transport-agnostic API client
//!
//! [`WrenClient`] turns raw exchanges into typed results. REST knowledge
//! calls and every GraphQL call use strict success decoding; the AI
//! endpoints report failures inside a successful body and go through
//! [`WrenClient::post_embedded`].

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{endpoints, ApiError, RawResponse, Request, Transport};

/// Failure reported by the server inside an otherwise well-formed body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("[{code}] {message}")]
pub struct DomainFailure {
    pub code: String,
    #[serde(rename = "error")]
    pub message: String,
}

impl DomainFailure {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Result of an operation whose failures may arrive in the response body
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    Failed(DomainFailure),
}

impl<T> Outcome<T> {
    pub fn into_result(self) -> Result<T, DomainFailure> {
        match self {
            Outcome::Success(value) => Ok(value),
            Outcome::Failed(failure) => Err(failure),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Failed(failure) => Outcome::Failed(failure),
        }
    }
}

/// `{code, error}` fields of an embedded-error body, of any JSON type
#[derive(Debug, Default, Deserialize)]
struct EmbeddedError {
    #[serde(default)]
    code: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

/// Text of a reported field; null and empty values report nothing
fn reported(value: Option<Value>) -> Option<String> {
    let text = match value? {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Object(ref map) if map.is_empty() => None,
        Value::Array(ref items) if items.is_empty() => None,
        Value::Object(mut map) => match map.remove("message") {
            Some(Value::String(message)) => Some(message),
            _ => Some(Value::Object(map).to_string()),
        },
        other => Some(other.to_string()),
    };
    text.filter(|s| !s.is_empty())
}

impl EmbeddedError {
    fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_else(|e| {
            tracing::debug!("response body is not an error envelope: {}", e);
            Self::default()
        })
    }

    fn into_failure(self, fallback: &str) -> Option<DomainFailure> {
        let code = reported(self.code);
        let message = reported(self.error);
        match (code, message) {
            (None, None) => None,
            (code, message) => Some(DomainFailure {
                code: code.unwrap_or_else(|| "ERROR".to_string()),
                message: message.unwrap_or_else(|| fallback.to_string()),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlEnvelope {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlErrorMessage>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorMessage {
    message: String,
}

/// Typed client over any [`Transport`]
#[derive(Debug, Clone)]
pub struct WrenClient<T> {
    transport: T,
}

impl<T: Transport> WrenClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub(crate) async fn send(&self, request: Request) -> Result<RawResponse, ApiError> {
        self.transport.send(request).await
    }

    async fn send_strict(&self, request: Request) -> Result<RawResponse, ApiError> {
        let response = self.send(request).await?;
        if response.status == 401 {
            return Err(ApiError::Unauthorized);
        }
        if !response.is_success() {
            return Err(ApiError::Http {
                status: response.status,
                body: response.body,
            });
        }
        Ok(response)
    }

    pub(crate) async fn get_json<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        let response = self.send_strict(Request::get(path)).await?;
        decode(&response.body)
    }

    pub(crate) async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let response = self.send_strict(Request::post(path, to_value(body)?)).await?;
        decode(&response.body)
    }

    pub(crate) async fn put_json<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let response = self.send_strict(Request::put(path, to_value(body)?)).await?;
        decode(&response.body)
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send_strict(Request::delete(path)).await.map(|_| ())
    }

    /// Execute a GraphQL document and decode its `data` member
    pub async fn graphql<R: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<R, ApiError> {
        let body = serde_json::json!({ "query": query, "variables": variables });
        let response = self.send_strict(Request::post(endpoints::GRAPHQL, body)).await?;

        let envelope: GraphQlEnvelope = decode(&response.body)?;
        if !envelope.errors.is_empty() {
            return Err(ApiError::GraphQl(
                envelope.errors.into_iter().map(|e| e.message).collect(),
            ));
        }
        let data = envelope
            .data
            .ok_or_else(|| ApiError::Parse("GraphQL response has no data".to_string()))?;
        serde_json::from_value(data).map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// POST to an endpoint that reports failures as `{code, error}` in the body
    ///
    /// The body is inspected regardless of status. An embedded error wins
    /// over the HTTP status; otherwise non-success statuses are transport
    /// errors.
    pub(crate) async fn post_embedded<B, R>(
        &self,
        path: &str,
        body: &B,
        timeout: Option<Duration>,
        fallback_message: &str,
    ) -> Result<Outcome<R>, ApiError>
    where
        B: Serialize,
        R: DeserializeOwned,
    {
        let mut request = Request::post(path, to_value(body)?);
        if let Some(timeout) = timeout {
            request = request.with_timeout(timeout);
        }
        let response = self.send(request).await?;

        if let Some(failure) = EmbeddedError::parse(&response.body).into_failure(fallback_message) {
            tracing::debug!(path, code = %failure.code, "server reported failure");
            return Ok(Outcome::Failed(failure));
        }
        if response.status == 401 {
            return Err(ApiError::Unauthorized);
        }
        if !response.is_success() {
            return Err(ApiError::Http {
                status: response.status,
                body: response.body,
            });
        }
        decode(&response.body).map(Outcome::Success)
    }
}

pub(crate) fn decode<R: DeserializeOwned>(body: &str) -> Result<R, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Parse(e.to_string()))
}

fn to_value<B: Serialize>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Parse(e.to_string()))
}
