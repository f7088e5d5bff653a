//! Native HTTP transport using reqwest

use std::time::{Duration, Instant};

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use wren_shared::api::{ApiClientConfig, ApiError, Method, RawResponse, Request, Transport};

use crate::app::Connect;
use crate::error::CliError;

const PROJECT_HEADER: &str = "X-Project-Id";

/// Transport that talks to a live server
pub struct NativeTransport {
    client: Client,
    config: ApiClientConfig,
}

impl NativeTransport {
    pub fn new(config: ApiClientConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("wren-cli/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn add_headers(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let req = req
            .bearer_auth(&self.config.api_key)
            .header(CONTENT_TYPE, "application/json");
        match &self.config.project_id {
            Some(project_id) => req.header(PROJECT_HEADER, project_id),
            None => req,
        }
    }
}

fn to_reqwest(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn classify(err: reqwest::Error, timeout: Duration) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout(timeout)
    } else {
        ApiError::Network(err.to_string())
    }
}

impl Transport for NativeTransport {
    async fn send(&self, request: Request) -> Result<RawResponse, ApiError> {
        let url = self.config.url(&request.path);
        let timeout = request.timeout.unwrap_or(self.config.timeout);

        let mut builder = self
            .add_headers(self.client.request(to_reqwest(request.method), &url))
            .timeout(timeout);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let started = Instant::now();
        let response = builder.send().await.map_err(|e| classify(e, timeout))?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| classify(e, timeout))?;

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "api request"
        );
        Ok(RawResponse { status, body })
    }
}

/// Builds [`NativeTransport`]s for the command layer
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeConnector;

impl Connect for NativeConnector {
    type Transport = NativeTransport;

    fn connect(&self, config: ApiClientConfig) -> Result<NativeTransport, CliError> {
        Ok(NativeTransport::new(config)?)
    }
}
