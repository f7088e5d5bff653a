//! In-memory [`Transport`] for tests
//!
//! Routes are keyed by method and path for REST calls and by root field
//! for GraphQL documents. Every request is recorded so tests can assert
//! on what was sent.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::{json, Value};

use crate::api::{endpoints, ApiError, Method, RawResponse, Request, Transport};
use crate::graphql::root_field;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum RouteKey {
    Rest(Method, String),
    GraphQl(String),
}

#[derive(Debug, Default)]
struct Inner {
    routes: HashMap<RouteKey, RawResponse>,
    requests: Vec<Request>,
}

/// Canned-response transport; clones share routes and the request log
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Rc<RefCell<Inner>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_status(&self, method: Method, path: &str, status: u16, body: &str) {
        self.inner.borrow_mut().routes.insert(
            RouteKey::Rest(method, path.to_string()),
            RawResponse::new(status, body),
        );
    }

    pub fn on_json(&self, method: Method, path: &str, body: Value) {
        self.on_status(method, path, 200, &body.to_string());
    }

    /// Answer GraphQL documents whose root field is `field` with `data`
    pub fn on_graphql(&self, field: &str, data: Value) {
        let body = json!({ "data": data }).to_string();
        self.inner
            .borrow_mut()
            .routes
            .insert(RouteKey::GraphQl(field.to_string()), RawResponse::new(200, body));
    }

    pub fn on_graphql_errors(&self, field: &str, messages: &[&str]) {
        let errors: Vec<Value> = messages.iter().map(|m| json!({ "message": m })).collect();
        let body = json!({ "data": null, "errors": errors }).to_string();
        self.inner
            .borrow_mut()
            .routes
            .insert(RouteKey::GraphQl(field.to_string()), RawResponse::new(200, body));
    }

    pub fn requests(&self) -> Vec<Request> {
        self.inner.borrow().requests.clone()
    }

    /// Variables of the most recent GraphQL request for `field`
    pub fn graphql_variables(&self, field: &str) -> Option<Value> {
        self.inner
            .borrow()
            .requests
            .iter()
            .rev()
            .filter_map(|r| r.body.as_ref())
            .find(|body| {
                body.get("query")
                    .and_then(Value::as_str)
                    .and_then(root_field)
                    == Some(field)
            })
            .and_then(|body| body.get("variables").cloned())
    }

    fn route_for(request: &Request) -> RouteKey {
        if request.method == Method::Post && request.path == endpoints::GRAPHQL {
            let field = request
                .body
                .as_ref()
                .and_then(|b| b.get("query"))
                .and_then(Value::as_str)
                .and_then(root_field)
                .unwrap_or_default();
            return RouteKey::GraphQl(field.to_string());
        }
        RouteKey::Rest(request.method, request.path.clone())
    }
}

impl Transport for MockTransport {
    async fn send(&self, request: Request) -> Result<RawResponse, ApiError> {
        let key = Self::route_for(&request);
        let whole_endpoint = RouteKey::Rest(request.method, request.path.clone());
        let mut inner = self.inner.borrow_mut();
        inner.requests.push(request);
        // A route on the GraphQL endpoint itself answers every document.
        inner
            .routes
            .get(&whole_endpoint)
            .or_else(|| inner.routes.get(&key))
            .cloned()
            .ok_or_else(|| ApiError::Network(format!("no mock route for {:?}", key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graphql_request(query: &str) -> Request {
        Request::post(endpoints::GRAPHQL, json!({ "query": query, "variables": {} }))
    }

    #[tokio::test]
    async fn test_endpoint_route_overrides_root_field() {
        let mock = MockTransport::new();
        mock.on_graphql("threads", json!({ "threads": [] }));
        mock.on_status(Method::Post, endpoints::GRAPHQL, 502, "bad gateway");

        let response = mock
            .send(graphql_request("query { threads { id } }"))
            .await
            .unwrap();
        assert_eq!(response.status, 502);
        assert_eq!(response.body, "bad gateway");
    }

    #[tokio::test]
    async fn test_root_field_routing_and_unknown_routes() {
        let mock = MockTransport::new();
        mock.on_graphql("threads", json!({ "threads": [] }));

        let response = mock
            .send(graphql_request("query { threads { id } }"))
            .await
            .unwrap();
        assert_eq!(response.status, 200);

        let err = mock
            .send(graphql_request("query { listViews { id } }"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
        assert_eq!(mock.requests().len(), 2);
    }
}
