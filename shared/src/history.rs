//! API call history

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::{ApiError, Transport};
use crate::client::WrenClient;
use crate::graphql;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHistoryItem {
    pub id: String,
    #[serde(default)]
    pub project_id: Option<i64>,
    pub api_type: String,
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub status_code: Option<i64>,
    #[serde(default)]
    pub duration_ms: Option<i64>,
    #[serde(default)]
    pub request_payload: Option<Value>,
    #[serde(default)]
    pub response_payload: Option<Value>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHistoryPage {
    #[serde(default)]
    pub items: Vec<ApiHistoryItem>,
    pub total: i64,
    pub has_more: bool,
}

/// Server-side filters; unset fields are not sent
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHistoryFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl ApiHistoryFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub offset: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 20,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiHistoryData {
    api_history: ApiHistoryPage,
}

impl<T: Transport> WrenClient<T> {
    pub async fn api_history(
        &self,
        filter: &ApiHistoryFilter,
        pagination: Pagination,
    ) -> Result<ApiHistoryPage, ApiError> {
        let filter = if filter.is_empty() {
            Value::Null
        } else {
            json!(filter)
        };
        let data: ApiHistoryData = self
            .graphql(
                graphql::API_HISTORY,
                json!({ "filter": filter, "pagination": pagination }),
            )
            .await?;
        Ok(data.api_history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;

    #[tokio::test]
    async fn test_history_sends_filter_and_pagination() {
        let mock = MockTransport::new();
        mock.on_graphql(
            "apiHistory",
            json!({ "apiHistory": {
                "items": [{
                    "id": "h-1", "projectId": 1, "apiType": "ASK", "threadId": "t-9",
                    "statusCode": 200, "durationMs": 1830,
                    "requestPayload": { "question": "q" }, "responsePayload": null,
                    "createdAt": "2026-03-01T10:00:00Z"
                }],
                "total": 41,
                "hasMore": true
            } }),
        );
        let client = WrenClient::new(mock.clone());

        let filter = ApiHistoryFilter {
            api_type: Some("ASK".into()),
            status_code: Some(200),
            ..Default::default()
        };
        let page = client
            .api_history(&filter, Pagination { offset: 20, limit: 20 })
            .await
            .unwrap();
        assert_eq!(page.total, 41);
        assert!(page.has_more);
        assert_eq!(page.items[0].duration_ms, Some(1830));
        assert_eq!(
            mock.graphql_variables("apiHistory"),
            Some(json!({
                "filter": { "apiType": "ASK", "statusCode": 200 },
                "pagination": { "offset": 20, "limit": 20 }
            }))
        );
    }

    #[tokio::test]
    async fn test_empty_filter_is_null() {
        let mock = MockTransport::new();
        mock.on_graphql(
            "apiHistory",
            json!({ "apiHistory": { "items": [], "total": 0, "hasMore": false } }),
        );
        let client = WrenClient::new(mock.clone());

        client
            .api_history(&ApiHistoryFilter::default(), Pagination::default())
            .await
            .unwrap();
        let variables = mock.graphql_variables("apiHistory").unwrap();
        assert_eq!(variables["filter"], Value::Null);
        assert_eq!(variables["pagination"]["limit"], 20);
    }
}
