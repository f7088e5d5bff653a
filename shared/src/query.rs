//! Natural-language and SQL query operations
//!
//! These endpoints report failures inside the response body, so every
//! call returns an [`Outcome`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::api::{endpoints, ApiError, Transport, AI_TIMEOUT};
use crate::client::{Outcome, WrenClient};

/// Rows requested for summaries when the caller does not say
pub const DEFAULT_SUMMARY_SAMPLE_SIZE: u32 = 500;

/// Rows requested for charts when the caller does not say
pub const DEFAULT_CHART_SAMPLE_SIZE: u32 = 10_000;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskRequest {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    /// `NON_SQL_QUERY` when the question was answered without SQL
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl AskResult {
    pub fn is_non_sql(&self) -> bool {
        self.kind.as_deref() == Some("NON_SQL_QUERY")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSqlRequest {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Return SQL in the data source's dialect instead of the engine's
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub return_sql_dialect: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSqlResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub sql: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSqlRequest {
    pub sql: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSqlColumn {
    pub name: String,
    #[serde(rename = "type", default)]
    pub data_type: String,
    #[serde(default)]
    pub not_null: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,
}

/// One cell of a query result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    /// Arrays and objects
    Structured(Value),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("NULL"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    return write!(f, "{}", n);
                }
                match n.as_f64() {
                    Some(x) if x.fract() == 0.0 && x.abs() < 1e15 => write!(f, "{:.0}", x),
                    Some(x) => write!(f, "{}", x),
                    None => write!(f, "{}", n),
                }
            }
            Scalar::Text(s) => f.write_str(s),
            Scalar::Structured(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSqlResult {
    #[serde(default)]
    pub records: Vec<BTreeMap<String, Scalar>>,
    #[serde(default)]
    pub columns: Vec<RunSqlColumn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub total_rows: i64,
}

impl RunSqlResult {
    /// Records rendered cell by cell in column order; absent cells are NULL
    pub fn rows(&self) -> Vec<Vec<String>> {
        self.records
            .iter()
            .map(|record| {
                self.columns
                    .iter()
                    .map(|c| {
                        record
                            .get(&c.name)
                            .map(Scalar::to_string)
                            .unwrap_or_else(|| Scalar::Null.to_string())
                    })
                    .collect()
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    pub question: String,
    pub sql: String,
    pub sample_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

impl SummaryResult {
    /// Summary with the escaped newlines and tabs of streamed content restored
    pub fn text(&self) -> String {
        self.summary.replace("\\n", "\n").replace("\\t", "\t")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRequest {
    pub question: String,
    pub sql: String,
    pub sample_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartResult {
    #[serde(default)]
    pub vega_spec: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
}

impl<T: Transport> WrenClient<T> {
    /// Full pipeline: generate SQL, run it, summarize the result
    pub async fn ask(&self, request: &AskRequest) -> Result<Outcome<AskResult>, ApiError> {
        self.post_embedded(
            endpoints::ASK,
            request,
            Some(AI_TIMEOUT),
            "question could not be answered",
        )
        .await
    }

    pub async fn generate_sql(
        &self,
        request: &GenerateSqlRequest,
    ) -> Result<Outcome<GenerateSqlResult>, ApiError> {
        self.post_embedded(
            endpoints::GENERATE_SQL,
            request,
            Some(AI_TIMEOUT),
            "query could not be converted to SQL",
        )
        .await
    }

    pub async fn run_sql(
        &self,
        request: &RunSqlRequest,
    ) -> Result<Outcome<RunSqlResult>, ApiError> {
        self.post_embedded(endpoints::RUN_SQL, request, None, "query failed")
            .await
    }

    pub async fn generate_summary(
        &self,
        request: &SummaryRequest,
    ) -> Result<Outcome<SummaryResult>, ApiError> {
        self.post_embedded(
            endpoints::GENERATE_SUMMARY,
            request,
            Some(AI_TIMEOUT),
            "summary could not be generated",
        )
        .await
    }

    pub async fn generate_chart(
        &self,
        request: &ChartRequest,
    ) -> Result<Outcome<ChartResult>, ApiError> {
        self.post_embedded(
            endpoints::GENERATE_VEGA_CHART,
            request,
            Some(AI_TIMEOUT),
            "chart could not be generated",
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Method;
    use crate::client::DomainFailure;
    use crate::mock::MockTransport;
    use serde_json::json;

    #[test]
    fn test_scalar_formatting() {
        let cells: Vec<Scalar> =
            serde_json::from_value(json!([null, true, 42, 3.5, 1000.0, "x", [1, 2], {"a": 1}]))
                .unwrap();
        let rendered: Vec<String> = cells.iter().map(Scalar::to_string).collect();
        assert_eq!(
            rendered,
            vec!["NULL", "true", "42", "3.5", "1000", "x", "[1,2]", "{\"a\":1}"]
        );
    }

    #[test]
    fn test_rows_follow_column_order() {
        let result: RunSqlResult = serde_json::from_value(json!({
            "records": [{ "b": "two", "a": 1 }, { "a": 2 }],
            "columns": [{ "name": "a", "type": "INTEGER" }, { "name": "b", "type": "VARCHAR" }],
            "totalRows": 2
        }))
        .unwrap();
        assert_eq!(
            result.rows(),
            vec![vec!["1", "two"], vec!["2", "NULL"]]
        );
    }

    #[test]
    fn test_summary_unescapes_newlines() {
        let result = SummaryResult {
            summary: "Line one\\nLine two\\tend".into(),
            thread_id: None,
        };
        assert_eq!(result.text(), "Line one\nLine two\tend");
    }

    #[tokio::test]
    async fn test_run_sql_error_in_ok_body_is_failure() {
        let mock = MockTransport::new();
        mock.on_json(
            Method::Post,
            endpoints::RUN_SQL,
            json!({ "code": "SQL_ERROR", "error": "relation \"nope\" does not exist" }),
        );
        let client = WrenClient::new(mock);

        let outcome = client
            .run_sql(&RunSqlRequest {
                sql: "SELECT * FROM nope".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(
            outcome,
            Outcome::Failed(DomainFailure::new(
                "SQL_ERROR",
                "relation \"nope\" does not exist"
            ))
        );
    }

    #[tokio::test]
    async fn test_run_sql_empty_error_is_success() {
        let mock = MockTransport::new();
        mock.on_json(
            Method::Post,
            endpoints::RUN_SQL,
            json!({
                "records": [{ "n": 3 }],
                "columns": [{ "name": "n", "type": "BIGINT", "notNull": true }],
                "totalRows": 1,
                "error": ""
            }),
        );
        let client = WrenClient::new(mock);

        let result = client
            .run_sql(&RunSqlRequest {
                sql: "SELECT 3 AS n".into(),
                ..Default::default()
            })
            .await
            .unwrap()
            .into_result()
            .unwrap();
        assert_eq!(result.total_rows, 1);
        assert_eq!(result.rows(), vec![vec!["3"]]);
    }

    #[tokio::test]
    async fn test_ai_calls_use_long_timeout() {
        let mock = MockTransport::new();
        mock.on_json(
            Method::Post,
            endpoints::GENERATE_SQL,
            json!({ "sql": "SELECT 1", "threadId": "t-1" }),
        );
        let client = WrenClient::new(mock.clone());

        let request = GenerateSqlRequest {
            question: "one".into(),
            return_sql_dialect: true,
            ..Default::default()
        };
        let result = client.generate_sql(&request).await.unwrap().into_result().unwrap();
        assert_eq!(result.sql, "SELECT 1");

        let sent = &mock.requests()[0];
        assert_eq!(sent.timeout, Some(AI_TIMEOUT));
        assert_eq!(
            sent.body,
            Some(json!({ "question": "one", "returnSqlDialect": true }))
        );
    }

    #[tokio::test]
    async fn test_generate_sql_code_without_message() {
        let mock = MockTransport::new();
        mock.on_status(
            Method::Post,
            endpoints::GENERATE_SQL,
            400,
            r#"{"code":"NON_SQL_QUERY"}"#,
        );
        let client = WrenClient::new(mock);

        let outcome = client
            .generate_sql(&GenerateSqlRequest {
                question: "hello".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(
            outcome,
            Outcome::Failed(DomainFailure::new(
                "NON_SQL_QUERY",
                "query could not be converted to SQL"
            ))
        );
    }
}
