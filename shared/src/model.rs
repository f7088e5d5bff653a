//! Models, views and deployment

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::{endpoints, ApiError, Transport};
use crate::client::{DomainFailure, Outcome, WrenClient};
use crate::graphql;

/// A column of a model, physical or calculated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: i64,
    pub display_name: String,
    pub reference_name: String,
    #[serde(default)]
    pub source_column_name: Option<String>,
    #[serde(rename = "type", default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub is_calculated: bool,
    #[serde(default)]
    pub not_null: bool,
    #[serde(default)]
    pub expression: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    pub id: i64,
    pub display_name: String,
    pub reference_name: String,
    #[serde(default)]
    pub source_table_name: Option<String>,
    #[serde(default)]
    pub ref_sql: Option<String>,
    #[serde(default)]
    pub primary_key: Option<String>,
    #[serde(default)]
    pub cached: bool,
    #[serde(default)]
    pub refresh_time: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub calculated_fields: Vec<Field>,
}

/// Relation as seen from a single model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelRelation {
    pub from_model_id: i64,
    pub from_column_id: i64,
    pub to_model_id: i64,
    pub to_column_id: i64,
    #[serde(rename = "type")]
    pub relation_type: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// Model with its relations, as returned by the single-model query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedModel {
    pub display_name: String,
    pub reference_name: String,
    #[serde(default)]
    pub source_table_name: Option<String>,
    #[serde(default)]
    pub ref_sql: Option<String>,
    #[serde(default)]
    pub primary_key: Option<String>,
    #[serde(default)]
    pub cached: bool,
    #[serde(default)]
    pub refresh_time: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub calculated_fields: Vec<Field>,
    #[serde(default)]
    pub relations: Vec<ModelRelation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub statement: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// The currently deployed semantic model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployedMdl {
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub models: Vec<Value>,
    #[serde(default)]
    pub relationships: Vec<Value>,
    #[serde(default)]
    pub views: Vec<Value>,
}

impl DeployedMdl {
    /// `name` of every deployed model, in server order
    pub fn model_names(&self) -> Vec<&str> {
        self.models
            .iter()
            .filter_map(|m| m.get("name").and_then(Value::as_str))
            .collect()
    }
}

/// Server's answer to a deploy request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeployStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeployStatus {
    fn into_outcome(self) -> Outcome<DeployStatus> {
        match self.error.as_deref().filter(|e| !e.is_empty()) {
            Some(message) => Outcome::Failed(DomainFailure::new("DEPLOY_FAILED", message)),
            None if self.status.eq_ignore_ascii_case("FAILED") => {
                Outcome::Failed(DomainFailure::new("DEPLOY_FAILED", "deployment failed"))
            }
            None => Outcome::Success(self),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsData {
    list_models: Vec<Model>,
}

#[derive(Deserialize)]
struct ModelData {
    model: Option<DetailedModel>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListViewsData {
    list_views: Vec<View>,
}

#[derive(Deserialize)]
struct ViewData {
    view: Option<View>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateViewData {
    create_view: View,
}

#[derive(Deserialize)]
struct DeployData {
    deploy: Value,
}

impl<T: Transport> WrenClient<T> {
    pub async fn list_models(&self) -> Result<Vec<Model>, ApiError> {
        let data: ListModelsData = self.graphql(graphql::LIST_MODELS, json!({})).await?;
        Ok(data.list_models)
    }

    pub async fn get_model(&self, id: i64) -> Result<DetailedModel, ApiError> {
        let data: ModelData = self
            .graphql(graphql::GET_MODEL, json!({ "where": { "id": id } }))
            .await?;
        data.model
            .ok_or_else(|| ApiError::NotFound(format!("model {} not found", id)))
    }

    pub async fn list_views(&self) -> Result<Vec<View>, ApiError> {
        let data: ListViewsData = self.graphql(graphql::LIST_VIEWS, json!({})).await?;
        Ok(data.list_views)
    }

    pub async fn get_view(&self, id: i64) -> Result<View, ApiError> {
        let data: ViewData = self
            .graphql(graphql::GET_VIEW, json!({ "where": { "id": id } }))
            .await?;
        data.view
            .ok_or_else(|| ApiError::NotFound(format!("view {} not found", id)))
    }

    /// Save the answer of a thread response as a named view
    pub async fn create_view(&self, name: &str, response_id: i64) -> Result<View, ApiError> {
        let data: CreateViewData = self
            .graphql(
                graphql::CREATE_VIEW,
                json!({ "data": { "name": name, "responseId": response_id, "rephrasedQuestion": name } }),
            )
            .await?;
        Ok(data.create_view)
    }

    pub async fn delete_view(&self, id: i64) -> Result<(), ApiError> {
        let _: Value = self
            .graphql(graphql::DELETE_VIEW, json!({ "where": { "id": id } }))
            .await?;
        Ok(())
    }

    /// Deploy the project's semantic model and report the server's verdict
    pub async fn deploy(&self, force: bool) -> Result<Outcome<DeployStatus>, ApiError> {
        let data: DeployData = self
            .graphql(graphql::DEPLOY, json!({ "force": force }))
            .await?;
        let status = match data.deploy {
            Value::Object(_) => serde_json::from_value::<DeployStatus>(data.deploy)
                .map_err(|e| ApiError::Parse(e.to_string()))?,
            Value::String(status) => DeployStatus {
                status,
                error: None,
            },
            other => DeployStatus {
                status: other.to_string(),
                error: None,
            },
        };
        Ok(status.into_outcome())
    }

    pub async fn deployed_mdl(&self) -> Result<DeployedMdl, ApiError> {
        self.get_json(endpoints::MODELS).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;

    #[tokio::test]
    async fn test_deploy_reports_server_failure() {
        let mock = MockTransport::new();
        mock.on_graphql(
            "deploy",
            json!({ "deploy": { "status": "FAILED", "error": "engine unreachable" } }),
        );
        let client = WrenClient::new(mock.clone());

        let outcome = client.deploy(true).await.unwrap();
        assert_eq!(
            outcome,
            Outcome::Failed(DomainFailure::new("DEPLOY_FAILED", "engine unreachable"))
        );
        assert_eq!(mock.graphql_variables("deploy"), Some(json!({ "force": true })));
    }

    #[tokio::test]
    async fn test_deploy_success_keeps_status() {
        let mock = MockTransport::new();
        mock.on_graphql("deploy", json!({ "deploy": { "status": "SUCCESS" } }));
        let client = WrenClient::new(mock);

        let status = client.deploy(false).await.unwrap().into_result().unwrap();
        assert_eq!(status.status, "SUCCESS");
    }

    #[test]
    fn test_failed_status_without_message() {
        let status = DeployStatus {
            status: "FAILED".into(),
            error: None,
        };
        assert_eq!(
            status.into_outcome(),
            Outcome::Failed(DomainFailure::new("DEPLOY_FAILED", "deployment failed"))
        );
    }

    #[tokio::test]
    async fn test_missing_model_is_not_found() {
        let mock = MockTransport::new();
        mock.on_graphql("model", json!({ "model": null }));
        let client = WrenClient::new(mock);

        let err = client.get_model(42).await.unwrap_err();
        assert_eq!(err.to_string(), "model 42 not found");
    }

    #[test]
    fn test_deployed_model_names() {
        let mdl: DeployedMdl = serde_json::from_value(json!({
            "hash": "abc",
            "models": [{ "name": "orders" }, { "name": "customers" }, {}],
            "relationships": [],
            "views": []
        }))
        .unwrap();
        assert_eq!(mdl.model_names(), vec!["orders", "customers"]);
    }
}
