//! Organization and project API keys

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::{ApiError, Transport};
use crate::client::WrenClient;
use crate::graphql;

/// An API key as listed; the secret itself is only ever shown masked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiKey {
    pub id: i64,
    /// Set for project-scoped keys
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
    pub name: String,
    pub secret_key_masked: String,
    #[serde(default)]
    pub last_used_at: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub created_by_email: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub revoked_at: Option<String>,
}

impl ApiKey {
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.as_deref().is_some_and(|r| !r.is_empty())
    }
}

/// Newly created key, carrying the full secret exactly once
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedApiKey {
    pub key: ApiKey,
    pub secret_key: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListApiKeysData {
    list_api_keys: Vec<ApiKey>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateApiKeyData {
    create_api_key: CreatedApiKey,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListProjectApiKeysData {
    list_project_api_keys: Vec<ApiKey>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateProjectApiKeyData {
    create_project_api_key: CreatedApiKey,
}

impl<T: Transport> WrenClient<T> {
    pub async fn list_api_keys(&self) -> Result<Vec<ApiKey>, ApiError> {
        let data: ListApiKeysData = self.graphql(graphql::LIST_API_KEYS, json!({})).await?;
        Ok(data.list_api_keys)
    }

    pub async fn create_api_key(&self, name: &str) -> Result<CreatedApiKey, ApiError> {
        let data: CreateApiKeyData = self
            .graphql(graphql::CREATE_API_KEY, json!({ "data": { "name": name } }))
            .await?;
        Ok(data.create_api_key)
    }

    pub async fn revoke_api_key(&self, key_id: i64) -> Result<(), ApiError> {
        let _: Value = self
            .graphql(graphql::REVOKE_API_KEY, json!({ "keyId": key_id }))
            .await?;
        Ok(())
    }

    pub async fn delete_api_key(&self, key_id: i64) -> Result<(), ApiError> {
        let _: Value = self
            .graphql(graphql::DELETE_API_KEY, json!({ "keyId": key_id }))
            .await?;
        Ok(())
    }

    pub async fn list_project_api_keys(&self, project_id: i64) -> Result<Vec<ApiKey>, ApiError> {
        let data: ListProjectApiKeysData = self
            .graphql(
                graphql::LIST_PROJECT_API_KEYS,
                json!({ "projectId": project_id }),
            )
            .await?;
        Ok(data.list_project_api_keys)
    }

    pub async fn create_project_api_key(
        &self,
        project_id: i64,
        name: &str,
    ) -> Result<CreatedApiKey, ApiError> {
        let data: CreateProjectApiKeyData = self
            .graphql(
                graphql::CREATE_PROJECT_API_KEY,
                json!({ "data": { "projectId": project_id, "name": name } }),
            )
            .await?;
        Ok(data.create_project_api_key)
    }

    pub async fn revoke_project_api_key(
        &self,
        key_id: i64,
        project_id: i64,
    ) -> Result<(), ApiError> {
        let _: Value = self
            .graphql(
                graphql::REVOKE_PROJECT_API_KEY,
                json!({ "keyId": key_id, "projectId": project_id }),
            )
            .await?;
        Ok(())
    }

    pub async fn delete_project_api_key(
        &self,
        key_id: i64,
        project_id: i64,
    ) -> Result<(), ApiError> {
        let _: Value = self
            .graphql(
                graphql::DELETE_PROJECT_API_KEY,
                json!({ "keyId": key_id, "projectId": project_id }),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;

    #[tokio::test]
    async fn test_create_returns_full_secret_once() {
        let mock = MockTransport::new();
        mock.on_graphql(
            "createApiKey",
            json!({ "createApiKey": {
                "key": { "id": 4, "name": "ci", "secretKeyMasked": "sk-****abcd", "createdAt": "2026-01-02T03:04:05Z" },
                "secretKey": "sk-0123456789abcd"
            } }),
        );
        let client = WrenClient::new(mock);

        let created = client.create_api_key("ci").await.unwrap();
        assert_eq!(created.secret_key, "sk-0123456789abcd");
        assert_eq!(created.key.secret_key_masked, "sk-****abcd");
        assert!(!created.key.is_revoked());
    }

    #[tokio::test]
    async fn test_project_key_mutations_carry_project() {
        let mock = MockTransport::new();
        mock.on_graphql("revokeProjectApiKey", json!({ "revokeProjectApiKey": true }));
        let client = WrenClient::new(mock.clone());

        client.revoke_project_api_key(9, 2).await.unwrap();
        assert_eq!(
            mock.graphql_variables("revokeProjectApiKey"),
            Some(json!({ "keyId": 9, "projectId": 2 }))
        );
    }
}
