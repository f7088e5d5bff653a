//! Projects

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::{ApiError, Transport};
use crate::client::WrenClient;
use crate::graphql;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: i64,
    pub display_name: String,
    #[serde(rename = "type", default)]
    pub data_source: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Fields that may change on an existing project; `None` leaves a field alone
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl ProjectUpdate {
    pub fn is_empty(&self) -> bool {
        self.display_name.is_none() && self.language.is_none() && self.timezone.is_none()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListProjectsData {
    list_projects: Vec<Project>,
}

#[derive(Deserialize)]
struct ProjectData {
    project: Option<Project>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateProjectData {
    create_project: Project,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProjectData {
    update_project: Project,
}

impl<T: Transport> WrenClient<T> {
    pub async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        let data: ListProjectsData = self.graphql(graphql::LIST_PROJECTS, json!({})).await?;
        Ok(data.list_projects)
    }

    /// Fetch one project; `Ok(None)` when the server has no such project
    pub async fn get_project(&self, id: i64) -> Result<Option<Project>, ApiError> {
        let data: ProjectData = self
            .graphql(graphql::GET_PROJECT, json!({ "projectId": id }))
            .await?;
        Ok(data.project)
    }

    pub async fn create_project(&self, display_name: &str) -> Result<Project, ApiError> {
        let data: CreateProjectData = self
            .graphql(
                graphql::CREATE_PROJECT,
                json!({ "data": { "displayName": display_name } }),
            )
            .await?;
        Ok(data.create_project)
    }

    pub async fn update_project(
        &self,
        id: i64,
        update: &ProjectUpdate,
    ) -> Result<Project, ApiError> {
        let data: UpdateProjectData = self
            .graphql(
                graphql::UPDATE_PROJECT,
                json!({ "projectId": id, "data": update }),
            )
            .await?;
        Ok(data.update_project)
    }

    pub async fn delete_project(&self, id: i64) -> Result<(), ApiError> {
        let _: serde_json::Value = self
            .graphql(graphql::DELETE_PROJECT, json!({ "projectId": id }))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;

    #[tokio::test]
    async fn test_get_project_missing_is_none() {
        let mock = MockTransport::new();
        mock.on_graphql("project", json!({ "project": null }));
        let client = WrenClient::new(mock.clone());

        assert_eq!(client.get_project(7).await.unwrap(), None);
        assert_eq!(
            mock.graphql_variables("project"),
            Some(json!({ "projectId": 7 }))
        );
    }

    #[tokio::test]
    async fn test_update_sends_only_changed_fields() {
        let mock = MockTransport::new();
        mock.on_graphql(
            "updateProject",
            json!({ "updateProject": { "id": 3, "displayName": "Sales", "language": "EN" } }),
        );
        let client = WrenClient::new(mock.clone());

        let update = ProjectUpdate {
            language: Some("EN".into()),
            ..Default::default()
        };
        let project = client.update_project(3, &update).await.unwrap();
        assert_eq!(project.display_name, "Sales");
        assert_eq!(
            mock.graphql_variables("updateProject"),
            Some(json!({ "projectId": 3, "data": { "language": "EN" } }))
        );
    }

    #[test]
    fn test_project_type_field_renamed() {
        let project: Project = serde_json::from_value(json!({
            "id": 1, "displayName": "Demo", "type": "POSTGRES"
        }))
        .unwrap();
        assert_eq!(project.data_source.as_deref(), Some("POSTGRES"));
        assert_eq!(serde_json::to_value(&project).unwrap()["type"], "POSTGRES");
    }
}
