//! Credential validation and identity lookup

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::{endpoints, ApiError, Request, Transport};
use crate::client::WrenClient;
use crate::graphql;

/// Placeholder identity when the server does not expose the key's owner
pub const API_KEY_IDENTITY: &str = "(authenticated via API key)";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoAmI {
    pub user_email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    pub project_count: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub project_names: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentUserData {
    current_user: Option<CurrentUser>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentUser {
    #[serde(default)]
    email: String,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectNamesData {
    list_projects: Vec<ProjectName>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectName {
    id: i64,
    #[serde(default)]
    display_name: String,
}

impl<T: Transport> WrenClient<T> {
    /// Check the credentials, then describe who they belong to
    ///
    /// The deployed-model endpoint answers 400 when nothing is deployed
    /// yet; that still proves the key is valid. The identity lookups that
    /// follow are best effort.
    pub async fn validate_connection(&self) -> Result<WhoAmI, ApiError> {
        let response = self.send(Request::get(endpoints::MODELS)).await?;
        match response.status {
            401 => return Err(ApiError::Unauthorized),
            200 | 400 => {}
            status => {
                return Err(ApiError::Http {
                    status,
                    body: response.body,
                })
            }
        }
        Ok(self.who_am_i().await)
    }

    async fn who_am_i(&self) -> WhoAmI {
        let mut identity = WhoAmI {
            user_email: API_KEY_IDENTITY.to_string(),
            user_name: None,
            project_count: 0,
            project_names: Vec::new(),
        };

        match self
            .graphql::<CurrentUserData>(graphql::CURRENT_USER, json!({}))
            .await
        {
            Ok(CurrentUserData {
                current_user: Some(user),
            }) if !user.email.is_empty() => {
                identity.user_email = user.email;
                identity.user_name = user.display_name.filter(|n| !n.is_empty());
            }
            Ok(_) => {}
            Err(e) => tracing::debug!("current user lookup skipped: {}", e),
        }

        match self
            .graphql::<ProjectNamesData>(graphql::PROJECT_NAMES, json!({}))
            .await
        {
            Ok(data) => {
                identity.project_count = data.list_projects.len();
                identity.project_names = data
                    .list_projects
                    .into_iter()
                    .map(|p| {
                        if p.display_name.is_empty() {
                            format!("project-{}", p.id)
                        } else {
                            p.display_name
                        }
                    })
                    .collect();
            }
            Err(e) => tracing::debug!("project lookup skipped: {}", e),
        }

        identity
    }
}
