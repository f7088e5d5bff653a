//! GraphQL documents sent to `/api/graphql`

/// Name of the first field selected by a document, e.g. `listProjects`
pub fn root_field(document: &str) -> Option<&str> {
    let start = document.find('{')? + 1;
    let rest = document[start..].trim_start();
    let end = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    (end > 0).then(|| &rest[..end])
}

// Projects

pub const LIST_PROJECTS: &str = r#"
query {
  listProjects {
    id displayName type language timezone createdAt updatedAt
  }
}"#;

pub const GET_PROJECT: &str = r#"
query Project($projectId: Int!) {
  project(projectId: $projectId) {
    id displayName type language timezone createdAt updatedAt
  }
}"#;

pub const CREATE_PROJECT: &str = r#"
mutation CreateProject($data: CreateProjectInput!) {
  createProject(data: $data) {
    id displayName type language timezone createdAt updatedAt
  }
}"#;

pub const UPDATE_PROJECT: &str = r#"
mutation UpdateProject($projectId: Int!, $data: UpdateProjectInput!) {
  updateProject(projectId: $projectId, data: $data) {
    id displayName type language timezone createdAt updatedAt
  }
}"#;

pub const DELETE_PROJECT: &str = r#"
mutation DeleteProject($projectId: Int!) {
  deleteProject(projectId: $projectId)
}"#;

// Models and views

pub const LIST_MODELS: &str = r#"
query {
  listModels {
    id displayName referenceName sourceTableName refSql primaryKey
    cached refreshTime description
    fields { id displayName referenceName sourceColumnName type isCalculated notNull expression }
    calculatedFields { id displayName referenceName sourceColumnName type isCalculated notNull expression }
  }
}"#;

pub const GET_MODEL: &str = r#"
query Model($where: ModelWhereInput!) {
  model(where: $where) {
    displayName referenceName sourceTableName refSql primaryKey
    cached refreshTime description
    fields { id displayName referenceName sourceColumnName type isCalculated notNull expression }
    calculatedFields { id displayName referenceName sourceColumnName type isCalculated notNull expression }
    relations { fromModelId fromColumnId toModelId toColumnId type name }
  }
}"#;

pub const LIST_MODEL_CALCULATED_FIELDS: &str = r#"
query {
  listModels {
    id
    calculatedFields { id displayName referenceName sourceColumnName type isCalculated notNull expression }
  }
}"#;

pub const LIST_VIEWS: &str = r#"
query {
  listViews { id name statement displayName }
}"#;

pub const GET_VIEW: &str = r#"
query View($where: ViewWhereUniqueInput!) {
  view(where: $where) { id name statement displayName }
}"#;

pub const CREATE_VIEW: &str = r#"
mutation CreateView($data: CreateViewInput!) {
  createView(data: $data) { id name statement displayName }
}"#;

pub const DELETE_VIEW: &str = r#"
mutation DeleteView($where: ViewWhereUniqueInput!) {
  deleteView(where: $where)
}"#;

pub const DEPLOY: &str = r#"
mutation Deploy($force: Boolean) {
  deploy(force: $force)
}"#;

// Relations

pub const DIAGRAM_RELATIONS: &str = r#"
query {
  diagram {
    models {
      relationFields {
        relationId type displayName
        fromModelId fromModelName fromModelDisplayName
        fromColumnId fromColumnName fromColumnDisplayName
        toModelId toModelName toModelDisplayName
        toColumnId toColumnName toColumnDisplayName
      }
    }
  }
}"#;

pub const CREATE_RELATION: &str = r#"
mutation CreateRelation($data: RelationInput!) {
  createRelation(data: $data)
}"#;

pub const UPDATE_RELATION: &str = r#"
mutation UpdateRelation($where: WhereIdInput!, $data: UpdateRelationInput!) {
  updateRelation(where: $where, data: $data)
}"#;

pub const DELETE_RELATION: &str = r#"
mutation DeleteRelation($where: WhereIdInput!) {
  deleteRelation(where: $where)
}"#;

// Calculated fields

pub const CREATE_CALCULATED_FIELD: &str = r#"
mutation CreateCalculatedField($data: CreateCalculatedFieldInput!) {
  createCalculatedField(data: $data)
}"#;

pub const UPDATE_CALCULATED_FIELD: &str = r#"
mutation UpdateCalculatedField($where: UpdateCalculatedFieldWhere!, $data: UpdateCalculatedFieldInput!) {
  updateCalculatedField(where: $where, data: $data)
}"#;

pub const DELETE_CALCULATED_FIELD: &str = r#"
mutation DeleteCalculatedField($where: UpdateCalculatedFieldWhere!) {
  deleteCalculatedField(where: $where)
}"#;

pub const VALIDATE_CALCULATED_FIELD: &str = r#"
mutation ValidateCalculatedField($data: ValidateCalculatedFieldInput!) {
  validateCalculatedField(data: $data) { valid message }
}"#;

// Threads

pub const LIST_THREADS: &str = r#"
query {
  threads { id summary }
}"#;

pub const GET_THREAD: &str = r#"
query Thread($threadId: Int!) {
  thread(threadId: $threadId) {
    id
    responses { id threadId question sql }
  }
}"#;

pub const UPDATE_THREAD: &str = r#"
mutation UpdateThread($where: ThreadUniqueWhereInput!, $data: UpdateThreadInput!) {
  updateThread(where: $where, data: $data) { id summary }
}"#;

pub const DELETE_THREAD: &str = r#"
mutation DeleteThread($where: ThreadUniqueWhereInput!) {
  deleteThread(where: $where)
}"#;

// API keys

pub const LIST_API_KEYS: &str = r#"
query {
  listApiKeys {
    id name secretKeyMasked lastUsedAt expiresAt createdByEmail createdAt revokedAt
  }
}"#;

pub const CREATE_API_KEY: &str = r#"
mutation CreateApiKey($data: CreateApiKeyInput!) {
  createApiKey(data: $data) {
    key { id name secretKeyMasked lastUsedAt expiresAt createdByEmail createdAt revokedAt }
    secretKey
  }
}"#;

pub const REVOKE_API_KEY: &str = r#"
mutation RevokeApiKey($keyId: Int!) {
  revokeApiKey(keyId: $keyId)
}"#;

pub const DELETE_API_KEY: &str = r#"
mutation DeleteApiKey($keyId: Int!) {
  deleteApiKey(keyId: $keyId)
}"#;

pub const LIST_PROJECT_API_KEYS: &str = r#"
query ListProjectApiKeys($projectId: Int!) {
  listProjectApiKeys(projectId: $projectId) {
    id projectId name secretKeyMasked lastUsedAt expiresAt createdByEmail createdAt revokedAt
  }
}"#;

pub const CREATE_PROJECT_API_KEY: &str = r#"
mutation CreateProjectApiKey($data: CreateProjectApiKeyInput!) {
  createProjectApiKey(data: $data) {
    key { id projectId name secretKeyMasked lastUsedAt expiresAt createdByEmail createdAt revokedAt }
    secretKey
  }
}"#;

pub const REVOKE_PROJECT_API_KEY: &str = r#"
mutation RevokeProjectApiKey($keyId: Int!, $projectId: Int!) {
  revokeProjectApiKey(keyId: $keyId, projectId: $projectId)
}"#;

pub const DELETE_PROJECT_API_KEY: &str = r#"
mutation DeleteProjectApiKey($keyId: Int!, $projectId: Int!) {
  deleteProjectApiKey(keyId: $keyId, projectId: $projectId)
}"#;

// History and identity

pub const API_HISTORY: &str = r#"
query ApiHistory($filter: ApiHistoryFilterInput, $pagination: ApiHistoryPaginationInput!) {
  apiHistory(filter: $filter, pagination: $pagination) {
    items {
      id projectId apiType threadId statusCode durationMs
      requestPayload responsePayload createdAt
    }
    total
    hasMore
  }
}"#;

pub const CURRENT_USER: &str = r#"
query {
  currentUser { email displayName }
}"#;

pub const PROJECT_NAMES: &str = r#"
query {
  listProjects { id displayName }
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_field() {
        assert_eq!(root_field(LIST_PROJECTS), Some("listProjects"));
        assert_eq!(root_field(GET_PROJECT), Some("project"));
        assert_eq!(root_field(DELETE_VIEW), Some("deleteView"));
        assert_eq!(root_field(LIST_MODEL_CALCULATED_FIELDS), Some("listModels"));
        assert_eq!(root_field(CURRENT_USER), Some("currentUser"));
        assert_eq!(root_field("query"), None);
        assert_eq!(root_field("{ }"), None);
    }
}
