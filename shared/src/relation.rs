//! Relations between models

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::{ApiError, Transport};
use crate::client::WrenClient;
use crate::graphql;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationType {
    OneToOne,
    OneToMany,
    ManyToOne,
}

impl RelationType {
    pub const ALL: [RelationType; 3] = [
        RelationType::OneToOne,
        RelationType::OneToMany,
        RelationType::ManyToOne,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::OneToOne => "ONE_TO_ONE",
            RelationType::OneToMany => "ONE_TO_MANY",
            RelationType::ManyToOne => "MANY_TO_ONE",
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected relation type token
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid relation type {0:?}; valid types: ONE_TO_ONE, ONE_TO_MANY, MANY_TO_ONE")]
pub struct InvalidRelationType(pub String);

impl FromStr for RelationType {
    type Err = InvalidRelationType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| InvalidRelationType(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relation {
    pub relation_id: i64,
    #[serde(rename = "type")]
    pub relation_type: RelationType,
    #[serde(default)]
    pub display_name: Option<String>,
    pub from_model_id: i64,
    #[serde(default)]
    pub from_model_name: String,
    #[serde(default)]
    pub from_model_display_name: String,
    pub from_column_id: i64,
    #[serde(default)]
    pub from_column_name: String,
    #[serde(default)]
    pub from_column_display_name: String,
    pub to_model_id: i64,
    #[serde(default)]
    pub to_model_name: String,
    #[serde(default)]
    pub to_model_display_name: String,
    pub to_column_id: i64,
    #[serde(default)]
    pub to_column_name: String,
    #[serde(default)]
    pub to_column_display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRelation {
    pub from_model_id: i64,
    pub from_column_id: i64,
    pub to_model_id: i64,
    pub to_column_id: i64,
    #[serde(rename = "type")]
    pub relation_type: RelationType,
}

#[derive(Deserialize)]
struct DiagramData {
    diagram: Diagram,
}

#[derive(Deserialize)]
struct Diagram {
    #[serde(default)]
    models: Vec<DiagramModel>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiagramModel {
    #[serde(default)]
    relation_fields: Vec<Relation>,
}

/// Keep the first occurrence of every relation id, preserving order
///
/// The diagram lists each relation once per participating model.
pub fn dedup_relations(relations: impl IntoIterator<Item = Relation>) -> Vec<Relation> {
    let mut seen = HashSet::new();
    relations
        .into_iter()
        .filter(|r| seen.insert(r.relation_id))
        .collect()
}

impl<T: Transport> WrenClient<T> {
    pub async fn list_relations(&self) -> Result<Vec<Relation>, ApiError> {
        let data: DiagramData = self
            .graphql(graphql::DIAGRAM_RELATIONS, json!({}))
            .await?;
        Ok(dedup_relations(
            data.diagram
                .models
                .into_iter()
                .flat_map(|m| m.relation_fields),
        ))
    }

    pub async fn create_relation(&self, relation: &NewRelation) -> Result<Value, ApiError> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Created {
            create_relation: Value,
        }
        let data: Created = self
            .graphql(graphql::CREATE_RELATION, json!({ "data": relation }))
            .await?;
        Ok(data.create_relation)
    }

    pub async fn update_relation(
        &self,
        id: i64,
        relation_type: RelationType,
    ) -> Result<(), ApiError> {
        let _: Value = self
            .graphql(
                graphql::UPDATE_RELATION,
                json!({ "where": { "id": id }, "data": { "type": relation_type } }),
            )
            .await?;
        Ok(())
    }

    pub async fn delete_relation(&self, id: i64) -> Result<(), ApiError> {
        let _: Value = self
            .graphql(graphql::DELETE_RELATION, json!({ "where": { "id": id } }))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;

    fn relation_json(id: i64, from: &str, to: &str) -> Value {
        json!({
            "relationId": id,
            "type": "MANY_TO_ONE",
            "fromModelId": 1, "fromModelName": from, "fromModelDisplayName": from,
            "fromColumnId": 10, "fromColumnName": "customer_id", "fromColumnDisplayName": "customer_id",
            "toModelId": 2, "toModelName": to, "toModelDisplayName": to,
            "toColumnId": 20, "toColumnName": "id", "toColumnDisplayName": "id"
        })
    }

    #[tokio::test]
    async fn test_list_relations_dedups_by_id() {
        let mock = MockTransport::new();
        mock.on_graphql(
            "diagram",
            json!({ "diagram": { "models": [
                { "relationFields": [relation_json(5, "orders", "customers"), relation_json(6, "orders", "items")] },
                { "relationFields": [relation_json(5, "orders", "customers")] },
                { "relationFields": [] },
                { "relationFields": [relation_json(7, "items", "products"), relation_json(6, "orders", "items")] }
            ] } }),
        );
        let client = WrenClient::new(mock);

        let ids: Vec<i64> = client
            .list_relations()
            .await
            .unwrap()
            .iter()
            .map(|r| r.relation_id)
            .collect();
        assert_eq!(ids, vec![5, 6, 7]);
    }

    #[test]
    fn test_relation_type_parsing() {
        assert_eq!("one_to_many".parse(), Ok(RelationType::OneToMany));
        assert_eq!("MANY_TO_ONE".parse(), Ok(RelationType::ManyToOne));
        let err = "MANY_TO_MANY".parse::<RelationType>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid relation type \"MANY_TO_MANY\"; valid types: ONE_TO_ONE, ONE_TO_MANY, MANY_TO_ONE"
        );
    }

    #[tokio::test]
    async fn test_update_relation_variables() {
        let mock = MockTransport::new();
        mock.on_graphql("updateRelation", json!({ "updateRelation": { "id": 9 } }));
        let client = WrenClient::new(mock.clone());

        client
            .update_relation(9, RelationType::OneToOne)
            .await
            .unwrap();
        assert_eq!(
            mock.graphql_variables("updateRelation"),
            Some(json!({ "where": { "id": 9 }, "data": { "type": "ONE_TO_ONE" } }))
        );
    }
}
