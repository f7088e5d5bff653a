//! Calculated fields

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::{ApiError, Transport};
use crate::client::WrenClient;
use crate::graphql;
use crate::model::Field;

/// Aggregate and scalar functions a calculated field may apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Expression {
    Abs,
    Avg,
    Count,
    CountIf,
    Max,
    Min,
    Sum,
    Cbrt,
    Ceil,
    Ceiling,
    Exp,
    Floor,
    Ln,
    Log10,
    Round,
    Sign,
    Length,
    Reverse,
}

impl Expression {
    pub const ALL: [Expression; 18] = [
        Expression::Abs,
        Expression::Avg,
        Expression::Count,
        Expression::CountIf,
        Expression::Max,
        Expression::Min,
        Expression::Sum,
        Expression::Cbrt,
        Expression::Ceil,
        Expression::Ceiling,
        Expression::Exp,
        Expression::Floor,
        Expression::Ln,
        Expression::Log10,
        Expression::Round,
        Expression::Sign,
        Expression::Length,
        Expression::Reverse,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Expression::Abs => "ABS",
            Expression::Avg => "AVG",
            Expression::Count => "COUNT",
            Expression::CountIf => "COUNT_IF",
            Expression::Max => "MAX",
            Expression::Min => "MIN",
            Expression::Sum => "SUM",
            Expression::Cbrt => "CBRT",
            Expression::Ceil => "CEIL",
            Expression::Ceiling => "CEILING",
            Expression::Exp => "EXP",
            Expression::Floor => "FLOOR",
            Expression::Ln => "LN",
            Expression::Log10 => "LOG10",
            Expression::Round => "ROUND",
            Expression::Sign => "SIGN",
            Expression::Length => "LENGTH",
            Expression::Reverse => "REVERSE",
        }
    }

    /// Comma-separated list of every accepted token
    pub fn valid_tokens() -> String {
        Self::ALL
            .iter()
            .map(Expression::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected expression token
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid expression {:?}; valid expressions: {}", .0, Expression::valid_tokens())]
pub struct InvalidExpression(pub String);

impl FromStr for Expression {
    type Err = InvalidExpression;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|e| e.as_str() == wanted)
            .ok_or_else(|| InvalidExpression(s.to_string()))
    }
}

/// Definition sent when creating or replacing a calculated field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedFieldInput {
    pub name: String,
    pub expression: Expression,
    /// Column ids from the owning model down to the source column
    pub lineage: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatedFieldValidation {
    pub valid: bool,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelCalculatedFields {
    id: i64,
    #[serde(default)]
    calculated_fields: Vec<Field>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelCalculatedFieldsData {
    list_models: Vec<ModelCalculatedFields>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValidateData {
    validate_calculated_field: CalculatedFieldValidation,
}

impl<T: Transport> WrenClient<T> {
    /// Calculated fields of one model
    ///
    /// The server has no per-model query, so all models are fetched and
    /// filtered here.
    pub async fn list_calculated_fields(&self, model_id: i64) -> Result<Vec<Field>, ApiError> {
        let data: ListModelCalculatedFieldsData = self
            .graphql(graphql::LIST_MODEL_CALCULATED_FIELDS, json!({}))
            .await?;
        data.list_models
            .into_iter()
            .find(|m| m.id == model_id)
            .map(|m| m.calculated_fields)
            .ok_or_else(|| ApiError::NotFound(format!("model {} not found", model_id)))
    }

    pub async fn create_calculated_field(
        &self,
        model_id: i64,
        input: &CalculatedFieldInput,
    ) -> Result<Value, ApiError> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Created {
            create_calculated_field: Value,
        }
        let mut data = serde_json::to_value(input).map_err(|e| ApiError::Parse(e.to_string()))?;
        data["modelId"] = json!(model_id);
        let created: Created = self
            .graphql(graphql::CREATE_CALCULATED_FIELD, json!({ "data": data }))
            .await?;
        Ok(created.create_calculated_field)
    }

    pub async fn update_calculated_field(
        &self,
        field_id: i64,
        input: &CalculatedFieldInput,
    ) -> Result<Value, ApiError> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Updated {
            update_calculated_field: Value,
        }
        let updated: Updated = self
            .graphql(
                graphql::UPDATE_CALCULATED_FIELD,
                json!({ "where": { "id": field_id }, "data": input }),
            )
            .await?;
        Ok(updated.update_calculated_field)
    }

    pub async fn delete_calculated_field(&self, field_id: i64) -> Result<(), ApiError> {
        let _: Value = self
            .graphql(
                graphql::DELETE_CALCULATED_FIELD,
                json!({ "where": { "id": field_id } }),
            )
            .await?;
        Ok(())
    }

    /// Ask the server whether `name` is usable on a model
    ///
    /// `column_id` excludes an existing calculated field from the
    /// duplicate-name check when renaming it.
    pub async fn validate_calculated_field(
        &self,
        model_id: i64,
        name: &str,
        column_id: Option<i64>,
    ) -> Result<CalculatedFieldValidation, ApiError> {
        let mut data = json!({ "name": name, "modelId": model_id });
        if let Some(column_id) = column_id {
            data["columnId"] = json!(column_id);
        }
        let validated: ValidateData = self
            .graphql(graphql::VALIDATE_CALCULATED_FIELD, json!({ "data": data }))
            .await?;
        Ok(validated.validate_calculated_field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockTransport;

    #[test]
    fn test_expression_parsing_is_case_insensitive() {
        for token in ["COUNT", "sum", "Avg", "abs", "length", "count_if"] {
            assert!(token.parse::<Expression>().is_ok(), "{token} rejected");
        }
        assert_eq!("log10".parse(), Ok(Expression::Log10));
    }

    #[test]
    fn test_invalid_expression_lists_every_token() {
        let err = "MEDIAN".parse::<Expression>().unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("invalid expression \"MEDIAN\"; valid expressions: "));
        for expression in Expression::ALL {
            assert!(message.contains(expression.as_str()));
        }
    }

    #[tokio::test]
    async fn test_list_filters_by_model() {
        let mock = MockTransport::new();
        mock.on_graphql(
            "listModels",
            json!({ "listModels": [
                { "id": 1, "calculatedFields": [] },
                { "id": 2, "calculatedFields": [{
                    "id": 30, "displayName": "total", "referenceName": "total",
                    "type": "DOUBLE", "isCalculated": true, "notNull": false,
                    "expression": "SUM"
                }] }
            ] }),
        );
        let client = WrenClient::new(mock);

        let fields = client.list_calculated_fields(2).await.unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].expression.as_deref(), Some("SUM"));

        let err = client.list_calculated_fields(3).await.unwrap_err();
        assert_eq!(err, ApiError::NotFound("model 3 not found".into()));
    }

    #[tokio::test]
    async fn test_create_sends_model_id_and_lineage() {
        let mock = MockTransport::new();
        mock.on_graphql(
            "createCalculatedField",
            json!({ "createCalculatedField": { "id": 31 } }),
        );
        let client = WrenClient::new(mock.clone());

        let input = CalculatedFieldInput {
            name: "order_count".into(),
            expression: Expression::Count,
            lineage: vec![12, 15],
        };
        client.create_calculated_field(4, &input).await.unwrap();
        assert_eq!(
            mock.graphql_variables("createCalculatedField"),
            Some(json!({ "data": {
                "name": "order_count", "expression": "COUNT", "lineage": [12, 15], "modelId": 4
            } }))
        );
    }
}
