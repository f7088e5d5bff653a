//! Knowledge base: instructions and SQL pairs

use serde::{Deserialize, Serialize};

use crate::api::{endpoints, ApiError, Transport};
use crate::client::WrenClient;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instruction {
    pub id: i64,
    pub instruction: String,
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub is_global: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInstruction {
    pub instruction: String,
    pub questions: Vec<String>,
    pub is_global: bool,
}

/// Partial instruction update; `None` fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_global: Option<bool>,
}

impl InstructionUpdate {
    pub fn is_empty(&self) -> bool {
        self.instruction.is_none() && self.questions.is_none() && self.is_global.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlPair {
    pub id: i64,
    #[serde(default)]
    pub project_id: Option<i64>,
    pub sql: String,
    pub question: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSqlPair {
    pub question: String,
    pub sql: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SqlPairUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
}

impl SqlPairUpdate {
    pub fn is_empty(&self) -> bool {
        self.question.is_none() && self.sql.is_none()
    }
}

impl<T: Transport> WrenClient<T> {
    pub async fn list_instructions(&self) -> Result<Vec<Instruction>, ApiError> {
        self.get_json(endpoints::INSTRUCTIONS).await
    }

    pub async fn create_instruction(
        &self,
        instruction: &NewInstruction,
    ) -> Result<Instruction, ApiError> {
        self.post_json(endpoints::INSTRUCTIONS, instruction).await
    }

    pub async fn update_instruction(
        &self,
        id: i64,
        update: &InstructionUpdate,
    ) -> Result<Instruction, ApiError> {
        self.put_json(&endpoints::instruction(id), update).await
    }

    pub async fn delete_instruction(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&endpoints::instruction(id)).await
    }

    pub async fn list_sql_pairs(&self) -> Result<Vec<SqlPair>, ApiError> {
        self.get_json(endpoints::SQL_PAIRS).await
    }

    /// Look up one SQL pair
    ///
    /// There is no single-pair endpoint; the full list is scanned.
    pub async fn get_sql_pair(&self, id: i64) -> Result<SqlPair, ApiError> {
        self.list_sql_pairs()
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("SQL pair {} not found", id)))
    }

    pub async fn create_sql_pair(&self, pair: &NewSqlPair) -> Result<SqlPair, ApiError> {
        self.post_json(endpoints::SQL_PAIRS, pair).await
    }

    pub async fn update_sql_pair(
        &self,
        id: i64,
        update: &SqlPairUpdate,
    ) -> Result<SqlPair, ApiError> {
        self.put_json(&endpoints::sql_pair(id), update).await
    }

    pub async fn delete_sql_pair(&self, id: i64) -> Result<(), ApiError> {
        self.delete(&endpoints::sql_pair(id)).await
    }
}
