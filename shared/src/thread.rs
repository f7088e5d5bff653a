//! Conversation threads

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::{ApiError, Transport};
use crate::client::WrenClient;
use crate::graphql;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thread {
    pub id: i64,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadResponse {
    pub id: i64,
    pub thread_id: i64,
    pub question: String,
    #[serde(default)]
    pub sql: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedThread {
    pub id: i64,
    #[serde(default)]
    pub responses: Vec<ThreadResponse>,
}

#[derive(Deserialize)]
struct ThreadsData {
    threads: Vec<Thread>,
}

#[derive(Deserialize)]
struct ThreadData {
    thread: Option<DetailedThread>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateThreadData {
    update_thread: Thread,
}

impl<T: Transport> WrenClient<T> {
    pub async fn list_threads(&self) -> Result<Vec<Thread>, ApiError> {
        let data: ThreadsData = self.graphql(graphql::LIST_THREADS, json!({})).await?;
        Ok(data.threads)
    }

    pub async fn get_thread(&self, id: i64) -> Result<DetailedThread, ApiError> {
        let data: ThreadData = self
            .graphql(graphql::GET_THREAD, json!({ "threadId": id }))
            .await?;
        data.thread
            .ok_or_else(|| ApiError::NotFound(format!("thread {} not found", id)))
    }

    pub async fn rename_thread(&self, id: i64, summary: &str) -> Result<Thread, ApiError> {
        let data: UpdateThreadData = self
            .graphql(
                graphql::UPDATE_THREAD,
                json!({ "where": { "id": id }, "data": { "summary": summary } }),
            )
            .await?;
        Ok(data.update_thread)
    }

    pub async fn delete_thread(&self, id: i64) -> Result<(), ApiError> {
        let _: Value = self
            .graphql(graphql::DELETE_THREAD, json!({ "where": { "id": id } }))
            .await?;
        Ok(())
    }
}
