//! Wire types and a transport-agnostic client for the Wren server API.

// Transport contract and errors
pub mod api;
pub use api::{ApiClientConfig, ApiError, Method, RawResponse, Request, Transport};

// Typed client over any transport
pub mod client;
pub use client::{DomainFailure, Outcome, WrenClient};

pub mod graphql;

// Domain records and the operations that fetch them
pub mod api_key;
pub mod calc_field;
pub mod history;
pub mod knowledge;
pub mod model;
pub mod project;
pub mod query;
pub mod relation;
pub mod thread;
pub mod whoami;

pub use api_key::{ApiKey, CreatedApiKey};
pub use calc_field::{CalculatedFieldInput, CalculatedFieldValidation, Expression};
pub use history::{ApiHistoryFilter, ApiHistoryItem, ApiHistoryPage, Pagination};
pub use knowledge::{
    Instruction, InstructionUpdate, NewInstruction, NewSqlPair, SqlPair, SqlPairUpdate,
};
pub use model::{DeployStatus, DeployedMdl, DetailedModel, Field, Model, ModelRelation, View};
pub use project::{Project, ProjectUpdate};
pub use query::{
    AskRequest, AskResult, ChartRequest, ChartResult, GenerateSqlRequest, GenerateSqlResult,
    RunSqlColumn, RunSqlRequest, RunSqlResult, Scalar, SummaryRequest, SummaryResult,
};
pub use relation::{NewRelation, Relation, RelationType};
pub use thread::{DetailedThread, Thread, ThreadResponse};
pub use whoami::WhoAmI;

#[cfg(any(test, feature = "mock"))]
pub mod mock;
