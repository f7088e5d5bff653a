//! One module per command group

pub mod api_key;
pub mod auth;
pub mod calc_field;
pub mod config;
pub mod deploy;
pub mod history;
pub mod instruction;
pub mod model;
pub mod project;
pub mod query;
pub mod relation;
pub mod sql_pair;
pub mod thread;
pub mod view;
