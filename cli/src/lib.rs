//! `wren` command-line client
//!
//! The binary is a thin wrapper; everything testable lives here so
//! scenarios can drive [`app::App`] against a mock transport.

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod transport;
pub mod ui;

pub use app::{App, Connect};
pub use cli::{Cli, GlobalOptions};
pub use error::CliError;
