//! Command dispatch
//!
//! Every command follows the same path: load configuration, connect a
//! transport, call one domain operation, render the result.

use std::io::{BufRead, Write};

use wren_shared::api::{ApiClientConfig, Transport};
use wren_shared::{DomainFailure, Outcome, WrenClient};

use crate::cli::{Command, GlobalOptions};
use crate::commands;
use crate::config::{Config, ConfigStore};
use crate::error::CliError;
use crate::output::Printer;

/// Turns client settings into a live transport
pub trait Connect {
    type Transport: Transport;

    fn connect(&self, config: ApiClientConfig) -> Result<Self::Transport, CliError>;
}

/// Loaded configuration plus an authenticated client
pub struct Session<T> {
    pub config: Config,
    pub client: WrenClient<T>,
}

impl<T: Transport> Session<T> {
    /// Active project id, or the guidance error when none is selected
    pub fn require_project(&self) -> Result<i64, CliError> {
        self.config.project()?.ok_or(CliError::NoProject)
    }
}

pub struct App<'a, C> {
    pub(crate) store: ConfigStore,
    pub(crate) connector: C,
    pub(crate) out: Printer<'a>,
    pub(crate) input: &'a mut dyn BufRead,
}

impl<'a, C: Connect> App<'a, C> {
    pub fn new(
        options: &GlobalOptions,
        connector: C,
        out: &'a mut dyn Write,
        err: &'a mut dyn Write,
        input: &'a mut dyn BufRead,
    ) -> Result<Self, CliError> {
        let store = match &options.config_path {
            Some(path) => ConfigStore::at(path),
            None => ConfigStore::default_location()?,
        };
        Ok(Self {
            store,
            connector,
            out: Printer::new(options.output, out, err),
            input,
        })
    }

    pub async fn run(&mut self, command: Command) -> Result<(), CliError> {
        match command {
            Command::Login(args) => commands::auth::login(self, args).await,
            Command::Whoami => commands::auth::whoami(self).await,
            Command::Config { action } => commands::config::run(self, action),
            Command::Project { action } => commands::project::run(self, action).await,
            Command::Model { action } => commands::model::run(self, action).await,
            Command::View { action } => commands::view::run(self, action).await,
            Command::Relation { action } => commands::relation::run(self, action).await,
            Command::CalcField { action } => commands::calc_field::run(self, action).await,
            Command::Instruction { action } => commands::instruction::run(self, action).await,
            Command::SqlPair { action } => commands::sql_pair::run(self, action).await,
            Command::Thread { action } => commands::thread::run(self, action).await,
            Command::ApiKey { action } => commands::api_key::run(self, action).await,
            Command::ProjectKey(args) => commands::api_key::run_project(self, args).await,
            Command::History { action } => commands::history::run(self, action).await,
            Command::Ask(args) => commands::query::ask(self, args).await,
            Command::Sql(args) => commands::query::generate_sql(self, args).await,
            Command::RunSql(args) => commands::query::run_sql(self, args).await,
            Command::Summary(args) => commands::query::summary(self, args).await,
            Command::Chart(args) => commands::query::chart(self, args).await,
            Command::Deploy(args) => commands::deploy::run(self, args).await,
        }
    }

    /// Load configuration and connect with the stored credentials
    pub(crate) fn session(&self) -> Result<Session<C::Transport>, CliError> {
        let config = self.store.load()?;
        let transport = self.connector.connect(config.client_config()?)?;
        Ok(Session {
            config,
            client: WrenClient::new(transport),
        })
    }

    /// Session for commands that act on the active project
    pub(crate) fn project_session(&self) -> Result<(Session<C::Transport>, i64), CliError> {
        let session = self.session()?;
        let project_id = session.require_project()?;
        Ok((session, project_id))
    }

    /// Unwrap an outcome; failures are echoed as JSON in JSON mode, then raised
    pub(crate) fn settle<T>(&mut self, outcome: Outcome<T>) -> Result<T, CliError> {
        match outcome {
            Outcome::Success(value) => Ok(value),
            Outcome::Failed(failure) => Err(self.report_failure(failure)),
        }
    }

    fn report_failure(&mut self, failure: DomainFailure) -> CliError {
        if self.out.is_json() {
            if let Err(e) = self.out.json(&failure) {
                return e;
            }
        }
        CliError::Domain(failure)
    }
}
