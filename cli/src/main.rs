use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use wren_cli::transport::NativeConnector;
use wren_cli::{App, Cli, CliError};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.debug {
        "wren_cli=debug,wren_shared=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let _ = writeln!(io::stderr(), "{} {}", "Error:".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let options = cli.options();
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    let mut stdin = io::stdin().lock();

    let mut app = App::new(
        &options,
        NativeConnector,
        &mut stdout,
        &mut stderr,
        &mut stdin,
    )?;
    app.run(cli.command).await
}
