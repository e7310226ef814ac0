//! Chef Server key and user database connection tool.
//!
//! Resolves the SQL credentials of the local Chef Server and connects to its
//! database. Any failure is fatal: the error is logged and the process exits
//! with status 1.

use anyhow::Context;
use chef_keydb::{Cli, Command, ResolvedConfig};
use chef_keydb_core::{Invocation, connection::probe, init_logging};
use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.global.verbose, cli.global.quiet) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let command = cli.command.unwrap_or(Command::Check);
    let mut invocation = Invocation::new(cli.database.into_options());

    match command {
        Command::Check => check(&mut invocation).await,
        Command::ShowConfig => show_config(&mut invocation),
    }
}

/// Resolves credentials, opens the database handle and probes it
async fn check(invocation: &mut Invocation) -> anyhow::Result<()> {
    info!("Testing database connection...");

    let target = invocation
        .descriptor()
        .context("Failed to resolve database credentials")?
        .to_string();

    let pool = invocation
        .db()
        .await
        .context("Failed to open database connection")?;
    probe(pool).await.context("Connection test failed")?;

    info!("✓ Connection test successful");
    println!("Connection to {} successful", target);

    Ok(())
}

/// Prints the resolved connection settings as JSON
fn show_config(invocation: &mut Invocation) -> anyhow::Result<()> {
    let descriptor = invocation
        .descriptor()
        .context("Failed to resolve database credentials")?
        .clone();
    let resolved = ResolvedConfig::new(invocation.options(), &descriptor);

    let json = serde_json::to_string_pretty(&resolved).context("Failed to serialize config")?;
    println!("{}", json);

    Ok(())
}
