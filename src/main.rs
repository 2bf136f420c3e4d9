// src/main.rs

use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::process::ExitCode;
use uberadb::cli::{Cli, Commands};
use uberadb::commands;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if let Commands::Completions { shell } = &cli.command {
        clap_complete::generate(*shell, &mut Cli::command(), "uberadb", &mut std::io::stdout());
        return Ok(ExitCode::SUCCESS);
    }

    let Some(config) = cli.command.to_config() else {
        return Ok(ExitCode::SUCCESS);
    };

    // Initialize tracing subscriber; --debug overrides the default level
    let default_level = if config.debug { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    let code = commands::cmd_batch(&config);
    Ok(ExitCode::from(code as u8))
}
