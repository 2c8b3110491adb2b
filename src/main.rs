//! jwt-audit: an offline CLI that explains why a JWT is valid, invalid,
//! or corrupt.
//!
//! Entry point for the application. Parses CLI arguments, sets up logging
//! and delegates to the appropriate command handler.

#![forbid(unsafe_code)]

mod audit;
mod cli;
mod commands;
mod config;
mod core;
mod display;
mod error;
mod input;

use std::io::IsTerminal;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Commands};

/// Environment variable holding the log filter, e.g. `jwt_audit=debug`.
const LOG_ENV: &str = "JWT_AUDIT_LOG";

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Parse CLI arguments and dispatch to the appropriate command handler.
///
/// Returns `ExitCode` so the caller can exit without `process::exit`,
/// allowing all destructors (including `Zeroizing`) to run.
fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Validate(args) => commands::validate::execute(args),
        Commands::Decode(args) => {
            commands::decode::execute(args)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Analyze(args) => commands::analyze::execute(args),
        Commands::Generate(args) => {
            commands::generate::execute(args)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Log to stderr so stdout stays machine-readable. `JWT_AUDIT_LOG` wins
/// over `--verbose`. A subscriber installed earlier is left in place.
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal())
                .with_target(false),
        )
        .try_init();
    if let Err(err) = installed {
        tracing::debug!(error = %err, "keeping the already installed subscriber");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging(false);
        init_logging(true);
        tracing::debug!("still logging after a second init");
    }
}
