//! # ratchet CLI Entry Point
//!
//! Assembles subcommands and dispatches to handler modules.

use std::process::ExitCode;

use clap::Parser;

use ratchet_schema::RatchetConfig;

/// Ratcheting schema validation for stored documents.
///
/// Validates created documents against a schema, and updated documents so
/// that unchanged values are not rejected by rules tightened since they
/// were stored.
#[derive(Parser, Debug)]
#[command(name = "ratchet", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Validate a document, or an update to one.
    Validate(ratchet_cli::validate::ValidateArgs),
    /// List the schemas in a directory.
    Schemas(ratchet_cli::schemas::SchemasArgs),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let outcome = RatchetConfig::from_env()
        .map_err(anyhow::Error::from)
        .and_then(|config| match &cli.command {
            Commands::Validate(args) => ratchet_cli::validate::run_validate(args, &config),
            Commands::Schemas(args) => ratchet_cli::schemas::run_schemas(args, &config),
        });

    match outcome {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
