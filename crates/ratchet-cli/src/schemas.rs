//! # Schemas Subcommand
//!
//! Lists the schemas a directory provides, as the `validate` subcommand
//! would load them.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use ratchet_schema::{RatchetConfig, SchemaRegistry};

/// Arguments for the `ratchet schemas` subcommand.
#[derive(Args, Debug)]
pub struct SchemasArgs {
    /// Directory containing `*.schema.json` / `*.schema.yaml` files.
    #[arg(long, default_value = "schemas")]
    pub schema_dir: PathBuf,
}

/// Execute the schemas subcommand.
pub fn run_schemas(args: &SchemasArgs, config: &RatchetConfig) -> Result<u8> {
    let registry = SchemaRegistry::from_config(&args.schema_dir, config)
        .with_context(|| format!("failed to load schemas from {}", args.schema_dir.display()))?;

    for name in registry.schema_names() {
        println!("{name}");
    }
    println!(
        "{} schema(s) in {}",
        registry.schema_count(),
        registry.schema_dir().display()
    );
    Ok(0)
}
