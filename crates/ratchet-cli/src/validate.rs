//! # Validate Subcommand
//!
//! Validates a document against a named schema. Given only `--new`, the
//! document is validated as a create. Given `--old` as well, it is validated
//! as an update of the stored document, and failures on values the update
//! left unchanged are reported as warnings.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use ratchet_schema::{RatchetConfig, SchemaRegistry, ValidationResult};

/// Arguments for the `ratchet validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Directory containing `*.schema.json` / `*.schema.yaml` files.
    #[arg(long, default_value = "schemas")]
    pub schema_dir: PathBuf,

    /// File name of the schema to validate against.
    #[arg(long)]
    pub schema: String,

    /// The submitted document (JSON or YAML).
    #[arg(long, value_name = "PATH")]
    pub new: PathBuf,

    /// The stored document being updated. Enables ratcheting.
    #[arg(long, value_name = "PATH")]
    pub old: Option<PathBuf>,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the validate subcommand.
///
/// Returns exit code: 0 when there are no errors, 1 when there are.
/// Operational failures are returned as `Err` and map to exit code 2.
pub fn run_validate(args: &ValidateArgs, config: &RatchetConfig) -> Result<u8> {
    let registry = SchemaRegistry::from_config(&args.schema_dir, config)
        .with_context(|| format!("failed to load schemas from {}", args.schema_dir.display()))?;

    let result = registry
        .validate_files(&args.schema, &args.new, args.old.as_deref(), config)
        .with_context(|| format!("failed to validate {}", args.new.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_report(&args.new, args.old.is_some(), &result);
    }

    Ok(if result.is_valid() { 0 } else { 1 })
}

fn print_report(path: &Path, update: bool, result: &ValidationResult) {
    let mode = if update { "update" } else { "create" };
    let status = if result.is_valid() { "PASS" } else { "FAIL" };
    println!(
        "{status}: {} ({mode}): {} error(s), {} warning(s)",
        path.display(),
        result.errors.len(),
        result.warnings.len()
    );
    if !result.errors.is_empty() || !result.warnings.is_empty() {
        println!("{result}");
    }
}
