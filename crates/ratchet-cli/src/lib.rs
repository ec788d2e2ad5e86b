//! # ratchet-cli — Ratcheting Validation Command-Line Interface
//!
//! ## Subcommands
//!
//! - `validate` — validate a new document, or an update from an old one
//! - `schemas` — list the schemas loaded from a directory
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from business logic.
//! - Handler functions delegate to `ratchet-schema`; no validation logic here.
//! - Handlers return an exit code: 0 success, 1 validation failure,
//!   2 operational error.

pub mod schemas;
pub mod validate;
