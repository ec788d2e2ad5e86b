//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types shared across the workspace. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Correlation and equality never fail; they resolve ambiguity to
//!   "cannot correlate" or "not equal". Nothing here models those cases.
//! - Loading errors carry the offending path or schema name and a reason.
//! - Validation failures are data (`ValidationResult`), not errors.

use thiserror::Error;

/// Top-level error type for ratcheting validation tooling.
#[derive(Error, Debug)]
pub enum RatchetError {
    /// A document could not be loaded or decoded.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// A schema could not be loaded or compiled.
    #[error("schema error: {0}")]
    Schema(String),

    /// Configuration was present but invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Error while loading a JSON or YAML document.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The file could not be read.
    #[error("cannot read '{path}': {reason}")]
    Read {
        /// Path to the document.
        path: String,
        /// Underlying IO failure.
        reason: String,
    },

    /// The content did not parse in the declared format.
    #[error("invalid {format} in '{path}': {reason}")]
    Parse {
        /// Path to the document, or `<inline>` for in-memory content.
        path: String,
        /// Format that was attempted.
        format: &'static str,
        /// Parser message.
        reason: String,
    },

    /// YAML content used a construct with no JSON equivalent.
    #[error("cannot convert YAML in '{path}' to JSON: {reason}")]
    Conversion {
        /// Path to the document.
        path: String,
        /// Which construct failed.
        reason: String,
    },
}
