//! # ratchet-core — Foundational Types for Ratcheting Validation
//!
//! This crate is the leaf of the workspace DAG. It defines the pieces every
//! other crate shares when reasoning about old and new documents:
//!
//! 1. **The decoded value algebra.** Documents are `serde_json::Value` trees:
//!    null, bool, number, string, list, or string-keyed map. Nothing
//!    schema-specific leaks into these types.
//!
//! 2. **Structural equality.** [`deep_equal`] is an explicit recursive
//!    comparison over that algebra. Map comparison ignores key order; list
//!    comparison is positional; scalars of different kinds are unequal.
//!
//! 3. **Instance paths.** [`pointer`] builds RFC 6901 JSON Pointers for
//!    violation reporting.
//!
//! 4. **Document loading.** [`document`] parses JSON or YAML files into the
//!    value algebra.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `ratchet-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod document;
pub mod error;
pub mod pointer;
pub mod value;

pub use document::{load_document, parse_document, DocumentFormat};
pub use error::{DocumentError, RatchetError};
pub use value::{deep_equal, kind_name};
