//! # ratchet-schema — Ratcheting Schema Validation
//!
//! Validates updates to schema-governed documents so that values an update
//! leaves untouched are not rejected by rules tightened after they were
//! stored. Failures on unchanged values are reported as warnings instead of
//! errors.
//!
//! ## Layers
//!
//! - [`schema`]: compiles a JSON Schema document into a tree of nodes, each
//!   with a `jsonschema` validator for its own keywords.
//! - [`engine`]: depth-first validation with per-field and per-index
//!   validator-factory hooks.
//! - [`correlation`]: the lazily built tree pairing old and new values at
//!   each visited position, with memoized structural equality.
//! - [`listmap`]: merge-key lookup for `map`-type lists.
//! - [`ratcheting`]: the validator that plugs into the engine hooks and
//!   demotes errors on unchanged values.
//! - [`registry`]: loads a directory of schemas by name.
//! - [`config`]: environment-driven configuration.
//!
//! ## Crate Policy
//!
//! - Depends only on `ratchet-core` internally.
//! - Correlation and equality never fail; only loading surfaces return errors.
//! - Ratcheting moves errors to warnings; it never adds or drops a violation.

pub mod config;
pub mod correlation;
pub mod engine;
pub mod listmap;
pub mod ratcheting;
pub mod registry;
pub mod result;
pub mod schema;

pub use config::{ConfigError, RatchetConfig};
pub use correlation::CorrelatedObject;
pub use engine::{EngineOptions, SchemaArgs, SchemaValidator, SubValidatorFactory, ValueValidator};
pub use ratcheting::RatchetingSchemaValidator;
pub use registry::{RegistryError, SchemaRegistry};
pub use result::{ValidationResult, Violation};
pub use schema::{CompileOptions, ListType, Schema, SchemaError};
