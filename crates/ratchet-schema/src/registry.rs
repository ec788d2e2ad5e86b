//! # Schema Registry
//!
//! Loads every schema document in a directory, compiles it, and indexes it
//! by file name so that callers can validate documents against a schema by
//! name.
//!
//! Files named `*.schema.json` are parsed as JSON and `*.schema.yaml` /
//! `*.schema.yml` as YAML. Anything else in the directory is ignored.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use ratchet_core::{load_document, DocumentError, RatchetError};

use crate::config::RatchetConfig;
use crate::ratcheting::RatchetingSchemaValidator;
use crate::result::ValidationResult;
use crate::schema::{CompileOptions, Schema, SchemaError};

const SCHEMA_SUFFIXES: [&str; 3] = [".schema.json", ".schema.yaml", ".schema.yml"];

/// Error while loading or looking up schemas.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The schema directory could not be read.
    #[error("cannot read schema directory '{path}': {reason}")]
    Directory {
        /// Directory that was scanned.
        path: String,
        /// Underlying IO failure.
        reason: String,
    },

    /// A schema file could not be loaded.
    #[error("schema load error for '{schema_name}': {source}")]
    Load {
        /// Schema file name.
        schema_name: String,
        /// Document loading failure.
        source: DocumentError,
    },

    /// A schema file loaded but did not compile.
    #[error("schema compile error for '{schema_name}': {source}")]
    Compile {
        /// Schema file name.
        schema_name: String,
        /// Compilation failure.
        source: SchemaError,
    },

    /// No schema with this name was loaded.
    #[error("schema '{schema_name}' not found in {dir}")]
    NotFound {
        /// Requested schema name.
        schema_name: String,
        /// Directory the registry was loaded from.
        dir: String,
    },
}

impl From<RegistryError> for RatchetError {
    fn from(e: RegistryError) -> Self {
        Self::Schema(e.to_string())
    }
}

/// Compiled schemas loaded from one directory.
///
/// Schemas are immutable once loaded; the registry is `Send + Sync` and can
/// be shared across threads, each validation building its own correlation
/// tree.
#[derive(Debug)]
pub struct SchemaRegistry {
    schema_dir: PathBuf,
    schemas: HashMap<String, Schema>,
}

impl SchemaRegistry {
    /// Load and compile every schema file in `schema_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError`] if the directory cannot be read or any
    /// schema file fails to load or compile.
    pub fn new(schema_dir: impl AsRef<Path>, options: &CompileOptions) -> Result<Self, RegistryError> {
        let schema_dir = schema_dir.as_ref().to_path_buf();
        let dir_err = |e: std::io::Error| RegistryError::Directory {
            path: schema_dir.display().to_string(),
            reason: e.to_string(),
        };

        let mut schemas = HashMap::new();
        for entry in std::fs::read_dir(&schema_dir).map_err(dir_err)? {
            let path = entry.map_err(dir_err)?.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !SCHEMA_SUFFIXES.iter().any(|s| name.ends_with(s)) {
                continue;
            }
            let document = load_document(&path).map_err(|source| RegistryError::Load {
                schema_name: name.to_string(),
                source,
            })?;
            let schema = Schema::compile(&document, options).map_err(|source| {
                RegistryError::Compile {
                    schema_name: name.to_string(),
                    source,
                }
            })?;
            schemas.insert(name.to_string(), schema);
        }

        tracing::info!(
            schema_dir = %schema_dir.display(),
            schema_count = schemas.len(),
            "loaded schema registry"
        );
        Ok(Self { schema_dir, schemas })
    }

    /// Load with options taken from `config`.
    pub fn from_config(schema_dir: impl AsRef<Path>, config: &RatchetConfig) -> Result<Self, RegistryError> {
        Self::new(schema_dir, &config.compile_options())
    }

    /// Returns the schema directory path.
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Returns the number of loaded schemas.
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// Returns the names of all loaded schemas, sorted alphabetically.
    pub fn schema_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    /// Look up a loaded schema by file name.
    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.schemas.get(name)
    }

    /// Look up a schema, failing with [`RegistryError::NotFound`].
    pub fn require(&self, name: &str) -> Result<&Schema, RegistryError> {
        self.get(name).ok_or_else(|| RegistryError::NotFound {
            schema_name: name.to_string(),
            dir: self.schema_dir.display().to_string(),
        })
    }

    /// Ratcheting validator for a named schema.
    pub fn ratcheting_validator(
        &self,
        name: &str,
        config: &RatchetConfig,
    ) -> Result<RatchetingSchemaValidator<'_>, RegistryError> {
        Ok(RatchetingSchemaValidator::from_config(self.require(name)?, config))
    }

    /// Validate document files against a named schema.
    ///
    /// With `old_path` this is an update validation with ratcheting (subject
    /// to `config.enabled`); without it, a plain create validation.
    pub fn validate_files(
        &self,
        name: &str,
        new_path: &Path,
        old_path: Option<&Path>,
        config: &RatchetConfig,
    ) -> Result<ValidationResult, RatchetError> {
        let validator = self.ratcheting_validator(name, config)?;
        let new: Value = load_document(new_path)?;
        let result = match old_path {
            Some(old_path) => {
                let old = load_document(old_path)?;
                validator.validate_update(&new, &old)
            }
            None => validator.validate(&new),
        };
        tracing::debug!(
            schema = name,
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "validated document"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn loads_json_and_yaml_schemas() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.schema.json", r#"{"type": "object"}"#);
        write(dir.path(), "b.schema.yaml", "type: string\n");
        write(dir.path(), "README.md", "not a schema");
        let registry = SchemaRegistry::new(dir.path(), &CompileOptions::default()).unwrap();
        assert_eq!(registry.schema_count(), 2);
        assert_eq!(registry.schema_dir(), dir.path());
        assert_eq!(registry.schema_names(), ["a.schema.json", "b.schema.yaml"]);
        assert!(registry.get("README.md").is_none());
    }

    #[test]
    fn missing_directory_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SchemaRegistry::new(dir.path().join("nope"), &CompileOptions::default()).unwrap_err();
        assert!(matches!(err, RegistryError::Directory { .. }));
    }

    #[test]
    fn invalid_schema_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "bad.schema.json", "{not json");
        let err = SchemaRegistry::new(dir.path(), &CompileOptions::default()).unwrap_err();
        assert!(matches!(err, RegistryError::Load { .. }), "got {err}");

        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "ref.schema.json", r##"{"$ref": "#/x"}"##);
        let err = SchemaRegistry::new(dir.path(), &CompileOptions::default()).unwrap_err();
        assert!(matches!(err, RegistryError::Compile { .. }), "got {err}");
    }

    #[test]
    fn unknown_schema_name() {
        let dir = tempfile::tempdir().unwrap();
        let registry = SchemaRegistry::new(dir.path(), &CompileOptions::default()).unwrap();
        let err = registry.require("widget.schema.json").unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { .. }));
    }

    #[test]
    fn validate_files_create_and_update() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "widget.schema.json",
            r#"{"type": "object", "properties": {"foo": {"enum": ["A", "B"]}}}"#,
        );
        let old = write(dir.path(), "old.yaml", "foo: legacy\n");
        let new = write(dir.path(), "new.json", r#"{"foo": "legacy"}"#);
        let registry = SchemaRegistry::new(dir.path(), &CompileOptions::default()).unwrap();
        let config = RatchetConfig::default();

        let created = registry
            .validate_files("widget.schema.json", &new, None, &config)
            .unwrap();
        assert_eq!(created.errors.len(), 1);

        let updated = registry
            .validate_files("widget.schema.json", &new, Some(&old), &config)
            .unwrap();
        assert!(updated.is_valid());
        assert_eq!(updated.warnings.len(), 1);
    }
}
