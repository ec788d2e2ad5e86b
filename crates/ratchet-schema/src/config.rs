//! Ratcheting validation configuration.
//!
//! Defaults suit an API server validating stored objects. Override via
//! environment variables or explicit construction for tests and tooling.

use crate::engine::{EngineOptions, DEFAULT_MAX_DEPTH};
use crate::schema::CompileOptions;

/// Configuration for schema compilation and update validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatchetConfig {
    /// Forgive unchanged values on update. When false, updates are
    /// validated exactly like creates.
    pub enabled: bool,
    /// Treat `format` as an assertion.
    pub validate_formats: bool,
    /// Skip a node's children once its own keywords fail.
    pub short_circuit: bool,
    /// Maximum nesting depth traversed by the engine.
    pub max_depth: usize,
}

impl Default for RatchetConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            validate_formats: false,
            short_circuit: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl RatchetConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `RATCHET_ENABLED` (default: `true`)
    /// - `RATCHET_VALIDATE_FORMATS` (default: `false`)
    /// - `RATCHET_SHORT_CIRCUIT` (default: `false`)
    /// - `RATCHET_MAX_DEPTH` (default: 64)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            enabled: env_bool(&lookup, "RATCHET_ENABLED", defaults.enabled)?,
            validate_formats: env_bool(&lookup, "RATCHET_VALIDATE_FORMATS", defaults.validate_formats)?,
            short_circuit: env_bool(&lookup, "RATCHET_SHORT_CIRCUIT", defaults.short_circuit)?,
            max_depth: match lookup("RATCHET_MAX_DEPTH") {
                None => defaults.max_depth,
                Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                    var: "RATCHET_MAX_DEPTH".to_string(),
                    value: raw,
                })?,
            },
        })
    }

    /// Engine options derived from this configuration.
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            short_circuit: self.short_circuit,
            max_depth: self.max_depth,
        }
    }

    /// Schema compile options derived from this configuration.
    pub fn compile_options(&self) -> CompileOptions {
        CompileOptions {
            validate_formats: self.validate_formats,
        }
    }
}

fn env_bool(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &str,
    default: bool,
) -> Result<bool, ConfigError> {
    let Some(raw) = lookup(var) else {
        return Ok(default);
    };
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            var: var.to_string(),
            value: raw,
        }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A variable was set to something that does not parse.
    #[error("invalid value for {var}: '{value}'")]
    InvalidValue {
        /// Environment variable name.
        var: String,
        /// Raw value as found in the environment.
        value: String,
    },
}

impl From<ConfigError> for ratchet_core::RatchetError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}
