//! # Ratcheting Update Validation
//!
//! Validates an update so that values the update left untouched are not
//! rejected by rules added after they were stored.
//!
//! ## Rule
//!
//! A failing validation at a node is forgiven, and its errors demoted to
//! warnings, if and only if the old and new values at that node are
//! structurally identical. The rule is applied at every node the engine
//! visits, so an unchanged field deep inside a changed object is still
//! forgiven.
//!
//! ## Mechanism
//!
//! [`RatchetingSchemaValidator::validate_update`] builds a
//! [`CorrelatedObject`] tree rooted at the two documents and runs a
//! ratcheting validator at the root. Each ratcheting validator runs the
//! engine for its node with itself installed as the engine's
//! [`SubValidatorFactory`], so every child the engine visits is first
//! correlated and then validated by another ratcheting validator. Children
//! with no old counterpart fall back to the engine's default validator.

use serde_json::Value;

use crate::config::RatchetConfig;
use crate::correlation::CorrelatedObject;
use crate::engine::{
    EngineOptions, SchemaArgs, SchemaValidator, SubValidatorFactory, ValueValidator,
};
use crate::result::ValidationResult;
use crate::schema::Schema;

/// Entry point for plain and ratcheting validation against one schema.
#[derive(Debug, Clone)]
pub struct RatchetingSchemaValidator<'s> {
    args: SchemaArgs<'s>,
    ratcheting: bool,
}

impl<'s> RatchetingSchemaValidator<'s> {
    /// Validator rooted at `schema` with ratcheting enabled.
    pub fn new(schema: &'s Schema, options: EngineOptions) -> Self {
        Self {
            args: SchemaArgs::root(schema, options),
            ratcheting: true,
        }
    }

    /// Validator configured from a [`RatchetConfig`].
    pub fn from_config(schema: &'s Schema, config: &RatchetConfig) -> Self {
        Self::new(schema, config.engine_options()).with_ratcheting(config.enabled)
    }

    /// Report instance paths under `path` instead of the document root.
    pub fn with_root_path(mut self, path: impl Into<String>) -> Self {
        self.args.path = path.into();
        self
    }

    /// Enable or disable ratcheting for [`validate_update`](Self::validate_update).
    pub fn with_ratcheting(mut self, enabled: bool) -> Self {
        self.ratcheting = enabled;
        self
    }

    /// Validate a newly created value. No ratcheting applies.
    pub fn validate(&self, new: &Value) -> ValidationResult {
        SchemaValidator::new(self.args.clone()).validate(new)
    }

    /// Validate an update from `old` to `new`.
    ///
    /// With ratcheting disabled this is the same as [`validate`](Self::validate).
    pub fn validate_update(&self, new: &Value, old: &Value) -> ValidationResult {
        if !self.ratcheting {
            return self.validate(new);
        }
        let mut correlation = CorrelatedObject::new(new, old, Some(self.args.schema));
        self.validate_correlated(&mut correlation)
    }

    /// Validate an update whose correlation tree the caller keeps.
    ///
    /// The tree must be freshly created for this call; after it returns the
    /// tree holds a node for every correlated position the engine visited.
    pub fn validate_correlated(&self, correlation: &mut CorrelatedObject<'_>) -> ValidationResult {
        let value = correlation.value;
        RatchetingValueValidator::new(correlation, self.args.clone()).validate(value)
    }
}

/// Validator bound to one correlation node for the duration of one call.
struct RatchetingValueValidator<'n, 'a> {
    args: SchemaArgs<'n>,
    correlation: &'n mut CorrelatedObject<'a>,
}

impl<'n, 'a> RatchetingValueValidator<'n, 'a> {
    fn new(correlation: &'n mut CorrelatedObject<'a>, args: SchemaArgs<'n>) -> Self {
        Self { args, correlation }
    }
}

impl ValueValidator for RatchetingValueValidator<'_, '_> {
    fn set_path(&mut self, _path: &str) {}

    fn applies(&self, _value: &Value) -> bool {
        true
    }

    /// Validates the correlated new value; the argument is the same value as
    /// seen by the engine and is not consulted.
    fn validate(&mut self, _value: &Value) -> ValidationResult {
        let args = self.args.clone();
        let value = self.correlation.value;
        let result = SchemaValidator::with_factory(args, self).validate(value);

        if result.is_valid() {
            return result;
        }

        if self.correlation.cached_deep_equal() {
            tracing::debug!(
                path = %self.args.path,
                errors = result.errors.len(),
                "unchanged value, demoting errors to warnings"
            );
            let mut ratcheted = ValidationResult::default();
            ratcheted.merge_as_warnings(result);
            return ratcheted;
        }

        result
    }
}

impl SubValidatorFactory for RatchetingValueValidator<'_, '_> {
    fn sub_property_validator<'f>(
        &'f mut self,
        field: &str,
        args: SchemaArgs<'f>,
    ) -> Box<dyn ValueValidator + 'f> {
        match self.correlation.key(field) {
            Some(child) => Box::new(RatchetingValueValidator::new(child, args)),
            None => {
                tracing::trace!(path = %args.path, "no old value correlates with field");
                Box::new(SchemaValidator::new(args))
            }
        }
    }

    fn sub_index_validator<'f>(
        &'f mut self,
        index: usize,
        args: SchemaArgs<'f>,
    ) -> Box<dyn ValueValidator + 'f> {
        match self.correlation.index(index) {
            Some(child) => Box::new(RatchetingValueValidator::new(child, args)),
            None => {
                tracing::trace!(path = %args.path, "no old value correlates with element");
                Box::new(SchemaValidator::new(args))
            }
        }
    }
}
