//! # Schema Validation Engine
//!
//! Depth-first validation of a value against a compiled [`Schema`] tree.
//!
//! At every node the engine checks the node's local keywords, then descends
//! into object properties and list elements. For each child it asks a
//! [`SubValidatorFactory`], if one is installed, for the validator to run;
//! otherwise it uses a plain [`SchemaValidator`]. This hook is the only
//! extension point: callers that need to follow the traversal (to keep an
//! old value correlated, for instance) do so by handing out their own
//! validators from the factory.
//!
//! The engine owns path tracking. Instance paths are JSON Pointers rooted at
//! the path given in [`SchemaArgs`].

use serde_json::Value;

use ratchet_core::pointer;

use crate::result::{ValidationResult, Violation};
use crate::schema::Schema;

/// Default nesting limit for [`EngineOptions::max_depth`].
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Caller-supplied engine configuration.
///
/// Factories must pass these through unchanged to every validator they
/// construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Skip a node's children once its own keywords have failed.
    pub short_circuit: bool,
    /// Nodes nested deeper than this are reported and not traversed.
    pub max_depth: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            short_circuit: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Everything needed to construct a validator for one position.
#[derive(Debug, Clone)]
pub struct SchemaArgs<'s> {
    /// Schema governing the position.
    pub schema: &'s Schema,
    /// Instance path of the position.
    pub path: String,
    /// Nesting depth of the position; the root is 0.
    pub depth: usize,
    /// Engine configuration.
    pub options: EngineOptions,
}

impl<'s> SchemaArgs<'s> {
    /// Arguments for the root of a document.
    pub fn root(schema: &'s Schema, options: EngineOptions) -> Self {
        Self {
            schema,
            path: String::new(),
            depth: 0,
            options,
        }
    }

    fn child(&self, schema: &'s Schema, path: String) -> Self {
        Self {
            schema,
            path,
            depth: self.depth + 1,
            options: self.options,
        }
    }
}

/// A validator the engine can run at one position.
pub trait ValueValidator {
    /// Tell the validator its instance path.
    fn set_path(&mut self, path: &str);

    /// Whether this validator wants to see `value` at all.
    fn applies(&self, value: &Value) -> bool;

    /// Validate `value`.
    fn validate(&mut self, value: &Value) -> ValidationResult;
}

/// Hooks the engine calls to obtain validators for child positions.
pub trait SubValidatorFactory {
    /// Validator for object property `field`.
    fn sub_property_validator<'f>(
        &'f mut self,
        field: &str,
        args: SchemaArgs<'f>,
    ) -> Box<dyn ValueValidator + 'f>;

    /// Validator for list element `index`.
    fn sub_index_validator<'f>(
        &'f mut self,
        index: usize,
        args: SchemaArgs<'f>,
    ) -> Box<dyn ValueValidator + 'f>;
}

/// The default validator: local keywords plus structural traversal.
pub struct SchemaValidator<'s, 'f> {
    args: SchemaArgs<'s>,
    factory: Option<&'f mut dyn SubValidatorFactory>,
}

impl<'s, 'f> SchemaValidator<'s, 'f> {
    /// Validator that uses itself for every child.
    pub fn new(args: SchemaArgs<'s>) -> Self {
        Self { args, factory: None }
    }

    /// Validator that asks `factory` for every child's validator.
    pub fn with_factory(args: SchemaArgs<'s>, factory: &'f mut dyn SubValidatorFactory) -> Self {
        Self {
            args,
            factory: Some(factory),
        }
    }

    fn validate_properties(
        &mut self,
        map: &serde_json::Map<String, Value>,
        result: &mut ValidationResult,
    ) {
        let schema = self.args.schema;
        for (field, child) in map {
            let path = pointer::push_field(&self.args.path, field);
            let Some(child_schema) = schema
                .property(field)
                .or_else(|| schema.additional_properties())
            else {
                if !schema.allows_additional_properties() {
                    result.add_error(Violation {
                        instance_path: path,
                        schema_path: pointer::push_field(schema.location(), "additionalProperties"),
                        message: format!("additional property \"{field}\" is not allowed"),
                    });
                }
                continue;
            };

            let args = self.args.child(child_schema, path.clone());
            let mut validator: Box<dyn ValueValidator + '_> = match self.factory.as_deref_mut() {
                Some(factory) => factory.sub_property_validator(field, args),
                None => Box::new(SchemaValidator::new(args)),
            };
            run_child(validator.as_mut(), &path, child, result);
        }
    }

    fn validate_items(&mut self, items: &[Value], result: &mut ValidationResult) {
        let Some(item_schema) = self.args.schema.items() else {
            return;
        };
        for (index, child) in items.iter().enumerate() {
            let path = pointer::push_index(&self.args.path, index);
            let args = self.args.child(item_schema, path.clone());
            let mut validator: Box<dyn ValueValidator + '_> = match self.factory.as_deref_mut() {
                Some(factory) => factory.sub_index_validator(index, args),
                None => Box::new(SchemaValidator::new(args)),
            };
            run_child(validator.as_mut(), &path, child, result);
        }
    }
}

fn run_child(
    validator: &mut (dyn ValueValidator + '_),
    path: &str,
    value: &Value,
    result: &mut ValidationResult,
) {
    validator.set_path(path);
    if validator.applies(value) {
        result.merge(validator.validate(value));
    }
}

impl ValueValidator for SchemaValidator<'_, '_> {
    fn set_path(&mut self, path: &str) {
        self.args.path = path.to_string();
    }

    fn applies(&self, _value: &Value) -> bool {
        true
    }

    fn validate(&mut self, value: &Value) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.args.depth > self.args.options.max_depth {
            result.add_error(Violation {
                instance_path: self.args.path.clone(),
                schema_path: self.args.schema.location().to_string(),
                message: format!(
                    "value nested deeper than the maximum depth of {}",
                    self.args.options.max_depth
                ),
            });
            return result;
        }

        for violation in self.args.schema.check_local(value, &self.args.path) {
            result.add_error(violation);
        }
        if self.args.options.short_circuit && !result.is_valid() {
            return result;
        }

        match value {
            Value::Object(map) => self.validate_properties(map, &mut result),
            Value::Array(items) => self.validate_items(items, &mut result),
            _ => {}
        }
        result
    }
}
