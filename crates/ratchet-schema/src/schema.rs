//! # Structural Schema Tree
//!
//! Compiles a JSON Schema document (Draft 2020-12, structural subset) into a
//! tree of [`Schema`] nodes that the validation engine and the correlation
//! tree can walk in lockstep with a value.
//!
//! ## Local vs. structural keywords
//!
//! Each node splits its keywords in two:
//!
//! - **Structural** keywords (`properties`, `additionalProperties`, `items`)
//!   become child nodes. The engine traverses them itself so that every
//!   child position is handed to a pluggable validator factory.
//! - **Local** keywords (everything else: `type`, `enum`, `pattern`,
//!   `required`, `maxItems`, `allOf`, ...) are compiled once, at load time,
//!   into a `jsonschema` validator for this node only.
//!
//! ## List annotations
//!
//! `x-kubernetes-list-type` selects how list elements correlate across
//! updates (`atomic`, `set`, `map`, or absent for positional).
//! `x-kubernetes-list-map-keys` names the merge-key fields of a `map` list.
//!
//! ## Unsupported constructs
//!
//! `$ref`, `patternProperties`, `prefixItems`, `unevaluatedProperties`,
//! `unevaluatedItems`, and array-form `items` cannot be traversed field by
//! field and are rejected at compile time.

use std::collections::BTreeMap;
use std::fmt;

use jsonschema::{Draft, Validator};
use serde_json::{Map, Value};
use thiserror::Error;

use ratchet_core::pointer;

use crate::result::Violation;

/// Extension key selecting the list merge strategy.
pub const LIST_TYPE_KEY: &str = "x-kubernetes-list-type";
/// Extension key naming the merge-key fields of a `map` list.
pub const LIST_MAP_KEYS_KEY: &str = "x-kubernetes-list-map-keys";

/// Keywords traversed by the engine rather than checked locally.
const STRUCTURAL_KEYWORDS: [&str; 3] = ["properties", "additionalProperties", "items"];

/// Keywords that cannot be expressed as a per-field traversal. The
/// `unevaluated*` keywords depend on sibling `properties` / `items`, which
/// are not part of the local document.
const UNSUPPORTED_KEYWORDS: [&str; 5] = [
    "$ref",
    "patternProperties",
    "prefixItems",
    "unevaluatedProperties",
    "unevaluatedItems",
];

/// Error compiling a schema document.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema node is neither an object nor a boolean.
    #[error("schema at '{location}' must be an object or boolean, found {found}")]
    InvalidNode {
        /// JSON Pointer of the node within the schema document.
        location: String,
        /// Kind of value found instead.
        found: &'static str,
    },

    /// The schema uses a construct the traversal cannot follow.
    #[error("unsupported construct at '{location}': {reason}")]
    Unsupported {
        /// JSON Pointer of the node within the schema document.
        location: String,
        /// What was unsupported.
        reason: String,
    },

    /// `jsonschema` rejected the local keywords of a node.
    #[error("local keywords at '{location}' failed to compile: {reason}")]
    Compile {
        /// JSON Pointer of the node within the schema document.
        location: String,
        /// Compiler message.
        reason: String,
    },
}

/// Options applied while compiling local keyword validators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Treat `format` as an assertion instead of an annotation.
    pub validate_formats: bool,
}

/// How list elements correlate between an old and a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListType {
    /// The list is one indivisible value.
    Atomic,
    /// Unordered elements; no per-element correlation.
    Set,
    /// Elements are identified by their merge-key fields.
    Map,
}

impl ListType {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "atomic" => Some(Self::Atomic),
            "set" => Some(Self::Set),
            "map" => Some(Self::Map),
            _ => None,
        }
    }
}

/// `additionalProperties` of an object schema.
#[derive(Debug)]
enum AdditionalProperties {
    /// Absent or `true`: undeclared properties are accepted unchecked.
    Allowed,
    /// `false`: undeclared properties are errors.
    Forbidden,
    /// A schema governing every undeclared property.
    Schema(Box<Schema>),
}

/// One compiled node of a schema tree.
pub struct Schema {
    location: String,
    properties: BTreeMap<String, Schema>,
    additional_properties: AdditionalProperties,
    items: Option<Box<Schema>>,
    list_type: Option<ListType>,
    list_map_keys: Vec<String>,
    default: Option<Value>,
    local: Option<Validator>,
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("location", &self.location)
            .field("properties", &self.properties)
            .field("additional_properties", &self.additional_properties)
            .field("items", &self.items)
            .field("list_type", &self.list_type)
            .field("list_map_keys", &self.list_map_keys)
            .field("has_local", &self.local.is_some())
            .finish()
    }
}

impl Schema {
    /// Compile a schema document into a tree.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if any node is malformed, uses an unsupported
    /// construct, or has local keywords `jsonschema` cannot compile.
    pub fn compile(document: &Value, options: &CompileOptions) -> Result<Self, SchemaError> {
        Self::compile_at(document, String::new(), options)
    }

    fn compile_at(raw: &Value, location: String, options: &CompileOptions) -> Result<Self, SchemaError> {
        let obj = match raw {
            Value::Object(obj) => obj,
            Value::Bool(_) => {
                let local = compile_local(raw, &location, options)?;
                return Ok(Self::leaf(location, local));
            }
            other => {
                return Err(SchemaError::InvalidNode {
                    location,
                    found: ratchet_core::kind_name(other),
                })
            }
        };

        for keyword in UNSUPPORTED_KEYWORDS {
            if obj.contains_key(keyword) {
                return Err(SchemaError::Unsupported {
                    location,
                    reason: format!("`{keyword}` is not supported"),
                });
            }
        }

        let mut properties = BTreeMap::new();
        if let Some(props) = obj.get("properties") {
            let props = props.as_object().ok_or_else(|| SchemaError::InvalidNode {
                location: pointer::push_field(&location, "properties"),
                found: ratchet_core::kind_name(props),
            })?;
            let base = pointer::push_field(&location, "properties");
            for (name, sub) in props {
                let child = Self::compile_at(sub, pointer::push_field(&base, name), options)?;
                properties.insert(name.clone(), child);
            }
        }

        let additional_properties = match obj.get("additionalProperties") {
            None | Some(Value::Bool(true)) => AdditionalProperties::Allowed,
            Some(Value::Bool(false)) => AdditionalProperties::Forbidden,
            Some(sub) => AdditionalProperties::Schema(Box::new(Self::compile_at(
                sub,
                pointer::push_field(&location, "additionalProperties"),
                options,
            )?)),
        };

        let items = match obj.get("items") {
            None => None,
            Some(Value::Array(_)) => {
                return Err(SchemaError::Unsupported {
                    location,
                    reason: "array-form `items` is not supported".to_string(),
                })
            }
            Some(sub) => Some(Box::new(Self::compile_at(
                sub,
                pointer::push_field(&location, "items"),
                options,
            )?)),
        };

        let list_type = match obj.get(LIST_TYPE_KEY) {
            None => None,
            Some(Value::String(s)) => Some(ListType::parse(s).ok_or_else(|| {
                SchemaError::Unsupported {
                    location: location.clone(),
                    reason: format!("unknown {LIST_TYPE_KEY} '{s}'"),
                }
            })?),
            Some(other) => {
                return Err(SchemaError::Unsupported {
                    location,
                    reason: format!(
                        "{LIST_TYPE_KEY} must be a string, found {}",
                        ratchet_core::kind_name(other)
                    ),
                })
            }
        };

        let list_map_keys = parse_map_keys(obj, &location)?;
        if list_type == Some(ListType::Map) && list_map_keys.is_empty() {
            return Err(SchemaError::Unsupported {
                location,
                reason: format!("{LIST_TYPE_KEY} 'map' requires non-empty {LIST_MAP_KEYS_KEY}"),
            });
        }

        let local_doc = local_keywords(obj);
        let local = compile_local(&local_doc, &location, options)?;

        Ok(Self {
            location,
            properties,
            additional_properties,
            items,
            list_type,
            list_map_keys,
            default: obj.get("default").cloned(),
            local,
        })
    }

    fn leaf(location: String, local: Option<Validator>) -> Self {
        Self {
            location,
            properties: BTreeMap::new(),
            additional_properties: AdditionalProperties::Allowed,
            items: None,
            list_type: None,
            list_map_keys: Vec::new(),
            default: None,
            local,
        }
    }

    /// JSON Pointer of this node within its schema document.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Schema of a declared property.
    pub fn property(&self, name: &str) -> Option<&Schema> {
        self.properties.get(name)
    }

    /// Schema governing undeclared properties, if one is given.
    pub fn additional_properties(&self) -> Option<&Schema> {
        match &self.additional_properties {
            AdditionalProperties::Schema(s) => Some(&**s),
            _ => None,
        }
    }

    /// False only for `additionalProperties: false`.
    pub fn allows_additional_properties(&self) -> bool {
        !matches!(self.additional_properties, AdditionalProperties::Forbidden)
    }

    /// Schema governing list elements.
    pub fn items(&self) -> Option<&Schema> {
        self.items.as_deref()
    }

    /// Declared list merge strategy.
    pub fn list_type(&self) -> Option<ListType> {
        self.list_type
    }

    /// Merge-key field names of a `map` list.
    pub fn list_map_keys(&self) -> &[String] {
        &self.list_map_keys
    }

    /// Declared `default` value.
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Check this node's local keywords against `value`.
    ///
    /// Instance paths are prefixed with `instance_path`; schema paths with
    /// this node's location.
    pub fn check_local(&self, value: &Value, instance_path: &str) -> Vec<Violation> {
        let Some(local) = &self.local else {
            return Vec::new();
        };
        local
            .iter_errors(value)
            .map(|e| Violation {
                instance_path: pointer::join(instance_path, &e.instance_path.to_string()),
                schema_path: pointer::join(&self.location, &e.schema_path.to_string()),
                message: e.to_string(),
            })
            .collect()
    }
}

fn parse_map_keys(obj: &Map<String, Value>, location: &str) -> Result<Vec<String>, SchemaError> {
    let Some(raw) = obj.get(LIST_MAP_KEYS_KEY) else {
        return Ok(Vec::new());
    };
    let invalid = || SchemaError::Unsupported {
        location: location.to_string(),
        reason: format!("{LIST_MAP_KEYS_KEY} must be an array of strings"),
    };
    raw.as_array()
        .ok_or_else(invalid)?
        .iter()
        .map(|k| k.as_str().map(str::to_string).ok_or_else(invalid))
        .collect()
}

/// Copy of a schema object without its structural keywords.
fn local_keywords(obj: &Map<String, Value>) -> Value {
    let local: Map<String, Value> = obj
        .iter()
        .filter(|(k, _)| !STRUCTURAL_KEYWORDS.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    Value::Object(local)
}

fn compile_local(
    doc: &Value,
    location: &str,
    options: &CompileOptions,
) -> Result<Option<Validator>, SchemaError> {
    if doc.as_object().is_some_and(|o| o.is_empty()) || doc == &Value::Bool(true) {
        return Ok(None);
    }
    jsonschema::options()
        .with_draft(Draft::Draft202012)
        .should_validate_formats(options.validate_formats)
        .build(doc)
        .map(Some)
        .map_err(|e| SchemaError::Compile {
            location: location.to_string(),
            reason: e.to_string(),
        })
}
