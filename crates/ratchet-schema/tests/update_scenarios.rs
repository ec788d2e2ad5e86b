//! Integration test: update validation against schemas tightened after the
//! stored documents were accepted.

use serde_json::{json, Value};

use ratchet_schema::{
    CompileOptions, EngineOptions, RatchetingSchemaValidator, Schema, ValidationResult,
};

fn compile(doc: Value) -> Schema {
    Schema::compile(&doc, &CompileOptions::default()).unwrap()
}

fn paths(result: &ValidationResult) -> (Vec<&str>, Vec<&str>) {
    (
        result.errors.iter().map(|v| v.instance_path.as_str()).collect(),
        result.warnings.iter().map(|v| v.instance_path.as_str()).collect(),
    )
}

/// A deployment-like document whose containers are a merge-keyed list,
/// with ports capped below values that were once accepted.
fn workload_schema() -> Schema {
    compile(json!({
        "type": "object",
        "properties": {
            "replicas": {"type": "integer", "maximum": 10},
            "containers": {
                "type": "array",
                "x-kubernetes-list-type": "map",
                "x-kubernetes-list-map-keys": ["name"],
                "items": {
                    "type": "object",
                    "required": ["name"],
                    "properties": {
                        "name": {"type": "string"},
                        "image": {"type": "string", "pattern": "^registry\\.local/"},
                        "port": {"type": "integer", "maximum": 9000}
                    }
                }
            },
            "tags": {
                "type": "array",
                "x-kubernetes-list-type": "set",
                "maxItems": 2,
                "items": {"type": "string", "maxLength": 4}
            },
            "command": {
                "type": "array",
                "x-kubernetes-list-type": "atomic",
                "items": {"type": "string", "minLength": 2}
            }
        }
    }))
}

fn stored() -> Value {
    json!({
        "replicas": 3,
        "containers": [
            {"name": "app", "image": "docker.io/app", "port": 8080},
            {"name": "sidecar", "image": "registry.local/proxy", "port": 15001}
        ],
        "tags": ["alpha", "beta", "gamma"],
        "command": ["x", "run"]
    })
}

fn validator(schema: &Schema) -> RatchetingSchemaValidator<'_> {
    RatchetingSchemaValidator::new(schema, EngineOptions::default())
}

#[test]
fn stored_document_fails_as_create() {
    let schema = workload_schema();
    let result = validator(&schema).validate(&stored());
    let (mut errors, warnings) = paths(&result);
    errors.sort_unstable();
    assert_eq!(
        errors,
        [
            "/command/0",
            "/containers/0/image",
            "/containers/1/port",
            "/tags",
            "/tags/0",
            "/tags/2",
        ]
    );
    assert!(warnings.is_empty());
}

#[test]
fn unchanged_document_passes_with_warnings() {
    let schema = workload_schema();
    let doc = stored();
    let result = validator(&schema).validate_update(&doc, &stored());
    assert!(result.is_valid(), "{result}");
    assert_eq!(result.warnings.len(), 6);
}

#[test]
fn reordered_map_list_is_still_forgiven() {
    let schema = workload_schema();
    let mut doc = stored();
    doc["containers"] = json!([
        {"name": "sidecar", "image": "registry.local/proxy", "port": 15001},
        {"name": "app", "image": "docker.io/app", "port": 8080}
    ]);
    let result = validator(&schema).validate_update(&doc, &stored());
    assert!(result.is_valid(), "{result}");
    let (_, warnings) = paths(&result);
    assert!(warnings.contains(&"/containers/0/port"));
    assert!(warnings.contains(&"/containers/1/image"));
}

#[test]
fn edited_element_keeps_unchanged_siblings_forgiven() {
    let schema = workload_schema();
    let mut doc = stored();
    doc["containers"][0]["port"] = json!(8081);
    doc["containers"][1]["port"] = json!(15002);
    let result = validator(&schema).validate_update(&doc, &stored());
    let (errors, warnings) = paths(&result);
    // The untouched image of "app" stays forgiven; the edited port of
    // "sidecar" is judged on its own.
    assert_eq!(errors, ["/containers/1/port"]);
    assert!(warnings.contains(&"/containers/0/image"));
}

#[test]
fn set_list_is_forgiven_only_as_a_whole() {
    let schema = workload_schema();
    let mut doc = stored();
    doc["tags"] = json!(["alpha", "beta", "delta"]);
    let result = validator(&schema).validate_update(&doc, &stored());
    let (errors, _) = paths(&result);
    assert_eq!(errors, ["/tags", "/tags/0", "/tags/2"]);
}

#[test]
fn atomic_list_edit_loses_forgiveness_for_every_element() {
    let schema = workload_schema();
    let mut doc = stored();
    doc["command"] = json!(["x", "start"]);
    let result = validator(&schema).validate_update(&doc, &stored());
    let (errors, _) = paths(&result);
    assert_eq!(errors, ["/command/0"]);
}

#[test]
fn new_container_gets_no_forgiveness() {
    let schema = workload_schema();
    let mut doc = stored();
    doc["containers"] = json!([
        {"name": "app", "image": "docker.io/app", "port": 8080},
        {"name": "sidecar", "image": "registry.local/proxy", "port": 15001},
        {"name": "debug", "image": "docker.io/busybox"}
    ]);
    let result = validator(&schema).validate_update(&doc, &stored());
    let (errors, _) = paths(&result);
    assert_eq!(errors, ["/containers/2/image"]);
}

#[test]
fn newly_invalid_scalar_is_rejected() {
    let schema = workload_schema();
    let mut doc = stored();
    doc["replicas"] = json!(12);
    let result = validator(&schema).validate_update(&doc, &stored());
    let (errors, _) = paths(&result);
    assert_eq!(errors, ["/replicas"]);
}

#[test]
fn short_circuited_root_keeps_its_error() {
    let schema = compile(json!({
        "type": "object",
        "required": ["name"],
        "properties": {"foo": {"enum": ["A", "B"]}}
    }));
    let options = EngineOptions {
        short_circuit: true,
        ..EngineOptions::default()
    };
    let doc = json!({"foo": "legacy"});
    let result = RatchetingSchemaValidator::new(&schema, options).validate_update(&doc, &doc.clone());
    // Children were never visited, so the root cannot be shown unchanged.
    let (errors, warnings) = paths(&result);
    assert_eq!(errors, [""]);
    assert!(warnings.is_empty());
}

#[test]
fn depth_limit_error_is_forgiven_when_unchanged() {
    let schema = compile(json!({
        "properties": {"a": {"properties": {"b": {"properties": {"c": {"type": "string"}}}}}}
    }));
    let options = EngineOptions {
        max_depth: 2,
        ..EngineOptions::default()
    };
    let validator = RatchetingSchemaValidator::new(&schema, options);
    let old = json!({"a": {"b": {"c": 1}}});

    let result = validator.validate_update(&old.clone(), &old);
    assert!(result.is_valid(), "{result}");
    let (_, warnings) = paths(&result);
    assert_eq!(warnings, ["/a/b/c"]);
    assert!(result.warnings[0].message.contains("maximum depth"));

    let changed = json!({"a": {"b": {"c": 2}}});
    let result = validator.validate_update(&changed, &old);
    let (errors, _) = paths(&result);
    assert_eq!(errors, ["/a/b/c"]);
}
