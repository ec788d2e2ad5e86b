//! # Document Loading
//!
//! Reads stored and submitted documents from disk into the decoded value
//! algebra. The format is chosen from the file extension: `.yaml` and
//! `.yml` are YAML, everything else is JSON.
//!
//! YAML has a richer type system than JSON (tags, non-string keys,
//! non-finite floats). Documents are expected to use the JSON-compatible
//! subset; tags are dropped, scalar keys are stringified, and anything
//! without a JSON equivalent is rejected.

use std::path::Path;

use serde_json::Value;

use crate::error::DocumentError;

/// Source format of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// JSON text.
    Json,
    /// YAML text (JSON-compatible subset).
    Yaml,
}

impl DocumentFormat {
    /// Pick the format from a path's extension.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::Yaml,
            _ => Self::Json,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        }
    }
}

/// Load a JSON or YAML document from disk.
///
/// # Errors
///
/// Returns [`DocumentError::Read`] if the file cannot be read, and
/// [`DocumentError::Parse`] or [`DocumentError::Conversion`] if its content
/// is not a valid document.
pub fn load_document(path: &Path) -> Result<Value, DocumentError> {
    let content = std::fs::read_to_string(path).map_err(|e| DocumentError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    parse_named(&content, DocumentFormat::from_path(path), &path.display().to_string())
}

/// Parse in-memory document text.
pub fn parse_document(content: &str, format: DocumentFormat) -> Result<Value, DocumentError> {
    parse_named(content, format, "<inline>")
}

fn parse_named(content: &str, format: DocumentFormat, name: &str) -> Result<Value, DocumentError> {
    let parse_err = |reason: String| DocumentError::Parse {
        path: name.to_string(),
        format: format.name(),
        reason,
    };
    match format {
        DocumentFormat::Json => serde_json::from_str(content).map_err(|e| parse_err(e.to_string())),
        DocumentFormat::Yaml => {
            let yaml: serde_yaml::Value =
                serde_yaml::from_str(content).map_err(|e| parse_err(e.to_string()))?;
            yaml_to_json_value(&yaml).map_err(|reason| DocumentError::Conversion {
                path: name.to_string(),
                reason,
            })
        }
    }
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
pub fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Value>, String> = seq.iter().map(yaml_to_json_value).collect();
            Ok(Value::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s.clone(),
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    other => return Err(format!("unsupported YAML map key type: {other:?}")),
                };
                json_map.insert(key, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn yaml_matches_json_equivalent() {
        let yaml = r#"
spec:
  foo: legacy
  replicas: 3
  enabled: true
  ports:
    - name: http
      port: 80
"#;
        let from_yaml = parse_document(yaml, DocumentFormat::Yaml).unwrap();
        let expected = json!({
            "spec": {
                "foo": "legacy",
                "replicas": 3,
                "enabled": true,
                "ports": [{"name": "http", "port": 80}]
            }
        });
        assert_eq!(from_yaml, expected);
    }

    #[test]
    fn yaml_scalar_keys_are_stringified() {
        let value = parse_document("1: one\ntrue: yes\n", DocumentFormat::Yaml).unwrap();
        assert_eq!(value["1"], "one");
        assert!(value.get("true").is_some());
    }

    #[test]
    fn yaml_non_finite_float_rejected() {
        let err = parse_document("x: .nan\n", DocumentFormat::Yaml).unwrap_err();
        assert!(matches!(err, DocumentError::Conversion { .. }), "got {err}");
    }

    #[test]
    fn invalid_json_is_parse_error() {
        let err = parse_document("{\"x\":", DocumentFormat::Json).unwrap_err();
        assert!(matches!(err, DocumentError::Parse { format: "JSON", .. }));
    }

    #[test]
    fn format_from_extension() {
        assert_eq!(DocumentFormat::from_path(Path::new("a.yaml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("a.yml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("a.json")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("noext")), DocumentFormat::Json);
    }

    #[test]
    fn load_missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_document(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, DocumentError::Read { .. }));
    }

    #[test]
    fn load_yaml_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("obj.yml");
        std::fs::write(&path, "foo: legacy\n").unwrap();
        assert_eq!(load_document(&path).unwrap(), json!({"foo": "legacy"}));
    }
}
