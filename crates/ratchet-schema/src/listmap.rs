//! # Map-Type List Lookup
//!
//! Finds the old element of a `map`-type list that shares a new element's
//! merge keys.
//!
//! The composite key of an element is the tuple of its merge-key field
//! values, in the order the schema declares them. A missing field falls back
//! to the `default` declared on the item schema's property of the same name.
//! Elements that are not maps, lack a key, or carry a non-scalar key value
//! have no composite key and never match.
//!
//! Old elements are keyed lazily: each lookup consumes unkeyed elements from
//! the front of the list until it finds a match, remembering every key it
//! computes along the way. When two old elements share a key the first one
//! wins.

use std::collections::HashMap;

use serde_json::Value;

use crate::schema::Schema;

/// A merge-key field and its fallback value.
type KeyField<'a> = (&'a str, Option<&'a Value>);

/// Lazily indexed view of an old `map`-type list.
#[derive(Debug)]
pub struct MapList<'a> {
    keys: Vec<KeyField<'a>>,
    keyed: HashMap<Vec<String>, &'a Value>,
    unkeyed: std::slice::Iter<'a, Value>,
}

impl<'a> MapList<'a> {
    /// Index `items` using the merge keys declared on `schema`.
    ///
    /// `schema` is the list schema, not the item schema.
    pub fn new(schema: &'a Schema, items: &'a [Value]) -> Self {
        let item_schema = schema.items();
        let keys = schema
            .list_map_keys()
            .iter()
            .map(|k| {
                let fallback = item_schema
                    .and_then(|s| s.property(k))
                    .and_then(Schema::default_value);
                (k.as_str(), fallback)
            })
            .collect();
        Self {
            keys,
            keyed: HashMap::new(),
            unkeyed: items.iter(),
        }
    }

    /// The old element whose composite key equals that of `element`.
    pub fn get(&mut self, element: &Value) -> Option<&'a Value> {
        let key = composite_key(&self.keys, element)?;
        if let Some(&found) = self.keyed.get(&key) {
            return Some(found);
        }
        for item in self.unkeyed.by_ref() {
            let Some(item_key) = composite_key(&self.keys, item) else {
                continue;
            };
            let matched = item_key == key;
            self.keyed.entry(item_key).or_insert(item);
            if matched {
                return Some(item);
            }
        }
        None
    }
}

fn composite_key(keys: &[KeyField<'_>], element: &Value) -> Option<Vec<String>> {
    let map = element.as_object()?;
    keys.iter()
        .map(|(name, fallback)| {
            let value = map.get(*name).or(*fallback)?;
            match value {
                Value::Bool(_) | Value::Number(_) | Value::String(_) => Some(value.to_string()),
                _ => None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CompileOptions;
    use serde_json::json;

    fn list_schema(keys: Value) -> Schema {
        Schema::compile(
            &json!({
                "type": "array",
                "x-kubernetes-list-type": "map",
                "x-kubernetes-list-map-keys": keys,
                "items": {
                    "type": "object",
                    "properties": {
                        "name": {"type": "string"},
                        "protocol": {"type": "string", "default": "TCP"}
                    }
                }
            }),
            &CompileOptions::default(),
        )
        .unwrap()
    }

    #[test]
    fn matches_by_key_regardless_of_position() {
        let schema = list_schema(json!(["name"]));
        let old = vec![json!({"name": "a", "v": 1}), json!({"name": "b", "v": 2})];
        let mut list = MapList::new(&schema, &old);
        assert_eq!(list.get(&json!({"name": "b", "v": 99})), Some(&old[1]));
        assert_eq!(list.get(&json!({"name": "a"})), Some(&old[0]));
        assert_eq!(list.get(&json!({"name": "c"})), None);
    }

    #[test]
    fn composite_keys_use_defaults() {
        let schema = list_schema(json!(["name", "protocol"]));
        let old = vec![
            json!({"name": "http", "protocol": "UDP"}),
            json!({"name": "http"}),
        ];
        let mut list = MapList::new(&schema, &old);
        assert_eq!(list.get(&json!({"name": "http", "protocol": "TCP"})), Some(&old[1]));
        assert_eq!(list.get(&json!({"name": "http", "protocol": "UDP"})), Some(&old[0]));
    }

    #[test]
    fn first_duplicate_wins() {
        let schema = list_schema(json!(["name"]));
        let old = vec![json!({"name": "a", "v": 1}), json!({"name": "a", "v": 2})];
        let mut list = MapList::new(&schema, &old);
        // Scanning past both duplicates must not let the second replace the first.
        assert_eq!(list.get(&json!({"name": "zzz"})), None);
        assert_eq!(list.get(&json!({"name": "a"})), Some(&old[0]));
    }

    #[test]
    fn unkeyable_elements_never_match() {
        let schema = list_schema(json!(["name"]));
        let old = vec![json!("scalar"), json!({"name": {"nested": true}}), json!({"other": 1})];
        let mut list = MapList::new(&schema, &old);
        assert_eq!(list.get(&json!({"name": {"nested": true}})), None);
        assert_eq!(list.get(&json!({"other": 1})), None);
        assert_eq!(list.get(&json!("scalar")), None);
    }

    #[test]
    fn key_types_are_distinguished() {
        let schema = list_schema(json!(["name"]));
        let old = vec![json!({"name": "1"})];
        let mut list = MapList::new(&schema, &old);
        assert_eq!(list.get(&json!({"name": 1})), None);
        assert_eq!(list.get(&json!({"name": "1"})), Some(&old[0]));
    }
}
