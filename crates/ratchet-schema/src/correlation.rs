//! # Correlated Old/New Value Tree
//!
//! A [`CorrelatedObject`] pairs the old and new value found at one schema
//! position. Children are created on demand, only for positions the
//! validation engine actually visits, so the tree mirrors the traversal
//! rather than the documents.
//!
//! ## Correlation
//!
//! - Object properties correlate by name. A property present in only one of
//!   the two maps has no counterpart.
//! - List elements correlate according to the list schema's
//!   `x-kubernetes-list-type`: by position when absent, by merge keys for
//!   `map`, and never for `set` or `atomic`.
//!
//! ## Cached equality
//!
//! [`CorrelatedObject::cached_deep_equal`] decides whether the old and new
//! values are structurally identical, computing the answer at most once per
//! node. Containers reuse the answers already cached in their children, so
//! a subtree compared while validating a leaf is never compared again for
//! its ancestors. A container whose children were not all visited is
//! considered changed.
//!
//! A tree lives for one validation call and is not shared between threads.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use ratchet_core::deep_equal;

use crate::listmap::MapList;
use crate::schema::{ListType, Schema};

/// One schema position with its old and new value.
#[derive(Debug)]
pub struct CorrelatedObject<'a> {
    /// Value at this position in the stored document.
    pub old_value: &'a Value,
    /// Value at this position in the submitted document.
    pub value: &'a Value,
    /// Schema governing this position.
    pub schema: Option<&'a Schema>,

    comparison: Option<bool>,
    comparisons: usize,
    map_list: Option<MapList<'a>>,
    fields: HashMap<String, CorrelatedObject<'a>>,
    indices: HashMap<usize, CorrelatedObject<'a>>,
}

impl<'a> CorrelatedObject<'a> {
    /// A root node for `new` and `old` under `schema`.
    pub fn new(new: &'a Value, old: &'a Value, schema: Option<&'a Schema>) -> Self {
        Self {
            old_value: old,
            value: new,
            schema,
            comparison: None,
            comparisons: 0,
            map_list: None,
            fields: HashMap::new(),
            indices: HashMap::new(),
        }
    }

    /// Child for property `field`; see [`key`].
    pub fn key(&mut self, field: &str) -> Option<&mut CorrelatedObject<'a>> {
        let schema = self.schema?;
        if self.fields.contains_key(field) {
            return self.fields.get_mut(field);
        }

        let (Value::Object(old_map), Value::Object(new_map)) = (self.old_value, self.value) else {
            return None;
        };
        let old = old_map.get(field)?;
        let new = new_map.get(field)?;
        let child_schema = schema
            .property(field)
            .or_else(|| schema.additional_properties())?;

        Some(
            self.fields
                .entry(field.to_string())
                .or_insert_with(|| CorrelatedObject::new(new, old, Some(child_schema))),
        )
    }

    /// Child for list element `index`; see [`index`].
    pub fn index(&mut self, index: usize) -> Option<&mut CorrelatedObject<'a>> {
        let schema = self.schema?;
        if self.indices.contains_key(&index) {
            return self.indices.get_mut(&index);
        }

        let Value::Array(new_list) = self.value else {
            return None;
        };
        let new = new_list.get(index)?;
        let old = self.correlate_old_value_for_child_at_new_index(index)?;
        let item_schema = schema.items()?;

        Some(
            self.indices
                .entry(index)
                .or_insert_with(|| CorrelatedObject::new(new, old, Some(item_schema))),
        )
    }

    /// The old list element that corresponds to new element `index`.
    ///
    /// Both values must be lists and `index` in bounds of the new one. An old
    /// element that is `null` is treated as no counterpart.
    fn correlate_old_value_for_child_at_new_index(&mut self, index: usize) -> Option<&'a Value> {
        let schema = self.schema?;
        let (Value::Array(old_list), Value::Array(new_list)) = (self.old_value, self.value) else {
            return None;
        };
        let current = new_list.get(index)?;

        let found = match schema.list_type() {
            Some(ListType::Map) => self
                .map_list
                .get_or_insert_with(|| MapList::new(schema, old_list))
                .get(current),
            // Set elements have no stable identity, and atomic lists are
            // only ever compared whole.
            Some(ListType::Set) | Some(ListType::Atomic) => None,
            None => old_list.get(index),
        };
        found.filter(|v| !v.is_null())
    }

    /// Whether the old and new values at this position are structurally
    /// identical, computed at most once.
    pub fn cached_deep_equal(&mut self) -> bool {
        if let Some(cached) = self.comparison {
            return cached;
        }
        let result = self.compute_deep_equal();
        self.comparisons += 1;
        self.comparison = Some(result);
        result
    }

    fn compute_deep_equal(&mut self) -> bool {
        match (self.old_value, self.value) {
            (Value::Null, Value::Null) => true,
            (Value::Null, _) | (_, Value::Null) => false,
            (Value::Array(old), Value::Array(new)) => {
                if old.len() != new.len() {
                    return false;
                }
                // No element of a set or atomic list is ever correlated, so
                // the whole list is the unit of comparison.
                if matches!(
                    self.schema.and_then(Schema::list_type),
                    Some(ListType::Set) | Some(ListType::Atomic)
                ) {
                    return deep_equal(self.old_value, self.value);
                }
                // Every element is visited during traversal; a missing child
                // means an element could not be correlated.
                if self.indices.len() != old.len() {
                    return false;
                }
                // Duplicate merge keys can pair two new elements with the
                // same old one, leaving another old element unmatched.
                if self.schema.and_then(Schema::list_type) == Some(ListType::Map) {
                    let matched: HashSet<*const Value> =
                        self.indices.values().map(|c| c.old_value as *const Value).collect();
                    if matched.len() != old.len() {
                        return false;
                    }
                }
                let indices = &mut self.indices;
                (0..new.len()).all(|i| indices.get_mut(&i).is_some_and(|c| c.cached_deep_equal()))
            }
            (Value::Object(old), Value::Object(new)) => {
                if old.len() != new.len() {
                    return false;
                }
                if old.is_empty() {
                    return true;
                }
                // A missing child means a key was added, removed, or renamed.
                if self.fields.len() != old.len() {
                    return false;
                }
                let fields = &mut self.fields;
                old.keys()
                    .all(|k| fields.get_mut(k).is_some_and(|c| c.cached_deep_equal()))
            }
            (Value::Array(_) | Value::Object(_), _) | (_, Value::Array(_) | Value::Object(_)) => {
                false
            }
            (old, new) => deep_equal(old, new),
        }
    }

    /// Memoized equality result, if it has been computed.
    pub fn cached_comparison(&self) -> Option<bool> {
        self.comparison
    }

    /// How many times equality was actually computed for this node.
    pub fn comparison_count(&self) -> usize {
        self.comparisons
    }

    /// Number of children created so far.
    pub fn child_count(&self) -> usize {
        self.fields.len() + self.indices.len()
    }

    /// Previously created child for property `field`, without creating one.
    pub fn field_child(&self, field: &str) -> Option<&CorrelatedObject<'a>> {
        self.fields.get(field)
    }

    /// Previously created child for element `index`, without creating one.
    pub fn index_child(&self, index: usize) -> Option<&CorrelatedObject<'a>> {
        self.indices.get(&index)
    }
}

/// Child of `node` for property `field`.
///
/// `None` when the node is absent or has no schema, when either value is not
/// a map, when `field` is missing from either map, or when the schema has
/// neither a declared property nor an `additionalProperties` schema for it.
pub fn key<'n, 'a>(
    node: Option<&'n mut CorrelatedObject<'a>>,
    field: &str,
) -> Option<&'n mut CorrelatedObject<'a>> {
    node?.key(field)
}

/// Child of `node` for list element `index`.
///
/// `None` when the node is absent or has no schema, when the new value is
/// not a list or `index` is out of bounds, when the schema has no `items`,
/// or when no old element correlates.
pub fn index<'n, 'a>(
    node: Option<&'n mut CorrelatedObject<'a>>,
    index: usize,
) -> Option<&'n mut CorrelatedObject<'a>> {
    node?.index(index)
}
