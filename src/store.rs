//! Attribute store abstraction
//!
//! Hierarchical data containers (HDF5 groups, Zarr arrays) keep metadata as
//! key/value attributes on named nodes. [`AttributeStore`] is the seam a
//! container backend implements so records can be written to and read from
//! it with [`MetadataRecord::write_attrs`](crate::MetadataRecord::write_attrs)
//! and [`MetadataRecord::read_attrs`](crate::MetadataRecord::read_attrs).

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{MetadataError, Result};

/// Key/value attributes attached to named nodes
pub trait AttributeStore {
    /// Read one attribute, `None` when it is absent
    fn get_attr(&self, node: &str, key: &str) -> Result<Option<Value>>;

    /// Write one attribute, replacing any previous value
    fn set_attr(&mut self, node: &str, key: &str, value: Value) -> Result<()>;

    /// Attribute keys stored on a node
    fn attr_keys(&self, node: &str) -> Result<Vec<String>>;
}

/// In-memory [`AttributeStore`], ordered by node and key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    nodes: BTreeMap<String, BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty node; writing an attribute creates it too
    pub fn create_node(&mut self, node: &str) {
        self.nodes.entry(node.to_string()).or_default();
    }

    pub fn has_node(&self, node: &str) -> bool {
        self.nodes.contains_key(node)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    fn node(&self, node: &str) -> Result<&BTreeMap<String, Value>> {
        self.nodes
            .get(node)
            .ok_or_else(|| MetadataError::Store(format!("Node not found: {}", node)))
    }
}

impl AttributeStore for MemoryStore {
    fn get_attr(&self, node: &str, key: &str) -> Result<Option<Value>> {
        Ok(self.node(node)?.get(key).cloned())
    }

    fn set_attr(&mut self, node: &str, key: &str, value: Value) -> Result<()> {
        if key.is_empty() {
            return Err(MetadataError::Store(format!(
                "Attribute key cannot be empty on node {}",
                node
            )));
        }
        self.nodes
            .entry(node.to_string())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }

    fn attr_keys(&self, node: &str) -> Result<Vec<String>> {
        Ok(self.node(node)?.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_and_get() {
        let mut store = MemoryStore::new();
        store.set_attr("/station", "id", json!("MT001")).unwrap();
        assert_eq!(store.get_attr("/station", "id").unwrap(), Some(json!("MT001")));
        assert_eq!(store.get_attr("/station", "missing").unwrap(), None);
        assert_eq!(store.attr_keys("/station").unwrap(), vec!["id"]);
    }

    #[test]
    fn test_missing_node_is_an_error() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.attr_keys("/nowhere"),
            Err(MetadataError::Store(_))
        ));
    }

    #[test]
    fn test_empty_node() {
        let mut store = MemoryStore::new();
        store.create_node("/survey");
        assert!(store.has_node("/survey"));
        assert!(store.attr_keys("/survey").unwrap().is_empty());
        assert_eq!(store.nodes().collect::<Vec<_>>(), vec!["/survey"]);
    }
}
