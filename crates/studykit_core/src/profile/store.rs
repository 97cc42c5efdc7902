//! External profile item store contract.

use crate::profile::manager::{ProfileItemDescriptor, ProfileManager};
use log::debug;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ItemStoreError {
    #[error("profile item is read-only: {0}")]
    ReadOnly(String),
}

/// Narrow get/set-by-key access to externally owned profile values.
pub trait ItemStore {
    fn get_value(&self, key: &str) -> Option<Value>;
    fn set_value(&mut self, key: &str, value: Value) -> Result<(), ItemStoreError>;
    fn is_readonly(&self, key: &str) -> bool;
}

/// Map-backed store, typically seeded from a decoded profile manager.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryItemStore {
    values: BTreeMap<String, Value>,
    readonly: BTreeSet<String>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds default values and read-only flags from `manager`.
    pub fn from_manager(manager: &ProfileManager) -> Self {
        let mut store = Self::new();
        for item in manager.items() {
            store.seed(item);
        }
        store
    }

    fn seed(&mut self, item: &ProfileItemDescriptor) {
        if let Some(value) = &item.default_value {
            self.values.insert(item.profile_key.clone(), value.clone());
        }
        if item.readonly {
            self.readonly.insert(item.profile_key.clone());
        }
    }

    /// Marks `key` read-only (or writable again).
    pub fn set_readonly(&mut self, key: impl Into<String>, readonly: bool) {
        let key = key.into();
        if readonly {
            self.readonly.insert(key);
        } else {
            self.readonly.remove(&key);
        }
    }

    /// Writes a value regardless of the read-only flag.
    ///
    /// Used by the owner of the data (e.g. a sync job), never by edit flows.
    pub fn force_value(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ItemStore for InMemoryItemStore {
    fn get_value(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set_value(&mut self, key: &str, value: Value) -> Result<(), ItemStoreError> {
        if self.readonly.contains(key) {
            return Err(ItemStoreError::ReadOnly(key.to_string()));
        }
        debug!("event=store_set module=profile status=ok key={key}");
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn is_readonly(&self, key: &str) -> bool {
        self.readonly.contains(key)
    }
}

#[cfg(test)]
mod tests {
    use super::{InMemoryItemStore, ItemStore, ItemStoreError};
    use serde_json::json;

    #[test]
    fn set_value_rejects_readonly_keys_without_mutation() {
        let mut store = InMemoryItemStore::new();
        store.force_value("birthdate", json!("1970-01-01"));
        store.set_readonly("birthdate", true);

        let err = store
            .set_value("birthdate", json!("2000-01-01"))
            .expect_err("read-only write must fail");
        assert_eq!(err, ItemStoreError::ReadOnly("birthdate".to_string()));
        assert_eq!(store.get_value("birthdate"), Some(json!("1970-01-01")));
    }

    #[test]
    fn unknown_keys_are_writable_and_empty() {
        let mut store = InMemoryItemStore::new();
        assert_eq!(store.get_value("nickname"), None);
        assert!(!store.is_readonly("nickname"));
        store
            .set_value("nickname", json!("Sam"))
            .expect("writable key");
        assert_eq!(store.get_value("nickname"), Some(json!("Sam")));
    }
}
