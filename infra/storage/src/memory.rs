use crate::KeyValueStore;
use crate::error::StorageError;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

/// A process-local [`KeyValueStore`].
///
/// Values live in an ordered map so prefix scans are a range walk. Clones share the
/// same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<BTreeMap<String, String>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Drops every key.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey {
                message: "EMPTY".into(),
                context: Some("Keys cannot be empty".into()),
            });
        }
        self.entries.write().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.entries.write().remove(key).is_some())
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let entries = self.entries.read();
        Ok(entries
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .map(|(key, _)| key)
            .take_while(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_scan_is_ordered_and_bounded() {
        let store = MemoryStore::new();
        store.set("feature:table", "c").unwrap();
        store.set("feature:chat", "a").unwrap();
        store.set("featured", "x").unwrap();
        store.set("other:chat", "y").unwrap();
        store.set("feature:signup", "b").unwrap();

        assert_eq!(
            store.keys("feature:").unwrap(),
            vec!["feature:chat", "feature:signup", "feature:table"]
        );
        assert_eq!(store.keys("").unwrap().len(), 5);
    }

    #[test]
    fn test_clones_share_entries() {
        let store = MemoryStore::new();
        let view = store.clone();

        store.set("k", "v").unwrap();
        assert_eq!(view.get("k").unwrap().as_deref(), Some("v"));
        assert_eq!(view.len(), 1);

        view.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_delete_reports_presence() {
        let store = MemoryStore::new();
        store.set("k", "v").unwrap();

        assert!(store.delete("k").unwrap());
        assert!(!store.delete("k").unwrap());
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn test_empty_key_rejected() {
        let store = MemoryStore::new();
        assert!(matches!(store.set("", "v"), Err(StorageError::InvalidKey { .. })));
    }
}
