use crate::KeyValueStore;
use crate::error::StorageError;
use crate::file::FileStore;
use crate::memory::MemoryStore;
use rollout_domain::config::{StoreBackend, StoreConfig};
use tracing::info;

/// A configured backend, chosen at runtime from [`StoreConfig`].
#[derive(Debug, Clone)]
pub enum Store {
    Memory(MemoryStore),
    File(FileStore),
}

/// Opens the backend described by `config`.
///
/// # Errors
/// Returns [`StorageError::Io`] when the `file` backend root cannot be prepared.
pub fn open(config: &StoreConfig) -> Result<Store, StorageError> {
    match config.backend {
        StoreBackend::Memory => {
            info!("Using in-memory feature store");
            Ok(Store::Memory(MemoryStore::new()))
        },
        StoreBackend::File => FileStore::builder()
            .root(&config.root)
            .compression(config.compression.into())
            .create(config.create)
            .open()
            .map(Store::File),
    }
}

impl KeyValueStore for Store {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            Self::Memory(s) => s.get(key),
            Self::File(s) => s.get(key),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        match self {
            Self::Memory(s) => s.set(key, value),
            Self::File(s) => s.set(key, value),
        }
    }

    fn delete(&self, key: &str) -> Result<bool, StorageError> {
        match self {
            Self::Memory(s) => s.delete(key),
            Self::File(s) => s.delete(key),
        }
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        match self {
            Self::Memory(s) => s.keys(prefix),
            Self::File(s) => s.keys(prefix),
        }
    }
}
