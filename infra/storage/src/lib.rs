//! Key-value collaborators for the rollout engine.
//!
//! The engine only needs an opaque string-blob service: `get`, `set`, `delete` and a
//! prefix scan over keys. This crate defines that contract as [`KeyValueStore`] and ships
//! two adapters:
//!
//! - **[`MemoryStore`]**: a process-local ordered map behind a read/write lock. Cloning
//!   shares the same map, which makes it convenient for tests and single-process hosts.
//! - **[`FileStore`]**: one file per key below a root directory, written with an
//!   "atomic swap" (unique temp file + `fsync` + `rename`) so readers never observe a
//!   torn value. Keys are hex-encoded into file names and sharded into 256 buckets;
//!   values can be transparently LZ4-compressed.
//!
//! Every adapter guarantees atomicity per key and nothing more. There is no
//! compare-and-swap: a read-modify-write cycle driven by a caller can lose updates when
//! two writers race on the same key.
//!
//! # Examples
//!
//! ```rust
//! use rollout_storage::{KeyValueStore, MemoryStore, StorageError};
//!
//! # fn main() -> Result<(), StorageError> {
//! let store = MemoryStore::new();
//! store.set("feature:chat", "{}")?;
//!
//! assert_eq!(store.get("feature:chat")?.as_deref(), Some("{}"));
//! assert_eq!(store.keys("feature:")?, vec!["feature:chat".to_owned()]);
//! # Ok(())
//! # }
//! ```
//!
//! ```rust
//! use rollout_storage::{Compression, FileStore, KeyValueStore, StorageError};
//!
//! # fn main() -> Result<(), StorageError> {
//! # let tmp = tempfile::tempdir().unwrap();
//! let store = FileStore::builder()
//!     .root(tmp.path().join("flags"))
//!     .compression(Compression::Lz4)
//!     .open()?;
//!
//! store.set("feature:signup", r#"{"global":true}"#)?;
//! assert!(store.get("feature:signup")?.is_some());
//! # Ok(())
//! # }
//! ```

mod backend;
mod builder;
mod error;
mod file;
mod maintenance;
mod memory;

pub use backend::{Store, open};
pub use builder::FileStoreBuilder;
pub use error::{StorageError, StorageErrorExt};
pub use file::{Compression, FileStore, MAX_KEY_LEN};
pub use memory::MemoryStore;

use std::fmt::Debug;
use std::sync::Arc;

/// The string-blob service consumed by the activation engine.
///
/// Implementations must be safe to share between threads and must make a single
/// [`set`](KeyValueStore::set) visible atomically: a concurrent [`get`](KeyValueStore::get)
/// returns either the old or the new value, never a mix.
pub trait KeyValueStore: Debug + Send + Sync {
    /// Returns the value stored under `key`, or `None` when the key was never written.
    ///
    /// # Errors
    /// Returns a [`StorageError`] when the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Returns a [`StorageError`] when the backend rejects the key or cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes `key`. Returns whether a value was present.
    ///
    /// # Errors
    /// Returns a [`StorageError`] when the backend cannot be written.
    fn delete(&self, key: &str) -> Result<bool, StorageError>;

    /// Lists every key starting with `prefix`, in ascending order.
    ///
    /// # Errors
    /// Returns a [`StorageError`] when the backend cannot be enumerated.
    fn keys(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<bool, StorageError> {
        (**self).delete(key)
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        (**self).keys(prefix)
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<bool, StorageError> {
        (**self).delete(key)
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        (**self).keys(prefix)
    }
}
