//! File-backed store: one file per key, atomic replace, optional LZ4.
//!
//! Layout on disk: `<root>/<shard>/<hex(key)>.kv`, where `<shard>` is the low byte of the
//! key's `FxHash` in hex. Encoding the key in hex keeps arbitrary key strings safe as file
//! names and makes the key recoverable when the directory is enumerated.

use crate::KeyValueStore;
use crate::builder::FileStoreBuilder;
use crate::error::{StorageError, StorageErrorExt};
use crate::maintenance;
use rollout_domain::config::CompressionKind;
use std::fs;
use std::io::Write;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};
use walkdir::WalkDir;

pub(crate) const VALUE_EXTENSION: &str = "kv";
pub(crate) const TMP_MARKER: &str = ".rollouttmp.";

/// Longest key a [`FileStore`] accepts, in bytes.
///
/// Hex doubles the length; stay well below the usual 255-byte file name limit.
pub const MAX_KEY_LEN: usize = 120;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum Compression {
    #[default]
    None,
    Lz4,
}

impl Compression {
    #[must_use]
    fn compress(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::None => data.to_vec(),
            Self::Lz4 => lz4_flex::compress_prepend_size(data),
        }
    }

    fn decompress(self, data: Vec<u8>) -> Result<Vec<u8>, StorageError> {
        match self {
            Self::None => Ok(data),
            Self::Lz4 => {
                lz4_flex::decompress_size_prepended(&data).context("Lz4 decompression failed")
            },
        }
    }
}

impl From<CompressionKind> for Compression {
    fn from(kind: CompressionKind) -> Self {
        match kind {
            CompressionKind::None => Self::None,
            CompressionKind::Lz4 => Self::Lz4,
        }
    }
}

/// The internal shared state of a [`FileStore`].
#[derive(Debug)]
pub struct FileStoreInner {
    /// The canonicalized directory holding all shards.
    pub(crate) root: PathBuf,
    pub(crate) compression: Compression,
    /// Source of unique temporary file names.
    pub(crate) tmp_counter: AtomicU64,
}

/// A [`KeyValueStore`] persisting each key as a file below a root directory.
///
/// Writes go through a unique temporary file that is synced and then renamed over the
/// target, so a value is either fully old or fully new even across crashes. The handle is
/// reference-counted and cheap to clone.
#[derive(Debug, Clone)]
pub struct FileStore {
    pub(crate) inner: Arc<FileStoreInner>,
}

impl Deref for FileStore {
    type Target = FileStoreInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl FileStore {
    #[must_use = "The store is not opened until you call .open()"]
    pub fn builder() -> FileStoreBuilder {
        FileStoreBuilder::new()
    }

    /// The canonical root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Physical location of the file holding `key`.
    ///
    /// # Errors
    /// Returns [`StorageError::InvalidKey`] for empty or overly long keys.
    pub fn resolve(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        let shard = format!("{:02x}", fxhash::hash32(key) & 0xff);
        let file = format!("{}.{VALUE_EXTENSION}", hex::encode(key.as_bytes()));
        Ok(self.root.join(shard).join(file))
    }

    /// Removes temporary files left behind by interrupted writes.
    pub fn purge_tmp(&self) {
        maintenance::purge_tmp(&self.root);
    }

    fn write_atomic(&self, target: &Path, data: &[u8]) -> Result<(), StorageError> {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .context(format!("Failed to create shard for {}", target.display()))?;
        }

        let temp = unique_tmp_path(target, &self.tmp_counter);

        {
            let mut file = fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&temp)
                .context(format!("Temp creation failed: {}", temp.display()))?;
            file.write_all(data).context("Write failed")?;
            file.sync_all().context("Hardware sync failed")?;
        }

        if let Err(err) = fs::rename(&temp, target) {
            if err.kind() == std::io::ErrorKind::AlreadyExists {
                fs::remove_file(target)
                    .context(format!("Failed to replace existing file: {}", target.display()))?;
                fs::rename(&temp, target).context(format!(
                    "Atomic swap failed: {} -> {}",
                    temp.display(),
                    target.display()
                ))?;
            } else {
                let _ = fs::remove_file(&temp);
                return Err(StorageError::Io {
                    source: err,
                    context: Some(
                        format!("Atomic swap failed: {} -> {}", temp.display(), target.display())
                            .into(),
                    ),
                });
            }
        }

        if let Some(parent) = target.parent() {
            sync_dir(parent);
        }

        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.resolve(key)?;

        let raw = match fs::read(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => {
                return Err(StorageError::Io {
                    source: err,
                    context: Some(format!("Read failed: {}", path.display()).into()),
                });
            },
        };

        let data = self.compression.decompress(raw).context(format!("Key '{key}'"))?;
        String::from_utf8(data).context(format!("Key '{key}'")).map(Some)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.resolve(key)?;
        let data = self.compression.compress(value.as_bytes());
        self.write_atomic(&path, &data)?;

        debug!(key, path = %path.display(), "Value saved atomically");
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, StorageError> {
        let path = self.resolve(key)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(key, path = %path.display(), "Value deleted");
                Ok(true)
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(format!("Failed to delete: {}", path.display()).into()),
            }),
        }
    }

    fn keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();

        for entry in WalkDir::new(&self.root).min_depth(2).max_depth(2) {
            let entry = entry.map_err(|err| {
                let message = err.to_string();
                err.into_io_error().map_or_else(
                    || StorageError::Unavailable {
                        message: message.into(),
                        context: Some("Directory walk failed".into()),
                    },
                    |source| StorageError::Io {
                        source,
                        context: Some("Directory walk failed".into()),
                    },
                )
            })?;

            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(VALUE_EXTENSION) {
                continue;
            }
            let Some(key) = decode_key(path) else {
                warn!(path = %path.display(), "Skipping file with undecodable name");
                continue;
            };
            if key.starts_with(prefix) {
                keys.push(key);
            }
        }

        keys.sort_unstable();
        Ok(keys)
    }
}

fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey {
            message: "EMPTY".into(),
            context: Some("Keys cannot be empty".into()),
        });
    }
    if key.len() > MAX_KEY_LEN {
        return Err(StorageError::InvalidKey {
            message: format!("{} bytes", key.len()).into(),
            context: Some(format!("Keys are limited to {MAX_KEY_LEN} bytes").into()),
        });
    }
    Ok(())
}

fn decode_key(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let bytes = hex::decode(stem).ok()?;
    String::from_utf8(bytes).ok()
}

fn unique_tmp_path(target: &Path, counter: &AtomicU64) -> PathBuf {
    let counter = counter.fetch_add(1, Ordering::Relaxed);
    let file_name = target.file_name().and_then(|s| s.to_str()).unwrap_or("value");
    target.with_file_name(format!("{file_name}{TMP_MARKER}{counter}"))
}

fn sync_dir(path: &Path) {
    match fs::File::open(path) {
        Ok(dir) => {
            if let Err(err) = dir.sync_all() {
                warn!(path = %path.display(), error = %err, "Directory sync failed");
            }
        },
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Directory open failed");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(temp: &TempDir, compression: Compression) -> FileStore {
        FileStore::builder().root(temp.path()).compression(compression).open().unwrap()
    }

    #[test]
    fn test_key_roundtrips_through_file_name() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp, Compression::None);

        let path = store.resolve("feature:chat/../x").unwrap();
        assert!(path.starts_with(store.root()));
        assert_eq!(decode_key(&path).as_deref(), Some("feature:chat/../x"));
    }

    #[test]
    fn test_same_key_same_shard() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp, Compression::None);

        assert_eq!(store.resolve("feature:a").unwrap(), store.resolve("feature:a").unwrap());
        assert_ne!(store.resolve("feature:a").unwrap(), store.resolve("feature:b").unwrap());
    }

    #[test]
    fn test_long_key_rejected() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp, Compression::None);

        let key = "k".repeat(MAX_KEY_LEN + 1);
        assert!(matches!(store.resolve(&key), Err(StorageError::InvalidKey { .. })));
    }

    #[test]
    fn test_compressed_value_is_not_plain_on_disk() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp, Compression::Lz4);

        let value = "x".repeat(512);
        store.set("feature:big", &value).unwrap();

        let raw = fs::read(store.resolve("feature:big").unwrap()).unwrap();
        assert!(raw.len() < value.len());
        assert_eq!(store.get("feature:big").unwrap().as_deref(), Some(value.as_str()));
    }

    #[test]
    fn test_non_utf8_value_is_encoding_error() {
        let temp = TempDir::new().unwrap();
        let plain = store(&temp, Compression::None);
        fs::create_dir_all(plain.resolve("k").unwrap().parent().unwrap()).unwrap();
        fs::write(plain.resolve("k").unwrap(), [0xff, 0xfe]).unwrap();

        assert!(matches!(plain.get("k"), Err(StorageError::Encoding { .. })));
    }
}
