use serde::Deserialize;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;

/// Key prefix used when no namespace is configured.
pub const DEFAULT_NAMESPACE: &str = "feature";

/// Top-level configuration of a rollout host.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RolloutConfigInner {
    /// Prefix of every store key written by the engine (`"{namespace}:{feature}"`).
    pub namespace: String,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct RolloutConfig {
    #[serde(flatten, default)]
    inner: Arc<RolloutConfigInner>,
}

impl Deref for RolloutConfig {
    type Target = RolloutConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for RolloutConfig {
    fn deref_mut(&mut self) -> &mut RolloutConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Which key-value backend holds the feature records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local map; contents are lost on restart.
    #[default]
    Memory,
    /// One file per key below [`StoreConfig::root`].
    File,
}

/// Optional block compression of persisted values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionKind {
    #[default]
    None,
    Lz4,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Root directory of the `file` backend. Ignored by `memory`.
    pub root: PathBuf,
    pub compression: CompressionKind,
    /// Create `root` when missing.
    pub create: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Minutely,
    Hourly,
    #[default]
    Daily,
    Never,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Logger name, also the prefix of rolling log files.
    pub name: String,
    /// Default level directive (`error`, `warn`, `info`, `debug`, `trace`, `off`).
    pub level: String,
    pub console: bool,
    /// Directory for rolling log files; no file output when unset.
    pub path: Option<PathBuf>,
    pub json: bool,
    pub rotation: LogRotation,
    pub max_files: usize,
    pub env_filter: Option<String>,
}

// --- Default ---

impl Default for RolloutConfigInner {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_owned(),
            store: StoreConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            root: PathBuf::from("data/rollout"),
            compression: CompressionKind::None,
            create: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            name: "rollout".to_owned(),
            level: "info".to_owned(),
            console: true,
            path: None,
            json: false,
            rotation: LogRotation::Daily,
            max_files: 10,
            env_filter: None,
        }
    }
}
