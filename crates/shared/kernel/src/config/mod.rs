use config::{Config, Environment, File};
use rollout_domain::config::RolloutConfig;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Prefix of environment overrides, e.g. `ROLLOUT__STORE__BACKEND=file`.
pub const ENV_PREFIX: &str = "ROLLOUT";
const ENV_SEPARATOR: &str = "__";
const DEFAULT_PATH: &str = "rollout";

/// Custom error type for config loading.
#[rollout_derive::rollout_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads a configuration file and overlays `ROLLOUT__`-prefixed environment variables.
///
/// 1. **Base file**: `path`, or `rollout` in the working directory when `None`. The format
///    follows the extension (`.toml`, `.json`, `.yaml`, ...); an extension-less path is
///    probed for every supported format. The file is required.
/// 2. **Environment**: `ROLLOUT__SECTION__KEY` maps to `section.key`
///    (`ROLLOUT__STORE__ROOT` overrides `store.root`).
///
/// # Errors
/// Returns [`ConfigError::Config`] when the file is missing or unreadable, or when the
/// merged document does not deserialize into `T`.
///
/// # Example
/// ```rust,no_run
/// use rollout_kernel::config::load_config;
/// use rollout_kernel::domain::config::RolloutConfig;
///
/// let cfg: RolloutConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    load(path, environment())
}

/// Same as [`load_config`], but the overrides come from `vars` instead of the process
/// environment. Keys use the same `ROLLOUT__SECTION__KEY` spelling.
///
/// # Errors
/// Same as [`load_config`].
pub fn load_config_with_env<T, I>(path: Option<impl AsRef<Path>>, vars: I) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
    I: IntoIterator<Item = (String, String)>,
{
    load(path, environment().source(Some(vars.into_iter().collect())))
}

/// Loads the engine configuration ([`RolloutConfig`]).
///
/// # Errors
/// Same as [`load_config`].
pub fn load_rollout_config(path: Option<impl AsRef<Path>>) -> Result<RolloutConfig, ConfigError> {
    load_config(path)
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX).separator(ENV_SEPARATOR)
}

fn load<T>(path: Option<impl AsRef<Path>>, env: Environment) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective = path.map_or_else(|| PathBuf::from(DEFAULT_PATH), |p| p.as_ref().to_path_buf());
    info!(path = %effective.display(), "Loading config");

    Config::builder()
        .add_source(File::from(effective.as_path()).required(true))
        .add_source(env)
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")
}
