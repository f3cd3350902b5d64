//! Facade crate for the rollout engine and its collaborators.
//! Re-exports the engine, storage adapters, configuration and logging crates and wires them
//! together for hosts. Keep this crate thin: it composes other crates, it does not decide
//! activation.
//!
//! ## Usage
//! - Depend on `rollout` only; reach the parts through [`legacy`], [`storage`], [`kernel`],
//!   [`logger`] and [`domain`], or pull the common names from [`prelude`].
//! - Call [`bootstrap`] once at startup to load configuration, install logging and open the
//!   configured store.

use rollout_domain::config::RolloutConfig;
use rollout_kernel::config::{ConfigError, load_rollout_config};
use rollout_legacy::{GroupRegistry, Rollout, RolloutError, UserId};
use rollout_logger::{Logger, LoggerError};
use rollout_storage::Store;
use std::borrow::Cow;
use std::fmt;
use std::path::Path;
use tracing::info;

pub use rollout_domain as domain;
pub use rollout_kernel as kernel;
pub use rollout_legacy as legacy;
pub use rollout_logger as logger;
pub use rollout_storage as storage;

/// Names most hosts need.
pub mod prelude {
    pub use rollout_domain::config::RolloutConfig;
    pub use rollout_legacy::{
        Activation, FeatureInfo, FeatureState, GlobalInfo, GroupRegistry, Identify, Percentage,
        Rollout, RolloutError, UserId,
    };
    pub use rollout_storage::{FileStore, KeyValueStore, MemoryStore, Store};
}

/// Startup failures, by stage.
#[rollout_derive::rollout_error]
pub enum BootstrapError {
    #[error("Configuration failed{}: {source}", format_context(.context))]
    Config { source: ConfigError, context: Option<Cow<'static, str>> },

    #[error("Logging failed{}: {source}", format_context(.context))]
    Logger { source: LoggerError, context: Option<Cow<'static, str>> },

    #[error("Engine failed{}: {source}", format_context(.context))]
    Rollout { source: RolloutError, context: Option<Cow<'static, str>> },
}

/// Everything a host keeps alive after [`bootstrap`].
pub struct Host<U: ?Sized = UserId> {
    pub config: RolloutConfig,
    pub rollout: Rollout<Store, U>,
    logger: Logger,
}

impl<U: ?Sized> Host<U> {
    #[must_use]
    pub const fn logger(&self) -> &Logger {
        &self.logger
    }
}

impl<U: ?Sized> fmt::Debug for Host<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("config", &self.config)
            .field("rollout", &self.rollout)
            .field("logger", &self.logger)
            .finish()
    }
}

/// Loads the configuration at `path` (see [`kernel::config::load_config`]), installs the
/// global logger and opens the configured store.
///
/// Groups are process-local; register them on `groups` before or after this call.
///
/// # Errors
/// Returns the [`BootstrapError`] of the first stage that fails. Logging can be installed
/// only once per process.
pub fn bootstrap<U: ?Sized>(
    path: Option<impl AsRef<Path>>,
    groups: GroupRegistry<U>,
) -> Result<Host<U>, BootstrapError> {
    let config = load_rollout_config(path)?;
    let logger = Logger::from_config(&config.logging)?;
    let rollout = Rollout::from_config(&config, groups)?;

    info!(namespace = %rollout.namespace(), "Rollout host bootstrapped");
    Ok(Host { config, rollout, logger })
}
