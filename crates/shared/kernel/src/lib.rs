//! Kernel utilities shared by rollout hosts.
//! Keep this crate lightweight: today it only owns layered configuration loading.
//!
//! ```rust,no_run
//! use rollout_kernel::config::load_rollout_config;
//!
//! let cfg = load_rollout_config(Some("config/rollout.toml")).unwrap_or_default();
//! assert!(!cfg.namespace.is_empty());
//! ```
pub mod config;

pub use rollout_domain as domain;
