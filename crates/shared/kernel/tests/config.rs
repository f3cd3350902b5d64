use rollout_kernel::config::{ConfigError, load_config_with_env, load_rollout_config};
use rollout_kernel::domain::config::{CompressionKind, RolloutConfig, StoreBackend};
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

const TOML: &str = r#"
namespace = "flags"

[store]
backend = "file"
root = "/var/lib/flags"

[logging]
level = "debug"
"#;

#[test]
fn loads_toml_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rollout.toml");
    fs::write(&path, TOML).unwrap();

    let cfg = load_rollout_config(Some(&path)).expect("config loads");
    assert_eq!(cfg.namespace, "flags");
    assert_eq!(cfg.store.backend, StoreBackend::File);
    assert_eq!(cfg.store.root, PathBuf::from("/var/lib/flags"));
    assert_eq!(cfg.store.compression, CompressionKind::None);
    assert_eq!(cfg.logging.level, "debug");
}

#[test]
fn environment_overrides_file_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rollout.toml");
    fs::write(&path, TOML).unwrap();

    let vars = [
        ("ROLLOUT__NAMESPACE".to_owned(), "staging".to_owned()),
        ("ROLLOUT__STORE__COMPRESSION".to_owned(), "lz4".to_owned()),
    ];
    let cfg: RolloutConfig = load_config_with_env(Some(&path), vars).expect("config loads");

    assert_eq!(cfg.namespace, "staging");
    assert_eq!(cfg.store.compression, CompressionKind::Lz4);
    assert_eq!(cfg.store.backend, StoreBackend::File, "untouched keys keep file values");
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempdir().unwrap();
    let err = load_rollout_config(Some(dir.path().join("absent.toml"))).expect_err("no file");
    assert!(matches!(err, ConfigError::Config { .. }));
    assert!(err.to_string().contains("Failed to build config"));
}

#[test]
fn malformed_values_are_reported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rollout.toml");
    fs::write(&path, "[store]\nbackend = \"redis\"\n").unwrap();

    let err = load_rollout_config(Some(&path)).expect_err("unknown backend");
    assert!(err.to_string().contains("Failed to deserialize config"));
}
