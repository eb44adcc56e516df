//! Tests for config functionality.

use crate::config::{Config, StoreBackend};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.script_id, "default");
    assert_eq!(config.lease_ttl_ms, 30_000);
    assert_eq!(config.backoff.initial_ms, 10);
    assert_eq!(config.backoff.max_ms, 500);
    assert_eq!(config.backoff.multiplier, 2.0);
    assert_eq!(config.backoff.jitter, 0.2);
    assert_eq!(config.store.backend, StoreBackend::File);
    assert_eq!(config.store.dir, PathBuf::from(".scopelock").join("leases"));
    assert!(config.audit_log);
    assert!(config.validate().is_ok());
}

#[test]
fn test_parse_minimal_yaml() {
    let config = Config::from_yaml("").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_parse_partial_yaml() {
    let yaml = r#"
script_id: nightly-report
backoff:
  max_ms: 2000
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.script_id, "nightly-report");
    assert_eq!(config.backoff.max_ms, 2000);

    // Unspecified values inside a given section keep their defaults
    assert_eq!(config.backoff.initial_ms, 10);
    assert_eq!(config.lease_ttl_ms, 30_000);
    assert_eq!(config.store.backend, StoreBackend::File);
}

#[test]
fn test_parse_full_yaml() {
    let yaml = r#"
script_id: billing
lease_ttl_ms: 120000
backoff:
  initial_ms: 25
  max_ms: 1000
  multiplier: 1.5
  jitter: 0.5
store:
  backend: memory
  dir: /var/lib/scopelock
audit_log: false
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.script_id, "billing");
    assert_eq!(config.lease_ttl_ms, 120_000);
    assert_eq!(config.backoff.initial_ms, 25);
    assert_eq!(config.backoff.max_ms, 1000);
    assert_eq!(config.backoff.multiplier, 1.5);
    assert_eq!(config.backoff.jitter, 0.5);
    assert_eq!(config.store.backend, StoreBackend::Memory);
    assert_eq!(config.store.dir, PathBuf::from("/var/lib/scopelock"));
    assert!(!config.audit_log);
}

#[test]
fn test_unknown_fields_ignored() {
    let yaml = r#"
script_id: s
future_option: true
store:
  backend: file
  replication: 3
"#;
    let config = Config::from_yaml(yaml).unwrap();
    assert_eq!(config.script_id, "s");
}

#[test]
fn test_invalid_backend_rejected() {
    let result = Config::from_yaml("store:\n  backend: redis\n");
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("failed to parse config YAML"));
}

#[test]
fn test_validation_rejects_zero_ttl() {
    let err = Config::from_yaml("lease_ttl_ms: 0").unwrap_err();
    assert!(err.to_string().contains("lease_ttl_ms"));
}

#[test]
fn test_validation_rejects_empty_script_id() {
    let err = Config::from_yaml("script_id: '  '").unwrap_err();
    assert!(err.to_string().contains("script_id"));
}

#[test]
fn test_validation_rejects_bad_backoff() {
    let err = Config::from_yaml("backoff:\n  initial_ms: 0").unwrap_err();
    assert!(err.to_string().contains("initial_ms"));

    let err = Config::from_yaml("backoff:\n  initial_ms: 100\n  max_ms: 50").unwrap_err();
    assert!(err.to_string().contains("max_ms"));

    let err = Config::from_yaml("backoff:\n  multiplier: 0.5").unwrap_err();
    assert!(err.to_string().contains("multiplier"));

    let err = Config::from_yaml("backoff:\n  jitter: 1.5").unwrap_err();
    assert!(err.to_string().contains("jitter"));
}

#[test]
fn test_validation_rejects_empty_store_dir() {
    let err = Config::from_yaml("store:\n  dir: ''").unwrap_err();
    assert!(err.to_string().contains("store.dir"));
}

#[test]
fn test_yaml_roundtrip() {
    let mut config = Config::default();
    config.script_id = "roundtrip".to_string();
    config.backoff.jitter = 0.0;

    let yaml = config.to_yaml().unwrap();
    let parsed = Config::from_yaml(&yaml).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_load_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.yaml");
    std::fs::write(&path, "script_id: from-file\nlease_ttl_ms: 500\n").unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.script_id, "from-file");
    assert_eq!(config.lease_ttl(), Duration::from_millis(500));
}

#[test]
fn test_load_missing_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let err = Config::load(temp_dir.path().join("missing.yaml")).unwrap_err();
    assert!(err.to_string().contains("failed to read config file"));
}

#[test]
fn test_load_or_default_without_file() {
    let temp_dir = TempDir::new().unwrap();
    let config = Config::load_or_default(temp_dir.path().join("missing.yaml")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_lock_settings_conversion() {
    let config = Config::from_yaml(
        "lease_ttl_ms: 1500\nbackoff:\n  initial_ms: 5\n  max_ms: 80\n  multiplier: 3.0\n  jitter: 0.1\n",
    )
    .unwrap();

    let settings = config.lock_settings();
    assert_eq!(settings.lease_ttl, Duration::from_millis(1500));
    assert_eq!(settings.backoff.initial, Duration::from_millis(5));
    assert_eq!(settings.backoff.max, Duration::from_millis(80));
    assert_eq!(settings.backoff.multiplier, 3.0);
    assert_eq!(settings.backoff.jitter, 0.1);
}
