//! Configuration types and defaults for scopelock.
//!
//! This module defines the nested config sections, the store backend enum
//! and the default value functions used by serde.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which lease store implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Lease files in a shared directory (default, works across processes).
    #[default]
    File,
    /// In-process map; only useful for embedding and tests.
    Memory,
}

/// Lease store settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend implementation.
    pub backend: StoreBackend,

    /// Directory holding lease files (file backend only).
    pub dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            dir: default_store_dir(),
        }
    }
}

/// Retry schedule between contended acquisition attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// First retry delay in milliseconds.
    pub initial_ms: u64,

    /// Upper bound on any single retry delay in milliseconds.
    pub max_ms: u64,

    /// Growth factor applied after each failed attempt.
    pub multiplier: f64,

    /// Fraction of each delay that may be randomly shaved off (0.0 - 1.0).
    pub jitter: f64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_ms: default_backoff_initial_ms(),
            max_ms: default_backoff_max_ms(),
            multiplier: default_backoff_multiplier(),
            jitter: default_backoff_jitter(),
        }
    }
}

// Default value functions for serde
pub(crate) fn default_script_id() -> String {
    "default".to_string()
}
pub(crate) fn default_lease_ttl_ms() -> u64 {
    30_000
}
pub(crate) fn default_store_dir() -> PathBuf {
    PathBuf::from(".scopelock").join("leases")
}
pub(crate) fn default_backoff_initial_ms() -> u64 {
    10
}
pub(crate) fn default_backoff_max_ms() -> u64 {
    500
}
pub(crate) fn default_backoff_multiplier() -> f64 {
    2.0
}
pub(crate) fn default_backoff_jitter() -> f64 {
    0.2
}
pub(crate) fn default_true() -> bool {
    true
}
