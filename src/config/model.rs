//! Config struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};

/// Configuration for the lock service.
///
/// This struct represents the contents of `.scopelock/config.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Identity
    // =========================================================================
    /// Identifier of the script all global-scope callers share.
    #[serde(default = "default_script_id")]
    pub script_id: String,

    // =========================================================================
    // Lease settings
    // =========================================================================
    /// Lifetime of every acquired lease in milliseconds.
    ///
    /// An unreleased lease becomes acquirable again after this long, so it
    /// should comfortably exceed the longest expected critical section.
    #[serde(default = "default_lease_ttl_ms")]
    pub lease_ttl_ms: u64,

    /// Retry schedule while waiting for a contended lease.
    #[serde(default)]
    pub backoff: BackoffConfig,

    // =========================================================================
    // Store settings
    // =========================================================================
    /// Where leases live.
    #[serde(default)]
    pub store: StoreConfig,

    /// Whether CLI lock operations are appended to `events.ndjson` in the store directory.
    #[serde(default = "default_true")]
    pub audit_log: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            script_id: default_script_id(),
            lease_ttl_ms: default_lease_ttl_ms(),
            backoff: BackoffConfig::default(),
            store: StoreConfig::default(),
            audit_log: default_true(),
        }
    }
}
