//! Config loading, validation, and conversion into lock settings.

use super::model::Config;
use crate::error::{Result, ScopeLockError};
use crate::locks::{BackoffPolicy, LockSettings};
use std::path::Path;
use std::time::Duration;

/// Config file consulted when no `--config` is given.
pub const DEFAULT_CONFIG_PATH: &str = ".scopelock/config.yaml";

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(ScopeLockError::UserError)` - Read error, parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            ScopeLockError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Load config from `path` if it exists, otherwise return defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document parses as unit, not as an empty mapping.
        let config: Config = if yaml.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(yaml).map_err(|e| {
                ScopeLockError::UserError(format!("failed to parse config YAML: {}", e))
            })?
        };

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            ScopeLockError::UserError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `script_id` must be non-empty
    /// - `lease_ttl_ms` must be positive
    /// - `backoff.initial_ms` must be positive and not exceed `backoff.max_ms`
    /// - `backoff.multiplier` must be at least 1.0
    /// - `backoff.jitter` must lie within 0.0 - 1.0
    /// - `store.dir` must be non-empty
    pub fn validate(&self) -> Result<()> {
        if self.script_id.trim().is_empty() {
            return Err(invalid("script_id must not be empty"));
        }

        if self.lease_ttl_ms == 0 {
            return Err(invalid("lease_ttl_ms must be greater than 0"));
        }

        if self.backoff.initial_ms == 0 {
            return Err(invalid("backoff.initial_ms must be greater than 0"));
        }

        if self.backoff.max_ms < self.backoff.initial_ms {
            return Err(ScopeLockError::UserError(format!(
                "config validation failed: backoff.max_ms ({}) must be at least backoff.initial_ms ({})",
                self.backoff.max_ms, self.backoff.initial_ms
            )));
        }

        if !self.backoff.multiplier.is_finite() || self.backoff.multiplier < 1.0 {
            return Err(invalid("backoff.multiplier must be at least 1.0"));
        }

        if !(0.0..=1.0).contains(&self.backoff.jitter) {
            return Err(invalid("backoff.jitter must be between 0.0 and 1.0"));
        }

        if self.store.dir.as_os_str().is_empty() {
            return Err(invalid("store.dir must not be empty"));
        }

        Ok(())
    }

    /// Lease lifetime as a duration.
    pub fn lease_ttl(&self) -> Duration {
        Duration::from_millis(self.lease_ttl_ms)
    }

    /// Settings every lock handle built from this config uses.
    pub fn lock_settings(&self) -> LockSettings {
        LockSettings {
            lease_ttl: self.lease_ttl(),
            backoff: BackoffPolicy {
                initial: Duration::from_millis(self.backoff.initial_ms),
                max: Duration::from_millis(self.backoff.max_ms),
                multiplier: self.backoff.multiplier,
                jitter: self.backoff.jitter,
            },
        }
    }
}

fn invalid(reason: &str) -> ScopeLockError {
    ScopeLockError::UserError(format!("config validation failed: {}", reason))
}
