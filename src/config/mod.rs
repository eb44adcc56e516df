//! Configuration model for scopelock.
//!
//! This module defines the Config struct that represents `.scopelock/config.yaml`.
//! It supports forward-compatible YAML parsing (unknown fields are ignored),
//! sensible defaults for optional fields, and validation of config values.

mod model;
mod operations;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export public API
pub use model::Config;
pub use operations::DEFAULT_CONFIG_PATH;
pub use types::{BackoffConfig, StoreBackend, StoreConfig};
