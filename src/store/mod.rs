//! Lease store abstraction and backends.
//!
//! A [`LeaseStore`] is the only state shared between cooperating callers. It
//! must make `acquire` and `release` atomic with respect to every other caller
//! of the same store, whatever process or thread they run in.
//!
//! # Backends
//!
//! - [`MemoryLeaseStore`]: a mutex-guarded map, for a single process and tests.
//! - [`FileLeaseStore`]: one JSON file per key in a shared directory, with each
//!   read-modify-write serialized by an advisory lock on a per-key guard file.
//!
//! # Authority
//!
//! Only the booleans returned by `acquire` and `release` are authoritative.
//! `peek` and `list` are diagnostics and may be stale by the time they return.

mod file;
mod lease;
mod memory;

pub use file::FileLeaseStore;
pub use lease::{Lease, LeaseToken};
pub(crate) use lease::owner_string;
pub use memory::MemoryLeaseStore;

use crate::config::{StoreBackend, StoreConfig};
use crate::locks::LockKey;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Failure to talk to the lease store.
///
/// Distinct from contention: a contended `acquire` is `Ok(false)`.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A filesystem operation on the store failed.
    #[error("failed to {action} '{}': {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The requested lease duration cannot be represented.
    #[error("lease ttl {0:?} is out of range")]
    InvalidTtl(Duration),

    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Another caller held the key's guard for too long.
    #[error("'{}' is held by another store operation", .0.display())]
    Busy(PathBuf),
}

impl StoreError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Shared, atomic key-value store of expiring leases.
pub trait LeaseStore: fmt::Debug + Send + Sync {
    /// Create a lease for `key` owned by `token`, expiring `ttl` from now,
    /// iff no live lease exists for `key`.
    ///
    /// Returns `Ok(false)` when another live lease holds the key.
    fn acquire(&self, key: &LockKey, token: &LeaseToken, ttl: Duration) -> StoreResult<bool>;

    /// Delete the lease for `key` iff it is live and owned by `token`.
    ///
    /// Returns `Ok(false)` when there was nothing matching to delete.
    fn release(&self, key: &LockKey, token: &LeaseToken) -> StoreResult<bool>;

    /// Read the live lease for `key`, if any.
    fn peek(&self, key: &LockKey) -> StoreResult<Option<Lease>>;

    /// Every lease entry still held, including expired ones not yet reclaimed.
    fn list(&self) -> StoreResult<Vec<Lease>>;

    /// Remove the entry for `key` regardless of owner, returning what was removed.
    fn clear(&self, key: &LockKey) -> StoreResult<Option<Lease>>;
}

/// Open the store described by `config`.
pub fn open(config: &StoreConfig) -> StoreResult<Arc<dyn LeaseStore>> {
    match config.backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryLeaseStore::new())),
        StoreBackend::File => Ok(Arc::new(FileLeaseStore::open(&config.dir)?)),
    }
}
