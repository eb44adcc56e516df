//! Scoped locking on top of a lease store.
//!
//! This module implements exclusive sections at three granularities:
//! - Global: one lock per script (`global:{script}`)
//! - Document: one lock per bound document (`document:{script}:{document}`)
//! - User: one lock per acting user (`user:{script}:{user}`)
//!
//! # Acquisition
//!
//! A [`Lock`] polls [`crate::store::LeaseStore::acquire`] with a fresh token
//! per attempt, sleeping on an exponential, jittered [`Backoff`] between
//! attempts, until it wins or the caller's timeout runs out. Waiters are not
//! served in any particular order.
//!
//! # Lease TTL
//!
//! Every lease expires after [`LockSettings::lease_ttl`] whether or not it was
//! released, so a crashed holder blocks others for at most one TTL. There is
//! no renewal: a critical section that outlives the TTL may overlap with the
//! next holder.
//!
//! # RAII Guards
//!
//! [`Lock::guard`] returns a [`LockGuard`] that releases on drop.

mod backoff;
mod guard;
mod lock;
mod manager;
mod types;


// Re-export public API
pub use backoff::{Backoff, BackoffPolicy};
pub use guard::LockGuard;
pub use lock::{Lock, LockSettings};
pub use manager::LockManager;
pub use types::{LockKey, LockScope, LockStatus};
