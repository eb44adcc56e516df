//! Scopelock: scoped, lease-based mutual exclusion.
//!
//! Cooperating callers serialize work through leases kept in a shared
//! [`store::LeaseStore`]. A [`locks::LockManager`] resolves a
//! [`locks::LockScope`] (global, document or user) in the current
//! [`context::ExecutionContext`] into a [`locks::LockKey`] and hands out
//! [`locks::Lock`] handles that acquire with bounded waiting and release
//! with token checks. Every lease expires on its own after a TTL, so a
//! crashed holder blocks others for at most that long.
//!
//! ```no_run
//! use scopelock::config::Config;
//! use scopelock::context::{ContextOverrides, ExecutionContext};
//! use scopelock::locks::LockManager;
//! use std::time::Duration;
//!
//! let config = Config::load_or_default(scopelock::config::DEFAULT_CONFIG_PATH)?;
//! let context = ExecutionContext::resolve(&config, &ContextOverrides::default())?;
//! let manager = LockManager::from_config(&config, context)?;
//!
//! let mut lock = manager.script_lock();
//! let _guard = lock.guard(Duration::from_secs(5))?;
//! // critical section
//! # Ok::<(), scopelock::error::ScopeLockError>(())
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod fs;
pub mod locks;
pub mod store;

#[cfg(test)]
mod test_support;

pub use error::{Result, ScopeLockError};
pub use locks::{Lock, LockGuard, LockKey, LockManager, LockScope, LockStatus};
