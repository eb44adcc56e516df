//! Filesystem utilities for scopelock.
//!
//! Provides the atomic write used by the file-backed lease store so that
//! readers never observe a partially written lease.

pub mod atomic;

pub use atomic::atomic_write;
