//! RAII lock guard implementation.

use super::lock::Lock;
use super::types::LockKey;

/// Holds a [`Lock`] in the locked state for its lifetime.
///
/// When dropped, the lease is released. Release failures are logged by
/// [`Lock::release_lock`] and never panic; the lease then expires on its own.
#[derive(Debug)]
pub struct LockGuard<'a> {
    lock: &'a mut Lock,
}

impl<'a> LockGuard<'a> {
    pub(super) fn new(lock: &'a mut Lock) -> Self {
        Self { lock }
    }

    /// The key being held.
    pub fn key(&self) -> &LockKey {
        self.lock.key()
    }

    /// Whether the underlying lease is still believed live.
    ///
    /// Turns `false` once the lease TTL has passed, even though the guard is alive.
    pub fn is_held(&self) -> bool {
        self.lock.has_lock()
    }

    /// Release now instead of at end of scope.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        self.lock.release_lock();
    }
}
