use crate::context::ExecutionContext;
use crate::locks::{BackoffPolicy, LockKey, LockManager, LockSettings};
use crate::store::{Lease, LeaseStore, LeaseToken, MemoryLeaseStore, StoreError, StoreResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Settings with a short backoff so timing tests stay fast.
pub(crate) fn fast_settings(lease_ttl_ms: u64) -> LockSettings {
    LockSettings {
        lease_ttl: Duration::from_millis(lease_ttl_ms),
        backoff: BackoffPolicy {
            initial: Duration::from_millis(2),
            max: Duration::from_millis(20),
            multiplier: 2.0,
            jitter: 0.2,
        },
    }
}

/// Manager over a fresh in-memory store for script `s` and user `alice`.
pub(crate) fn memory_manager(lease_ttl_ms: u64) -> LockManager {
    LockManager::new(
        Arc::new(MemoryLeaseStore::new()),
        ExecutionContext::new("s", "alice"),
        fast_settings(lease_ttl_ms),
    )
}

/// Store that fails a fixed number of `acquire` calls before delegating.
#[derive(Debug, Default)]
pub(crate) struct FlakyStore {
    inner: MemoryLeaseStore,
    failures_left: AtomicUsize,
    acquire_calls: AtomicUsize,
    tokens: Mutex<Vec<LeaseToken>>,
}

impl FlakyStore {
    /// Fail the first `failures` acquires; `usize::MAX` means the store never comes up.
    pub(crate) fn failing(failures: usize) -> Self {
        Self {
            failures_left: AtomicUsize::new(failures),
            ..Default::default()
        }
    }

    pub(crate) fn acquire_calls(&self) -> usize {
        self.acquire_calls.load(Ordering::SeqCst)
    }

    /// Tokens passed to `acquire`, in call order, including failed calls.
    pub(crate) fn tokens(&self) -> Vec<LeaseToken> {
        self.tokens.lock().unwrap().clone()
    }

    fn outage(&self) -> StoreResult<()> {
        let left = self.failures_left.load(Ordering::SeqCst);
        if left == 0 {
            return Ok(());
        }
        if left != usize::MAX {
            self.failures_left.fetch_sub(1, Ordering::SeqCst);
        }
        Err(StoreError::Unavailable("simulated outage".to_string()))
    }
}

impl LeaseStore for FlakyStore {
    fn acquire(&self, key: &LockKey, token: &LeaseToken, ttl: Duration) -> StoreResult<bool> {
        self.acquire_calls.fetch_add(1, Ordering::SeqCst);
        self.tokens.lock().unwrap().push(token.clone());
        self.outage()?;
        self.inner.acquire(key, token, ttl)
    }

    fn release(&self, key: &LockKey, token: &LeaseToken) -> StoreResult<bool> {
        self.inner.release(key, token)
    }

    fn peek(&self, key: &LockKey) -> StoreResult<Option<Lease>> {
        self.inner.peek(key)
    }

    fn list(&self) -> StoreResult<Vec<Lease>> {
        self.inner.list()
    }

    fn clear(&self, key: &LockKey) -> StoreResult<Option<Lease>> {
        self.inner.clear(key)
    }
}
