//! In-process lease store.

use super::{Lease, LeaseStore, LeaseToken, StoreResult};
use crate::locks::LockKey;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// Lease store backed by a mutex-guarded map.
///
/// Atomic across threads of one process; not shared between processes.
#[derive(Debug, Default)]
pub struct MemoryLeaseStore {
    leases: Mutex<HashMap<LockKey, Lease>>,
}

impl MemoryLeaseStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<LockKey, Lease>> {
        // A panic while holding the map cannot leave a lease half-written.
        self.leases
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }
}

impl LeaseStore for MemoryLeaseStore {
    fn acquire(&self, key: &LockKey, token: &LeaseToken, ttl: Duration) -> StoreResult<bool> {
        let mut leases = self.entries();

        if leases.get(key).is_some_and(|lease| !lease.is_expired()) {
            return Ok(false);
        }

        let lease = Lease::new(key.clone(), token.clone(), ttl)?;
        leases.insert(key.clone(), lease);
        Ok(true)
    }

    fn release(&self, key: &LockKey, token: &LeaseToken) -> StoreResult<bool> {
        let mut leases = self.entries();

        match leases.get(key) {
            Some(lease) if &lease.token == token => {
                let live = !lease.is_expired();
                leases.remove(key);
                Ok(live)
            }
            _ => Ok(false),
        }
    }

    fn peek(&self, key: &LockKey) -> StoreResult<Option<Lease>> {
        Ok(self
            .entries()
            .get(key)
            .filter(|lease| !lease.is_expired())
            .cloned())
    }

    fn list(&self) -> StoreResult<Vec<Lease>> {
        let mut leases: Vec<Lease> = self.entries().values().cloned().collect();
        leases.sort_by_key(|lease| lease.key.to_string());
        Ok(leases)
    }

    fn clear(&self, key: &LockKey) -> StoreResult<Option<Lease>> {
        Ok(self.entries().remove(key))
    }
}
