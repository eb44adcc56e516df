//! Client-side lock handle and its acquisition loop.

use super::backoff::BackoffPolicy;
use super::guard::LockGuard;
use super::types::{LockKey, LockStatus};
use crate::config::Config;
use crate::error::{Result, ScopeLockError};
use crate::store::{LeaseStore, LeaseToken, StoreError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Timing constants shared by every handle a manager hands out.
#[derive(Debug, Clone, PartialEq)]
pub struct LockSettings {
    /// Lifetime of each acquired lease. Independent of any caller timeout.
    pub lease_ttl: Duration,

    /// Retry schedule while the key is contended or the store is down.
    pub backoff: BackoffPolicy,
}

impl Default for LockSettings {
    fn default() -> Self {
        Config::default().lock_settings()
    }
}

/// The lease this handle believes it holds.
#[derive(Debug)]
struct HeldLease {
    token: LeaseToken,
    /// Taken before the winning `acquire` call, so local expiry never trails the store's.
    acquired_at: Instant,
}

/// Handle on one [`LockKey`].
///
/// Created by [`super::LockManager`]. Cheap to build; touches the store only
/// inside [`Lock::try_lock`], [`Lock::wait_lock`] and [`Lock::release_lock`].
/// A handle is used by one flow of control at a time.
#[derive(Debug)]
pub struct Lock {
    key: LockKey,
    store: Arc<dyn LeaseStore>,
    settings: LockSettings,
    status: LockStatus,
    held: Option<HeldLease>,
    last_store_error: Option<StoreError>,
}

impl Lock {
    pub fn new(key: LockKey, store: Arc<dyn LeaseStore>, settings: LockSettings) -> Self {
        Self {
            key,
            store,
            settings,
            status: LockStatus::Unlocked,
            held: None,
            last_store_error: None,
        }
    }

    pub fn key(&self) -> &LockKey {
        &self.key
    }

    pub fn settings(&self) -> &LockSettings {
        &self.settings
    }

    /// Current state. A lease that has outlived the TTL reads as `Unlocked`.
    pub fn status(&self) -> LockStatus {
        match self.status {
            LockStatus::Locked if !self.has_lock() => LockStatus::Unlocked,
            status => status,
        }
    }

    /// Token of the live lease this handle holds, if any.
    ///
    /// `None` once the TTL has passed, even before `release_lock`.
    pub fn lease_token(&self) -> Option<&LeaseToken> {
        self.live_lease().map(|held| &held.token)
    }

    fn live_lease(&self) -> Option<&HeldLease> {
        if self.status != LockStatus::Locked {
            return None;
        }
        self.held
            .as_ref()
            .filter(|held| held.acquired_at.elapsed() < self.settings.lease_ttl)
    }

    /// Store failure seen on the final attempt of the last acquisition call.
    ///
    /// `None` after a failed `try_lock` means the key was contended.
    pub fn last_store_error(&self) -> Option<&StoreError> {
        self.last_store_error.as_ref()
    }

    /// Try to acquire the lease, waiting up to `timeout`.
    ///
    /// Returns `false` once `timeout` has elapsed without success; no attempt
    /// is started at or after the deadline. A zero timeout makes exactly one
    /// attempt. Store failures are retried like contention.
    ///
    /// A handle that still holds a live lease returns `true` immediately.
    pub fn try_lock(&mut self, timeout: Duration) -> bool {
        if self.has_lock() {
            return true;
        }

        // A lease we believe has lapsed is abandoned; the store reclaims it.
        self.held = None;
        self.status = LockStatus::Acquiring;
        self.last_store_error = None;

        let start = Instant::now();
        let deadline = start.checked_add(timeout);
        let mut backoff = self.settings.backoff.schedule();
        let mut attempts: u32 = 0;

        loop {
            attempts += 1;
            let token = LeaseToken::generate();
            let attempt_started = Instant::now();

            match self.store.acquire(&self.key, &token, self.settings.lease_ttl) {
                Ok(true) => {
                    debug!(
                        key = %self.key,
                        attempts,
                        waited_ms = start.elapsed().as_millis() as u64,
                        "lease acquired"
                    );
                    self.held = Some(HeldLease {
                        token,
                        acquired_at: attempt_started,
                    });
                    self.status = LockStatus::Locked;
                    self.last_store_error = None;
                    return true;
                }
                Ok(false) => {
                    debug!(key = %self.key, attempts, "lease contended");
                    self.last_store_error = None;
                }
                Err(e) => {
                    warn!(key = %self.key, attempts, error = %e, "lease store unavailable");
                    self.last_store_error = Some(e);
                }
            }

            let remaining = match deadline {
                Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                None => Duration::MAX,
            };
            if remaining.is_zero() {
                break;
            }

            let delay = backoff.next_delay();
            if delay >= remaining {
                thread::sleep(remaining);
                break;
            }
            thread::sleep(delay);
        }

        debug!(
            key = %self.key,
            attempts,
            timeout_ms = timeout.as_millis() as u64,
            "gave up waiting for lease"
        );
        self.status = LockStatus::Unlocked;
        false
    }

    /// Like [`Lock::try_lock`], but a timeout is an error.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The handle is now locked
    /// * `Err(ScopeLockError::Timeout)` - `timeout` elapsed first; the handle is unlocked
    pub fn wait_lock(&mut self, timeout: Duration) -> Result<()> {
        let start = Instant::now();
        if self.try_lock(timeout) {
            return Ok(());
        }

        Err(ScopeLockError::Timeout {
            key: self.key.to_string(),
            waited_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        })
    }

    /// Wait for the lease and return a guard that releases it when dropped.
    pub fn guard(&mut self, timeout: Duration) -> Result<LockGuard<'_>> {
        self.wait_lock(timeout)?;
        Ok(LockGuard::new(self))
    }

    /// Whether this handle holds a lease that has not outlived the TTL.
    ///
    /// Local belief only; the store is not consulted.
    pub fn has_lock(&self) -> bool {
        self.live_lease().is_some()
    }

    /// Release the lease if this handle holds one.
    ///
    /// Always leaves the handle unlocked. Safe to call repeatedly, before any
    /// acquisition, or after the lease has expired.
    pub fn release_lock(&mut self) {
        self.status = LockStatus::Unlocked;
        let Some(held) = self.held.take() else {
            return;
        };

        match self.store.release(&self.key, &held.token) {
            Ok(true) => debug!(key = %self.key, "lease released"),
            Ok(false) => debug!(key = %self.key, "lease already expired or reclaimed"),
            Err(e) => warn!(
                key = %self.key,
                error = %e,
                "failed to release lease; it will expire on its own"
            ),
        }
    }
}
