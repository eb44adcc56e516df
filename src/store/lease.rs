//! Lease records and ownership tokens.

use super::{StoreError, StoreResult};
use crate::locks::LockKey;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use uuid::Uuid;

/// Opaque proof of ownership for one acquisition attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeaseToken(String);

impl LeaseToken {
    /// Generate a fresh, globally unique token.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LeaseToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for LeaseToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A time-bounded exclusive claim on a [`LockKey`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lease {
    /// The key this lease covers.
    pub key: LockKey,

    /// Token of the attempt that created the lease.
    pub token: LeaseToken,

    /// Owner of the lease (e.g., `user@HOST`).
    pub owner: String,

    /// Process ID of the lease holder (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,

    /// When the lease was acquired.
    pub acquired_at: DateTime<Utc>,

    /// Instant at which the lease stops being live.
    pub expires_at: DateTime<Utc>,
}

impl Lease {
    /// Create a lease starting now and lasting `ttl`.
    pub fn new(key: LockKey, token: LeaseToken, ttl: Duration) -> StoreResult<Self> {
        let acquired_at = Utc::now();
        let expires_at = TimeDelta::from_std(ttl)
            .ok()
            .and_then(|ttl| acquired_at.checked_add_signed(ttl))
            .ok_or(StoreError::InvalidTtl(ttl))?;

        Ok(Self {
            key,
            token,
            owner: owner_string(),
            pid: Some(std::process::id()),
            acquired_at,
            expires_at,
        })
    }

    /// Whether the lease has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whether the lease has expired.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Time left before expiry, zero once expired.
    pub fn remaining(&self) -> Duration {
        (self.expires_at - Utc::now()).to_std().unwrap_or(Duration::ZERO)
    }

    /// Format the age as a human-readable string.
    pub fn age_string(&self) -> String {
        let age = Utc::now().signed_duration_since(self.acquired_at);
        let seconds = age.num_seconds();
        let minutes = age.num_minutes();
        let hours = age.num_hours();
        let days = age.num_days();

        if days > 0 {
            format!("{}d {}h", days, hours % 24)
        } else if hours > 0 {
            format!("{}h {}m", hours, minutes % 60)
        } else if minutes > 0 {
            format!("{}m", minutes)
        } else {
            format!("{}s", seconds.max(0))
        }
    }
}

/// Owner string recorded in lease metadata.
pub(crate) fn owner_string() -> String {
    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", crate::context::login_name(), host)
}
