//! Audit log of lock operations performed through the CLI.
//!
//! Events are appended in NDJSON format (one JSON object per line) to
//! `events.ndjson` inside the lease store directory, so every process sharing
//! a store also shares its history.
//!
//! # Event Format
//!
//! Each event is a JSON object with the following fields:
//! - `ts`: RFC3339 timestamp
//! - `action`: `acquire`, `release`, `timeout` or `clear`
//! - `actor`: The owner string (e.g., `user@HOST`)
//! - `key`: The lock key the action concerns
//! - `details`: Freeform object with action-specific details
//!
//! # Usage
//!
//! ```no_run
//! use scopelock::events::{Event, EventAction, append_event};
//! use scopelock::locks::LockKey;
//! use serde_json::json;
//!
//! let event = Event::new(EventAction::Acquire, &LockKey::global("nightly"))
//!     .with_details(json!({"waited_ms": 12}));
//! append_event(".scopelock/leases".as_ref(), &event)?;
//! # Ok::<(), scopelock::error::ScopeLockError>(())
//! ```

use crate::error::{Result, ScopeLockError};
use crate::locks::LockKey;
use crate::store::owner_string;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the audit log inside the store directory.
pub const EVENTS_FILE: &str = "events.ndjson";

/// Actions that can be logged as events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// Lease acquired
    Acquire,
    /// Lease released
    Release,
    /// Gave up waiting for a lease
    Timeout,
    /// Lease removed by force
    Clear,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::Acquire => write!(f, "acquire"),
            EventAction::Release => write!(f, "release"),
            EventAction::Timeout => write!(f, "timeout"),
            EventAction::Clear => write!(f, "clear"),
        }
    }
}

/// An event record for the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// RFC3339 timestamp when the event occurred.
    pub ts: DateTime<Utc>,

    /// The action that was performed.
    pub action: EventAction,

    /// The actor who performed the action (e.g., `user@HOST`).
    pub actor: String,

    /// Display form of the lock key.
    pub key: String,

    /// Freeform details object with action-specific information.
    pub details: Value,
}

impl Event {
    /// Create a new event for `key`, stamped now and attributed to this process's owner.
    pub fn new(action: EventAction, key: &LockKey) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: owner_string(),
            key: key.to_string(),
            details: Value::Object(serde_json::Map::new()),
        }
    }

    /// Set the details object for this event.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the event to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            ScopeLockError::UserError(format!("failed to serialize event to JSON: {}", e))
        })
    }
}

/// Path of the audit log for a store rooted at `store_dir`.
pub fn events_file_path(store_dir: &Path) -> PathBuf {
    store_dir.join(EVENTS_FILE)
}

/// Append an event to the audit log in `store_dir`.
///
/// The directory and file are created if missing. Each call writes exactly
/// one line with a trailing newline.
pub fn append_event(store_dir: &Path, event: &Event) -> Result<()> {
    let events_file = events_file_path(store_dir);
    let json_line = event.to_ndjson_line()?;

    fs::create_dir_all(store_dir).map_err(|e| {
        ScopeLockError::UserError(format!(
            "failed to create events directory '{}': {}",
            store_dir.display(),
            e
        ))
    })?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&events_file)
        .map_err(|e| {
            ScopeLockError::UserError(format!(
                "failed to open events file '{}': {}",
                events_file.display(),
                e
            ))
        })?;

    writeln!(file, "{}", json_line).map_err(|e| {
        ScopeLockError::UserError(format!(
            "failed to write event to '{}': {}",
            events_file.display(),
            e
        ))
    })?;

    Ok(())
}

/// Read every event in the audit log. A missing log reads as empty.
pub fn read_events(store_dir: &Path) -> Result<Vec<Event>> {
    let events_file = events_file_path(store_dir);
    if !events_file.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(&events_file).map_err(|e| {
        ScopeLockError::UserError(format!(
            "failed to read events file '{}': {}",
            events_file.display(),
            e
        ))
    })?;

    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            serde_json::from_str(line).map_err(|e| {
                ScopeLockError::UserError(format!("failed to parse event: {}", e))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_event_creation() {
        let event = Event::new(EventAction::Acquire, &LockKey::global("nightly"));

        assert_eq!(event.action, EventAction::Acquire);
        assert_eq!(event.key, "global:nightly");
        assert!(event.actor.contains('@'));
        let age = Utc::now().signed_duration_since(event.ts);
        assert!(age.num_minutes() < 1);
    }

    #[test]
    fn test_event_with_details() {
        let event = Event::new(EventAction::Timeout, &LockKey::user("nightly", "alice"))
            .with_details(json!({"waited_ms": 300}));

        assert_eq!(event.details["waited_ms"], 300);
    }

    #[test]
    fn test_event_serialization_is_single_line() {
        let event = Event::new(EventAction::Clear, &LockKey::document("nightly", "doc-1"))
            .with_details(json!({"previous_owner": "bob@host"}));

        let json_line = event.to_ndjson_line().unwrap();
        assert!(!json_line.contains('\n'));
        assert!(json_line.contains("\"clear\""));

        let parsed: Event = serde_json::from_str(&json_line).unwrap();
        assert_eq!(parsed.action, EventAction::Clear);
        assert_eq!(parsed.key, "document:nightly:doc-1");
    }

    #[test]
    fn test_append_event_creates_file() {
        let temp_dir = TempDir::new().unwrap();
        let store_dir = temp_dir.path().join("leases");
        let events_file = events_file_path(&store_dir);
        assert!(!events_file.exists());

        append_event(&store_dir, &Event::new(EventAction::Acquire, &LockKey::global("s"))).unwrap();

        assert!(events_file.exists());
        let content = fs::read_to_string(&events_file).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.ends_with('\n'));
    }

    #[test]
    fn test_append_event_multiple_lines() {
        let temp_dir = TempDir::new().unwrap();
        let key = LockKey::global("s");

        append_event(temp_dir.path(), &Event::new(EventAction::Acquire, &key)).unwrap();
        append_event(temp_dir.path(), &Event::new(EventAction::Release, &key)).unwrap();

        let events = read_events(temp_dir.path()).unwrap();
        let actions: Vec<_> = events.iter().map(|e| e.action).collect();
        assert_eq!(actions, vec![EventAction::Acquire, EventAction::Release]);
    }

    #[test]
    fn test_read_events_missing_log_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        assert!(read_events(temp_dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_action_display_matches_serde() {
        for action in [
            EventAction::Acquire,
            EventAction::Release,
            EventAction::Timeout,
            EventAction::Clear,
        ] {
            let json = serde_json::to_string(&action).unwrap();
            assert_eq!(json, format!("\"{}\"", action));
        }
    }
}
