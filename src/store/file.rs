//! File-backed lease store shared between processes.
//!
//! # Layout
//!
//! Each key owns two files in the store directory, named from
//! [`LockKey::storage_name`]:
//! - `{name}.lease`: the current lease as JSON (absent when free)
//! - `{name}.guard`: empty file used only for advisory locking
//!
//! # Atomicity
//!
//! `acquire`, `release` and `clear` take an exclusive `fs2` lock on the guard
//! file for the whole read-modify-write. The kernel drops the lock when the
//! holder exits, so a crashed caller never leaves a key wedged; its lease
//! simply expires. Lease files are replaced with [`atomic_write`], so `peek`
//! and `list` can read without the guard and never see partial JSON.
//!
//! The guard is never waited on without bound. `acquire` makes one
//! non-blocking attempt and reports a busy guard as contention, so the
//! caller's backoff loop keeps control of its deadline. `release` and `clear`
//! poll for up to [`GUARD_WAIT`] and then fail with [`StoreError::Busy`].
//!
//! # Guard files
//!
//! Guard files are created on first use of a key and are never removed, not
//! even by `clear`: another process may already have the file open, and
//! deleting it would let a later caller lock a fresh inode alongside it.
//! Stores keyed by many distinct documents or users therefore accumulate
//! one empty `.guard` file per key; prune them only while no process uses
//! the store.

use super::{Lease, LeaseStore, LeaseToken, StoreError, StoreResult};
use crate::fs::atomic_write;
use crate::locks::LockKey;
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const LEASE_EXTENSION: &str = "lease";
const GUARD_EXTENSION: &str = "guard";

/// Longest `release` and `clear` wait for another caller's guard.
const GUARD_WAIT: Duration = Duration::from_millis(500);

const GUARD_POLL: Duration = Duration::from_millis(1);

/// Lease store backed by a directory of JSON lease files.
#[derive(Debug, Clone)]
pub struct FileLeaseStore {
    dir: PathBuf,
}

/// Exclusive advisory lock on one key's guard file, released on drop.
struct KeyGuard {
    file: File,
}

impl Drop for KeyGuard {
    fn drop(&mut self) {
        // Closing the descriptor releases the lock as well.
        let _ = FileExt::unlock(&self.file);
    }
}

impl FileLeaseStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn open<P: AsRef<Path>>(dir: P) -> StoreResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| StoreError::io("create lease directory", &dir, e))?;
        Ok(Self { dir })
    }

    /// The directory holding the lease files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the lease file for `key`.
    pub fn lease_path(&self, key: &LockKey) -> PathBuf {
        self.dir
            .join(format!("{}.{}", key.storage_name(), LEASE_EXTENSION))
    }

    /// Path of the advisory lock file for `key`.
    pub fn guard_path(&self, key: &LockKey) -> PathBuf {
        self.dir
            .join(format!("{}.{}", key.storage_name(), GUARD_EXTENSION))
    }

    fn open_guard(&self, key: &LockKey) -> StoreResult<(File, PathBuf)> {
        let path = self.guard_path(key);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| StoreError::io("open guard file", &path, e))?;
        Ok((file, path))
    }

    /// Take the key's guard if it is free right now.
    fn try_lock_key(&self, key: &LockKey) -> StoreResult<Option<KeyGuard>> {
        let (file, path) = self.open_guard(key)?;
        if try_guard(&file, &path)? {
            Ok(Some(KeyGuard { file }))
        } else {
            Ok(None)
        }
    }

    /// Take the key's guard, waiting at most [`GUARD_WAIT`].
    fn lock_key(&self, key: &LockKey) -> StoreResult<KeyGuard> {
        let (file, path) = self.open_guard(key)?;
        let deadline = Instant::now() + GUARD_WAIT;

        while !try_guard(&file, &path)? {
            if Instant::now() >= deadline {
                return Err(StoreError::Busy(path));
            }
            thread::sleep(GUARD_POLL);
        }

        Ok(KeyGuard { file })
    }

    fn write_lease(&self, lease: &Lease) -> StoreResult<()> {
        let path = self.lease_path(&lease.key);
        let json = serde_json::to_vec_pretty(lease).map_err(|e| {
            StoreError::io(
                "serialize lease for",
                &path,
                io::Error::new(io::ErrorKind::InvalidData, e),
            )
        })?;
        atomic_write(&path, &json)
    }

    fn remove_lease(&self, key: &LockKey) -> StoreResult<()> {
        let path = self.lease_path(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::io("remove lease file", &path, e)),
        }
    }
}

/// One non-blocking attempt at the guard lock. `Ok(false)` if someone else holds it.
fn try_guard(file: &File, path: &Path) -> StoreResult<bool> {
    match file.try_lock_exclusive() {
        Ok(()) => Ok(true),
        Err(e) if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() => Ok(false),
        Err(e) => Err(StoreError::io("lock guard file", path, e)),
    }
}

/// Read a lease file.
///
/// A missing file is `None`. An unparseable file is also `None` so that a
/// corrupted entry can be reclaimed instead of blocking the key forever.
fn read_lease(path: &Path) -> StoreResult<Option<Lease>> {
    let content = match fs::read(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::io("read lease file", path, e)),
    };

    match serde_json::from_slice(&content) {
        Ok(lease) => Ok(Some(lease)),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unparseable lease file");
            Ok(None)
        }
    }
}

impl LeaseStore for FileLeaseStore {
    fn acquire(&self, key: &LockKey, token: &LeaseToken, ttl: Duration) -> StoreResult<bool> {
        let Some(_guard) = self.try_lock_key(key)? else {
            debug!(key = %key, "guard busy, treating key as contended");
            return Ok(false);
        };

        if read_lease(&self.lease_path(key))?.is_some_and(|lease| !lease.is_expired()) {
            return Ok(false);
        }

        let lease = Lease::new(key.clone(), token.clone(), ttl)?;
        self.write_lease(&lease)?;
        Ok(true)
    }

    fn release(&self, key: &LockKey, token: &LeaseToken) -> StoreResult<bool> {
        let _guard = self.lock_key(key)?;

        match read_lease(&self.lease_path(key))? {
            Some(lease) if &lease.token == token => {
                self.remove_lease(key)?;
                Ok(!lease.is_expired())
            }
            _ => Ok(false),
        }
    }

    fn peek(&self, key: &LockKey) -> StoreResult<Option<Lease>> {
        Ok(read_lease(&self.lease_path(key))?.filter(|lease| !lease.is_expired()))
    }

    fn list(&self) -> StoreResult<Vec<Lease>> {
        let entries =
            fs::read_dir(&self.dir).map_err(|e| StoreError::io("read lease directory", &self.dir, e))?;

        let mut leases = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io("read lease directory", &self.dir, e))?;
            let path = entry.path();

            if path.extension().and_then(|e| e.to_str()) != Some(LEASE_EXTENSION) {
                continue;
            }

            // Released between read_dir and read, or corrupt.
            if let Some(lease) = read_lease(&path)? {
                leases.push(lease);
            }
        }

        leases.sort_by_key(|lease| lease.key.to_string());
        Ok(leases)
    }

    fn clear(&self, key: &LockKey) -> StoreResult<Option<Lease>> {
        let _guard = self.lock_key(key)?;

        let lease = read_lease(&self.lease_path(key))?;
        self.remove_lease(key)?;
        Ok(lease)
    }
}
