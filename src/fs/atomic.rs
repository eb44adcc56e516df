//! Atomic file replacement.
//!
//! All atomic writes follow this pattern:
//! 1. Write content to a temporary file in the same directory
//! 2. Sync the file to disk (fsync)
//! 3. Rename it over the target
//!
//! `rename` replaces the destination atomically on POSIX, and on Windows std
//! uses `MoveFileExW` with `MOVEFILE_REPLACE_EXISTING`. Source and destination
//! must be on the same filesystem. On crash, a temporary file named
//! `.{filename}.tmp` may remain; the next write to the same target overwrites it.
//!
//! The temporary name is fixed per target, so concurrent writers of the same
//! target must already be serialized (the lease store holds the key's guard lock).

use crate::store::{StoreError, StoreResult};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Atomically write bytes to a file.
///
/// Writes to a temporary sibling, syncs it, then renames it over `path`.
/// Missing parent directories are created.
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> StoreResult<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| StoreError::io("create directory", parent, e))?;
    }

    let temp_path = generate_temp_path(path)?;
    write_and_sync(&temp_path, content)?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        StoreError::io("atomically replace", path, e)
    })?;

    // Persist the directory entry too; failure here does not undo the rename.
    if let Some(parent) = path.parent()
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }

    Ok(())
}

/// Generate a temporary file path in the same directory as the target.
fn generate_temp_path(target: &Path) -> StoreResult<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target.file_name().and_then(|n| n.to_str()).ok_or_else(|| {
        StoreError::io(
            "derive temporary name for",
            target,
            io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
        )
    })?;

    Ok(parent.join(format!(".{}.tmp", filename)))
}

/// Write content to a file and sync to disk.
fn write_and_sync(path: &Path, content: &[u8]) -> StoreResult<()> {
    let mut file = File::create(path).map_err(|e| StoreError::io("create", path, e))?;

    file.write_all(content).map_err(|e| {
        let _ = fs::remove_file(path);
        StoreError::io("write", path, e)
    })?;

    file.sync_all().map_err(|e| {
        let _ = fs::remove_file(path);
        StoreError::io("sync", path, e)
    })?;

    Ok(())
}
