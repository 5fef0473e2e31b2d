//! # File I/O Module
//!
//! Persists pursuits as `.pursuit` JSON files:
//! - **Atomic saves**: Write to .tmp, sync, rename to prevent corruption
//! - **File locking**: Prevent two people editing the same pursuit on a shared drive
//! - **Version validation**: Refuse files written by a newer schema
//!
//! Lock files use a `.pursuit.lock` extension holding who took the lock.
//!
//! ## Example
//!
//! ```rust,no_run
//! use pursuit_core::file_io::{save_pursuit, load_pursuit, FileLock};
//! use pursuit_core::pursuit::Pursuit;
//! use std::path::Path;
//!
//! let pursuit = Pursuit::new("Maple Street", "120 Maple St", 87_120.0);
//! let path = Path::new("maple.pursuit");
//!
//! let lock = FileLock::acquire(path, "analyst@company.com").unwrap();
//! save_pursuit(&pursuit, path).unwrap();
//! drop(lock);
//!
//! let loaded = load_pursuit(path).unwrap();
//! assert_eq!(loaded.meta.name, "Maple Street");
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::{CalcError, CalcResult};
use crate::pursuit::{Pursuit, SCHEMA_VERSION};

/// File extension for pursuit files
pub const PURSUIT_EXTENSION: &str = "pursuit";

/// Locks older than this are treated as abandoned
const STALE_LOCK_HOURS: i64 = 24;

/// Metadata written into `.pursuit.lock` files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// User identifier (email or username)
    pub user_id: String,
    /// Machine name where lock was acquired
    pub machine: String,
    /// Process ID that holds the lock
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }

    /// Whether the holder has gone away: its process is gone on this machine,
    /// or the lock is older than a day.
    pub fn is_stale(&self) -> bool {
        if hostname().as_deref() == Some(self.machine.as_str()) && !process_alive(self.pid) {
            return true;
        }
        (Utc::now() - self.locked_at).num_hours() > STALE_LOCK_HOURS
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    }
}

#[cfg(unix)]
fn process_alive(pid: u32) -> bool {
    Path::new(&format!("/proc/{pid}")).exists()
}

#[cfg(not(unix))]
fn process_alive(_pid: u32) -> bool {
    // Without a cheap liveness probe, fall back to the age check
    true
}

/// Exclusive lock on a pursuit file, released on drop.
///
/// Combines an OS-level advisory lock (via fs2) with a JSON sidecar that
/// tells other users who holds it.
pub struct FileLock {
    pursuit_path: PathBuf,
    lock_path: PathBuf,
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire an exclusive lock on a pursuit file.
    ///
    /// # Returns
    ///
    /// * `Ok(FileLock)` - Lock acquired
    /// * `Err(CalcError::FileLocked)` - Someone else holds a live lock
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> CalcResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        if let Ok(existing) = read_lock_info(&lock_path) {
            if !existing.is_stale() {
                return Err(CalcError::file_locked(
                    path.display().to_string(),
                    format!("{} ({})", existing.user_id, existing.machine),
                    existing.locked_at.to_rfc3339(),
                ));
            }
            warn!(
                path = %path.display(),
                holder = %existing.user_id,
                "taking over stale lock"
            );
        }

        let lock_err = |operation: &str, e: std::io::Error| {
            CalcError::file_error(operation, lock_path.display().to_string(), e.to_string())
        };

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(true)
            .open(&lock_path)
            .map_err(|e| lock_err("create lock", e))?;

        lock_file.try_lock_exclusive().map_err(|_| {
            CalcError::file_locked(path.display().to_string(), "another process", "unknown")
        })?;

        let lock_json = serde_json::to_string_pretty(&info)?;
        lock_file
            .write_all(lock_json.as_bytes())
            .map_err(|e| lock_err("write lock", e))?;
        lock_file.sync_all().map_err(|e| lock_err("sync lock", e))?;

        info!(path = %path.display(), user = %info.user_id, "lock acquired");
        Ok(FileLock {
            pursuit_path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Report a live lock on `path` without taking it.
    pub fn check(path: &Path) -> Option<LockInfo> {
        read_lock_info(&lock_path_for(path))
            .ok()
            .filter(|info| !info.is_stale())
    }

    pub fn pursuit_path(&self) -> &Path {
        &self.pursuit_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

fn lock_path_for(pursuit_path: &Path) -> PathBuf {
    let mut lock_path = pursuit_path.to_path_buf();
    let extension = lock_path
        .extension()
        .map(|e| format!("{}.lock", e.to_string_lossy()))
        .unwrap_or_else(|| "lock".to_string());
    lock_path.set_extension(extension);
    lock_path
}

fn read_to_string(path: &Path, operation: &str) -> CalcResult<String> {
    let mut file = File::open(path)
        .map_err(|e| CalcError::file_error(operation, path.display().to_string(), e.to_string()))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| CalcError::file_error(operation, path.display().to_string(), e.to_string()))?;
    Ok(contents)
}

fn read_lock_info(lock_path: &Path) -> CalcResult<LockInfo> {
    let contents = read_to_string(lock_path, "read lock")?;
    Ok(serde_json::from_str(&contents)?)
}

/// Save a pursuit with atomic write semantics.
///
/// Serializes to pretty JSON, writes `<path>.tmp`, syncs it, then renames it
/// over `path`. An interrupted save leaves the previous file intact.
pub fn save_pursuit(pursuit: &Pursuit, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(pursuit)?;
    let tmp_path = path.with_extension(format!("{PURSUIT_EXTENSION}.tmp"));

    let file_err = |operation: &str, p: &Path, e: std::io::Error| {
        CalcError::file_error(operation, p.display().to_string(), e.to_string())
    };

    let mut tmp_file =
        File::create(&tmp_path).map_err(|e| file_err("create temp file", &tmp_path, e))?;
    tmp_file
        .write_all(json.as_bytes())
        .map_err(|e| file_err("write temp file", &tmp_path, e))?;
    tmp_file
        .sync_all()
        .map_err(|e| file_err("sync temp file", &tmp_path, e))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        file_err("rename to final", path, e)
    })?;

    info!(
        path = %path.display(),
        pursuit = %pursuit.meta.name,
        one_pagers = pursuit.one_pager_count(),
        "pursuit saved"
    );
    Ok(())
}

/// Load a pursuit from a file.
///
/// # Returns
///
/// * `Err(CalcError::VersionMismatch)` - File written by an incompatible schema
/// * `Err(CalcError::SerializationError)` - Invalid JSON
/// * `Err(CalcError::FileError)` - I/O error
pub fn load_pursuit(path: &Path) -> CalcResult<Pursuit> {
    let contents = read_to_string(path, "read")?;
    let pursuit: Pursuit =
        serde_json::from_str(&contents).map_err(|e| CalcError::SerializationError {
            reason: format!("Invalid JSON in {}: {}", path.display(), e),
        })?;

    validate_version(&pursuit.meta.version)?;

    info!(path = %path.display(), pursuit = %pursuit.meta.name, "pursuit loaded");
    Ok(pursuit)
}

/// Load a pursuit along with any live lock held on it.
pub fn load_pursuit_with_lock_check(path: &Path) -> CalcResult<(Pursuit, Option<LockInfo>)> {
    let pursuit = load_pursuit(path)?;
    Ok((pursuit, FileLock::check(path)))
}

/// Major versions must match; within 0.x, a newer minor is rejected.
fn validate_version(file_version: &str) -> CalcResult<()> {
    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|p| p.parse().ok()).collect() };
    let file_parts = parse(file_version);
    let current_parts = parse(SCHEMA_VERSION);

    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let (Some(&file_major), Some(&current_major)) = (file_parts.first(), current_parts.first())
    else {
        return Err(mismatch());
    };
    if file_major != current_major {
        return Err(mismatch());
    }
    if current_major == 0 {
        if let (Some(file_minor), Some(current_minor)) = (file_parts.get(1), current_parts.get(1)) {
            if file_minor > current_minor {
                return Err(mismatch());
            }
        }
    }
    Ok(())
}
