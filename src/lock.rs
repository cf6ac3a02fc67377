//! Lock manager
//!
//! Scoped, timeout-bounded mutual exclusion over a named shared resource,
//! usable by any number of independent processes. Built on OS advisory file
//! locks: the guard releases on every exit path via `Drop`, and a crashed
//! holder's lock is released by the OS when its descriptor closes.
//!
//! Stage store moves rely on rename atomicity and never take a lock; the
//! manager exists for resources without such a natural atomic primitive,
//! chiefly the shared status artifact.

use std::fs;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use fs2::FileExt;
use thiserror::Error;

use crate::paths::VaultLayout;

/// Poll interval while waiting for a contended lock.
pub const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Errors from lock operations
#[derive(Debug, Error)]
pub enum LockError {
    /// The resource stayed contended past the deadline. The caller may
    /// retry with backoff.
    #[error("timed out acquiring lock {name:?} after {waited_ms}ms")]
    Timeout {
        /// Lock name
        name: String,
        /// How long we waited, in milliseconds
        waited_ms: u64,
    },

    /// Underlying lock file failure
    #[error("lock error: {context}: {source}")]
    Io {
        /// What was being attempted
        context: String,
        /// Underlying I/O error
        source: io::Error,
    },
}

/// An exclusive-access grant over a named resource.
///
/// Held for the lifetime of the guard; dropping it releases the OS lock on
/// every exit path, normal or exceptional.
#[derive(Debug)]
pub struct LockGuard {
    name: String,
    file: File,
}

impl LockGuard {
    /// The name of the held lock.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(err) = FileExt::unlock(&self.file) {
            log::warn!("failed to release lock {:?}: {err}", self.name);
        }
    }
}

/// Hands out named exclusive locks backed by files under the vault's lock
/// directory
#[derive(Debug, Clone)]
pub struct LockManager {
    dir: PathBuf,
}

impl LockManager {
    /// Build a manager over `layout`'s lock directory.
    #[must_use]
    pub fn new(layout: &VaultLayout) -> Self {
        Self {
            dir: layout.locks_dir(),
        }
    }

    /// Attempt to acquire `name` without blocking. `None` means another
    /// holder currently owns it.
    pub fn try_acquire(&self, name: &str) -> Result<Option<LockGuard>, LockError> {
        fs::create_dir_all(&self.dir).map_err(|e| LockError::Io {
            context: "creating lock directory".to_string(),
            source: e,
        })?;

        let path = self.dir.join(format!("{name}.lock"));
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(|e| LockError::Io {
                context: format!("opening lock file {}", path.display()),
                source: e,
            })?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(LockGuard {
                name: name.to_string(),
                file,
            })),
            Err(e)
                if e.kind() == io::ErrorKind::WouldBlock
                    || e.raw_os_error() == fs2::lock_contended_error().raw_os_error() =>
            {
                Ok(None)
            },
            Err(e) => Err(LockError::Io {
                context: format!("locking {name}"),
                source: e,
            }),
        }
    }

    /// Acquire `name`, blocking up to `timeout`.
    ///
    /// Two callers racing for the same name never both proceed: the loser
    /// polls until the holder releases or fails with `Timeout` past the
    /// deadline.
    pub fn acquire(&self, name: &str, timeout: Duration) -> Result<LockGuard, LockError> {
        let start = Instant::now();
        loop {
            if let Some(guard) = self.try_acquire(name)? {
                return Ok(guard);
            }
            let elapsed = start.elapsed();
            if elapsed >= timeout {
                return Err(LockError::Timeout {
                    name: name.to_string(),
                    waited_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                });
            }
            std::thread::sleep(LOCK_POLL_INTERVAL.min(timeout - elapsed));
        }
    }
}
