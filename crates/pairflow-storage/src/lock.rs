// SPDX-License-Identifier: MIT

//! Process-wide mutual exclusion via exclusive file creation.
//!
//! One lock file per `(repo, bubble)`: `.pairflow/locks/<bubbleId>.lock`.
//! Acquisition polls on `EEXIST` until `timeout` elapses, then fails with
//! [`PairflowError::LockTimeout`]. The lock file is removed on every exit
//! path — success, error, or panic — by [`LockGuard`]'s `Drop` impl.

use pairflow_core::error::PairflowError;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Default poll interval between exclusive-create attempts.
pub const DEFAULT_POLL: Duration = Duration::from_millis(25);

/// Held for the lifetime of the critical section; removes the lock file on
/// drop regardless of how the critical section exited.
struct LockGuard {
    path: PathBuf,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to remove lock file on release",
                );
            }
        }
    }
}

fn try_create(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map(|_file| ())
}

fn acquire(lock_path: &Path, timeout: Duration, poll: Duration) -> Result<LockGuard, PairflowError> {
    let start = Instant::now();
    loop {
        match try_create(lock_path) {
            Ok(()) => return Ok(LockGuard { path: lock_path.to_path_buf() }),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                if start.elapsed() >= timeout {
                    return Err(PairflowError::LockTimeout {
                        path: lock_path.to_path_buf(),
                        timeout_ms: timeout.as_millis() as u64,
                    });
                }
                std::thread::sleep(poll);
            }
            Err(e) => {
                return Err(PairflowError::Io {
                    path: lock_path.to_path_buf(),
                    source: e,
                })
            }
        }
    }
}

/// Runs `task` while holding an exclusive lock at `lock_path`.
///
/// Blocks (sleeping `poll` between attempts) until the lock is acquired or
/// `timeout` elapses. The lock file is always removed before this function
/// returns or unwinds — including when `task` panics.
pub fn with_file_lock<F, T>(
    lock_path: &Path,
    timeout: Duration,
    poll: Duration,
    task: F,
) -> Result<T, PairflowError>
where
    F: FnOnce() -> Result<T, PairflowError>,
{
    let guard = acquire(lock_path, timeout, poll)?;
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(task));
    drop(guard);
    match result {
        Ok(r) => r,
        Err(payload) => std::panic::resume_unwind(payload),
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
