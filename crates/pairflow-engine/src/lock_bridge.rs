// SPDX-License-Identifier: MIT

//! Bridges the synchronous, blocking bubble lock into async handler code.
//!
//! `pairflow_storage::with_file_lock` is a blocking call by design (the
//! workload is I/O-bound and latency-tolerant). Handlers need to run async
//! git/tmux subprocesses while holding it, so the whole critical section is
//! moved to a blocking-pool thread and driven to completion there with a
//! borrowed runtime handle, the same way the adapter pack offloads a
//! blocking FFI call to avoid stalling the async executor.

use pairflow_core::error::PairflowError;
use std::future::Future;
use std::path::Path;
use std::time::Duration;

pub(crate) async fn with_bubble_lock<F, Fut, T>(
    lock_path: &Path,
    timeout: Duration,
    task: F,
) -> Result<T, PairflowError>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, PairflowError>> + Send,
    T: Send + 'static,
{
    let lock_path = lock_path.to_path_buf();
    let handle = tokio::runtime::Handle::current();
    let join_result = tokio::task::spawn_blocking(move || {
        pairflow_storage::with_file_lock(
            &lock_path,
            timeout,
            pairflow_storage::lock::DEFAULT_POLL,
            || handle.block_on(task()),
        )
    })
    .await;

    match join_result {
        Ok(inner) => inner,
        Err(join_error) => Err(PairflowError::EnvironmentUnavailable(format!(
            "lock task did not complete: {join_error}"
        ))),
    }
}
