// SPDX-License-Identifier: MIT

use crate::adapter_errors::session_error;
use crate::context::BubbleContext;
use crate::engine::Engine;
use crate::lock_bridge::with_bubble_lock;
use pairflow_adapters::{session_name, teardown_worktree, SessionAdapter};
use pairflow_core::clock::Clock;
use pairflow_core::error::PairflowError;
use pairflow_core::id::BubbleId;
use pairflow_storage::{read_registry, write_registry};
use std::path::Path;

impl<A: SessionAdapter, C: Clock> Engine<A, C> {
    /// Tears down a bubble's runtime footprint: multiplexer session,
    /// worktree + branch, registry entry, and the `.pairflow/bubbles/<id>`
    /// directory itself. Without `force`, refuses (returning
    /// [`PairflowError::WorkspaceBusy`], mapped to exit code 2) when the
    /// worktree has uncommitted changes or stashes the operator hasn't
    /// acknowledged losing.
    pub async fn delete(&self, repo_path: &Path, bubble_id: &BubbleId, force: bool) -> Result<(), PairflowError> {
        let ctx = BubbleContext::load(repo_path, bubble_id)?;
        let session = self.session.clone();
        let lock_timeout = self.lock_timeout;
        let bubble_id = bubble_id.clone();
        let config = ctx.config.clone();

        with_bubble_lock(&ctx.paths.lock_file.clone(), lock_timeout, move || async move {
            let paths = ctx.paths;

            teardown_worktree(&config.repo_path, &paths.worktree_dir, &config.bubble_branch, force).await?;

            let name = session_name(bubble_id.as_str());
            if session.is_alive(&name).await.map_err(session_error)? {
                session.kill(&name).await.map_err(session_error)?;
            }

            pairflow_storage::with_file_lock(
                &paths.registry_lock_file,
                lock_timeout,
                pairflow_storage::lock::DEFAULT_POLL,
                || {
                    let mut registry = read_registry(&paths.sessions_registry)?;
                    registry.0.remove(bubble_id.as_str());
                    write_registry(&paths.sessions_registry, &registry)
                },
            )?;

            if paths.bubble_dir.exists() {
                std::fs::remove_dir_all(&paths.bubble_dir).map_err(|e| PairflowError::Io {
                    path: paths.bubble_dir.clone(),
                    source: e,
                })?;
            }

            Ok(())
        })
        .await
    }
}
