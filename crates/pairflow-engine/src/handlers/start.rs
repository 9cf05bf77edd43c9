// SPDX-License-Identifier: MIT

use crate::adapter_errors::session_error;
use crate::context::BubbleContext;
use crate::engine::Engine;
use crate::lock_bridge::with_bubble_lock;
use pairflow_adapters::{bootstrap_worktree, session_name, SessionAdapter};
use pairflow_core::clock::Clock;
use pairflow_core::error::PairflowError;
use pairflow_core::id::BubbleId;
use pairflow_core::role::Role;
use pairflow_core::state::{ActiveTurn, Lifecycle, RoundRoleEntry};
use pairflow_storage::{read_registry, write_registry, SessionRecord};
use std::path::Path;

impl<A: SessionAdapter, C: Clock> Engine<A, C> {
    /// Bootstraps the worktree, spawns the multiplexer session, and brings
    /// the bubble from `CREATED` to `RUNNING` with the implementer holding
    /// the turn.
    pub async fn start(&self, repo_path: &Path, bubble_id: &BubbleId) -> Result<(), PairflowError> {
        let ctx = BubbleContext::load(repo_path, bubble_id)?;
        let session = self.session.clone();
        let now = self.clock.now();
        let lock_timeout = self.lock_timeout;
        let bubble_id = bubble_id.clone();

        with_bubble_lock(&ctx.paths.lock_file.clone(), lock_timeout, move || async move {
            let paths = ctx.paths;
            let config = ctx.config;

            let snapshot = pairflow_storage::read_state_snapshot(&paths.state)?
                .ok_or_else(|| PairflowError::BubbleNotFound(bubble_id.to_string()))?;
            let snapshot = crate::recovery::catch_up(&paths, &config, snapshot)?;
            if snapshot.state.state != Lifecycle::Created {
                return Err(PairflowError::InvalidBubbleState {
                    expected: "CREATED".to_string(),
                    actual: snapshot.state.state,
                });
            }

            let mut preparing = snapshot.state.clone();
            preparing.state = Lifecycle::PreparingWorkspace;
            let fingerprint = pairflow_storage::write_state_snapshot(
                &paths.state,
                Some(snapshot.fingerprint.as_str()),
                Some(Lifecycle::Created),
                &preparing,
            )?;

            bootstrap_worktree(
                &config.repo_path,
                &config.base_branch,
                &config.bubble_branch,
                &paths.worktree_dir,
            )
            .await?;

            let name = session_name(bubble_id.as_str());
            let agent_cmd = config.agents.implementer.to_string();
            session
                .spawn(&name, &paths.worktree_dir, &agent_cmd, &[])
                .await
                .map_err(session_error)?;

            pairflow_storage::with_file_lock(
                &paths.registry_lock_file,
                lock_timeout,
                pairflow_storage::lock::DEFAULT_POLL,
                || {
                    let mut registry = read_registry(&paths.sessions_registry)?;
                    registry.0.insert(
                        bubble_id.to_string(),
                        SessionRecord {
                            bubble_id: bubble_id.to_string(),
                            repo_path: paths.repo_root.clone(),
                            worktree_path: paths.worktree_dir.clone(),
                            tmux_session_name: name.clone(),
                            updated_at: now,
                        },
                    );
                    write_registry(&paths.sessions_registry, &registry)
                },
            )?;

            let mut running = preparing;
            running.state = Lifecycle::Running;
            running.active_turn = Some(ActiveTurn {
                active_agent: config.agents.implementer,
                active_since: now,
                active_role: Role::Implementer,
            });
            running.round_role_history.push(RoundRoleEntry {
                round: running.round,
                implementer: config.agents.implementer,
                reviewer: config.agents.reviewer,
                switched_at: now,
            });
            running.last_command_at = Some(now);

            pairflow_storage::write_state_snapshot(
                &paths.state,
                Some(fingerprint.as_str()),
                Some(Lifecycle::PreparingWorkspace),
                &running,
            )?;

            Ok(())
        })
        .await
    }
}
