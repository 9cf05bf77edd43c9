// SPDX-License-Identifier: MIT

//! Cross-checks the runtime-session registry against live multiplexer
//! sessions and on-disk bubble state. Per spec.md §9 Open Question 3, the
//! on-disk state snapshot is always authoritative: a disagreement is healed
//! by rewriting or removing the registry row, never by touching state.

use crate::adapter_errors::session_error;
use crate::engine::Engine;
use crate::lock_bridge::with_bubble_lock;
use pairflow_adapters::SessionAdapter;
use pairflow_core::clock::Clock;
use pairflow_core::error::PairflowError;
use pairflow_core::id::BubbleId;
use pairflow_core::state::Lifecycle;
use pairflow_storage::{read_registry, write_registry, BubblePaths};
use std::path::Path;

/// Why a registry row was judged stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaleReason {
    /// No live multiplexer session answers to this name anymore.
    SessionNotAlive,
    /// The bubble's own state snapshot has already reached a terminal
    /// lifecycle; the registry entry outlived the bubble that created it.
    BubbleTerminal(Lifecycle),
    /// The bubble directory backing this entry no longer exists.
    BubbleMissing,
}

/// One registry row reconcile found stale, paired with why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleEntry {
    pub bubble_id: String,
    pub reason: StaleReason,
}

/// The result of one `reconcile` pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub stale: Vec<StaleEntry>,
    /// True if `dry_run` was false and the registry was actually rewritten.
    pub healed: bool,
}

impl<A: SessionAdapter, C: Clock> Engine<A, C> {
    /// Compares the registry against live sessions and bubble state,
    /// reporting (and, unless `dry_run`, removing) stale rows.
    pub async fn reconcile(&self, repo_path: &Path, dry_run: bool) -> Result<ReconcileOutcome, PairflowError> {
        let repo_root = repo_path.canonicalize().map_err(|e| PairflowError::Io {
            path: repo_path.to_path_buf(),
            source: e,
        })?;
        let runtime_dir = repo_root.join(".pairflow").join("runtime");
        let sessions_registry = runtime_dir.join("sessions.json");
        let registry_lock_file = repo_root.join(".pairflow").join("locks").join("runtime-sessions.lock");

        let session = self.session.clone();
        let lock_timeout = self.lock_timeout;

        with_bubble_lock(&registry_lock_file, lock_timeout, move || async move {
            let mut registry = read_registry(&sessions_registry)?;
            let mut stale = Vec::new();

            for (id, record) in registry.0.clone() {
                let bubble_id = match BubbleId::parse(&id) {
                    Ok(id) => id,
                    Err(_) => {
                        stale.push(StaleEntry {
                            bubble_id: id.clone(),
                            reason: StaleReason::BubbleMissing,
                        });
                        continue;
                    }
                };

                let reason = if !session
                    .is_alive(&record.tmux_session_name)
                    .await
                    .map_err(session_error)?
                {
                    Some(StaleReason::SessionNotAlive)
                } else {
                    match BubblePaths::resolve(&record.repo_path, &bubble_id) {
                        Ok(paths) => match pairflow_storage::read_state_snapshot(&paths.state)? {
                            Some(snapshot) if snapshot.state.state.is_terminal() => {
                                Some(StaleReason::BubbleTerminal(snapshot.state.state))
                            }
                            Some(_) => None,
                            None => Some(StaleReason::BubbleMissing),
                        },
                        Err(_) => Some(StaleReason::BubbleMissing),
                    }
                };

                if let Some(reason) = reason {
                    stale.push(StaleEntry { bubble_id: id, reason });
                }
            }

            let healed = !dry_run && !stale.is_empty();
            if healed {
                for entry in &stale {
                    registry.0.remove(entry.bubble_id.as_str());
                }
                write_registry(&sessions_registry, &registry)?;
            }

            Ok(ReconcileOutcome { stale, healed })
        })
        .await
    }
}
