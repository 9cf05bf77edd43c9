// SPDX-License-Identifier: MIT

//! The `commit` handler. Normally gated behind `APPROVED_FOR_COMMIT`; when
//! `bubble.toml` sets `commit_requires_approval = false` (spec.md §9 Open
//! Question 2) it additionally accepts a reviewer's `commit` straight out of
//! `RUNNING`, synthesizing the `CONVERGENCE` / `APPROVAL_REQUEST` /
//! `APPROVAL_DECISION(approve)` envelopes it skipped so the transcript stays
//! a complete causal record (invariant I2 still holds: round never
//! decreases, sequence numbers still strictly increase).

use super::approval_request::build_approval_request_envelope;
use crate::context::BubbleContext;
use crate::engine::Engine;
use crate::lock_bridge::with_bubble_lock;
use crate::protocol::{new_envelope, record_envelope};
use pairflow_adapters::{commit_worktree, SessionAdapter};
use pairflow_core::clock::Clock;
use pairflow_core::envelope::{ApprovalDecisionKind, EnvelopeType, Participant, Payload};
use pairflow_core::error::PairflowError;
use pairflow_core::id::BubbleId;
use pairflow_core::role::Role;
use pairflow_core::state::Lifecycle;
use std::path::Path;

impl<A: SessionAdapter, C: Clock> Engine<A, C> {
    pub async fn commit(
        &self,
        repo_path: &Path,
        bubble_id: &BubbleId,
        message: &str,
        refs: Vec<String>,
    ) -> Result<(), PairflowError> {
        let ctx = BubbleContext::load(repo_path, bubble_id)?;
        let now = self.clock.now();
        let lock_timeout = self.lock_timeout;
        let bubble_id = bubble_id.clone();
        let message = message.to_string();

        with_bubble_lock(&ctx.paths.lock_file.clone(), lock_timeout, move || async move {
            let paths = ctx.paths;
            let config = ctx.config;

            let snapshot = pairflow_storage::read_state_snapshot(&paths.state)?
                .ok_or_else(|| PairflowError::BubbleNotFound(bubble_id.to_string()))?;
            let snapshot = crate::recovery::catch_up(&paths, &config, snapshot)?;
            let mut state = snapshot.state;
            let expected_lifecycle = state.state;

            let skips_gate = !config.commit_requires_approval
                && state.state == Lifecycle::Running
                && state
                    .active_turn
                    .as_ref()
                    .is_some_and(|t| t.active_role == Role::Reviewer);

            if state.state != Lifecycle::ApprovedForCommit && !skips_gate {
                return Err(PairflowError::InvalidBubbleState {
                    expected: "APPROVED_FOR_COMMIT".to_string(),
                    actual: state.state,
                });
            }

            if skips_gate {
                let active_turn = state.active_turn.clone().ok_or_else(|| {
                    PairflowError::InvalidBubbleState {
                        expected: "active_turn present".to_string(),
                        actual: state.state,
                    }
                })?;
                let convergence = new_envelope(
                    bubble_id.clone(),
                    Participant::from(active_turn.active_agent),
                    Participant::Orchestrator,
                    EnvelopeType::Convergence,
                    state.round,
                    now,
                    Payload {
                        summary: Some("auto-converged: commit_requires_approval is disabled".to_string()),
                        ..Payload::default()
                    },
                    Vec::new(),
                );
                record_envelope(&paths, &convergence)?;

                let approval_request = build_approval_request_envelope(bubble_id.clone(), state.round, now);
                record_envelope(&paths, &approval_request)?;

                let approval_decision = new_envelope(
                    bubble_id.clone(),
                    Participant::Orchestrator,
                    Participant::Orchestrator,
                    EnvelopeType::ApprovalDecision,
                    state.round,
                    now,
                    Payload {
                        decision: Some(ApprovalDecisionKind::Approve),
                        ..Payload::default()
                    },
                    Vec::new(),
                );
                record_envelope(&paths, &approval_decision)?;

                state.state = Lifecycle::ApprovedForCommit;
                state.last_envelope_id = Some(approval_decision.id.clone());
            }

            commit_worktree(&paths.worktree_dir, &message).await?;

            state.last_command_at = Some(now);
            let committed_fingerprint = pairflow_storage::write_state_snapshot(
                &paths.state,
                Some(snapshot.fingerprint.as_str()),
                Some(expected_lifecycle),
                &{
                    let mut committed = state.clone();
                    committed.state = Lifecycle::Committed;
                    committed
                },
            )?;

            let done_package = new_envelope(
                bubble_id.clone(),
                Participant::Orchestrator,
                Participant::Human,
                EnvelopeType::DonePackage,
                state.round,
                now,
                Payload {
                    summary: Some(message),
                    ..Payload::default()
                },
                refs,
            );
            record_envelope(&paths, &done_package)?;

            state.state = Lifecycle::Done;
            state.active_turn = None;
            state.last_envelope_id = Some(done_package.id.clone());
            pairflow_storage::write_state_snapshot(
                &paths.state,
                Some(committed_fingerprint.as_str()),
                Some(Lifecycle::Committed),
                &state,
            )?;
            Ok(())
        })
        .await
    }
}
