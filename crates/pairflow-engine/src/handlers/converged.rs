// SPDX-License-Identifier: MIT

use super::approval_request::build_approval_request_envelope;
use crate::context::BubbleContext;
use crate::engine::Engine;
use crate::lock_bridge::with_bubble_lock;
use crate::protocol::{new_envelope, record_envelope};
use pairflow_adapters::SessionAdapter;
use pairflow_core::clock::Clock;
use pairflow_core::envelope::{EnvelopeType, Participant, Payload};
use pairflow_core::error::PairflowError;
use pairflow_core::id::BubbleId;
use pairflow_core::role::Role;
use pairflow_core::state::Lifecycle;
use std::path::Path;

impl<A: SessionAdapter, C: Clock> Engine<A, C> {
    /// Records the reviewer's `CONVERGENCE` and moves the bubble to
    /// `READY_FOR_APPROVAL`, auto-raising the human approval request
    /// (`APPROVAL_REQUEST`) in the same transaction — there is no
    /// meaningful gap between "the round converged" and "a human needs to
    /// sign off", so the transcript records both at once.
    pub async fn converged(
        &self,
        repo_path: &Path,
        bubble_id: &BubbleId,
        summary: Option<String>,
    ) -> Result<(), PairflowError> {
        let ctx = BubbleContext::load(repo_path, bubble_id)?;
        let now = self.clock.now();
        let lock_timeout = self.lock_timeout;
        let bubble_id = bubble_id.clone();

        with_bubble_lock(&ctx.paths.lock_file.clone(), lock_timeout, move || async move {
            let paths = ctx.paths;
            let config = ctx.config;

            let snapshot = pairflow_storage::read_state_snapshot(&paths.state)?
                .ok_or_else(|| PairflowError::BubbleNotFound(bubble_id.to_string()))?;
            let snapshot = crate::recovery::catch_up(&paths, &config, snapshot)?;
            let mut state = snapshot.state;
            if state.state != Lifecycle::Running {
                return Err(PairflowError::InvalidBubbleState {
                    expected: "RUNNING".to_string(),
                    actual: state.state,
                });
            }
            let active_turn = state
                .active_turn
                .clone()
                .ok_or_else(|| PairflowError::InvalidBubbleState {
                    expected: "RUNNING with an active turn".to_string(),
                    actual: state.state,
                })?;
            if active_turn.active_role != Role::Reviewer {
                return Err(PairflowError::InvalidBubbleState {
                    expected: "active_role=reviewer".to_string(),
                    actual: state.state,
                });
            }

            let convergence = new_envelope(
                bubble_id.clone(),
                Participant::from(active_turn.active_agent),
                Participant::Orchestrator,
                EnvelopeType::Convergence,
                state.round,
                now,
                Payload {
                    summary,
                    ..Payload::default()
                },
                Vec::new(),
            );
            record_envelope(&paths, &convergence)?;

            let approval_request = build_approval_request_envelope(bubble_id.clone(), state.round, now);
            record_envelope(&paths, &approval_request)?;

            state.state = Lifecycle::ReadyForApproval;
            state.last_command_at = Some(now);
            state.last_envelope_id = Some(approval_request.id.clone());

            pairflow_storage::write_state_snapshot(
                &paths.state,
                Some(snapshot.fingerprint.as_str()),
                Some(Lifecycle::Running),
                &state,
            )?;
            Ok(())
        })
        .await
    }
}
