// SPDX-License-Identifier: MIT

use crate::context::BubbleContext;
use crate::engine::Engine;
use crate::lock_bridge::with_bubble_lock;
use crate::protocol::{new_envelope, record_envelope};
use pairflow_adapters::SessionAdapter;
use pairflow_core::clock::Clock;
use pairflow_core::envelope::{ApprovalDecisionKind, EnvelopeType, Participant, Payload};
use pairflow_core::error::PairflowError;
use pairflow_core::id::BubbleId;
use pairflow_core::state::{ActiveTurn, Lifecycle, RoundRoleEntry};
use std::path::Path;

impl<A: SessionAdapter, C: Clock> Engine<A, C> {
    /// Applies the human's `approve` / `reject` / `revise` decision from
    /// `READY_FOR_APPROVAL`:
    /// - `approve` moves to `APPROVED_FOR_COMMIT`, active turn untouched.
    /// - `reject` moves to `CANCELLED`, clearing the active turn.
    /// - `revise` bumps `round`, swaps roles back to the implementer, and
    ///   appends the new `round_role_history` entry (invariant I4) before
    ///   returning to `RUNNING`.
    pub async fn approval_decision(
        &self,
        repo_path: &Path,
        bubble_id: &BubbleId,
        decision: ApprovalDecisionKind,
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
            if state.state != Lifecycle::ReadyForApproval {
                return Err(PairflowError::InvalidBubbleState {
                    expected: "READY_FOR_APPROVAL".to_string(),
                    actual: state.state,
                });
            }

            let envelope = new_envelope(
                bubble_id.clone(),
                Participant::Human,
                Participant::Orchestrator,
                EnvelopeType::ApprovalDecision,
                state.round,
                now,
                Payload {
                    decision: Some(decision),
                    ..Payload::default()
                },
                Vec::new(),
            );
            record_envelope(&paths, &envelope)?;

            match decision {
                ApprovalDecisionKind::Approve => {
                    state.state = Lifecycle::ApprovedForCommit;
                }
                ApprovalDecisionKind::Reject => {
                    state.state = Lifecycle::Cancelled;
                    state.active_turn = None;
                }
                ApprovalDecisionKind::Revise => {
                    let new_role = pairflow_core::role::Role::Implementer;
                    let new_agent = config.agent_for(new_role);
                    state.round += 1;
                    state.active_turn = Some(ActiveTurn {
                        active_agent: new_agent,
                        active_since: now,
                        active_role: new_role,
                    });
                    state.round_role_history.push(RoundRoleEntry {
                        round: state.round,
                        implementer: config.agents.implementer,
                        reviewer: config.agents.reviewer,
                        switched_at: now,
                    });
                    state.state = Lifecycle::Running;
                }
            }
            state.last_command_at = Some(now);
            state.last_envelope_id = Some(envelope.id.clone());

            pairflow_storage::write_state_snapshot(
                &paths.state,
                Some(snapshot.fingerprint.as_str()),
                Some(Lifecycle::ReadyForApproval),
                &state,
            )?;
            Ok(())
        })
        .await
    }
}
