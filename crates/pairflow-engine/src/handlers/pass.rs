// SPDX-License-Identifier: MIT

use crate::context::BubbleContext;
use crate::engine::Engine;
use crate::lock_bridge::with_bubble_lock;
use crate::protocol::{new_envelope, record_envelope};
use pairflow_adapters::SessionAdapter;
use pairflow_core::clock::Clock;
use pairflow_core::envelope::{EnvelopeType, Participant, Payload};
use pairflow_core::envelope::PassIntent;
use pairflow_core::error::PairflowError;
use pairflow_core::id::BubbleId;
use pairflow_core::state::{ActiveTurn, Lifecycle};
use std::path::Path;

impl<A: SessionAdapter, C: Clock> Engine<A, C> {
    /// Flips `active_role` to the other participant, updating `active_agent`
    /// per the role-swap mapping. The caller must currently hold the turn.
    pub async fn pass(
        &self,
        repo_path: &Path,
        bubble_id: &BubbleId,
        claimed_sender: Participant,
        intent: PassIntent,
        summary: Option<String>,
        refs: Vec<String>,
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
            if Participant::from(active_turn.active_agent) != claimed_sender {
                return Err(PairflowError::InvalidBubbleState {
                    expected: format!("sender to be the active agent ({})", active_turn.active_agent),
                    actual: state.state,
                });
            }

            let new_role = active_turn.active_role.swapped();
            let new_agent = config.agent_for(new_role);

            let envelope = new_envelope(
                bubble_id.clone(),
                claimed_sender,
                Participant::from(new_agent),
                EnvelopeType::Pass,
                state.round,
                now,
                Payload {
                    summary,
                    pass_intent: Some(intent),
                    ..Payload::default()
                },
                refs,
            );
            record_envelope(&paths, &envelope)?;

            state.active_turn = Some(ActiveTurn {
                active_agent: new_agent,
                active_since: now,
                active_role: new_role,
            });
            state.last_command_at = Some(now);
            state.last_envelope_id = Some(envelope.id.clone());

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
