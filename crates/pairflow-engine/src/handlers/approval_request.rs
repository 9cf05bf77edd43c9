// SPDX-License-Identifier: MIT

//! `APPROVAL_REQUEST` is inbox-only and never changes the lifecycle state by
//! itself (spec §4.I). In the common path it is emitted automatically by
//! [`Engine::converged`] in the same transaction as `CONVERGENCE`, so
//! [`build_approval_request_envelope`] is shared between that handler and
//! the standalone [`Engine::approval_request`] a caller can use to re-raise
//! the request (e.g. after the watchdog reports the human side expired).

use crate::context::BubbleContext;
use crate::engine::Engine;
use crate::lock_bridge::with_bubble_lock;
use crate::protocol::{new_envelope, record_envelope};
use chrono::{DateTime, Utc};
use pairflow_adapters::SessionAdapter;
use pairflow_core::clock::Clock;
use pairflow_core::envelope::{Envelope, EnvelopeType, Participant, Payload};
use pairflow_core::error::PairflowError;
use pairflow_core::id::BubbleId;
use pairflow_core::state::Lifecycle;
use std::path::Path;

pub(crate) fn build_approval_request_envelope(bubble_id: BubbleId, round: u64, now: DateTime<Utc>) -> Envelope {
    new_envelope(
        bubble_id,
        Participant::Orchestrator,
        Participant::Human,
        EnvelopeType::ApprovalRequest,
        round,
        now,
        Payload::default(),
        Vec::new(),
    )
}

impl<A: SessionAdapter, C: Clock> Engine<A, C> {
    /// Re-raises an `APPROVAL_REQUEST` for a bubble already sitting at
    /// `READY_FOR_APPROVAL`. Touches only `last_command_at`; the lifecycle
    /// state itself is unchanged.
    pub async fn approval_request(&self, repo_path: &Path, bubble_id: &BubbleId) -> Result<(), PairflowError> {
        let ctx = BubbleContext::load(repo_path, bubble_id)?;
        let now = self.clock.now();
        let lock_timeout = self.lock_timeout;
        let bubble_id = bubble_id.clone();

        with_bubble_lock(&ctx.paths.lock_file.clone(), lock_timeout, move || async move {
            let paths = ctx.paths;
            let config = ctx.config.clone();

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

            let envelope = build_approval_request_envelope(bubble_id.clone(), state.round, now);
            record_envelope(&paths, &envelope)?;

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
