// SPDX-License-Identifier: MIT

//! Replays the gap spec.md §5 "Cancellation" and §8's idempotence property
//! describe: a process killed between a handler's transcript append and its
//! CAS write leaves `state.json` one (or more) envelopes behind the
//! transcript. Every handler calls [`catch_up`] right after reading its
//! snapshot, before checking any precondition, so a stale read never causes
//! a legitimate trailing envelope to be silently re-applied a second time
//! (e.g. a second `PASS` flipping the role back) instead of being recovered.
//!
//! [`apply_envelope_effect`] mirrors each handler's own post-effect exactly
//! — it is not a second implementation of the protocol, just the same
//! transitions expressed as a function of "old state + the envelope that
//! already landed" instead of "old state + the caller's fresh arguments".

use pairflow_core::config::BubbleConfig;
use pairflow_core::envelope::{ApprovalDecisionKind, Envelope, EnvelopeType};
use pairflow_core::error::PairflowError;
use pairflow_core::role::Role;
use pairflow_core::state::{ActiveTurn, BubbleState, Lifecycle, RoundRoleEntry};
use pairflow_storage::{BubblePaths, StateSnapshot};

/// Applies one envelope's state effect, mirroring the handler that would
/// normally have produced it. `TASK` and `DONE_PACKAGE`'s genesis/terminal
/// framing are handled by `create`/`commit` themselves; every other type's
/// effect is exactly what its handler already does after `record_envelope`.
fn apply_envelope_effect(state: &mut BubbleState, config: &BubbleConfig, envelope: &Envelope) -> Result<(), PairflowError> {
    match envelope.envelope_type {
        EnvelopeType::Task => {}
        EnvelopeType::Pass => {
            let active = state.active_turn.clone().ok_or_else(|| PairflowError::InvalidBubbleState {
                expected: "an active turn to replay PASS against".to_string(),
                actual: state.state,
            })?;
            let new_role = active.active_role.swapped();
            state.active_turn = Some(ActiveTurn {
                active_agent: config.agent_for(new_role),
                active_since: envelope.ts,
                active_role: new_role,
            });
        }
        EnvelopeType::HumanQuestion => {
            state.state = Lifecycle::WaitingHuman;
        }
        EnvelopeType::HumanReply => {
            state.state = Lifecycle::Running;
        }
        EnvelopeType::Convergence => {
            state.state = Lifecycle::ReadyForApproval;
        }
        EnvelopeType::ApprovalRequest => {}
        EnvelopeType::ApprovalDecision => match envelope.payload.decision {
            Some(ApprovalDecisionKind::Approve) => {
                state.state = Lifecycle::ApprovedForCommit;
            }
            Some(ApprovalDecisionKind::Reject) => {
                state.state = Lifecycle::Cancelled;
                state.active_turn = None;
            }
            Some(ApprovalDecisionKind::Revise) => {
                let new_role = Role::Implementer;
                state.round += 1;
                state.active_turn = Some(ActiveTurn {
                    active_agent: config.agent_for(new_role),
                    active_since: envelope.ts,
                    active_role: new_role,
                });
                state.round_role_history.push(RoundRoleEntry {
                    round: state.round,
                    implementer: config.agents.implementer,
                    reviewer: config.agents.reviewer,
                    switched_at: envelope.ts,
                });
                state.state = Lifecycle::Running;
            }
            None => {
                return Err(PairflowError::EnvelopeParse(
                    "APPROVAL_DECISION envelope missing payload.decision".to_string(),
                ))
            }
        },
        EnvelopeType::DonePackage => {
            state.state = Lifecycle::Done;
            state.active_turn = None;
        }
    }
    state.last_command_at = Some(envelope.ts);
    state.last_envelope_id = Some(envelope.id.clone());
    Ok(())
}

/// Returns `state` with every transcript envelope after `last_envelope_id`
/// replayed onto it, in transcript order. Pure: does not touch disk. Used
/// directly by the read-only `status`/`list` views, which must reflect the
/// effective state without persisting anything.
pub(crate) fn replay_state(
    config: &BubbleConfig,
    mut state: BubbleState,
    transcript: &[Envelope],
) -> Result<BubbleState, PairflowError> {
    let start = match &state.last_envelope_id {
        Some(id) => transcript.iter().position(|e| &e.id == id).map_or(0, |i| i + 1),
        None => 0,
    };
    for envelope in &transcript[start..] {
        apply_envelope_effect(&mut state, config, envelope)?;
    }
    Ok(state)
}

/// Reconciles a freshly-read snapshot against the transcript and, if it was
/// behind, persists the caught-up state under the fingerprint the caller
/// just read (the normal CAS guard, so a genuinely concurrent writer still
/// loses the race rather than being silently overwritten). Every mutating
/// handler calls this immediately after `read_state_snapshot`, before
/// checking its own precondition — the precondition must see reality, not a
/// stale pre-crash snapshot.
pub(crate) fn catch_up(paths: &BubblePaths, config: &BubbleConfig, snapshot: StateSnapshot) -> Result<StateSnapshot, PairflowError> {
    let transcript = pairflow_storage::read_envelopes(&paths.transcript)?;
    let reconciled = replay_state(config, snapshot.state.clone(), &transcript)?;
    if reconciled == snapshot.state {
        return Ok(snapshot);
    }
    let fingerprint = pairflow_storage::write_state_snapshot(&paths.state, Some(snapshot.fingerprint.as_str()), None, &reconciled)?;
    Ok(StateSnapshot { state: reconciled, fingerprint })
}

#[cfg(test)]
#[path = "recovery_tests.rs"]
mod tests;
