// SPDX-License-Identifier: MIT

//! Shared envelope plumbing used by every handler: building a well-formed
//! [`Envelope`] and appending it to the right log(s).

use chrono::{DateTime, Utc};
use pairflow_core::envelope::{Envelope, EnvelopeType, Participant, Payload};
use pairflow_core::error::PairflowError;
use pairflow_core::id::BubbleId;
use pairflow_storage::BubblePaths;

/// Builds an envelope with a fresh id, leaving `payload`/`refs` to the caller.
pub(crate) fn new_envelope(
    bubble_id: BubbleId,
    sender: Participant,
    recipient: Participant,
    envelope_type: EnvelopeType,
    round: u64,
    ts: DateTime<Utc>,
    payload: Payload,
    refs: Vec<String>,
) -> Envelope {
    Envelope {
        id: uuid::Uuid::new_v4().to_string(),
        ts,
        bubble_id,
        sender,
        recipient,
        envelope_type,
        round,
        payload,
        refs,
    }
}

/// Inbox-tracked envelope types additionally land in `inbox.ndjson`, where
/// `pending_inbox_items` FIFO-pairs HUMAN_QUESTION/HUMAN_REPLY and
/// APPROVAL_REQUEST/APPROVAL_DECISION.
fn is_inbox_tracked(envelope_type: EnvelopeType) -> bool {
    matches!(
        envelope_type,
        EnvelopeType::HumanQuestion
            | EnvelopeType::HumanReply
            | EnvelopeType::ApprovalRequest
            | EnvelopeType::ApprovalDecision
    )
}

/// Appends `envelope` to the transcript, and to the inbox too when its type
/// is inbox-tracked.
pub(crate) fn record_envelope(paths: &BubblePaths, envelope: &Envelope) -> Result<(), PairflowError> {
    pairflow_storage::append_envelope(&paths.transcript, envelope)?;
    if is_inbox_tracked(envelope.envelope_type) {
        pairflow_storage::append_envelope(&paths.inbox, envelope)?;
    }
    pairflow_storage::emit_envelope_event(envelope);
    Ok(())
}
