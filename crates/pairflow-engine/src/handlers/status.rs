// SPDX-License-Identifier: MIT

//! Read-only views over a bubble (spec §4.J `status`) and a repo's bubbles
//! (the supplemented `list`, SPEC_FULL.md §2). Neither takes the bubble
//! lock: both only ever read already-durable files, and a transcript append
//! racing a `status` call is, at worst, one line newer than what's reported.

use crate::context::BubbleContext;
use crate::engine::Engine;
use pairflow_adapters::SessionAdapter;
use pairflow_core::clock::Clock;
use pairflow_core::envelope::EnvelopeType;
use pairflow_core::error::PairflowError;
use pairflow_core::id::BubbleId;
use pairflow_core::state::{ActiveTurn, Lifecycle};
use pairflow_core::watchdog::WatchdogStatus;
use std::path::Path;

/// Count of each pending inbox kind (spec invariant I5).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InboxCounts {
    pub human_questions: usize,
    pub approval_requests: usize,
}

/// A compact summary of the transcript, avoiding the cost of shipping the
/// whole log to a status caller that only wants the tail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptSummary {
    pub total_messages: usize,
    pub last_message_type: Option<EnvelopeType>,
    pub last_message_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// The read-only view `bubble status` renders.
#[derive(Debug, Clone, PartialEq)]
pub struct BubbleStatusView {
    pub bubble_id: String,
    pub state: Lifecycle,
    pub round: u64,
    pub active_turn: Option<ActiveTurn>,
    pub watchdog: WatchdogStatus,
    pub inbox: InboxCounts,
    pub transcript: TranscriptSummary,
}

/// One row of `bubble list`. A bubble whose `state.json` fails schema
/// validation is reported with `state: None` rather than aborting the
/// whole listing (SPEC_FULL.md §2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BubbleListEntry {
    pub bubble_id: String,
    pub state: Option<Lifecycle>,
    pub round: Option<u64>,
    pub active_agent: Option<String>,
}

fn inbox_counts(pending: &[pairflow_core::envelope::Envelope]) -> InboxCounts {
    let mut counts = InboxCounts::default();
    for env in pending {
        match env.envelope_type {
            EnvelopeType::HumanQuestion => counts.human_questions += 1,
            EnvelopeType::ApprovalRequest => counts.approval_requests += 1,
            _ => {}
        }
    }
    counts
}

impl<A: SessionAdapter, C: Clock> Engine<A, C> {
    /// Composes the bubble's state, pending inbox, watchdog status, and a
    /// transcript summary into one view, without taking the bubble lock.
    pub fn status(&self, repo_path: &Path, bubble_id: &BubbleId) -> Result<BubbleStatusView, PairflowError> {
        let ctx = BubbleContext::load(repo_path, bubble_id)?;
        let snapshot = pairflow_storage::read_state_snapshot(&ctx.paths.state)?
            .ok_or_else(|| PairflowError::BubbleNotFound(bubble_id.to_string()))?;

        let pending = pairflow_storage::pending_inbox_items(&ctx.paths.inbox)?;
        let transcript = pairflow_storage::read_envelopes(&ctx.paths.transcript)?;
        // Reflects any envelope the transcript is ahead of state by (a
        // crash between a handler's append and its CAS write) without
        // persisting anything — status never takes the write lock.
        let state = crate::recovery::replay_state(&ctx.config, snapshot.state, &transcript)?;

        let now = self.clock.now();
        let watchdog = pairflow_core::watchdog::watchdog_status(&state, ctx.config.watchdog_timeout_minutes, now);

        let last = transcript.last();
        let summary = TranscriptSummary {
            total_messages: transcript.len(),
            last_message_type: last.map(|e| e.envelope_type),
            last_message_at: last.map(|e| e.ts),
        };

        Ok(BubbleStatusView {
            bubble_id: bubble_id.to_string(),
            state: state.state,
            round: state.round,
            active_turn: state.active_turn,
            watchdog,
            inbox: inbox_counts(&pending),
            transcript: summary,
        })
    }

    /// Enumerates every bubble under `repo_path`'s `.pairflow/bubbles/`,
    /// sorted by id. A bubble directory without a readable config is
    /// skipped (it is mid-`create` or mid-`delete`); one with a config but
    /// an unreadable/invalid `state.json` is reported with `state: None`.
    pub fn list(&self, repo_path: &Path) -> Result<Vec<BubbleListEntry>, PairflowError> {
        let repo_root = repo_path.canonicalize().map_err(|e| PairflowError::Io {
            path: repo_path.to_path_buf(),
            source: e,
        })?;
        let bubbles_dir = repo_root.join(".pairflow").join("bubbles");
        if !bubbles_dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids: Vec<String> = std::fs::read_dir(&bubbles_dir)
            .map_err(|e| PairflowError::Io {
                path: bubbles_dir.clone(),
                source: e,
            })?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_dir())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        ids.sort();

        let mut rows = Vec::with_capacity(ids.len());
        for id in ids {
            let Ok(bubble_id) = BubbleId::parse(&id) else {
                continue;
            };
            let Ok(ctx) = BubbleContext::load(&repo_root, &bubble_id) else {
                continue;
            };
            let snapshot = pairflow_storage::read_state_snapshot(&ctx.paths.state);
            let (state, round, active_agent) = match snapshot {
                Ok(Some(snapshot)) => {
                    let transcript = pairflow_storage::read_envelopes(&ctx.paths.transcript).unwrap_or_default();
                    match crate::recovery::replay_state(&ctx.config, snapshot.state, &transcript) {
                        Ok(reconciled) => (
                            Some(reconciled.state),
                            Some(reconciled.round),
                            reconciled.active_turn.map(|t| t.active_agent.to_string()),
                        ),
                        Err(_) => (None, None, None),
                    }
                }
                Ok(None) | Err(_) => (None, None, None),
            };
            rows.push(BubbleListEntry {
                bubble_id: id,
                state,
                round,
                active_agent,
            });
        }
        Ok(rows)
    }
}
