// SPDX-License-Identifier: MIT

//! Append-only NDJSON envelope logs: the transcript (full history, never
//! truncated) and the inbox (pending items awaiting a side's next poll).
//!
//! Every line is one envelope produced by [`Envelope::to_ndjson_line`].
//! Appends open in append mode and `sync_all` before returning so a crash
//! right after a successful append call can never lose that line.

use pairflow_core::envelope::{Envelope, EnvelopeType};
use pairflow_core::error::PairflowError;
use std::collections::VecDeque;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

fn io_err(path: &Path, source: std::io::Error) -> PairflowError {
    PairflowError::Io { path: path.to_path_buf(), source }
}

/// Appends `envelope` to the NDJSON log at `path`, creating the file (and
/// its parent directory) if it doesn't exist yet.
pub fn append_envelope(path: &Path, envelope: &Envelope) -> Result<(), PairflowError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }

    let line = envelope
        .to_ndjson_line()
        .map_err(|e| PairflowError::EnvelopeParse(e.to_string()))?;

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| io_err(path, e))?;
    file.write_all(line.as_bytes()).map_err(|e| io_err(path, e))?;
    file.sync_all().map_err(|e| io_err(path, e))?;
    Ok(())
}

/// Reads every envelope in the NDJSON log at `path`, in append order.
/// A missing file reads as empty rather than an error — nothing has been
/// written to it yet.
pub fn read_envelopes(path: &Path) -> Result<Vec<Envelope>, PairflowError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            Envelope::from_ndjson_line(line).map_err(|e| PairflowError::EnvelopeParse(e.to_string()))
        })
        .collect()
}

/// Returns the envelopes in an inbox log that have no later resolving
/// envelope of the matching kind: a `HUMAN_QUESTION` is pending until a
/// later `HUMAN_REPLY` resolves it, an `APPROVAL_REQUEST` until a later
/// `APPROVAL_DECISION`. Resolutions pair off the oldest outstanding
/// question/request first, since a bubble only ever has one open at a time.
pub fn pending_inbox_items(inbox_path: &Path) -> Result<Vec<Envelope>, PairflowError> {
    let envelopes = read_envelopes(inbox_path)?;
    let mut open_questions: VecDeque<Envelope> = VecDeque::new();
    let mut open_approvals: VecDeque<Envelope> = VecDeque::new();

    for env in envelopes {
        match env.envelope_type {
            EnvelopeType::HumanQuestion => open_questions.push_back(env),
            EnvelopeType::ApprovalRequest => open_approvals.push_back(env),
            EnvelopeType::HumanReply => {
                open_questions.pop_front();
            }
            EnvelopeType::ApprovalDecision => {
                open_approvals.pop_front();
            }
            _ => {}
        }
    }

    let mut pending: Vec<Envelope> = open_questions.into_iter().collect();
    pending.extend(open_approvals);
    Ok(pending)
}

#[cfg(test)]
#[path = "envelope_log_tests.rs"]
mod tests;
