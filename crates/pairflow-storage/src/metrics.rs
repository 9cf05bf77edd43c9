// SPDX-License-Identifier: MIT

//! Metrics emission: one append-only JSONL record per envelope recorded to
//! a bubble's transcript, written under `$PAIRFLOW_METRICS_EVENTS_ROOT` when
//! that variable is set (spec.md §6). Absence disables emission entirely —
//! this is a side channel for external dashboards/aggregators, never a
//! dependency of the engine's own behavior, so every failure here is
//! swallowed (logged at `warn`) rather than propagated to the caller.

use pairflow_core::envelope::Envelope;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

const METRICS_ENV_VAR: &str = "PAIRFLOW_METRICS_EVENTS_ROOT";

#[derive(Serialize)]
struct MetricsEvent<'a> {
    ts: chrono::DateTime<chrono::Utc>,
    bubble_id: &'a str,
    envelope_id: &'a str,
    envelope_type: String,
    round: u64,
    sender: String,
    recipient: String,
}

impl<'a> From<&'a Envelope> for MetricsEvent<'a> {
    fn from(envelope: &'a Envelope) -> Self {
        MetricsEvent {
            ts: envelope.ts,
            bubble_id: envelope.bubble_id.as_str(),
            envelope_id: envelope.id.as_str(),
            envelope_type: envelope.envelope_type.to_string(),
            round: envelope.round,
            sender: envelope.sender.to_string(),
            recipient: envelope.recipient.to_string(),
        }
    }
}

/// Appends one JSONL record for `envelope` to
/// `$PAIRFLOW_METRICS_EVENTS_ROOT/<bubble_id>.jsonl`. A no-op when the
/// variable is unset or empty. Never returns an error: a metrics sink being
/// unwritable must never fail the bubble operation that triggered it.
pub fn emit_envelope_event(envelope: &Envelope) {
    let Some(root) = metrics_root() else { return };
    let path = root.join(format!("{}.jsonl", envelope.bubble_id));
    if let Err(e) = append_event(&path, &MetricsEvent::from(envelope)) {
        tracing::warn!(error = %e, path = %path.display(), "metrics event write failed");
    }
}

fn metrics_root() -> Option<PathBuf> {
    let raw = std::env::var(METRICS_ENV_VAR).ok()?;
    if raw.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(raw))
}

fn append_event(path: &std::path::Path, event: &MetricsEvent<'_>) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let line = serde_json::to_string(event)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")?;
    file.sync_all()
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod tests;
