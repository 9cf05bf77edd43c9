// SPDX-License-Identifier: MIT

//! Durable `state.json` storage with compare-and-swap writes.
//!
//! A write succeeds only if the fingerprint of the bytes currently on disk
//! still matches the fingerprint the caller last read. This catches two
//! writers racing on the same bubble even when the file lock around the
//! read-modify-write cycle is somehow bypassed or held too briefly; the
//! lock and the fingerprint check are independent layers, not substitutes
//! for each other.

use pairflow_core::error::PairflowError;
use pairflow_core::state::{BubbleState, Lifecycle};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// A state snapshot read from disk, paired with the fingerprint of the
/// exact bytes it was decoded from.
#[derive(Debug, Clone)]
pub struct StateSnapshot {
    pub state: BubbleState,
    pub fingerprint: String,
}

fn io_err(path: &Path, source: std::io::Error) -> PairflowError {
    PairflowError::Io { path: path.to_path_buf(), source }
}

fn fingerprint_of(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Reads `state.json`, returning `None` if the bubble has no state yet.
/// The decoded snapshot is schema-validated before it's returned — the same
/// `BubbleState::validate()` the write path runs — so a hand-edited or
/// partially-written file that parses as JSON but violates an invariant
/// (e.g. I1's active-turn triple) surfaces as `SchemaValidation` here rather
/// than being read back as a healthy snapshot.
pub fn read_state_snapshot(path: &Path) -> Result<Option<StateSnapshot>, PairflowError> {
    if !path.exists() {
        return Ok(None);
    }
    let bytes = std::fs::read(path).map_err(|e| io_err(path, e))?;
    let state: BubbleState = serde_json::from_slice(&bytes)
        .map_err(|e| PairflowError::SchemaValidation {
            issues: vec![pairflow_core::error::ValidationIssue::new(
                path.display().to_string(),
                e.to_string(),
            )],
        })?;
    state.validate()?;
    Ok(Some(StateSnapshot { state, fingerprint: fingerprint_of(&bytes) }))
}

/// Writes `new_state` to `state.json` if `expected_fingerprint` still
/// matches what's on disk (`None` means "the file must not exist yet"), and,
/// if `expected_lifecycle` is given, the on-disk `state` field still equals
/// it. Returns the fingerprint of the bytes just written.
///
/// `new_state` is schema-validated before anything is written. Writes go to
/// a temp file, `fsync`, then `rename` into place so a crash mid-write never
/// leaves a torn `state.json`.
pub fn write_state_snapshot(
    path: &Path,
    expected_fingerprint: Option<&str>,
    expected_lifecycle: Option<Lifecycle>,
    new_state: &BubbleState,
) -> Result<String, PairflowError> {
    new_state.validate()?;

    let current = read_state_snapshot(path)?;
    let current_fingerprint = current.as_ref().map(|s| s.fingerprint.as_str());
    if current_fingerprint != expected_fingerprint {
        return Err(PairflowError::StateConflict);
    }
    if let Some(expected) = expected_lifecycle {
        let matches = current.as_ref().is_some_and(|s| s.state.state == expected);
        if !matches {
            return Err(PairflowError::StateConflict);
        }
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }

    let bytes = serde_json::to_vec_pretty(new_state).map_err(|e| {
        PairflowError::SchemaValidation {
            issues: vec![pairflow_core::error::ValidationIssue::new("state", e.to_string())],
        }
    })?;

    let tmp_path = path.with_extension("json.tmp");
    {
        let mut file = File::create(&tmp_path).map_err(|e| io_err(&tmp_path, e))?;
        file.write_all(&bytes).map_err(|e| io_err(&tmp_path, e))?;
        file.sync_all().map_err(|e| io_err(&tmp_path, e))?;
    }
    std::fs::rename(&tmp_path, path).map_err(|e| io_err(path, e))?;

    Ok(fingerprint_of(&bytes))
}

#[cfg(test)]
#[path = "state_store_tests.rs"]
mod tests;
