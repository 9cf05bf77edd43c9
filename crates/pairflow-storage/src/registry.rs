// SPDX-License-Identifier: MIT

//! The runtime-session registry (`runtime/sessions.json`): a map from
//! bubble id to the live multiplexer session backing it. Mutations happen
//! under the dedicated registry lock (`registry_lock_file`), never the
//! per-bubble lock — registering a session and mutating bubble state are
//! independent operations.

use chrono::{DateTime, Utc};
use pairflow_core::error::PairflowError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// One live session this registry tracks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub bubble_id: String,
    pub repo_path: std::path::PathBuf,
    pub worktree_path: std::path::PathBuf,
    pub tmux_session_name: String,
    pub updated_at: DateTime<Utc>,
}

/// The full registry: `bubbleId -> SessionRecord`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionRegistry(pub BTreeMap<String, SessionRecord>);

fn io_err(path: &Path, source: std::io::Error) -> PairflowError {
    PairflowError::Io { path: path.to_path_buf(), source }
}

/// Reads the registry, returning an empty one if it doesn't exist yet.
pub fn read_registry(path: &Path) -> Result<SessionRegistry, PairflowError> {
    if !path.exists() {
        return Ok(SessionRegistry::default());
    }
    let bytes = std::fs::read(path).map_err(|e| io_err(path, e))?;
    serde_json::from_slice(&bytes).map_err(|e| PairflowError::SchemaValidation {
        issues: vec![pairflow_core::error::ValidationIssue::new(
            path.display().to_string(),
            e.to_string(),
        )],
    })
}

/// Writes the registry atomically (temp file + fsync + rename).
pub fn write_registry(path: &Path, registry: &SessionRegistry) -> Result<(), PairflowError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    let bytes = serde_json::to_vec_pretty(registry).map_err(|e| PairflowError::SchemaValidation {
        issues: vec![pairflow_core::error::ValidationIssue::new("registry", e.to_string())],
    })?;

    let tmp_path = path.with_extension("json.tmp");
    {
        let mut file = File::create(&tmp_path).map_err(|e| io_err(&tmp_path, e))?;
        file.write_all(&bytes).map_err(|e| io_err(&tmp_path, e))?;
        file.sync_all().map_err(|e| io_err(&tmp_path, e))?;
    }
    std::fs::rename(&tmp_path, path).map_err(|e| io_err(path, e))?;
    Ok(())
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
