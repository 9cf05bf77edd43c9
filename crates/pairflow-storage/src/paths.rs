// SPDX-License-Identifier: MIT

//! Path layout: every file the engine touches for a given
//! `(repoPath, bubbleId)`, computed once so the rest of the engine never
//! hand-builds a path. All writes are confined to the paths returned here.

use pairflow_core::error::PairflowError;
use pairflow_core::id::BubbleId;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BubblePaths {
    pub repo_root: PathBuf,
    pub pairflow_dir: PathBuf,
    pub bubble_dir: PathBuf,
    pub config: PathBuf,
    pub state: PathBuf,
    pub transcript: PathBuf,
    pub inbox: PathBuf,
    pub artifacts_dir: PathBuf,
    pub task_md: PathBuf,
    pub messages_dir: PathBuf,
    pub locks_dir: PathBuf,
    pub lock_file: PathBuf,
    pub runtime_dir: PathBuf,
    pub sessions_registry: PathBuf,
    pub registry_lock_file: PathBuf,
    pub worktree_dir: PathBuf,
}

impl BubblePaths {
    /// Resolves every path for `bubbleId` under `repoPath`. `repoPath` is
    /// canonicalized first: symlinks are followed so two invocations against
    /// the same repo via different symlinks land on the same `.pairflow`
    /// directory.
    pub fn resolve(repo_path: &Path, bubble_id: &BubbleId) -> Result<Self, PairflowError> {
        let repo_root = repo_path.canonicalize().map_err(|e| PairflowError::Io {
            path: repo_path.to_path_buf(),
            source: e,
        })?;

        let pairflow_dir = repo_root.join(".pairflow");
        let bubbles_dir = pairflow_dir.join("bubbles");
        let bubble_dir = bubbles_dir.join(bubble_id.as_str());
        let artifacts_dir = bubble_dir.join("artifacts");
        let locks_dir = pairflow_dir.join("locks");
        let runtime_dir = pairflow_dir.join("runtime");

        let repo_parent = repo_root
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| repo_root.clone());
        let repo_name = repo_root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "repo".to_string());
        let worktree_dir = repo_parent
            .join(".pairflow-worktrees")
            .join(repo_name)
            .join(bubble_id.as_str());

        Ok(Self {
            config: bubble_dir.join("bubble.toml"),
            state: bubble_dir.join("state.json"),
            transcript: bubble_dir.join("transcript.ndjson"),
            inbox: bubble_dir.join("inbox.ndjson"),
            task_md: artifacts_dir.join("task.md"),
            messages_dir: artifacts_dir.join("messages"),
            lock_file: locks_dir.join(format!("{}.lock", bubble_id.as_str())),
            sessions_registry: runtime_dir.join("sessions.json"),
            registry_lock_file: locks_dir.join("runtime-sessions.lock"),
            artifacts_dir,
            bubble_dir,
            locks_dir,
            runtime_dir,
            pairflow_dir,
            repo_root,
            worktree_dir,
        })
    }

    /// Creates every directory this bubble needs (idempotent).
    pub fn ensure_dirs(&self) -> Result<(), PairflowError> {
        for dir in [
            &self.pairflow_dir,
            &self.bubble_dir,
            &self.artifacts_dir,
            &self.messages_dir,
            &self.locks_dir,
            &self.runtime_dir,
        ] {
            std::fs::create_dir_all(dir).map_err(|e| PairflowError::Io {
                path: dir.clone(),
                source: e,
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
