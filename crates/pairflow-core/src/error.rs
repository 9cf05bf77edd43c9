// SPDX-License-Identifier: MIT

//! The engine's error taxonomy, extended with the ambient kinds config
//! loading needs.

use crate::state::Lifecycle;
use std::path::PathBuf;
use thiserror::Error;

/// A single schema validation failure, carrying a machine-readable path
/// (e.g. `"active_*"`, `"round_role_history[0].switched_at"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Every error the engine can raise. Handlers never swallow these, and never
/// substitute a panic in their place.
#[derive(Debug, Error)]
pub enum PairflowError {
    #[error("bubble {0} not found")]
    BubbleNotFound(String),

    #[error("could not resolve repository root: {0}")]
    RepoResolution(String),

    #[error(
        "invalid bubble state for this operation: expected {expected}, found {actual}"
    )]
    InvalidBubbleState {
        expected: String,
        actual: Lifecycle,
    },

    #[error("state write rejected: on-disk snapshot no longer matches the expected fingerprint")]
    StateConflict,

    #[error("timed out after {timeout_ms}ms waiting for lock at {path}")]
    LockTimeout { path: PathBuf, timeout_ms: u64 },

    #[error("schema validation failed: {}", issues.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    SchemaValidation { issues: Vec<ValidationIssue> },

    #[error("malformed envelope line: {0}")]
    EnvelopeParse(String),

    #[error("workspace has external artifacts (uncommitted changes or stashes); use --force")]
    WorkspaceBusy,

    #[error("{command} exited with status {exit_code:?}: {stderr}")]
    ExternalCommandFailed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("environment unavailable: {0}")]
    EnvironmentUnavailable(String),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PairflowError {
    /// Maps a `PairflowError` to a CLI exit code: `0` success (not
    /// applicable here), `1` generic failure, `2` the "confirmation
    /// required" case of `bubble delete` without `--force`.
    pub fn exit_code(&self) -> i32 {
        match self {
            PairflowError::WorkspaceBusy => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_busy_maps_to_exit_code_two() {
        assert_eq!(PairflowError::WorkspaceBusy.exit_code(), 2);
    }

    #[test]
    fn other_errors_map_to_exit_code_one() {
        assert_eq!(PairflowError::StateConflict.exit_code(), 1);
        assert_eq!(PairflowError::BubbleNotFound("b_01".into()).exit_code(), 1);
    }

    #[test]
    fn schema_validation_message_includes_paths() {
        let err = PairflowError::SchemaValidation {
            issues: vec![ValidationIssue::new("active_*", "must be all null or all set")],
        };
        assert!(err.to_string().contains("active_*"));
    }
}
