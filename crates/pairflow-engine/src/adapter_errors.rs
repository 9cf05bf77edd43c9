// SPDX-License-Identifier: MIT

//! Translates adapter-local errors to the crate-wide [`PairflowError`] at the
//! engine boundary, so callers only ever match on one error type.

use pairflow_adapters::SessionError;
use pairflow_core::error::PairflowError;

pub(crate) fn session_error(err: SessionError) -> PairflowError {
    match err {
        SessionError::NotFound(id) => {
            PairflowError::EnvironmentUnavailable(format!("multiplexer session not found: {id}"))
        }
        SessionError::SpawnFailed(msg) => PairflowError::ExternalCommandFailed {
            command: "tmux new-session".to_string(),
            exit_code: None,
            stderr: msg,
        },
        SessionError::CommandFailed(msg) => PairflowError::ExternalCommandFailed {
            command: "tmux".to_string(),
            exit_code: None,
            stderr: msg,
        },
    }
}
