// SPDX-License-Identifier: MIT

//! Multiplexer session adapters: spawn and talk to the terminal pane each
//! agent runs inside.

mod tmux;

pub use tmux::TmuxAdapter;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeSessionAdapter, SessionCall};

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not found: {0}")]
    NotFound(String),
    #[error("spawn failed: {0}")]
    SpawnFailed(String),
    #[error("command failed: {0}")]
    CommandFailed(String),
}

/// The session name a bubble's multiplexer pane is known by.
pub fn session_name(bubble_id: &str) -> String {
    format!("pf-{bubble_id}")
}

#[async_trait]
pub trait SessionAdapter: Send + Sync + 'static {
    /// Spawns a new session named `name` running `cmd` in `cwd`.
    async fn spawn(
        &self,
        name: &str,
        cwd: &Path,
        cmd: &str,
        env: &[(String, String)],
    ) -> Result<String, SessionError>;

    /// Sends literal text to a session (no key-name interpretation).
    async fn send_literal(&self, id: &str, text: &str) -> Result<(), SessionError>;

    /// Sends the Enter key to a session.
    async fn send_enter(&self, id: &str) -> Result<(), SessionError>;

    /// Kills a session. A session that's already gone is not an error.
    async fn kill(&self, id: &str) -> Result<(), SessionError>;

    /// True iff a session by this name currently exists.
    async fn is_alive(&self, id: &str) -> Result<bool, SessionError>;

    /// Captures the last `lines` lines of the session's pane.
    async fn capture_output(&self, id: &str, lines: u32) -> Result<String, SessionError>;
}
