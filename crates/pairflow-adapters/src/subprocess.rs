// SPDX-License-Identifier: MIT

//! Shared subprocess execution helper for the git and tmux adapters.

use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Default timeout for git worktree/branch operations.
pub const GIT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default timeout for tmux control-mode commands.
pub const TMUX_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs `cmd` with a timeout, converting expiration into a descriptive
/// error message. The child is killed when the timeout elapses (tokio's
/// `Child` drop implementation reaps it).
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, String> {
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(io_err)) => Err(format!("{description} failed: {io_err}")),
        Err(_elapsed) => Err(format!("{description} timed out after {}s", timeout.as_secs())),
    }
}
