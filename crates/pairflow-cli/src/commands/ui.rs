// SPDX-License-Identifier: MIT

//! `pairflow ui` - PairFlow ships no dashboard; the on-disk formats
//! (`state.json`, `transcript.ndjson`, `inbox.ndjson`) are the whole
//! contract a UI server needs, so this just resolves and prints their
//! paths. `bubble open` lives here too: both commands hand the terminal off
//! to something else (a dashboard process, a tmux pane) rather than
//! rendering anything themselves.

use anyhow::{bail, Result};
use clap::Args;
use pairflow_core::id::BubbleId;
use pairflow_storage::BubblePaths;
use std::path::Path;
use std::process::Command;

#[derive(Args)]
pub struct UiArgs {
    #[arg(long, value_parser = super::parse_bubble_id)]
    id: BubbleId,
}

pub fn handle(repo_path: &Path, args: UiArgs) -> Result<()> {
    let paths = BubblePaths::resolve(repo_path, &args.id)?;
    println!("state:      {}", paths.state.display());
    println!("transcript: {}", paths.transcript.display());
    println!("inbox:      {}", paths.inbox.display());
    println!("(pairflow has no bundled UI server; point one at these files)");
    Ok(())
}

/// Attaches to the bubble's tmux session, preferring `switch-client` when
/// already inside tmux (spec's `TMUX` env var rule) so the operator isn't
/// nested. Reads the session name from the runtime-session registry (the
/// authoritative record `start` wrote), falling back to the name derived
/// directly from the bubble id if the registry row is missing.
pub fn open_session(repo_path: &Path, bubble_id: &BubbleId) -> Result<()> {
    let paths = BubblePaths::resolve(repo_path, bubble_id)?;
    let registry = pairflow_storage::read_registry(&paths.sessions_registry)?;
    let session = registry
        .0
        .get(bubble_id.as_str())
        .map(|record| record.tmux_session_name.clone())
        .unwrap_or_else(|| pairflow_adapters::session_name(bubble_id.as_str()));
    let inside_tmux = std::env::var_os("TMUX").is_some_and(|v| !v.is_empty());
    let subcommand = if inside_tmux { "switch-client" } else { "attach-session" };

    let status = Command::new("tmux")
        .args([subcommand, "-t", &session])
        .status()
        .map_err(|e| anyhow::anyhow!("failed to run tmux {subcommand}: {e}"))?;

    if !status.success() {
        bail!("tmux {subcommand} -t {session} exited with {status}");
    }
    Ok(())
}
