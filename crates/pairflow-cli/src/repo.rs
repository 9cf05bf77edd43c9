// SPDX-License-Identifier: MIT

//! Resolves the repo root a bubble command runs against. The operator may
//! invoke `pairflow` from anywhere inside the repo (including a bubble's own
//! worktree); this always walks back to the main working tree the same way
//! `git rev-parse --show-toplevel` would from the current directory.

use anyhow::{Context, Result};
use std::path::PathBuf;

pub async fn resolve(explicit: Option<&PathBuf>) -> Result<PathBuf> {
    let start = match explicit {
        Some(path) => path.clone(),
        None => std::env::current_dir().context("cannot read current directory")?,
    };
    Ok(pairflow_adapters::resolve_repo_root(&start).await?)
}
