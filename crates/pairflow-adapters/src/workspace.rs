// SPDX-License-Identifier: MIT

//! Git worktree lifecycle for a bubble's isolated working directory.
//!
//! Git itself is the external collaborator; this module only knows how to
//! drive it via subprocess and translate its failures into
//! [`PairflowError`]. Everything here is idempotent: calling `bootstrap`
//! twice, or `teardown` on an already-removed worktree, succeeds quietly.

use crate::subprocess::{run_with_timeout, GIT_TIMEOUT};
use pairflow_core::error::PairflowError;
use std::path::Path;
use tokio::process::Command;

fn command_failed(command: &str, output: &std::process::Output) -> PairflowError {
    PairflowError::ExternalCommandFailed {
        command: command.to_string(),
        exit_code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

async fn run_git(repo: &Path, args: &[&str], description: &str) -> Result<std::process::Output, PairflowError> {
    let mut cmd = Command::new("git");
    cmd.arg("-C").arg(repo).args(args);
    run_with_timeout(cmd, GIT_TIMEOUT, description)
        .await
        .map_err(|e| PairflowError::ExternalCommandFailed {
            command: format!("git {}", args.join(" ")),
            exit_code: None,
            stderr: e,
        })
}

async fn branch_exists(repo: &Path, branch: &str) -> Result<bool, PairflowError> {
    let output = run_git(
        repo,
        &["rev-parse", "--verify", &format!("refs/heads/{branch}")],
        "git rev-parse",
    )
    .await?;
    Ok(output.status.success())
}

fn worktree_already_present(worktree_path: &Path) -> bool {
    worktree_path.join(".git").exists()
}

/// Ensures `bubble_branch` points at the current HEAD of `base_branch` and
/// that a worktree checking it out exists at `worktree_path`. Safe to call
/// repeatedly: an existing branch or worktree is left untouched.
pub async fn bootstrap_worktree(
    repo: &Path,
    base_branch: &str,
    bubble_branch: &str,
    worktree_path: &Path,
) -> Result<(), PairflowError> {
    if !branch_exists(repo, bubble_branch).await? {
        let output = run_git(repo, &["branch", bubble_branch, base_branch], "git branch").await?;
        if !output.status.success() {
            return Err(command_failed(&format!("git branch {bubble_branch} {base_branch}"), &output));
        }
    }

    if worktree_already_present(worktree_path) {
        return Ok(());
    }

    if let Some(parent) = worktree_path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|e| PairflowError::Io {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let worktree_arg = worktree_path.to_string_lossy().to_string();
    let output = run_git(repo, &["worktree", "add", &worktree_arg, bubble_branch], "git worktree add").await?;
    if !output.status.success() {
        return Err(command_failed("git worktree add", &output));
    }
    Ok(())
}

/// True if the worktree has uncommitted changes or stash entries that
/// `teardown_worktree` would destroy without `force`.
pub async fn has_external_artifacts(worktree_path: &Path) -> Result<bool, PairflowError> {
    if !worktree_path.exists() {
        return Ok(false);
    }
    let status = run_git(worktree_path, &["status", "--porcelain"], "git status").await?;
    if !status.status.success() {
        return Err(command_failed("git status --porcelain", &status));
    }
    if !status.stdout.is_empty() {
        return Ok(true);
    }

    let stash = run_git(worktree_path, &["stash", "list"], "git stash list").await?;
    Ok(stash.status.success() && !stash.stdout.is_empty())
}

/// Removes the worktree and its branch. Refuses to proceed (returning
/// [`PairflowError::WorkspaceBusy`]) if the worktree has uncommitted
/// changes or stashes and `force` is false.
pub async fn teardown_worktree(
    repo: &Path,
    worktree_path: &Path,
    bubble_branch: &str,
    force: bool,
) -> Result<(), PairflowError> {
    if !force && has_external_artifacts(worktree_path).await? {
        return Err(PairflowError::WorkspaceBusy);
    }

    if worktree_path.exists() {
        let worktree_arg = worktree_path.to_string_lossy().to_string();
        let mut args = vec!["worktree", "remove"];
        if force {
            args.push("--force");
        }
        args.push(&worktree_arg);
        let output = run_git(repo, &args, "git worktree remove").await?;
        if !output.status.success() {
            return Err(command_failed("git worktree remove", &output));
        }
    }

    if branch_exists(repo, bubble_branch).await? {
        let output = run_git(repo, &["branch", "-D", bubble_branch], "git branch -D").await?;
        if !output.status.success() {
            return Err(command_failed(&format!("git branch -D {bubble_branch}"), &output));
        }
    }

    Ok(())
}

/// Stages and commits everything currently in the worktree. Used by the
/// `commit` handler once a bubble reaches `APPROVED_FOR_COMMIT`.
pub async fn commit_worktree(worktree_path: &Path, message: &str) -> Result<(), PairflowError> {
    let add_output = run_git(worktree_path, &["add", "-A"], "git add").await?;
    if !add_output.status.success() {
        return Err(command_failed("git add -A", &add_output));
    }

    let commit_output = run_git(worktree_path, &["commit", "-m", message], "git commit").await?;
    if !commit_output.status.success() {
        return Err(command_failed("git commit", &commit_output));
    }
    Ok(())
}

/// Resolves the git repository root containing `start_dir`, the way the CLI
/// turns "wherever the operator happens to be" into the `repo_path` every
/// handler expects. Raises [`PairflowError::EnvironmentUnavailable`] rather
/// than [`PairflowError::ExternalCommandFailed`] — a non-git directory isn't
/// a subprocess failure to diagnose, it's an environment that isn't set up.
pub async fn resolve_repo_root(start_dir: &Path) -> Result<std::path::PathBuf, PairflowError> {
    let output = run_git(start_dir, &["rev-parse", "--show-toplevel"], "git rev-parse --show-toplevel")
        .await
        .map_err(|_| {
            PairflowError::EnvironmentUnavailable(format!(
                "{} is not inside a git repository",
                start_dir.display()
            ))
        })?;
    if !output.status.success() {
        return Err(PairflowError::EnvironmentUnavailable(format!(
            "{} is not inside a git repository",
            start_dir.display()
        )));
    }
    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok(std::path::PathBuf::from(path))
}

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
