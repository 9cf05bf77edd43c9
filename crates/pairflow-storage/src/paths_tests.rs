// SPDX-License-Identifier: MIT

use super::*;
use pairflow_core::test_support::bubble_id;

#[test]
fn resolves_every_bubble_file() {
    let repo = tempfile::tempdir().expect("tempdir");
    let id = bubble_id("b_01");
    let paths = BubblePaths::resolve(repo.path(), &id).expect("resolve");

    assert_eq!(paths.config, paths.bubble_dir.join("bubble.toml"));
    assert_eq!(paths.state, paths.bubble_dir.join("state.json"));
    assert_eq!(paths.transcript, paths.bubble_dir.join("transcript.ndjson"));
    assert_eq!(paths.inbox, paths.bubble_dir.join("inbox.ndjson"));
    assert_eq!(paths.task_md, paths.artifacts_dir.join("task.md"));
    assert!(paths.lock_file.to_string_lossy().ends_with("b_01.lock"));
    assert!(paths.worktree_dir.to_string_lossy().ends_with("b_01"));
    assert!(paths
        .worktree_dir
        .to_string_lossy()
        .contains(".pairflow-worktrees"));
}

#[test]
fn ensure_dirs_creates_tree() {
    let repo = tempfile::tempdir().expect("tempdir");
    let id = bubble_id("b_01");
    let paths = BubblePaths::resolve(repo.path(), &id).expect("resolve");
    paths.ensure_dirs().expect("create dirs");

    assert!(paths.bubble_dir.is_dir());
    assert!(paths.artifacts_dir.is_dir());
    assert!(paths.messages_dir.is_dir());
    assert!(paths.locks_dir.is_dir());
    assert!(paths.runtime_dir.is_dir());
}

#[test]
fn fails_on_nonexistent_repo() {
    let missing = std::env::temp_dir().join("pairflow-does-not-exist-xyz");
    let id = bubble_id("b_01");
    assert!(BubblePaths::resolve(&missing, &id).is_err());
}
