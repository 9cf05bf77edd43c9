// SPDX-License-Identifier: MIT

use super::*;
use std::process::Command as StdCommand;

fn git(repo: &Path, args: &[&str]) {
    let status = StdCommand::new("git")
        .arg("-C")
        .arg(repo)
        .args(args)
        .status()
        .expect("git must be available for these tests");
    assert!(status.success(), "git {args:?} failed");
}

fn init_repo(repo: &Path) {
    git(repo, &["init", "-q", "-b", "main"]);
    git(repo, &["config", "user.email", "test@example.com"]);
    git(repo, &["config", "user.name", "Test"]);
    std::fs::write(repo.join("README.md"), "hello\n").expect("write readme");
    git(repo, &["add", "."]);
    git(repo, &["commit", "-q", "-m", "initial"]);
}

#[tokio::test]
async fn bootstrap_creates_branch_and_worktree() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repo = dir.path().join("repo");
    std::fs::create_dir_all(&repo).expect("mkdir repo");
    init_repo(&repo);

    let worktree = dir.path().join("worktrees").join("b_01");
    bootstrap_worktree(&repo, "main", "bubble/b_01", &worktree)
        .await
        .expect("bootstrap");

    assert!(worktree.join("README.md").exists());
    assert!(branch_exists(&repo, "bubble/b_01").await.expect("branch check"));
}

#[tokio::test]
async fn bootstrap_is_idempotent() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repo = dir.path().join("repo");
    std::fs::create_dir_all(&repo).expect("mkdir repo");
    init_repo(&repo);

    let worktree = dir.path().join("worktrees").join("b_01");
    bootstrap_worktree(&repo, "main", "bubble/b_01", &worktree)
        .await
        .expect("first bootstrap");
    bootstrap_worktree(&repo, "main", "bubble/b_01", &worktree)
        .await
        .expect("second bootstrap must not error");
}

#[tokio::test]
async fn teardown_removes_worktree_and_branch() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repo = dir.path().join("repo");
    std::fs::create_dir_all(&repo).expect("mkdir repo");
    init_repo(&repo);

    let worktree = dir.path().join("worktrees").join("b_01");
    bootstrap_worktree(&repo, "main", "bubble/b_01", &worktree)
        .await
        .expect("bootstrap");

    teardown_worktree(&repo, &worktree, "bubble/b_01", false)
        .await
        .expect("teardown");

    assert!(!worktree.exists());
    assert!(!branch_exists(&repo, "bubble/b_01").await.expect("branch check"));
}

#[tokio::test]
async fn teardown_without_force_refuses_dirty_worktree() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repo = dir.path().join("repo");
    std::fs::create_dir_all(&repo).expect("mkdir repo");
    init_repo(&repo);

    let worktree = dir.path().join("worktrees").join("b_01");
    bootstrap_worktree(&repo, "main", "bubble/b_01", &worktree)
        .await
        .expect("bootstrap");
    std::fs::write(worktree.join("scratch.txt"), "uncommitted\n").expect("write scratch file");

    let result = teardown_worktree(&repo, &worktree, "bubble/b_01", false).await;
    assert!(matches!(result, Err(PairflowError::WorkspaceBusy)));
    assert!(worktree.exists());
}

#[tokio::test]
async fn teardown_with_force_removes_dirty_worktree() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repo = dir.path().join("repo");
    std::fs::create_dir_all(&repo).expect("mkdir repo");
    init_repo(&repo);

    let worktree = dir.path().join("worktrees").join("b_01");
    bootstrap_worktree(&repo, "main", "bubble/b_01", &worktree)
        .await
        .expect("bootstrap");
    std::fs::write(worktree.join("scratch.txt"), "uncommitted\n").expect("write scratch file");

    teardown_worktree(&repo, &worktree, "bubble/b_01", true)
        .await
        .expect("forced teardown");
    assert!(!worktree.exists());
}

#[tokio::test]
async fn commit_worktree_stages_and_commits_changes() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repo = dir.path().join("repo");
    std::fs::create_dir_all(&repo).expect("mkdir repo");
    init_repo(&repo);

    let worktree = dir.path().join("worktrees").join("b_01");
    bootstrap_worktree(&repo, "main", "bubble/b_01", &worktree)
        .await
        .expect("bootstrap");
    std::fs::write(worktree.join("change.txt"), "new content\n").expect("write change");

    commit_worktree(&worktree, "feat: add change").await.expect("commit");

    assert!(!has_external_artifacts(&worktree).await.expect("status check"));
}

#[tokio::test]
async fn resolve_repo_root_finds_toplevel_from_a_subdirectory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let repo = dir.path().join("repo");
    std::fs::create_dir_all(&repo).expect("mkdir repo");
    init_repo(&repo);

    let nested = repo.join("src").join("nested");
    std::fs::create_dir_all(&nested).expect("mkdir nested");

    let root = resolve_repo_root(&nested).await.expect("resolve");
    let expected = repo.canonicalize().expect("canonicalize");
    assert_eq!(root.canonicalize().expect("canonicalize"), expected);
}

#[tokio::test]
async fn resolve_repo_root_rejects_a_non_git_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = resolve_repo_root(dir.path()).await.unwrap_err();
    assert!(matches!(err, PairflowError::EnvironmentUnavailable(_)));
}
