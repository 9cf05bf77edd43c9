// SPDX-License-Identifier: MIT

//! Black-box lifecycle tests driving [`pairflow_engine::Engine`] against a
//! real git repo (the same convention `pairflow-adapters`' workspace tests
//! use) and a [`FakeSessionAdapter`] standing in for tmux. These exercise
//! spec.md §8's end-to-end scenarios 1-4.

use chrono::{DateTime, Utc};
use pairflow_adapters::FakeSessionAdapter;
use pairflow_core::config::{AgentKind, AgentsConfig};
use pairflow_core::envelope::{ApprovalDecisionKind, EnvelopeType, Participant, PassIntent};
use pairflow_core::error::PairflowError;
use pairflow_core::id::BubbleId;
use pairflow_core::state::Lifecycle;
use pairflow_core::FakeClock;
use pairflow_engine::Engine;
use std::path::{Path, PathBuf};
use std::process::Command;

fn t0() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
        .expect("valid")
        .with_timezone(&Utc)
}

fn git(repo: &Path, args: &[&str]) {
    let status = Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(args)
        .status()
        .expect("git must be available for these tests");
    assert!(status.success(), "git {args:?} failed");
}

fn init_repo() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let repo = dir.path().join("repo");
    std::fs::create_dir_all(&repo).expect("mkdir repo");
    git(&repo, &["init", "-q", "-b", "main"]);
    git(&repo, &["config", "user.email", "test@example.com"]);
    git(&repo, &["config", "user.name", "Test"]);
    std::fs::write(repo.join("README.md"), "hello\n").expect("write readme");
    git(&repo, &["add", "."]);
    git(&repo, &["commit", "-q", "-m", "initial"]);
    (dir, repo)
}

fn agents() -> AgentsConfig {
    AgentsConfig {
        implementer: AgentKind::Codex,
        reviewer: AgentKind::Claude,
    }
}

fn engine() -> Engine<FakeSessionAdapter, FakeClock> {
    Engine::new(FakeSessionAdapter::new(), FakeClock::new(t0()))
}

#[tokio::test]
async fn create_start_pass_converged_approve_commit_done() {
    let (_dir, repo) = init_repo();
    let engine = engine();
    let id = BubbleId::parse("b_01").expect("valid id");

    engine
        .create(&repo, id.clone(), "main", agents(), "Add X")
        .await
        .expect("create");
    engine.start(&repo, &id).await.expect("start");

    engine
        .pass(&repo, &id, Participant::Codex, PassIntent::Review, Some("ready".to_string()), Vec::new())
        .await
        .expect("pass");

    let status = engine.status(&repo, &id).expect("status after pass");
    assert_eq!(status.state, Lifecycle::Running);
    assert_eq!(
        status.active_turn.as_ref().map(|t| t.active_role),
        Some(pairflow_core::role::Role::Reviewer)
    );
    assert_eq!(status.active_turn.as_ref().map(|t| t.active_agent), Some(AgentKind::Claude));

    engine
        .converged(&repo, &id, Some("ok".to_string()))
        .await
        .expect("converged");
    assert_eq!(engine.status(&repo, &id).expect("status").state, Lifecycle::ReadyForApproval);

    engine
        .approval_decision(&repo, &id, ApprovalDecisionKind::Approve)
        .await
        .expect("approve");
    assert_eq!(
        engine.status(&repo, &id).expect("status").state,
        Lifecycle::ApprovedForCommit
    );

    engine
        .commit(&repo, &id, "feat: X", Vec::new())
        .await
        .expect("commit");

    let status = engine.status(&repo, &id).expect("final status");
    assert_eq!(status.state, Lifecycle::Done);
    assert_eq!(status.round, 1);
    assert_eq!(status.transcript.total_messages, 6);
    assert_eq!(status.transcript.last_message_type, Some(EnvelopeType::DonePackage));
}

#[tokio::test]
async fn ask_human_reply_and_resume() {
    let (_dir, repo) = init_repo();
    let engine = engine();
    let id = BubbleId::parse("b_02").expect("valid id");

    engine
        .create(&repo, id.clone(), "main", agents(), "Add Y")
        .await
        .expect("create");
    engine.start(&repo, &id).await.expect("start");

    engine
        .ask_human(&repo, &id, Participant::Codex, "choose?", Vec::new())
        .await
        .expect("ask-human");
    let status = engine.status(&repo, &id).expect("status");
    assert_eq!(status.state, Lifecycle::WaitingHuman);
    assert_eq!(status.inbox.human_questions, 1);

    engine.human_reply(&repo, &id, "go").await.expect("reply");
    let status = engine.status(&repo, &id).expect("status after reply");
    assert_eq!(status.state, Lifecycle::Running);
    assert_eq!(status.inbox.human_questions, 0);

    engine
        .ask_human(&repo, &id, Participant::Codex, "again?", Vec::new())
        .await
        .expect("ask-human again");
    engine.resume(&repo, &id).await.expect("resume");
    let transcript = pairflow_storage::read_envelopes(&pairflow_storage::BubblePaths::resolve(&repo, &id).unwrap().transcript).unwrap();
    let last_reply = transcript
        .iter()
        .rev()
        .find(|e| e.envelope_type == EnvelopeType::HumanReply)
        .expect("a human reply");
    assert_eq!(last_reply.payload.message.as_deref(), Some(pairflow_engine::DEFAULT_RESUME_MESSAGE));
}

#[tokio::test]
async fn revise_bumps_round_and_swaps_roles() {
    let (_dir, repo) = init_repo();
    let engine = engine();
    let id = BubbleId::parse("b_03").expect("valid id");

    engine
        .create(&repo, id.clone(), "main", agents(), "Add Z")
        .await
        .expect("create");
    engine.start(&repo, &id).await.expect("start");
    engine
        .pass(&repo, &id, Participant::Codex, PassIntent::Review, None, Vec::new())
        .await
        .expect("pass");
    engine.converged(&repo, &id, None).await.expect("converged");

    engine
        .approval_decision(&repo, &id, ApprovalDecisionKind::Revise)
        .await
        .expect("revise");

    let status = engine.status(&repo, &id).expect("status");
    assert_eq!(status.state, Lifecycle::Running);
    assert_eq!(status.round, 2);
    assert_eq!(
        status.active_turn.as_ref().map(|t| t.active_role),
        Some(pairflow_core::role::Role::Implementer)
    );
    assert_eq!(status.active_turn.as_ref().map(|t| t.active_agent), Some(AgentKind::Codex));
}

#[tokio::test]
async fn reject_cancels_the_bubble() {
    let (_dir, repo) = init_repo();
    let engine = engine();
    let id = BubbleId::parse("b_04").expect("valid id");

    engine
        .create(&repo, id.clone(), "main", agents(), "Add W")
        .await
        .expect("create");
    engine.start(&repo, &id).await.expect("start");
    engine
        .pass(&repo, &id, Participant::Codex, PassIntent::Review, None, Vec::new())
        .await
        .expect("pass");
    engine.converged(&repo, &id, None).await.expect("converged");
    engine
        .approval_decision(&repo, &id, ApprovalDecisionKind::Reject)
        .await
        .expect("reject");

    let status = engine.status(&repo, &id).expect("status");
    assert_eq!(status.state, Lifecycle::Cancelled);
    assert!(status.active_turn.is_none());
}

#[tokio::test]
async fn delete_without_force_refuses_when_worktree_is_dirty() {
    let (_dir, repo) = init_repo();
    let engine = engine();
    let id = BubbleId::parse("b_05").expect("valid id");

    engine
        .create(&repo, id.clone(), "main", agents(), "Add V")
        .await
        .expect("create");
    engine.start(&repo, &id).await.expect("start");

    let paths = pairflow_storage::BubblePaths::resolve(&repo, &id).expect("paths");
    std::fs::write(paths.worktree_dir.join("scratch.txt"), "dirty\n").expect("dirty the worktree");

    let err = engine.delete(&repo, &id, false).await.unwrap_err();
    assert!(matches!(err, PairflowError::WorkspaceBusy));
    assert_eq!(err.exit_code(), 2);
    assert!(paths.config.exists(), "delete without --force must not mutate anything");

    engine.delete(&repo, &id, true).await.expect("forced delete");
    assert!(!paths.bubble_dir.exists());
}

#[tokio::test]
async fn concurrent_writers_race_on_fingerprint() {
    let (_dir, repo) = init_repo();
    let engine = engine();
    let id = BubbleId::parse("b_06").expect("valid id");

    engine
        .create(&repo, id.clone(), "main", agents(), "Add U")
        .await
        .expect("create");
    engine.start(&repo, &id).await.expect("start");

    // Simulate a racing writer that read the state before `pass` landed:
    // replaying the stale fingerprint through `write_state_snapshot`
    // directly must be rejected even though the bubble lock isn't held
    // concurrently here (the fingerprint CAS is the independent guard).
    let paths = pairflow_storage::BubblePaths::resolve(&repo, &id).expect("paths");
    let stale = pairflow_storage::read_state_snapshot(&paths.state).expect("read").expect("present");

    engine
        .pass(&repo, &id, Participant::Codex, PassIntent::Review, None, Vec::new())
        .await
        .expect("pass");

    let mut racer_write = stale.state.clone();
    racer_write.round = 99;
    let result = pairflow_storage::write_state_snapshot(
        &paths.state,
        Some(stale.fingerprint.as_str()),
        None,
        &racer_write,
    );
    assert!(matches!(result, Err(PairflowError::StateConflict)));
}
