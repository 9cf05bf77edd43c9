// SPDX-License-Identifier: MIT

use super::*;
use std::path::Path;

#[tokio::test]
async fn spawn_records_the_call_and_makes_the_session_alive() {
    let adapter = FakeSessionAdapter::new();
    let env = vec![("KEY".to_string(), "VALUE".to_string())];

    let id = adapter
        .spawn("pf-b_01", Path::new("/repo"), "claude", &env)
        .await
        .expect("spawn");

    assert_eq!(id, "pf-b_01");
    assert!(adapter.is_alive("pf-b_01").await.expect("is_alive"));
    match &adapter.calls()[0] {
        SessionCall::Spawn { name, cwd, cmd, env: recorded_env } => {
            assert_eq!(name, "pf-b_01");
            assert_eq!(cwd, Path::new("/repo"));
            assert_eq!(cmd, "claude");
            assert_eq!(recorded_env, &env);
        }
        other => panic!("unexpected call: {other:?}"),
    }
}

#[tokio::test]
async fn kill_marks_the_session_as_not_alive() {
    let adapter = FakeSessionAdapter::new();
    adapter.spawn("pf-b_02", Path::new("/repo"), "claude", &[]).await.expect("spawn");

    adapter.kill("pf-b_02").await.expect("kill");

    assert!(!adapter.is_alive("pf-b_02").await.expect("is_alive"));
}

#[tokio::test]
async fn operations_on_unknown_session_fail_with_not_found() {
    let adapter = FakeSessionAdapter::new();

    let result = adapter.send_enter("ghost").await;

    assert!(matches!(result, Err(SessionError::NotFound(id)) if id == "ghost"));
}

#[tokio::test]
async fn capture_output_returns_seeded_output() {
    let adapter = FakeSessionAdapter::new();
    adapter.seed_session("pf-b_03", true, "line one\nline two");

    let output = adapter.capture_output("pf-b_03", 10).await.expect("capture");

    assert_eq!(output, "line one\nline two");
}

#[tokio::test]
async fn set_output_updates_what_capture_output_returns() {
    let adapter = FakeSessionAdapter::new();
    adapter.spawn("pf-b_04", Path::new("/repo"), "claude", &[]).await.expect("spawn");

    adapter.set_output("pf-b_04", "updated output");

    let output = adapter.capture_output("pf-b_04", 5).await.expect("capture");
    assert_eq!(output, "updated output");
}
