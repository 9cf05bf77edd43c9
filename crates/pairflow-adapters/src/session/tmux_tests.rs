// SPDX-License-Identifier: MIT

use super::*;
use serial_test::serial;
use std::sync::atomic::{AtomicU64, Ordering};

static SESSION_COUNTER: AtomicU64 = AtomicU64::new(0);

fn unique_name(suffix: &str) -> String {
    let id = SESSION_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("pftest-{suffix}-{id}")
}

fn tmux_available() -> bool {
    std::process::Command::new("tmux")
        .arg("-V")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

macro_rules! skip_if_no_tmux {
    () => {
        if !tmux_available() {
            eprintln!("skipping: tmux not available");
            return;
        }
    };
}

#[tokio::test]
#[serial(tmux)]
async fn spawn_creates_session() {
    skip_if_no_tmux!();
    let adapter = TmuxAdapter::new();
    let name = unique_name("spawn");

    let id = adapter.spawn(&name, Path::new("/tmp"), "sleep 30", &[]).await.expect("spawn");
    assert_eq!(id, name);
    assert!(adapter.is_alive(&name).await.expect("is_alive"));

    adapter.kill(&name).await.expect("kill");
    assert!(!adapter.is_alive(&name).await.expect("is_alive after kill"));
}

#[tokio::test]
#[serial(tmux)]
async fn spawn_rejects_missing_cwd() {
    skip_if_no_tmux!();
    let adapter = TmuxAdapter::new();
    let name = unique_name("missing-cwd");

    let result = adapter
        .spawn(&name, Path::new("/nonexistent/path/xyz"), "true", &[])
        .await;
    assert!(matches!(result, Err(SessionError::SpawnFailed(_))));
}

#[tokio::test]
#[serial(tmux)]
async fn capture_output_reflects_session_content() {
    skip_if_no_tmux!();
    let adapter = TmuxAdapter::new();
    let name = unique_name("capture");

    adapter.spawn(&name, Path::new("/tmp"), "sh", &[]).await.expect("spawn");
    adapter.send_literal(&name, "echo hello-from-pairflow").await.expect("send");
    adapter.send_enter(&name).await.expect("enter");
    tokio::time::sleep(std::time::Duration::from_millis(300)).await;

    let output = adapter.capture_output(&name, 20).await.expect("capture");
    assert!(output.contains("hello-from-pairflow"));

    adapter.kill(&name).await.expect("kill");
}

#[tokio::test]
#[serial(tmux)]
async fn operations_on_unknown_session_fail() {
    skip_if_no_tmux!();
    let adapter = TmuxAdapter::new();
    let name = unique_name("unknown");

    assert!(!adapter.is_alive(&name).await.expect("is_alive"));
    assert!(matches!(
        adapter.send_enter(&name).await,
        Err(SessionError::NotFound(_))
    ));
}
