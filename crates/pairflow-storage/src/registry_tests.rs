// SPDX-License-Identifier: MIT

use super::*;

fn sample_record(bubble_id: &str) -> SessionRecord {
    SessionRecord {
        bubble_id: bubble_id.to_string(),
        repo_path: "/tmp/repo".into(),
        worktree_path: "/tmp/repo-worktrees/b_01".into(),
        tmux_session_name: format!("pf-{bubble_id}"),
        updated_at: Utc::now(),
    }
}

#[test]
fn missing_registry_reads_as_empty() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("sessions.json");
    let registry = read_registry(&path).expect("read");
    assert!(registry.0.is_empty());
}

#[test]
fn write_then_read_round_trips() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("sessions.json");

    let mut registry = SessionRegistry::default();
    registry.0.insert("b_01".to_string(), sample_record("b_01"));
    write_registry(&path, &registry).expect("write");

    let read_back = read_registry(&path).expect("read");
    assert_eq!(read_back, registry);
}

#[test]
fn overwriting_replaces_the_whole_map() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("sessions.json");

    let mut first = SessionRegistry::default();
    first.0.insert("b_01".to_string(), sample_record("b_01"));
    write_registry(&path, &first).expect("write first");

    let mut second = SessionRegistry::default();
    second.0.insert("b_02".to_string(), sample_record("b_02"));
    write_registry(&path, &second).expect("write second");

    let read_back = read_registry(&path).expect("read");
    assert_eq!(read_back, second);
    assert!(!read_back.0.contains_key("b_01"));
}
