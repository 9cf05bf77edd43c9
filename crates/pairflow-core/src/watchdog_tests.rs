// SPDX-License-Identifier: MIT

use super::*;
use crate::config::AgentKind;
use crate::id::BubbleId;
use crate::state::{ActiveTurn, Lifecycle};

fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).expect("valid").with_timezone(&Utc)
}

fn running_state(active_since: DateTime<Utc>, last_command_at: Option<DateTime<Utc>>) -> BubbleState {
    let mut s = BubbleState::new_created(BubbleId::parse("b_01").expect("valid"));
    s.state = Lifecycle::Running;
    s.active_turn = Some(ActiveTurn {
        active_agent: AgentKind::Codex,
        active_since,
        active_role: crate::role::Role::Implementer,
    });
    s.last_command_at = last_command_at;
    s
}

#[test]
fn created_bubble_is_not_monitored() {
    let s = BubbleState::new_created(BubbleId::parse("b_01").expect("valid"));
    let status = watchdog_status(&s, 10, ts("2026-01-01T00:00:00Z"));
    assert!(!status.monitored);
    assert!(!status.expired);
}

#[test]
fn expired_at_exactly_the_deadline() {
    let active_since = ts("2026-01-01T00:00:00Z");
    let s = running_state(active_since, None);
    let now = active_since + chrono::Duration::minutes(5);
    let status = watchdog_status(&s, 5, now);
    assert!(status.expired);
    assert_eq!(status.remaining_seconds, 0);
}

#[test]
fn not_expired_just_before_the_deadline() {
    let active_since = ts("2026-01-01T00:00:00Z");
    let s = running_state(active_since, None);
    let now = active_since + chrono::Duration::minutes(5) - chrono::Duration::seconds(30);
    let status = watchdog_status(&s, 5, now);
    assert!(!status.expired);
    assert_eq!(status.remaining_seconds, 30);
}

#[test]
fn expired_well_past_the_deadline() {
    let active_since = ts("2026-01-01T00:00:00Z");
    let s = running_state(active_since, None);
    let now = active_since + chrono::Duration::minutes(5) + chrono::Duration::seconds(30);
    let status = watchdog_status(&s, 5, now);
    assert!(status.expired);
    assert_eq!(status.remaining_seconds, 0);
}

#[test]
fn last_command_at_takes_precedence_over_active_since() {
    let active_since = ts("2026-01-01T00:00:00Z");
    let last_command = ts("2026-01-01T00:04:00Z");
    let s = running_state(active_since, Some(last_command));
    // 5 minutes after active_since would have expired, but last_command_at
    // resets the reference point.
    let now = active_since + chrono::Duration::minutes(5);
    let status = watchdog_status(&s, 5, now);
    assert!(!status.expired);
    assert_eq!(status.remaining_seconds, 240);
}

#[yare::parameterized(
    waiting_human = { Lifecycle::WaitingHuman },
    ready_for_approval = { Lifecycle::ReadyForApproval },
    approved_for_commit = { Lifecycle::ApprovedForCommit },
    committed = { Lifecycle::Committed },
)]
fn tracked_states_are_monitored_when_active(state: Lifecycle) {
    let active_since = ts("2026-01-01T00:00:00Z");
    let mut s = running_state(active_since, None);
    s.state = state;
    let status = watchdog_status(&s, 10, active_since);
    assert!(status.monitored);
}

#[yare::parameterized(
    created = { Lifecycle::Created },
    preparing_workspace = { Lifecycle::PreparingWorkspace },
    done = { Lifecycle::Done },
    failed = { Lifecycle::Failed },
    cancelled = { Lifecycle::Cancelled },
)]
fn untracked_states_are_never_monitored(state: Lifecycle) {
    let active_since = ts("2026-01-01T00:00:00Z");
    let mut s = running_state(active_since, None);
    s.active_turn = None;
    s.state = state;
    let status = watchdog_status(&s, 10, active_since);
    assert!(!status.monitored);
}
