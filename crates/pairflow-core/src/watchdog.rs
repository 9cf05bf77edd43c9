// SPDX-License-Identifier: MIT

//! Watchdog liveness computation. Pure function of state, configured
//! timeout, and wall clock — the watchdog never mutates state or forces
//! progress; it only reports whether a turn has sat idle too long.

use crate::state::BubbleState;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchdogStatus {
    /// True iff the bubble is in a tracked state with an active agent.
    /// A non-monitored bubble is never expired.
    pub monitored: bool,
    pub deadline: Option<DateTime<Utc>>,
    pub remaining_seconds: u64,
    pub expired: bool,
}

impl WatchdogStatus {
    fn not_monitored() -> Self {
        Self {
            monitored: false,
            deadline: None,
            remaining_seconds: 0,
            expired: false,
        }
    }
}

/// Computes watchdog status:
/// - `monitored` iff `state` is tracked and an agent currently holds the turn.
/// - reference timestamp = `last_command_at ?? active_since`.
/// - `deadline = reference + timeout`.
/// - `remainingSeconds = max(0, ceil((deadline - now) / 1s))`.
/// - `expired = remaining <= 0`.
pub fn watchdog_status(
    state: &BubbleState,
    timeout_minutes: u32,
    now: DateTime<Utc>,
) -> WatchdogStatus {
    if !state.state.is_watchdog_tracked() {
        return WatchdogStatus::not_monitored();
    }
    let Some(active_turn) = &state.active_turn else {
        return WatchdogStatus::not_monitored();
    };

    let reference = state.last_command_at.unwrap_or(active_turn.active_since);
    let timeout = chrono::Duration::minutes(i64::from(timeout_minutes));
    let deadline = reference + timeout;

    let remaining_ms = (deadline - now).num_milliseconds();
    let remaining_seconds = if remaining_ms <= 0 {
        0
    } else {
        // ceil(remaining_ms / 1000)
        ((remaining_ms + 999) / 1000) as u64
    };

    WatchdogStatus {
        monitored: true,
        deadline: Some(deadline),
        remaining_seconds,
        expired: remaining_ms <= 0,
    }
}

#[cfg(test)]
#[path = "watchdog_tests.rs"]
mod tests;
