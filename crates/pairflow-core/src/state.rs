// SPDX-License-Identifier: MIT

//! The bubble state snapshot (`state.json`) and its schema validation.
//! Persistence and CAS live in `pairflow-storage`; this module only defines
//! the shape and the pure validation rules so they can be unit tested
//! without touching a filesystem.

use crate::error::{PairflowError, ValidationIssue};
use crate::id::BubbleId;
use crate::role::Role;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle states. `CREATED` is the only initial state;
/// `DONE`/`FAILED`/`CANCELLED` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Lifecycle {
    Created,
    PreparingWorkspace,
    Running,
    WaitingHuman,
    ReadyForApproval,
    ApprovedForCommit,
    Committed,
    Done,
    Failed,
    Cancelled,
}

impl Lifecycle {
    pub fn is_terminal(self) -> bool {
        matches!(self, Lifecycle::Done | Lifecycle::Failed | Lifecycle::Cancelled)
    }

    /// States for which the active-turn triple must be null.
    pub fn requires_null_active_turn(self) -> bool {
        matches!(
            self,
            Lifecycle::Created
                | Lifecycle::PreparingWorkspace
                | Lifecycle::Done
                | Lifecycle::Failed
                | Lifecycle::Cancelled
        )
    }

    /// States the watchdog tracks.
    pub fn is_watchdog_tracked(self) -> bool {
        matches!(
            self,
            Lifecycle::Running
                | Lifecycle::WaitingHuman
                | Lifecycle::ReadyForApproval
                | Lifecycle::ApprovedForCommit
                | Lifecycle::Committed
        )
    }
}

impl std::fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Lifecycle::Created => "CREATED",
            Lifecycle::PreparingWorkspace => "PREPARING_WORKSPACE",
            Lifecycle::Running => "RUNNING",
            Lifecycle::WaitingHuman => "WAITING_HUMAN",
            Lifecycle::ReadyForApproval => "READY_FOR_APPROVAL",
            Lifecycle::ApprovedForCommit => "APPROVED_FOR_COMMIT",
            Lifecycle::Committed => "COMMITTED",
            Lifecycle::Done => "DONE",
            Lifecycle::Failed => "FAILED",
            Lifecycle::Cancelled => "CANCELLED",
        };
        write!(f, "{s}")
    }
}

/// Who holds the turn right now. Either all three fields are set, or (per
/// invariant I1) all three are null — modeled as `Option<ActiveTurn>` so the
/// all-or-nothing constraint is structural rather than checked by hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveTurn {
    pub active_agent: crate::config::AgentKind,
    pub active_since: DateTime<Utc>,
    pub active_role: Role,
}

/// One entry of the round/role history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRoleEntry {
    pub round: u64,
    pub implementer: crate::config::AgentKind,
    pub reviewer: crate::config::AgentKind,
    pub switched_at: DateTime<Utc>,
}

/// The full bubble state snapshot persisted as `state.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BubbleState {
    pub bubble_id: BubbleId,
    pub state: Lifecycle,
    pub round: u64,
    #[serde(default)]
    pub active_turn: Option<ActiveTurn>,
    #[serde(default)]
    pub round_role_history: Vec<RoundRoleEntry>,
    #[serde(default)]
    pub last_command_at: Option<DateTime<Utc>>,
    /// The id of the last transcript envelope whose state effect has been
    /// applied. Lets a handler detect the gap §5's "Cancellation" describes
    /// — a transcript append that landed but whose CAS write didn't — and
    /// replay the missing effect before doing anything else.
    #[serde(default)]
    pub last_envelope_id: Option<String>,
}

impl BubbleState {
    /// The state immediately after `create`. Rounds are one-based: round 1
    /// is the implementer/reviewer pair created by `start`, matching the
    /// literal round numbers spec.md's end-to-end scenarios quote.
    pub fn new_created(bubble_id: BubbleId) -> Self {
        Self {
            bubble_id,
            state: Lifecycle::Created,
            round: 1,
            active_turn: None,
            round_role_history: Vec::new(),
            last_command_at: None,
            last_envelope_id: None,
        }
    }

    /// Validates every schema-level invariant: the active-turn triple
    /// being all-null or all-set as `state.requires_null_active_turn()`
    /// expects, round monotonicity inside `round_role_history`, and
    /// `implementer != reviewer` in every history entry.
    pub fn validate(&self) -> Result<(), PairflowError> {
        let mut issues = Vec::new();

        let must_be_null = self.state.requires_null_active_turn();
        match (&self.active_turn, must_be_null) {
            (Some(_), true) => issues.push(ValidationIssue::new(
                "active_*",
                format!("must be null while state is {}", self.state),
            )),
            (None, false) => issues.push(ValidationIssue::new(
                "active_*",
                format!("must be set while state is {}", self.state),
            )),
            _ => {}
        }

        let mut last_round: Option<u64> = None;
        for (i, entry) in self.round_role_history.iter().enumerate() {
            if let Some(prev) = last_round {
                if entry.round <= prev {
                    issues.push(ValidationIssue::new(
                        format!("round_role_history[{i}].round"),
                        format!("must strictly increase (previous was {prev})"),
                    ));
                }
            }
            last_round = Some(entry.round);

            if entry.implementer == entry.reviewer {
                issues.push(ValidationIssue::new(
                    format!("round_role_history[{i}]"),
                    "implementer and reviewer must differ".to_string(),
                ));
            }
        }

        // At most one history entry per round falls out of the
        // strict-monotonicity check above, but a duplicate round with a
        // non-increasing value is reported distinctly for clarity.
        let mut seen_rounds = std::collections::HashSet::new();
        for (i, entry) in self.round_role_history.iter().enumerate() {
            if !seen_rounds.insert(entry.round) {
                issues.push(ValidationIssue::new(
                    format!("round_role_history[{i}].round"),
                    format!("duplicate entry for round {}", entry.round),
                ));
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(PairflowError::SchemaValidation { issues })
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
