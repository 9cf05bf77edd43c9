// SPDX-License-Identifier: MIT

//! Shared test fixtures for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::config::{AgentKind, AgentsConfig, BubbleConfig};
use crate::envelope::{ApprovalDecisionKind, Envelope, EnvelopeType, Participant, Payload};
use crate::id::BubbleId;
use crate::state::{ActiveTurn, BubbleState, Lifecycle, RoundRoleEntry};
use chrono::{DateTime, Utc};

pub fn bubble_id(s: &str) -> BubbleId {
    BubbleId::parse(s).expect("test fixture id must be valid")
}

pub fn test_config(id: &str) -> BubbleConfig {
    BubbleConfig::new(
        bubble_id(id),
        "/tmp/repo".into(),
        "main".to_string(),
        AgentsConfig {
            implementer: AgentKind::Codex,
            reviewer: AgentKind::Claude,
        },
    )
    .expect("test fixture config must be valid")
}

pub fn running_state(id: &str, round: u64, active_role: crate::role::Role, since: DateTime<Utc>) -> BubbleState {
    let cfg = test_config(id);
    let mut s = BubbleState::new_created(bubble_id(id));
    s.state = Lifecycle::Running;
    s.round = round;
    s.active_turn = Some(ActiveTurn {
        active_agent: cfg.agent_for(active_role),
        active_since: since,
        active_role,
    });
    s.round_role_history = vec![RoundRoleEntry {
        round,
        implementer: cfg.agents.implementer,
        reviewer: cfg.agents.reviewer,
        switched_at: since,
    }];
    s.last_command_at = Some(since);
    s
}

pub fn task_envelope(id: &str, summary: &str, ts: DateTime<Utc>) -> Envelope {
    Envelope {
        id: format!("{id}-task-0"),
        ts,
        bubble_id: bubble_id(id),
        sender: Participant::Orchestrator,
        recipient: Participant::Codex,
        envelope_type: EnvelopeType::Task,
        round: 0,
        payload: Payload {
            summary: Some(summary.to_string()),
            ..Default::default()
        },
        refs: Vec::new(),
    }
}

pub fn human_question_envelope(id: &str, seq: u64, question: &str, ts: DateTime<Utc>) -> Envelope {
    Envelope {
        id: format!("{id}-hq-{seq}"),
        ts,
        bubble_id: bubble_id(id),
        sender: Participant::Codex,
        recipient: Participant::Human,
        envelope_type: EnvelopeType::HumanQuestion,
        round: 0,
        payload: Payload {
            question: Some(question.to_string()),
            ..Default::default()
        },
        refs: Vec::new(),
    }
}

pub fn human_reply_envelope(id: &str, seq: u64, message: &str, ts: DateTime<Utc>) -> Envelope {
    Envelope {
        id: format!("{id}-hr-{seq}"),
        ts,
        bubble_id: bubble_id(id),
        sender: Participant::Human,
        recipient: Participant::Codex,
        envelope_type: EnvelopeType::HumanReply,
        round: 0,
        payload: Payload {
            message: Some(message.to_string()),
            ..Default::default()
        },
        refs: Vec::new(),
    }
}

pub fn approval_request_envelope(id: &str, seq: u64, ts: DateTime<Utc>) -> Envelope {
    Envelope {
        id: format!("{id}-areq-{seq}"),
        ts,
        bubble_id: bubble_id(id),
        sender: Participant::Orchestrator,
        recipient: Participant::Human,
        envelope_type: EnvelopeType::ApprovalRequest,
        round: 0,
        payload: Payload::default(),
        refs: Vec::new(),
    }
}

pub fn approval_decision_envelope(
    id: &str,
    seq: u64,
    decision: ApprovalDecisionKind,
    ts: DateTime<Utc>,
) -> Envelope {
    Envelope {
        id: format!("{id}-adec-{seq}"),
        ts,
        bubble_id: bubble_id(id),
        sender: Participant::Human,
        recipient: Participant::Orchestrator,
        envelope_type: EnvelopeType::ApprovalDecision,
        round: 0,
        payload: Payload {
            decision: Some(decision),
            ..Default::default()
        },
        refs: Vec::new(),
    }
}
