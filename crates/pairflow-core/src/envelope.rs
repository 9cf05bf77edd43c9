// SPDX-License-Identifier: MIT

//! The envelope wire format: one JSON object per NDJSON line.
//!
//! On disk, `Envelope` is a single flat struct with optional payload fields
//! — third parties reading the transcript rely on stable field names. Each
//! [`EnvelopeType`] requires a specific subset of payload fields, checked by
//! [`Envelope::validate`] at construction/parse time rather than scattering
//! `if let Some(..)` checks through the protocol handlers.

use crate::error::PairflowError;
use crate::id::BubbleId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Participant {
    Codex,
    Claude,
    Orchestrator,
    Human,
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Participant::Codex => write!(f, "codex"),
            Participant::Claude => write!(f, "claude"),
            Participant::Orchestrator => write!(f, "orchestrator"),
            Participant::Human => write!(f, "human"),
        }
    }
}

impl From<crate::config::AgentKind> for Participant {
    fn from(a: crate::config::AgentKind) -> Self {
        match a {
            crate::config::AgentKind::Codex => Participant::Codex,
            crate::config::AgentKind::Claude => Participant::Claude,
        }
    }
}

impl std::str::FromStr for Participant {
    type Err = PairflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "codex" => Ok(Participant::Codex),
            "claude" => Ok(Participant::Claude),
            "orchestrator" => Ok(Participant::Orchestrator),
            "human" => Ok(Participant::Human),
            other => Err(PairflowError::EnvelopeParse(format!(
                "unknown participant {other:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EnvelopeType {
    Task,
    Pass,
    HumanQuestion,
    HumanReply,
    Convergence,
    ApprovalRequest,
    ApprovalDecision,
    DonePackage,
}

impl fmt::Display for EnvelopeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EnvelopeType::Task => "TASK",
            EnvelopeType::Pass => "PASS",
            EnvelopeType::HumanQuestion => "HUMAN_QUESTION",
            EnvelopeType::HumanReply => "HUMAN_REPLY",
            EnvelopeType::Convergence => "CONVERGENCE",
            EnvelopeType::ApprovalRequest => "APPROVAL_REQUEST",
            EnvelopeType::ApprovalDecision => "APPROVAL_DECISION",
            EnvelopeType::DonePackage => "DONE_PACKAGE",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalDecisionKind {
    Approve,
    Reject,
    Revise,
}

impl std::str::FromStr for ApprovalDecisionKind {
    type Err = PairflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(ApprovalDecisionKind::Approve),
            "reject" => Ok(ApprovalDecisionKind::Reject),
            "revise" => Ok(ApprovalDecisionKind::Revise),
            other => Err(PairflowError::EnvelopeParse(format!(
                "unknown approval decision {other:?}, expected approve, reject, or revise"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassIntent {
    Task,
    Review,
    FixRequest,
}

impl std::str::FromStr for PassIntent {
    type Err = PairflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task" => Ok(PassIntent::Task),
            "review" => Ok(PassIntent::Review),
            "fix_request" => Ok(PassIntent::FixRequest),
            other => Err(PairflowError::EnvelopeParse(format!(
                "unknown pass intent {other:?}, expected task, review, or fix_request"
            ))),
        }
    }
}

/// On-disk payload: a flat optional-field bag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision: Option<ApprovalDecisionKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_intent: Option<PassIntent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub findings: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// The durable unit of the protocol transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub id: String,
    pub ts: DateTime<Utc>,
    pub bubble_id: BubbleId,
    pub sender: Participant,
    pub recipient: Participant,
    #[serde(rename = "type")]
    pub envelope_type: EnvelopeType,
    pub round: u64,
    #[serde(default)]
    pub payload: Payload,
    #[serde(default)]
    pub refs: Vec<String>,
}

impl Envelope {
    /// Validates the required-field subset for this envelope's type.
    /// Called at emit time so a malformed envelope is never appended.
    pub fn validate(&self) -> Result<(), PairflowError> {
        let mut issues = Vec::new();
        match self.envelope_type {
            EnvelopeType::HumanQuestion if self.payload.question.is_none() => {
                issues.push("payload.question".to_string());
            }
            EnvelopeType::ApprovalDecision if self.payload.decision.is_none() => {
                issues.push("payload.decision".to_string());
            }
            EnvelopeType::Pass if self.payload.pass_intent.is_none() => {
                issues.push("payload.pass_intent".to_string());
            }
            _ => {}
        }
        if issues.is_empty() {
            Ok(())
        } else {
            Err(PairflowError::EnvelopeParse(format!(
                "{} envelope missing required field(s): {}",
                self.envelope_type,
                issues.join(", ")
            )))
        }
    }

    /// Serializes this envelope as one NDJSON line, including the trailing
    /// newline.
    pub fn to_ndjson_line(&self) -> Result<String, PairflowError> {
        self.validate()?;
        let mut line = serde_json::to_string(self)
            .map_err(|e| PairflowError::EnvelopeParse(e.to_string()))?;
        line.push('\n');
        Ok(line)
    }

    /// Parses one NDJSON line (without its trailing newline). Rejects
    /// empty/whitespace-only lines.
    pub fn from_ndjson_line(line: &str) -> Result<Self, PairflowError> {
        if line.trim().is_empty() {
            return Err(PairflowError::EnvelopeParse(
                "empty or whitespace-only line".to_string(),
            ));
        }
        let env: Envelope = serde_json::from_str(line.trim_end_matches(['\n', '\r']))
            .map_err(|e| PairflowError::EnvelopeParse(e.to_string()))?;
        env.validate()?;
        Ok(env)
    }
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
