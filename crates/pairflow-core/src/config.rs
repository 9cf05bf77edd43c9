// SPDX-License-Identifier: MIT

//! Bubble configuration (`bubble.toml`), immutable after `create`.

use crate::error::PairflowError;
use crate::id::BubbleId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

fn default_watchdog_timeout_minutes() -> u32 {
    10
}

fn default_max_rounds() -> u32 {
    8
}

fn default_commit_requires_approval() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkMode {
    Worktree,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityMode {
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewArtifactType {
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewerContextMode {
    Fresh,
}

/// The LLM-driven CLI impersonating a role. Distinct values are required for
/// implementer vs. reviewer within a single bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Codex,
    Claude,
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentKind::Codex => write!(f, "codex"),
            AgentKind::Claude => write!(f, "claude"),
        }
    }
}

impl std::str::FromStr for AgentKind {
    type Err = PairflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "codex" => Ok(AgentKind::Codex),
            "claude" => Ok(AgentKind::Claude),
            other => Err(PairflowError::ConfigInvalid(format!(
                "unknown agent kind {other:?}, expected codex or claude"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgentsConfig {
    pub implementer: AgentKind,
    pub reviewer: AgentKind,
}

/// Commands the bubble runs for its quality gate. `test`/`typecheck` are
/// named explicitly; anything else the bubble author wants is captured in
/// `extra` (command name -> shell line).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandsConfig {
    #[serde(default)]
    pub test: Option<String>,
    #[serde(default)]
    pub typecheck: Option<String>,
    #[serde(flatten, default)]
    pub extra: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalOverlayMode {
    Symlink,
    Copy,
}

/// A single file or directory, relative to `repo_path`, that should be
/// materialized into the worktree by the configured overlay mode (e.g. a
/// gitignored `.env` the agents need but that must never be committed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocalOverlayEntry {
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverlayConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_overlay_mode")]
    pub mode: LocalOverlayMode,
    #[serde(default)]
    pub entries: Vec<LocalOverlayEntry>,
}

fn default_overlay_mode() -> LocalOverlayMode {
    LocalOverlayMode::Symlink
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            mode: default_overlay_mode(),
            entries: Vec::new(),
        }
    }
}

/// The immutable bubble configuration, stored at
/// `<repo>/.pairflow/bubbles/<id>/bubble.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BubbleConfig {
    pub id: BubbleId,
    pub repo_path: PathBuf,
    pub base_branch: String,
    pub bubble_branch: String,

    pub work_mode: WorkMode,
    pub quality_mode: QualityMode,
    pub review_artifact_type: ReviewArtifactType,
    pub reviewer_context_mode: ReviewerContextMode,

    #[serde(default = "default_watchdog_timeout_minutes")]
    pub watchdog_timeout_minutes: u32,
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
    #[serde(default = "default_commit_requires_approval")]
    pub commit_requires_approval: bool,

    pub agents: AgentsConfig,

    #[serde(default)]
    pub commands: CommandsConfig,

    #[serde(default)]
    pub local_overlay: OverlayConfig,
}

impl BubbleConfig {
    /// Build a new config for `create`, deriving `bubble_branch` and
    /// applying every documented default.
    pub fn new(
        id: BubbleId,
        repo_path: PathBuf,
        base_branch: String,
        agents: AgentsConfig,
    ) -> Result<Self, PairflowError> {
        let bubble_branch = id.branch_name();
        let cfg = Self {
            id,
            repo_path,
            base_branch,
            bubble_branch,
            work_mode: WorkMode::Worktree,
            quality_mode: QualityMode::Strict,
            review_artifact_type: ReviewArtifactType::Auto,
            reviewer_context_mode: ReviewerContextMode::Fresh,
            watchdog_timeout_minutes: default_watchdog_timeout_minutes(),
            max_rounds: default_max_rounds(),
            commit_requires_approval: default_commit_requires_approval(),
            agents,
            commands: CommandsConfig::default(),
            local_overlay: OverlayConfig::default(),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), PairflowError> {
        if self.agents.implementer == self.agents.reviewer {
            return Err(PairflowError::ConfigInvalid(format!(
                "agents.implementer and agents.reviewer must differ, both are {}",
                self.agents.implementer
            )));
        }
        if self.max_rounds == 0 {
            return Err(PairflowError::ConfigInvalid(
                "max_rounds must be at least 1".to_string(),
            ));
        }
        if self.watchdog_timeout_minutes == 0 {
            return Err(PairflowError::ConfigInvalid(
                "watchdog_timeout_minutes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String, PairflowError> {
        toml::to_string_pretty(self)
            .map_err(|e| PairflowError::ConfigInvalid(format!("serializing bubble.toml: {e}")))
    }

    pub fn from_toml_str(s: &str) -> Result<Self, PairflowError> {
        let cfg: Self =
            toml::from_str(s).map_err(|e| PairflowError::ConfigInvalid(format!("{e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// The `active_role -> agent` mapping used by the role-swap rule.
    pub fn agent_for(&self, role: crate::role::Role) -> AgentKind {
        match role {
            crate::role::Role::Implementer => self.agents.implementer,
            crate::role::Role::Reviewer => self.agents.reviewer,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
