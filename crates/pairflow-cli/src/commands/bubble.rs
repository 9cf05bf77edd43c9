// SPDX-License-Identifier: MIT

//! `pairflow bubble ...` - create/start/status/list/delete/resume/open/
//! reconcile/commit.

use super::parse_bubble_id;
use crate::output::OutputFormat;
use anyhow::Result;
use clap::{Args, Subcommand};
use pairflow_adapters::SessionAdapter;
use pairflow_core::clock::Clock;
use pairflow_core::config::{AgentKind, AgentsConfig};
use pairflow_core::id::BubbleId;
use pairflow_engine::Engine;
use std::path::Path;

#[derive(Args)]
pub struct BubbleArgs {
    #[command(subcommand)]
    pub command: BubbleCommand,
}

#[derive(Subcommand)]
pub enum BubbleCommand {
    /// Create a new bubble: config, worktree branch reservation, task artifact
    Create {
        #[arg(long, value_parser = parse_bubble_id)]
        id: BubbleId,
        /// Base branch the bubble's branch forks from
        #[arg(long, default_value = "main")]
        base: String,
        /// The task description, written to artifacts/task.md and the TASK envelope
        #[arg(long)]
        task: String,
        /// Agent running the implementer role
        #[arg(long, default_value = "codex")]
        implementer: AgentKind,
        /// Agent running the reviewer role
        #[arg(long, default_value = "claude")]
        reviewer: AgentKind,
    },
    /// Bootstrap the worktree and spawn the implementer's session
    Start {
        #[arg(long, value_parser = parse_bubble_id)]
        id: BubbleId,
    },
    /// Show a single bubble's current state, watchdog, inbox, and transcript summary
    Status {
        #[arg(long, value_parser = parse_bubble_id)]
        id: BubbleId,
    },
    /// List every bubble under this repo's .pairflow/bubbles/
    List,
    /// Tear down a bubble's worktree, branch, and session
    Delete {
        #[arg(long, value_parser = parse_bubble_id)]
        id: BubbleId,
        /// Remove even if the worktree has uncommitted changes
        #[arg(long)]
        force: bool,
    },
    /// Re-send the last actionable message to a stalled agent
    Resume {
        #[arg(long, value_parser = parse_bubble_id)]
        id: BubbleId,
        /// Override the default resume message
        #[arg(long)]
        message: Option<String>,
    },
    /// Attach to the bubble's tmux session
    Open {
        #[arg(long, value_parser = parse_bubble_id)]
        id: BubbleId,
    },
    /// Heal the runtime-session registry against live sessions and bubble state
    Reconcile {
        /// Report without rewriting the registry
        #[arg(long)]
        dry_run: bool,
    },
    /// Commit the worktree's changes onto the bubble branch
    Commit {
        #[arg(long, value_parser = parse_bubble_id)]
        id: BubbleId,
        #[arg(short = 'm', long = "message")]
        message: String,
        #[arg(long = "ref")]
        refs: Vec<String>,
    },
}

pub async fn handle<A: SessionAdapter, C: Clock>(
    engine: &Engine<A, C>,
    repo_path: &Path,
    args: BubbleArgs,
    format: OutputFormat,
) -> Result<()> {
    match args.command {
        BubbleCommand::Create {
            id,
            base,
            task,
            implementer,
            reviewer,
        } => {
            let agents = AgentsConfig { implementer, reviewer };
            let config = engine.create(repo_path, id, &base, agents, &task).await?;
            match format {
                OutputFormat::Text => println!("created bubble {} on branch {}", config.id, config.bubble_branch),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&json_config(&config))?),
            }
            Ok(())
        }
        BubbleCommand::Start { id } => {
            engine.start(repo_path, &id).await?;
            println!("started bubble {id}");
            Ok(())
        }
        BubbleCommand::Status { id } => {
            let view = engine.status(repo_path, &id)?;
            print_status(&view, format)
        }
        BubbleCommand::List => {
            let rows = engine.list(repo_path)?;
            print_list(&rows, format)
        }
        BubbleCommand::Delete { id, force } => {
            engine.delete(repo_path, &id, force).await?;
            println!("deleted bubble {id}");
            Ok(())
        }
        BubbleCommand::Resume { id, message } => {
            match message {
                Some(message) => engine.human_reply(repo_path, &id, &message).await?,
                None => engine.resume(repo_path, &id).await?,
            }
            println!("resumed bubble {id}");
            Ok(())
        }
        BubbleCommand::Open { id } => crate::commands::ui::open_session(repo_path, &id),
        BubbleCommand::Reconcile { dry_run } => {
            let outcome = engine.reconcile(repo_path, dry_run).await?;
            print_reconcile(&outcome, format)
        }
        BubbleCommand::Commit { id, message, refs } => {
            engine.commit(repo_path, &id, &message, refs).await?;
            println!("committed bubble {id}");
            Ok(())
        }
    }
}

fn json_config(config: &pairflow_core::config::BubbleConfig) -> serde_json::Value {
    serde_json::json!({
        "id": config.id.to_string(),
        "base_branch": config.base_branch,
        "bubble_branch": config.bubble_branch,
        "implementer": config.agents.implementer.to_string(),
        "reviewer": config.agents.reviewer.to_string(),
    })
}

fn print_status(view: &pairflow_engine::BubbleStatusView, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!("bubble:      {}", view.bubble_id);
            println!("state:       {}", view.state);
            println!("round:       {}", view.round);
            match &view.active_turn {
                Some(turn) => println!("active turn: {} ({})", turn.active_agent, turn.active_role),
                None => println!("active turn: none"),
            }
            if view.watchdog.monitored {
                println!(
                    "watchdog:    {}s remaining{}",
                    view.watchdog.remaining_seconds,
                    if view.watchdog.expired { " (EXPIRED)" } else { "" }
                );
            } else {
                println!("watchdog:    not monitored");
            }
            println!(
                "inbox:       {} human question(s), {} approval request(s)",
                view.inbox.human_questions, view.inbox.approval_requests
            );
            println!(
                "transcript:  {} message(s), last {}",
                view.transcript.total_messages,
                view.transcript
                    .last_message_type
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "none".to_string())
            );
        }
        OutputFormat::Json => {
            let active_turn = view.active_turn.as_ref().map(|turn| {
                serde_json::json!({
                    "active_agent": turn.active_agent.to_string(),
                    "active_role": turn.active_role.to_string(),
                    "active_since": turn.active_since,
                })
            });
            let output = serde_json::json!({
                "bubble_id": view.bubble_id,
                "state": view.state.to_string(),
                "round": view.round,
                "active_turn": active_turn,
                "watchdog": {
                    "monitored": view.watchdog.monitored,
                    "deadline": view.watchdog.deadline,
                    "remaining_seconds": view.watchdog.remaining_seconds,
                    "expired": view.watchdog.expired,
                },
                "inbox": {
                    "human_questions": view.inbox.human_questions,
                    "approval_requests": view.inbox.approval_requests,
                },
                "transcript": {
                    "total_messages": view.transcript.total_messages,
                    "last_message_type": view.transcript.last_message_type.map(|t| t.to_string()),
                    "last_message_at": view.transcript.last_message_at,
                },
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

fn print_list(rows: &[pairflow_engine::BubbleListEntry], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            if rows.is_empty() {
                println!("no bubbles");
                return Ok(());
            }
            println!("{:<24} {:<22} {:<6} AGENT", "ID", "STATE", "ROUND");
            for row in rows {
                println!(
                    "{:<24} {:<22} {:<6} {}",
                    row.bubble_id,
                    row.state.map(|s| s.to_string()).unwrap_or_else(|| "corrupt".to_string()),
                    row.round.map(|r| r.to_string()).unwrap_or_else(|| "?".to_string()),
                    row.active_agent.as_deref().unwrap_or("-"),
                );
            }
        }
        OutputFormat::Json => {
            let rows: Vec<_> = rows
                .iter()
                .map(|row| {
                    serde_json::json!({
                        "bubble_id": row.bubble_id,
                        "state": row.state.map(|s| s.to_string()).unwrap_or_else(|| "corrupt".to_string()),
                        "round": row.round,
                        "active_agent": row.active_agent,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }
    Ok(())
}

fn print_reconcile(outcome: &pairflow_engine::ReconcileOutcome, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            if outcome.stale.is_empty() {
                println!("registry is clean");
            } else {
                for entry in &outcome.stale {
                    println!("{}: {:?}{}", entry.bubble_id, entry.reason, if outcome.healed { " (healed)" } else { "" });
                }
            }
        }
        OutputFormat::Json => {
            let stale: Vec<_> = outcome
                .stale
                .iter()
                .map(|entry| {
                    serde_json::json!({
                        "bubble_id": entry.bubble_id,
                        "reason": format!("{:?}", entry.reason),
                    })
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({ "stale": stale, "healed": outcome.healed }))?
            );
        }
    }
    Ok(())
}
