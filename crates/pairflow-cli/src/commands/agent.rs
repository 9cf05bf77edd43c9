// SPDX-License-Identifier: MIT

//! Flat, agent-facing commands: the turn-taking and convergence signals an
//! agent's own CLI invokes mid-session, not an operator at a terminal.

use super::parse_bubble_id;
use anyhow::Result;
use clap::Args;
use pairflow_adapters::SessionAdapter;
use pairflow_core::clock::Clock;
use pairflow_core::envelope::{ApprovalDecisionKind, Participant, PassIntent};
use pairflow_core::id::BubbleId;
use pairflow_engine::Engine;
use std::path::Path;

#[derive(Args)]
pub struct PassArgs {
    #[arg(long, value_parser = parse_bubble_id)]
    id: BubbleId,
    /// Who is claiming the turn they currently hold (codex, claude, orchestrator, human)
    #[arg(long = "as")]
    sender: Participant,
    /// task, review, or fix_request
    #[arg(long)]
    intent: PassIntent,
    #[arg(long)]
    summary: Option<String>,
    #[arg(long = "ref")]
    refs: Vec<String>,
}

pub async fn pass<A: SessionAdapter, C: Clock>(
    engine: &Engine<A, C>,
    repo_path: &Path,
    args: PassArgs,
) -> Result<()> {
    engine
        .pass(repo_path, &args.id, args.sender, args.intent, args.summary, args.refs)
        .await?;
    println!("passed the turn for bubble {}", args.id);
    Ok(())
}

#[derive(Args)]
pub struct AskHumanArgs {
    #[arg(long, value_parser = parse_bubble_id)]
    id: BubbleId,
    #[arg(long = "as")]
    sender: Participant,
    #[arg(long)]
    question: String,
    #[arg(long = "ref")]
    refs: Vec<String>,
}

pub async fn ask_human<A: SessionAdapter, C: Clock>(
    engine: &Engine<A, C>,
    repo_path: &Path,
    args: AskHumanArgs,
) -> Result<()> {
    engine
        .ask_human(repo_path, &args.id, args.sender, &args.question, args.refs)
        .await?;
    println!("raised a human question for bubble {}", args.id);
    Ok(())
}

#[derive(Args)]
pub struct ConvergedArgs {
    #[arg(long, value_parser = parse_bubble_id)]
    id: BubbleId,
    #[arg(long)]
    summary: Option<String>,
}

pub async fn converged<A: SessionAdapter, C: Clock>(
    engine: &Engine<A, C>,
    repo_path: &Path,
    args: ConvergedArgs,
) -> Result<()> {
    engine.converged(repo_path, &args.id, args.summary).await?;
    println!("bubble {} is ready for approval", args.id);
    Ok(())
}

#[derive(Args)]
pub struct ApprovalDecisionArgs {
    #[arg(long, value_parser = parse_bubble_id)]
    id: BubbleId,
    /// approve, reject, or revise
    decision: ApprovalDecisionKind,
}

pub async fn approval_decision<A: SessionAdapter, C: Clock>(
    engine: &Engine<A, C>,
    repo_path: &Path,
    args: ApprovalDecisionArgs,
) -> Result<()> {
    engine.approval_decision(repo_path, &args.id, args.decision).await?;
    println!("recorded decision for bubble {}", args.id);
    Ok(())
}
