// SPDX-License-Identifier: MIT

//! `pairflow human reply` - resolve a pending HUMAN_QUESTION.

use super::parse_bubble_id;
use anyhow::Result;
use clap::{Args, Subcommand};
use pairflow_adapters::SessionAdapter;
use pairflow_core::clock::Clock;
use pairflow_core::id::BubbleId;
use pairflow_engine::Engine;
use std::path::Path;

#[derive(Args)]
pub struct HumanArgs {
    #[command(subcommand)]
    command: HumanCommand,
}

#[derive(Subcommand)]
enum HumanCommand {
    /// Answer the bubble's pending HUMAN_QUESTION
    Reply {
        #[arg(long, value_parser = parse_bubble_id)]
        id: BubbleId,
        #[arg(long)]
        message: String,
    },
}

pub async fn handle<A: SessionAdapter, C: Clock>(
    engine: &Engine<A, C>,
    repo_path: &Path,
    args: HumanArgs,
) -> Result<()> {
    match args.command {
        HumanCommand::Reply { id, message } => {
            engine.human_reply(repo_path, &id, &message).await?;
            println!("replied to bubble {id}");
            Ok(())
        }
    }
}
