// SPDX-License-Identifier: MIT

//! pairflow - bubble lifecycle CLI

mod commands;
mod output;
mod repo;

use anyhow::Result;
use clap::{Parser, Subcommand};
use output::OutputFormat;
use pairflow_adapters::TmuxAdapter;
use pairflow_core::clock::SystemClock;
use pairflow_engine::Engine;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pairflow", version, about = "Coordinate a pair of AI coding agents over a shared git worktree")]
struct Cli {
    /// Repo to operate on (defaults to the current directory's toplevel)
    #[arg(short = 'C', long = "repo", global = true, value_name = "DIR")]
    repo: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bubble lifecycle management
    Bubble(commands::bubble::BubbleArgs),
    /// Hand the turn to the other participant
    Pass(commands::agent::PassArgs),
    /// Ask the human a question, parking the bubble at WAITING_HUMAN
    AskHuman(commands::agent::AskHumanArgs),
    /// Record the reviewer's convergence and raise an approval request
    Converged(commands::agent::ConvergedArgs),
    /// Apply a human's approve/reject/revise decision
    ApprovalDecision(commands::agent::ApprovalDecisionArgs),
    /// Reply to a pending human question
    Human(commands::human::HumanArgs),
    /// Print the on-disk file paths an external dashboard would read
    Ui(commands::ui::UiArgs),
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("PAIRFLOW_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();
    if let Err(e) = run().await {
        let code = e
            .downcast_ref::<pairflow_core::error::PairflowError>()
            .map_or(1, |err| err.exit_code());
        eprintln!("Error: {e}");
        std::process::exit(code);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let repo_path = repo::resolve(cli.repo.as_ref()).await?;
    let engine = Engine::new(TmuxAdapter::default(), SystemClock);
    let format = cli.output;

    match cli.command {
        Commands::Bubble(args) => commands::bubble::handle(&engine, &repo_path, args, format).await,
        Commands::Pass(args) => commands::agent::pass(&engine, &repo_path, args).await,
        Commands::AskHuman(args) => commands::agent::ask_human(&engine, &repo_path, args).await,
        Commands::Converged(args) => commands::agent::converged(&engine, &repo_path, args).await,
        Commands::ApprovalDecision(args) => {
            commands::agent::approval_decision(&engine, &repo_path, args).await
        }
        Commands::Human(args) => commands::human::handle(&engine, &repo_path, args).await,
        Commands::Ui(args) => commands::ui::handle(&repo_path, args),
    }
}
