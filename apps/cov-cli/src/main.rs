//! # cov-cli
//!
//! Command-line interface for the Covenant goal-commitment engine.
//!
//! Drives the whole programmatic surface against a JSON snapshot:
//! - `covenant submit` — run a draft contract through the admission gate
//! - `covenant cycle list/show/end/delete/verify` — inspect and manage cycles
//! - `covenant plan show/regenerate/rebase/projection` — the cold plan
//! - `covenant suggestion list/accept/reject/ignore/dismiss/history`
//! - `covenant signals` — rolling correction-signal analytics

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cov_cycle::{EventDispatcher, LogSink, SnapshotStore};

/// Covenant CLI — admit one goal, plan it, execute block by block.
#[derive(Parser)]
#[command(name = "covenant", version, about)]
struct Cli {
    /// Path to the ledger snapshot file.
    #[arg(long, default_value = ".covenant/ledger.json")]
    state: PathBuf,

    /// Path to the JSONL trace log.
    #[arg(long, default_value = ".covenant/trace.jsonl")]
    trace: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a draft contract through the admission gate.
    Submit {
        /// Path to the draft contract JSON.
        draft: PathBuf,
        /// Optional path to user-defined deliverables JSON (array).
        #[arg(long)]
        deliverables: Option<PathBuf>,
        /// Inscribe the draft with this acknowledgment before submitting.
        #[arg(long)]
        acknowledge: Option<String>,
    },
    /// Inspect and manage cycles.
    Cycle {
        #[command(subcommand)]
        command: commands::cycle::CycleCommands,
    },
    /// Inspect and regenerate the cold plan.
    Plan {
        #[command(subcommand)]
        command: commands::plan::PlanCommands,
    },
    /// Work the suggestion queue.
    Suggestion {
        #[command(subcommand)]
        command: commands::suggestion::SuggestionCommands,
    },
    /// Show rolling correction signals for a cycle.
    Signals {
        /// Cycle ID.
        cycle_id: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let store = SnapshotStore::new(&cli.state);
    let mut dispatcher = EventDispatcher::new();
    dispatcher.add_sink(Box::new(LogSink::new(&cli.trace)));

    match &cli.command {
        Commands::Submit {
            draft,
            deliverables,
            acknowledge,
        } => commands::submit::execute(
            &store,
            &dispatcher,
            draft,
            deliverables.as_deref(),
            acknowledge.as_deref(),
        ),
        Commands::Cycle { command } => commands::cycle::execute(command, &store, &dispatcher),
        Commands::Plan { command } => commands::plan::execute(command, &store, &dispatcher),
        Commands::Suggestion { command } => {
            commands::suggestion::execute(command, &store, &dispatcher)
        }
        Commands::Signals { cycle_id } => commands::signals::execute(&store, cycle_id),
    }
}
