// suggestion.rs — suggestion subcommands: list, accept, reject, ignore,
// dismiss, link, history.

use clap::Subcommand;

use cov_contract::day_key::Clock;
use cov_contract::SystemClock;
use cov_cycle::{
    project_history, CoreEvent, EventDispatcher, HistoryFilters, Placement, RejectReason,
    SnapshotStore, SuggestionStatus, TransitionOutcome,
};

use super::parse_domain;

#[derive(Subcommand)]
pub enum SuggestionCommands {
    /// List suggestions and their derived status.
    List {
        /// Cycle ID.
        cycle_id: String,
    },
    /// Accept a suggestion with a concrete placement.
    Accept {
        /// Cycle ID.
        cycle_id: String,
        /// Suggestion ID.
        id: String,
        /// Placement day (YYYY-MM-DD).
        #[arg(long)]
        day: String,
        /// Placement start time (HH:MM).
        #[arg(long)]
        time: String,
        /// Duration in minutes.
        #[arg(long)]
        duration: u32,
        /// Domain (BODY, RESOURCES, FOCUS, CREATION).
        #[arg(long)]
        domain: String,
        /// Linked deliverable ID.
        #[arg(long)]
        deliverable: Option<String>,
        /// Linked criterion ID.
        #[arg(long)]
        criterion: Option<String>,
        /// Enforce strict progress mode for this acceptance.
        #[arg(long)]
        strict: bool,
    },
    /// Reject a suggestion with a reason code.
    Reject {
        /// Cycle ID.
        cycle_id: String,
        /// Suggestion ID.
        id: String,
        /// Reason (TOO_LONG, WRONG_TIME, LOW_ENERGY, NOT_RELEVANT,
        /// MISSING_PREREQ, OVERCOMMITTED).
        #[arg(long)]
        reason: String,
    },
    /// Ignore a suggestion (may resurface later).
    Ignore {
        /// Cycle ID.
        cycle_id: String,
        /// Suggestion ID.
        id: String,
    },
    /// Dismiss a suggestion (never resurfaces).
    Dismiss {
        /// Cycle ID.
        cycle_id: String,
        /// Suggestion ID.
        id: String,
    },
    /// Link a suggestion to a deliverable/criterion.
    Link {
        /// Cycle ID.
        cycle_id: String,
        /// Suggestion ID.
        id: String,
        #[arg(long)]
        deliverable: Option<String>,
        #[arg(long)]
        criterion: Option<String>,
    },
    /// Show the windowed event history.
    History {
        /// Cycle ID.
        cycle_id: String,
        /// Window size in days.
        #[arg(long, default_value_t = 14)]
        window: u32,
    },
}

pub fn execute(
    cmd: &SuggestionCommands,
    store: &SnapshotStore,
    dispatcher: &EventDispatcher,
) -> anyhow::Result<()> {
    let clock = SystemClock;
    match cmd {
        SuggestionCommands::List { cycle_id } => {
            let ledger = store.load()?;
            let cycle = ledger
                .cycle(cycle_id)
                .ok_or_else(|| anyhow::anyhow!("cycle not found: {cycle_id}"))?;
            for block in cycle.suggestion_log.suggestions() {
                let status = cycle
                    .suggestion_log
                    .status_of(&block.id)
                    .unwrap_or(SuggestionStatus::Suggested);
                println!(
                    "{}  [{}]  {} {} {}min  {}",
                    block.id, status, block.day_key, block.time, block.duration_minutes,
                    block.title
                );
            }
        }
        SuggestionCommands::Accept {
            cycle_id,
            id,
            day,
            time,
            duration,
            domain,
            deliverable,
            criterion,
            strict,
        } => {
            let placement = Placement {
                day_key: day.clone(),
                time: time.clone(),
                duration_minutes: *duration,
                domain: parse_domain(domain)?,
                deliverable_id: deliverable.clone(),
                criterion_id: criterion.clone(),
            };
            let mut ledger = store.load()?;
            let outcome = ledger.accept_suggestion(cycle_id, id, placement, *strict, &clock)?;
            store.save(&ledger)?;
            report(dispatcher, cycle_id, id, &outcome, None);
        }
        SuggestionCommands::Reject {
            cycle_id,
            id,
            reason,
        } => {
            let reason = parse_reason(reason)?;
            let mut ledger = store.load()?;
            let outcome = ledger.reject_suggestion(cycle_id, id, reason, &clock)?;
            store.save(&ledger)?;
            report(dispatcher, cycle_id, id, &outcome, Some(reason));
        }
        SuggestionCommands::Ignore { cycle_id, id } => {
            let mut ledger = store.load()?;
            let outcome = ledger.ignore_suggestion(cycle_id, id, &clock)?;
            store.save(&ledger)?;
            report(dispatcher, cycle_id, id, &outcome, None);
        }
        SuggestionCommands::Dismiss { cycle_id, id } => {
            let mut ledger = store.load()?;
            let outcome = ledger.dismiss_suggestion(cycle_id, id, &clock)?;
            store.save(&ledger)?;
            report(dispatcher, cycle_id, id, &outcome, None);
        }
        SuggestionCommands::Link {
            cycle_id,
            id,
            deliverable,
            criterion,
        } => {
            let mut ledger = store.load()?;
            let linked =
                ledger.link_suggestion(cycle_id, id, deliverable.clone(), criterion.clone())?;
            store.save(&ledger)?;
            if linked {
                println!("linked {id}");
            } else {
                println!("suggestion not found: {id}");
            }
        }
        SuggestionCommands::History { cycle_id, window } => {
            let ledger = store.load()?;
            let cycle = ledger
                .cycle(cycle_id)
                .ok_or_else(|| anyhow::anyhow!("cycle not found: {cycle_id}"))?;
            let items = project_history(
                &cycle.suggestion_log,
                &clock.now_day_key(),
                *window,
                &HistoryFilters::default(),
            )?;
            for item in items {
                let reason = item
                    .reason
                    .map(|r| format!(" ({})", serde_json::to_string(&r).unwrap_or_default()))
                    .unwrap_or_default();
                println!(
                    "{}  {:?}{}  {}",
                    item.day_key, item.event_type, reason, item.suggestion_id
                );
            }
        }
    }
    Ok(())
}

fn parse_reason(value: &str) -> anyhow::Result<RejectReason> {
    serde_json::from_value(serde_json::Value::String(value.to_uppercase()))
        .map_err(|_| anyhow::anyhow!("unknown reason '{value}'"))
}

fn report(
    dispatcher: &EventDispatcher,
    cycle_id: &str,
    suggestion_id: &str,
    outcome: &TransitionOutcome,
    reason: Option<RejectReason>,
) {
    match outcome {
        TransitionOutcome::Applied { new_status } => {
            dispatcher.dispatch(&CoreEvent::SuggestionResolved {
                cycle_id: cycle_id.to_string(),
                suggestion_id: suggestion_id.to_string(),
                status: *new_status,
                reason,
                timestamp: SystemClock.now(),
            });
            println!("{suggestion_id} → {new_status}");
        }
        TransitionOutcome::AlreadyTerminal { status } => {
            println!("{suggestion_id} already {status}; nothing changed");
        }
        TransitionOutcome::NotFound => println!("suggestion not found: {suggestion_id}"),
        TransitionOutcome::Refused { refusal } => {
            println!("refused: {}", refusal.message());
        }
    }
}
