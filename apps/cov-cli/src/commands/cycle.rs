// cycle.rs — cycle subcommands: list, show, end, delete, verify.

use clap::Subcommand;

use cov_contract::SystemClock;
use cov_cycle::{CoreEvent, CycleStatus, EventDispatcher, SnapshotStore};

#[derive(Subcommand)]
pub enum CycleCommands {
    /// List all cycles.
    List {
        /// Filter by status (active, ended, deleted).
        #[arg(long)]
        status: Option<String>,
    },
    /// Show details for a specific cycle.
    Show {
        /// Cycle ID.
        id: String,
    },
    /// End an active cycle (frees its outcome signature).
    End {
        /// Cycle ID.
        id: String,
    },
    /// Soft-delete a cycle.
    Delete {
        /// Cycle ID.
        id: String,
    },
    /// Re-verify a cycle's contract fingerprint.
    Verify {
        /// Cycle ID.
        id: String,
    },
}

pub fn execute(
    cmd: &CycleCommands,
    store: &SnapshotStore,
    dispatcher: &EventDispatcher,
) -> anyhow::Result<()> {
    let clock = SystemClock;
    match cmd {
        CycleCommands::List { status } => {
            let ledger = store.load()?;
            for cycle in ledger.cycles() {
                if let Some(filter) = status {
                    if cycle.status.to_string() != *filter {
                        continue;
                    }
                }
                println!(
                    "{}  [{}]  {}",
                    cycle.id, cycle.status, cycle.contract.terminal_outcome.text
                );
            }
            if !ledger.aspirations().is_empty() {
                println!("({} archived aspirations)", ledger.aspirations().len());
            }
        }
        CycleCommands::Show { id } => {
            let ledger = store.load()?;
            let cycle = ledger
                .cycle(id)
                .ok_or_else(|| anyhow::anyhow!("cycle not found: {id}"))?;
            println!("cycle {}", cycle.id);
            println!("  status:   {}", cycle.status);
            println!("  outcome:  {}", cycle.contract.terminal_outcome.text);
            println!("  deadline: {}", cycle.contract.deadline.day_key);
            println!(
                "  binding:  {} days/week at {}, {} min sessions",
                cycle.contract.temporal_binding.days_per_week,
                cycle.contract.temporal_binding.activation_time,
                cycle.contract.temporal_binding.session_duration_minutes
            );
            println!("  deliverables:");
            for d in &cycle.deliverables {
                println!(
                    "    {}  {} ({} blocks, {}, {} criteria)",
                    d.id,
                    d.title,
                    d.required_blocks,
                    d.domain,
                    d.criteria.len()
                );
            }
            println!("  plan versions: {}", cycle.plan_history.len());
            println!(
                "  suggestions:   {}",
                cycle.suggestion_log.suggestions().count()
            );
        }
        CycleCommands::End { id } => {
            let mut ledger = store.load()?;
            ledger.end_cycle(id, &clock)?;
            store.save(&ledger)?;
            dispatch_status_change(dispatcher, id, CycleStatus::Active, CycleStatus::Ended);
            println!("cycle {id} ended");
        }
        CycleCommands::Delete { id } => {
            let mut ledger = store.load()?;
            let from = ledger
                .cycle(id)
                .map(|c| c.status)
                .unwrap_or(CycleStatus::Active);
            ledger.delete_cycle(id)?;
            store.save(&ledger)?;
            dispatch_status_change(dispatcher, id, from, CycleStatus::Deleted);
            println!("cycle {id} deleted");
        }
        CycleCommands::Verify { id } => {
            let mut ledger = store.load()?;
            let ok = ledger.verify_contract_integrity(id)?;
            store.save(&ledger)?;
            if ok {
                println!("cycle {id}: inscription intact");
            } else {
                println!("cycle {id}: INTEGRITY COMPROMISED — contract drifted since inscription");
            }
        }
    }
    Ok(())
}

fn dispatch_status_change(
    dispatcher: &EventDispatcher,
    cycle_id: &str,
    from: CycleStatus,
    to: CycleStatus,
) {
    use cov_contract::day_key::Clock;
    dispatcher.dispatch(&CoreEvent::CycleStatusChanged {
        cycle_id: cycle_id.to_string(),
        from_status: from.to_string(),
        to_status: to.to_string(),
        timestamp: SystemClock.now(),
    });
}
