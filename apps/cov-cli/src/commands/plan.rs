// plan.rs — cold-plan subcommands: show, regenerate, rebase, projection.

use clap::Subcommand;

use cov_contract::day_key::Clock;
use cov_contract::SystemClock;
use cov_cycle::{CoreEvent, EventDispatcher, SnapshotStore};
use cov_plan::ColdPlan;

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Show the current plan version's forecast.
    Show {
        /// Cycle ID.
        cycle_id: String,
    },
    /// Recompute the whole horizon from the current strategy.
    Regenerate {
        /// Cycle ID.
        cycle_id: String,
    },
    /// Recompute day-keys from today on, keeping past entries untouched.
    Rebase {
        /// Cycle ID.
        cycle_id: String,
    },
    /// Read-only rebase preview; appends no history.
    Projection {
        /// Cycle ID.
        cycle_id: String,
    },
}

pub fn execute(
    cmd: &PlanCommands,
    store: &SnapshotStore,
    dispatcher: &EventDispatcher,
) -> anyhow::Result<()> {
    let clock = SystemClock;
    match cmd {
        PlanCommands::Show { cycle_id } => {
            let ledger = store.load()?;
            let cycle = ledger
                .cycle(cycle_id)
                .ok_or_else(|| anyhow::anyhow!("cycle not found: {cycle_id}"))?;
            let plan = cycle
                .latest_plan()
                .ok_or_else(|| anyhow::anyhow!("cycle {cycle_id} has no plan"))?;
            print_plan(plan);
        }
        PlanCommands::Regenerate { cycle_id } => {
            let mut ledger = store.load()?;
            let plan = ledger.regenerate_plan(cycle_id, &clock)?;
            store.save(&ledger)?;
            dispatch_generated(dispatcher, cycle_id, &plan);
            println!("regenerated:");
            print_plan(&plan);
        }
        PlanCommands::Rebase { cycle_id } => {
            let mut ledger = store.load()?;
            let plan = ledger.rebase_plan_from_today(cycle_id, &clock)?;
            store.save(&ledger)?;
            dispatch_generated(dispatcher, cycle_id, &plan);
            println!("rebased from today:");
            print_plan(&plan);
        }
        PlanCommands::Projection { cycle_id } => {
            let ledger = store.load()?;
            let projection = ledger.daily_projection(cycle_id, &clock)?;
            println!(
                "projection as of {} (derived from plan v{})",
                projection.as_of_day_key, projection.derived_from.cold_plan_version
            );
            println!(
                "  remaining required blocks: {}",
                projection.remaining_required_blocks
            );
            match &projection.infeasible {
                None => {
                    for (day, forecast) in &projection.forecast_by_day_key {
                        println!("  {day}: {}", forecast.total_blocks);
                    }
                }
                Some(report) => println!(
                    "  INFEASIBLE ({}): need {}/week, have {}/week",
                    report.reason,
                    report.required_capacity_per_week,
                    report.available_capacity_per_week
                ),
            }
        }
    }
    Ok(())
}

fn print_plan(plan: &ColdPlan) {
    println!(
        "plan v{} ({}) assumptions {}",
        plan.version, plan.created_at_iso, plan.assumptions_hash
    );
    match &plan.infeasible {
        None => {
            for (day, forecast) in &plan.forecast_by_day_key {
                let split: Vec<String> = forecast
                    .by_deliverable
                    .iter()
                    .map(|(id, n)| format!("{id}:{n}"))
                    .collect();
                println!("  {day}: {}  [{}]", forecast.total_blocks, split.join(" "));
            }
        }
        Some(report) => println!(
            "  INFEASIBLE ({}): need {}/week, have {}/week",
            report.reason, report.required_capacity_per_week, report.available_capacity_per_week
        ),
    }
}

fn dispatch_generated(dispatcher: &EventDispatcher, cycle_id: &str, plan: &ColdPlan) {
    dispatcher.dispatch(&CoreEvent::ColdPlanGenerated {
        cycle_id: cycle_id.to_string(),
        version: plan.version,
        assumptions_hash: plan.assumptions_hash.clone(),
        feasible: plan.is_feasible(),
        timestamp: SystemClock.now(),
    });
}
