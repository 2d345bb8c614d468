// submit.rs — run a draft contract through the admission gate.

use std::fs;
use std::path::Path;

use anyhow::Context;

use cov_contract::{GoalContractDraft, SystemClock};
use cov_cycle::{CoreEvent, EventDispatcher, SnapshotStore, SubmissionOutcome};
use cov_plan::Deliverable;

pub fn execute(
    store: &SnapshotStore,
    dispatcher: &EventDispatcher,
    draft_path: &Path,
    deliverables_path: Option<&Path>,
    acknowledge: Option<&str>,
) -> anyhow::Result<()> {
    let clock = SystemClock;
    let json = fs::read_to_string(draft_path)
        .with_context(|| format!("reading draft {}", draft_path.display()))?;
    let mut draft: GoalContractDraft =
        serde_json::from_str(&json).context("draft is not a valid contract draft")?;

    if let Some(acknowledgment) = acknowledge {
        use cov_contract::day_key::Clock;
        draft.inscribe(acknowledgment, clock.now_iso());
        println!("inscribed draft (fingerprint {})", draft.contract_hash());
    }

    let user_deliverables: Vec<Deliverable> = match deliverables_path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("reading deliverables {}", path.display()))?;
            serde_json::from_str(&json).context("deliverables file is not a valid array")?
        }
        None => Vec::new(),
    };

    let mut ledger = store.load()?;
    let outcome = ledger.submit_goal_contract(draft, user_deliverables, &clock)?;
    store.save(&ledger)?;

    match &outcome {
        SubmissionOutcome::Admitted { cycle_id, .. } => {
            let cycle = ledger
                .cycle(cycle_id)
                .ok_or_else(|| anyhow::anyhow!("cycle {cycle_id} missing after admission"))?;
            dispatcher.dispatch(&CoreEvent::ContractAdmitted {
                cycle_id: cycle_id.clone(),
                goal_id: cycle.contract.goal_id.clone(),
                outcome_text: cycle.contract.terminal_outcome.text.clone(),
                timestamp: chrono_now(),
            });
            if let Some(plan) = cycle.latest_plan() {
                dispatcher.dispatch(&CoreEvent::ColdPlanGenerated {
                    cycle_id: cycle_id.clone(),
                    version: plan.version,
                    assumptions_hash: plan.assumptions_hash.clone(),
                    feasible: plan.is_feasible(),
                    timestamp: chrono_now(),
                });
            }
            println!("ADMITTED — cycle {cycle_id}");
            println!("  deliverables: {}", cycle.deliverables.len());
            if let Some(plan) = cycle.latest_plan() {
                match &plan.infeasible {
                    None => println!(
                        "  cold plan v{}: {} forecast days",
                        plan.version,
                        plan.forecast_by_day_key.len()
                    ),
                    Some(report) => println!(
                        "  cold plan v{} INFEASIBLE ({}): need {}/week, have {}/week",
                        plan.version,
                        report.reason,
                        report.required_capacity_per_week,
                        report.available_capacity_per_week
                    ),
                }
            }
            println!(
                "  suggestions: {}",
                cycle.suggestion_log.suggestions().count()
            );
        }
        SubmissionOutcome::Rejected {
            aspiration_id,
            result,
        } => {
            dispatcher.dispatch(&CoreEvent::ContractRejected {
                aspiration_id: aspiration_id.clone(),
                rejection_codes: result.rejection_codes.clone(),
                timestamp: chrono_now(),
            });
            println!(
                "REJECTED — archived as aspiration {aspiration_id} ({} violations)",
                result.rejection_codes.len()
            );
            for (code, message) in result
                .rejection_codes
                .iter()
                .zip(result.rejection_messages.iter())
            {
                println!("  {code}: {message}");
            }
        }
    }
    Ok(())
}

fn chrono_now() -> chrono::DateTime<chrono::Utc> {
    use cov_contract::day_key::Clock;
    SystemClock.now()
}
