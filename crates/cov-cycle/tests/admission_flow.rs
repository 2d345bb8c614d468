// admission_flow.rs — end-to-end slice: submit → plan → suggest → signals.
//
// Exercises the full pipeline the way a frontend would drive it, with a
// frozen clock so every assertion is replayable.

use cov_contract::contract::{
    CausalChain, CausalStep, Deadline, GoalContractDraft, MechanismClass,
    ReinforcementDisclosure, SacrificeDeclaration, TemporalBinding, TerminalOutcome,
};
use cov_contract::{FixedClock, RejectionCode};
use cov_cycle::{
    CycleLedger, Placement, RejectReason, SubmissionOutcome, TransitionOutcome,
};
use cov_plan::Domain;

fn clock() -> FixedClock {
    FixedClock::from_rfc3339("2026-01-10T08:00:00Z").unwrap()
}

fn draft(outcome: &str, deadline: &str, start: &str, days_per_week: u8) -> GoalContractDraft {
    let mut draft = GoalContractDraft {
        goal_id: String::new(),
        plan_generation_mechanism_class: Some(MechanismClass::SUPPORTED.to_string()),
        commitment_disclosure_accepted: true,
        terminal_outcome: Some(TerminalOutcome {
            text: outcome.to_string(),
            verification_criteria: "observable at the deadline".to_string(),
            is_concrete: true,
        }),
        deadline: Some(Deadline {
            day_key: deadline.to_string(),
            is_hard_deadline: true,
        }),
        sacrifice: Some(SacrificeDeclaration {
            what_is_given_up: "Weeknight television".to_string(),
            duration: "until the deadline".to_string(),
            quantified_impact: "90 min/day".to_string(),
            rationale: "The evenings are the only open window".to_string(),
        }),
        temporal_binding: Some(TemporalBinding {
            days_per_week,
            specific_days: None,
            activation_time: "08:00".to_string(),
            session_duration_minutes: 60,
            start_day_key: start.to_string(),
        }),
        causal_chain: Some(CausalChain {
            steps: vec![
                CausalStep {
                    sequence: 1,
                    description: "Draft the outline".to_string(),
                    approximate_day_offset: Some(-30),
                },
                CausalStep {
                    sequence: 2,
                    description: "Iterate to final".to_string(),
                    approximate_day_offset: Some(-5),
                },
            ],
        }),
        reinforcement: Some(ReinforcementDisclosure {
            daily_exposure_enabled: true,
            daily_mechanism: Some("Calendar block title".to_string()),
            check_in_frequency: Some("DAILY".to_string()),
        }),
        inscription: None,
        is_aspirational: false,
    };
    draft.inscribe("I understand this is binding", "2026-01-10T07:00:00+00:00");
    draft
}

#[test]
fn admitted_contract_forecast_respects_daily_cap_and_is_reproducible() {
    // Deadline 2026-02-20, start 2026-01-10, 5 days/week.
    let mut ledger = CycleLedger::new();
    let outcome = ledger
        .submit_goal_contract(
            draft("Ship the photography portfolio site", "2026-02-20", "2026-01-10", 5),
            Vec::new(),
            &clock(),
        )
        .unwrap();
    let SubmissionOutcome::Admitted { cycle_id, result } = outcome else {
        panic!("expected admission");
    };
    assert!(result.rejection_codes.is_empty());

    let cycle = ledger.cycle(&cycle_id).unwrap();
    assert!(cycle.deliverables.len() >= 3);
    let plan = cycle.latest_plan().unwrap();
    assert!(plan.is_feasible());
    for (day, forecast) in &plan.forecast_by_day_key {
        assert!(forecast.total_blocks <= 4, "{day} exceeds the daily cap");
    }

    // Regenerating twice from identical state yields byte-identical JSON.
    let mut ledger_a = ledger.clone();
    let mut ledger_b = ledger.clone();
    let plan_a = ledger_a.regenerate_plan(&cycle_id, &clock()).unwrap();
    let plan_b = ledger_b.regenerate_plan(&cycle_id, &clock()).unwrap();
    assert_eq!(
        serde_json::to_string(&plan_a).unwrap(),
        serde_json::to_string(&plan_b).unwrap()
    );
    assert_eq!(plan_a.assumptions_hash, plan_b.assumptions_hash);
}

#[test]
fn compound_goal_short_circuits_into_an_aspiration() {
    // The compound rejection fires before any other phase runs: an
    // aspiration is created and no cycle is created.
    let mut ledger = CycleLedger::new();
    let outcome = ledger
        .submit_goal_contract(
            draft(
                "Build the app and also launch the marketing campaign simultaneously across all platforms",
                "2026-02-20",
                "2026-01-10",
                5,
            ),
            Vec::new(),
            &clock(),
        )
        .unwrap();

    let SubmissionOutcome::Rejected { result, .. } = outcome else {
        panic!("compound outcome must be rejected");
    };
    assert_eq!(result.rejection_codes, vec![RejectionCode::CompoundOutcome]);
    assert_eq!(ledger.cycles().count(), 0);
    assert_eq!(ledger.aspirations().len(), 1);
}

#[test]
fn exhaustive_rejection_enumerates_every_missing_section() {
    let mut ledger = CycleLedger::new();
    let mut bad = draft("Something vague enough", "2026-02-20", "2026-01-10", 5);
    bad.terminal_outcome = None;
    bad.sacrifice = None;
    bad.deadline = None;
    bad.inscribe("ack", "2026-01-10T07:00:30+00:00");

    let outcome = ledger
        .submit_goal_contract(bad, Vec::new(), &clock())
        .unwrap();
    let result = outcome.result();
    for expected in [
        RejectionCode::TerminalOutcomeMissing,
        RejectionCode::SacrificeMissing,
        RejectionCode::DeadlineMissing,
    ] {
        assert!(result.rejection_codes.contains(&expected));
    }
    assert!(result.rejection_codes.len() >= 3);
}

#[test]
fn duplicate_active_outcome_is_rejected_case_insensitively() {
    let mut ledger = CycleLedger::new();
    ledger
        .submit_goal_contract(
            draft("Finish the woodworking bench", "2026-02-20", "2026-01-10", 4),
            Vec::new(),
            &clock(),
        )
        .unwrap();

    let second = ledger
        .submit_goal_contract(
            draft("FINISH THE WOODWORKING BENCH", "2026-02-20", "2026-01-10", 4),
            Vec::new(),
            &clock(),
        )
        .unwrap();
    assert!(second
        .result()
        .rejection_codes
        .contains(&RejectionCode::DuplicateActive));
}

#[test]
fn suggestion_lifecycle_is_terminal_and_strict_mode_gates_acceptance() {
    let mut ledger = CycleLedger::new();
    let SubmissionOutcome::Admitted { cycle_id, .. } = ledger
        .submit_goal_contract(
            draft("Record the interview series", "2026-02-20", "2026-01-10", 5),
            Vec::new(),
            &clock(),
        )
        .unwrap()
    else {
        panic!("expected admission");
    };

    // Pick a suggestion seeded against a progress-domain deliverable.
    let suggestion_id = ledger
        .cycle(&cycle_id)
        .unwrap()
        .suggestion_log
        .suggestions()
        .find(|s| s.domain.is_progress())
        .unwrap()
        .id
        .clone();

    let progress_placement = |criterion: Option<&str>| Placement {
        day_key: "2026-01-12".to_string(),
        time: "08:00".to_string(),
        duration_minutes: 60,
        domain: Domain::Creation,
        deliverable_id: Some("auto-deliv-2".to_string()),
        criterion_id: criterion.map(str::to_string),
    };

    // Strict mode on, no linked criterion: refused.
    let refused = ledger
        .accept_suggestion(&cycle_id, &suggestion_id, progress_placement(None), true, &clock())
        .unwrap();
    assert!(matches!(refused, TransitionOutcome::Refused { .. }));

    // Strict mode off: the same placement is accepted.
    let accepted = ledger
        .accept_suggestion(&cycle_id, &suggestion_id, progress_placement(None), false, &clock())
        .unwrap();
    assert!(matches!(accepted, TransitionOutcome::Applied { .. }));

    // Accepted is terminal: ignore and dismiss are no-ops now.
    let ignored = ledger
        .ignore_suggestion(&cycle_id, &suggestion_id, &clock())
        .unwrap();
    assert!(matches!(ignored, TransitionOutcome::AlreadyTerminal { .. }));
    let dismissed = ledger
        .dismiss_suggestion(&cycle_id, &suggestion_id, &clock())
        .unwrap();
    assert!(matches!(dismissed, TransitionOutcome::AlreadyTerminal { .. }));
}

#[test]
fn rejections_feed_correction_signals() {
    let mut ledger = CycleLedger::new();
    let SubmissionOutcome::Admitted { cycle_id, .. } = ledger
        .submit_goal_contract(
            draft("Translate the essay collection", "2026-02-20", "2026-01-10", 6),
            Vec::new(),
            &clock(),
        )
        .unwrap()
    else {
        panic!("expected admission");
    };

    let ids: Vec<String> = ledger
        .cycle(&cycle_id)
        .unwrap()
        .suggestion_log
        .suggestions()
        .map(|s| s.id.clone())
        .collect();
    assert!(ids.len() >= 5);

    for id in ids.iter().take(3) {
        ledger
            .reject_suggestion(&cycle_id, id, RejectReason::Overcommitted, &clock())
            .unwrap();
    }
    ledger
        .reject_suggestion(&cycle_id, &ids[3], RejectReason::WrongTime, &clock())
        .unwrap();

    let signals = ledger.correction_signals(&cycle_id, &clock()).unwrap();
    assert_eq!(signals.total_rejections, 4);
    assert_eq!(signals.signals.capacity_pressure.value, 0.75);
    assert_eq!(
        signals.recommendations,
        vec![cov_cycle::Recommendation::LowerWeeklyBlockTarget]
    );
}

#[test]
fn rebase_from_today_preserves_past_forecast_entries() {
    let mut ledger = CycleLedger::new();
    let SubmissionOutcome::Admitted { cycle_id, .. } = ledger
        .submit_goal_contract(
            draft("Catalogue the archive boxes", "2026-02-20", "2026-01-10", 5),
            Vec::new(),
            &clock(),
        )
        .unwrap()
    else {
        panic!("expected admission");
    };

    let original = ledger.cycle(&cycle_id).unwrap().latest_plan().unwrap().clone();

    // A week passes before the rebase.
    let later = FixedClock::from_rfc3339("2026-01-17T08:00:00Z").unwrap();
    let rebased = ledger.rebase_plan_from_today(&cycle_id, &later).unwrap();

    assert_eq!(rebased.version, 2);
    for (day, forecast) in &original.forecast_by_day_key {
        if day.as_str() < "2026-01-17" {
            assert_eq!(rebased.forecast_by_day_key.get(day), Some(forecast));
        }
    }

    // History kept both versions, order intact.
    let cycle = ledger.cycle(&cycle_id).unwrap();
    assert_eq!(cycle.plan_history.len(), 2);
    assert_eq!(cycle.plan_history[0].version, 1);
}
