// admission.rs — the hard-constraint admission gate.
//
// Either a draft passes every hard validation or it does not. No warnings,
// no "close enough". Validation is exhaustive rather than short-circuiting:
// every phase runs and appends its codes, so a user sees every violated
// constraint in one pass.
//
// Phase order (fixed, for deterministic message ordering):
//   1. Plan generation mechanism     6. Sacrifice
//   2. Commitment disclosure         7. Temporal binding
//   3. Inscription integrity         8. Causal chain
//   4. Terminal outcome              9. Reinforcement
//   5. Deadline                     10. Meta (aspirational / duplicates)
//
// The compound-goal pre-screen lives in the orchestrating cycle layer and
// runs *before* this gate; so do all side effects (archiving aspirations,
// creating cycles).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::contract::{CheckInFrequency, GoalContractDraft, MechanismClass};
use crate::day_key::{is_valid_day_key, parse_day_key};
use crate::rejection::RejectionCode;

/// Sacrifice phrasings that signal no real cost was declared.
const HEDGING_TERMS: &[&str] = &[
    "maybe",
    "might",
    "could",
    "possibly",
    "no sacrifice",
    "nothing",
];

/// Minimum full calendar days between now and an admissible deadline.
const MIN_DEADLINE_DAYS: f64 = 3.0;

/// Outcome text + contract fingerprint of a currently active goal.
/// Either matching is sufficient grounds for `DUPLICATE_ACTIVE`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActiveGoalSignature {
    pub outcome_text: String,
    pub contract_hash: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdmissionStatus {
    Admitted,
    Rejected,
}

/// The gate's verdict: admitted with zero codes, or rejected with every
/// violated constraint enumerated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdmissionResult {
    pub status: AdmissionStatus,
    pub rejection_codes: Vec<RejectionCode>,
    pub rejection_messages: Vec<String>,
    pub assessed_at_iso: String,
}

impl AdmissionResult {
    pub fn is_admitted(&self) -> bool {
        self.status == AdmissionStatus::Admitted
    }

    /// Build a result from accumulated codes. Zero codes means admitted.
    /// Also used by the orchestration layer for the compound pre-screen's
    /// dedicated rejection.
    pub fn from_codes(codes: Vec<RejectionCode>, assessed_at: DateTime<Utc>) -> Self {
        let status = if codes.is_empty() {
            AdmissionStatus::Admitted
        } else {
            AdmissionStatus::Rejected
        };
        let rejection_messages = codes.iter().map(|c| c.message().to_string()).collect();
        Self {
            status,
            rejection_codes: codes,
            rejection_messages,
            assessed_at_iso: assessed_at.to_rfc3339(),
        }
    }
}

/// Run every admission phase against a draft.
///
/// `now` is supplied by the caller (via a [`Clock`](crate::day_key::Clock))
/// so assessment is replayable. `active_signatures` is the duplicate-scope:
/// one signature per currently active goal, system-wide.
pub fn assess_admission(
    draft: &GoalContractDraft,
    now: DateTime<Utc>,
    active_signatures: &[ActiveGoalSignature],
) -> AdmissionResult {
    let mut codes = CodeSet::new();

    // Phase 1: plan generation mechanism.
    match draft.plan_generation_mechanism_class.as_deref() {
        None | Some("") => codes.push(RejectionCode::PlanGenerationMechanismMissing),
        Some(MechanismClass::SUPPORTED) => {}
        Some(_) => codes.push(RejectionCode::PlanGenerationMechanismUnsupported),
    }

    // Phase 2: commitment disclosure.
    if !draft.commitment_disclosure_accepted {
        codes.push(RejectionCode::RejectDisclosureRequired);
    }

    // Phase 3: inscription integrity.
    match draft.inscription.as_ref() {
        None => codes.push(RejectionCode::InscriptionMissing),
        Some(inscription) => {
            if inscription.contract_hash != draft.contract_hash() {
                codes.push(RejectionCode::InscriptionNotImmutable);
            }
        }
    }

    // Phase 4: terminal outcome.
    match draft.terminal_outcome.as_ref() {
        None => codes.push(RejectionCode::TerminalOutcomeMissing),
        Some(outcome) => {
            if outcome.text.trim().len() < 5 {
                codes.push(RejectionCode::TerminalOutcomeVague);
            }
            if !outcome.is_concrete {
                codes.push(RejectionCode::TerminalOutcomeImmeasurable);
            }
            if outcome.verification_criteria.trim().len() < 3 {
                codes.push(RejectionCode::TerminalOutcomeImmeasurable);
            }
        }
    }

    // Phase 5: deadline. A non-canonical day-key (time component, partial
    // date, non-numeric) is MISSING, not a separate format code.
    match draft.deadline.as_ref() {
        None => codes.push(RejectionCode::DeadlineMissing),
        Some(deadline) => match parse_day_key(&deadline.day_key) {
            Err(_) => codes.push(RejectionCode::DeadlineMissing),
            Ok(date) => {
                // The deadline holds until the end of its day.
                let deadline_end = date
                    .and_hms_milli_opt(23, 59, 59, 999)
                    .map(|t| t.and_utc())
                    .unwrap_or(now);
                if deadline_end <= now {
                    codes.push(RejectionCode::DeadlineInPast);
                }
                let days_until = (deadline_end - now).num_seconds() as f64 / 86_400.0;
                if days_until < MIN_DEADLINE_DAYS {
                    codes.push(RejectionCode::DeadlineTooSoon);
                }
            }
        },
    }

    // Phase 6: sacrifice.
    match draft.sacrifice.as_ref() {
        None => codes.push(RejectionCode::SacrificeMissing),
        Some(sacrifice) => {
            if sacrifice.what_is_given_up.trim().len() < 3 {
                codes.push(RejectionCode::SacrificeVague);
            }
            if sacrifice.quantified_impact.trim().len() < 2 {
                codes.push(RejectionCode::SacrificeVague);
            }
            let lowered = sacrifice.what_is_given_up.to_lowercase();
            if HEDGING_TERMS.iter().any(|term| lowered.contains(term)) {
                codes.push(RejectionCode::SacrificeNotBinding);
            }
        }
    }

    // Phase 7: temporal binding.
    match draft.temporal_binding.as_ref() {
        None => codes.push(RejectionCode::TemporalBindingInvalid),
        Some(binding) => {
            if !(3..=7).contains(&binding.days_per_week) {
                codes.push(RejectionCode::TemporalBindingInsufficient);
            }
            if binding.activation_time.trim().len() < 4 {
                codes.push(RejectionCode::TemporalBindingInvalid);
            }
            if binding.session_duration_minutes < 15 {
                codes.push(RejectionCode::TemporalBindingInvalid);
            }
            if !is_valid_day_key(&binding.start_day_key) {
                codes.push(RejectionCode::TemporalBindingInvalid);
            }
        }
    }

    // Phase 8: causal chain. Duplicate sequence numbers read as a loop.
    match draft.causal_chain.as_ref() {
        None => codes.push(RejectionCode::CausalChainIncomplete),
        Some(chain) => {
            if chain.steps.is_empty() {
                codes.push(RejectionCode::CausalChainIncomplete);
            }
            let mut sequences: Vec<u32> = chain.steps.iter().map(|s| s.sequence).collect();
            sequences.sort_unstable();
            sequences.dedup();
            if sequences.len() != chain.steps.len() {
                codes.push(RejectionCode::CausalChainCircular);
            }
        }
    }

    // Phase 9: reinforcement. Daily exposure is non-negotiable.
    match draft.reinforcement.as_ref() {
        None => codes.push(RejectionCode::ReinforcementNotDeclared),
        Some(reinforcement) => {
            if !reinforcement.daily_exposure_enabled {
                codes.push(RejectionCode::ReinforcementNotDeclared);
            }
            let mechanism_empty = reinforcement
                .daily_mechanism
                .as_deref()
                .map_or(true, |m| m.trim().is_empty());
            if reinforcement.daily_exposure_enabled && mechanism_empty {
                codes.push(RejectionCode::ReinforcementContradiction);
            }
            let frequency_valid = reinforcement
                .check_in_frequency
                .as_deref()
                .and_then(CheckInFrequency::parse)
                .is_some();
            if !frequency_valid {
                codes.push(RejectionCode::ReinforcementNotDeclared);
            }
        }
    }

    // Phase 10: meta. Text match and fingerprint match are each sufficient.
    if draft.is_aspirational {
        codes.push(RejectionCode::AspirationalOnly);
    }
    if let Some(outcome) = draft.terminal_outcome.as_ref() {
        let normalized = outcome.text.trim().to_lowercase();
        if active_signatures
            .iter()
            .any(|sig| sig.outcome_text.trim().to_lowercase() == normalized)
        {
            codes.push(RejectionCode::DuplicateActive);
        }
    }
    let candidate_hash = draft.contract_hash();
    if active_signatures
        .iter()
        .any(|sig| sig.contract_hash == candidate_hash)
    {
        codes.push(RejectionCode::DuplicateActive);
    }

    let result = AdmissionResult::from_codes(codes.into_vec(), now);
    tracing::debug!(
        status = ?result.status,
        codes = result.rejection_codes.len(),
        "admission assessed"
    );
    result
}

/// Order-preserving code accumulator. A phase can trip the same code twice
/// (e.g. two vague sacrifice fields); one entry per code keeps the message
/// list 1:1 with the codes.
struct CodeSet(Vec<RejectionCode>);

impl CodeSet {
    fn new() -> Self {
        Self(Vec::new())
    }

    fn push(&mut self, code: RejectionCode) {
        if !self.0.contains(&code) {
            self.0.push(code);
        }
    }

    fn into_vec(self) -> Vec<RejectionCode> {
        self.0
    }
}
