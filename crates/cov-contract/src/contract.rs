// contract.rs — GoalContractDraft and the sealed GoalExecutionContract.
//
// A draft is untrusted input: every section optional, free-form strings
// where the UI supplies them. Sealing happens only after the admission gate
// passes; the sealed contract has no optional sections and carries the
// inscription that pins its core fields.
//
// Immutability invariant: `inscription.contract_hash` must always equal the
// recomputed fingerprint of the normalized core fields. Any drift marks the
// contract compromised. The fingerprint is FNV-1a 64 — fast, deterministic,
// not a security primitive.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ContractError;
use crate::fingerprint::fnv1a_64;

/// The one plan-generation mechanism this engine supports.
///
/// Drafts carry the class as a free-form string so the gate can reject
/// unsupported values with a code instead of a deserialization failure.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MechanismClass {
    GenericDeterministic,
}

impl MechanismClass {
    pub const SUPPORTED: &'static str = "GENERIC_DETERMINISTIC";
}

/// How often the user has committed to checking in on the goal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckInFrequency {
    Daily,
    Weekly,
    OnProgress,
}

impl CheckInFrequency {
    /// Parse the draft's free-form value. `None` for anything outside the
    /// closed set — the gate turns that into a rejection code.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "DAILY" => Some(Self::Daily),
            "WEEKLY" => Some(Self::Weekly),
            "ON_PROGRESS" => Some(Self::OnProgress),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::OnProgress => "ON_PROGRESS",
        }
    }
}

impl fmt::Display for CheckInFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What will be achieved, and how completion will be verified.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct TerminalOutcome {
    /// Raw text declaration of the goal outcome.
    pub text: String,
    /// How completion will be confirmed at the deadline.
    pub verification_criteria: String,
    /// True when the outcome is concrete and measurable.
    pub is_concrete: bool,
}

/// The day the outcome is due.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Deadline {
    /// Canonical `YYYY-MM-DD` day-key.
    pub day_key: String,
    /// Soft deadlines are recorded but not treated differently by the gate.
    pub is_hard_deadline: bool,
}

/// What the user gives up to make room for the goal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SacrificeDeclaration {
    pub what_is_given_up: String,
    /// For how long (e.g., "6 weeks", "until deadline").
    pub duration: String,
    /// Quantified cost (e.g., "1 hour/day", "50% of leisure time").
    pub quantified_impact: String,
    pub rationale: String,
}

/// The recurring calendar commitment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TemporalBinding {
    /// Days per week committed to this goal. The gate requires 3..=7.
    pub days_per_week: u8,
    /// Which calendar days, free-form (e.g., "Mon, Wed, Fri").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_days: Option<String>,
    /// Wall-clock activation time (e.g., "09:00").
    pub activation_time: String,
    pub session_duration_minutes: u32,
    /// Canonical `YYYY-MM-DD` day-key the commitment starts on.
    pub start_day_key: String,
}

/// One intermediate milestone between now and the terminal outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CausalStep {
    pub sequence: u32,
    pub description: String,
    /// Day offset relative to the deadline, when the user estimated one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approximate_day_offset: Option<i32>,
}

/// The ordered reasoning chain from today to the outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CausalChain {
    pub steps: Vec<CausalStep>,
}

/// Daily-visibility commitment as submitted in a draft.
///
/// `check_in_frequency` stays a free-form string here; the sealed contract
/// holds the typed [`CheckInFrequency`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ReinforcementDisclosure {
    pub daily_exposure_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_mechanism: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_in_frequency: Option<String>,
}

/// Sealed reinforcement section: validated, non-optional.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reinforcement {
    pub daily_exposure_enabled: bool,
    pub daily_mechanism: String,
    pub check_in_frequency: CheckInFrequency,
}

/// The immutability record attached at inscription time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Inscription {
    /// FNV-1a 64 fingerprint of the normalized core fields.
    pub contract_hash: String,
    pub inscribed_at_iso: String,
    /// The user's acknowledgment text ("I understand this is binding").
    pub acknowledgment: String,
    /// Set once integrity verification ever observes hash drift.
    pub is_compromised: bool,
}

/// An untrusted draft commitment. Either it clears the admission gate and
/// is sealed, or it is archived as an aspiration — there is no third state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct GoalContractDraft {
    pub goal_id: String,
    pub plan_generation_mechanism_class: Option<String>,
    pub commitment_disclosure_accepted: bool,
    pub terminal_outcome: Option<TerminalOutcome>,
    pub deadline: Option<Deadline>,
    pub sacrifice: Option<SacrificeDeclaration>,
    pub temporal_binding: Option<TemporalBinding>,
    pub causal_chain: Option<CausalChain>,
    pub reinforcement: Option<ReinforcementDisclosure>,
    pub inscription: Option<Inscription>,
    /// The user marked this as an aspiration; aspirations are never admitted.
    pub is_aspirational: bool,
}

impl GoalContractDraft {
    /// Compute the fingerprint over this draft's normalized core fields.
    pub fn contract_hash(&self) -> String {
        hash_parts(
            self.terminal_outcome.as_ref(),
            self.deadline.as_ref().map(|d| d.day_key.as_str()),
            self.sacrifice.as_ref(),
            self.temporal_binding.as_ref(),
            self.causal_chain.as_ref(),
            self.reinforcement
                .as_ref()
                .map(|r| r.daily_exposure_enabled),
            self.reinforcement
                .as_ref()
                .and_then(|r| r.check_in_frequency.as_deref()),
        )
    }

    /// Attach an inscription pinning the draft's current core fields.
    pub fn inscribe(&mut self, acknowledgment: impl Into<String>, now_iso: impl Into<String>) {
        self.inscription = Some(Inscription {
            contract_hash: self.contract_hash(),
            inscribed_at_iso: now_iso.into(),
            acknowledgment: acknowledgment.into(),
            is_compromised: false,
        });
    }
}

/// An admitted, immutable commitment. Never edited after sealing — the
/// owning cycle's status changes, the contract does not.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GoalExecutionContract {
    pub goal_id: String,
    pub plan_generation_mechanism_class: MechanismClass,
    pub commitment_disclosure_accepted: bool,
    pub terminal_outcome: TerminalOutcome,
    pub deadline: Deadline,
    pub sacrifice: SacrificeDeclaration,
    pub temporal_binding: TemporalBinding,
    pub causal_chain: CausalChain,
    pub reinforcement: Reinforcement,
    pub inscription: Inscription,
    pub admitted_at_iso: String,
}

impl GoalExecutionContract {
    /// Seal an admitted draft. The gate guarantees every section is present
    /// and valid; a missing section here is a programmer error (a caller
    /// bypassed the gate) and fails fast.
    pub fn seal(draft: GoalContractDraft, admitted_at_iso: String) -> Result<Self, ContractError> {
        let mechanism = match draft.plan_generation_mechanism_class.as_deref() {
            Some(MechanismClass::SUPPORTED) => MechanismClass::GenericDeterministic,
            _ => {
                return Err(ContractError::MissingSection {
                    section: "plan_generation_mechanism_class",
                })
            }
        };
        let reinforcement = draft
            .reinforcement
            .ok_or(ContractError::MissingSection {
                section: "reinforcement",
            })
            .and_then(|r| {
                let frequency = r
                    .check_in_frequency
                    .as_deref()
                    .and_then(CheckInFrequency::parse)
                    .ok_or(ContractError::MissingSection {
                        section: "reinforcement.check_in_frequency",
                    })?;
                Ok(Reinforcement {
                    daily_exposure_enabled: r.daily_exposure_enabled,
                    daily_mechanism: r.daily_mechanism.unwrap_or_default(),
                    check_in_frequency: frequency,
                })
            })?;

        Ok(Self {
            goal_id: draft.goal_id,
            plan_generation_mechanism_class: mechanism,
            commitment_disclosure_accepted: draft.commitment_disclosure_accepted,
            terminal_outcome: draft.terminal_outcome.ok_or(ContractError::MissingSection {
                section: "terminal_outcome",
            })?,
            deadline: draft.deadline.ok_or(ContractError::MissingSection {
                section: "deadline",
            })?,
            sacrifice: draft.sacrifice.ok_or(ContractError::MissingSection {
                section: "sacrifice",
            })?,
            temporal_binding: draft.temporal_binding.ok_or(ContractError::MissingSection {
                section: "temporal_binding",
            })?,
            causal_chain: draft.causal_chain.ok_or(ContractError::MissingSection {
                section: "causal_chain",
            })?,
            reinforcement,
            inscription: draft.inscription.ok_or(ContractError::MissingSection {
                section: "inscription",
            })?,
            admitted_at_iso,
        })
    }

    /// Recompute the fingerprint over the sealed core fields.
    pub fn contract_hash(&self) -> String {
        hash_parts(
            Some(&self.terminal_outcome),
            Some(self.deadline.day_key.as_str()),
            Some(&self.sacrifice),
            Some(&self.temporal_binding),
            Some(&self.causal_chain),
            Some(self.reinforcement.daily_exposure_enabled),
            Some(self.reinforcement.check_in_frequency.as_str()),
        )
    }

    /// True when the inscription still matches the recomputed fingerprint.
    pub fn integrity_ok(&self) -> bool {
        self.inscription.contract_hash == self.contract_hash()
    }

    /// Normalized outcome text used for duplicate-active detection.
    pub fn outcome_signature_text(&self) -> String {
        self.terminal_outcome.text.trim().to_lowercase()
    }
}

// Normalization mirrors what was declared, not how it was typed: trimmed
// strings, stable field order, missing sections as empty parts.

fn normalize_terminal_outcome(outcome: &TerminalOutcome) -> String {
    #[derive(Serialize)]
    struct Normal<'a> {
        text: &'a str,
        verification_criteria: &'a str,
        is_concrete: bool,
    }
    // Struct serialization is infallible for these field types.
    serde_json::to_string(&Normal {
        text: outcome.text.trim(),
        verification_criteria: outcome.verification_criteria.trim(),
        is_concrete: outcome.is_concrete,
    })
    .unwrap_or_default()
}

fn normalize_sacrifice(sacrifice: &SacrificeDeclaration) -> String {
    #[derive(Serialize)]
    struct Normal<'a> {
        what_is_given_up: &'a str,
        duration: &'a str,
        quantified_impact: &'a str,
        rationale: &'a str,
    }
    serde_json::to_string(&Normal {
        what_is_given_up: sacrifice.what_is_given_up.trim(),
        duration: sacrifice.duration.trim(),
        quantified_impact: sacrifice.quantified_impact.trim(),
        rationale: sacrifice.rationale.trim(),
    })
    .unwrap_or_default()
}

fn normalize_causal_chain(chain: &CausalChain) -> String {
    #[derive(Serialize)]
    struct NormalStep<'a> {
        sequence: u32,
        description: &'a str,
        approximate_day_offset: Option<i32>,
    }
    let steps: Vec<NormalStep<'_>> = chain
        .steps
        .iter()
        .map(|s| NormalStep {
            sequence: s.sequence,
            description: s.description.trim(),
            approximate_day_offset: s.approximate_day_offset,
        })
        .collect();
    serde_json::to_string(&steps).unwrap_or_default()
}

#[allow(clippy::too_many_arguments)]
fn hash_parts(
    outcome: Option<&TerminalOutcome>,
    deadline_day_key: Option<&str>,
    sacrifice: Option<&SacrificeDeclaration>,
    binding: Option<&TemporalBinding>,
    chain: Option<&CausalChain>,
    daily_exposure_enabled: Option<bool>,
    check_in_frequency: Option<&str>,
) -> String {
    let parts = [
        outcome.map(normalize_terminal_outcome).unwrap_or_default(),
        deadline_day_key.unwrap_or_default().to_string(),
        sacrifice.map(normalize_sacrifice).unwrap_or_default(),
        binding
            .map(|b| b.days_per_week.to_string())
            .unwrap_or_default(),
        binding
            .map(|b| b.activation_time.clone())
            .unwrap_or_default(),
        chain.map(normalize_causal_chain).unwrap_or_default(),
        daily_exposure_enabled
            .map(|e| e.to_string())
            .unwrap_or_default(),
        check_in_frequency.unwrap_or_default().to_string(),
    ];
    fnv1a_64(&parts.join("|"))
}
