// rejection.rs — the closed rejection taxonomy.
//
// No soft validations, no overridable warnings: each code is a hard
// constraint violation that makes a draft non-admissible. The code strings
// and the message table are a frozen contract — callers render them
// directly, the core performs no presentation logic.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Hard constraints that prevent goal admission.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionCode {
    // Plan generation mechanism violations
    PlanGenerationMechanismMissing,
    PlanGenerationMechanismUnsupported,

    // Commitment disclosure violations
    RejectDisclosureRequired,

    // Inscription violations
    InscriptionMissing,
    InscriptionNotImmutable,

    // Terminal outcome violations
    TerminalOutcomeMissing,
    TerminalOutcomeVague,
    TerminalOutcomeImmeasurable,

    // Deadline violations
    DeadlineMissing,
    DeadlineInPast,
    DeadlineTooSoon,

    // Sacrifice declaration violations
    SacrificeMissing,
    SacrificeVague,
    SacrificeNotBinding,

    // Temporal binding violations
    TemporalBindingInvalid,
    TemporalBindingInsufficient,

    // Causal chain violations
    CausalChainIncomplete,
    CausalChainCircular,

    // Reinforcement disclosure violations
    ReinforcementNotDeclared,
    ReinforcementContradiction,

    // Meta violations
    AspirationalOnly,
    DuplicateActive,
    CompoundOutcome,
}

impl RejectionCode {
    /// Every code, in stable declaration order.
    pub const ALL: &'static [RejectionCode] = &[
        Self::PlanGenerationMechanismMissing,
        Self::PlanGenerationMechanismUnsupported,
        Self::RejectDisclosureRequired,
        Self::InscriptionMissing,
        Self::InscriptionNotImmutable,
        Self::TerminalOutcomeMissing,
        Self::TerminalOutcomeVague,
        Self::TerminalOutcomeImmeasurable,
        Self::DeadlineMissing,
        Self::DeadlineInPast,
        Self::DeadlineTooSoon,
        Self::SacrificeMissing,
        Self::SacrificeVague,
        Self::SacrificeNotBinding,
        Self::TemporalBindingInvalid,
        Self::TemporalBindingInsufficient,
        Self::CausalChainIncomplete,
        Self::CausalChainCircular,
        Self::ReinforcementNotDeclared,
        Self::ReinforcementContradiction,
        Self::AspirationalOnly,
        Self::DuplicateActive,
        Self::CompoundOutcome,
    ];

    /// The stable wire string for this code.
    pub fn as_code(&self) -> &'static str {
        match self {
            Self::PlanGenerationMechanismMissing => "PLAN_GENERATION_MECHANISM_MISSING",
            Self::PlanGenerationMechanismUnsupported => "PLAN_GENERATION_MECHANISM_UNSUPPORTED",
            Self::RejectDisclosureRequired => "REJECT_DISCLOSURE_REQUIRED",
            Self::InscriptionMissing => "INSCRIPTION_MISSING",
            Self::InscriptionNotImmutable => "INSCRIPTION_NOT_IMMUTABLE",
            Self::TerminalOutcomeMissing => "TERMINAL_OUTCOME_MISSING",
            Self::TerminalOutcomeVague => "TERMINAL_OUTCOME_VAGUE",
            Self::TerminalOutcomeImmeasurable => "TERMINAL_OUTCOME_IMMEASURABLE",
            Self::DeadlineMissing => "DEADLINE_MISSING",
            Self::DeadlineInPast => "DEADLINE_IN_PAST",
            Self::DeadlineTooSoon => "DEADLINE_TOO_SOON",
            Self::SacrificeMissing => "SACRIFICE_MISSING",
            Self::SacrificeVague => "SACRIFICE_VAGUE",
            Self::SacrificeNotBinding => "SACRIFICE_NOT_BINDING",
            Self::TemporalBindingInvalid => "TEMPORAL_BINDING_INVALID",
            Self::TemporalBindingInsufficient => "TEMPORAL_BINDING_INSUFFICIENT",
            Self::CausalChainIncomplete => "CAUSAL_CHAIN_INCOMPLETE",
            Self::CausalChainCircular => "CAUSAL_CHAIN_CIRCULAR",
            Self::ReinforcementNotDeclared => "REINFORCEMENT_NOT_DECLARED",
            Self::ReinforcementContradiction => "REINFORCEMENT_CONTRADICTION",
            Self::AspirationalOnly => "ASPIRATIONAL_ONLY",
            Self::DuplicateActive => "DUPLICATE_ACTIVE",
            Self::CompoundOutcome => "COMPOUND_OUTCOME",
        }
    }

    /// The frozen human-readable message for this code.
    ///
    /// Exhaustive by construction — adding a code without a message is a
    /// compile error, which is the point.
    pub fn message(&self) -> &'static str {
        match self {
            Self::PlanGenerationMechanismMissing => "Plan generation mechanism is required.",
            Self::PlanGenerationMechanismUnsupported => {
                "Plan generation mechanism must be GENERIC_DETERMINISTIC (only supported type)."
            }
            Self::RejectDisclosureRequired => {
                "You must accept the immutable goal commitment disclosure before admitting."
            }
            Self::InscriptionMissing => "Goal inscription is required for immutability.",
            Self::InscriptionNotImmutable => {
                "Goal has been altered since inscription; integrity compromised."
            }
            Self::TerminalOutcomeMissing => "Terminal outcome is required.",
            Self::TerminalOutcomeVague => "Terminal outcome must be concrete and unambiguous.",
            Self::TerminalOutcomeImmeasurable => "Terminal outcome must be verifiable at deadline.",
            Self::DeadlineMissing => "Deadline date is required.",
            Self::DeadlineInPast => "Deadline cannot be in the past.",
            Self::DeadlineTooSoon => "Deadline must be at least 3 days from today.",
            Self::SacrificeMissing => {
                "You must declare what you will sacrifice to achieve this."
            }
            Self::SacrificeVague => "Sacrifice must be specific and quantified.",
            Self::SacrificeNotBinding => "Declared sacrifice must represent real cost.",
            Self::TemporalBindingInvalid => {
                "You must commit to a recurring schedule (days/week)."
            }
            Self::TemporalBindingInsufficient => "Committed days must be at least 3 per week.",
            Self::CausalChainIncomplete => "You must outline steps from today to the outcome.",
            Self::CausalChainCircular => "Causal chain contains a loop; cannot reach outcome.",
            Self::ReinforcementNotDeclared => "You must declare daily visibility mechanism.",
            Self::ReinforcementContradiction => {
                "Daily visibility claim contradicts declared mechanism."
            }
            Self::AspirationalOnly => "Goal marked as aspiration; cannot admit to calendar.",
            Self::DuplicateActive => "Same outcome already active; archive or complete first.",
            Self::CompoundOutcome => {
                "Outcome declares multiple simultaneous goals; commit to exactly one."
            }
        }
    }
}

impl fmt::Display for RejectionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_code())
    }
}
