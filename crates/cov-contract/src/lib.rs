//! # cov-contract
//!
//! Goal execution contracts and the hard-constraint admission gate.
//!
//! A [`GoalContractDraft`] is what the user submits: every section optional,
//! nothing trusted. The [`assess_admission`] gate runs every validation phase
//! (it never short-circuits) and either returns a fully enumerated rejection
//! or the draft is sealed into an immutable [`GoalExecutionContract`] whose
//! inscription fingerprint pins its core fields forever.
//!
//! ## Key components
//!
//! - [`GoalContractDraft`] / [`GoalExecutionContract`] — untrusted draft vs
//!   sealed, hash-pinned contract
//! - [`assess_admission`] — exhaustive ten-phase validator
//! - [`detect_compound_goal`] — pre-screen for multiple simultaneous outcomes
//! - [`RejectionCode`] — the closed rejection taxonomy with its frozen
//!   message table
//! - [`day_key`] — canonical `YYYY-MM-DD` calendar arithmetic and the
//!   [`Clock`](day_key::Clock) seam
//! - [`fingerprint`] — the FNV-1a 64 integrity fingerprint

pub mod admission;
pub mod compound;
pub mod contract;
pub mod day_key;
pub mod error;
pub mod fingerprint;
pub mod rejection;

pub use admission::{assess_admission, ActiveGoalSignature, AdmissionResult, AdmissionStatus};
pub use compound::{detect_compound_goal, CompoundGoalReport};
pub use contract::{
    CausalChain, CausalStep, CheckInFrequency, Deadline, GoalContractDraft, GoalExecutionContract,
    Inscription, MechanismClass, Reinforcement, ReinforcementDisclosure, SacrificeDeclaration,
    TemporalBinding, TerminalOutcome,
};
pub use day_key::{Clock, FixedClock, SystemClock};
pub use error::ContractError;
pub use rejection::RejectionCode;
