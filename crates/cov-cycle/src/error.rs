// error.rs — Error types for the cycle subsystem.
//
// Business outcomes (rejected submissions, refused acceptances, terminal
// no-ops) are ordinary return values. These errors cover lookups that
// failed, malformed inputs, and I/O at the snapshot boundary.

use thiserror::Error;

use cov_contract::ContractError;
use cov_plan::PlanError;

/// Errors that can occur during cycle orchestration.
#[derive(Debug, Error)]
pub enum CycleError {
    /// The requested cycle does not exist.
    #[error("cycle not found: {0}")]
    CycleNotFound(String),

    /// The requested deliverable does not exist in the cycle.
    #[error("deliverable not found: {0}")]
    DeliverableNotFound(String),

    /// The requested criterion does not exist under the deliverable.
    #[error("criterion not found: {0}")]
    CriterionNotFound(String),

    /// The cycle has no cold plan version to derive from.
    #[error("cycle {0} has no cold plan")]
    PlanMissing(String),

    /// The cycle is not in a status that allows the operation.
    #[error("cycle {id} is {status}, expected {expected}")]
    InvalidStatus {
        id: String,
        status: String,
        expected: String,
    },

    /// A day-key or contract shape input was malformed.
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// Plan generation failed on malformed inputs.
    #[error(transparent)]
    Plan(#[from] PlanError),

    /// A file I/O operation failed at the snapshot boundary.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Failed to serialize/deserialize ledger state.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
