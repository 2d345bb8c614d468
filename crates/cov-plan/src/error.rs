// error.rs — Error types for the planning subsystem.
//
// Infeasibility is NOT an error — it is a structured report on the plan
// itself (see `InfeasibleReport`). Errors here are malformed inputs only.

use thiserror::Error;

use cov_contract::ContractError;

/// Errors that can occur during deliverable or plan generation.
#[derive(Debug, Error)]
pub enum PlanError {
    /// A day-key or horizon input was malformed.
    #[error(transparent)]
    Contract(#[from] ContractError),

    /// Failed to serialize plan data (assumptions hashing, snapshots).
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
