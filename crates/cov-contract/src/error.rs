// error.rs — Error types for the contract subsystem.
//
// These are programmer/shape errors only. Business-rule failures (a draft
// that doesn't pass admission) are ordinary values — see `AdmissionResult`.

use thiserror::Error;

/// Errors that can occur while working with contracts and day-keys.
#[derive(Debug, Error)]
pub enum ContractError {
    /// A value was not a canonical `YYYY-MM-DD` day-key.
    #[error("invalid day-key '{value}': expected canonical YYYY-MM-DD")]
    InvalidDayKey { value: String },

    /// A value could not be parsed as an RFC 3339 timestamp.
    #[error("invalid timestamp '{value}'")]
    InvalidTimestamp { value: String },

    /// A horizon walk exceeded the iteration cap (malformed range guard).
    #[error("day range from {start} to {end} exceeds {max} days")]
    HorizonTooLong {
        start: String,
        end: String,
        max: usize,
    },

    /// A draft was sealed without a required section. The admission gate
    /// guarantees presence, so hitting this means a caller skipped the gate.
    #[error("cannot seal draft: missing {section}")]
    MissingSection { section: &'static str },

    /// Failed to serialize/deserialize contract data.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
