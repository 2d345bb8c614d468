// events.rs — trace-event model and sink dispatch.
//
// The core emits named events at lifecycle points for UI/audit overlays to
// observe. Sinks observe and render; the core never reads from them. The
// dispatcher is synchronous — these are bounded in-memory transforms, not
// long-running work.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cov_contract::RejectionCode;

use crate::error::CycleError;
use crate::suggestion::{RejectReason, SuggestionStatus};

/// Events emitted at key lifecycle points.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum CoreEvent {
    /// A draft cleared the gate and a cycle was created.
    ContractAdmitted {
        cycle_id: String,
        goal_id: String,
        outcome_text: String,
        timestamp: DateTime<Utc>,
    },

    /// A draft was rejected and archived as an aspiration.
    ContractRejected {
        aspiration_id: String,
        rejection_codes: Vec<RejectionCode>,
        timestamp: DateTime<Utc>,
    },

    /// A cold plan version was generated (fresh, regenerated, or rebased).
    ColdPlanGenerated {
        cycle_id: String,
        version: u32,
        assumptions_hash: String,
        feasible: bool,
        timestamp: DateTime<Utc>,
    },

    /// A suggestion reached a terminal state.
    SuggestionResolved {
        cycle_id: String,
        suggestion_id: String,
        status: SuggestionStatus,
        reason: Option<RejectReason>,
        timestamp: DateTime<Utc>,
    },

    /// A cycle's status changed (ended or deleted).
    CycleStatusChanged {
        cycle_id: String,
        from_status: String,
        to_status: String,
        timestamp: DateTime<Utc>,
    },
}

impl CoreEvent {
    /// Get the event type name as a string.
    pub fn event_type(&self) -> &str {
        match self {
            CoreEvent::ContractAdmitted { .. } => "contract_admitted",
            CoreEvent::ContractRejected { .. } => "contract_rejected",
            CoreEvent::ColdPlanGenerated { .. } => "cold_plan_generated",
            CoreEvent::SuggestionResolved { .. } => "suggestion_resolved",
            CoreEvent::CycleStatusChanged { .. } => "cycle_status_changed",
        }
    }
}

/// Trait for receiving core events.
///
/// Implementations decide what to do with each event: log to a file, feed
/// a UI wiring overlay, forward to a dashboard. Observers only — nothing
/// in the core depends on what a sink does.
pub trait TraceSink: Send {
    /// Handle an event. Errors are logged but don't stop the system.
    fn send(&self, event: &CoreEvent) -> Result<(), CycleError>;
}

/// Logs events as JSONL to a file (always-on sink).
pub struct LogSink {
    path: PathBuf,
}

impl LogSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl TraceSink for LogSink {
    fn send(&self, event: &CoreEvent) -> Result<(), CycleError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| CycleError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| CycleError::Io {
                path: self.path.display().to_string(),
                source,
            })?;

        let json = serde_json::to_string(event)?;
        writeln!(file, "{}", json).map_err(|source| CycleError::Io {
            path: self.path.display().to_string(),
            source,
        })?;

        Ok(())
    }
}

/// Dispatches events to multiple sinks.
///
/// Errors from individual sinks are logged (via tracing) but don't prevent
/// other sinks from receiving the event.
#[derive(Default)]
pub struct EventDispatcher {
    sinks: Vec<Box<dyn TraceSink>>,
}

impl EventDispatcher {
    /// Create a new dispatcher with no sinks.
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    /// Add a trace sink.
    pub fn add_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.sinks.push(sink);
    }

    /// Dispatch an event to all sinks.
    pub fn dispatch(&self, event: &CoreEvent) {
        for sink in &self.sinks {
            if let Err(e) = sink.send(event) {
                tracing::warn!("trace sink error: {}", e);
            }
        }
    }
}
