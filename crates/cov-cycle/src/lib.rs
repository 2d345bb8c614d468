//! # cov-cycle
//!
//! The Cycle aggregate root and everything that orchestrates it.
//!
//! A [`CycleLedger`] is the single-writer aggregate snapshot: submissions
//! run the compound pre-screen and the admission gate, rejected drafts
//! land in the [`AspirationArchive`], admitted ones become a [`Cycle`]
//! with seeded deliverables, a default strategy, cold plan v1, and a
//! seeded suggestion log. Every operation is one synchronous transform
//! behind `&mut self` — callers sharing a ledger across threads serialize
//! access with a mutex, and no partial state is ever visible mid-transform.
//!
//! ## Key components
//!
//! - [`CycleLedger`] — submit / plan / suggestion / criterion operations
//! - [`SuggestionLog`] — event-sourced lifecycle, status as a pure fold
//! - [`compute_correction_signals`] — rolling rejection-pressure analytics
//! - [`SnapshotStore`] — whole-state JSON persistence boundary
//! - [`EventDispatcher`] / [`TraceSink`] — named trace events for
//!   UI/audit overlays (write-only from the core's point of view)

pub mod cycle;
pub mod error;
pub mod events;
pub mod signals;
pub mod store;
pub mod suggestion;

pub use cycle::{
    Aspiration, AspirationArchive, Cycle, CycleLedger, CycleStatus, SubmissionOutcome,
};
pub use error::CycleError;
pub use events::{CoreEvent, EventDispatcher, LogSink, TraceSink};
pub use signals::{
    compute_correction_signals, CorrectionSignals, PressureLabel, PressureReading,
    Recommendation, SignalSet, DEFAULT_WINDOW_DAYS,
};
pub use store::SnapshotStore;
pub use suggestion::{
    blocks_per_week, check_acceptance, fold_status, project_history, seed_suggestions,
    AcceptRefusal, HistoryFilters, HistoryItem, Placement, RejectReason, SuggestedBlock,
    SuggestionEvent, SuggestionEventType, SuggestionLog, SuggestionStatus, TransitionOutcome,
};
