// suggestion.rs — the event-sourced suggestion lifecycle.
//
// A suggested block's status is never a mutable field: it is always a pure
// fold over the suggestion's append-only event log. Terminal events
// (accepted/rejected/ignored/dismissed) are final — a transition attempt on
// a terminal suggestion appends nothing and applies nothing, so history
// stays auditable and effects never double-apply.
//
// Ignored means "may resurface later"; dismissed means "never resurface
// this id". Acceptance requires a concrete placement, and under strict
// progress mode a progress-domain placement must link a criterion — the
// capability check is a standalone function so every caller is bound to
// the same rule.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use cov_contract::day_key::{add_days, canonical_time, is_valid_day_key, parse_time_of_day};
use cov_contract::GoalExecutionContract;
use cov_plan::{Deliverable, Domain};

use crate::error::CycleError;

/// Why a suggestion was turned down. The closed set the correction-signal
/// aggregator keys on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    TooLong,
    WrongTime,
    LowEnergy,
    NotRelevant,
    MissingPrereq,
    Overcommitted,
}

impl RejectReason {
    pub const ALL: &'static [RejectReason] = &[
        Self::TooLong,
        Self::WrongTime,
        Self::LowEnergy,
        Self::NotRelevant,
        Self::MissingPrereq,
        Self::Overcommitted,
    ];
}

/// The five event types a suggestion log can carry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SuggestionEventType {
    Created,
    Accepted,
    Rejected,
    Ignored,
    Dismissed,
}

/// Derived status — a fold over the event log, nothing else.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionStatus {
    Suggested,
    Accepted,
    Rejected,
    Ignored,
    Dismissed,
}

impl SuggestionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SuggestionStatus::Suggested)
    }

    /// Only ignored suggestions may come back later.
    pub fn can_resurface(&self) -> bool {
        matches!(self, SuggestionStatus::Ignored)
    }
}

impl fmt::Display for SuggestionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SuggestionStatus::Suggested => "suggested",
            SuggestionStatus::Accepted => "accepted",
            SuggestionStatus::Rejected => "rejected",
            SuggestionStatus::Ignored => "ignored",
            SuggestionStatus::Dismissed => "dismissed",
        };
        f.write_str(name)
    }
}

/// A concrete placement attached to an acceptance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Placement {
    pub day_key: String,
    /// Wall-clock start (e.g., "09:00").
    pub time: String,
    pub duration_minutes: u32,
    pub domain: Domain,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deliverable_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criterion_id: Option<String>,
}

/// One entry in the append-only suggestion event log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuggestionEvent {
    pub id: String,
    pub suggestion_id: String,
    pub event_type: SuggestionEventType,
    pub at_iso: String,
    /// Calendar day the event landed on, for windowed analytics.
    pub day_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,
}

/// A proposed execution slot awaiting accept/reject/ignore/dismiss.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuggestedBlock {
    pub id: String,
    pub title: String,
    pub domain: Domain,
    pub day_key: String,
    pub time: String,
    pub duration_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deliverable_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub criterion_id: Option<String>,
    pub created_at_iso: String,
}

/// Why an acceptance was refused. A business outcome, not an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AcceptRefusal {
    /// Strict progress mode: progress-domain blocks need a linked criterion.
    CriterionRequired,
    InvalidDayKey,
    InvalidTime,
    DurationTooShort,
}

impl AcceptRefusal {
    pub fn message(&self) -> &'static str {
        match self {
            AcceptRefusal::CriterionRequired => {
                "Strict mode: progress blocks need a linked criterion."
            }
            AcceptRefusal::InvalidDayKey => "Placement day must be a canonical YYYY-MM-DD.",
            AcceptRefusal::InvalidTime => "Placement time must be a valid wall-clock time.",
            AcceptRefusal::DurationTooShort => "Placement must run at least 15 minutes.",
        }
    }
}

/// What a transition attempt did.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TransitionOutcome {
    /// The event was appended and the fold now yields `new_status`.
    Applied { new_status: SuggestionStatus },
    /// The suggestion was already terminal; nothing was appended.
    AlreadyTerminal { status: SuggestionStatus },
    /// No suggestion with that id exists in this log.
    NotFound,
    /// Acceptance failed its capability check; nothing was appended.
    Refused { refusal: AcceptRefusal },
}

/// Capability check for acceptance — exposed standalone so UI, CLI, and the
/// ledger all answer "can this be accepted?" identically.
pub fn check_acceptance(placement: &Placement, strict_progress: bool) -> Result<(), AcceptRefusal> {
    if !is_valid_day_key(&placement.day_key) {
        return Err(AcceptRefusal::InvalidDayKey);
    }
    if parse_time_of_day(&placement.time).is_none() {
        return Err(AcceptRefusal::InvalidTime);
    }
    if placement.duration_minutes < 15 {
        return Err(AcceptRefusal::DurationTooShort);
    }
    if strict_progress && placement.domain.is_progress() && placement.criterion_id.is_none() {
        return Err(AcceptRefusal::CriterionRequired);
    }
    Ok(())
}

/// Fold an event sequence into a status. Events after a terminal event are
/// ignored (the log never contains them, but the fold is defensive by
/// construction: the first terminal event wins).
pub fn fold_status<'a>(events: impl IntoIterator<Item = &'a SuggestionEvent>) -> SuggestionStatus {
    let mut status = SuggestionStatus::Suggested;
    for event in events {
        if status.is_terminal() {
            break;
        }
        status = match event.event_type {
            SuggestionEventType::Created => SuggestionStatus::Suggested,
            SuggestionEventType::Accepted => SuggestionStatus::Accepted,
            SuggestionEventType::Rejected => SuggestionStatus::Rejected,
            SuggestionEventType::Ignored => SuggestionStatus::Ignored,
            SuggestionEventType::Dismissed => SuggestionStatus::Dismissed,
        };
    }
    status
}

/// The per-cycle suggestion log: blocks by id plus the append-only events.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SuggestionLog {
    suggestions: BTreeMap<String, SuggestedBlock>,
    events: Vec<SuggestionEvent>,
}

impl SuggestionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn suggestions(&self) -> impl Iterator<Item = &SuggestedBlock> {
        self.suggestions.values()
    }

    pub fn get(&self, suggestion_id: &str) -> Option<&SuggestedBlock> {
        self.suggestions.get(suggestion_id)
    }

    pub fn events(&self) -> &[SuggestionEvent] {
        &self.events
    }

    /// Current status of a suggestion — always recomputed, never stored.
    pub fn status_of(&self, suggestion_id: &str) -> Option<SuggestionStatus> {
        if !self.suggestions.contains_key(suggestion_id) {
            return None;
        }
        Some(fold_status(
            self.events
                .iter()
                .filter(|e| e.suggestion_id == suggestion_id),
        ))
    }

    /// Register a new suggested block and its CREATED event. Registering an
    /// existing id is a no-op (the log is append-only, not upsert).
    pub fn create(&mut self, block: SuggestedBlock, at_iso: &str) -> Result<bool, CycleError> {
        if self.suggestions.contains_key(&block.id) {
            return Ok(false);
        }
        let day_key = cov_contract::day_key::day_key_from_iso(at_iso)?;
        self.events.push(SuggestionEvent {
            id: format!("sev-{}-created", block.id),
            suggestion_id: block.id.clone(),
            event_type: SuggestionEventType::Created,
            at_iso: at_iso.to_string(),
            day_key,
            reason: None,
            placement: None,
        });
        self.suggestions.insert(block.id.clone(), block);
        Ok(true)
    }

    /// Accept with a concrete placement. Runs [`check_acceptance`]; refusal
    /// and terminal no-op both leave the log untouched.
    pub fn accept(
        &mut self,
        suggestion_id: &str,
        placement: Placement,
        strict_progress: bool,
        at_iso: &str,
    ) -> Result<TransitionOutcome, CycleError> {
        let Some(current) = self.status_of(suggestion_id) else {
            return Ok(TransitionOutcome::NotFound);
        };
        if current.is_terminal() {
            tracing::debug!(suggestion_id, status = %current, "accept ignored: terminal");
            return Ok(TransitionOutcome::AlreadyTerminal { status: current });
        }
        if let Err(refusal) = check_acceptance(&placement, strict_progress) {
            return Ok(TransitionOutcome::Refused { refusal });
        }
        // Store the canonical HH:MM form, whatever the caller typed.
        let mut placement = placement;
        if let Some((hours, minutes)) = parse_time_of_day(&placement.time) {
            placement.time = canonical_time(hours, minutes);
        }
        self.append_terminal(
            suggestion_id,
            SuggestionEventType::Accepted,
            at_iso,
            None,
            Some(placement),
        )?;
        Ok(TransitionOutcome::Applied {
            new_status: SuggestionStatus::Accepted,
        })
    }

    /// Reject with one reason code from the closed set.
    pub fn reject(
        &mut self,
        suggestion_id: &str,
        reason: RejectReason,
        at_iso: &str,
    ) -> Result<TransitionOutcome, CycleError> {
        self.terminal_transition(
            suggestion_id,
            SuggestionEventType::Rejected,
            at_iso,
            Some(reason),
        )
    }

    /// Ignore: terminal for this id, but the block may resurface later
    /// under a new id.
    pub fn ignore(
        &mut self,
        suggestion_id: &str,
        at_iso: &str,
    ) -> Result<TransitionOutcome, CycleError> {
        self.terminal_transition(suggestion_id, SuggestionEventType::Ignored, at_iso, None)
    }

    /// Dismiss: terminal, and this id never resurfaces.
    pub fn dismiss(
        &mut self,
        suggestion_id: &str,
        at_iso: &str,
    ) -> Result<TransitionOutcome, CycleError> {
        self.terminal_transition(suggestion_id, SuggestionEventType::Dismissed, at_iso, None)
    }

    fn terminal_transition(
        &mut self,
        suggestion_id: &str,
        event_type: SuggestionEventType,
        at_iso: &str,
        reason: Option<RejectReason>,
    ) -> Result<TransitionOutcome, CycleError> {
        let Some(current) = self.status_of(suggestion_id) else {
            return Ok(TransitionOutcome::NotFound);
        };
        if current.is_terminal() {
            tracing::debug!(suggestion_id, status = %current, "transition ignored: terminal");
            return Ok(TransitionOutcome::AlreadyTerminal { status: current });
        }
        self.append_terminal(suggestion_id, event_type, at_iso, reason, None)?;
        let new_status = self
            .status_of(suggestion_id)
            .unwrap_or(SuggestionStatus::Suggested);
        Ok(TransitionOutcome::Applied { new_status })
    }

    fn append_terminal(
        &mut self,
        suggestion_id: &str,
        event_type: SuggestionEventType,
        at_iso: &str,
        reason: Option<RejectReason>,
        placement: Option<Placement>,
    ) -> Result<(), CycleError> {
        let day_key = cov_contract::day_key::day_key_from_iso(at_iso)?;
        let suffix = match event_type {
            SuggestionEventType::Created => "created",
            SuggestionEventType::Accepted => "accepted",
            SuggestionEventType::Rejected => "rejected",
            SuggestionEventType::Ignored => "ignored",
            SuggestionEventType::Dismissed => "dismissed",
        };
        self.events.push(SuggestionEvent {
            id: format!("sev-{suggestion_id}-{suffix}"),
            suggestion_id: suggestion_id.to_string(),
            event_type,
            at_iso: at_iso.to_string(),
            day_key,
            reason,
            placement,
        });
        Ok(())
    }

    /// Record a deliverable/criterion link on an existing suggestion so
    /// strict-progress acceptance can see it.
    pub fn link(
        &mut self,
        suggestion_id: &str,
        deliverable_id: Option<String>,
        criterion_id: Option<String>,
    ) -> bool {
        match self.suggestions.get_mut(suggestion_id) {
            Some(block) => {
                block.deliverable_id = deliverable_id;
                block.criterion_id = criterion_id;
                true
            }
            None => false,
        }
    }
}

/// Weekly suggestion volume derived from the committed cadence: double the
/// committed days, clamped to [6, 14].
pub fn blocks_per_week(days_per_week: u8) -> u32 {
    (u32::from(days_per_week) * 2).clamp(6, 14)
}

/// Deterministically seed suggested blocks for a fresh cycle.
///
/// One slot per day at 09:00, a second at 16:00 once the weekly volume
/// passes seven; titles and domains cycle through the deliverables in
/// declared order. Ids are `sugg-<cycle>-<n>` so reseeding an identical
/// cycle yields identical blocks.
pub fn seed_suggestions(
    cycle_id: &str,
    contract: &GoalExecutionContract,
    deliverables: &[Deliverable],
    created_at_iso: &str,
) -> Result<Vec<SuggestedBlock>, CycleError> {
    if deliverables.is_empty() {
        return Ok(Vec::new());
    }
    let volume = blocks_per_week(contract.temporal_binding.days_per_week);
    let slots: &[&str] = if volume > 7 {
        &["09:00", "16:00"]
    } else {
        &["09:00"]
    };

    let mut blocks = Vec::with_capacity(volume as usize);
    for sequence in 0..volume {
        let day_offset = (sequence as usize / slots.len()) as i64;
        let day_key = add_days(&contract.temporal_binding.start_day_key, day_offset)?;
        let slot = slots[sequence as usize % slots.len()];
        let deliverable = &deliverables[sequence as usize % deliverables.len()];
        blocks.push(SuggestedBlock {
            id: format!("sugg-{cycle_id}-{}", sequence + 1),
            title: deliverable.title.clone(),
            domain: deliverable.domain,
            day_key,
            time: slot.to_string(),
            duration_minutes: contract.temporal_binding.session_duration_minutes,
            deliverable_id: Some(deliverable.id.clone()),
            criterion_id: None,
            created_at_iso: created_at_iso.to_string(),
        });
    }
    Ok(blocks)
}

/// Filters for the history projection. Empty lists match everything.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilters {
    pub types: Vec<SuggestionEventType>,
    pub domains: Vec<Domain>,
    pub reasons: Vec<RejectReason>,
}

/// One rendered history row for the out-of-scope dashboards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryItem {
    pub id: String,
    pub day_key: String,
    pub event_type: SuggestionEventType,
    pub suggestion_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<Domain>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub at_iso: String,
}

/// Project the event log into a windowed, filtered history: newest day
/// first, then timestamp and log order within a day.
pub fn project_history(
    log: &SuggestionLog,
    now_day_key: &str,
    window_days: u32,
    filters: &HistoryFilters,
) -> Result<Vec<HistoryItem>, CycleError> {
    let window = window_days.max(1);
    let start_key = add_days(now_day_key, -(i64::from(window) - 1))?;

    let mut items: Vec<(usize, HistoryItem)> = Vec::new();
    for (idx, event) in log.events().iter().enumerate() {
        if event.day_key.as_str() < start_key.as_str() || event.day_key.as_str() > now_day_key {
            continue;
        }
        let block = log.get(&event.suggestion_id);
        let item = HistoryItem {
            id: event.id.clone(),
            day_key: event.day_key.clone(),
            event_type: event.event_type,
            suggestion_id: event.suggestion_id.clone(),
            reason: event.reason,
            domain: block.map(|b| b.domain),
            title: block.map(|b| b.title.clone()),
            at_iso: event.at_iso.clone(),
        };
        if !filters.types.is_empty() && !filters.types.contains(&item.event_type) {
            continue;
        }
        if !filters.domains.is_empty()
            && !item.domain.is_some_and(|d| filters.domains.contains(&d))
        {
            continue;
        }
        if !filters.reasons.is_empty()
            && !item.reason.is_some_and(|r| filters.reasons.contains(&r))
        {
            continue;
        }
        items.push((idx, item));
    }

    items.sort_by(|(a_idx, a), (b_idx, b)| {
        b.day_key
            .cmp(&a.day_key)
            .then_with(|| a.at_iso.cmp(&b.at_iso))
            .then_with(|| a_idx.cmp(b_idx))
    });
    Ok(items.into_iter().map(|(_, item)| item).collect())
}
