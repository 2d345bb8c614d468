// deliverables.rs — staged deliverables and the auto-generator.
//
// After admission every cycle must carry at least 3 deliverables, each with
// a positive block requirement. The generator is a pure heuristic: keyword
// scoring picks a goal type, the days-remaining window sizes the blocks,
// and a fixed label set pads the list when a path produces fewer than 3.
// No LLM, no randomness, no clock reads beyond the supplied day-key.

use serde::{Deserialize, Serialize};
use std::fmt;

use cov_contract::day_key::{add_days, days_between_inclusive, is_valid_day_key};
use cov_contract::GoalExecutionContract;

use crate::error::PlanError;

/// The four execution domains a deliverable (or block) can belong to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Domain {
    Body,
    Resources,
    Focus,
    Creation,
}

impl Domain {
    /// Domains whose blocks count as goal progress. Strict progress mode
    /// refuses to accept blocks in these domains without a linked criterion.
    pub fn is_progress(&self) -> bool {
        matches!(self, Domain::Creation | Domain::Focus | Domain::Resources)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Body => "BODY",
            Domain::Resources => "RESOURCES",
            Domain::Focus => "FOCUS",
            Domain::Creation => "CREATION",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A granular, checkable completion condition under a deliverable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Criterion {
    pub id: String,
    pub text: String,
    pub is_done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done_at_day_key: Option<String>,
}

/// A staged outcome the plan distributes blocks toward.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Deliverable {
    pub id: String,
    pub title: String,
    pub required_blocks: u32,
    pub domain: Domain,
    #[serde(default)]
    pub criteria: Vec<Criterion>,
}

/// Which heuristic path produced the deliverables.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DetectedGoalType {
    MusicRelease,
    Generic,
}

/// Generator output: the seeded deliverables plus how they were derived.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AutoDeliverableOutcome {
    pub deliverables: Vec<Deliverable>,
    pub detected_type: DetectedGoalType,
    pub rationale: String,
}

/// Keywords whose presence (two or more, case-insensitive) classifies an
/// outcome as a music release.
const MUSIC_KEYWORDS: &[&str] = &[
    "release",
    "album",
    "songs",
    "spotify",
    "ep",
    "track",
    "beats",
    "production",
    "mix",
    "master",
    "promo",
    "radio",
];

/// Fallback window when a deadline is unusable: three weeks out.
const FALLBACK_DEADLINE_DAYS: i64 = 21;

const EARLY_LABELS: &[&str] = &[
    "Planning & setup",
    "Scope definition",
    "Resource allocation",
    "Foundation & setup",
    "Initial planning",
];
const MIDDLE_LABELS: &[&str] = &[
    "Core production",
    "Execution & iteration",
    "Main development",
    "Build & refinement",
    "Production & testing",
];
const LATE_LABELS: &[&str] = &[
    "Verification & finalization",
    "Quality assurance",
    "Final review",
    "Delivery & publication",
    "Launch & rollout",
];

fn detect_goal_type(outcome_text: &str) -> DetectedGoalType {
    let text = outcome_text.to_lowercase();
    let hits = MUSIC_KEYWORDS
        .iter()
        .filter(|kw| text.contains(**kw))
        .count();
    if hits >= 2 {
        DetectedGoalType::MusicRelease
    } else {
        DetectedGoalType::Generic
    }
}

fn late_label(index: usize) -> &'static str {
    LATE_LABELS[index % LATE_LABELS.len()]
}

/// Derive staged deliverables from an admitted contract.
///
/// Pure function of `(contract, now_day_key)`. Output always holds at
/// least 3 deliverables, each with a non-empty title and
/// `required_blocks > 0`.
pub fn generate_auto_deliverables(
    contract: &GoalExecutionContract,
    now_day_key: &str,
) -> Result<AutoDeliverableOutcome, PlanError> {
    // An unusable deadline falls back to three weeks out — the gate makes
    // this unreachable for sealed contracts, but the generator must not
    // trust its callers on it.
    let deadline_key = if is_valid_day_key(&contract.deadline.day_key) {
        contract.deadline.day_key.clone()
    } else {
        add_days(now_day_key, FALLBACK_DEADLINE_DAYS)?
    };

    // Inclusive day count minus the current day, floored at one.
    let span = days_between_inclusive(now_day_key, &deadline_key)?.len() as u32;
    let days_remaining = span.saturating_sub(1).max(1);

    let detected_type = detect_goal_type(&contract.terminal_outcome.text);
    let mut deliverables = match detected_type {
        DetectedGoalType::MusicRelease => music_release_deliverables(days_remaining),
        DetectedGoalType::Generic => generic_deliverables(days_remaining),
    };

    // Pad to the minimum with late-stage labels, cycling the label set.
    while deliverables.len() < 3 {
        let index = deliverables.len();
        deliverables.push(Deliverable {
            id: format!("auto-deliv-{}", index + 1),
            title: late_label(index).to_string(),
            required_blocks: (days_remaining / 7).max(1),
            domain: Domain::Creation,
            criteria: Vec::new(),
        });
    }

    let rationale = format!(
        "Auto-generated {} deliverables for {} days until deadline",
        match detected_type {
            DetectedGoalType::MusicRelease => "music release",
            DetectedGoalType::Generic => "generic",
        },
        days_remaining
    );

    tracing::debug!(
        detected = ?detected_type,
        count = deliverables.len(),
        days_remaining,
        "seeded deliverables"
    );

    Ok(AutoDeliverableOutcome {
        deliverables,
        detected_type,
        rationale,
    })
}

/// Music path: four named deliverables with fixed fractional weights of the
/// base budget (roughly one block per five days), each floored at a stated
/// minimum.
fn music_release_deliverables(days_remaining: u32) -> Vec<Deliverable> {
    let base = (days_remaining / 5).max(8);
    let weighted = |minimum: u32, percent: u32| (base * percent / 100).max(minimum);
    let specs: [(&str, u32, Domain); 4] = [
        ("Finalize tracklist + masters", weighted(6, 30), Domain::Creation),
        ("Artwork + distribution setup", weighted(3, 15), Domain::Creation),
        ("Promo assets + rollout plan", weighted(4, 25), Domain::Resources),
        ("Daily promo execution", weighted(5, 30), Domain::Resources),
    ];
    specs
        .iter()
        .enumerate()
        .map(|(i, (title, blocks, domain))| Deliverable {
            id: format!("auto-deliv-{}", i + 1),
            title: (*title).to_string(),
            required_blocks: *blocks,
            domain: *domain,
            criteria: Vec::new(),
        })
        .collect()
}

/// Generic path: three staged deliverables (early/middle/late) splitting a
/// base budget of roughly one block per four days.
fn generic_deliverables(days_remaining: u32) -> Vec<Deliverable> {
    let base = (days_remaining / 4).max(6);
    let per_phase = (base / 3).max(2);
    let stages: [(&str, Domain); 3] = [
        (EARLY_LABELS[0], Domain::Focus),
        (MIDDLE_LABELS[0], Domain::Creation),
        (LATE_LABELS[0], Domain::Focus),
    ];
    stages
        .iter()
        .enumerate()
        .map(|(i, (title, domain))| Deliverable {
            id: format!("auto-deliv-{}", i + 1),
            title: (*title).to_string(),
            required_blocks: per_phase,
            domain: *domain,
            criteria: Vec::new(),
        })
        .collect()
}

/// Sum of required blocks across a deliverable list.
pub fn total_required_blocks(deliverables: &[Deliverable]) -> u32 {
    deliverables.iter().map(|d| d.required_blocks).sum()
}
