// cold_plan.rs — the deterministic day-by-day forecast.
//
// A cold plan is advisory: a forecast of blocks per day, never a committed
// calendar. The determinism contract is absolute — identical inputs must
// produce byte-identical serialized output, assumptions hash included. To
// that end everything here is keyed through BTreeMaps, weights are pure
// functions of the eligible-day index, and "now" is a parameter.
//
// Placement walks each deliverable in declared order and drops its blocks
// onto the eligible day with the highest remaining score, where a day's
// score is its route weight divided by (1 + blocks already placed there).
// Days at the per-day cap (default 4) or inside a saturated week are
// skipped. When the horizon cannot hold the required blocks at all, the
// plan carries a structured infeasibility report instead of a truncated
// forecast.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashSet};

use cov_contract::day_key::{days_between_inclusive, week_start, weekday_index};

use crate::deliverables::{total_required_blocks, Deliverable};
use crate::error::PlanError;
use crate::strategy::{RouteOption, Strategy};

pub const GENERATOR_VERSION: &str = "cold_plan_v1";

/// Forecast for one day: total plus the per-deliverable split.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayForecast {
    pub total_blocks: u32,
    pub by_deliverable: BTreeMap<String, u32>,
}

/// Why a plan could not be generated, with the capacity numbers a caller
/// needs to render an exact remediation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InfeasibleReport {
    pub reason: String,
    pub required_capacity_per_week: u32,
    pub available_capacity_per_week: u32,
}

/// One generated plan version. Versions are append-only: regeneration and
/// rebasing produce a new entry, never mutate an existing one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColdPlan {
    pub version: u32,
    pub generator_version: String,
    pub strategy_id: String,
    /// SHA-256 fingerprint of every generation input.
    pub assumptions_hash: String,
    pub created_at_iso: String,
    pub forecast_by_day_key: BTreeMap<String, DayForecast>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infeasible: Option<InfeasibleReport>,
}

impl ColdPlan {
    pub fn is_feasible(&self) -> bool {
        self.infeasible.is_none()
    }
}

/// Everything generation reads. Rebase passes `start_day_key = today`.
#[derive(Debug, Clone, Copy)]
pub struct PlanInputs<'a> {
    pub strategy: &'a Strategy,
    pub deliverables: &'a [Deliverable],
    pub start_day_key: &'a str,
    pub deadline_day_key: &'a str,
}

/// A read-only rebase preview: what the remaining horizon looks like from
/// today, derived from an existing plan version without appending history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyProjection {
    pub as_of_day_key: String,
    pub remaining_required_blocks: u32,
    pub generator_version: String,
    pub derived_from: DerivedFrom,
    pub forecast_by_day_key: BTreeMap<String, DayForecast>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infeasible: Option<InfeasibleReport>,
}

/// Which plan version a projection was derived from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DerivedFrom {
    pub strategy_id: String,
    pub assumptions_hash: String,
    pub cold_plan_version: u32,
}

/// Generate a full-horizon cold plan.
pub fn generate_cold_plan(
    inputs: &PlanInputs<'_>,
    version: u32,
    now_iso: &str,
) -> Result<ColdPlan, PlanError> {
    let total = total_required_blocks(inputs.deliverables);
    let allocation = allocate(inputs, total)?;
    let assumptions_hash = assumptions_hash(inputs, "full", 0)?;
    if let Some(report) = &allocation.infeasible {
        tracing::warn!(
            reason = %report.reason,
            required = report.required_capacity_per_week,
            available = report.available_capacity_per_week,
            "cold plan infeasible"
        );
    }
    Ok(ColdPlan {
        version,
        generator_version: GENERATOR_VERSION.to_string(),
        strategy_id: inputs.strategy.strategy_id.clone(),
        assumptions_hash,
        created_at_iso: now_iso.to_string(),
        forecast_by_day_key: allocation.forecast,
        infeasible: allocation.infeasible,
    })
}

/// Rebase from today: recompute day-keys >= `inputs.start_day_key` for the
/// blocks still owed, leaving past-day forecast entries untouched.
pub fn rebase_cold_plan(
    previous: &ColdPlan,
    inputs: &PlanInputs<'_>,
    completed_to_date: u32,
    version: u32,
    now_iso: &str,
) -> Result<ColdPlan, PlanError> {
    let today = inputs.start_day_key;
    let total = total_required_blocks(inputs.deliverables);
    let remaining = total.saturating_sub(completed_to_date);
    let allocation = allocate(inputs, remaining)?;

    // Past days keep exactly what the previous version forecast for them.
    let mut forecast: BTreeMap<String, DayForecast> = previous
        .forecast_by_day_key
        .iter()
        .filter(|(day, _)| day.as_str() < today)
        .map(|(day, f)| (day.clone(), f.clone()))
        .collect();
    forecast.extend(allocation.forecast);

    Ok(ColdPlan {
        version,
        generator_version: GENERATOR_VERSION.to_string(),
        strategy_id: inputs.strategy.strategy_id.clone(),
        assumptions_hash: assumptions_hash(inputs, "rebase", completed_to_date)?,
        created_at_iso: now_iso.to_string(),
        forecast_by_day_key: forecast,
        infeasible: allocation.infeasible,
    })
}

/// Derive a read-only projection of the remaining horizon from an existing
/// plan version. Never appends to history.
pub fn daily_projection(
    previous: &ColdPlan,
    inputs: &PlanInputs<'_>,
    completed_to_date: u32,
) -> Result<DailyProjection, PlanError> {
    let total = total_required_blocks(inputs.deliverables);
    let remaining = total.saturating_sub(completed_to_date);
    let allocation = allocate(inputs, remaining)?;
    Ok(DailyProjection {
        as_of_day_key: inputs.start_day_key.to_string(),
        remaining_required_blocks: remaining,
        generator_version: GENERATOR_VERSION.to_string(),
        derived_from: DerivedFrom {
            strategy_id: previous.strategy_id.clone(),
            assumptions_hash: previous.assumptions_hash.clone(),
            cold_plan_version: previous.version,
        },
        forecast_by_day_key: allocation.forecast,
        infeasible: allocation.infeasible,
    })
}

// ---------------------------------------------------------------------------
// Allocation internals
// ---------------------------------------------------------------------------

struct Allocation {
    forecast: BTreeMap<String, DayForecast>,
    infeasible: Option<InfeasibleReport>,
}

impl Allocation {
    fn infeasible(reason: &str, required_per_week: u32, available_per_week: u32) -> Self {
        Self {
            forecast: BTreeMap::new(),
            infeasible: Some(InfeasibleReport {
                reason: reason.to_string(),
                required_capacity_per_week: required_per_week,
                available_capacity_per_week: available_per_week,
            }),
        }
    }
}

/// Enumerate eligible day-keys: horizon minus blackouts, filtered to
/// preferred weekdays, with every fourth eligible day removed for the
/// 3-on/1-off wave.
fn eligible_day_keys(inputs: &PlanInputs<'_>) -> Result<Vec<String>, PlanError> {
    let constraints = &inputs.strategy.constraints;
    let blackout: HashSet<&str> = constraints
        .blackout_day_keys
        .iter()
        .map(String::as_str)
        .collect();

    let mut days = Vec::new();
    for day in days_between_inclusive(inputs.start_day_key, inputs.deadline_day_key)? {
        if blackout.contains(day.as_str()) {
            continue;
        }
        if !constraints.preferred_days_of_week.is_empty() {
            let dow = weekday_index(&day)?;
            if !constraints.preferred_days_of_week.contains(&dow) {
                continue;
            }
        }
        days.push(day);
    }

    if inputs.strategy.route_option == RouteOption::Wave3On1Off {
        days = days
            .into_iter()
            .enumerate()
            .filter(|(i, _)| i % 4 != 3)
            .map(|(_, day)| day)
            .collect();
    }
    Ok(days)
}

/// Per-day weights for a route option over `n` eligible days.
///
/// Only FLAT is fully pinned by the product contract; the other shapes are
/// documented here as the implementation's choice:
/// - RAMP_UP: `0.5 + i/(n-1)` — strictly monotonic in the elapsed fraction.
/// - WAVE_3_1: uniform over the days that survived the 3-on/1-off filter.
/// - MILESTONE_QUARTERS: `1/(1 + d)` where `d` is the distance in
///   eligible-day steps to the nearest 25/50/75/100% horizon mark.
fn day_weights(route: RouteOption, n: usize) -> Vec<f64> {
    match route {
        RouteOption::Flat | RouteOption::Wave3On1Off => vec![1.0; n],
        RouteOption::RampUp => (0..n)
            .map(|i| {
                if n == 1 {
                    1.0
                } else {
                    0.5 + i as f64 / (n - 1) as f64
                }
            })
            .collect(),
        RouteOption::MilestoneQuarters => {
            let marks: Vec<usize> = (1..=4)
                .map(|q| (q * n.saturating_sub(1)) / 4)
                .collect();
            (0..n)
                .map(|i| {
                    let dist = marks
                        .iter()
                        .map(|m| i.abs_diff(*m))
                        .min()
                        .unwrap_or(0);
                    1.0 / (1.0 + dist as f64)
                })
                .collect()
        }
    }
}

fn allocate(inputs: &PlanInputs<'_>, total_blocks: u32) -> Result<Allocation, PlanError> {
    let constraints = &inputs.strategy.constraints;
    let max_per_day = constraints.max_blocks_per_day;

    if total_blocks == 0 {
        return Ok(Allocation {
            forecast: BTreeMap::new(),
            infeasible: None,
        });
    }

    let days = eligible_day_keys(inputs)?;
    if days.is_empty() {
        return Ok(Allocation::infeasible("no_workable_days", total_blocks, 0));
    }

    // Week bookkeeping: each day's Monday-start week key, plus the capacity
    // each week can actually hold.
    let mut week_of = Vec::with_capacity(days.len());
    let mut week_days: BTreeMap<String, u32> = BTreeMap::new();
    for day in &days {
        let week = week_start(day)?;
        *week_days.entry(week.clone()).or_insert(0) += 1;
        week_of.push(week);
    }
    let week_cap = |week: &str| -> u32 {
        let day_capacity = week_days.get(week).copied().unwrap_or(0) * max_per_day;
        match constraints.max_blocks_per_week {
            Some(cap) => cap.min(day_capacity),
            None => day_capacity,
        }
    };

    let weeks_count = week_days.len() as u32;
    let total_capacity: u32 = week_days.keys().map(|w| week_cap(w)).sum();
    let required_per_week = total_blocks.div_ceil(weeks_count);
    let available_per_week = week_days.keys().map(|w| week_cap(w)).min().unwrap_or(0);

    if total_blocks > total_capacity {
        let week_cap_binds = constraints
            .max_blocks_per_week
            .is_some_and(|cap| week_days.values().any(|d| cap < d * max_per_day));
        let reason = if week_cap_binds {
            "max_blocks_per_week"
        } else {
            "max_blocks_per_day"
        };
        return Ok(Allocation::infeasible(
            reason,
            required_per_week,
            available_per_week,
        ));
    }

    // Greedy placement by descending score. A day's score decays as it
    // fills, so uniform weights spread evenly instead of piling onto the
    // first day. Ties resolve to the earliest day — deterministic.
    let weights = day_weights(inputs.strategy.route_option, days.len());
    let mut placed = vec![0u32; days.len()];
    let mut week_placed: BTreeMap<String, u32> = BTreeMap::new();
    let mut by_deliverable: Vec<BTreeMap<String, u32>> = vec![BTreeMap::new(); days.len()];

    for deliverable in inputs.deliverables {
        for _ in 0..deliverable.required_blocks {
            let mut best: Option<(usize, f64)> = None;
            for i in 0..days.len() {
                if placed[i] >= max_per_day {
                    continue;
                }
                let week = &week_of[i];
                if week_placed.get(week).copied().unwrap_or(0) >= week_cap(week) {
                    continue;
                }
                let score = weights[i] / (1.0 + placed[i] as f64);
                if best.is_none_or(|(_, s)| score > s) {
                    best = Some((i, score));
                }
            }
            let Some((i, _)) = best else {
                // Aggregate capacity was sufficient but placement dead-ended;
                // report it rather than truncating the forecast.
                return Ok(Allocation::infeasible(
                    "placement_exhausted",
                    required_per_week,
                    available_per_week,
                ));
            };
            placed[i] += 1;
            *week_placed.entry(week_of[i].clone()).or_insert(0) += 1;
            *by_deliverable[i]
                .entry(deliverable.id.clone())
                .or_insert(0) += 1;
        }
    }

    let mut forecast = BTreeMap::new();
    for (i, day) in days.iter().enumerate() {
        if placed[i] > 0 {
            forecast.insert(
                day.clone(),
                DayForecast {
                    total_blocks: placed[i],
                    by_deliverable: std::mem::take(&mut by_deliverable[i]),
                },
            );
        }
    }
    Ok(Allocation {
        forecast,
        infeasible: None,
    })
}

/// SHA-256 over the canonical JSON of every generation input. Two plans
/// with the same hash were generated from identical assumptions.
fn assumptions_hash(
    inputs: &PlanInputs<'_>,
    mode: &str,
    completed_to_date: u32,
) -> Result<String, PlanError> {
    #[derive(Serialize)]
    struct AssumedDeliverable<'a> {
        id: &'a str,
        title: &'a str,
        required_blocks: u32,
    }
    #[derive(Serialize)]
    struct Assumptions<'a> {
        generator_version: &'static str,
        mode: &'a str,
        completed_to_date: u32,
        route_option: &'a str,
        deliverables: Vec<AssumedDeliverable<'a>>,
        start_day_key: &'a str,
        deadline_day_key: &'a str,
        constraints: &'a crate::strategy::PlanConstraints,
    }
    let canonical = serde_json::to_string(&Assumptions {
        generator_version: GENERATOR_VERSION,
        mode,
        completed_to_date,
        route_option: inputs.strategy.route_option.as_str(),
        deliverables: inputs
            .deliverables
            .iter()
            .map(|d| AssumedDeliverable {
                id: &d.id,
                title: &d.title,
                required_blocks: d.required_blocks,
            })
            .collect(),
        start_day_key: inputs.start_day_key,
        deadline_day_key: inputs.deadline_day_key,
        constraints: &inputs.strategy.constraints,
    })?;
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}
