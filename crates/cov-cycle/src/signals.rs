// signals.rs — rolling correction-signal analytics over rejection events.
//
// Purely derived, read-only: the aggregator never mutates suggestion or
// contract state. Over a rolling window (14 days by default) each reject
// reason becomes a pressure ratio in [0, 1]; thresholds map pressures to
// labels, and two pressures carry concrete plan-tuning recommendations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use cov_contract::day_key::add_days;

use crate::error::CycleError;
use crate::suggestion::{RejectReason, SuggestionEventType, SuggestionLog};

/// Default rolling window, in days.
pub const DEFAULT_WINDOW_DAYS: u32 = 14;

const HIGH_THRESHOLD: f64 = 0.6;
const MODERATE_THRESHOLD: f64 = 0.3;

/// Qualitative label for a pressure ratio.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PressureLabel {
    High,
    Moderate,
    Low,
    None,
}

impl PressureLabel {
    fn for_ratio(ratio: f64) -> Self {
        if ratio >= HIGH_THRESHOLD {
            PressureLabel::High
        } else if ratio >= MODERATE_THRESHOLD {
            PressureLabel::Moderate
        } else if ratio > 0.0 {
            PressureLabel::Low
        } else {
            PressureLabel::None
        }
    }
}

/// One pressure reading: the clamped ratio and its label.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PressureReading {
    pub value: f64,
    pub label: PressureLabel,
}

impl PressureReading {
    fn from_counts(count: u32, total: u32) -> Self {
        let value = if total > 0 {
            (f64::from(count) / f64::from(total)).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            value,
            label: PressureLabel::for_ratio(value),
        }
    }
}

/// The six pressure categories, one per reject reason.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SignalSet {
    pub capacity_pressure: PressureReading,
    pub duration_mismatch: PressureReading,
    pub timing_mismatch: PressureReading,
    pub energy_mismatch: PressureReading,
    pub relevance_mismatch: PressureReading,
    pub prereq_debt: PressureReading,
}

/// Plan-tuning recommendations derived from high pressures.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    /// Capacity pressure is high: lower the weekly block target.
    LowerWeeklyBlockTarget,
    /// Duration mismatch is high: shorten template durations.
    ShortenTemplateDurations,
}

/// The full aggregation result for one window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CorrectionSignals {
    pub window_days: u32,
    pub total_rejections: u32,
    pub by_reason: BTreeMap<RejectReason, u32>,
    pub signals: SignalSet,
    pub recommendations: Vec<Recommendation>,
}

/// Aggregate rejection events inside `[now - window + 1, now]`.
pub fn compute_correction_signals(
    log: &SuggestionLog,
    now_day_key: &str,
    window_days: u32,
) -> Result<CorrectionSignals, CycleError> {
    let window = window_days.max(1);
    let start_key = add_days(now_day_key, -(i64::from(window) - 1))?;

    let mut by_reason: BTreeMap<RejectReason, u32> = BTreeMap::new();
    for reason in RejectReason::ALL {
        by_reason.insert(*reason, 0);
    }

    for event in log.events() {
        if event.event_type != SuggestionEventType::Rejected {
            continue;
        }
        if event.day_key.as_str() < start_key.as_str() || event.day_key.as_str() > now_day_key {
            continue;
        }
        if let Some(reason) = event.reason {
            *by_reason.entry(reason).or_insert(0) += 1;
        }
    }

    let total: u32 = by_reason.values().sum();
    let reading = |reason: RejectReason| {
        PressureReading::from_counts(by_reason.get(&reason).copied().unwrap_or(0), total)
    };
    let signals = SignalSet {
        capacity_pressure: reading(RejectReason::Overcommitted),
        duration_mismatch: reading(RejectReason::TooLong),
        timing_mismatch: reading(RejectReason::WrongTime),
        energy_mismatch: reading(RejectReason::LowEnergy),
        relevance_mismatch: reading(RejectReason::NotRelevant),
        prereq_debt: reading(RejectReason::MissingPrereq),
    };

    let mut recommendations = Vec::new();
    if signals.capacity_pressure.value >= HIGH_THRESHOLD {
        recommendations.push(Recommendation::LowerWeeklyBlockTarget);
    }
    if signals.duration_mismatch.value >= HIGH_THRESHOLD {
        recommendations.push(Recommendation::ShortenTemplateDurations);
    }

    Ok(CorrectionSignals {
        window_days: window,
        total_rejections: total,
        by_reason,
        signals,
        recommendations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::suggestion::{SuggestedBlock, SuggestionLog};
    use cov_plan::Domain;

    fn seeded_log(rejections: &[(&str, RejectReason, &str)]) -> SuggestionLog {
        let mut log = SuggestionLog::new();
        for (id, reason, at_iso) in rejections {
            log.create(
                SuggestedBlock {
                    id: id.to_string(),
                    title: "block".to_string(),
                    domain: Domain::Creation,
                    day_key: "2026-01-10".to_string(),
                    time: "09:00".to_string(),
                    duration_minutes: 45,
                    deliverable_id: None,
                    criterion_id: None,
                    created_at_iso: at_iso.to_string(),
                },
                at_iso,
            )
            .unwrap();
            log.reject(id, *reason, at_iso).unwrap();
        }
        log
    }

    #[test]
    fn empty_window_is_all_none() {
        let log = SuggestionLog::new();
        let signals = compute_correction_signals(&log, "2026-01-20", 14).unwrap();
        assert_eq!(signals.total_rejections, 0);
        assert_eq!(signals.signals.capacity_pressure.label, PressureLabel::None);
        assert!(signals.recommendations.is_empty());
    }

    #[test]
    fn dominant_overcommitted_recommends_lower_target() {
        let log = seeded_log(&[
            ("s1", RejectReason::Overcommitted, "2026-01-18T09:00:00+00:00"),
            ("s2", RejectReason::Overcommitted, "2026-01-18T10:00:00+00:00"),
            ("s3", RejectReason::Overcommitted, "2026-01-19T09:00:00+00:00"),
            ("s4", RejectReason::WrongTime, "2026-01-19T10:00:00+00:00"),
        ]);
        let signals = compute_correction_signals(&log, "2026-01-20", 14).unwrap();
        assert_eq!(signals.total_rejections, 4);
        assert_eq!(signals.signals.capacity_pressure.value, 0.75);
        assert_eq!(signals.signals.capacity_pressure.label, PressureLabel::High);
        assert_eq!(signals.signals.timing_mismatch.label, PressureLabel::Low);
        assert_eq!(
            signals.recommendations,
            vec![Recommendation::LowerWeeklyBlockTarget]
        );
    }

    #[test]
    fn dominant_too_long_recommends_shorter_templates() {
        let log = seeded_log(&[
            ("s1", RejectReason::TooLong, "2026-01-18T09:00:00+00:00"),
            ("s2", RejectReason::TooLong, "2026-01-19T09:00:00+00:00"),
            ("s3", RejectReason::TooLong, "2026-01-19T10:00:00+00:00"),
        ]);
        let signals = compute_correction_signals(&log, "2026-01-20", 14).unwrap();
        assert_eq!(signals.signals.duration_mismatch.value, 1.0);
        assert_eq!(
            signals.recommendations,
            vec![Recommendation::ShortenTemplateDurations]
        );
    }

    #[test]
    fn events_outside_the_window_are_excluded() {
        let log = seeded_log(&[
            ("s1", RejectReason::LowEnergy, "2026-01-01T09:00:00+00:00"),
            ("s2", RejectReason::LowEnergy, "2026-01-19T09:00:00+00:00"),
        ]);
        let signals = compute_correction_signals(&log, "2026-01-20", 14).unwrap();
        // Only the January 19th rejection is inside [Jan 7, Jan 20].
        assert_eq!(signals.total_rejections, 1);
        assert_eq!(signals.signals.energy_mismatch.value, 1.0);
    }

    #[test]
    fn moderate_band_labels() {
        let log = seeded_log(&[
            ("s1", RejectReason::NotRelevant, "2026-01-18T09:00:00+00:00"),
            ("s2", RejectReason::WrongTime, "2026-01-18T10:00:00+00:00"),
            ("s3", RejectReason::TooLong, "2026-01-19T09:00:00+00:00"),
        ]);
        let signals = compute_correction_signals(&log, "2026-01-20", 14).unwrap();
        // Each reason sits at 1/3 — moderate.
        assert_eq!(
            signals.signals.relevance_mismatch.label,
            PressureLabel::Moderate
        );
        assert!(signals.recommendations.is_empty());
    }

    #[test]
    fn aggregation_never_mutates_the_log() {
        let log = seeded_log(&[(
            "s1",
            RejectReason::MissingPrereq,
            "2026-01-19T09:00:00+00:00",
        )]);
        let before = serde_json::to_string(&log).unwrap();
        let _ = compute_correction_signals(&log, "2026-01-20", 14).unwrap();
        assert_eq!(serde_json::to_string(&log).unwrap(), before);
    }
}
