// strategy.rs — how blocks are routed across the horizon.
//
// A strategy names a route option (the weighting shape) and the capacity
// constraints the forecast must respect. Deliverables are not duplicated
// here — the cycle owns them and passes them to generation alongside the
// strategy.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default per-day block cap when a strategy doesn't override it.
pub const DEFAULT_MAX_BLOCKS_PER_DAY: u32 = 4;

/// The weighting shape used to distribute blocks across eligible days.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum RouteOption {
    /// Uniform distribution across the horizon.
    #[default]
    #[serde(rename = "FLAT")]
    Flat,
    /// Weight increases monotonically with the elapsed fraction of the
    /// horizon — light start, heavy finish.
    #[serde(rename = "RAMP_UP")]
    RampUp,
    /// Weight concentrated near the 25/50/75/100% horizon marks.
    #[serde(rename = "MILESTONE_QUARTERS")]
    MilestoneQuarters,
    /// Repeating pattern of three eligible days followed by one off day.
    #[serde(rename = "WAVE_3_1")]
    Wave3On1Off,
}

impl RouteOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteOption::Flat => "FLAT",
            RouteOption::RampUp => "RAMP_UP",
            RouteOption::MilestoneQuarters => "MILESTONE_QUARTERS",
            RouteOption::Wave3On1Off => "WAVE_3_1",
        }
    }

    /// Normalize a free-form value; anything unrecognized falls back to FLAT.
    pub fn normalize(value: &str) -> Self {
        match value.trim().to_uppercase().as_str() {
            "RAMP_UP" => RouteOption::RampUp,
            "MILESTONE_QUARTERS" => RouteOption::MilestoneQuarters,
            "WAVE_3_1" => RouteOption::Wave3On1Off,
            _ => RouteOption::Flat,
        }
    }
}

impl fmt::Display for RouteOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capacity constraints the forecast must respect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanConstraints {
    #[serde(default = "default_max_blocks_per_day")]
    pub max_blocks_per_day: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_blocks_per_week: Option<u32>,
    /// Eligible weekdays, Sunday = 0 through Saturday = 6. Empty = all days.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub preferred_days_of_week: Vec<u32>,
    /// Day-keys excluded from the horizon outright.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blackout_day_keys: Vec<String>,
}

fn default_max_blocks_per_day() -> u32 {
    DEFAULT_MAX_BLOCKS_PER_DAY
}

impl Default for PlanConstraints {
    fn default() -> Self {
        Self {
            max_blocks_per_day: DEFAULT_MAX_BLOCKS_PER_DAY,
            max_blocks_per_week: None,
            preferred_days_of_week: Vec::new(),
            blackout_day_keys: Vec::new(),
        }
    }
}

/// A cycle's plan-generation strategy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Strategy {
    pub strategy_id: String,
    pub route_option: RouteOption,
    pub constraints: PlanConstraints,
}

/// The strategy a freshly admitted cycle starts with: FLAT routing under
/// the default caps.
pub fn default_strategy(goal_id: &str) -> Strategy {
    Strategy {
        strategy_id: format!("strategy-{goal_id}"),
        route_option: RouteOption::Flat,
        constraints: PlanConstraints::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_option_wire_names() {
        assert_eq!(
            serde_json::to_string(&RouteOption::Wave3On1Off).unwrap(),
            "\"WAVE_3_1\""
        );
        assert_eq!(
            serde_json::to_string(&RouteOption::MilestoneQuarters).unwrap(),
            "\"MILESTONE_QUARTERS\""
        );
        let parsed: RouteOption = serde_json::from_str("\"RAMP_UP\"").unwrap();
        assert_eq!(parsed, RouteOption::RampUp);
    }

    #[test]
    fn normalize_falls_back_to_flat() {
        assert_eq!(RouteOption::normalize("wave_3_1"), RouteOption::Wave3On1Off);
        assert_eq!(RouteOption::normalize("zigzag"), RouteOption::Flat);
        assert_eq!(RouteOption::normalize(""), RouteOption::Flat);
    }

    #[test]
    fn constraints_default_to_four_per_day() {
        let constraints: PlanConstraints = serde_json::from_str("{}").unwrap();
        assert_eq!(constraints.max_blocks_per_day, 4);
        assert!(constraints.max_blocks_per_week.is_none());
    }

    #[test]
    fn default_strategy_is_flat() {
        let strategy = default_strategy("goal-9");
        assert_eq!(strategy.strategy_id, "strategy-goal-9");
        assert_eq!(strategy.route_option, RouteOption::Flat);
    }
}
