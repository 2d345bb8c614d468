//! # cov-plan
//!
//! Deliverable seeding and the deterministic day-by-day forecast.
//!
//! Both generators here are pure: no clock reads, no randomness, no I/O.
//! Identical inputs produce byte-identical serialized output — including
//! the [`ColdPlan`] assumptions hash — which is the property everything
//! downstream (plan proofs, regeneration diffing) leans on.
//!
//! ## Key components
//!
//! - [`generate_auto_deliverables`] — heuristic staged deliverables from an
//!   admitted contract (≥3, every one with positive required blocks)
//! - [`Strategy`] / [`RouteOption`] / [`PlanConstraints`] — how blocks are
//!   routed across the horizon and under which caps
//! - [`generate_cold_plan`] / [`rebase_cold_plan`] / [`daily_projection`] —
//!   the forecast itself, or a structured [`InfeasibleReport`] when the
//!   horizon cannot hold the required blocks

pub mod cold_plan;
pub mod deliverables;
pub mod error;
pub mod strategy;

pub use cold_plan::{
    daily_projection, generate_cold_plan, rebase_cold_plan, ColdPlan, DailyProjection,
    DayForecast, InfeasibleReport, PlanInputs, GENERATOR_VERSION,
};
pub use deliverables::{
    generate_auto_deliverables, total_required_blocks, AutoDeliverableOutcome, Criterion,
    Deliverable, DetectedGoalType, Domain,
};
pub use error::PlanError;
pub use strategy::{default_strategy, PlanConstraints, RouteOption, Strategy};
