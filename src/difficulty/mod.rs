//! Dynamic difficulty adjustment
//!
//! Observes player performance and retunes enemy and loot multipliers so
//! challenge tracks the active profile's target score.

pub mod controller;
pub mod factor;
pub mod history;
pub mod parameter;
pub mod performance;
pub mod persistence;
pub mod profile;
pub mod stats;

pub use controller::{DdaController, DecisionOutcome};
pub use factor::{DifficultyFactor, Direction};
pub use history::PerformanceHistory;
pub use parameter::BoundedParameter;
pub use performance::{PerformanceSnapshot, ScoreBreakdown, Telemetry};
pub use persistence::{SaveDocument, SnapshotRecord};
pub use profile::{DifficultyProfile, FactorTable, ProfileRegistry};
pub use stats::{ParameterStats, StatsReport, Trend};
