//! Observability snapshot of the controller for HUD and debug display

use crate::difficulty::parameter::BoundedParameter;
use crate::difficulty::performance::ScoreBreakdown;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
}

impl Trend {
    /// Compare the first and last score of a window
    ///
    /// Anything but a strict rise, including a single score, is reported
    /// as decreasing.
    pub fn from_scores(scores: &[f64]) -> Self {
        match (scores.first(), scores.last()) {
            (Some(first), Some(last)) if scores.len() > 1 && last > first => Trend::Increasing,
            _ => Trend::Decreasing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterStats {
    pub name: &'static str,
    pub current_value: f64,
    pub base_value: f64,
    pub multiplier: f64,
    pub min_value: f64,
    pub max_value: f64,
    pub target_value: Option<f64>,
}

impl From<&BoundedParameter> for ParameterStats {
    fn from(param: &BoundedParameter) -> Self {
        Self {
            name: param.name(),
            current_value: param.current_value(),
            base_value: param.base_value(),
            multiplier: param.multiplier(),
            min_value: param.min_value(),
            max_value: param.max_value(),
            target_value: param.target_value(),
        }
    }
}

/// Score breakdown of the newest snapshot plus its headline raw values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestPerformance {
    pub timestamp: f64,
    pub success_rate: f64,
    pub survival_time: f64,
    pub enemies_defeated: u32,
    pub score: ScoreBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentPerformance {
    pub recent_scores: Vec<f64>,
    pub average_score: f64,
    pub trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub profile_key: String,
    pub profile_name: String,
    pub description: String,
    pub target_performance: f64,
    pub adaptation_speed: f64,
    pub total_adaptations: u64,
    pub difficulty_changes: u64,
    pub history_len: usize,
    pub parameters: Vec<ParameterStats>,
    pub current_performance: Option<LatestPerformance>,
    pub performance_history: Option<RecentPerformance>,
}
