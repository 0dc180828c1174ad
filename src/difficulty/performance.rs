//! Player performance snapshots and scoring
//!
//! A snapshot reduces one telemetry sample to a single score in [0, 1].
//! Scoring is a pure function of the snapshot's fields.

use serde::{Deserialize, Serialize};

/// Survival time (seconds) at which the survival metric saturates
pub const SURVIVAL_TIME_CAP: f64 = 3600.0;
/// Kill count at which the kill metric saturates
pub const ENEMIES_DEFEATED_CAP: f64 = 100.0;

/// Weight of each normalized metric in the overall score (sums to 1.0)
pub mod weights {
    pub const SUCCESS_RATE: f64 = 0.25;
    pub const SURVIVAL_TIME: f64 = 0.15;
    pub const ENEMIES_DEFEATED: f64 = 0.20;
    pub const DAMAGE_RATIO: f64 = 0.15;
    pub const EXPLORATION_PROGRESS: f64 = 0.10;
    pub const GENETIC_STABILITY: f64 = 0.05;
    pub const EMOTIONAL_BALANCE: f64 = 0.05;
    pub const AI_ADAPTATION: f64 = 0.05;
}

/// Raw telemetry supplied by the game loop
///
/// Defaults describe a player nothing is known about yet: middling
/// success, stable genetics and emotions, average AI adaptation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Telemetry {
    pub success_rate: f64,
    pub survival_time_seconds: f64,
    pub enemies_defeated: u32,
    pub damage_dealt: f64,
    pub damage_taken: f64,
    pub exploration_progress: f64,
    pub genetic_stability: f64,
    pub emotional_balance: f64,
    pub ai_adaptation: f64,
}

impl Default for Telemetry {
    fn default() -> Self {
        Self {
            success_rate: 0.5,
            survival_time_seconds: 0.0,
            enemies_defeated: 0,
            damage_dealt: 0.0,
            damage_taken: 0.0,
            exploration_progress: 0.0,
            genetic_stability: 1.0,
            emotional_balance: 1.0,
            ai_adaptation: 0.5,
        }
    }
}

impl Telemetry {
    /// Telemetry with every metric at zero
    pub fn zeroed() -> Self {
        Self {
            success_rate: 0.0,
            survival_time_seconds: 0.0,
            enemies_defeated: 0,
            damage_dealt: 0.0,
            damage_taken: 0.0,
            exploration_progress: 0.0,
            genetic_stability: 0.0,
            emotional_balance: 0.0,
            ai_adaptation: 0.0,
        }
    }
}

/// Score split into its weighted components
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub overall_score: f64,
    pub success_rate: f64,
    pub survival_time: f64,
    pub enemies_defeated: f64,
    pub damage_ratio: f64,
    pub exploration_progress: f64,
    pub genetic_stability: f64,
    pub emotional_balance: f64,
    pub ai_adaptation: f64,
}

/// One immutable measurement of player performance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceSnapshot {
    timestamp: f64,
    telemetry: Telemetry,
}

fn unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

impl PerformanceSnapshot {
    /// Capture telemetry at `timestamp`, forcing each field into its range
    pub fn new(timestamp: f64, telemetry: Telemetry) -> Self {
        let telemetry = Telemetry {
            success_rate: unit(telemetry.success_rate),
            survival_time_seconds: non_negative(telemetry.survival_time_seconds),
            enemies_defeated: telemetry.enemies_defeated,
            damage_dealt: non_negative(telemetry.damage_dealt),
            damage_taken: non_negative(telemetry.damage_taken),
            exploration_progress: unit(telemetry.exploration_progress),
            genetic_stability: unit(telemetry.genetic_stability),
            emotional_balance: unit(telemetry.emotional_balance),
            ai_adaptation: unit(telemetry.ai_adaptation),
        };
        Self {
            timestamp: non_negative(timestamp),
            telemetry,
        }
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn telemetry(&self) -> &Telemetry {
        &self.telemetry
    }

    pub fn success_rate(&self) -> f64 {
        self.telemetry.success_rate
    }

    pub fn survival_time_seconds(&self) -> f64 {
        self.telemetry.survival_time_seconds
    }

    pub fn enemies_defeated(&self) -> u32 {
        self.telemetry.enemies_defeated
    }

    /// Dealt/taken, capped at 1; zero until the player has taken damage
    pub fn damage_ratio(&self) -> f64 {
        let t = &self.telemetry;
        if t.damage_taken > 0.0 {
            (t.damage_dealt / t.damage_taken).min(1.0)
        } else {
            0.0
        }
    }

    pub fn breakdown(&self) -> ScoreBreakdown {
        let t = &self.telemetry;
        let survival = (t.survival_time_seconds / SURVIVAL_TIME_CAP).min(1.0);
        let kills = (f64::from(t.enemies_defeated) / ENEMIES_DEFEATED_CAP).min(1.0);

        let success_rate = t.success_rate * weights::SUCCESS_RATE;
        let survival_time = survival * weights::SURVIVAL_TIME;
        let enemies_defeated = kills * weights::ENEMIES_DEFEATED;
        let damage_ratio = self.damage_ratio() * weights::DAMAGE_RATIO;
        let exploration_progress = t.exploration_progress * weights::EXPLORATION_PROGRESS;
        let genetic_stability = t.genetic_stability * weights::GENETIC_STABILITY;
        let emotional_balance = t.emotional_balance * weights::EMOTIONAL_BALANCE;
        let ai_adaptation = t.ai_adaptation * weights::AI_ADAPTATION;

        let sum = success_rate
            + survival_time
            + enemies_defeated
            + damage_ratio
            + exploration_progress
            + genetic_stability
            + emotional_balance
            + ai_adaptation;

        ScoreBreakdown {
            overall_score: sum.clamp(0.0, 1.0),
            success_rate,
            survival_time,
            enemies_defeated,
            damage_ratio,
            exploration_progress,
            genetic_stability,
            emotional_balance,
            ai_adaptation,
        }
    }

    pub fn overall_score(&self) -> f64 {
        self.breakdown().overall_score
    }
}
