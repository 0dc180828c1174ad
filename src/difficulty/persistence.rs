//! Save and load controller state as JSON
//!
//! Only profile identity, counters and performance history are stored.
//! Parameter values are not: after a load the active profile's parameters
//! continue from whatever this process holds, which for a fresh
//! controller is the registry baseline.

use crate::core::error::Result;
use crate::difficulty::controller::DdaController;
use crate::difficulty::performance::{PerformanceSnapshot, Telemetry};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// On-disk layout of one history entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub timestamp: f64,
    pub success_rate: f64,
    pub survival_time: f64,
    pub enemies_defeated: u32,
    pub damage_dealt: f64,
    pub damage_taken: f64,
    pub exploration_progress: f64,
    pub genetic_stability: f64,
    pub emotional_balance: f64,
    pub ai_adaptation: f64,
}

impl From<&PerformanceSnapshot> for SnapshotRecord {
    fn from(snapshot: &PerformanceSnapshot) -> Self {
        let t = snapshot.telemetry();
        Self {
            timestamp: snapshot.timestamp(),
            success_rate: t.success_rate,
            survival_time: t.survival_time_seconds,
            enemies_defeated: t.enemies_defeated,
            damage_dealt: t.damage_dealt,
            damage_taken: t.damage_taken,
            exploration_progress: t.exploration_progress,
            genetic_stability: t.genetic_stability,
            emotional_balance: t.emotional_balance,
            ai_adaptation: t.ai_adaptation,
        }
    }
}

impl From<&SnapshotRecord> for PerformanceSnapshot {
    fn from(record: &SnapshotRecord) -> Self {
        PerformanceSnapshot::new(
            record.timestamp,
            Telemetry {
                success_rate: record.success_rate,
                survival_time_seconds: record.survival_time,
                enemies_defeated: record.enemies_defeated,
                damage_dealt: record.damage_dealt,
                damage_taken: record.damage_taken,
                exploration_progress: record.exploration_progress,
                genetic_stability: record.genetic_stability,
                emotional_balance: record.emotional_balance,
                ai_adaptation: record.ai_adaptation,
            },
        )
    }
}

/// The saved document
///
/// Every field is required; a document missing any of them is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveDocument {
    pub current_profile: Option<String>,
    pub total_adaptations: u64,
    pub difficulty_changes: u64,
    pub performance_history: Vec<SnapshotRecord>,
}

impl DdaController {
    pub fn to_document(&self) -> SaveDocument {
        SaveDocument {
            current_profile: Some(self.current_profile_name().to_string()),
            total_adaptations: self.total_adaptations,
            difficulty_changes: self.difficulty_changes,
            performance_history: self.history().iter().map(SnapshotRecord::from).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }

    /// Write state to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        tracing::info!("Difficulty state saved to {:?}", path);
        Ok(())
    }

    /// Replace counters and history with a saved document
    ///
    /// An unknown or missing profile leaves the active profile as it is.
    pub fn apply_document(&mut self, document: SaveDocument) {
        match document.current_profile.as_deref() {
            Some(key) if self.registry().contains(key) => {
                self.set_profile(key);
            }
            Some(key) => {
                tracing::warn!("Ignoring unknown saved profile '{}'", key);
            }
            None => {}
        }

        self.total_adaptations = document.total_adaptations;
        self.difficulty_changes = document.difficulty_changes;

        let history = self.history_mut();
        history.clear();
        for record in &document.performance_history {
            history.push(PerformanceSnapshot::from(record));
        }

        // Restored samples may come from a longer session than this one
        let newest = document
            .performance_history
            .iter()
            .map(|r| r.timestamp)
            .filter(|t| t.is_finite())
            .fold(f64::NEG_INFINITY, f64::max);
        self.advance_clock_to(newest);
    }

    /// Parse and apply a JSON document; on error nothing changes
    pub fn load_json(&mut self, json: &str) -> Result<()> {
        let document: SaveDocument = serde_json::from_str(json)?;
        self.apply_document(document);
        Ok(())
    }

    /// Read state from `path`; on error nothing changes
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let json = fs::read_to_string(path).map_err(|e| {
            tracing::warn!("Failed to read difficulty state {:?}: {}", path, e);
            e
        })?;
        self.load_json(&json).map_err(|e| {
            tracing::warn!("Rejected difficulty state {:?}: {}", path, e);
            e
        })?;
        tracing::info!("Difficulty state loaded from {:?}", path);
        Ok(())
    }
}
