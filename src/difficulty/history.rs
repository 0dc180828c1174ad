use super::performance::PerformanceSnapshot;
use std::collections::VecDeque;

/// Ring buffer of recent performance snapshots, oldest first
#[derive(Debug, Clone)]
pub struct PerformanceHistory {
    snapshots: VecDeque<PerformanceSnapshot>,
    capacity: usize,
}

impl PerformanceHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            snapshots: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, snapshot: PerformanceSnapshot) {
        if self.snapshots.len() >= self.capacity {
            self.snapshots.pop_front(); // Remove oldest
        }
        self.snapshots.push_back(snapshot);
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }

    pub fn latest(&self) -> Option<&PerformanceSnapshot> {
        self.snapshots.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PerformanceSnapshot> {
        self.snapshots.iter()
    }

    /// The last `n` snapshots, oldest first
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &PerformanceSnapshot> {
        let skip = self.snapshots.len().saturating_sub(n);
        self.snapshots.iter().skip(skip)
    }

    /// Overall scores of the last `n` snapshots, oldest first
    pub fn recent_scores(&self, n: usize) -> Vec<f64> {
        self.recent(n).map(|s| s.overall_score()).collect()
    }
}

impl Default for PerformanceHistory {
    fn default() -> Self {
        Self::new(100)
    }
}
