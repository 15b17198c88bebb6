//! Difficulty analytics, tracked independently of mastery.
//!
//! Kept under its own store key so the analytics schema can evolve without
//! touching the core progress blob.

use crate::models::DifficultyStats;
use crate::store::SharedStore;
use std::collections::BTreeMap;
use tracing::warn;

/// Store key for the analytics blob.
pub const ANALYTICS_KEY: &str = "analytics";

/// One row of the difficulty ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct DifficultyEntry {
    pub plant_id: String,
    pub error_rate: f64,
    pub avg_response_ms: f64,
    pub attempts: u32,
}

/// Per-plant attempt/error/timing tracker.
pub struct DifficultyTracker {
    store: SharedStore,
    data: BTreeMap<String, DifficultyStats>,
}

impl DifficultyTracker {
    pub fn load(store: SharedStore) -> Self {
        let data = match store.get(ANALYTICS_KEY) {
            Some(blob) => serde_json::from_str(&blob).unwrap_or_else(|e| {
                warn!(error = %e, "analytics blob unreadable, starting fresh");
                BTreeMap::new()
            }),
            None => BTreeMap::new(),
        };
        Self { store, data }
    }

    fn save(&self) {
        match serde_json::to_string(&self.data) {
            Ok(blob) => self.store.set(ANALYTICS_KEY, &blob),
            Err(e) => warn!(error = %e, "failed to serialize analytics"),
        }
    }

    /// Record one attempt; stats are created lazily on first sight.
    pub fn record_answer(&mut self, plant_id: &str, correct: bool, response_ms: u64) {
        let stats = self.data.entry(plant_id.to_string()).or_default();
        stats.attempts += 1;
        stats.total_response_ms += response_ms;
        if !correct {
            stats.errors += 1;
        }
        self.save();
    }

    pub fn stats(&self, plant_id: &str) -> Option<DifficultyStats> {
        self.data.get(plant_id).copied()
    }

    /// All tracked plants, hardest first (descending error rate, ties in
    /// insertion order).
    pub fn difficulty_ranking(&self) -> Vec<DifficultyEntry> {
        let mut ranking: Vec<DifficultyEntry> = self
            .data
            .iter()
            .map(|(id, stats)| DifficultyEntry {
                plant_id: id.clone(),
                error_rate: stats.error_rate(),
                avg_response_ms: stats.avg_response_ms(),
                attempts: stats.attempts,
            })
            .collect();
        ranking.sort_by(|a, b| {
            b.error_rate
                .partial_cmp(&a.error_rate)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranking
    }

    /// The `n` hardest plants.
    pub fn most_difficult(&self, n: usize) -> Vec<DifficultyEntry> {
        let mut ranking = self.difficulty_ranking();
        ranking.truncate(n);
        ranking
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{KvStore, MemoryStore};
    use std::rc::Rc;

    fn tracker() -> DifficultyTracker {
        DifficultyTracker::load(Rc::new(MemoryStore::new()))
    }

    #[test]
    fn test_record_accumulates() {
        let mut tracker = tracker();
        tracker.record_answer("monstera", true, 1500);
        tracker.record_answer("monstera", false, 2500);

        let stats = tracker.stats("monstera").unwrap();
        assert_eq!(stats.attempts, 2);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.total_response_ms, 4000);
        assert!(stats.errors <= stats.attempts);
    }

    #[test]
    fn test_ranking_hardest_first() {
        let mut tracker = tracker();
        // crassula: 100% errors, monstera: 50%, sansevieria: 0%.
        tracker.record_answer("crassula", false, 1000);
        tracker.record_answer("monstera", false, 1000);
        tracker.record_answer("monstera", true, 1000);
        tracker.record_answer("sansevieria", true, 1000);

        let ranking = tracker.difficulty_ranking();
        let ids: Vec<&str> = ranking.iter().map(|e| e.plant_id.as_str()).collect();
        assert_eq!(ids, vec!["crassula", "monstera", "sansevieria"]);

        let top = tracker.most_difficult(1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].plant_id, "crassula");
        assert!((top[0].error_rate - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_persists_across_loads() {
        let mem = Rc::new(MemoryStore::new());
        let store: SharedStore = mem.clone();
        let mut tracker = DifficultyTracker::load(store);
        tracker.record_answer("monstera", false, 3000);

        let store: SharedStore = mem.clone();
        let reloaded = DifficultyTracker::load(store);
        let stats = reloaded.stats("monstera").unwrap();
        assert_eq!(stats.attempts, 1);
        assert_eq!(stats.errors, 1);
    }

    #[test]
    fn test_corrupt_blob_starts_fresh() {
        let mem = Rc::new(MemoryStore::new());
        mem.set(ANALYTICS_KEY, "garbage");
        let store: SharedStore = mem.clone();
        let tracker = DifficultyTracker::load(store);
        assert!(tracker.difficulty_ranking().is_empty());
    }
}
