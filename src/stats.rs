//! Cross-session statistics
//!
//! Persisted as one JSON blob through the host's key-value store.

use serde::{Deserialize, Serialize};

use crate::consts::STATS_KEY;
use crate::persistence::{KeyValueStore, load_json, save_json};

/// Lifetime totals across sessions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionStats {
    pub games_played: u32,
    pub total_score: u64,
    pub best_score: u64,
    /// Longest session (seconds)
    pub best_survival_time: f32,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from the store, starting fresh when absent or corrupt
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match load_json::<SessionStats>(store, STATS_KEY) {
            Some(stats) => {
                log::info!("Loaded statistics ({} games played)", stats.games_played);
                stats
            }
            None => {
                log::info!("No statistics found, starting fresh");
                Self::new()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) {
        save_json(store, STATS_KEY, self);
    }

    /// A session started
    pub fn record_start(&mut self, store: &mut dyn KeyValueStore) {
        self.games_played += 1;
        self.save(store);
    }

    /// A session ended. Returns true when the score is a new best.
    pub fn record_end(&mut self, score: u64, survival_time: f32, store: &mut dyn KeyValueStore) -> bool {
        self.total_score = self.total_score.saturating_add(score);
        if survival_time > self.best_survival_time {
            self.best_survival_time = survival_time;
        }
        let new_best = score > self.best_score;
        if new_best {
            self.best_score = score;
        }
        self.save(store);
        new_best
    }

    pub fn average_score(&self) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            self.total_score as f64 / self.games_played as f64
        }
    }

    /// Wipe all totals, in memory and in the store
    pub fn reset(&mut self, store: &mut dyn KeyValueStore) {
        *self = Self::new();
        store.remove(STATS_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_record_and_reload() {
        let mut store = MemoryStore::new();
        let mut stats = SessionStats::load(&store);
        assert_eq!(stats, SessionStats::default());

        stats.record_start(&mut store);
        assert!(stats.record_end(120, 45.0, &mut store));
        stats.record_start(&mut store);
        assert!(!stats.record_end(80, 60.0, &mut store));

        let reloaded = SessionStats::load(&store);
        assert_eq!(reloaded.games_played, 2);
        assert_eq!(reloaded.total_score, 200);
        assert_eq!(reloaded.best_score, 120);
        assert!((reloaded.best_survival_time - 60.0).abs() < 0.001);
        assert!((reloaded.average_score() - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_reset_clears_store() {
        let mut store = MemoryStore::new();
        let mut stats = SessionStats::new();
        stats.record_start(&mut store);
        stats.reset(&mut store);
        assert_eq!(stats.games_played, 0);
        assert_eq!(stats.average_score(), 0.0);
        assert!(store.get(STATS_KEY).is_none());
    }
}
