//! High score leaderboard
//!
//! Top 10 final scores, highest first, persisted through the host's
//! key-value store.

use serde::{Deserialize, Serialize};

use crate::consts::HIGH_SCORES_KEY;
use crate::persistence::{KeyValueStore, load_json, save_json};

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Difficulty level reached
    pub level: u32,
    /// Seconds survived
    pub survival_time: f32,
    /// Session ordinal (games played when it was set)
    pub game: u32,
}

/// High score leaderboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HighScores {
    entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from the store, starting fresh when absent or corrupt
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match load_json::<HighScores>(store, HIGH_SCORES_KEY) {
            Some(mut scores) => {
                // Hand-edited data may be unsorted or too long
                scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
                scores.entries.truncate(MAX_HIGH_SCORES);
                log::info!("Loaded {} high scores", scores.entries.len());
                scores
            }
            None => {
                log::info!("No high scores found, starting fresh");
                Self::new()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) {
        save_json(store, HIGH_SCORES_KEY, self);
        log::debug!("High scores saved ({} entries)", self.entries.len());
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().is_none_or(|e| score > e.score)
    }

    /// Rank a score would achieve (1-indexed, None if it doesn't qualify)
    ///
    /// A new score ties ahead of older equal scores.
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let pos = self.entries.iter().position(|e| score >= e.score);
        Some(pos.unwrap_or(self.entries.len()) + 1)
    }

    /// Insert a qualifying entry, trim, and persist.
    /// Returns the rank achieved or None if it didn't qualify.
    pub fn add_score(&mut self, entry: HighScoreEntry, store: &mut dyn KeyValueStore) -> Option<usize> {
        let rank = self.potential_rank(entry.score)?;
        self.entries.insert(rank - 1, entry);
        self.entries.truncate(MAX_HIGH_SCORES);
        self.save(store);
        Some(rank)
    }

    pub fn entries(&self) -> &[HighScoreEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Highest score, or 0 when the board is empty
    pub fn top_score(&self) -> u64 {
        self.entries.first().map_or(0, |e| e.score)
    }

    pub fn clear(&mut self, store: &mut dyn KeyValueStore) {
        self.entries.clear();
        store.remove(HIGH_SCORES_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    fn entry(score: u64, game: u32) -> HighScoreEntry {
        HighScoreEntry {
            score,
            level: 1,
            survival_time: 10.0,
            game,
        }
    }

    #[test]
    fn test_qualifies() {
        let mut store = MemoryStore::new();
        let mut scores = HighScores::new();
        assert!(!scores.qualifies(0));
        assert!(scores.qualifies(1));

        for i in 1..=10 {
            scores.add_score(entry(i * 10, i as u32), &mut store);
        }
        assert_eq!(scores.len(), MAX_HIGH_SCORES);
        assert!(!scores.qualifies(10));
        assert!(!scores.qualifies(5));
        assert!(scores.qualifies(11));
        assert_eq!(scores.potential_rank(5), None);
        assert_eq!(scores.potential_rank(1000), Some(1));
    }

    #[test]
    fn test_ordering_and_rank() {
        let mut store = MemoryStore::new();
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(entry(50, 1), &mut store), Some(1));
        assert_eq!(scores.add_score(entry(80, 2), &mut store), Some(1));
        assert_eq!(scores.add_score(entry(20, 3), &mut store), Some(3));
        assert_eq!(scores.add_score(entry(50, 4), &mut store), Some(2));

        let order: Vec<(u64, u32)> = scores.entries().iter().map(|e| (e.score, e.game)).collect();
        assert_eq!(order, vec![(80, 2), (50, 4), (50, 1), (20, 3)]);
        assert_eq!(scores.top_score(), 80);
    }

    #[test]
    fn test_trims_to_ten() {
        let mut store = MemoryStore::new();
        let mut scores = HighScores::new();
        for i in 1..=15u64 {
            scores.add_score(entry(i, i as u32), &mut store);
        }
        assert_eq!(scores.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.top_score(), 15);
        assert_eq!(scores.entries().last().map(|e| e.score), Some(6));
    }

    #[test]
    fn test_reload_from_store() {
        let mut store = MemoryStore::new();
        let mut scores = HighScores::load(&store);
        assert!(scores.is_empty());
        assert_eq!(scores.top_score(), 0);

        scores.add_score(entry(30, 1), &mut store);
        scores.add_score(entry(70, 2), &mut store);

        let reloaded = HighScores::load(&store);
        assert_eq!(reloaded, scores);

        scores.clear(&mut store);
        assert!(HighScores::load(&store).is_empty());
    }

    #[test]
    fn test_zero_score_not_recorded() {
        let mut store = MemoryStore::new();
        let mut scores = HighScores::new();
        assert_eq!(scores.add_score(entry(0, 1), &mut store), None);
        assert!(store.is_empty());
    }
}
