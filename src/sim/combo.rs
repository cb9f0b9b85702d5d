//! Combo and dodge scoring
//!
//! A dodge is an obstacle that leaves the field without touching the
//! player. Dodges closer together than the timeout build a streak; a late
//! dodge restarts the streak at 1 rather than 0.

use serde::{Deserialize, Serialize};

use super::events::{EventQueue, GameEvent};
use crate::consts::*;
use crate::persistence::{KeyValueStore, load_json, save_json};

/// Streak bookkeeping
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ComboState {
    pub current_combo: u32,
    pub best_combo: u32,
    /// Session time of the last dodge (seconds)
    pub last_dodge_timestamp: f32,
    pub total_dodges: u64,
}

#[derive(Debug, Clone)]
pub struct ComboAccumulator {
    state: ComboState,
    timeout: f32,
}

impl ComboAccumulator {
    /// New accumulator seeded with the persisted best combo
    pub fn new(store: &dyn KeyValueStore) -> Self {
        let best_combo = load_json::<u32>(store, BEST_COMBO_KEY).unwrap_or(0);
        Self {
            state: ComboState {
                best_combo,
                ..ComboState::default()
            },
            timeout: COMBO_TIMEOUT,
        }
    }

    pub fn state(&self) -> &ComboState {
        &self.state
    }

    pub fn current_combo(&self) -> u32 {
        self.state.current_combo
    }

    pub fn best_combo(&self) -> u32 {
        self.state.best_combo
    }

    /// Count a dodge at session time `now` and return the points it is worth
    pub fn record_dodge(
        &mut self,
        now: f32,
        store: &mut dyn KeyValueStore,
        events: &mut EventQueue,
    ) -> u32 {
        if now - self.state.last_dodge_timestamp > self.timeout {
            self.state.current_combo = 0;
        }

        self.state.current_combo += 1;
        self.state.total_dodges += 1;
        self.state.last_dodge_timestamp = now;

        if self.state.current_combo > self.state.best_combo {
            self.state.best_combo = self.state.current_combo;
            save_json(store, BEST_COMBO_KEY, &self.state.best_combo);
        }

        let combo = self.state.current_combo;
        let points = self.calculate_points();
        events.push(GameEvent::ComboChanged { combo, points });

        if COMBO_MILESTONES.contains(&combo) {
            log::debug!("Combo milestone {}", combo);
            events.push(GameEvent::ComboMilestone { combo });
        } else if combo % 5 == 0 {
            events.push(GameEvent::ComboSelection { combo });
        }

        points
    }

    /// Points for the current streak: grows by one every ten dodges
    pub fn calculate_points(&self) -> u32 {
        1 + self.state.current_combo / 10
    }

    pub fn multiplier(&self) -> f32 {
        1.0 + self.state.current_combo as f32 * 0.15
    }

    /// Break the streak. Silent when there is no streak.
    pub fn reset_combo(&mut self, events: &mut EventQueue) {
        if self.state.current_combo > 0 {
            events.push(GameEvent::ComboLost);
            self.state.current_combo = 0;
        }
    }

    /// Fresh session: zero the streak and counters without events (best is kept)
    pub fn begin_session(&mut self) {
        self.state.current_combo = 0;
        self.state.last_dodge_timestamp = 0.0;
        self.state.total_dodges = 0;
    }
}
