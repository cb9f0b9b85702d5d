//! Game events
//!
//! Everything the host reacts to (sprites, sounds, haptics, HUD text,
//! achievements) is published as a [`GameEvent`] on a queue that the host
//! drains once per frame. Events are appended in the order they happened.

use serde::{Deserialize, Serialize};

use super::collision::ContactEvent;
use super::pool::{Entity, EntityHandle};
use super::state::{GameState, PowerUpKind};

/// Something the host may want to react to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Lifecycle transition
    StateChanged { old: GameState, new: GameState },
    /// Score changed (time, dodges or bonus)
    ScoreChanged { score: u64 },
    /// Difficulty level went up (1-based level number)
    DifficultyIncreased { level: u32 },
    /// Session ended; `high_score_rank` is the 1-based leaderboard slot, if any
    GameEnded {
        final_score: u64,
        survival_time: f32,
        high_score_rank: Option<usize>,
    },
    /// A dodge extended (or restarted) the combo
    ComboChanged { combo: u32, points: u32 },
    /// Combo dropped back to zero
    ComboLost,
    /// Combo hit one of the milestone values
    ComboMilestone { combo: u32 },
    /// Combo hit a multiple of five that is not a milestone (light feedback)
    ComboSelection { combo: u32 },
    /// Entity taken from the pool and placed in the field
    EntitySpawned(Entity),
    /// Entity returned to the pool
    EntityRecycled(Entity),
    /// Player touched something this tick
    Contact(ContactEvent),
    /// Power-up picked up; its effect is now running
    PowerUpCollected { kind: PowerUpKind },
    /// Timed effect ran out
    PowerUpExpired { kind: PowerUpKind },
    /// Shield soaked up an obstacle hit
    ShieldAbsorbed { obstacle: EntityHandle },
}

/// FIFO queue of events produced during ticks and lifecycle calls
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: GameEvent) {
        log::trace!("event: {:?}", event);
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Pending events, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }

    /// Take every pending event, leaving the queue empty
    pub fn drain(&mut self) -> std::vec::Drain<'_, GameEvent> {
        self.events.drain(..)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
