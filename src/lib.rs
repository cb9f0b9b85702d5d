//! Avoid Obstacles - gameplay core for a falling-obstacle arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (state machine, spawner, collisions, scoring)
//! - `config`: Data-driven game balance and difficulty tables
//! - `persistence`: Key-value store seam used for best combo and statistics
//! - `stats`: Cross-session statistics
//! - `highscores`: Persisted top-10 leaderboard
//!
//! Rendering, audio, haptics and input capture live in the host. The host
//! calls [`sim::GameStateMachine::tick`] once per frame and drains the event
//! queue afterwards.

pub mod config;
pub mod error;
pub mod highscores;
pub mod persistence;
pub mod sim;
pub mod stats;

pub use config::EngineConfig;
pub use error::ConfigError;
pub use highscores::{HighScoreEntry, HighScores};
pub use persistence::{KeyValueStore, MemoryStore};
pub use sim::{GameEvent, GameState, GameStateMachine};
pub use stats::SessionStats;

/// Game configuration constants
pub mod consts {
    /// Largest frame delta accepted by a single tick (seconds)
    pub const MAX_DT: f32 = 1.0;
    /// Longest world step between overlap tests; longer frames are split
    pub const MAX_SUBSTEP: f32 = 1.0 / 60.0;

    /// Default play-field size (scene size on a phone in points)
    pub const FIELD_WIDTH: f32 = 400.0;
    pub const FIELD_HEIGHT: f32 = 800.0;

    /// Player defaults
    pub const PLAYER_SIZE: f32 = 50.0;
    /// Player rests this far above the bottom edge until the host moves it
    pub const PLAYER_START_Y: f32 = 100.0;

    /// Obstacle defaults
    pub const OBSTACLE_POOL_SIZE: usize = 20;
    pub const OBSTACLE_MIN_SIZE: f32 = 30.0;
    pub const OBSTACLE_MAX_SIZE: f32 = 60.0;

    /// Power-up defaults
    pub const POWER_UP_POOL_SIZE: usize = 10;
    pub const POWER_UP_SIZE: f32 = 30.0;
    /// Power-ups fall slower than obstacles
    pub const POWER_UP_FALL_SPEED: f32 = 120.0;
    pub const POWER_UP_MIN_INTERVAL: f32 = 5.0;
    pub const POWER_UP_MAX_INTERVAL: f32 = 15.0;
    /// Flat bonus for collecting a power-up (not scaled by difficulty)
    pub const POWER_UP_SCORE_BONUS: u64 = 50;

    /// Combo defaults
    pub const COMBO_TIMEOUT: f32 = 2.0;
    pub const COMBO_MILESTONES: [u32; 5] = [5, 10, 25, 50, 100];

    /// Adaptive difficulty band
    pub const ADAPTIVE_MIN_MULTIPLIER: f32 = 0.7;
    pub const ADAPTIVE_MAX_MULTIPLIER: f32 = 1.5;
    pub const ADAPTIVE_HISTORY: usize = 10;
    pub const ADAPTIVE_WINDOW: usize = 3;

    /// Thickness of the invisible edge strips around the field
    pub const BOUNDARY_THICKNESS: f32 = 2.0;

    /// Store keys
    pub const BEST_COMBO_KEY: &str = "avoid_obstacles_best_combo";
    pub const STATS_KEY: &str = "avoid_obstacles_statistics";
    pub const HIGH_SCORES_KEY: &str = "avoid_obstacles_high_scores";
}

/// Clamp a host frame delta into `[0, max_dt]`.
///
/// Negative, NaN and zero deltas all become zero.
#[inline]
pub fn clamp_dt(dt: f32, max_dt: f32) -> f32 {
    if dt.is_nan() || dt <= 0.0 {
        0.0
    } else {
        dt.min(max_dt)
    }
}
