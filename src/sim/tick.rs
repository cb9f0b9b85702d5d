//! Game state machine and per-frame tick
//!
//! The host calls [`GameStateMachine::tick`] once per rendered frame and
//! drains the event queue afterwards. Lifecycle changes only happen through
//! `start`, `pause`, `resume` and `end` (an obstacle hit calls `end`).

use glam::Vec2;

use super::collision::{Body, Boundary, CollisionResolver, ContactEvent, boundaries_for};
use super::combo::ComboAccumulator;
use super::difficulty::{AdaptiveDifficulty, DifficultyCurve, DifficultyLevel};
use super::events::{EventQueue, GameEvent};
use super::pool::{EntityPool, PoolKind};
use super::rect::Rect;
use super::spawn::{SpawnScheduler, recycle};
use super::state::{GameState, Player, PowerUpKind};
use crate::clamp_dt;
use crate::config::EngineConfig;
use crate::consts::{BOUNDARY_THICKNESS, MAX_SUBSTEP};
use crate::error::ConfigError;
use crate::highscores::{HighScoreEntry, HighScores};
use crate::persistence::{KeyValueStore, MemoryStore};
use crate::stats::SessionStats;

/// End-of-session (or in-progress) numbers for the host's results screen
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct SessionSummary {
    pub score: u64,
    pub survival_time: f32,
    pub difficulty_level: u32,
    pub dodges: u64,
    pub best_combo: u32,
    pub collisions: u32,
    pub power_ups_collected: u32,
    /// Leaderboard slot of the last finished session
    pub high_score_rank: Option<usize>,
}

/// Top-level gameplay controller
pub struct GameStateMachine {
    config: EngineConfig,
    state: GameState,

    // Session numbers
    score: u64,
    survival_time: f32,
    current_level: u32,
    current_difficulty: DifficultyLevel,
    collisions: u32,
    power_ups_collected: u32,
    high_score_rank: Option<usize>,

    // Collaborators
    curve: DifficultyCurve,
    adaptive: AdaptiveDifficulty,
    combo: ComboAccumulator,
    spawner: SpawnScheduler,
    obstacles: EntityPool,
    power_ups: EntityPool,
    stats: SessionStats,
    high_scores: HighScores,
    store: Box<dyn KeyValueStore>,

    // World
    player: Player,
    field: Rect,
    boundaries: [Boundary; 4],

    events: EventQueue,
}

impl GameStateMachine {
    /// Build an engine in `WaitingToStart`. Fails only on a bad config.
    pub fn new(config: EngineConfig, store: Box<dyn KeyValueStore>) -> Result<Self, ConfigError> {
        config.validate()?;
        let curve = DifficultyCurve::new(config.difficulty.clone())?;
        let adaptive = AdaptiveDifficulty::new();
        let current_difficulty = adaptive.adjust(curve.level_for(0));

        let combo = ComboAccumulator::new(&*store);
        let stats = SessionStats::load(&*store);
        let high_scores = HighScores::load(&*store);

        let field = config.field;
        let mut player = Player::spawn_in(&field);
        player.size = Vec2::splat(config.player_size);

        log::info!(
            "Engine ready: field {}x{}, {} difficulty levels, best combo {}",
            field.width(),
            field.height(),
            curve.levels().len(),
            combo.best_combo()
        );

        Ok(Self {
            state: GameState::WaitingToStart,
            score: 0,
            survival_time: 0.0,
            current_level: 1,
            current_difficulty,
            collisions: 0,
            power_ups_collected: 0,
            high_score_rank: None,
            spawner: SpawnScheduler::new(config.spawn, current_difficulty, config.seed),
            obstacles: EntityPool::new(PoolKind::Obstacle, config.obstacle_pool_size),
            power_ups: EntityPool::new(PoolKind::PowerUp, config.power_up_pool_size),
            curve,
            adaptive,
            combo,
            stats,
            high_scores,
            store,
            player,
            boundaries: boundaries_for(&field, BOUNDARY_THICKNESS),
            field,
            events: EventQueue::new(),
            config,
        })
    }

    /// Engine backed by an in-memory store
    pub fn with_memory_store(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::new(config, Box::new(MemoryStore::new()))
    }

    // === Queries ===

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn survival_time(&self) -> f32 {
        self.survival_time
    }

    /// 1-based difficulty level of the running session
    pub fn current_difficulty_level(&self) -> u32 {
        self.current_level
    }

    /// Pacing in effect (base level scaled by the adaptive multiplier)
    pub fn current_difficulty(&self) -> &DifficultyLevel {
        &self.current_difficulty
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn field(&self) -> &Rect {
        &self.field
    }

    pub fn obstacles(&self) -> &EntityPool {
        &self.obstacles
    }

    pub fn power_ups(&self) -> &EntityPool {
        &self.power_ups
    }

    pub fn curve(&self) -> &DifficultyCurve {
        &self.curve
    }

    pub fn adaptive(&self) -> &AdaptiveDifficulty {
        &self.adaptive
    }

    pub fn combo(&self) -> &ComboAccumulator {
        &self.combo
    }

    pub fn spawner(&self) -> &SpawnScheduler {
        &self.spawner
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn store(&self) -> &dyn KeyValueStore {
        &*self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            score: self.score,
            survival_time: self.survival_time,
            difficulty_level: self.current_level,
            dodges: self.combo.state().total_dodges,
            best_combo: self.combo.best_combo(),
            collisions: self.collisions,
            power_ups_collected: self.power_ups_collected,
            high_score_rank: self.high_score_rank,
        }
    }

    // === Events ===

    /// Pending events, oldest first
    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// Take every pending event
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain().collect()
    }

    // === Host input ===

    /// Set the player position (touch, tilt or drag target). No smoothing.
    pub fn move_player_to(&mut self, point: Vec2) {
        self.player.move_to(point);
    }

    /// New scene size. Invalid bounds are ignored.
    pub fn set_field_bounds(&mut self, field: Rect) {
        if !field.is_valid() {
            log::warn!("Ignoring invalid field bounds {:?}", field);
            return;
        }
        self.field = field;
        self.boundaries = boundaries_for(&field, BOUNDARY_THICKNESS);
        log::debug!("Field resized to {}x{}", field.width(), field.height());
    }

    // === Lifecycle ===

    /// Start a session from `WaitingToStart` or restart from `GameOver`
    pub fn start(&mut self) {
        if !matches!(self.state, GameState::WaitingToStart | GameState::GameOver) {
            return;
        }
        self.set_state(GameState::Playing);

        self.clear_field();
        self.score = 0;
        self.survival_time = 0.0;
        self.collisions = 0;
        self.power_ups_collected = 0;
        self.high_score_rank = None;
        self.current_level = self.curve.level_index_for(0);
        self.current_difficulty = self.adaptive.adjust(self.curve.level_for(0));
        self.player.effects.clear();
        self.combo.begin_session();
        self.stats.record_start(&mut *self.store);
        self.events.push(GameEvent::ScoreChanged { score: 0 });

        self.spawner.start(self.current_difficulty);
        log::info!(
            "Session started (level {}, adaptive x{:.2})",
            self.current_level,
            self.adaptive.multiplier()
        );
    }

    pub fn pause(&mut self) {
        if self.state == GameState::Playing {
            self.set_state(GameState::Paused);
        }
    }

    pub fn resume(&mut self) {
        if self.state == GameState::Paused {
            self.set_state(GameState::Playing);
        }
    }

    /// End the running session
    pub fn end(&mut self) {
        if self.state != GameState::Playing {
            return;
        }
        self.set_state(GameState::GameOver);

        self.spawner.stop();
        self.clear_field();
        self.combo.reset_combo(&mut self.events);

        self.adaptive
            .record_performance(self.score, self.survival_time, self.collisions);
        let new_best = self
            .stats
            .record_end(self.score, self.survival_time, &mut *self.store);
        let entry = HighScoreEntry {
            score: self.score,
            level: self.current_level,
            survival_time: self.survival_time,
            game: self.stats.games_played,
        };
        self.high_score_rank = self.high_scores.add_score(entry, &mut *self.store);

        log::info!(
            "Game over: score {}{}, survived {:.1}s, level {}, {} collisions",
            self.score,
            if new_best { " (new best)" } else { "" },
            self.survival_time,
            self.current_level,
            self.collisions
        );
        if let Some(rank) = self.high_score_rank {
            log::info!("High score #{}", rank);
        }
        self.events.push(GameEvent::GameEnded {
            final_score: self.score,
            survival_time: self.survival_time,
            high_score_rank: self.high_score_rank,
        });
    }

    // === Frame ===

    /// Advance one frame. Does nothing unless `Playing`.
    pub fn tick(&mut self, dt: f32) {
        if self.state != GameState::Playing {
            return;
        }
        let dt = clamp_dt(dt, self.config.max_dt);
        if dt == 0.0 {
            return;
        }

        self.survival_time += dt;

        for kind in self.player.effects.advance(dt) {
            log::debug!("Power-up {} expired", kind.as_str());
            self.events.push(GameEvent::PowerUpExpired { kind });
        }

        // Fractional time-score is dropped, not carried
        let time_points =
            (dt * self.current_difficulty.score_multiplier * self.points_factor()).floor() as u64;
        self.add_score(time_points);

        // Motion and contacts run in short sub-steps so a long frame cannot
        // carry an obstacle through the player
        let steps = (dt / MAX_SUBSTEP).ceil().max(1.0) as u32;
        let step = dt / steps as f32;
        for _ in 0..steps {
            if self.state != GameState::Playing {
                break;
            }
            self.step_world(step * self.time_scale());
        }
    }

    /// One motion/spawn/contact pass over `world_dt` of (scaled) world time
    fn step_world(&mut self, world_dt: f32) {
        let exited = self.spawner.tick(
            world_dt,
            &self.field,
            &mut self.obstacles,
            &mut self.power_ups,
            &mut self.events,
        );
        for _ in exited {
            self.record_dodge();
        }

        self.resolve_contacts();
    }

    // === Internals ===

    fn set_state(&mut self, new: GameState) {
        let old = self.state;
        if old == new {
            return;
        }
        self.state = new;
        log::debug!("State {:?} -> {:?}", old, new);
        self.events.push(GameEvent::StateChanged { old, new });
    }

    /// Score only moves while playing; every change re-checks the level
    fn add_score(&mut self, points: u64) {
        if points == 0 || self.state != GameState::Playing {
            return;
        }
        self.score = self.score.saturating_add(points);
        self.events.push(GameEvent::ScoreChanged { score: self.score });
        self.update_difficulty();
    }

    /// Level only ever goes up within a session
    fn update_difficulty(&mut self) {
        let level = self.curve.level_index_for(self.score);
        if level <= self.current_level {
            return;
        }
        self.current_level = level;
        self.current_difficulty = self.adaptive.adjust(self.curve.level_for(self.score));
        self.spawner.set_difficulty(self.current_difficulty);
        log::info!(
            "Difficulty level {} (interval {:.2}s, speed {:.0}, x{:.2})",
            level,
            self.current_difficulty.spawn_interval,
            self.current_difficulty.fall_speed,
            self.current_difficulty.score_multiplier
        );
        self.events.push(GameEvent::DifficultyIncreased { level });
    }

    fn record_dodge(&mut self) {
        if self.state != GameState::Playing {
            return;
        }
        let points = self
            .combo
            .record_dodge(self.survival_time, &mut *self.store, &mut self.events);
        let points = (points as f32 * self.points_factor()) as u64;
        self.add_score(points);
    }

    fn resolve_contacts(&mut self) {
        let reach = if self.player.effects.is_active(PowerUpKind::Magnet) {
            self.config.magnet_radius
        } else {
            0.0
        };
        let bodies = self
            .obstacles
            .active()
            .map(Body::from_entity)
            .chain(
                self.power_ups
                    .active()
                    .map(|e| Body::from_entity(e).inflated(reach)),
            )
            .chain(self.boundaries.iter().map(Body::from_boundary));
        let contacts = CollisionResolver::resolve(&self.player, bodies);

        for contact in contacts {
            self.events.push(GameEvent::Contact(contact));
            // Contacts after a fatal hit are reported but not applied
            if self.state != GameState::Playing {
                continue;
            }
            match contact {
                ContactEvent::PlayerObstacle { handle } => {
                    self.collisions += 1;
                    if self.player.effects.consume(PowerUpKind::Shield) {
                        log::debug!("Shield absorbed obstacle {}", handle.slot);
                        recycle(&mut self.obstacles, handle, &mut self.events);
                        self.events.push(GameEvent::ShieldAbsorbed { obstacle: handle });
                    } else {
                        self.end();
                    }
                }
                ContactEvent::PlayerPowerUp { handle, kind } => {
                    if recycle(&mut self.power_ups, handle, &mut self.events).is_some() {
                        self.power_ups_collected += 1;
                        let duration = self.config.effect_durations.for_kind(kind);
                        self.player.effects.activate(kind, duration);
                        log::debug!("Collected {} for {:.1}s", kind.as_str(), duration);
                        self.events.push(GameEvent::PowerUpCollected { kind });
                        self.add_score(self.config.power_up_score_bonus);
                    }
                }
                ContactEvent::PlayerBoundary { edge } => {
                    log::trace!("Player at {:?} edge", edge);
                }
            }
        }
    }

    /// Recycle everything in flight
    fn clear_field(&mut self) {
        for entity in self.obstacles.release_all() {
            self.events.push(GameEvent::EntityRecycled(entity));
        }
        for entity in self.power_ups.release_all() {
            self.events.push(GameEvent::EntityRecycled(entity));
        }
    }

    fn time_scale(&self) -> f32 {
        if self.player.effects.is_active(PowerUpKind::SlowMotion) {
            self.config.slow_motion_scale
        } else {
            1.0
        }
    }

    fn points_factor(&self) -> f32 {
        if self.player.effects.is_active(PowerUpKind::DoublePoints) {
            2.0
        } else {
            1.0
        }
    }
}
