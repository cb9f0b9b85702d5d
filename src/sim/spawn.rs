//! Obstacle and power-up spawning
//!
//! Timers are plain accumulators advanced by `tick`, so nothing fires while
//! the engine is paused and nothing can fire after `stop` returns.
//! The scheduler reads the current difficulty lazily: a new spawn interval
//! or fall speed applies from the next wave, and entities already falling
//! keep the speed they were spawned with.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::difficulty::DifficultyLevel;
use super::events::{EventQueue, GameEvent};
use super::pool::{Entity, EntityHandle, EntityKind, EntityPool};
use super::rect::Rect;
use super::state::PowerUpKind;
use crate::consts::*;

/// Upper bound on obstacle waves fired inside one tick
const MAX_WAVES_PER_TICK: u32 = 8;

/// Whether the scheduler is producing new entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulerState {
    Idle,
    Active,
}

/// Spawn shapes and the power-up cadence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnSettings {
    pub obstacle_min_size: f32,
    pub obstacle_max_size: f32,
    pub power_up_size: f32,
    pub power_up_fall_speed: f32,
    pub power_up_min_interval: f32,
    pub power_up_max_interval: f32,
}

impl Default for SpawnSettings {
    fn default() -> Self {
        Self {
            obstacle_min_size: OBSTACLE_MIN_SIZE,
            obstacle_max_size: OBSTACLE_MAX_SIZE,
            power_up_size: POWER_UP_SIZE,
            power_up_fall_speed: POWER_UP_FALL_SPEED,
            power_up_min_interval: POWER_UP_MIN_INTERVAL,
            power_up_max_interval: POWER_UP_MAX_INTERVAL,
        }
    }
}

/// Return a slot to its pool and announce it
pub fn recycle(pool: &mut EntityPool, handle: EntityHandle, events: &mut EventQueue) -> Option<Entity> {
    let entity = pool.release(handle)?;
    events.push(GameEvent::EntityRecycled(entity));
    Some(entity)
}

/// Time-driven spawner
#[derive(Debug, Clone)]
pub struct SpawnScheduler {
    state: SchedulerState,
    settings: SpawnSettings,
    rng: Pcg32,
    difficulty: DifficultyLevel,
    /// Seconds accumulated toward the next obstacle wave
    obstacle_timer: f32,
    /// Seconds accumulated toward the next power-up
    power_up_timer: f32,
    /// Randomized delay for the pending power-up
    power_up_due: f32,
}

impl SpawnScheduler {
    pub fn new(settings: SpawnSettings, difficulty: DifficultyLevel, seed: u64) -> Self {
        Self {
            state: SchedulerState::Idle,
            settings,
            rng: Pcg32::seed_from_u64(seed),
            difficulty,
            obstacle_timer: 0.0,
            power_up_timer: 0.0,
            power_up_due: settings.power_up_max_interval,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn difficulty(&self) -> &DifficultyLevel {
        &self.difficulty
    }

    /// Seconds until the pending power-up is due
    pub fn power_up_due_in(&self) -> f32 {
        (self.power_up_due - self.power_up_timer).max(0.0)
    }

    /// Begin spawning with `difficulty`. Timers start from zero, so the
    /// first wave comes one full interval later.
    pub fn start(&mut self, difficulty: DifficultyLevel) {
        self.state = SchedulerState::Active;
        self.difficulty = difficulty;
        self.obstacle_timer = 0.0;
        self.power_up_timer = 0.0;
        self.power_up_due = self.roll_power_up_delay();
        log::debug!(
            "Spawner active: interval {:.2}s, speed {:.0}, count {}, first power-up in {:.1}s",
            difficulty.spawn_interval,
            difficulty.fall_speed,
            difficulty.obstacle_count,
            self.power_up_due
        );
    }

    /// Stop spawning. Entities already in the field keep falling.
    pub fn stop(&mut self) {
        self.state = SchedulerState::Idle;
        self.obstacle_timer = 0.0;
        self.power_up_timer = 0.0;
    }

    /// Swap in new parameters; they apply from the next wave
    pub fn set_difficulty(&mut self, difficulty: DifficultyLevel) {
        self.difficulty = difficulty;
    }

    /// Advance timers and entity motion by `dt` (already clamped and scaled).
    ///
    /// Returns the obstacles that fell out of the field this tick, which the
    /// engine treats as dodges.
    pub fn tick(
        &mut self,
        dt: f32,
        field: &Rect,
        obstacles: &mut EntityPool,
        power_ups: &mut EntityPool,
        events: &mut EventQueue,
    ) -> Vec<Entity> {
        let exited = Self::advance(dt, field, obstacles, events);
        Self::advance(dt, field, power_ups, events);

        if self.state == SchedulerState::Active {
            self.obstacle_timer += dt;
            let interval = self.difficulty.spawn_interval;
            let mut waves = 0;
            while self.obstacle_timer >= interval {
                self.obstacle_timer -= interval;
                waves += 1;
                if waves > MAX_WAVES_PER_TICK {
                    // Drop the backlog instead of flooding the field
                    self.obstacle_timer = 0.0;
                    break;
                }
                self.spawn_wave(field, obstacles, events);
            }

            self.power_up_timer += dt;
            if self.power_up_timer >= self.power_up_due {
                self.power_up_timer = 0.0;
                self.power_up_due = self.roll_power_up_delay();
                self.spawn_power_up(field, power_ups, events);
            }
        }

        exited
    }

    /// Move every active entity and recycle the ones below the field
    fn advance(dt: f32, field: &Rect, pool: &mut EntityPool, events: &mut EventQueue) -> Vec<Entity> {
        let mut gone = Vec::new();
        for entity in pool.active_mut() {
            entity.position += entity.velocity * dt;
            if entity.position.y < field.min.y {
                gone.push(entity.handle);
            }
        }
        gone.into_iter()
            .filter_map(|handle| recycle(pool, handle, events))
            .collect()
    }

    /// Spawn up to `obstacle_count` obstacles along the top edge
    fn spawn_wave(&mut self, field: &Rect, obstacles: &mut EntityPool, events: &mut EventQueue) {
        let speed = self.difficulty.fall_speed;
        for _ in 0..self.difficulty.obstacle_count {
            let Some(handle) = obstacles.acquire() else {
                log::debug!("Obstacle pool exhausted, skipping spawn");
                return;
            };
            let side = self
                .rng
                .random_range(self.settings.obstacle_min_size..=self.settings.obstacle_max_size);
            let position = self.entry_point(field, side);
            if let Some(entity) = obstacles.get_mut(handle) {
                entity.kind = EntityKind::Obstacle;
                entity.size = Vec2::splat(side);
                entity.position = position;
                entity.velocity = Vec2::new(0.0, -speed);
                events.push(GameEvent::EntitySpawned(*entity));
            }
        }
    }

    fn spawn_power_up(&mut self, field: &Rect, power_ups: &mut EntityPool, events: &mut EventQueue) {
        let Some(handle) = power_ups.acquire() else {
            log::debug!("Power-up pool exhausted, skipping spawn");
            return;
        };
        let kind = PowerUpKind::ALL[self.rng.random_range(0..PowerUpKind::ALL.len())];
        let side = self.settings.power_up_size;
        let position = self.entry_point(field, side);
        let speed = self.settings.power_up_fall_speed;
        if let Some(entity) = power_ups.get_mut(handle) {
            entity.kind = EntityKind::PowerUp(kind);
            entity.size = Vec2::splat(side);
            entity.position = position;
            entity.velocity = Vec2::new(0.0, -speed);
            events.push(GameEvent::EntitySpawned(*entity));
        }
    }

    /// Random x inside the field, just above the top edge
    fn entry_point(&mut self, field: &Rect, side: f32) -> Vec2 {
        let lo = field.min.x + side / 2.0;
        let hi = field.max.x - side / 2.0;
        let x = if lo < hi {
            self.rng.random_range(lo..=hi)
        } else {
            field.center().x
        };
        Vec2::new(x, field.max.y + side / 2.0)
    }

    fn roll_power_up_delay(&mut self) -> f32 {
        let (lo, hi) = (
            self.settings.power_up_min_interval,
            self.settings.power_up_max_interval,
        );
        if lo < hi {
            self.rng.random_range(lo..=hi)
        } else {
            lo
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::pool::PoolKind;

    fn level(interval: f32, speed: f32, count: u32) -> DifficultyLevel {
        DifficultyLevel::new(0, interval, speed, 1.0, count)
    }

    struct World {
        field: Rect,
        obstacles: EntityPool,
        power_ups: EntityPool,
        events: EventQueue,
    }

    impl World {
        fn new(obstacle_capacity: usize) -> Self {
            Self {
                field: Rect::new(0.0, 0.0, 400.0, 800.0),
                obstacles: EntityPool::new(PoolKind::Obstacle, obstacle_capacity),
                power_ups: EntityPool::new(PoolKind::PowerUp, POWER_UP_POOL_SIZE),
                events: EventQueue::new(),
            }
        }

        fn tick(&mut self, spawner: &mut SpawnScheduler, dt: f32) -> Vec<Entity> {
            spawner.tick(
                dt,
                &self.field,
                &mut self.obstacles,
                &mut self.power_ups,
                &mut self.events,
            )
        }

        fn spawned(&mut self) -> usize {
            self.events
                .drain()
                .filter(|e| matches!(e, GameEvent::EntitySpawned(_)))
                .count()
        }
    }

    #[test]
    fn test_idle_scheduler_spawns_nothing() {
        let mut world = World::new(20);
        let mut spawner = SpawnScheduler::new(SpawnSettings::default(), level(1.0, 200.0, 2), 7);
        for _ in 0..100 {
            world.tick(&mut spawner, 0.5);
        }
        assert_eq!(world.obstacles.active_count(), 0);
        assert_eq!(spawner.state(), SchedulerState::Idle);
    }

    #[test]
    fn test_waves_fire_on_interval_with_count() {
        let mut world = World::new(20);
        let mut spawner = SpawnScheduler::new(SpawnSettings::default(), level(1.0, 200.0, 3), 7);
        spawner.start(level(1.0, 200.0, 3));

        world.tick(&mut spawner, 0.5);
        assert_eq!(world.obstacles.active_count(), 0);
        world.tick(&mut spawner, 0.5);
        assert_eq!(world.obstacles.active_count(), 3);

        for entity in world.obstacles.active() {
            assert!(entity.position.x >= 0.0 && entity.position.x <= 400.0);
            assert!(entity.position.y > 800.0);
            assert_eq!(entity.velocity, Vec2::new(0.0, -200.0));
            assert!(entity.size.x >= OBSTACLE_MIN_SIZE && entity.size.x <= OBSTACLE_MAX_SIZE);
        }
    }

    #[test]
    fn test_pool_exhaustion_skips_spawns() {
        let mut world = World::new(2);
        let mut spawner = SpawnScheduler::new(SpawnSettings::default(), level(0.1, 10.0, 5), 1);
        spawner.start(level(0.1, 10.0, 5));
        world.tick(&mut spawner, 0.1);
        assert_eq!(world.obstacles.active_count(), 2);
        world.tick(&mut spawner, 0.1);
        assert_eq!(world.obstacles.active_count(), 2);
        assert_eq!(world.spawned(), 2);
    }

    #[test]
    fn test_entities_exit_and_return_to_pool() {
        let mut world = World::new(20);
        let mut spawner = SpawnScheduler::new(SpawnSettings::default(), level(1.0, 400.0, 1), 3);
        spawner.start(level(1.0, 400.0, 1));
        world.tick(&mut spawner, 1.0);
        assert_eq!(world.obstacles.active_count(), 1);
        spawner.stop();

        let mut exited = Vec::new();
        for _ in 0..4 {
            exited.extend(world.tick(&mut spawner, 1.0));
        }
        assert_eq!(exited.len(), 1);
        assert_eq!(world.obstacles.active_count(), 0);
        assert!(
            world
                .events
                .iter()
                .any(|e| matches!(e, GameEvent::EntityRecycled(_)))
        );
    }

    #[test]
    fn test_stop_keeps_in_flight_entities_moving() {
        let mut world = World::new(20);
        let mut spawner = SpawnScheduler::new(SpawnSettings::default(), level(1.0, 100.0, 1), 3);
        spawner.start(level(1.0, 100.0, 1));
        world.tick(&mut spawner, 1.0);
        spawner.stop();

        let before = world.obstacles.active().next().unwrap().position.y;
        world.tick(&mut spawner, 1.0);
        let after = world.obstacles.active().next().unwrap().position.y;
        assert!((before - after - 100.0).abs() < 0.001);
        assert_eq!(world.obstacles.active_count(), 1);
    }

    #[test]
    fn test_new_difficulty_applies_to_next_wave_only() {
        let mut world = World::new(20);
        let mut spawner = SpawnScheduler::new(SpawnSettings::default(), level(1.0, 100.0, 1), 3);
        spawner.start(level(1.0, 100.0, 1));
        world.tick(&mut spawner, 1.0);

        spawner.set_difficulty(level(0.5, 300.0, 1));
        world.tick(&mut spawner, 0.5);

        let speeds: Vec<f32> = world.obstacles.active().map(|e| -e.velocity.y).collect();
        assert_eq!(speeds, vec![100.0, 300.0]);
    }

    #[test]
    fn test_power_up_arrives_within_interval_range() {
        let mut world = World::new(20);
        let mut spawner = SpawnScheduler::new(SpawnSettings::default(), level(100.0, 100.0, 1), 11);
        spawner.start(level(100.0, 100.0, 1));
        let due = spawner.power_up_due_in();
        assert!((POWER_UP_MIN_INTERVAL..=POWER_UP_MAX_INTERVAL).contains(&due));

        let mut elapsed = 0.0;
        while world.power_ups.active_count() == 0 && elapsed < 20.0 {
            world.tick(&mut spawner, 0.25);
            elapsed += 0.25;
        }
        assert_eq!(world.power_ups.active_count(), 1);
        assert!(elapsed >= POWER_UP_MIN_INTERVAL && elapsed <= POWER_UP_MAX_INTERVAL + 0.25);
        let entity = world.power_ups.active().next().unwrap();
        assert!(matches!(entity.kind, EntityKind::PowerUp(_)));
    }

    #[test]
    fn test_same_seed_same_spawns() {
        let run = |seed| {
            let mut world = World::new(20);
            let mut spawner = SpawnScheduler::new(SpawnSettings::default(), level(0.5, 200.0, 2), seed);
            spawner.start(level(0.5, 200.0, 2));
            for _ in 0..6 {
                world.tick(&mut spawner, 0.5);
            }
            world
                .obstacles
                .active()
                .map(|e| (e.position.x, e.size.x))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(42), run(42));
    }
}
