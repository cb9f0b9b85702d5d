//! Difficulty curve and adaptive difficulty
//!
//! Two independent layers:
//! - [`DifficultyCurve`]: in-session pacing, looked up from the score
//! - [`AdaptiveDifficulty`]: cross-session multiplier derived from recent results
//!
//! The engine asks the curve for the base level and lets the adaptive layer
//! perturb it before handing it to the spawner.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// One row of the difficulty table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyLevel {
    /// Score at which this level starts
    pub score_threshold: u64,
    /// Seconds between obstacle waves
    pub spawn_interval: f32,
    /// Obstacle fall speed (units/sec)
    pub fall_speed: f32,
    /// Time-score multiplier (>= 1)
    pub score_multiplier: f32,
    /// Obstacles per wave (>= 1)
    pub obstacle_count: u32,
}

impl DifficultyLevel {
    pub const fn new(
        score_threshold: u64,
        spawn_interval: f32,
        fall_speed: f32,
        score_multiplier: f32,
        obstacle_count: u32,
    ) -> Self {
        Self {
            score_threshold,
            spawn_interval,
            fall_speed,
            score_multiplier,
            obstacle_count,
        }
    }
}

/// Default pacing table
pub const DEFAULT_LEVELS: [DifficultyLevel; 6] = [
    DifficultyLevel::new(0, 1.2, 200.0, 1.0, 1),
    DifficultyLevel::new(10, 1.0, 250.0, 1.2, 2),
    DifficultyLevel::new(25, 0.8, 300.0, 1.5, 3),
    DifficultyLevel::new(50, 0.6, 350.0, 2.0, 4),
    DifficultyLevel::new(100, 0.5, 400.0, 2.5, 5),
    DifficultyLevel::new(200, 0.4, 450.0, 3.0, 6),
];

/// Validated, immutable difficulty table
#[derive(Debug, Clone)]
pub struct DifficultyCurve {
    levels: Vec<DifficultyLevel>,
}

impl Default for DifficultyCurve {
    fn default() -> Self {
        Self {
            levels: DEFAULT_LEVELS.to_vec(),
        }
    }
}

impl DifficultyCurve {
    /// Build a curve, rejecting tables that break the ordering rules
    pub fn new(levels: Vec<DifficultyLevel>) -> Result<Self, ConfigError> {
        Self::validate(&levels)?;
        Ok(Self { levels })
    }

    /// Check a table without building a curve
    pub fn validate(levels: &[DifficultyLevel]) -> Result<(), ConfigError> {
        if levels.is_empty() {
            return Err(ConfigError::EmptyDifficultyTable);
        }

        for (index, level) in levels.iter().enumerate() {
            if !(level.spawn_interval.is_finite() && level.spawn_interval > 0.0) {
                return Err(ConfigError::InvalidLevelValue {
                    index,
                    field: "spawn_interval",
                    value: level.spawn_interval,
                });
            }
            if !(level.fall_speed.is_finite() && level.fall_speed > 0.0) {
                return Err(ConfigError::InvalidLevelValue {
                    index,
                    field: "fall_speed",
                    value: level.fall_speed,
                });
            }
            if !(level.score_multiplier.is_finite() && level.score_multiplier >= 1.0) {
                return Err(ConfigError::InvalidLevelValue {
                    index,
                    field: "score_multiplier",
                    value: level.score_multiplier,
                });
            }
            if level.obstacle_count < 1 {
                return Err(ConfigError::InvalidLevelValue {
                    index,
                    field: "obstacle_count",
                    value: level.obstacle_count as f32,
                });
            }
        }

        for (offset, pair) in levels.windows(2).enumerate() {
            let (prev, next) = (&pair[0], &pair[1]);
            let index = offset + 1;
            if next.score_threshold <= prev.score_threshold {
                return Err(ConfigError::ThresholdNotIncreasing {
                    index,
                    threshold: next.score_threshold,
                    previous: prev.score_threshold,
                });
            }
            if next.spawn_interval > prev.spawn_interval {
                return Err(ConfigError::SpawnIntervalIncreasing {
                    index,
                    interval: next.spawn_interval,
                    previous: prev.spawn_interval,
                });
            }
            if next.fall_speed < prev.fall_speed {
                return Err(ConfigError::FallSpeedDecreasing {
                    index,
                    speed: next.fall_speed,
                    previous: prev.fall_speed,
                });
            }
            if next.score_multiplier < prev.score_multiplier {
                return Err(ConfigError::ScoreMultiplierDecreasing {
                    index,
                    multiplier: next.score_multiplier,
                    previous: prev.score_multiplier,
                });
            }
        }

        Ok(())
    }

    pub fn levels(&self) -> &[DifficultyLevel] {
        &self.levels
    }

    /// Zero-based position of the last level whose threshold is <= score
    fn position_for(&self, score: u64) -> usize {
        // Thresholds are strictly increasing, so this is the partition point
        self.levels
            .partition_point(|level| level.score_threshold <= score)
            .saturating_sub(1)
    }

    /// Level in effect at `score` (first level below the first threshold)
    pub fn level_for(&self, score: u64) -> DifficultyLevel {
        self.levels[self.position_for(score)]
    }

    /// 1-based level number at `score`, for HUD and achievements
    pub fn level_index_for(&self, score: u64) -> u32 {
        self.position_for(score) as u32 + 1
    }
}

/// Outcome of one finished session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSample {
    pub score: u64,
    pub survival_time: f32,
    pub collisions: u32,
    /// Cumulative play time (seconds) when the session ended
    pub timestamp: f64,
}

/// Cross-session difficulty multiplier
///
/// Looks at the three most recent sessions out of the last ten. Strong play
/// nudges the multiplier up by 10%, short sessions nudge it down by 10%, and
/// the result always stays inside `[0.7, 1.5]`.
#[derive(Debug, Clone)]
pub struct AdaptiveDifficulty {
    samples: VecDeque<PerformanceSample>,
    multiplier: f32,
    play_clock: f64,
}

impl Default for AdaptiveDifficulty {
    fn default() -> Self {
        Self::new()
    }
}

impl AdaptiveDifficulty {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(ADAPTIVE_HISTORY + 1),
            multiplier: 1.0,
            play_clock: 0.0,
        }
    }

    pub fn multiplier(&self) -> f32 {
        self.multiplier
    }

    pub fn samples(&self) -> impl Iterator<Item = &PerformanceSample> {
        self.samples.iter()
    }

    /// Record a finished session and recompute the multiplier
    pub fn record_performance(&mut self, score: u64, survival_time: f32, collisions: u32) {
        let survival_time = if survival_time.is_finite() {
            survival_time.max(0.0)
        } else {
            0.0
        };
        self.play_clock += survival_time as f64;

        self.samples.push_back(PerformanceSample {
            score,
            survival_time,
            collisions,
            timestamp: self.play_clock,
        });
        while self.samples.len() > ADAPTIVE_HISTORY {
            self.samples.pop_front();
        }

        self.update_multiplier();
    }

    fn update_multiplier(&mut self) {
        if self.samples.len() < ADAPTIVE_WINDOW {
            return;
        }

        let recent = self.samples.iter().rev().take(ADAPTIVE_WINDOW);
        let (total_survival, total_score) = recent.fold((0.0f32, 0u64), |(time, score), s| {
            (time + s.survival_time, score.saturating_add(s.score))
        });
        let avg_survival = total_survival / ADAPTIVE_WINDOW as f32;
        // Integer average: a run of 100, 100, 102 does not count as > 100
        let avg_score = total_score / ADAPTIVE_WINDOW as u64;

        let previous = self.multiplier;
        if avg_survival > 60.0 && avg_score > 100 {
            self.multiplier = (self.multiplier * 1.1).min(ADAPTIVE_MAX_MULTIPLIER);
        } else if avg_survival < 20.0 {
            self.multiplier = (self.multiplier * 0.9).max(ADAPTIVE_MIN_MULTIPLIER);
        }
        self.multiplier = self
            .multiplier
            .clamp(ADAPTIVE_MIN_MULTIPLIER, ADAPTIVE_MAX_MULTIPLIER);

        if self.multiplier != previous {
            log::info!(
                "Adaptive difficulty {:.3} -> {:.3} (avg survival {:.1}s, avg score {})",
                previous,
                self.multiplier,
                avg_survival,
                avg_score
            );
        }
    }

    /// Scale a base level by the current multiplier (obstacle count is left alone)
    pub fn adjust(&self, base: DifficultyLevel) -> DifficultyLevel {
        DifficultyLevel {
            score_threshold: base.score_threshold,
            spawn_interval: base.spawn_interval / self.multiplier,
            fall_speed: base.fall_speed * self.multiplier,
            score_multiplier: base.score_multiplier * self.multiplier,
            obstacle_count: base.obstacle_count,
        }
    }
}
