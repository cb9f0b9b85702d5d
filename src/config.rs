//! Engine configuration
//!
//! Data-driven game balance. Every field has a default, so a JSON file only
//! needs the values it wants to change. Validation runs at load time and in
//! the engine constructor; a config that passes never causes a runtime error.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::difficulty::{DEFAULT_LEVELS, DifficultyCurve, DifficultyLevel};
use crate::sim::rect::Rect;
use crate::sim::spawn::SpawnSettings;
use crate::sim::state::EffectDurations;

/// Everything needed to build a [`crate::sim::GameStateMachine`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // === Field ===
    /// Play-field bounds (scene size), y-up
    pub field: Rect,
    /// Player square side
    pub player_size: f32,

    // === Pools ===
    pub obstacle_pool_size: usize,
    pub power_up_pool_size: usize,

    // === Spawning ===
    pub spawn: SpawnSettings,
    /// Seed for spawn positions, sizes and power-up kinds
    pub seed: u64,

    // === Power-ups ===
    /// Flat bonus for a pickup
    pub power_up_score_bonus: u64,
    pub effect_durations: EffectDurations,
    /// World time scale while slow motion runs (0 < scale <= 1)
    pub slow_motion_scale: f32,
    /// Extra pickup reach while the magnet runs
    pub magnet_radius: f32,

    // === Timing ===
    /// Frame deltas above this are clamped
    pub max_dt: f32,

    // === Difficulty ===
    /// Ordered pacing table
    pub difficulty: Vec<DifficultyLevel>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            field: Rect::new(0.0, 0.0, FIELD_WIDTH, FIELD_HEIGHT),
            player_size: PLAYER_SIZE,

            obstacle_pool_size: OBSTACLE_POOL_SIZE,
            power_up_pool_size: POWER_UP_POOL_SIZE,

            spawn: SpawnSettings::default(),
            seed: 0x5EED,

            power_up_score_bonus: POWER_UP_SCORE_BONUS,
            effect_durations: EffectDurations::default(),
            slow_motion_scale: 0.5,
            magnet_radius: 60.0,

            max_dt: MAX_DT,

            difficulty: DEFAULT_LEVELS.to_vec(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        log::info!(
            "Loaded config: {} difficulty levels, pools {}/{}",
            config.difficulty.len(),
            config.obstacle_pool_size,
            config.power_up_pool_size
        );
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Replace the difficulty table (builder style)
    pub fn with_difficulty(mut self, levels: Vec<DifficultyLevel>) -> Self {
        self.difficulty = levels;
        self
    }

    /// Replace the field bounds (builder style)
    pub fn with_field(mut self, field: Rect) -> Self {
        self.field = field;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Reject configs the engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.field.is_valid() {
            return Err(ConfigError::InvalidFieldBounds);
        }
        positive("player_size", self.player_size)?;

        if self.obstacle_pool_size == 0 {
            return Err(ConfigError::ZeroPoolCapacity("obstacle"));
        }
        if self.power_up_pool_size == 0 {
            return Err(ConfigError::ZeroPoolCapacity("power-up"));
        }

        let spawn = &self.spawn;
        positive("spawn.obstacle_min_size", spawn.obstacle_min_size)?;
        range(
            "spawn.obstacle_size",
            spawn.obstacle_min_size,
            spawn.obstacle_max_size,
        )?;
        positive("spawn.power_up_size", spawn.power_up_size)?;
        positive("spawn.power_up_fall_speed", spawn.power_up_fall_speed)?;
        positive("spawn.power_up_min_interval", spawn.power_up_min_interval)?;
        range(
            "spawn.power_up_interval",
            spawn.power_up_min_interval,
            spawn.power_up_max_interval,
        )?;

        for duration in self.effect_durations.all() {
            positive("effect_durations", duration)?;
        }
        if !(self.slow_motion_scale > 0.0 && self.slow_motion_scale <= 1.0) {
            return Err(ConfigError::InvalidRange {
                field: "slow_motion_scale",
                min: self.slow_motion_scale,
                max: 1.0,
            });
        }
        if !(self.magnet_radius.is_finite() && self.magnet_radius >= 0.0) {
            return Err(ConfigError::NotPositive {
                field: "magnet_radius",
                value: self.magnet_radius,
            });
        }
        positive("max_dt", self.max_dt)?;

        DifficultyCurve::validate(&self.difficulty)
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn range(field: &'static str, min: f32, max: f32) -> Result<(), ConfigError> {
    if min.is_finite() && max.is_finite() && min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvalidRange { field, min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.difficulty.len(), 6);
        assert_eq!(config.obstacle_pool_size, 20);
        assert_eq!(config.power_up_pool_size, 10);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{
            "seed": 7,
            "difficulty": [
                {"score_threshold": 0, "spawn_interval": 1.2, "fall_speed": 200.0, "score_multiplier": 1.0, "obstacle_count": 1},
                {"score_threshold": 10, "spawn_interval": 1.0, "fall_speed": 250.0, "score_multiplier": 1.2, "obstacle_count": 2}
            ]
        }"#;
        let config = EngineConfig::from_json(json).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.difficulty.len(), 2);
        assert_eq!(config.power_up_score_bonus, POWER_UP_SCORE_BONUS);
        assert!((config.effect_durations.double_points - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_malformed_table_fails_at_load() {
        let json = r#"{
            "difficulty": [
                {"score_threshold": 10, "spawn_interval": 1.0, "fall_speed": 200.0, "score_multiplier": 1.0, "obstacle_count": 1},
                {"score_threshold": 5, "spawn_interval": 0.8, "fall_speed": 250.0, "score_multiplier": 1.2, "obstacle_count": 2}
            ]
        }"#;
        assert!(matches!(
            EngineConfig::from_json(json),
            Err(ConfigError::ThresholdNotIncreasing { .. })
        ));
    }

    #[test]
    fn test_bad_json_is_a_parse_error() {
        assert!(matches!(
            EngineConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = EngineConfig::default();
        config.obstacle_pool_size = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroPoolCapacity("obstacle"))
        ));

        let config = EngineConfig::default().with_field(Rect::new(0.0, 0.0, 0.0, 100.0));
        assert!(matches!(config.validate(), Err(ConfigError::InvalidFieldBounds)));

        let mut config = EngineConfig::default();
        config.spawn.power_up_min_interval = 20.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange { .. })
        ));

        let mut config = EngineConfig::default();
        config.max_dt = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive { field: "max_dt", .. })
        ));
    }

    #[test]
    fn test_json_roundtrip() {
        let config = EngineConfig::default().with_seed(99);
        let json = config.to_json().unwrap();
        let back = EngineConfig::from_json(&json).unwrap();
        assert_eq!(back, config);
    }
}
