//! Configuration errors
//!
//! Only construction can fail. Once an engine exists every runtime path is
//! infallible: bad frame deltas are clamped, pool exhaustion skips a spawn,
//! and invalid transitions are ignored.

/// Rejected configuration, reported at load time
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("difficulty table is empty")]
    EmptyDifficultyTable,

    #[error("difficulty level {index}: score threshold {threshold} is not above the previous {previous}")]
    ThresholdNotIncreasing {
        index: usize,
        threshold: u64,
        previous: u64,
    },

    #[error("difficulty level {index}: spawn interval increases from {previous} to {interval}")]
    SpawnIntervalIncreasing {
        index: usize,
        interval: f32,
        previous: f32,
    },

    #[error("difficulty level {index}: fall speed decreases from {previous} to {speed}")]
    FallSpeedDecreasing {
        index: usize,
        speed: f32,
        previous: f32,
    },

    #[error("difficulty level {index}: score multiplier decreases from {previous} to {multiplier}")]
    ScoreMultiplierDecreasing {
        index: usize,
        multiplier: f32,
        previous: f32,
    },

    #[error("difficulty level {index}: {field} has invalid value {value}")]
    InvalidLevelValue {
        index: usize,
        field: &'static str,
        value: f32,
    },

    #[error("{0} pool capacity must be at least 1")]
    ZeroPoolCapacity(&'static str),

    #[error("play-field bounds must have positive width and height")]
    InvalidFieldBounds,

    #[error("invalid range for {field}: {min}..{max}")]
    InvalidRange {
        field: &'static str,
        min: f32,
        max: f32,
    },

    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
