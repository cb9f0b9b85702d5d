//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Timers advance only inside `tick`
//! - Seeded RNG only
//! - Stable iteration order (by pool slot)
//! - No rendering, audio or platform dependencies

pub mod category;
pub mod collision;
pub mod combo;
pub mod difficulty;
pub mod events;
pub mod pool;
pub mod rect;
pub mod spawn;
pub mod state;
pub mod tick;

pub use category::{category as categories, contact_mask, should_test};
pub use collision::{Body, Boundary, BoundaryEdge, CollisionResolver, ContactEvent, boundaries_for};
pub use combo::{ComboAccumulator, ComboState};
pub use difficulty::{AdaptiveDifficulty, DifficultyCurve, DifficultyLevel, PerformanceSample};
pub use events::{EventQueue, GameEvent};
pub use pool::{Entity, EntityHandle, EntityKind, EntityPool, PoolKind};
pub use rect::Rect;
pub use spawn::{SchedulerState, SpawnScheduler, SpawnSettings};
pub use state::{ActiveEffects, EffectDurations, GameState, Player, PowerUpKind};
pub use tick::{GameStateMachine, SessionSummary};
