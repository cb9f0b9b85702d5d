//! Game state and player types

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::category::category;
use super::rect::Rect;
use crate::consts::*;

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameState {
    /// Engine constructed, nothing started yet
    #[default]
    WaitingToStart,
    /// Active gameplay
    Playing,
    /// Frozen: ticks are ignored
    Paused,
    /// Session ended, waiting for a restart
    GameOver,
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    Shield,
    SpeedBoost,
    SlowMotion,
    Magnet,
    DoublePoints,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 5] = [
        PowerUpKind::Shield,
        PowerUpKind::SpeedBoost,
        PowerUpKind::SlowMotion,
        PowerUpKind::Magnet,
        PowerUpKind::DoublePoints,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerUpKind::Shield => "shield",
            PowerUpKind::SpeedBoost => "speed",
            PowerUpKind::SlowMotion => "slow",
            PowerUpKind::Magnet => "magnet",
            PowerUpKind::DoublePoints => "double",
        }
    }
}

/// How long each power-up lasts once collected (seconds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectDurations {
    pub shield: f32,
    pub speed_boost: f32,
    pub slow_motion: f32,
    pub magnet: f32,
    pub double_points: f32,
}

impl Default for EffectDurations {
    fn default() -> Self {
        Self {
            shield: 5.0,
            speed_boost: 3.0,
            slow_motion: 4.0,
            magnet: 6.0,
            double_points: 10.0,
        }
    }
}

impl EffectDurations {
    pub fn for_kind(&self, kind: PowerUpKind) -> f32 {
        match kind {
            PowerUpKind::Shield => self.shield,
            PowerUpKind::SpeedBoost => self.speed_boost,
            PowerUpKind::SlowMotion => self.slow_motion,
            PowerUpKind::Magnet => self.magnet,
            PowerUpKind::DoublePoints => self.double_points,
        }
    }

    pub(crate) fn all(&self) -> [f32; 5] {
        PowerUpKind::ALL.map(|kind| self.for_kind(kind))
    }
}

/// Active power-up effects with their remaining time
///
/// Countdowns only move inside `tick`, so a paused game freezes them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveEffects {
    remaining: BTreeMap<PowerUpKind, f32>,
}

impl ActiveEffects {
    /// Start (or refresh) an effect
    pub fn activate(&mut self, kind: PowerUpKind, duration: f32) {
        self.remaining.insert(kind, duration.max(0.0));
    }

    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.remaining.contains_key(&kind)
    }

    pub fn remaining(&self, kind: PowerUpKind) -> Option<f32> {
        self.remaining.get(&kind).copied()
    }

    /// Remove an effect early (shield consumed by a hit). Returns whether it was active.
    pub fn consume(&mut self, kind: PowerUpKind) -> bool {
        self.remaining.remove(&kind).is_some()
    }

    pub fn kinds(&self) -> impl Iterator<Item = PowerUpKind> + '_ {
        self.remaining.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }

    /// Advance all countdowns, returning the kinds that expired (in kind order)
    pub fn advance(&mut self, dt: f32) -> Vec<PowerUpKind> {
        let mut expired = Vec::new();
        for (kind, remaining) in self.remaining.iter_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                expired.push(*kind);
            }
        }
        for kind in &expired {
            self.remaining.remove(kind);
        }
        expired
    }

    pub fn clear(&mut self) {
        self.remaining.clear();
    }
}

/// The player-controlled entity
///
/// Position is written only by the host input adapter; the core never moves
/// the player on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub position: Vec2,
    pub size: Vec2,
    pub category: u32,
    pub effects: ActiveEffects,
}

impl Player {
    pub fn new(position: Vec2, size: Vec2) -> Self {
        Self {
            position,
            size,
            category: category::PLAYER,
            effects: ActiveEffects::default(),
        }
    }

    /// Default player placed near the bottom center of `field`
    pub fn spawn_in(field: &Rect) -> Self {
        let position = Vec2::new(field.center().x, field.min.y + PLAYER_START_Y.min(field.height() / 2.0));
        Self::new(position, Vec2::splat(PLAYER_SIZE))
    }

    pub fn move_to(&mut self, point: Vec2) {
        self.position = point;
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_center(self.position, self.size)
    }
}
