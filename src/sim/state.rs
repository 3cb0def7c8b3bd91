//! Game state and shared simulation types

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entities::PowerUpKind;
use super::player::AbilityKind;

/// Run flags and scores owned by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub running: bool,
    pub paused: bool,
    pub game_over: bool,
    /// Current security level (1-based)
    pub level: u32,
    pub score: u64,
    pub high_score: u64,
}

impl GameState {
    pub fn new(high_score: u64) -> Self {
        Self {
            running: false,
            paused: false,
            game_over: false,
            level: 1,
            score: 0,
            high_score,
        }
    }

    /// Whether a frame should advance the simulation
    pub fn is_live(&self) -> bool {
        self.running && !self.paused && !self.game_over
    }
}

/// Play area in pixels, origin top-left, +y down
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Inclusive containment of a point
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }

    /// Whether a point lies more than `margin` outside the play area
    pub fn is_far_outside(&self, p: Vec2, margin: f32) -> bool {
        p.x < -margin || p.x > self.width + margin || p.y < -margin || p.y > self.height + margin
    }

    /// Clamp a body center so its half extents stay inside
    pub fn clamp_center(&self, p: Vec2, half: Vec2) -> Vec2 {
        Vec2::new(
            p.x.clamp(half.x, (self.width - half.x).max(half.x)),
            p.y.clamp(half.y, (self.height - half.y).max(half.y)),
        )
    }
}

/// Triangle-wave 0..1 used for glow animations
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pulse {
    pub value: f32,
    falling: bool,
}

/// Pulse change per reference frame
const PULSE_STEP: f32 = 0.05;

impl Pulse {
    pub fn advance(&mut self, frames: f32) {
        let step = PULSE_STEP * frames;
        if self.falling {
            self.value -= step;
            if self.value <= 0.0 {
                self.value = 0.0;
                self.falling = false;
            }
        } else {
            self.value += step;
            if self.value >= 1.0 {
                self.value = 1.0;
                self.falling = true;
            }
        }
    }
}

/// Things that happened during a tick
///
/// The engine turns these into particles, sounds, terminal lines and host
/// callbacks after the tick's state changes are done.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    GameStarted,
    Shot,
    BoostEngaged,
    AbilityActivated { kind: AbilityKind, pos: Vec2 },
    PlayerDamaged { pos: Vec2 },
    PlayerDestroyed { pos: Vec2 },
    EnemyRammed { pos: Vec2 },
    ProjectileHit { pos: Vec2, killed: bool },
    DataCollected { pos: Vec2, collected: u32, required: u32 },
    PowerUpSpawned { kind: PowerUpKind },
    PowerUpCollected { kind: PowerUpKind, pos: Vec2 },
    LevelComplete { level: u32, score: u64 },
    LevelUp { level: u32 },
    GameOver { score: u64 },
}
