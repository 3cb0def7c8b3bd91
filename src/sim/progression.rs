//! Level machine: InProgress -> LevelComplete -> InProgress, or GameOver

use serde::{Deserialize, Serialize};

use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelPhase {
    InProgress,
    LevelComplete,
    /// Terminal until a full reset
    GameOver,
}

/// Data-node quota tracking for the current level
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progression {
    pub phase: LevelPhase,
    /// Data nodes collected this level
    pub collected: u32,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            phase: LevelPhase::InProgress,
            collected: 0,
        }
    }
}

impl Progression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a collected node, returning the new total
    pub fn record_collection(&mut self) -> u32 {
        self.collected += 1;
        self.collected
    }

    /// Quota check. Returns true exactly once per level, on the tick the quota
    /// is first met.
    pub fn check(&mut self, settings: &Settings) -> bool {
        if self.phase != LevelPhase::InProgress {
            return false;
        }
        if self.collected >= settings.data_nodes_for_next_level {
            self.phase = LevelPhase::LevelComplete;
            return true;
        }
        false
    }

    /// LevelComplete -> InProgress. Returns the new level number.
    pub fn advance(&mut self, level: &mut u32, settings: &mut Settings) -> u32 {
        *level += 1;
        *settings = settings.for_next_level();
        self.collected = 0;
        self.phase = LevelPhase::InProgress;
        *level
    }

    pub fn game_over(&mut self) {
        self.phase = LevelPhase::GameOver;
    }

    /// Fraction of the quota collected, for the HUD
    pub fn progress(&self, settings: &Settings) -> f32 {
        if settings.data_nodes_for_next_level == 0 {
            return 1.0;
        }
        (self.collected as f32 / settings.data_nodes_for_next_level as f32).min(1.0)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
