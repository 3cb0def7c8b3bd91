//! Difficulty tunables
//!
//! One `Settings` value drives spawning and enemy stats for the current
//! level. It only changes at level transitions, and always gets harder.
//! Level 1 values can be overridden by a JSON object kept in storage.

use serde::{Deserialize, Serialize};

use crate::platform::Storage;

/// Per-level tunables (all times in milliseconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Time between enemy spawns
    pub enemy_spawn_rate: f32,
    /// Time between data node spawns
    pub data_node_spawn_rate: f32,
    /// Time between power-up spawns
    pub power_up_spawn_rate: f32,
    /// Base enemy speed (pixels per reference frame)
    pub enemy_speed: f32,
    /// Projectile speed (pixels per reference frame)
    pub projectile_speed: f32,
    /// Population cap for enemies
    pub max_enemies: usize,
    /// Data nodes required to clear the level
    pub data_nodes_for_next_level: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enemy_spawn_rate: 2000.0,
            data_node_spawn_rate: 3000.0,
            power_up_spawn_rate: 15000.0,
            enemy_speed: 2.0,
            projectile_speed: 8.0,
            max_enemies: 10,
            data_nodes_for_next_level: 10,
        }
    }
}

impl Settings {
    /// Multiplier applied to the enemy spawn interval per level
    pub const SPAWN_RATE_SCALE: f32 = 0.9;
    /// Enemy speed added per level
    pub const ENEMY_SPEED_STEP: f32 = 0.5;
    /// Enemy cap added per level
    pub const MAX_ENEMIES_STEP: usize = 2;
    /// Data node quota added per level
    pub const QUOTA_STEP: u32 = 5;

    /// Settings for the level after this one
    pub fn for_next_level(&self) -> Self {
        Self {
            enemy_spawn_rate: self.enemy_spawn_rate * Self::SPAWN_RATE_SCALE,
            enemy_speed: self.enemy_speed + Self::ENEMY_SPEED_STEP,
            max_enemies: self.max_enemies + Self::MAX_ENEMIES_STEP,
            data_nodes_for_next_level: self.data_nodes_for_next_level + Self::QUOTA_STEP,
            ..self.clone()
        }
    }

    /// Storage key for level 1 overrides
    pub const STORAGE_KEY: &'static str = "hackergame_settings";

    /// Level 1 settings, with any stored overrides applied
    pub fn load(storage: Option<&dyn Storage>) -> Self {
        match storage.and_then(|s| s.get(Self::STORAGE_KEY)) {
            Some(json) => {
                log::info!("Loading settings overrides from storage");
                Self::from_json(&json)
            }
            None => Self::default(),
        }
    }

    /// Parse settings overrides from JSON. Missing fields keep their
    /// defaults; malformed input yields the defaults.
    pub fn from_json(json: &str) -> Self {
        match serde_json::from_str(json) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring invalid settings JSON: {}", e);
                Self::default()
            }
        }
    }
}
