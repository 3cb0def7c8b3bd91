//! Hacker Breach - a top-down hacker-themed arcade game
//!
//! Core modules:
//! - `sim`: Simulation core (engine loop, entities, spawning, collisions, progression)
//! - `platform`: Host seams (input reduction, storage, collaborator traits)
//! - `renderer`: Canvas drawing of the current frame
//! - `audio`: Sound-effect catalogue and the Web Audio synth
//! - `terminal`: In-game terminal text sink with its command set
//! - `cues`: Deferred cosmetic cue playback, kept outside the simulation

pub mod audio;
pub mod cues;
pub mod error;
pub mod highscores;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod terminal;

pub use error::SetupError;
pub use highscores::HighScore;
pub use settings::Settings;

/// Game configuration constants
///
/// Speeds are pixels per reference frame; times are milliseconds.
pub mod consts {
    /// Reference frame length the per-frame speeds are tuned for
    pub const FRAME_MS: f32 = 1000.0 / 60.0;
    /// Largest delta a single update may apply (throttled background tabs)
    pub const MAX_DELTA_MS: f32 = 100.0;

    /// Largest play area, the canvas is clamped to this
    pub const MAX_CANVAS_WIDTH: f32 = 800.0;
    pub const MAX_CANVAS_HEIGHT: f32 = 600.0;

    /// Player body
    pub const PLAYER_SIZE: f32 = 32.0;
    pub const PLAYER_MAX_HEALTH: i32 = 100;
    pub const PLAYER_SPEED: f32 = 4.0;
    pub const PLAYER_BOOST_SPEED: f32 = 8.0;
    /// Per-frame fraction of the remaining turn applied to facing
    pub const PLAYER_ROTATION_SMOOTHING: f32 = 0.15;
    pub const PLAYER_INVULNERABLE_MS: f32 = 1500.0;
    pub const PLAYER_FIRE_RATE_MS: f32 = 300.0;
    pub const PLAYER_TRAIL_LENGTH: usize = 8;
    pub const PLAYER_TRAIL_INTERVAL_MS: f32 = 50.0;

    /// Abilities (active duration, cooldown)
    pub const BOOST_DURATION_MS: f32 = 1000.0;
    pub const BOOST_COOLDOWN_MS: f32 = 3000.0;
    pub const STEALTH_DURATION_MS: f32 = 3000.0;
    pub const STEALTH_COOLDOWN_MS: f32 = 8000.0;
    pub const SHIELD_DURATION_MS: f32 = 4000.0;
    pub const SHIELD_COOLDOWN_MS: f32 = 12000.0;

    /// Combat
    pub const CONTACT_DAMAGE: i32 = 20;
    pub const PROJECTILE_DAMAGE: i32 = 10;
    pub const PROJECTILE_SIZE: f32 = 8.0;
    pub const PROJECTILE_TAIL_LENGTH: usize = 5;

    /// Score awards
    pub const SCORE_DATA_NODE: u64 = 50;
    pub const SCORE_ENEMY_KILL: u64 = 100;

    /// Spawning
    pub const ENEMY_SPAWN_OFFSET: f32 = 50.0;
    pub const SPAWN_MARGIN: f32 = 50.0;
    pub const DATA_NODE_ATTEMPTS: usize = 10;
    pub const DATA_NODE_PLAYER_CLEARANCE: f32 = 150.0;
    pub const DATA_NODE_ENEMY_CLEARANCE: f32 = 100.0;
    pub const INITIAL_DATA_NODES: usize = 5;

    /// Collectibles
    pub const DATA_NODE_SIZE: f32 = 20.0;
    pub const POWER_UP_SIZE: f32 = 25.0;
    pub const POWER_UP_HOVER_AMPLITUDE: f32 = 5.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Signed turn from `from` to `to` that never goes the long way around
#[inline]
pub fn shortest_angle_delta(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}

/// Number of reference frames covered by `dt_ms`
#[inline]
pub fn frames(dt_ms: f32) -> f32 {
    dt_ms / consts::FRAME_MS
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::f32::consts::PI;

    #[test]
    fn delta_takes_short_way_across_wrap() {
        // 170° to -170° is a 20° turn, not 340°
        let from = 170f32.to_radians();
        let to = (-170f32).to_radians();
        let delta = shortest_angle_delta(from, to);
        assert!((delta - 20f32.to_radians()).abs() < 1e-4);
    }

    #[test]
    fn frames_scale_with_reference() {
        assert!((frames(consts::FRAME_MS) - 1.0).abs() < 1e-6);
        assert_eq!(frames(0.0), 0.0);
    }

    proptest! {
        #[test]
        fn normalized_angle_in_range(angle in -100.0f32..100.0) {
            let n = normalize_angle(angle);
            prop_assert!((-PI..PI).contains(&n));
        }

        #[test]
        fn shortest_delta_is_at_most_half_turn(a in -10.0f32..10.0, b in -10.0f32..10.0) {
            prop_assert!(shortest_angle_delta(a, b).abs() <= PI + 1e-4);
        }
    }
}
