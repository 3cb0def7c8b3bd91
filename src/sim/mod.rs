//! Simulation module
//!
//! All gameplay logic lives here. Randomness comes from a seeded RNG owned by
//! the engine, time only from the deltas the host passes in, and nothing in
//! this module touches rendering or the browser.

pub mod collision;
pub mod engine;
pub mod entities;
pub mod player;
pub mod progression;
pub mod spawn;
pub mod state;

pub use collision::{Aabb, Bounded, check_collision};
pub use engine::{EngineConfig, FrameStep, GameEngine};
pub use entities::{
    DataNode, Enemy, EnemyKind, Owner, Particle, ParticleBurst, PowerUp, PowerUpKind, Projectile,
};
pub use player::{Ability, AbilityKind, AbilityPhase, DamageOutcome, Player};
pub use progression::{LevelPhase, Progression};
pub use state::{Arena, GameEvent, GameState, Pulse};
