//! Non-player entities: enemies, collectibles, projectiles, particles
//!
//! Every entity carries an `active` flag. Clearing it marks the entity for
//! removal; the engine drops it from its collection in the same update pass.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::f32::consts::{PI, TAU};

use super::state::{Arena, Pulse};
use crate::consts::*;
use crate::frames;

/// Chance per reference frame that a wandering enemy turns
const WANDER_TURN_CHANCE: f64 = 0.01;
/// How far outside the arena a wanderer may drift before it is dropped
const WANDER_DESPAWN_MARGIN: f32 = ENEMY_SPAWN_OFFSET * 2.0;
/// Per-frame velocity retention for particles
const PARTICLE_DRAG: f32 = 0.98;

/// Hex RGB colours shared with the renderer
pub mod palette {
    pub const GREEN: u32 = 0x00ff41;
    pub const RED: u32 = 0xff3333;
    pub const ORANGE: u32 = 0xff9900;
    pub const YELLOW: u32 = 0xffff00;
    pub const CYAN: u32 = 0x00ffff;
    pub const MAGENTA: u32 = 0xff00ff;
    pub const WHITE: u32 = 0xffffff;
}

// ============================================================================
// Enemies
// ============================================================================

/// Enemy variants; each fixes its stats at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Hexagon, average in every way
    Basic,
    /// Triangle, quick and fragile
    Fast,
    /// Octagon, slow and tough
    Heavy,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 3] = [EnemyKind::Basic, EnemyKind::Fast, EnemyKind::Heavy];

    /// Multiplier on the level's base enemy speed
    pub fn speed_factor(self) -> f32 {
        match self {
            EnemyKind::Basic => 1.0,
            EnemyKind::Fast => 1.5,
            EnemyKind::Heavy => 0.7,
        }
    }

    pub fn health(self) -> i32 {
        match self {
            EnemyKind::Basic => 2,
            EnemyKind::Fast => 1,
            EnemyKind::Heavy => 3,
        }
    }

    /// Rated hit strength. Contact with the player always deals
    /// [`CONTACT_DAMAGE`]; the renderer thickens the hull outline with it.
    pub fn damage(self) -> i32 {
        match self {
            EnemyKind::Basic => 15,
            EnemyKind::Fast => 10,
            EnemyKind::Heavy => 25,
        }
    }

    pub fn size(self) -> f32 {
        match self {
            EnemyKind::Heavy => 40.0,
            EnemyKind::Basic | EnemyKind::Fast => 30.0,
        }
    }

    pub fn color(self) -> u32 {
        match self {
            EnemyKind::Basic => palette::RED,
            EnemyKind::Fast => palette::MAGENTA,
            EnemyKind::Heavy => palette::ORANGE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EnemyKind::Basic => "basic",
            EnemyKind::Fast => "fast",
            EnemyKind::Heavy => "heavy",
        }
    }
}

/// A security program hunting the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub size: Vec2,
    /// Pixels per reference frame
    pub speed: f32,
    pub health: i32,
    pub damage: i32,
    /// Travel direction (radians, 0 = +x)
    pub heading: f32,
    /// Cosmetic body spin
    pub spin: f32,
    spin_speed: f32,
    pub pulse: Pulse,
    /// Set while the enemy has no target to chase
    pub wandering: bool,
    pub active: bool,
}

impl Enemy {
    pub fn new(kind: EnemyKind, pos: Vec2, base_speed: f32, rng: &mut Pcg32) -> Self {
        Self {
            kind,
            pos,
            size: Vec2::splat(kind.size()),
            speed: base_speed * kind.speed_factor(),
            health: kind.health(),
            damage: kind.damage(),
            heading: rng.random::<f32>() * TAU,
            spin: 0.0,
            spin_speed: (rng.random::<f32>() - 0.5) * 0.1,
            pulse: Pulse::default(),
            wandering: false,
            active: true,
        }
    }

    /// Advance one tick. `target` is the position to chase, `None` when the
    /// player is absent or hidden by stealth.
    pub fn update(&mut self, dt: f32, target: Option<Vec2>, arena: &Arena, rng: &mut Pcg32) {
        if !self.active {
            return;
        }
        let f = frames(dt);

        match target {
            Some(target) => {
                self.wandering = false;
                let to_target = target - self.pos;
                if to_target.length_squared() > 0.0 {
                    self.heading = to_target.y.atan2(to_target.x);
                    self.pos += to_target.normalize() * self.speed * f;
                }
            }
            None => {
                self.wandering = true;
                self.wander(f, arena, rng);
            }
        }

        self.pulse.advance(f);
        self.spin = (self.spin + self.spin_speed * f) % TAU;
    }

    fn wander(&mut self, f: f32, arena: &Arena, rng: &mut Pcg32) {
        let turn_chance = (WANDER_TURN_CHANCE * f as f64).min(1.0);
        if rng.random_bool(turn_chance) {
            self.heading += (rng.random::<f32>() - 0.5) * PI;
        }

        let dir = Vec2::from_angle(self.heading);
        self.pos += dir * self.speed * f;

        // Reflect only a heading that points further out, otherwise an enemy
        // sitting on the edge would flip every frame
        if (self.pos.x < 0.0 && dir.x < 0.0) || (self.pos.x > arena.width && dir.x > 0.0) {
            self.heading = PI - self.heading;
        }
        if (self.pos.y < 0.0 && dir.y < 0.0) || (self.pos.y > arena.height && dir.y > 0.0) {
            self.heading = -self.heading;
        }

        if arena.is_far_outside(self.pos, WANDER_DESPAWN_MARGIN) {
            self.active = false;
        }
    }

    /// Apply a hit. Returns true if this hit destroyed the enemy.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if !self.active {
            return false;
        }
        self.health -= amount;
        if self.health <= 0 {
            self.active = false;
            return true;
        }
        false
    }
}

// ============================================================================
// Collectibles
// ============================================================================

/// Objective collectible
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataNode {
    pub pos: Vec2,
    pub size: Vec2,
    pub pulse: Pulse,
    pub rotation: f32,
    rotation_speed: f32,
    pub active: bool,
}

impl DataNode {
    pub fn new(pos: Vec2, rng: &mut Pcg32) -> Self {
        Self {
            pos,
            size: Vec2::splat(DATA_NODE_SIZE),
            pulse: Pulse::default(),
            rotation: 0.0,
            rotation_speed: rng.random::<f32>() * 0.02 + 0.01,
            active: true,
        }
    }

    pub fn update(&mut self, dt: f32) {
        if !self.active {
            return;
        }
        let f = frames(dt);
        self.pulse.advance(f);
        self.rotation = (self.rotation + self.rotation_speed * f) % TAU;
    }
}

/// Power-up variants and the player capability each grants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    Stealth,
    Shield,
    SpeedBoost,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] =
        [PowerUpKind::Stealth, PowerUpKind::Shield, PowerUpKind::SpeedBoost];

    pub fn name(self) -> &'static str {
        match self {
            PowerUpKind::Stealth => "Stealth Mode",
            PowerUpKind::Shield => "Shield",
            PowerUpKind::SpeedBoost => "Speed Boost",
        }
    }

    pub fn color(self) -> u32 {
        match self {
            PowerUpKind::Stealth => palette::CYAN,
            PowerUpKind::Shield => palette::YELLOW,
            PowerUpKind::SpeedBoost => palette::MAGENTA,
        }
    }
}

/// Floating pickup that activates a player ability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub pos: Vec2,
    /// Rest height the hover bob oscillates around
    pub origin_y: f32,
    pub size: Vec2,
    pub rotation: f32,
    pub pulse: Pulse,
    pub active: bool,
}

/// Power-up spin per reference frame
const POWER_UP_SPIN: f32 = 0.03;
/// Hover phase rate per millisecond of engine clock
const POWER_UP_HOVER_RATE: f32 = 0.002;

impl PowerUp {
    pub fn new(kind: PowerUpKind, pos: Vec2) -> Self {
        Self {
            kind,
            pos,
            origin_y: pos.y,
            size: Vec2::splat(POWER_UP_SIZE),
            rotation: 0.0,
            pulse: Pulse::default(),
            active: true,
        }
    }

    /// `clock_ms` is the engine's running clock; all power-ups bob in phase
    pub fn update(&mut self, dt: f32, clock_ms: f64) {
        if !self.active {
            return;
        }
        let f = frames(dt);
        self.rotation = (self.rotation + POWER_UP_SPIN * f) % TAU;
        self.pulse.advance(f);
        let hover = (clock_ms * POWER_UP_HOVER_RATE as f64).sin() as f32;
        self.pos.y = self.origin_y + hover * POWER_UP_HOVER_AMPLITUDE;
    }
}

// ============================================================================
// Projectiles
// ============================================================================

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    /// Unit travel direction
    pub dir: Vec2,
    /// Pixels per reference frame
    pub speed: f32,
    pub damage: i32,
    pub size: Vec2,
    pub owner: Owner,
    pub color: u32,
    /// Previous positions, newest first
    pub tail: Vec<Vec2>,
    pub active: bool,
}

impl Projectile {
    pub fn new(pos: Vec2, dir: Vec2, speed: f32, damage: i32, owner: Owner) -> Self {
        Self {
            pos,
            dir,
            speed,
            damage,
            size: Vec2::splat(PROJECTILE_SIZE),
            owner,
            color: palette::CYAN,
            tail: Vec::with_capacity(PROJECTILE_TAIL_LENGTH + 1),
            active: true,
        }
    }

    pub fn update(&mut self, dt: f32, arena: &Arena) {
        if !self.active {
            return;
        }
        self.tail.insert(0, self.pos);
        self.tail.truncate(PROJECTILE_TAIL_LENGTH);

        self.pos += self.dir * self.speed * frames(dt);

        if !arena.contains(self.pos) {
            self.active = false;
        }
    }
}

// ============================================================================
// Particles
// ============================================================================

/// Cosmetic spark; never collides or scores
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub color: u32,
    pub size: f32,
    base_size: f32,
    /// Remaining lifetime in ms
    pub lifespan: f32,
    max_lifespan: f32,
    pub active: bool,
}

impl Particle {
    pub fn new(pos: Vec2, vel: Vec2, color: u32, size: f32, lifespan: f32) -> Self {
        Self {
            pos,
            vel,
            color,
            size,
            base_size: size,
            lifespan,
            max_lifespan: lifespan,
            active: lifespan > 0.0,
        }
    }

    /// Remaining life as a 0..1 fraction (used for fade)
    pub fn life_fraction(&self) -> f32 {
        if self.max_lifespan <= 0.0 {
            return 0.0;
        }
        (self.lifespan / self.max_lifespan).clamp(0.0, 1.0)
    }

    pub fn update(&mut self, dt: f32) {
        if !self.active {
            return;
        }
        self.lifespan -= dt;
        if self.lifespan <= 0.0 {
            self.active = false;
            return;
        }

        let f = frames(dt);
        self.pos += self.vel * f;
        self.vel *= PARTICLE_DRAG.powf(f);
        self.size = self.base_size * self.life_fraction();
    }
}

/// Particle effects the engine can emit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleBurst {
    /// Enemy destroyed by ramming the player
    Explosion,
    /// Projectile struck an enemy
    Hit,
    DataCollect,
    PowerUp,
    Stealth,
    /// Ring around the player
    Shield,
    Damage,
    /// Player destroyed
    Death,
}

/// (min, extra) pairs: value = min + random * extra
struct BurstShape {
    count: usize,
    speed: (f32, f32),
    size: (f32, f32),
    life: (f32, f32),
    colors: &'static [u32],
}

const DEATH_COLORS: [u32; 5] = [
    palette::RED,
    palette::ORANGE,
    palette::YELLOW,
    palette::GREEN,
    palette::WHITE,
];

impl ParticleBurst {
    fn shape(self) -> BurstShape {
        match self {
            ParticleBurst::Explosion => BurstShape {
                count: 20,
                speed: (1.0, 3.0),
                size: (3.0, 4.0),
                life: (300.0, 500.0),
                colors: &[palette::RED],
            },
            ParticleBurst::Hit => BurstShape {
                count: 5,
                speed: (0.5, 2.0),
                size: (2.0, 3.0),
                life: (200.0, 300.0),
                colors: &[palette::WHITE],
            },
            ParticleBurst::DataCollect => BurstShape {
                count: 15,
                speed: (1.0, 3.0),
                size: (2.0, 3.0),
                life: (200.0, 400.0),
                colors: &[palette::GREEN],
            },
            ParticleBurst::PowerUp => BurstShape {
                count: 15,
                speed: (1.0, 3.0),
                size: (2.0, 4.0),
                life: (300.0, 500.0),
                colors: &[palette::YELLOW],
            },
            ParticleBurst::Stealth => BurstShape {
                count: 20,
                speed: (1.0, 3.0),
                size: (2.0, 5.0),
                life: (500.0, 1000.0),
                colors: &[palette::CYAN],
            },
            ParticleBurst::Shield => BurstShape {
                count: 30,
                speed: (0.5, 0.0),
                size: (2.0, 4.0),
                life: (500.0, 1000.0),
                colors: &[palette::YELLOW],
            },
            ParticleBurst::Damage => BurstShape {
                count: 15,
                speed: (2.0, 4.0),
                size: (2.0, 4.0),
                life: (300.0, 500.0),
                colors: &[palette::RED],
            },
            ParticleBurst::Death => BurstShape {
                count: 50,
                speed: (3.0, 5.0),
                size: (3.0, 5.0),
                life: (500.0, 1500.0),
                colors: &DEATH_COLORS,
            },
        }
    }

    pub fn count(self) -> usize {
        self.shape().count
    }

    /// Push this burst's particles around `origin`
    pub fn emit(self, origin: Vec2, rng: &mut Pcg32, out: &mut Vec<Particle>) {
        let shape = self.shape();
        out.reserve(shape.count);
        for _ in 0..shape.count {
            let dir = Vec2::from_angle(rng.random::<f32>() * TAU);
            let speed = shape.speed.0 + rng.random::<f32>() * shape.speed.1;
            let size = shape.size.0 + rng.random::<f32>() * shape.size.1;
            let life = shape.life.0 + rng.random::<f32>() * shape.life.1;
            let color = shape.colors[rng.random_range(0..shape.colors.len())];

            // The shield ring starts one body-width out and drifts outward
            let pos = if self == ParticleBurst::Shield {
                origin + dir * PLAYER_SIZE
            } else {
                origin
            };
            out.push(Particle::new(pos, dir * speed, color, size, life));
        }
    }
}
