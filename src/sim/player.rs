//! The player ship: movement, firing, timed abilities, damage

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::FRAC_PI_2;

use super::entities::{Owner, PowerUpKind, Projectile};
use super::state::{Arena, GameEvent};
use crate::consts::*;
use crate::platform::Intent;
use crate::{frames, normalize_angle, shortest_angle_delta};

/// Timed abilities the player can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AbilityKind {
    Stealth,
    Shield,
}

impl AbilityKind {
    pub fn name(self) -> &'static str {
        match self {
            AbilityKind::Stealth => "stealth",
            AbilityKind::Shield => "shield",
        }
    }
}

/// Phase of an [`Ability`]'s cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbilityPhase {
    Idle,
    Active,
    Cooldown,
}

/// Idle -> Active (duration counts down) -> Cooldown (cooldown counts down) -> Idle
///
/// Times are milliseconds. Also drives the boost, which follows the same cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ability {
    pub active: bool,
    pub duration: f32,
    pub max_duration: f32,
    pub cooldown: f32,
    pub cooldown_time: f32,
}

impl Ability {
    pub fn new(max_duration: f32, cooldown_time: f32) -> Self {
        Self {
            active: false,
            duration: 0.0,
            max_duration,
            cooldown: 0.0,
            cooldown_time,
        }
    }

    pub fn is_ready(&self) -> bool {
        !self.active && self.cooldown <= 0.0
    }

    pub fn phase(&self) -> AbilityPhase {
        if self.active {
            AbilityPhase::Active
        } else if self.cooldown > 0.0 {
            AbilityPhase::Cooldown
        } else {
            AbilityPhase::Idle
        }
    }

    /// Start the ability. Fails while active or cooling down.
    pub fn try_activate(&mut self) -> bool {
        if !self.is_ready() {
            return false;
        }
        self.active = true;
        self.duration = self.max_duration;
        true
    }

    pub fn tick(&mut self, dt: f32) {
        if self.active {
            self.duration -= dt;
            if self.duration <= 0.0 {
                self.active = false;
                self.duration = 0.0;
                self.cooldown = self.cooldown_time;
            }
        } else if self.cooldown > 0.0 {
            self.cooldown = (self.cooldown - dt).max(0.0);
        }
    }

    pub fn reset(&mut self) {
        self.active = false;
        self.duration = 0.0;
        self.cooldown = 0.0;
    }
}

/// Result of [`Player::take_damage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Invulnerable, shielded or already dead
    Ignored,
    Damaged,
    Killed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Body center
    pub pos: Vec2,
    pub size: Vec2,
    pub speed: f32,
    pub boost_speed: f32,
    pub boost: Ability,
    /// Facing (radians, 0 = up)
    pub rotation: f32,
    pub health: i32,
    pub max_health: i32,
    pub alive: bool,
    /// Remaining invulnerability (ms), zero when vulnerable
    pub invulnerable_ms: f32,
    pub stealth: Ability,
    pub shield: Ability,
    /// Time until the next shot is allowed (ms)
    fire_cooldown: f32,
    /// Recent positions, newest first
    pub trail: Vec<Vec2>,
    trail_timer: f32,
    /// Any input held this tick (thruster flames)
    pub thrusting: bool,
    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl Player {
    pub fn new(arena: &Arena) -> Self {
        Self {
            pos: Self::spawn_point(arena),
            size: Vec2::splat(PLAYER_SIZE),
            speed: PLAYER_SPEED,
            boost_speed: PLAYER_BOOST_SPEED,
            boost: Ability::new(BOOST_DURATION_MS, BOOST_COOLDOWN_MS),
            rotation: 0.0,
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            alive: true,
            invulnerable_ms: 0.0,
            stealth: Ability::new(STEALTH_DURATION_MS, STEALTH_COOLDOWN_MS),
            shield: Ability::new(SHIELD_DURATION_MS, SHIELD_COOLDOWN_MS),
            fire_cooldown: 0.0,
            trail: Vec::with_capacity(PLAYER_TRAIL_LENGTH + 1),
            trail_timer: 0.0,
            thrusting: false,
            events: Vec::new(),
        }
    }

    fn spawn_point(arena: &Arena) -> Vec2 {
        Vec2::new(arena.width / 2.0, arena.height * 0.8)
    }

    pub fn is_boosting(&self) -> bool {
        self.boost.active
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_ms > 0.0
    }

    pub fn ability(&self, kind: AbilityKind) -> &Ability {
        match kind {
            AbilityKind::Stealth => &self.stealth,
            AbilityKind::Shield => &self.shield,
        }
    }

    fn ability_mut(&mut self, kind: AbilityKind) -> &mut Ability {
        match kind {
            AbilityKind::Stealth => &mut self.stealth,
            AbilityKind::Shield => &mut self.shield,
        }
    }

    /// Take the events raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Advance one tick. Without an intent (no input source) only timers run.
    pub fn update(
        &mut self,
        dt: f32,
        intent: Option<&Intent>,
        arena: &Arena,
        projectile_speed: f32,
        projectiles: &mut Vec<Projectile>,
    ) {
        if !self.alive {
            return;
        }

        self.tick_cooldowns(dt);

        if let Some(intent) = intent {
            self.thrusting = intent.movement != Vec2::ZERO || intent.fire || intent.special;
            self.apply_movement(dt, intent, arena);
            if intent.fire && self.fire_cooldown <= 0.0 {
                projectiles.push(self.shoot(projectile_speed));
                self.fire_cooldown = PLAYER_FIRE_RATE_MS;
            }
            if intent.special {
                // Shield takes priority over stealth
                if self.shield.is_ready() {
                    self.activate_ability(AbilityKind::Shield);
                } else if self.stealth.is_ready() {
                    self.activate_ability(AbilityKind::Stealth);
                }
            }
        } else {
            self.thrusting = false;
        }

        self.update_trail(dt);
    }

    fn tick_cooldowns(&mut self, dt: f32) {
        self.invulnerable_ms = (self.invulnerable_ms - dt).max(0.0);
        self.fire_cooldown = (self.fire_cooldown - dt).max(0.0);
        self.stealth.tick(dt);
        self.shield.tick(dt);
        self.boost.tick(dt);
    }

    fn apply_movement(&mut self, dt: f32, intent: &Intent, arena: &Arena) {
        let f = frames(dt);
        let speed = if self.is_boosting() { self.boost_speed } else { self.speed };
        self.pos += intent.movement * speed * f;
        self.pos = arena.clamp_center(self.pos, self.size * 0.5);

        if intent.movement != Vec2::ZERO {
            let target = intent.movement.y.atan2(intent.movement.x) + FRAC_PI_2;
            let blend = 1.0 - (1.0 - PLAYER_ROTATION_SMOOTHING).powf(f);
            let delta = shortest_angle_delta(self.rotation, target);
            self.rotation = normalize_angle(self.rotation + delta * blend);
        }

        if intent.special {
            self.activate_boost();
        }
    }

    /// Engage the speed boost. Fails while boosting or cooling down.
    pub fn activate_boost(&mut self) -> bool {
        if !self.boost.try_activate() {
            return false;
        }
        self.events.push(GameEvent::BoostEngaged);
        true
    }

    /// Guarded Idle -> Active transition
    pub fn activate_ability(&mut self, kind: AbilityKind) -> bool {
        if !self.ability_mut(kind).try_activate() {
            return false;
        }
        self.events.push(GameEvent::AbilityActivated { kind, pos: self.pos });
        true
    }

    /// Apply a collected power-up
    pub fn activate_power_up(&mut self, kind: PowerUpKind) -> bool {
        match kind {
            PowerUpKind::Stealth => self.activate_ability(AbilityKind::Stealth),
            PowerUpKind::Shield => self.activate_ability(AbilityKind::Shield),
            PowerUpKind::SpeedBoost => self.activate_boost(),
        }
    }

    /// Muzzle position and unit direction for the current facing
    pub fn muzzle(&self) -> (Vec2, Vec2) {
        let dir = Vec2::new(self.rotation.sin(), -self.rotation.cos());
        (self.pos + dir * (self.size.x / 2.0), dir)
    }

    fn shoot(&mut self, speed: f32) -> Projectile {
        let (pos, dir) = self.muzzle();
        self.events.push(GameEvent::Shot);
        Projectile::new(pos, dir, speed, PROJECTILE_DAMAGE, Owner::Player)
    }

    fn update_trail(&mut self, dt: f32) {
        self.trail_timer += dt;
        if self.trail_timer > PLAYER_TRAIL_INTERVAL_MS {
            self.trail.insert(0, self.pos);
            self.trail.truncate(PLAYER_TRAIL_LENGTH);
            self.trail_timer = 0.0;
        }
    }

    /// No-op while invulnerable, shielded or dead. Reaching zero health is
    /// terminal until [`Player::reset`].
    pub fn take_damage(&mut self, amount: i32) -> DamageOutcome {
        if self.is_invulnerable() || self.shield.active || !self.alive {
            return DamageOutcome::Ignored;
        }

        self.health = (self.health - amount).clamp(0, self.max_health);
        if self.health <= 0 {
            self.alive = false;
            self.events.push(GameEvent::PlayerDestroyed { pos: self.pos });
            return DamageOutcome::Killed;
        }

        self.invulnerable_ms = PLAYER_INVULNERABLE_MS;
        self.events.push(GameEvent::PlayerDamaged { pos: self.pos });
        DamageOutcome::Damaged
    }

    /// Back to the spawn point, keeping health and abilities
    pub fn reset_position(&mut self, arena: &Arena) {
        self.pos = Self::spawn_point(arena);
        self.trail.clear();
    }

    /// Full reset for a new run
    pub fn reset(&mut self, arena: &Arena) {
        *self = Self::new(arena);
    }
}
