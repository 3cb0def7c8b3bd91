//! Game engine: owns every entity and runs the per-frame update
//!
//! Each tick runs in a fixed order: spawn timers, player, enemies, data nodes,
//! projectiles, particles, power-ups, collisions, progression check. Anything
//! deactivated during the tick is gone from its collection before the tick
//! returns. Side effects (particles, sounds, terminal lines, host callbacks)
//! are queued as [`GameEvent`]s and dispatched at the end of the tick.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::collision::check_collision;
use super::entities::{DataNode, Enemy, Particle, ParticleBurst, PowerUp, Projectile};
use super::player::{AbilityKind, Player};
use super::progression::{LevelPhase, Progression};
use super::spawn::{self, SpawnTimers};
use super::state::{Arena, GameEvent, GameState};
use crate::consts::*;
use crate::highscores::HighScore;
use crate::platform::{Collaborators, Intent, LineStyle};
use crate::settings::Settings;

/// Engine construction parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub width: f32,
    pub height: f32,
    /// Seed for spawn placement and cosmetic randomness
    pub seed: u64,
}

impl EngineConfig {
    /// Play area size, clamped to the largest supported canvas
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.clamp(1.0, MAX_CANVAS_WIDTH),
            height: height.clamp(1.0, MAX_CANVAS_HEIGHT),
            seed: 0,
        }
    }

    /// Canvas sized to 80% of its container, capped at 800x600
    pub fn fit_container(container_width: f32, container_height: f32) -> Self {
        Self::new(container_width * 0.8, container_height * 0.8)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(MAX_CANVAS_WIDTH, MAX_CANVAS_HEIGHT)
    }
}

/// What [`GameEngine::frame`] did with an animation frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStep {
    /// Not running or game over; the host may stop requesting frames
    Stopped,
    /// Paused; keep requesting frames but skip simulation and render
    Idle,
    /// Simulation advanced; render this frame
    Simulated,
}

pub type GameOverCallback = Box<dyn FnMut(u64)>;
pub type LevelCompleteCallback = Box<dyn FnMut(u32, u64)>;

pub struct GameEngine {
    pub state: GameState,
    pub settings: Settings,
    /// Level 1 settings restored on every reset
    base_settings: Settings,
    pub progression: Progression,
    arena: Arena,
    /// Absent until [`GameEngine::init`]
    pub player: Option<Player>,
    pub enemies: Vec<Enemy>,
    pub data_nodes: Vec<DataNode>,
    pub projectiles: Vec<Projectile>,
    pub particles: Vec<Particle>,
    pub power_ups: Vec<PowerUp>,
    timers: SpawnTimers,
    /// Latest input; `None` when no input source is attached
    intent: Option<Intent>,
    rng: Pcg32,
    /// Simulated time since construction (ms)
    clock_ms: f64,
    last_frame_time: Option<f64>,
    high_score: HighScore,
    collaborators: Collaborators,
    on_game_over: Option<GameOverCallback>,
    on_level_complete: Option<LevelCompleteCallback>,
    events: Vec<GameEvent>,
}

impl GameEngine {
    pub fn new(config: EngineConfig, mut collaborators: Collaborators) -> Self {
        log::info!(
            "Initializing game engine ({}x{}, seed {})",
            config.width,
            config.height,
            config.seed
        );
        let base_settings = Settings::load(collaborators.storage.as_deref());
        let high_score = HighScore::load(collaborators.storage.take());

        Self {
            state: GameState::new(high_score.best()),
            settings: base_settings.clone(),
            base_settings,
            progression: Progression::new(),
            arena: Arena::new(config.width, config.height),
            player: None,
            enemies: Vec::new(),
            data_nodes: Vec::new(),
            projectiles: Vec::new(),
            particles: Vec::new(),
            power_ups: Vec::new(),
            timers: SpawnTimers::default(),
            intent: None,
            rng: Pcg32::seed_from_u64(config.seed),
            clock_ms: 0.0,
            last_frame_time: None,
            high_score,
            collaborators,
            on_game_over: None,
            on_level_complete: None,
            events: Vec::new(),
        }
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    pub fn intent(&self) -> Option<&Intent> {
        self.intent.as_ref()
    }

    /// Data nodes collected this level
    pub fn collected_data_nodes(&self) -> u32 {
        self.progression.collected
    }

    pub fn phase(&self) -> LevelPhase {
        self.progression.phase
    }

    pub fn set_on_game_over(&mut self, callback: impl FnMut(u64) + 'static) {
        self.on_game_over = Some(Box::new(callback));
    }

    pub fn set_on_level_complete(&mut self, callback: impl FnMut(u32, u64) + 'static) {
        self.on_level_complete = Some(Box::new(callback));
    }

    /// Feed the current input. `None` detaches input entirely.
    pub fn set_intent(&mut self, intent: Option<Intent>) {
        self.intent = intent;
    }

    /// Resize the play area (canvas resized by the host)
    pub fn resize(&mut self, width: f32, height: f32) {
        let config = EngineConfig::new(width, height);
        self.arena = Arena::new(config.width, config.height);
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Create the player and reset to a fresh run
    pub fn init(&mut self) {
        log::info!("Initializing game state");
        self.player = Some(Player::new(&self.arena));
        self.reset_game_state();
        self.collaborators.line(
            "> Game system initialized. Breach protocols active.",
            Some(LineStyle::System),
        );
    }

    /// Full reset: level 1, score 0, base settings, empty collections,
    /// fresh player. Leaves the engine stopped so [`GameEngine::start`] works.
    pub fn reset_game_state(&mut self) {
        log::info!("Resetting game state");
        self.state = GameState::new(self.high_score.best());
        self.settings = self.base_settings.clone();
        self.progression.reset();
        self.timers.reset();
        self.last_frame_time = None;

        if let Some(player) = self.player.as_mut() {
            player.reset(&self.arena);
        }

        self.enemies.clear();
        self.data_nodes.clear();
        self.projectiles.clear();
        self.particles.clear();
        self.power_ups.clear();
        self.events.clear();
    }

    /// Begin (or restart after reset) the run. No-op if already running.
    pub fn start(&mut self) {
        if self.state.running {
            return;
        }
        log::info!("Starting game");
        self.state.running = true;
        self.state.paused = false;
        self.last_frame_time = None;

        for _ in 0..INITIAL_DATA_NODES {
            self.spawn_data_node();
        }

        self.events.push(GameEvent::GameStarted);
        self.dispatch_events();
    }

    pub fn stop(&mut self) {
        log::info!("Stopping game");
        self.state.running = false;
    }

    pub fn pause(&mut self) {
        log::info!("Pausing game");
        self.state.paused = true;
    }

    /// Leave a user pause. A level-complete pause only ends through
    /// [`GameEngine::load_next_level`].
    pub fn resume(&mut self) {
        if !self.state.paused || self.progression.phase == LevelPhase::LevelComplete {
            return;
        }
        log::info!("Resuming game");
        self.state.paused = false;
        self.last_frame_time = None;
    }

    /// Escape-key behaviour: toggle pause while a run is live.
    /// Returns the new paused state.
    pub fn toggle_pause(&mut self) -> bool {
        if self.state.running && !self.state.game_over {
            if self.state.paused {
                self.resume();
            } else {
                self.pause();
            }
        }
        self.state.paused
    }

    /// LevelComplete -> next level. Returns false outside a completed level.
    pub fn load_next_level(&mut self) -> bool {
        if self.progression.phase != LevelPhase::LevelComplete {
            return false;
        }
        let level = self
            .progression
            .advance(&mut self.state.level, &mut self.settings);
        log::info!("Loading level {}", level);

        self.enemies.clear();
        self.data_nodes.clear();
        self.projectiles.clear();

        if let Some(player) = self.player.as_mut() {
            player.reset_position(&self.arena);
        }

        self.state.paused = false;
        self.last_frame_time = None;
        self.events.push(GameEvent::LevelUp { level });
        self.dispatch_events();
        true
    }

    /// Host animation-frame entry. `timestamp` is the host clock in ms.
    pub fn frame(&mut self, timestamp: f64) -> FrameStep {
        if !self.state.running || self.state.game_over {
            return FrameStep::Stopped;
        }
        if self.state.paused {
            return FrameStep::Idle;
        }

        let last = self.last_frame_time.unwrap_or(timestamp);
        self.last_frame_time = Some(timestamp);
        self.update((timestamp - last).max(0.0) as f32);
        FrameStep::Simulated
    }

    // ------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------

    /// Advance the simulation by `delta_ms` (capped at [`MAX_DELTA_MS`]).
    /// Does nothing unless running, unpaused and not game over.
    pub fn update(&mut self, delta_ms: f32) {
        if !self.state.is_live() {
            return;
        }
        let dt = delta_ms.clamp(0.0, MAX_DELTA_MS);
        self.clock_ms += dt as f64;

        self.run_spawn_timers(dt);
        self.update_player(dt);
        self.update_enemies(dt);

        self.data_nodes.iter_mut().for_each(|n| n.update(dt));
        self.data_nodes.retain(|n| n.active);

        let arena = self.arena;
        self.projectiles.iter_mut().for_each(|p| p.update(dt, &arena));
        self.projectiles.retain(|p| p.active);

        self.particles.iter_mut().for_each(|p| p.update(dt));
        self.particles.retain(|p| p.active);

        let clock = self.clock_ms;
        self.power_ups.iter_mut().for_each(|p| p.update(dt, clock));
        self.power_ups.retain(|p| p.active);

        self.resolve_collisions();
        self.sweep_inactive();
        self.collect_player_events();
        self.check_level_completion();
        self.dispatch_events();
    }

    fn run_spawn_timers(&mut self, dt: f32) {
        let due = self
            .timers
            .advance(dt, &self.settings, self.enemies.len());
        if due.enemy {
            self.spawn_enemy();
        }
        if due.data_node {
            self.spawn_data_node();
        }
        if due.power_up {
            self.spawn_power_up();
        }
    }

    fn update_player(&mut self, dt: f32) {
        if let Some(player) = self.player.as_mut() {
            player.update(
                dt,
                self.intent.as_ref(),
                &self.arena,
                self.settings.projectile_speed,
                &mut self.projectiles,
            );
        }
        self.collect_player_events();
    }

    fn update_enemies(&mut self, dt: f32) {
        // Stealth hides the player; enemies then wander
        let target = self
            .player
            .as_ref()
            .filter(|p| p.alive && !p.stealth.active)
            .map(|p| p.pos);

        for enemy in &mut self.enemies {
            enemy.update(dt, target, &self.arena, &mut self.rng);
        }
        self.enemies.retain(|e| e.active);
    }

    fn resolve_collisions(&mut self) {
        if let Some(player) = self.player.as_mut() {
            // Player-enemy: ramming hurts the player and destroys the enemy
            // without awarding score
            for enemy in self.enemies.iter_mut().filter(|e| e.active) {
                if !player.alive {
                    break;
                }
                if player.is_invulnerable() || player.shield.active {
                    continue;
                }
                if check_collision(&*player, &*enemy) {
                    player.take_damage(CONTACT_DAMAGE);
                    enemy.active = false;
                    self.events.push(GameEvent::EnemyRammed { pos: enemy.pos });
                }
            }

            if player.alive {
                for node in self.data_nodes.iter_mut().filter(|n| n.active) {
                    if check_collision(&*player, &*node) {
                        node.active = false;
                        let collected = self.progression.record_collection();
                        award(&mut self.state, &mut self.high_score, SCORE_DATA_NODE);
                        self.events.push(GameEvent::DataCollected {
                            pos: node.pos,
                            collected,
                            required: self.settings.data_nodes_for_next_level,
                        });
                    }
                }

                for power_up in self.power_ups.iter_mut().filter(|p| p.active) {
                    if check_collision(&*player, &*power_up) {
                        power_up.active = false;
                        player.activate_power_up(power_up.kind);
                        self.events.push(GameEvent::PowerUpCollected {
                            kind: power_up.kind,
                            pos: power_up.pos,
                        });
                    }
                }
            }
        }

        // Projectile-enemy: each projectile hits at most one enemy
        for projectile in self.projectiles.iter_mut().filter(|p| p.active) {
            for enemy in self.enemies.iter_mut().filter(|e| e.active) {
                if check_collision(&*projectile, &*enemy) {
                    let killed = enemy.take_damage(projectile.damage);
                    projectile.active = false;
                    if killed {
                        award(&mut self.state, &mut self.high_score, SCORE_ENEMY_KILL);
                    }
                    self.events.push(GameEvent::ProjectileHit {
                        pos: projectile.pos,
                        killed,
                    });
                    break;
                }
            }
        }
    }

    fn sweep_inactive(&mut self) {
        self.enemies.retain(|e| e.active);
        self.data_nodes.retain(|n| n.active);
        self.power_ups.retain(|p| p.active);
        self.projectiles.retain(|p| p.active);
    }

    /// Move the player's outbox into the engine queue; death ends the run
    fn collect_player_events(&mut self) {
        let Some(player) = self.player.as_mut() else {
            return;
        };
        for event in player.drain_events() {
            if let GameEvent::PlayerDestroyed { .. } = event {
                self.state.game_over = true;
                self.progression.game_over();
                self.events.push(event);
                self.events.push(GameEvent::GameOver {
                    score: self.state.score,
                });
                log::info!("Game over with score {}", self.state.score);
            } else {
                self.events.push(event);
            }
        }
    }

    fn check_level_completion(&mut self) {
        if self.progression.check(&self.settings) {
            self.state.paused = true;
            log::info!(
                "Level {} complete with score {}",
                self.state.level,
                self.state.score
            );
            self.events.push(GameEvent::LevelComplete {
                level: self.state.level,
                score: self.state.score,
            });
        }
    }

    /// Add points, updating the persisted best when beaten
    pub fn add_score(&mut self, points: u64) {
        award(&mut self.state, &mut self.high_score, points);
    }

    // ------------------------------------------------------------------
    // Spawning
    // ------------------------------------------------------------------

    fn spawn_enemy(&mut self) {
        let enemy = spawn::spawn_enemy(&self.arena, self.settings.enemy_speed, &mut self.rng);
        log::debug!("Spawned {} enemy at {:?}", enemy.kind.name(), enemy.pos);
        self.enemies.push(enemy);
    }

    /// Returns false when placement gave up
    fn spawn_data_node(&mut self) -> bool {
        let player = self.player.as_ref().map(|p| p.pos);
        match spawn::place_data_node(&self.arena, player, &self.enemies, &mut self.rng) {
            Some(pos) => {
                self.data_nodes.push(DataNode::new(pos, &mut self.rng));
                true
            }
            None => {
                log::debug!("No room for a data node this cycle");
                false
            }
        }
    }

    fn spawn_power_up(&mut self) {
        let (pos, kind) = spawn::place_power_up(&self.arena, &mut self.rng);
        log::debug!("Spawned {:?} power-up at {:?}", kind, pos);
        self.power_ups.push(PowerUp::new(kind, pos));
        self.events.push(GameEvent::PowerUpSpawned { kind });
    }

    // ------------------------------------------------------------------
    // Side effects
    // ------------------------------------------------------------------

    fn burst(&mut self, burst: ParticleBurst, at: Vec2) {
        burst.emit(at, &mut self.rng, &mut self.particles);
    }

    fn dispatch_events(&mut self) {
        for event in std::mem::take(&mut self.events) {
            self.dispatch(event);
        }
    }

    fn dispatch(&mut self, event: GameEvent) {
        match event {
            GameEvent::GameStarted => {
                self.collaborators.audio(|a| a.play_game_start());
                self.collaborators
                    .line("> Infiltration sequence initiated.", None);
            }
            GameEvent::Shot => self.collaborators.audio(|a| a.play_shoot()),
            GameEvent::BoostEngaged => self.collaborators.audio(|a| a.play_boost()),
            GameEvent::AbilityActivated { kind, pos } => {
                let (burst, message) = match kind {
                    AbilityKind::Stealth => (
                        ParticleBurst::Stealth,
                        format!(
                            "> Stealth mode activated: Network signature masked for {:.1} seconds",
                            STEALTH_DURATION_MS / 1000.0
                        ),
                    ),
                    AbilityKind::Shield => (
                        ParticleBurst::Shield,
                        format!(
                            "> Defense shield activated: Protected from security protocols for {:.1} seconds",
                            SHIELD_DURATION_MS / 1000.0
                        ),
                    ),
                };
                self.burst(burst, pos);
                self.collaborators.line(&message, Some(LineStyle::Success));
                self.collaborators.audio(|a| a.play_power_up());
            }
            GameEvent::PlayerDamaged { pos } => {
                self.burst(ParticleBurst::Damage, pos);
                self.collaborators.audio(|a| a.play_damage());
                self.collaborators.glitch(500);
            }
            GameEvent::PlayerDestroyed { pos } => {
                self.burst(ParticleBurst::Death, pos);
                self.collaborators.audio(|a| a.play_explosion());
                self.collaborators.line(
                    "> CRITICAL ERROR: Connection terminated by security systems",
                    Some(LineStyle::Error),
                );
                self.collaborators.glitch(2000);
            }
            GameEvent::EnemyRammed { pos } => {
                self.burst(ParticleBurst::Explosion, pos);
                self.collaborators.glitch(300);
            }
            GameEvent::ProjectileHit { pos, killed } => {
                self.burst(ParticleBurst::Hit, pos);
                if killed {
                    self.burst(ParticleBurst::Explosion, pos);
                    self.collaborators.audio(|a| a.play_explosion());
                }
            }
            GameEvent::DataCollected {
                pos,
                collected,
                required,
            } => {
                self.burst(ParticleBurst::DataCollect, pos);
                self.collaborators.audio(|a| a.play_data_collect());
                self.collaborators.line(
                    &format!("> Data packet collected ({}/{})", collected, required),
                    Some(LineStyle::Success),
                );
            }
            GameEvent::PowerUpSpawned { kind } => {
                self.collaborators.line(
                    &format!("> {} power-up available", kind.name()),
                    Some(LineStyle::System),
                );
            }
            GameEvent::PowerUpCollected { kind, pos } => {
                self.burst(ParticleBurst::PowerUp, pos);
                self.collaborators.audio(|a| a.play_power_up());
                self.collaborators.line(
                    &format!("> {} activated", kind.name()),
                    Some(LineStyle::System),
                );
            }
            GameEvent::LevelComplete { level, score } => {
                self.collaborators.audio(|a| a.play_level_complete());
                self.collaborators.line(
                    &format!("> Security level {} bypassed successfully! Score: {}", level, score),
                    Some(LineStyle::Success),
                );
                if let Some(callback) = self.on_level_complete.as_mut() {
                    callback(level, score);
                }
            }
            GameEvent::LevelUp { level } => {
                self.collaborators.audio(|a| a.play_level_up());
                self.collaborators.line(
                    &format!("> Accessing security level {}...", level),
                    Some(LineStyle::System),
                );
            }
            GameEvent::GameOver { score } => {
                self.collaborators.audio(|a| a.play_game_over());
                self.collaborators.line(
                    "> ALERT: Connection terminated. Security countermeasures detected.",
                    Some(LineStyle::Error),
                );
                if let Some(callback) = self.on_game_over.as_mut() {
                    callback(score);
                }
            }
        }
    }
}

fn award(state: &mut GameState, high_score: &mut HighScore, points: u64) {
    state.score += points;
    if high_score.submit(state.score) {
        state.high_score = state.score;
    }
}
