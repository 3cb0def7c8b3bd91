//! End-to-end engine scenarios driven through the public API with recording
//! collaborators standing in for the browser.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::Vec2;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use hacker_breach::{HighScore, Settings};
use hacker_breach::audio::SoundEffect;
use hacker_breach::platform::{
    AudioNotifier, Collaborators, Intent, LineStyle, MemoryStorage, Storage, TextSink,
};
use hacker_breach::sim::{
    AbilityPhase, DataNode, EngineConfig, Enemy, EnemyKind, FrameStep, GameEngine, LevelPhase,
    Owner, PowerUp, PowerUpKind, Projectile,
};

const TICK: f32 = 16.0;

#[derive(Default)]
struct Sounds(Vec<SoundEffect>);

impl AudioNotifier for Sounds {
    fn play(&mut self, effect: SoundEffect) {
        self.0.push(effect);
    }
}

impl Sounds {
    fn count(&self, effect: SoundEffect) -> usize {
        self.0.iter().filter(|e| **e == effect).count()
    }
}

#[derive(Default)]
struct Lines(Vec<(String, Option<LineStyle>)>);

impl TextSink for Lines {
    fn write_line(&mut self, message: &str, style: Option<LineStyle>) {
        self.0.push((message.to_string(), style));
    }
}

impl Lines {
    fn contains(&self, needle: &str) -> bool {
        self.0.iter().any(|(text, _)| text.contains(needle))
    }
}

struct Harness {
    engine: GameEngine,
    sounds: Rc<RefCell<Sounds>>,
    lines: Rc<RefCell<Lines>>,
    storage: Rc<RefCell<MemoryStorage>>,
}

/// Started engine with the seeded data nodes removed
fn harness(seed: u64) -> Harness {
    let sounds = Rc::new(RefCell::new(Sounds::default()));
    let lines = Rc::new(RefCell::new(Lines::default()));
    let storage = Rc::new(RefCell::new(MemoryStorage::new()));
    let collaborators = Collaborators::none()
        .with_audio(sounds.clone())
        .with_terminal(lines.clone())
        .with_storage(storage.clone());

    let mut engine = GameEngine::new(EngineConfig::default().with_seed(seed), collaborators);
    engine.init();
    engine.start();
    engine.data_nodes.clear();

    Harness {
        engine,
        sounds,
        lines,
        storage,
    }
}

fn player_pos(engine: &GameEngine) -> Vec2 {
    engine.player.as_ref().map(|p| p.pos).unwrap_or_default()
}

fn health(engine: &GameEngine) -> i32 {
    engine.player.as_ref().map_or(0, |p| p.health)
}

/// Stationary enemy (zero base speed)
fn parked_enemy(kind: EnemyKind, pos: Vec2) -> Enemy {
    Enemy::new(kind, pos, 0.0, &mut Pcg32::seed_from_u64(7))
}

#[test]
fn test_start_announces_run() {
    let h = harness(1);
    assert_eq!(h.sounds.borrow().count(SoundEffect::GameStart), 1);
    assert!(h.lines.borrow().contains("Game system initialized"));
    assert!(h.lines.borrow().contains("Infiltration sequence initiated"));
}

/// Counts named cues separately from the generic `play`
#[derive(Default)]
struct NamedCues {
    shots: u32,
    starts: u32,
    generic: Vec<SoundEffect>,
}

impl AudioNotifier for NamedCues {
    fn play(&mut self, effect: SoundEffect) {
        self.generic.push(effect);
    }

    fn play_shoot(&mut self) {
        self.shots += 1;
    }

    fn play_game_start(&mut self) {
        self.starts += 1;
    }
}

#[test]
fn test_engine_uses_named_cues() {
    let cues = Rc::new(RefCell::new(NamedCues::default()));
    let mut engine = GameEngine::new(
        EngineConfig::default(),
        Collaborators::none().with_audio(cues.clone()),
    );
    engine.init();
    engine.start();
    engine.set_intent(Some(Intent {
        movement: Vec2::ZERO,
        fire: true,
        special: false,
    }));
    engine.update(TICK);

    let cues = cues.borrow();
    assert_eq!(cues.starts, 1);
    assert_eq!(cues.shots, 1);
    assert!(!cues.generic.contains(&SoundEffect::Shoot));
    assert!(!cues.generic.contains(&SoundEffect::GameStart));
}

#[test]
fn test_collecting_quota_completes_level_once() {
    let mut h = harness(2);
    let completions = Rc::new(Cell::new(0u32));
    {
        let completions = completions.clone();
        h.engine
            .set_on_level_complete(move |_level, _score| completions.set(completions.get() + 1));
    }

    let quota = h.engine.settings.data_nodes_for_next_level;
    let mut rng = Pcg32::seed_from_u64(3);
    for _ in 0..quota {
        let pos = player_pos(&h.engine);
        h.engine.data_nodes.push(DataNode::new(pos, &mut rng));
        h.engine.update(TICK);
    }

    assert_eq!(h.engine.state.score, 500);
    assert_eq!(h.engine.collected_data_nodes(), quota);
    assert_eq!(h.engine.phase(), LevelPhase::LevelComplete);
    assert!(h.engine.state.paused);
    assert_eq!(completions.get(), 1);
    assert_eq!(h.sounds.borrow().count(SoundEffect::LevelComplete), 1);
    assert!(h.lines.borrow().contains("Data packet collected (10/10)"));

    // Further ticks and frames do not re-announce
    h.engine.update(TICK);
    assert_eq!(h.engine.frame(1000.0), FrameStep::Idle);
    assert_eq!(completions.get(), 1);

    assert!(h.engine.load_next_level());
    assert_eq!(h.engine.state.level, 2);
    assert_eq!(h.engine.phase(), LevelPhase::InProgress);
    assert_eq!(h.engine.settings.data_nodes_for_next_level, 15);
    assert_eq!(h.engine.collected_data_nodes(), 0);
    assert!(!h.engine.state.paused);
    assert_eq!(h.sounds.borrow().count(SoundEffect::LevelUp), 1);
    assert!(h.lines.borrow().contains("Accessing security level 2"));
}

#[test]
fn test_invulnerability_window_after_ram() {
    let mut h = harness(4);
    let pos = player_pos(&h.engine);

    h.engine.enemies.push(parked_enemy(EnemyKind::Basic, pos));
    h.engine.update(TICK);
    assert_eq!(health(&h.engine), 80);
    assert!(h.engine.enemies.is_empty());
    // Ramming never scores
    assert_eq!(h.engine.state.score, 0);

    // Second contact inside the window is ignored and the enemy survives
    h.engine.enemies.push(parked_enemy(EnemyKind::Basic, pos));
    h.engine.update(TICK);
    assert_eq!(health(&h.engine), 80);
    assert_eq!(h.engine.enemies.len(), 1);

    for _ in 0..15 {
        h.engine.update(100.0);
    }
    assert_eq!(health(&h.engine), 60);
    assert!(h.engine.enemies.is_empty());
    assert_eq!(h.sounds.borrow().count(SoundEffect::Damage), 2);
}

#[test]
fn test_projectile_hits_a_single_enemy() {
    let mut h = harness(5);
    let target = Vec2::new(100.0, 100.0);
    h.engine.enemies.push(parked_enemy(EnemyKind::Fast, target));
    h.engine.enemies.push(parked_enemy(EnemyKind::Fast, target));
    h.engine
        .projectiles
        .push(Projectile::new(target, Vec2::X, 0.0, 10, Owner::Player));

    h.engine.update(TICK);

    assert_eq!(h.engine.enemies.len(), 1);
    assert!(h.engine.projectiles.is_empty());
    assert_eq!(h.engine.state.score, 100);
    assert_eq!(h.engine.state.high_score, 100);
    assert_eq!(h.sounds.borrow().count(SoundEffect::Explosion), 1);
}

#[test]
fn test_hits_follow_the_drawn_body() {
    let mut h = harness(11);
    let center = Vec2::new(200.0, 200.0);
    h.engine.enemies.push(parked_enemy(EnemyKind::Fast, center));

    // Past the bottom-right corner of the 30x30 body
    h.engine
        .projectiles
        .push(Projectile::new(Vec2::new(225.0, 225.0), Vec2::X, 0.0, 10, Owner::Player));
    h.engine.update(TICK);
    assert_eq!(h.engine.enemies.len(), 1);
    assert_eq!(h.engine.projectiles.len(), 1);

    // Inside its left half
    h.engine.projectiles.clear();
    h.engine
        .projectiles
        .push(Projectile::new(Vec2::new(188.0, 200.0), Vec2::X, 0.0, 10, Owner::Player));
    h.engine.update(TICK);
    assert!(h.engine.enemies.is_empty());
    assert_eq!(h.engine.state.score, 100);
}

#[test]
fn test_power_up_pickups() {
    let mut h = harness(12);
    let pos = player_pos(&h.engine);

    h.engine.power_ups.push(PowerUp::new(PowerUpKind::Shield, pos));
    h.engine.update(TICK);
    assert!(h.engine.power_ups.is_empty());
    let shield = h.engine.player.as_ref().map(|p| p.shield);
    assert!(shield.is_some_and(|s| s.active));

    // A second shield is picked up but leaves the running one alone
    let before = shield.map_or(0.0, |s| s.duration);
    h.engine.power_ups.push(PowerUp::new(PowerUpKind::Shield, pos));
    h.engine.update(TICK);
    assert!(h.engine.power_ups.is_empty());
    let shield = h.engine.player.as_ref().map(|p| p.shield);
    assert!(shield.is_some_and(|s| s.active && s.duration < before));
    assert!(shield.is_some_and(|s| s.duration < s.max_duration));

    // Boost on cooldown: consumed without boosting
    if let Some(player) = h.engine.player.as_mut() {
        player.boost.cooldown = 1000.0;
    }
    h.engine.power_ups.push(PowerUp::new(PowerUpKind::SpeedBoost, pos));
    h.engine.update(TICK);
    assert!(h.engine.power_ups.is_empty());
    assert!(h.engine.player.as_ref().is_some_and(|p| !p.is_boosting()));
    assert_eq!(h.sounds.borrow().count(SoundEffect::Boost), 0);
    // Three pickups plus the first shield's activation
    assert_eq!(h.sounds.borrow().count(SoundEffect::PowerUp), 4);
}

#[test]
fn test_wounding_hit_awards_nothing() {
    let mut h = harness(6);
    let target = Vec2::new(200.0, 120.0);
    h.engine.enemies.push(parked_enemy(EnemyKind::Heavy, target));
    h.engine
        .projectiles
        .push(Projectile::new(target, Vec2::X, 0.0, 1, Owner::Player));

    h.engine.update(TICK);

    assert_eq!(h.engine.enemies.len(), 1);
    assert_eq!(h.engine.enemies[0].health, EnemyKind::Heavy.health() - 1);
    assert_eq!(h.engine.state.score, 0);
}

#[test]
fn test_inactive_entities_removed_same_tick() {
    let mut h = harness(7);
    let mut rng = Pcg32::seed_from_u64(8);

    let mut enemy = parked_enemy(EnemyKind::Basic, Vec2::new(50.0, 50.0));
    enemy.active = false;
    let mut node = DataNode::new(Vec2::new(300.0, 100.0), &mut rng);
    node.active = false;
    let mut power_up = PowerUp::new(PowerUpKind::Shield, Vec2::new(600.0, 100.0));
    power_up.active = false;
    let mut projectile = Projectile::new(Vec2::new(400.0, 300.0), Vec2::Y, 8.0, 10, Owner::Player);
    projectile.active = false;

    h.engine.enemies.push(enemy);
    h.engine.data_nodes.push(node);
    h.engine.power_ups.push(power_up);
    h.engine.projectiles.push(projectile);

    h.engine.update(TICK);

    assert!(h.engine.enemies.is_empty());
    assert!(h.engine.data_nodes.is_empty());
    assert!(h.engine.power_ups.is_empty());
    assert!(h.engine.projectiles.is_empty());
}

#[test]
fn test_boost_expires_after_one_second() {
    let mut h = harness(9);
    h.engine.set_intent(Some(Intent {
        movement: Vec2::X,
        fire: false,
        special: true,
    }));
    h.engine.update(TICK);

    let boosting = h.engine.player.as_ref().is_some_and(|p| p.is_boosting());
    assert!(boosting);
    assert_eq!(h.sounds.borrow().count(SoundEffect::Boost), 1);

    h.engine.set_intent(Some(Intent::default()));
    for _ in 0..9 {
        h.engine.update(100.0);
    }
    assert!(h.engine.player.as_ref().is_some_and(|p| p.is_boosting()));

    h.engine.update(100.0);
    let player = h.engine.player.as_ref().map(|p| (p.is_boosting(), p.boost.phase()));
    assert_eq!(player, Some((false, AbilityPhase::Cooldown)));
}

#[test]
fn test_game_over_then_restart() {
    let mut h = harness(10);
    let final_score = Rc::new(Cell::new(None));
    {
        let final_score = final_score.clone();
        h.engine.set_on_game_over(move |score| final_score.set(Some(score)));
    }

    h.engine.add_score(300);
    if let Some(player) = h.engine.player.as_mut() {
        player.health = 20;
    }
    let pos = player_pos(&h.engine);
    h.engine.enemies.push(parked_enemy(EnemyKind::Heavy, pos));
    h.engine.update(TICK);

    assert!(h.engine.state.game_over);
    assert_eq!(h.engine.phase(), LevelPhase::GameOver);
    assert_eq!(final_score.get(), Some(300));
    assert_eq!(h.engine.frame(5000.0), FrameStep::Stopped);
    assert_eq!(h.sounds.borrow().count(SoundEffect::GameOver), 1);
    assert!(h.lines.borrow().contains("CRITICAL ERROR"));
    assert_eq!(
        h.storage.borrow().get(HighScore::STORAGE_KEY).as_deref(),
        Some("300")
    );

    h.engine.reset_game_state();
    h.engine.start();

    assert!(h.engine.state.is_live());
    assert_eq!(h.engine.state.level, 1);
    assert_eq!(h.engine.state.score, 0);
    assert_eq!(h.engine.state.high_score, 300);
    assert_eq!(health(&h.engine), 100);
    assert!(h.engine.enemies.is_empty());
    assert!(!h.engine.data_nodes.is_empty());
    assert_eq!(h.engine.phase(), LevelPhase::InProgress);
    assert_eq!(h.sounds.borrow().count(SoundEffect::GameStart), 2);
}

#[test]
fn test_high_score_survives_new_engine() {
    let storage = Rc::new(RefCell::new(MemoryStorage::new()));
    storage.borrow_mut().set(HighScore::STORAGE_KEY, "1250");

    let engine = GameEngine::new(
        EngineConfig::default(),
        Collaborators::none().with_storage(storage.clone()),
    );
    assert_eq!(engine.state.high_score, 1250);
}

#[test]
fn test_stored_settings_override_level_one() {
    let storage = Rc::new(RefCell::new(MemoryStorage::new()));
    storage
        .borrow_mut()
        .set(Settings::STORAGE_KEY, r#"{"data_nodes_for_next_level": 3, "max_enemies": 4}"#);

    let mut engine = GameEngine::new(
        EngineConfig::default(),
        Collaborators::none().with_storage(storage.clone()),
    );
    assert_eq!(engine.settings.data_nodes_for_next_level, 3);
    assert_eq!(engine.settings.max_enemies, 4);
    assert_eq!(engine.settings.enemy_speed, Settings::default().enemy_speed);

    engine.settings = engine.settings.for_next_level();
    engine.reset_game_state();
    assert_eq!(engine.settings.data_nodes_for_next_level, 3);
}

#[test]
fn test_same_seed_same_run() {
    fn run(seed: u64) -> (u64, usize, usize) {
        let mut engine = GameEngine::new(EngineConfig::default().with_seed(seed), Collaborators::none());
        engine.init();
        engine.start();
        for i in 0..600u32 {
            engine.set_intent(Some(Intent {
                movement: Vec2::from_angle(i as f32 * 0.05),
                fire: true,
                special: false,
            }));
            engine.update(TICK);
        }
        (engine.state.score, engine.enemies.len(), engine.data_nodes.len())
    }

    assert_eq!(run(77), run(77));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn test_run_invariants_hold(
        seed in any::<u64>(),
        steps in prop::collection::vec((0.0f32..6.3, any::<bool>(), any::<bool>()), 1..300),
    ) {
        let mut engine = GameEngine::new(EngineConfig::default().with_seed(seed), Collaborators::none());
        engine.init();
        engine.start();

        let mut last_score = 0;
        for (angle, fire, special) in steps {
            engine.set_intent(Some(Intent {
                movement: Vec2::from_angle(angle),
                fire,
                special,
            }));
            engine.update(TICK);

            let state = &engine.state;
            prop_assert!(state.score >= last_score);
            prop_assert_eq!(state.score % 50, 0);
            prop_assert!(state.high_score >= state.score);
            prop_assert!(engine.enemies.len() <= engine.settings.max_enemies);
            prop_assert!(engine.enemies.iter().all(|e| e.active));
            prop_assert!(engine.projectiles.iter().all(|p| p.active));

            let hp = health(&engine);
            prop_assert!((0..=100).contains(&hp));
            last_score = state.score;
        }
    }
}
