//! Spawn timers and placement rules
//!
//! Three independent timers accumulate frame time. When one reaches its rate
//! it fires once and drops back to zero; leftover time is discarded.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use super::entities::{Enemy, EnemyKind, PowerUpKind};
use super::state::Arena;
use crate::consts::*;
use crate::settings::Settings;

/// Which spawns came due this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpawnDue {
    pub enemy: bool,
    pub data_node: bool,
    pub power_up: bool,
}

/// Elapsed time (ms) since each kind last spawned
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpawnTimers {
    pub enemy: f32,
    pub data_node: f32,
    pub power_up: f32,
}

impl SpawnTimers {
    /// Accumulate `dt` and report what is due. The enemy timer only resets
    /// when there is room under the population cap; while the cap blocks it
    /// the timer keeps counting so an enemy appears as soon as room opens.
    pub fn advance(&mut self, dt: f32, settings: &Settings, enemy_count: usize) -> SpawnDue {
        let mut due = SpawnDue::default();

        self.enemy += dt;
        if self.enemy >= settings.enemy_spawn_rate && enemy_count < settings.max_enemies {
            due.enemy = true;
            self.enemy = 0.0;
        }

        self.data_node += dt;
        if self.data_node >= settings.data_node_spawn_rate {
            due.data_node = true;
            self.data_node = 0.0;
        }

        self.power_up += dt;
        if self.power_up >= settings.power_up_spawn_rate {
            due.power_up = true;
            self.power_up = 0.0;
        }

        due
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// New enemy just outside a random edge, with a random kind
pub fn spawn_enemy(arena: &Arena, base_speed: f32, rng: &mut Pcg32) -> Enemy {
    let offset = ENEMY_SPAWN_OFFSET;
    let pos = match rng.random_range(0..4) {
        0 => Vec2::new(rng.random::<f32>() * arena.width, -offset),
        1 => Vec2::new(arena.width + offset, rng.random::<f32>() * arena.height),
        2 => Vec2::new(rng.random::<f32>() * arena.width, arena.height + offset),
        _ => Vec2::new(-offset, rng.random::<f32>() * arena.height),
    };
    let kind = EnemyKind::ALL[rng.random_range(0..EnemyKind::ALL.len())];
    Enemy::new(kind, pos, base_speed, rng)
}

/// Uniform point at least [`SPAWN_MARGIN`] from every edge
fn inner_point(arena: &Arena, rng: &mut Pcg32) -> Vec2 {
    let span = (arena.size() - Vec2::splat(SPAWN_MARGIN * 2.0)).max(Vec2::ZERO);
    Vec2::new(
        SPAWN_MARGIN + rng.random::<f32>() * span.x,
        SPAWN_MARGIN + rng.random::<f32>() * span.y,
    )
}

/// Rejection-sample a data-node position away from the player and live
/// enemies. Gives up with `None` after [`DATA_NODE_ATTEMPTS`] tries.
pub fn place_data_node(
    arena: &Arena,
    player: Option<Vec2>,
    enemies: &[Enemy],
    rng: &mut Pcg32,
) -> Option<Vec2> {
    (0..DATA_NODE_ATTEMPTS).find_map(|_| {
        let candidate = inner_point(arena, rng);
        if player.is_some_and(|p| p.distance(candidate) < DATA_NODE_PLAYER_CLEARANCE) {
            return None;
        }
        let crowded = enemies
            .iter()
            .filter(|e| e.active)
            .any(|e| e.pos.distance(candidate) < DATA_NODE_ENEMY_CLEARANCE);
        (!crowded).then_some(candidate)
    })
}

/// Power-up position and kind; no rejection sampling
pub fn place_power_up(arena: &Arena, rng: &mut Pcg32) -> (Vec2, PowerUpKind) {
    let pos = inner_point(arena, rng);
    let kind = PowerUpKind::ALL[rng.random_range(0..PowerUpKind::ALL.len())];
    (pos, kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn arena() -> Arena {
        Arena::new(800.0, 600.0)
    }

    #[test]
    fn test_timer_resets_to_zero() {
        let settings = Settings::default();
        let mut timers = SpawnTimers::default();
        let due = timers.advance(2500.0, &settings, 0);
        assert!(due.enemy);
        // Remainder dropped, not carried
        assert_eq!(timers.enemy, 0.0);
        assert!(!due.data_node);
        assert_eq!(timers.data_node, 2500.0);
    }

    #[test]
    fn test_enemy_cap_holds_timer() {
        let settings = Settings::default();
        let mut timers = SpawnTimers::default();
        let due = timers.advance(2000.0, &settings, settings.max_enemies);
        assert!(!due.enemy);
        assert_eq!(timers.enemy, 2000.0);

        let due = timers.advance(16.0, &settings, settings.max_enemies - 1);
        assert!(due.enemy);
    }

    #[test]
    fn test_enemies_spawn_outside_edges() {
        let mut rng = Pcg32::seed_from_u64(3);
        let arena = arena();
        for _ in 0..100 {
            let enemy = spawn_enemy(&arena, 2.0, &mut rng);
            let p = enemy.pos;
            let on_edge = p.x == -ENEMY_SPAWN_OFFSET
                || p.x == arena.width + ENEMY_SPAWN_OFFSET
                || p.y == -ENEMY_SPAWN_OFFSET
                || p.y == arena.height + ENEMY_SPAWN_OFFSET;
            assert!(on_edge, "spawned inside at {p:?}");
        }
    }

    #[test]
    fn test_data_node_respects_clearance() {
        let mut rng = Pcg32::seed_from_u64(11);
        let arena = arena();
        let player = Vec2::new(400.0, 300.0);
        for _ in 0..50 {
            if let Some(p) = place_data_node(&arena, Some(player), &[], &mut rng) {
                assert!(p.distance(player) >= DATA_NODE_PLAYER_CLEARANCE);
                assert!(p.x >= SPAWN_MARGIN && p.x <= arena.width - SPAWN_MARGIN);
                assert!(p.y >= SPAWN_MARGIN && p.y <= arena.height - SPAWN_MARGIN);
            }
        }
    }

    #[test]
    fn test_data_node_gives_up_when_crowded() {
        let mut rng = Pcg32::seed_from_u64(5);
        // The whole sampling region is within reach of the player
        let tiny = Arena::new(200.0, 200.0);
        let placed = place_data_node(&tiny, Some(Vec2::new(100.0, 100.0)), &[], &mut rng);
        assert_eq!(placed, None);
    }

    #[test]
    fn test_power_up_inside_margin() {
        let mut rng = Pcg32::seed_from_u64(9);
        let arena = arena();
        for _ in 0..50 {
            let (p, _) = place_power_up(&arena, &mut rng);
            assert!(p.x >= SPAWN_MARGIN && p.x <= arena.width - SPAWN_MARGIN);
        }
    }
}
