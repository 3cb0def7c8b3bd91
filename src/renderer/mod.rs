//! Frame drawing
//!
//! [`draw_frame`] walks the engine's entities back to front and issues
//! primitive calls on a [`Canvas`]. The browser backend wraps a 2D canvas
//! context; tests use a recorder.

pub mod shapes;

#[cfg(target_arch = "wasm32")]
pub mod canvas2d;

#[cfg(target_arch = "wasm32")]
pub use canvas2d::Canvas2d;

use glam::Vec2;

use crate::sim::GameEngine;
use crate::sim::entities::{
    DataNode, Enemy, EnemyKind, Particle, PowerUp, PowerUpKind, Projectile, palette,
};
use crate::sim::player::Player;

/// Grid cell size in pixels
pub const GRID_SPACING: f32 = 40.0;
/// Objective bar placement
pub const OBJECTIVE_BAR_POS: Vec2 = Vec2::new(20.0, 20.0);
pub const OBJECTIVE_BAR_SIZE: Vec2 = Vec2::new(200.0, 10.0);
pub const OBJECTIVE_TEXT_POS: Vec2 = Vec2::new(20.0, 50.0);

const BLACK: u32 = 0x000000;
const DARK_GREEN: u32 = 0x004010;
const DARK_RED: u32 = 0x400000;
const FAST_PINK: u32 = 0xff0066;
/// Enemy hull outlines thicken by 1px per this much rated damage
const DAMAGE_PER_OUTLINE_PX: f32 = 12.5;

/// Immediate-mode drawing surface. Colors are 0xRRGGBB.
pub trait Canvas {
    /// Global opacity for subsequent calls
    fn set_alpha(&mut self, alpha: f32);
    fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: u32);
    fn fill_polygon(&mut self, points: &[Vec2], color: u32);
    fn stroke_path(&mut self, points: &[Vec2], closed: bool, color: u32, width: f32);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: u32);
    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: u32, width: f32);
    fn text(&mut self, text: &str, pos: Vec2, color: u32, size_px: f32);

    fn stroke_line(&mut self, from: Vec2, to: Vec2, color: u32, width: f32) {
        self.stroke_path(&[from, to], false, color, width);
    }

    fn stroke_segments(&mut self, segments: &[(Vec2, Vec2)], color: u32, width: f32) {
        for &(from, to) in segments {
            self.stroke_line(from, to, color, width);
        }
    }

    /// Filled shape with an outline
    fn outlined(&mut self, points: &[Vec2], fill: u32, stroke: u32, width: f32) {
        self.fill_polygon(points, fill);
        self.stroke_path(points, true, stroke, width);
    }
}

/// Draw everything for the current frame
pub fn draw_frame(engine: &GameEngine, canvas: &mut impl Canvas) {
    let size = engine.arena().size();

    // Translucent black leaves a faint smear of the previous frame
    canvas.set_alpha(0.7);
    canvas.fill_rect(Vec2::ZERO, size, BLACK);
    canvas.set_alpha(1.0);

    draw_grid(canvas, size);

    for node in engine.data_nodes.iter().filter(|n| n.active) {
        draw_data_node(canvas, node);
    }
    for power_up in engine.power_ups.iter().filter(|p| p.active) {
        draw_power_up(canvas, power_up);
    }
    if let Some(player) = engine.player.as_ref().filter(|p| p.alive) {
        draw_player(canvas, player, engine.clock_ms());
    }
    for enemy in engine.enemies.iter().filter(|e| e.active) {
        draw_enemy(canvas, enemy);
    }
    for projectile in engine.projectiles.iter().filter(|p| p.active) {
        draw_projectile(canvas, projectile);
    }
    for particle in engine.particles.iter().filter(|p| p.active) {
        draw_particle(canvas, particle);
    }

    draw_objective(canvas, engine);
}

fn draw_grid(canvas: &mut impl Canvas, size: Vec2) {
    canvas.set_alpha(0.2);
    let mut x = 0.0;
    while x < size.x {
        canvas.stroke_line(Vec2::new(x, 0.0), Vec2::new(x, size.y), palette::GREEN, 1.0);
        x += GRID_SPACING;
    }
    let mut y = 0.0;
    while y < size.y {
        canvas.stroke_line(Vec2::new(0.0, y), Vec2::new(size.x, y), palette::GREEN, 1.0);
        y += GRID_SPACING;
    }
    canvas.set_alpha(1.0);
}

fn draw_objective(canvas: &mut impl Canvas, engine: &GameEngine) {
    let required = engine.settings.data_nodes_for_next_level;
    let progress = engine.progression.progress(&engine.settings);

    canvas.set_alpha(0.5);
    canvas.fill_rect(OBJECTIVE_BAR_POS, OBJECTIVE_BAR_SIZE, BLACK);
    canvas.set_alpha(1.0);
    canvas.fill_rect(
        OBJECTIVE_BAR_POS,
        Vec2::new(OBJECTIVE_BAR_SIZE.x * progress, OBJECTIVE_BAR_SIZE.y),
        palette::GREEN,
    );
    canvas.text(
        &format!("Data: {}/{}", engine.collected_data_nodes(), required),
        OBJECTIVE_TEXT_POS,
        palette::WHITE,
        12.0,
    );
}

fn draw_player(canvas: &mut impl Canvas, player: &Player, clock_ms: f64) {
    if player.trail.len() >= 2 {
        let len = player.trail.len();
        for (i, pair) in player.trail.windows(2).enumerate() {
            canvas.set_alpha(shapes::trail_alpha(i, len));
            canvas.stroke_line(pair[0], pair[1], palette::GREEN, 3.0);
        }
    }

    let alpha = if player.stealth.active {
        0.4
    } else if player.is_invulnerable() {
        shapes::blink_alpha(clock_ms)
    } else {
        1.0
    };
    canvas.set_alpha(alpha);

    let radius = player.size.x / 2.0;
    let hull = shapes::avatar(player.pos, radius, player.rotation);
    canvas.outlined(&hull, DARK_GREEN, palette::GREEN, 2.0);
    canvas.stroke_segments(&shapes::avatar_struts(&hull), palette::GREEN, 1.0);
    canvas.fill_circle(player.pos, 4.0, palette::GREEN);

    if player.shield.active {
        canvas.stroke_circle(player.pos, radius + 5.0, palette::CYAN, 3.0);
    }

    if player.thrusting {
        let color = if player.is_boosting() { palette::CYAN } else { palette::GREEN };
        for nozzle in shapes::thrusters(player.pos, radius, player.rotation) {
            canvas.fill_circle(nozzle, 4.0, color);
        }
    }
    canvas.set_alpha(1.0);
}

fn draw_enemy(canvas: &mut impl Canvas, enemy: &Enemy) {
    let half = enemy.size.x / 2.0;
    let color = enemy.kind.color();
    let outline = 1.0 + enemy.damage as f32 / DAMAGE_PER_OUTLINE_PX;

    match enemy.kind {
        EnemyKind::Basic => {
            let hex = shapes::regular_polygon(enemy.pos, half, 6, enemy.spin);
            canvas.outlined(&hex, DARK_RED, color, outline);

            let core = half * 0.4 * (0.8 + enemy.pulse.value * 0.2);
            canvas.fill_circle(enemy.pos, core, color);
            canvas.set_alpha(0.5);
            canvas.stroke_segments(
                &shapes::spokes(enemy.pos, half, 3, enemy.spin),
                palette::WHITE,
                1.0,
            );
            canvas.set_alpha(1.0);
        }
        EnemyKind::Fast => {
            let dart = shapes::dart(enemy.pos, half, enemy.heading);
            canvas.outlined(&dart, DARK_RED, FAST_PINK, outline);
            canvas.fill_circle(enemy.pos, half / 3.0, FAST_PINK);
        }
        EnemyKind::Heavy => {
            let body = shapes::square(enemy.pos, half, enemy.spin);
            canvas.outlined(&body, color, palette::RED, outline);
            canvas.stroke_segments(&shapes::cross(enemy.pos, half, enemy.spin), palette::RED, 2.0);
        }
    }
}

fn draw_data_node(canvas: &mut impl Canvas, node: &DataNode) {
    let size = node.size.x * (0.8 + node.pulse.value * 0.2);

    canvas.set_alpha(0.1 + node.pulse.value * 0.2);
    canvas.fill_circle(node.pos, size, palette::GREEN);
    canvas.set_alpha(1.0);

    let outline = shapes::diamond(node.pos, size / 2.0, node.rotation);
    canvas.outlined(&outline, DARK_GREEN, palette::GREEN, 1.0);
    canvas.fill_circle(node.pos, size / 4.0, palette::WHITE);
    canvas.stroke_segments(
        &shapes::diagonal_spokes(node.pos, size / 2.0, node.rotation),
        palette::GREEN,
        1.0,
    );
}

fn draw_power_up(canvas: &mut impl Canvas, power_up: &PowerUp) {
    let size = power_up.size.x;
    let half = size / 2.0;
    let color = power_up.kind.color();

    canvas.set_alpha(0.2 + power_up.pulse.value * 0.3);
    canvas.fill_circle(power_up.pos, size * 1.2, color);
    canvas.set_alpha(1.0);

    match power_up.kind {
        PowerUpKind::Stealth => {
            canvas.stroke_circle(power_up.pos, half, color, 2.0);
            canvas.fill_circle(power_up.pos, half / 3.0, color);
            canvas.fill_circle(
                power_up.pos + Vec2::new(half / 6.0, -half / 6.0),
                half / 10.0,
                palette::WHITE,
            );
        }
        PowerUpKind::Shield => {
            let crest = shapes::crest(power_up.pos, half, power_up.rotation);
            canvas.outlined(&crest, BLACK, color, 2.0);
            canvas.stroke_segments(
                &shapes::spokes(power_up.pos, half / 2.0, 4, power_up.rotation),
                palette::WHITE,
                2.0,
            );
        }
        PowerUpKind::SpeedBoost => {
            let bolt = shapes::bolt(power_up.pos, half, power_up.rotation);
            canvas.outlined(&bolt, color, palette::WHITE, 1.0);
        }
    }
}

fn draw_projectile(canvas: &mut impl Canvas, projectile: &Projectile) {
    if projectile.tail.len() > 1 {
        canvas.stroke_path(&projectile.tail, false, projectile.color, 2.0);
    }
    let radius = projectile.size.x / 2.0;
    canvas.fill_circle(projectile.pos, radius + 2.0, projectile.color);
    canvas.fill_circle(projectile.pos, radius, palette::WHITE);
}

fn draw_particle(canvas: &mut impl Canvas, particle: &Particle) {
    canvas.set_alpha(particle.life_fraction());
    canvas.fill_circle(particle.pos, particle.size, particle.color);
    canvas.set_alpha(1.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Collaborators;
    use crate::sim::EngineConfig;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Alpha(f32),
        Rect(Vec2, Vec2, u32),
        Polygon(usize, u32),
        Path(usize, u32),
        Circle(Vec2, u32),
        Ring(Vec2, f32, u32),
        Text(String, Vec2),
    }

    #[derive(Default)]
    struct Recorder {
        ops: Vec<Op>,
        closed_strokes: Vec<(u32, f32)>,
    }

    impl Canvas for Recorder {
        fn set_alpha(&mut self, alpha: f32) {
            self.ops.push(Op::Alpha(alpha));
        }
        fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: u32) {
            self.ops.push(Op::Rect(pos, size, color));
        }
        fn fill_polygon(&mut self, points: &[Vec2], color: u32) {
            self.ops.push(Op::Polygon(points.len(), color));
        }
        fn stroke_path(&mut self, points: &[Vec2], closed: bool, color: u32, width: f32) {
            self.ops.push(Op::Path(points.len(), color));
            if closed {
                self.closed_strokes.push((color, width));
            }
        }
        fn fill_circle(&mut self, center: Vec2, _radius: f32, color: u32) {
            self.ops.push(Op::Circle(center, color));
        }
        fn stroke_circle(&mut self, center: Vec2, radius: f32, color: u32, _width: f32) {
            self.ops.push(Op::Ring(center, radius, color));
        }
        fn text(&mut self, text: &str, pos: Vec2, _color: u32, _size_px: f32) {
            self.ops.push(Op::Text(text.to_string(), pos));
        }
    }

    fn engine() -> GameEngine {
        let mut engine = GameEngine::new(EngineConfig::new(400.0, 300.0).with_seed(3), Collaborators::none());
        engine.init();
        engine
    }

    #[test]
    fn test_objective_text_and_bar() {
        let mut engine = engine();
        engine.progression.collected = 5;
        let mut canvas = Recorder::default();
        draw_frame(&engine, &mut canvas);

        assert!(canvas
            .ops
            .contains(&Op::Text("Data: 5/10".to_string(), OBJECTIVE_TEXT_POS)));
        assert!(canvas.ops.contains(&Op::Rect(
            OBJECTIVE_BAR_POS,
            Vec2::new(100.0, 10.0),
            palette::GREEN
        )));
    }

    #[test]
    fn test_grid_covers_arena() {
        let engine = engine();
        let mut canvas = Recorder::default();
        draw_frame(&engine, &mut canvas);

        let grid_lines = canvas
            .ops
            .iter()
            .filter(|op| matches!(op, Op::Path(2, c) if *c == palette::GREEN))
            .count();
        // 10 columns + 8 rows at 40px; the player hull adds its own strokes
        assert!(grid_lines >= 18);
    }

    #[test]
    fn test_shield_draws_ring() {
        let mut engine = engine();
        let player = engine.player.as_mut().expect("init creates the player");
        player.shield.active = true;
        let pos = player.pos;
        let radius = player.size.x / 2.0 + 5.0;

        let mut canvas = Recorder::default();
        draw_frame(&engine, &mut canvas);
        assert!(canvas.ops.contains(&Op::Ring(pos, radius, palette::CYAN)));
    }

    #[test]
    fn test_stealth_dims_player() {
        let mut engine = engine();
        engine
            .player
            .as_mut()
            .expect("init creates the player")
            .stealth
            .active = true;
        let mut canvas = Recorder::default();
        draw_frame(&engine, &mut canvas);
        assert!(canvas.ops.contains(&Op::Alpha(0.4)));
    }

    #[test]
    fn test_enemy_outline_follows_damage() {
        let mut engine = engine();
        let mut rng = Pcg32::seed_from_u64(1);
        engine
            .enemies
            .push(Enemy::new(EnemyKind::Heavy, Vec2::new(100.0, 100.0), 0.0, &mut rng));
        engine
            .enemies
            .push(Enemy::new(EnemyKind::Fast, Vec2::new(300.0, 100.0), 0.0, &mut rng));
        let mut canvas = Recorder::default();
        draw_frame(&engine, &mut canvas);

        let width_of = |color: u32| {
            canvas
                .closed_strokes
                .iter()
                .find(|(c, _)| *c == color)
                .map(|(_, w)| *w)
        };
        let heavy = width_of(palette::RED).expect("heavy hull drawn");
        let fast = width_of(FAST_PINK).expect("fast hull drawn");
        assert!((heavy - 3.0).abs() < 1e-5);
        assert!((fast - 1.8).abs() < 1e-5);
    }

    #[test]
    fn test_inactive_entities_are_skipped() {
        let mut engine = engine();
        engine.start();
        for node in engine.data_nodes.iter_mut() {
            node.active = false;
        }
        let mut canvas = Recorder::default();
        draw_frame(&engine, &mut canvas);
        assert!(!canvas.ops.iter().any(|op| matches!(op, Op::Circle(_, c) if *c == palette::WHITE)));
    }

    #[test]
    fn test_nothing_for_missing_player() {
        let engine = GameEngine::new(EngineConfig::new(400.0, 300.0), Collaborators::none());
        let mut canvas = Recorder::default();
        draw_frame(&engine, &mut canvas);
        assert!(!canvas.ops.iter().any(|op| matches!(op, Op::Polygon(10, _))));
    }
}
