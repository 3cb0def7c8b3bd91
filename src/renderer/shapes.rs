//! Outline generation for 2D primitives
//!
//! Everything is produced in world space: a local shape is rotated by the
//! body's angle and translated to its position before it reaches the canvas.

use glam::Vec2;
use std::f32::consts::{FRAC_PI_4, TAU};

/// Map a local point into world space
pub fn place(local: Vec2, center: Vec2, rotation: f32) -> Vec2 {
    center + Vec2::from_angle(rotation).rotate(local)
}

fn place_all(points: &[Vec2], center: Vec2, rotation: f32) -> Vec<Vec2> {
    points.iter().map(|&p| place(p, center, rotation)).collect()
}

/// Evenly spaced vertices on a circle, first vertex on the local +x axis
pub fn regular_polygon(center: Vec2, radius: f32, sides: u32, rotation: f32) -> Vec<Vec2> {
    (0..sides)
        .map(|i| {
            let theta = (i as f32 / sides as f32) * TAU;
            place(Vec2::new(radius * theta.cos(), radius * theta.sin()), center, rotation)
        })
        .collect()
}

/// Player hull: ten points with every third pulled in
pub fn avatar(center: Vec2, radius: f32, rotation: f32) -> Vec<Vec2> {
    const SEGMENTS: u32 = 10;
    (0..SEGMENTS)
        .map(|i| {
            let theta = (i as f32 / SEGMENTS as f32) * TAU;
            let r = if i % 3 == 0 { radius * 0.8 } else { radius };
            place(Vec2::new(r * theta.cos(), r * theta.sin()), center, rotation)
        })
        .collect()
}

/// Struts across the hull joining opposite avatar vertices
pub fn avatar_struts(hull: &[Vec2]) -> Vec<(Vec2, Vec2)> {
    let half = hull.len() / 2;
    (0..half)
        .step_by(2)
        .map(|i| (hull[i], hull[i + half]))
        .collect()
}

/// Thruster nozzles behind the hull (the ship faces local -y)
pub fn thrusters(center: Vec2, radius: f32, rotation: f32) -> [Vec2; 2] {
    [
        place(Vec2::new(-radius * 0.7, radius * 0.9), center, rotation),
        place(Vec2::new(radius * 0.7, radius * 0.9), center, rotation),
    ]
}

/// Arrowhead pointing along local +x
pub fn dart(center: Vec2, half: f32, rotation: f32) -> Vec<Vec2> {
    place_all(
        &[
            Vec2::new(half, 0.0),
            Vec2::new(-half, half),
            Vec2::new(-half, -half),
        ],
        center,
        rotation,
    )
}

pub fn square(center: Vec2, half: f32, rotation: f32) -> Vec<Vec2> {
    place_all(
        &[
            Vec2::new(-half, -half),
            Vec2::new(half, -half),
            Vec2::new(half, half),
            Vec2::new(-half, half),
        ],
        center,
        rotation,
    )
}

pub fn diamond(center: Vec2, half: f32, rotation: f32) -> Vec<Vec2> {
    place_all(
        &[
            Vec2::new(0.0, -half),
            Vec2::new(half, 0.0),
            Vec2::new(0.0, half),
            Vec2::new(-half, 0.0),
        ],
        center,
        rotation,
    )
}

/// Crest outline for the shield pickup
pub fn crest(center: Vec2, half: f32, rotation: f32) -> Vec<Vec2> {
    place_all(
        &[
            Vec2::new(0.0, -half),
            Vec2::new(half, -half / 3.0),
            Vec2::new(half, half / 2.0),
            Vec2::new(0.0, half),
            Vec2::new(-half, half / 2.0),
            Vec2::new(-half, -half / 3.0),
        ],
        center,
        rotation,
    )
}

/// Lightning bolt for the speed pickup
pub fn bolt(center: Vec2, half: f32, rotation: f32) -> Vec<Vec2> {
    place_all(
        &[
            Vec2::new(-half / 4.0, -half),
            Vec2::new(half / 2.0, -half / 4.0),
            Vec2::new(0.0, 0.0),
            Vec2::new(half / 2.0, 0.0),
            Vec2::new(-half / 4.0, half),
            Vec2::new(0.0, half / 4.0),
            Vec2::new(-half / 2.0, 0.0),
        ],
        center,
        rotation,
    )
}

/// Line segments from the center outwards, `count` evenly spaced
pub fn spokes(center: Vec2, radius: f32, count: u32, rotation: f32) -> Vec<(Vec2, Vec2)> {
    (0..count)
        .map(|i| {
            let theta = rotation + (i as f32 / count as f32) * TAU;
            (center, center + Vec2::from_angle(theta) * radius)
        })
        .collect()
}

/// Two diagonals of a square, as an X
pub fn cross(center: Vec2, half: f32, rotation: f32) -> [(Vec2, Vec2); 2] {
    let d = half / 2.0;
    [
        (
            place(Vec2::new(-d, -d), center, rotation),
            place(Vec2::new(d, d), center, rotation),
        ),
        (
            place(Vec2::new(d, -d), center, rotation),
            place(Vec2::new(-d, d), center, rotation),
        ),
    ]
}

/// Data node spokes sit on the diagonals
pub fn diagonal_spokes(center: Vec2, radius: f32, rotation: f32) -> Vec<(Vec2, Vec2)> {
    spokes(center, radius, 4, rotation + FRAC_PI_4)
}

/// Opacity along a trail, head first
pub fn trail_alpha(index: usize, len: usize) -> f32 {
    if len == 0 {
        return 0.0;
    }
    (1.0 - index as f32 / len as f32) * 0.6
}

/// Blink opacity while invulnerable
pub fn blink_alpha(clock_ms: f64) -> f32 {
    ((clock_ms * 0.01).sin() * 0.5 + 0.5) as f32
}
