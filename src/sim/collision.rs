//! Axis-aligned bounding-box overlap tests
//!
//! Every body is a box of its own width and height centered on its position,
//! the same point the renderer draws around and the arena clamps. The boxes
//! themselves are stored by their top-left corner. Touching edges count as
//! overlap.

use glam::Vec2;

use super::entities::{DataNode, Enemy, PowerUp, Projectile};
use super::player::Player;

/// Axis-aligned box anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    pub fn centered(center: Vec2, size: Vec2) -> Self {
        Self::new(center - size * 0.5, size)
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// Extents intersect on both axes
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let (a_max, b_max) = (self.max(), other.max());
        self.min.x <= b_max.x
            && a_max.x >= other.min.x
            && self.min.y <= b_max.y
            && a_max.y >= other.min.y
    }
}

/// Anything with a collision box
pub trait Bounded {
    fn bounds(&self) -> Aabb;
}

impl Bounded for Aabb {
    fn bounds(&self) -> Aabb {
        *self
    }
}

macro_rules! impl_bounded {
    ($($ty:ty),*) => {
        $(impl Bounded for $ty {
            fn bounds(&self) -> Aabb {
                Aabb::centered(self.pos, self.size)
            }
        })*
    };
}

impl_bounded!(Player, Enemy, DataNode, PowerUp, Projectile);

/// Symmetric overlap test between two bodies
pub fn check_collision<A: Bounded + ?Sized, B: Bounded + ?Sized>(a: &A, b: &B) -> bool {
    a.bounds().overlaps(&b.bounds())
}
