use crate::math::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Most points a 2D manifold carries.
pub const MAX_MANIFOLD_POINTS: usize = 2;

/// One contact point reported by collision detection.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ManifoldPoint {
    /// Midpoint between the two surfaces, in world coordinates.
    pub point: Vec2,
    /// Distance between the surfaces along the normal; negative when
    /// overlapping.
    pub separation: f64,
    /// Feature key, stable across steps while the same features touch.
    pub id: u32,
}

/// Contact between two bodies, as handed over by collision detection.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Manifold {
    pub body_a: usize,
    pub body_b: usize,
    /// World normal, pointing from body A towards body B.
    pub normal: Vec2,
    pub points: Vec<ManifoldPoint>,
}

impl Manifold {
    pub fn new(body_a: usize, body_b: usize, normal: Vec2) -> Self {
        Self {
            body_a,
            body_b,
            normal: normal.normalize(),
            points: Vec::with_capacity(MAX_MANIFOLD_POINTS),
        }
    }

    /// Adds a point; points beyond [`MAX_MANIFOLD_POINTS`] are ignored.
    pub fn with_point(mut self, point: Vec2, separation: f64, id: u32) -> Self {
        if self.points.len() < MAX_MANIFOLD_POINTS {
            self.points.push(ManifoldPoint { point, separation, id });
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
