//! Surface properties mixed into contact constraints.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Surface response of a body in contact.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Material {
    /// Coefficient of restitution (bounciness). Range [0, 1].
    pub restitution: f64,
    /// Coulomb friction coefficient. Range [0, infinity).
    pub friction: f64,
}

impl Material {
    pub fn new(restitution: f64, friction: f64) -> Self {
        Material {
            restitution: restitution.clamp(0.0, 1.0),
            friction: friction.max(0.0),
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Material {
            restitution: 0.0,
            friction: 0.2,
        }
    }
}

/// Friction of a contact pair: geometric mean, so a frictionless surface
/// makes the pair frictionless.
pub fn mix_friction(a: &Material, b: &Material) -> f64 {
    (a.friction * b.friction).sqrt()
}

/// Restitution of a contact pair: the bouncier surface wins.
pub fn mix_restitution(a: &Material, b: &Material) -> f64 {
    a.restitution.max(b.restitution)
}
