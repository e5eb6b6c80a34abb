use tracing::warn;

use super::BodyState;
use crate::common::Material;
use crate::constraints::{BodySnapshot, Position, Velocity};
use crate::math::{Transform, Vec2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How a body participates in the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BodyType {
    /// Never moves; infinite mass.
    Static,
    /// Moves with its velocity; unaffected by forces and constraints.
    Kinematic,
    /// Fully simulated.
    #[default]
    Dynamic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    pub body_type: BodyType,
    pub material: Material,

    // Primary state
    pub position: Vec2, // World position of the body origin
    pub rotation: f64,  // Radians
    pub local_center_of_mass: Vec2,
    pub linear_velocity: Vec2, // Velocity of the center of mass
    pub angular_velocity: f64,

    // Accumulators, cleared after every step
    pub force: Vec2,
    pub torque: f64,

    pub mass: f64,
    pub inv_mass: f64,
    pub inertia: f64, // About the center of mass
    pub inv_inertia: f64,

    pub linear_damping: f64,
    pub angular_damping: f64,
    pub gravity_scale: f64,

    awake: bool,
}

impl RigidBody {
    /// Creates a dynamic body at the origin with explicit mass and rotational
    /// inertia about its center of mass.
    ///
    /// A non-positive mass falls back to unit mass; a non-positive inertia
    /// gives a body that cannot rotate.
    pub fn new_dynamic(mass: f64, inertia: f64) -> Self {
        let mass = if mass > 0.0 && mass.is_finite() {
            mass
        } else {
            warn!(requested = mass, "dynamic body created with non-positive mass, using 1.0");
            1.0
        };
        let (inertia, inv_inertia) = if inertia > 0.0 && inertia.is_finite() {
            (inertia, 1.0 / inertia)
        } else {
            (0.0, 0.0)
        };

        Self {
            mass,
            inv_mass: 1.0 / mass,
            inertia,
            inv_inertia,
            ..Self::with_type(BodyType::Dynamic)
        }
    }

    /// Creates a static body with its origin at `position`.
    pub fn new_static(position: Vec2, rotation: f64) -> Self {
        Self {
            position,
            rotation,
            ..Self::with_type(BodyType::Static)
        }
    }

    /// Creates a kinematic body with its origin at `position`.
    pub fn new_kinematic(position: Vec2, rotation: f64) -> Self {
        Self {
            position,
            rotation,
            ..Self::with_type(BodyType::Kinematic)
        }
    }

    fn with_type(body_type: BodyType) -> Self {
        Self {
            body_type,
            material: Material::default(),
            position: Vec2::ZERO,
            rotation: 0.0,
            local_center_of_mass: Vec2::ZERO,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            force: Vec2::ZERO,
            torque: 0.0,
            mass: 0.0,
            inv_mass: 0.0,
            inertia: 0.0,
            inv_inertia: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            gravity_scale: 1.0,
            awake: true,
        }
    }

    pub fn with_position(mut self, position: Vec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_local_center(mut self, local_center: Vec2) -> Self {
        self.local_center_of_mass = local_center;
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn with_damping(mut self, linear: f64, angular: f64) -> Self {
        self.linear_damping = linear;
        self.angular_damping = angular;
        self
    }

    pub fn is_static(&self) -> bool {
        self.body_type == BodyType::Static
    }

    /// World position of the center of mass.
    pub fn center(&self) -> Vec2 {
        self.transform().apply(self.local_center_of_mass)
    }

    pub fn world_point(&self, local: Vec2) -> Vec2 {
        self.transform().apply(local)
    }

    pub fn local_point(&self, world: Vec2) -> Vec2 {
        self.transform().apply_inverse(world)
    }

    /// Applies a force at the center of mass.
    pub fn apply_force(&mut self, force: Vec2) {
        if self.body_type != BodyType::Dynamic {
            return;
        }
        self.force += force;
        self.awake = true;
    }

    /// Applies a force at a world point, generating torque about the center.
    pub fn apply_force_at_point(&mut self, force: Vec2, point_world: Vec2) {
        if self.body_type != BodyType::Dynamic {
            return;
        }
        self.force += force;
        self.torque += (point_world - self.center()).cross(force);
        self.awake = true;
    }

    /// Immediately changes velocity by an impulse applied at a world point.
    pub fn apply_linear_impulse(&mut self, impulse: Vec2, point_world: Vec2) {
        if self.body_type != BodyType::Dynamic {
            return;
        }
        self.linear_velocity += impulse * self.inv_mass;
        self.angular_velocity += self.inv_inertia * (point_world - self.center()).cross(impulse);
        self.awake = true;
    }

    pub fn clear_accumulators(&mut self) {
        self.force = Vec2::ZERO;
        self.torque = 0.0;
    }
}

impl BodyState for RigidBody {
    fn body_type(&self) -> BodyType {
        self.body_type
    }

    fn snapshot(&self) -> BodySnapshot {
        BodySnapshot {
            body_type: self.body_type,
            mass: self.mass,
            inv_mass: self.inv_mass,
            inv_inertia: self.inv_inertia,
            local_center: self.local_center_of_mass,
            force: self.force,
            torque: self.torque,
            linear_damping: self.linear_damping,
            angular_damping: self.angular_damping,
            gravity_scale: self.gravity_scale,
        }
    }

    fn solver_position(&self) -> Position {
        Position {
            c: self.center(),
            a: self.rotation,
        }
    }

    fn solver_velocity(&self) -> Velocity {
        Velocity {
            v: self.linear_velocity,
            w: self.angular_velocity,
        }
    }

    fn transform(&self) -> Transform {
        Transform::new(self.position, self.rotation)
    }

    fn is_awake(&self) -> bool {
        self.awake
    }

    fn set_awake(&mut self, awake: bool) {
        if self.body_type == BodyType::Static {
            return;
        }
        self.awake = awake;
        if !awake {
            self.linear_velocity = Vec2::ZERO;
            self.angular_velocity = 0.0;
            self.clear_accumulators();
        }
    }

    fn write_back(&mut self, position: &Position, velocity: &Velocity) {
        if self.body_type == BodyType::Static {
            return;
        }
        let xf = Transform::from_center(position.c, position.a, self.local_center_of_mass);
        self.position = xf.p;
        self.rotation = position.a;
        self.linear_velocity = velocity.v;
        self.angular_velocity = velocity.w;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;
    const EPSILON: f64 = 1e-10;

    #[test]
    fn test_new_dynamic() {
        let rb = RigidBody::new_dynamic(10.0, 20.0);
        assert_eq!(rb.body_type, BodyType::Dynamic);
        assert_eq!(rb.mass, 10.0);
        assert!((rb.inv_mass - 0.1).abs() < EPSILON);
        assert!((rb.inv_inertia - 0.05).abs() < EPSILON);
        assert_eq!(rb.position, Vec2::ZERO);
        assert!(rb.is_awake());
    }

    #[test]
    fn test_new_dynamic_bad_mass_falls_back() {
        let rb = RigidBody::new_dynamic(0.0, 0.0);
        assert_eq!(rb.mass, 1.0);
        assert_eq!(rb.inv_mass, 1.0);
        assert_eq!(rb.inv_inertia, 0.0);
    }

    #[test]
    fn test_new_static() {
        let rb = RigidBody::new_static(Vec2::new(1.0, 2.0), 0.5);
        assert!(rb.is_static());
        assert_eq!(rb.inv_mass, 0.0);
        assert_eq!(rb.inv_inertia, 0.0);
        assert_eq!(rb.position, Vec2::new(1.0, 2.0));
        assert_eq!(rb.rotation, 0.5);
    }

    #[test]
    fn test_center_with_offset_local_center() {
        let rb = RigidBody::new_dynamic(1.0, 1.0)
            .with_position(Vec2::new(2.0, 0.0))
            .with_rotation(FRAC_PI_2)
            .with_local_center(Vec2::new(1.0, 0.0));
        let c = rb.center();
        assert!((c - Vec2::new(2.0, 1.0)).length() < EPSILON);
    }

    #[test]
    fn test_apply_force_at_point_uses_center() {
        let mut rb = RigidBody::new_dynamic(1.0, 1.0).with_position(Vec2::new(5.0, 5.0));
        rb.apply_force_at_point(Vec2::new(0.0, 10.0), Vec2::new(6.0, 5.0));
        assert_eq!(rb.force, Vec2::new(0.0, 10.0));
        // r = (1, 0), torque = r x F = 10
        assert!((rb.torque - 10.0).abs() < EPSILON);
        rb.clear_accumulators();
        assert_eq!(rb.force, Vec2::ZERO);
        assert_eq!(rb.torque, 0.0);
    }

    #[test]
    fn test_static_ignores_forces_and_impulses() {
        let mut rb = RigidBody::new_static(Vec2::ZERO, 0.0);
        rb.apply_force(Vec2::new(1.0, 0.0));
        rb.apply_linear_impulse(Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0));
        assert_eq!(rb.force, Vec2::ZERO);
        assert_eq!(rb.linear_velocity, Vec2::ZERO);
    }

    #[test]
    fn test_apply_linear_impulse() {
        let mut rb = RigidBody::new_dynamic(2.0, 0.5);
        rb.apply_linear_impulse(Vec2::new(4.0, 0.0), Vec2::new(0.0, 1.0));
        assert_eq!(rb.linear_velocity, Vec2::new(2.0, 0.0));
        // r = (0, 1), r x J = -4, w = -4 * 2
        assert!((rb.angular_velocity - -8.0).abs() < EPSILON);
    }

    #[test]
    fn test_sleep_clears_velocity_and_wake_restores_flag() {
        let mut rb = RigidBody::new_dynamic(1.0, 1.0);
        rb.linear_velocity = Vec2::new(1.0, 1.0);
        rb.angular_velocity = 2.0;
        rb.set_awake(false);
        assert!(!rb.is_awake());
        assert_eq!(rb.linear_velocity, Vec2::ZERO);
        assert_eq!(rb.angular_velocity, 0.0);
        rb.set_awake(true);
        assert!(rb.is_awake());
    }

    #[test]
    fn test_write_back_converts_center_to_origin() {
        let mut rb = RigidBody::new_dynamic(1.0, 1.0).with_local_center(Vec2::new(1.0, 0.0));
        let position = Position {
            c: Vec2::new(3.0, 3.0),
            a: FRAC_PI_2,
        };
        let velocity = Velocity {
            v: Vec2::new(1.0, 0.0),
            w: 0.5,
        };
        rb.write_back(&position, &velocity);
        assert!((rb.position - Vec2::new(3.0, 2.0)).length() < EPSILON);
        assert!((rb.center() - position.c).length() < EPSILON);
        assert_eq!(rb.linear_velocity, velocity.v);
        assert_eq!(rb.angular_velocity, 0.5);
    }

    #[test]
    fn test_snapshot_round_trips_state() {
        let mut rb = RigidBody::new_dynamic(4.0, 2.0).with_damping(0.1, 0.2);
        rb.apply_force(Vec2::new(1.0, 0.0));
        let s = rb.snapshot();
        assert_eq!(s.mass, 4.0);
        assert_eq!(s.inv_mass, 0.25);
        assert_eq!(s.inv_inertia, 0.5);
        assert_eq!(s.force, Vec2::new(1.0, 0.0));
        assert_eq!(s.linear_damping, 0.1);
        assert_eq!(s.angular_damping, 0.2);
    }
}
