//! A 2D rigid-body constraint solver.
//!
//! Bodies live in a [`PhysicsWorld`]; joints ([`Joint`]) and contacts
//! ([`ContactConstraint`]) between them are resolved with sequential impulses
//! and warm starting. Each step groups bodies into islands and runs every
//! island through the same pipeline: constraint init, velocity iterations,
//! position integration, position iterations, write back.
//!
//! ```
//! use physics_solver::{MouseJointDef, PhysicsWorld, RigidBody, Vec2};
//!
//! let mut world = PhysicsWorld::new().with_gravity(Vec2::ZERO);
//! let body = world.add_body(RigidBody::new_dynamic(1.0, 1.0));
//! let drag = world
//!     .create_joint(MouseJointDef::new(body, Vec2::new(1.0, 0.0)).with_max_force(1000.0))
//!     .unwrap();
//!
//! for _ in 0..120 {
//!     world.step(1.0 / 60.0).unwrap();
//! }
//! assert!((world.bodies[body].position - Vec2::new(1.0, 0.0)).length() < 1e-2);
//! # let _ = drag;
//! ```

pub mod collision;
pub mod common;
pub mod constraints;
pub mod error;
pub mod integration;
pub mod math;
pub mod objects;
pub mod world;

// Re-export key types for easier use
pub use collision::{Manifold, ManifoldPoint};
pub use common::{Material, ScratchPool, SolverSettings};
pub use constraints::{
    Constraint, ContactConstraint, DistanceJoint, DistanceJointDef, Joint, JointDef, JointId, MouseJoint,
    MouseJointDef, PinJoint, PinJointDef, TimeStep,
};
pub use error::{JointError, JointResult, WorldError, WorldResult};
pub use math::{Mat22, Rot, Transform, Vec2};
pub use objects::{BodyState, BodyType, RigidBody};
pub use world::{IslandSolver, PhysicsWorld, StepReport};
