pub mod rigid_body;

pub use rigid_body::{BodyType, RigidBody};

use crate::constraints::{BodySnapshot, Position, Velocity};
use crate::math::Transform;

/// Read/write contract between persistent body storage and the island solver.
///
/// The solver copies state out through the read accessors when an island is
/// loaded and hands results back through [`BodyState::write_back`] once the
/// step finishes. Nothing else mutates the body while an island is solved.
pub trait BodyState {
    fn body_type(&self) -> BodyType;

    /// Mass properties and external loads for one step.
    fn snapshot(&self) -> BodySnapshot;

    /// Center of mass and angle.
    fn solver_position(&self) -> Position;

    fn solver_velocity(&self) -> Velocity;

    /// Frame of the body origin.
    fn transform(&self) -> Transform;

    fn is_awake(&self) -> bool;

    /// Waking resets nothing; putting a body to sleep clears its velocity.
    fn set_awake(&mut self, awake: bool);

    /// Stores the solved position and velocity.
    fn write_back(&mut self, position: &Position, velocity: &Velocity);
}
