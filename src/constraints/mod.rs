pub mod contact;
pub mod distance_joint;
pub mod mouse_joint;
pub mod pin_joint;
pub mod solver_data;
mod validation;

pub use contact::ContactConstraint;
pub use distance_joint::{DistanceJoint, DistanceJointDef};
pub use mouse_joint::{MouseJoint, MouseJointDef};
pub use pin_joint::{PinJoint, PinJointDef};
pub use solver_data::{BodySnapshot, Position, SolverData, TimeStep, Velocity};

use crate::error::JointResult;
use crate::math::Vec2;
use crate::objects::BodyState;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The per-step solving protocol shared by joints and contacts.
///
/// The island driver calls, in order: [`init_velocity_constraints`] once,
/// [`solve_velocity_constraints`] once per velocity iteration, then
/// [`solve_position_constraints`] once per position iteration after positions
/// have been integrated.
///
/// [`init_velocity_constraints`]: Constraint::init_velocity_constraints
/// [`solve_velocity_constraints`]: Constraint::solve_velocity_constraints
/// [`solve_position_constraints`]: Constraint::solve_position_constraints
pub trait Constraint {
    /// World index of the first body, if the constraint has one.
    fn body_a(&self) -> Option<usize>;

    /// World index of the second body.
    fn body_b(&self) -> usize;

    /// Caches per-step quantities and applies the warm-start impulse.
    fn init_velocity_constraints(&mut self, data: &mut SolverData<'_>);

    /// One relaxation pass over the velocity buffers.
    fn solve_velocity_constraints(&mut self, data: &mut SolverData<'_>);

    /// One correction pass over the position buffers. Returns true when the
    /// constraint is within tolerance.
    fn solve_position_constraints(&mut self, data: &mut SolverData<'_>) -> bool;

    /// World anchor on the first body (or the fixed anchor).
    fn anchor_a<B: BodyState>(&self, bodies: &[B]) -> Vec2;

    /// World anchor on the second body.
    fn anchor_b<B: BodyState>(&self, bodies: &[B]) -> Vec2;

    /// Force applied on the second body during the last step.
    fn reaction_force(&self, inv_dt: f64) -> Vec2;

    /// Torque applied on the second body during the last step.
    fn reaction_torque(&self, inv_dt: f64) -> f64;

    /// Clears warm-start state.
    fn reset_impulse(&mut self);

    fn is_attached_to(&self, body: usize) -> bool {
        self.body_a() == Some(body) || self.body_b() == body
    }
}

impl<T: Constraint> Constraint for &mut T {
    fn body_a(&self) -> Option<usize> {
        (**self).body_a()
    }

    fn body_b(&self) -> usize {
        (**self).body_b()
    }

    fn init_velocity_constraints(&mut self, data: &mut SolverData<'_>) {
        (**self).init_velocity_constraints(data)
    }

    fn solve_velocity_constraints(&mut self, data: &mut SolverData<'_>) {
        (**self).solve_velocity_constraints(data)
    }

    fn solve_position_constraints(&mut self, data: &mut SolverData<'_>) -> bool {
        (**self).solve_position_constraints(data)
    }

    fn anchor_a<B: BodyState>(&self, bodies: &[B]) -> Vec2 {
        (**self).anchor_a(bodies)
    }

    fn anchor_b<B: BodyState>(&self, bodies: &[B]) -> Vec2 {
        (**self).anchor_b(bodies)
    }

    fn reaction_force(&self, inv_dt: f64) -> Vec2 {
        (**self).reaction_force(inv_dt)
    }

    fn reaction_torque(&self, inv_dt: f64) -> f64 {
        (**self).reaction_torque(inv_dt)
    }

    fn reset_impulse(&mut self) {
        (**self).reset_impulse()
    }
}

/// Stable handle to a joint owned by a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JointId(pub usize);

/// Validated configuration for any joint kind.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum JointDef {
    Mouse(MouseJointDef),
    Distance(DistanceJointDef),
    Pin(PinJointDef),
}

impl JointDef {
    pub fn bodies(&self) -> (Option<usize>, usize) {
        match self {
            JointDef::Mouse(def) => (None, def.body),
            JointDef::Distance(def) => (Some(def.body_a), def.body_b),
            JointDef::Pin(def) => (Some(def.body_a), def.body_b),
        }
    }

    /// Validates the definition and builds the joint.
    pub fn build(&self) -> JointResult<Joint> {
        Ok(match self {
            JointDef::Mouse(def) => Joint::Mouse(MouseJoint::new(def)?),
            JointDef::Distance(def) => Joint::Distance(DistanceJoint::new(def)?),
            JointDef::Pin(def) => Joint::Pin(PinJoint::new(def)?),
        })
    }
}

impl From<MouseJointDef> for JointDef {
    fn from(def: MouseJointDef) -> Self {
        JointDef::Mouse(def)
    }
}

impl From<DistanceJointDef> for JointDef {
    fn from(def: DistanceJointDef) -> Self {
        JointDef::Distance(def)
    }
}

impl From<PinJointDef> for JointDef {
    fn from(def: PinJointDef) -> Self {
        JointDef::Pin(def)
    }
}

/// The closed family of user joints.
#[derive(Debug, Clone, PartialEq)]
pub enum Joint {
    Mouse(MouseJoint),
    Distance(DistanceJoint),
    Pin(PinJoint),
}

impl Joint {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Joint::Mouse(_) => "mouse",
            Joint::Distance(_) => "distance",
            Joint::Pin(_) => "pin",
        }
    }

    pub fn as_mouse(&self) -> Option<&MouseJoint> {
        match self {
            Joint::Mouse(joint) => Some(joint),
            _ => None,
        }
    }

    pub fn as_mouse_mut(&mut self) -> Option<&mut MouseJoint> {
        match self {
            Joint::Mouse(joint) => Some(joint),
            _ => None,
        }
    }

    /// Renumbers body references after the world removed body `removed`.
    pub(crate) fn shift_bodies_after(&mut self, removed: usize) {
        let shift = |index: &mut usize| {
            if *index > removed {
                *index -= 1;
            }
        };
        match self {
            Joint::Mouse(joint) => shift(&mut joint.body),
            Joint::Distance(joint) => {
                shift(&mut joint.body_a);
                shift(&mut joint.body_b);
            }
            Joint::Pin(joint) => {
                shift(&mut joint.body_a);
                shift(&mut joint.body_b);
            }
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $joint:ident => $body:expr) => {
        match $self {
            Joint::Mouse($joint) => $body,
            Joint::Distance($joint) => $body,
            Joint::Pin($joint) => $body,
        }
    };
}

impl Constraint for Joint {
    fn body_a(&self) -> Option<usize> {
        dispatch!(self, j => j.body_a())
    }

    fn body_b(&self) -> usize {
        dispatch!(self, j => j.body_b())
    }

    fn init_velocity_constraints(&mut self, data: &mut SolverData<'_>) {
        dispatch!(self, j => j.init_velocity_constraints(data))
    }

    fn solve_velocity_constraints(&mut self, data: &mut SolverData<'_>) {
        dispatch!(self, j => j.solve_velocity_constraints(data))
    }

    fn solve_position_constraints(&mut self, data: &mut SolverData<'_>) -> bool {
        dispatch!(self, j => j.solve_position_constraints(data))
    }

    fn anchor_a<B: BodyState>(&self, bodies: &[B]) -> Vec2 {
        dispatch!(self, j => j.anchor_a(bodies))
    }

    fn anchor_b<B: BodyState>(&self, bodies: &[B]) -> Vec2 {
        dispatch!(self, j => j.anchor_b(bodies))
    }

    fn reaction_force(&self, inv_dt: f64) -> Vec2 {
        dispatch!(self, j => j.reaction_force(inv_dt))
    }

    fn reaction_torque(&self, inv_dt: f64) -> f64 {
        dispatch!(self, j => j.reaction_torque(inv_dt))
    }

    fn reset_impulse(&mut self) {
        dispatch!(self, j => j.reset_impulse())
    }
}
