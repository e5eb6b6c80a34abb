//! Soft target joint: drags a point on one body toward a world target.
//!
//! The joint is a spring-damper, not a rigid equality. Each step it derives
//! stiffness and damping from the body mass, the spring frequency and the
//! damping ratio, and turns them into the soft-constraint pair:
//!
//! ```text
//! omega = 2 pi f        d = 2 m zeta omega        k = m omega^2
//! gamma = 1 / (h (d + h k))                       beta = h k gamma
//! ```
//!
//! The accumulated impulse is clamped to `h * max_force`, so the joint never
//! applies more than `max_force` however far the target jumps.

use std::f64::consts::PI;

use super::solver_data::SolverData;
use super::validation::{finite_point, non_negative};
use super::Constraint;
use crate::common::Scratch;
use crate::error::{JointError, JointResult};
use crate::math::{Mat22, Rot, Vec2};
use crate::objects::BodyState;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for a [`MouseJoint`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MouseJointDef {
    /// World index of the dragged body.
    pub body: usize,
    /// Dragged point, relative to the body origin.
    pub local_anchor: Vec2,
    /// World point the anchor is pulled toward.
    pub target: Vec2,
    /// Largest force the joint may apply. Zero makes the joint inert.
    pub max_force: f64,
    /// Spring frequency in Hz.
    pub frequency_hz: f64,
    /// 0 is undamped, 1 is critically damped.
    pub damping_ratio: f64,
}

impl MouseJointDef {
    /// Anchors the body origin and pulls it toward `target`.
    pub fn new(body: usize, target: Vec2) -> Self {
        Self {
            body,
            local_anchor: Vec2::ZERO,
            target,
            max_force: 0.0,
            frequency_hz: 5.0,
            damping_ratio: 0.7,
        }
    }

    /// Grabs `body` at the world point `point`: the anchor is the grabbed
    /// point and the target starts on top of it.
    pub fn grab<B: BodyState>(index: usize, body: &B, point: Vec2) -> Self {
        Self {
            local_anchor: body.transform().apply_inverse(point),
            ..Self::new(index, point)
        }
    }

    pub fn with_local_anchor(mut self, local_anchor: Vec2) -> Self {
        self.local_anchor = local_anchor;
        self
    }

    pub fn with_max_force(mut self, max_force: f64) -> Self {
        self.max_force = max_force;
        self
    }

    pub fn with_frequency(mut self, frequency_hz: f64) -> Self {
        self.frequency_hz = frequency_hz;
        self
    }

    pub fn with_damping_ratio(mut self, damping_ratio: f64) -> Self {
        self.damping_ratio = damping_ratio;
        self
    }

    pub fn validate(&self) -> JointResult<()> {
        if !self.target.is_valid() {
            return Err(JointError::NonFiniteTarget);
        }
        finite_point("local_anchor", self.local_anchor)?;
        non_negative("max_force", self.max_force)?;
        non_negative("frequency_hz", self.frequency_hz)?;
        non_negative("damping_ratio", self.damping_ratio)
    }
}

/// Quantities derived in init and reused by every velocity iteration.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct StepState {
    index: usize,
    r: Vec2,
    inv_mass: f64,
    inv_i: f64,
    mass: Mat22,
    c: Vec2,
    gamma: f64,
    beta: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MouseJoint {
    pub(crate) body: usize,
    local_anchor: Vec2,
    target: Vec2,
    max_force: f64,
    frequency_hz: f64,
    damping_ratio: f64,
    impulse: Vec2,
    step: StepState,
}

impl MouseJoint {
    pub fn new(def: &MouseJointDef) -> JointResult<Self> {
        def.validate()?;
        Ok(Self {
            body: def.body,
            local_anchor: def.local_anchor,
            target: def.target,
            max_force: def.max_force,
            frequency_hz: def.frequency_hz,
            damping_ratio: def.damping_ratio,
            impulse: Vec2::ZERO,
            step: StepState::default(),
        })
    }

    pub fn body(&self) -> usize {
        self.body
    }

    pub fn local_anchor(&self) -> Vec2 {
        self.local_anchor
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    /// Moves the target. Takes effect at the next init. Callers outside the
    /// crate go through `PhysicsWorld::set_mouse_target`, which also wakes
    /// the body.
    pub(crate) fn set_target(&mut self, target: Vec2) -> JointResult<()> {
        if !target.is_valid() {
            return Err(JointError::NonFiniteTarget);
        }
        self.target = target;
        Ok(())
    }

    pub fn max_force(&self) -> f64 {
        self.max_force
    }

    pub fn set_max_force(&mut self, max_force: f64) -> JointResult<()> {
        non_negative("max_force", max_force)?;
        self.max_force = max_force;
        Ok(())
    }

    pub fn frequency(&self) -> f64 {
        self.frequency_hz
    }

    pub fn set_frequency(&mut self, frequency_hz: f64) -> JointResult<()> {
        non_negative("frequency_hz", frequency_hz)?;
        self.frequency_hz = frequency_hz;
        Ok(())
    }

    pub fn damping_ratio(&self) -> f64 {
        self.damping_ratio
    }

    pub fn set_damping_ratio(&mut self, damping_ratio: f64) -> JointResult<()> {
        non_negative("damping_ratio", damping_ratio)?;
        self.damping_ratio = damping_ratio;
        Ok(())
    }

    /// Accumulated impulse of the last velocity solve.
    pub fn impulse(&self) -> Vec2 {
        self.impulse
    }

    /// Softness of the last init, in inverse mass.
    pub fn gamma(&self) -> f64 {
        self.step.gamma
    }

    /// Error reduction of the last init, in inverse time.
    pub fn beta(&self) -> f64 {
        self.step.beta
    }
}

impl Constraint for MouseJoint {
    fn body_a(&self) -> Option<usize> {
        None
    }

    fn body_b(&self) -> usize {
        self.body
    }

    fn init_velocity_constraints(&mut self, data: &mut SolverData<'_>) {
        let index = data.island_index(self.body);
        let body = data.bodies[index];
        let position = data.positions[index];
        let mut velocity = data.velocities[index];
        let h = data.step.dt;

        let omega = 2.0 * PI * self.frequency_hz;
        let d = 2.0 * body.mass * self.damping_ratio * omega;
        let k = body.mass * omega * omega;

        let denominator = h * (d + h * k);
        let gamma = if denominator > data.settings.epsilon {
            1.0 / denominator
        } else {
            0.0
        };
        let beta = h * k * gamma;

        let mut frame = data.pool.checkout();
        let Scratch { vec2, mat22, rot } = &mut *frame;

        rot[0] = Rot::new(position.a);
        vec2[0] = rot[0].mul(self.local_anchor - body.local_center);
        let r = vec2[0];

        let (m, i) = (body.inv_mass, body.inv_inertia);
        mat22[0].ex.x = m + i * r.y * r.y + gamma;
        mat22[0].ex.y = -i * r.x * r.y;
        mat22[0].ey.x = mat22[0].ex.y;
        mat22[0].ey.y = m + i * r.x * r.x + gamma;
        mat22[1] = mat22[0].inverse();

        vec2[1] = (position.c + r - self.target) * beta;

        velocity.w *= data.settings.mouse_angular_damping;

        if data.step.warm_starting {
            self.impulse *= data.step.dt_ratio;
            velocity.v += self.impulse * m;
            velocity.w += i * r.cross(self.impulse);
        } else {
            self.impulse = Vec2::ZERO;
        }

        self.step = StepState {
            index,
            r,
            inv_mass: m,
            inv_i: i,
            mass: mat22[1],
            c: vec2[1],
            gamma,
            beta,
        };
        drop(frame);

        data.velocities[index] = velocity;
    }

    fn solve_velocity_constraints(&mut self, data: &mut SolverData<'_>) {
        let StepState {
            index,
            r,
            inv_mass,
            inv_i,
            mass,
            c,
            gamma,
            ..
        } = self.step;
        let mut velocity = data.velocities[index];

        let mut frame = data.pool.checkout();
        let Scratch { vec2, .. } = &mut *frame;

        // Relative velocity of the anchor, then the soft impulse.
        vec2[0] = velocity.v + Vec2::scalar_cross(velocity.w, r);
        vec2[1] = mass.mul_vec(-(vec2[0] + c + self.impulse * gamma));

        vec2[2] = self.impulse;
        self.impulse += vec2[1];
        let max_impulse = data.step.dt * self.max_force;
        if self.impulse.length_squared() > max_impulse * max_impulse {
            self.impulse *= max_impulse / self.impulse.length();
        }
        vec2[1] = self.impulse - vec2[2];

        velocity.v += vec2[1] * inv_mass;
        velocity.w += inv_i * r.cross(vec2[1]);
        drop(frame);

        data.velocities[index] = velocity;
    }

    fn solve_position_constraints(&mut self, _data: &mut SolverData<'_>) -> bool {
        true
    }

    fn anchor_a<B: BodyState>(&self, _bodies: &[B]) -> Vec2 {
        self.target
    }

    fn anchor_b<B: BodyState>(&self, bodies: &[B]) -> Vec2 {
        bodies[self.body].transform().apply(self.local_anchor)
    }

    fn reaction_force(&self, inv_dt: f64) -> Vec2 {
        self.impulse * inv_dt
    }

    fn reaction_torque(&self, _inv_dt: f64) -> f64 {
        0.0
    }

    fn reset_impulse(&mut self) {
        self.impulse = Vec2::ZERO;
    }
}
