use std::f64::consts::PI;

use tracing::warn;

use super::solver_data::SolverData;
use super::validation::{distinct_bodies, finite_point, non_negative};
use super::Constraint;
use crate::error::{JointError, JointResult};
use crate::math::{Rot, Vec2};
use crate::objects::BodyState;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Keeps an anchor on each of two bodies at a fixed distance.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DistanceJointDef {
    pub body_a: usize,
    pub body_b: usize,
    /// Anchor on body A, relative to its origin.
    pub local_anchor_a: Vec2,
    /// Anchor on body B, relative to its origin.
    pub local_anchor_b: Vec2,
    /// Rest length between the anchors.
    pub length: f64,
    /// Zero gives a rigid rod; positive values a spring.
    pub frequency_hz: f64,
    pub damping_ratio: f64,
}

impl DistanceJointDef {
    pub fn new(
        body_a: usize,
        body_b: usize,
        local_anchor_a: Vec2,
        local_anchor_b: Vec2,
        length: f64,
    ) -> Self {
        Self {
            body_a,
            body_b,
            local_anchor_a,
            local_anchor_b,
            length,
            frequency_hz: 0.0,
            damping_ratio: 0.0,
        }
    }

    /// Connects two world points; the rest length is their current distance.
    pub fn between<A: BodyState, B: BodyState>(
        (index_a, body_a): (usize, &A),
        (index_b, body_b): (usize, &B),
        anchor_a: Vec2,
        anchor_b: Vec2,
    ) -> Self {
        let length = anchor_a.distance(anchor_b);
        if length <= f64::EPSILON {
            warn!(index_a, index_b, "distance joint anchors coincide");
        }
        Self::new(
            index_a,
            index_b,
            body_a.transform().apply_inverse(anchor_a),
            body_b.transform().apply_inverse(anchor_b),
            length,
        )
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
        distinct_bodies(self.body_a, self.body_b)?;
        finite_point("local_anchor_a", self.local_anchor_a)?;
        finite_point("local_anchor_b", self.local_anchor_b)?;
        non_negative("length", self.length)?;
        non_negative("frequency_hz", self.frequency_hz)?;
        non_negative("damping_ratio", self.damping_ratio)?;
        if self.frequency_hz == 0.0 && self.length == 0.0 {
            return Err(JointError::DegenerateLength);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct StepState {
    index_a: usize,
    index_b: usize,
    u: Vec2,
    r_a: Vec2,
    r_b: Vec2,
    local_center_a: Vec2,
    local_center_b: Vec2,
    inv_mass_a: f64,
    inv_mass_b: f64,
    inv_i_a: f64,
    inv_i_b: f64,
    mass: f64,
    gamma: f64,
    bias: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DistanceJoint {
    pub(crate) body_a: usize,
    pub(crate) body_b: usize,
    local_anchor_a: Vec2,
    local_anchor_b: Vec2,
    length: f64,
    frequency_hz: f64,
    damping_ratio: f64,
    impulse: f64,
    step: StepState,
}

impl DistanceJoint {
    pub fn new(def: &DistanceJointDef) -> JointResult<Self> {
        def.validate()?;
        Ok(Self {
            body_a: def.body_a,
            body_b: def.body_b,
            local_anchor_a: def.local_anchor_a,
            local_anchor_b: def.local_anchor_b,
            length: def.length,
            frequency_hz: def.frequency_hz,
            damping_ratio: def.damping_ratio,
            impulse: 0.0,
            step: StepState::default(),
        })
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn is_soft(&self) -> bool {
        self.frequency_hz > 0.0
    }

    /// Accumulated scalar impulse along the joint axis.
    pub fn impulse(&self) -> f64 {
        self.impulse
    }

    /// Applies `impulse` along `u` to both velocity buffers.
    fn apply(&self, data: &mut SolverData<'_>, p: Vec2) {
        let s = &self.step;
        let va = &mut data.velocities[s.index_a];
        va.v -= p * s.inv_mass_a;
        va.w -= s.inv_i_a * s.r_a.cross(p);
        let vb = &mut data.velocities[s.index_b];
        vb.v += p * s.inv_mass_b;
        vb.w += s.inv_i_b * s.r_b.cross(p);
    }
}

impl Constraint for DistanceJoint {
    fn body_a(&self) -> Option<usize> {
        Some(self.body_a)
    }

    fn body_b(&self) -> usize {
        self.body_b
    }

    fn init_velocity_constraints(&mut self, data: &mut SolverData<'_>) {
        let index_a = data.island_index(self.body_a);
        let index_b = data.island_index(self.body_b);
        let (a, b) = (data.bodies[index_a], data.bodies[index_b]);
        let (pa, pb) = (data.positions[index_a], data.positions[index_b]);
        let epsilon = data.settings.epsilon;

        let r_a = Rot::new(pa.a).mul(self.local_anchor_a - a.local_center);
        let r_b = Rot::new(pb.a).mul(self.local_anchor_b - b.local_center);
        let mut u = pb.c + r_b - pa.c - r_a;

        let current = u.length();
        if current > data.settings.linear_slop {
            u = u / current;
        } else {
            u = Vec2::ZERO;
        }

        let cr_a = r_a.cross(u);
        let cr_b = r_b.cross(u);
        let mut inv_mass = a.inv_mass + a.inv_inertia * cr_a * cr_a + b.inv_mass + b.inv_inertia * cr_b * cr_b;
        debug_assert!(
            self.frequency_hz > 0.0 || inv_mass > epsilon,
            "rigid distance joint between bodies {} and {} has no effective mass",
            self.body_a,
            self.body_b
        );
        let mut mass = if inv_mass != 0.0 { 1.0 / inv_mass } else { 0.0 };

        let (mut gamma, mut bias) = (0.0, 0.0);
        if self.frequency_hz > 0.0 {
            let c = current - self.length;
            let omega = 2.0 * PI * self.frequency_hz;
            let d = 2.0 * mass * self.damping_ratio * omega;
            let k = mass * omega * omega;
            let h = data.step.dt;

            let denominator = h * (d + h * k);
            gamma = if denominator > epsilon { 1.0 / denominator } else { 0.0 };
            bias = c * h * k * gamma;

            inv_mass += gamma;
            mass = if inv_mass != 0.0 { 1.0 / inv_mass } else { 0.0 };
        }

        self.step = StepState {
            index_a,
            index_b,
            u,
            r_a,
            r_b,
            local_center_a: a.local_center,
            local_center_b: b.local_center,
            inv_mass_a: a.inv_mass,
            inv_mass_b: b.inv_mass,
            inv_i_a: a.inv_inertia,
            inv_i_b: b.inv_inertia,
            mass,
            gamma,
            bias,
        };

        if data.step.warm_starting {
            self.impulse *= data.step.dt_ratio;
            self.apply(data, u * self.impulse);
        } else {
            self.impulse = 0.0;
        }
    }

    fn solve_velocity_constraints(&mut self, data: &mut SolverData<'_>) {
        let s = self.step;
        let va = data.velocities[s.index_a];
        let vb = data.velocities[s.index_b];

        let vp_a = va.v + Vec2::scalar_cross(va.w, s.r_a);
        let vp_b = vb.v + Vec2::scalar_cross(vb.w, s.r_b);
        let c_dot = s.u.dot(vp_b - vp_a);

        let impulse = -s.mass * (c_dot + s.bias + s.gamma * self.impulse);
        self.impulse += impulse;
        self.apply(data, s.u * impulse);
    }

    fn solve_position_constraints(&mut self, data: &mut SolverData<'_>) -> bool {
        if self.frequency_hz > 0.0 {
            return true;
        }
        let s = self.step;
        let settings = data.settings;
        let mut pa = data.positions[s.index_a];
        let mut pb = data.positions[s.index_b];

        let r_a = Rot::new(pa.a).mul(self.local_anchor_a - s.local_center_a);
        let r_b = Rot::new(pb.a).mul(self.local_anchor_b - s.local_center_b);
        let d = pb.c + r_b - pa.c - r_a;
        let current = d.length();
        let u = d.normalize();

        let c = (current - self.length).clamp(-settings.max_linear_correction, settings.max_linear_correction);
        let p = u * (-s.mass * c);

        pa.c -= p * s.inv_mass_a;
        pa.a -= s.inv_i_a * r_a.cross(p);
        pb.c += p * s.inv_mass_b;
        pb.a += s.inv_i_b * r_b.cross(p);

        data.positions[s.index_a] = pa;
        data.positions[s.index_b] = pb;

        c.abs() < settings.linear_slop
    }

    fn anchor_a<B: BodyState>(&self, bodies: &[B]) -> Vec2 {
        bodies[self.body_a].transform().apply(self.local_anchor_a)
    }

    fn anchor_b<B: BodyState>(&self, bodies: &[B]) -> Vec2 {
        bodies[self.body_b].transform().apply(self.local_anchor_b)
    }

    fn reaction_force(&self, inv_dt: f64) -> Vec2 {
        self.step.u * (self.impulse * inv_dt)
    }

    fn reaction_torque(&self, _inv_dt: f64) -> f64 {
        0.0
    }

    fn reset_impulse(&mut self) {
        self.impulse = 0.0;
    }
}
