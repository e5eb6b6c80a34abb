use super::solver_data::SolverData;
use super::validation::{distinct_bodies, finite_point};
use super::Constraint;
use crate::error::{JointError, JointResult};
use crate::math::{Mat22, Rot, Vec2};
use crate::objects::BodyState;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Forces two anchor points (one on each body) to coincide while leaving
/// relative rotation free.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PinJointDef {
    pub body_a: usize,
    pub body_b: usize,
    /// Anchor on body A, relative to its origin.
    pub local_anchor_a: Vec2,
    /// Anchor on body B, relative to its origin.
    pub local_anchor_b: Vec2,
    /// Angle of B relative to A that counts as a joint angle of zero.
    pub reference_angle: f64,
}

impl PinJointDef {
    pub fn new(body_a: usize, body_b: usize, local_anchor_a: Vec2, local_anchor_b: Vec2) -> Self {
        Self {
            body_a,
            body_b,
            local_anchor_a,
            local_anchor_b,
            reference_angle: 0.0,
        }
    }

    /// Pins two bodies at a shared world point, taking the current relative
    /// angle as the reference.
    pub fn at<A: BodyState, B: BodyState>(
        (index_a, body_a): (usize, &A),
        (index_b, body_b): (usize, &B),
        anchor: Vec2,
    ) -> Self {
        Self {
            reference_angle: body_b.solver_position().a - body_a.solver_position().a,
            ..Self::new(
                index_a,
                index_b,
                body_a.transform().apply_inverse(anchor),
                body_b.transform().apply_inverse(anchor),
            )
        }
    }

    pub fn with_reference_angle(mut self, reference_angle: f64) -> Self {
        self.reference_angle = reference_angle;
        self
    }

    pub fn validate(&self) -> JointResult<()> {
        distinct_bodies(self.body_a, self.body_b)?;
        finite_point("local_anchor_a", self.local_anchor_a)?;
        finite_point("local_anchor_b", self.local_anchor_b)?;
        if !self.reference_angle.is_finite() {
            return Err(JointError::NonFiniteParameter {
                name: "reference_angle",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct StepState {
    index_a: usize,
    index_b: usize,
    r_a: Vec2,
    r_b: Vec2,
    local_center_a: Vec2,
    local_center_b: Vec2,
    inv_mass_a: f64,
    inv_mass_b: f64,
    inv_i_a: f64,
    inv_i_b: f64,
    k: Mat22,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PinJoint {
    pub(crate) body_a: usize,
    pub(crate) body_b: usize,
    local_anchor_a: Vec2,
    local_anchor_b: Vec2,
    reference_angle: f64,
    impulse: Vec2,
    step: StepState,
}

/// Point-to-point effective mass for anchor offsets `r_a` and `r_b`.
fn point_mass(m_a: f64, m_b: f64, i_a: f64, i_b: f64, r_a: Vec2, r_b: Vec2) -> Mat22 {
    let off = -i_a * r_a.x * r_a.y - i_b * r_b.x * r_b.y;
    Mat22::from_columns(
        Vec2::new(m_a + m_b + i_a * r_a.y * r_a.y + i_b * r_b.y * r_b.y, off),
        Vec2::new(off, m_a + m_b + i_a * r_a.x * r_a.x + i_b * r_b.x * r_b.x),
    )
}

impl PinJoint {
    pub fn new(def: &PinJointDef) -> JointResult<Self> {
        def.validate()?;
        Ok(Self {
            body_a: def.body_a,
            body_b: def.body_b,
            local_anchor_a: def.local_anchor_a,
            local_anchor_b: def.local_anchor_b,
            reference_angle: def.reference_angle,
            impulse: Vec2::ZERO,
            step: StepState::default(),
        })
    }

    pub fn reference_angle(&self) -> f64 {
        self.reference_angle
    }

    pub fn impulse(&self) -> Vec2 {
        self.impulse
    }

    /// Current angle of B relative to A, minus the reference angle.
    pub fn joint_angle<B: BodyState>(&self, bodies: &[B]) -> f64 {
        bodies[self.body_b].solver_position().a - bodies[self.body_a].solver_position().a - self.reference_angle
    }
}

impl Constraint for PinJoint {
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

        let mut frame = data.pool.checkout();
        frame.rot[0] = Rot::new(data.positions[index_a].a);
        frame.rot[1] = Rot::new(data.positions[index_b].a);
        let r_a = frame.rot[0].mul(self.local_anchor_a - a.local_center);
        let r_b = frame.rot[1].mul(self.local_anchor_b - b.local_center);
        drop(frame);

        self.step = StepState {
            index_a,
            index_b,
            r_a,
            r_b,
            local_center_a: a.local_center,
            local_center_b: b.local_center,
            inv_mass_a: a.inv_mass,
            inv_mass_b: b.inv_mass,
            inv_i_a: a.inv_inertia,
            inv_i_b: b.inv_inertia,
            k: point_mass(a.inv_mass, b.inv_mass, a.inv_inertia, b.inv_inertia, r_a, r_b),
        };
        debug_assert!(
            self.step.k.determinant() > data.settings.epsilon,
            "pin joint between bodies {} and {} has no effective mass",
            self.body_a,
            self.body_b
        );

        if data.step.warm_starting {
            self.impulse *= data.step.dt_ratio;
            let p = self.impulse;
            let s = &self.step;
            let va = &mut data.velocities[index_a];
            va.v -= p * s.inv_mass_a;
            va.w -= s.inv_i_a * r_a.cross(p);
            let vb = &mut data.velocities[index_b];
            vb.v += p * s.inv_mass_b;
            vb.w += s.inv_i_b * r_b.cross(p);
        } else {
            self.impulse = Vec2::ZERO;
        }
    }

    fn solve_velocity_constraints(&mut self, data: &mut SolverData<'_>) {
        let s = self.step;
        let mut va = data.velocities[s.index_a];
        let mut vb = data.velocities[s.index_b];

        let c_dot = vb.v + Vec2::scalar_cross(vb.w, s.r_b) - va.v - Vec2::scalar_cross(va.w, s.r_a);
        let impulse = s.k.solve(-c_dot);
        self.impulse += impulse;

        va.v -= impulse * s.inv_mass_a;
        va.w -= s.inv_i_a * s.r_a.cross(impulse);
        vb.v += impulse * s.inv_mass_b;
        vb.w += s.inv_i_b * s.r_b.cross(impulse);

        data.velocities[s.index_a] = va;
        data.velocities[s.index_b] = vb;
    }

    fn solve_position_constraints(&mut self, data: &mut SolverData<'_>) -> bool {
        let s = self.step;
        let mut pa = data.positions[s.index_a];
        let mut pb = data.positions[s.index_b];

        let mut frame = data.pool.checkout();
        frame.rot[0] = Rot::new(pa.a);
        frame.rot[1] = Rot::new(pb.a);
        let r_a = frame.rot[0].mul(self.local_anchor_a - s.local_center_a);
        let r_b = frame.rot[1].mul(self.local_anchor_b - s.local_center_b);

        frame.vec2[0] = pb.c + r_b - pa.c - r_a;
        let error = frame.vec2[0].length();

        frame.mat22[0] = point_mass(s.inv_mass_a, s.inv_mass_b, s.inv_i_a, s.inv_i_b, r_a, r_b);
        let impulse = -frame.mat22[0].solve(frame.vec2[0]);
        drop(frame);

        pa.c -= impulse * s.inv_mass_a;
        pa.a -= s.inv_i_a * r_a.cross(impulse);
        pb.c += impulse * s.inv_mass_b;
        pb.a += s.inv_i_b * r_b.cross(impulse);

        data.positions[s.index_a] = pa;
        data.positions[s.index_b] = pb;

        error <= data.settings.linear_slop
    }

    fn anchor_a<B: BodyState>(&self, bodies: &[B]) -> Vec2 {
        bodies[self.body_a].transform().apply(self.local_anchor_a)
    }

    fn anchor_b<B: BodyState>(&self, bodies: &[B]) -> Vec2 {
        bodies[self.body_b].transform().apply(self.local_anchor_b)
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
