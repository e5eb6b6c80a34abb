//! Non-penetration and Coulomb friction for one contact manifold.
//!
//! Contact points are stored as body-local anchors, one on each surface, so
//! the position pass can recompute separation after bodies move. Impulses
//! persist across steps and are matched to new manifolds by feature id.

use super::solver_data::SolverData;
use super::Constraint;
use crate::collision::Manifold;
use crate::math::{Rot, Vec2};
use crate::objects::BodyState;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct ContactPoint {
    id: u32,
    /// Surface point on A, relative to A's origin.
    local_a: Vec2,
    /// Surface point on B, relative to B's origin.
    local_b: Vec2,
    normal_impulse: f64,
    tangent_impulse: f64,

    // Per step
    r_a: Vec2,
    r_b: Vec2,
    normal_mass: f64,
    tangent_mass: f64,
    velocity_bias: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct StepState {
    index_a: usize,
    index_b: usize,
    normal: Vec2,
    local_center_a: Vec2,
    local_center_b: Vec2,
    inv_mass_a: f64,
    inv_mass_b: f64,
    inv_i_a: f64,
    inv_i_b: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContactConstraint {
    pub(crate) body_a: usize,
    pub(crate) body_b: usize,
    /// Normal in A's frame.
    local_normal: Vec2,
    friction: f64,
    restitution: f64,
    points: Vec<ContactPoint>,
    step: StepState,
}

impl ContactConstraint {
    /// Builds a constraint from a manifold against the bodies' current frames.
    pub fn new<A: BodyState, B: BodyState>(
        manifold: &Manifold,
        body_a: &A,
        body_b: &B,
        friction: f64,
        restitution: f64,
    ) -> Self {
        let xf_a = body_a.transform();
        let xf_b = body_b.transform();
        let n = manifold.normal;
        let points = manifold
            .points
            .iter()
            .map(|mp| {
                let half = n * (0.5 * mp.separation);
                ContactPoint {
                    id: mp.id,
                    local_a: xf_a.apply_inverse(mp.point - half),
                    local_b: xf_b.apply_inverse(mp.point + half),
                    ..Default::default()
                }
            })
            .collect();

        Self {
            body_a: manifold.body_a,
            body_b: manifold.body_b,
            local_normal: xf_a.q.mul_t(n),
            friction,
            restitution,
            points,
            step: StepState::default(),
        }
    }

    /// Stored normal rotated into world space for the given angle of A.
    pub fn world_normal(&self, angle_a: f64) -> Vec2 {
        Rot::new(angle_a).mul(self.local_normal)
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn friction(&self) -> f64 {
        self.friction
    }

    pub fn restitution(&self) -> f64 {
        self.restitution
    }

    /// Accumulated normal impulses, one per point.
    pub fn normal_impulses(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.normal_impulse).collect()
    }

    /// Accumulated friction impulses, one per point.
    pub fn tangent_impulses(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.tangent_impulse).collect()
    }

    /// Copies accumulated impulses from last step's constraint for every
    /// point whose feature id persists. Returns the number of matches.
    ///
    /// The pair may be reported in either order. Swapping the bodies also
    /// flips the normal and tangent, so the accumulated scalars carry over
    /// unchanged.
    pub fn carry_impulses(&mut self, previous: &ContactConstraint) -> usize {
        let same = previous.body_a == self.body_a && previous.body_b == self.body_b;
        let swapped = previous.body_a == self.body_b && previous.body_b == self.body_a;
        if !(same || swapped) {
            return 0;
        }
        let mut matched = 0;
        for point in &mut self.points {
            if let Some(old) = previous.points.iter().find(|old| old.id == point.id) {
                point.normal_impulse = old.normal_impulse;
                point.tangent_impulse = old.tangent_impulse;
                matched += 1;
            }
        }
        matched
    }

    /// Renumbers body references after the world removed body `removed`.
    pub(crate) fn shift_bodies_after(&mut self, removed: usize) {
        if self.body_a > removed {
            self.body_a -= 1;
        }
        if self.body_b > removed {
            self.body_b -= 1;
        }
    }

    fn apply(data: &mut SolverData<'_>, s: &StepState, r_a: Vec2, r_b: Vec2, p: Vec2) {
        let va = &mut data.velocities[s.index_a];
        va.v -= p * s.inv_mass_a;
        va.w -= s.inv_i_a * r_a.cross(p);
        let vb = &mut data.velocities[s.index_b];
        vb.v += p * s.inv_mass_b;
        vb.w += s.inv_i_b * r_b.cross(p);
    }

    fn world_points<B: BodyState>(&self, bodies: &[B], on_a: bool) -> Vec2 {
        if self.points.is_empty() {
            return Vec2::ZERO;
        }
        let sum = self.points.iter().fold(Vec2::ZERO, |acc, p| {
            acc + if on_a {
                bodies[self.body_a].transform().apply(p.local_a)
            } else {
                bodies[self.body_b].transform().apply(p.local_b)
            }
        });
        sum / self.points.len() as f64
    }
}

impl Constraint for ContactConstraint {
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
        let (va, vb) = (data.velocities[index_a], data.velocities[index_b]);
        let threshold = data.settings.velocity_threshold;

        let xf_a = pa.transform(a.local_center);
        let xf_b = pb.transform(b.local_center);
        let normal = xf_a.q.mul(self.local_normal);
        let tangent = normal.cross_scalar(1.0);

        let s = StepState {
            index_a,
            index_b,
            normal,
            local_center_a: a.local_center,
            local_center_b: b.local_center,
            inv_mass_a: a.inv_mass,
            inv_mass_b: b.inv_mass,
            inv_i_a: a.inv_inertia,
            inv_i_b: b.inv_inertia,
        };
        let (m_a, m_b, i_a, i_b) = (s.inv_mass_a, s.inv_mass_b, s.inv_i_a, s.inv_i_b);

        for point in &mut self.points {
            let world = (xf_a.apply(point.local_a) + xf_b.apply(point.local_b)) * 0.5;
            point.r_a = world - pa.c;
            point.r_b = world - pb.c;

            let rn_a = point.r_a.cross(normal);
            let rn_b = point.r_b.cross(normal);
            let k_normal = m_a + m_b + i_a * rn_a * rn_a + i_b * rn_b * rn_b;
            debug_assert!(
                k_normal > data.settings.epsilon,
                "contact between bodies {} and {} has no effective mass",
                self.body_a,
                self.body_b
            );
            point.normal_mass = if k_normal > 0.0 { 1.0 / k_normal } else { 0.0 };

            let rt_a = point.r_a.cross(tangent);
            let rt_b = point.r_b.cross(tangent);
            let k_tangent = m_a + m_b + i_a * rt_a * rt_a + i_b * rt_b * rt_b;
            point.tangent_mass = if k_tangent > 0.0 { 1.0 / k_tangent } else { 0.0 };

            let dv = vb.v + Vec2::scalar_cross(vb.w, point.r_b) - va.v - Vec2::scalar_cross(va.w, point.r_a);
            let v_rel = normal.dot(dv);
            point.velocity_bias = if v_rel < -threshold {
                -self.restitution * v_rel
            } else {
                0.0
            };
        }
        self.step = s;

        if data.step.warm_starting {
            for point in &mut self.points {
                point.normal_impulse *= data.step.dt_ratio;
                point.tangent_impulse *= data.step.dt_ratio;
                let p = normal * point.normal_impulse + tangent * point.tangent_impulse;
                Self::apply(data, &s, point.r_a, point.r_b, p);
            }
        } else {
            for point in &mut self.points {
                point.normal_impulse = 0.0;
                point.tangent_impulse = 0.0;
            }
        }
    }

    fn solve_velocity_constraints(&mut self, data: &mut SolverData<'_>) {
        let s = self.step;
        let normal = s.normal;
        let tangent = normal.cross_scalar(1.0);

        let relative = |data: &SolverData<'_>, r_a: Vec2, r_b: Vec2| {
            let va = data.velocities[s.index_a];
            let vb = data.velocities[s.index_b];
            vb.v + Vec2::scalar_cross(vb.w, r_b) - va.v - Vec2::scalar_cross(va.w, r_a)
        };

        // Friction first: its bound depends on the normal impulse.
        for point in &mut self.points {
            let vt = relative(data, point.r_a, point.r_b).dot(tangent);
            let lambda = -point.tangent_mass * vt;
            let max_friction = self.friction * point.normal_impulse;
            let accumulated = (point.tangent_impulse + lambda).clamp(-max_friction, max_friction);
            let lambda = accumulated - point.tangent_impulse;
            point.tangent_impulse = accumulated;
            Self::apply(data, &s, point.r_a, point.r_b, tangent * lambda);
        }

        for point in &mut self.points {
            let vn = relative(data, point.r_a, point.r_b).dot(normal);
            let lambda = -point.normal_mass * (vn - point.velocity_bias);
            let accumulated = (point.normal_impulse + lambda).max(0.0);
            let lambda = accumulated - point.normal_impulse;
            point.normal_impulse = accumulated;
            Self::apply(data, &s, point.r_a, point.r_b, normal * lambda);
        }
    }

    fn solve_position_constraints(&mut self, data: &mut SolverData<'_>) -> bool {
        let s = self.step;
        let settings = data.settings;
        let mut min_separation = 0.0_f64;

        for point in &self.points {
            let mut pa = data.positions[s.index_a];
            let mut pb = data.positions[s.index_b];
            let xf_a = pa.transform(s.local_center_a);
            let xf_b = pb.transform(s.local_center_b);

            let normal = xf_a.q.mul(self.local_normal);
            let world_a = xf_a.apply(point.local_a);
            let world_b = xf_b.apply(point.local_b);
            let separation = (world_b - world_a).dot(normal);
            let world = (world_a + world_b) * 0.5;
            let r_a = world - pa.c;
            let r_b = world - pb.c;

            min_separation = min_separation.min(separation);

            let c = (settings.baumgarte * (separation + settings.linear_slop))
                .clamp(-settings.max_linear_correction, 0.0);

            let rn_a = r_a.cross(normal);
            let rn_b = r_b.cross(normal);
            let k = s.inv_mass_a + s.inv_mass_b + s.inv_i_a * rn_a * rn_a + s.inv_i_b * rn_b * rn_b;
            let impulse = if k > 0.0 { -c / k } else { 0.0 };
            let p = normal * impulse;

            pa.c -= p * s.inv_mass_a;
            pa.a -= s.inv_i_a * r_a.cross(p);
            pb.c += p * s.inv_mass_b;
            pb.a += s.inv_i_b * r_b.cross(p);

            data.positions[s.index_a] = pa;
            data.positions[s.index_b] = pb;
        }

        min_separation >= -3.0 * settings.linear_slop
    }

    /// Mean contact point on A's surface.
    fn anchor_a<B: BodyState>(&self, bodies: &[B]) -> Vec2 {
        self.world_points(bodies, true)
    }

    /// Mean contact point on B's surface.
    fn anchor_b<B: BodyState>(&self, bodies: &[B]) -> Vec2 {
        self.world_points(bodies, false)
    }

    fn reaction_force(&self, inv_dt: f64) -> Vec2 {
        let normal = self.step.normal;
        let tangent = normal.cross_scalar(1.0);
        self.points.iter().fold(Vec2::ZERO, |acc, p| {
            acc + (normal * p.normal_impulse + tangent * p.tangent_impulse) * inv_dt
        })
    }

    fn reaction_torque(&self, _inv_dt: f64) -> f64 {
        0.0
    }

    fn reset_impulse(&mut self) {
        for point in &mut self.points {
            point.normal_impulse = 0.0;
            point.tangent_impulse = 0.0;
        }
    }
}
