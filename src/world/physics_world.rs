use std::collections::HashMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, warn};

use super::island::{IslandReport, IslandSolver};
use super::islands::{build_islands, Island};
use crate::collision::Manifold;
use crate::common::{mix_friction, mix_restitution, SolverSettings};
use crate::constraints::{Constraint, ContactConstraint, Joint, JointDef, JointId, MouseJoint, TimeStep};
use crate::error::{JointError, WorldError, WorldResult};
use crate::math::Vec2;
use crate::objects::{BodyState, BodyType, RigidBody};

#[derive(Debug, Clone)]
struct JointEntry {
    id: JointId,
    joint: Joint,
}

/// Summary of one [`PhysicsWorld::step`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    pub dt: f64,
    pub dt_ratio: f64,
    pub islands: Vec<IslandReport>,
}

impl StepReport {
    pub fn island_count(&self) -> usize {
        self.islands.len()
    }

    /// True when every island finished its position iterations in tolerance.
    pub fn position_solved(&self) -> bool {
        self.islands.iter().all(|island| island.position_solved)
    }
}

/// Borrowed constraints of one island.
struct IslandWork<'a> {
    bodies: Vec<usize>,
    joints: Vec<&'a mut Joint>,
    contacts: Vec<&'a mut ContactConstraint>,
}

/// Owns bodies and constraints and advances them in time.
pub struct PhysicsWorld {
    pub bodies: Vec<RigidBody>,
    pub gravity: Vec2,
    pub settings: SolverSettings,
    joints: Vec<JointEntry>,
    // Submitted for the next step
    contacts: Vec<ContactConstraint>,
    // Solved in the last step, kept for warm starting
    previous_contacts: Vec<ContactConstraint>,
    next_joint_id: usize,
    inv_dt0: f64,
    solvers: Vec<IslandSolver>,
}

impl PhysicsWorld {
    /// Creates an empty world with standard gravity and default settings.
    pub fn new() -> Self {
        Self {
            bodies: Vec::new(),
            gravity: Vec2::new(0.0, -9.81),
            settings: SolverSettings::default(),
            joints: Vec::new(),
            contacts: Vec::new(),
            previous_contacts: Vec::new(),
            next_joint_id: 0,
            inv_dt0: 0.0,
            solvers: Vec::new(),
        }
    }

    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_settings(mut self, settings: SolverSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Adds a rigid body to the world and returns its index.
    pub fn add_body(&mut self, body: RigidBody) -> usize {
        let index = self.bodies.len();
        self.bodies.push(body);
        index
    }

    /// Convenience method to add a static body. Returns its index.
    pub fn add_static_body(&mut self, position: Vec2, rotation: f64) -> usize {
        self.add_body(RigidBody::new_static(position, rotation))
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Contacts submitted for the next step.
    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    fn check_body(&self, index: usize) -> Result<&RigidBody, JointError> {
        self.bodies.get(index).ok_or(JointError::BodyOutOfRange {
            index,
            count: self.bodies.len(),
        })
    }

    /// Validates `def` against the world's bodies and adds the joint.
    ///
    /// The attached bodies are woken.
    pub fn create_joint(&mut self, def: impl Into<JointDef>) -> WorldResult<JointId> {
        let def = def.into();
        let (body_a, body_b) = def.bodies();

        let b_type = self.check_body(body_b)?.body_type;
        match (&def, body_a) {
            (JointDef::Mouse(_), _) => {
                if b_type != BodyType::Dynamic {
                    return Err(JointError::NoDynamicBody.into());
                }
            }
            (_, Some(a)) => {
                let a_type = self.check_body(a)?.body_type;
                if a_type != BodyType::Dynamic && b_type != BodyType::Dynamic {
                    return Err(JointError::NoDynamicBody.into());
                }
            }
            (_, None) => {}
        }

        let joint = def.build()?;
        let id = JointId(self.next_joint_id);
        self.next_joint_id += 1;

        if let Some(a) = body_a {
            self.bodies[a].set_awake(true);
        }
        self.bodies[body_b].set_awake(true);

        debug!(?id, kind = joint.kind_name(), ?body_a, body_b, "joint created");
        self.joints.push(JointEntry { id, joint });
        Ok(id)
    }

    fn position_of(&self, id: JointId) -> WorldResult<usize> {
        self.joints
            .iter()
            .position(|entry| entry.id == id)
            .ok_or(WorldError::UnknownJoint(id))
    }

    /// Removes a joint and wakes the bodies it held.
    pub fn destroy_joint(&mut self, id: JointId) -> WorldResult<Joint> {
        let position = self.position_of(id)?;
        let JointEntry { joint, .. } = self.joints.remove(position);
        if let Some(a) = joint.body_a() {
            self.bodies[a].set_awake(true);
        }
        self.bodies[joint.body_b()].set_awake(true);
        debug!(?id, "joint destroyed");
        Ok(joint)
    }

    /// Removes a body together with every joint and contact attached to it.
    ///
    /// Bodies after `index` shift down by one, as in `Vec::remove`; joint and
    /// contact references are renumbered to match. Joint ids stay valid.
    pub fn destroy_body(&mut self, index: usize) -> WorldResult<RigidBody> {
        if index >= self.bodies.len() {
            return Err(WorldError::BodyOutOfRange {
                index,
                count: self.bodies.len(),
            });
        }

        let before = self.joints.len();
        self.joints.retain(|entry| !entry.joint.is_attached_to(index));
        if self.joints.len() != before {
            debug!(index, removed = before - self.joints.len(), "joints destroyed with body");
        }
        self.contacts.retain(|c| !c.is_attached_to(index));
        self.previous_contacts.clear();

        let body = self.bodies.remove(index);
        for entry in &mut self.joints {
            entry.joint.shift_bodies_after(index);
        }
        for contact in &mut self.contacts {
            contact.shift_bodies_after(index);
        }
        Ok(body)
    }

    pub fn joint(&self, id: JointId) -> WorldResult<&Joint> {
        let position = self.position_of(id)?;
        Ok(&self.joints[position].joint)
    }

    pub fn joint_mut(&mut self, id: JointId) -> WorldResult<&mut Joint> {
        let position = self.position_of(id)?;
        Ok(&mut self.joints[position].joint)
    }

    /// All joints with their ids, in creation order.
    pub fn joints(&self) -> impl Iterator<Item = (JointId, &Joint)> {
        self.joints.iter().map(|entry| (entry.id, &entry.joint))
    }

    pub fn mouse_joint_mut(&mut self, id: JointId) -> WorldResult<&mut MouseJoint> {
        self.joint_mut(id)?
            .as_mouse_mut()
            .ok_or(WorldError::WrongJointKind { id, expected: "mouse" })
    }

    /// Moves a mouse joint's target and wakes the dragged body.
    pub fn set_mouse_target(&mut self, id: JointId, target: Vec2) -> WorldResult<()> {
        let joint = self.mouse_joint_mut(id)?;
        joint.set_target(target)?;
        let body = joint.body();
        self.bodies[body].set_awake(true);
        Ok(())
    }

    /// Clears the persistent impulse of one joint.
    pub fn reset_joint_impulse(&mut self, id: JointId) -> WorldResult<()> {
        self.joint_mut(id)?.reset_impulse();
        Ok(())
    }

    /// Replaces the contacts for the next step with `manifolds`.
    ///
    /// Friction and restitution are mixed from the bodies' materials. Points
    /// whose feature id was also present last step inherit its impulses,
    /// whichever order the pair is reported in. Manifolds without a dynamic
    /// body are dropped.
    pub fn submit_contacts<I>(&mut self, manifolds: I) -> WorldResult<()>
    where
        I: IntoIterator<Item = Manifold>,
    {
        let previous: HashMap<(usize, usize), &ContactConstraint> = self
            .previous_contacts
            .iter()
            .map(|c| (pair_key(c.body_a, c.body_b), c))
            .collect();

        let mut contacts = Vec::new();
        for manifold in manifolds {
            for index in [manifold.body_a, manifold.body_b] {
                if index >= self.bodies.len() {
                    return Err(WorldError::BodyOutOfRange {
                        index,
                        count: self.bodies.len(),
                    });
                }
            }
            if manifold.is_empty() {
                continue;
            }
            if manifold.body_a == manifold.body_b {
                warn!(body = manifold.body_a, "ignoring manifold of a body with itself");
                continue;
            }

            let a = &self.bodies[manifold.body_a];
            let b = &self.bodies[manifold.body_b];
            if a.body_type != BodyType::Dynamic && b.body_type != BodyType::Dynamic {
                debug!(
                    body_a = manifold.body_a,
                    body_b = manifold.body_b,
                    "skipping manifold without a dynamic body"
                );
                continue;
            }
            let mut contact = ContactConstraint::new(
                &manifold,
                a,
                b,
                mix_friction(&a.material, &b.material),
                mix_restitution(&a.material, &b.material),
            );
            if let Some(old) = previous.get(&pair_key(manifold.body_a, manifold.body_b)) {
                contact.carry_impulses(old);
            }
            contacts.push(contact);
        }

        self.contacts = contacts;
        Ok(())
    }

    /// Groups the current bodies and constraints into islands.
    ///
    /// Sleeping bodies reached from awake ones are listed but not woken;
    /// [`PhysicsWorld::step`] wakes them.
    pub fn islands(&self) -> Vec<Island> {
        build_islands(
            &self.bodies,
            self.joints.iter().map(|entry| (entry.joint.body_a(), entry.joint.body_b())),
            self.contacts.iter().map(|c| (c.body_a(), c.body_b())),
        )
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// Every island runs the full solver pipeline; with the `parallel`
    /// feature independent islands run on the rayon pool. Results are written
    /// back once all islands are done, then force accumulators are cleared
    /// and the submitted contacts are retired.
    pub fn step(&mut self, dt: f64) -> WorldResult<StepReport> {
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(WorldError::InvalidTimeStep(dt));
        }

        let dt_ratio = if self.inv_dt0 > 0.0 { self.inv_dt0 * dt } else { 1.0 };
        let step = TimeStep::new(dt, &self.settings).with_dt_ratio(dt_ratio);

        let islands = self.islands();
        for island in &islands {
            for &body in &island.bodies {
                if !self.bodies[body].is_awake() {
                    self.bodies[body].set_awake(true);
                }
            }
        }
        if self.solvers.len() < islands.len() {
            self.solvers.resize_with(islands.len(), IslandSolver::new);
        }

        let mut joint_refs: Vec<Option<&mut Joint>> = self.joints.iter_mut().map(|e| Some(&mut e.joint)).collect();
        let mut contact_refs: Vec<Option<&mut ContactConstraint>> = self.contacts.iter_mut().map(Some).collect();
        let mut work: Vec<IslandWork<'_>> = islands
            .into_iter()
            .map(|island| IslandWork {
                joints: island.joints.iter().filter_map(|&i| joint_refs[i].take()).collect(),
                contacts: island.contacts.iter().filter_map(|&i| contact_refs[i].take()).collect(),
                bodies: island.bodies,
            })
            .collect();

        let bodies = &self.bodies;
        let settings = &self.settings;
        let gravity = self.gravity;
        let solve = |solver: &mut IslandSolver, work: &mut IslandWork<'_>| {
            solver.load(bodies, &work.bodies);
            solver.solve(&step, settings, gravity, &mut work.joints, &mut work.contacts)
        };

        #[cfg(feature = "parallel")]
        let reports: Vec<IslandReport> = self
            .solvers
            .par_iter_mut()
            .zip(work.par_iter_mut())
            .map(|(solver, work)| solve(solver, work))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let reports: Vec<IslandReport> = self
            .solvers
            .iter_mut()
            .zip(work.iter_mut())
            .map(|(solver, work)| solve(solver, work))
            .collect();

        drop(work);

        for solver in &self.solvers[..reports.len()] {
            solver.write_back(&mut self.bodies);
        }
        for body in &mut self.bodies {
            body.clear_accumulators();
        }

        self.previous_contacts = std::mem::take(&mut self.contacts);
        self.inv_dt0 = step.inv_dt;

        debug!(dt, dt_ratio, islands = reports.len(), "world stepped");
        Ok(StepReport {
            dt,
            dt_ratio,
            islands: reports,
        })
    }

    /// Reaction force of a joint on its second body during the last step.
    pub fn joint_reaction_force(&self, id: JointId, inv_dt: f64) -> WorldResult<Vec2> {
        Ok(self.joint(id)?.reaction_force(inv_dt))
    }

    pub fn joint_reaction_torque(&self, id: JointId, inv_dt: f64) -> WorldResult<f64> {
        Ok(self.joint(id)?.reaction_torque(inv_dt))
    }

    /// World anchors of a joint, first body then second.
    pub fn joint_anchors(&self, id: JointId) -> WorldResult<(Vec2, Vec2)> {
        let joint = self.joint(id)?;
        Ok((joint.anchor_a(&self.bodies), joint.anchor_b(&self.bodies)))
    }
}

/// Order-independent key of a body pair.
fn pair_key(a: usize, b: usize) -> (usize, usize) {
    (a.min(b), a.max(b))
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}
