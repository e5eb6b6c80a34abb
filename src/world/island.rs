//! Per-island step driver.
//!
//! One step runs the fixed sequence
//!
//! ```text
//! load -> integrate velocities -> init -> velocity iterations
//!      -> integrate positions -> position iterations -> write back
//! ```
//!
//! over island-local buffers. Body state only becomes visible to the caller
//! at write back.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::common::{ScratchPool, SolverSettings};
use crate::constraints::{BodySnapshot, Constraint, Position, SolverData, TimeStep, Velocity};
use crate::integration::{integrate_position, integrate_velocity};
use crate::math::Vec2;
use crate::objects::BodyState;

/// What one island step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IslandReport {
    pub bodies: usize,
    pub joints: usize,
    pub contacts: usize,
    pub velocity_iterations: usize,
    /// Position iterations actually run; may stop early once solved.
    pub position_iterations: usize,
    /// Every constraint reported itself within tolerance.
    pub position_solved: bool,
}

/// Buffers and scratch pool for solving one island.
///
/// A solver is reused from step to step so its buffers and pool stop
/// allocating once they reach the island's size. Islands solved concurrently
/// each need their own solver.
#[derive(Debug, Default)]
pub struct IslandSolver {
    pool: ScratchPool,
    members: Vec<usize>,
    snapshots: Vec<BodySnapshot>,
    positions: Vec<Position>,
    velocities: Vec<Velocity>,
    index: HashMap<usize, usize>,
}

impl IslandSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the state of `members` (world indices) into the island buffers.
    pub fn load<B: BodyState>(&mut self, bodies: &[B], members: &[usize]) {
        self.members.clear();
        self.snapshots.clear();
        self.positions.clear();
        self.velocities.clear();
        self.index.clear();

        for (local, &world) in members.iter().enumerate() {
            let body = &bodies[world];
            self.members.push(world);
            self.snapshots.push(body.snapshot());
            self.positions.push(body.solver_position());
            self.velocities.push(body.solver_velocity());
            self.index.insert(world, local);
        }
    }

    /// Runs one step over the loaded bodies.
    pub fn solve<J: Constraint, C: Constraint>(
        &mut self,
        step: &TimeStep,
        settings: &SolverSettings,
        gravity: Vec2,
        joints: &mut [J],
        contacts: &mut [C],
    ) -> IslandReport {
        let h = step.dt;

        for (snapshot, velocity) in self.snapshots.iter().zip(self.velocities.iter_mut()) {
            integrate_velocity(snapshot, velocity, gravity, h);
        }

        {
            let mut data = SolverData::new(
                *step,
                settings,
                &self.snapshots,
                &mut self.positions,
                &mut self.velocities,
                &mut self.pool,
                &self.index,
            );

            for contact in contacts.iter_mut() {
                contact.init_velocity_constraints(&mut data);
            }
            for joint in joints.iter_mut() {
                joint.init_velocity_constraints(&mut data);
            }

            for iteration in 0..step.velocity_iterations {
                for joint in joints.iter_mut() {
                    joint.solve_velocity_constraints(&mut data);
                }
                for contact in contacts.iter_mut() {
                    contact.solve_velocity_constraints(&mut data);
                }
                trace!(iteration, "velocity iteration");
            }
        }

        for (position, velocity) in self.positions.iter_mut().zip(self.velocities.iter_mut()) {
            integrate_position(position, velocity, h, settings);
        }

        let mut position_iterations = 0;
        let mut position_solved = false;
        {
            let mut data = SolverData::new(
                *step,
                settings,
                &self.snapshots,
                &mut self.positions,
                &mut self.velocities,
                &mut self.pool,
                &self.index,
            );

            while position_iterations < step.position_iterations {
                position_iterations += 1;
                let mut solved = true;
                for contact in contacts.iter_mut() {
                    solved &= contact.solve_position_constraints(&mut data);
                }
                for joint in joints.iter_mut() {
                    solved &= joint.solve_position_constraints(&mut data);
                }
                trace!(iteration = position_iterations - 1, solved, "position iteration");
                if solved {
                    position_solved = true;
                    break;
                }
            }
        }
        debug_assert_eq!(self.pool.depth(), 0, "scratch frames leaked");

        let report = IslandReport {
            bodies: self.members.len(),
            joints: joints.len(),
            contacts: contacts.len(),
            velocity_iterations: step.velocity_iterations,
            position_iterations,
            position_solved,
        };
        debug!(
            bodies = report.bodies,
            joints = report.joints,
            contacts = report.contacts,
            position_iterations,
            position_solved,
            "island solved"
        );
        report
    }

    /// Stores the solved state back into the bodies it was loaded from.
    pub fn write_back<B: BodyState>(&self, bodies: &mut [B]) {
        for (local, &world) in self.members.iter().enumerate() {
            bodies[world].write_back(&self.positions[local], &self.velocities[local]);
        }
    }

    /// World indices of the loaded bodies, in island order.
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn velocities(&self) -> &[Velocity] {
        &self.velocities
    }

    pub fn pool(&self) -> &ScratchPool {
        &self.pool
    }
}
