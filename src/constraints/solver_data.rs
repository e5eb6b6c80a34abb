//! Island-local state shared by every constraint during one step.

use std::collections::HashMap;

use crate::common::{ScratchPool, SolverSettings};
use crate::math::{Transform, Vec2};
use crate::objects::BodyType;

/// Per-step parameters handed to every constraint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeStep {
    pub dt: f64,
    pub inv_dt: f64,
    /// `dt / previous dt`, used to rescale warm-start impulses.
    pub dt_ratio: f64,
    pub velocity_iterations: usize,
    pub position_iterations: usize,
    pub warm_starting: bool,
}

impl TimeStep {
    /// Builds a step with iteration counts and warm starting from `settings`
    /// and a `dt_ratio` of one.
    pub fn new(dt: f64, settings: &SolverSettings) -> Self {
        Self {
            dt,
            inv_dt: if dt > 0.0 { 1.0 / dt } else { 0.0 },
            dt_ratio: 1.0,
            velocity_iterations: settings.velocity_iterations,
            position_iterations: settings.position_iterations,
            warm_starting: settings.warm_starting,
        }
    }

    pub fn with_dt_ratio(mut self, dt_ratio: f64) -> Self {
        self.dt_ratio = dt_ratio;
        self
    }
}

/// Mass properties and external loads of one island body, read once per step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BodySnapshot {
    pub body_type: BodyType,
    pub mass: f64,
    pub inv_mass: f64,
    pub inv_inertia: f64,
    pub local_center: Vec2,
    pub force: Vec2,
    pub torque: f64,
    pub linear_damping: f64,
    pub angular_damping: f64,
    pub gravity_scale: f64,
}

/// Center of mass and angle of an island body.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub c: Vec2,
    pub a: f64,
}

impl Position {
    /// Frame of the body origin for the given local center of mass.
    pub fn transform(&self, local_center: Vec2) -> Transform {
        Transform::from_center(self.c, self.a, local_center)
    }
}

/// Linear and angular velocity of an island body.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Velocity {
    pub v: Vec2,
    pub w: f64,
}

/// Everything a constraint may read or write while the island is solved.
///
/// Buffers are indexed by island-local body index; constraints translate
/// their world body indices with [`SolverData::island_index`].
pub struct SolverData<'a> {
    pub step: TimeStep,
    pub settings: &'a SolverSettings,
    pub bodies: &'a [BodySnapshot],
    pub positions: &'a mut [Position],
    pub velocities: &'a mut [Velocity],
    pub pool: &'a mut ScratchPool,
    index: &'a HashMap<usize, usize>,
}

impl<'a> SolverData<'a> {
    pub fn new(
        step: TimeStep,
        settings: &'a SolverSettings,
        bodies: &'a [BodySnapshot],
        positions: &'a mut [Position],
        velocities: &'a mut [Velocity],
        pool: &'a mut ScratchPool,
        index: &'a HashMap<usize, usize>,
    ) -> Self {
        Self {
            step,
            settings,
            bodies,
            positions,
            velocities,
            pool,
            index,
        }
    }

    /// Island-local index of a world body.
    ///
    /// Panics if the body was not loaded into this island: a constraint can
    /// only be solved together with the bodies it connects.
    pub fn island_index(&self, body: usize) -> usize {
        match self.index.get(&body) {
            Some(&local) => local,
            None => panic!("body {body} is not part of the island being solved"),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_step_from_settings() {
        let settings = SolverSettings::new()
            .with_velocity_iterations(6)
            .with_position_iterations(2)
            .with_warm_starting(false);
        let step = TimeStep::new(0.5, &settings).with_dt_ratio(2.0);
        assert_eq!(step.inv_dt, 2.0);
        assert_eq!(step.dt_ratio, 2.0);
        assert_eq!(step.velocity_iterations, 6);
        assert_eq!(step.position_iterations, 2);
        assert!(!step.warm_starting);
    }

    #[test]
    fn test_zero_dt_has_zero_inverse() {
        let step = TimeStep::new(0.0, &SolverSettings::default());
        assert_eq!(step.inv_dt, 0.0);
    }

    #[test]
    fn test_island_index_lookup() {
        let settings = SolverSettings::default();
        let bodies = [BodySnapshot::default(); 2];
        let mut positions = [Position::default(); 2];
        let mut velocities = [Velocity::default(); 2];
        let mut pool = ScratchPool::new();
        let index: HashMap<usize, usize> = [(7, 0), (3, 1)].into_iter().collect();
        let data = SolverData::new(
            TimeStep::new(1.0 / 60.0, &settings),
            &settings,
            &bodies,
            &mut positions,
            &mut velocities,
            &mut pool,
            &index,
        );
        assert_eq!(data.island_index(7), 0);
        assert_eq!(data.island_index(3), 1);
    }

    #[test]
    #[should_panic]
    fn test_island_index_missing_body_panics() {
        let settings = SolverSettings::default();
        let mut pool = ScratchPool::new();
        let index = HashMap::new();
        let mut positions: Vec<Position> = Vec::new();
        let mut velocities: Vec<Velocity> = Vec::new();
        let data = SolverData::new(
            TimeStep::new(1.0 / 60.0, &settings),
            &settings,
            &[],
            &mut positions,
            &mut velocities,
            &mut pool,
            &index,
        );
        data.island_index(0);
    }
}
