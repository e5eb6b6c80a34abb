//! Tuning constants owned by a solver instance.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Numerical tuning for the constraint solver.
///
/// Every world carries its own copy, so independent simulations can run with
/// different tuning side by side.
///
/// ```
/// use physics_solver::SolverSettings;
///
/// let settings = SolverSettings::new()
///     .with_velocity_iterations(8)
///     .with_position_iterations(3)
///     .with_warm_starting(true);
/// assert_eq!(settings.velocity_iterations, 8);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SolverSettings {
    /// Smallest denominator accepted by soft-constraint and effective-mass math.
    pub epsilon: f64,
    /// Collision and constraint tolerance, in meters.
    pub linear_slop: f64,
    /// Angular tolerance, in radians.
    pub angular_slop: f64,
    /// Largest position correction applied by one position iteration.
    pub max_linear_correction: f64,
    /// Largest angular correction applied by one position iteration.
    pub max_angular_correction: f64,
    /// Largest translation a body may make in one step.
    pub max_translation: f64,
    /// Largest rotation a body may make in one step.
    pub max_rotation: f64,
    /// Fraction of contact overlap resolved per position iteration.
    pub baumgarte: f64,
    /// Relative normal speed below which contacts do not bounce.
    pub velocity_threshold: f64,
    /// Angular velocity factor applied once per step by mouse joints.
    ///
    /// An empirical stabilizer for dragged bodies. Only the mouse joint uses it.
    pub mouse_angular_damping: f64,
    /// Velocity iterations per step.
    pub velocity_iterations: usize,
    /// Upper bound on position iterations per step.
    pub position_iterations: usize,
    /// Reuse last step's impulses as the initial guess.
    pub warm_starting: bool,
}

impl SolverSettings {
    pub fn new() -> Self {
        Self {
            epsilon: f64::EPSILON,
            linear_slop: 0.005,
            angular_slop: 2.0 / 180.0 * std::f64::consts::PI,
            max_linear_correction: 0.2,
            max_angular_correction: 8.0 / 180.0 * std::f64::consts::PI,
            max_translation: 2.0,
            max_rotation: 0.5 * std::f64::consts::PI,
            baumgarte: 0.2,
            velocity_threshold: 1.0,
            mouse_angular_damping: 0.98,
            velocity_iterations: 8,
            position_iterations: 3,
            warm_starting: true,
        }
    }

    pub fn with_velocity_iterations(mut self, iterations: usize) -> Self {
        self.velocity_iterations = iterations;
        self
    }

    pub fn with_position_iterations(mut self, iterations: usize) -> Self {
        self.position_iterations = iterations;
        self
    }

    pub fn with_warm_starting(mut self, enabled: bool) -> Self {
        self.warm_starting = enabled;
        self
    }

    pub fn with_mouse_angular_damping(mut self, factor: f64) -> Self {
        self.mouse_angular_damping = factor;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self::new()
    }
}
