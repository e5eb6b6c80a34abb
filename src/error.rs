//! Error types for joint construction and world operations.

use thiserror::Error;

use crate::constraints::JointId;

/// Errors raised while validating a joint definition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum JointError {
    /// A parameter that must be non-negative was negative.
    #[error("{name} must be non-negative, got {value}")]
    NegativeParameter { name: &'static str, value: f64 },

    /// A parameter was NaN or infinite.
    #[error("{name} must be finite")]
    NonFiniteParameter { name: &'static str },

    /// The target point was NaN or infinite.
    #[error("target point must be finite")]
    NonFiniteTarget,

    /// Both ends of the joint refer to the same body.
    #[error("joint connects body {0} to itself")]
    SameBody(usize),

    /// A body index does not exist in the world.
    #[error("body index {index} out of bounds (count: {count})")]
    BodyOutOfRange { index: usize, count: usize },

    /// None of the attached bodies can move.
    #[error("joint needs at least one dynamic body")]
    NoDynamicBody,

    /// A rigid distance joint was given a zero rest length.
    #[error("rigid distance joint needs a positive length")]
    DegenerateLength,
}

/// Result type for joint construction.
pub type JointResult<T> = std::result::Result<T, JointError>;

/// Errors raised by world-level operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorldError {
    /// The step size was not a positive finite number.
    #[error("invalid time step: {0}")]
    InvalidTimeStep(f64),

    /// No joint is registered under this id.
    #[error("unknown joint {0:?}")]
    UnknownJoint(JointId),

    /// The joint exists but is not of the requested kind.
    #[error("joint {id:?} is not a {expected} joint")]
    WrongJointKind { id: JointId, expected: &'static str },

    /// A body index does not exist in the world.
    #[error("body index {index} out of bounds (count: {count})")]
    BodyOutOfRange { index: usize, count: usize },

    /// Joint validation failed.
    #[error(transparent)]
    Joint(#[from] JointError),
}

/// Result type for world operations.
pub type WorldResult<T> = std::result::Result<T, WorldError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = JointError::NegativeParameter {
            name: "max_force",
            value: -1.0,
        };
        assert_eq!(format!("{err}"), "max_force must be non-negative, got -1");

        let err = WorldError::from(JointError::NonFiniteTarget);
        assert_eq!(format!("{err}"), "target point must be finite");

        let err = WorldError::WrongJointKind {
            id: JointId(3),
            expected: "mouse",
        };
        assert!(format!("{err}").contains("mouse"));
    }
}
