//! Construction-time checks shared by the joint definitions.

use crate::error::{JointError, JointResult};
use crate::math::Vec2;

pub(crate) fn non_negative(name: &'static str, value: f64) -> JointResult<()> {
    if !value.is_finite() {
        return Err(JointError::NonFiniteParameter { name });
    }
    if value < 0.0 {
        return Err(JointError::NegativeParameter { name, value });
    }
    Ok(())
}

pub(crate) fn finite_point(name: &'static str, point: Vec2) -> JointResult<()> {
    if point.is_valid() {
        Ok(())
    } else {
        Err(JointError::NonFiniteParameter { name })
    }
}

pub(crate) fn distinct_bodies(a: usize, b: usize) -> JointResult<()> {
    if a == b {
        Err(JointError::SameBody(a))
    } else {
        Ok(())
    }
}
