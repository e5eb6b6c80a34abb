use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A 2D column vector used for points, offsets, velocities and impulses.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };
    pub const X: Vec2 = Vec2 { x: 1.0, y: 0.0 };
    pub const Y: Vec2 = Vec2 { x: 0.0, y: 1.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Scalar 2D cross product (z-component of the 3D cross product).
    pub fn cross(self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// `cross(v, s)`: the vector crossed with an out-of-plane scalar.
    pub fn cross_scalar(self, s: f64) -> Self {
        Self::new(s * self.y, -s * self.x)
    }

    /// `cross(s, v)`: an out-of-plane scalar crossed with the vector.
    ///
    /// For an angular velocity `w` and a lever arm `r` this is the linear
    /// velocity `w x r` of the point at `r`.
    pub fn scalar_cross(s: f64, v: Self) -> Self {
        Self::new(-s * v.y, s * v.x)
    }

    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    /// Unit vector in the same direction, or zero for a degenerate vector.
    pub fn normalize(self) -> Self {
        let len = self.length();
        if len < f64::EPSILON {
            Self::ZERO
        } else {
            self * (1.0 / len)
        }
    }

    pub fn distance(self, other: Self) -> f64 {
        (self - other).length()
    }

    pub fn distance_squared(self, other: Self) -> f64 {
        (self - other).length_squared()
    }

    /// Counter-clockwise perpendicular.
    pub fn perpendicular(self) -> Self {
        Self::new(-self.y, self.x)
    }

    /// True when both components are finite numbers.
    pub fn is_valid(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Self;

    fn mul(self, s: f64) -> Self {
        Self::new(self.x * s, self.y * s)
    }
}

impl Mul<Vec2> for f64 {
    type Output = Vec2;

    fn mul(self, v: Vec2) -> Vec2 {
        v * self
    }
}

impl Div<f64> for Vec2 {
    type Output = Self;

    fn div(self, s: f64) -> Self {
        Self::new(self.x / s, self.y / s)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl MulAssign<f64> for Vec2 {
    fn mul_assign(&mut self, s: f64) {
        self.x *= s;
        self.y *= s;
    }
}

impl Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_dot_and_cross() {
        let a = Vec2::new(1.0, 2.0);
        let b = Vec2::new(3.0, 4.0);
        assert!((a.dot(b) - 11.0).abs() < EPSILON);
        assert!((a.cross(b) - -2.0).abs() < EPSILON);
        assert!((b.cross(a) - 2.0).abs() < EPSILON);
    }

    #[test]
    fn test_scalar_cross_matches_angular_velocity() {
        // w = 2 about z, r = (1, 0) -> point velocity (0, 2)
        let v = Vec2::scalar_cross(2.0, Vec2::new(1.0, 0.0));
        assert_eq!(v, Vec2::new(0.0, 2.0));
        // cross(v, s) is the negation of cross(s, v)
        let r = Vec2::new(0.5, -1.5);
        assert_eq!(r.cross_scalar(3.0), -Vec2::scalar_cross(3.0, r));
    }

    #[test]
    fn test_normalize_degenerate_is_zero() {
        assert_eq!(Vec2::ZERO.normalize(), Vec2::ZERO);
        let n = Vec2::new(3.0, 4.0).normalize();
        assert!((n.length() - 1.0).abs() < EPSILON);
        assert!((n.x - 0.6).abs() < EPSILON);
    }

    #[test]
    fn test_is_valid() {
        assert!(Vec2::new(1.0, -2.0).is_valid());
        assert!(!Vec2::new(f64::NAN, 0.0).is_valid());
        assert!(!Vec2::new(0.0, f64::INFINITY).is_valid());
    }

    #[test]
    fn test_assign_ops() {
        let mut v = Vec2::new(1.0, 1.0);
        v += Vec2::new(2.0, 3.0);
        v -= Vec2::new(1.0, 1.0);
        v *= 2.0;
        assert_eq!(v, Vec2::new(4.0, 6.0));
        assert_eq!(-v / 2.0, Vec2::new(-2.0, -3.0));
    }

    #[test]
    fn test_perpendicular_is_orthogonal() {
        let v = Vec2::new(3.0, 4.0);
        assert_eq!(v.perpendicular(), Vec2::new(-4.0, 3.0));
        assert!(v.dot(v.perpendicular()).abs() < EPSILON);
    }
}
