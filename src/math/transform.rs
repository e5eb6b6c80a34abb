use super::rot::Rot;
use super::vec2::Vec2;

/// A rigid frame: rotation followed by translation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    pub p: Vec2,
    pub q: Rot,
}

impl Transform {
    pub fn new(p: Vec2, angle: f64) -> Self {
        Self { p, q: Rot::new(angle) }
    }

    pub fn identity() -> Self {
        Self {
            p: Vec2::ZERO,
            q: Rot::IDENTITY,
        }
    }

    /// Builds the body-origin frame from a center-of-mass position, angle and
    /// the body-local center of mass.
    pub fn from_center(center: Vec2, angle: f64, local_center: Vec2) -> Self {
        let q = Rot::new(angle);
        Self {
            p: center - q.mul(local_center),
            q,
        }
    }

    /// Local point to world.
    pub fn apply(&self, point: Vec2) -> Vec2 {
        self.q.mul(point) + self.p
    }

    /// World point to local.
    pub fn apply_inverse(&self, point: Vec2) -> Vec2 {
        self.q.mul_t(point - self.p)
    }

    /// Composition `self * other`: `other` expressed in `self`'s parent frame.
    pub fn mul(&self, other: &Transform) -> Transform {
        Transform {
            p: self.q.mul(other.p) + self.p,
            q: self.q.compose(other.q),
        }
    }

    /// Relative frame `inverse(self) * other`.
    pub fn mul_t(&self, other: &Transform) -> Transform {
        Transform {
            p: self.q.mul_t(other.p - self.p),
            q: Rot {
                s: self.q.c * other.q.s - self.q.s * other.q.c,
                c: self.q.c * other.q.c + self.q.s * other.q.s,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;
    const EPSILON: f64 = 1e-10;

    #[test]
    fn test_apply_rotation_then_translation() {
        let t = Transform::new(Vec2::new(10.0, 5.0), PI / 2.0);
        let p = t.apply(Vec2::new(1.0, 0.0));
        assert!((p.x - 10.0).abs() < EPSILON);
        assert!((p.y - 6.0).abs() < EPSILON);
    }

    #[test]
    fn test_apply_inverse_undoes_apply() {
        let t = Transform::new(Vec2::new(-3.0, 2.0), PI / 4.0);
        let local = Vec2::new(1.0, 1.0);
        let back = t.apply_inverse(t.apply(local));
        assert!((back - local).length() < EPSILON);
    }

    #[test]
    fn test_from_center_places_center_of_mass() {
        let local_center = Vec2::new(1.0, 0.0);
        let t = Transform::from_center(Vec2::new(5.0, 5.0), PI / 2.0, local_center);
        let center = t.apply(local_center);
        assert!((center - Vec2::new(5.0, 5.0)).length() < EPSILON);
        assert!((t.p - Vec2::new(5.0, 4.0)).length() < EPSILON);
    }

    #[test]
    fn test_mul_and_mul_t_are_inverse() {
        let a = Transform::new(Vec2::new(1.0, 2.0), 0.3);
        let b = Transform::new(Vec2::new(-4.0, 0.5), -1.1);
        let relative = a.mul_t(&b);
        let recomposed = a.mul(&relative);
        assert!((recomposed.p - b.p).length() < EPSILON);
        assert!((recomposed.q.angle() - b.q.angle()).abs() < EPSILON);

        let point = Vec2::new(0.7, -0.2);
        let via_chain = a.apply(relative.apply(point));
        assert!((via_chain - b.apply(point)).length() < EPSILON);
    }

    #[test]
    fn test_identity() {
        let t = Transform::identity();
        let p = Vec2::new(5.0, -3.0);
        assert_eq!(t.apply(p), p);
        assert_eq!(t.apply_inverse(p), p);
    }
}
