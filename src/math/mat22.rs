use super::vec2::Vec2;

/// A 2x2 matrix stored as two columns.
///
/// Used for the point-constraint effective mass. Columns are `ex` and `ey`,
/// so `m * v = ex * v.x + ey * v.y`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Mat22 {
    pub ex: Vec2,
    pub ey: Vec2,
}

impl Mat22 {
    pub const ZERO: Mat22 = Mat22 {
        ex: Vec2::ZERO,
        ey: Vec2::ZERO,
    };

    pub const fn from_columns(ex: Vec2, ey: Vec2) -> Self {
        Self { ex, ey }
    }

    pub fn determinant(&self) -> f64 {
        self.ex.x * self.ey.y - self.ey.x * self.ex.y
    }

    /// Inverse of the matrix. A singular matrix inverts to zero, which turns
    /// the corresponding constraint into a no-op instead of producing NaN.
    pub fn inverse(&self) -> Mat22 {
        let (a, b, c, d) = (self.ex.x, self.ey.x, self.ex.y, self.ey.y);
        let mut det = a * d - b * c;
        if det != 0.0 {
            det = 1.0 / det;
        }
        Mat22 {
            ex: Vec2::new(det * d, -det * c),
            ey: Vec2::new(-det * b, det * a),
        }
    }

    /// Solves `self * x = b` without forming the inverse.
    pub fn solve(&self, b: Vec2) -> Vec2 {
        let (a11, a12, a21, a22) = (self.ex.x, self.ey.x, self.ex.y, self.ey.y);
        let mut det = a11 * a22 - a12 * a21;
        if det != 0.0 {
            det = 1.0 / det;
        }
        Vec2::new(det * (a22 * b.x - a12 * b.y), det * (a11 * b.y - a21 * b.x))
    }

    pub fn mul_vec(&self, v: Vec2) -> Vec2 {
        Vec2::new(
            self.ex.x * v.x + self.ey.x * v.y,
            self.ex.y * v.x + self.ey.y * v.y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_inverse_times_matrix_is_identity() {
        let m = Mat22::from_columns(Vec2::new(4.0, 1.0), Vec2::new(1.0, 3.0));
        let inv = m.inverse();
        let x = m.mul_vec(inv.mul_vec(Vec2::new(1.0, 0.0)));
        let y = m.mul_vec(inv.mul_vec(Vec2::new(0.0, 1.0)));
        assert!((x - Vec2::X).length() < EPSILON);
        assert!((y - Vec2::Y).length() < EPSILON);
    }

    #[test]
    fn test_solve_matches_inverse() {
        let m = Mat22::from_columns(Vec2::new(2.0, -1.0), Vec2::new(0.5, 3.0));
        let b = Vec2::new(1.5, -2.0);
        let x = m.solve(b);
        assert!((m.mul_vec(x) - b).length() < EPSILON);
        assert!((m.inverse().mul_vec(b) - x).length() < EPSILON);
    }

    #[test]
    fn test_singular_inverts_to_zero() {
        let m = Mat22::from_columns(Vec2::new(1.0, 2.0), Vec2::new(2.0, 4.0));
        assert_eq!(m.determinant(), 0.0);
        assert_eq!(m.inverse(), Mat22::ZERO);
        assert_eq!(m.solve(Vec2::new(1.0, 1.0)), Vec2::ZERO);
    }
}
