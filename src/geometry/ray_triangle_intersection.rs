use nalgebra::Matrix3;

use super::{EPSILON, FloatType, Ray, Triangle, WorldPoint};

/// Solution of the ray/triangle linear system.
/// The hit point is `a + beta * (b - a) + gamma * (c - a)`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TriangleHit {
    pub t: FloatType,
    pub beta: FloatType,
    pub gamma: FloatType,
}

impl Triangle<WorldPoint> {
    /// Calculates ray intersection with the (two sided) triangle.
    /// Solves `(a - b) * beta + (a - c) * gamma + direction * t = a - origin` using Cramer's rule.
    /// Returns None if the ray misses the triangle interior, the triangle boundary
    /// is excluded.
    /// Degenerate triangles and rays parallel to the triangle plane never hit.
    pub fn intersect(&self, ray: &Ray) -> Option<TriangleHit> {
        let a_minus_b = self[0] - self[1];
        let a_minus_c = self[0] - self[2];
        let a_minus_origin = self[0] - ray.origin;

        let det_a = Matrix3::from_columns(&[a_minus_b, a_minus_c, ray.direction]).determinant();

        // |det_a| <= |a - b| |a - c| |d| (Hadamard), so this is a relative test
        let scale = a_minus_b.norm() * a_minus_c.norm() * ray.direction.norm();
        if !(det_a.abs() > EPSILON * scale) {
            return None;
        }

        let beta = Matrix3::from_columns(&[a_minus_origin, a_minus_c, ray.direction])
            .determinant()
            / det_a;
        let gamma = Matrix3::from_columns(&[a_minus_b, a_minus_origin, ray.direction])
            .determinant()
            / det_a;

        if !(beta > 0.0 && gamma > 0.0 && beta + gamma < 1.0) {
            return None;
        }

        let t = Matrix3::from_columns(&[a_minus_b, a_minus_c, a_minus_origin]).determinant() / det_a;

        Some(TriangleHit { t, beta, gamma })
    }
}
