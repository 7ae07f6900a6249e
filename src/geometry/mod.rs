mod aabb;
mod ray_box_intersection;
mod ray_triangle_intersection;
mod triangle;

pub use aabb::AABB;
pub use ray_triangle_intersection::TriangleHit;
pub use triangle::Triangle;

pub type FloatType = f32;

pub type WorldPoint = nalgebra::Point3<FloatType>;
pub type WorldVector = nalgebra::Vector3<FloatType>;
pub type WorldMatrix = nalgebra::Matrix4<FloatType>;
pub type WorldBox = AABB<WorldPoint>;

/// Relative tolerance for degenerate linear systems
pub const EPSILON: FloatType = 1e-6;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray {
    pub origin: WorldPoint,
    /// Direction of the ray, not necessarily normalized.
    /// Distances along the ray are measured in multiples of this vector.
    pub direction: WorldVector,
}

impl Ray {
    pub fn new(origin: WorldPoint, direction: WorldVector) -> Ray {
        Ray { origin, direction }
    }

    pub fn point_at(&self, t: FloatType) -> WorldPoint {
        self.origin + self.direction * t
    }
}
