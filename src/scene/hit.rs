use assert2::debug_assert;

use crate::geometry::{FloatType, Ray, WorldPoint, WorldVector};

use super::MaterialIdx;

/// Closest intersection found so far during a single ray query.
///
/// Starts with `t` at positive infinity and no material; every accepted
/// intersection strictly decreases `t`.
#[derive(Clone, Debug)]
pub struct Hit {
    t: FloatType,
    material: Option<MaterialIdx>,
    normal: WorldVector,
    point: WorldPoint,
}

impl Hit {
    pub fn new() -> Hit {
        Hit {
            t: FloatType::INFINITY,
            material: None,
            normal: WorldVector::zeros(),
            point: WorldPoint::origin(),
        }
    }

    pub fn t(&self) -> FloatType {
        self.t
    }

    pub fn material(&self) -> Option<MaterialIdx> {
        self.material
    }

    /// Unit normal in world space
    pub fn normal(&self) -> &WorldVector {
        &self.normal
    }

    /// Intersection point in world space
    pub fn point(&self) -> &WorldPoint {
        &self.point
    }

    /// True once any intersection was recorded
    pub fn is_hit(&self) -> bool {
        self.material.is_some()
    }

    /// Records an intersection with distance `t` along `ray`.
    pub fn set(&mut self, t: FloatType, material: MaterialIdx, normal: WorldVector, ray: &Ray) {
        debug_assert!(t <= self.t, "hit distance may only decrease");
        self.t = t;
        self.material = Some(material);
        self.normal = normal;
        self.point = ray.point_at(t);
    }

    /// Replaces the normal and recomputes the point of the current intersection,
    /// used when mapping a hit from a child space back to the parent space.
    pub(super) fn reproject(&mut self, normal: WorldVector, ray: &Ray) {
        self.normal = normal;
        self.point = ray.point_at(self.t);
    }
}

impl Default for Hit {
    fn default() -> Self {
        Hit::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert2::assert;

    #[test]
    fn starts_empty() {
        let hit = Hit::new();
        assert!(hit.t() == FloatType::INFINITY);
        assert!(!hit.is_hit());
        assert!(hit.material() == None);
    }

    #[test]
    fn set_computes_point() {
        let ray = Ray::new(WorldPoint::new(1.0, 1.0, 1.0), WorldVector::new(0.0, 0.0, 2.0));
        let mut hit = Hit::new();
        hit.set(1.5, MaterialIdx::from_raw(3), WorldVector::new(0.0, 0.0, -1.0), &ray);

        assert!(hit.is_hit());
        assert!(hit.t() == 1.5);
        assert!(*hit.point() == WorldPoint::new(1.0, 1.0, 4.0));
        assert!(hit.material() == Some(MaterialIdx::from_raw(3)));
    }
}
