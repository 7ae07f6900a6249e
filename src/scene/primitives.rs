use assert2::debug_assert;

use crate::geometry::{self, FloatType, Ray, WorldBox, WorldPoint, WorldVector};

use super::{Hit, MaterialIdx, Object};

/// Rays closer to parallel with a plane than this (cosine times direction length) miss it.
const PLANE_PARALLEL_LIMIT: FloatType = 1e-5;

#[derive(Clone, Debug)]
pub struct Sphere {
    pub center: WorldPoint,
    pub radius: FloatType,
    pub material: MaterialIdx,
}

impl Sphere {
    pub fn new(center: WorldPoint, radius: FloatType, material: MaterialIdx) -> Sphere {
        Sphere {
            center,
            radius,
            material,
        }
    }
}

impl Object for Sphere {
    fn intersect(&self, ray: &Ray, hit: &mut Hit, tmin: FloatType) -> bool {
        let oc = ray.origin - self.center;
        let a = ray.direction.dot(&ray.direction);
        let b = 2.0 * oc.dot(&ray.direction);
        let c = oc.dot(&oc) - self.radius * self.radius;
        let discriminant = b * b - 4.0 * a * c;

        if discriminant < 0.0 {
            return false;
        }

        let sqrt_disc = discriminant.sqrt();
        let t1 = (-b - sqrt_disc) / (2.0 * a);
        let t2 = (-b + sqrt_disc) / (2.0 * a);
        let t = if t1 >= tmin {
            t1
        } else if t2 >= tmin {
            t2
        } else {
            return false;
        };

        if !(t < hit.t()) {
            return false;
        }

        let normal = (oc + ray.direction * t).normalize();
        hit.set(t, self.material, normal, ray);
        true
    }

    fn bounding_box(&self) -> Option<WorldBox> {
        let r_vec = WorldVector::repeat(self.radius);
        Some(WorldBox::new(self.center - r_vec, self.center + r_vec))
    }
}

/// Infinite plane of points `p` with `normal.dot(p) == distance`.
#[derive(Clone, Debug)]
pub struct Plane {
    normal: WorldVector,
    distance: FloatType,
    pub material: MaterialIdx,
}

impl Plane {
    /// Creates the plane `normal.dot(p) == distance`.
    /// The normal doesn't need to be unit length, both parameters get rescaled.
    /// The normal must not be zero.
    pub fn new(normal: WorldVector, distance: FloatType, material: MaterialIdx) -> Plane {
        let length = normal.norm();
        debug_assert!(length > 0.0, "plane normal must be non-zero");
        Plane {
            normal: normal / length,
            distance: distance / length,
            material,
        }
    }

    pub fn normal(&self) -> &WorldVector {
        &self.normal
    }

    /// Signed distance of the plane from the origin, along the normal
    pub fn distance(&self) -> FloatType {
        self.distance
    }
}

impl Object for Plane {
    fn intersect(&self, ray: &Ray, hit: &mut Hit, tmin: FloatType) -> bool {
        let denominator = self.normal.dot(&ray.direction);
        if denominator.abs() < PLANE_PARALLEL_LIMIT {
            return false;
        }

        let t = (self.distance - self.normal.dot(&ray.origin.coords)) / denominator;
        if t > tmin && t < hit.t() {
            hit.set(t, self.material, self.normal, ray);
            true
        } else {
            false
        }
    }

    fn bounding_box(&self) -> Option<WorldBox> {
        None
    }
}

/// Flat shaded triangle.
#[derive(Clone, Debug)]
pub struct Triangle {
    vertices: geometry::Triangle<WorldPoint>,
    normal: WorldVector,
    bounding_box: WorldBox,
    pub material: MaterialIdx,
}

impl Triangle {
    pub fn new(a: WorldPoint, b: WorldPoint, c: WorldPoint, material: MaterialIdx) -> Triangle {
        let vertices = geometry::Triangle::new(a, b, c);
        Triangle {
            normal: vertices.normal(),
            bounding_box: vertices.bounding_box(),
            vertices,
            material,
        }
    }

    pub fn vertices(&self) -> &geometry::Triangle<WorldPoint> {
        &self.vertices
    }

    /// Unit face normal, following the winding order
    pub fn normal(&self) -> &WorldVector {
        &self.normal
    }
}

impl Object for Triangle {
    fn intersect(&self, ray: &Ray, hit: &mut Hit, tmin: FloatType) -> bool {
        let Some(solution) = self.vertices.intersect(ray) else {
            return false;
        };

        if solution.t > tmin && solution.t < hit.t() {
            hit.set(solution.t, self.material, self.normal, ray);
            true
        } else {
            false
        }
    }

    fn bounding_box(&self) -> Option<WorldBox> {
        Some(self.bounding_box.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert2::assert;
    use test_case::test_case;

    fn material() -> MaterialIdx {
        MaterialIdx::from_raw(1)
    }

    #[test_case(0.5 ; "small")]
    #[test_case(1.0 ; "unit")]
    #[test_case(8.0 ; "large")]
    fn sphere_hit_from_outside(r: FloatType) {
        let sphere = Sphere::new(WorldPoint::origin(), r, material());
        let ray = Ray::new(WorldPoint::new(0.0, 0.0, -2.0 * r), WorldVector::new(0.0, 0.0, 1.0));
        let mut hit = Hit::new();

        assert!(sphere.intersect(&ray, &mut hit, 0.0));
        assert!((hit.t() - r).abs() < 1e-5 * r);
        assert!((hit.normal() - WorldVector::new(0.0, 0.0, -1.0)).norm() < 1e-5);
        assert!(hit.material() == Some(material()));
    }

    #[test_case(0.5 ; "small")]
    #[test_case(1.0 ; "unit")]
    #[test_case(8.0 ; "large")]
    fn sphere_hit_from_inside(r: FloatType) {
        let sphere = Sphere::new(WorldPoint::origin(), r, material());
        let ray = Ray::new(WorldPoint::origin(), WorldVector::new(0.0, 1.0, 0.0));
        let mut hit = Hit::new();

        assert!(sphere.intersect(&ray, &mut hit, 0.0));
        assert!((hit.t() - r).abs() < 1e-5 * r);
        assert!((hit.normal() - WorldVector::new(0.0, 1.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn sphere_grazing_hit() {
        let sphere = Sphere::new(WorldPoint::new(1.0, 2.0, 3.0), 1.0, material());
        let ray = Ray::new(WorldPoint::new(2.0, 2.0, 0.0), WorldVector::new(0.0, 0.0, 1.0));
        let mut hit = Hit::new();

        assert!(sphere.intersect(&ray, &mut hit, 0.0));
        assert!((hit.t() - 3.0).abs() < 1e-6);
    }

    #[test]
    fn sphere_narrow_miss() {
        let sphere = Sphere::new(WorldPoint::new(1.0, 2.0, 3.0), 1.0, material());
        let ray = Ray::new(WorldPoint::new(2.0, 2.01, 0.0), WorldVector::new(0.0, 0.0, 1.0));
        let mut hit = Hit::new();

        assert!(!sphere.intersect(&ray, &mut hit, 0.0));
        assert!(!hit.is_hit());
    }

    #[test]
    fn sphere_behind_ray() {
        let sphere = Sphere::new(WorldPoint::new(0.0, 0.0, -5.0), 1.0, material());
        let ray = Ray::new(WorldPoint::origin(), WorldVector::new(0.0, 0.0, 1.0));
        let mut hit = Hit::new();

        assert!(!sphere.intersect(&ray, &mut hit, 0.0));
    }

    #[test]
    fn sphere_unnormalized_direction() {
        let sphere = Sphere::new(WorldPoint::new(0.0, 0.0, 10.0), 1.0, material());
        let ray = Ray::new(WorldPoint::origin(), WorldVector::new(0.0, 0.0, 3.0));
        let mut hit = Hit::new();

        assert!(sphere.intersect(&ray, &mut hit, 0.0));
        assert!((hit.t() - 3.0).abs() < 1e-6);
        assert!((hit.point() - WorldPoint::new(0.0, 0.0, 9.0)).norm() < 1e-5);
    }

    #[test]
    fn sphere_does_not_replace_closer_hit() {
        let sphere = Sphere::new(WorldPoint::new(0.0, 0.0, 10.0), 1.0, material());
        let ray = Ray::new(WorldPoint::origin(), WorldVector::new(0.0, 0.0, 1.0));
        let mut hit = Hit::new();
        hit.set(2.0, MaterialIdx::from_raw(5), WorldVector::x(), &ray);

        assert!(!sphere.intersect(&ray, &mut hit, 0.0));
        assert!(hit.t() == 2.0);
        assert!(hit.material() == Some(MaterialIdx::from_raw(5)));
    }

    #[test]
    fn plane_hit() {
        let plane = Plane::new(WorldVector::new(0.0, 1.0, 0.0), 0.0, material());
        let ray = Ray::new(WorldPoint::new(0.0, 5.0, 0.0), WorldVector::new(0.0, -1.0, 0.0));
        let mut hit = Hit::new();

        assert!(plane.intersect(&ray, &mut hit, 0.0));
        assert!(hit.t() == 5.0);
        assert!(*hit.normal() == WorldVector::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn plane_normal_is_not_flipped() {
        let plane = Plane::new(WorldVector::new(0.0, 1.0, 0.0), 0.0, material());
        let ray = Ray::new(WorldPoint::new(0.0, -5.0, 0.0), WorldVector::new(0.0, 1.0, 0.0));
        let mut hit = Hit::new();

        assert!(plane.intersect(&ray, &mut hit, 0.0));
        assert!(*hit.normal() == WorldVector::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn plane_parallel_miss() {
        let plane = Plane::new(WorldVector::new(0.0, 1.0, 0.0), 0.0, material());
        let ray = Ray::new(WorldPoint::new(0.0, 5.0, 0.0), WorldVector::new(1.0, 0.0, 0.0));
        let mut hit = Hit::new();

        assert!(!plane.intersect(&ray, &mut hit, 0.0));
    }

    #[test]
    fn plane_tmin_is_exclusive() {
        let plane = Plane::new(WorldVector::new(0.0, 1.0, 0.0), 0.0, material());
        let ray = Ray::new(WorldPoint::new(0.0, 5.0, 0.0), WorldVector::new(0.0, -1.0, 0.0));
        let mut hit = Hit::new();

        assert!(!plane.intersect(&ray, &mut hit, 5.0));
    }

    #[test]
    fn plane_normal_gets_rescaled() {
        let plane = Plane::new(WorldVector::new(0.0, 0.0, 2.0), 6.0, material());
        assert!(*plane.normal() == WorldVector::new(0.0, 0.0, 1.0));
        assert!(plane.distance() == 3.0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic]
    fn plane_zero_normal() {
        Plane::new(WorldVector::zeros(), 1.0, material());
    }

    #[test]
    fn triangle_hit() {
        let triangle = Triangle::new(
            WorldPoint::new(0.0, 0.0, 0.0),
            WorldPoint::new(1.0, 0.0, 0.0),
            WorldPoint::new(0.0, 1.0, 0.0),
            material(),
        );
        let ray = Ray::new(
            WorldPoint::new(0.25, 0.25, 5.0),
            WorldVector::new(0.0, 0.0, -1.0),
        );
        let mut hit = Hit::new();

        assert!(triangle.intersect(&ray, &mut hit, 0.0));
        assert!((hit.t() - 5.0).abs() < 1e-6);
        assert!(*hit.normal() == WorldVector::new(0.0, 0.0, 1.0));
        assert!((hit.point() - WorldPoint::new(0.25, 0.25, 0.0)).norm() < 1e-6);
    }

    #[test]
    fn triangle_miss() {
        let triangle = Triangle::new(
            WorldPoint::new(0.0, 0.0, 0.0),
            WorldPoint::new(1.0, 0.0, 0.0),
            WorldPoint::new(0.0, 1.0, 0.0),
            material(),
        );
        let ray = Ray::new(
            WorldPoint::new(0.9, 0.9, 5.0),
            WorldVector::new(0.0, 0.0, -1.0),
        );
        let mut hit = Hit::new();

        assert!(!triangle.intersect(&ray, &mut hit, 0.0));
    }

    #[test]
    fn triangle_behind_tmin() {
        let triangle = Triangle::new(
            WorldPoint::new(0.0, 0.0, 0.0),
            WorldPoint::new(1.0, 0.0, 0.0),
            WorldPoint::new(0.0, 1.0, 0.0),
            material(),
        );
        let ray = Ray::new(
            WorldPoint::new(0.25, 0.25, 5.0),
            WorldVector::new(0.0, 0.0, 1.0),
        );
        let mut hit = Hit::new();

        assert!(!triangle.intersect(&ray, &mut hit, 0.0));
    }
}
