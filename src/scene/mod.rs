mod group;
mod hit;
pub mod primitives;
mod transform;

pub use group::Group;
pub use hit::Hit;
pub use primitives::{Plane, Sphere, Triangle};
pub use transform::Transform;

use thiserror::Error;

use crate::geometry::{FloatType, Ray, WorldBox};

index_vec::define_index_type! {
    /// Index into the material table of the shading code.
    /// Materials are opaque to the scene, they only get passed along to the hit.
    pub struct MaterialIdx = u32;
}

/// Anything a ray can be intersected with.
pub trait Object {
    /// Intersects the ray with the object and updates `hit` if the intersection
    /// lies in `(tmin, hit.t())` (spheres accept `tmin` itself).
    /// Returns true iff `hit` was updated.
    fn intersect(&self, ray: &Ray, hit: &mut Hit, tmin: FloatType) -> bool;

    /// Occlusion query, only the existence of an intersection matters.
    /// Implementations may stop at the first accepted intersection, so the
    /// state of `hit` afterwards is not necessarily the nearest one.
    fn intersect_shadow_ray(&self, ray: &Ray, hit: &mut Hit, tmin: FloatType) -> bool {
        self.intersect(ray, hit, tmin)
    }

    /// Bounding box in the parent's space, None for unbounded objects.
    fn bounding_box(&self) -> Option<WorldBox>;
}

/// Scene tree node.
#[derive(Clone, Debug)]
pub enum Node {
    Sphere(Sphere),
    Plane(Plane),
    Triangle(Triangle),
    Transform(Transform),
    Group(Group),
}

impl Object for Node {
    fn intersect(&self, ray: &Ray, hit: &mut Hit, tmin: FloatType) -> bool {
        match self {
            Node::Sphere(sphere) => sphere.intersect(ray, hit, tmin),
            Node::Plane(plane) => plane.intersect(ray, hit, tmin),
            Node::Triangle(triangle) => triangle.intersect(ray, hit, tmin),
            Node::Transform(transform) => transform.intersect(ray, hit, tmin),
            Node::Group(group) => group.intersect(ray, hit, tmin),
        }
    }

    fn intersect_shadow_ray(&self, ray: &Ray, hit: &mut Hit, tmin: FloatType) -> bool {
        match self {
            Node::Group(group) => group.intersect_shadow_ray(ray, hit, tmin),
            _ => self.intersect(ray, hit, tmin),
        }
    }

    fn bounding_box(&self) -> Option<WorldBox> {
        match self {
            Node::Sphere(sphere) => sphere.bounding_box(),
            Node::Plane(plane) => plane.bounding_box(),
            Node::Triangle(triangle) => triangle.bounding_box(),
            Node::Transform(transform) => transform.bounding_box(),
            Node::Group(group) => group.bounding_box(),
        }
    }
}

impl Node {
    /// False if the subtree contains anything without a bounding box.
    /// Groups still report a box in that case, covering only their bounded children.
    pub fn is_bounded(&self) -> bool {
        match self {
            Node::Sphere(_) | Node::Triangle(_) => true,
            Node::Plane(_) => false,
            Node::Transform(transform) => transform.bounding_box().is_some(),
            Node::Group(group) => group.is_bounded(),
        }
    }
}

macro_rules! node_from {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Node {
                fn from(value: $variant) -> Self {
                    Node::$variant(value)
                }
            }
        )*
    };
}

node_from!(Sphere, Plane, Triangle, Transform, Group);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("Group slot {index} is out of range, group has {size} slots")]
    IndexOutOfRange { index: usize, size: usize },

    #[error("Group slot {index} is already occupied")]
    SlotOccupied { index: usize },
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::{WorldPoint, WorldVector};

    use assert2::assert;
    use proptest::prelude::*;
    use test_strategy::proptest;

    use crate::geometry::test::{RayWrapper, simple_float, simple_positive_float};

    fn arbitrary_primitive() -> BoxedStrategy<Node> {
        let point = || {
            (simple_float(), simple_float(), simple_float())
                .prop_map(|(x, y, z)| WorldPoint::new(x, y, z))
        };
        prop_oneof![
            (point(), simple_positive_float(), 0u32..4).prop_map(|(center, radius, m)| {
                Sphere::new(center, radius, MaterialIdx::from_raw(m)).into()
            }),
            (point(), point(), point(), 0u32..4).prop_map(|(a, b, c, m)| {
                Triangle::new(a, b, c, MaterialIdx::from_raw(m)).into()
            }),
            (simple_float(), simple_float(), simple_float(), simple_float(), 0u32..4)
                .prop_filter_map("zero normal", |(x, y, z, d, m)| {
                    let normal = WorldVector::new(x, y, z);
                    (normal.norm() > 1e-2)
                        .then(|| Plane::new(normal, d, MaterialIdx::from_raw(m)).into())
                }),
        ]
        .boxed()
    }

    /// Hit distance never increases, whatever order the primitives are tested in.
    #[proptest]
    fn hit_distance_is_monotonic(
        #[strategy(proptest::collection::vec(arbitrary_primitive(), 1..12))] primitives: Vec<Node>,
        ray: RayWrapper,
    ) {
        let mut forward = Hit::new();
        let mut previous_t = forward.t();
        for primitive in &primitives {
            primitive.intersect(&ray, &mut forward, 0.0);
            assert!(forward.t() <= previous_t);
            previous_t = forward.t();
        }

        let mut backward = Hit::new();
        for primitive in primitives.iter().rev() {
            primitive.intersect(&ray, &mut backward, 0.0);
        }

        assert!(forward.t() == backward.t());
        assert!(forward.is_hit() == backward.is_hit());
    }

    #[test]
    fn nested_dispatch() {
        let material = MaterialIdx::from_raw(7);
        let node: Node = Group::from_iter([
            Node::from(Sphere::new(WorldPoint::new(0.0, 0.0, 10.0), 1.0, material)),
            Node::from(Plane::new(WorldVector::new(0.0, 1.0, 0.0), -5.0, material)),
        ])
        .into();

        let ray = Ray::new(WorldPoint::origin(), WorldVector::new(0.0, 0.0, 1.0));
        let mut hit = Hit::new();
        assert!(node.intersect(&ray, &mut hit, 0.0));
        assert!(hit.t() == 9.0);
        assert!(hit.material() == Some(material));

        let b = node.bounding_box().unwrap();
        assert!(b.min == WorldPoint::new(-1.0, -1.0, 9.0));
        assert!(b.max == WorldPoint::new(1.0, 1.0, 11.0));
    }
}
