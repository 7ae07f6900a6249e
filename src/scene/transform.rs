use log::warn;
use nalgebra::Matrix3;

use crate::geometry::{FloatType, Ray, WorldBox, WorldMatrix};

use super::{Hit, Node, Object};

/// Child node placed into the scene through an affine transformation.
#[derive(Clone, Debug)]
pub struct Transform {
    matrix: WorldMatrix,
    /// None if the matrix is singular, such transform never intersects anything.
    inverse: Option<WorldMatrix>,
    child: Box<Node>,
    bounding_box: Option<WorldBox>,
}

impl Transform {
    /// `matrix` maps from the child's space to the parent's space.
    pub fn new(matrix: WorldMatrix, child: impl Into<Node>) -> Transform {
        let child = Box::new(child.into());
        let inverse = matrix.try_inverse();
        if inverse.is_none() {
            warn!("Singular transformation matrix, the transformed object will not be visible");
        }

        let bounding_box = match child.as_ref() {
            // Transforming the triangle vertices directly gives a tighter box than
            // transforming the corners of the triangle's box.
            Node::Triangle(triangle) => Some(
                triangle
                    .vertices()
                    .map(|p| matrix.transform_point(p))
                    .bounding_box(),
            ),
            // A plane anywhere below makes the transformed subtree unbounded,
            // even if a group around it reports a finite box.
            child if !child.is_bounded() => None,
            child => child.bounding_box().map(|child_box| {
                if child_box.is_empty() {
                    child_box
                } else {
                    let mut ret = WorldBox::empty();
                    for corner in child_box.corners() {
                        ret.extend(&matrix.transform_point(&corner));
                    }
                    ret
                }
            }),
        };

        Transform {
            matrix,
            inverse,
            child,
            bounding_box,
        }
    }

    pub fn matrix(&self) -> &WorldMatrix {
        &self.matrix
    }

    pub fn child(&self) -> &Node {
        &self.child
    }

    pub fn is_invertible(&self) -> bool {
        self.inverse.is_some()
    }

    /// Linear part of the inverse matrix, drops translation and the projective row.
    fn inverse_linear(inverse: &WorldMatrix) -> Matrix3<FloatType> {
        inverse.fixed_view::<3, 3>(0, 0).into_owned()
    }
}

impl Object for Transform {
    fn intersect(&self, ray: &Ray, hit: &mut Hit, tmin: FloatType) -> bool {
        let Some(inverse) = &self.inverse else {
            return false;
        };
        let linear = Self::inverse_linear(inverse);

        // Direction stays unnormalized, so that `t` is shared by both spaces.
        let local_ray = Ray::new(inverse.transform_point(&ray.origin), linear * ray.direction);

        if !self.child.intersect(&local_ray, hit, tmin) {
            return false;
        }

        let normal = (linear.transpose() * hit.normal()).normalize();
        hit.reproject(normal, ray);
        true
    }

    fn bounding_box(&self) -> Option<WorldBox> {
        self.bounding_box.clone()
    }
}
