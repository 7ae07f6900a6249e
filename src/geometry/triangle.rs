use std::ops::{Index, Sub};

use nalgebra::{Point, SVector};

use super::{FloatType, WorldBox, WorldPoint, WorldVector};

/// Three vertices, in winding order.
#[derive(Clone, Debug, PartialEq)]
pub struct Triangle<Point>([Point; 3]);

impl<Point> Triangle<Point> {
    pub fn new(a: Point, b: Point, c: Point) -> Triangle<Point> {
        Triangle([a, b, c])
    }

    pub fn map<Point2, F: FnMut(&Point) -> Point2>(&self, mut f: F) -> Triangle<Point2> {
        Triangle([f(&self[0]), f(&self[1]), f(&self[2])])
    }
}

impl<Point> Index<usize> for Triangle<Point> {
    type Output = Point;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<const D: usize> Triangle<Point<FloatType, D>>
where
    for<'a> &'a Point<FloatType, D>: Sub<Output = SVector<FloatType, D>>,
{
    /// Returns edge vectors, going from self[0]
    pub fn edges(&self) -> [SVector<FloatType, D>; 2] {
        [&self.0[1] - &self.0[0], &self.0[2] - &self.0[0]]
    }
}

impl Triangle<WorldPoint> {
    /// Unit normal following the right hand rule over the winding order.
    /// Zero vector for degenerate triangles.
    pub fn normal(&self) -> WorldVector {
        let [e1, e2] = self.edges();
        e1.cross(&e2).try_normalize(0.0).unwrap_or_else(WorldVector::zeros)
    }

    pub fn bounding_box(&self) -> WorldBox {
        let mut ret = WorldBox::from_point(self[0]);
        ret.extend(&self[1]);
        ret.extend(&self[2]);
        ret
    }
}
