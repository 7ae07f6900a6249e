use std::ops::Sub;

use nalgebra::{Point, SVector};

use super::FloatType;

/// Axis aligned box.
/// The empty box is the inverted sentinel min = +inf, max = -inf, so that extending it
/// by any point yields exactly that point.
#[derive(Clone, Debug, PartialEq)]
pub struct AABB<Point> {
    pub min: Point,
    pub max: Point,
}

impl<Point> AABB<Point> {
    pub fn new(min: Point, max: Point) -> AABB<Point> {
        AABB { min, max }
    }
}

impl<Point: Sub + Copy> AABB<Point> {
    pub fn size(&self) -> Point::Output {
        self.max - self.min
    }
}

impl<const D: usize> AABB<Point<FloatType, D>> {
    pub fn empty() -> Self {
        AABB {
            min: Point::from(SVector::repeat(FloatType::INFINITY)),
            max: Point::from(SVector::repeat(FloatType::NEG_INFINITY)),
        }
    }

    /// Box with zero volume exactly covering the point.
    pub fn from_point(p: Point<FloatType, D>) -> Self {
        AABB { min: p, max: p }
    }

    /// Returns a bounding box of the points, or None if the iterator was empty.
    pub fn from_points<'a>(
        points: impl IntoIterator<Item = &'a Point<FloatType, D>>,
    ) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut ret = Self::from_point(*first);
        for p in iter {
            ret.extend(p);
        }
        Some(ret)
    }

    /// True for any box where min > max on some axis, which includes the empty sentinel.
    pub fn is_empty(&self) -> bool {
        self.min
            .coords
            .iter()
            .zip(self.max.coords.iter())
            .any(|(min, max)| !(min <= max))
    }

    pub fn extend(&mut self, p: &Point<FloatType, D>) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    pub fn union(&mut self, other: &Self) {
        if other.is_empty() {
            return;
        }
        self.extend(&other.min);
        self.extend(&other.max);
    }

    pub fn contains(&self, p: &Point<FloatType, D>) -> bool {
        self.min
            .iter()
            .zip(self.max.iter())
            .zip(p.iter())
            .all(|((min, max), x)| min <= x && x <= max)
    }

    pub fn center(&self) -> Point<FloatType, D> {
        nalgebra::center(&self.min, &self.max)
    }
}

impl AABB<super::WorldPoint> {
    /// All eight corners of the box, in no particular order.
    pub fn corners(&self) -> [super::WorldPoint; 8] {
        std::array::from_fn(|i| {
            let pick = |axis: usize| {
                if i & (1 << axis) == 0 {
                    self.min[axis]
                } else {
                    self.max[axis]
                }
            };
            super::WorldPoint::new(pick(0), pick(1), pick(2))
        })
    }
}

impl<Point> From<[Point; 2]> for AABB<Point> {
    fn from(value: [Point; 2]) -> Self {
        let [min, max] = value;
        AABB { min, max }
    }
}

impl<Point> From<(Point, Point)> for AABB<Point> {
    fn from(value: (Point, Point)) -> Self {
        let (min, max) = value;
        AABB { min, max }
    }
}
