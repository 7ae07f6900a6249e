use std::ops::RangeInclusive;

use itertools::iproduct;
use log::trace;

use crate::{
    geometry::{FloatType, WorldBox, WorldVector},
    scene::{Node, Object as _, Sphere},
};

use super::Grid;

impl<'a> Grid<'a> {
    /// Registers the node in every cell it may overlap.
    ///
    /// Spheres use a loose distance test against cell centers, triangles and
    /// transforms are inserted into every cell touched by their bounding box
    /// and groups insert their children one by one.
    /// Nodes completely outside the grid are skipped.
    pub fn insert(&mut self, node: &'a Node) {
        match node {
            Node::Sphere(sphere) => self.insert_sphere(node, sphere),
            Node::Plane(_) => self.unbounded.push(node),
            Node::Triangle(_) | Node::Transform(_) => match node.bounding_box() {
                Some(bounding_box) => self.insert_box(node, &bounding_box),
                None => self.unbounded.push(node),
            },
            Node::Group(group) => {
                for child in group.children() {
                    self.insert(child);
                }
            }
        }
    }

    /// Inserts the sphere to every cell whose center is closer to the sphere center
    /// than radius + half of the cell diagonal.
    fn insert_sphere(&mut self, node: &'a Node, sphere: &Sphere) {
        let reach = sphere.radius + self.cell_size.norm() / 2.0;
        let center = self.to_cell_space(&sphere.center);
        let reach_cells = self.cell_size.map(|size| reach / size);

        // Cells whose centers can possibly be within reach, the exact test follows
        let lo = center - reach_cells - WorldVector::repeat(0.5);
        let hi = center + reach_cells - WorldVector::repeat(0.5);
        let Some([i_range, j_range, k_range]) = self.cell_ranges(&lo, &hi.map(FloatType::ceil))
        else {
            trace!("Sphere at {:?} is outside of the grid", sphere.center);
            return;
        };

        let center_offset = sphere.center - self.bounding_box.min;
        for (k, j, i) in iproduct!(k_range, j_range, i_range) {
            let cell_center = WorldVector::new(i as FloatType, j as FloatType, k as FloatType)
                .add_scalar(0.5)
                .component_mul(&self.cell_size);
            if (cell_center - center_offset).norm() < reach {
                let index = self.cell_index(i, j, k);
                self.cells[index].push(node);
            }
        }
    }

    /// Inserts the node to every cell that overlaps the bounding box.
    fn insert_box(&mut self, node: &'a Node, bounding_box: &WorldBox) {
        let lo = self.to_cell_space(&bounding_box.min);
        let hi = self.to_cell_space(&bounding_box.max);
        let Some([i_range, j_range, k_range]) = self.cell_ranges(&lo, &hi) else {
            trace!("Bounding box {bounding_box:?} is outside of the grid");
            return;
        };

        for (k, j, i) in iproduct!(k_range, j_range, i_range) {
            let index = self.cell_index(i, j, k);
            self.cells[index].push(node);
        }
    }

    /// Clamped cell index ranges for all three axes, None if any of them misses the grid.
    fn cell_ranges(&self, lo: &WorldVector, hi: &WorldVector) -> Option<[RangeInclusive<usize>; 3]> {
        Some([
            self.axis_range(0, lo.x, hi.x)?,
            self.axis_range(1, lo.y, hi.y)?,
            self.axis_range(2, lo.z, hi.z)?,
        ])
    }
}
