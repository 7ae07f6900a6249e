use std::ops::ControlFlow;

use crate::{
    geometry::{FloatType, Ray, WorldBox},
    scene::{Hit, Object},
};

use super::{CellIdx, Grid};

/// Relative distance before a cell's entry point, where a hit still doesn't end the walk.
/// Geometry touching a cell boundary may have been registered only on one side of it.
const CELL_BOUNDARY_SLACK: FloatType = 1e-4;

/// True if `hit_t` lies safely before the cell entered at `t_cell`.
fn is_before_cell(hit_t: FloatType, t_cell: FloatType) -> bool {
    hit_t < t_cell - CELL_BOUNDARY_SLACK * t_cell.abs().max(1.0)
}

impl Grid<'_> {
    /// Walks the cells pierced by the ray in order of increasing distance (3D DDA),
    /// starting at distance `tmin` or at the grid entry point, whichever is farther.
    ///
    /// `visit` gets the index of each cell and the distance at which the ray enters it,
    /// the walk stops early when it returns `ControlFlow::Break`.
    pub fn walk<B>(
        &self,
        ray: &Ray,
        tmin: FloatType,
        mut visit: impl FnMut(CellIdx, FloatType) -> ControlFlow<B>,
    ) -> ControlFlow<B> {
        let (t_enter, t_exit) = self.bounding_box.intersect_ray(ray);
        let t_start = t_enter.max(tmin);
        if !(t_start <= t_exit) {
            return ControlFlow::Continue(());
        }

        let start = self.to_cell_space(&ray.point_at(t_start));
        let mut cell = [0usize; 3];
        let mut step = [0isize; 3];
        let mut t_next = [FloatType::INFINITY; 3];
        let mut t_delta = [FloatType::INFINITY; 3];

        for axis in 0..3 {
            let n = self.resolution[axis];
            cell[axis] = (start[axis].floor().max(0.0) as usize).min(n - 1);

            let d = ray.direction[axis];
            if d == 0.0 {
                continue;
            }
            let (boundary, axis_step) = if d > 0.0 {
                (cell[axis] + 1, 1)
            } else {
                (cell[axis], -1)
            };
            let boundary =
                self.bounding_box.min[axis] + boundary as FloatType * self.cell_size[axis];

            step[axis] = axis_step;
            t_next[axis] = (boundary - ray.origin[axis]) / d;
            t_delta[axis] = self.cell_size[axis] / d.abs();
        }

        let mut t_cell = t_start;
        loop {
            visit(self.cell_index(cell[0], cell[1], cell[2]), t_cell)?;

            let axis = if t_next[0] <= t_next[1] && t_next[0] <= t_next[2] {
                0
            } else if t_next[1] <= t_next[2] {
                1
            } else {
                2
            };

            if !(t_next[axis] < t_exit) {
                break;
            }
            let Some(next) = cell[axis]
                .checked_add_signed(step[axis])
                .filter(|&next| next < self.resolution[axis])
            else {
                break;
            };

            cell[axis] = next;
            t_cell = t_next[axis];
            t_next[axis] += t_delta[axis];
        }

        ControlFlow::Continue(())
    }
}

impl Object for Grid<'_> {
    /// Tests the unbounded nodes first, then walks the cells until the nearest hit
    /// lies before the next cell.
    fn intersect(&self, ray: &Ray, hit: &mut Hit, tmin: FloatType) -> bool {
        let mut found = false;
        for node in &self.unbounded {
            found |= node.intersect(ray, hit, tmin);
        }

        let _ = self.walk(ray, tmin, |index, t_cell| {
            if is_before_cell(hit.t(), t_cell) {
                return ControlFlow::Break(());
            }
            for node in &self.cells[index] {
                found |= node.intersect(ray, hit, tmin);
            }
            ControlFlow::Continue(())
        });

        found
    }

    fn intersect_shadow_ray(&self, ray: &Ray, hit: &mut Hit, tmin: FloatType) -> bool {
        if self
            .unbounded
            .iter()
            .any(|node| node.intersect_shadow_ray(ray, hit, tmin))
        {
            return true;
        }

        let result = self.walk(ray, tmin, |index, t_cell| {
            if is_before_cell(hit.t(), t_cell) {
                ControlFlow::Break(false)
            } else if self.cells[index]
                .iter()
                .any(|node| node.intersect_shadow_ray(ray, hit, tmin))
            {
                ControlFlow::Break(true)
            } else {
                ControlFlow::Continue(())
            }
        });

        matches!(result, ControlFlow::Break(true))
    }

    fn bounding_box(&self) -> Option<WorldBox> {
        Some(self.bounding_box.clone())
    }
}
