mod insertion;
mod statistics;
mod traversal;

pub use statistics::{GridStatistics, Occupancy};

use std::ops::RangeInclusive;

use bon::bon;
use index_vec::{IndexSlice, IndexVec};
use log::debug;
use thiserror::Error;

use crate::{
    geometry::{FloatType, WorldBox, WorldPoint, WorldVector},
    scene::{Node, Object as _},
};

index_vec::define_index_type! {
    /// Flat index of a grid cell, `nx * ny * k + nx * j + i`.
    pub struct CellIdx = u32;
}

/// Flat scenes get their zero-thickness axes padded by this fraction of the largest extent.
const FLAT_AXIS_PADDING: FloatType = 1e-3;

/// Uniform grid over a fixed bounding box.
///
/// Each cell lists every node that may overlap it. Nodes are borrowed from the
/// scene tree, which has to outlive the grid and stays read only.
#[derive(Clone, Debug)]
pub struct Grid<'a> {
    bounding_box: WorldBox,
    resolution: [usize; 3],
    cell_size: WorldVector,
    cells: IndexVec<CellIdx, Vec<&'a Node>>,
    /// Nodes without a bounding box, tested by every query.
    unbounded: Vec<&'a Node>,
}

#[bon]
impl<'a> Grid<'a> {
    /// Creates an empty grid of `resolution[0] x resolution[1] x resolution[2]` cells
    /// spanning the bounding box.
    #[builder]
    pub fn new(bounding_box: WorldBox, resolution: [usize; 3]) -> Result<Self, GridError> {
        if bounding_box.is_empty() {
            return Err(GridError::EmptyBoundingBox);
        }
        if resolution.contains(&0) {
            return Err(GridError::ZeroResolution { resolution });
        }

        let size = bounding_box.size();
        if let Some(axis) = (0..3).find(|&axis| !(size[axis] > 0.0)) {
            return Err(GridError::DegenerateExtent {
                axis,
                extent: size[axis],
            });
        }

        let cell_count = resolution
            .iter()
            .try_fold(1usize, |acc, n| acc.checked_mul(*n))
            .filter(|count| *count <= u32::MAX as usize)
            .ok_or(GridError::TooManyCells { resolution })?;

        let cell_size = size.component_div(&WorldVector::from(resolution.map(|n| n as FloatType)));

        debug!(
            "Creating {}x{}x{} grid, cell size {:?}",
            resolution[0], resolution[1], resolution[2], cell_size
        );

        Ok(Grid {
            bounding_box,
            resolution,
            cell_size,
            cells: IndexVec::from_vec(vec![Vec::new(); cell_count]),
            unbounded: Vec::new(),
        })
    }
}

impl<'a> Grid<'a> {
    /// Builds a grid around the whole scene and inserts the scene into it.
    /// Axes where the scene has zero thickness get padded.
    pub fn with_scene(root: &'a Node, resolution: [usize; 3]) -> Result<Self, GridError> {
        let bounding_box = root
            .bounding_box()
            .filter(|b| !b.is_empty())
            .ok_or(GridError::EmptyBoundingBox)?;

        let mut grid = Grid::builder()
            .bounding_box(pad_flat_axes(bounding_box))
            .resolution(resolution)
            .build()?;
        grid.insert(root);
        Ok(grid)
    }

    /// Picks a resolution with roughly `target_cells` cells that are as close to cubes as possible.
    pub fn suggest_resolution(bounding_box: &WorldBox, target_cells: usize) -> [usize; 3] {
        let size = bounding_box.size();
        let max_extent = size.max();
        if bounding_box.is_empty() || !(max_extent > 0.0) || target_cells == 0 {
            return [1, 1, 1];
        }

        let floor_extent = max_extent * FLAT_AXIS_PADDING;
        let volume = size.map(|x| x.max(floor_extent)).product();
        let cell_edge = (volume / target_cells as FloatType).cbrt();

        size.map(|x| ((x / cell_edge).round() as usize).clamp(1, target_cells))
            .into()
    }

    pub fn bounding_box(&self) -> &WorldBox {
        &self.bounding_box
    }

    pub fn resolution(&self) -> [usize; 3] {
        self.resolution
    }

    pub fn cell_size(&self) -> &WorldVector {
        &self.cell_size
    }

    pub fn cell_index(&self, i: usize, j: usize, k: usize) -> CellIdx {
        let [nx, ny, nz] = self.resolution;
        assert2::debug_assert!(i < nx && j < ny && k < nz);
        CellIdx::from_usize(nx * ny * k + nx * j + i)
    }

    /// Inverse of [`Grid::cell_index`]
    pub fn cell_coordinates(&self, index: CellIdx) -> [usize; 3] {
        let [nx, ny, _] = self.resolution;
        let index = index.index();
        [index % nx, (index / nx) % ny, index / (nx * ny)]
    }

    /// Nodes registered in cell `(i, j, k)`
    pub fn cell(&self, i: usize, j: usize, k: usize) -> &[&'a Node] {
        &self.cells[self.cell_index(i, j, k)]
    }

    pub fn cells(&self) -> &IndexSlice<CellIdx, [Vec<&'a Node>]> {
        &self.cells
    }

    /// Nodes that have no bounding box and are outside of the cell structure
    pub fn unbounded(&self) -> &[&'a Node] {
        &self.unbounded
    }

    /// World space box of cell `(i, j, k)`
    pub fn cell_box(&self, i: usize, j: usize, k: usize) -> WorldBox {
        let min = self.bounding_box.min
            + WorldVector::new(i as FloatType, j as FloatType, k as FloatType)
                .component_mul(&self.cell_size);
        WorldBox::new(min, min + self.cell_size)
    }

    /// Converts a world space point to (fractional) cell coordinates.
    fn to_cell_space(&self, p: &WorldPoint) -> WorldVector {
        (p - self.bounding_box.min).component_div(&self.cell_size)
    }

    /// Range of valid cell indices along an axis covering the fractional cell
    /// coordinates `lo..=hi`, or None if the range misses the grid completely.
    /// Ranges touching the grid boundary from outside map to the boundary cell.
    fn axis_range(&self, axis: usize, lo: FloatType, hi: FloatType) -> Option<RangeInclusive<usize>> {
        let n = self.resolution[axis] as FloatType;
        if !(lo <= n && hi >= 0.0) {
            return None;
        }
        let clamp = |x: FloatType| x.floor().clamp(0.0, n - 1.0) as usize;
        Some(clamp(lo)..=clamp(hi))
    }
}

fn pad_flat_axes(mut bounding_box: WorldBox) -> WorldBox {
    let size = bounding_box.size();
    let magnitude = bounding_box
        .min
        .coords
        .abs()
        .max()
        .max(bounding_box.max.coords.abs().max());
    let padding = (size.max() * FLAT_AXIS_PADDING)
        .max(magnitude * FLAT_AXIS_PADDING * 1e-2)
        .max(FLAT_AXIS_PADDING);

    for axis in 0..3 {
        if !(size[axis] > 0.0) {
            bounding_box.min[axis] -= padding;
            bounding_box.max[axis] += padding;
        }
    }
    bounding_box
}

#[derive(Debug, Error, PartialEq)]
pub enum GridError {
    #[error("Grid bounding box is empty")]
    EmptyBoundingBox,

    #[error("Grid bounding box has non-positive extent {extent} along axis {axis}")]
    DegenerateExtent { axis: usize, extent: FloatType },

    #[error("Grid resolution {resolution:?} has zero cells along some axis")]
    ZeroResolution { resolution: [usize; 3] },

    #[error("Grid resolution {resolution:?} has too many cells")]
    TooManyCells { resolution: [usize; 3] },
}
