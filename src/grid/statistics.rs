use std::fmt::Display;

use log::{debug, info};

use super::Grid;

/// Summary of a set of per-cell node counts.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Occupancy {
    pub count: usize,
    /// None until the first sample
    pub min: Option<usize>,
    pub max: usize,
    pub total: usize,
}

impl Occupancy {
    pub fn add_sample(&mut self, value: usize) {
        self.count += 1;
        self.min = Some(self.min.map_or(value, |min| min.min(value)));
        self.max = self.max.max(value);
        self.total += value;
    }

    pub fn mean(&self) -> f32 {
        if self.count == 0 {
            0.0
        } else {
            self.total as f32 / self.count as f32
        }
    }
}

impl FromIterator<usize> for Occupancy {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        let mut ret = Occupancy::default();
        for value in iter {
            ret.add_sample(value);
        }
        ret
    }
}

impl Display for Occupancy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Some(min) = self.min else {
            return write!(f, "no samples");
        };
        write!(
            f,
            "{} - {}; avg {:.1}; {} samples",
            min,
            self.max,
            self.mean(),
            self.count
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GridStatistics {
    pub resolution: [usize; 3],
    pub empty_cells: usize,
    /// Total number of node references over all cells.
    /// A node spanning several cells is counted once per cell.
    pub references: usize,
    pub unbounded: usize,
    /// Node count of every cell, including the empty ones
    pub all_cells: Occupancy,
    /// Node count of cells with at least one node
    pub occupied_cells: Occupancy,
}

impl Display for GridStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [nx, ny, nz] = self.resolution;
        writeln!(
            f,
            "Resolution: {nx}x{ny}x{nz}, {} cells, {} empty",
            self.all_cells.count, self.empty_cells
        )?;
        writeln!(f, "References: {}", self.references)?;
        writeln!(f, "Unbounded nodes: {}", self.unbounded)?;
        writeln!(f, "Nodes per cell: {}", self.all_cells)?;
        write!(f, "Nodes per occupied cell: {}", self.occupied_cells)
    }
}

impl Grid<'_> {
    pub fn statistics(&self) -> GridStatistics {
        let all_cells: Occupancy = self.cells.iter().map(Vec::len).collect();
        let occupied_cells: Occupancy = self
            .cells
            .iter()
            .map(Vec::len)
            .filter(|&len| len > 0)
            .collect();

        GridStatistics {
            resolution: self.resolution,
            empty_cells: all_cells.count - occupied_cells.count,
            references: all_cells.total,
            unbounded: self.unbounded.len(),
            all_cells,
            occupied_cells,
        }
    }

    pub fn log_statistics(&self) {
        let stats = self.statistics();
        info!(
            "Grid {:?}: {} cells, {} empty, {} references, {} unbounded",
            stats.resolution,
            stats.all_cells.count,
            stats.empty_cells,
            stats.references,
            stats.unbounded
        );
        debug!("Nodes per cell: {}", stats.all_cells);
        debug!("Nodes per occupied cell: {}", stats.occupied_cells);
    }
}
