pub mod geometry;
pub mod grid;
pub mod scene;

pub use grid::{Grid, GridError};
pub use scene::{Hit, MaterialIdx, Node, Object};
