mod extract;
mod grid;
mod marching;

pub use extract::{remove_pole_wedge, reproject, round_coords, ExtractContour, WEDGE_EPSILON};
pub use grid::BathymetryGrid;
pub use marching::{longest_path, trace_contours, ContourPath};
