//! Generator for the Arctic ocean regions of a shared geographic feature
//! database.

pub mod bathymetry;
pub mod config;
pub mod contour;
pub mod error;
pub mod feature;
pub mod logging;
pub mod math;
pub mod operations;
pub mod regions;
pub mod store;

pub use error::{RegionError, Result};
