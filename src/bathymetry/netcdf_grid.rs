//! Reads GMT/COARDS NetCDF grids with `x`, `y` and `z(y, x)` variables.

use std::path::Path;

use crate::contour::BathymetryGrid;
use crate::error::{BathymetryError, Result};

#[cfg(feature = "netcdf")]
/// Reads a grid file.
///
/// # Errors
///
/// Returns `BathymetryError::Grid` if the file cannot be opened, lacks one of
/// the variables, or has inconsistent dimensions.
pub fn read_grid(path: &Path) -> Result<BathymetryGrid> {
    let grid_err = |e: netcdf::Error| BathymetryError::Grid(format!("{}: {e}", path.display()));

    let file = netcdf::open(path).map_err(grid_err)?;
    let variable = |name: &str| {
        file.variable(name).ok_or_else(|| {
            BathymetryError::Grid(format!("{}: missing variable `{name}`", path.display()))
        })
    };

    let x = variable("x")?.get_values::<f64, _>(..).map_err(grid_err)?;
    let y = variable("y")?.get_values::<f64, _>(..).map_err(grid_err)?;
    let z = variable("z")?.get_values::<f32, _>(..).map_err(grid_err)?;
    tracing::debug!(width = x.len(), height = y.len(), "read bathymetry grid");

    BathymetryGrid::new(x, y, z)
}

#[cfg(not(feature = "netcdf"))]
/// Always fails: reading grids needs the `netcdf` feature.
///
/// # Errors
///
/// Returns `BathymetryError::Grid` naming the missing feature.
pub fn read_grid(path: &Path) -> Result<BathymetryGrid> {
    Err(BathymetryError::Grid(format!(
        "cannot read {}: built without the `netcdf` feature",
        path.display()
    ))
    .into())
}

/// Writes a grid in the layout [`read_grid`] expects.
#[cfg(all(test, feature = "netcdf"))]
pub(crate) fn write_grid(path: &Path, x: &[f64], y: &[f64], z: &[f32]) -> Result<(), netcdf::Error> {
    let mut file = netcdf::create(path)?;
    file.add_dimension("x", x.len())?;
    file.add_dimension("y", y.len())?;
    file.add_variable::<f64>("x", &["x"])?.put_values(x, ..)?;
    file.add_variable::<f64>("y", &["y"])?.put_values(y, ..)?;
    file.add_variable::<f32>("z", &["y", "x"])?.put_values(z, ..)?;
    Ok(())
}

#[cfg(all(test, feature = "netcdf"))]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn reads_axes_and_depths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.grd");
        let z = [-10.0, -20.0, -30.0, -40.0, -50.0, -60.0];
        write_grid(&path, &[0.0, 500.0, 1000.0], &[-500.0, 0.0], &z).unwrap();

        let grid = read_grid(&path).unwrap();
        assert_eq!((grid.width(), grid.height()), (3, 2));
        assert_eq!(grid.x(), [0.0, 500.0, 1000.0]);
        assert_eq!(grid.y(), [-500.0, 0.0]);
        assert!((grid.value(2, 1) + 60.0).abs() < f64::EPSILON);
        assert!((grid.value(0, 1) + 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_variable_is_a_grid_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.grd");
        let mut file = netcdf::create(&path).unwrap();
        file.add_dimension("x", 2).unwrap();
        drop(file);
        assert!(matches!(
            read_grid(&path),
            Err(crate::error::RegionError::Bathymetry(BathymetryError::Grid(_)))
        ));
    }
}
