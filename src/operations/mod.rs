pub mod algebra;
mod combine;
pub mod creation;
mod difference;
mod intersect;

pub use algebra::{GeoAlgebra, PolygonAlgebra};
pub use combine::Combine;
pub use difference::Difference;
pub use intersect::Intersect;

use geo::{CoordsIter, MultiPolygon};

use crate::error::{GeometryError, Result};

/// Checks that a boolean-operation result only holds finite coordinates.
pub(crate) fn validate_geometry(
    feature: &str,
    operation: &'static str,
    geometry: &MultiPolygon<f64>,
) -> Result<()> {
    if let Some(bad) = geometry
        .coords_iter()
        .find(|c| !c.x.is_finite() || !c.y.is_finite())
    {
        return Err(GeometryError::Invalid {
            feature: feature.to_string(),
            operation,
            reason: format!("non-finite coordinate ({}, {})", bad.x, bad.y),
        }
        .into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::polygon;

    #[test]
    fn rejects_nan_coordinates() {
        let bad = MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0), (x: f64::NAN, y: 0.0), (x: 1.0, y: 1.0)
        ]]);
        assert!(validate_geometry("Bad", "union", &bad).is_err());
        let good = MultiPolygon::new(vec![polygon![
            (x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)
        ]]);
        assert!(validate_geometry("Good", "union", &good).is_ok());
    }
}
