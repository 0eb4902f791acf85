use tracing::{debug, warn};

use crate::error::Result;
use crate::feature::{Feature, FeatureCollection};

use super::algebra::PolygonAlgebra;
use super::validate_geometry;

/// Subtracts the union of one collection's geometries from every feature of
/// another.
///
/// Feature identities and properties of the minuend are preserved. A
/// feature whose geometry becomes empty is kept, not dropped.
pub struct Difference<'a> {
    minuend: &'a FeatureCollection,
    subtrahend: &'a FeatureCollection,
}

impl<'a> Difference<'a> {
    /// Creates a new `Difference` operation computing `minuend − subtrahend`.
    #[must_use]
    pub fn new(minuend: &'a FeatureCollection, subtrahend: &'a FeatureCollection) -> Self {
        Self {
            minuend,
            subtrahend,
        }
    }

    /// Executes the difference feature by feature.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Invalid` if a clipped geometry is not finite.
    pub fn execute<A: PolygonAlgebra>(&self, algebra: &A) -> Result<FeatureCollection> {
        let mask = algebra.union_all(self.subtrahend.features().iter().map(|f| &f.geometry));

        self.minuend
            .features()
            .iter()
            .map(|feature| {
                let geometry = algebra.difference(&feature.geometry, &mask);
                validate_geometry(feature.name(), "difference", &geometry)?;
                if geometry.0.is_empty() {
                    warn!(name = feature.name(), "difference left an empty geometry");
                } else {
                    debug!(
                        name = feature.name(),
                        before = algebra.area(&feature.geometry),
                        after = algebra.area(&geometry),
                        "clipped feature"
                    );
                }
                Ok(Feature {
                    properties: feature.properties.clone(),
                    geometry,
                })
            })
            .collect()
    }
}
