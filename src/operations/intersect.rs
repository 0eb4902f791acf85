use crate::error::Result;
use crate::feature::{Feature, FeatureCollection};

use super::algebra::PolygonAlgebra;
use super::validate_geometry;

/// Intersects every feature of a collection with the union of another
/// collection's geometries, preserving the first collection's properties.
pub struct Intersect<'a> {
    target: &'a FeatureCollection,
    clip: &'a FeatureCollection,
}

impl<'a> Intersect<'a> {
    /// Creates a new `Intersect` operation computing `target ∩ clip`.
    #[must_use]
    pub fn new(target: &'a FeatureCollection, clip: &'a FeatureCollection) -> Self {
        Self { target, clip }
    }

    /// Executes the intersection feature by feature.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Invalid` if a clipped geometry is not finite.
    pub fn execute<A: PolygonAlgebra>(&self, algebra: &A) -> Result<FeatureCollection> {
        let mask = algebra.union_all(self.clip.features().iter().map(|f| &f.geometry));
        self.target
            .features()
            .iter()
            .map(|feature| {
                let geometry = algebra.intersection(&feature.geometry, &mask);
                validate_geometry(feature.name(), "intersection", &geometry)?;
                Ok(Feature {
                    properties: feature.properties.clone(),
                    geometry,
                })
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::feature::Tags;
    use crate::operations::algebra::GeoAlgebra;
    use crate::operations::Difference;
    use approx::assert_relative_eq;
    use geo::{polygon, MultiPolygon};

    fn feature(name: &str, poly: geo::Polygon<f64>) -> FeatureCollection {
        FeatureCollection::single(Feature::region(
            name,
            "someone",
            Tags::default(),
            MultiPolygon::new(vec![poly]),
        ))
    }

    #[test]
    fn double_difference_matches_intersection() {
        let rect = feature(
            "Box",
            polygon![(x: -170.0, y: 70.5), (x: -130.0, y: 70.5), (x: -130.0, y: 80.5), (x: -170.0, y: 80.5)],
        );
        let blob = feature(
            "Contour",
            polygon![
                (x: -180.0, y: 72.3), (x: -150.0, y: 71.1), (x: -125.0, y: 73.7),
                (x: -120.0, y: 90.0), (x: -180.0, y: 90.0)
            ],
        );
        let outside = Difference::new(&rect, &blob).execute(&GeoAlgebra).unwrap();
        let inside = Difference::new(&rect, &outside).execute(&GeoAlgebra).unwrap();
        let direct = Intersect::new(&rect, &blob).execute(&GeoAlgebra).unwrap();

        let a = inside.features()[0].area();
        let b = direct.features()[0].area();
        assert!(a > 0.0);
        assert_relative_eq!(a, b, max_relative = 1e-6);
        let xor_area = GeoAlgebra.area(&GeoAlgebra.difference(
            &inside.features()[0].geometry,
            &direct.features()[0].geometry,
        )) + GeoAlgebra.area(&GeoAlgebra.difference(
            &direct.features()[0].geometry,
            &inside.features()[0].geometry,
        ));
        assert!(xor_area < 1e-4, "symmetric difference {xor_area}");
    }

    #[test]
    fn disjoint_intersection_is_empty_but_kept() {
        let a = feature("A", polygon![(x: 0.0, y: 0.0), (x: 1.0, y: 0.0), (x: 1.0, y: 1.0)]);
        let b = feature("B", polygon![(x: 5.0, y: 5.0), (x: 6.0, y: 5.0), (x: 6.0, y: 6.0)]);
        let out = Intersect::new(&a, &b).execute(&GeoAlgebra).unwrap();
        assert_eq!(out.len(), 1);
        assert!(out.features()[0].is_empty());
    }
}
