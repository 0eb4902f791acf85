use tracing::debug;

use crate::error::{GeometryError, Result};
use crate::feature::{Feature, FeatureCollection, FeatureProperties, Tags};

use super::algebra::PolygonAlgebra;
use super::validate_geometry;

/// Unions the geometries of every feature in a collection into one new
/// feature.
///
/// The result carries the given name, the component/object of the first
/// input, the distinct input authors joined with `"; "`, empty tags and the
/// input names as constituents. Callers are expected to set author and tags
/// explicitly afterwards.
pub struct Combine<'a> {
    collection: &'a FeatureCollection,
    name: String,
}

impl<'a> Combine<'a> {
    /// Creates a new `Combine` operation.
    #[must_use]
    pub fn new(collection: &'a FeatureCollection, name: impl Into<String>) -> Self {
        Self {
            collection,
            name: name.into(),
        }
    }

    /// Executes the union, returning a single-feature collection.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::EmptyCollection` if the collection has no
    /// features, or `GeometryError::Invalid` if the union is not finite.
    pub fn execute<A: PolygonAlgebra>(&self, algebra: &A) -> Result<FeatureCollection> {
        let first = self
            .collection
            .features()
            .first()
            .ok_or(GeometryError::EmptyCollection("combine"))?;

        let geometry = algebra.union_all(self.collection.features().iter().map(|f| &f.geometry));
        validate_geometry(&self.name, "combine", &geometry)?;

        let mut authors: Vec<&str> = Vec::new();
        for f in self.collection.features() {
            let author = f.properties.author.as_str();
            if !authors.contains(&author) {
                authors.push(author);
            }
        }

        let constituents: Vec<String> = self.collection.names().map(String::from).collect();
        debug!(
            name = %self.name,
            parts = constituents.len(),
            area = algebra.area(&geometry),
            "combined features"
        );

        Ok(FeatureCollection::single(Feature {
            properties: FeatureProperties {
                name: self.name.clone(),
                author: authors.join("; "),
                component: first.properties.component.clone(),
                object: first.properties.object.clone(),
                tags: Tags::default(),
                constituents,
            },
            geometry,
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::operations::algebra::GeoAlgebra;
    use approx::assert_relative_eq;
    use geo::{polygon, MultiPolygon};

    fn rect(name: &str, author: &str, x0: f64, x1: f64) -> Feature {
        let poly = polygon![(x: x0, y: 0.0), (x: x1, y: 0.0), (x: x1, y: 1.0), (x: x0, y: 1.0)];
        Feature::region(name, author, Tags::parse("Old"), MultiPolygon::new(vec![poly]))
    }

    #[test]
    fn combine_yields_one_feature_with_union_area() {
        let fc: FeatureCollection = vec![
            rect("A", "alice", 0.0, 2.0),
            rect("B", "bob", 1.0, 3.0),
            rect("C", "alice", 5.0, 6.0),
        ]
        .into_iter()
        .collect();
        let out = Combine::new(&fc, "ABC").execute(&GeoAlgebra).unwrap();
        assert_eq!(out.len(), 1);
        let f = &out.features()[0];
        assert_eq!(f.name(), "ABC");
        assert_relative_eq!(f.area(), 4.0, epsilon = 1e-9);
        assert_eq!(f.properties.author, "alice; bob");
        assert!(f.properties.tags.is_empty());
        assert_eq!(f.properties.constituents, ["A", "B", "C"]);
    }

    #[test]
    fn combine_single_feature_keeps_geometry() {
        let fc = FeatureCollection::single(rect("A", "alice", 0.0, 2.0));
        let out = Combine::new(&fc, "Renamed").execute(&GeoAlgebra).unwrap();
        assert_relative_eq!(out.features()[0].area(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn combine_empty_fails() {
        let fc = FeatureCollection::new();
        assert!(Combine::new(&fc, "Nothing").execute(&GeoAlgebra).is_err());
    }
}
