use geo::{LineString, MultiPolygon, Polygon};

use crate::feature::{Feature, FeatureCollection, Tags};

/// Creates a single-feature collection holding a longitude/latitude box.
///
/// The ring is `(lon0, lat0), (lon1, lat0), (lon1, lat1), (lon0, lat1)`,
/// closed back to the start. Bounds are not reordered: a box with
/// `lat0 > lat1` or spanning the antimeridian is taken as given.
pub struct MakeRectangle {
    lon0: f64,
    lon1: f64,
    lat0: f64,
    lat1: f64,
    name: String,
    author: String,
    tags: Tags,
}

impl MakeRectangle {
    /// Creates a new `MakeRectangle` operation.
    #[must_use]
    pub fn new(lon0: f64, lon1: f64, lat0: f64, lat1: f64) -> Self {
        Self {
            lon0,
            lon1,
            lat0,
            lat1,
            name: String::new(),
            author: String::new(),
            tags: Tags::default(),
        }
    }

    /// Sets name, author and semicolon-joined tags of the feature.
    #[must_use]
    pub fn labeled(mut self, name: &str, author: &str, tags: &str) -> Self {
        self.name = name.into();
        self.author = author.into();
        self.tags = Tags::parse(tags);
        self
    }

    /// Executes the operation.
    #[must_use]
    pub fn execute(&self) -> FeatureCollection {
        let ring = LineString::from(vec![
            (self.lon0, self.lat0),
            (self.lon1, self.lat0),
            (self.lon1, self.lat1),
            (self.lon0, self.lat1),
            (self.lon0, self.lat0),
        ]);
        let geometry = MultiPolygon::new(vec![Polygon::new(ring, Vec::new())]);
        FeatureCollection::single(Feature::region(
            self.name.clone(),
            self.author.clone(),
            self.tags.clone(),
            geometry,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ring(fc: &FeatureCollection) -> Vec<(f64, f64)> {
        fc.features()[0].geometry.0[0]
            .exterior()
            .coords()
            .map(|c| (c.x, c.y))
            .collect()
    }

    #[test]
    fn rectangle_has_five_coordinates() {
        for &(lon0, lon1, lat0, lat1) in &[
            (-170.0, -130.0, 70.5, 80.5),
            (-36.0, 20.0, 86.0, 79.0),
            (180.0, 145.0, 67.0, 80.0),
        ] {
            let fc = MakeRectangle::new(lon0, lon1, lat0, lat1).execute();
            let coords = ring(&fc);
            assert_eq!(coords.len(), 5);
            assert_eq!(coords[0], coords[4]);
        }
    }

    #[test]
    fn corners_are_in_order_and_unvalidated() {
        let fc = MakeRectangle::new(-36.0, 20.0, 86.0, 79.0)
            .labeled("North of Fram Strait", "me", "Arctic_Basin")
            .execute();
        assert_eq!(
            ring(&fc),
            [(-36.0, 86.0), (20.0, 86.0), (20.0, 79.0), (-36.0, 79.0), (-36.0, 86.0)]
        );
        let f = &fc.features()[0];
        assert_eq!(f.name(), "North of Fram Strait");
        assert_eq!(f.properties.tags.to_string(), "Arctic_Basin");
        assert_relative_eq!(f.area(), 56.0 * 7.0, epsilon = 1e-9);
    }
}
