use geo::{LineString, MultiPolygon, Polygon};

use crate::feature::{Feature, FeatureCollection, Tags};
use crate::math::polygon_2d::close_ring;
use crate::math::Point2;

/// Creates a single-feature collection from a hand-specified
/// longitude/latitude ring. The ring is closed if it is not already.
pub struct MakePolygon {
    vertices: Vec<Point2>,
    name: String,
    author: String,
    tags: Tags,
}

impl MakePolygon {
    /// Creates a new `MakePolygon` operation from `(lon, lat)` pairs.
    #[must_use]
    pub fn new(vertices: &[(f64, f64)]) -> Self {
        Self {
            vertices: vertices.iter().map(|&(x, y)| Point2::new(x, y)).collect(),
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
        let ring: LineString<f64> = close_ring(&self.vertices)
            .iter()
            .map(|p| (p.x, p.y))
            .collect::<Vec<_>>()
            .into();
        FeatureCollection::single(Feature::region(
            self.name.clone(),
            self.author.clone(),
            self.tags.clone(),
            MultiPolygon::new(vec![Polygon::new(ring, Vec::new())]),
        ))
    }
}
