//! Named, tagged regions and ordered collections of them.

mod codec;

use std::collections::HashSet;
use std::fmt;

use geo::{Area, MultiPolygon};

use crate::error::{GeometryError, Result, StoreError};

/// Component tag carried by every feature this crate produces.
pub const OCEAN: &str = "ocean";

/// Object tag carried by every feature this crate produces.
pub const REGION: &str = "region";

/// A semicolon-separated list of grouping tags, e.g. `Kara_Sea;Arctic`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags(Vec<String>);

impl Tags {
    /// Parses a semicolon-joined tag string. Empty entries are dropped.
    #[must_use]
    pub fn parse(joined: &str) -> Self {
        Self(
            joined
                .split(';')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect(),
        )
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Tags {
    fn from(joined: &str) -> Self {
        Self::parse(joined)
    }
}

impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(";"))
    }
}

/// Descriptive properties of a [`Feature`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureProperties {
    pub name: String,
    pub author: String,
    pub component: String,
    pub object: String,
    pub tags: Tags,
    /// Names of the features a combined feature was built from.
    pub constituents: Vec<String>,
}

/// One named geographic region in longitude/latitude.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub properties: FeatureProperties,
    pub geometry: MultiPolygon<f64>,
}

impl Feature {
    /// Creates an ocean region feature.
    #[must_use]
    pub fn region(
        name: impl Into<String>,
        author: impl Into<String>,
        tags: Tags,
        geometry: MultiPolygon<f64>,
    ) -> Self {
        Self {
            properties: FeatureProperties {
                name: name.into(),
                author: author.into(),
                component: OCEAN.into(),
                object: REGION.into(),
                tags,
                constituents: Vec::new(),
            },
            geometry,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.properties.name
    }

    /// Sets name, author and tags in one go.
    pub fn label(&mut self, name: &str, author: &str, tags: &str) {
        self.properties.name = name.into();
        self.properties.author = author.into();
        self.properties.tags = Tags::parse(tags);
    }

    /// Planar area of the geometry in squared coordinate units.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.geometry.unsigned_area()
    }

    /// Returns `true` if the geometry holds no polygons.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.geometry.0.is_empty()
    }
}

/// An ordered sequence of features.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    features: Vec<Feature>,
}

impl FeatureCollection {
    /// Creates a new, empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a collection holding a single feature.
    #[must_use]
    pub fn single(feature: Feature) -> Self {
        Self {
            features: vec![feature],
        }
    }

    /// Appends copies of `other`'s features after this collection's features.
    ///
    /// Duplicates are allowed; use [`ensure_unique_names`](Self::ensure_unique_names)
    /// before writing.
    pub fn merge(&mut self, other: &FeatureCollection) {
        self.features.extend(other.features.iter().cloned());
    }

    /// Consuming form of [`merge`](Self::merge) for chaining.
    #[must_use]
    pub fn merged(mut self, other: &FeatureCollection) -> Self {
        self.merge(other);
        self
    }

    #[must_use]
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Returns the feature with the given name, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.name() == name)
    }

    /// Returns the first feature mutably, for setting properties after an
    /// algebra operation.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::EmptyCollection` if there is no feature.
    pub fn first_mut(&mut self) -> Result<&mut Feature> {
        self.features
            .first_mut()
            .ok_or_else(|| GeometryError::EmptyCollection("label").into())
    }

    /// Names of all features in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(Feature::name)
    }

    /// Checks that no two features share a name.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DuplicateName` naming the first repeated feature.
    pub fn ensure_unique_names(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for name in self.names() {
            if !seen.insert(name) {
                return Err(StoreError::DuplicateName(name.to_string()).into());
            }
        }
        Ok(())
    }
}

impl FromIterator<Feature> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = Feature>>(iter: I) -> Self {
        Self {
            features: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for FeatureCollection {
    type Item = Feature;
    type IntoIter = std::vec::IntoIter<Feature>;

    fn into_iter(self) -> Self::IntoIter {
        self.features.into_iter()
    }
}
