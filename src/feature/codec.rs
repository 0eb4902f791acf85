//! Conversion between [`Feature`] and GeoJSON.

use geo::{Coord, LineString, MultiPolygon, Polygon};
use geojson::{JsonObject, JsonValue, PolygonType, Position, Value};

use super::{Feature, FeatureProperties, Tags};
use crate::error::StoreError;

impl Feature {
    /// Builds a GeoJSON feature. Single polygons are written as `Polygon`,
    /// everything else (including empty geometry) as `MultiPolygon`.
    #[must_use]
    pub fn to_geojson(&self) -> geojson::Feature {
        let p = &self.properties;
        let mut properties = JsonObject::new();
        properties.insert("name".into(), JsonValue::from(p.name.clone()));
        properties.insert("tags".into(), JsonValue::from(p.tags.to_string()));
        properties.insert("object".into(), JsonValue::from(p.object.clone()));
        properties.insert("component".into(), JsonValue::from(p.component.clone()));
        properties.insert("author".into(), JsonValue::from(p.author.clone()));
        if !p.constituents.is_empty() {
            properties.insert(
                "constituents".into(),
                JsonValue::from(p.constituents.join("; ")),
            );
        }

        geojson::Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(multipolygon_to_value(&self.geometry))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        }
    }

    /// Reads a GeoJSON feature. `source` names the origin for error messages.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Malformed` if the name is missing, or
    /// `StoreError::UnsupportedGeometry` for anything but (multi-)polygons.
    pub fn from_geojson(feature: geojson::Feature, source: &str) -> Result<Self, StoreError> {
        let properties = feature.properties.unwrap_or_default();
        let text = |key: &str| {
            properties
                .get(key)
                .and_then(JsonValue::as_str)
                .map(String::from)
        };

        let name = text("name").ok_or_else(|| StoreError::Malformed {
            path: source.to_string(),
            reason: "feature has no name".into(),
        })?;
        let constituents = text("constituents")
            .map(|c| {
                c.split(';')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let geometry = match feature.geometry {
            Some(g) => value_to_multipolygon(g.value, source)?,
            None => MultiPolygon::new(Vec::new()),
        };

        Ok(Self {
            properties: FeatureProperties {
                name,
                author: text("author").unwrap_or_default(),
                component: text("component").unwrap_or_else(|| super::OCEAN.into()),
                object: text("object").unwrap_or_else(|| super::REGION.into()),
                tags: Tags::parse(&text("tags").unwrap_or_default()),
                constituents,
            },
            geometry,
        })
    }
}

fn multipolygon_to_value(geometry: &MultiPolygon<f64>) -> Value {
    match geometry.0.as_slice() {
        [single] => Value::Polygon(polygon_rings(single)),
        polygons => Value::MultiPolygon(polygons.iter().map(polygon_rings).collect()),
    }
}

fn polygon_rings(polygon: &Polygon<f64>) -> PolygonType {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(|ring| ring.coords().map(|c| vec![c.x, c.y]).collect())
        .collect()
}

fn value_to_multipolygon(value: Value, source: &str) -> Result<MultiPolygon<f64>, StoreError> {
    match value {
        Value::Polygon(rings) => Ok(MultiPolygon::new(vec![rings_to_polygon(rings, source)?])),
        Value::MultiPolygon(polygons) => Ok(MultiPolygon::new(
            polygons
                .into_iter()
                .map(|rings| rings_to_polygon(rings, source))
                .collect::<Result<_, _>>()?,
        )),
        _ => Err(StoreError::UnsupportedGeometry(source.to_string())),
    }
}

fn rings_to_polygon(rings: PolygonType, source: &str) -> Result<Polygon<f64>, StoreError> {
    let mut rings = rings.into_iter();
    let exterior = match rings.next() {
        Some(ring) => line_string(ring, source)?,
        None => LineString::new(Vec::new()),
    };
    let interiors = rings
        .map(|ring| line_string(ring, source))
        .collect::<Result<_, _>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn line_string(positions: Vec<Position>, source: &str) -> Result<LineString<f64>, StoreError> {
    positions
        .into_iter()
        .map(|p| match p.as_slice() {
            [x, y, ..] => Ok(Coord { x: *x, y: *y }),
            _ => Err(StoreError::Malformed {
                path: source.to_string(),
                reason: "position with fewer than two coordinates".into(),
            }),
        })
        .collect::<Result<Vec<_>, _>>()
        .map(LineString::new)
}
