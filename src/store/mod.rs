//! The on-disk feature database.
//!
//! Features live at `<root>/<component>/<object>/<Name_With_Underscores>/<object>.geojson`,
//! one GeoJSON `FeatureCollection` per file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use geojson::{GeoJson, JsonObject, JsonValue};
use tracing::{debug, info};

use crate::error::{Result, StoreError};
use crate::feature::{Feature, FeatureCollection, OCEAN, REGION};

/// Value of the `groupName` member written into every feature file.
pub const GROUP_NAME: &str = "enterGroupName";

/// `{component: {object: {name: [tags]}}}`, sorted at every level.
pub type NamesAndTags = BTreeMap<String, BTreeMap<String, BTreeMap<String, Vec<String>>>>;

/// Handle on a feature database rooted at a directory.
#[derive(Debug, Clone)]
pub struct FeatureStore {
    root: PathBuf,
}

impl FeatureStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding the named feature. Spaces in the name become
    /// underscores.
    #[must_use]
    pub fn feature_path(&self, component: &str, object: &str, name: &str) -> PathBuf {
        self.root
            .join(component)
            .join(object)
            .join(name.replace(' ', "_"))
            .join(format!("{object}.geojson"))
    }

    /// Reads the named features, in the order given.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::FeatureNotFound` if a name has no file, or a
    /// parse error if a file is not valid GeoJSON.
    pub fn read(&self, component: &str, object: &str, names: &[&str]) -> Result<FeatureCollection> {
        let mut fc = FeatureCollection::new();
        for &name in names {
            let path = self.feature_path(component, object, name);
            if !path.is_file() {
                return Err(StoreError::FeatureNotFound {
                    component: component.to_string(),
                    object: object.to_string(),
                    name: name.to_string(),
                }
                .into());
            }
            fc.merge(&read_file(&path)?);
        }
        debug!(component, object, count = fc.len(), "read features");
        Ok(fc)
    }

    /// Shorthand for [`read`](Self::read) on ocean regions.
    ///
    /// # Errors
    ///
    /// See [`read`](Self::read).
    pub fn read_regions(&self, names: &[&str]) -> Result<FeatureCollection> {
        self.read(OCEAN, REGION, names)
    }

    /// Writes every feature to its own file, replacing what was there.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if a directory or file cannot be written.
    pub fn split(&self, collection: &FeatureCollection) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(collection.len());
        for feature in collection.features() {
            let p = &feature.properties;
            let path = self.feature_path(&p.component, &p.object, &p.name);
            if let Some(dir) = path.parent() {
                fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
            }
            fs::write(&path, feature_file(feature)?).map_err(|e| StoreError::io(&path, e))?;
            debug!(path = %path.display(), "wrote feature");
            written.push(path);
        }
        info!(count = written.len(), root = %self.root.display(), "split features into store");
        Ok(written)
    }

    /// Scans the whole store and collects the tags of every feature.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Io` if a directory cannot be listed, or a parse
    /// error for an unreadable feature file.
    pub fn names_and_tags(&self) -> Result<NamesAndTags> {
        let mut index = NamesAndTags::new();
        for component_dir in subdirs(&self.root)? {
            for object_dir in subdirs(&component_dir)? {
                let Some(object) = object_dir.file_name().and_then(|o| o.to_str()) else {
                    continue;
                };
                let file_name = format!("{object}.geojson");
                for feature_dir in subdirs(&object_dir)? {
                    let path = feature_dir.join(&file_name);
                    if !path.is_file() {
                        continue;
                    }
                    for feature in read_file(&path)? {
                        let p = feature.properties;
                        index
                            .entry(p.component)
                            .or_default()
                            .entry(p.object)
                            .or_default()
                            .insert(p.name, p.tags.as_slice().to_vec());
                    }
                }
            }
        }
        Ok(index)
    }

    /// Writes [`names_and_tags`](Self::names_and_tags) as pretty JSON to
    /// `dest`.
    ///
    /// # Errors
    ///
    /// See [`names_and_tags`](Self::names_and_tags); also fails if `dest`
    /// cannot be written.
    pub fn write_names_and_tags(&self, dest: &Path) -> Result<()> {
        let index = self.names_and_tags()?;
        let text = serde_json::to_string_pretty(&index).map_err(StoreError::from)?;
        fs::write(dest, text).map_err(|e| StoreError::io(dest, e))?;
        info!(path = %dest.display(), components = index.len(), "wrote names and tags");
        Ok(())
    }
}

fn read_file(path: &Path) -> Result<FeatureCollection> {
    let text = fs::read_to_string(path).map_err(|e| StoreError::io(path, e))?;
    let source = path.display().to_string();
    let features = match text.parse::<GeoJson>().map_err(StoreError::from)? {
        GeoJson::FeatureCollection(fc) => fc.features,
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(_) => {
            return Err(StoreError::Malformed {
                path: source,
                reason: "expected a feature or feature collection".into(),
            }
            .into())
        }
    };
    features
        .into_iter()
        .map(|f| Feature::from_geojson(f, &source).map_err(Into::into))
        .collect()
}

fn feature_file(feature: &Feature) -> Result<String> {
    let mut foreign = JsonObject::new();
    foreign.insert("groupName".into(), JsonValue::from(GROUP_NAME));
    let fc = geojson::FeatureCollection {
        bbox: None,
        features: vec![feature.to_geojson()],
        foreign_members: Some(foreign),
    };
    let mut text = serde_json::to_string_pretty(&fc).map_err(StoreError::from)?;
    text.push('\n');
    Ok(text)
}

fn subdirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| StoreError::io(dir, e))?;
    let mut dirs = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| StoreError::io(dir, e))?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::RegionError;
    use crate::feature::Tags;
    use geo::{polygon, MultiPolygon};

    fn square(name: &str, tags: &str) -> Feature {
        let poly = polygon![(x: 0.0, y: 70.0), (x: 1.0, y: 70.0), (x: 1.0, y: 71.0), (x: 0.0, y: 71.0)];
        Feature::region(name, "someone", Tags::parse(tags), MultiPolygon::new(vec![poly]))
    }

    #[test]
    fn path_uses_underscores() {
        let store = FeatureStore::new("/data");
        assert_eq!(store.root(), Path::new("/data"));
        assert_eq!(
            store.feature_path("ocean", "region", "Kara Sea"),
            PathBuf::from("/data/ocean/region/Kara_Sea/region.geojson")
        );
    }

    #[test]
    fn split_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = FeatureStore::new(dir.path());
        let fc: FeatureCollection = vec![square("Kara Sea", "Kara_Sea;Arctic"), square("White Sea", "")]
            .into_iter()
            .collect();
        let written = store.split(&fc).unwrap();
        assert_eq!(written.len(), 2);

        let text = fs::read_to_string(&written[0]).unwrap();
        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["type"], "FeatureCollection");
        assert_eq!(json["groupName"], GROUP_NAME);

        let back = store.read_regions(&["White Sea", "Kara Sea"]).unwrap();
        assert_eq!(back.names().collect::<Vec<_>>(), ["White Sea", "Kara Sea"]);
        assert_eq!(back.get("Kara Sea"), fc.get("Kara Sea"));
    }

    #[test]
    fn bare_feature_files_are_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let store = FeatureStore::new(dir.path());
        let path = store.feature_path("ocean", "region", "Lone Sea");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, serde_json::to_string(&square("Lone Sea", "A").to_geojson()).unwrap()).unwrap();
        let fc = store.read_regions(&["Lone Sea"]).unwrap();
        assert_eq!(fc.len(), 1);
    }

    #[test]
    fn missing_feature_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = FeatureStore::new(dir.path());
        let err = store.read_regions(&["Nowhere Sea"]).unwrap_err();
        assert!(matches!(
            err,
            RegionError::Store(StoreError::FeatureNotFound { ref name, .. }) if name == "Nowhere Sea"
        ));
    }

    #[test]
    fn names_and_tags_index() {
        let dir = tempfile::tempdir().unwrap();
        let store = FeatureStore::new(dir.path());
        let fc: FeatureCollection = vec![square("Kara Sea", "Kara_Sea;Arctic"), square("Bering Sea", "")]
            .into_iter()
            .collect();
        store.split(&fc).unwrap();

        let dest = dir.path().join("features_and_tags.json");
        store.write_names_and_tags(&dest).unwrap();
        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&dest).unwrap()).unwrap();
        let regions = &json["ocean"]["region"];
        assert_eq!(regions["Kara Sea"], serde_json::json!(["Kara_Sea", "Arctic"]));
        assert_eq!(regions["Bering Sea"], serde_json::json!([]));
        let names: Vec<&String> = regions.as_object().unwrap().keys().collect();
        assert_eq!(names, ["Bering Sea", "Kara Sea"]);
    }
}
