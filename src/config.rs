//! Fixed run parameters.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::bathymetry::BathymetryArchive;

/// Everything the generator needs to know about where data lives.
///
/// The defaults reproduce the maintainer's layout, with the feature
/// database two directories up.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub author: String,
    pub store_root: PathBuf,
    pub bathymetry_dir: PathBuf,
    pub bathymetry_file: String,
    pub bathymetry_base_url: String,
    pub http_timeout: Duration,
    /// Depth of the isobath bounding the Beaufort Gyre, negative below sea level.
    pub contour_depth: f64,
    pub index_file: PathBuf,
    pub index_destination: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            author: "Milena Veneziani".into(),
            store_root: PathBuf::from("../../geometric_data"),
            bathymetry_dir: PathBuf::from("."),
            bathymetry_file: "IBCAO_V3_500m_SM.grd.gz".into(),
            bathymetry_base_url:
                "https://www.ngdc.noaa.gov/mgg/bathymetry/arctic/grids/version3_0".into(),
            http_timeout: Duration::from_secs(600),
            contour_depth: -300.0,
            index_file: PathBuf::from("features_and_tags.json"),
            index_destination: PathBuf::from("../../geometric_features/features_and_tags.json"),
        }
    }
}

impl Settings {
    #[must_use]
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    #[must_use]
    pub fn with_store_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.store_root = root.into();
        self
    }

    #[must_use]
    pub fn with_bathymetry_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.bathymetry_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_contour_depth(mut self, depth: f64) -> Self {
        self.contour_depth = depth;
        self
    }

    /// Redirects both the generated index and its copy.
    #[must_use]
    pub fn with_index_paths(mut self, file: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        self.index_file = file.into();
        self.index_destination = destination.into();
        self
    }

    /// The bathymetry archive described by these settings.
    #[must_use]
    pub fn archive(&self) -> BathymetryArchive {
        BathymetryArchive::new(&self.bathymetry_dir, &self.bathymetry_file, &self.bathymetry_base_url)
    }

    #[must_use]
    pub fn index_file(&self) -> &Path {
        &self.index_file
    }
}
