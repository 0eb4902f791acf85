//! Fetching, unpacking and reading the IBCAO bathymetry grid.

mod http;
mod netcdf_grid;

pub use http::{HttpClient, ReqwestClient};
pub use netcdf_grid::read_grid;

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use tempfile::NamedTempFile;
use tracing::info;

use crate::contour::{BathymetryGrid, ExtractContour};
use crate::error::{BathymetryError, Result, StoreError};
use crate::feature::FeatureCollection;
use crate::regions::ContourSource;

/// A gzip-compressed grid cached on disk and fetched from a fixed URL when
/// missing.
#[derive(Debug, Clone)]
pub struct BathymetryArchive {
    path: PathBuf,
    url: String,
}

impl BathymetryArchive {
    /// Creates an archive handle for `file_name` inside `dir`, downloadable
    /// from `base_url/file_name`.
    #[must_use]
    pub fn new(dir: &Path, file_name: &str, base_url: &str) -> Self {
        Self {
            path: dir.join(file_name),
            url: format!("{}/{file_name}", base_url.trim_end_matches('/')),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Downloads the archive unless it is already present.
    ///
    /// # Errors
    ///
    /// Returns `BathymetryError::Download` if the fetch fails, or a store I/O
    /// error if the file cannot be written.
    pub fn ensure_local<C: HttpClient>(&self, client: &C) -> Result<&Path> {
        if self.path.exists() {
            return Ok(&self.path);
        }
        info!(url = %self.url, "downloading bathymetry data");
        let bytes = client.get(&self.url)?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        fs::write(&self.path, bytes).map_err(|e| StoreError::io(&self.path, e))?;
        Ok(&self.path)
    }

    /// Decompresses the archive into a temporary file, removed when the
    /// returned handle is dropped.
    ///
    /// # Errors
    ///
    /// Returns `BathymetryError::Decompress` if the archive cannot be read
    /// or is not valid gzip.
    pub fn decompress(&self) -> Result<NamedTempFile> {
        let decompress_err = |source: io::Error| BathymetryError::Decompress {
            path: self.path.display().to_string(),
            source,
        };

        info!(path = %self.path.display(), "decompressing bathymetry data");
        let file = File::open(&self.path).map_err(decompress_err)?;
        let mut decoder = GzDecoder::new(BufReader::new(file));
        let mut tmp = NamedTempFile::new().map_err(decompress_err)?;
        io::copy(&mut decoder, &mut tmp).map_err(decompress_err)?;
        Ok(tmp)
    }

    /// Fetches if needed, decompresses and reads the grid.
    ///
    /// # Errors
    ///
    /// Propagates download, decompression and grid format errors.
    pub fn load_grid<C: HttpClient>(&self, client: &C) -> Result<BathymetryGrid> {
        self.ensure_local(client)?;
        let tmp = self.decompress()?;
        read_grid(tmp.path())
    }
}

/// Contours extracted from a [`BathymetryArchive`].
pub struct ArchiveContours<'a, C> {
    archive: &'a BathymetryArchive,
    client: &'a C,
}

impl<'a, C: HttpClient> ArchiveContours<'a, C> {
    #[must_use]
    pub fn new(archive: &'a BathymetryArchive, client: &'a C) -> Self {
        Self { archive, client }
    }
}

impl<C: HttpClient> ContourSource for ArchiveContours<'_, C> {
    fn contour(&self, depth: f64, author: &str) -> Result<FeatureCollection> {
        let grid = self.archive.load_grid(self.client)?;
        ExtractContour::new(depth, author).execute(grid)
    }
}
