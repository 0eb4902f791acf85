use thiserror::Error;

/// Top-level error type for the Arctic region builder.
#[derive(Debug, Error)]
pub enum RegionError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Bathymetry(#[from] BathymetryError),
}

/// Errors related to polygon algebra and geometry construction.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("invalid geometry for {feature} after {operation}: {reason}")]
    Invalid {
        feature: String,
        operation: &'static str,
        reason: String,
    },

    #[error("cannot {0} an empty feature collection")]
    EmptyCollection(&'static str),
}

/// Errors related to the on-disk feature store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("feature not found: {component}/{object}/{name}")]
    FeatureNotFound {
        component: String,
        object: String,
        name: String,
    },

    #[error("duplicate feature name in output: {0}")]
    DuplicateName(String),

    #[error("unsupported geometry in {0}: only polygons and multi-polygons are allowed")]
    UnsupportedGeometry(String),

    #[error("malformed feature in {path}: {reason}")]
    Malformed { path: String, reason: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    GeoJson(#[from] geojson::Error),
}

/// Errors related to fetching and reading the bathymetry grid.
#[derive(Debug, Error)]
pub enum BathymetryError {
    #[error("download of {url} failed: {reason}")]
    Download { url: String, reason: String },

    #[error("failed to decompress {path}: {source}")]
    Decompress {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid bathymetry grid: {0}")]
    Grid(String),

    #[error("no contour found at depth {0}")]
    EmptyContour(f64),
}

impl StoreError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Convenience type alias for results using [`RegionError`].
pub type Result<T> = std::result::Result<T, RegionError>;
