use std::fs;

use arctic_regions::bathymetry::{ArchiveContours, ReqwestClient};
use arctic_regions::config::Settings;
use arctic_regions::error::StoreError;
use arctic_regions::logging::init_logging;
use arctic_regions::operations::GeoAlgebra;
use arctic_regions::regions::ArcticRegions;
use arctic_regions::store::FeatureStore;
use arctic_regions::Result;
use tracing::info;

fn main() -> Result<()> {
    init_logging();
    let settings = Settings::default();

    let store = FeatureStore::new(settings.store_root.clone());
    info!(root = %store.root().display(), "using feature store");
    let client = ReqwestClient::new(settings.http_timeout)?;
    let archive = settings.archive();
    let contours = ArchiveContours::new(&archive, &client);

    let regions = ArcticRegions::new(
        &store,
        &contours,
        &GeoAlgebra,
        settings.author.as_str(),
        settings.contour_depth,
    )
    .execute()?;

    store.split(&regions)?;
    store.write_names_and_tags(settings.index_file())?;

    let dest = &settings.index_destination;
    if let Some(dir) = dest.parent() {
        fs::create_dir_all(dir).map_err(|e| StoreError::Io {
            path: dir.display().to_string(),
            source: e,
        })?;
    }
    fs::copy(settings.index_file(), dest).map_err(|e| StoreError::Io {
        path: dest.display().to_string(),
        source: e,
    })?;
    info!(path = %dest.display(), "copied names and tags");
    Ok(())
}
