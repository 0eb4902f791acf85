//! Assembly of the Arctic region set.
//!
//! Each region is built in a fixed order from features already in the
//! store, hand-drawn boxes and polygons, and the 300 m isobath north of
//! Alaska.

use tracing::info;

use crate::error::Result;
use crate::feature::{FeatureCollection, Tags};
use crate::operations::creation::{MakePolygon, MakeRectangle};
use crate::operations::{Combine, Difference, PolygonAlgebra};
use crate::store::FeatureStore;

/// Tags of each generated region.
pub mod tags {
    pub const BARENTS_SEA: &str = "Barents_Sea;Arctic;Arctic_NSIDC;Arctic_Basin";
    pub const KARA_SEA: &str = "Kara_Sea;Arctic;Arctic_NSIDC;Arctic_Basin";
    pub const ARCTIC_OCEAN: &str = "Arctic_Ocean;Arctic;Arctic_Basin";
    pub const BEAUFORT_GYRE: &str = "Beaufort_Gyre;Arctic;Arctic_Basin;Proshutinski";
    pub const CHUKCHI_SEA: &str = "Chukchi_Sea;Arctic_NSIDC;Arctic_Basin";
    pub const BEAUFORT_GYRE_SHELF: &str = "Beaufort_Gyre_Shelf;Arctic;Arctic_NSIDC;Arctic_Basin";
    pub const EAST_SIBERIAN_SEA: &str = "East_Siberian_Sea;Arctic_NSIDC;Arctic_Basin";
    pub const LAPTEV_SEA: &str = "Laptev_Sea;Arctic_NSIDC;Arctic_Basin";
    pub const CENTRAL_ARCTIC: &str = "Central_Arctic;Arctic;Arctic_Basin";
}

/// Outline of the Chukchi Sea, from the Bering Strait to 80°N.
const CHUKCHI_OUTLINE: [(f64, f64); 10] = [
    (-167.15, 65.74),
    (-168.01, 65.84),
    (-168.62, 65.91),
    (-169.43, 66.01),
    (-170.24, 66.1),
    (-180.0, 66.6),
    (-180.0, 80.0),
    (-156.48, 80.0),
    (-156.65, 65.37),
    (-167.15, 65.74),
];

/// Outline of the Laptev Sea before the Kara Sea is removed.
const LAPTEV_OUTLINE: [(f64, f64); 6] = [
    (145.0, 68.0),
    (145.0, 80.0),
    (95.4, 81.29),
    (99.89, 78.27),
    (102.0, 72.0),
    (145.0, 68.0),
];

/// Source of iso-depth contour regions.
pub trait ContourSource {
    /// Returns a single-feature collection named `Contour <depth>`.
    ///
    /// # Errors
    ///
    /// Fails if the underlying data cannot be fetched or has no contour at
    /// `depth`.
    fn contour(&self, depth: f64, author: &str) -> Result<FeatureCollection>;
}

/// Builds the nine Arctic regions.
pub struct ArcticRegions<'a, S, A> {
    store: &'a FeatureStore,
    contours: &'a S,
    algebra: &'a A,
    author: String,
    depth: f64,
}

impl<'a, S: ContourSource, A: PolygonAlgebra> ArcticRegions<'a, S, A> {
    /// Creates a new `ArcticRegions` operation.
    #[must_use]
    pub fn new(
        store: &'a FeatureStore,
        contours: &'a S,
        algebra: &'a A,
        author: impl Into<String>,
        depth: f64,
    ) -> Self {
        Self {
            store,
            contours,
            algebra,
            author: author.into(),
            depth,
        }
    }

    /// Runs every step and returns the regions in output order: Barents,
    /// Kara, Arctic Ocean, Beaufort Gyre, Chukchi, Beaufort Gyre Shelf,
    /// East Siberian, Laptev and Central Arctic.
    ///
    /// Every region but the Kara Sea, which keeps its stored author, is
    /// credited to the configured author.
    ///
    /// # Errors
    ///
    /// Returns the first failure of any step, or `StoreError::DuplicateName`
    /// if two regions end up with the same name.
    pub fn execute(&self) -> Result<FeatureCollection> {
        let barents = self.barents_sea()?;
        let kara = self.kara_sea()?;
        let arctic_ocean = self.arctic_ocean(&barents)?;
        let contour = self.contours.contour(self.depth, &self.author)?;
        let beaufort_gyre = self.beaufort_gyre(&contour)?;
        let chukchi = self.chukchi_sea(&beaufort_gyre)?;
        let shelf = self.beaufort_gyre_shelf(&contour, &beaufort_gyre, &chukchi)?;
        let east_siberian = self.east_siberian_sea();
        let laptev = self.laptev_sea(&kara)?;
        let central = self.central_arctic(
            &arctic_ocean,
            &[&beaufort_gyre, &shelf, &chukchi, &east_siberian, &laptev],
        )?;

        let regions = barents
            .merged(&kara)
            .merged(&arctic_ocean)
            .merged(&beaufort_gyre)
            .merged(&chukchi)
            .merged(&shelf)
            .merged(&east_siberian)
            .merged(&laptev)
            .merged(&central);
        regions.ensure_unique_names()?;
        Ok(regions)
    }

    fn barents_sea(&self) -> Result<FeatureCollection> {
        info!("Barents Sea");
        let parts = self.store.read_regions(&["Barentsz Sea", "White Sea"])?;
        let fc = Combine::new(&parts, "Barents Sea").execute(self.algebra)?;
        self.labeled(fc, "Barents Sea", tags::BARENTS_SEA)
    }

    /// Kept as stored apart from its tags.
    fn kara_sea(&self) -> Result<FeatureCollection> {
        info!("Kara Sea");
        let mut fc = self.store.read_regions(&["Kara Sea"])?;
        fc.first_mut()?.properties.tags = Tags::parse(tags::KARA_SEA);
        Ok(fc)
    }

    /// Fills the gap north of Fram Strait, then merges it with the seas
    /// around the basin.
    fn arctic_ocean(&self, barents: &FeatureCollection) -> Result<FeatureCollection> {
        info!("Arctic Ocean");
        let gap = MakeRectangle::new(-36.0, 20.0, 86.0, 79.0)
            .labeled("North of Fram Strait", &self.author, "Arctic_Basin")
            .execute();
        let neighbours = self
            .store
            .read_regions(&["Arctic Ocean", "Lincoln Sea"])?
            .merged(barents);
        let gap = Difference::new(&gap, &neighbours).execute(self.algebra)?;

        let parts = gap.merged(&self.store.read_regions(&[
            "Arctic Ocean",
            "Laptev Sea",
            "East Siberian Sea",
            "Chukchi Sea",
            "Beaufort Sea",
            "Lincoln Sea",
        ])?);
        let fc = Combine::new(&parts, "Arctic Ocean").execute(self.algebra)?;
        self.labeled(fc, "Arctic Ocean", tags::ARCTIC_OCEAN)
    }

    /// The part of the Canada Basin box deeper than the isobath.
    fn beaufort_gyre(&self, contour: &FeatureCollection) -> Result<FeatureCollection> {
        info!("Beaufort Gyre");
        let bounds = MakeRectangle::new(-170.0, -130.0, 70.5, 80.5)
            .labeled("Beaufort Gyre", &self.author, tags::BEAUFORT_GYRE)
            .execute();
        let outside = Difference::new(&bounds, contour).execute(self.algebra)?;
        let fc = Difference::new(&bounds, &outside).execute(self.algebra)?;
        self.labeled(fc, "Beaufort Gyre", tags::BEAUFORT_GYRE)
    }

    fn chukchi_sea(&self, beaufort_gyre: &FeatureCollection) -> Result<FeatureCollection> {
        info!("Chukchi Sea");
        let outline = MakePolygon::new(&CHUKCHI_OUTLINE)
            .labeled("Chukchi Sea", &self.author, tags::CHUKCHI_SEA)
            .execute();
        let fc = Difference::new(&outline, beaufort_gyre).execute(self.algebra)?;
        self.labeled(fc, "Chukchi Sea", tags::CHUKCHI_SEA)
    }

    /// Shallow water around the gyre, excluding the Chukchi Sea.
    fn beaufort_gyre_shelf(
        &self,
        contour: &FeatureCollection,
        beaufort_gyre: &FeatureCollection,
        chukchi: &FeatureCollection,
    ) -> Result<FeatureCollection> {
        info!("Beaufort Gyre Shelf");
        let bounds = MakeRectangle::new(-170.0, -130.0, 68.0, 80.5)
            .labeled("Beaufort Gyre Shelf Box", &self.author, tags::BEAUFORT_GYRE_SHELF)
            .execute();
        let shallow = Difference::new(&bounds, contour).execute(self.algebra)?;
        let outside_gyre = Difference::new(&bounds, beaufort_gyre).execute(self.algebra)?;
        let remainder = Difference::new(&outside_gyre, &shallow).execute(self.algebra)?;

        let parts = shallow.merged(&remainder);
        let shelf = Combine::new(&parts, "Beaufort Gyre Shelf").execute(self.algebra)?;
        let fc = Difference::new(&shelf, chukchi).execute(self.algebra)?;
        self.labeled(fc, "Beaufort Gyre Shelf", tags::BEAUFORT_GYRE_SHELF)
    }

    fn east_siberian_sea(&self) -> FeatureCollection {
        info!("East Siberian Sea");
        MakeRectangle::new(180.0, 145.0, 67.0, 80.0)
            .labeled("East Siberian Sea", &self.author, tags::EAST_SIBERIAN_SEA)
            .execute()
    }

    fn laptev_sea(&self, kara: &FeatureCollection) -> Result<FeatureCollection> {
        info!("Laptev Sea");
        let outline = MakePolygon::new(&LAPTEV_OUTLINE)
            .labeled("Laptev Sea", &self.author, tags::LAPTEV_SEA)
            .execute();
        let fc = Difference::new(&outline, kara).execute(self.algebra)?;
        self.labeled(fc, "Laptev Sea", tags::LAPTEV_SEA)
    }

    fn central_arctic(
        &self,
        arctic_ocean: &FeatureCollection,
        marginal: &[&FeatureCollection],
    ) -> Result<FeatureCollection> {
        info!("Central Arctic");
        let excluded = marginal
            .iter()
            .fold(FeatureCollection::new(), |acc, fc| acc.merged(fc));
        let fc = Difference::new(arctic_ocean, &excluded).execute(self.algebra)?;
        self.labeled(fc, "Central Arctic", tags::CENTRAL_ARCTIC)
    }

    fn labeled(&self, mut fc: FeatureCollection, name: &str, tags: &str) -> Result<FeatureCollection> {
        fc.first_mut()?.label(name, &self.author, tags);
        Ok(fc)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{RegionError, StoreError};
    use crate::feature::Feature;
    use crate::operations::{GeoAlgebra, PolygonAlgebra};
    use approx::assert_relative_eq;
    use geo::{LineString, MultiPolygon, Polygon};
    use std::cell::Cell;

    fn rect(lon0: f64, lon1: f64, lat0: f64, lat1: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![Polygon::new(
            LineString::from(vec![(lon0, lat0), (lon1, lat0), (lon1, lat1), (lon0, lat1), (lon0, lat0)]),
            Vec::new(),
        )])
    }

    fn source_regions() -> FeatureCollection {
        [
            ("Barentsz Sea", rect(20.0, 60.0, 68.0, 80.0)),
            ("White Sea", rect(32.0, 45.0, 63.0, 69.0)),
            ("Kara Sea", rect(60.0, 100.0, 68.0, 80.0)),
            ("Arctic Ocean", rect(-180.0, 180.0, 80.0, 90.0)),
            ("Lincoln Sea", rect(-70.0, -40.0, 80.0, 85.0)),
            ("Laptev Sea", rect(100.0, 145.0, 70.0, 80.0)),
            ("East Siberian Sea", rect(145.0, 180.0, 68.0, 80.0)),
            ("Chukchi Sea", rect(-180.0, -157.0, 66.0, 80.0)),
            ("Beaufort Sea", rect(-157.0, -120.0, 68.0, 80.0)),
        ]
        .into_iter()
        .map(|(name, geometry)| Feature::region(name, "source", Tags::parse("Old_Tag"), geometry))
        .collect()
    }

    struct StubContours {
        calls: Cell<usize>,
    }

    impl ContourSource for StubContours {
        fn contour(&self, depth: f64, author: &str) -> Result<FeatureCollection> {
            self.calls.set(self.calls.get() + 1);
            Ok(FeatureCollection::single(Feature::region(
                format!("Contour {depth}"),
                author,
                Tags::default(),
                rect(-160.0, -140.0, 72.0, 78.0),
            )))
        }
    }

    fn build(store: &FeatureStore) -> (Result<FeatureCollection>, usize) {
        let contours = StubContours { calls: Cell::new(0) };
        let out = ArcticRegions::new(store, &contours, &GeoAlgebra, "tester", -300.0).execute();
        (out, contours.calls.get())
    }

    fn seeded_store() -> (tempfile::TempDir, FeatureStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FeatureStore::new(dir.path());
        store.split(&source_regions()).unwrap();
        (dir, store)
    }

    #[test]
    fn regions_come_out_in_order() {
        let (_dir, store) = seeded_store();
        let (out, calls) = build(&store);
        let out = out.unwrap();
        assert_eq!(calls, 1);
        assert_eq!(
            out.names().collect::<Vec<_>>(),
            [
                "Barents Sea",
                "Kara Sea",
                "Arctic Ocean",
                "Beaufort Gyre",
                "Chukchi Sea",
                "Beaufort Gyre Shelf",
                "East Siberian Sea",
                "Laptev Sea",
                "Central Arctic",
            ]
        );
        for f in out.features() {
            let author = if f.name() == "Kara Sea" { "source" } else { "tester" };
            assert_eq!(f.properties.author, author);
            assert_eq!(f.properties.component, "ocean");
            assert_eq!(f.properties.object, "region");
            assert!(!f.properties.tags.is_empty());
        }
        assert_eq!(out.get("Kara Sea").unwrap().properties.tags.to_string(), tags::KARA_SEA);
    }

    #[test]
    fn barents_sea_is_union_of_sources() {
        let (_dir, store) = seeded_store();
        let out = build(&store).0.unwrap();
        let barents = out.get("Barents Sea").unwrap();
        let union = GeoAlgebra.union(&rect(20.0, 60.0, 68.0, 80.0), &rect(32.0, 45.0, 63.0, 69.0));
        assert_relative_eq!(barents.area(), GeoAlgebra.area(&union), max_relative = 1e-9);
        assert_relative_eq!(barents.area(), 545.0, max_relative = 1e-9);
        assert_eq!(barents.properties.tags.to_string(), tags::BARENTS_SEA);
        assert_eq!(barents.properties.constituents, ["Barentsz Sea", "White Sea"]);
    }

    #[test]
    fn beaufort_gyre_is_clipped_contour() {
        let (_dir, store) = seeded_store();
        let out = build(&store).0.unwrap();
        let gyre = out.get("Beaufort Gyre").unwrap();
        assert_relative_eq!(gyre.area(), 20.0 * 6.0, max_relative = 1e-6);
    }

    #[test]
    fn central_arctic_excludes_marginal_seas() {
        let (_dir, store) = seeded_store();
        let out = build(&store).0.unwrap();
        let central = &out.get("Central Arctic").unwrap().geometry;
        assert!(GeoAlgebra.area(central) > 0.0);
        for name in [
            "Beaufort Gyre",
            "Beaufort Gyre Shelf",
            "Chukchi Sea",
            "East Siberian Sea",
            "Laptev Sea",
        ] {
            let other = &out.get(name).unwrap().geometry;
            let overlap = GeoAlgebra.area(&GeoAlgebra.intersection(central, other));
            assert!(overlap < 1e-6, "{name} overlaps by {overlap}");
        }
    }

    #[test]
    fn missing_source_feature_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let store = FeatureStore::new(dir.path());
        let partial: FeatureCollection = source_regions()
            .into_iter()
            .filter(|f| f.name() != "Lincoln Sea")
            .collect();
        store.split(&partial).unwrap();
        let (out, calls) = build(&store);
        assert!(matches!(
            out,
            Err(RegionError::Store(StoreError::FeatureNotFound { ref name, .. })) if name == "Lincoln Sea"
        ));
        assert_eq!(calls, 0);
    }
}
