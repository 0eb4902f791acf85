use geo::{Coord, LineString, MapCoords, MultiPolygon, Polygon};
use tracing::{debug, info};

use super::grid::BathymetryGrid;
use super::marching::{longest_path, trace_contours, ContourPath};
use crate::error::{BathymetryError, GeometryError, Result};
use crate::feature::{Feature, FeatureCollection, Tags};
use crate::math::stereographic::PolarStereographic;
use crate::math::{round_coord, Point2};

/// Half-width of the wedge cut out along the positive y axis.
pub const WEDGE_EPSILON: f64 = 1e-14;

/// Derives a region from the longest iso-depth contour of a polar
/// stereographic bathymetry grid.
///
/// The grid border is zeroed, the longest contour (by vertex count) is
/// turned into a polygon, a numerically tiny wedge from the pole up the
/// positive y axis is removed so the ring opens at the antimeridian, and the
/// result is unprojected to longitude/latitude and rounded.
pub struct ExtractContour {
    depth: f64,
    author: String,
    projection: PolarStereographic,
}

impl ExtractContour {
    /// Creates a new `ExtractContour` operation for EPSG:3995 grids.
    #[must_use]
    pub fn new(depth: f64, author: impl Into<String>) -> Self {
        Self {
            depth,
            author: author.into(),
            projection: PolarStereographic::arctic(),
        }
    }

    /// Name given to the extracted feature.
    #[must_use]
    pub fn feature_name(&self) -> String {
        format!("Contour {}", self.depth)
    }

    /// Executes the extraction, returning a single-feature collection.
    ///
    /// # Errors
    ///
    /// Returns `BathymetryError::EmptyContour` if the depth is never crossed,
    /// or `GeometryError::Degenerate` if the longest path has fewer than
    /// three vertices or lies on the wedge.
    pub fn execute(&self, mut grid: BathymetryGrid) -> Result<FeatureCollection> {
        grid.zero_edges();
        let paths = trace_contours(&grid, self.depth);
        let longest =
            longest_path(&paths).ok_or(BathymetryError::EmptyContour(self.depth))?;
        info!(
            depth = self.depth,
            paths = paths.len(),
            vertices = longest.len(),
            "selected longest contour"
        );

        let polygon = path_polygon(longest)?;
        let max_y = longest
            .points
            .iter()
            .map(|p| p.y)
            .fold(f64::NEG_INFINITY, f64::max);

        let cut = remove_pole_wedge(&polygon, max_y)?;

        let geometry = round_coords(&reproject(&cut, &self.projection));

        Ok(FeatureCollection::single(Feature::region(
            self.feature_name(),
            self.author.clone(),
            Tags::default(),
            geometry,
        )))
    }
}

fn path_polygon(path: &ContourPath) -> Result<Polygon<f64>> {
    if path.len() < 3 {
        return Err(GeometryError::Degenerate(format!(
            "contour path with {} vertices",
            path.len()
        ))
        .into());
    }
    let ring: LineString<f64> = path.points.iter().map(|p| (p.x, p.y)).collect::<Vec<_>>().into();
    Ok(Polygon::new(ring, Vec::new()))
}

/// A vertex of the ring being cut, or a point where it crosses the slit.
#[derive(Debug, Clone, Copy)]
enum Node {
    Vertex(Coord<f64>),
    /// Crossing number and its height on the y axis.
    Crossing(usize, f64),
}

/// Cuts the wedge `x = 0, WEDGE_EPSILON < y <= max_y` out of `polygon`.
///
/// Each crossing of the slit is replaced by flank vertices just to either
/// side of the axis, so every piece stays on one side of the antimeridian
/// once unprojected. A stretch of slit inside the polygon between two
/// crossings splits it in two. If the pole itself is enclosed, the lowest
/// crossing instead opens a notch down to the wedge tip. Vertices off the
/// slit are kept bit for bit; vertices lying on it are moved onto the flank
/// of the side the ring arrives from.
///
/// # Errors
///
/// Returns `GeometryError::Degenerate` if the polygon has holes, has fewer
/// than three distinct vertices, or lies entirely on the slit.
pub fn remove_pole_wedge(polygon: &Polygon<f64>, max_y: f64) -> Result<MultiPolygon<f64>> {
    if !polygon.interiors().is_empty() {
        return Err(GeometryError::Degenerate("pole wedge cut of a polygon with holes".into()).into());
    }
    let mut ring = polygon.exterior().0.clone();
    if ring.len() > 1 && ring.first() == ring.last() {
        ring.pop();
    }
    if ring.len() < 3 {
        return Err(GeometryError::Degenerate(format!("ring with {} vertices", ring.len())).into());
    }
    let n = ring.len();

    let on_slit = |c: &Coord<f64>| c.x == 0.0 && c.y > WEDGE_EPSILON && c.y <= max_y;
    let start = ring
        .iter()
        .position(|c| !on_slit(c))
        .ok_or_else(|| GeometryError::Degenerate("ring lies on the pole wedge".into()))?;
    let mut last_side = side(ring[start]);
    for k in 0..n {
        let c = &mut ring[(start + k) % n];
        if on_slit(&*c) {
            c.x = last_side * flank(c.y, max_y);
        } else {
            last_side = side(*c);
        }
    }

    let mut nodes = Vec::with_capacity(n + 2);
    let mut heights = Vec::new();
    for i in 0..n {
        let (a, b) = (ring[i], ring[(i + 1) % n]);
        nodes.push(Node::Vertex(a));
        if (a.x > 0.0) != (b.x > 0.0) {
            let y = a.y - a.x * (b.y - a.y) / (b.x - a.x);
            if y > WEDGE_EPSILON && y <= max_y {
                nodes.push(Node::Crossing(heights.len(), y));
                heights.push(y);
            }
        }
    }

    // Upward from the tip, the slit alternates between outside and inside;
    // an odd number of crossings means the tip is inside.
    let mut order: Vec<usize> = (0..heights.len()).collect();
    order.sort_by(|&a, &b| heights[a].total_cmp(&heights[b]));
    let notch = (order.len() % 2 == 1).then(|| order.remove(0));

    let mut pieces = vec![nodes];
    for chord in order.chunks_exact(2) {
        let (a, b) = (chord[0], chord[1]);
        let Some(k) = pieces.iter().position(|p| find_crossing(p, a).is_some()) else {
            continue;
        };
        let piece = pieces.swap_remove(k);
        if let (Some(pa), Some(pb)) = (find_crossing(&piece, a), find_crossing(&piece, b)) {
            pieces.push(cyclic(&piece, pa, pb));
            pieces.push(cyclic(&piece, pb, pa));
        } else {
            pieces.push(piece);
        }
    }
    debug!(
        crossings = heights.len(),
        pieces = pieces.len(),
        pole_enclosed = notch.is_some(),
        "cut pole wedge"
    );

    Ok(MultiPolygon::new(
        pieces
            .iter()
            .map(|piece| piece_polygon(piece, notch, max_y))
            .collect(),
    ))
}

fn side(c: Coord<f64>) -> f64 {
    if c.x > 0.0 {
        1.0
    } else {
        -1.0
    }
}

/// x of the wedge flank at height `y`.
fn flank(y: f64, max_y: f64) -> f64 {
    let e = WEDGE_EPSILON;
    e * e + (e - e * e) * (y - e) / (max_y - e)
}

fn find_crossing(nodes: &[Node], id: usize) -> Option<usize> {
    nodes
        .iter()
        .position(|node| matches!(node, Node::Crossing(c, _) if *c == id))
}

/// Nodes from `from` to `to` inclusive, wrapping around.
fn cyclic(nodes: &[Node], from: usize, to: usize) -> Vec<Node> {
    let n = nodes.len();
    let mut out = Vec::new();
    let mut k = from;
    loop {
        out.push(nodes[k]);
        if k == to {
            return out;
        }
        k = (k + 1) % n;
    }
}

fn piece_polygon(piece: &[Node], notch: Option<usize>, max_y: f64) -> Polygon<f64> {
    let e = WEDGE_EPSILON;
    let n = piece.len();
    let vertex_side = |node: Node| match node {
        Node::Vertex(c) => Some(side(c)),
        Node::Crossing(..) => None,
    };

    let mut out = Vec::with_capacity(n + 5);
    for (k, &node) in piece.iter().enumerate() {
        match node {
            Node::Vertex(c) => out.push(c),
            Node::Crossing(id, y) => {
                let prev = vertex_side(piece[(k + n - 1) % n]);
                let next = vertex_side(piece[(k + 1) % n]);
                let f = flank(y, max_y);
                if notch == Some(id) {
                    let (sp, sn) = (prev.unwrap_or(1.0), next.unwrap_or(-1.0));
                    out.extend([
                        Coord { x: sp * f, y },
                        Coord { x: sp * e * e, y: e },
                        Coord { x: 0.0, y: e },
                        Coord { x: sn * e * e, y: e },
                        Coord { x: sn * f, y },
                    ]);
                } else {
                    // A chord end: one neighbour is the other end, the other
                    // a vertex on this piece's side.
                    let s = prev.or(next).unwrap_or(1.0);
                    out.push(Coord { x: s * f, y });
                }
            }
        }
    }
    if let Some(&first) = out.first() {
        out.push(first);
    }
    Polygon::new(LineString::new(out), Vec::new())
}

/// Unprojects every vertex from stereographic metres to longitude/latitude.
#[must_use]
pub fn reproject(geometry: &MultiPolygon<f64>, projection: &PolarStereographic) -> MultiPolygon<f64> {
    geometry.map_coords(|c| {
        let ll = projection.inverse(Point2::new(c.x, c.y));
        Coord { x: ll.x, y: ll.y }
    })
}

/// Rounds every coordinate, which also collapses the wedge to the antimeridian.
#[must_use]
pub fn round_coords(geometry: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    geometry.map_coords(|c| Coord {
        x: round_coord(c.x),
        y: round_coord(c.y),
    })
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::float_cmp
)]
mod tests {
    use super::*;
    use crate::error::RegionError;
    use approx::assert_relative_eq;
    use geo::{Area, CoordsIter};

    fn circle(cx: f64, cy: f64, r: f64, n: usize) -> Polygon<f64> {
        let pts: Vec<(f64, f64)> = (0..n)
            .map(|k| {
                let t = 0.05 + k as f64 * std::f64::consts::TAU / n as f64;
                (cx + r * t.cos(), cy + r * t.sin())
            })
            .collect();
        Polygon::new(LineString::from(pts), Vec::new())
    }

    /// Depth deepening towards the pole, -300 m at 700 km.
    fn polar_grid() -> BathymetryGrid {
        let axis: Vec<f64> = (0..40).map(|i| -1_950_000.0 + i as f64 * 100_000.0).collect();
        let mut z = Vec::new();
        for &y in &axis {
            for &x in &axis {
                let r = f64::hypot(x, y) / 100_000.0;
                z.push((-1000.0 + 100.0 * r).min(0.0) as f32);
            }
        }
        BathymetryGrid::new(axis.clone(), axis, z).unwrap()
    }

    fn max_y(poly: &Polygon<f64>) -> f64 {
        poly.exterior().coords().map(|c| c.y).fold(f64::MIN, f64::max)
    }

    fn assert_vertices_kept(poly: &Polygon<f64>, cut: &MultiPolygon<f64>) {
        let out: Vec<Coord<f64>> = cut.coords_iter().collect();
        for c in poly.exterior().coords() {
            assert!(
                out.iter().any(|o| o.x.to_bits() == c.x.to_bits() && o.y.to_bits() == c.y.to_bits()),
                "vertex {c:?} was altered"
            );
        }
    }

    #[test]
    fn pole_enclosing_ring_gets_a_notch() {
        let poly = circle(0.0, 0.0, 1_000_000.0, 64);
        let cut = remove_pole_wedge(&poly, max_y(&poly)).unwrap();
        assert_eq!(cut.0.len(), 1);
        assert_vertices_kept(&poly, &cut);

        let out: Vec<Coord<f64>> = cut.0[0].exterior().coords().copied().collect();
        assert!(out.contains(&Coord { x: 0.0, y: WEDGE_EPSILON }));
        // Only the five wedge vertices are new.
        assert_eq!(out.len(), poly.exterior().0.len() + 5);
        assert_relative_eq!(cut.unsigned_area(), poly.unsigned_area(), max_relative = 1e-12);
    }

    #[test]
    fn far_vertices_survive_reprojection_and_rounding() {
        let proj = PolarStereographic::arctic();
        let poly = circle(0.0, 0.0, 700_000.0, 90);
        let cut = remove_pole_wedge(&poly, max_y(&poly)).unwrap();
        let with_wedge = round_coords(&reproject(&cut, &proj));
        let plain = round_coords(&reproject(&MultiPolygon::new(vec![poly]), &proj));
        let out: Vec<Coord<f64>> = with_wedge.coords_iter().collect();
        for c in plain.coords_iter() {
            assert!(out.iter().any(|o| o.x.to_bits() == c.x.to_bits() && o.y.to_bits() == c.y.to_bits()));
        }
    }

    #[test]
    fn polygon_away_from_the_axis_is_unchanged() {
        let poly = circle(500_000.0, -500_000.0, 100_000.0, 32);
        let cut = remove_pole_wedge(&poly, 1_000_000.0).unwrap();
        assert_eq!(cut, MultiPolygon::new(vec![poly]));
    }

    #[test]
    fn ring_straddling_the_axis_splits_in_two() {
        let proj = PolarStereographic::arctic();
        let poly = circle(0.0, 1_000_000.0, 200_000.0, 64);
        let cut = remove_pole_wedge(&poly, max_y(&poly)).unwrap();
        assert_eq!(cut.0.len(), 2);
        assert_vertices_kept(&poly, &cut);
        assert_relative_eq!(cut.unsigned_area(), poly.unsigned_area(), max_relative = 1e-12);
        assert!(!cut.coords_iter().any(|c| c.x == 0.0));

        for part in &cut.0 {
            let east = part.exterior().coords().all(|c| c.x > 0.0);
            let west = part.exterior().coords().all(|c| c.x < 0.0);
            assert!(east != west, "piece crosses the axis");

            let lonlat = reproject(&MultiPolygon::new(vec![part.clone()]), &proj);
            let lons: Vec<f64> = lonlat.coords_iter().map(|c| c.x).collect();
            let lo = lons.iter().copied().fold(f64::MAX, f64::min);
            let hi = lons.iter().copied().fold(f64::MIN, f64::max);
            assert!(hi - lo < 30.0, "piece spans {lo}..{hi}");
            assert!(if east { lo > 0.0 } else { hi < 0.0 });
        }
    }

    #[test]
    fn three_crossings_give_notch_and_split() {
        // Encloses the pole. A fold crosses the axis at y = 0.8e6 and 1e6,
        // and the edge leaving (0.5e6, 0.6e6) crosses it at about 0.467e6.
        let poly = Polygon::new(
            LineString::from(vec![
                (-1e6, -1e6),
                (1e6, -1e6),
                (1e6, 1e6),
                (-0.5e6, 1e6),
                (0.5e6, 0.6e6),
                (-1e6, 0.2e6),
                (-1e6, -1e6),
            ]),
            Vec::new(),
        );
        let cut = remove_pole_wedge(&poly, max_y(&poly)).unwrap();
        assert_eq!(cut.0.len(), 2);
        assert_vertices_kept(&poly, &cut);
        assert_relative_eq!(cut.unsigned_area(), poly.unsigned_area(), max_relative = 1e-12);

        let (notched, sliver): (Vec<_>, Vec<_>) = cut
            .0
            .iter()
            .partition(|p| p.exterior().coords().any(|c| *c == Coord { x: 0.0, y: WEDGE_EPSILON }));
        assert_eq!(notched.len(), 1);
        // The triangle between the fold and the top edge, west of the axis.
        let tri: Vec<Coord<f64>> = sliver[0].exterior().coords().copied().collect();
        assert_eq!(tri.len(), 4);
        assert!(tri.iter().all(|c| c.x < 0.0));
        assert!(tri.contains(&Coord { x: -0.5e6, y: 1e6 }));
    }

    #[test]
    fn vertex_on_the_axis_moves_to_a_flank() {
        let poly = Polygon::new(
            LineString::from(vec![
                (-1e6, -1e6),
                (1e6, -1e6),
                (1e6, 1e6),
                (0.0, 1.2e6),
                (-1e6, 1e6),
                (-1e6, -1e6),
            ]),
            Vec::new(),
        );
        let cut = remove_pole_wedge(&poly, 1.2e6).unwrap();
        assert_eq!(cut.0.len(), 1);
        let out: Vec<Coord<f64>> = cut.coords_iter().collect();
        // Only the wedge tip stays on the axis.
        assert_eq!(out.iter().filter(|c| c.x == 0.0).count(), 1);
        assert!(out
            .iter()
            .any(|c| c.y == 1.2e6 && c.x > 0.0 && c.x <= 2.0 * WEDGE_EPSILON));
    }

    #[test]
    fn polygon_with_hole_is_rejected() {
        let hole = circle(0.0, 0.0, 100_000.0, 16).exterior().clone();
        let poly = Polygon::new(circle(0.0, 0.0, 1_000_000.0, 32).exterior().clone(), vec![hole]);
        assert!(matches!(
            remove_pole_wedge(&poly, 1_000_000.0),
            Err(RegionError::Geometry(GeometryError::Degenerate(_)))
        ));
    }

    #[test]
    fn extracts_polar_contour() {
        let fc = ExtractContour::new(-300.0, "me")
            .execute(polar_grid())
            .unwrap();
        assert_eq!(fc.len(), 1);
        let f = &fc.features()[0];
        assert_eq!(f.name(), "Contour -300");
        assert_eq!(f.properties.author, "me");
        assert_eq!(f.properties.component, "ocean");
        assert_eq!(f.properties.object, "region");

        let coords: Vec<Coord<f64>> = f.geometry.coords_iter().collect();
        assert!(coords.iter().all(|c| (-180.0..=180.0).contains(&c.x)));
        assert!(coords.iter().all(|c| c.y > 80.0 && c.y <= 90.0));
        // The cut opens the ring at the antimeridian and runs through the pole.
        assert!(coords.iter().any(|c| (c.x - 180.0).abs() < 1e-9 && (c.y - 90.0).abs() < 1e-9));
        assert!(coords.iter().any(|c| (c.x + 180.0).abs() < 1e-9 && (c.y - 90.0).abs() < 1e-9));
        // Rounded to six decimal places.
        for c in &coords {
            assert!((c.x * 1e6 - (c.x * 1e6).round()).abs() < 1e-6);
        }
        // Roughly the cap north of the contour latitude in lon/lat space.
        assert!(f.area() > 360.0 * 5.0);
    }

    #[test]
    fn missing_depth_is_an_error() {
        let err = ExtractContour::new(-5000.0, "me")
            .execute(polar_grid())
            .unwrap_err();
        assert!(matches!(
            err,
            RegionError::Bathymetry(BathymetryError::EmptyContour(d)) if (d + 5000.0).abs() < f64::EPSILON
        ));
    }
}
