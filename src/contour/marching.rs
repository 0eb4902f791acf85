//! Iso-line tracing with marching squares.
//!
//! Crossings are keyed by the grid edge they lie on, so segments from
//! neighbouring cells join exactly without comparing floating-point
//! positions.

use std::collections::HashMap;

use super::grid::BathymetryGrid;
use crate::math::Point2;

/// A traced iso-line in grid coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourPath {
    /// Vertices in order. Closed paths repeat their first vertex at the end.
    pub points: Vec<Point2>,
    pub closed: bool,
}

impl ContourPath {
    /// Number of vertices, including the closing repeat.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// A grid edge, identified by its lower-left sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum EdgeKey {
    /// Between `(col, row)` and `(col + 1, row)`.
    Horizontal(usize, usize),
    /// Between `(col, row)` and `(col, row + 1)`.
    Vertical(usize, usize),
}

type Segment = (EdgeKey, EdgeKey);

/// Traces every iso-line of `grid` at `level`.
///
/// A sample is "above" when its value is strictly greater than `level`.
/// Saddle cells are split according to the mean of their four corners.
/// Cells with a NaN corner are skipped, which leaves open paths.
#[must_use]
pub fn trace_contours(grid: &BathymetryGrid, level: f64) -> Vec<ContourPath> {
    let segments = march(grid, level);

    let mut adjacency: HashMap<EdgeKey, Vec<usize>> = HashMap::new();
    for (i, &(a, b)) in segments.iter().enumerate() {
        adjacency.entry(a).or_default().push(i);
        adjacency.entry(b).or_default().push(i);
    }

    let mut used = vec![false; segments.len()];
    let mut paths = Vec::new();

    // Open chains start at an edge that only one segment touches.
    for i in 0..segments.len() {
        if used[i] {
            continue;
        }
        let (a, b) = segments[i];
        let start = if adjacency[&a].len() == 1 {
            Some(a)
        } else if adjacency[&b].len() == 1 {
            Some(b)
        } else {
            None
        };
        if let Some(start) = start {
            paths.push(walk(grid, level, &segments, &adjacency, &mut used, start, i));
        }
    }

    // Whatever is left forms closed loops.
    for i in 0..segments.len() {
        if !used[i] {
            let start = segments[i].0;
            paths.push(walk(grid, level, &segments, &adjacency, &mut used, start, i));
        }
    }

    paths
}

/// Returns the path with the most vertices; ties go to the first one.
#[must_use]
pub fn longest_path(paths: &[ContourPath]) -> Option<&ContourPath> {
    paths
        .iter()
        .fold(None, |best: Option<&ContourPath>, p| match best {
            Some(b) if b.len() >= p.len() => Some(b),
            _ => Some(p),
        })
}

fn march(grid: &BathymetryGrid, level: f64) -> Vec<Segment> {
    let mut segments = Vec::new();

    for row in 0..grid.height() - 1 {
        for col in 0..grid.width() - 1 {
            let bl = grid.value(col, row);
            let br = grid.value(col + 1, row);
            let tr = grid.value(col + 1, row + 1);
            let tl = grid.value(col, row + 1);
            if bl.is_nan() || br.is_nan() || tr.is_nan() || tl.is_nan() {
                continue;
            }

            let above = [bl > level, br > level, tr > level, tl > level];
            let bottom = EdgeKey::Horizontal(col, row);
            let right = EdgeKey::Vertical(col + 1, row);
            let top = EdgeKey::Horizontal(col, row + 1);
            let left = EdgeKey::Vertical(col, row);

            // Edges in ring order, each between consecutive corners.
            let ring = [
                (bottom, above[0] != above[1]),
                (right, above[1] != above[2]),
                (top, above[2] != above[3]),
                (left, above[3] != above[0]),
            ];
            let mut crossed = [bottom; 4];
            let mut n = 0;
            for (edge, is_crossed) in ring {
                if is_crossed {
                    crossed[n] = edge;
                    n += 1;
                }
            }

            match n {
                2 => segments.push((crossed[0], crossed[1])),
                4 => {
                    let centre_above = (bl + br + tr + tl) * 0.25 > level;
                    if centre_above == above[0] {
                        segments.push((bottom, right));
                        segments.push((top, left));
                    } else {
                        segments.push((left, bottom));
                        segments.push((right, top));
                    }
                }
                _ => {}
            }
        }
    }

    segments
}

fn walk(
    grid: &BathymetryGrid,
    level: f64,
    segments: &[Segment],
    adjacency: &HashMap<EdgeKey, Vec<usize>>,
    used: &mut [bool],
    start: EdgeKey,
    first: usize,
) -> ContourPath {
    let mut keys = vec![start];
    let mut current = start;
    let mut segment = first;
    let mut closed = false;

    loop {
        used[segment] = true;
        let (a, b) = segments[segment];
        let next = if a == current { b } else { a };
        keys.push(next);
        if next == start {
            closed = true;
            break;
        }
        match adjacency[&next].iter().find(|&&s| !used[s]) {
            Some(&s) => {
                current = next;
                segment = s;
            }
            None => break,
        }
    }

    ContourPath {
        points: keys.iter().map(|&k| crossing(grid, level, k)).collect(),
        closed,
    }
}

fn crossing(grid: &BathymetryGrid, level: f64, key: EdgeKey) -> Point2 {
    let (x, y) = (grid.x(), grid.y());
    match key {
        EdgeKey::Horizontal(col, row) => {
            let t = fraction(grid.value(col, row), grid.value(col + 1, row), level);
            Point2::new(x[col] + t * (x[col + 1] - x[col]), y[row])
        }
        EdgeKey::Vertical(col, row) => {
            let t = fraction(grid.value(col, row), grid.value(col, row + 1), level);
            Point2::new(x[col], y[row] + t * (y[row + 1] - y[row]))
        }
    }
}

fn fraction(z0: f64, z1: f64, level: f64) -> f64 {
    let dz = z1 - z0;
    if dz.abs() < f64::EPSILON {
        0.5
    } else {
        ((level - z0) / dz).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation
)]
mod tests {
    use super::*;

    /// A basin deepening linearly towards each centre.
    fn basins(w: usize, h: usize, centres: &[(f64, f64)]) -> BathymetryGrid {
        let x: Vec<f64> = (0..w).map(|i| i as f64).collect();
        let y: Vec<f64> = (0..h).map(|j| j as f64).collect();
        let mut z = Vec::with_capacity(w * h);
        for &yj in &y {
            for &xi in &x {
                let depth = centres
                    .iter()
                    .map(|&(cx, cy)| -1000.0 + 100.0 * (xi - cx).hypot(yj - cy))
                    .fold(0.0_f64, f64::min);
                z.push(depth.min(0.0) as f32);
            }
        }
        BathymetryGrid::new(x, y, z).unwrap()
    }

    #[test]
    fn flat_grid_has_no_contours() {
        let g = BathymetryGrid::new(vec![0.0, 1.0, 2.0], vec![0.0, 1.0], vec![-10.0; 6]).unwrap();
        assert!(trace_contours(&g, -300.0).is_empty());
    }

    #[test]
    fn single_basin_gives_one_closed_ring() {
        let mut g = basins(21, 21, &[(10.0, 10.0)]);
        g.zero_edges();
        let paths = trace_contours(&g, -300.0);
        assert_eq!(paths.len(), 1);
        let ring = &paths[0];
        assert!(ring.closed);
        assert_eq!(ring.points.first(), ring.points.last());
        for p in &ring.points {
            let r = (p.x - 10.0).hypot(p.y - 10.0);
            assert!((r - 7.0).abs() < 0.25, "vertex at radius {r}");
        }
    }

    #[test]
    fn longest_of_two_basins() {
        let mut g = basins(40, 20, &[(9.0, 9.5), (30.0, 9.5)]);
        // Make the second basin shallower so its ring is smaller.
        let w = g.width();
        for (i, v) in g.values_mut().iter_mut().enumerate() {
            if i % w >= 20 {
                *v = (*v * 0.6).min(0.0);
            }
        }
        g.zero_edges();
        let paths = trace_contours(&g, -300.0);
        assert_eq!(paths.len(), 2);
        let longest = longest_path(&paths).unwrap();
        let cx = longest.points.iter().map(|p| p.x).sum::<f64>() / longest.len() as f64;
        assert!(cx < 20.0, "expected the left basin, centroid x = {cx}");
    }

    #[test]
    fn nan_cells_leave_open_paths() {
        let mut g = basins(21, 21, &[(10.0, 10.0)]);
        g.zero_edges();
        let w = g.width();
        for (i, v) in g.values_mut().iter_mut().enumerate() {
            if i % w == 10 {
                *v = f32::NAN;
            }
        }
        let paths = trace_contours(&g, -300.0);
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| !p.closed));
    }

    #[test]
    fn saddle_cells_produce_two_segments() {
        // Diagonal corners deep, the other two shallow, centre shallow.
        let g = BathymetryGrid::new(
            vec![0.0, 1.0],
            vec![0.0, 1.0],
            vec![-500.0, -100.0, -100.0, -400.0],
        )
        .unwrap();
        let paths = trace_contours(&g, -300.0);
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.len() == 2));
    }

    #[test]
    fn longest_prefers_first_on_ties() {
        let a = ContourPath {
            points: vec![Point2::new(0.0, 0.0); 3],
            closed: false,
        };
        let b = ContourPath {
            points: vec![Point2::new(1.0, 1.0); 3],
            closed: false,
        };
        let paths = [a.clone(), b];
        assert_eq!(longest_path(&paths), Some(&a));
        assert!(longest_path(&[]).is_none());
    }
}
