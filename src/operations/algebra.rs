//! The polygon-algebra seam: every boolean operation on feature geometry
//! goes through [`PolygonAlgebra`], so the assembly logic does not depend
//! on a particular computational-geometry engine.

use geo::{Area, BooleanOps, MultiPolygon};

/// Boolean operations and measures on multi-polygons.
pub trait PolygonAlgebra {
    /// Returns `a ∪ b`.
    fn union(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64>;

    /// Returns `a − b`.
    fn difference(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64>;

    /// Returns `a ∩ b`.
    fn intersection(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64>;

    /// Planar area in squared coordinate units.
    fn area(&self, geometry: &MultiPolygon<f64>) -> f64;

    /// Unions every geometry in `geometries`. An empty input yields an
    /// empty multi-polygon.
    fn union_all<'a, I>(&self, geometries: I) -> MultiPolygon<f64>
    where
        I: IntoIterator<Item = &'a MultiPolygon<f64>>,
        Self: Sized,
    {
        geometries
            .into_iter()
            .fold(MultiPolygon::new(Vec::new()), |acc, g| {
                if acc.0.is_empty() {
                    g.clone()
                } else {
                    self.union(&acc, g)
                }
            })
    }
}

/// [`PolygonAlgebra`] backed by the `geo` crate's sweep-line boolean ops.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoAlgebra;

impl PolygonAlgebra for GeoAlgebra {
    fn union(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        if b.0.is_empty() {
            return a.clone();
        }
        if a.0.is_empty() {
            return b.clone();
        }
        a.union(b)
    }

    fn difference(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        if a.0.is_empty() || b.0.is_empty() {
            return a.clone();
        }
        a.difference(b)
    }

    fn intersection(&self, a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        if a.0.is_empty() || b.0.is_empty() {
            return MultiPolygon::new(Vec::new());
        }
        a.intersection(b)
    }

    fn area(&self, geometry: &MultiPolygon<f64>) -> f64 {
        geometry.unsigned_area()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use geo::polygon;

    fn rect(x0: f64, x1: f64, y0: f64, y1: f64) -> MultiPolygon<f64> {
        MultiPolygon::new(vec![polygon![
            (x: x0, y: y0), (x: x1, y: y0), (x: x1, y: y1), (x: x0, y: y1)
        ]])
    }

    #[test]
    fn union_does_not_double_count_overlap() {
        let alg = GeoAlgebra;
        let u = alg.union(&rect(0.0, 2.0, 0.0, 2.0), &rect(1.0, 3.0, 0.0, 2.0));
        assert_relative_eq!(alg.area(&u), 6.0, epsilon = 1e-9);
    }

    #[test]
    fn difference_and_intersection_partition() {
        let alg = GeoAlgebra;
        let a = rect(0.0, 4.0, 0.0, 4.0);
        let b = rect(2.0, 6.0, 1.0, 3.0);
        let d = alg.difference(&a, &b);
        let i = alg.intersection(&a, &b);
        assert_relative_eq!(alg.area(&d), 12.0, epsilon = 1e-9);
        assert_relative_eq!(alg.area(&i), 4.0, epsilon = 1e-9);
        assert_relative_eq!(alg.area(&d) + alg.area(&i), alg.area(&a), epsilon = 1e-9);
    }

    #[test]
    fn empty_operands() {
        let alg = GeoAlgebra;
        let a = rect(0.0, 1.0, 0.0, 1.0);
        let empty = MultiPolygon::new(Vec::new());
        assert_relative_eq!(alg.area(&alg.union(&empty, &a)), 1.0, epsilon = 1e-12);
        assert_relative_eq!(alg.area(&alg.difference(&a, &empty)), 1.0, epsilon = 1e-12);
        assert!(alg.intersection(&a, &empty).0.is_empty());
        assert!(alg.difference(&empty, &a).0.is_empty());
    }

    #[test]
    fn union_all_folds() {
        let alg = GeoAlgebra;
        let parts = [
            rect(0.0, 1.0, 0.0, 1.0),
            rect(1.0, 2.0, 0.0, 1.0),
            rect(0.5, 1.5, 0.0, 1.0),
        ];
        assert_relative_eq!(alg.area(&alg.union_all(&parts)), 2.0, epsilon = 1e-9);
        assert!(alg.union_all(std::iter::empty()).0.is_empty());
    }
}
