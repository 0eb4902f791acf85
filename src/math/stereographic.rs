//! North polar stereographic projection on an ellipsoid (Snyder, *Map
//! Projections: A Working Manual*, §21, variant B with a latitude of true
//! scale).

use std::f64::consts::FRAC_PI_2;
use std::f64::consts::FRAC_PI_4;

use super::Point2;

/// WGS84 semi-major axis in metres.
const WGS84_A: f64 = 6_378_137.0;

/// WGS84 inverse flattening.
const WGS84_INV_F: f64 = 298.257_223_563;

const MAX_ITERATIONS: usize = 32;
const CONVERGENCE: f64 = 1e-14;

/// A north polar stereographic projection.
#[derive(Debug, Clone, Copy)]
pub struct PolarStereographic {
    a: f64,
    e: f64,
    lon_0: f64,
    /// `a * m_c / t_c`, the radius scale at the latitude of true scale.
    k: f64,
}

impl PolarStereographic {
    /// Arctic Polar Stereographic (EPSG:3995): WGS84, true scale at 71°N,
    /// central meridian 0°.
    #[must_use]
    pub fn arctic() -> Self {
        Self::new(WGS84_A, WGS84_INV_F, 71.0, 0.0)
    }

    /// Creates a projection from the ellipsoid and the latitude of true
    /// scale / central meridian (both in degrees).
    #[must_use]
    pub fn new(a: f64, inv_f: f64, lat_ts_deg: f64, lon_0_deg: f64) -> Self {
        let f = 1.0 / inv_f;
        let e = (f * (2.0 - f)).sqrt();
        let phi_c = lat_ts_deg.to_radians();
        let m_c = phi_c.cos() / (1.0 - (e * phi_c.sin()).powi(2)).sqrt();
        let t_c = t_of(phi_c, e);
        Self {
            a,
            e,
            lon_0: lon_0_deg.to_radians(),
            k: a * m_c / t_c,
        }
    }

    /// Projects longitude/latitude (degrees) to stereographic x/y (metres).
    #[must_use]
    pub fn forward(&self, lon_lat: Point2) -> Point2 {
        let lambda = lon_lat.x.to_radians();
        let phi = lon_lat.y.to_radians();
        let rho = self.k * t_of(phi, self.e);
        let dl = lambda - self.lon_0;
        Point2::new(rho * dl.sin(), -rho * dl.cos())
    }

    /// Unprojects stereographic x/y (metres) to longitude/latitude (degrees).
    ///
    /// Longitude is in `[-180, 180]`. Points on the positive y axis map to
    /// ±180° depending on the sign of x, which is what lets the wedge cut
    /// along that axis open the polygon at the antimeridian.
    #[must_use]
    pub fn inverse(&self, xy: Point2) -> Point2 {
        let rho = xy.x.hypot(xy.y);
        let t = rho / self.k;
        let half_e = self.e * 0.5;

        let mut phi = FRAC_PI_2 - 2.0 * t.atan();
        for _ in 0..MAX_ITERATIONS {
            let es = self.e * phi.sin();
            let next = FRAC_PI_2 - 2.0 * (t * ((1.0 - es) / (1.0 + es)).powf(half_e)).atan();
            let done = (next - phi).abs() < CONVERGENCE;
            phi = next;
            if done {
                break;
            }
        }

        let lambda = self.lon_0 + xy.x.atan2(-xy.y);
        Point2::new(wrap_degrees(lambda.to_degrees()), phi.to_degrees())
    }

    /// Semi-major axis of the underlying ellipsoid.
    #[must_use]
    pub fn semi_major_axis(&self) -> f64 {
        self.a
    }
}

fn t_of(phi: f64, e: f64) -> f64 {
    let es = e * phi.sin();
    (FRAC_PI_4 - phi * 0.5).tan() / ((1.0 - es) / (1.0 + es)).powf(e * 0.5)
}

fn wrap_degrees(lon: f64) -> f64 {
    if lon > 180.0 {
        lon - 360.0
    } else if lon < -180.0 {
        lon + 360.0
    } else {
        lon
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn pole_maps_to_origin() {
        let proj = PolarStereographic::arctic();
        let xy = proj.forward(Point2::new(0.0, 90.0));
        assert!(xy.x.abs() < 1e-6 && xy.y.abs() < 1e-6);
        let ll = proj.inverse(Point2::new(0.0, 0.0));
        assert_relative_eq!(ll.y, 90.0, epsilon = 1e-9);
    }

    #[test]
    fn meridians_follow_axes() {
        let proj = PolarStereographic::arctic();
        // Greenwich points down the negative y axis.
        let xy = proj.forward(Point2::new(0.0, 75.0));
        assert!(xy.x.abs() < 1e-6);
        assert!(xy.y < 0.0);
        // 90°E points along positive x.
        let xy = proj.forward(Point2::new(90.0, 75.0));
        assert!(xy.x > 0.0);
        assert!(xy.y.abs() < 1e-6);
    }

    #[test]
    fn positive_y_axis_splits_at_antimeridian() {
        let proj = PolarStereographic::arctic();
        let east = proj.inverse(Point2::new(1e-14, 1_000_000.0));
        let west = proj.inverse(Point2::new(-1e-14, 1_000_000.0));
        assert_relative_eq!(east.x, 180.0, epsilon = 1e-9);
        assert_relative_eq!(west.x, -180.0, epsilon = 1e-9);
    }

    #[test]
    fn round_trip() {
        let proj = PolarStereographic::arctic();
        for &(lon, lat) in &[
            (-150.0, 75.5),
            (20.0, 79.0),
            (145.0, 68.0),
            (-36.0, 86.0),
            (100.0, 60.0),
        ] {
            let back = proj.inverse(proj.forward(Point2::new(lon, lat)));
            assert_relative_eq!(back.x, lon, epsilon = 1e-8);
            assert_relative_eq!(back.y, lat, epsilon = 1e-8);
        }
    }

    #[test]
    fn true_scale_latitude_distance() {
        // At 71°N the parallel radius in the projection equals the ellipsoid
        // parallel radius a*m_c.
        let proj = PolarStereographic::arctic();
        let e2 = 1.0 / WGS84_INV_F * (2.0 - 1.0 / WGS84_INV_F);
        let phi = 71f64.to_radians();
        let expected = proj.semi_major_axis() * phi.cos() / (1.0 - e2 * phi.sin().powi(2)).sqrt();
        let xy = proj.forward(Point2::new(0.0, 71.0));
        assert_relative_eq!(-xy.y, expected, max_relative = 1e-12);
    }
}
