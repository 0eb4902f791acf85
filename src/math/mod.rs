pub mod polygon_2d;
pub mod stereographic;

/// 2D point type (projected metres or longitude/latitude degrees).
pub type Point2 = nalgebra::Point2<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Number of decimal places kept when coordinates are written out.
pub const COORD_DIGITS: i32 = 6;

/// Rounds a coordinate value to [`COORD_DIGITS`] decimal places.
///
/// Negative zero is normalised to `0.0` so rounded output is stable.
#[must_use]
pub fn round_coord(value: f64) -> f64 {
    let scale = 10f64.powi(COORD_DIGITS);
    let rounded = (value * scale).round() / scale;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}
