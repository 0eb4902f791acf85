use crate::error::{BathymetryError, Result};

/// Depth samples on a regular projected grid.
///
/// `z` is row-major with `y.len()` rows of `x.len()` columns, so the sample
/// at column `i`, row `j` sits at `(x[i], y[j])`.
#[derive(Debug, Clone)]
pub struct BathymetryGrid {
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f32>,
}

impl BathymetryGrid {
    /// Creates a grid from its coordinate axes and row-major depth values.
    ///
    /// # Errors
    ///
    /// Returns `BathymetryError::Grid` if either axis has fewer than two
    /// samples or `z` does not hold `x.len() * y.len()` values.
    pub fn new(x: Vec<f64>, y: Vec<f64>, z: Vec<f32>) -> Result<Self> {
        if x.len() < 2 || y.len() < 2 {
            return Err(BathymetryError::Grid(format!(
                "grid must be at least 2x2, got {}x{}",
                x.len(),
                y.len()
            ))
            .into());
        }
        if z.len() != x.len() * y.len() {
            return Err(BathymetryError::Grid(format!(
                "expected {} depth values for a {}x{} grid, got {}",
                x.len() * y.len(),
                x.len(),
                y.len(),
                z.len()
            ))
            .into());
        }
        Ok(Self { x, y, z })
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.x.len()
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.y.len()
    }

    #[must_use]
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    #[must_use]
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Depth at column `col`, row `row`.
    #[must_use]
    pub fn value(&self, col: usize, row: usize) -> f64 {
        f64::from(self.z[row * self.x.len() + col])
    }

    /// Row-major depth values.
    pub fn values_mut(&mut self) -> &mut [f32] {
        &mut self.z
    }

    /// Sets the depth of the outermost rows and columns to zero so every
    /// below-sea-level contour closes inside the grid.
    pub fn zero_edges(&mut self) {
        let (w, h) = (self.width(), self.height());
        for col in 0..w {
            self.z[col] = 0.0;
            self.z[(h - 1) * w + col] = 0.0;
        }
        for row in 0..h {
            self.z[row * w] = 0.0;
            self.z[row * w + w - 1] = 0.0;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn grid(w: usize, h: usize, fill: f32) -> BathymetryGrid {
        let x = (0..w).map(|i| i as f64).collect();
        let y = (0..h).map(|j| j as f64 * 10.0).collect();
        BathymetryGrid::new(x, y, vec![fill; w * h]).unwrap()
    }

    #[test]
    fn rejects_mismatched_sizes() {
        assert!(BathymetryGrid::new(vec![0.0, 1.0], vec![0.0, 1.0], vec![0.0; 3]).is_err());
        assert!(BathymetryGrid::new(vec![0.0], vec![0.0, 1.0], vec![0.0; 2]).is_err());
    }

    #[test]
    fn value_is_row_major() {
        let mut g = grid(3, 2, 0.0);
        g.z[4] = -7.0;
        assert!((g.value(1, 1) + 7.0).abs() < f64::EPSILON);
        assert!((g.y()[1] - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_edges_only_touches_border() {
        let mut g = grid(4, 5, -500.0);
        g.zero_edges();
        for row in 0..g.height() {
            for col in 0..g.width() {
                let border = row == 0 || col == 0 || row == g.height() - 1 || col == g.width() - 1;
                let expected = if border { 0.0 } else { -500.0 };
                assert!((g.value(col, row) - expected).abs() < f64::EPSILON);
            }
        }
    }
}
