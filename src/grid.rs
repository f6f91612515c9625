use crate::error::{GazeError, Result};
use crate::types::{GazePoint, NormalizedGaze};

/// Gain applied to the deviation from the calibrated center.
pub const DEFAULT_SENSITIVITY: f32 = 2.5;

/// Maps gaze readings onto a fixed `rows x cols` grid. Stateless.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMapper {
    rows: usize,
    cols: usize,
    sensitivity: f32,
}

impl Default for GridMapper {
    fn default() -> Self {
        Self {
            rows: 3,
            cols: 3,
            sensitivity: DEFAULT_SENSITIVITY,
        }
    }
}

impl GridMapper {
    pub fn new(rows: usize, cols: usize, sensitivity: f32) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(GazeError::Config(format!("grid must have at least one cell, got {rows}x{cols}")));
        }
        if !sensitivity.is_finite() || sensitivity <= 0.0 {
            return Err(GazeError::Config(format!("sensitivity must be a positive number, got {sensitivity}")));
        }
        Ok(Self { rows, cols, sensitivity })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    pub fn normalize(&self, gaze: GazePoint, baseline: Option<GazePoint>) -> NormalizedGaze {
        normalize(gaze, baseline, self.sensitivity)
    }

    pub fn cell_index(&self, norm: NormalizedGaze) -> usize {
        cell_index(norm, self.rows, self.cols)
    }

    /// Normalization followed by indexing.
    pub fn locate(&self, gaze: GazePoint, baseline: Option<GazePoint>) -> usize {
        self.cell_index(self.normalize(gaze, baseline))
    }
}

/// Identity without a baseline. With one, the deviation from it is amplified
/// around the grid center and clamped into [0,1].
pub fn normalize(gaze: GazePoint, baseline: Option<GazePoint>, sensitivity: f32) -> NormalizedGaze {
    match baseline {
        Some(base) => NormalizedGaze {
            x: (0.5 + (gaze.x - base.x) * sensitivity).clamp(0.0, 1.0),
            y: (0.5 + (gaze.y - base.y) * sensitivity).clamp(0.0, 1.0),
        },
        None => NormalizedGaze { x: gaze.x, y: gaze.y },
    }
}

/// Row-major cell index. 1.0 lands in the last row/column instead of overflowing.
pub fn cell_index(norm: NormalizedGaze, rows: usize, cols: usize) -> usize {
    let col = axis_bucket(norm.x, cols);
    let row = axis_bucket(norm.y, rows);
    row * cols + col
}

fn axis_bucket(v: f32, n: usize) -> usize {
    // Uncalibrated readings may stray slightly outside [0,1]; the `as` cast
    // saturates negatives at zero.
    let bucket = (v * n as f32).floor() as usize;
    bucket.min(n - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(x: f32, y: f32) -> NormalizedGaze {
        NormalizedGaze { x, y }
    }

    #[test]
    fn test_identity_without_baseline() {
        for &(x, y) in &[(0.0, 0.0), (0.13, 0.87), (0.5, 0.5), (1.0, 0.25)] {
            let n = normalize(GazePoint::new(x, y), None, DEFAULT_SENSITIVITY);
            assert_eq!((n.x, n.y), (x, y));
        }
    }

    #[test]
    fn test_baseline_recenters() {
        let base = GazePoint::new(0.42, 0.61);
        let n = normalize(base, Some(base), DEFAULT_SENSITIVITY);
        assert!((n.x - 0.5).abs() < 1e-6);
        assert!((n.y - 0.5).abs() < 1e-6);

        // 0.1 to the right of center sweeps 0.25 of the grid
        let n = normalize(GazePoint::new(0.52, 0.61), Some(base), DEFAULT_SENSITIVITY);
        assert!((n.x - 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_baseline_output_always_clamped() {
        let base = GazePoint::new(0.5, 0.5);
        for &(x, y) in &[(-3.0, 9.0), (0.0, 0.0), (1.0, 1.0), (0.99, 0.01), (50.0, -50.0)] {
            let n = normalize(GazePoint::new(x, y), Some(base), DEFAULT_SENSITIVITY);
            assert!((0.0..=1.0).contains(&n.x), "x={} escaped", n.x);
            assert!((0.0..=1.0).contains(&n.y), "y={} escaped", n.y);
        }
    }

    #[test]
    fn test_corner_indices() {
        assert_eq!(cell_index(norm(0.0, 0.0), 3, 3), 0);
        assert_eq!(cell_index(norm(0.999, 0.999), 3, 3), 8);
        assert_eq!(cell_index(norm(1.0, 1.0), 3, 3), 8);
        assert_eq!(cell_index(norm(1.0, 0.0), 3, 3), 2);
        assert_eq!(cell_index(norm(0.0, 1.0), 3, 3), 6);
    }

    #[test]
    fn test_row_major_layout() {
        assert_eq!(cell_index(norm(0.5, 0.5), 3, 3), 4);
        assert_eq!(cell_index(norm(0.4, 0.7), 3, 3), 7);
        // non-square grid: 2 rows x 4 cols
        assert_eq!(cell_index(norm(0.8, 0.9), 2, 4), 7);
        assert_eq!(cell_index(norm(0.3, 0.1), 2, 4), 1);
    }

    #[test]
    fn test_out_of_range_raw_gaze_stays_in_grid() {
        assert_eq!(cell_index(norm(-0.2, 1.4), 3, 3), 6);
    }

    #[test]
    fn test_mapper_rejects_bad_shapes() {
        assert!(GridMapper::new(0, 3, 2.5).is_err());
        assert!(GridMapper::new(3, 3, 0.0).is_err());
        assert!(GridMapper::new(3, 3, f32::NAN).is_err());
        let m = GridMapper::new(3, 3, 2.5).unwrap();
        assert_eq!(m.cell_count(), 9);
        assert_eq!(m.locate(GazePoint::new(0.5, 0.5), None), 4);
    }
}
