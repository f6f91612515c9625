use tracing::debug;

use crate::types::{GazePoint, LandmarkFrame, Point3D};

/// Face-mesh index of the left iris center (refined landmark set).
pub const LEFT_IRIS_CENTER: usize = 468;
/// Face-mesh index of the right iris center (refined landmark set).
pub const RIGHT_IRIS_CENTER: usize = 473;

/// One frame's gaze reading, with the iris points it was derived from so a
/// renderer can draw them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeEstimate {
    pub gaze: GazePoint,
    pub left_iris: Point3D,
    pub right_iris: Point3D,
}

// =========================================================================
// Gaze Estimator (Iris Midpoint)
// Each frame is independent, no smoothing across frames.
// =========================================================================
#[derive(Debug, Clone, Copy)]
pub struct GazeEstimator {
    left_iris: usize,
    right_iris: usize,
}

impl Default for GazeEstimator {
    fn default() -> Self {
        Self::new(LEFT_IRIS_CENTER, RIGHT_IRIS_CENTER)
    }
}

impl GazeEstimator {
    pub fn new(left_iris: usize, right_iris: usize) -> Self {
        Self { left_iris, right_iris }
    }

    /// Returns `None` when the frame carries no face, or when the face mesh was
    /// produced without refined iris landmarks.
    pub fn estimate(&self, frame: &LandmarkFrame) -> Option<GazeEstimate> {
        let face = frame.primary_face()?;

        let (Some(left), Some(right)) = (face.get(self.left_iris), face.get(self.right_iris)) else {
            debug!(
                points = face.points.len(),
                "face mesh lacks iris landmarks {} / {}",
                self.left_iris,
                self.right_iris
            );
            return None;
        };

        Some(GazeEstimate {
            gaze: iris_midpoint(left, right),
            left_iris: *left,
            right_iris: *right,
        })
    }
}

pub fn iris_midpoint(left: &Point3D, right: &Point3D) -> GazePoint {
    GazePoint {
        x: (left.x + right.x) / 2.0,
        y: (left.y + right.y) / 2.0,
    }
}
