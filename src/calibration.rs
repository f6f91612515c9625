use tracing::info;

use crate::error::{GazeError, Result};
use crate::types::GazePoint;

/// Holds the re-centering baseline. Lives as long as the session, is
/// overwritten by every successful calibration and never expires on its own.
#[derive(Debug, Clone, Default)]
pub struct CalibrationStore {
    baseline: Option<GazePoint>,
}

impl CalibrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn baseline(&self) -> Option<GazePoint> {
        self.baseline
    }

    pub fn is_calibrated(&self) -> bool {
        self.baseline.is_some()
    }

    /// Captures `current` as the new baseline. Without a current reading the
    /// store is left untouched.
    pub fn calibrate(&mut self, current: Option<GazePoint>) -> Result<GazePoint> {
        let gaze = current.ok_or(GazeError::NoFaceDetected)?;
        self.baseline = Some(gaze);
        info!("Calibrated baseline at ({:.3}, {:.3})", gaze.x, gaze.y);
        Ok(gaze)
    }
}
