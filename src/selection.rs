use tracing::trace;

/// Consecutive frames on one cell before it is selected (about 0.5-0.6s at 30fps).
pub const DEFAULT_STABLE_FRAMES: u32 = 18;

/// What the grid should show after a frame, and whether a cell fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Observation {
    /// Cell to highlight; `None` clears every highlight.
    pub hovered: Option<usize>,
    /// Set on the single frame where the dwell count reaches the threshold.
    pub select: Option<usize>,
}

/// Dwell-based selection. Fires once per climb to the threshold; frames with
/// no face neither advance nor reset the climb.
#[derive(Debug, Clone)]
pub struct SelectionTracker {
    last_hovered: Option<usize>,
    stable_frames: u32,
    threshold: u32,
}

impl Default for SelectionTracker {
    fn default() -> Self {
        Self::new(DEFAULT_STABLE_FRAMES)
    }
}

impl SelectionTracker {
    pub fn new(threshold: u32) -> Self {
        Self {
            last_hovered: None,
            stable_frames: 0,
            threshold: threshold.max(1),
        }
    }

    pub fn last_hovered(&self) -> Option<usize> {
        self.last_hovered
    }

    pub fn stable_frames(&self) -> u32 {
        self.stable_frames
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn observe(&mut self, current: Option<usize>) -> Observation {
        let Some(index) = current else {
            return Observation::default();
        };

        if self.last_hovered == Some(index) {
            self.stable_frames = self.stable_frames.saturating_add(1);
        } else {
            self.last_hovered = Some(index);
            self.stable_frames = 1;
        }
        trace!(cell = index, frames = self.stable_frames, "dwell");

        Observation {
            hovered: Some(index),
            select: (self.stable_frames == self.threshold).then_some(index),
        }
    }

    pub fn reset(&mut self) {
        self.last_hovered = None;
        self.stable_frames = 0;
    }
}
