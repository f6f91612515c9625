//! The word-selection session.
//!
//! All mutable state of one user's run lives here. The driver feeds it frames
//! and user actions one at a time; each call updates the state and reports
//! what changed so the driver can redraw. The only suspension point is the
//! completion request, split into [`Session::begin_completion`] and
//! [`Session::finish_completion`] so frames keep flowing while it is pending.

use tracing::{debug, info};

use crate::calibration::CalibrationStore;
use crate::completion::CompletionClient;
use crate::config::AppConfig;
use crate::error::Result;
use crate::gaze::{GazeEstimate, GazeEstimator};
use crate::grid::GridMapper;
use crate::selection::SelectionTracker;
use crate::speech::SpeechOutput;
use crate::types::{GazePoint, LandmarkFrame, NormalizedGaze};
use crate::words::{Cell, Toggle, WordGrid};

pub const PENDING_TEXT: &str = "Waiting for AI...";
pub const CALIBRATED_TEXT: &str = "Calibrated. Now look at a word to select.";
pub const NO_FACE_TEXT: &str = "Please ensure your face is detected.";

/// What one frame did.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameOutcome {
    pub gaze: Option<GazeEstimate>,
    pub normalized: Option<NormalizedGaze>,
    pub hovered: Option<usize>,
    /// Cell whose word was collected on this frame.
    pub selected: Option<usize>,
    /// The completion action became visible on this frame.
    pub completion_revealed: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectOutcome {
    pub newly_selected: bool,
    pub completion_revealed: bool,
}

pub struct Session {
    estimator: GazeEstimator,
    calibration: CalibrationStore,
    mapper: GridMapper,
    tracker: SelectionTracker,
    grid: WordGrid,
    min_words: usize,
    current_gaze: Option<GazePoint>,
    completion_visible: bool,
    result: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        let config = AppConfig::default();
        Self {
            estimator: GazeEstimator::default(),
            calibration: CalibrationStore::new(),
            mapper: GridMapper::default(),
            tracker: SelectionTracker::default(),
            grid: WordGrid::new(config.grid.words),
            min_words: config.selection.min_words,
            current_gaze: None,
            completion_visible: false,
            result: None,
        }
    }
}

impl Session {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        config.validate()?;
        let tracking = &config.tracking;
        Ok(Self {
            estimator: GazeEstimator::new(tracking.left_iris, tracking.right_iris),
            calibration: CalibrationStore::new(),
            mapper: GridMapper::new(config.grid.rows, config.grid.cols, tracking.sensitivity)?,
            tracker: SelectionTracker::new(tracking.stable_frames),
            grid: WordGrid::new(config.grid.words.iter().cloned()),
            min_words: config.selection.min_words,
            current_gaze: None,
            completion_visible: false,
            result: None,
        })
    }

    // ── Frames ────────────────────────────────────────────────

    pub fn process_frame(&mut self, frame: &LandmarkFrame) -> FrameOutcome {
        let Some(estimate) = self.estimator.estimate(frame) else {
            self.current_gaze = None;
            self.grid.set_hover(None);
            self.tracker.observe(None);
            return FrameOutcome::default();
        };
        self.current_gaze = Some(estimate.gaze);

        let normalized = self.mapper.normalize(estimate.gaze, self.calibration.baseline());
        let index = self.mapper.cell_index(normalized);
        let observation = self.tracker.observe(Some(index));
        self.grid.set_hover(observation.hovered);

        let mut outcome = FrameOutcome {
            gaze: Some(estimate),
            normalized: Some(normalized),
            hovered: observation.hovered,
            ..FrameOutcome::default()
        };

        if let Some(cell) = observation.select {
            // The mapper only yields indices inside the grid.
            if let Ok(selected) = self.select_cell(cell) {
                if selected.newly_selected {
                    outcome.selected = Some(cell);
                }
                outcome.completion_revealed = selected.completion_revealed;
            }
        }
        outcome
    }

    // ── User actions ──────────────────────────────────────────

    /// Re-centers on the current gaze. Fails without a face on the latest frame.
    pub fn calibrate(&mut self) -> Result<GazePoint> {
        self.calibration.calibrate(self.current_gaze)
    }

    /// Shared by dwell and click selection.
    pub fn select_cell(&mut self, index: usize) -> Result<SelectOutcome> {
        if !self.grid.select(index)? {
            return Ok(SelectOutcome::default());
        }
        info!("{}", self.grid.readout());
        Ok(SelectOutcome {
            newly_selected: true,
            completion_revealed: self.reveal_completion_if_ready(),
        })
    }

    /// Click on a cell: deselects it if selected, selects it otherwise.
    pub fn click_cell(&mut self, index: usize) -> Result<Toggle> {
        if self.grid.cell(index)?.selected {
            self.grid.deselect(index)?;
            info!("{}", self.grid.readout());
            Ok(Toggle::Deselected)
        } else {
            self.select_cell(index)?;
            Ok(Toggle::Selected)
        }
    }

    pub fn edit_cell(&mut self, index: usize, text: impl Into<String>) -> Result<()> {
        self.grid.set_text(index, text)
    }

    fn reveal_completion_if_ready(&mut self) -> bool {
        if self.completion_visible || self.grid.word_count() < self.min_words {
            return false;
        }
        self.completion_visible = true;
        debug!("completion action revealed");
        true
    }

    // ── Completion ────────────────────────────────────────────

    /// Shows the pending status and returns the prompt to send, or `None` while
    /// the completion action is hidden.
    pub fn begin_completion(&mut self) -> Option<String> {
        if !self.completion_visible {
            return None;
        }
        self.result = Some(PENDING_TEXT.to_string());
        Some(self.grid.prompt())
    }

    /// Shows and speaks the reply, then starts over with an empty selection.
    pub fn finish_completion(&mut self, text: String, speech: &impl SpeechOutput) {
        let text = self.result.insert(text);
        speech.speak(text);
        self.grid.clear_selection();
        self.completion_visible = false;
    }

    /// Runs a whole completion round trip. Returns the reply, or `None` if the
    /// completion action was not available.
    pub async fn complete(
        &mut self,
        client: &impl CompletionClient,
        speech: &impl SpeechOutput,
    ) -> Option<String> {
        let prompt = self.begin_completion()?;
        let text = client.complete(&prompt).await;
        self.finish_completion(text.clone(), speech);
        Some(text)
    }

    // ── Readouts ──────────────────────────────────────────────

    pub fn cells(&self) -> &[Cell] {
        self.grid.cells()
    }

    pub fn rows(&self) -> usize {
        self.mapper.rows()
    }

    pub fn cols(&self) -> usize {
        self.mapper.cols()
    }

    pub fn selected_words(&self) -> Vec<&str> {
        self.grid.selected_words()
    }

    /// `"Selected: "` followed by the words in selection order.
    pub fn readout(&self) -> String {
        self.grid.readout()
    }

    pub fn result_text(&self) -> Option<&str> {
        self.result.as_deref()
    }

    pub fn completion_visible(&self) -> bool {
        self.completion_visible
    }

    pub fn baseline(&self) -> Option<GazePoint> {
        self.calibration.baseline()
    }

    pub fn tracker(&self) -> &SelectionTracker {
        &self.tracker
    }
}

/// User-facing message for a calibration attempt.
pub fn calibration_message(result: &Result<GazePoint>) -> &'static str {
    match result {
        Ok(_) => CALIBRATED_TEXT,
        Err(_) => NO_FACE_TEXT,
    }
}
