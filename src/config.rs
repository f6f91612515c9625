use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::completion::{DEFAULT_ENDPOINT, FALLBACK_TEXT, PROMPT_SUFFIX};
use crate::error::GazeError;
use crate::gaze::{LEFT_IRIS_CENTER, RIGHT_IRIS_CENTER};
use crate::grid::DEFAULT_SENSITIVITY;
use crate::selection::DEFAULT_STABLE_FRAMES;

pub const DEFAULT_CONFIG_PATH: &str = "gaze-words.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub grid: GridConfig,
    pub tracking: TrackingConfig,
    pub selection: SelectionConfig,
    pub completion: CompletionConfig,
    pub speech: SpeechConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub rows: usize,
    pub cols: usize,
    /// Row-major, `rows * cols` entries.
    pub words: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    pub sensitivity: f32,
    pub stable_frames: u32,
    pub left_iris: usize,
    pub right_iris: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Words needed before the completion action shows up.
    pub min_words: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    pub endpoint: String,
    pub prompt_suffix: String,
    pub fallback: String,
    pub api_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub enabled: bool,
    /// TTS command line; the platform default when unset.
    pub command: Option<String>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: 3,
            cols: 3,
            words: ["I", "want", "need", "water", "food", "help", "please", "now", "thanks"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            sensitivity: DEFAULT_SENSITIVITY,
            stable_frames: DEFAULT_STABLE_FRAMES,
            left_iris: LEFT_IRIS_CENTER,
            right_iris: RIGHT_IRIS_CENTER,
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self { min_words: 3 }
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            prompt_suffix: PROMPT_SUFFIX.to_string(),
            fallback: FALLBACK_TEXT.to_string(),
            api_token: None,
        }
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: None,
        }
    }
}

impl AppConfig {
    /// Loads `path` if it exists. A file that fails to parse is reported and
    /// replaced by defaults; missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        match serde_json::from_str::<AppConfig>(&content) {
            Ok(c) => {
                info!("Loaded configuration from {}", path.display());
                Ok(c)
            }
            Err(e) => {
                warn!("Error parsing config {}: {}. Loading defaults.", path.display(), e);
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write config {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> std::result::Result<(), GazeError> {
        let bad = |msg: String| Err(GazeError::Config(msg));

        let grid = &self.grid;
        if grid.rows == 0 || grid.cols == 0 {
            return bad(format!("grid must have at least one cell, got {}x{}", grid.rows, grid.cols));
        }
        if grid.words.len() != grid.rows * grid.cols {
            return bad(format!(
                "grid is {}x{} but {} words were given",
                grid.rows,
                grid.cols,
                grid.words.len()
            ));
        }

        let tracking = &self.tracking;
        if !tracking.sensitivity.is_finite() || tracking.sensitivity <= 0.0 {
            return bad(format!("sensitivity must be a positive number, got {}", tracking.sensitivity));
        }
        if tracking.stable_frames == 0 {
            return bad("stable_frames must be at least 1".to_string());
        }
        if tracking.left_iris == tracking.right_iris {
            return bad(format!("left and right iris share landmark {}", tracking.left_iris));
        }

        if self.selection.min_words == 0 {
            return bad("min_words must be at least 1".to_string());
        }
        if self.completion.endpoint.trim().is_empty() {
            return bad("completion endpoint is empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("gaze-words-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn test_defaults_are_valid() {
        let c = AppConfig::default();
        c.validate().unwrap();
        assert_eq!(c.grid.words.len(), 9);
        assert_eq!(c.tracking.stable_frames, 18);
        assert_eq!(c.tracking.sensitivity, 2.5);
        assert_eq!(c.selection.min_words, 3);
        assert_eq!(c.completion.fallback, "AI error.");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let c: AppConfig = serde_json::from_str(r#"{"tracking": {"stable_frames": 10}}"#).unwrap();
        assert_eq!(c.tracking.stable_frames, 10);
        assert_eq!(c.tracking.left_iris, 468);
        assert_eq!(c.grid, GridConfig::default());
    }

    #[test]
    fn test_validate_rejects_mismatched_words() {
        let mut c = AppConfig::default();
        c.grid.rows = 2;
        assert!(matches!(c.validate(), Err(GazeError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_bad_tracking() {
        let mut c = AppConfig::default();
        c.tracking.sensitivity = -1.0;
        assert!(c.validate().is_err());

        let mut c = AppConfig::default();
        c.tracking.right_iris = c.tracking.left_iris;
        assert!(c.validate().is_err());

        let mut c = AppConfig::default();
        c.tracking.stable_frames = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let c = AppConfig::load(temp_path("missing")).unwrap();
        assert_eq!(c, AppConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let path = temp_path("saved");
        let mut c = AppConfig::default();
        c.selection.min_words = 4;
        c.speech.command = Some("espeak-ng".into());
        c.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, c);
    }

    #[test]
    fn test_unparseable_file_loads_defaults() {
        let path = temp_path("garbage");
        fs::write(&path, "{ not json").unwrap();
        let loaded = AppConfig::load(&path).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded, AppConfig::default());
    }
}
