//! Eye-gaze word selection.
//!
//! Iris landmarks from a face-mesh source become a gaze point, the gaze point
//! becomes a cell of a word grid, and holding the gaze on a cell collects its
//! word. The collected words are sent to a hosted language model and the reply
//! is spoken aloud.

pub mod calibration;
pub mod completion;
pub mod config;
pub mod error;
pub mod gaze;
pub mod grid;
pub mod selection;
pub mod session;
pub mod source;
pub mod speech;
pub mod types;
pub mod words;

pub use error::GazeError;
pub use session::Session;
