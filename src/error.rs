use thiserror::Error;

#[derive(Debug, Error)]
pub enum GazeError {
    #[error("no face detected")]
    NoFaceDetected,

    #[error("cell {index} is outside the {len}-cell grid")]
    CellOutOfRange { index: usize, len: usize },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("landmark source: {0}")]
    Source(String),
}

pub type Result<T> = std::result::Result<T, GazeError>;
