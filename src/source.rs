//! Landmark sources.
//!
//! Frames arrive as JSON lines, one frame per line:
//!
//! ```text
//! {"faces": [[{"x": 0.41, "y": 0.52, "z": -0.01}, ...]]}
//! {"faces": []}
//! ```
//!
//! A face-mesh process (for example a MediaPipe script reading the webcam)
//! writes them to stdout; a recorded file replays them.

use std::io::{BufRead, BufReader};
use std::process::{Child, ChildStdout, Command, Stdio};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::error::GazeError;
use crate::types::LandmarkFrame;

pub trait LandmarkSource {
    fn name(&self) -> String;
    /// Next frame, or `None` once the source is exhausted.
    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>>;
}

pub fn parse_frame(line: &str) -> std::result::Result<LandmarkFrame, GazeError> {
    serde_json::from_str(line).map_err(|e| GazeError::Source(e.to_string()))
}

/// Reads frames from any line-oriented reader. A line that does not parse is
/// logged and delivered as a frame without a face.
pub struct JsonLinesSource<R> {
    name: String,
    reader: R,
    line: String,
    line_no: u64,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(name: impl Into<String>, reader: R) -> Self {
        Self {
            name: name.into(),
            reader,
            line: String::new(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> LandmarkSource for JsonLinesSource<R> {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>> {
        loop {
            self.line.clear();
            let read = self
                .reader
                .read_line(&mut self.line)
                .with_context(|| format!("Failed to read from {}", self.name))?;
            if read == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let trimmed = self.line.trim();
            if trimmed.is_empty() {
                continue;
            }
            return Ok(Some(match parse_frame(trimmed) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!("{} line {}: {}", self.name, self.line_no, e);
                    LandmarkFrame::no_face()
                }
            }));
        }
    }
}

/// Runs an external face-mesh command and reads its stdout. The process is
/// killed when the source is dropped.
pub struct ProcessSource {
    process: Child,
    lines: JsonLinesSource<BufReader<ChildStdout>>,
}

impl ProcessSource {
    pub fn spawn(command: &[String]) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .context("Face-mesh command is empty")?;

        info!("Launching face-mesh process: {}", command.join(" "));
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("Failed to spawn face-mesh process `{program}`"))?;

        let stdout = child
            .stdout
            .take()
            .context("Failed to open stdout from face-mesh process")?;

        Ok(Self {
            process: child,
            lines: JsonLinesSource::new(program.clone(), BufReader::new(stdout)),
        })
    }
}

impl LandmarkSource for ProcessSource {
    fn name(&self) -> String {
        self.lines.name()
    }

    fn next_frame(&mut self) -> Result<Option<LandmarkFrame>> {
        self.lines.next_frame()
    }
}

impl Drop for ProcessSource {
    fn drop(&mut self) {
        let _ = self.process.kill();
        let _ = self.process.wait();
        info!("Face-mesh process stopped");
    }
}
