use colored::*;

use gaze_words::session::{FrameOutcome, Session};
use gaze_words::words::Cell;

/// Terminal rendering of the session: the word grid and the readouts.
pub struct TerminalOutput {
    cell_width: usize,
}

impl TerminalOutput {
    pub fn new(session: &Session) -> Self {
        let widest = session.cells().iter().map(|c| c.text.trim().chars().count()).max().unwrap_or(0);
        Self {
            cell_width: widest.max(4) + 4,
        }
    }

    pub fn grid(&self, session: &Session) {
        let cols = session.cols();
        for (r, cells) in session.cells().chunks(cols).enumerate() {
            let line: Vec<String> = cells
                .iter()
                .enumerate()
                .map(|(c, cell)| self.cell(r * cols + c + 1, cell))
                .collect();
            println!("  {}", line.join(" "));
        }
    }

    fn cell(&self, number: usize, cell: &Cell) -> String {
        let label = format!("{}:{}", number, cell.text.trim());
        let padded = format!("{:<width$}", label, width = self.cell_width);
        match (cell.selected, cell.hovered) {
            (true, true) => padded.black().on_green().to_string(),
            (true, false) => padded.green().bold().to_string(),
            (false, true) => padded.black().on_cyan().to_string(),
            (false, false) => padded,
        }
    }

    pub fn selected(&self, session: &Session) {
        println!("{}", session.readout().bold());
        if session.completion_visible() {
            println!("{}", "[d] Complete".yellow());
        }
    }

    pub fn result(&self, session: &Session) {
        if let Some(text) = session.result_text() {
            println!("{} {}", "AI:".magenta().bold(), text);
        }
    }

    pub fn advisory(&self, text: &str) {
        println!("{}", text.yellow());
    }

    pub fn error(&self, text: &str) {
        println!("{}", text.red());
    }

    pub fn everything(&self, session: &Session) {
        self.grid(session);
        self.selected(session);
        self.result(session);
    }

    /// Iris points and gaze of the latest frame.
    pub fn gaze(&self, outcome: &FrameOutcome) {
        match gaze_line(outcome) {
            Some(line) => println!("{}", line.dimmed()),
            None => println!("{}", "No face in the latest frame".dimmed()),
        }
    }
}

pub fn gaze_line(outcome: &FrameOutcome) -> Option<String> {
    let estimate = outcome.gaze?;
    let mut line = format!(
        "iris L ({:.3}, {:.3}) R ({:.3}, {:.3}) gaze ({:.3}, {:.3})",
        estimate.left_iris.x,
        estimate.left_iris.y,
        estimate.right_iris.x,
        estimate.right_iris.y,
        estimate.gaze.x,
        estimate.gaze.y
    );
    if let Some(n) = outcome.normalized {
        line.push_str(&format!(" grid ({:.3}, {:.3})", n.x, n.y));
    }
    if let Some(cell) = outcome.hovered {
        line.push_str(&format!(" cell {}", cell + 1));
    }
    Some(line)
}
