use tracing::debug;

use crate::error::{GazeError, Result};

/// One grid position: an editable word plus its display flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub text: String,
    pub hovered: bool,
    pub selected: bool,
}

impl Cell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Pick {
    cell: usize,
    word: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Selected,
    Deselected,
}

/// The word grid and the words collected from it, in selection order.
///
/// Each collected word remembers the cell it came from, so deselecting a cell
/// removes that cell's word even when another cell holds the same text. A
/// cell's `selected` flag is set iff one of the picks points at it.
#[derive(Debug, Clone, Default)]
pub struct WordGrid {
    cells: Vec<Cell>,
    picks: Vec<Pick>,
}

impl WordGrid {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            cells: words.into_iter().map(Cell::new).collect(),
            picks: Vec::new(),
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, index: usize) -> Result<&Cell> {
        self.cells.get(index).ok_or(GazeError::CellOutOfRange {
            index,
            len: self.cells.len(),
        })
    }

    fn cell_mut(&mut self, index: usize) -> Result<&mut Cell> {
        let len = self.cells.len();
        self.cells
            .get_mut(index)
            .ok_or(GazeError::CellOutOfRange { index, len })
    }

    /// Highlights `hovered` only, or nothing.
    pub fn set_hover(&mut self, hovered: Option<usize>) {
        for (i, cell) in self.cells.iter_mut().enumerate() {
            cell.hovered = Some(i) == hovered;
        }
    }

    pub fn hovered(&self) -> Option<usize> {
        self.cells.iter().position(|c| c.hovered)
    }

    /// Marks the cell and collects its trimmed text. Returns `false` when the
    /// cell was already selected.
    pub fn select(&mut self, index: usize) -> Result<bool> {
        let cell = self.cell_mut(index)?;
        if cell.selected {
            return Ok(false);
        }
        cell.selected = true;
        let word = cell.text.trim().to_string();
        debug!(cell = index, word = %word, "selected");
        self.picks.push(Pick { cell: index, word });
        Ok(true)
    }

    /// Returns `false` when the cell was not selected.
    pub fn deselect(&mut self, index: usize) -> Result<bool> {
        let cell = self.cell_mut(index)?;
        if !cell.selected {
            return Ok(false);
        }
        cell.selected = false;
        self.picks.retain(|p| p.cell != index);
        debug!(cell = index, "deselected");
        Ok(true)
    }

    pub fn toggle(&mut self, index: usize) -> Result<Toggle> {
        if self.cell(index)?.selected {
            self.deselect(index)?;
            Ok(Toggle::Deselected)
        } else {
            self.select(index)?;
            Ok(Toggle::Selected)
        }
    }

    /// Replaces the cell's text. A word already collected from the cell keeps
    /// the text it had when it was selected.
    pub fn set_text(&mut self, index: usize, text: impl Into<String>) -> Result<()> {
        self.cell_mut(index)?.text = text.into();
        Ok(())
    }

    pub fn selected_words(&self) -> Vec<&str> {
        self.picks.iter().map(|p| p.word.as_str()).collect()
    }

    pub fn word_count(&self) -> usize {
        self.picks.len()
    }

    pub fn prompt(&self) -> String {
        self.selected_words().join(" ")
    }

    pub fn readout(&self) -> String {
        format!("Selected: {}", self.prompt())
    }

    /// Drops every collected word and clears every `selected` flag.
    pub fn clear_selection(&mut self) {
        self.picks.clear();
        for cell in &mut self.cells {
            cell.selected = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> WordGrid {
        WordGrid::new(["I", " want ", "water", "food", "help", "water", "yes", "no", "please"])
    }

    fn flags_match_picks(g: &WordGrid) -> bool {
        g.cells()
            .iter()
            .enumerate()
            .all(|(i, c)| c.selected == g.picks.iter().any(|p| p.cell == i))
    }

    #[test]
    fn test_select_appends_trimmed_text_in_order() {
        let mut g = grid();
        assert!(g.select(4).unwrap());
        assert!(g.select(1).unwrap());
        assert_eq!(g.selected_words(), vec!["help", "want"]);
        assert_eq!(g.readout(), "Selected: help want");
        assert!(flags_match_picks(&g));
    }

    #[test]
    fn test_select_is_idempotent() {
        let mut g = grid();
        assert!(g.select(0).unwrap());
        assert!(!g.select(0).unwrap());
        assert_eq!(g.word_count(), 1);
    }

    #[test]
    fn test_empty_readout() {
        assert_eq!(grid().readout(), "Selected: ");
    }

    #[test]
    fn test_deselect_removes_only_that_cell_when_words_repeat() {
        let mut g = grid();
        g.select(2).unwrap(); // water
        g.select(0).unwrap(); // I
        g.select(5).unwrap(); // water (second cell)

        assert!(g.deselect(5).unwrap());
        assert_eq!(g.selected_words(), vec!["water", "I"]);
        assert!(g.cell(2).unwrap().selected);
        assert!(!g.cell(5).unwrap().selected);
        assert!(flags_match_picks(&g));
    }

    #[test]
    fn test_toggle() {
        let mut g = grid();
        assert_eq!(g.toggle(3).unwrap(), Toggle::Selected);
        assert_eq!(g.toggle(3).unwrap(), Toggle::Deselected);
        assert_eq!(g.word_count(), 0);
        assert!(!g.deselect(3).unwrap());
    }

    #[test]
    fn test_edit_after_selection_keeps_collected_word() {
        let mut g = grid();
        g.select(7).unwrap();
        g.set_text(7, "maybe").unwrap();
        assert_eq!(g.selected_words(), vec!["no"]);
        assert_eq!(g.cell(7).unwrap().text, "maybe");

        g.deselect(7).unwrap();
        g.select(7).unwrap();
        assert_eq!(g.selected_words(), vec!["maybe"]);
    }

    #[test]
    fn test_hover_is_exclusive() {
        let mut g = grid();
        g.set_hover(Some(4));
        g.set_hover(Some(6));
        assert_eq!(g.hovered(), Some(6));
        assert_eq!(g.cells().iter().filter(|c| c.hovered).count(), 1);
        g.set_hover(None);
        assert_eq!(g.hovered(), None);
    }

    #[test]
    fn test_out_of_range() {
        let mut g = grid();
        assert!(matches!(
            g.select(9),
            Err(GazeError::CellOutOfRange { index: 9, len: 9 })
        ));
        assert!(g.set_text(42, "x").is_err());
    }

    #[test]
    fn test_clear_selection() {
        let mut g = grid();
        g.select(1).unwrap();
        g.select(8).unwrap();
        g.clear_selection();
        assert_eq!(g.word_count(), 0);
        assert!(g.cells().iter().all(|c| !c.selected));
    }
}
