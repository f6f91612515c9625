use anyhow::{anyhow, bail, Result};

/// A line typed by the user. Cells are numbered from 1 on the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    Calibrate,
    Click(usize),
    Edit(usize, String),
    Complete,
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "Commands: [c]alibrate | [k]lick N | [e]dit N WORD | [d]one | [s]how | [h]elp | [q]uit";

impl UserCommand {
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        let Some(verb) = line.split_whitespace().next() else {
            return Ok(None);
        };
        let rest = line[verb.len()..].trim_start();

        let cmd = match verb.to_lowercase().as_str() {
            "c" | "calibrate" => Self::Calibrate,
            "k" | "click" => Self::Click(cell_number(rest)?),
            "e" | "edit" => {
                let (num, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                let text = text.trim();
                if text.is_empty() {
                    bail!("edit needs a cell number and a word");
                }
                Self::Edit(cell_number(num)?, text.to_string())
            }
            "d" | "done" | "complete" => Self::Complete,
            "s" | "show" => Self::Show,
            "h" | "help" | "?" => Self::Help,
            "q" | "quit" | "exit" => Self::Quit,
            other => bail!("unknown command `{other}`"),
        };
        Ok(Some(cmd))
    }
}

/// 1-based on input, 0-based afterwards.
fn cell_number(s: &str) -> Result<usize> {
    let n: usize = s
        .trim()
        .parse()
        .map_err(|_| anyhow!("expected a cell number, got `{}`", s.trim()))?;
    n.checked_sub(1).ok_or_else(|| anyhow!("cells are numbered from 1"))
}
