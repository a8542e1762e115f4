use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::utils::{Result, TermchatError};

/// Where user lines come from
pub trait InputSource {
    /// Read one line; `None` once the user is gone (EOF or Ctrl-C)
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Interactive line editor with in-memory history
pub struct LineEditor {
    editor: DefaultEditor,
}

impl LineEditor {
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new().map_err(|e| TermchatError::Input(e.to_string()))?;
        Ok(Self { editor })
    }
}

impl InputSource for LineEditor {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => Ok(None),
            Err(e) => Err(TermchatError::Input(e.to_string())),
        }
    }
}

/// Replays canned lines, then reports end of input
#[cfg(test)]
pub(crate) struct ScriptedInput {
    lines: std::collections::VecDeque<String>,
    pub prompts_shown: usize,
}

#[cfg(test)]
impl ScriptedInput {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|l| l.to_string()).collect(),
            prompts_shown: 0,
        }
    }
}

#[cfg(test)]
impl InputSource for ScriptedInput {
    fn read_line(&mut self, _prompt: &str) -> Result<Option<String>> {
        self.prompts_shown += 1;
        Ok(self.lines.pop_front())
    }
}
