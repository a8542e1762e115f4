//! Terminal output for model replies.
//!
//! Plain mode streams each fragment as it arrives; markdown mode waits for
//! the complete reply and renders it in one go.

mod markdown;
mod terminal;

pub use markdown::to_ansi;
pub use terminal::TerminalRenderer;

use serde::{Deserialize, Serialize};
use std::io;

/// How replies are presented
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// Print fragments as they arrive, no formatting
    #[default]
    Plain,
    /// Buffer the reply and render it as Markdown
    Markdown,
}

impl RenderMode {
    pub fn is_markdown(self) -> bool {
        self == RenderMode::Markdown
    }
}

/// Sink for reply text
pub trait Renderer {
    /// Write one fragment immediately, no trailing newline
    fn render_incremental(&mut self, fragment: &str) -> io::Result<()>;

    /// Render a complete reply as Markdown
    fn render_formatted(&mut self, full_text: &str) -> io::Result<()>;

    /// Close a streamed reply
    fn finish_reply(&mut self) -> io::Result<()>;

    /// Dimmed status line
    fn notice(&mut self, text: &str) -> io::Result<()>;
}
