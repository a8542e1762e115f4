use colored::Colorize;
use std::io::{self, Stdout, Write};

use super::markdown::to_ansi;
use super::Renderer;

/// Renderer writing to a terminal, or any other writer
pub struct TerminalRenderer<W: Write> {
    out: W,
}

impl TerminalRenderer<Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn render_incremental(&mut self, fragment: &str) -> io::Result<()> {
        self.out.write_all(fragment.as_bytes())?;
        self.out.flush()
    }

    fn render_formatted(&mut self, full_text: &str) -> io::Result<()> {
        let rendered = to_ansi(full_text);
        writeln!(self.out, "{}", rendered)?;
        self.out.flush()
    }

    fn finish_reply(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        self.out.flush()
    }

    fn notice(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", text.green().dimmed())?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incremental_output_is_verbatim() {
        let mut renderer = TerminalRenderer::new(Vec::new());
        for fragment in ["Hi", " there", "!"] {
            renderer.render_incremental(fragment).unwrap();
        }
        renderer.finish_reply().unwrap();

        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert_eq!(out, "Hi there!\n");
    }

    #[test]
    fn test_formatted_output_keeps_text() {
        let mut renderer = TerminalRenderer::new(Vec::new());
        renderer
            .render_formatted("# Title\n\nSome **bold** words.")
            .unwrap();

        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(out.contains("Title"));
        assert!(out.contains("bold"));
        assert!(out.ends_with('\n'));
    }
}
