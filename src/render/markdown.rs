use colored::{Color, Colorize};
use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

/// Inline text attributes, stacked while walking the event stream
#[derive(Debug, Clone, Copy, Default)]
struct Style {
    fg: Option<Color>,
    bold: bool,
    italic: bool,
    underline: bool,
    strikethrough: bool,
    dimmed: bool,
}

impl Style {
    fn fg(color: Color) -> Self {
        Self {
            fg: Some(color),
            ..Self::default()
        }
    }

    fn paint(&self, text: &str) -> String {
        let mut out = text.normal();
        if let Some(color) = self.fg {
            out = out.color(color);
        }
        if self.bold {
            out = out.bold();
        }
        if self.italic {
            out = out.italic();
        }
        if self.underline {
            out = out.underline();
        }
        if self.strikethrough {
            out = out.strikethrough();
        }
        if self.dimmed {
            out = out.dimmed();
        }
        out.to_string()
    }
}

fn heading_style(level: HeadingLevel) -> Style {
    let color = match level {
        HeadingLevel::H1 => Color::Cyan,
        HeadingLevel::H2 => Color::Blue,
        HeadingLevel::H3 => Color::Green,
        _ => Color::Yellow,
    };
    Style {
        bold: true,
        ..Style::fg(color)
    }
}

fn heading_depth(level: HeadingLevel) -> usize {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Accumulates rendered lines
struct Writer {
    lines: Vec<String>,
    current: String,
    style_stack: Vec<Style>,
    /// One entry per open list: the next ordinal for ordered lists
    lists: Vec<Option<u64>>,
    links: Vec<String>,
    quote_depth: usize,
    in_code_block: bool,
    code_block: String,
}

impl Writer {
    fn new() -> Self {
        Self {
            lines: Vec::new(),
            current: String::new(),
            style_stack: vec![Style::default()],
            lists: Vec::new(),
            links: Vec::new(),
            quote_depth: 0,
            in_code_block: false,
            code_block: String::new(),
        }
    }

    fn style(&self) -> Style {
        self.style_stack.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, f: impl FnOnce(&mut Style)) {
        let mut style = self.style();
        f(&mut style);
        self.style_stack.push(style);
    }

    fn pop_style(&mut self) {
        if self.style_stack.len() > 1 {
            self.style_stack.pop();
        }
    }

    fn write(&mut self, text: &str) {
        let painted = self.style().paint(text);
        self.push_painted(&painted);
    }

    /// Append already styled text, opening the line with the quote bar
    fn push_painted(&mut self, painted: &str) {
        if self.current.is_empty() && self.quote_depth > 0 {
            let bar = Style {
                dimmed: true,
                ..Style::default()
            }
            .paint(&"│ ".repeat(self.quote_depth));
            self.current.push_str(&bar);
        }
        self.current.push_str(painted);
    }

    fn flush_line(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(std::mem::take(&mut self.current));
        }
    }

    fn blank_line(&mut self) {
        self.flush_line();
        if self.lines.last().is_some_and(|l| !l.is_empty()) {
            self.lines.push(String::new());
        }
    }

    /// Block ends get a separating blank line only outside of lists
    fn end_block(&mut self) {
        if self.lists.is_empty() {
            self.blank_line();
        } else {
            self.flush_line();
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush_line();
                let style = heading_style(level);
                self.style_stack.push(style);
                self.write(&format!("{} ", "#".repeat(heading_depth(level))));
            }
            Tag::Emphasis => self.push_style(|s| s.italic = true),
            Tag::Strong => self.push_style(|s| s.bold = true),
            Tag::Strikethrough => self.push_style(|s| s.strikethrough = true),
            Tag::CodeBlock(kind) => {
                self.flush_line();
                self.in_code_block = true;
                self.code_block.clear();
                let lang = match kind {
                    CodeBlockKind::Fenced(lang) => lang.to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                let fence = Style::fg(Color::BrightBlack).paint("```");
                let lang = Style::fg(Color::Magenta).paint(&lang);
                self.lines.push(format!("{}{}", fence, lang));
            }
            Tag::List(start) => {
                self.flush_line();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush_line();
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{}. ", n);
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                let marker = Style::fg(Color::Yellow).paint(&marker);
                self.push_painted(&format!("{}{}", indent, marker));
            }
            Tag::Link { dest_url, .. } | Tag::Image { dest_url, .. } => {
                self.links.push(dest_url.to_string());
                self.push_style(|s| {
                    s.fg = Some(Color::Blue);
                    s.underline = true;
                });
            }
            Tag::BlockQuote(_) => {
                self.flush_line();
                self.quote_depth += 1;
                self.push_style(|s| s.italic = true);
            }
            Tag::TableHead => self.push_style(|s| s.bold = true),
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => {
                self.pop_style();
                self.blank_line();
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => self.pop_style(),
            TagEnd::TableHead => {
                self.pop_style();
                self.flush_line();
            }
            TagEnd::Paragraph => self.end_block(),
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                let code = std::mem::take(&mut self.code_block);
                let code_style = Style::fg(Color::White);
                for line in code.lines() {
                    self.lines.push(format!("    {}", code_style.paint(line)));
                }
                self.lines.push(Style::fg(Color::BrightBlack).paint("```"));
                self.end_block();
            }
            TagEnd::Item => self.flush_line(),
            TagEnd::List(_) => {
                self.lists.pop();
                self.end_block();
            }
            TagEnd::Link | TagEnd::Image => {
                self.pop_style();
                if let Some(url) = self.links.pop() {
                    let url = Style {
                        dimmed: true,
                        ..Style::default()
                    }
                    .paint(&format!(" ({})", url));
                    self.push_painted(&url);
                }
            }
            TagEnd::BlockQuote(_) => {
                self.pop_style();
                self.flush_line();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                if self.quote_depth == 0 {
                    self.end_block();
                }
            }
            TagEnd::TableCell => self.push_painted("  "),
            TagEnd::TableRow => self.flush_line(),
            TagEnd::Table => self.end_block(),
            _ => {}
        }
    }

    fn finish(mut self) -> String {
        self.flush_line();
        while self.lines.last().is_some_and(|l| l.is_empty()) {
            self.lines.pop();
        }
        self.lines.join("\n")
    }
}

/// Render Markdown into ANSI-styled terminal text
///
/// Anything the parser does not understand comes out as plain text.
pub fn to_ansi(input: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut writer = Writer::new();
    for event in Parser::new_ext(input, options) {
        match event {
            Event::Start(tag) => writer.start(tag),
            Event::End(tag) => writer.end(tag),
            Event::Text(text) => {
                if writer.in_code_block {
                    writer.code_block.push_str(&text);
                } else {
                    writer.write(&text);
                }
            }
            Event::Code(code) => {
                let painted = Style::fg(Color::Yellow).paint(&format!("`{}`", code));
                writer.push_painted(&painted);
            }
            Event::Html(html) | Event::InlineHtml(html) => writer.write(&html),
            Event::SoftBreak => writer.write(" "),
            Event::HardBreak => writer.flush_line(),
            Event::Rule => {
                writer.flush_line();
                let rule = Style::fg(Color::BrightBlack).paint(&"─".repeat(40));
                writer.lines.push(rule);
                writer.blank_line();
            }
            Event::TaskListMarker(checked) => {
                writer.write(if checked { "[x] " } else { "[ ] " });
            }
            _ => {}
        }
    }
    writer.finish()
}
