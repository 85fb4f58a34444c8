//! Markdown → ratatui `Text` for chat message bodies.
//!
//! Spans accumulate into a pending line that is flushed whenever a block
//! boundary or a hard break is reached. Block context (quotes, list items,
//! code fences) is a stack that decides the prefix each flushed line gets.

use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

static SYNTAXES: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME: LazyLock<Option<Theme>> = LazyLock::new(|| {
    ThemeSet::load_defaults()
        .themes
        .remove("base16-ocean.dark")
});

const TAB: &str = "    ";

fn muted() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Renders `content` with `base` as the default text color.
pub fn render(content: &str, base: Color) -> Text<'static> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut renderer = Renderer::new(base);
    for event in Parser::new_ext(content, options) {
        renderer.event(event);
    }
    renderer.finish()
}

enum Block {
    Quote,
    /// `None` for bullets, otherwise the next ordinal.
    List(Option<u64>),
    /// Continuation indent of the current list item.
    Item(usize),
    Code,
}

struct Renderer {
    base: Style,
    lines: Vec<Line<'static>>,
    pending: Vec<Span<'static>>,
    inline: Vec<Style>,
    blocks: Vec<Block>,
    /// First-line prefix for a freshly opened list item.
    marker: Option<Span<'static>>,
    highlighter: Option<HighlightLines<'static>>,
    link: Option<String>,
    /// A blank line goes in before the next block.
    gap: bool,
}

impl Renderer {
    fn new(base: Color) -> Self {
        Self {
            base: Style::default().fg(base),
            lines: Vec::new(),
            pending: Vec::new(),
            inline: Vec::new(),
            blocks: Vec::new(),
            marker: None,
            highlighter: None,
            link: None,
            gap: false,
        }
    }

    fn finish(mut self) -> Text<'static> {
        self.flush();
        Text::from(self.lines)
    }

    fn style(&self) -> Style {
        self.inline.last().copied().unwrap_or(self.base)
    }

    fn push_inline(&mut self, overlay: Style) {
        let style = self.style().patch(overlay);
        self.inline.push(style);
    }

    fn prefix(&mut self) -> Vec<Span<'static>> {
        let mut prefix = Vec::new();
        for block in &self.blocks {
            match block {
                Block::Quote => prefix.push(Span::styled("│ ", muted())),
                Block::Code => prefix.push(Span::styled("│ ", muted())),
                Block::Item(indent) => prefix.push(Span::raw(" ".repeat(*indent))),
                Block::List(_) => {}
            }
        }
        // The item marker replaces the innermost continuation indent
        if let Some(marker) = self.marker.take() {
            if matches!(self.blocks.last(), Some(Block::Item(_))) {
                prefix.pop();
            }
            prefix.push(marker);
        }
        prefix
    }

    fn emit(&mut self, spans: Vec<Span<'static>>) {
        let mut line = self.prefix();
        line.extend(spans);
        self.lines.push(Line::from(line));
    }

    fn flush(&mut self) {
        if self.pending.is_empty() && self.marker.is_none() {
            return;
        }
        let spans = std::mem::take(&mut self.pending);
        self.emit(spans);
    }

    fn start_block(&mut self) {
        self.flush();
        if self.gap && !self.lines.is_empty() {
            self.lines.push(Line::default());
        }
        self.gap = false;
    }

    fn end_block(&mut self) {
        self.flush();
        self.gap = true;
    }

    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(tag) => self.close(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.pending.push(Span::styled(
                code.to_string(),
                Style::default().fg(Color::White).bg(Color::DarkGray),
            )),
            Event::SoftBreak => self.pending.push(Span::styled(" ", self.style())),
            Event::HardBreak => self.flush(),
            Event::Rule => {
                self.start_block();
                self.emit(vec![Span::styled("─".repeat(32), muted())]);
                self.gap = true;
            }
            Event::TaskListMarker(done) => {
                self.pending
                    .push(Span::raw(if done { "[x] " } else { "[ ] " }));
            }
            _ => {}
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                // Paragraphs inside a tight item share the marker line
                if self.marker.is_none() {
                    self.start_block();
                }
            }
            Tag::Heading { level, .. } => {
                self.start_block();
                let style = heading_style(level);
                self.push_inline(style);
                self.pending.push(Span::styled(
                    format!("{} ", "#".repeat(level as usize)),
                    self.style(),
                ));
            }
            Tag::BlockQuote(_) => {
                self.start_block();
                self.blocks.push(Block::Quote);
                self.push_inline(Style::default().add_modifier(Modifier::ITALIC));
            }
            Tag::CodeBlock(kind) => {
                self.start_block();
                let lang = match kind {
                    CodeBlockKind::Fenced(lang) => lang.to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                let header = if lang.is_empty() {
                    "╭──".to_string()
                } else {
                    format!("╭── {lang}")
                };
                self.emit(vec![Span::styled(header, muted())]);
                self.blocks.push(Block::Code);
                self.highlighter = SYNTAXES
                    .find_syntax_by_token(&lang)
                    .zip(THEME.as_ref())
                    .map(|(syntax, theme)| HighlightLines::new(syntax, theme));
            }
            Tag::List(start) => {
                if !matches!(self.blocks.last(), Some(Block::Item(_))) {
                    self.start_block();
                } else {
                    self.flush();
                }
                self.blocks.push(Block::List(start));
            }
            Tag::Item => {
                self.flush();
                let marker = match self.blocks.last_mut() {
                    Some(Block::List(Some(n))) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                let indent = unicode_width::UnicodeWidthStr::width(marker.as_str());
                self.blocks.push(Block::Item(indent));
                self.marker = Some(Span::styled(marker, muted()));
            }
            Tag::Emphasis => self.push_inline(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_inline(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_inline(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link { dest_url, .. } => {
                self.link = Some(dest_url.to_string());
                self.push_inline(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::UNDERLINED),
                );
            }
            _ => {}
        }
    }

    fn close(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if matches!(self.blocks.last(), Some(Block::Item(_))) {
                    self.flush();
                } else {
                    self.end_block();
                }
            }
            TagEnd::Heading(_) => {
                self.inline.pop();
                self.end_block();
            }
            TagEnd::BlockQuote(_) => {
                self.flush();
                self.blocks.pop();
                self.inline.pop();
                self.gap = true;
            }
            TagEnd::CodeBlock => {
                self.highlighter = None;
                self.blocks.pop();
                self.emit(vec![Span::styled("╰──", muted())]);
                self.gap = true;
            }
            TagEnd::List(_) => {
                self.flush();
                self.blocks.pop();
                if !matches!(self.blocks.last(), Some(Block::Item(_))) {
                    self.gap = true;
                }
            }
            TagEnd::Item => {
                self.flush();
                self.blocks.pop();
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.inline.pop();
            }
            TagEnd::Link => {
                self.inline.pop();
                if let Some(url) = self.link.take() {
                    self.pending.push(Span::styled(format!(" ({url})"), muted()));
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if matches!(self.blocks.last(), Some(Block::Code)) {
            self.code(text);
            return;
        }
        let style = self.style();
        self.pending.push(Span::styled(text.replace('\t', TAB), style));
    }

    fn code(&mut self, text: &str) {
        for raw in LinesWithEndings::from(text) {
            let spans = match self.highlighter.as_mut() {
                Some(highlighter) => match highlighter.highlight_line(raw, &SYNTAXES) {
                    Ok(ranges) => ranges
                        .into_iter()
                        .map(|(style, fragment)| {
                            let fg = style.foreground;
                            Span::styled(
                                fragment.trim_end_matches('\n').replace('\t', TAB),
                                Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b)),
                            )
                        })
                        .filter(|span| !span.content.is_empty())
                        .collect(),
                    Err(_) => vec![plain_code(raw)],
                },
                None => vec![plain_code(raw)],
            };
            self.emit(spans);
        }
    }
}

fn plain_code(raw: &str) -> Span<'static> {
    Span::styled(
        raw.trim_end_matches('\n').replace('\t', TAB),
        Style::default().fg(Color::White),
    )
}

fn heading_style(level: HeadingLevel) -> Style {
    let style = Style::default().add_modifier(Modifier::BOLD);
    match level {
        HeadingLevel::H1 => style.add_modifier(Modifier::UNDERLINED),
        HeadingLevel::H2 => style,
        _ => style.add_modifier(Modifier::ITALIC),
    }
}
