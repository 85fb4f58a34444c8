//! # InputBox Component
//!
//! Message composer for the chat view.
//!
//! - Capture text input and editing (backspace, delete, cursor movement, paste)
//! - Emit `Submit` on Enter
//! - Show the pending attachment, if any
//!
//! The buffer is internal state. The attachment name and whether a send is
//! in flight are props from the application state.

mod editor;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;
use editor::Editor;

/// Border (2) + padding (2) consumed horizontally by the bordered block
const HORIZONTAL_OVERHEAD: u16 = 4;
/// Top + bottom borders consumed vertically
const VERTICAL_OVERHEAD: u16 = 2;
/// Maximum visible content lines before internal scrolling kicks in
const MAX_VISIBLE_LINES: u16 = 5;
const DEFAULT_WIDTH: u16 = 80;

/// High-level events emitted by the InputBox
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Enter pressed with something to send. May be empty text when an
    /// attachment is pending.
    Submit(String),
    ContentChanged,
}

pub struct InputBox {
    editor: Editor,
    /// File name of the pending attachment (Prop)
    pub attachment: Option<String>,
    /// A send is in flight; input stays editable but Enter is ignored (Prop)
    pub is_sending: bool,
    /// Rendered without focus styling (Prop)
    pub dimmed: bool,
    scroll_offset: u16,
    /// Width from the last render, for vertical cursor movement.
    last_width: u16,
}

impl Default for InputBox {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBox {
    pub fn new() -> Self {
        Self {
            editor: Editor::default(),
            attachment: None,
            is_sending: false,
            dimmed: false,
            scroll_offset: 0,
            last_width: DEFAULT_WIDTH,
        }
    }

    pub fn text(&self) -> &str {
        self.editor.text()
    }

    fn inner_width(width: u16) -> u16 {
        width.saturating_sub(HORIZONTAL_OVERHEAD)
    }

    /// Height for the current content at `width`, clamped to
    /// `[1, MAX_VISIBLE_LINES]` rows plus borders.
    pub fn calculate_height(&self, width: u16) -> u16 {
        let rows = self.editor.rows(Self::inner_width(width)).len();
        let (cursor_row, _) = self.editor.cursor_cell(Self::inner_width(width));
        let needed = u16::try_from(rows)
            .unwrap_or(u16::MAX)
            .max(cursor_row.saturating_add(1));
        needed.clamp(1, MAX_VISIBLE_LINES) + VERTICAL_OVERHEAD
    }

    /// Keeps the cursor row inside the visible window.
    fn update_scroll(&mut self, cursor_row: u16) {
        if cursor_row < self.scroll_offset {
            self.scroll_offset = cursor_row;
        } else if cursor_row >= self.scroll_offset + MAX_VISIBLE_LINES {
            self.scroll_offset = cursor_row + 1 - MAX_VISIBLE_LINES;
        }
    }

    fn title(&self) -> Line<'_> {
        let mut spans = vec![Span::raw("Message")];
        if let Some(name) = &self.attachment {
            spans.push(Span::styled(
                format!(" [attached: {name}]"),
                Style::default().fg(Color::Yellow),
            ));
        }
        Line::from(spans)
    }
}

impl Component for InputBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.last_width = area.width;
        let width = Self::inner_width(area.width);
        let rows = self.editor.rows(width);
        let (cursor_row, cursor_col) = self.editor.cursor_cell(width);
        self.update_scroll(cursor_row);

        let text = self.editor.text();
        let visible: Vec<Line> = rows
            .iter()
            .skip(usize::from(self.scroll_offset))
            .take(usize::from(MAX_VISIBLE_LINES))
            .map(|r| Line::raw(&text[r.clone()]))
            .collect();

        let mut style = Style::default().fg(Color::Green);
        if self.dimmed {
            style = style.add_modifier(Modifier::DIM);
        }
        let hint = if self.is_sending {
            "waiting for reply…"
        } else {
            "Enter send · Ctrl+J newline · /attach <path>"
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .title(self.title())
            .title_bottom(Line::styled(hint, Style::default().fg(Color::DarkGray)).right_aligned())
            .padding(Padding::horizontal(1));

        frame.render_widget(Paragraph::new(visible).block(block).style(style), area);

        let total = u16::try_from(rows.len()).unwrap_or(u16::MAX);
        if total > MAX_VISIBLE_LINES {
            let mut state = ScrollbarState::default()
                .content_length(usize::from(total - MAX_VISIBLE_LINES))
                .position(usize::from(self.scroll_offset));
            let bar = Rect {
                x: area.x + area.width.saturating_sub(1),
                y: area.y + 1,
                width: 1,
                height: area.height.saturating_sub(2),
            };
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                bar,
                &mut state,
            );
        }

        if !self.dimmed {
            let x = area.x + 2 + cursor_col;
            let y = area.y + 1 + cursor_row.saturating_sub(self.scroll_offset);
            frame.set_cursor_position((x, y));
        }
    }
}

impl EventHandler for InputBox {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        let width = Self::inner_width(self.last_width);
        let changed = match event {
            TuiEvent::InputChar(c) => {
                self.editor.insert(c.encode_utf8(&mut [0; 4]));
                true
            }
            TuiEvent::Paste(text) => {
                self.editor.insert(text);
                true
            }
            TuiEvent::Backspace => self.editor.backspace(),
            TuiEvent::Delete => self.editor.delete(),
            TuiEvent::CursorLeft => self.editor.left(),
            TuiEvent::CursorRight => self.editor.right(),
            TuiEvent::CursorHome => self.editor.home(),
            TuiEvent::CursorEnd => self.editor.end(),
            TuiEvent::CursorUp => self.editor.vertical(-1, width),
            TuiEvent::CursorDown => self.editor.vertical(1, width),
            TuiEvent::Submit => {
                if self.is_sending || (self.editor.is_blank() && self.attachment.is_none()) {
                    return None;
                }
                self.scroll_offset = 0;
                return Some(InputEvent::Submit(self.editor.take()));
            }
            _ => false,
        };
        changed.then_some(InputEvent::ContentChanged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn typed(text: &str) -> InputBox {
        let mut input = InputBox::new();
        input.handle_event(&TuiEvent::Paste(text.to_string()));
        input
    }

    fn rendered(input: &mut InputBox, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|f| {
                input.render(f, f.area());
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn test_handle_input() {
        let mut input = InputBox::new();
        assert_eq!(
            input.handle_event(&TuiEvent::InputChar('a')),
            Some(InputEvent::ContentChanged)
        );
        input.handle_event(&TuiEvent::InputChar('b'));
        assert_eq!(input.text(), "ab");
        input.handle_event(&TuiEvent::Backspace);
        assert_eq!(input.text(), "a");
    }

    #[test]
    fn test_submit_clears_buffer() {
        let mut input = typed("hello");
        assert_eq!(
            input.handle_event(&TuiEvent::Submit),
            Some(InputEvent::Submit("hello".to_string()))
        );
        assert!(input.text().is_empty());
    }

    #[test]
    fn test_blank_submit_ignored() {
        let mut input = typed("   ");
        assert_eq!(input.handle_event(&TuiEvent::Submit), None);
        assert_eq!(input.text(), "   ");
    }

    #[test]
    fn test_blank_submit_allowed_with_attachment() {
        let mut input = InputBox::new();
        input.attachment = Some("notes.pdf".to_string());
        assert_eq!(
            input.handle_event(&TuiEvent::Submit),
            Some(InputEvent::Submit(String::new()))
        );
    }

    #[test]
    fn test_submit_ignored_while_sending() {
        let mut input = typed("next");
        input.is_sending = true;
        assert_eq!(input.handle_event(&TuiEvent::Submit), None);
        assert_eq!(input.text(), "next");
    }

    #[test]
    fn test_height_grows_then_clamps() {
        assert_eq!(InputBox::new().calculate_height(40), 1 + VERTICAL_OVERHEAD);
        assert_eq!(typed("a\nb\nc").calculate_height(40), 3 + VERTICAL_OVERHEAD);
        assert_eq!(
            typed("1\n2\n3\n4\n5\n6\n7").calculate_height(40),
            MAX_VISIBLE_LINES + VERTICAL_OVERHEAD
        );
    }

    #[test]
    fn test_render_shows_attachment() {
        let mut input = typed("see file");
        input.attachment = Some("report.pdf".to_string());
        let text = rendered(&mut input, 60, 3);
        assert!(text.contains("see file"));
        assert!(text.contains("[attached: report.pdf]"));
    }

    #[test]
    fn test_render_scrolls_to_cursor() {
        let mut input = typed("1\n2\n3\n4\n5\n6\n7");
        let text = rendered(&mut input, 20, 7);
        assert!(text.contains('7'));
        assert!(!text.contains('1'));
    }
}
