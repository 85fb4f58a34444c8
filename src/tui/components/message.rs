use chrono::Local;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Text};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget, Wrap};

use crate::api::{Message as ChatMessage, Role};
use crate::tui::markdown;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
const VERTICAL_OVERHEAD: u16 = 2;

/// One transcript entry: bordered card titled with the author, local send
/// time in the bottom-right corner, markdown body.
///
/// Transient: built fresh each frame by `MessageList`.
#[derive(Clone, Copy)]
pub struct Message<'a> {
    pub message: &'a ChatMessage,
    pub is_hovered: bool,
}

impl<'a> Message<'a> {
    pub fn new(message: &'a ChatMessage, is_hovered: bool) -> Self {
        Self {
            message,
            is_hovered,
        }
    }

    fn body(message: &ChatMessage) -> Text<'static> {
        let content = message.content.trim();
        match message.role {
            // Users type plain text; don't reinterpret their asterisks
            Role::User => Text::styled(content.to_string(), role_style(Role::User)),
            Role::Assistant => markdown::render(content, Color::Reset),
        }
    }

    fn paragraph(message: &ChatMessage) -> Paragraph<'static> {
        Paragraph::new(Self::body(message)).wrap(Wrap { trim: false })
    }

    /// Rendered height at `width`, borders included. Uses the same
    /// `Paragraph` that `render` draws, so the two cannot disagree.
    pub fn calculate_height(message: &ChatMessage, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            return 1;
        }
        if message.content.trim().is_empty() {
            return VERTICAL_OVERHEAD + 1;
        }
        let lines = Self::paragraph(message).line_count(content_width);
        u16::try_from(lines).unwrap_or(u16::MAX - VERTICAL_OVERHEAD) + VERTICAL_OVERHEAD
    }
}

pub fn role_style(role: Role) -> Style {
    match role {
        Role::User => Style::default().fg(Color::Green),
        Role::Assistant => Style::default().fg(Color::Blue),
    }
}

impl<'a> Widget for Message<'a> {
    fn render(self, area: Rect, buf: &mut ratatui::buffer::Buffer) {
        let style = role_style(self.message.role);
        let border_style = if self.is_hovered {
            style
        } else {
            style.add_modifier(Modifier::DIM)
        };
        let time = self
            .message
            .timestamp
            .with_timezone(&Local)
            .format("%H:%M")
            .to_string();

        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(Line::styled(self.message.role.label(), border_style))
            .title_bottom(Line::styled(time, border_style).right_aligned())
            .padding(Padding::horizontal(CONTENT_PAD_H));

        let inner = block.inner(area);
        block.render(area, buf);
        Self::paragraph(self.message).render(inner, buf);
    }
}
