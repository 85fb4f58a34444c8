//! # TitleBar Component
//!
//! Top status bar: who is signed in, what the app is doing, and whether
//! there is unseen content below the scroll position.
//!
//! TitleBar is purely presentational. It receives all data as props and has
//! no internal state:
//!
//! ```rust,ignore
//! let mut title_bar = TitleBar::new(app.user_label(), &app.status_message, tui.has_unseen_content);
//! title_bar.render(frame, area);
//! ```
//!
//! The text degrades by priority on narrow terminals: app name, then user,
//! then status, then the "↓ New" marker.

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

pub struct TitleBar {
    /// Display name or email; `None` when nobody is signed in.
    pub user_label: Option<String>,
    pub status_message: String,
    pub has_unseen_content: bool,
}

impl TitleBar {
    pub fn new(user_label: Option<&str>, status_message: &str, has_unseen_content: bool) -> Self {
        Self {
            user_label: user_label.map(str::to_string),
            status_message: status_message.to_string(),
            has_unseen_content,
        }
    }

    fn line(&self) -> Line<'_> {
        let separator = || Span::styled(" | ", Style::default().fg(Color::DarkGray));
        let mut spans = vec![Span::styled(
            "Echo",
            Style::default().add_modifier(Modifier::BOLD),
        )];
        if let Some(user) = &self.user_label {
            spans.push(separator());
            spans.push(Span::styled(user.as_str(), Style::default().fg(Color::Cyan)));
        }
        if !self.status_message.is_empty() {
            spans.push(separator());
            spans.push(Span::raw(self.status_message.as_str()));
        }
        if self.has_unseen_content {
            spans.push(separator());
            spans.push(Span::styled("↓ New", Style::default().fg(Color::Yellow)));
        }
        Line::from(spans)
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(self.line(), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn rendered(title_bar: &mut TitleBar) -> String {
        let backend = TestBackend::new(80, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                title_bar.render(f, f.area());
            })
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_title_bar_shows_user_and_status() {
        let mut title_bar = TitleBar::new(Some("ada"), "Echo is thinking...", false);
        let text = rendered(&mut title_bar);
        assert!(text.contains("Echo"));
        assert!(text.contains("ada"));
        assert!(text.contains("Echo is thinking..."));
        assert!(!text.contains("↓ New"));
    }

    #[test]
    fn test_title_bar_with_unseen_content() {
        let mut title_bar = TitleBar::new(None, "Ready", true);
        let text = rendered(&mut title_bar);
        assert!(text.contains("Ready"));
        assert!(text.contains("↓ New"));
    }

    #[test]
    fn test_title_bar_default_no_status() {
        let mut title_bar = TitleBar::new(None, "", false);
        let text = rendered(&mut title_bar);
        assert!(text.contains("Echo"));
        assert!(!text.contains('|'));
    }
}
