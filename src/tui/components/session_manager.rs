//! # Session Manager Component
//!
//! History view: the backend's session list, newest first, with open,
//! new-chat and two-step delete. Opened with Ctrl+O, left with Esc.
//!
//! The list itself is core state (`HistoryState`); this component only owns
//! the selection. Events carry row indices and the event loop maps them to
//! session ids.

use chrono::Local;
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, List, ListItem, ListState, Padding, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::api::ChatSession;
use crate::tui::component::EventHandler;
use crate::tui::event::TuiEvent;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Events emitted by the session manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Open(usize),
    /// `d` on a row: arms the delete, or confirms it if already armed.
    Delete(usize),
    /// Any other key while a delete is armed.
    CancelDelete,
    NewChat,
    Refresh,
    Back,
}

#[derive(Default)]
pub struct SessionManagerState {
    pub list_state: ListState,
    /// Row count from the last sync with core state.
    len: usize,
    /// Whether core has a delete armed.
    delete_armed: bool,
}

impl SessionManagerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refreshes the props this state needs for event handling. Call once
    /// per loop iteration before routing events.
    pub fn sync(&mut self, len: usize, delete_armed: bool) {
        self.len = len;
        self.delete_armed = delete_armed;
        match (len, self.list_state.selected()) {
            (0, _) => self.list_state.select(None),
            (_, None) => self.list_state.select(Some(0)),
            (n, Some(i)) if i >= n => self.list_state.select(Some(n - 1)),
            _ => {}
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.list_state.selected()
    }
}

impl EventHandler for SessionManagerState {
    type Event = SessionEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        if let TuiEvent::InputChar('d') = event {
            return self.selected().map(SessionEvent::Delete);
        }
        if self.delete_armed && !matches!(event, TuiEvent::MouseMove(..) | TuiEvent::Resize) {
            return Some(SessionEvent::CancelDelete);
        }
        match event {
            TuiEvent::Escape => Some(SessionEvent::Back),
            TuiEvent::CursorUp | TuiEvent::ScrollUp => {
                if self.len > 0 {
                    self.list_state.select_previous();
                }
                None
            }
            TuiEvent::CursorDown | TuiEvent::ScrollDown => {
                if let Some(i) = self.selected()
                    && i + 1 < self.len
                {
                    self.list_state.select(Some(i + 1));
                }
                None
            }
            TuiEvent::Submit => self.selected().map(SessionEvent::Open),
            TuiEvent::InputChar('n') => Some(SessionEvent::NewChat),
            TuiEvent::InputChar('r') => Some(SessionEvent::Refresh),
            _ => None,
        }
    }
}

/// Transient render wrapper for the history view.
pub struct SessionManager<'a> {
    pub state: &'a mut SessionManagerState,
    pub sessions: &'a [ChatSession],
    pub is_loading: bool,
    pub pending_delete: Option<&'a str>,
}

impl<'a> SessionManager<'a> {
    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let help = if self.pending_delete.is_some() {
            " d Confirm delete  any other key Cancel "
        } else {
            " Enter Open  n New  d Delete  r Refresh  Esc Back "
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Chat history ")
            .title_bottom(Line::from(help).centered())
            .padding(Padding::horizontal(1));

        if self.sessions.is_empty() {
            let message = if self.is_loading {
                "Loading…"
            } else {
                "No chat history yet. Press n to start a conversation."
            };
            let empty = Paragraph::new(message)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let inner_width = usize::from(area.width.saturating_sub(4));
        let items: Vec<ListItem> = self
            .sessions
            .iter()
            .map(|session| {
                let date = session
                    .created_at
                    .with_timezone(&Local)
                    .format(DATE_FORMAT)
                    .to_string();
                let title_width = inner_width.saturating_sub(date.width() + 2);
                let title = truncate(session.display_title(), title_width);
                let pad = title_width.saturating_sub(title.width());

                let armed = self.pending_delete == Some(session.session_id.as_str());
                let title_style = if armed {
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(Line::from(vec![
                    Span::styled(title, title_style),
                    Span::raw(" ".repeat(pad + 2)),
                    Span::styled(date, Style::default().fg(Color::DarkGray)),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        frame.render_stateful_widget(list, area, &mut self.state.list_state);
    }
}

/// Cuts `s` to at most `max` display columns, marking the cut with `…`.
fn truncate(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        used += w;
        out.push(c);
    }
    if max > 0 {
        out.push('…');
    }
    out
}
