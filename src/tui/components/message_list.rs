//! # MessageList Component
//!
//! Scrollable view of the current transcript.
//!
//! `MessageList` is a transient component (created each frame) that wraps
//! `&'a mut MessageListState` (persistent state) and the transcript (props).
//! Heights are cached per message. A transcript only ever grows within one
//! view, so the cache keeps its prefix and measures just the new tail; a
//! different first message means a different view and a full re-measure.

use std::ops::Range;

use ratatui::Frame;
use ratatui::layout::{Alignment, Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::Paragraph;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::api::{Message as ChatMessage, MessageId};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::Message;
use crate::tui::event::TuiEvent;

const SPINNER: [&str; 4] = ["·  ", "·· ", "···", " ··"];

pub struct MessageListState {
    pub scroll_state: ScrollViewState,
    pub layout: LayoutCache,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    pub hovered_index: Option<usize>,
    /// Last known viewport height (for scroll clamping between frames)
    pub viewport_height: u16,
    /// Screen area of the last render, for mouse hit testing.
    area: Rect,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            layout: LayoutCache::default(),
            stick_to_bottom: true,
            hovered_index: None,
            viewport_height: 0,
            area: Rect::default(),
        }
    }

    fn max_offset(&self) -> u16 {
        self.layout.total().saturating_sub(self.viewport_height)
    }

    pub fn clamp_scroll(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Re-engage auto-scroll once the user scrolls back to the end.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.max_offset();
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// True when part of the transcript sits below the viewport.
    pub fn has_unseen_content(&self) -> bool {
        self.scroll_state.offset().y < self.max_offset()
    }

    /// Message under screen row `row`, if any.
    pub fn hit_test(&self, column: u16, row: u16) -> Option<usize> {
        if !self.area.contains(Position { x: column, y: row }) {
            return None;
        }
        let content_y = (row - self.area.y).saturating_add(self.scroll_state.offset().y);
        self.layout.index_at(content_y)
    }
}

impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::MouseMove(column, row) => {
                self.hovered_index = self.hit_test(*column, *row);
            }
            _ => {}
        }
        None
    }
}

/// Cached per-message heights at one content width.
#[derive(Default)]
pub struct LayoutCache {
    pub heights: Vec<u16>,
    /// `prefix_heights[i]` = bottom edge of message `i` in content space.
    pub prefix_heights: Vec<u16>,
    width: u16,
    first_id: Option<MessageId>,
}

impl LayoutCache {
    /// Brings the cache in line with `messages` at `width`.
    pub fn sync(&mut self, messages: &[ChatMessage], width: u16) {
        let first_id = messages.first().map(|m| m.id.clone());
        if width != self.width || first_id != self.first_id || messages.len() < self.heights.len()
        {
            self.heights.clear();
            self.width = width;
            self.first_id = first_id;
        }
        for message in &messages[self.heights.len()..] {
            self.heights.push(Message::calculate_height(message, width));
        }
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, h| {
                *acc = acc.saturating_add(*h);
                Some(*acc)
            })
            .collect();
    }

    pub fn total(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    pub fn index_at(&self, content_y: u16) -> Option<usize> {
        let idx = self.prefix_heights.partition_point(|&bottom| bottom <= content_y);
        (idx < self.prefix_heights.len()).then_some(idx)
    }

    /// Indices of messages overlapping `[offset, offset + height)`.
    pub fn visible_range(&self, offset: u16, height: u16) -> Range<usize> {
        let start = self.prefix_heights.partition_point(|&bottom| bottom <= offset);
        let end_y = offset.saturating_add(height);
        let end = self.prefix_heights.partition_point(|&bottom| bottom < end_y) + 1;
        start..end.min(self.prefix_heights.len())
    }
}

/// Scrollable conversation view component.
pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub messages: &'a [ChatMessage],
    pub is_loading: bool,
    pub spinner_frame: usize,
}

impl<'a> MessageList<'a> {
    pub fn new(
        state: &'a mut MessageListState,
        messages: &'a [ChatMessage],
        is_loading: bool,
        spinner_frame: usize,
    ) -> Self {
        Self {
            state,
            messages,
            is_loading,
            spinner_frame,
        }
    }
}

impl<'a> Component for MessageList<'a> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.state.area = area;
        self.state.viewport_height = area.height;

        if self.messages.is_empty() && !self.is_loading {
            let hint = Paragraph::new("Type a message to start chatting. Ctrl+O opens your history.")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center);
            let row = Rect::new(area.x, area.y + area.height / 2, area.width, 1.min(area.height));
            frame.render_widget(hint, row);
            return;
        }

        let content_width = area.width.saturating_sub(1); // scrollbar column
        self.state.layout.sync(self.messages, content_width);

        let typing_rows = u16::from(self.is_loading);
        let canvas_height = self.state.layout.total() + typing_rows;

        if !self.state.stick_to_bottom {
            self.state.clamp_scroll();
        }
        let offset = self.state.scroll_state.offset().y;
        let visible = self.state.layout.visible_range(offset, area.height);

        let mut scroll_view = ScrollView::new(Size::new(content_width, canvas_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Always)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        for i in visible {
            let height = self.state.layout.heights[i];
            let top = self.state.layout.prefix_heights[i] - height;
            let is_hovered = self.state.hovered_index == Some(i);
            scroll_view.render_widget(
                Message::new(&self.messages[i], is_hovered),
                Rect::new(0, top, content_width, height),
            );
        }

        if self.is_loading {
            let dots = SPINNER[self.spinner_frame % SPINNER.len()];
            let typing = Paragraph::new(format!(" echo is typing {dots}")).style(
                Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::ITALIC),
            );
            scroll_view.render_widget(
                typing,
                Rect::new(0, self.state.layout.total(), content_width, 1),
            );
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        }
        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn messages(n: usize) -> Vec<ChatMessage> {
        (0..n).map(|i| ChatMessage::user(format!("message {i}"))).collect()
    }

    #[test]
    fn test_layout_measures_each_message() {
        let msgs = messages(3);
        let mut layout = LayoutCache::default();
        layout.sync(&msgs, 40);
        assert_eq!(layout.heights, vec![3, 3, 3]);
        assert_eq!(layout.prefix_heights, vec![3, 6, 9]);
        assert_eq!(layout.total(), 9);
    }

    #[test]
    fn test_layout_keeps_prefix_when_appending() {
        let mut msgs = messages(2);
        let mut layout = LayoutCache::default();
        layout.sync(&msgs, 40);
        layout.heights[0] = 99; // sentinel: must survive an append
        msgs.push(ChatMessage::assistant("new"));
        layout.sync(&msgs, 40);
        assert_eq!(layout.heights.len(), 3);
        assert_eq!(layout.heights[0], 99);
    }

    #[test]
    fn test_layout_resets_for_other_transcript() {
        let msgs = messages(2);
        let mut layout = LayoutCache::default();
        layout.sync(&msgs, 40);
        layout.heights[0] = 99;
        let other = messages(3);
        layout.sync(&other, 40);
        assert_eq!(layout.heights, vec![3, 3, 3]);
    }

    #[test]
    fn test_layout_resets_on_width_change() {
        let msgs = messages(1);
        let mut layout = LayoutCache::default();
        layout.sync(&msgs, 40);
        layout.heights[0] = 99;
        layout.sync(&msgs, 50);
        assert_eq!(layout.heights, vec![3]);
    }

    #[test]
    fn test_index_at_and_visible_range() {
        let msgs = messages(4);
        let mut layout = LayoutCache::default();
        layout.sync(&msgs, 40);
        assert_eq!(layout.index_at(0), Some(0));
        assert_eq!(layout.index_at(3), Some(1));
        assert_eq!(layout.index_at(11), Some(3));
        assert_eq!(layout.index_at(12), None);
        assert_eq!(layout.visible_range(4, 3), 1..3);
        assert_eq!(layout.visible_range(0, 100), 0..4);
    }

    #[test]
    fn test_scroll_up_unpins() {
        let mut state = MessageListState::new();
        state.handle_event(&TuiEvent::ScrollUp);
        assert!(!state.stick_to_bottom);
    }

    #[test]
    fn test_render_shows_typing_indicator() {
        let msgs = messages(1);
        let mut state = MessageListState::new();
        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        terminal
            .draw(|f| {
                MessageList::new(&mut state, &msgs, true, 0).render(f, f.area());
            })
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("message 0"));
        assert!(text.contains("echo is typing"));
    }

    #[test]
    fn test_empty_transcript_shows_hint() {
        let mut state = MessageListState::new();
        let mut terminal = Terminal::new(TestBackend::new(80, 5)).unwrap();
        terminal
            .draw(|f| {
                MessageList::new(&mut state, &[], false, 0).render(f, f.area());
            })
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Type a message"));
    }
}
