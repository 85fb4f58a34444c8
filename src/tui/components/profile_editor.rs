//! # Profile Editor Component
//!
//! Form for the signed-in user's full name and display name. Email is shown
//! read-only. Opened with Ctrl+P, left with Esc.
//!
//! The form keeps its own copy of the two fields and reloads them whenever
//! the core profile `revision` moves, i.e. after each fetch.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::api::Profile;
use crate::tui::component::EventHandler;
use crate::tui::event::TuiEvent;

const LABEL_WIDTH: u16 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Field {
    #[default]
    FullName,
    DisplayName,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileEvent {
    Save {
        full_name: String,
        display_name: String,
    },
    Back,
}

#[derive(Debug, Default)]
pub struct ProfileEditorState {
    pub full_name: String,
    pub display_name: String,
    pub focus: Field,
    synced_revision: u64,
}

impl ProfileEditorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reloads the fields when core has a newer profile than the form.
    pub fn sync(&mut self, profile: Option<&Profile>, revision: u64) {
        if revision == self.synced_revision {
            return;
        }
        self.synced_revision = revision;
        if let Some(profile) = profile {
            self.full_name = profile.full_name.clone().unwrap_or_default();
            self.display_name = profile.display_name.clone().unwrap_or_default();
        }
    }

    fn focused(&mut self) -> &mut String {
        match self.focus {
            Field::FullName => &mut self.full_name,
            Field::DisplayName => &mut self.display_name,
        }
    }
}

impl EventHandler for ProfileEditorState {
    type Event = ProfileEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::Escape => return Some(ProfileEvent::Back),
            TuiEvent::Tab | TuiEvent::CursorUp | TuiEvent::CursorDown => {
                self.focus = match self.focus {
                    Field::FullName => Field::DisplayName,
                    Field::DisplayName => Field::FullName,
                };
            }
            TuiEvent::InputChar('\n') => {}
            TuiEvent::InputChar(c) => self.focused().push(*c),
            TuiEvent::Paste(text) => {
                let line = text.lines().next().unwrap_or_default().to_string();
                self.focused().push_str(&line);
            }
            TuiEvent::Backspace => {
                self.focused().pop();
            }
            TuiEvent::Submit => {
                return Some(ProfileEvent::Save {
                    full_name: self.full_name.clone(),
                    display_name: self.display_name.clone(),
                });
            }
            _ => {}
        }
        None
    }
}

/// Transient render wrapper for the profile view.
pub struct ProfileEditor<'a> {
    pub state: &'a ProfileEditorState,
    pub email: Option<&'a str>,
    pub is_loading: bool,
    pub is_saving: bool,
    pub signed_in: bool,
}

impl<'a> ProfileEditor<'a> {
    fn field_line<'b>(&self, label: &'static str, value: &'b str, field: Field) -> Line<'b> {
        let focused = self.state.focus == field;
        let label_style = if focused {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        Line::from(vec![
            Span::styled(format!("{label:<width$}", width = usize::from(LABEL_WIDTH)), label_style),
            Span::raw(value),
        ])
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let help = if self.is_saving {
            " Saving… "
        } else {
            " Tab Switch field  Enter Save  Esc Back "
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Profile ")
            .title_bottom(Line::from(help).centered())
            .padding(Padding::new(2, 2, 1, 1));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if !self.signed_in {
            frame.render_widget(
                Paragraph::new("Not signed in. Set ECHO_ACCESS_TOKEN and ECHO_USER_ID to edit your profile.")
                    .style(Style::default().fg(Color::DarkGray)),
                inner,
            );
            return;
        }
        if self.is_loading && self.state.synced_revision == 0 {
            frame.render_widget(
                Paragraph::new("Loading profile…").style(Style::default().fg(Color::DarkGray)),
                inner,
            );
            return;
        }

        let [email_row, _, full_row, display_row] = Layout::vertical([Constraint::Length(1); 4]).areas(inner);

        let email = Line::from(vec![
            Span::styled(
                format!("{:<width$}", "Email", width = usize::from(LABEL_WIDTH)),
                Style::default().fg(Color::Gray),
            ),
            Span::styled(
                self.email.unwrap_or("-"),
                Style::default().add_modifier(Modifier::DIM),
            ),
        ]);
        frame.render_widget(email, email_row);
        frame.render_widget(
            self.field_line("Full name", &self.state.full_name, Field::FullName),
            full_row,
        );
        frame.render_widget(
            self.field_line("Display name", &self.state.display_name, Field::DisplayName),
            display_row,
        );

        if !self.is_saving {
            let (row, value) = match self.state.focus {
                Field::FullName => (full_row, &self.state.full_name),
                Field::DisplayName => (display_row, &self.state.display_name),
            };
            let offset = u16::try_from(value.width()).unwrap_or(u16::MAX);
            let x = row
                .x
                .saturating_add(LABEL_WIDTH)
                .saturating_add(offset)
                .min(row.right().saturating_sub(1));
            frame.set_cursor_position((x, row.y));
        }
    }
}
