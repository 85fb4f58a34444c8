use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use crate::core::state::{App, Notice, NoticeKind, View};
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{MessageList, ProfileEditor, SessionManager, TitleBar};

/// Rows a notice may take before it is cut.
const MAX_NOTICE_LINES: usize = 3;

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    use Constraint::{Length, Min};

    let area = frame.area();
    let notice_height = app
        .notice
        .as_ref()
        .map_or(0, |notice| notice_height(notice, area.width));
    let input_height = match app.view {
        View::Chat => tui.input_box.calculate_height(area.width),
        View::History | View::Profile => 0,
    };
    let [title_area, main_area, notice_area, input_area] = Layout::vertical([
        Length(1),
        Min(0),
        Length(notice_height),
        Length(input_height),
    ])
    .areas(area);

    let has_unseen = app.view == View::Chat && tui.message_list.has_unseen_content();
    TitleBar::new(app.user_label(), &app.status_message, has_unseen).render(frame, title_area);

    match app.view {
        View::Chat => {
            MessageList::new(
                &mut tui.message_list,
                app.chat.transcript.messages(),
                app.chat.is_loading,
                spinner_frame,
            )
            .render(frame, main_area);
            tui.input_box.render(frame, input_area);
        }
        View::History => SessionManager {
            state: &mut tui.session_manager,
            sessions: &app.history.sessions,
            is_loading: app.history.is_loading,
            pending_delete: app.history.pending_delete(),
        }
        .render(frame, main_area),
        View::Profile => ProfileEditor {
            state: &tui.profile_editor,
            email: app
                .profile
                .current
                .as_ref()
                .and_then(|p| p.email.as_deref())
                .or(app.credentials.email.as_deref()),
            is_loading: app.profile.is_loading,
            is_saving: app.profile.is_saving,
            signed_in: app.credentials.cache_key().is_some(),
        }
        .render(frame, main_area),
    }

    if let Some(notice) = &app.notice {
        frame.render_widget(notice_widget(notice), notice_area);
    }
}

fn notice_text(notice: &Notice) -> String {
    format!("{}: {}  (Esc to dismiss)", notice.title, notice.description)
}

fn notice_height(notice: &Notice, width: u16) -> u16 {
    let lines = textwrap::wrap(&notice_text(notice), usize::from(width.max(1))).len();
    // Bounded by MAX_NOTICE_LINES, so the cast cannot truncate
    lines.clamp(1, MAX_NOTICE_LINES) as u16
}

fn notice_widget(notice: &Notice) -> Paragraph<'static> {
    let color = match notice.kind {
        NoticeKind::Success => Color::Green,
        NoticeKind::Error => Color::Red,
    };
    let line = Line::from(vec![
        Span::styled(
            format!("{}: ", notice.title),
            Style::default().fg(Color::Black).bg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            notice.description.clone(),
            Style::default().fg(Color::Black).bg(color),
        ),
        Span::styled(
            "  (Esc to dismiss)",
            Style::default().fg(Color::Black).bg(color).add_modifier(Modifier::DIM),
        ),
    ]);
    Paragraph::new(line)
        .style(Style::default().bg(color))
        .wrap(Wrap { trim: true })
}
