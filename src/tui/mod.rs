//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm. Network
//! work never runs on this thread: effects go to `dispatch::spawn` and their
//! results come back over an mpsc channel that the loop drains each tick.
//!
//! ## Redraw Strategy
//!
//! - **Busy** (reply, history or transcript pending): draws every ~80ms so
//!   the typing indicator animates.
//! - **Idle**: sleeps up to 500ms and only redraws on events, resizes or
//!   background results.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call, making blinking cursors appear erratic during continuous redraws.

mod component;
mod components;
mod event;
pub mod markdown;
mod ui;

use log::{debug, error, info, warn};
use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;

use crate::api::{Attachment, ChatBackend, HttpBackend};
use crate::core::action::{Action, Effect, update};
use crate::core::chat::{InputCommand, parse_input};
use crate::core::config::ResolvedConfig;
use crate::core::state::{App, View};
use crate::dispatch;
use crate::tui::component::EventHandler;
use crate::tui::components::{
    InputBox, InputEvent, MessageListState, ProfileEditorState, ProfileEvent, SessionEvent,
    SessionManagerState,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

const BUSY_TICK: Duration = Duration::from_millis(80);
const IDLE_TICK: Duration = Duration::from_millis(500);

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub message_list: MessageListState,
    pub input_box: InputBox,
    pub session_manager: SessionManagerState,
    pub profile_editor: ProfileEditorState,
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            message_list: MessageListState::new(),
            input_box: InputBox::new(),
            session_manager: SessionManagerState::new(),
            profile_editor: ProfileEditorState::new(),
        }
    }

    /// Copies the props each component needs from core state. Runs before
    /// events are routed so handlers see the same state the last frame showed.
    pub fn sync(&mut self, app: &App) {
        self.input_box.attachment = app.chat.attachment.as_ref().map(|a| a.file_name.clone());
        self.input_box.is_sending = app.chat.is_loading;
        self.input_box.dimmed = app.view != View::Chat || app.transcript_loader.is_loading;
        self.session_manager.sync(
            app.history.sessions.len(),
            app.history.pending_delete().is_some(),
        );
        self.profile_editor
            .sync(app.profile.current.as_ref(), app.profile.revision);
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol lets Shift+Enter through; terminals without
        // it ignore the sequence
        execute!(
            stdout(),
            EnableMouseCapture,
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (mouse, bracketed paste, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableMouseCapture,
            DisableBracketedPaste,
            Hide
        );
    }
}

/// Build the HTTP backend for a resolved config.
pub fn build_backend(config: &ResolvedConfig) -> std::io::Result<Arc<dyn ChatBackend>> {
    let backend = HttpBackend::new(
        &config.api_url,
        config.credentials.clone(),
        Duration::from_secs(config.request_timeout_secs),
    )
    .map_err(|e| {
        error!("Cannot reach API at {}: {}", config.api_url, e);
        std::io::Error::other(e.to_string())
    })?;
    Ok(Arc::new(backend))
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let backend = build_backend(&config)?;
    let mut app = App::from_config(&config);
    let mut tui = TuiState::new();

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    let (tx, rx) = mpsc::channel();
    let dispatch_effect = |effect: Effect| dispatch::spawn(backend.clone(), effect, tx.clone());

    dispatch_effect(update(&mut app, Action::Start));

    let start_time = Instant::now();
    let mut needs_redraw = true;

    'main: loop {
        tui.sync(&app);

        let busy = app.is_busy();
        if busy {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_millis() / BUSY_TICK.as_millis()) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        let first_event = poll_event_timeout(if busy { BUSY_TICK } else { IDLE_TICK });
        if first_event.is_some() {
            needs_redraw = true;
        }
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            for action in route_event(&mut app, &mut tui, event) {
                match update(&mut app, action) {
                    Effect::Quit => break 'main,
                    effect => dispatch_effect(effect),
                }
            }
            tui.sync(&app);
        }

        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            debug!("Event loop received: {:?}", action);
            match update(&mut app, action) {
                Effect::Quit => break 'main,
                effect => dispatch_effect(effect),
            }
        }
    }

    info!("Echo shutting down");
    ratatui::restore();
    Ok(())
}

/// Turns one terminal event into the actions it stands for in the current
/// view. Component-local changes (typing, scrolling, selection) happen here
/// and produce no action.
fn route_event(app: &App, tui: &mut TuiState, event: TuiEvent) -> Vec<Action> {
    match event {
        TuiEvent::ForceQuit => return vec![Action::Quit],
        TuiEvent::Resize => return Vec::new(),
        TuiEvent::Escape if app.notice.is_some() => return vec![Action::DismissNotice],
        TuiEvent::OpenHistory => return vec![Action::OpenHistory],
        TuiEvent::OpenProfile => return vec![Action::OpenProfile],
        TuiEvent::NewChat => {
            tui.message_list = MessageListState::new();
            return vec![Action::NewChat];
        }
        _ => {}
    }

    match app.view {
        View::Chat => route_chat_event(tui, event),
        View::History => route_history_event(app, tui, &event),
        View::Profile => match tui.profile_editor.handle_event(&event) {
            Some(ProfileEvent::Save {
                full_name,
                display_name,
            }) => vec![Action::SaveProfile {
                full_name,
                display_name,
            }],
            Some(ProfileEvent::Back) => vec![Action::ShowChat],
            None => Vec::new(),
        },
    }
}

fn route_chat_event(tui: &mut TuiState, event: TuiEvent) -> Vec<Action> {
    match event {
        TuiEvent::ScrollUp
        | TuiEvent::ScrollDown
        | TuiEvent::ScrollPageUp
        | TuiEvent::ScrollPageDown
        | TuiEvent::MouseMove(..) => {
            tui.message_list.handle_event(&event);
            Vec::new()
        }
        TuiEvent::Escape if tui.input_box.attachment.is_some() => vec![Action::RemoveAttachment],
        _ => match tui.input_box.handle_event(&event) {
            Some(InputEvent::Submit(text)) => vec![submit_action(&text)],
            Some(InputEvent::ContentChanged) | None => Vec::new(),
        },
    }
}

/// Interprets composer text: `/attach <path>`, `/detach`, or a message.
fn submit_action(text: &str) -> Action {
    match parse_input(text) {
        InputCommand::Send(message) => Action::Submit(message),
        InputCommand::Detach => Action::RemoveAttachment,
        InputCommand::Attach(path) => match Attachment::from_path(&path) {
            Ok(attachment) => Action::Attach(attachment),
            Err(e) => {
                warn!("Attach {} failed: {}", path.display(), e);
                Action::AttachFailed(format!("Cannot attach {}: {}", path.display(), e))
            }
        },
    }
}

fn route_history_event(app: &App, tui: &mut TuiState, event: &TuiEvent) -> Vec<Action> {
    let session_id = |index: usize| {
        app.history
            .sessions
            .get(index)
            .map(|s| s.session_id.clone())
    };
    let Some(session_event) = tui.session_manager.handle_event(event) else {
        return Vec::new();
    };
    match session_event {
        SessionEvent::Open(index) => match session_id(index) {
            Some(id) => {
                tui.message_list = MessageListState::new();
                vec![Action::OpenSession(id)]
            }
            None => Vec::new(),
        },
        SessionEvent::Delete(index) => match session_id(index) {
            Some(id) if app.history.pending_delete() == Some(id.as_str()) => {
                vec![Action::ConfirmDelete]
            }
            Some(id) => vec![Action::RequestDelete(id)],
            None => Vec::new(),
        },
        SessionEvent::CancelDelete => vec![Action::CancelDelete],
        SessionEvent::NewChat => {
            tui.message_list = MessageListState::new();
            vec![Action::NewChat]
        }
        SessionEvent::Refresh => vec![Action::OpenHistory],
        SessionEvent::Back => vec![Action::ShowChat],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{session, signed_in_app, test_app};

    fn loaded_history(app: &mut App, ids: &[&str]) {
        let generation = match update(app, Action::OpenHistory) {
            Effect::FetchSessions { generation } => generation,
            other => panic!("unexpected {other:?}"),
        };
        update(
            app,
            Action::SessionsLoaded {
                generation,
                result: Ok(ids.iter().map(|id| session(id)).collect()),
            },
        );
    }

    fn type_text(app: &mut App, tui: &mut TuiState, text: &str) {
        route_event(app, tui, TuiEvent::Paste(text.to_string()));
    }

    #[test]
    fn test_global_shortcuts() {
        let mut app = test_app();
        let mut tui = TuiState::new();
        assert_eq!(
            route_event(&mut app, &mut tui, TuiEvent::ForceQuit),
            vec![Action::Quit]
        );
        assert_eq!(
            route_event(&mut app, &mut tui, TuiEvent::OpenHistory),
            vec![Action::OpenHistory]
        );
        assert_eq!(
            route_event(&mut app, &mut tui, TuiEvent::OpenProfile),
            vec![Action::OpenProfile]
        );
        assert_eq!(
            route_event(&mut app, &mut tui, TuiEvent::NewChat),
            vec![Action::NewChat]
        );
    }

    #[test]
    fn test_escape_dismisses_notice_first() {
        let mut app = test_app();
        app.notice = Some(crate::core::state::Notice::error("x", "y"));
        let mut tui = TuiState::new();
        assert_eq!(
            route_event(&mut app, &mut tui, TuiEvent::Escape),
            vec![Action::DismissNotice]
        );
    }

    #[test]
    fn test_enter_submits_typed_text() {
        let mut app = test_app();
        let mut tui = TuiState::new();
        type_text(&mut app, &mut tui, "hello");
        assert_eq!(
            route_event(&mut app, &mut tui, TuiEvent::Submit),
            vec![Action::Submit("hello".to_string())]
        );
        assert_eq!(tui.input_box.text(), "");
    }

    #[test]
    fn test_plain_text_is_submitted_verbatim() {
        assert_eq!(
            submit_action("  hello\nworld "),
            Action::Submit("  hello\nworld ".to_string())
        );
    }

    #[test]
    fn test_detach_command() {
        assert_eq!(submit_action("/detach"), Action::RemoveAttachment);
    }

    #[test]
    fn test_attach_missing_file_fails() {
        match submit_action("/attach /definitely/not/here.txt") {
            Action::AttachFailed(reason) => assert!(reason.contains("here.txt")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_attach_existing_file() {
        let path = std::env::temp_dir().join(format!("echo-attach-{}.txt", std::process::id()));
        std::fs::write(&path, b"notes").unwrap();
        let action = submit_action(&format!("/attach {}", path.display()));
        std::fs::remove_file(&path).ok();
        match action {
            Action::Attach(attachment) => {
                assert_eq!(attachment.path, path);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_history_delete_arms_then_confirms() {
        let mut app = signed_in_app();
        let mut tui = TuiState::new();
        loaded_history(&mut app, &["a", "b"]);
        tui.sync(&app);

        let actions = route_event(&mut app, &mut tui, TuiEvent::InputChar('d'));
        assert_eq!(actions, vec![Action::RequestDelete("a".to_string())]);
        update(&mut app, actions[0].clone());
        tui.sync(&app);

        assert_eq!(
            route_event(&mut app, &mut tui, TuiEvent::InputChar('d')),
            vec![Action::ConfirmDelete]
        );
    }

    #[test]
    fn test_history_other_key_cancels_armed_delete() {
        let mut app = signed_in_app();
        let mut tui = TuiState::new();
        loaded_history(&mut app, &["a"]);
        update(&mut app, Action::RequestDelete("a".to_string()));
        tui.sync(&app);
        assert_eq!(
            route_event(&mut app, &mut tui, TuiEvent::CursorDown),
            vec![Action::CancelDelete]
        );
    }

    #[test]
    fn test_history_open_maps_row_to_session() {
        let mut app = signed_in_app();
        let mut tui = TuiState::new();
        loaded_history(&mut app, &["a", "b"]);
        tui.sync(&app);
        route_event(&mut app, &mut tui, TuiEvent::CursorDown);
        assert_eq!(
            route_event(&mut app, &mut tui, TuiEvent::Submit),
            vec![Action::OpenSession("b".to_string())]
        );
    }

    #[test]
    fn test_profile_escape_goes_back() {
        let mut app = signed_in_app();
        app.view = View::Profile;
        let mut tui = TuiState::new();
        assert_eq!(
            route_event(&mut app, &mut tui, TuiEvent::Escape),
            vec![Action::ShowChat]
        );
    }

    #[test]
    fn test_sync_copies_props() {
        let mut app = test_app();
        update(&mut app, Action::Submit("hi".to_string()));
        let mut tui = TuiState::new();
        tui.sync(&app);
        assert!(tui.input_box.is_sending);
        assert!(!tui.input_box.dimmed);
    }
}
