//! # Application State
//!
//! Core business state for Echo. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── credentials: Credentials           // who is signed in + bearer token
//! ├── chat: ChatState                    // transcript, session id, attachment
//! ├── transcript_loader: TranscriptLoader// replay of stored sessions
//! ├── history: HistoryState              // session list + delete flow
//! ├── profile: ProfileState              // keyed profile cache + editor
//! ├── view: View                         // which screen is showing
//! ├── status_message: String             // status bar text
//! └── notice: Option<Notice>             // transient success/error toast
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use crate::core::auth::Credentials;
use crate::core::chat::ChatState;
use crate::core::config::ResolvedConfig;
use crate::core::history::HistoryState;
use crate::core::profile::ProfileState;
use crate::core::transcript::TranscriptLoader;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Chat,
    History,
    Profile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Short-lived message shown above the status bar until dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub description: String,
}

impl Notice {
    pub fn success(title: &str, description: &str) -> Self {
        Self {
            kind: NoticeKind::Success,
            title: title.to_string(),
            description: description.to_string(),
        }
    }

    pub fn error(title: &str, description: &str) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: title.to_string(),
            description: description.to_string(),
        }
    }
}

pub struct App {
    pub credentials: Credentials,
    pub chat: ChatState,
    pub transcript_loader: TranscriptLoader,
    pub history: HistoryState,
    pub profile: ProfileState,
    pub view: View,
    pub status_message: String,
    pub notice: Option<Notice>,
    /// Backend the client talks to.
    pub api_url: String,
}

impl App {
    pub fn new(
        credentials: Credentials,
        greeting: Option<String>,
        attachments_enabled: bool,
        api_url: String,
    ) -> Self {
        Self {
            credentials,
            chat: ChatState::new(greeting, attachments_enabled),
            transcript_loader: TranscriptLoader::new(),
            history: HistoryState::new(),
            profile: ProfileState::new(),
            view: View::default(),
            status_message: String::from("Welcome to Echo!"),
            notice: None,
            api_url,
        }
    }

    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self::new(
            config.credentials.clone(),
            config.greeting.clone(),
            config.attachments_enabled,
            config.api_url.clone(),
        )
    }

    /// Name for the signed-in user, preferring the profile over the raw
    /// auth identity.
    pub fn user_label(&self) -> Option<&str> {
        self.profile.user_label(self.credentials.email.as_deref())
    }

    /// True while any backend call the user is waiting on is in flight.
    pub fn is_busy(&self) -> bool {
        self.chat.is_loading
            || self.transcript_loader.is_loading
            || self.history.is_loading
            || self.profile.is_loading
            || self.profile.is_saving
    }
}
