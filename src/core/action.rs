//! # Actions
//!
//! Everything that can happen in Echo becomes an `Action`.
//! User presses Enter? That's `Action::Submit(text)`.
//! Backend answers? That's `Action::ChatReplied { .. }`.
//!
//! The `update()` function takes the current state and an action, mutates
//! the state, and returns an `Effect` describing the I/O the caller should
//! perform. No side effects here. The result of an effect comes back as
//! another action.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//!                                               │
//!              Action  ←  dispatch::perform()  ←┘
//! ```
//!
//! Every fetch is tagged with a generation. A response whose generation no
//! longer matches the view it was issued for is dropped without touching
//! state.

use log::{debug, info, warn};

use crate::api::{Attachment, BackendError, ChatReply, ChatRequest, ChatSession, Message, Profile, ProfileUpdate};
use crate::core::profile::profile_update;
use crate::core::state::{App, Notice, View};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// App launched: warm the profile cache for the title bar.
    Start,
    Quit,
    ShowChat,
    NewChat,
    Submit(String),
    Attach(Attachment),
    /// The picked path could not be attached.
    AttachFailed(String),
    RemoveAttachment,
    ChatReplied {
        generation: u64,
        result: Result<ChatReply, BackendError>,
    },
    OpenHistory,
    SessionsLoaded {
        generation: u64,
        result: Result<Vec<ChatSession>, BackendError>,
    },
    /// Arms the delete confirmation for a session.
    RequestDelete(String),
    ConfirmDelete,
    CancelDelete,
    SessionDeleted {
        session_id: String,
        result: Result<(), BackendError>,
    },
    OpenSession(String),
    TranscriptLoaded {
        generation: u64,
        result: Result<Vec<Message>, BackendError>,
    },
    OpenProfile,
    ProfileLoaded {
        key: String,
        result: Result<Profile, BackendError>,
    },
    SaveProfile {
        full_name: String,
        display_name: String,
    },
    ProfileSaved(Result<Profile, BackendError>),
    DismissNotice,
}

/// I/O requested by `update()`.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Quit,
    SendChat { generation: u64, request: ChatRequest },
    FetchSessions { generation: u64 },
    DeleteSession(String),
    FetchTranscript { generation: u64, session_id: String },
    FetchProfile { key: String },
    SaveProfile(ProfileUpdate),
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Start => {
            info!(
                "Starting session for {:?} against {}",
                app.credentials.cache_key(),
                app.api_url
            );
            load_profile(app)
        }
        Action::Quit => Effect::Quit,
        Action::ShowChat => {
            app.view = View::Chat;
            Effect::None
        }
        Action::NewChat => {
            app.chat.reset();
            app.transcript_loader.reset();
            app.view = View::Chat;
            app.status_message = String::from("New chat");
            Effect::None
        }

        // ── Chat ──────────────────────────────────────────────────────────
        Action::Submit(text) => {
            if app.view != View::Chat {
                return Effect::None;
            }
            if app.transcript_loader.is_loading {
                debug!("Submit ignored: transcript still loading");
                return Effect::None;
            }
            match app.chat.begin_send(&text) {
                Some(pending) => {
                    app.status_message = String::from("Echo is thinking...");
                    Effect::SendChat {
                        generation: pending.generation,
                        request: pending.request,
                    }
                }
                None => Effect::None,
            }
        }
        Action::Attach(attachment) => {
            let name = attachment.file_name.clone();
            app.status_message = if app.chat.attach(attachment) {
                format!("Attached {name}")
            } else {
                String::from("Attachments are disabled")
            };
            Effect::None
        }
        Action::AttachFailed(reason) => {
            app.status_message = reason;
            Effect::None
        }
        Action::RemoveAttachment => {
            if let Some(removed) = app.chat.remove_attachment() {
                app.status_message = format!("Removed {}", removed.file_name);
            }
            Effect::None
        }
        Action::ChatReplied { generation, result } => {
            let failed = result.is_err();
            if app.chat.finish_send(generation, result) {
                app.status_message = if failed {
                    String::from("Message failed")
                } else {
                    String::from("Ready")
                };
            }
            Effect::None
        }

        // ── History ───────────────────────────────────────────────────────
        Action::OpenHistory => {
            app.view = View::History;
            let generation = app.history.begin_load();
            app.status_message = String::from("Loading chat history...");
            Effect::FetchSessions { generation }
        }
        Action::SessionsLoaded { generation, result } => {
            match app.history.finish_load(generation, result) {
                Some(true) => app.status_message = String::from("Ready"),
                Some(false) => {
                    app.status_message = String::from("Ready");
                    app.notice = Some(Notice::error(
                        "History unavailable",
                        "Could not load chat sessions.",
                    ));
                }
                None => {}
            }
            Effect::None
        }
        Action::RequestDelete(session_id) => {
            if app.history.request_delete(&session_id) {
                app.status_message = String::from("Press d again to delete, Esc to cancel");
            }
            Effect::None
        }
        Action::ConfirmDelete => match app.history.confirm_delete() {
            Some(session_id) => {
                app.status_message = String::from("Deleting...");
                Effect::DeleteSession(session_id)
            }
            None => Effect::None,
        },
        Action::CancelDelete => {
            app.history.cancel_delete();
            app.status_message = String::from("Ready");
            Effect::None
        }
        Action::SessionDeleted { session_id, result } => {
            app.status_message = String::from("Ready");
            if app.history.finish_delete(&session_id, &result) {
                if app.chat.session_id.as_deref() == Some(session_id.as_str()) {
                    app.chat.detach_session();
                }
                if app.transcript_loader.session_id() == Some(session_id.as_str()) {
                    app.transcript_loader.reset();
                }
                app.notice = Some(Notice::success(
                    "Session deleted",
                    "Chat session deleted successfully.",
                ));
            } else {
                app.notice = Some(Notice::error(
                    "Delete failed",
                    "Could not delete the chat session.",
                ));
            }
            Effect::None
        }
        Action::OpenSession(session_id) => {
            app.view = View::Chat;
            let token = app.credentials.token().map(str::to_string);
            match app.transcript_loader.begin(&session_id, token.as_deref()) {
                Some(generation) => {
                    app.chat.resume(session_id.clone());
                    app.status_message = String::from("Loading conversation...");
                    Effect::FetchTranscript {
                        generation,
                        session_id,
                    }
                }
                None => Effect::None,
            }
        }
        Action::TranscriptLoaded { generation, result } => {
            if !app.transcript_loader.finish(generation) {
                debug!("Dropping stale transcript (generation {})", generation);
                return Effect::None;
            }
            match result {
                Ok(messages) => {
                    debug!("Replaying {} messages", messages.len());
                    app.chat.replay(messages);
                    app.status_message = String::from("Ready");
                }
                Err(e) => {
                    warn!("Failed to load transcript: {}", e);
                    // Forget the pair so opening the session again retries
                    app.transcript_loader.reset();
                    app.status_message = String::from("Transcript unavailable");
                }
            }
            Effect::None
        }

        // ── Profile ───────────────────────────────────────────────────────
        Action::OpenProfile => {
            app.view = View::Profile;
            if app.credentials.cache_key().is_none() {
                app.status_message = String::from("Not signed in");
                return Effect::None;
            }
            load_profile(app)
        }
        Action::ProfileLoaded { key, result } => {
            if app.credentials.cache_key() != Some(key.as_str()) {
                debug!("Dropping profile for another user");
                return Effect::None;
            }
            app.profile.is_loading = false;
            match result {
                Ok(profile) => {
                    app.profile.cache.insert(&key, profile.clone());
                    app.profile.show(profile);
                }
                Err(e) => {
                    warn!("Failed to load profile: {}", e);
                    app.notice = Some(Notice::error(
                        "Profile unavailable",
                        "Could not load your profile data.",
                    ));
                }
            }
            Effect::None
        }
        Action::SaveProfile {
            full_name,
            display_name,
        } => {
            if app.profile.is_saving || app.credentials.cache_key().is_none() {
                return Effect::None;
            }
            app.profile.is_saving = true;
            app.status_message = String::from("Saving profile...");
            Effect::SaveProfile(profile_update(&full_name, &display_name))
        }
        Action::ProfileSaved(result) => {
            app.profile.is_saving = false;
            app.status_message = String::from("Ready");
            match result {
                Ok(_) => {
                    // The view only changes once the refetch lands
                    app.notice = Some(Notice::success(
                        "Profile updated",
                        "Your profile has been updated successfully.",
                    ));
                    match app.credentials.cache_key().map(str::to_string) {
                        Some(key) => {
                            app.profile.cache.invalidate(&key);
                            app.profile.is_loading = true;
                            Effect::FetchProfile { key }
                        }
                        None => Effect::None,
                    }
                }
                Err(e) => {
                    warn!("Failed to save profile: {}", e);
                    app.notice = Some(Notice::error("Update failed", "Could not update your profile."));
                    Effect::None
                }
            }
        }
        Action::DismissNotice => {
            app.notice = None;
            Effect::None
        }
    }
}

/// Serves the profile from cache, or asks for a fetch on a miss.
fn load_profile(app: &mut App) -> Effect {
    let Some(key) = app.credentials.cache_key().map(str::to_string) else {
        return Effect::None;
    };
    if let Some(cached) = app.profile.cache.get(&key).cloned() {
        app.profile.show(cached);
        return Effect::None;
    }
    if app.profile.is_loading {
        return Effect::None;
    }
    app.profile.is_loading = true;
    Effect::FetchProfile { key }
}
