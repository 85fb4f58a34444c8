//! # Chat Exchange
//!
//! State of the chat view and the send/reply cycle:
//!
//! ```text
//! begin_send(text)                         finish_send(generation, result)
//! ├── 1. append optimistic user message    ├── stale generation → dropped
//! ├── 2. take input + attachment           ├── clear pending flag
//! ├── 3. set pending flag                  ├── adopt returned session_id
//! └── 4. hand back one ChatRequest         └── append one assistant message
//! ```
//!
//! Attachments are a capability of the same controller, switched by
//! `attachments_enabled`.

use std::path::PathBuf;

use log::{debug, warn};

use crate::api::{Attachment, BackendError, ChatReply, ChatRequest, Message};
use crate::core::transcript::Transcript;

pub const DEFAULT_GREETING: &str = "Hello! I'm Echo. I can help you with various tasks and projects. \
     What would you like to work on today?";
/// Appended when a send fails for any reason.
pub const SEND_FAILED_MESSAGE: &str = "Sorry, something went wrong. Please try again.";
/// Appended when the backend answers without a reply text.
pub const EMPTY_REPLY_MESSAGE: &str = "Sorry, I couldn't get a response.";

/// A request ready to go out, tagged with the view generation it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSend {
    pub generation: u64,
    pub request: ChatRequest,
}

#[derive(Debug)]
pub struct ChatState {
    pub transcript: Transcript,
    /// Backend session this view is writing into. `None` until the first
    /// reply establishes one.
    pub session_id: Option<String>,
    pub attachment: Option<Attachment>,
    pub is_loading: bool,
    pub attachments_enabled: bool,
    greeting: Option<String>,
    generation: u64,
}

impl ChatState {
    pub fn new(greeting: Option<String>, attachments_enabled: bool) -> Self {
        let mut state = Self {
            transcript: Transcript::new(),
            session_id: None,
            attachment: None,
            is_loading: false,
            attachments_enabled,
            greeting,
            generation: 0,
        };
        state.push_greeting();
        state
    }

    fn push_greeting(&mut self) {
        if let Some(greeting) = &self.greeting {
            self.transcript.push(Message::assistant(greeting.clone()));
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Starts a fresh conversation. Replies still in flight for the old view
    /// will no longer match the generation.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.transcript = Transcript::new();
        self.session_id = None;
        self.attachment = None;
        self.is_loading = false;
        self.push_greeting();
    }

    /// Switches the view to an existing session. The transcript starts empty
    /// and is filled by [`ChatState::replay`] once the history arrives.
    pub fn resume(&mut self, session_id: String) {
        self.generation += 1;
        self.transcript = Transcript::new();
        self.session_id = Some(session_id);
        self.attachment = None;
        self.is_loading = false;
    }

    pub fn replay(&mut self, messages: Vec<Message>) {
        self.transcript = Transcript::from(messages);
    }

    /// Stops writing into the current backend session; the next send starts
    /// a new one. The transcript on screen is left alone.
    pub fn detach_session(&mut self) {
        self.session_id = None;
    }

    /// Returns false when attachments are switched off for this view.
    pub fn attach(&mut self, attachment: Attachment) -> bool {
        if !self.attachments_enabled {
            return false;
        }
        self.attachment = Some(attachment);
        true
    }

    pub fn remove_attachment(&mut self) -> Option<Attachment> {
        self.attachment.take()
    }

    /// Runs the send preconditions and the optimistic steps. Returns `None`
    /// (and changes nothing) for blank text without an attachment, or while
    /// a send is already pending.
    pub fn begin_send(&mut self, text: &str) -> Option<PendingSend> {
        if self.is_loading {
            debug!("Send ignored: request already pending");
            return None;
        }
        if text.trim().is_empty() && self.attachment.is_none() {
            return None;
        }

        let attachment = self.attachment.take();
        let content = match (&attachment, text.trim().is_empty()) {
            (Some(att), true) => format!("[attachment: {}]", att.file_name),
            (Some(att), false) => format!("{text}\n\n[attachment: {}]", att.file_name),
            (None, _) => text.to_string(),
        };
        self.transcript.push(Message::user(content));
        self.is_loading = true;

        Some(PendingSend {
            generation: self.generation,
            request: ChatRequest {
                message: text.to_string(),
                session_id: self.session_id.clone(),
                attachment,
            },
        })
    }

    /// Reconciles a reply. Returns false for a reply that belongs to an
    /// abandoned view; those leave the state untouched.
    pub fn finish_send(&mut self, generation: u64, result: Result<ChatReply, BackendError>) -> bool {
        if generation != self.generation {
            debug!(
                "Dropping stale chat reply (generation {} != {})",
                generation, self.generation
            );
            return false;
        }
        self.is_loading = false;

        let content = match result {
            Ok(reply) => {
                if let Some(id) = reply.session_id.filter(|id| !id.is_empty()) {
                    if self.session_id.as_deref() != Some(id.as_str()) {
                        debug!("Adopting session id {}", id);
                    }
                    self.session_id = Some(id);
                }
                reply
                    .response
                    .filter(|r| !r.is_empty())
                    .unwrap_or_else(|| EMPTY_REPLY_MESSAGE.to_string())
            }
            Err(e) => {
                warn!("Error sending message: {}", e);
                SEND_FAILED_MESSAGE.to_string()
            }
        };
        self.transcript.push(Message::assistant(content));
        true
    }
}

/// What a line typed into the input box asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputCommand {
    Send(String),
    Attach(PathBuf),
    Detach,
}

/// Recognises `/attach <path>` and `/detach`; anything else is a message.
pub fn parse_input(text: &str) -> InputCommand {
    let trimmed = text.trim();
    if let Some(rest) = trimmed.strip_prefix("/attach ") {
        let path = rest.trim();
        if !path.is_empty() {
            return InputCommand::Attach(PathBuf::from(path));
        }
    }
    if trimmed == "/detach" {
        return InputCommand::Detach;
    }
    InputCommand::Send(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Role;

    fn chat() -> ChatState {
        ChatState::new(None, true)
    }

    fn attachment(name: &str) -> Attachment {
        Attachment {
            path: PathBuf::from(format!("/tmp/{name}")),
            file_name: name.to_string(),
        }
    }

    fn reply(text: Option<&str>, session: Option<&str>) -> Result<ChatReply, BackendError> {
        Ok(ChatReply {
            response: text.map(str::to_string),
            session_id: session.map(str::to_string),
        })
    }

    #[test]
    fn test_new_chat_starts_with_greeting() {
        let state = ChatState::new(Some(DEFAULT_GREETING.to_string()), false);
        assert_eq!(state.transcript.len(), 1);
        let greeting = state.transcript.last().unwrap();
        assert_eq!(greeting.role, Role::Assistant);
        assert!(greeting.content.starts_with("Hello! I'm Echo."));
    }

    #[test]
    fn test_blank_text_without_attachment_is_noop() {
        let mut state = chat();
        assert!(state.begin_send("   \n").is_none());
        assert!(state.transcript.is_empty());
        assert!(!state.is_loading);
    }

    #[test]
    fn test_send_appends_user_message_then_sets_pending() {
        let mut state = chat();
        let pending = state.begin_send("hello").unwrap();
        assert_eq!(state.transcript.len(), 1);
        assert_eq!(state.transcript.last().unwrap().role, Role::User);
        assert_eq!(state.transcript.last().unwrap().content, "hello");
        assert!(state.is_loading);
        assert_eq!(pending.request.message, "hello");
        assert_eq!(pending.request.session_id, None);
        assert_eq!(pending.generation, state.generation());
    }

    #[test]
    fn test_second_send_while_pending_is_noop() {
        let mut state = chat();
        state.begin_send("one").unwrap();
        assert!(state.begin_send("two").is_none());
        assert_eq!(state.transcript.len(), 1);
    }

    #[test]
    fn test_reply_appends_exactly_one_assistant_message() {
        let mut state = chat();
        let pending = state.begin_send("hi").unwrap();
        assert!(state.finish_send(pending.generation, reply(Some("hey there"), Some("s-1"))));
        assert_eq!(state.transcript.len(), 2);
        let last = state.transcript.last().unwrap();
        assert_eq!(last.role, Role::Assistant);
        assert_eq!(last.content, "hey there");
        assert!(!state.is_loading);
    }

    #[test]
    fn test_missing_reply_uses_fallback() {
        let mut state = chat();
        let pending = state.begin_send("hi").unwrap();
        state.finish_send(pending.generation, reply(Some(""), None));
        assert_eq!(state.transcript.last().unwrap().content, EMPTY_REPLY_MESSAGE);
    }

    #[test]
    fn test_failure_appends_fallback_and_clears_pending() {
        let mut state = chat();
        let pending = state.begin_send("hi").unwrap();
        let applied = state.finish_send(
            pending.generation,
            Err(BackendError::Api {
                status: 500,
                message: "boom".to_string(),
            }),
        );
        assert!(applied);
        assert_eq!(state.transcript.len(), 2);
        assert_eq!(state.transcript.last().unwrap().content, SEND_FAILED_MESSAGE);
        assert!(!state.is_loading);
    }

    #[test]
    fn test_returned_session_id_is_reused_verbatim() {
        let mut state = chat();
        let first = state.begin_send("one").unwrap();
        state.finish_send(first.generation, reply(Some("a"), Some("9f1c-XYZ")));
        let second = state.begin_send("two").unwrap();
        assert_eq!(second.request.session_id.as_deref(), Some("9f1c-XYZ"));
    }

    #[test]
    fn test_empty_session_id_is_not_adopted() {
        let mut state = chat();
        let first = state.begin_send("one").unwrap();
        state.finish_send(first.generation, reply(Some("a"), Some("")));
        assert_eq!(state.session_id, None);
    }

    #[test]
    fn test_stale_reply_after_reset_is_dropped() {
        let mut state = ChatState::new(Some("hi".to_string()), false);
        let pending = state.begin_send("question").unwrap();
        state.reset();
        assert!(!state.finish_send(pending.generation, reply(Some("late"), Some("s-old"))));
        assert_eq!(state.transcript.len(), 1);
        assert_eq!(state.session_id, None);
    }

    #[test]
    fn test_attachment_only_send() {
        let mut state = chat();
        assert!(state.attach(attachment("notes.pdf")));
        let pending = state.begin_send("").unwrap();
        assert_eq!(pending.request.message, "");
        assert_eq!(pending.request.attachment.as_ref().unwrap().file_name, "notes.pdf");
        assert_eq!(state.transcript.last().unwrap().content, "[attachment: notes.pdf]");
        assert!(state.attachment.is_none(), "attachment cleared after send");
    }

    #[test]
    fn test_attachments_disabled() {
        let mut state = ChatState::new(None, false);
        assert!(!state.attach(attachment("a.txt")));
        assert!(state.attachment.is_none());
    }

    #[test]
    fn test_resume_targets_existing_session() {
        let mut state = chat();
        state.resume("s-42".to_string());
        assert!(state.transcript.is_empty());
        state.replay(vec![Message::user("old question"), Message::assistant("old answer")]);
        let pending = state.begin_send("follow-up").unwrap();
        assert_eq!(pending.request.session_id.as_deref(), Some("s-42"));
        assert_eq!(state.transcript.len(), 3);
    }

    #[test]
    fn test_parse_input_commands() {
        assert_eq!(
            parse_input("/attach ./report.pdf"),
            InputCommand::Attach(PathBuf::from("./report.pdf"))
        );
        assert_eq!(parse_input(" /detach "), InputCommand::Detach);
        assert_eq!(parse_input("/attach"), InputCommand::Send("/attach".to_string()));
        assert_eq!(parse_input("hello"), InputCommand::Send("hello".to_string()));
    }
}
