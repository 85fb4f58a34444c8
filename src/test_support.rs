//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::api::{
    BackendError, ChatBackend, ChatReply, ChatRequest, ChatSession, Message, Profile,
    ProfileUpdate,
};
use crate::core::auth::Credentials;
use crate::core::state::App;

/// Backend double that answers from queued results and records every call.
/// An empty queue answers with a 500.
#[derive(Default)]
pub struct MockBackend {
    pub replies: Mutex<VecDeque<Result<ChatReply, BackendError>>>,
    pub sessions: Mutex<VecDeque<Result<Vec<ChatSession>, BackendError>>>,
    pub transcripts: Mutex<VecDeque<Result<Vec<Message>, BackendError>>>,
    pub deletes: Mutex<VecDeque<Result<(), BackendError>>>,
    pub profiles: Mutex<VecDeque<Result<Profile, BackendError>>>,
    pub calls: Mutex<Vec<String>>,
}

fn next<T>(queue: &Mutex<VecDeque<Result<T, BackendError>>>) -> Result<T, BackendError> {
    queue
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| Err(BackendError::Api {
            status: 500,
            message: "no scripted response".to_string(),
        }))
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
        self.record(format!("chat {:?} {:?}", request.message, request.session_id));
        next(&self.replies)
    }

    async fn list_sessions(&self) -> Result<Vec<ChatSession>, BackendError> {
        self.record("sessions".to_string());
        next(&self.sessions)
    }

    async fn load_transcript(&self, session_id: &str) -> Result<Vec<Message>, BackendError> {
        self.record(format!("transcript {session_id}"));
        next(&self.transcripts)
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), BackendError> {
        self.record(format!("delete {session_id}"));
        next(&self.deletes)
    }

    async fn get_profile(&self) -> Result<Profile, BackendError> {
        self.record("profile".to_string());
        next(&self.profiles)
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<Profile, BackendError> {
        self.record(format!("update {:?} {:?}", update.full_name, update.display_name));
        next(&self.profiles)
    }
}

pub fn signed_in() -> Credentials {
    Credentials {
        user_id: Some("user-1".to_string()),
        email: Some("ada@example.com".to_string()),
        access_token: Some("tok".to_string()),
    }
}

pub fn session(id: &str) -> ChatSession {
    ChatSession {
        session_id: id.to_string(),
        title: Some(format!("chat {id}")),
        created_at: Utc::now(),
    }
}

/// Anonymous app without a greeting, so transcripts start empty.
pub fn test_app() -> App {
    App::new(Credentials::default(), None, true, "http://localhost:8001".to_string())
}

pub fn signed_in_app() -> App {
    App::new(signed_in(), None, true, "http://localhost:8001".to_string())
}
