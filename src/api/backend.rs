use std::fmt;

use async_trait::async_trait;

use super::types::{ChatReply, ChatRequest, ChatSession, Message, Profile, ProfileUpdate};

/// Errors that can occur while talking to the chat backend.
/// None of them are fatal; callers turn them into a transcript fallback
/// or a notice.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendError {
    /// Client misconfigured (bad base URL, TLS setup). Not retryable.
    Config(String),
    /// Transport failure (timeout, DNS, connection refused).
    Network(String),
    /// Backend answered with a non-success status.
    Api { status: u16, message: String },
    /// The attached file could not be read at send time.
    Attachment(String),
    /// Response body did not have the expected shape.
    Decode(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::Config(msg) => write!(f, "config error: {msg}"),
            BackendError::Network(msg) => write!(f, "network error: {msg}"),
            BackendError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            BackendError::Attachment(msg) => write!(f, "attachment error: {msg}"),
            BackendError::Decode(msg) => write!(f, "decode error: {msg}"),
        }
    }
}

impl std::error::Error for BackendError {}

/// The REST surface Echo consumes. One method per endpoint; every call is
/// authenticated with whatever credentials the implementation was built with.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// `POST /chat`, JSON or multipart depending on the attachment.
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply, BackendError>;

    /// `GET /sessions`, newest first as the backend orders them.
    async fn list_sessions(&self) -> Result<Vec<ChatSession>, BackendError>;

    /// `GET /sessions/{id}`.
    async fn load_transcript(&self, session_id: &str) -> Result<Vec<Message>, BackendError>;

    /// `DELETE /sessions/{id}`.
    async fn delete_session(&self, session_id: &str) -> Result<(), BackendError>;

    /// `GET /profile`.
    async fn get_profile(&self) -> Result<Profile, BackendError>;

    /// `PUT /profile`.
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<Profile, BackendError>;
}
