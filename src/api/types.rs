use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Who authored a message. The backend only ever stores these two roles.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "you",
            Role::Assistant => "echo",
        }
    }
}

/// Message identifier: client-generated text for optimistic messages,
/// whatever the backend hands out (usually a number) for fetched ones.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum MessageId {
    Number(i64),
    Text(String),
}

impl MessageId {
    /// Fresh client-side identifier for a locally constructed message.
    pub fn local() -> Self {
        MessageId::Text(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageId::Number(n) => write!(f, "{n}"),
            MessageId::Text(s) => f.write_str(s),
        }
    }
}

/// One entry in a transcript.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    #[serde(rename = "created_at", deserialize_with = "timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn local(role: Role, content: String) -> Self {
        Self {
            id: MessageId::local(),
            role,
            content,
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::local(Role::User, content.into())
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::local(Role::Assistant, content.into())
    }
}

/// Summary row from `GET /sessions`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ChatSession {
    pub session_id: String,
    pub title: Option<String>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
}

impl ChatSession {
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or("Untitled chat")
    }
}

/// The signed-in user's profile. `email` is display-only and the backend
/// may leave it out entirely.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub full_name: Option<String>,
    pub display_name: Option<String>,
    #[serde(default, skip_serializing)]
    pub email: Option<String>,
}

/// Body of `PUT /profile`. Both fields are always sent: saving replaces
/// the whole editable part of the profile.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub display_name: String,
}

/// A file picked for the next outgoing message. Only the path is held;
/// the bytes are read when the request is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub path: PathBuf,
    pub file_name: String,
}

impl Attachment {
    /// Validates that `path` names a readable regular file.
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self {
            path: path.to_path_buf(),
            file_name,
        })
    }
}

/// Everything needed to issue one `POST /chat`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: Option<String>,
    pub attachment: Option<Attachment>,
}

/// Decoded `POST /chat` response. Fallbacks for a missing reply are applied
/// by the chat controller, not here.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ChatReply {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// JSON body of `POST /chat` when no file is attached.
#[derive(Serialize, Debug)]
pub(crate) struct ChatBody<'a> {
    pub message: &'a str,
    pub session_id: Option<&'a str>,
}

mod timestamp {
    use super::*;

    /// Accepts RFC 3339 and offset-less ISO 8601 (read as UTC), since
    /// Postgres-backed APIs emit both.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
    }

    pub(super) fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }
}
