pub mod backend;
pub mod client;
pub mod types;

pub use backend::{BackendError, ChatBackend};
pub use client::HttpBackend;
pub use types::{
    Attachment, ChatReply, ChatRequest, ChatSession, Message, MessageId, Profile, ProfileUpdate,
    Role,
};
