//! # Transcript
//!
//! The ordered message list of one chat view, plus the loader that replays a
//! stored session into it.
//!
//! A transcript is append-only for the lifetime of its view: messages keep
//! insertion order and are never edited or re-sorted. Starting a new chat or
//! opening another session replaces the whole transcript instead.

use log::debug;

use crate::api::Message;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

impl From<Vec<Message>> for Transcript {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

/// Tracks transcript fetches for the session view.
///
/// A fetch is issued once per distinct `(session_id, token)` pair; asking
/// again for the pair that is already loaded (or loading) is a no-op. Each
/// fetch gets a new generation so a late response for an abandoned view can
/// be recognised and dropped.
#[derive(Debug, Default)]
pub struct TranscriptLoader {
    key: Option<(String, Option<String>)>,
    generation: u64,
    pub is_loading: bool,
}

impl TranscriptLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the generation to tag the fetch with, or `None` if this pair
    /// was already requested for the current view.
    pub fn begin(&mut self, session_id: &str, token: Option<&str>) -> Option<u64> {
        let key = (session_id.to_string(), token.map(str::to_string));
        if self.key.as_ref() == Some(&key) {
            debug!("Transcript for {} already requested, skipping fetch", session_id);
            return None;
        }
        self.key = Some(key);
        self.generation += 1;
        self.is_loading = true;
        Some(self.generation)
    }

    /// Marks the fetch tagged `generation` as finished. Returns false for a
    /// stale response that must be ignored.
    pub fn finish(&mut self, generation: u64) -> bool {
        if generation != self.generation || !self.is_loading {
            return false;
        }
        self.is_loading = false;
        true
    }

    /// Forgets the loaded pair (the view it belonged to is gone) and
    /// invalidates any fetch still in flight.
    pub fn reset(&mut self) {
        self.key = None;
        self.generation += 1;
        self.is_loading = false;
    }

    pub fn session_id(&self) -> Option<&str> {
        self.key.as_ref().map(|(id, _)| id.as_str())
    }
}
