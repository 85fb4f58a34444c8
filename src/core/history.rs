//! # Session History
//!
//! The list of past chat sessions and the delete flow around it.
//!
//! Deletion is never optimistic. A delete has to be armed with
//! [`HistoryState::request_delete`] and confirmed with
//! [`HistoryState::confirm_delete`] before any request goes out, and the row
//! only disappears once the backend reports success.

use log::{debug, warn};

use crate::api::{BackendError, ChatSession};

#[derive(Debug, Default)]
pub struct HistoryState {
    pub sessions: Vec<ChatSession>,
    pub is_loading: bool,
    pending_delete: Option<String>,
    generation: u64,
}

impl HistoryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a list fetch and returns its generation tag.
    pub fn begin_load(&mut self) -> u64 {
        self.generation += 1;
        self.is_loading = true;
        self.pending_delete = None;
        self.generation
    }

    /// Applies a list response. Returns `None` for a stale response,
    /// otherwise whether the load succeeded.
    pub fn finish_load(
        &mut self,
        generation: u64,
        result: Result<Vec<ChatSession>, BackendError>,
    ) -> Option<bool> {
        if generation != self.generation {
            debug!("Dropping stale session list (generation {})", generation);
            return None;
        }
        self.is_loading = false;
        match result {
            Ok(sessions) => {
                debug!("Loaded {} sessions", sessions.len());
                self.sessions = sessions;
                Some(true)
            }
            Err(e) => {
                warn!("Failed to load sessions: {}", e);
                self.sessions.clear();
                Some(false)
            }
        }
    }

    /// Arms the confirmation step for `session_id`. Unknown ids are ignored.
    pub fn request_delete(&mut self, session_id: &str) -> bool {
        if !self.sessions.iter().any(|s| s.session_id == session_id) {
            return false;
        }
        self.pending_delete = Some(session_id.to_string());
        true
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.pending_delete.as_deref()
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Consumes the armed confirmation. The returned id is the one and only
    /// session the caller may now issue a delete for.
    pub fn confirm_delete(&mut self) -> Option<String> {
        self.pending_delete.take()
    }

    /// Applies the backend's answer to a delete. The row is removed only on
    /// success; returns whether it was.
    pub fn finish_delete(&mut self, session_id: &str, result: &Result<(), BackendError>) -> bool {
        match result {
            Ok(()) => {
                self.sessions.retain(|s| s.session_id != session_id);
                true
            }
            Err(e) => {
                warn!("Failed to delete session {}: {}", session_id, e);
                false
            }
        }
    }
}
