//! # Effect Dispatch
//!
//! Runs the I/O an [`Effect`] asks for against a [`ChatBackend`] and turns
//! the outcome into the [`Action`] that feeds it back into `update()`.
//!
//! ```text
//! Effect::SendChat { generation, request }
//!     └── backend.send_chat(request) ──► Action::ChatReplied { generation, result }
//! ```
//!
//! Kept separate from the TUI so integration tests can drive the full
//! reducer + backend loop without a terminal.

use std::sync::{Arc, mpsc};

use log::{debug, warn};

use crate::api::ChatBackend;
use crate::core::action::{Action, Effect};

/// Performs one effect. Returns `None` for effects that have no backend
/// side (`None`, `Quit`).
pub async fn perform(backend: &dyn ChatBackend, effect: Effect) -> Option<Action> {
    let action = match effect {
        Effect::None | Effect::Quit => return None,
        Effect::SendChat {
            generation,
            request,
        } => Action::ChatReplied {
            generation,
            result: backend.send_chat(&request).await,
        },
        Effect::FetchSessions { generation } => Action::SessionsLoaded {
            generation,
            result: backend.list_sessions().await,
        },
        Effect::DeleteSession(session_id) => {
            let result = backend.delete_session(&session_id).await;
            Action::SessionDeleted { session_id, result }
        }
        Effect::FetchTranscript {
            generation,
            session_id,
        } => Action::TranscriptLoaded {
            generation,
            result: backend.load_transcript(&session_id).await,
        },
        Effect::FetchProfile { key } => Action::ProfileLoaded {
            key,
            result: backend.get_profile().await,
        },
        Effect::SaveProfile(update) => Action::ProfileSaved(backend.update_profile(&update).await),
    };
    Some(action)
}

/// Spawns `effect` on the tokio runtime and posts the resulting action to
/// `tx`. The event loop never blocks on the network.
pub fn spawn(backend: Arc<dyn ChatBackend>, effect: Effect, tx: mpsc::Sender<Action>) {
    if matches!(effect, Effect::None | Effect::Quit) {
        return;
    }
    debug!("Spawning effect: {:?}", effect);
    tokio::spawn(async move {
        if let Some(action) = perform(backend.as_ref(), effect).await
            && tx.send(action).is_err()
        {
            warn!("Failed to deliver backend result: receiver dropped");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{BackendError, ChatReply, ChatRequest, ProfileUpdate};
    use crate::core::action::update;
    use crate::test_support::{MockBackend, session, signed_in_app, test_app};

    #[tokio::test]
    async fn test_none_and_quit_do_nothing() {
        let backend = MockBackend::new();
        assert!(perform(&backend, Effect::None).await.is_none());
        assert!(perform(&backend, Effect::Quit).await.is_none());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_send_chat_carries_generation() {
        let backend = MockBackend::new();
        backend.replies.lock().unwrap().push_back(Ok(ChatReply {
            response: Some("hi".to_string()),
            session_id: Some("s1".to_string()),
        }));
        let effect = Effect::SendChat {
            generation: 7,
            request: ChatRequest {
                message: "hello".to_string(),
                session_id: None,
                attachment: None,
            },
        };
        let action = perform(&backend, effect).await.unwrap();
        assert!(matches!(
            action,
            Action::ChatReplied { generation: 7, result: Ok(_) }
        ));
        assert_eq!(backend.calls(), vec!["chat \"hello\" None".to_string()]);
    }

    #[tokio::test]
    async fn test_delete_reports_session_id() {
        let backend = MockBackend::new();
        backend.deletes.lock().unwrap().push_back(Err(BackendError::Api {
            status: 500,
            message: "x".to_string(),
        }));
        let action = perform(&backend, Effect::DeleteSession("s9".to_string()))
            .await
            .unwrap();
        let Action::SessionDeleted { session_id, result } = action else {
            panic!("expected SessionDeleted");
        };
        assert_eq!(session_id, "s9");
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_save_profile_round_trip_through_reducer() {
        let backend = MockBackend::new();
        {
            let mut profiles = backend.profiles.lock().unwrap();
            profiles.push_back(Ok(Default::default()));
            profiles.push_back(Ok(Default::default()));
        }
        let mut app = signed_in_app();
        let effect = update(
            &mut app,
            Action::SaveProfile {
                full_name: "Ada".to_string(),
                display_name: "ada".to_string(),
            },
        );
        assert_eq!(
            effect,
            Effect::SaveProfile(ProfileUpdate {
                full_name: "Ada".to_string(),
                display_name: "ada".to_string(),
            })
        );
        let saved = perform(&backend, effect).await.unwrap();
        let refetch = update(&mut app, saved);
        let loaded = perform(&backend, refetch).await.unwrap();
        update(&mut app, loaded);

        assert_eq!(
            backend.calls(),
            vec!["update \"Ada\" \"ada\"".to_string(), "profile".to_string()]
        );
        assert!(app.profile.cache.get("user-1").is_some());
        assert!(!app.is_busy());
    }

    #[tokio::test]
    async fn test_history_flow() {
        let backend = MockBackend::new();
        backend
            .sessions
            .lock()
            .unwrap()
            .push_back(Ok(vec![session("b"), session("a")]));
        let mut app = test_app();
        let effect = update(&mut app, Action::OpenHistory);
        let action = perform(&backend, effect).await.unwrap();
        update(&mut app, action);
        assert_eq!(app.history.sessions.len(), 2);
        assert_eq!(app.history.sessions[0].session_id, "b");
    }

    #[tokio::test]
    async fn test_spawn_delivers_action() {
        let backend: Arc<dyn ChatBackend> = Arc::new(MockBackend::new());
        let (tx, rx) = mpsc::channel();
        spawn(backend, Effect::FetchSessions { generation: 3 }, tx);
        let action = tokio::task::spawn_blocking(move || rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(
            action,
            Action::SessionsLoaded { generation: 3, result: Err(_) }
        ));
    }
}
