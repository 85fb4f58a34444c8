//! reqwest implementation of [`ChatBackend`].
//!
//! One `HttpBackend` is built at startup from the resolved base URL and the
//! credentials, then shared (behind an `Arc`) by every spawned request.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use super::backend::{BackendError, ChatBackend};
use super::types::{ChatBody, ChatReply, ChatRequest, ChatSession, Message, Profile, ProfileUpdate};
use crate::core::auth::Credentials;

pub struct HttpBackend {
    base_url: Url,
    credentials: Credentials,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(
        base_url: &str,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self, BackendError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| BackendError::Config(format!("invalid API URL {base_url:?}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(BackendError::Config(format!(
                "API URL {base_url} cannot carry a path"
            )));
        }
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Config(e.to_string()))?;

        Ok(Self {
            base_url,
            credentials,
            client,
        })
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, BackendError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::Config(format!("API URL {} cannot carry a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Attaches the bearer token if there is one; otherwise the request goes
    /// out without an `Authorization` header.
    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.credentials.bearer() {
            Some(value) => builder.header(reqwest::header::AUTHORIZATION, value),
            None => builder,
        }
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response, BackendError> {
        let response = self
            .authorize(builder)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status();
        debug!("Backend response status: {}", status);
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown error".to_string());
        warn!("Backend error: {} - {}", status.as_u16(), message);
        Err(BackendError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
        let body = response
            .bytes()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| BackendError::Decode(e.to_string()))
    }

    async fn chat_builder(&self, request: &ChatRequest) -> Result<RequestBuilder, BackendError> {
        let url = self.endpoint(&["chat"])?;

        let Some(attachment) = &request.attachment else {
            let body = ChatBody {
                message: &request.message,
                session_id: request.session_id.as_deref(),
            };
            return Ok(self.client.post(url).json(&body));
        };

        let bytes = tokio::fs::read(&attachment.path).await.map_err(|e| {
            BackendError::Attachment(format!("{}: {e}", attachment.path.display()))
        })?;
        debug!(
            "Attaching {} ({} bytes)",
            attachment.file_name,
            bytes.len()
        );

        let mut form = Form::new().text("message", request.message.clone());
        if let Some(id) = &request.session_id {
            form = form.text("session_id", id.clone());
        }
        form = form.part("file", Part::bytes(bytes).file_name(attachment.file_name.clone()));

        Ok(self.client.post(url).multipart(form))
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatReply, BackendError> {
        info!(
            "POST /chat: session={:?}, message_len={}, attachment={:?}",
            request.session_id,
            request.message.len(),
            request.attachment.as_ref().map(|a| a.file_name.as_str())
        );
        let builder = self.chat_builder(request).await?;
        let response = self.execute(builder).await?;
        Self::decode(response).await
    }

    async fn list_sessions(&self) -> Result<Vec<ChatSession>, BackendError> {
        info!("GET /sessions");
        let url = self.endpoint(&["sessions"])?;
        let response = self.execute(self.client.get(url)).await?;
        Self::decode(response).await
    }

    async fn load_transcript(&self, session_id: &str) -> Result<Vec<Message>, BackendError> {
        info!("GET /sessions/{}", session_id);
        let url = self.endpoint(&["sessions", session_id])?;
        let response = self.execute(self.client.get(url)).await?;
        Self::decode(response).await
    }

    async fn delete_session(&self, session_id: &str) -> Result<(), BackendError> {
        info!("DELETE /sessions/{}", session_id);
        let url = self.endpoint(&["sessions", session_id])?;
        self.execute(self.client.delete(url)).await?;
        Ok(())
    }

    async fn get_profile(&self) -> Result<Profile, BackendError> {
        info!("GET /profile");
        let url = self.endpoint(&["profile"])?;
        let response = self.execute(self.client.get(url)).await?;
        Self::decode(response).await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<Profile, BackendError> {
        info!("PUT /profile");
        let url = self.endpoint(&["profile"])?;
        let response = self.execute(self.client.put(url).json(update)).await?;
        Self::decode(response).await
    }
}
