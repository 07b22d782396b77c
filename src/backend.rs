//! Outbound adapter for the tutoring backend.
//!
//! The backend exposes two calls, session start and message, with JSON
//! shapes it controls (see `crate::models::backend`). The adapter is a
//! trait so handlers and tests can inject their own implementation.

use async_trait::async_trait;
use http::StatusCode;
use thiserror::Error;

use crate::models::backend::{
    SessionStart, StartSessionRequest, TeacherMessageRequest, TeacherReply,
};
use crate::prompt::LessonConfig;

/// Failure modes of a backend call. Handlers convert every variant into the
/// user-facing fallback phrase; nothing here reaches the caller raw.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// The two calls the bridge makes against the tutoring backend.
#[async_trait]
pub trait TeacherApi: Send + Sync {
    /// Open a tutoring session for the given lesson configuration.
    async fn start_session(&self, cfg: &LessonConfig) -> Result<SessionStart, BackendError>;

    /// Relay a student message into an existing session.
    async fn send_message(
        &self,
        session_id: &str,
        message: &str,
    ) -> Result<TeacherReply, BackendError>;
}

/// reqwest-backed implementation speaking to a configured base URL.
pub struct HttpTeacherApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTeacherApi {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn expect_status(
        resp: reqwest::Response,
        expected: StatusCode,
    ) -> Result<reqwest::Response, BackendError> {
        let status = resp.status();
        if status != expected {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %body, "unexpected backend status");
            return Err(BackendError::Status { status, body });
        }
        Ok(resp)
    }
}

#[async_trait]
impl TeacherApi for HttpTeacherApi {
    async fn start_session(&self, cfg: &LessonConfig) -> Result<SessionStart, BackendError> {
        let url = format!("{}/api/v1/teacher/start", self.base_url);
        let payload = StartSessionRequest::from(cfg);
        tracing::debug!(subject = %payload.subject, lesson = %payload.lesson, "starting backend session");

        let resp = self.http.post(&url).json(&payload).send().await?;
        // The backend signals session creation with 201, not 200.
        let resp = Self::expect_status(resp, StatusCode::CREATED).await?;
        let start = resp.json::<SessionStart>().await?;
        tracing::info!(session_id = %start.session_id, "backend session started");
        Ok(start)
    }

    async fn send_message(
        &self,
        session_id: &str,
        message: &str,
    ) -> Result<TeacherReply, BackendError> {
        let url = format!("{}/api/v1/teacher/message", self.base_url);
        let payload = TeacherMessageRequest {
            session_id: session_id.to_string(),
            message: message.to_string(),
        };
        tracing::debug!(%session_id, len = message.len(), "relaying message to backend");

        let resp = self.http.post(&url).json(&payload).send().await?;
        let resp = Self::expect_status(resp, StatusCode::OK).await?;
        Ok(resp.json::<TeacherReply>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_normalized() {
        let api = HttpTeacherApi::new(reqwest::Client::new(), "http://backend.test///");
        assert_eq!(api.base_url(), "http://backend.test");
    }
}
