//! # Probe HTTP Client
//!
//! A thin asynchronous wrapper around `reqwest` for the controller's network
//! probes. It owns one pooled client built with a bounded timeout and a
//! product user agent, injects bearer authentication when configured, and
//! maps transport failures onto a small classified taxonomy so the monitors
//! can surface a human-readable cause without inspecting `reqwest` errors.

use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

/// Classified failure of a single probe request.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The request exceeded the configured probe timeout.
    #[error("request timed out")]
    Timeout,
    /// The backend could not be reached at the transport level.
    #[error("backend unreachable: {0}")]
    Unreachable(String),
    /// The backend answered with a non-2xx status.
    #[error("backend returned HTTP {0}")]
    Status(u16),
    /// The backend answered 2xx but the body did not match the expected schema.
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ProbeError {
    /// The human-readable failure cause surfaced through
    /// `ModeState.error_message`.
    pub fn user_message(&self) -> String {
        match self {
            ProbeError::Timeout => "Backend did not respond in time".to_string(),
            ProbeError::Unreachable(_) => "Cannot reach backend".to_string(),
            ProbeError::Status(code) => format!("Backend error (HTTP {})", code),
            ProbeError::Decode(_) => "Connection check failed".to_string(),
        }
    }
}

/// Shared probe client. One instance serves every probe kind so connection
/// pooling is reused across the monitors.
pub struct ProbeClient {
    inner: reqwest::Client,
    auth_token: Option<String>,
}

impl ProbeClient {
    /// Builds the client with the bounded per-request timeout.
    ///
    /// # Errors
    /// Returns an error if the underlying TLS/connection backend cannot be
    /// initialized.
    pub fn new(timeout: Duration, auth_token: Option<String>) -> anyhow::Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("SigDeck/0.1")
            .build()?;
        Ok(Self { inner, auth_token })
    }

    /// Issues a GET and resolves to `Ok(())` on any 2xx response.
    pub async fn get_ok(&self, url: &Url) -> Result<(), ProbeError> {
        self.send(self.inner.get(url.clone())).await.map(|_| ())
    }

    /// Issues a GET and deserializes the 2xx response body as JSON.
    pub async fn get_json<T>(&self, url: &Url) -> Result<T, ProbeError>
    where
        T: DeserializeOwned,
    {
        let response = self.send(self.inner.get(url.clone())).await?;
        response
            .json::<T>()
            .await
            .map_err(|err| ProbeError::Decode(err.to_string()))
    }

    /// Issues an empty-bodied POST and resolves to `Ok(())` on any 2xx response.
    pub async fn post_ok(&self, url: &Url) -> Result<(), ProbeError> {
        self.send(self.inner.post(url.clone())).await.map(|_| ())
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ProbeError> {
        let request = match &self.auth_token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => request,
        };

        let response = request.send().await.map_err(Self::classify)?;
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(ProbeError::Status(status.as_u16()))
        }
    }

    fn classify(err: reqwest::Error) -> ProbeError {
        if err.is_timeout() {
            ProbeError::Timeout
        } else if err.is_decode() {
            ProbeError::Decode(err.to_string())
        } else {
            ProbeError::Unreachable(err.to_string())
        }
    }
}
