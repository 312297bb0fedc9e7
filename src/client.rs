//! HTTP client for the portal API.
//!
//! Every action is a single JSON POST with no retry. Non-success responses
//! are expected to carry `{"detail": "..."}`; callers decide what fallback
//! text to show when it is missing.

use anyhow::Result;
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::Config;
use crate::logging;
use crate::models::{ActionRequest, ChatRequest, CompletionResponse, ErrorBody, HealthResponse};

// === Errors ===

/// Failure of a single portal request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-success status.
    #[error("HTTP {status}: {}", detail.as_deref().unwrap_or("no detail"))]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },
    /// The request never produced a response.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    /// The response body was not the JSON we expected.
    #[error("{0}")]
    Decode(String),
}

impl ApiError {
    /// Human-readable reason shown after the `Erro: ` prefix.
    #[must_use]
    pub fn reason(&self, fallback: &str) -> String {
        match self {
            ApiError::Status {
                detail: Some(detail),
                ..
            } => detail.clone(),
            ApiError::Status { detail: None, .. } => fallback.to_string(),
            ApiError::Transport(err) => err.to_string(),
            ApiError::Decode(message) => message.clone(),
        }
    }
}

// === PortalClient ===

/// Client for the portal's `/api/*` endpoints.
#[derive(Clone)]
#[must_use]
pub struct PortalClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl PortalClient {
    /// Create a client for the base URL resolved from config.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_base_url(config.base_url())
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        logging::info(format!("Portal base URL: {base_url}"));

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send the whole transcript to `/api/chat`.
    pub async fn chat(&self, request: &ChatRequest) -> Result<CompletionResponse, ApiError> {
        self.post_json("/api/chat", request).await
    }

    /// Run one of the four panel actions.
    pub async fn run_action(
        &self,
        request: &ActionRequest,
    ) -> Result<CompletionResponse, ApiError> {
        self.post_json(request.path(), request).await
    }

    /// Query the backend health endpoint.
    pub async fn health(&self) -> Result<HealthResponse, ApiError> {
        let url = format!("{}/health", self.base_url);
        let response = self.http_client.get(&url).send().await?;
        read_response(response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "sending portal request");

        let response = self.http_client.post(&url).json(body).send().await?;
        read_response(response).await
    }
}

// === Response Helpers ===

async fn read_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        let detail = serde_json::from_slice::<ErrorBody>(&bytes)
            .ok()
            .and_then(|body| body.detail_message());
        logging::warn(format!(
            "Portal request failed: HTTP {} ({})",
            status.as_u16(),
            detail.as_deref().unwrap_or("no detail")
        ));
        return Err(ApiError::Status { status, detail });
    }

    serde_json::from_slice::<T>(&bytes)
        .map_err(|err| ApiError::Decode(format!("Resposta inválida do servidor: {err}")))
}
