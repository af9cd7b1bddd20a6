use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Error)]
pub enum AssistError {
    #[error("assist service is not configured")]
    Unavailable,
    #[error("assist transport failure: {detail}")]
    Transport { detail: String },
    #[error("assist request failed: {detail}")]
    Failed { detail: String },
}

#[async_trait]
pub trait MessageAssist: Send + Sync {
    /// Turn a user prompt into a short gift message.
    async fn generate(&self, prompt: &str) -> Result<String, AssistError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    text: Option<String>,
}

/// HTTP adapter for the generative-text service.
///
/// The feature is optional: `from_env` yields `None` when `ASSIST_API_KEY`
/// is absent, and callers report the service as unavailable without making
/// any request.
pub struct HttpAssist {
    endpoint: String,
    api_key: String,
    model: String,
    http: reqwest::Client,
}

impl HttpAssist {
    pub fn new(endpoint: String, api_key: String, model: String) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            model,
            http: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("ASSIST_API_KEY").ok()?;
        let endpoint = std::env::var("ASSIST_API_URL")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1".to_string());
        let model = std::env::var("ASSIST_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Some(Self::new(endpoint, api_key, model))
    }
}

#[async_trait]
impl MessageAssist for HttpAssist {
    async fn generate(&self, prompt: &str) -> Result<String, AssistError> {
        let url = format!("{}/generate", self.endpoint);
        let body = GenerateRequest {
            model: self.model.clone(),
            prompt: format!("Generate a short gift message based on this prompt: {prompt}"),
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| AssistError::Transport {
                detail: format!("assist generate: {err}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!("assist generation failed with HTTP {status}");
            return Err(AssistError::Failed {
                detail: format!("HTTP {status}: {text}"),
            });
        }

        let body: GenerateResponse = response.json().await.map_err(|err| AssistError::Transport {
            detail: format!("assist generate parse: {err}"),
        })?;

        // A completion with no text is an empty message, not an error.
        Ok(body.text.unwrap_or_default())
    }
}
