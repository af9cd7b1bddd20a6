use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mailer transport failure: {detail}")]
    Transport { detail: String },
    #[error("mailer rejected the message: {detail}")]
    Rejected { detail: String },
}

/// Claim notification sent to the gift recipient.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClaimEmail {
    pub link: String,
    pub recipient_name: String,
    pub sender_address: String,
    pub email: String,
    pub subject_line: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailReceipt {
    pub message_id: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_claim_email(&self, req: &ClaimEmail) -> Result<EmailReceipt, MailError>;
}

/// HTTP adapter for the transactional email service.
///
/// Reads `MAILER_URL` (default `http://localhost:3100`) and the optional
/// `MAILER_API_KEY` bearer credential at construction time. Delivery is best
/// effort; an idempotency key is attached so a user-triggered retry does not
/// double-send.
pub struct HttpMailer {
    endpoint: String,
    api_key: Option<String>,
    http: reqwest::Client,
}

impl Default for HttpMailer {
    fn default() -> Self {
        Self::new(None)
    }
}

impl HttpMailer {
    pub fn new(endpoint: Option<String>) -> Self {
        let endpoint = endpoint
            .or_else(|| std::env::var("MAILER_URL").ok())
            .unwrap_or_else(|| "http://localhost:3100".to_string());
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: std::env::var("MAILER_API_KEY").ok(),
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send_claim_email(&self, req: &ClaimEmail) -> Result<EmailReceipt, MailError> {
        let url = format!("{}/send", self.endpoint);

        let mut request = self
            .http
            .post(&url)
            .header("idempotency-key", Uuid::new_v4().to_string())
            .json(req);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|err| MailError::Transport {
            detail: format!("mailer send: {err}"),
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!("mailer rejected claim email to {}: HTTP {status}", req.email);
            return Err(MailError::Rejected {
                detail: format!("HTTP {status}: {text}"),
            });
        }

        response.json().await.map_err(|err| MailError::Transport {
            detail: format!("mailer send parse: {err}"),
        })
    }
}
