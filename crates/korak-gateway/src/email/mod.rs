//! Outbound email: the sender seam, the Resend HTTP client and templates.

pub mod resend;
pub mod template;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

pub use resend::ResendClient;

/// A fully rendered message ready for the provider.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OutboundEmail {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Provider-reported send failure. Serialized as-is into the webhook's
/// `{"error": ...}` body.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Error)]
#[error("{name}: {message}")]
pub struct EmailError {
    pub name: String,
    pub message: String,
    #[serde(rename = "statusCode", skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl EmailError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            status_code: None,
        }
    }
}

/// Email delivery seam. Implementations run one attempt, no retries.
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Returns the provider's success payload (e.g. `{"id": "..."}`).
    async fn send(&self, email: &OutboundEmail) -> std::result::Result<serde_json::Value, EmailError>;
}
