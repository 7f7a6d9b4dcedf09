//! Resend HTTP API client (`POST /emails`).

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use korak_core::error::{KorakError, Result};

use super::{EmailError, EmailSender, OutboundEmail};
use crate::config::EmailSection;

pub struct ResendClient {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
}

/// Error body returned by the provider on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ProviderError {
    name: Option<String>,
    message: Option<String>,
    #[serde(rename = "statusCode")]
    status_code: Option<u16>,
}

impl ResendClient {
    pub fn new(cfg: &EmailSection, api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .map_err(|e| KorakError::Internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: cfg.api_base.clone(),
            api_key,
        })
    }

    /// Build a client with the API key read from `cfg.api_key_env`.
    pub fn from_env(cfg: &EmailSection) -> Result<Self> {
        let key = std::env::var(&cfg.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| KorakError::Config(format!("{} is not set", cfg.api_key_env)))?;
        Self::new(cfg, key)
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl EmailSender for ResendClient {
    async fn send(&self, email: &OutboundEmail) -> std::result::Result<serde_json::Value, EmailError> {
        let response = self
            .client
            .post(self.api_url("/emails"))
            .bearer_auth(&self.api_key)
            .json(email)
            .send()
            .await
            .map_err(|e| EmailError::new("transport_error", e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| EmailError::new("transport_error", format!("read response body: {e}")))?;

        if status.is_success() {
            if body.is_empty() {
                return Ok(serde_json::json!({}));
            }
            return serde_json::from_slice(&body)
                .map_err(|e| EmailError::new("invalid_response", format!("provider returned invalid json: {e}")));
        }

        let parsed: Option<ProviderError> = serde_json::from_slice(&body).ok();
        let (name, message, code) = match parsed {
            Some(p) => (p.name, p.message, p.status_code),
            None => (None, None, None),
        };
        Err(EmailError {
            name: name.unwrap_or_else(|| "http_error".into()),
            message: message.unwrap_or_else(|| {
                let raw = String::from_utf8_lossy(&body).trim().to_string();
                if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                }
            }),
            status_code: Some(code.unwrap_or(status.as_u16())),
        })
    }
}
