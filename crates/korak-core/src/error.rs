//! Shared error type across korak crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed request.
    BadRequest,
    /// Invalid or unreadable configuration.
    Config,
    /// Metric definition or usage error (programmer error).
    Metrics,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::Config => "CONFIG",
            ClientCode::Metrics => "METRICS",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, KorakError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum KorakError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("config: {0}")]
    Config(String),
    #[error("invalid metric: {0}")]
    InvalidMetric(String),
    #[error("metric {name} is registered as a {found}, not a {expected}")]
    MetricKind {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("label mismatch on {metric}: expected {expected:?}, found {found:?}")]
    LabelMismatch {
        metric: String,
        expected: Vec<String>,
        found: Vec<String>,
    },
    #[error("internal: {0}")]
    Internal(String),
}

impl KorakError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            KorakError::BadRequest(_) => ClientCode::BadRequest,
            KorakError::Config(_) => ClientCode::Config,
            KorakError::InvalidMetric(_)
            | KorakError::MetricKind { .. }
            | KorakError::LabelMismatch { .. } => ClientCode::Metrics,
            KorakError::Internal(_) => ClientCode::Internal,
        }
    }
}
