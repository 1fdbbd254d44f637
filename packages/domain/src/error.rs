//! Error taxonomy shared across the client.
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Classification of a failed operation, independent of the transport.
///
/// `Validation` and `Unauthorized` are recoverable by the user (correct the
/// input, re-authenticate); `Server` and `Network` are transient and may be
/// retried manually. Nothing retries automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Bad or missing input, including 4xx service rejections.
    Validation,
    /// Session expired or missing (401).
    Unauthorized,
    /// The service failed (5xx).
    Server,
    /// The request never reached the service.
    Network,
    /// Anything that could not be classified.
    Unknown,
}

impl ErrorKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Server => "server",
            ErrorKind::Network => "network",
            ErrorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request rejected client-side, before any network call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidRequest {
    #[error("text must not be empty")]
    EmptyText,
    #[error("speed must be a positive ratio, got {0}")]
    NonPositiveSpeed(f32),
    #[error("no summary available to convert")]
    MissingSummary,
}
