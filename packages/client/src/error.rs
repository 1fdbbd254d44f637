//! Transport error type and failure classification.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use voxdoc_domain::{ErrorKind, InvalidRequest};

/// A failed service operation, classified per the recovery taxonomy.
///
/// The embedded message is the service's own `detail` text when the
/// response carried one; it is surfaced verbatim to the user.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation { message: String },
    #[error("{message}")]
    Unauthorized { message: String },
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("network unavailable: {message}")]
    Network { message: String },
    #[error("{message}")]
    Unknown { message: String },
}

/// Structured error body returned by the service on failure.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<String>,
    message: Option<String>,
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Validation { .. } => ErrorKind::Validation,
            ApiError::Unauthorized { .. } => ErrorKind::Unauthorized,
            ApiError::Server { .. } => ErrorKind::Server,
            ApiError::Network { .. } => ErrorKind::Network,
            ApiError::Unknown { .. } => ErrorKind::Unknown,
        }
    }

    /// The user-facing message, without any classification prefix.
    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation { message }
            | ApiError::Unauthorized { message }
            | ApiError::Server { message, .. }
            | ApiError::Network { message }
            | ApiError::Unknown { message } => message,
        }
    }

    /// Classify a non-success response from its status and raw body.
    pub(crate) fn classify(status: StatusCode, body: &str) -> Self {
        let detail = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|parsed| parsed.detail.or(parsed.message))
            .filter(|message| !message.trim().is_empty());

        if status == StatusCode::UNAUTHORIZED {
            return ApiError::Unauthorized {
                message: detail.unwrap_or_else(|| "session expired, please sign in again".into()),
            };
        }
        if status.is_client_error() {
            return ApiError::Validation {
                message: detail.unwrap_or_else(|| format!("request rejected (HTTP {status})")),
            };
        }
        if status.is_server_error() {
            return ApiError::Server {
                status: status.as_u16(),
                message: detail.unwrap_or_else(|| "the service failed to process the request".into()),
            };
        }
        ApiError::Unknown {
            message: detail.unwrap_or_else(|| format!("unexpected response (HTTP {status})")),
        }
    }

    /// A request that failed before it was sent.
    pub(crate) fn transport(err: reqwest::Error) -> Self {
        ApiError::Network {
            message: err.to_string(),
        }
    }

    /// A success response whose body could not be decoded.
    pub(crate) fn bad_body(err: impl std::fmt::Display) -> Self {
        ApiError::Unknown {
            message: format!("could not decode service response: {err}"),
        }
    }

    /// A request body that could not be encoded.
    pub(crate) fn encode(err: impl std::fmt::Display) -> Self {
        ApiError::Unknown {
            message: format!("could not encode request body: {err}"),
        }
    }
}

impl From<InvalidRequest> for ApiError {
    fn from(err: InvalidRequest) -> Self {
        ApiError::Validation {
            message: err.to_string(),
        }
    }
}
