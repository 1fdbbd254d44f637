//! Client configuration.
//!
//! The base URL is injected here and nowhere else; call sites never read
//! the environment themselves.

use crate::error::ApiError;
use reqwest::Url;

/// Environment variable consulted by [`ClientConfig::from_env`].
pub const API_URL_ENV: &str = "VOXDOC_API_URL";

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Root of the conversion service; endpoint paths are joined onto it.
    pub base_url: Url,
}

impl ClientConfig {
    pub fn new(base_url: Url) -> Self {
        Self { base_url }
    }

    /// Parse a base URL, rejecting anything reqwest cannot use as a base.
    pub fn from_url(url: &str) -> Result<Self, ApiError> {
        let base_url = Url::parse(url).map_err(|err| ApiError::Unknown {
            message: format!("invalid base URL {url:?}: {err}"),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Unknown {
                message: format!("invalid base URL {url:?}: not a base URL"),
            });
        }
        Ok(Self::new(base_url))
    }

    /// `VOXDOC_API_URL` when set, otherwise [`DEFAULT_BASE_URL`].
    pub fn from_env() -> Result<Self, ApiError> {
        match std::env::var(API_URL_ENV) {
            Ok(url) => Self::from_url(&url),
            Err(_) => Self::from_url(DEFAULT_BASE_URL),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL parses"),
        }
    }
}
