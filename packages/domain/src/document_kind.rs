//! Source document kind accepted by the extraction endpoints.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Pdf,
    Image,
}

impl DocumentKind {
    /// Path segment of the matching extraction endpoint.
    pub const fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Image => "image",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown document kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported document kind: {0} (expected pdf or image)")]
pub struct UnsupportedDocumentKind(pub String);

impl FromStr for DocumentKind {
    type Err = UnsupportedDocumentKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(DocumentKind::Pdf),
            "image" => Ok(DocumentKind::Image),
            other => Err(UnsupportedDocumentKind(other.to_string())),
        }
    }
}
