//! Summarization request and result models.

use crate::error::InvalidRequest;
use crate::language::Language;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How condensed the requested summary should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryKind {
    Brief,
    Detailed,
    BulletPoints,
}

impl SummaryKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SummaryKind::Brief => "brief",
            SummaryKind::Detailed => "detailed",
            SummaryKind::BulletPoints => "bullet_points",
        }
    }
}

impl Default for SummaryKind {
    fn default() -> Self {
        SummaryKind::Brief
    }
}

impl fmt::Display for SummaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unknown summary kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported summary kind: {0} (expected brief, detailed, or bullet_points)")]
pub struct UnsupportedSummaryKind(pub String);

impl FromStr for SummaryKind {
    type Err = UnsupportedSummaryKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "brief" => Ok(SummaryKind::Brief),
            "detailed" => Ok(SummaryKind::Detailed),
            "bullet_points" => Ok(SummaryKind::BulletPoints),
            other => Err(UnsupportedSummaryKind(other.to_string())),
        }
    }
}

/// A summarization request; wire form `{text, language, summary_type}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRequest {
    pub text: String,
    pub language: Language,
    #[serde(rename = "summary_type")]
    pub kind: SummaryKind,
}

impl SummaryRequest {
    pub fn new(text: impl Into<String>, language: Language, kind: SummaryKind) -> Self {
        Self {
            text: text.into(),
            language,
            kind,
        }
    }

    /// Fail-fast validation, performed before any network call.
    pub fn validate(&self) -> Result<(), InvalidRequest> {
        if self.text.trim().is_empty() {
            return Err(InvalidRequest::EmptyText);
        }
        Ok(())
    }
}

/// A settled summary, derived from the service reply.
///
/// Lengths are character counts computed client-side; the result is not
/// persisted anywhere, it only feeds an explicit "convert summary" action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResult {
    pub summary_text: String,
    pub original_length: usize,
    pub summary_length: usize,
    pub kind: SummaryKind,
    pub language: Language,
}

impl SummaryResult {
    pub fn new(
        original: &str,
        summary_text: String,
        kind: SummaryKind,
        language: Language,
    ) -> Self {
        Self {
            original_length: original.chars().count(),
            summary_length: summary_text.chars().count(),
            summary_text,
            kind,
            language,
        }
    }
}
