//! Speech synthesis request model.

use crate::audio_format::AudioFormat;
use crate::error::InvalidRequest;
use crate::language::Language;
use serde::{Deserialize, Serialize};

/// A text-to-speech conversion request.
///
/// Wire form is exactly `{text, language, speed, format}`. The request is
/// immutable once submitted; builder-style setters cover the optional knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRequest {
    pub text: String,
    pub language: Language,
    pub speed: f32,
    pub format: AudioFormat,
}

impl ConversionRequest {
    /// Speaking-rate multiplier used when the caller does not override it.
    pub const DEFAULT_SPEED: f32 = 1.0;

    pub fn new(text: impl Into<String>, language: Language) -> Self {
        Self {
            text: text.into(),
            language,
            speed: Self::DEFAULT_SPEED,
            format: AudioFormat::default(),
        }
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_format(mut self, format: AudioFormat) -> Self {
        self.format = format;
        self
    }

    /// Fail-fast validation, performed before any network call.
    pub fn validate(&self) -> Result<(), InvalidRequest> {
        if self.text.trim().is_empty() {
            return Err(InvalidRequest::EmptyText);
        }
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(InvalidRequest::NonPositiveSpeed(self.speed));
        }
        Ok(())
    }
}
