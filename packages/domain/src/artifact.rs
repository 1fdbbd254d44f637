//! Server-produced audio artifact reference.

use crate::audio_format::AudioFormat;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque server-assigned identifier for a produced audio resource.
///
/// Treated as text client-side; the wire form may be a JSON string or a
/// bare integer, both are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ArtifactId(pub String);

impl<'de> Deserialize<'de> for ArtifactId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct IdVisitor;

        impl serde::de::Visitor<'_> for IdVisitor {
            type Value = ArtifactId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or integer identifier")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(ArtifactId(v.to_string()))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(ArtifactId(v.to_string()))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(ArtifactId(v.to_string()))
            }
        }

        deserializer.deserialize_any(IdVisitor)
    }
}

impl ArtifactId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ArtifactId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ArtifactId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Reference to a synthesized audio resource held by the service.
///
/// The binary payload is fetched lazily by the playback controller; the
/// duration is only known once decoder metadata has been read.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioArtifact {
    pub id: ArtifactId,
    pub mime_type: &'static str,
    pub duration_seconds: Option<f64>,
}

impl AudioArtifact {
    pub fn new(id: impl Into<ArtifactId>, format: AudioFormat) -> Self {
        Self {
            id: id.into(),
            mime_type: format.mime_type(),
            duration_seconds: None,
        }
    }
}
