//! Player state machine over a bound audio artifact.

use crate::api::ApiClient;
use crate::playback::backend::{AudioBackend, PlaybackError, RodioBackend};
use bytes::Bytes;
use std::path::Path;
use std::time::Duration;
use voxdoc_domain::AudioArtifact;

/// Where the player is in an artifact's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerPhase {
    Unloaded,
    Paused,
    Playing,
    Ended,
}

/// Display-oriented projection of the transport state.
///
/// Recomputed from the backend on [`AudioPlayer::refresh`]; the backend is
/// the source of truth, this is a cached view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSnapshot {
    pub is_playing: bool,
    pub current_time: Duration,
    pub duration: Option<Duration>,
    pub progress_percent: f32,
}

/// Audio playback controller bound to at most one artifact.
pub struct AudioPlayer<B: AudioBackend = RodioBackend> {
    backend: B,
    phase: PlayerPhase,
    artifact: Option<AudioArtifact>,
    duration: Option<Duration>,
}

impl AudioPlayer<RodioBackend> {
    /// Open the default audio output.
    pub fn new() -> Result<Self, PlaybackError> {
        Ok(Self::with_backend(RodioBackend::new()?))
    }
}

impl<B: AudioBackend> AudioPlayer<B> {
    pub fn with_backend(backend: B) -> Self {
        Self {
            backend,
            phase: PlayerPhase::Unloaded,
            artifact: None,
            duration: None,
        }
    }

    pub fn phase(&self) -> PlayerPhase {
        self.phase
    }

    pub fn artifact(&self) -> Option<&AudioArtifact> {
        self.artifact.as_ref()
    }

    /// Fetch an artifact's audio (authenticated) and make it the bound
    /// source. The previously held buffer is released first; binding the
    /// same artifact twice holds one buffer, not two.
    pub async fn bind(
        &mut self,
        client: &ApiClient,
        artifact: &AudioArtifact,
    ) -> Result<(), PlaybackError> {
        let bytes = client
            .fetch_audio(artifact.id.clone())
            .await
            .map_err(|err| PlaybackError::Fetch(err.message().to_string()))?;
        self.load_bytes(artifact.clone(), bytes)
    }

    /// Bind an already-fetched payload.
    pub fn load_bytes(
        &mut self,
        mut artifact: AudioArtifact,
        bytes: Bytes,
    ) -> Result<(), PlaybackError> {
        // Release before decode so a decode failure cannot leave two
        // buffers alive.
        self.backend.unload();
        self.phase = PlayerPhase::Unloaded;
        self.artifact = None;
        self.duration = None;

        let duration = self.backend.load(bytes)?;
        artifact.duration_seconds = duration.map(|d| d.as_secs_f64());
        self.duration = duration;
        self.artifact = Some(artifact);
        self.phase = PlayerPhase::Paused;
        Ok(())
    }

    /// Play when paused, pause when playing; from `Ended` this restarts.
    ///
    /// A rejection from the output device is returned for display and the
    /// phase stays `Paused`; it is never a pipeline failure.
    pub fn toggle(&mut self) -> Result<(), PlaybackError> {
        match self.phase {
            PlayerPhase::Unloaded => Err(PlaybackError::NothingLoaded),
            PlayerPhase::Playing => {
                self.backend.pause();
                self.phase = PlayerPhase::Paused;
                Ok(())
            }
            PlayerPhase::Paused => self.start_playing(),
            PlayerPhase::Ended => {
                self.backend.seek(Duration::ZERO)?;
                self.phase = PlayerPhase::Paused;
                self.start_playing()
            }
        }
    }

    fn start_playing(&mut self) -> Result<(), PlaybackError> {
        match self.backend.play() {
            Ok(()) => {
                self.phase = PlayerPhase::Playing;
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "audio output rejected play");
                Err(err)
            }
        }
    }

    /// Reset the playhead to zero and pause, from any state.
    pub fn stop(&mut self) -> Result<(), PlaybackError> {
        if self.phase == PlayerPhase::Unloaded {
            return Ok(());
        }
        self.backend.pause();
        self.backend.seek(Duration::ZERO)?;
        self.phase = PlayerPhase::Paused;
        Ok(())
    }

    /// Seek within the bound artifact.
    pub fn seek(&mut self, position: Duration) -> Result<(), PlaybackError> {
        if self.phase == PlayerPhase::Unloaded {
            return Err(PlaybackError::NothingLoaded);
        }
        self.backend.seek(position)?;
        if self.phase == PlayerPhase::Ended {
            self.phase = PlayerPhase::Paused;
        }
        Ok(())
    }

    /// Recompute the cached projection from the backend, detecting the
    /// end of playback.
    pub fn refresh(&mut self) -> PlaybackSnapshot {
        if self.phase == PlayerPhase::Playing && self.backend.finished() {
            self.phase = PlayerPhase::Ended;
        }

        let current_time = match self.phase {
            PlayerPhase::Unloaded => Duration::ZERO,
            PlayerPhase::Ended => self.duration.unwrap_or_else(|| self.backend.position()),
            _ => self.backend.position(),
        };
        let progress_percent = match self.duration {
            Some(total) if !total.is_zero() => {
                ((current_time.as_secs_f64() / total.as_secs_f64()) * 100.0).clamp(0.0, 100.0)
                    as f32
            }
            _ => 0.0,
        };

        PlaybackSnapshot {
            is_playing: self.phase == PlayerPhase::Playing,
            current_time,
            duration: self.duration,
            progress_percent,
        }
    }

    /// Save the artifact's audio to disk (authenticated fetch).
    /// Independent of the playback phase, which it never alters.
    pub async fn download(
        &self,
        client: &ApiClient,
        artifact: &AudioArtifact,
        path: &Path,
    ) -> Result<u64, PlaybackError> {
        save_artifact(client, artifact, path).await
    }

    /// Release the bound artifact and its buffer.
    pub fn unbind(&mut self) {
        self.backend.unload();
        self.artifact = None;
        self.duration = None;
        self.phase = PlayerPhase::Unloaded;
    }
}

impl<B: AudioBackend> Drop for AudioPlayer<B> {
    fn drop(&mut self) {
        self.backend.unload();
    }
}

/// Fetch an artifact's audio and write it to `path`.
pub async fn save_artifact(
    client: &ApiClient,
    artifact: &AudioArtifact,
    path: &Path,
) -> Result<u64, PlaybackError> {
    let bytes = client
        .fetch_audio(artifact.id.clone())
        .await
        .map_err(|err| PlaybackError::Fetch(err.message().to_string()))?;
    tokio::fs::write(path, &bytes)
        .await
        .map_err(|err| PlaybackError::Save(err.to_string()))?;
    Ok(bytes.len() as u64)
}

/// Render a playhead time as `M:SS` for display.
pub fn format_time(time: Duration) -> String {
    let total = time.as_secs();
    format!("{}:{:02}", total / 60, total % 60)
}
