//! Audio output backend.
//!
//! The controller drives playback through [`AudioBackend`] so its state
//! machine can be exercised without an audio device; [`RodioBackend`] is
//! the production implementation.

use bytes::Bytes;
use rodio::Source;
use std::io::Cursor;
use std::time::Duration;
use thiserror::Error;

/// Playback faults. Isolated from the pipeline's error taxonomy: an
/// unplayable-but-downloadable artifact is a valid end state.
#[derive(Debug, Clone, Error)]
pub enum PlaybackError {
    #[error("audio device unavailable: {0}")]
    Device(String),
    #[error("could not decode audio: {0}")]
    Decode(String),
    #[error("seek failed: {0}")]
    Seek(String),
    #[error("playback start rejected: {0}")]
    PlayRejected(String),
    #[error("no audio loaded")]
    NothingLoaded,
    #[error("could not fetch audio: {0}")]
    Fetch(String),
    #[error("could not save audio: {0}")]
    Save(String),
}

/// The minimal audio transport the player state machine needs.
pub trait AudioBackend {
    /// Decode and hold a fresh buffer, releasing any prior one. The
    /// backend comes up paused at position zero. Returns the decoded
    /// duration when the container reports one.
    fn load(&mut self, bytes: Bytes) -> Result<Option<Duration>, PlaybackError>;

    /// Begin or resume playback. May be rejected by the output device.
    fn play(&mut self) -> Result<(), PlaybackError>;

    fn pause(&mut self);

    fn seek(&mut self, position: Duration) -> Result<(), PlaybackError>;

    fn position(&self) -> Duration;

    /// Whether the loaded buffer has played to its end.
    fn finished(&self) -> bool;

    /// Release the held buffer.
    fn unload(&mut self);
}

/// Rodio-based output: one stream handle, one sink, one decoded buffer.
pub struct RodioBackend {
    // Kept alive for the duration of playback.
    _stream: rodio::OutputStream,
    sink: rodio::Sink,
    bytes: Option<Bytes>,
    duration: Option<Duration>,
}

impl RodioBackend {
    pub fn new() -> Result<Self, PlaybackError> {
        let stream = rodio::OutputStreamBuilder::open_default_stream()
            .map_err(|err| PlaybackError::Device(err.to_string()))?;
        let sink = rodio::Sink::connect_new(&stream.mixer());
        sink.pause();
        Ok(Self {
            _stream: stream,
            sink,
            bytes: None,
            duration: None,
        })
    }

    /// Re-queue the held buffer into the sink, paused at zero. Needed
    /// after the sink drains, since a played-out source is consumed.
    fn requeue(&mut self) -> Result<(), PlaybackError> {
        let bytes = self.bytes.clone().ok_or(PlaybackError::NothingLoaded)?;
        let source = rodio::Decoder::new(Cursor::new(bytes))
            .map_err(|err| PlaybackError::Decode(err.to_string()))?;
        self.sink.stop();
        self.sink.append(source);
        self.sink.pause();
        Ok(())
    }
}

impl AudioBackend for RodioBackend {
    fn load(&mut self, bytes: Bytes) -> Result<Option<Duration>, PlaybackError> {
        let source = rodio::Decoder::new(Cursor::new(bytes.clone()))
            .map_err(|err| PlaybackError::Decode(err.to_string()))?;
        let duration = source.total_duration();
        self.sink.stop();
        self.sink.append(source);
        self.sink.pause();
        self.bytes = Some(bytes);
        self.duration = duration;
        Ok(duration)
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        if self.bytes.is_none() {
            return Err(PlaybackError::NothingLoaded);
        }
        if self.sink.empty() {
            self.requeue()?;
        }
        self.sink.play();
        Ok(())
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn seek(&mut self, position: Duration) -> Result<(), PlaybackError> {
        if self.bytes.is_none() {
            return Err(PlaybackError::NothingLoaded);
        }
        if self.sink.empty() {
            self.requeue()?;
        }
        self.sink
            .try_seek(position)
            .map_err(|err| PlaybackError::Seek(err.to_string()))
    }

    fn position(&self) -> Duration {
        self.sink.get_pos()
    }

    fn finished(&self) -> bool {
        self.bytes.is_some() && self.sink.empty()
    }

    fn unload(&mut self) {
        self.sink.stop();
        self.bytes = None;
        self.duration = None;
    }
}
