//! Audio playback bound to synthesized artifacts.

mod backend;
mod controller;

pub use backend::{AudioBackend, PlaybackError, RodioBackend};
pub use controller::{AudioPlayer, PlaybackSnapshot, PlayerPhase, format_time, save_artifact};
