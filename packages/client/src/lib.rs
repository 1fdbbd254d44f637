//! # Voxdoc Client
//!
//! Client for a document & text to speech conversion service.
//!
//! The crate is organized around three concerns:
//! - [`api`]: the transport client and the typed endpoint catalog,
//! - [`pipeline`]: the conversion state machine that sequences
//!   extraction, summarization, and synthesis,
//! - [`playback`]: the audio transport bound to a synthesized artifact.
//!
//! ```no_run
//! use voxdoc_client::api::ApiClient;
//! use voxdoc_client::config::ClientConfig;
//! use voxdoc_client::pipeline::{ConversionPipeline, SpeechOptions};
//! use voxdoc_client::session::SessionStore;
//! use std::sync::Arc;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let session = SessionStore::default();
//! let client = Arc::new(ApiClient::new(ClientConfig::from_env()?, session));
//! client.login("ada", "hunter2").await?;
//!
//! let pipeline = ConversionPipeline::new(Arc::clone(&client));
//! pipeline.set_text("Hello world");
//! pipeline.convert_text(SpeechOptions::default());
//!
//! let mut state = pipeline.subscribe();
//! let settled = state.wait_for(|s| !s.is_busy()).await?.clone();
//! println!("{settled:?}");
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod playback;
pub mod session;

pub use api::ApiClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use pipeline::{ConversionPipeline, PipelineState, SpeechOptions, StageClass};
pub use playback::{AudioPlayer, PlaybackError, PlaybackSnapshot, PlayerPhase};
pub use session::SessionStore;
