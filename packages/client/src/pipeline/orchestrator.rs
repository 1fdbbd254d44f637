//! The conversion pipeline orchestrator.
//!
//! Sequences extraction, summarization, and synthesis against the service
//! and publishes a single authoritative [`PipelineState`]. Operations are
//! fire-and-forget: they spawn their network work and return immediately;
//! callers observe settlement through the watch channel.

use crate::api::ApiClient;
use crate::api::endpoints::extract::UploadSource;
use crate::error::ApiError;
use crate::pipeline::progress::ProgressTicker;
use crate::pipeline::stages;
use crate::pipeline::state::{PipelineState, StageClass};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::watch;
use voxdoc_domain::{
    AudioArtifact, AudioFormat, ConversionRequest, DocumentKind, InvalidRequest, Language,
    SummaryKind, SummaryRequest, SummaryResult,
};

/// Synthesis knobs forwarded to the service unmodified.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeechOptions {
    pub language: Language,
    pub speed: f32,
    pub format: AudioFormat,
}

impl Default for SpeechOptions {
    fn default() -> Self {
        Self {
            language: Language::default(),
            speed: ConversionRequest::DEFAULT_SPEED,
            format: AudioFormat::default(),
        }
    }
}

impl SpeechOptions {
    fn request(self, text: String) -> ConversionRequest {
        ConversionRequest {
            text,
            language: self.language,
            speed: self.speed,
            format: self.format,
        }
    }
}

/// State shared between the pipeline handle, its spawned stage tasks, and
/// the progress tickers.
pub(crate) struct PipelineShared {
    state_tx: watch::Sender<PipelineState>,
    buffer: Mutex<String>,
    summary: Mutex<Option<SummaryResult>>,
    /// Monotonic request counter per stage class. A settled result is
    /// applied only while its generation is still the latest, which is how
    /// late responses from superseded requests get discarded.
    generations: [AtomicU64; StageClass::COUNT],
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl PipelineShared {
    fn new() -> Self {
        let (state_tx, _) = watch::channel(PipelineState::Idle);
        Self {
            state_tx,
            buffer: Mutex::new(String::new()),
            summary: Mutex::new(None),
            generations: [AtomicU64::new(0), AtomicU64::new(0), AtomicU64::new(0)],
        }
    }

    fn state(&self) -> PipelineState {
        self.state_tx.borrow().clone()
    }

    /// Claim the pipeline for one request of `class`.
    ///
    /// Returns the request's generation, or `None` when another request is
    /// in flight (the single-flight rule: the trigger is simply ignored).
    fn begin(&self, class: StageClass) -> Option<u64> {
        let mut started = None;
        self.state_tx.send_if_modified(|state| {
            if state.is_busy() {
                return false;
            }
            let generation = self.generations[class.index()].fetch_add(1, Ordering::SeqCst) + 1;
            started = Some(generation);
            *state = PipelineState::in_flight(class, 0);
            true
        });
        started
    }

    pub(crate) fn is_current(&self, class: StageClass, generation: u64) -> bool {
        self.generations[class.index()].load(Ordering::SeqCst) == generation
    }

    /// Raise the displayed progress of an in-flight stage. Never regresses
    /// and never touches a settled state.
    pub(crate) fn bump_progress(&self, class: StageClass, generation: u64, checkpoint: u8) {
        if !self.is_current(class, generation) {
            return;
        }
        self.state_tx.send_if_modified(|state| {
            if state.in_flight_class() != Some(class) {
                return false;
            }
            if state.progress().is_some_and(|current| current < checkpoint) {
                *state = PipelineState::in_flight(class, checkpoint);
                return true;
            }
            false
        });
    }

    /// Fail without consuming the single-flight slot (client-side
    /// validation, performed before any network call). Returns whether the
    /// failure was recorded; a busy pipeline ignores the trigger instead.
    fn fail_fast(&self, error: ApiError) -> bool {
        self.state_tx.send_if_modified(|state| {
            if state.is_busy() {
                return false;
            }
            *state = PipelineState::Failed {
                kind: error.kind(),
                message: error.message().to_string(),
            };
            true
        })
    }

    /// Apply a settled request's outcome, unless the request has been
    /// superseded. The generation check runs inside the send so a
    /// concurrent `reset` cannot slip between check and apply.
    fn apply_if_current(
        &self,
        class: StageClass,
        generation: u64,
        apply: impl FnOnce(&mut PipelineState),
    ) -> bool {
        self.state_tx.send_if_modified(|state| {
            if !self.is_current(class, generation) {
                tracing::debug!(
                    stage = class.as_str(),
                    generation,
                    "discarding result of superseded request"
                );
                return false;
            }
            apply(state);
            true
        })
    }

    fn fail(&self, class: StageClass, generation: u64, error: &ApiError) {
        let applied = self.apply_if_current(class, generation, |state| {
            *state = PipelineState::Failed {
                kind: error.kind(),
                message: error.message().to_string(),
            };
        });
        if applied {
            tracing::info!(stage = class.as_str(), error = %error, "stage failed");
        }
    }

    fn settle_extraction(&self, generation: u64, result: Result<String, ApiError>) {
        match result {
            Ok(text) => {
                self.bump_progress(StageClass::Extraction, generation, 100);
                let applied = self.apply_if_current(StageClass::Extraction, generation, |state| {
                    // Fresh extraction replaces the buffer and invalidates
                    // any summary or audio derived from the old content.
                    *lock(&self.buffer) = text;
                    *lock(&self.summary) = None;
                    *state = PipelineState::Idle;
                });
                if applied {
                    tracing::info!("extraction complete, text buffer replaced");
                }
            }
            Err(error) => self.fail(StageClass::Extraction, generation, &error),
        }
    }

    fn settle_summarization(&self, generation: u64, result: Result<SummaryResult, ApiError>) {
        match result {
            Ok(summary) => {
                self.bump_progress(StageClass::Summarization, generation, 100);
                let (original, condensed) = (summary.original_length, summary.summary_length);
                let applied =
                    self.apply_if_current(StageClass::Summarization, generation, |state| {
                        *lock(&self.summary) = Some(summary);
                        *state = PipelineState::Idle;
                    });
                if applied {
                    tracing::info!(original, condensed, "summary ready");
                }
            }
            Err(error) => self.fail(StageClass::Summarization, generation, &error),
        }
    }

    fn settle_synthesis(&self, generation: u64, result: Result<AudioArtifact, ApiError>) {
        match result {
            Ok(artifact) => {
                self.bump_progress(StageClass::Synthesis, generation, 100);
                let id = artifact.id.clone();
                let applied = self.apply_if_current(StageClass::Synthesis, generation, |state| {
                    *state = PipelineState::Ready(artifact);
                });
                if applied {
                    tracing::info!(%id, "synthesis complete");
                }
            }
            Err(error) => self.fail(StageClass::Synthesis, generation, &error),
        }
    }

    fn reset(&self) {
        // Invalidate every outstanding request before going Idle so late
        // responses cannot resurrect a superseded state.
        for generation in &self.generations {
            generation.fetch_add(1, Ordering::SeqCst);
        }
        self.state_tx.send_replace(PipelineState::Idle);
    }
}

/// Handle driving the conversion pipeline.
///
/// Cheap to clone; all clones share the same state machine.
#[derive(Clone)]
pub struct ConversionPipeline {
    client: Arc<ApiClient>,
    shared: Arc<PipelineShared>,
}

impl ConversionPipeline {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            shared: Arc::new(PipelineShared::new()),
        }
    }

    /// Observe state transitions. The receiver always holds the latest
    /// state; intermediate cosmetic progress values may be coalesced.
    pub fn subscribe(&self) -> watch::Receiver<PipelineState> {
        self.shared.state_tx.subscribe()
    }

    pub fn state(&self) -> PipelineState {
        self.shared.state()
    }

    /// Current content of the editable text buffer.
    pub fn text(&self) -> String {
        lock(&self.shared.buffer).clone()
    }

    /// Replace the text buffer (a user edit). In-flight work is not
    /// cancelled; its result still applies unless superseded.
    pub fn set_text(&self, text: impl Into<String>) {
        *lock(&self.shared.buffer) = text.into();
    }

    /// The last settled summary, if the buffer has not been replaced since.
    pub fn summary(&self) -> Option<SummaryResult> {
        lock(&self.shared.summary).clone()
    }

    /// Return to `Idle` from any state. Outstanding requests keep running
    /// but their results are discarded on arrival.
    pub fn reset(&self) {
        self.shared.reset();
    }

    /// Upload a document and replace the text buffer with its text.
    ///
    /// Returns `false` when the trigger was ignored because another
    /// request is in flight.
    pub fn extract_file(&self, source: UploadSource, language: Language, kind: DocumentKind) -> bool {
        let Some(generation) = self.shared.begin(StageClass::Extraction) else {
            tracing::debug!("pipeline busy, extraction request ignored");
            return false;
        };
        let client = Arc::clone(&self.client);
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            let _ticker =
                ProgressTicker::start(Arc::clone(&shared), StageClass::Extraction, generation);
            let result = stages::extract(&client, source, language, kind).await;
            shared.settle_extraction(generation, result);
        });
        true
    }

    /// Summarize the text buffer. The summary lands in its own slot;
    /// converting it is a separate, explicit action.
    pub fn summarize(&self, kind: SummaryKind, language: Language) -> bool {
        let request = SummaryRequest::new(self.text(), language, kind);
        if let Err(invalid) = request.validate() {
            return self.shared.fail_fast(invalid.into());
        }
        let Some(generation) = self.shared.begin(StageClass::Summarization) else {
            tracing::debug!("pipeline busy, summarize request ignored");
            return false;
        };
        let client = Arc::clone(&self.client);
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            let _ticker =
                ProgressTicker::start(Arc::clone(&shared), StageClass::Summarization, generation);
            let result = stages::summarize(&client, request).await;
            shared.settle_summarization(generation, result);
        });
        true
    }

    /// Synthesize speech from the text buffer.
    pub fn convert_text(&self, options: SpeechOptions) -> bool {
        self.start_synthesis(options.request(self.text()))
    }

    /// Synthesize speech from the last summary.
    pub fn convert_summary(&self, options: SpeechOptions) -> bool {
        let Some(summary) = self.summary() else {
            return self.shared.fail_fast(InvalidRequest::MissingSummary.into());
        };
        self.start_synthesis(options.request(summary.summary_text))
    }

    fn start_synthesis(&self, request: ConversionRequest) -> bool {
        if let Err(invalid) = request.validate() {
            return self.shared.fail_fast(invalid.into());
        }
        let Some(generation) = self.shared.begin(StageClass::Synthesis) else {
            tracing::debug!("pipeline busy, synthesis request ignored");
            return false;
        };
        let client = Arc::clone(&self.client);
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            let _ticker =
                ProgressTicker::start(Arc::clone(&shared), StageClass::Synthesis, generation);
            let result = stages::synthesize(&client, request).await;
            shared.settle_synthesis(generation, result);
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxdoc_domain::ErrorKind;

    #[test]
    fn begin_claims_exclusively_until_settled() {
        let shared = PipelineShared::new();
        let first = shared.begin(StageClass::Synthesis);
        assert_eq!(first, Some(1));
        assert_eq!(shared.begin(StageClass::Synthesis), None);
        assert_eq!(shared.begin(StageClass::Extraction), None);

        shared.settle_synthesis(
            1,
            Ok(AudioArtifact::new("abc123", AudioFormat::Mp3)),
        );
        assert!(matches!(shared.state(), PipelineState::Ready(_)));
        // Ready is not busy; the next request may start.
        assert_eq!(shared.begin(StageClass::Synthesis), Some(2));
    }

    #[test]
    fn stale_results_are_discarded() {
        let shared = PipelineShared::new();
        let first = shared.begin(StageClass::Synthesis).unwrap();
        shared.reset();
        let second = shared.begin(StageClass::Synthesis).unwrap();
        shared.settle_synthesis(
            second,
            Ok(AudioArtifact::new("fresh", AudioFormat::Mp3)),
        );

        // The superseded request settles late; nothing changes.
        shared.settle_synthesis(
            first,
            Ok(AudioArtifact::new("stale", AudioFormat::Mp3)),
        );
        let state = shared.state();
        assert_eq!(state.artifact().unwrap().id.as_str(), "fresh");
    }

    #[test]
    fn stale_failures_are_discarded_too() {
        let shared = PipelineShared::new();
        let first = shared.begin(StageClass::Extraction).unwrap();
        shared.reset();
        shared.settle_extraction(
            first,
            Err(ApiError::Server {
                status: 500,
                message: "late failure".into(),
            }),
        );
        assert_eq!(shared.state(), PipelineState::Idle);
    }

    #[test]
    fn validation_failures_do_not_preempt_an_in_flight_stage() {
        let shared = PipelineShared::new();
        shared.begin(StageClass::Synthesis).unwrap();
        let recorded = shared.fail_fast(ApiError::Validation {
            message: "text must not be empty".into(),
        });
        assert!(!recorded);
        assert!(shared.state().is_busy());
    }

    #[test]
    fn progress_never_regresses() {
        let shared = PipelineShared::new();
        let generation = shared.begin(StageClass::Extraction).unwrap();
        shared.bump_progress(StageClass::Extraction, generation, 75);
        shared.bump_progress(StageClass::Extraction, generation, 25);
        assert_eq!(shared.state().progress(), Some(75));
    }

    #[test]
    fn extraction_success_clears_summary() {
        let shared = PipelineShared::new();
        *lock(&shared.summary) = Some(SummaryResult::new(
            "orig",
            "sum".into(),
            SummaryKind::Brief,
            Language::English,
        ));
        let generation = shared.begin(StageClass::Extraction).unwrap();
        shared.settle_extraction(generation, Ok("Extracted content".into()));
        assert_eq!(&*lock(&shared.buffer), "Extracted content");
        assert!(lock(&shared.summary).is_none());
        assert_eq!(shared.state(), PipelineState::Idle);
    }

    #[test]
    fn failure_maps_the_error_kind() {
        let shared = PipelineShared::new();
        let generation = shared.begin(StageClass::Synthesis).unwrap();
        shared.settle_synthesis(
            generation,
            Err(ApiError::Unauthorized {
                message: "session expired".into(),
            }),
        );
        assert_eq!(
            shared.state(),
            PipelineState::Failed {
                kind: ErrorKind::Unauthorized,
                message: "session expired".into()
            }
        );
    }
}
