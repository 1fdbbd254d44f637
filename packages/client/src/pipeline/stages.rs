//! Stage functions: one network-bound step each, no pipeline state.
//!
//! The orchestrator owns sequencing and staleness; these functions only
//! validate, call the service, and shape the result.

use crate::api::ApiClient;
use crate::api::endpoints::convert::{StreamAudio, SynthesizeText};
use crate::api::endpoints::extract::{ExtractText, UploadSource};
use crate::api::endpoints::summarize::SummarizeText;
use crate::error::ApiError;
use voxdoc_domain::{
    AudioArtifact, ConversionRequest, DocumentKind, Language, SummaryRequest, SummaryResult,
};

/// Extract raw text from an uploaded document.
///
/// Service-side rejections surface verbatim; nothing is inferred locally.
pub async fn extract(
    client: &ApiClient,
    source: UploadSource,
    language: Language,
    kind: DocumentKind,
) -> Result<String, ApiError> {
    let reply = client.hit(ExtractText::new(source, language, kind)).await?;
    Ok(reply.text)
}

/// Condense text. Empty input fails fast, before any network call.
pub async fn summarize(
    client: &ApiClient,
    request: SummaryRequest,
) -> Result<SummaryResult, ApiError> {
    request.validate()?;
    let reply = client.hit(SummarizeText::new(request.clone())).await?;
    Ok(SummaryResult::new(
        &request.text,
        reply.summary_content,
        request.kind,
        request.language,
    ))
}

/// Synthesize speech from text.
///
/// Two-step protocol: submit the text for an artifact id, then retrieve
/// the audio for that id. The stage does not report success until the
/// retrieval resolves with a payload.
pub async fn synthesize(
    client: &ApiClient,
    request: ConversionRequest,
) -> Result<AudioArtifact, ApiError> {
    request.validate()?;
    let format = request.format;
    let created = client.hit(SynthesizeText::new(request)).await?;

    let audio = client.hit(StreamAudio::new(created.id.clone())).await?;
    if audio.is_empty() {
        return Err(ApiError::Unknown {
            message: format!("synthesis {} produced an empty audio stream", created.id),
        });
    }

    Ok(AudioArtifact::new(created.id, format))
}
