//! Synthesis endpoints: submit text, retrieve audio, manage history.

use super::*;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use voxdoc_domain::{ArtifactId, ConversionRequest};

/// Submit text for speech synthesis. `POST /convert/text`.
///
/// This is step one of the two-step synthesis protocol; the returned id
/// feeds [`StreamAudio`] or [`DownloadAudio`].
#[derive(Debug, Clone)]
pub struct SynthesizeText {
    body: ConversionRequest,
}

impl SynthesizeText {
    pub fn new(body: ConversionRequest) -> Self {
        Self { body }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConversionCreated {
    pub id: ArtifactId,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Endpoint for SynthesizeText {
    const PATH: &'static str = "/convert/text";

    const METHOD: Method = Method::POST;

    type Response = ConversionCreated;

    async fn request_body(&self) -> Result<RequestBody, ApiError> {
        let json = serde_json::to_value(&self.body).map_err(ApiError::encode)?;
        Ok(RequestBody::Json(json))
    }

    async fn response_body(self, resp: Response) -> Result<Self::Response, ApiError> {
        resp.json().await.map_err(ApiError::bad_body)
    }
}

/// Fetch the synthesized audio as a stream of bytes.
/// `GET /convert/{id}/stream`.
#[derive(Debug, Clone)]
pub struct StreamAudio {
    id: ArtifactId,
}

impl StreamAudio {
    pub fn new(id: ArtifactId) -> Self {
        Self { id }
    }
}

impl Endpoint for StreamAudio {
    const PATH: &'static str = "/convert/{id}/stream";

    const METHOD: Method = Method::GET;

    type Response = Bytes;

    fn path_params(&self) -> Vec<(&'static str, &str)> {
        vec![("{id}", self.id.as_str())]
    }

    async fn response_body(self, resp: Response) -> Result<Self::Response, ApiError> {
        resp.bytes().await.map_err(ApiError::bad_body)
    }
}

/// Fetch the synthesized audio for saving. `GET /convert/{id}/download`.
#[derive(Debug, Clone)]
pub struct DownloadAudio {
    id: ArtifactId,
}

impl DownloadAudio {
    pub fn new(id: ArtifactId) -> Self {
        Self { id }
    }
}

impl Endpoint for DownloadAudio {
    const PATH: &'static str = "/convert/{id}/download";

    const METHOD: Method = Method::GET;

    type Response = Bytes;

    fn path_params(&self) -> Vec<(&'static str, &str)> {
        vec![("{id}", self.id.as_str())]
    }

    async fn response_body(self, resp: Response) -> Result<Self::Response, ApiError> {
        resp.bytes().await.map_err(ApiError::bad_body)
    }
}

/// A prior conversion as listed by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversionRecord {
    pub id: ArtifactId,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub source_type: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// List the account's prior conversions. `GET /convert`.
#[derive(Debug, Clone, Default)]
pub struct ListConversions;

impl Endpoint for ListConversions {
    const PATH: &'static str = "/convert";

    const METHOD: Method = Method::GET;

    type Response = Vec<ConversionRecord>;

    async fn response_body(self, resp: Response) -> Result<Self::Response, ApiError> {
        resp.json().await.map_err(ApiError::bad_body)
    }
}

/// Delete a prior conversion and its audio. `DELETE /convert/{id}`.
#[derive(Debug, Clone)]
pub struct DeleteConversion {
    id: ArtifactId,
}

impl DeleteConversion {
    pub fn new(id: ArtifactId) -> Self {
        Self { id }
    }
}

impl Endpoint for DeleteConversion {
    const PATH: &'static str = "/convert/{id}";

    const METHOD: Method = Method::DELETE;

    type Response = ();

    fn path_params(&self) -> Vec<(&'static str, &str)> {
        vec![("{id}", self.id.as_str())]
    }

    async fn response_body(self, _resp: Response) -> Result<Self::Response, ApiError> {
        Ok(())
    }
}
