//! Summarization endpoint.

use super::*;
use voxdoc_domain::{SummaryKind, SummaryRequest};

/// Condense text with the service's summarizer. `POST /summarize/summary`.
#[derive(Debug, Clone)]
pub struct SummarizeText {
    body: SummaryRequest,
}

impl SummarizeText {
    pub fn new(body: SummaryRequest) -> Self {
        Self { body }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SummaryReply {
    pub original_content: String,
    pub summary_content: String,
    #[serde(default)]
    pub language: Option<String>,
    pub summary_type: SummaryKind,
}

impl Endpoint for SummarizeText {
    const PATH: &'static str = "/summarize/summary";

    const METHOD: Method = Method::POST;

    type Response = SummaryReply;

    async fn request_body(&self) -> Result<RequestBody, ApiError> {
        let json = serde_json::to_value(&self.body).map_err(ApiError::encode)?;
        Ok(RequestBody::Json(json))
    }

    async fn response_body(self, resp: Response) -> Result<Self::Response, ApiError> {
        resp.json().await.map_err(ApiError::bad_body)
    }
}
