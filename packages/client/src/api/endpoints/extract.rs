//! Text extraction endpoints for uploaded PDF and image documents.

use super::*;
use std::path::Path;
use voxdoc_domain::{DocumentKind, Language};

/// A document payload for a multipart upload.
///
/// The bytes are held in memory; the MIME type is inferred from the file
/// extension when not given explicitly.
#[derive(Debug, Clone)]
pub struct UploadSource {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime_type: Option<String>,
}

impl UploadSource {
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime_type = detect_mime_type(&file_name);
        Self {
            file_name,
            bytes,
            mime_type,
        }
    }

    /// Read a document from disk.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, ApiError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|err| ApiError::Validation {
            message: format!("could not read {}: {err}", path.display()),
        })?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("document")
            .to_string();
        Ok(Self::from_bytes(file_name, bytes))
    }

    /// Guess the document kind from the file extension.
    pub fn guess_kind(&self) -> Option<DocumentKind> {
        match extension(&self.file_name)?.as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "jpg" | "jpeg" | "png" | "bmp" | "tiff" | "webp" => Some(DocumentKind::Image),
            _ => None,
        }
    }
}

fn extension(file_name: &str) -> Option<String> {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

fn detect_mime_type(file_name: &str) -> Option<String> {
    let mime = match extension(file_name)?.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "bmp" => "image/bmp",
        "tiff" => "image/tiff",
        "webp" => "image/webp",
        _ => return None,
    };
    Some(mime.to_string())
}

/// Extract raw text from a document.
///
/// `POST /extract/pdf` or `POST /extract/image`, multipart fields `file`
/// and `language`.
#[derive(Debug, Clone)]
pub struct ExtractText {
    source: UploadSource,
    language: Language,
    kind: DocumentKind,
}

impl ExtractText {
    pub fn new(source: UploadSource, language: Language, kind: DocumentKind) -> Self {
        Self {
            source,
            language,
            kind,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExtractedText {
    pub text: String,
}

impl Endpoint for ExtractText {
    const PATH: &'static str = "/extract/{kind}";

    const METHOD: Method = Method::POST;

    type Response = ExtractedText;

    fn path_params(&self) -> Vec<(&'static str, &str)> {
        vec![("{kind}", self.kind.as_str())]
    }

    async fn request_body(&self) -> Result<RequestBody, ApiError> {
        let mut part = Part::bytes(self.source.bytes.clone()).file_name(self.source.file_name.clone());
        if let Some(mime) = &self.source.mime_type {
            part = part.mime_str(mime).map_err(ApiError::encode)?;
        }
        let form = Form::new()
            .part("file", part)
            .text("language", self.language.code());
        Ok(RequestBody::Multipart(form))
    }

    async fn response_body(self, resp: Response) -> Result<Self::Response, ApiError> {
        resp.json().await.map_err(ApiError::bad_body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_type_follows_extension() {
        let source = UploadSource::from_bytes("report.PDF", vec![1, 2, 3]);
        assert_eq!(source.mime_type.as_deref(), Some("application/pdf"));
        assert_eq!(source.guess_kind(), Some(DocumentKind::Pdf));

        let source = UploadSource::from_bytes("scan.jpeg", vec![]);
        assert_eq!(source.mime_type.as_deref(), Some("image/jpeg"));
        assert_eq!(source.guess_kind(), Some(DocumentKind::Image));

        let source = UploadSource::from_bytes("notes.txt", vec![]);
        assert_eq!(source.mime_type, None);
        assert_eq!(source.guess_kind(), None);
    }

    #[test]
    fn endpoint_path_selects_the_kind() {
        let base = Url::parse("http://localhost:8000").unwrap();
        let endpoint = ExtractText::new(
            UploadSource::from_bytes("scan.png", vec![]),
            Language::English,
            DocumentKind::Image,
        );
        assert_eq!(endpoint.url(&base).path(), "/extract/image");
    }
}
