//! HTTP transport for the conversion service.

use crate::api::endpoints::auth::{CreateToken, GetCurrentUser, NewUser, RegisterUser, TokenResponse, UserProfile};
use crate::api::endpoints::convert::{ConversionRecord, DeleteConversion, DownloadAudio, ListConversions};
use crate::api::endpoints::{Endpoint, RequestBody};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::session::SessionStore;
use bytes::Bytes;
use reqwest::Url;
use voxdoc_domain::ArtifactId;

/// Authenticated client for the conversion service.
///
/// One generic [`hit`](Self::hit) drives every endpoint in the catalog;
/// the bearer header is attached whenever the session store holds a token
/// and a 401 clears it so every holder of the store sees the expiry.
///
/// The client never retries; retry policy belongs to the caller.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: SessionStore,
}

impl ApiClient {
    pub fn new(config: ClientConfig, session: SessionStore) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url,
            session,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Execute one endpoint against the service.
    pub async fn hit<E: Endpoint>(&self, endpoint: E) -> Result<E::Response, ApiError> {
        let url = endpoint.url(&self.base_url);
        let mut builder = self.http.request(E::METHOD, url);

        if let Some(token) = self.session.token() {
            builder = builder.bearer_auth(token);
        }

        builder = match endpoint.request_body().await? {
            RequestBody::Json(json) => builder.json(&json),
            RequestBody::Form(fields) => builder.form(&fields),
            // The multipart boundary is library-managed; no manual
            // content-type here.
            RequestBody::Multipart(form) => builder.multipart(form),
            RequestBody::Empty => builder,
        };

        let resp = builder.send().await.map_err(ApiError::transport)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let error = ApiError::classify(status, &body);
            if matches!(error, ApiError::Unauthorized { .. }) {
                tracing::debug!("session token rejected, clearing stored token");
                self.session.clear();
            }
            return Err(error);
        }

        endpoint.response_body(resp).await
    }

    /// Exchange credentials for a bearer token and store it in the session.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, ApiError> {
        let token = self.hit(CreateToken::new(username, password)).await?;
        self.session.set_token(&token.access_token);
        Ok(token)
    }

    /// Create an account. Does not sign in.
    pub async fn register(&self, user: NewUser) -> Result<UserProfile, ApiError> {
        self.hit(RegisterUser::new(user)).await
    }

    /// Fetch the authenticated profile.
    pub async fn current_user(&self) -> Result<UserProfile, ApiError> {
        self.hit(GetCurrentUser).await
    }

    /// List the account's prior conversions.
    pub async fn conversions(&self) -> Result<Vec<ConversionRecord>, ApiError> {
        self.hit(ListConversions).await
    }

    /// Delete a prior conversion and its audio.
    pub async fn delete_conversion(&self, id: ArtifactId) -> Result<(), ApiError> {
        self.hit(DeleteConversion::new(id)).await
    }

    /// Fetch an artifact's audio payload via the download endpoint.
    pub async fn fetch_audio(&self, id: ArtifactId) -> Result<Bytes, ApiError> {
        self.hit(DownloadAudio::new(id)).await
    }
}
