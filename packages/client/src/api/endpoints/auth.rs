//! Account endpoints: credential exchange, registration, profile.

use super::*;
use chrono::{DateTime, Utc};

/// Exchange credentials for a bearer token.
///
/// `POST /auth/token`, urlencoded form per the service's OAuth2-style
/// password flow.
#[derive(Debug, Clone)]
pub struct CreateToken {
    username: String,
    password: String,
}

impl CreateToken {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl Endpoint for CreateToken {
    const PATH: &'static str = "/auth/token";

    const METHOD: Method = Method::POST;

    type Response = TokenResponse;

    async fn request_body(&self) -> Result<RequestBody, ApiError> {
        Ok(RequestBody::Form(vec![
            ("username", self.username.clone()),
            ("password", self.password.clone()),
        ]))
    }

    async fn response_body(self, resp: Response) -> Result<Self::Response, ApiError> {
        resp.json().await.map_err(ApiError::bad_body)
    }
}

/// Create an account. `POST /auth/register`.
#[derive(Debug, Clone)]
pub struct RegisterUser {
    body: NewUser,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterUser {
    pub fn new(body: NewUser) -> Self {
        Self { body }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Endpoint for RegisterUser {
    const PATH: &'static str = "/auth/register";

    const METHOD: Method = Method::POST;

    type Response = UserProfile;

    async fn request_body(&self) -> Result<RequestBody, ApiError> {
        let json = serde_json::to_value(&self.body).map_err(ApiError::encode)?;
        Ok(RequestBody::Json(json))
    }

    async fn response_body(self, resp: Response) -> Result<Self::Response, ApiError> {
        resp.json().await.map_err(ApiError::bad_body)
    }
}

/// Fetch the authenticated profile. `GET /users/me`.
#[derive(Debug, Clone, Default)]
pub struct GetCurrentUser;

impl Endpoint for GetCurrentUser {
    const PATH: &'static str = "/users/me";

    const METHOD: Method = Method::GET;

    type Response = UserProfile;

    async fn response_body(self, resp: Response) -> Result<Self::Response, ApiError> {
        resp.json().await.map_err(ApiError::bad_body)
    }
}
