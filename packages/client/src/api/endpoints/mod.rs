//! Endpoint catalog for the conversion service.
//!
//! Each endpoint is a small struct describing one HTTP operation: its path,
//! method, body, and how to decode the response. [`ApiClient::hit`] drives
//! any of them generically.
//!
//! [`ApiClient::hit`]: crate::api::ApiClient::hit

pub(crate) use crate::error::ApiError;
pub(crate) use reqwest::{
    Method, Response, Url,
    multipart::{Form, Part},
};
pub(crate) use serde::{Deserialize, Serialize};
pub(crate) use serde_json::Value;

pub mod auth;
pub mod convert;
pub mod extract;
pub mod summarize;

type QueryValues = Vec<(&'static str, String)>;

/// Body attached to a request, dispatched by the transport client.
///
/// Multipart bodies never set a content-type manually; the boundary is
/// library-managed.
#[derive(Debug)]
pub enum RequestBody {
    Json(Value),
    /// URL-encoded form fields (the credential exchange uses these).
    Form(Vec<(&'static str, String)>),
    Multipart(Form),
    Empty,
}

#[allow(async_fn_in_trait)]
pub trait Endpoint {
    const PATH: &'static str;

    const METHOD: Method;

    type Response;

    fn query_params(&self) -> Option<QueryValues> {
        None
    }

    fn path_params(&self) -> Vec<(&'static str, &str)> {
        vec![]
    }

    async fn request_body(&self) -> Result<RequestBody, ApiError> {
        Ok(RequestBody::Empty)
    }

    async fn response_body(self, resp: Response) -> Result<Self::Response, ApiError>;

    fn url(&self, base: &Url) -> Url {
        let mut path = Self::PATH.to_string();

        for (placeholder, value) in self.path_params() {
            path = path.replace(placeholder, value);
        }

        let mut url = base.clone();
        url.set_path(&path);

        if let Some(query_params) = self.query_params() {
            url.query_pairs_mut().extend_pairs(query_params);
        }

        url
    }
}
