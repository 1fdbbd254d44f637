//! In-process stub of the conversion service for integration tests.
//!
//! Counts requests, records payloads, and lets tests script per-request
//! delays, artifact ids, and failures.

#![allow(dead_code)]

use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Form, Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TEST_TOKEN: &str = "stub-bearer-token";

#[derive(Debug, Clone)]
pub struct ScriptedSynthesis {
    pub id: String,
    pub delay: Duration,
}

#[derive(Default)]
pub struct StubService {
    pub synthesize_calls: AtomicUsize,
    pub stream_calls: AtomicUsize,
    pub download_calls: AtomicUsize,
    pub extract_calls: AtomicUsize,
    pub summarize_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,

    /// Body of the most recent `POST /convert/text`.
    pub last_synthesize_body: Mutex<Option<Value>>,
    /// Language field of the most recent extraction upload.
    pub last_extract_language: Mutex<Option<String>>,
    /// File name of the most recent extraction upload.
    pub last_extract_file_name: Mutex<Option<String>>,

    /// Per-text synthesize behavior; unscripted texts get `conv-<n>` with
    /// no delay. Keyed by text so concurrent calls stay deterministic.
    pub synthesize_script: Mutex<HashMap<String, ScriptedSynthesis>>,
    /// Text returned by the extraction endpoints.
    pub extract_text: Mutex<String>,
    /// Summary text returned by the summarize endpoint.
    pub summary_text: Mutex<String>,

    /// When set, every route answers 401.
    pub reject_as_unauthorized: AtomicBool,
    /// When set, routes demand `Authorization: Bearer <TEST_TOKEN>`.
    pub require_bearer: AtomicBool,
}

impl StubService {
    pub fn new() -> Arc<Self> {
        let stub = Self {
            extract_text: Mutex::new("Extracted content".to_string()),
            summary_text: Mutex::new("a short summary".to_string()),
            ..Self::default()
        };
        Arc::new(stub)
    }

    /// Script the reply for a given request text.
    pub fn script_synthesize(&self, text: &str, id: &str, delay: Duration) {
        self.synthesize_script.lock().unwrap().insert(
            text.to_string(),
            ScriptedSynthesis {
                id: id.to_string(),
                delay,
            },
        );
    }

    fn scripted(&self, text: &str, call: usize) -> ScriptedSynthesis {
        self.synthesize_script
            .lock()
            .unwrap()
            .get(text)
            .cloned()
            .unwrap_or(ScriptedSynthesis {
                id: format!("conv-{call}"),
                delay: Duration::ZERO,
            })
    }

    fn gate(&self, headers: &HeaderMap) -> Result<(), Response> {
        if self.reject_as_unauthorized.load(Ordering::SeqCst) {
            return Err(unauthorized());
        }
        if self.require_bearer.load(Ordering::SeqCst) {
            let expected = format!("Bearer {TEST_TOKEN}");
            let authorized = headers
                .get("authorization")
                .and_then(|value| value.to_str().ok())
                .is_some_and(|value| value == expected);
            if !authorized {
                return Err(unauthorized());
            }
        }
        Ok(())
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"detail": "Could not validate credentials"})),
    )
        .into_response()
}

/// Serve the stub on an ephemeral port; returns its base URL.
pub async fn spawn(stub: Arc<StubService>) -> String {
    let app = router(stub);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub listener");
    let addr = listener.local_addr().expect("stub listener address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("stub server");
    });
    format!("http://{addr}")
}

fn router(stub: Arc<StubService>) -> Router {
    Router::new()
        .route("/auth/token", post(create_token))
        .route("/auth/register", post(register))
        .route("/users/me", get(me))
        .route("/extract/:kind", post(extract))
        .route("/convert/text", post(synthesize))
        .route("/convert/:id/stream", get(stream))
        .route("/convert/:id/download", get(download))
        .route("/convert", get(list_conversions))
        .route("/convert/:id", delete(delete_conversion))
        .route("/summarize/summary", post(summarize))
        .with_state(stub)
}

#[derive(Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

async fn create_token(
    State(_stub): State<Arc<StubService>>,
    Form(credentials): Form<Credentials>,
) -> Response {
    if credentials.password == "wrong" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Incorrect username or password"})),
        )
            .into_response();
    }
    let _ = credentials.username;
    Json(json!({"access_token": TEST_TOKEN, "token_type": "bearer"})).into_response()
}

async fn register(
    State(stub): State<Arc<StubService>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = stub.gate(&headers) {
        return rejection;
    }
    Json(json!({
        "id": 1,
        "username": body["username"],
        "email": body["email"],
        "is_active": true,
        "created_at": "2026-01-05T12:00:00Z",
    }))
    .into_response()
}

async fn me(State(stub): State<Arc<StubService>>, headers: HeaderMap) -> Response {
    if let Err(rejection) = stub.gate(&headers) {
        return rejection;
    }
    Json(json!({
        "id": 1,
        "username": "ada",
        "email": "ada@example.com",
        "is_active": true,
        "created_at": "2026-01-05T12:00:00Z",
    }))
    .into_response()
}

async fn extract(
    State(stub): State<Arc<StubService>>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if let Err(rejection) = stub.gate(&headers) {
        return rejection;
    }
    if kind != "pdf" && kind != "image" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Not Found"})),
        )
            .into_response();
    }
    stub.extract_calls.fetch_add(1, Ordering::SeqCst);

    let mut saw_file = false;
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().map(|name| name.to_string());
        let file_name = field.file_name().map(|name| name.to_string());
        match name.as_deref() {
            Some("file") => {
                saw_file = true;
                *stub.last_extract_file_name.lock().unwrap() = file_name;
                let _ = field.bytes().await;
            }
            Some("language") => {
                if let Ok(value) = field.text().await {
                    *stub.last_extract_language.lock().unwrap() = Some(value);
                }
            }
            _ => {}
        }
    }
    if !saw_file {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"detail": "file field is required"})),
        )
            .into_response();
    }

    Json(json!({"text": stub.extract_text.lock().unwrap().clone()})).into_response()
}

async fn synthesize(
    State(stub): State<Arc<StubService>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = stub.gate(&headers) {
        return rejection;
    }
    let call = stub.synthesize_calls.fetch_add(1, Ordering::SeqCst) + 1;
    let text = body["text"].as_str().unwrap_or_default().to_string();
    *stub.last_synthesize_body.lock().unwrap() = Some(body);

    let scripted = stub.scripted(&text, call);
    if !scripted.delay.is_zero() {
        tokio::time::sleep(scripted.delay).await;
    }

    let id = scripted.id;
    (
        StatusCode::CREATED,
        Json(json!({
            "id": id,
            "file_name": format!("text_input_{id}"),
            "language": "en",
            "created_at": "2026-01-05T12:00:00Z",
        })),
    )
        .into_response()
}

async fn stream(
    State(stub): State<Arc<StubService>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(rejection) = stub.gate(&headers) {
        return rejection;
    }
    stub.stream_calls.fetch_add(1, Ordering::SeqCst);
    audio_payload(&id)
}

async fn download(
    State(stub): State<Arc<StubService>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(rejection) = stub.gate(&headers) {
        return rejection;
    }
    stub.download_calls.fetch_add(1, Ordering::SeqCst);
    audio_payload(&id)
}

fn audio_payload(id: &str) -> Response {
    (
        [("content-type", "audio/mpeg")],
        format!("FAKEAUDIO:{id}").into_bytes(),
    )
        .into_response()
}

async fn list_conversions(State(stub): State<Arc<StubService>>, headers: HeaderMap) -> Response {
    if let Err(rejection) = stub.gate(&headers) {
        return rejection;
    }
    Json(json!([
        {
            "id": 7,
            "file_name": "report.pdf",
            "language": "en",
            "source_type": "pdf",
            "created_at": "2026-01-04T09:30:00Z",
        },
        {
            "id": 8,
            "file_name": "text_input_a1",
            "language": "de",
            "source_type": "text",
            "created_at": "2026-01-05T10:00:00Z",
        },
    ]))
    .into_response()
}

async fn delete_conversion(
    State(stub): State<Arc<StubService>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(rejection) = stub.gate(&headers) {
        return rejection;
    }
    stub.delete_calls.fetch_add(1, Ordering::SeqCst);
    if id == "missing" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Conversion not found"})),
        )
            .into_response();
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn summarize(
    State(stub): State<Arc<StubService>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = stub.gate(&headers) {
        return rejection;
    }
    stub.summarize_calls.fetch_add(1, Ordering::SeqCst);
    if body["text"].as_str().is_none_or(|text| text.trim().is_empty()) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"detail": "Text content cannot be empty"})),
        )
            .into_response();
    }
    if body["text"] == "reject me" {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": "Failed to generate summary: model offline"})),
        )
            .into_response();
    }
    Json(json!({
        "original_content": body["text"],
        "summary_content": stub.summary_text.lock().unwrap().clone(),
        "language": body["language"],
        "summary_type": body["summary_type"],
    }))
    .into_response()
}
