//! Account and history operations against the stub service.

mod common;

use common::{StubService, TEST_TOKEN, spawn};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use voxdoc_client::api::ApiClient;
use voxdoc_client::api::endpoints::auth::NewUser;
use voxdoc_client::config::ClientConfig;
use voxdoc_client::error::ApiError;
use voxdoc_client::session::SessionStore;
use voxdoc_domain::{ArtifactId, ErrorKind};

async fn client_against(stub: &Arc<StubService>) -> (Arc<ApiClient>, SessionStore) {
    let base = spawn(Arc::clone(stub)).await;
    let session = SessionStore::new();
    let client = Arc::new(ApiClient::new(
        ClientConfig::from_url(&base).unwrap(),
        session.clone(),
    ));
    (client, session)
}

#[tokio::test]
async fn login_stores_the_token_and_authenticates_later_calls() {
    let stub = StubService::new();
    stub.require_bearer.store(true, Ordering::SeqCst);
    let (client, session) = client_against(&stub).await;

    let token = client.login("ada", "correct horse").await.unwrap();
    assert_eq!(token.access_token, TEST_TOKEN);
    assert_eq!(token.token_type, "bearer");
    assert_eq!(session.token().as_deref(), Some(TEST_TOKEN));

    // The profile endpoint demands the bearer header; this only works if
    // the stored token is attached.
    let profile = client.current_user().await.unwrap();
    assert_eq!(profile.username, "ada");
    assert_eq!(profile.email, "ada@example.com");
}

#[tokio::test]
async fn failed_login_surfaces_the_service_message() {
    let stub = StubService::new();
    let (client, session) = client_against(&stub).await;

    let err = client.login("ada", "wrong").await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { .. }));
    assert_eq!(err.message(), "Incorrect username or password");
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn registration_returns_the_created_profile() {
    let stub = StubService::new();
    let (client, _session) = client_against(&stub).await;

    let profile = client
        .register(NewUser {
            username: "grace".into(),
            email: "grace@example.com".into(),
            password: "s3cret!".into(),
        })
        .await
        .unwrap();
    assert_eq!(profile.username, "grace");
    assert_eq!(profile.email, "grace@example.com");
    assert!(profile.is_active);
}

#[tokio::test]
async fn history_lists_and_deletes_conversions() {
    let stub = StubService::new();
    let (client, _session) = client_against(&stub).await;

    let records = client.conversions().await.unwrap();
    assert_eq!(records.len(), 2);
    // Integer ids from the service arrive as opaque text.
    assert_eq!(records[0].id.as_str(), "7");
    assert_eq!(records[1].language.as_deref(), Some("de"));

    client
        .delete_conversion(ArtifactId::new("7"))
        .await
        .unwrap();
    assert_eq!(stub.delete_calls.load(Ordering::SeqCst), 1);

    let err = client
        .delete_conversion(ArtifactId::new("missing"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(err.message(), "Conversion not found");
}

#[tokio::test]
async fn requests_without_a_session_omit_the_bearer_header() {
    let stub = StubService::new();
    stub.require_bearer.store(true, Ordering::SeqCst);
    let (client, session) = client_against(&stub).await;
    assert!(!session.is_authenticated());

    // No token stored: the stub rejects the unauthenticated request and
    // the client maps it to the unauthorized kind.
    let err = client.current_user().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
}
