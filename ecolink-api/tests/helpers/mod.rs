//! Shared helpers for integration tests
//!
//! Tests drive the real router via `tower::ServiceExt::oneshot` over a
//! tempfile SQLite database. Local axum servers on ephemeral ports stand
//! in for the object storage and classifier endpoints.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::routing::{post, put};
use axum::Router;
use serde_json::Value;
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;

use ecolink_api::api::AuthVerifier;
use ecolink_api::services::{ClassifierClient, ClassifierConfig, StorageClient, StorageConfig};
use ecolink_api::{build_router, AppState};

pub const TEST_BUCKET: &str = "test-bucket";
pub const BOUNDARY: &str = "ecolink-test-boundary";

/// A router under test plus the backing database
pub struct TestApp {
    pub app: Router,
    pub db: SqlitePool,
    _dir: tempfile::TempDir,
}

/// Build the application with a fresh database
///
/// Auth runs in trusted mode: the bearer token is the subject id.
pub async fn setup_app(storage_endpoint: String, classifier_url: Option<String>) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let db = ecolink_common::db::init_database(&dir.path().join("test.db"))
        .await
        .unwrap();

    let storage = StorageClient::new(StorageConfig {
        endpoint: storage_endpoint,
        bucket: TEST_BUCKET.to_string(),
        public_base_url: None,
        access_key: None,
    })
    .unwrap();

    let classifier = ClassifierClient::new(ClassifierConfig {
        endpoint: classifier_url,
        api_key: None,
        timeout: Duration::from_secs(5),
    });

    let state = AppState::new(db.clone(), storage, classifier, AuthVerifier::new(None));

    TestApp {
        app: build_router(state),
        db,
        _dir: dir,
    }
}

/// Mock storage + classifier services on an ephemeral port
pub struct MockServices {
    pub base_url: String,
    /// Number of storage PUTs observed
    pub storage_puts: Arc<AtomicUsize>,
}

impl MockServices {
    /// Classifier endpoint URL on the mock server
    pub fn classifier_url(&self) -> String {
        format!("{}/classify", self.base_url)
    }

    pub fn put_count(&self) -> usize {
        self.storage_puts.load(Ordering::SeqCst)
    }
}

/// Spawn the mock server
///
/// `classifier_reply` is returned verbatim for POST /classify; an empty
/// reply answers 500 instead, simulating an upstream failure.
pub async fn spawn_mock_services(classifier_reply: &str) -> MockServices {
    let storage_puts = Arc::new(AtomicUsize::new(0));
    let puts = storage_puts.clone();
    let reply = classifier_reply.to_string();

    let app = Router::new()
        .route(
            &format!("/{}/*key", TEST_BUCKET),
            put(move || {
                let puts = puts.clone();
                async move {
                    puts.fetch_add(1, Ordering::SeqCst);
                    StatusCode::OK
                }
            }),
        )
        .route(
            "/classify",
            post(move || {
                let reply = reply.clone();
                async move {
                    if reply.is_empty() {
                        (StatusCode::INTERNAL_SERVER_ERROR, String::new())
                    } else {
                        (StatusCode::OK, reply)
                    }
                }
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockServices {
        base_url: format!("http://{}", addr),
        storage_puts,
    }
}

/// Build a GET request, optionally authenticated
pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

/// Build a JSON request, optionally authenticated
pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: &Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// One part of a multipart submission
pub enum Part<'a> {
    Text {
        name: &'a str,
        value: &'a str,
    },
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
}

/// Encode parts as a multipart/form-data body
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                        name, value
                    )
                    .as_bytes(),
                );
            }
            Part::File {
                name,
                file_name,
                content_type,
                bytes,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// Build an authenticated multipart request
pub fn multipart_request(uri: &str, token: &str, parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

/// Extract JSON body from a response
pub async fn body_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Create a contributor profile through the API, returning its JSON
pub async fn create_user(app: &Router, token: &str, full_name: &str, role: &str) -> Value {
    let request = json_request(
        "POST",
        "/api/v1/user",
        Some(token),
        &serde_json::json!({
            "fullName": full_name,
            "email": format!("{}@example.org", token),
            "role": role,
        }),
    );
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response.into_body()).await
}

/// Fetch a profile by subject id through the API
pub async fn fetch_user(app: &Router, token: &str, user_id: &str) -> Value {
    let request = get_request(&format!("/api/v1/user/{}", user_id), Some(token));
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response.into_body()).await
}

/// Smallest valid JPEG-ish payload for upload tests
pub fn fake_jpeg() -> Vec<u8> {
    vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0xFF, 0xD9]
}
