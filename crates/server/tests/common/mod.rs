//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with mock remote services injected, enabling E2E testing without a
//! conversion service.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use convertino_core::{
    testing::{MockArtifactSink, MockConverter, MockFormatCatalog},
    Config, ExportConfig, RemoteConfig, ServerConfig,
};
use convertino_server::state::AppState;

/// Re-export fixtures for test convenience
pub use convertino_core::testing::fixtures;

const BOUNDARY: &str = "convertino-test-boundary";

/// Test fixture for E2E testing with mock dependencies.
///
/// Provides an in-process server with fully controllable mocks for:
/// - Format discovery (MockFormatCatalog)
/// - Conversion (MockConverter)
/// - Export (MockArtifactSink)
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_upload() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture
///         .upload("/api/v1/batch", &[("report.docx", "...")])
///         .await;
///
///     assert_eq!(response.status, 201);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Shared state behind the router
    pub state: Arc<AppState>,
    /// Mock catalog - configure formats per extension
    pub catalog: Arc<MockFormatCatalog>,
    /// Mock converter - control conversion outcomes
    pub converter: Arc<MockConverter>,
    /// Mock sink - inspect exports
    pub sink: Arc<MockArtifactSink>,
    /// Temporary directory for the configured export directory
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Response with raw body and headers
#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl TestFixture {
    /// Create a new test fixture with the usual document and image formats.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let catalog = Arc::new(MockFormatCatalog::new());
        catalog.set_formats("docx", fixtures::DOCX_FORMATS).await;
        catalog.set_formats("png", fixtures::PNG_FORMATS).await;
        let converter = Arc::new(MockConverter::new());
        let sink = Arc::new(MockArtifactSink::new());

        let config = Config {
            remote: RemoteConfig::new(test_config.base_url.clone()),
            server: ServerConfig {
                port: 0, // Not used for in-process testing
                max_upload_bytes: test_config.max_upload_bytes,
                ..Default::default()
            },
            export: ExportConfig {
                output_dir: temp_dir.path().join("converted"),
            },
        };

        let state = Arc::new(AppState::new(
            config,
            catalog.clone(),
            converter.clone(),
            sink.clone(),
        ));

        let router = convertino_server::api::create_router(Arc::clone(&state));

        Self {
            router,
            state,
            catalog,
            converter,
            sink,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request without a body.
    pub async fn post(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Upload files as `file` fields of a multipart PUT.
    pub async fn upload(&self, path: &str, files: &[(&str, &str)]) -> TestResponse {
        let mut body = Vec::new();
        for (name, contents) in files {
            body.extend_from_slice(
                format!(
                    "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    BOUNDARY, name
                )
                .as_bytes(),
            );
            body.extend_from_slice(contents.as_bytes());
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        let request = Request::builder()
            .method("PUT")
            .uri(path)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();

        let raw = self.send(request).await;
        TestResponse {
            status: raw.status,
            body: parse_json(&raw.body),
        }
    }

    /// Upload files and wait until every entry has its formats.
    pub async fn upload_and_discover(&self, files: &[(&str, &str)]) -> Vec<u64> {
        let response = self.upload("/api/v1/batch", files).await;
        assert_eq!(response.status, StatusCode::CREATED);

        self.wait_for(|body| body["summary"]["discovery_pending"] == 0)
            .await;

        response.body["entries"]
            .as_array()
            .unwrap()
            .iter()
            .map(|entry| entry["id"].as_u64().unwrap())
            .collect()
    }

    /// Poll `GET /api/v1/entries` until `predicate` holds, and return that body.
    pub async fn wait_for(&self, predicate: impl Fn(&Value) -> bool) -> Value {
        for _ in 0..200 {
            let response = self.get("/api/v1/entries").await;
            if predicate(&response.body) {
                return response.body;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("Condition not reached in time");
    }

    /// Send a GET request and return the raw response.
    pub async fn get_raw(&self, path: &str) -> RawResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Send a request with raw string body and custom content type.
    pub async fn request_raw(
        &self,
        method: &str,
        path: &str,
        body: &str,
        content_type: &str,
    ) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", content_type)
            .body(Body::from(body.to_string()))
            .unwrap();

        let raw = self.send(request).await;
        TestResponse {
            status: raw.status,
            body: parse_json(&raw.body),
        }
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let raw = self.send(request_builder.body(body).unwrap()).await;
        TestResponse {
            status: raw.status,
            body: parse_json(&raw.body),
        }
    }

    async fn send(&self, request: Request<Body>) -> RawResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        RawResponse {
            status,
            headers,
            body,
        }
    }
}

fn parse_json(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(bytes).unwrap_or(Value::Null)
    }
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Remote base URL reported by the config endpoint
    pub base_url: String,
    /// Upload limit for the batch route
    pub max_upload_bytes: usize,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}

/// Helper to assert a JSON path equals expected value.
#[macro_export]
macro_rules! assert_json_path {
    ($json:expr, $path:expr, $expected:expr) => {
        let actual = &$json[$path];
        assert_eq!(
            actual, &$expected,
            "Path '{}' expected {:?}, got {:?}",
            $path, $expected, actual
        );
    };
}
