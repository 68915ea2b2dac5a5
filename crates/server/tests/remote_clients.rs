//! HTTP client tests against an in-process fake conversion service.
//!
//! The fake service implements the remote contract: format lookups at
//! `/formats/{ext}` and multipart conversions at `/convert_word_file` and
//! `/convert_image_file`.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Multipart, Path},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use convertino_core::{
    ArtifactExporter, CatalogError, ConversionOrchestrator, ConversionRequest, ConversionStatus,
    Converter, ConverterError, FileSource, FormatCatalog, FormatFamily, FsArtifactSink,
    HttpConverter, HttpFormatCatalog, RemoteConfig, SessionStore,
};

async fn formats(Path(extension): Path<String>) -> Response {
    match extension.as_str() {
        "docx" => Json(json!({"formats": ["pdf"]})).into_response(),
        "png" => Json(json!({"formats": ["jpeg", "bmp", "gif", "tiff"]})).into_response(),
        "broken" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        "garbled" => "definitely not json".into_response(),
        "odd" => Json(json!({"formats": "pdf"})).into_response(),
        _ => Json(json!({})).into_response(),
    }
}

/// Echoes what it received: `{path}|{file name}|{format}|{size}`.
async fn convert(uri: Uri, mut multipart: Multipart) -> Response {
    let mut file_name = String::new();
    let mut size = 0;
    let mut output_format = String::new();

    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                file_name = field.file_name().unwrap_or("").to_string();
                size = field.bytes().await.map(|b| b.len()).unwrap_or(0);
            }
            "output_format" => {
                output_format = field.text().await.unwrap_or_default();
            }
            _ => {}
        }
    }

    match output_format.as_str() {
        "tiff" => (StatusCode::UNPROCESSABLE_ENTITY, "cannot produce tiff").into_response(),
        "gif" => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            "late".into_response()
        }
        _ => format!("{}|{}|{}|{}", uri.path(), file_name, output_format, size).into_response(),
    }
}

/// Start the fake service and return its base URL.
async fn spawn_fake_service() -> String {
    let app = Router::new()
        .route("/formats/{extension}", get(formats))
        .route("/convert_word_file", post(convert))
        .route("/convert_image_file", post(convert));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/", addr)
}

fn request(name: &str, format: &str) -> ConversionRequest {
    ConversionRequest {
        family: FormatFamily::classify(format).unwrap(),
        file_name: name.to_string(),
        bytes: b"12345".to_vec().into(),
        output_format: format.to_string(),
    }
}

// =============================================================================
// Format catalog
// =============================================================================

#[tokio::test]
async fn test_catalog_returns_formats() {
    let base_url = spawn_fake_service().await;
    let catalog = HttpFormatCatalog::new(&RemoteConfig::new(base_url)).unwrap();

    assert_eq!(catalog.fetch_formats("docx").await.unwrap(), vec!["pdf"]);
    assert_eq!(catalog.lookup("png").await.len(), 4);
}

#[tokio::test]
async fn test_catalog_missing_field_is_empty() {
    let base_url = spawn_fake_service().await;
    let catalog = HttpFormatCatalog::new(&RemoteConfig::new(base_url)).unwrap();

    assert!(catalog.fetch_formats("xyz").await.unwrap().is_empty());
    // Percent-encoded on the way out, decoded by the service
    assert!(catalog.fetch_formats("tar gz").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_catalog_failures() {
    let base_url = spawn_fake_service().await;
    let catalog = HttpFormatCatalog::new(&RemoteConfig::new(base_url)).unwrap();

    assert!(matches!(
        catalog.fetch_formats("broken").await,
        Err(CatalogError::ApiError { status: 500, .. })
    ));
    assert!(matches!(
        catalog.fetch_formats("garbled").await,
        Err(CatalogError::ParseError(_))
    ));
    assert!(matches!(
        catalog.fetch_formats("odd").await,
        Err(CatalogError::ParseError(_))
    ));

    // lookup never fails
    assert!(catalog.lookup("broken").await.is_empty());
    assert!(catalog.lookup("garbled").await.is_empty());
}

#[tokio::test]
async fn test_catalog_unreachable_service() {
    let catalog = HttpFormatCatalog::new(&RemoteConfig::new("http://127.0.0.1:1")).unwrap();

    assert!(matches!(
        catalog.fetch_formats("docx").await,
        Err(CatalogError::HttpError(_))
    ));
    assert!(catalog.lookup("docx").await.is_empty());
}

// =============================================================================
// Converter
// =============================================================================

#[tokio::test]
async fn test_converter_routes_documents_and_images() {
    let base_url = spawn_fake_service().await;
    let converter = HttpConverter::new(&RemoteConfig::new(base_url)).unwrap();

    let output = converter.convert(request("report.docx", "pdf")).await.unwrap();
    assert_eq!(output.bytes, b"/convert_word_file|report.docx|pdf|5");

    let output = converter.convert(request("photo.png", "jpeg")).await.unwrap();
    assert_eq!(output.bytes, b"/convert_image_file|photo.png|jpeg|5");
    assert!(output
        .content_type
        .unwrap()
        .starts_with("text/plain"));
}

#[tokio::test]
async fn test_converter_rejection() {
    let base_url = spawn_fake_service().await;
    let converter = HttpConverter::new(&RemoteConfig::new(base_url)).unwrap();

    let err = converter
        .convert(request("photo.png", "tiff"))
        .await
        .unwrap_err();

    match err {
        ConverterError::Rejected { status, message } => {
            assert_eq!(status, 422);
            assert_eq!(message, "cannot produce tiff");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_converter_timeout() {
    let base_url = spawn_fake_service().await;
    let mut config = RemoteConfig::new(base_url);
    config.timeout_secs = 1;
    let converter = HttpConverter::new(&config).unwrap();

    let err = converter
        .convert(request("photo.png", "gif"))
        .await
        .unwrap_err();

    assert!(matches!(err, ConverterError::Timeout { timeout_secs: 1 }));
}

// =============================================================================
// Full session against the fake service
// =============================================================================

#[tokio::test]
async fn test_session_against_fake_service() {
    let base_url = spawn_fake_service().await;
    let config = RemoteConfig::new(base_url);
    let temp = tempfile::TempDir::new().unwrap();

    let store = Arc::new(SessionStore::new());
    let orchestrator = ConversionOrchestrator::new(
        store.clone(),
        Arc::new(HttpFormatCatalog::new(&config).unwrap()),
        Arc::new(HttpConverter::new(&config).unwrap()),
    );
    let exporter = ArtifactExporter::new(
        store.clone(),
        Arc::new(FsArtifactSink::new(temp.path())),
    );

    let ids = orchestrator
        .select_files(vec![
            FileSource::new("report.docx", b"doc".to_vec()),
            FileSource::new("photo.png", b"png".to_vec()),
            FileSource::new("data.xyz", b"???".to_vec()),
        ])
        .await;

    store.set_chosen_format(ids[0], "pdf").await.unwrap();
    store.set_chosen_format(ids[1], "tiff").await.unwrap();
    assert!(store.set_chosen_format(ids[2], "pdf").await.is_err());

    let outcomes = orchestrator.convert_all().await;
    assert_eq!(outcomes.len(), 2);

    let report = store.entry(ids[0]).await.unwrap();
    assert_eq!(report.status, ConversionStatus::Done);
    assert_eq!(report.output_filename.as_deref(), Some("report.pdf"));

    let photo = store.entry(ids[1]).await.unwrap();
    assert_eq!(photo.status, ConversionStatus::Failed);
    assert!(photo.failure.unwrap().contains("422"));

    let data = store.entry(ids[2]).await.unwrap();
    assert_eq!(data.status, ConversionStatus::Idle);
    assert_eq!(data.discovery, "unsupported");

    let receipt = exporter.export(ids[0]).await.unwrap().unwrap();
    let written = std::fs::read(temp.path().join("report.pdf")).unwrap();
    assert_eq!(written, b"/convert_word_file|report.docx|pdf|3");
    assert_eq!(receipt.size_bytes, written.len() as u64);
}
