#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use roast_backend::api::error::AppError;
use roast_backend::config::AppConfig;
use roast_backend::models::StagedFile;
use roast_backend::services::describer::ImageDescriber;
use roast_backend::services::gemini::GeminiError;
use roast_backend::services::pipeline::RoastPipeline;
use roast_backend::services::roaster::RoastGenerator;
use roast_backend::services::staging::StagingStore;
use roast_backend::services::turnstile::TurnstileVerifier;
use roast_backend::{AppState, create_app};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tower::ServiceExt;

pub const BOUNDARY: &str = "---------------------------roastboundary0123456789";

/// Describer double that behaves like the real one on disk: it removes the staged
/// file only when it succeeds.
pub struct StubDescriber {
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl StubDescriber {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            fail: false,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ImageDescriber for StubDescriber {
    async fn describe(&self, staged: &StagedFile) -> Result<String, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        assert!(staged.path.is_file(), "staged file should exist while describing");

        if self.fail {
            return Err(AppError::DescriptionService(GeminiError::Status {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: "provider secret detail".to_string(),
            }));
        }

        tokio::fs::remove_file(&staged.path).await.unwrap();
        Ok(format!("a picture stored as {}", staged.filename))
    }
}

pub struct StubRoaster {
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl StubRoaster {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self {
            fail: false,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl RoastGenerator for StubRoaster {
    async fn roast(&self, description: &str) -> Result<String, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(AppError::Generation(GeminiError::EmptyResponse {
                block_reason: Some("SAFETY".to_string()),
            }));
        }
        Ok(format!("## Roast\nWow, {} 🔥", description))
    }
}

pub fn test_config(root: &Path) -> AppConfig {
    AppConfig {
        upload_dir: root.join("uploads"),
        static_dir: root.join("public"),
        ..AppConfig::default()
    }
}

pub fn build_app(
    config: AppConfig,
    describer: Arc<dyn ImageDescriber>,
    roaster: Arc<dyn RoastGenerator>,
    turnstile: Option<Arc<TurnstileVerifier>>,
) -> Router {
    let staging = StagingStore::new(&config.upload_dir, config.filename_entropy_bytes);
    let pipeline = Arc::new(RoastPipeline::new(staging, describer, roaster));
    create_app(AppState::new(config, pipeline, turnstile))
}

/// A part is (field name, optional filename, content type, bytes).
pub fn multipart_body(parts: &[(&str, Option<&str>, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, content_type, data) in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                    name, filename, content_type
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
            ),
        }
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

pub fn staged_entries(dir: &Path) -> Vec<PathBuf> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}
