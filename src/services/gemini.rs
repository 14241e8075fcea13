//! Minimal REST client for the Gemini file store and `generateContent` endpoint.

use crate::models::RemoteAsset;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

const API_VERSION: &str = "v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("request timed out")]
    Timeout,

    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("provider returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to decode provider response: {0}")]
    Decode(String),

    #[error("upload session URL missing from provider response")]
    MissingUploadUrl,

    #[error("provider returned no text (block reason: {block_reason:?})")]
    EmptyResponse { block_reason: Option<String> },

    #[error("failed to read staged file: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for GeminiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GeminiError::Timeout
        } else if e.is_decode() {
            GeminiError::Decode(e.to_string())
        } else {
            GeminiError::Transport(e)
        }
    }
}

impl GeminiError {
    /// Whether repeating the same idempotent call could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            GeminiError::Timeout | GeminiError::Transport(_) => true,
            GeminiError::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl From<&crate::config::AppConfig> for GeminiConfig {
    fn from(config: &crate::config::AppConfig) -> Self {
        Self {
            api_key: config.gemini_api_key.clone(),
            base_url: config.gemini_base_url.clone(),
            model: config.gemini_model.clone(),
            timeout_secs: config.ai_timeout_secs,
            max_retries: config.ai_max_retries,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Part {
    Text {
        text: String,
    },
    FileData {
        #[serde(rename = "fileData")]
        file_data: FileData,
    },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn file(asset: &RemoteAsset) -> Self {
        Part::FileData {
            file_data: FileData {
                mime_type: asset.mime_type.clone(),
                file_uri: asset.uri.clone(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    pub mime_type: String,
    pub file_uri: String,
}

#[derive(Serialize)]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: &'a [Part],
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate.
    pub fn into_text(self) -> Result<String, GeminiError> {
        let text: String = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(GeminiError::EmptyResponse {
                block_reason: self.prompt_feedback.and_then(|f| f.block_reason),
            });
        }
        Ok(text)
    }
}

#[derive(Deserialize)]
struct UploadFileResponse {
    file: RemoteAsset,
}

pub struct GeminiClient {
    http: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self, GeminiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(GeminiError::Transport)?;
        Ok(Self { http, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Uploads a local file through the resumable protocol (start, then upload+finalize).
    pub async fn upload_file(
        &self,
        path: &Path,
        mime_type: &str,
        display_name: &str,
    ) -> Result<RemoteAsset, GeminiError> {
        let bytes = tokio::fs::read(path).await?;

        let start = self
            .http
            .post(format!("{}/upload/{}/files", self.config.base_url, API_VERSION))
            .header(API_KEY_HEADER, &self.config.api_key)
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", bytes.len().to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&serde_json::json!({ "file": { "display_name": display_name } }))
            .send()
            .await?;
        let start = check_status(start).await?;

        let upload_url = start
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .ok_or(GeminiError::MissingUploadUrl)?;

        let finalize = self
            .http
            .post(upload_url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(bytes)
            .send()
            .await?;
        let uploaded: UploadFileResponse = check_status(finalize).await?.json().await?;

        tracing::debug!(
            "Uploaded {} as {} ({})",
            path.display(),
            uploaded.file.name,
            uploaded.file.uri
        );
        Ok(uploaded.file)
    }

    /// Removes an uploaded file from the provider. `name` is the resource name (`files/...`).
    pub async fn delete_file(&self, name: &str) -> Result<(), GeminiError> {
        let response = self
            .http
            .delete(format!("{}/{}/{}", self.config.base_url, API_VERSION, name))
            .header(API_KEY_HEADER, &self.config.api_key)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    /// Single-turn generation. Transient failures are retried up to `max_retries` times.
    pub async fn generate_content(&self, parts: &[Part]) -> Result<String, GeminiError> {
        let mut attempt = 0;
        loop {
            match self.generate_once(parts).await {
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        "generateContent attempt {} failed ({}), retrying",
                        attempt,
                        e
                    );
                }
                result => return result,
            }
        }
    }

    async fn generate_once(&self, parts: &[Part]) -> Result<String, GeminiError> {
        let request = GenerateContentRequest {
            contents: [Content {
                role: "user",
                parts,
            }],
        };

        let response = self
            .http
            .post(format!(
                "{}/{}/models/{}:generateContent",
                self.config.base_url, API_VERSION, self.config.model
            ))
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let body: GenerateContentResponse = check_status(response).await?.json().await?;
        body.into_text()
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, GeminiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(GeminiError::Status { status, body })
}
