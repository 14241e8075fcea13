use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;

/// One uploaded image held on local disk for the lifetime of a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    /// Generated name: random hex followed by the original extension
    pub filename: String,
    pub mimetype: String,
    pub encoding: String,
    pub path: PathBuf,
}

/// The same image after upload to the provider's file store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAsset {
    pub uri: String,
    pub mime_type: String,
    /// Resource name, e.g. `files/abc123`
    pub name: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RoastResponse {
    pub ok: bool,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Multipart form accepted by `POST /upload`
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}
