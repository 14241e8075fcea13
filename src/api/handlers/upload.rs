use crate::AppState;
use crate::api::error::AppError;
use crate::models::{ErrorResponse, RoastResponse, UploadForm};
use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
};

#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data", description = "A single image file"),
    responses(
        (status = 200, description = "Roast generated", body = RoastResponse),
        (status = 400, description = "No file or more than one file", body = ErrorResponse),
        (status = 403, description = "Captcha verification failed", body = ErrorResponse),
        (status = 413, description = "Upload larger than 10 MiB", body = ErrorResponse),
        (status = 429, description = "Rate limit exceeded", body = ErrorResponse),
        (status = 500, description = "Description or generation failed", body = ErrorResponse)
    ),
    tag = "roast"
)]
pub async fn upload_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<RoastResponse>, AppError> {
    let multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let text = state.pipeline.run(multipart).await?;

    Ok(Json(RoastResponse { ok: true, text }))
}
