use crate::AppState;
use axum::{Json, extract::State};
use base64::{Engine as _, engine::general_purpose::STANDARD};

/// Site key for the browser challenge widget, base64 encoded; `null` when bot
/// verification is not configured.
#[utoipa::path(
    put,
    path = "/cfs",
    responses(
        (status = 200, description = "Base64 site key or null", body = String)
    ),
    tag = "roast"
)]
pub async fn site_key(State(state): State<AppState>) -> Json<Option<String>> {
    Json(
        state
            .config
            .turnstile_site_key
            .as_ref()
            .map(|key| STANDARD.encode(key.as_bytes())),
    )
}
