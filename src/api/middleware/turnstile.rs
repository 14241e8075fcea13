use crate::AppState;
use crate::api::error::AppError;
use crate::utils::request::ClientIp;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

pub const TURNSTILE_TOKEN_HEADER: &str = "cf-turnstile-response";

/// Rejects uploads without a valid Turnstile token before the body is read.
/// Passes everything through when bot verification is not configured.
pub async fn turnstile_guard(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(verifier) = state.turnstile.as_ref() else {
        return Ok(next.run(req).await);
    };

    let token = req
        .headers()
        .get(TURNSTILE_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::Forbidden("Missing captcha token".to_string()))?;

    let remote_ip = req.extensions().get::<ClientIp>().map(|ClientIp(ip)| ip.clone());
    let outcome = verifier
        .verify(token, remote_ip.as_deref())
        .await
        .map_err(|e| AppError::Internal(format!("{:#}", e)))?;

    if !outcome.success {
        return Err(AppError::Forbidden("Captcha verification failed".to_string()));
    }

    Ok(next.run(req).await)
}
