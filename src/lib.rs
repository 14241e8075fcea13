pub mod api;
pub mod config;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use crate::api::middleware::rate_limit::{RateLimiter, rate_limit_middleware};
use crate::config::AppConfig;
use crate::services::pipeline::RoastPipeline;
use crate::services::turnstile::TurnstileVerifier;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::upload::upload_image,
        api::handlers::site_key::site_key,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            models::RoastResponse,
            models::ErrorResponse,
            models::UploadForm,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "roast", description = "Image roast endpoints"),
        (name = "system", description = "Service status")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RoastPipeline>,
    pub turnstile: Option<Arc<TurnstileVerifier>>,
    pub upload_limiter: Arc<RateLimiter>,
    pub global_limiter: Arc<RateLimiter>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        pipeline: Arc<RoastPipeline>,
        turnstile: Option<Arc<TurnstileVerifier>>,
    ) -> Self {
        Self {
            pipeline,
            turnstile,
            upload_limiter: Arc::new(RateLimiter::new(
                config.upload_rate_limit,
                config.rate_limit_window_secs,
            )),
            global_limiter: Arc::new(RateLimiter::new(
                config.global_rate_limit,
                config.rate_limit_window_secs,
            )),
            config,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let cors = match state
        .config
        .allowed_origin
        .as_deref()
        .and_then(|origin| HeaderValue::from_str(origin).ok())
    {
        Some(origin) => CorsLayer::new().allow_origin(origin),
        None => CorsLayer::new().allow_origin(Any),
    }
    .allow_methods(Any)
    .allow_headers(Any);

    let static_dir = state.config.static_dir.clone();

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .route("/health", get(api::handlers::health::health_check))
        .route("/cfs", put(api::handlers::site_key::site_key))
        .route(
            "/upload",
            post(api::handlers::upload::upload_image)
                .layer(from_fn_with_state(
                    state.clone(),
                    api::middleware::turnstile::turnstile_guard,
                ))
                .layer(from_fn_with_state(
                    state.upload_limiter.clone(),
                    rate_limit_middleware,
                )),
        )
        .fallback_service(ServeDir::new(static_dir))
        .layer(from_fn_with_state(
            state.global_limiter.clone(),
            rate_limit_middleware,
        ))
        .layer(from_fn(api::middleware::metrics::metrics_middleware))
        .layer(from_fn_with_state(
            state.config.trust_proxy,
            api::middleware::client_ip::client_ip_middleware,
        ))
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(cors)
        .layer(DefaultBodyLimit::max(state.config.max_upload_size))
        .with_state(state)
}
