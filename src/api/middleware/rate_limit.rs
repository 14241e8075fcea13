use crate::api::error::AppError;
use crate::config::MAX_RATE_LIMIT_WINDOW_SECS;
use crate::utils::request::{ClientIp, client_key};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Clone, Debug)]
struct Window {
    started_at: DateTime<Utc>,
    count: u32,
}

/// Fixed-window request counter per client
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    windows: DashMap<String, Window>,
}

impl RateLimiter {
    /// `window_secs` is clamped to `1..=MAX_RATE_LIMIT_WINDOW_SECS`.
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        let window_secs = window_secs.clamp(1, MAX_RATE_LIMIT_WINDOW_SECS);
        Self {
            max_requests,
            window: Duration::seconds(window_secs as i64),
            windows: DashMap::new(),
        }
    }

    /// Counts one request for `key`. Returns the seconds until the window resets when
    /// the limit is already used up.
    pub fn check(&self, key: &str) -> Result<(), i64> {
        self.check_at(key, Utc::now())
    }

    fn check_at(&self, key: &str, now: DateTime<Utc>) -> Result<(), i64> {
        let mut entry = self.windows.entry(key.to_string()).or_insert(Window {
            started_at: now,
            count: 0,
        });

        if now - entry.started_at >= self.window {
            entry.started_at = now;
            entry.count = 0;
        }

        if entry.count >= self.max_requests {
            let reset_in = (entry.started_at + self.window - now).num_seconds().max(1);
            return Err(reset_in);
        }

        entry.count += 1;
        Ok(())
    }

    /// Drop windows that have fully expired
    pub fn cleanup_expired(&self) {
        let now = Utc::now();
        self.windows.retain(|_, w| now - w.started_at < self.window);
    }
}

pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = client_key(req.extensions().get::<ClientIp>());

    if let Err(reset_in) = limiter.check(&key) {
        tracing::warn!("Rate limit exceeded for {} on {}", key, req.uri().path());
        return Err(AppError::TooManyRequests(format!(
            "Rate limit exceeded, retry in {} seconds",
            reset_in
        )));
    }

    Ok(next.run(req).await)
}
