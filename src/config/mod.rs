use std::env;
use std::path::PathBuf;

/// Hard upper bound for one upload request body (10 MiB).
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Random bytes used for each staged filename before hex encoding.
pub const FILENAME_ENTROPY_BYTES: usize = 16;

/// Longest rate limit window accepted from the environment (one day).
pub const MAX_RATE_LIMIT_WINDOW_SECS: u64 = 24 * 60 * 60;

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_TURNSTILE_VERIFY_URL: &str =
    "https://challenges.cloudflare.com/turnstile/v0/siteverify";

/// Runtime configuration for the roast service
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Generative AI provider API key (default: empty)
    pub gemini_api_key: String,

    /// Provider base URL, overridable for tests and proxies
    pub gemini_base_url: String,

    /// Model used for both the description and the roast (default: "gemini-1.5-flash")
    pub gemini_model: String,

    /// Timeout applied to every outbound AI call in seconds (default: 60)
    pub ai_timeout_secs: u64,

    /// Extra attempts for generateContent calls (default: 1)
    pub ai_max_retries: u32,

    /// Directory holding staged uploads (default: "uploads")
    pub upload_dir: PathBuf,

    /// Directory holding the landing page (default: "public")
    pub static_dir: PathBuf,

    /// Maximum request body size in bytes. Always MAX_UPLOAD_SIZE outside of tests.
    pub max_upload_size: usize,

    /// Random bytes per staged filename. Always FILENAME_ENTROPY_BYTES outside of tests.
    pub filename_entropy_bytes: usize,

    /// Allowed CORS origin; any origin when unset
    pub allowed_origin: Option<String>,

    /// Turnstile site key shared with the browser widget
    pub turnstile_site_key: Option<String>,
    /// Turnstile secret used for server-side verification
    pub turnstile_secret: Option<String>,
    /// Turnstile verification endpoint
    pub turnstile_verify_url: String,

    /// Uploads allowed per client per window (default: 5)
    pub upload_rate_limit: u32,

    /// Requests allowed per client per window on every route (default: 50)
    pub global_rate_limit: u32,

    /// Rate limit window in seconds (default: 60, at most one day)
    pub rate_limit_window_secs: u64,

    /// Key clients by X-Forwarded-For / X-Real-IP instead of the socket address.
    /// Only enable behind a proxy that overwrites those headers (default: false)
    pub trust_proxy: bool,

    /// Optional support page mentioned at the end of each roast
    pub support_link: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: String::new(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            gemini_model: "gemini-1.5-flash".to_string(),
            ai_timeout_secs: 60,
            ai_max_retries: 1,
            upload_dir: PathBuf::from("uploads"),
            static_dir: PathBuf::from("public"),
            max_upload_size: MAX_UPLOAD_SIZE,
            filename_entropy_bytes: FILENAME_ENTROPY_BYTES,
            allowed_origin: None,
            turnstile_site_key: None,
            turnstile_secret: None,
            turnstile_verify_url: DEFAULT_TURNSTILE_VERIFY_URL.to_string(),
            upload_rate_limit: 5,
            global_rate_limit: 50,
            rate_limit_window_secs: 60,
            trust_proxy: false,
            support_link: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            gemini_api_key: env::var("API_KEY")
                .or_else(|_| env::var("GEMINI_API_KEY"))
                .unwrap_or(default.gemini_api_key),

            gemini_base_url: env::var("GEMINI_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(default.gemini_base_url),

            gemini_model: env::var("GEMINI_MODEL").unwrap_or(default.gemini_model),

            ai_timeout_secs: env::var("AI_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.ai_timeout_secs),

            ai_max_retries: env::var("AI_MAX_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.ai_max_retries),

            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),

            static_dir: env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.static_dir),

            max_upload_size: MAX_UPLOAD_SIZE,
            filename_entropy_bytes: FILENAME_ENTROPY_BYTES,

            allowed_origin: non_empty_var("ORIGIN"),
            turnstile_site_key: non_empty_var("TURNSTILE_KEY"),
            turnstile_secret: non_empty_var("TURNSTILE_SECRET"),
            turnstile_verify_url: env::var("TURNSTILE_VERIFY_URL")
                .unwrap_or(default.turnstile_verify_url),

            upload_rate_limit: env::var("UPLOAD_RATE_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.upload_rate_limit),

            global_rate_limit: env::var("GLOBAL_RATE_LIMIT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.global_rate_limit),

            rate_limit_window_secs: env::var("RATE_LIMIT_WINDOW_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(default.rate_limit_window_secs)
                .clamp(1, MAX_RATE_LIMIT_WINDOW_SECS),

            trust_proxy: non_empty_var("TRUST_PROXY")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(default.trust_proxy),

            support_link: non_empty_var("SUPPORT_LINK"),
        }
    }

    /// Bot verification only runs when both halves of the key pair are present.
    pub fn turnstile_enabled(&self) -> bool {
        self.turnstile_site_key.is_some() && self.turnstile_secret.is_some()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
