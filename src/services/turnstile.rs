use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct VerifyResponse {
    pub success: bool,
    #[serde(rename = "error-codes", default)]
    pub error_codes: Vec<String>,
}

/// Server-side check of Cloudflare Turnstile tokens
pub struct TurnstileVerifier {
    http: reqwest::Client,
    secret: String,
    verify_url: String,
}

impl TurnstileVerifier {
    pub fn new(secret: String, verify_url: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            secret,
            verify_url,
        })
    }

    pub async fn verify(&self, token: &str, remote_ip: Option<&str>) -> Result<VerifyResponse> {
        let mut form = vec![("secret", self.secret.as_str()), ("response", token)];
        if let Some(ip) = remote_ip {
            form.push(("remoteip", ip));
        }

        let response = self
            .http
            .post(&self.verify_url)
            .form(&form)
            .send()
            .await
            .context("Turnstile verification request failed")?
            .error_for_status()
            .context("Turnstile verification endpoint returned an error")?;

        let outcome: VerifyResponse = response
            .json()
            .await
            .context("Invalid Turnstile verification response")?;

        if !outcome.success {
            tracing::warn!("Turnstile rejected token: {:?}", outcome.error_codes);
        }
        Ok(outcome)
    }
}
