use crate::config::AppConfig;
use crate::services::turnstile::TurnstileVerifier;
use std::sync::Arc;
use tracing::info;

pub fn setup_turnstile(config: &AppConfig) -> anyhow::Result<Option<Arc<TurnstileVerifier>>> {
    let Some(secret) = config
        .turnstile_secret
        .clone()
        .filter(|_| config.turnstile_enabled())
    else {
        info!("TURNSTILE_KEY or TURNSTILE_SECRET not provided. Skipping bot verification.");
        return Ok(None);
    };

    info!("🛡️  Turnstile verification enabled for /upload");
    let verifier = TurnstileVerifier::new(secret, config.turnstile_verify_url.clone())?;
    Ok(Some(Arc::new(verifier)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verifier_needs_both_keys() {
        let config = AppConfig {
            turnstile_secret: Some("secret".to_string()),
            ..AppConfig::default()
        };
        assert!(setup_turnstile(&config).unwrap().is_none());

        let config = AppConfig {
            turnstile_site_key: Some("site".to_string()),
            ..config
        };
        assert!(setup_turnstile(&config).unwrap().is_some());
    }
}
