use crate::config::AppConfig;
use crate::services::staging::StagingStore;
use anyhow::Context;
use tracing::info;

pub async fn setup_staging(config: &AppConfig) -> anyhow::Result<StagingStore> {
    let store = StagingStore::new(&config.upload_dir, config.filename_entropy_bytes);
    store
        .ensure_directory()
        .await
        .with_context(|| format!("Failed to create upload dir {}", config.upload_dir.display()))?;

    info!("📂 Staging uploads in {}", config.upload_dir.display());
    Ok(store)
}
