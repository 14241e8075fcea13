use crate::api::error::AppError;
use crate::models::StagedFile;
use crate::services::gemini::{GeminiClient, Part};
use crate::services::staging::StagingStore;
use std::sync::Arc;

pub const DESCRIBE_PROMPT: &str = "Describe the image with a general description. \
If the image shows the face of a well-known person, do not mention their name; \
describe what they look like and who they resemble instead. \
If the image contains anything controversial, leave it out or turn it into a harmless pun \
rather than addressing it directly.";

/// Turns a staged image into a neutral text description.
#[async_trait::async_trait]
pub trait ImageDescriber: Send + Sync {
    async fn describe(&self, staged: &StagedFile) -> Result<String, AppError>;
}

/// Uploads the image to the provider file store, asks the vision model for a
/// description and removes both copies of the image.
pub struct GeminiDescriber {
    client: Arc<GeminiClient>,
    staging: StagingStore,
}

impl GeminiDescriber {
    pub fn new(client: Arc<GeminiClient>, staging: StagingStore) -> Self {
        Self { client, staging }
    }
}

#[async_trait::async_trait]
impl ImageDescriber for GeminiDescriber {
    async fn describe(&self, staged: &StagedFile) -> Result<String, AppError> {
        let readable = !staged.path.as_os_str().is_empty()
            && tokio::fs::metadata(&staged.path)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false);
        if !readable {
            return Err(AppError::InvalidInput(format!(
                "staged image '{}' is not a readable file",
                staged.path.display()
            )));
        }

        let asset = self
            .client
            .upload_file(&staged.path, &staged.mimetype, "Image")
            .await
            .map_err(AppError::DescriptionService)?;

        let generated = self
            .client
            .generate_content(&[Part::file(&asset), Part::text(DESCRIBE_PROMPT)])
            .await;

        // The provider copy goes away whatever the generation outcome was.
        match self.client.delete_file(&asset.name).await {
            Ok(()) => tracing::info!("Deleted remote asset {} ({})", asset.display_name, asset.name),
            Err(e) => tracing::warn!("Failed to delete remote asset {}: {}", asset.name, e),
        }

        let description = generated.map_err(AppError::DescriptionService)?;

        self.staging.remove(&staged.path).await;

        Ok(description)
    }
}
