use crate::api::error::AppError;
use crate::models::StagedFile;
use crate::services::describer::ImageDescriber;
use crate::services::ingress;
use crate::services::roaster::RoastGenerator;
use crate::services::staging::{RemoveOnDrop, StagingStore};
use axum::extract::Multipart;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Receiving,
    Describing,
    Generating,
    Responded,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Receiving => "receiving",
            Stage::Describing => "describing",
            Stage::Generating => "generating",
            Stage::Responded => "responded",
        };
        f.write_str(name)
    }
}

/// Upload → description → roast, owning the staged file from receipt to response.
pub struct RoastPipeline {
    staging: StagingStore,
    describer: Arc<dyn ImageDescriber>,
    roaster: Arc<dyn RoastGenerator>,
}

impl RoastPipeline {
    pub fn new(
        staging: StagingStore,
        describer: Arc<dyn ImageDescriber>,
        roaster: Arc<dyn RoastGenerator>,
    ) -> Self {
        Self {
            staging,
            describer,
            roaster,
        }
    }

    pub fn staging(&self) -> &StagingStore {
        &self.staging
    }

    /// Runs the whole request: stage the single uploaded image, then describe and roast it.
    pub async fn run(&self, multipart: Multipart) -> Result<String, AppError> {
        tracing::debug!(stage = %Stage::Receiving, "pipeline stage");
        let staged = ingress::receive(multipart, &self.staging).await?;
        self.process(staged).await
    }

    /// The staged file is removed on every exit path; removal is idempotent, so it is
    /// harmless when the describer already deleted it.
    ///
    /// Describe and roast run on their own task, so a client that disconnects does not
    /// cut the provider calls or the cleanup short.
    pub async fn process(&self, staged: StagedFile) -> Result<String, AppError> {
        let guard = RemoveOnDrop::new(&staged.path);
        let staging = self.staging.clone();
        let describer = Arc::clone(&self.describer);
        let roaster = Arc::clone(&self.roaster);

        let task = tokio::spawn(async move {
            let outcome = describe_then_roast(describer.as_ref(), roaster.as_ref(), &staged).await;

            if staging.remove(&staged.path).await {
                tracing::debug!("Removed leftover staged file {}", staged.filename);
            }
            guard.disarm();
            tracing::debug!(stage = %Stage::Responded, file = %staged.filename, ok = outcome.is_ok(), "pipeline stage");

            outcome
        });

        task.await
            .map_err(|e| AppError::Internal(format!("roast task failed: {}", e)))?
    }
}

async fn describe_then_roast(
    describer: &dyn ImageDescriber,
    roaster: &dyn RoastGenerator,
    staged: &StagedFile,
) -> Result<String, AppError> {
    tracing::debug!(stage = %Stage::Describing, file = %staged.filename, "pipeline stage");
    let description = describer.describe(staged).await?;

    tracing::debug!(stage = %Stage::Generating, file = %staged.filename, "pipeline stage");
    roaster.roast(&description).await
}
