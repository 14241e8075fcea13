use crate::api::error::AppError;
use crate::models::StagedFile;
use crate::services::staging::{RemoveOnDrop, StagingStore};
use axum::extract::Multipart;
use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use futures::TryStreamExt;
use tokio_util::io::StreamReader;

/// Consumes the multipart body and stages exactly one file part.
///
/// Non-file parts are skipped. A second file part fails the request with
/// `MultipleFiles`; whatever was already staged for the request is removed before any
/// error is returned, so a rejected upload leaves nothing on disk. The staged file is
/// also removed if this future is dropped before all parts are read.
pub async fn receive(mut multipart: Multipart, staging: &StagingStore) -> Result<StagedFile, AppError> {
    let mut staged: Option<(StagedFile, RemoveOnDrop)> = None;

    if let Err(e) = consume_parts(&mut multipart, staging, &mut staged).await {
        if let Some((file, guard)) = staged.take() {
            staging.remove(&file.path).await;
            guard.disarm();
        }
        return Err(e);
    }

    match staged {
        Some((file, guard)) => {
            guard.disarm();
            Ok(file)
        }
        None => Err(AppError::NoFile),
    }
}

async fn consume_parts(
    multipart: &mut Multipart,
    staging: &StagingStore,
    staged: &mut Option<(StagedFile, RemoveOnDrop)>,
) -> Result<(), AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(original_name) = field.file_name().map(str::to_owned) else {
            tracing::debug!("Skipping non-file part {:?}", field.name());
            continue;
        };

        if staged.is_some() {
            return Err(AppError::MultipleFiles);
        }

        let file = stage_field(field, &original_name, staging).await?;
        let guard = RemoveOnDrop::new(&file.path);
        *staged = Some((file, guard));
    }
    Ok(())
}

async fn stage_field(
    field: Field<'_>,
    original_name: &str,
    staging: &StagingStore,
) -> Result<StagedFile, AppError> {
    let mimetype = field
        .content_type()
        .map(str::to_owned)
        .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string());
    let encoding = field
        .headers()
        .get("content-transfer-encoding")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("7bit")
        .to_string();
    let filename = staging.generate_name(original_name);

    let body = field.map_err(std::io::Error::other);
    let reader = StreamReader::new(body);

    let path = staging
        .write(&filename, reader)
        .await
        .map_err(staging_error)?;

    tracing::info!("Received {} as {} ({})", original_name, filename, mimetype);

    Ok(StagedFile {
        filename,
        mimetype,
        encoding,
        path,
    })
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::BadRequest(e.body_text())
    }
}

/// Body read failures surface through the copy as io errors; keep them client errors.
fn staging_error(e: std::io::Error) -> AppError {
    let multipart = e
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<MultipartError>());

    match multipart {
        Some(m) if m.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            AppError::PayloadTooLarge(m.body_text())
        }
        Some(m) => AppError::BadRequest(m.body_text()),
        None => AppError::StagingWrite(e),
    }
}
