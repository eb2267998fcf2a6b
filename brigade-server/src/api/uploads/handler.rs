//! Image Upload Handler
//!
//! Accepts one multipart `file` field, normalizes it to JPEG and stores it
//! under a content-addressed key, so uploading the same photo twice is free.

use axum::extract::{Multipart, State};
use axum::{Extension, Json};
use shared::error::{AppError, ErrorCode};

use crate::api::ApiResult;
use crate::auth::Identity;
use crate::media::{StoredImage, store_image};
use crate::state::AppState;

/// POST /api/uploads
pub async fn upload(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    mut multipart: Multipart,
) -> ApiResult<StoredImage> {
    let restaurant_id = identity.tenant_id()?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Invalid multipart request: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?;

        let stored = store_image(
            state.media.as_ref(),
            restaurant_id,
            &data,
            filename.as_deref(),
            content_type.as_deref(),
        )
        .await?;
        tracing::info!(
            user_id = identity.user_id,
            original_name = filename.as_deref().unwrap_or(""),
            hash = %stored.hash,
            "Image uploaded"
        );
        return Ok(Json(stored));
    }

    Err(AppError::with_message(
        ErrorCode::NoFileProvided,
        "No 'file' field found. Field name must be 'file'",
    )
    .into())
}
