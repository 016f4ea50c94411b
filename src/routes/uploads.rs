use std::{path::Path, sync::Arc};

use anyhow::Context;
use axum::{Json, extract::{Multipart, State}, http::StatusCode};

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::UploadResponse,
};

pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "avif"];

/// Stores the multipart `file` field under the upload directory and returns
/// the relative path the catalog records reference.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<UploadResponse>)> {
    while let Some(field) =
        multipart.next_field().await.map_err(|e| AppError::invalid_body(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let extension = field
            .file_name()
            .and_then(image_extension)
            .ok_or_else(|| AppError::invalid_field("file", "must be an image file"))?;
        let bytes = field.bytes().await.map_err(|e| AppError::invalid_body(e.body_text()))?;
        if bytes.is_empty() {
            return Err(AppError::invalid_field("file", "must not be empty"));
        }

        let file_name = format!("{}.{extension}", uuid::Uuid::new_v4().simple());
        tokio::fs::create_dir_all(&state.config.upload_dir)
            .await
            .context("create upload dir")?;
        tokio::fs::write(state.config.upload_dir.join(&file_name), &bytes)
            .await
            .context("write upload")?;

        tracing::info!(file = %file_name, size = bytes.len(), "stored upload");
        return Ok((StatusCode::CREATED, Json(UploadResponse { path: format!("uploads/{file_name}") })));
    }

    Err(AppError::invalid_field("file", "is required"))
}

fn image_extension(file_name: &str) -> Option<String> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}
