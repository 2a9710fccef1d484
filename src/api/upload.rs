//! Image upload endpoint, shared by the admin panel and the admin API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::uploads::UploadCategory;
use crate::AppState;

/// Upload response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// POST /admin/upload, POST /api/admin/upload
///
/// Multipart fields: `category` (poster, members or life; defaults to poster)
/// followed by `file`. The file is streamed to disk chunk by chunk.
pub async fn upload_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut category = UploadCategory::Poster;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "category" => {
                category = field.text().await?.parse()?;
            }
            "file" => {
                let url = state.uploads.store(field, category).await?;
                return Ok(Json(UploadResponse { url }));
            }
            _ => {}
        }
    }

    Err(AppError::validation("No file provided"))
}
