//! Raw-body file upload

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::{ApiQuery, ApiResponse, AppState, Caller};
use crate::blob::StoredBlob;
use crate::error::{AppError, Result};

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub filename: Option<String>,
}

pub async fn upload(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    ApiQuery(query): ApiQuery<UploadQuery>,
    body: Bytes,
) -> Result<(StatusCode, Json<ApiResponse<StoredBlob>>)> {
    let filename = query
        .filename
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::Validation("filename query parameter is required".to_string()))?;

    let blob = state.blobs.put(filename, &body).await?;
    tracing::debug!(user_id = %caller.id, filename = %blob.filename, "Upload accepted");

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("File uploaded successfully", blob),
    ))
}
