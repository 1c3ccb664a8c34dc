//! Document endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use super::{ApiJson, ApiPath, ApiQuery, ApiResponse, AppState, Caller};
use crate::error::Result;
use crate::models::{
    CreateDocumentRequest, DelegateRequest, Document, DocumentFilters, HistoryEntry,
    UpdateStatusRequest,
};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<ApiResponse<Vec<Document>>>> {
    let filters = DocumentFilters::parse(query.status.as_deref(), query.priority.as_deref())?;
    let documents = state.lifecycle.list(&caller, filters).await?;
    Ok(ApiResponse::list(documents))
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    ApiJson(request): ApiJson<CreateDocumentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Document>>)> {
    let document = state.lifecycle.create(&caller, request).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("Document created successfully", document),
    ))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<Document>>> {
    let document = state.lifecycle.get(&caller, id).await?;
    Ok(ApiResponse::data(document))
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<Document>>> {
    let document = state
        .lifecycle
        .update_status(&caller, id, &request.status, request.reason.as_deref())
        .await?;
    Ok(ApiResponse::with_message(
        format!("Document status updated to {}", document.status.as_str()),
        document,
    ))
}

pub async fn delegate(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<DelegateRequest>,
) -> Result<Json<ApiResponse<Document>>> {
    let document = state
        .delegation
        .delegate(&caller, id, request.new_admin_id)
        .await?;
    Ok(ApiResponse::with_message(
        "Document delegated successfully",
        document,
    ))
}

pub async fn history(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<Vec<HistoryEntry>>>> {
    let entries = state.lifecycle.history(&caller, id).await?;
    Ok(ApiResponse::list(entries))
}
