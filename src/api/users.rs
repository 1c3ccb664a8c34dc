//! User administration endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use uuid::Uuid;

use super::{ApiPath, ApiResponse, AppState, Caller};
use crate::error::Result;
use crate::models::User;

pub async fn list_all(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
) -> Result<Json<ApiResponse<Vec<User>>>> {
    let users = state.accounts.all_users(&caller).await?;
    Ok(ApiResponse::list(users))
}

pub async fn pending_admins(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
) -> Result<Json<ApiResponse<Vec<User>>>> {
    let users = state.accounts.pending_admins(&caller).await?;
    Ok(ApiResponse::list(users))
}

/// Reviewers a document can be delegated to
pub async fn admins(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
) -> Result<Json<ApiResponse<Vec<User>>>> {
    let users = state.delegation.eligible_delegates(&caller).await?;
    Ok(ApiResponse::list(users))
}

pub async fn approve(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<ApiResponse<User>>> {
    let user = state.accounts.approve_admin(&caller, id).await?;
    Ok(ApiResponse::with_message("Admin approved successfully", user))
}
