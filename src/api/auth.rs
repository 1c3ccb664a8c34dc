//! Bearer authentication extractor and account endpoints

use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use super::{ApiJson, ApiResponse, AppState};
use crate::error::{AppError, Result};
use crate::models::{RegisterRequest, User};

/// The authenticated, approved user making the request
#[derive(Debug, Clone)]
pub struct Caller(pub User);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> std::result::Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let user = state.identity.resolve(header).await?;
        Ok(Caller(user))
    }
}

#[derive(Debug, Serialize)]
pub struct Registration {
    pub user: User,
    pub token: String,
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Registration>>)> {
    let user = state.accounts.register(request).await?;
    let token = state.identity.issue(user.id).await?;

    let message = if user.is_approved {
        "User registered successfully"
    } else {
        "Registration submitted. Your account is pending approval"
    };

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(message, Registration { user, token }),
    ))
}

pub async fn profile(Caller(user): Caller) -> Json<ApiResponse<User>> {
    ApiResponse::data(user)
}
