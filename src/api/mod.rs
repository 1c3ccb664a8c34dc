//! HTTP API over the workflow services

pub mod auth;
pub mod documents;
pub mod extract;
pub mod upload;
pub mod users;

use std::path::Path;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::accounts::Accounts;
use crate::blob::{BlobStore, MAX_UPLOAD_BYTES};
use crate::delegation::DelegationManager;
use crate::identity::{IdentityProvider, SessionIdentity};
use crate::lifecycle::DocumentLifecycle;
use crate::store::Store;

pub use auth::Caller;
pub use extract::{ApiJson, ApiPath, ApiQuery};

/// Application state shared across handlers
pub struct AppState {
    pub store: Store,
    pub lifecycle: DocumentLifecycle,
    pub delegation: DelegationManager,
    pub accounts: Accounts,
    pub identity: Arc<dyn IdentityProvider>,
    pub blobs: Arc<dyn BlobStore>,
}

impl AppState {
    /// Wire the services over `store` with session-token identity
    pub fn new(store: Store, blobs: Arc<dyn BlobStore>) -> Arc<Self> {
        Arc::new(Self {
            lifecycle: DocumentLifecycle::new(store.clone()),
            delegation: DelegationManager::new(store.clone()),
            accounts: Accounts::new(store.clone()),
            identity: Arc::new(SessionIdentity::new(store.clone())),
            store,
            blobs,
        })
    }
}

/// Success envelope shared by every JSON endpoint
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn data(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: None,
            data: Some(data),
            count: None,
        })
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
            count: None,
        })
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    pub fn list(items: Vec<T>) -> Json<Self> {
        Json(Self {
            success: true,
            message: None,
            count: Some(items.len()),
            data: Some(items),
        })
    }
}

/// Build the router. Uploaded files are served from `upload_dir`.
pub fn router(state: Arc<AppState>, upload_dir: &Path) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/profile", get(auth::profile))
        .route("/users", get(users::list_all))
        .route("/users/pending-admins", get(users::pending_admins))
        .route("/users/admins", get(users::admins))
        .route("/users/:id/approve", put(users::approve))
        .route(
            "/documents",
            get(documents::list).post(documents::create),
        )
        .route("/documents/:id", get(documents::get))
        .route("/documents/:id/status", put(documents::update_status))
        .route("/documents/:id/delegate", put(documents::delegate))
        .route("/documents/:id/history", get(documents::history))
        .route(
            "/api/upload",
            post(upload::upload).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": "Server is running",
        "timestamp": chrono::Utc::now(),
    }))
}
