//! Bearer identity resolution and role checks
//!
//! Tokens are opaque session ids issued by [`SessionIdentity::issue`]. How a
//! user proves who they are before a token is issued is outside this crate.

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Role, User};
use crate::store::Store;

/// Lifetime of an issued session token
pub const SESSION_TTL_HOURS: i64 = 24;

/// Issues bearer credentials and resolves an `Authorization` header value to
/// the calling user
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Issue a new bearer token for `user_id`
    async fn issue(&self, user_id: Uuid) -> Result<String>;

    /// Fails with `Unauthenticated` when the credential is missing, malformed,
    /// unknown or expired, and with `Unapproved` when the user is not approved.
    async fn resolve(&self, authorization: Option<&str>) -> Result<User>;
}

/// Session tokens persisted in the store
#[derive(Clone)]
pub struct SessionIdentity {
    store: Store,
    ttl: chrono::Duration,
}

impl SessionIdentity {
    pub fn new(store: Store) -> Self {
        Self {
            store,
            ttl: chrono::Duration::hours(SESSION_TTL_HOURS),
        }
    }

    pub fn with_ttl(mut self, ttl: chrono::Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

#[async_trait]
impl IdentityProvider for SessionIdentity {
    async fn issue(&self, user_id: Uuid) -> Result<String> {
        let token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        let expires_at = Utc::now() + self.ttl;
        self.store.insert_session(&token, user_id, expires_at).await?;

        tracing::debug!(%user_id, %expires_at, "Issued session token");
        Ok(token)
    }

    async fn resolve(&self, authorization: Option<&str>) -> Result<User> {
        let header = authorization
            .ok_or_else(|| AppError::Unauthenticated("Missing authorization header".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AppError::Unauthenticated("Invalid authorization header format".to_string())
            })?;

        let user_id = self
            .store
            .session_user(token, Utc::now())
            .await?
            .ok_or_else(|| AppError::Unauthenticated("Invalid or expired token".to_string()))?;

        let user = self
            .store
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthenticated("User not found".to_string()))?;

        ensure_approved(&user)?;
        Ok(user)
    }
}

/// Pure role predicate
pub fn has_role(user: &User, allowed: &[Role]) -> bool {
    allowed.contains(&user.role)
}

/// Reject users still waiting for approval
pub fn ensure_approved(user: &User) -> Result<()> {
    if user.is_approved {
        Ok(())
    } else {
        Err(AppError::Unapproved)
    }
}

/// Approved user holding one of `allowed`, otherwise `Forbidden`
pub fn require_role(user: &User, allowed: &[Role]) -> Result<()> {
    ensure_approved(user)?;
    if has_role(user, allowed) {
        Ok(())
    } else {
        Err(AppError::Forbidden("Insufficient permissions".to_string()))
    }
}
