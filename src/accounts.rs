//! Account registration and admin approval

use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::identity::require_role;
use crate::models::{RegisterRequest, Role, User};
use crate::store::Store;

#[derive(Clone)]
pub struct Accounts {
    store: Store,
}

impl Accounts {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Self-registration. Students are approved immediately, admins wait for
    /// a super-admin.
    pub async fn register(&self, request: RegisterRequest) -> Result<User> {
        let email = request.email.trim();
        let full_name = request.full_name.trim();
        if email.is_empty() || full_name.is_empty() {
            return Err(AppError::Validation(
                "Email and full name are required".to_string(),
            ));
        }

        let role = match request.role.as_deref().map(str::trim) {
            None | Some("") => Role::Student,
            Some(raw) => raw
                .parse::<Role>()
                .map_err(|_| AppError::Validation(format!("Invalid role: {}", raw)))?,
        };

        let is_approved = match role {
            Role::Student => true,
            Role::Admin => false,
            Role::SuperAdmin => {
                return Err(AppError::Validation(
                    "Only student or admin accounts can be registered".to_string(),
                ))
            }
        };

        let user = self
            .store
            .create_user(email, full_name, role, request.faculty.trim(), is_approved)
            .await?;

        tracing::info!(
            user_id = %user.id,
            role = role.as_str(),
            is_approved,
            "User registered"
        );
        Ok(user)
    }

    /// Approve a pending admin account
    pub async fn approve_admin(&self, actor: &User, target_id: Uuid) -> Result<User> {
        require_role(actor, &[Role::SuperAdmin])?;

        let target = self
            .store
            .find_user(target_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        if target.role != Role::Admin {
            return Err(AppError::Validation("User is not an admin".to_string()));
        }
        if target.is_approved {
            return Err(AppError::Validation("Admin is already approved".to_string()));
        }

        let approved = self.store.mark_user_approved(target_id).await?;
        tracing::info!(
            admin_id = %target_id,
            approved_by = %actor.id,
            "Admin approved"
        );
        Ok(approved)
    }

    pub async fn pending_admins(&self, actor: &User) -> Result<Vec<User>> {
        require_role(actor, &[Role::SuperAdmin])?;
        self.store.list_pending_admins().await
    }

    pub async fn all_users(&self, actor: &User) -> Result<Vec<User>> {
        require_role(actor, &[Role::SuperAdmin])?;
        self.store.list_users().await
    }

    /// Create the approved super-admin on an empty database.
    ///
    /// Returns `None` when any user already exists.
    pub async fn seed_super_admin(&self, email: &str, full_name: &str) -> Result<Option<User>> {
        if self.store.count_users().await? > 0 {
            return Ok(None);
        }

        let user = self
            .store
            .create_user(email, full_name, Role::SuperAdmin, "", true)
            .await?;
        tracing::info!(user_id = %user.id, email, "Seeded super-admin account");
        Ok(Some(user))
    }
}
