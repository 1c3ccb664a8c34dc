//! Rules for who may receive delegated review work

use crate::error::{AppError, Result};
use crate::models::{Role, User};

/// A delegation target must be an approved admin or super-admin
pub fn check_target(target: &User) -> Result<()> {
    if !Role::REVIEWERS.contains(&target.role) {
        return Err(AppError::Validation(
            "Target user is not an admin".to_string(),
        ));
    }

    if !target.is_approved {
        return Err(AppError::Validation(
            "Target admin is not approved".to_string(),
        ));
    }

    Ok(())
}
