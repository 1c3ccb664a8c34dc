//! Delegation manager for reassigning document review
//!
//! The manager handles:
//! - Target eligibility (approved admins and super-admins only)
//! - Reassignment of pending documents, recorded in the audit trail
//! - Listing the reviewers work can be delegated to

use uuid::Uuid;

use super::eligibility::check_target;
use crate::error::{AppError, Result};
use crate::identity::{ensure_approved, require_role};
use crate::lifecycle::ensure_in_scope;
use crate::models::{Document, HistoryAction, NewHistoryEntry, Role, User};
use crate::store::Store;

/// Manager for delegation of review work
#[derive(Clone)]
pub struct DelegationManager {
    store: Store,
}

impl DelegationManager {
    /// Create a new delegation manager
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Assign `document_id` to `new_admin_id` on behalf of `actor`
    pub async fn delegate(
        &self,
        actor: &User,
        document_id: Uuid,
        new_admin_id: Uuid,
    ) -> Result<Document> {
        require_role(actor, Role::REVIEWERS)?;

        let target = self
            .store
            .find_user(new_admin_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Target admin not found".to_string()))?;
        check_target(&target)?;

        let doc = self.store.get_document(document_id).await?;
        ensure_in_scope(actor, &doc)?;
        if doc.status.is_terminal() {
            return Err(AppError::Validation(format!(
                "Cannot delegate a document that is already {}",
                doc.status.as_str()
            )));
        }

        let entry = NewHistoryEntry::new(
            document_id,
            actor.id,
            HistoryAction::Delegated,
            format!("Delegated to {}", target.full_name),
        );

        let applied = self
            .store
            .assign_pending(document_id, target.id, &entry)
            .await?;
        if !applied {
            return Err(AppError::Validation(
                "Document is no longer pending".to_string(),
            ));
        }

        tracing::info!(
            %document_id,
            delegator_id = %actor.id,
            assignee_id = %target.id,
            "Document delegated"
        );

        self.store.get_document(document_id).await
    }

    /// Approved admins and super-admins that can receive delegated work
    pub async fn eligible_delegates(&self, caller: &User) -> Result<Vec<User>> {
        ensure_approved(caller)?;
        self.store.list_reviewers().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::DocumentLifecycle;
    use crate::models::{CreateDocumentRequest, DocumentStatus};
    use sqlx::sqlite::SqlitePoolOptions;

    struct Fixture {
        store: Store,
        manager: DelegationManager,
        lifecycle: DocumentLifecycle,
        student: User,
        admin: User,
    }

    async fn setup() -> Fixture {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        crate::db::migrate(&pool).await.unwrap();

        let store = Store::new(pool);
        let student = store
            .create_user("s@example.com", "Sam Student", Role::Student, "", true)
            .await
            .unwrap();
        let admin = store
            .create_user("a@example.com", "Ann Admin", Role::Admin, "", true)
            .await
            .unwrap();

        Fixture {
            manager: DelegationManager::new(store.clone()),
            lifecycle: DocumentLifecycle::new(store.clone()),
            store,
            student,
            admin,
        }
    }

    async fn make_document(f: &Fixture) -> Document {
        f.lifecycle
            .create(
                &f.student,
                CreateDocumentRequest {
                    title: "Thesis draft".to_string(),
                    description: String::new(),
                    file_path: String::new(),
                    priority: None,
                },
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_delegate_to_approved_admin() {
        let f = setup().await;
        let bob = f
            .store
            .create_user("b@example.com", "Bob Reviewer", Role::Admin, "", true)
            .await
            .unwrap();
        let doc = make_document(&f).await;

        let delegated = f.manager.delegate(&f.admin, doc.id, bob.id).await.unwrap();
        assert_eq!(delegated.assigned_to_id, Some(bob.id));
        assert_eq!(delegated.assigned_to_name.as_deref(), Some("Bob Reviewer"));
        assert_eq!(delegated.status, DocumentStatus::Pending);

        let history = f.store.history_for_document(doc.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].action, HistoryAction::Delegated);
        assert_eq!(history[0].comment, "Delegated to Bob Reviewer");
        assert_eq!(history[0].actor_id, f.admin.id);
    }

    #[tokio::test]
    async fn test_delegate_to_unapproved_admin_leaves_assignment() {
        let f = setup().await;
        let pending = f
            .store
            .create_user("p@example.com", "Pat Pending", Role::Admin, "", false)
            .await
            .unwrap();
        let doc = make_document(&f).await;

        let result = f.manager.delegate(&f.admin, doc.id, pending.id).await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let unchanged = f.store.get_document(doc.id).await.unwrap();
        assert_eq!(unchanged.assigned_to_id, None);
        assert_eq!(f.store.history_for_document(doc.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delegate_to_student_fails() {
        let f = setup().await;
        let doc = make_document(&f).await;

        let result = f.manager.delegate(&f.admin, doc.id, f.student.id).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delegate_unknown_target_or_document() {
        let f = setup().await;
        let doc = make_document(&f).await;

        let result = f.manager.delegate(&f.admin, doc.id, Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));

        let result = f.manager.delegate(&f.admin, Uuid::new_v4(), f.admin.id).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_student_cannot_delegate() {
        let f = setup().await;
        let doc = make_document(&f).await;

        let result = f.manager.delegate(&f.student, doc.id, f.admin.id).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_cannot_delegate_terminal_document() {
        let f = setup().await;
        let doc = make_document(&f).await;
        f.manager.delegate(&f.admin, doc.id, f.admin.id).await.unwrap();
        f.lifecycle
            .update_status(&f.admin, doc.id, "approved", None)
            .await
            .unwrap();

        let result = f.manager.delegate(&f.admin, doc.id, f.admin.id).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_cannot_delegate_outside_review_queue() {
        let f = setup().await;
        let other = f
            .store
            .create_user("o@example.com", "Otto Other", Role::Admin, "", true)
            .await
            .unwrap();
        let doc = make_document(&f).await;
        f.manager.delegate(&other, doc.id, other.id).await.unwrap();

        let result = f.manager.delegate(&f.admin, doc.id, f.admin.id).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));

        let unchanged = f.store.get_document(doc.id).await.unwrap();
        assert_eq!(unchanged.assigned_to_id, Some(other.id));
        assert_eq!(f.store.history_for_document(doc.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_eligible_delegates() {
        let f = setup().await;
        f.store
            .create_user("p@example.com", "Pat Pending", Role::Admin, "", false)
            .await
            .unwrap();

        let delegates = f.manager.eligible_delegates(&f.student).await.unwrap();
        assert_eq!(delegates.len(), 1);
        assert_eq!(delegates[0].id, f.admin.id);
    }
}
