//! Document lifecycle engine
//!
//! Owns the document state machine and the role-scoped visibility rule:
//!
//! - `pending -> approved | rejected | pending` by an admin or super-admin
//! - `pending -> expired` by the expiration sweep
//!
//! Every transition writes its history entry in the same transaction as the
//! status change, and only applies while the document is still pending.

use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::identity::{ensure_approved, require_role};
use crate::models::{
    CreateDocumentRequest, Document, DocumentFilters, DocumentStatus, HistoryAction,
    HistoryEntry, NewHistoryEntry, PriorityInput, Role, User,
};
use crate::store::{NewDocument, Store};

/// Which documents a caller may see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentScope {
    /// Documents the user created
    CreatedBy(Uuid),
    /// Documents assigned to the user, plus unassigned pending ones
    ReviewQueue(Uuid),
    /// Everything
    All,
}

impl DocumentScope {
    pub fn for_user(user: &User) -> Self {
        match user.role {
            Role::Student => DocumentScope::CreatedBy(user.id),
            Role::Admin => DocumentScope::ReviewQueue(user.id),
            Role::SuperAdmin => DocumentScope::All,
        }
    }

    pub fn admits(&self, doc: &Document) -> bool {
        match *self {
            DocumentScope::CreatedBy(user_id) => doc.creator_id == user_id,
            DocumentScope::ReviewQueue(user_id) => {
                doc.assigned_to_id == Some(user_id)
                    || (doc.assigned_to_id.is_none() && doc.status == DocumentStatus::Pending)
            }
            DocumentScope::All => true,
        }
    }
}

/// `Forbidden` unless `user`'s scope admits `doc`. Applies to reads and writes alike.
pub fn ensure_in_scope(user: &User, doc: &Document) -> Result<()> {
    if DocumentScope::for_user(user).admits(doc) {
        Ok(())
    } else {
        Err(AppError::Forbidden("Access denied".to_string()))
    }
}

/// Target of an interactive status update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTarget {
    Approved,
    Rejected,
    Pending,
}

impl StatusTarget {
    pub fn status(&self) -> DocumentStatus {
        match self {
            StatusTarget::Approved => DocumentStatus::Approved,
            StatusTarget::Rejected => DocumentStatus::Rejected,
            StatusTarget::Pending => DocumentStatus::Pending,
        }
    }
}

impl std::str::FromStr for StatusTarget {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "approved" => Ok(StatusTarget::Approved),
            "rejected" => Ok(StatusTarget::Rejected),
            "pending" => Ok(StatusTarget::Pending),
            _ => Err(AppError::Validation(
                "Invalid status. Must be 'approved', 'rejected', or 'pending'".to_string(),
            )),
        }
    }
}

/// History action and comment recorded for an interactive status update.
///
/// A pending re-affirmation reuses the `Created` action.
pub fn status_history(target: StatusTarget, reason: &str) -> (HistoryAction, String) {
    match target {
        StatusTarget::Approved => (HistoryAction::Approved, "Document approved".to_string()),
        StatusTarget::Rejected => (HistoryAction::Rejected, format!("Rejected: {}", reason)),
        StatusTarget::Pending => (
            HistoryAction::Created,
            format!("Status changed to {}", DocumentStatus::Pending.as_str()),
        ),
    }
}

/// Lifecycle operations over the document store
#[derive(Clone)]
pub struct DocumentLifecycle {
    store: Store,
}

impl DocumentLifecycle {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Create a pending document owned by `creator`
    pub async fn create(&self, creator: &User, request: CreateDocumentRequest) -> Result<Document> {
        ensure_approved(creator)?;

        let title = request.title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }

        let priority = request
            .priority
            .as_ref()
            .map(PriorityInput::resolve)
            .unwrap_or_default();

        let doc = self
            .store
            .create_document(
                NewDocument {
                    title: title.to_string(),
                    description: request.description,
                    file_path: request.file_path,
                    priority,
                    creator_id: creator.id,
                },
                "Document created",
            )
            .await?;

        tracing::info!(
            document_id = %doc.id,
            creator_id = %creator.id,
            priority = priority.as_str(),
            "Document created"
        );

        Ok(doc)
    }

    /// Apply a reviewer's decision to a pending document
    pub async fn update_status(
        &self,
        actor: &User,
        document_id: Uuid,
        new_status: &str,
        reason: Option<&str>,
    ) -> Result<Document> {
        require_role(actor, Role::REVIEWERS)?;

        let target: StatusTarget = new_status.trim().parse()?;
        let reason = reason.map(str::trim).unwrap_or_default();
        if target == StatusTarget::Rejected && reason.is_empty() {
            return Err(AppError::Validation(
                "Rejection reason is required".to_string(),
            ));
        }

        let doc = self.store.get_document(document_id).await?;
        ensure_in_scope(actor, &doc)?;
        if doc.status.is_terminal() {
            return Err(AppError::Validation(format!(
                "Document is already {}",
                doc.status.as_str()
            )));
        }

        let (action, comment) = status_history(target, reason);
        let entry = NewHistoryEntry::new(document_id, actor.id, action, comment);
        let rejection_reason = (target == StatusTarget::Rejected).then_some(reason);

        let applied = self
            .store
            .transition_from_pending(document_id, target.status(), rejection_reason, &entry)
            .await?;
        if !applied {
            return Err(AppError::Validation(
                "Document is no longer pending".to_string(),
            ));
        }

        tracing::info!(
            %document_id,
            actor_id = %actor.id,
            status = target.status().as_str(),
            "Document status updated"
        );

        self.store.get_document(document_id).await
    }

    /// Documents visible to `caller`, newest first
    pub async fn list(&self, caller: &User, filters: DocumentFilters) -> Result<Vec<Document>> {
        ensure_approved(caller)?;
        self.store
            .list_documents(DocumentScope::for_user(caller), filters)
            .await
    }

    /// A single document, subject to the same visibility rule as [`list`](Self::list)
    pub async fn get(&self, caller: &User, document_id: Uuid) -> Result<Document> {
        ensure_approved(caller)?;
        let doc = self.store.get_document(document_id).await?;
        ensure_in_scope(caller, &doc)?;
        Ok(doc)
    }

    /// Audit trail of a visible document, newest first
    pub async fn history(&self, caller: &User, document_id: Uuid) -> Result<Vec<HistoryEntry>> {
        self.get(caller, document_id).await?;
        self.store.history_for_document(document_id).await
    }
}
