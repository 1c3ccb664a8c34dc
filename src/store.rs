//! Database store for users, sessions, documents and history

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::lifecycle::DocumentScope;
use crate::models::{
    Document, DocumentFilters, DocumentStatus, HistoryAction, HistoryEntry, NewHistoryEntry,
    Priority, Role, User, SYSTEM_ACTOR_NAME,
};

const DOCUMENT_SELECT: &str = r#"
    SELECT d.id, d.title, d.description, d.file_path, d.priority, d.status,
           d.rejection_reason, d.creator_id, d.assigned_to_id,
           c.full_name AS creator_name, a.full_name AS assigned_to_name,
           d.created_at, d.updated_at
    FROM documents d
    LEFT JOIN users c ON c.id = d.creator_id
    LEFT JOIN users a ON a.id = d.assigned_to_id
"#;

const USER_COLUMNS: &str =
    "id, email, full_name, role, faculty, is_approved, created_at, updated_at";

/// Fields of a document about to be inserted
#[derive(Debug, Clone)]
pub struct NewDocument {
    pub title: String,
    pub description: String,
    pub file_path: String,
    pub priority: Priority,
    pub creator_id: Uuid,
}

/// Database store
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // User operations

    pub async fn create_user(
        &self,
        email: &str,
        full_name: &str,
        role: Role,
        faculty: &str,
        is_approved: bool,
    ) -> Result<User> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO users (id, email, full_name, role, faculty, is_approved, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(email)
        .bind(full_name)
        .bind(role.as_str())
        .bind(faculty)
        .bind(is_approved)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("Email already registered".to_string())
            }
            other => AppError::Database(other),
        })?;

        Ok(User {
            id,
            email: email.to_string(),
            full_name: full_name.to_string(),
            role,
            faculty: faculty.to_string(),
            is_approved,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User> {
        self.find_user(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", id)))
    }

    pub async fn find_user(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = ?",
            USER_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = ?",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    pub async fn count_users(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users ORDER BY created_at ASC",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    /// Admins still waiting for super-admin approval
    pub async fn list_pending_admins(&self) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE role = 'admin' AND is_approved = 0 ORDER BY created_at ASC",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    /// Approved admins and super-admins
    pub async fn list_reviewers(&self) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT {} FROM users
            WHERE role IN ('admin', 'super_admin') AND is_approved = 1
            ORDER BY created_at ASC
            "#,
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    /// The earliest approved super-admin, if any
    pub async fn first_super_admin(&self) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT {} FROM users
            WHERE role = 'super_admin' AND is_approved = 1
            ORDER BY created_at ASC
            LIMIT 1
            "#,
            USER_COLUMNS
        ))
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    pub async fn mark_user_approved(&self, id: Uuid) -> Result<User> {
        sqlx::query(
            r#"
            UPDATE users SET is_approved = 1, updated_at = ? WHERE id = ?
            "#,
        )
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        self.get_user(id).await
    }

    // Session operations

    pub async fn insert_session(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (token, user_id, created_at, expires_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(token)
        .bind(user_id.to_string())
        .bind(Utc::now())
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// User id owning a session token that has not expired at `now`
    pub async fn session_user(&self, token: &str, now: DateTime<Utc>) -> Result<Option<Uuid>> {
        let user_id = sqlx::query_scalar::<_, String>(
            r#"
            SELECT user_id FROM sessions WHERE token = ? AND expires_at > ?
            "#,
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        user_id.map(|id| parse_uuid(&id, "user_id")).transpose()
    }

    // Document operations

    /// Insert a pending document together with its `Created` history entry
    pub async fn create_document(&self, doc: NewDocument, comment: &str) -> Result<Document> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO documents (id, title, description, file_path, priority, status, creator_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&doc.title)
        .bind(&doc.description)
        .bind(&doc.file_path)
        .bind(doc.priority.as_str())
        .bind(DocumentStatus::Pending.as_str())
        .bind(doc.creator_id.to_string())
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let entry = NewHistoryEntry::new(
            id,
            doc.creator_id,
            HistoryAction::Created,
            comment,
        );
        insert_history(&mut tx, &entry, now).await?;

        tx.commit().await?;

        self.get_document(id).await
    }

    pub async fn get_document(&self, id: Uuid) -> Result<Document> {
        let row = sqlx::query_as::<_, DocumentRow>(&format!("{} WHERE d.id = ?", DOCUMENT_SELECT))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

        row.try_into()
    }

    pub async fn list_documents(
        &self,
        scope: DocumentScope,
        filters: DocumentFilters,
    ) -> Result<Vec<Document>> {
        let mut qb = QueryBuilder::<Sqlite>::new(DOCUMENT_SELECT);
        qb.push(" WHERE 1 = 1");

        match scope {
            DocumentScope::CreatedBy(user_id) => {
                qb.push(" AND d.creator_id = ").push_bind(user_id.to_string());
            }
            DocumentScope::ReviewQueue(user_id) => {
                qb.push(" AND (d.assigned_to_id = ")
                    .push_bind(user_id.to_string())
                    .push(" OR (d.assigned_to_id IS NULL AND d.status = ")
                    .push_bind(DocumentStatus::Pending.as_str())
                    .push("))");
            }
            DocumentScope::All => {}
        }

        if let Some(status) = filters.status {
            qb.push(" AND d.status = ").push_bind(status.as_str());
        }
        if let Some(priority) = filters.priority {
            qb.push(" AND d.priority = ").push_bind(priority.as_str());
        }

        qb.push(" ORDER BY d.created_at DESC, d.rowid DESC");

        let rows = qb
            .build_query_as::<DocumentRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    /// Pending documents created at or before `cutoff`, oldest first
    pub async fn list_stale_pending(&self, cutoff: DateTime<Utc>) -> Result<Vec<Document>> {
        let rows = sqlx::query_as::<_, DocumentRow>(&format!(
            "{} WHERE d.status = ? AND d.created_at <= ? ORDER BY d.created_at ASC",
            DOCUMENT_SELECT
        ))
        .bind(DocumentStatus::Pending.as_str())
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    /// Move a pending document to `to` and append `entry` in one transaction.
    ///
    /// The update only applies while the document is still pending. Returns
    /// `false` (and writes nothing) when another writer got there first.
    pub async fn transition_from_pending(
        &self,
        id: Uuid,
        to: DocumentStatus,
        rejection_reason: Option<&str>,
        entry: &NewHistoryEntry,
    ) -> Result<bool> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE documents
            SET status = ?, rejection_reason = ?, updated_at = ?
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(to.as_str())
        .bind(rejection_reason)
        .bind(now)
        .bind(id.to_string())
        .bind(DocumentStatus::Pending.as_str())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        insert_history(&mut tx, entry, now).await?;
        tx.commit().await?;

        Ok(true)
    }

    /// Assign a pending document to `assignee_id` and append `entry` in one transaction.
    pub async fn assign_pending(
        &self,
        id: Uuid,
        assignee_id: Uuid,
        entry: &NewHistoryEntry,
    ) -> Result<bool> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE documents
            SET assigned_to_id = ?, updated_at = ?
            WHERE id = ? AND status = ?
            "#,
        )
        .bind(assignee_id.to_string())
        .bind(now)
        .bind(id.to_string())
        .bind(DocumentStatus::Pending.as_str())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        insert_history(&mut tx, entry, now).await?;
        tx.commit().await?;

        Ok(true)
    }

    // History operations

    /// Audit trail of a document, newest first
    pub async fn history_for_document(&self, document_id: Uuid) -> Result<Vec<HistoryEntry>> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT h.id, h.document_id, h.actor_id,
                   COALESCE(u.full_name, ?) AS actor_name,
                   h.action, h.comment, h.timestamp
            FROM history h
            LEFT JOIN users u ON u.id = h.actor_id
            WHERE h.document_id = ?
            ORDER BY h.timestamp DESC, h.rowid DESC
            "#,
        )
        .bind(SYSTEM_ACTOR_NAME)
        .bind(document_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }
}

async fn insert_history(
    conn: &mut SqliteConnection,
    entry: &NewHistoryEntry,
    at: DateTime<Utc>,
) -> Result<Uuid> {
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO history (id, document_id, actor_id, action, comment, timestamp)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.to_string())
    .bind(entry.document_id.to_string())
    .bind(entry.actor_id.to_string())
    .bind(entry.action.as_str())
    .bind(&entry.comment)
    .bind(at)
    .execute(&mut *conn)
    .await?;

    Ok(id)
}

fn parse_uuid(value: &str, field: &str) -> Result<Uuid> {
    Uuid::parse_str(value).map_err(|e| AppError::Internal(format!("Invalid {} UUID: {}", field, e)))
}

// Internal row types for sqlx

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    full_name: String,
    role: String,
    faculty: String,
    is_approved: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self> {
        Ok(User {
            id: parse_uuid(&row.id, "user")?,
            email: row.email,
            full_name: row.full_name,
            role: row
                .role
                .parse()
                .map_err(|e| AppError::Internal(format!("Invalid role: {}", e)))?,
            faculty: row.faculty,
            is_approved: row.is_approved,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: String,
    title: String,
    description: String,
    file_path: String,
    priority: String,
    status: String,
    rejection_reason: Option<String>,
    creator_id: String,
    assigned_to_id: Option<String>,
    creator_name: Option<String>,
    assigned_to_name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DocumentRow> for Document {
    type Error = AppError;

    fn try_from(row: DocumentRow) -> Result<Self> {
        let assigned_to_id = row
            .assigned_to_id
            .map(|s| parse_uuid(&s, "assigned_to_id"))
            .transpose()?;

        Ok(Document {
            id: parse_uuid(&row.id, "document")?,
            title: row.title,
            description: row.description,
            file_path: row.file_path,
            priority: row
                .priority
                .parse()
                .map_err(|e| AppError::Internal(format!("Invalid priority: {}", e)))?,
            status: row
                .status
                .parse()
                .map_err(|e| AppError::Internal(format!("Invalid status: {}", e)))?,
            rejection_reason: row.rejection_reason,
            creator_id: parse_uuid(&row.creator_id, "creator_id")?,
            assigned_to_id,
            creator_name: row.creator_name,
            assigned_to_name: row.assigned_to_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct HistoryRow {
    id: String,
    document_id: String,
    actor_id: String,
    actor_name: String,
    action: String,
    comment: String,
    timestamp: DateTime<Utc>,
}

impl TryFrom<HistoryRow> for HistoryEntry {
    type Error = AppError;

    fn try_from(row: HistoryRow) -> Result<Self> {
        Ok(HistoryEntry {
            id: parse_uuid(&row.id, "history")?,
            document_id: parse_uuid(&row.document_id, "document_id")?,
            actor_id: parse_uuid(&row.actor_id, "actor_id")?,
            actor_name: row.actor_name,
            action: row
                .action
                .parse()
                .map_err(|e| AppError::Internal(format!("Invalid action: {}", e)))?,
            comment: row.comment,
            timestamp: row.timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> Store {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        crate::db::migrate(&pool)
            .await
            .expect("Failed to run migrations");

        Store::new(pool)
    }

    async fn student(store: &Store, email: &str) -> User {
        store
            .create_user(email, "Sam Student", Role::Student, "Physics", true)
            .await
            .unwrap()
    }

    fn new_doc(creator_id: Uuid, title: &str) -> NewDocument {
        NewDocument {
            title: title.to_string(),
            description: String::new(),
            file_path: String::new(),
            priority: Priority::Low,
            creator_id,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let store = setup_test_db().await;
        let user = student(&store, "sam@example.com").await;

        let fetched = store.get_user(user.id).await.unwrap();
        assert_eq!(fetched.email, "sam@example.com");
        assert_eq!(fetched.role, Role::Student);
        assert!(fetched.is_approved);
    }

    #[tokio::test]
    async fn test_get_user_not_found() {
        let store = setup_test_db().await;
        let result = store.get_user(Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_duplicate_email_is_conflict() {
        let store = setup_test_db().await;
        student(&store, "dup@example.com").await;

        let result = store
            .create_user("dup@example.com", "Other", Role::Admin, "", false)
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_reviewer_and_pending_admin_listings() {
        let store = setup_test_db().await;
        student(&store, "s@example.com").await;
        let pending = store
            .create_user("p@example.com", "Pat Pending", Role::Admin, "", false)
            .await
            .unwrap();
        let approved = store
            .create_user("a@example.com", "Ann Admin", Role::Admin, "", true)
            .await
            .unwrap();

        let pending_admins = store.list_pending_admins().await.unwrap();
        assert_eq!(pending_admins.len(), 1);
        assert_eq!(pending_admins[0].id, pending.id);

        let reviewers = store.list_reviewers().await.unwrap();
        assert_eq!(reviewers.len(), 1);
        assert_eq!(reviewers[0].id, approved.id);

        let approved_now = store.mark_user_approved(pending.id).await.unwrap();
        assert!(approved_now.is_approved);
        assert_eq!(store.list_reviewers().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_session_lookup_respects_expiry() {
        let store = setup_test_db().await;
        let user = student(&store, "s@example.com").await;
        let now = Utc::now();

        store
            .insert_session("live", user.id, now + chrono::Duration::hours(1))
            .await
            .unwrap();
        store
            .insert_session("stale", user.id, now - chrono::Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(store.session_user("live", now).await.unwrap(), Some(user.id));
        assert_eq!(store.session_user("stale", now).await.unwrap(), None);
        assert_eq!(store.session_user("missing", now).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_document_writes_created_entry() {
        let store = setup_test_db().await;
        let user = student(&store, "s@example.com").await;

        let doc = store
            .create_document(new_doc(user.id, "Report"), "Document created")
            .await
            .unwrap();
        assert_eq!(doc.status, DocumentStatus::Pending);
        assert_eq!(doc.creator_name.as_deref(), Some("Sam Student"));
        assert!(doc.assigned_to_id.is_none());

        let history = store.history_for_document(doc.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].action, HistoryAction::Created);
        assert_eq!(history[0].actor_id, user.id);
        assert_eq!(history[0].actor_name, "Sam Student");
    }

    #[tokio::test]
    async fn test_transition_only_applies_to_pending() {
        let store = setup_test_db().await;
        let user = student(&store, "s@example.com").await;
        let doc = store
            .create_document(new_doc(user.id, "Report"), "Document created")
            .await
            .unwrap();

        let approve = NewHistoryEntry::new(doc.id, user.id, HistoryAction::Approved, "ok");
        assert!(store
            .transition_from_pending(doc.id, DocumentStatus::Approved, None, &approve)
            .await
            .unwrap());

        let expire = NewHistoryEntry::new(doc.id, user.id, HistoryAction::Expired, "late");
        assert!(!store
            .transition_from_pending(doc.id, DocumentStatus::Expired, None, &expire)
            .await
            .unwrap());

        let fetched = store.get_document(doc.id).await.unwrap();
        assert_eq!(fetched.status, DocumentStatus::Approved);

        // The losing transition left no audit record behind
        let history = store.history_for_document(doc.id).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].action, HistoryAction::Approved);
    }

    #[tokio::test]
    async fn test_history_unknown_actor_is_system() {
        let store = setup_test_db().await;
        let user = student(&store, "s@example.com").await;
        let doc = store
            .create_document(new_doc(user.id, "Report"), "Document created")
            .await
            .unwrap();

        let entry = NewHistoryEntry::new(
            doc.id,
            crate::models::SYSTEM_ACTOR_ID,
            HistoryAction::Expired,
            "expired",
        );
        store
            .transition_from_pending(doc.id, DocumentStatus::Expired, None, &entry)
            .await
            .unwrap();

        let history = store.history_for_document(doc.id).await.unwrap();
        assert_eq!(history[0].actor_name, SYSTEM_ACTOR_NAME);
    }

    #[tokio::test]
    async fn test_list_documents_scopes_and_filters() {
        let store = setup_test_db().await;
        let alice = student(&store, "alice@example.com").await;
        let bob = student(&store, "bob@example.com").await;
        let admin = store
            .create_user("admin@example.com", "Ann Admin", Role::Admin, "", true)
            .await
            .unwrap();

        let first = store
            .create_document(new_doc(alice.id, "First"), "Document created")
            .await
            .unwrap();
        let second = store
            .create_document(
                NewDocument {
                    priority: Priority::High,
                    ..new_doc(bob.id, "Second")
                },
                "Document created",
            )
            .await
            .unwrap();

        let own = store
            .list_documents(DocumentScope::CreatedBy(alice.id), DocumentFilters::default())
            .await
            .unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].id, first.id);

        let all = store
            .list_documents(DocumentScope::All, DocumentFilters::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        // Newest first
        assert_eq!(all[0].id, second.id);

        let high = store
            .list_documents(
                DocumentScope::All,
                DocumentFilters {
                    priority: Some(Priority::High),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(high.len(), 1);
        assert_eq!(high[0].id, second.id);

        // Unassigned pending documents show up in every admin's queue
        let queue = store
            .list_documents(DocumentScope::ReviewQueue(admin.id), DocumentFilters::default())
            .await
            .unwrap();
        assert_eq!(queue.len(), 2);
    }

    #[tokio::test]
    async fn test_list_stale_pending_uses_cutoff() {
        let store = setup_test_db().await;
        let user = student(&store, "s@example.com").await;
        let old = store
            .create_document(new_doc(user.id, "Old"), "Document created")
            .await
            .unwrap();
        store
            .create_document(new_doc(user.id, "New"), "Document created")
            .await
            .unwrap();

        sqlx::query("UPDATE documents SET created_at = ? WHERE id = ?")
            .bind(Utc::now() - chrono::Duration::days(8))
            .bind(old.id.to_string())
            .execute(store.pool())
            .await
            .unwrap();

        let stale = store
            .list_stale_pending(Utc::now() - chrono::Duration::days(7))
            .await
            .unwrap();
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].id, old.id);
    }

    #[tokio::test]
    async fn test_document_row_try_from_invalid_status() {
        let now = Utc::now();
        let row = DocumentRow {
            id: Uuid::new_v4().to_string(),
            title: "t".to_string(),
            description: String::new(),
            file_path: String::new(),
            priority: "low".to_string(),
            status: "archived".to_string(),
            rejection_reason: None,
            creator_id: Uuid::new_v4().to_string(),
            assigned_to_id: None,
            creator_name: None,
            assigned_to_name: None,
            created_at: now,
            updated_at: now,
        };
        let result: Result<Document> = row.try_into();
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_user_row_try_from_invalid_uuid() {
        let now = Utc::now();
        let row = UserRow {
            id: "not-a-uuid".to_string(),
            email: "x@example.com".to_string(),
            full_name: "X".to_string(),
            role: "student".to_string(),
            faculty: String::new(),
            is_approved: true,
            created_at: now,
            updated_at: now,
        };
        let result: Result<User> = row.try_into();
        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
