//! Data models for users, documents and their audit trail

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Actor recorded for system-driven transitions when no super-admin exists.
/// Never aliases a real account.
pub const SYSTEM_ACTOR_ID: Uuid = Uuid::nil();

/// Display name used for history entries whose actor is not a user row
pub const SYSTEM_ACTOR_NAME: &str = "System";

/// Role of a user in the approval workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Student,
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }

    /// Roles allowed to review documents
    pub const REVIEWERS: &'static [Role] = &[Role::Admin, Role::SuperAdmin];
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "admin" => Ok(Role::Admin),
            "super_admin" => Ok(Role::SuperAdmin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// A registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub faculty: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lifecycle status of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Pending,
    Approved,
    Rejected,
    Expired,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Pending => "pending",
            DocumentStatus::Approved => "approved",
            DocumentStatus::Rejected => "rejected",
            DocumentStatus::Expired => "expired",
        }
    }

    /// Terminal statuses accept no further transitions
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DocumentStatus::Pending)
    }
}

impl std::str::FromStr for DocumentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(DocumentStatus::Pending),
            "approved" => Ok(DocumentStatus::Approved),
            "rejected" => Ok(DocumentStatus::Rejected),
            "expired" => Ok(DocumentStatus::Expired),
            _ => Err(format!("Invalid document status: {}", s)),
        }
    }
}

/// Review priority of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    /// Lenient parse used on document creation: unknown values fall back to `Low`
    pub fn parse_or_low(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.trim().parse().ok()).unwrap_or_default()
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Numeric levels are accepted for older clients
        match s.to_ascii_lowercase().as_str() {
            "low" | "1" => Ok(Priority::Low),
            "medium" | "2" => Ok(Priority::Medium),
            "high" | "3" => Ok(Priority::High),
            _ => Err(format!("Invalid priority: {}", s)),
        }
    }
}

/// A document under review
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub file_path: String,
    pub priority: Priority,
    pub status: DocumentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub creator_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Action recorded in the audit trail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryAction {
    Created,
    Approved,
    Rejected,
    Delegated,
    Expired,
}

impl HistoryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryAction::Created => "Created",
            HistoryAction::Approved => "Approved",
            HistoryAction::Rejected => "Rejected",
            HistoryAction::Delegated => "Delegated",
            HistoryAction::Expired => "Expired",
        }
    }
}

impl std::str::FromStr for HistoryAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Created" => Ok(HistoryAction::Created),
            "Approved" => Ok(HistoryAction::Approved),
            "Rejected" => Ok(HistoryAction::Rejected),
            "Delegated" => Ok(HistoryAction::Delegated),
            "Expired" => Ok(HistoryAction::Expired),
            _ => Err(format!("Invalid history action: {}", s)),
        }
    }
}

/// One immutable audit trail record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub document_id: Uuid,
    pub actor_id: Uuid,
    pub actor_name: String,
    pub action: HistoryAction,
    pub comment: String,
    pub timestamp: DateTime<Utc>,
}

/// A history record about to be appended
#[derive(Debug, Clone)]
pub struct NewHistoryEntry {
    pub document_id: Uuid,
    pub actor_id: Uuid,
    pub action: HistoryAction,
    pub comment: String,
}

impl NewHistoryEntry {
    pub fn new(
        document_id: Uuid,
        actor_id: Uuid,
        action: HistoryAction,
        comment: impl Into<String>,
    ) -> Self {
        Self {
            document_id,
            actor_id,
            action,
            comment: comment.into(),
        }
    }
}

/// Optional filters for document listings, combined with AND
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentFilters {
    pub status: Option<DocumentStatus>,
    pub priority: Option<Priority>,
}

impl DocumentFilters {
    /// Parse query-string filters; empty values mean "no filter"
    pub fn parse(status: Option<&str>, priority: Option<&str>) -> Result<Self, AppError> {
        fn non_empty(value: Option<&str>) -> Option<&str> {
            value.map(str::trim).filter(|s| !s.is_empty())
        }

        Ok(Self {
            status: non_empty(status)
                .map(str::parse::<DocumentStatus>)
                .transpose()
                .map_err(AppError::Validation)?,
            priority: non_empty(priority)
                .map(str::parse::<Priority>)
                .transpose()
                .map_err(AppError::Validation)?,
        })
    }
}

/// Priority as sent by clients: a name or a numeric level
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PriorityInput {
    Name(String),
    Level(i64),
}

impl PriorityInput {
    pub fn resolve(&self) -> Priority {
        match self {
            PriorityInput::Name(name) => Priority::parse_or_low(Some(name)),
            PriorityInput::Level(level) => Priority::parse_or_low(Some(&level.to_string())),
        }
    }
}

/// Request to create a new document
#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub file_path: String,
    pub priority: Option<PriorityInput>,
}

/// Request to change a document's status
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Request to reassign a document to another reviewer
#[derive(Debug, Deserialize)]
pub struct DelegateRequest {
    pub new_admin_id: Uuid,
}

/// Request to register a new account
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub full_name: String,
    pub role: Option<String>,
    #[serde(default)]
    pub faculty: String,
}
