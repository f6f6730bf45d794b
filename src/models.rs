use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::sync::LazyLock;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{auth::ReviewerIdentity, error::ApiError};

/// Email pattern shared by admin creation and story submission. Kept identical
/// to the pattern the public frontend validates against.
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\w+([.-]?\w+)*@\w+([.-]?\w+)*(\.\w{2,3})+$").expect("email regex is valid")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

// --- Core Application Schemas (Mapped to Database) ---

/// AdminRole
///
/// The RBAC field carried on admin records and inside identity tokens. The
/// `super_admin` role is normally held only by the configured sentinel identity,
/// but can also be granted to a persisted account at creation time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, TS, ToSchema, Default,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "admin_role", rename_all = "snake_case")]
#[ts(export)]
pub enum AdminRole {
    #[default]
    Admin,
    SuperAdmin,
}

impl AdminRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminRole::Admin => "admin",
            AdminRole::SuperAdmin => "super_admin",
        }
    }
}

/// Admin
///
/// The canonical admin account record from the `admins` table. This is the
/// Credential Store's internal representation: the password hash rides along for
/// verification during login but is never serialized into a response body.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Admin {
    pub id: Uuid,
    pub name: String,
    // Unique across all admins, enforced by the database at write time.
    pub email: String,
    /// bcrypt hash, never serialized.
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    #[schema(ignore)]
    pub password_hash: String,
    pub role: AdminRole,
    // Soft-delete flag. Deactivated admins keep their row (stories may still
    // reference them via approved_by) but cannot log in.
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// AdminProfile
///
/// The sanitized admin representation returned by every read endpoint.
/// Exists so the hash-carrying `Admin` never has to cross the API boundary.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AdminProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: AdminRole,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl From<Admin> for AdminProfile {
    fn from(admin: Admin) -> Self {
        Self {
            id: admin.id,
            name: admin.name,
            email: admin.email,
            role: admin.role,
            is_active: admin.is_active,
            last_login: admin.last_login,
            created_at: admin.created_at,
        }
    }
}

/// AdminSummary
///
/// The compact `admin` object embedded in login responses. Its `id` is a
/// `ReviewerIdentity`, so the configured super-admin serializes to the
/// `"super_admin"` sentinel while persisted admins serialize to their real id.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AdminSummary {
    /// Serializes to the `"super_admin"` sentinel or the admin's id string.
    #[ts(type = "string")]
    #[schema(value_type = String)]
    pub id: ReviewerIdentity,
    pub name: String,
    pub email: String,
    pub role: AdminRole,
}

/// StoryStatus
///
/// The moderation lifecycle of a story. Every story starts `pending`; both
/// `approved` and `rejected` can be re-reviewed into the opposite state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, TS, ToSchema, Default,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "story_status", rename_all = "lowercase")]
#[ts(export)]
pub enum StoryStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

/// Story
///
/// A user-submitted success story from the `stories` table, including the
/// submitter's contact details and the moderation bookkeeping fields. This full
/// record is only ever returned to authenticated reviewers; the public surface
/// uses `PublicStory`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Story {
    pub id: Uuid,
    pub name: String,
    // Submitter contact fields, stripped from public output.
    pub number: String,
    pub email: String,
    pub story_title: String,
    pub description: String,
    // Public URL returned by the media host, if an image was uploaded.
    pub image: Option<String>,
    pub video: Option<String>,
    pub status: StoryStatus,
    pub rejected_reason: Option<String>,
    /// Weak reference to the approving admin. Null when the reviewer was the
    /// configured super-admin (which has no database id). Admin deactivation
    /// does not cascade here.
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub views: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

/// PublicStory
///
/// The sanitized story representation served by the public endpoints. The
/// contact fields (`number`, `email`) and the moderation internals
/// (`rejectedReason`, `approvedBy`) are structurally absent, not just nulled.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PublicStory {
    pub id: Uuid,
    pub name: String,
    pub story_title: String,
    pub description: String,
    pub image: Option<String>,
    pub video: Option<String>,
    pub status: StoryStatus,
    pub approved_at: Option<DateTime<Utc>>,
    pub views: i32,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl From<Story> for PublicStory {
    fn from(story: Story) -> Self {
        Self {
            id: story.id,
            name: story.name,
            story_title: story.story_title,
            description: story.description,
            image: story.image,
            video: story.video,
            status: story.status,
            approved_at: story.approved_at,
            views: story.views,
            created_at: story.created_at,
        }
    }
}

// --- Request Payloads (Input Schemas) ---

/// SuperLoginRequest
///
/// Input for the configured super-admin login path. Compared by exact string
/// equality against the configured pair; nothing in it touches the database.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SuperLoginRequest {
    pub name: String,
    pub email: String,
}

/// LoginRequest
///
/// Input for the persisted-admin login path.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// CreateAdminRequest
///
/// Input for creating a new admin account. `validate` runs before any storage
/// access; the raw password is hashed immediately afterwards and never stored
/// or logged as-is.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateAdminRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<AdminRole>,
}

impl CreateAdminRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().len() < 2 {
            return Err(ApiError::validation("Name must be at least 2 characters"));
        }
        if !is_valid_email(self.email.trim()) {
            return Err(ApiError::validation("Please enter a valid email address"));
        }
        if self.password.len() < 6 {
            return Err(ApiError::validation(
                "Password must be at least 6 characters",
            ));
        }
        Ok(())
    }
}

/// UpdateAdminRequest
///
/// Partial update payload for an existing admin. Absent fields are left
/// untouched (COALESCE at the repository layer).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateAdminRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<AdminRole>,
}

impl UpdateAdminRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(name) = &self.name {
            if name.trim().len() < 2 {
                return Err(ApiError::validation("Name must be at least 2 characters"));
            }
        }
        if let Some(email) = &self.email {
            if !is_valid_email(email.trim()) {
                return Err(ApiError::validation("Please enter a valid email address"));
            }
        }
        Ok(())
    }
}

/// StorySubmission
///
/// The text fields of the public multipart submission (the optional image file
/// is handled separately). `validate` normalizes the fields the same way the
/// public form does: trims everything and lowercases the email.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StorySubmission {
    pub name: String,
    pub number: String,
    pub email: String,
    pub story_title: String,
    pub description: String,
}

impl StorySubmission {
    pub fn validate(self) -> Result<Self, ApiError> {
        let name = self.name.trim().to_string();
        let number = self.number.trim().to_string();
        let email = self.email.trim().to_lowercase();
        let story_title = self.story_title.trim().to_string();
        let description = self.description.trim().to_string();

        if name.len() < 2 {
            return Err(ApiError::validation("Name must be at least 2 characters"));
        }
        if number.len() < 5 {
            return Err(ApiError::validation("Phone number is required"));
        }
        if !is_valid_email(&email) {
            return Err(ApiError::validation("Valid email is required"));
        }
        if story_title.len() < 3 {
            return Err(ApiError::validation(
                "Story title must be at least 3 characters",
            ));
        }
        if description.len() < 10 {
            return Err(ApiError::validation(
                "Description must be at least 10 characters",
            ));
        }

        Ok(Self {
            name,
            number,
            email,
            story_title,
            description,
        })
    }
}

/// RejectStoryRequest
///
/// Optional reviewer-supplied reason; a default message is used when absent.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct RejectStoryRequest {
    pub rejected_reason: Option<String>,
}

// --- Response Envelopes ---

/// ApiResponse
///
/// The standard `{success, message?, data?}` envelope every endpoint responds
/// with. Errors produce the same shape via `ApiError::into_response`.
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// LoginResponse
///
/// Successful login payload for both login paths.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub admin: AdminSummary,
}

/// Pagination
///
/// List metadata block attached to paginated responses.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
    pub items_per_page: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        Self {
            current_page: page,
            total_pages: (total + limit - 1) / limit,
            total_items: total,
            items_per_page: limit,
        }
    }
}

/// PagedResponse
///
/// Envelope for paginated list endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct PagedResponse<T: Serialize> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T: Serialize> PagedResponse<T> {
    pub fn new(data: Vec<T>, pagination: Pagination) -> Self {
        Self {
            success: true,
            data,
            pagination,
        }
    }
}
