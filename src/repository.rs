use crate::{
    models::{Admin, AdminRole, Story, StoryStatus, StorySubmission, UpdateAdminRequest},
    moderation::ModerationDecision,
};
use async_trait::async_trait;
use sqlx::{PgPool, query_builder::QueryBuilder};
use std::sync::Arc;
use uuid::Uuid;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations: the Credential
/// Store for admin accounts plus story storage. Handlers interact with the data
/// layer through this trait without knowing the concrete implementation
/// (Postgres in production, mocks in tests).
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's asynchronous task
/// boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Credential Store ---
    // Login lookup. Only active accounts can authenticate, so the inactive
    // ones are filtered here, not in the handler.
    async fn find_active_admin_by_email(&self, email: &str) -> sqlx::Result<Option<Admin>>;
    // Duplicate-email pre-check: matches any account, active or not.
    async fn find_admin_by_email(&self, email: &str) -> sqlx::Result<Option<Admin>>;
    // Inserts a new account. The caller hashes the password first.
    async fn create_admin(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: AdminRole,
    ) -> sqlx::Result<Admin>;
    async fn get_admin(&self, id: Uuid) -> sqlx::Result<Option<Admin>>;
    // Active accounts only, newest first.
    async fn list_active_admins(&self) -> sqlx::Result<Vec<Admin>>;
    // Partial update: absent fields keep their current value.
    async fn update_admin(&self, id: Uuid, req: UpdateAdminRequest) -> sqlx::Result<Option<Admin>>;
    // Soft delete: flips is_active. The row stays so approved_by references
    // on stories remain resolvable.
    async fn deactivate_admin(&self, id: Uuid) -> sqlx::Result<Option<Admin>>;
    async fn record_admin_login(&self, id: Uuid) -> sqlx::Result<()>;

    // --- Stories ---
    async fn create_story(
        &self,
        submission: StorySubmission,
        image_url: Option<String>,
    ) -> sqlx::Result<Story>;
    async fn get_story(&self, id: Uuid) -> sqlx::Result<Option<Story>>;
    // Public listing: approved stories only, most recently approved first.
    async fn list_approved_stories(&self, page: i64, limit: i64)
    -> sqlx::Result<(Vec<Story>, i64)>;
    // Moderation queue: all stories, optionally filtered by status.
    async fn list_stories(
        &self,
        status: Option<StoryStatus>,
        page: i64,
        limit: i64,
    ) -> sqlx::Result<(Vec<Story>, i64)>;
    /// Writes a moderation decision onto a story in a single UPDATE. Concurrent
    /// decisions on the same story are last-write-wins: there is no version
    /// check, and per-row write atomicity is the only consistency guarantee.
    async fn apply_moderation(
        &self,
        id: Uuid,
        decision: ModerationDecision,
    ) -> sqlx::Result<Option<Story>>;
    // Hard delete. No cascade onto admin records.
    async fn delete_story(&self, id: Uuid) -> sqlx::Result<bool>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer access across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

/// Offset for a 1-based page. Saturates instead of overflowing so an absurd
/// page number degrades to an empty result set, not a panic or a negative
/// OFFSET the database rejects.
fn page_offset(page: i64, limit: i64) -> i64 {
    page.saturating_sub(1).saturating_mul(limit).max(0)
}

const ADMIN_COLUMNS: &str =
    "id, name, email, password_hash, role, is_active, last_login, created_at, updated_at";

const STORY_COLUMNS: &str = "id, name, number, email, story_title, description, image, video, \
     status, rejected_reason, approved_by, approved_at, views, created_at, updated_at";

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn find_active_admin_by_email(&self, email: &str) -> sqlx::Result<Option<Admin>> {
        sqlx::query_as::<_, Admin>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins WHERE email = $1 AND is_active = true"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_admin_by_email(&self, email: &str) -> sqlx::Result<Option<Admin>> {
        sqlx::query_as::<_, Admin>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
    }

    /// create_admin
    ///
    /// Inserts the new account. The unique index on `email` is the backstop
    /// behind the handler's duplicate pre-check; a race between the two
    /// surfaces as a unique violation here.
    async fn create_admin(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: AdminRole,
    ) -> sqlx::Result<Admin> {
        sqlx::query_as::<_, Admin>(&format!(
            "INSERT INTO admins (id, name, email, password_hash, role, is_active, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, true, NOW(), NOW())
             RETURNING {ADMIN_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_admin(&self, id: Uuid) -> sqlx::Result<Option<Admin>> {
        sqlx::query_as::<_, Admin>(&format!("SELECT {ADMIN_COLUMNS} FROM admins WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn list_active_admins(&self) -> sqlx::Result<Vec<Admin>> {
        sqlx::query_as::<_, Admin>(&format!(
            "SELECT {ADMIN_COLUMNS} FROM admins WHERE is_active = true ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
    }

    /// update_admin
    ///
    /// Uses COALESCE so only the fields present in the request change.
    async fn update_admin(&self, id: Uuid, req: UpdateAdminRequest) -> sqlx::Result<Option<Admin>> {
        sqlx::query_as::<_, Admin>(&format!(
            "UPDATE admins
             SET name = COALESCE($2, name),
                 email = COALESCE($3, email),
                 role = COALESCE($4, role),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {ADMIN_COLUMNS}"
        ))
        .bind(id)
        .bind(req.name)
        .bind(req.email)
        .bind(req.role)
        .fetch_optional(&self.pool)
        .await
    }

    async fn deactivate_admin(&self, id: Uuid) -> sqlx::Result<Option<Admin>> {
        sqlx::query_as::<_, Admin>(&format!(
            "UPDATE admins SET is_active = false, updated_at = NOW()
             WHERE id = $1
             RETURNING {ADMIN_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn record_admin_login(&self, id: Uuid) -> sqlx::Result<()> {
        sqlx::query("UPDATE admins SET last_login = NOW() WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// create_story
    ///
    /// All public submissions land as `pending` with zero views.
    async fn create_story(
        &self,
        submission: StorySubmission,
        image_url: Option<String>,
    ) -> sqlx::Result<Story> {
        sqlx::query_as::<_, Story>(&format!(
            "INSERT INTO stories
                (id, name, number, email, story_title, description, image, video,
                 status, views, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, NULL, 'pending', 0, NOW(), NOW())
             RETURNING {STORY_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(submission.name)
        .bind(submission.number)
        .bind(submission.email)
        .bind(submission.story_title)
        .bind(submission.description)
        .bind(image_url)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_story(&self, id: Uuid) -> sqlx::Result<Option<Story>> {
        sqlx::query_as::<_, Story>(&format!("SELECT {STORY_COLUMNS} FROM stories WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn list_approved_stories(
        &self,
        page: i64,
        limit: i64,
    ) -> sqlx::Result<(Vec<Story>, i64)> {
        let stories = sqlx::query_as::<_, Story>(&format!(
            "SELECT {STORY_COLUMNS} FROM stories
             WHERE status = 'approved'
             ORDER BY approved_at DESC NULLS LAST, created_at DESC
             LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(page_offset(page, limit))
        .fetch_all(&self.pool)
        .await?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM stories WHERE status = 'approved'")
                .fetch_one(&self.pool)
                .await?;

        Ok((stories, total))
    }

    /// list_stories
    ///
    /// Implements the optional status filter with QueryBuilder for safe
    /// parameterization.
    async fn list_stories(
        &self,
        status: Option<StoryStatus>,
        page: i64,
        limit: i64,
    ) -> sqlx::Result<(Vec<Story>, i64)> {
        let mut builder: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new(format!("SELECT {STORY_COLUMNS} FROM stories "));
        if let Some(s) = status {
            builder.push(" WHERE status = ");
            builder.push_bind(s);
        }
        builder.push(" ORDER BY created_at DESC LIMIT ");
        builder.push_bind(limit);
        builder.push(" OFFSET ");
        builder.push_bind(page_offset(page, limit));

        let stories = builder
            .build_query_as::<Story>()
            .fetch_all(&self.pool)
            .await?;

        let mut count: QueryBuilder<sqlx::Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM stories ");
        if let Some(s) = status {
            count.push(" WHERE status = ");
            count.push_bind(s);
        }
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        Ok((stories, total))
    }

    /// apply_moderation
    ///
    /// Single UPDATE carrying the whole decision; returns None when no story
    /// has the given id.
    async fn apply_moderation(
        &self,
        id: Uuid,
        decision: ModerationDecision,
    ) -> sqlx::Result<Option<Story>> {
        sqlx::query_as::<_, Story>(&format!(
            "UPDATE stories
             SET status = $2,
                 approved_by = $3,
                 approved_at = $4,
                 rejected_reason = $5,
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {STORY_COLUMNS}"
        ))
        .bind(id)
        .bind(decision.status)
        .bind(decision.approved_by)
        .bind(decision.approved_at)
        .bind(decision.rejected_reason)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_story(&self, id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM stories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
