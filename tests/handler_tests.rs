use async_trait::async_trait;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use chrono::Utc;
use irisehub_backend::{
    AppState, MockMediaStorage, TokenService,
    auth::{AuthAdmin, ReviewerIdentity},
    config::AppConfig,
    handlers,
    models::{
        Admin, AdminRole, LoginRequest, RejectStoryRequest, Story, StoryStatus, StorySubmission,
        SuperLoginRequest, UpdateAdminRequest,
    },
    moderation::{DEFAULT_REJECTION_REASON, ModerationDecision},
    password,
    repository::Repository,
};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

// --- In-Memory Mock Repository ---

/// A full in-memory Repository implementation backed by Mutex-guarded Vecs,
/// so handler logic can be exercised without a live Postgres instance.
#[derive(Default)]
struct MockRepo {
    admins: Mutex<Vec<Admin>>,
    stories: Mutex<Vec<Story>>,
}

impl MockRepo {
    fn with_admin(self, admin: Admin) -> Self {
        self.admins.lock().unwrap().push(admin);
        self
    }

    fn with_story(self, story: Story) -> Self {
        self.stories.lock().unwrap().push(story);
        self
    }
}

#[async_trait]
impl Repository for MockRepo {
    async fn find_active_admin_by_email(&self, email: &str) -> sqlx::Result<Option<Admin>> {
        Ok(self
            .admins
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.email == email && a.is_active)
            .cloned())
    }

    async fn find_admin_by_email(&self, email: &str) -> sqlx::Result<Option<Admin>> {
        Ok(self
            .admins
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn create_admin(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: AdminRole,
    ) -> sqlx::Result<Admin> {
        let now = Utc::now();
        let admin = Admin {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role,
            is_active: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        self.admins.lock().unwrap().push(admin.clone());
        Ok(admin)
    }

    async fn get_admin(&self, id: Uuid) -> sqlx::Result<Option<Admin>> {
        Ok(self
            .admins
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn list_active_admins(&self) -> sqlx::Result<Vec<Admin>> {
        Ok(self
            .admins
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.is_active)
            .cloned()
            .collect())
    }

    async fn update_admin(
        &self,
        id: Uuid,
        req: UpdateAdminRequest,
    ) -> sqlx::Result<Option<Admin>> {
        let mut admins = self.admins.lock().unwrap();
        Ok(admins.iter_mut().find(|a| a.id == id).map(|admin| {
            if let Some(name) = req.name {
                admin.name = name;
            }
            if let Some(email) = req.email {
                admin.email = email;
            }
            if let Some(role) = req.role {
                admin.role = role;
            }
            admin.updated_at = Utc::now();
            admin.clone()
        }))
    }

    async fn deactivate_admin(&self, id: Uuid) -> sqlx::Result<Option<Admin>> {
        let mut admins = self.admins.lock().unwrap();
        Ok(admins.iter_mut().find(|a| a.id == id).map(|admin| {
            admin.is_active = false;
            admin.clone()
        }))
    }

    async fn record_admin_login(&self, id: Uuid) -> sqlx::Result<()> {
        let mut admins = self.admins.lock().unwrap();
        if let Some(admin) = admins.iter_mut().find(|a| a.id == id) {
            admin.last_login = Some(Utc::now());
        }
        Ok(())
    }

    async fn create_story(
        &self,
        submission: StorySubmission,
        image_url: Option<String>,
    ) -> sqlx::Result<Story> {
        let now = Utc::now();
        let story = Story {
            id: Uuid::new_v4(),
            name: submission.name,
            number: submission.number,
            email: submission.email,
            story_title: submission.story_title,
            description: submission.description,
            image: image_url,
            video: None,
            status: StoryStatus::Pending,
            rejected_reason: None,
            approved_by: None,
            approved_at: None,
            views: 0,
            created_at: now,
            updated_at: now,
        };
        self.stories.lock().unwrap().push(story.clone());
        Ok(story)
    }

    async fn get_story(&self, id: Uuid) -> sqlx::Result<Option<Story>> {
        Ok(self
            .stories
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned())
    }

    async fn list_approved_stories(
        &self,
        page: i64,
        limit: i64,
    ) -> sqlx::Result<(Vec<Story>, i64)> {
        let stories = self.stories.lock().unwrap();
        let approved: Vec<Story> = stories
            .iter()
            .filter(|s| s.status == StoryStatus::Approved)
            .cloned()
            .collect();
        let total = approved.len() as i64;
        let offset = ((page - 1) * limit) as usize;
        let paged = approved
            .into_iter()
            .skip(offset)
            .take(limit as usize)
            .collect();
        Ok((paged, total))
    }

    async fn list_stories(
        &self,
        status: Option<StoryStatus>,
        page: i64,
        limit: i64,
    ) -> sqlx::Result<(Vec<Story>, i64)> {
        let stories = self.stories.lock().unwrap();
        let filtered: Vec<Story> = stories
            .iter()
            .filter(|s| status.is_none_or(|wanted| s.status == wanted))
            .cloned()
            .collect();
        let total = filtered.len() as i64;
        let offset = ((page - 1) * limit) as usize;
        let paged = filtered
            .into_iter()
            .skip(offset)
            .take(limit as usize)
            .collect();
        Ok((paged, total))
    }

    async fn apply_moderation(
        &self,
        id: Uuid,
        decision: ModerationDecision,
    ) -> sqlx::Result<Option<Story>> {
        let mut stories = self.stories.lock().unwrap();
        Ok(stories.iter_mut().find(|s| s.id == id).map(|story| {
            story.status = decision.status;
            story.approved_by = decision.approved_by;
            story.approved_at = decision.approved_at;
            story.rejected_reason = decision.rejected_reason;
            story.updated_at = Utc::now();
            story.clone()
        }))
    }

    async fn delete_story(&self, id: Uuid) -> sqlx::Result<bool> {
        let mut stories = self.stories.lock().unwrap();
        let before = stories.len();
        stories.retain(|s| s.id != id);
        Ok(stories.len() < before)
    }
}

// --- Test Fixtures ---

fn test_state(repo: MockRepo) -> AppState {
    let config = AppConfig::default();
    AppState {
        repo: Arc::new(repo),
        media: Arc::new(MockMediaStorage::new()),
        tokens: TokenService::new(&config.jwt_secret),
        config,
    }
}

fn seeded_admin(email: &str, password: &str) -> Admin {
    let now = Utc::now();
    Admin {
        id: Uuid::new_v4(),
        name: "Seed Admin".to_string(),
        email: email.to_string(),
        password_hash: password::hash_password(password).unwrap(),
        role: AdminRole::Admin,
        is_active: true,
        last_login: None,
        created_at: now,
        updated_at: now,
    }
}

fn pending_story(title: &str) -> Story {
    let now = Utc::now();
    Story {
        id: Uuid::new_v4(),
        name: "A Submitter".to_string(),
        number: "0712345678".to_string(),
        email: "submitter@example.com".to_string(),
        story_title: title.to_string(),
        description: "A long enough description of the story.".to_string(),
        image: None,
        video: None,
        status: StoryStatus::Pending,
        rejected_reason: None,
        approved_by: None,
        approved_at: None,
        views: 0,
        created_at: now,
        updated_at: now,
    }
}

fn auth_as(identity: ReviewerIdentity) -> AuthAdmin {
    AuthAdmin {
        id: identity,
        name: "Reviewer".to_string(),
        email: "reviewer@irisehub.test".to_string(),
        role: AdminRole::Admin,
    }
}

// --- Login Tests ---

#[tokio::test]
async fn test_super_admin_login_success() {
    let state = test_state(MockRepo::default());

    let axum::Json(response) = handlers::super_admin_login(
        State(state.clone()),
        axum::Json(SuperLoginRequest {
            name: "Super Admin".to_string(),
            email: "super@localhost.test".to_string(),
        }),
    )
    .await
    .unwrap();

    assert!(response.success);
    assert_eq!(response.message, "Super Admin login successful");
    assert_eq!(response.admin.id, ReviewerIdentity::SuperAdmin);

    // The issued token must verify against the same service and carry the sentinel.
    let claims = state.tokens.verify(&response.token).unwrap();
    assert_eq!(claims.sub, ReviewerIdentity::SuperAdmin);
    assert_eq!(claims.role, AdminRole::SuperAdmin);
}

#[tokio::test]
async fn test_super_admin_login_rejects_mismatch_on_either_field() {
    let state = test_state(MockRepo::default());

    for (name, email) in [
        ("Super Admin", "wrong@localhost.test"),
        ("Wrong Name", "super@localhost.test"),
    ] {
        let err = handlers::super_admin_login(
            State(state.clone()),
            axum::Json(SuperLoginRequest {
                name: name.to_string(),
                email: email.to_string(),
            }),
        )
        .await
        .unwrap_err();

        // Same error for either mismatched field.
        assert_eq!(err.to_string(), "Invalid name or email");
        assert_eq!(
            err.into_response().status(),
            axum::http::StatusCode::UNAUTHORIZED
        );
    }
}

#[tokio::test]
async fn test_admin_login_success_records_last_login() {
    let admin = seeded_admin("jane@irisehub.test", "correct-horse");
    let admin_id = admin.id;
    let state = test_state(MockRepo::default().with_admin(admin));

    let axum::Json(response) = handlers::admin_login(
        State(state.clone()),
        axum::Json(LoginRequest {
            email: "jane@irisehub.test".to_string(),
            password: "correct-horse".to_string(),
        }),
    )
    .await
    .unwrap();

    assert_eq!(response.message, "Login successful");
    assert_eq!(response.admin.id, ReviewerIdentity::Admin(admin_id));

    let claims = state.tokens.verify(&response.token).unwrap();
    assert_eq!(claims.sub, ReviewerIdentity::Admin(admin_id));

    // The login must have been recorded.
    let stored = state.repo.get_admin(admin_id).await.unwrap().unwrap();
    assert!(stored.last_login.is_some());
}

#[tokio::test]
async fn test_admin_login_wrong_password_and_unknown_email_are_indistinguishable() {
    let state = test_state(MockRepo::default().with_admin(seeded_admin(
        "jane@irisehub.test",
        "correct-horse",
    )));

    let wrong_password = handlers::admin_login(
        State(state.clone()),
        axum::Json(LoginRequest {
            email: "jane@irisehub.test".to_string(),
            password: "battery-staple".to_string(),
        }),
    )
    .await
    .unwrap_err();

    let unknown_email = handlers::admin_login(
        State(state.clone()),
        axum::Json(LoginRequest {
            email: "nobody@irisehub.test".to_string(),
            password: "correct-horse".to_string(),
        }),
    )
    .await
    .unwrap_err();

    assert_eq!(wrong_password.to_string(), unknown_email.to_string());
    assert_eq!(wrong_password.to_string(), "Invalid email or password");
}

#[tokio::test]
async fn test_deactivated_admin_cannot_login() {
    let mut admin = seeded_admin("gone@irisehub.test", "correct-horse");
    admin.is_active = false;
    let state = test_state(MockRepo::default().with_admin(admin));

    let err = handlers::admin_login(
        State(state),
        axum::Json(LoginRequest {
            email: "gone@irisehub.test".to_string(),
            password: "correct-horse".to_string(),
        }),
    )
    .await
    .unwrap_err();

    // Indistinguishable from a bad password.
    assert_eq!(err.to_string(), "Invalid email or password");
}

// --- Admin Management Tests ---

#[tokio::test]
async fn test_create_admin_rejects_short_password() {
    let state = test_state(MockRepo::default());

    let err = handlers::create_admin(
        auth_as(ReviewerIdentity::SuperAdmin),
        State(state),
        axum::Json(irisehub_backend::models::CreateAdminRequest {
            name: "New Admin".to_string(),
            email: "new@irisehub.org".to_string(),
            password: "short".to_string(),
            role: None,
        }),
    )
    .await
    .unwrap_err();

    assert_eq!(err.to_string(), "Password must be at least 6 characters");
    assert_eq!(
        err.into_response().status(),
        axum::http::StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn test_create_admin_duplicate_email_conflicts() {
    let state = test_state(MockRepo::default().with_admin(seeded_admin(
        "taken@irisehub.org",
        "correct-horse",
    )));

    let err = handlers::create_admin(
        auth_as(ReviewerIdentity::SuperAdmin),
        State(state),
        axum::Json(irisehub_backend::models::CreateAdminRequest {
            name: "New Admin".to_string(),
            email: "taken@irisehub.org".to_string(),
            password: "long-enough".to_string(),
            role: None,
        }),
    )
    .await
    .unwrap_err();

    assert_eq!(
        err.into_response().status(),
        axum::http::StatusCode::CONFLICT
    );
}

#[tokio::test]
async fn test_create_admin_normalizes_email_and_defaults_role() {
    let state = test_state(MockRepo::default());

    let response = handlers::create_admin(
        auth_as(ReviewerIdentity::SuperAdmin),
        State(state.clone()),
        axum::Json(irisehub_backend::models::CreateAdminRequest {
            name: "  New Admin  ".to_string(),
            email: "New@IriseHub.Org".to_string(),
            password: "long-enough".to_string(),
            role: None,
        }),
    )
    .await
    .unwrap();

    let summary = response.0.data.unwrap();
    assert_eq!(summary.email, "new@irisehub.org");
    assert_eq!(summary.role, AdminRole::Admin);

    // The stored hash must verify against the raw password and never equal it.
    let stored = state
        .repo
        .find_admin_by_email("new@irisehub.org")
        .await
        .unwrap()
        .unwrap();
    assert_ne!(stored.password_hash, "long-enough");
    assert!(password::verify_password("long-enough", &stored.password_hash));
}

#[tokio::test]
async fn test_delete_admin_is_soft() {
    let admin = seeded_admin("leaving@irisehub.test", "correct-horse");
    let admin_id = admin.id;
    let state = test_state(MockRepo::default().with_admin(admin));

    handlers::delete_admin(
        auth_as(ReviewerIdentity::SuperAdmin),
        State(state.clone()),
        Path(admin_id),
    )
    .await
    .unwrap();

    // Row still present, but inactive and invisible to the active listing.
    let stored = state.repo.get_admin(admin_id).await.unwrap().unwrap();
    assert!(!stored.is_active);
    assert!(state.repo.list_active_admins().await.unwrap().is_empty());
}

// --- Moderation Tests ---

#[tokio::test]
async fn test_approve_story_attributes_persisted_admin() {
    let story = pending_story("My Story");
    let story_id = story.id;
    let reviewer_id = Uuid::new_v4();
    let state = test_state(MockRepo::default().with_story(story));

    let response = handlers::approve_story(
        auth_as(ReviewerIdentity::Admin(reviewer_id)),
        State(state),
        Path(story_id),
    )
    .await
    .unwrap();

    let approved = response.0.data.unwrap();
    assert_eq!(approved.status, StoryStatus::Approved);
    assert_eq!(approved.approved_by, Some(reviewer_id));
    assert!(approved.approved_at.is_some());
    assert_eq!(approved.rejected_reason, None);
}

#[tokio::test]
async fn test_approve_story_by_super_admin_leaves_attribution_null() {
    let story = pending_story("My Story");
    let story_id = story.id;
    let state = test_state(MockRepo::default().with_story(story));

    let response = handlers::approve_story(
        auth_as(ReviewerIdentity::SuperAdmin),
        State(state),
        Path(story_id),
    )
    .await
    .unwrap();

    let approved = response.0.data.unwrap();
    assert_eq!(approved.status, StoryStatus::Approved);
    assert_eq!(approved.approved_by, None);
    assert!(approved.approved_at.is_some());
}

#[tokio::test]
async fn test_reject_story_defaults_reason_and_clears_attribution() {
    let mut story = pending_story("My Story");
    // Simulate a previously approved story being re-reviewed.
    story.status = StoryStatus::Approved;
    story.approved_by = Some(Uuid::new_v4());
    story.approved_at = Some(Utc::now());
    let story_id = story.id;
    let state = test_state(MockRepo::default().with_story(story));

    let response = handlers::reject_story(
        auth_as(ReviewerIdentity::SuperAdmin),
        State(state),
        Path(story_id),
        Some(axum::Json(RejectStoryRequest {
            rejected_reason: Some("   ".to_string()),
        })),
    )
    .await
    .unwrap();

    let rejected = response.0.data.unwrap();
    assert_eq!(rejected.status, StoryStatus::Rejected);
    // Whitespace-only reasons fall back to the default.
    assert_eq!(
        rejected.rejected_reason.as_deref(),
        Some(DEFAULT_REJECTION_REASON)
    );
    assert_eq!(rejected.approved_by, None);
    assert_eq!(rejected.approved_at, None);
}

#[tokio::test]
async fn test_reject_story_without_body_uses_default_reason() {
    let story = pending_story("My Story");
    let story_id = story.id;
    let state = test_state(MockRepo::default().with_story(story));

    let response = handlers::reject_story(
        auth_as(ReviewerIdentity::SuperAdmin),
        State(state),
        Path(story_id),
        None,
    )
    .await
    .unwrap();

    assert_eq!(
        response.0.data.unwrap().rejected_reason.as_deref(),
        Some(DEFAULT_REJECTION_REASON)
    );
}

#[tokio::test]
async fn test_moderating_unknown_story_is_not_found() {
    let state = test_state(MockRepo::default());

    let err = handlers::approve_story(
        auth_as(ReviewerIdentity::SuperAdmin),
        State(state),
        Path(Uuid::new_v4()),
    )
    .await
    .unwrap_err();

    assert_eq!(err.to_string(), "Story not found");
    assert_eq!(
        err.into_response().status(),
        axum::http::StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_delete_story_then_gone() {
    let story = pending_story("My Story");
    let story_id = story.id;
    let state = test_state(MockRepo::default().with_story(story));

    handlers::delete_story(
        auth_as(ReviewerIdentity::SuperAdmin),
        State(state.clone()),
        Path(story_id),
    )
    .await
    .unwrap();

    let err = handlers::delete_story(
        auth_as(ReviewerIdentity::SuperAdmin),
        State(state),
        Path(story_id),
    )
    .await
    .unwrap_err();
    assert_eq!(
        err.into_response().status(),
        axum::http::StatusCode::NOT_FOUND
    );
}

// --- Public Story Visibility Tests ---

#[tokio::test]
async fn test_pending_story_invisible_to_public_lookup() {
    let story = pending_story("Not Yet");
    let story_id = story.id;
    let state = test_state(MockRepo::default().with_story(story));

    let err = handlers::get_approved_story(State(state), Path(story_id))
        .await
        .unwrap_err();

    // Indistinguishable from a missing story.
    assert_eq!(err.to_string(), "Story not found");
}

#[tokio::test]
async fn test_public_listing_sanitizes_and_paginates() {
    let mut repo = MockRepo::default();
    for i in 0..3 {
        let mut story = pending_story(&format!("Story {i}"));
        story.status = StoryStatus::Approved;
        story.approved_at = Some(Utc::now());
        repo = repo.with_story(story);
    }
    // One pending story that must never surface.
    repo = repo.with_story(pending_story("Hidden"));
    let state = test_state(repo);

    let response = handlers::get_approved_stories(
        State(state),
        Query(handlers::PageQuery {
            page: Some(1),
            limit: Some(2),
        }),
    )
    .await
    .unwrap();

    let paged = response.0;
    assert_eq!(paged.data.len(), 2);
    assert_eq!(paged.pagination.total_items, 3);
    assert_eq!(paged.pagination.total_pages, 2);
    assert_eq!(paged.pagination.current_page, 1);

    // Submitter contact details and moderation internals must be structurally
    // absent from the public shape, not just null.
    let json = serde_json::to_value(&paged.data[0]).unwrap();
    let keys = json.as_object().unwrap();
    assert!(!keys.contains_key("number"));
    assert!(!keys.contains_key("email"));
    assert!(!keys.contains_key("rejectedReason"));
    assert!(!keys.contains_key("approvedBy"));
    assert!(keys.contains_key("storyTitle"));
}

#[tokio::test]
async fn test_moderation_queue_filters_by_status() {
    let mut repo = MockRepo::default();
    let mut approved = pending_story("Approved One");
    approved.status = StoryStatus::Approved;
    repo = repo.with_story(approved).with_story(pending_story("Pending One"));
    let state = test_state(repo);

    let response = handlers::get_all_stories(
        auth_as(ReviewerIdentity::SuperAdmin),
        State(state),
        Query(handlers::StoryQueueFilter {
            page: None,
            limit: None,
            status: Some(StoryStatus::Pending),
        }),
    )
    .await
    .unwrap();

    let paged = response.0;
    assert_eq!(paged.data.len(), 1);
    assert_eq!(paged.data[0].story_title, "Pending One");
    // The queue keeps the full record, contact fields included.
    assert_eq!(paged.data[0].email, "submitter@example.com");
}
