use crate::{
    AppState,
    auth::{AuthAdmin, ReviewerIdentity},
    error::ApiError,
    models::{
        AdminProfile, AdminRole, AdminSummary, ApiResponse, CreateAdminRequest, LoginRequest,
        LoginResponse, PagedResponse, Pagination, PublicStory, RejectStoryRequest, Story,
        StoryStatus, StorySubmission, SuperLoginRequest, UpdateAdminRequest,
    },
    moderation::ModerationDecision,
    password,
};
use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

// --- Filter Structs ---

/// PageQuery
///
/// Pagination parameters accepted by the public approved-stories listing.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// StoryQueueFilter
///
/// Pagination plus optional status filter for the moderation queue.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct StoryQueueFilter {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Restrict the queue to one lifecycle state (pending/approved/rejected).
    pub status: Option<StoryStatus>,
}

fn page_and_limit(page: Option<i64>, limit: Option<i64>, default_limit: i64) -> (i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(default_limit).clamp(1, 100);
    (page, limit)
}

// --- Health ---

/// health
///
/// [Public Route] Liveness probe for monitoring and load balancer checks.
#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service is up"))
)]
pub async fn health() -> Json<ApiResponse<()>> {
    Json(ApiResponse::message("Server is running!"))
}

// --- Admin Authentication ---

/// super_admin_login
///
/// [Public Route] Login path for the configured super-admin. The pair is
/// compared by exact string equality against the values loaded at startup;
/// nothing here touches the database. On success the issued token carries the
/// sentinel subject, not a persisted id.
///
/// *Enumeration safety*: a mismatch on either field produces the same error.
#[utoipa::path(
    post,
    path = "/api/admin/super-login",
    request_body = SuperLoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn super_admin_login(
    State(state): State<AppState>,
    Json(payload): Json<SuperLoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let config = &state.config;

    if payload.name != config.super_admin_name || payload.email != config.super_admin_email {
        return Err(ApiError::InvalidCredentials("Invalid name or email"));
    }

    let token = state.tokens.issue(
        ReviewerIdentity::SuperAdmin,
        &payload.name,
        &payload.email,
        AdminRole::SuperAdmin,
    )?;

    Ok(Json(LoginResponse {
        success: true,
        message: "Super Admin login successful".to_string(),
        token,
        admin: AdminSummary {
            id: ReviewerIdentity::SuperAdmin,
            name: payload.name,
            email: payload.email,
            role: AdminRole::SuperAdmin,
        },
    }))
}

/// admin_login
///
/// [Public Route] Login path for persisted admin accounts. An unknown email,
/// a deactivated account, and a wrong password are all indistinguishable to
/// the caller. On success the last-login timestamp is recorded and the token
/// carries the admin's real id.
#[utoipa::path(
    post,
    path = "/api/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn admin_login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    const BAD_LOGIN: ApiError = ApiError::InvalidCredentials("Invalid email or password");

    let admin = state
        .repo
        .find_active_admin_by_email(&payload.email)
        .await?
        .ok_or(BAD_LOGIN)?;

    if !password::verify_password(&payload.password, &admin.password_hash) {
        return Err(BAD_LOGIN);
    }

    state.repo.record_admin_login(admin.id).await?;

    let token = state.tokens.issue(
        ReviewerIdentity::Admin(admin.id),
        &admin.name,
        &admin.email,
        admin.role,
    )?;

    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        token,
        admin: AdminSummary {
            id: ReviewerIdentity::Admin(admin.id),
            name: admin.name,
            email: admin.email,
            role: admin.role,
        },
    }))
}

// --- Admin Management ---

/// create_admin
///
/// [Protected Route] Creates a new admin account. Validation runs before any
/// storage access; the raw password is hashed immediately and the duplicate
/// email check (plus the unique index as backstop) enforces email uniqueness
/// at write time.
#[utoipa::path(
    post,
    path = "/api/admin/create",
    request_body = CreateAdminRequest,
    responses(
        (status = 200, description = "Admin created", body = AdminSummary),
        (status = 400, description = "Validation failure"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn create_admin(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Json(payload): Json<CreateAdminRequest>,
) -> Result<Json<ApiResponse<AdminSummary>>, ApiError> {
    payload.validate()?;

    let email = payload.email.trim().to_lowercase();
    if state.repo.find_admin_by_email(&email).await?.is_some() {
        return Err(ApiError::DuplicateEmail);
    }

    let password_hash = password::hash_password(&payload.password)?;
    let role = payload.role.unwrap_or(AdminRole::Admin);

    let admin = state
        .repo
        .create_admin(payload.name.trim(), &email, &password_hash, role)
        .await?;

    Ok(Json(ApiResponse::with_message(
        "Admin created successfully",
        AdminSummary {
            id: ReviewerIdentity::Admin(admin.id),
            name: admin.name,
            email: admin.email,
            role: admin.role,
        },
    )))
}

/// get_all_admins
///
/// [Protected Route] Lists active admin accounts, newest first. Password
/// hashes never leave the repository layer (`AdminProfile` has no such field).
#[utoipa::path(
    get,
    path = "/api/admin/all",
    responses((status = 200, description = "Active admins", body = [AdminProfile]))
)]
pub async fn get_all_admins(
    _admin: AuthAdmin,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<AdminProfile>>>, ApiError> {
    let admins = state.repo.list_active_admins().await?;
    let profiles: Vec<AdminProfile> = admins.into_iter().map(AdminProfile::from).collect();
    Ok(Json(ApiResponse::data(profiles)))
}

/// get_admin_by_id
///
/// [Protected Route] Fetches one admin by id, including deactivated accounts
/// (their records stay visible to other admins after a soft delete).
#[utoipa::path(
    get,
    path = "/api/admin/single/{id}",
    params(("id" = Uuid, Path, description = "Admin ID")),
    responses(
        (status = 200, description = "Found", body = AdminProfile),
        (status = 404, description = "No such admin")
    )
)]
pub async fn get_admin_by_id(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AdminProfile>>, ApiError> {
    let admin = state
        .repo
        .get_admin(id)
        .await?
        .ok_or(ApiError::NotFound("Admin"))?;
    Ok(Json(ApiResponse::data(admin.into())))
}

/// update_admin
///
/// [Protected Route] Partial update of name/email/role. Absent fields keep
/// their current values.
#[utoipa::path(
    put,
    path = "/api/admin/{id}",
    params(("id" = Uuid, Path, description = "Admin ID")),
    request_body = UpdateAdminRequest,
    responses(
        (status = 200, description = "Updated", body = AdminProfile),
        (status = 404, description = "No such admin")
    )
)]
pub async fn update_admin(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAdminRequest>,
) -> Result<Json<ApiResponse<AdminProfile>>, ApiError> {
    payload.validate()?;

    let admin = state
        .repo
        .update_admin(id, payload)
        .await?
        .ok_or(ApiError::NotFound("Admin"))?;

    Ok(Json(ApiResponse::with_message(
        "Admin updated successfully",
        AdminProfile::from(admin),
    )))
}

/// delete_admin
///
/// [Protected Route] Soft delete: flips `is_active` and nothing else. The row
/// is kept so stories approved by this admin keep a resolvable reference, and
/// the account can no longer log in.
#[utoipa::path(
    delete,
    path = "/api/admin/{id}",
    params(("id" = Uuid, Path, description = "Admin ID")),
    responses(
        (status = 200, description = "Deactivated"),
        (status = 404, description = "No such admin")
    )
)]
pub async fn delete_admin(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .repo
        .deactivate_admin(id)
        .await?
        .ok_or(ApiError::NotFound("Admin"))?;

    Ok(Json(ApiResponse::message("Admin deleted successfully")))
}

// --- Stories ---

/// submit_story
///
/// [Public Route] Accepts a multipart submission with the story text fields
/// and an optional single `image` file. Non-image files are ignored. The image
/// is pushed to the external media host; if that upload fails the story is
/// still accepted, just without an image (the submitter should not lose their
/// story over a media-host hiccup). New stories always start `pending`.
#[utoipa::path(
    post,
    path = "/api/stories/submit",
    request_body(content = StorySubmission, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Story accepted for review", body = Story),
        (status = 400, description = "Validation failure")
    )
)]
pub async fn submit_story(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<Story>>, ApiError> {
    let mut fields = StorySubmission::default();
    let mut image: Option<(Vec<u8>, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::validation("Malformed multipart body"))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" => fields.name = read_text_field(field).await?,
            "number" => fields.number = read_text_field(field).await?,
            "email" => fields.email = read_text_field(field).await?,
            "storyTitle" => fields.story_title = read_text_field(field).await?,
            "description" => fields.description = read_text_field(field).await?,
            "image" => {
                let content_type = field.content_type().unwrap_or_default().to_string();
                // Only image uploads are forwarded to the media host.
                if content_type.starts_with("image/") {
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|_| ApiError::validation("Malformed multipart body"))?;
                    image = Some((bytes.to_vec(), content_type));
                }
            }
            _ => {}
        }
    }

    let submission = fields.validate()?;

    let image_url = match image {
        Some((data, content_type)) => {
            match state.media.upload_image(data, &content_type).await {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::warn!("image upload failed, accepting story without image: {}", e);
                    None
                }
            }
        }
        None => None,
    };

    let story = state.repo.create_story(submission, image_url).await?;

    Ok(Json(ApiResponse::with_message(
        "Story submitted successfully! It will be reviewed by admin.",
        story,
    )))
}

async fn read_text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|_| ApiError::validation("Malformed multipart body"))
}

/// get_approved_stories
///
/// [Public Route] Paginated list of approved stories, most recently approved
/// first. Output is the sanitized `PublicStory` shape: submitter contact
/// details and moderation internals are structurally absent.
#[utoipa::path(
    get,
    path = "/api/stories/approved",
    params(PageQuery),
    responses((status = 200, description = "Approved stories", body = [PublicStory]))
)]
pub async fn get_approved_stories(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PagedResponse<PublicStory>>, ApiError> {
    let (page, limit) = page_and_limit(query.page, query.limit, 10);

    let (stories, total) = state.repo.list_approved_stories(page, limit).await?;
    let public: Vec<PublicStory> = stories.into_iter().map(PublicStory::from).collect();

    Ok(Json(PagedResponse::new(
        public,
        Pagination::new(page, limit, total),
    )))
}

/// get_approved_story
///
/// [Public Route] Single approved story, sanitized. A pending or rejected
/// story is reported exactly like a missing one so the public cannot probe
/// the moderation queue.
#[utoipa::path(
    get,
    path = "/api/stories/approved/{id}",
    params(("id" = Uuid, Path, description = "Story ID")),
    responses(
        (status = 200, description = "Found", body = PublicStory),
        (status = 404, description = "No approved story with this id")
    )
)]
pub async fn get_approved_story(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PublicStory>>, ApiError> {
    let story = state
        .repo
        .get_story(id)
        .await?
        .filter(|s| s.status == StoryStatus::Approved)
        .ok_or(ApiError::NotFound("Story"))?;

    Ok(Json(ApiResponse::data(story.into())))
}

/// get_all_stories
///
/// [Protected Route] The moderation queue: full story records (contact fields
/// included) across all lifecycle states, optionally filtered by status.
#[utoipa::path(
    get,
    path = "/api/stories/all",
    params(StoryQueueFilter),
    responses((status = 200, description = "All stories", body = [Story]))
)]
pub async fn get_all_stories(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Query(query): Query<StoryQueueFilter>,
) -> Result<Json<PagedResponse<Story>>, ApiError> {
    let (page, limit) = page_and_limit(query.page, query.limit, 100);

    let (stories, total) = state.repo.list_stories(query.status, page, limit).await?;

    Ok(Json(PagedResponse::new(
        stories,
        Pagination::new(page, limit, total),
    )))
}

/// approve_story
///
/// [Protected Route] Applies the approval transition, regardless of the
/// story's current status (re-approving refreshes the approval timestamp).
/// Reviewer attribution follows the identity kind: a persisted admin id is
/// recorded, the super-admin sentinel leaves `approvedBy` null.
#[utoipa::path(
    patch,
    path = "/api/stories/{id}/approve",
    params(("id" = Uuid, Path, description = "Story ID")),
    responses(
        (status = 200, description = "Approved", body = Story),
        (status = 404, description = "No such story")
    )
)]
pub async fn approve_story(
    admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Story>>, ApiError> {
    let decision = ModerationDecision::approve(&admin.id, Utc::now());

    let story = state
        .repo
        .apply_moderation(id, decision)
        .await?
        .ok_or(ApiError::NotFound("Story"))?;

    Ok(Json(ApiResponse::with_message(
        "Story approved successfully",
        story,
    )))
}

/// reject_story
///
/// [Protected Route] Applies the rejection transition: records the supplied
/// reason (or the default) and clears any previous approval attribution.
#[utoipa::path(
    patch,
    path = "/api/stories/{id}/reject",
    params(("id" = Uuid, Path, description = "Story ID")),
    request_body = RejectStoryRequest,
    responses(
        (status = 200, description = "Rejected", body = Story),
        (status = 404, description = "No such story")
    )
)]
pub async fn reject_story(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Option<Json<RejectStoryRequest>>,
) -> Result<Json<ApiResponse<Story>>, ApiError> {
    let reason = payload.and_then(|Json(p)| p.rejected_reason);
    let decision = ModerationDecision::reject(reason);

    let story = state
        .repo
        .apply_moderation(id, decision)
        .await?
        .ok_or(ApiError::NotFound("Story"))?;

    Ok(Json(ApiResponse::with_message(
        "Story rejected successfully",
        story,
    )))
}

/// delete_story
///
/// [Protected Route] Unconditional hard delete. No cascade touches admin
/// records.
#[utoipa::path(
    delete,
    path = "/api/stories/{id}",
    params(("id" = Uuid, Path, description = "Story ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "No such story")
    )
)]
pub async fn delete_story(
    _admin: AuthAdmin,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if !state.repo.delete_story(id).await? {
        return Err(ApiError::NotFound("Story"));
    }
    Ok(Json(ApiResponse::message("Story deleted successfully")))
}
