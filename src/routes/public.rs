use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Defines endpoints that are **unauthenticated** and accessible to any
/// client. These are the two login gateways, the story submission form, and
/// the read-only approved-story listings.
///
/// Security Mandate:
/// The story retrieval handlers in this module must only release stories with
/// `status='approved'`, and only in the sanitized `PublicStory` shape. A
/// pending or rejected story must be indistinguishable from a missing one.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /api/health
        // A simple, unauthenticated endpoint used for monitoring and load
        // balancer checks.
        .route("/api/health", get(handlers::health))
        // POST /api/admin/super-login
        // Login path for the environment-configured super-admin. Compared by
        // exact string equality, no database involved.
        .route("/api/admin/super-login", post(handlers::super_admin_login))
        // POST /api/admin/login
        // Login path for persisted admin accounts (bcrypt verification).
        .route("/api/admin/login", post(handlers::admin_login))
        // POST /api/stories/submit
        // Multipart story submission with an optional image file. New stories
        // always enter the queue as `pending`.
        .route("/api/stories/submit", post(handlers::submit_story))
        // GET /api/stories/approved?page=...&limit=...
        // Paginated listing of approved stories, newest approval first.
        .route("/api/stories/approved", get(handlers::get_approved_stories))
        // GET /api/stories/approved/{id}
        // Single approved story. 404 for anything not currently approved.
        .route(
            "/api/stories/approved/{id}",
            get(handlers::get_approved_story),
        )
}
