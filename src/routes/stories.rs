use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, patch},
};

/// Story Moderation Router Module
///
/// Defines the moderation queue and the lifecycle transitions for submitted
/// stories.
///
/// Access Control:
/// Wrapped in the same token-verification middleware layer as the admin
/// account routes. The approve handler additionally reads the reviewer
/// identity from the token to attribute the approval (or leave it null for
/// the super-admin sentinel).
pub fn story_routes() -> Router<AppState> {
    Router::new()
        // GET /api/stories/all?page=...&limit=...&status=...
        // The moderation queue: full story records across all lifecycle
        // states, optionally filtered by status.
        .route("/api/stories/all", get(handlers::get_all_stories))
        // PATCH /api/stories/{id}/approve
        // Transitions a story to `approved` and records reviewer attribution.
        .route("/api/stories/{id}/approve", patch(handlers::approve_story))
        // PATCH /api/stories/{id}/reject
        // Transitions a story to `rejected` with an optional reason.
        .route("/api/stories/{id}/reject", patch(handlers::reject_story))
        // DELETE /api/stories/{id}
        // Unconditional hard delete of a story in any state.
        .route("/api/stories/{id}", delete(handlers::delete_story))
}
