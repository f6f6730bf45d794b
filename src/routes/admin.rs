use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Admin Account Router Module
///
/// Defines the CRUD surface for admin accounts.
///
/// Access Control:
/// This entire router is wrapped in the token-verification middleware layer
/// (see `create_router`), so every handler here runs with a validated
/// `AuthAdmin` identity. Any admin, including the super-admin, may manage
/// accounts; there is no per-route role split.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // POST /api/admin/create
        // Creates a new admin account. Validation, duplicate email check,
        // and bcrypt hashing happen in the handler.
        .route("/api/admin/create", post(handlers::create_admin))
        // GET /api/admin/all
        // Lists active admin accounts, newest first, without password hashes.
        .route("/api/admin/all", get(handlers::get_all_admins))
        // GET /api/admin/single/{id}
        // Fetches one admin by id (deactivated accounts included).
        .route("/api/admin/single/{id}", get(handlers::get_admin_by_id))
        // PUT /api/admin/{id}
        // Partial update of name/email/role.
        // DELETE /api/admin/{id}
        // Soft delete: deactivates the account but keeps the row so story
        // attribution stays resolvable.
        .route(
            "/api/admin/{id}",
            put(handlers::update_admin).delete(handlers::delete_admin),
        )
}
