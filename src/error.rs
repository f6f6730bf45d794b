use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// ApiError
///
/// The complete error taxonomy of the API. Every failure a handler can produce is
/// one of these variants, and every variant is recovered at the request boundary
/// and rendered as the `{success: false, message}` JSON envelope. Raw internal
/// errors never reach the caller.
///
/// The user-facing messages intentionally collapse distinct causes:
/// - `InvalidCredentials` is identical whether the email was unknown, the account
///   inactive, or the password wrong (prevents account enumeration).
/// - `InvalidToken` is identical for a bad signature, a malformed token, and an
///   expired one (no partial-trust fallback). The real cause is only logged.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed input, caught before any storage access.
    #[error("{0}")]
    Validation(String),

    #[error("Admin with this email already exists")]
    DuplicateEmail,

    /// Enumeration-safe login failure. The message is constant per endpoint.
    #[error("{0}")]
    InvalidCredentials(&'static str),

    /// Missing or malformed `Authorization: Bearer` header.
    #[error("Not Authorized. Please login again.")]
    NotAuthorized,

    /// Signature, structure, or expiry failure on a presented token.
    #[error("Invalid token. Please login again.")]
    InvalidToken,

    #[error("{0} not found")]
    NotFound(&'static str),

    /// Unexpected storage/infrastructure failure. Logged with full detail at the
    /// call site; only this generic message is surfaced to the caller.
    #[error("Something went wrong. Please try again.")]
    Internal,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::DuplicateEmail => StatusCode::CONFLICT,
            ApiError::InvalidCredentials(_)
            | ApiError::NotAuthorized
            | ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    /// Renders the error as the API's standard failure envelope. Clients key on
    /// the `success` flag in the body; the status code carries the same
    /// information for HTTP-aware callers.
    fn into_response(self) -> Response {
        let body = json!({
            "success": false,
            "message": self.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    /// Storage failures are never shown to callers. Full detail (which may include
    /// connection info) goes to the internal log only. A unique violation on the
    /// admins email index is the one exception: it is the backstop for a lost
    /// race against the duplicate pre-check, so it keeps its specific message.
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return ApiError::DuplicateEmail;
            }
        }
        tracing::error!("database error: {:?}", err);
        ApiError::Internal
    }
}
