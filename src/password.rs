use bcrypt::{DEFAULT_COST, hash, verify};

use crate::error::ApiError;

/// Password Hasher
///
/// One-way, salted, deliberately slow hashing for admin passwords. bcrypt at
/// the default cost factor; the raw password exists only on the stack of the
/// calling handler and is never persisted or logged.

/// Hashes a raw password for storage.
pub fn hash_password(raw: &str) -> Result<String, ApiError> {
    hash(raw, DEFAULT_COST).map_err(|e| {
        tracing::error!("password hashing failed: {:?}", e);
        ApiError::Internal
    })
}

/// Checks a raw password against a stored hash. A corrupt stored hash verifies
/// as false rather than erroring; to the login flow it is just a mismatch.
pub fn verify_password(raw: &str, hashed: &str) -> bool {
    verify(raw, hashed).unwrap_or(false)
}
