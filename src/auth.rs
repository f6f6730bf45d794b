use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::AdminRole,
};

/// Wire form of the super-admin subject. The configured super-admin has no row
/// in the admins table, so its token carries this sentinel instead of an id.
pub const SUPER_ADMIN_SENTINEL: &str = "super_admin";

/// Tokens expire exactly 24 hours after issuance. There is no refresh and no
/// revocation list; rotating the signing secret invalidates everything outstanding.
pub const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// ReviewerIdentity
///
/// The subject of an identity token, as a tagged union rather than a raw string.
/// Two kinds exist: the configured super-admin (a sentinel, not a database id)
/// and a persisted admin's real id. Keeping the distinction at the type level
/// means "is this a real persisted id" is answered by a match, never by string
/// comparison scattered through handlers.
///
/// Serializes to the wire format the API has always used: the literal
/// `"super_admin"` sentinel, or the admin's id as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ReviewerIdentity {
    SuperAdmin,
    Admin(Uuid),
}

impl ReviewerIdentity {
    /// The persisted admin id behind this identity, if there is one.
    /// The super-admin sentinel yields None; it must never be written into
    /// a story's `approved_by` field.
    pub fn admin_id(&self) -> Option<Uuid> {
        match self {
            ReviewerIdentity::Admin(id) => Some(*id),
            ReviewerIdentity::SuperAdmin => None,
        }
    }
}

impl From<ReviewerIdentity> for String {
    fn from(identity: ReviewerIdentity) -> Self {
        match identity {
            ReviewerIdentity::SuperAdmin => SUPER_ADMIN_SENTINEL.to_string(),
            ReviewerIdentity::Admin(id) => id.to_string(),
        }
    }
}

impl TryFrom<String> for ReviewerIdentity {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == SUPER_ADMIN_SENTINEL {
            return Ok(ReviewerIdentity::SuperAdmin);
        }
        Uuid::parse_str(&value)
            .map(ReviewerIdentity::Admin)
            .map_err(|_| format!("invalid subject id: {value}"))
    }
}

impl std::fmt::Display for ReviewerIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewerIdentity::SuperAdmin => f.write_str(SUPER_ADMIN_SENTINEL),
            ReviewerIdentity::Admin(id) => write!(f, "{id}"),
        }
    }
}

/// Claims
///
/// The payload structure signed into every identity token. A token missing or
/// corrupting any of these fields fails decoding and is rejected as a whole;
/// there is no partial trust.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the reviewer identity (sentinel or persisted admin id).
    pub sub: ReviewerIdentity,
    pub name: String,
    pub email: String,
    pub role: AdminRole,
    /// Issued At: timestamp when the token was minted.
    pub iat: usize,
    /// Expiration Time: timestamp after which the token must not be accepted.
    pub exp: usize,
}

/// TokenService
///
/// Issues and verifies the signed, time-limited identity tokens. The signing
/// key is derived once from the process-wide configuration at construction;
/// no ambient lookups happen per-request.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// issue
    ///
    /// Mints a token for the given identity with the fixed 24-hour expiry.
    pub fn issue(
        &self,
        subject: ReviewerIdentity,
        name: &str,
        email: &str,
        role: AdminRole,
    ) -> Result<String, ApiError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject,
            name: name.to_string(),
            email: email.to_string(),
            role,
            iat: now as usize,
            exp: (now + TOKEN_TTL_SECS) as usize,
        };

        encode(&Header::default(), &claims, &self.encoding).map_err(|e| {
            tracing::error!("token signing failed: {:?}", e);
            ApiError::Internal
        })
    }

    /// verify
    ///
    /// Decodes and validates a presented token. Signature mismatch, structural
    /// corruption, an unparseable subject, and expiry all collapse into the
    /// same `InvalidToken` result; the distinction only exists in the logs.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => Ok(data.claims),
            Err(e) => {
                tracing::debug!("token rejected: {:?}", e.kind());
                Err(ApiError::InvalidToken)
            }
        }
    }
}

/// AuthAdmin
///
/// The resolved identity of an authenticated request.
/// Handlers take this as an argument to receive a verified reviewer identity.
#[derive(Debug, Clone)]
pub struct AuthAdmin {
    pub id: ReviewerIdentity,
    pub name: String,
    pub email: String,
    pub role: AdminRole,
}

/// AuthAdmin Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making AuthAdmin usable as a
/// function argument in any protected handler and as the gate inside the
/// auth middleware. The flow:
/// 1. Pull the TokenService from the application state.
/// 2. Extract the `Authorization: Bearer <token>` header; missing or malformed
///    rejects with `NotAuthorized`.
/// 3. Verify the token; any failure rejects with `InvalidToken`.
/// 4. Attach the decoded identity for downstream handlers.
impl<S> FromRequestParts<S> for AuthAdmin
where
    S: Send + Sync,
    TokenService: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = TokenService::from_ref(state);

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::NotAuthorized)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::NotAuthorized)?;

        let claims = tokens.verify(token)?;

        Ok(AuthAdmin {
            id: claims.sub,
            name: claims.name,
            email: claims.email,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_parses_to_super_admin() {
        let identity = ReviewerIdentity::try_from(SUPER_ADMIN_SENTINEL.to_string()).unwrap();
        assert_eq!(identity, ReviewerIdentity::SuperAdmin);
        assert_eq!(identity.admin_id(), None);
    }

    #[test]
    fn uuid_parses_to_persisted_admin() {
        let id = Uuid::new_v4();
        let identity = ReviewerIdentity::try_from(id.to_string()).unwrap();
        assert_eq!(identity, ReviewerIdentity::Admin(id));
        assert_eq!(identity.admin_id(), Some(id));
    }

    #[test]
    fn garbage_subject_is_rejected() {
        assert!(ReviewerIdentity::try_from("not-an-id".to_string()).is_err());
    }
}
