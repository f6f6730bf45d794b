/// Router Module Index
///
/// Organizes the application's routing logic into security-segregated modules,
/// so that access control is applied explicitly at the module level (via Axum
/// layers) and a protected endpoint cannot be exposed by accident.
///
/// The modules map directly to the two access levels of the API.

/// Routes accessible to any client (anonymous, no token required):
/// health, the two login endpoints, story submission, and the approved
/// story listings. Handlers in this group must only ever release stories
/// with `status='approved'`, in the sanitized public shape.
pub mod public;

/// Admin account management, restricted to authenticated admins.
pub mod admin;

/// Story moderation (queue, approve/reject, delete), restricted to
/// authenticated admins.
pub mod stories;
