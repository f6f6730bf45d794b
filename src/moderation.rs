use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{auth::ReviewerIdentity, models::StoryStatus};

/// Reason recorded when a reviewer rejects a story without providing one.
pub const DEFAULT_REJECTION_REASON: &str = "Story does not meet our guidelines";

/// ModerationDecision
///
/// The complete field-set a moderation action writes onto a story. Building the
/// decision as a value keeps the transition rules in one place and lets the
/// repository persist it in a single UPDATE.
///
/// Transitions are unconditional with respect to the story's current status:
/// pending→approved, pending→rejected, approved→rejected, and rejected→approved
/// are all permitted, and re-applying a decision is allowed (re-approving simply
/// refreshes `approved_at`). Two invariants are encoded by construction:
/// - `approved_by` is populated only for a persisted admin reviewer, never the
///   super-admin sentinel; approving always clears `rejected_reason`.
/// - rejecting always clears `approved_by`/`approved_at` and always records a
///   non-null reason.
#[derive(Debug, Clone, PartialEq)]
pub struct ModerationDecision {
    pub status: StoryStatus,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_reason: Option<String>,
}

impl ModerationDecision {
    /// The approval transition. Reviewer attribution follows the identity's
    /// kind: a real admin id is recorded, the super-admin sentinel is not.
    pub fn approve(reviewer: &ReviewerIdentity, now: DateTime<Utc>) -> Self {
        Self {
            status: StoryStatus::Approved,
            approved_by: reviewer.admin_id(),
            approved_at: Some(now),
            rejected_reason: None,
        }
    }

    /// The rejection transition. Falls back to the default reason when the
    /// reviewer supplied none (or only whitespace).
    pub fn reject(reason: Option<String>) -> Self {
        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_REJECTION_REASON.to_string());

        Self {
            status: StoryStatus::Rejected,
            approved_by: None,
            approved_at: None,
            rejected_reason: Some(reason),
        }
    }
}
