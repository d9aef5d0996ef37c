use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Lifecycle;
use crate::error::{AppError, Result};

/// One user's claim of solved challenges (plus optional writeup) for
/// one event.
///
/// `created_at` decides month-window membership and is never mutated,
/// not even when a rejected submission is re-edited.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub id: Uuid,
    pub user_id: Uuid,
    pub event_id: Uuid,
    pub wp_url: Option<String>,
    pub wp_md: Option<String>,
    /// Reviewer's explicit point value. When set, item-based scoring is
    /// bypassed and the event weight is not re-applied.
    pub manual_points: Option<f64>,
    pub rejection: Option<Rejection>,
    pub lifecycle: Lifecycle,
    pub created_at: DateTime<Utc>,
}

impl Submission {
    pub fn is_rejected(&self) -> bool {
        self.rejection.is_some()
    }
}

/// Authoritative reviewer action invalidating a submission pending
/// owner correction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rejection {
    pub reason: String,
    pub rejected_at: DateTime<Utc>,
    pub rejected_by_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionItem {
    pub id: Uuid,
    pub submission_id: Uuid,
    pub challenge_id: Uuid,
    pub state: ItemState,
    pub created_at: DateTime<Utc>,
}

/// Per-item review state.
///
/// `Revoked` means "approved, then revoked"; the tag makes the
/// revoked-implies-approved invariant hold by construction, so no row
/// can ever be revoked without having been approved.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "TEXT")]
pub enum ItemState {
    Pending,
    Approved,
    Revoked,
}

impl ItemState {
    /// Only approved-and-not-revoked items contribute to scoring.
    pub fn counts_for_score(&self) -> bool {
        matches!(self, ItemState::Approved)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, ItemState::Pending)
    }

    /// Pending -> Approved; Approved or Revoked -> Pending. Moving back
    /// to Pending always clears revocation.
    pub fn toggled_approve(self) -> ItemState {
        match self {
            ItemState::Pending => ItemState::Approved,
            ItemState::Approved | ItemState::Revoked => ItemState::Pending,
        }
    }

    /// Approved <-> Revoked; illegal from Pending.
    pub fn toggled_revoke(self) -> Result<ItemState> {
        match self {
            ItemState::Pending => Err(AppError::InvalidTransition(
                "Cannot revoke an item that has not been approved".to_string(),
            )),
            ItemState::Approved => Ok(ItemState::Revoked),
            ItemState::Revoked => Ok(ItemState::Approved),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubmissionRequest {
    pub event_id: Uuid,
    pub challenge_ids: Vec<Uuid>,
    pub wp_url: Option<String>,
    pub wp_md: Option<String>,
}

/// Member-initiated correction of a rejected submission: the full item
/// set is replaced, never patched incrementally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResubmitRequest {
    pub challenge_ids: Vec<Uuid>,
    pub wp_url: Option<String>,
    pub wp_md: Option<String>,
}
