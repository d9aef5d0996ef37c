use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    domain::{
        ItemState, Lifecycle, NewNotification, NotificationKind, Rejection, ResubmitRequest,
        Submission, SubmissionItem, User,
    },
    error::{AppError, Result},
    notify::{NotifierManager, NotifyEvent},
    repository::{
        ChallengeRepository, EventRepository, NotificationRepository, SubmissionRepository,
        UserRepository,
    },
    scoring::{self, compute_points},
};

use super::submission_service::sanitize_url;

/// The review state machine: all transitions of submissions and their
/// items live here, validated against the current state before any
/// mutation. Callers never set flags directly.
pub struct ReviewService {
    submission_repo: Arc<dyn SubmissionRepository>,
    event_repo: Arc<dyn EventRepository>,
    challenge_repo: Arc<dyn ChallengeRepository>,
    user_repo: Arc<dyn UserRepository>,
    notification_repo: Arc<dyn NotificationRepository>,
    notifier_manager: Arc<NotifierManager>,
}

/// One line of the review queue, with per-item tallies.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReviewRow {
    pub submission_id: Uuid,
    pub username: String,
    pub event_name: String,
    pub created_at: chrono::DateTime<Utc>,
    pub pending: usize,
    pub approved: usize,
    pub revoked: usize,
    pub rejected: bool,
    pub reviewed: bool,
    pub points: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionDetail {
    pub submission: Submission,
    pub items: Vec<SubmissionItem>,
    pub points: f64,
    pub reviewed: bool,
}

impl ReviewService {
    pub fn new(
        submission_repo: Arc<dyn SubmissionRepository>,
        event_repo: Arc<dyn EventRepository>,
        challenge_repo: Arc<dyn ChallengeRepository>,
        user_repo: Arc<dyn UserRepository>,
        notification_repo: Arc<dyn NotificationRepository>,
        notifier_manager: Arc<NotifierManager>,
    ) -> Self {
        Self {
            submission_repo,
            event_repo,
            challenge_repo,
            user_repo,
            notification_repo,
            notifier_manager,
        }
    }

    fn require_reviewer(actor: &User) -> Result<()> {
        if actor.can_review() {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }

    async fn submission(&self, id: Uuid) -> Result<Submission> {
        self.submission_repo
            .find_by_id(id, false)
            .await?
            .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))
    }

    /// Every item transition is forbidden while the parent submission
    /// is rejected; the rejected record is frozen until the owner
    /// re-edits it.
    fn ensure_not_rejected(submission: &Submission) -> Result<()> {
        if submission.is_rejected() {
            Err(AppError::InvalidTransition(
                "Items of a rejected submission cannot be changed".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    pub async fn toggle_approve(&self, actor: &User, item_id: Uuid) -> Result<SubmissionItem> {
        Self::require_reviewer(actor)?;

        let item = self
            .submission_repo
            .find_item(item_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Submission item not found".to_string()))?;
        let submission = self.submission(item.submission_id).await?;
        Self::ensure_not_rejected(&submission)?;

        let next = item.state.toggled_approve();
        self.submission_repo.set_item_state(item_id, next).await?;

        tracing::debug!("Item {} -> {:?}", item_id, next);
        Ok(SubmissionItem { state: next, ..item })
    }

    pub async fn toggle_revoke(&self, actor: &User, item_id: Uuid) -> Result<SubmissionItem> {
        Self::require_reviewer(actor)?;

        let item = self
            .submission_repo
            .find_item(item_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Submission item not found".to_string()))?;
        let submission = self.submission(item.submission_id).await?;
        Self::ensure_not_rejected(&submission)?;

        let next = item.state.toggled_revoke()?;
        self.submission_repo.set_item_state(item_id, next).await?;

        tracing::debug!("Item {} -> {:?}", item_id, next);
        Ok(SubmissionItem { state: next, ..item })
    }

    /// Approve every pending item of one submission. Already-approved
    /// items are untouched, so the operation is idempotent.
    pub async fn approve_all(&self, actor: &User, submission_id: Uuid) -> Result<u64> {
        Self::require_reviewer(actor)?;

        let submission = self.submission(submission_id).await?;
        Self::ensure_not_rejected(&submission)?;

        self.submission_repo
            .approve_pending_items(submission_id)
            .await
    }

    /// Approve every pending item across an event. Rejected
    /// submissions are skipped rather than erroring.
    pub async fn approve_all_for_event(&self, actor: &User, event_id: Uuid) -> Result<u64> {
        Self::require_reviewer(actor)?;

        self.event_repo
            .find_by_id(event_id, false)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        self.submission_repo
            .approve_pending_items_for_event(event_id)
            .await
    }

    /// Reject a submission: authoritative, erases any manual override,
    /// and leaves items untouched but frozen. The owner is notified;
    /// notification failures never undo the transition.
    pub async fn reject(&self, actor: &User, submission_id: Uuid, reason: &str) -> Result<()> {
        Self::require_reviewer(actor)?;

        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::Validation(
                "A rejection reason is required".to_string(),
            ));
        }

        let submission = self.submission(submission_id).await?;
        if submission.is_rejected() {
            return Err(AppError::InvalidTransition(
                "Submission is already rejected".to_string(),
            ));
        }

        self.submission_repo
            .set_rejection(
                submission_id,
                Some(Rejection {
                    reason: reason.to_string(),
                    rejected_at: Utc::now(),
                    rejected_by_id: Some(actor.id),
                }),
            )
            .await?;

        self.notify_rejection(&submission, reason).await;
        Ok(())
    }

    async fn notify_rejection(&self, submission: &Submission, reason: &str) {
        let owner = match self.user_repo.find_by_id(submission.user_id).await {
            Ok(Some(owner)) => owner,
            Ok(None) => return,
            Err(e) => {
                tracing::error!("Failed to load submission owner: {:?}", e);
                return;
            }
        };
        let event_name = match self.event_repo.find_by_id(submission.event_id, true).await {
            Ok(Some(event)) => event.name,
            _ => "unknown event".to_string(),
        };

        let notification = NewNotification {
            user_id: owner.id,
            kind: NotificationKind::Rejection,
            title: format!("Submission for {} was rejected", event_name),
            content: format!(
                "Your submission for **{}** was rejected.\n\nReason: {}\n\n\
                 You can correct and resubmit it from your submission list.",
                event_name, reason
            ),
            related_id: Some(submission.id),
            batch_id: None,
        };
        if let Err(e) = self.notification_repo.create(notification).await {
            tracing::error!("Failed to record rejection notification: {:?}", e);
        }

        let manager = self.notifier_manager.clone();
        let event = NotifyEvent::SubmissionRejected {
            recipient: owner,
            submission_id: submission.id,
            event_name,
            reason: reason.to_string(),
        };
        tokio::spawn(async move {
            manager.handle_event(event).await;
        });
    }

    /// Undo a rejection. Item states and the cleared manual override
    /// are not restored; the submission returns to whatever its items
    /// say. Related rejection notifications are suppressed.
    pub async fn unreject(&self, actor: &User, submission_id: Uuid) -> Result<()> {
        Self::require_reviewer(actor)?;

        let submission = self.submission(submission_id).await?;
        if !submission.is_rejected() {
            return Err(AppError::InvalidTransition(
                "Submission is not rejected".to_string(),
            ));
        }

        self.submission_repo
            .set_rejection(submission_id, None)
            .await?;
        self.notification_repo
            .soft_delete_related(NotificationKind::Rejection, submission_id)
            .await?;

        Ok(())
    }

    /// Reviewer's explicit point value; `None` reverts to item-based
    /// scoring. Forbidden while rejected; rejection already decided
    /// the score.
    pub async fn set_manual_points(
        &self,
        actor: &User,
        submission_id: Uuid,
        value: Option<f64>,
    ) -> Result<()> {
        Self::require_reviewer(actor)?;

        if value.is_some_and(|v| !v.is_finite()) {
            return Err(AppError::Validation(
                "Manual points must be a finite number".to_string(),
            ));
        }

        let submission = self.submission(submission_id).await?;
        if submission.is_rejected() {
            return Err(AppError::InvalidTransition(
                "Cannot set manual points on a rejected submission".to_string(),
            ));
        }

        self.submission_repo
            .set_manual_points(submission_id, value)
            .await
    }

    /// Owner-initiated correction of a rejected submission. The item
    /// set is replaced wholesale with fresh pending items scoped to the
    /// same event; `created_at` keeps the record in its original
    /// scoring month.
    pub async fn resubmit_edit(
        &self,
        actor: &User,
        submission_id: Uuid,
        request: ResubmitRequest,
    ) -> Result<Submission> {
        let submission = self.submission(submission_id).await?;
        if submission.user_id != actor.id {
            return Err(AppError::Forbidden);
        }
        if !submission.is_rejected() {
            return Err(AppError::InvalidTransition(
                "Only a rejected submission can be re-edited".to_string(),
            ));
        }

        let known: Vec<Uuid> = self
            .challenge_repo
            .list_by_event(submission.event_id, false, None, None)
            .await?
            .into_iter()
            .map(|c| c.id)
            .collect();
        let mut challenge_ids = Vec::new();
        for id in &request.challenge_ids {
            if known.contains(id) && !challenge_ids.contains(id) {
                challenge_ids.push(*id);
            } else if !known.contains(id) {
                tracing::debug!(
                    "Dropping challenge {} outside event {}",
                    id,
                    submission.event_id
                );
            }
        }

        self.submission_repo
            .replace_items(
                submission_id,
                &challenge_ids,
                sanitize_url(request.wp_url),
                request.wp_md,
            )
            .await?;

        self.submission(submission_id).await
    }

    /// Owners may only delete an unscored record; moderators may
    /// delete anything.
    pub async fn soft_delete(&self, actor: &User, submission_id: Uuid) -> Result<()> {
        let submission = self.submission(submission_id).await?;

        if !actor.can_review() {
            if submission.user_id != actor.id {
                return Err(AppError::Forbidden);
            }
            let items = self.submission_repo.items(submission_id).await?;
            let scored = submission.manual_points.is_some()
                || items.iter().any(|it| it.state.counts_for_score());
            if scored {
                return Err(AppError::InvalidTransition(
                    "A scored submission cannot be deleted by its owner".to_string(),
                ));
            }
        }

        self.submission_repo
            .set_lifecycle(submission_id, Lifecycle::Deleted)
            .await
    }

    pub async fn restore(&self, actor: &User, submission_id: Uuid) -> Result<()> {
        Self::require_reviewer(actor)?;

        self.submission_repo
            .find_by_id(submission_id, true)
            .await?
            .ok_or_else(|| AppError::NotFound("Submission not found".to_string()))?;

        self.submission_repo
            .set_lifecycle(submission_id, Lifecycle::Active)
            .await
    }

    /// The review queue: one row per submission with item tallies, the
    /// computed point value and the reviewed predicate. Optionally
    /// filtered by event and by a username fragment.
    pub async fn review_queue(
        &self,
        actor: &User,
        event_id: Option<Uuid>,
        username_query: Option<&str>,
    ) -> Result<Vec<SubmissionReviewRow>> {
        Self::require_reviewer(actor)?;

        let submissions = self.submission_repo.list_for_review(event_id).await?;
        let mut rows = Vec::with_capacity(submissions.len());

        for submission in submissions {
            let username = match self.user_repo.find_by_id(submission.user_id).await? {
                Some(u) => u.username,
                None => format!("uid:{}", submission.user_id),
            };
            if let Some(q) = username_query {
                if !username.to_lowercase().contains(&q.to_lowercase()) {
                    continue;
                }
            }
            let event_name = self
                .event_repo
                .find_by_id(submission.event_id, true)
                .await?
                .map(|e| e.name)
                .unwrap_or_else(|| "(deleted event)".to_string());

            let detail = self.detail_of(submission).await?;
            let items = &detail.items;
            rows.push(SubmissionReviewRow {
                submission_id: detail.submission.id,
                username,
                event_name,
                created_at: detail.submission.created_at,
                pending: items.iter().filter(|it| it.state.is_pending()).count(),
                approved: items.iter().filter(|it| it.state.counts_for_score()).count(),
                revoked: items
                    .iter()
                    .filter(|it| it.state == ItemState::Revoked)
                    .count(),
                rejected: detail.submission.is_rejected(),
                reviewed: detail.reviewed,
                points: detail.points,
            });
        }

        Ok(rows)
    }

    pub async fn submission_detail(&self, submission_id: Uuid) -> Result<SubmissionDetail> {
        let submission = self.submission(submission_id).await?;
        self.detail_of(submission).await
    }

    async fn detail_of(&self, submission: Submission) -> Result<SubmissionDetail> {
        let items = self.submission_repo.items(submission.id).await?;
        let scored = self
            .submission_repo
            .scored_by_user(submission.user_id)
            .await?;
        let points = scored
            .iter()
            .find(|s| s.submission_id == submission.id)
            .map(compute_points)
            .unwrap_or(0.0);
        let pending = items.iter().filter(|it| it.state.is_pending()).count();
        let reviewed = scoring::is_reviewed(
            submission.is_rejected(),
            submission.manual_points,
            items.len(),
            pending,
        );

        Ok(SubmissionDetail {
            submission,
            items,
            points,
            reviewed,
        })
    }
}
